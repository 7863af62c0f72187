#![forbid(unsafe_code)]

use crate::credentials::CredentialError;
use crate::tokens::TokenError;
use serde::Serialize;
use tracker_core::model::{EntityKind, TaxonomyKind};
use tracker_core::policy::PolicyDenied;
use tracker_core::text::FieldError;
use tracker_core::view::IssueSummary;
use tracker_storage::StoreError;

/// Request-scoped failure. Nothing here is fatal to the process.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(FieldError),
    #[error("unknown {kind} id {id}")]
    InvalidReference { kind: EntityKind, id: i64 },
    #[error("email already registered")]
    DuplicateEmail,
    #[error("{kind} name already exists: {name}")]
    DuplicateName { kind: TaxonomyKind, name: String },
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: i64 },
    #[error("forbidden")]
    Forbidden(PolicyDenied),
    #[error("{kind} {id} is still used by {} issue(s)", issues.len())]
    ReferentialConflict {
        kind: TaxonomyKind,
        id: i64,
        issues: Vec<IssueSummary>,
    },
    #[error("authentication required")]
    Unauthenticated,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("internal: {0}")]
    Internal(String),
}

/// Serialized shape of a failed request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referencing_issues: Option<Vec<IssueSummary>>,
}

impl ServiceError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidReference { .. } => "INVALID_REFERENCE",
            Self::DuplicateEmail => "DUPLICATE_EMAIL",
            Self::DuplicateName { .. } => "DUPLICATE_NAME",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::ReferentialConflict { .. } => "REFERENTIAL_CONFLICT",
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Internal details are logged here and never leave the process.
    pub fn to_envelope(&self) -> ErrorEnvelope {
        let message = match self {
            Self::Internal(detail) => {
                tracing::error!(detail = %detail, "internal error");
                "internal error".to_string()
            }
            other => other.to_string(),
        };
        let referencing_issues = match self {
            Self::ReferentialConflict { issues, .. } => Some(issues.clone()),
            _ => None,
        };
        ErrorEnvelope {
            code: self.code(),
            message,
            referencing_issues,
        }
    }

    pub(crate) fn not_found(kind: impl Into<EntityKind>, id: i64) -> Self {
        Self::NotFound {
            kind: kind.into(),
            id,
        }
    }

    pub(crate) fn internal(detail: impl std::fmt::Display) -> Self {
        Self::Internal(detail.to_string())
    }
}

impl From<FieldError> for ServiceError {
    fn from(value: FieldError) -> Self {
        Self::Validation(value)
    }
}

impl From<PolicyDenied> for ServiceError {
    fn from(value: PolicyDenied) -> Self {
        Self::Forbidden(value)
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Validation(field) => Self::Validation(field),
            StoreError::InvalidReference { kind, id } => Self::InvalidReference { kind, id },
            StoreError::NotFound { kind, id } => Self::NotFound { kind, id },
            StoreError::DuplicateEmail => Self::DuplicateEmail,
            StoreError::DuplicateName { kind, name } => Self::DuplicateName { kind, name },
            StoreError::ReferentialConflict { kind, id, issues } => {
                Self::ReferentialConflict { kind, id, issues }
            }
            other @ (StoreError::Io(_) | StoreError::Sql(_) | StoreError::ResetRequired(_)) => {
                Self::internal(other)
            }
        }
    }
}

impl From<CredentialError> for ServiceError {
    fn from(value: CredentialError) -> Self {
        Self::internal(value)
    }
}

impl From<TokenError> for ServiceError {
    fn from(value: TokenError) -> Self {
        Self::internal(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tracker_core::policy::Action;

    #[test]
    fn internal_detail_is_hidden() {
        let err = ServiceError::from(StoreError::ResetRequired("schema version mismatch"));
        assert_eq!(err.code(), "INTERNAL");
        let envelope = serde_json::to_value(err.to_envelope()).expect("envelope must serialize");
        assert_eq!(
            envelope,
            json!({"code": "INTERNAL", "message": "internal error"})
        );
    }

    #[test]
    fn conflict_envelope_lists_referencing_issues() {
        let err = ServiceError::from(StoreError::ReferentialConflict {
            kind: TaxonomyKind::Status,
            id: 1,
            issues: vec![IssueSummary {
                id: 4,
                title: "Bug".to_string(),
            }],
        });
        let envelope = serde_json::to_value(err.to_envelope()).expect("envelope must serialize");
        assert_eq!(envelope["code"], "REFERENTIAL_CONFLICT");
        assert_eq!(
            envelope["referencingIssues"],
            json!([{"id": 4, "title": "Bug"}])
        );
    }

    #[test]
    fn forbidden_does_not_leak_the_action() {
        let err = ServiceError::from(PolicyDenied {
            actor_id: 2,
            action: Action::ManageTags,
        });
        assert_eq!(err.to_envelope().message, "forbidden");
    }

    #[test]
    fn validation_message_names_the_field() {
        let err = ServiceError::from(FieldError::Missing { field: "statusId" });
        let envelope = err.to_envelope();
        assert_eq!(envelope.code, "VALIDATION_ERROR");
        assert!(envelope.message.contains("statusId"));
    }
}
