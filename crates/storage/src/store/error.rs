#![forbid(unsafe_code)]

use tracker_core::model::{EntityKind, TaxonomyKind};
use tracker_core::text::FieldError;
use tracker_core::view::IssueSummary;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("sqlite: {0}")]
    Sql(#[from] rusqlite::Error),
    #[error("reset required: {0}")]
    ResetRequired(&'static str),
    #[error("validation: {0}")]
    Validation(#[from] FieldError),
    #[error("unknown {kind} id {id}")]
    InvalidReference { kind: EntityKind, id: i64 },
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: i64 },
    #[error("email already registered")]
    DuplicateEmail,
    #[error("{kind} name already exists: {name}")]
    DuplicateName { kind: TaxonomyKind, name: String },
    #[error("{kind} {id} is referenced by {} issue(s)", issues.len())]
    ReferentialConflict {
        kind: TaxonomyKind,
        id: i64,
        issues: Vec<IssueSummary>,
    },
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io(_) | Self::Sql(_) => "INTERNAL",
            Self::ResetRequired(_) => "RESET_REQUIRED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidReference { .. } => "INVALID_REFERENCE",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::DuplicateEmail => "DUPLICATE_EMAIL",
            Self::DuplicateName { .. } => "DUPLICATE_NAME",
            Self::ReferentialConflict { .. } => "REFERENTIAL_CONFLICT",
        }
    }

    pub(crate) fn not_found(kind: impl Into<EntityKind>, id: i64) -> Self {
        Self::NotFound {
            kind: kind.into(),
            id,
        }
    }

    pub(crate) fn invalid_reference(kind: impl Into<EntityKind>, id: i64) -> Self {
        Self::InvalidReference {
            kind: kind.into(),
            id,
        }
    }
}
