#![forbid(unsafe_code)]

//! Field-level validation shared by the store and the command layer.
//!
//! Every helper trims its input and returns the canonical value that gets
//! persisted, so the same rules apply no matter which layer calls first.

pub const MAX_USER_NAME: usize = 120;
pub const MAX_EMAIL: usize = 120;
pub const MAX_TITLE: usize = 255;
pub const MAX_TAG_NAME: usize = 100;
pub const MAX_TAG_COLOR: usize = 20;
pub const MAX_TAXONOMY_NAME: usize = 50;
pub const MAX_BODY: usize = 65_536;
pub const MAX_PASSWORD: usize = 1024;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldError {
    Missing { field: &'static str },
    Empty { field: &'static str },
    TooLong { field: &'static str, max: usize },
    ContainsControl { field: &'static str },
    Malformed { field: &'static str },
}

impl FieldError {
    pub fn field(&self) -> &'static str {
        match self {
            Self::Missing { field }
            | Self::Empty { field }
            | Self::TooLong { field, .. }
            | Self::ContainsControl { field }
            | Self::Malformed { field } => field,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::Missing { field } => format!("{field} is required"),
            Self::Empty { field } => format!("{field} must not be empty"),
            Self::TooLong { field, max } => format!("{field} must be at most {max} characters"),
            Self::ContainsControl { field } => format!("{field} contains control characters"),
            Self::Malformed { field } => format!("{field} is malformed"),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for FieldError {}

/// Single-line value such as a name or title.
pub fn required_line(field: &'static str, value: &str, max: usize) -> Result<String, FieldError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FieldError::Empty { field });
    }
    if trimmed.chars().count() > max {
        return Err(FieldError::TooLong { field, max });
    }
    if trimmed.chars().any(|c| c.is_control()) {
        return Err(FieldError::ContainsControl { field });
    }
    Ok(trimmed.to_string())
}

/// Multi-line body such as comment content. Newlines and tabs are allowed.
pub fn required_text(field: &'static str, value: &str, max: usize) -> Result<String, FieldError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FieldError::Empty { field });
    }
    if trimmed.chars().count() > max {
        return Err(FieldError::TooLong { field, max });
    }
    if trimmed
        .chars()
        .any(|c| c.is_control() && !matches!(c, '\n' | '\r' | '\t'))
    {
        return Err(FieldError::ContainsControl { field });
    }
    Ok(trimmed.to_string())
}

/// Optional body: blank collapses to `None`.
pub fn optional_text(
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> Result<Option<String>, FieldError> {
    match value {
        Some(value) if !value.trim().is_empty() => required_text(field, value, max).map(Some),
        _ => Ok(None),
    }
}

/// Passwords are kept verbatim; only emptiness and length are checked.
pub fn password(value: &str) -> Result<&str, FieldError> {
    if value.is_empty() {
        return Err(FieldError::Empty { field: "password" });
    }
    if value.chars().count() > MAX_PASSWORD {
        return Err(FieldError::TooLong {
            field: "password",
            max: MAX_PASSWORD,
        });
    }
    Ok(value)
}

pub fn email(value: &str) -> Result<String, FieldError> {
    let value = required_line("email", value, MAX_EMAIL)?;
    let Some((local, domain)) = value.split_once('@') else {
        return Err(FieldError::Malformed { field: "email" });
    };
    if local.is_empty() || domain.is_empty() || value.chars().any(char::is_whitespace) {
        return Err(FieldError::Malformed { field: "email" });
    }
    Ok(value)
}
