//! Error types for configuration loading and validation

use std::path::PathBuf;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Invalid configuration:\n{}", format_validation_errors(.0))]
    Validation(#[source] ValidationErrors),

    #[error("Configuration parsing error: {0}")]
    Parsing(#[from] Box<figment::Error>),

    #[error("Configuration I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Flattens nested section errors into `section.field: code` lines.
fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut lines = Vec::new();
    collect_errors(errors, "", &mut lines);
    lines.join("\n")
}

fn collect_errors(errors: &ValidationErrors, prefix: &str, lines: &mut Vec<String>) {
    use validator::ValidationErrorsKind;

    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    let message = match &error.message {
                        Some(msg) => msg.to_string(),
                        None => error.code.to_string(),
                    };
                    lines.push(format!("  - {path}: {message}"));
                }
            }
            ValidationErrorsKind::Struct(nested) => collect_errors(nested, &path, lines),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_errors(nested, &format!("{path}[{index}]"), lines);
                }
            }
        }
    }
}

impl From<ValidationErrors> for ConfigError {
    fn from(errors: ValidationErrors) -> Self {
        ConfigError::Validation(errors)
    }
}

impl From<figment::Error> for ConfigError {
    fn from(error: figment::Error) -> Self {
        ConfigError::Parsing(Box::new(error))
    }
}
