//! Custom validation functions for configuration.
//!
//! Shared by the section modules through `#[validate(custom(...))]`.

use validator::ValidationError;

/// Log levels accepted by the tracing filter.
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate that a given value is a power of two.
pub fn validate_power_of_two<T: std::borrow::Borrow<usize>>(value: T) -> Result<(), ValidationError> {
    if value.borrow().is_power_of_two() {
        Ok(())
    } else {
        Err(ValidationError::new("must_be_power_of_two"))
    }
}

/// Validate that no listed port is 0.
pub fn validate_ports(ports: &[u16]) -> Result<(), ValidationError> {
    if ports.contains(&0) {
        return Err(ValidationError::new("invalid_port"));
    }
    Ok(())
}

/// Validate a log level name, case-insensitively.
pub fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    if LOG_LEVELS.contains(&level.to_lowercase().as_str()) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_log_level"))
    }
}
