//! Validation utilities

use bigdecimal::BigDecimal;

use crate::types::*;

/// Validate that an amount is strictly positive
pub fn validate_positive_amount(amount: &BigDecimal) -> CirculationResult<()> {
    if *amount <= BigDecimal::from(0) {
        Err(CirculationError::Validation(
            "Amount must be positive".to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Validate that a required text field is non-empty
pub fn validate_non_empty(value: &str, field: &str) -> CirculationResult<()> {
    if value.trim().is_empty() {
        Err(CirculationError::Validation(format!(
            "{} cannot be empty",
            field
        )))
    } else {
        Ok(())
    }
}

/// Validate an identifier (accession number, student id, ...)
pub fn validate_id(id: &str, field: &str) -> CirculationResult<()> {
    validate_non_empty(id, field)?;

    if id.len() > 50 {
        return Err(CirculationError::Validation(format!(
            "{} cannot exceed 50 characters",
            field
        )));
    }

    if !id
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(CirculationError::Validation(format!(
            "{} can only contain alphanumeric characters, dashes, and underscores",
            field
        )));
    }

    Ok(())
}
