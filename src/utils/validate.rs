use crate::domain::DomainError;

pub const MIN_PUBLICATION_YEAR: i32 = 1000;
pub const MAX_PUBLICATION_YEAR: i32 = 3000;

/// Reject blank values of required text fields.
pub fn require_present(field: &str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::Validation(format!("{} must not be blank", field)));
    }
    Ok(())
}

/// Reject values longer than `max` characters.
pub fn max_len(field: &str, value: &str, max: usize) -> Result<(), DomainError> {
    let len = value.chars().count();
    if len > max {
        return Err(DomainError::Validation(format!(
            "{} is {} characters long, at most {} allowed",
            field, len, max
        )));
    }
    Ok(())
}

pub fn publication_year(year: Option<i32>) -> Result<(), DomainError> {
    match year {
        Some(y) if !(MIN_PUBLICATION_YEAR..=MAX_PUBLICATION_YEAR).contains(&y) => {
            Err(DomainError::Validation(format!(
                "publication_year {} is outside {}..={}",
                y, MIN_PUBLICATION_YEAR, MAX_PUBLICATION_YEAR
            )))
        }
        _ => Ok(()),
    }
}
