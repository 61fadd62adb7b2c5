use crate::error::{Error, Result};

/// Required text must be present and not blank.
pub fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(format!("{field} is required")));
    }
    Ok(())
}

pub fn require_email(field: &str, value: &str) -> Result<()> {
    require_text(field, value)?;
    let valid = match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !value.contains(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(Error::validation(format!(
            "{field} must be a valid email address"
        )));
    }
    Ok(())
}

pub fn require_non_negative(field: &str, value: i32) -> Result<()> {
    if value < 0 {
        return Err(Error::validation(format!("{field} cannot be negative")));
    }
    Ok(())
}

pub fn require_positive(field: &str, value: i32) -> Result<()> {
    if value <= 0 {
        return Err(Error::validation(format!("{field} must be greater than zero")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_text() {
        assert!(require_text("full_name", "Beatriz").is_ok());
        assert!(require_text("full_name", "   ").is_err());
        assert!(require_text("full_name", "").is_err());
        assert!(require_text("name", &"á".repeat(300)).is_ok());
    }

    #[test]
    fn test_require_email() {
        assert!(require_email("email", "admin@rotafacil.com").is_ok());
        assert!(require_email("email", "admin").is_err());
        assert!(require_email("email", "@rotafacil.com").is_err());
        assert!(require_email("email", "admin@localhost").is_err());
        assert!(require_email("email", "a b@rotafacil.com").is_err());
    }

    #[test]
    fn test_numeric_bounds() {
        assert!(require_non_negative("seats_available", 0).is_ok());
        assert!(require_non_negative("seats_available", -1).is_err());
        assert!(require_positive("capacity", 0).is_err());
        assert!(require_positive("capacity", 40).is_ok());
    }
}
