use crate::error::AppError;

pub fn min_len(field: &str, value: &str, min: usize) -> Result<(), AppError> {
    if value.trim().chars().count() < min {
        return Err(AppError::BadRequest(format!(
            "{field} must be at least {min} characters"
        )));
    }
    Ok(())
}

pub fn exact_len(field: &str, value: &str, len: usize) -> Result<(), AppError> {
    if value.trim().chars().count() != len {
        return Err(AppError::BadRequest(format!(
            "{field} must be exactly {len} characters"
        )));
    }
    Ok(())
}

pub fn email(value: &str) -> Result<(), AppError> {
    let valid = value.len() >= 6
        && match value.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.contains('@')
                    && domain.contains('.')
                    && !domain.starts_with('.')
                    && !domain.ends_with('.')
            }
            None => false,
        };
    if !valid {
        return Err(AppError::BadRequest("Invalid email".into()));
    }
    Ok(())
}

pub fn normalize_email(value: &str) -> String {
    value.trim().to_lowercase()
}

pub fn name(value: &str) -> Result<(), AppError> {
    min_len("Name", value, 3)
}

pub fn password(value: &str) -> Result<(), AppError> {
    if value.chars().count() < 8 {
        return Err(AppError::BadRequest(
            "Password must be at least 8 characters".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_emails() {
        assert!(email("ana@devstore.com").is_ok());
        assert!(email("first.last@mail.co").is_ok());
    }

    #[test]
    fn rejects_malformed_emails() {
        for bad in ["", "ana", "ana@", "@devstore.com", "ana@devstore", "a@b@c.com", "a@.com"] {
            assert!(email(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn length_rules() {
        assert!(name("Al").is_err());
        assert!(name("Ana").is_ok());
        assert!(password("1234567").is_err());
        assert!(password("12345678").is_ok());
        assert!(exact_len("Zipcode", "01310100", 8).is_ok());
        assert!(exact_len("Zipcode", "0131010", 8).is_err());
        assert!(exact_len("Zipcode", "013101000", 8).is_err());
    }

    #[test]
    fn emails_are_lowercased() {
        assert_eq!(normalize_email("  Ana@DevStore.com "), "ana@devstore.com");
    }
}
