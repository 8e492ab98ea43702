// src/validation.rs
use crate::error::AppError;

pub const ROLES: [&str; 3] = ["admin", "manager", "seller"];
pub const PAYMENT_METHODS: [&str; 4] = ["cash", "credit_card", "debit_card", "pix"];
pub const ITEM_CONDITIONS: [&str; 2] = ["new", "used"];

pub fn require_non_empty(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{} is required", field)));
    }
    Ok(())
}

/// Device identifier format: `NNNNNN-NN-NNNNNN-N`.
pub fn validate_imei(imei: &str) -> Result<(), AppError> {
    let bytes = imei.as_bytes();
    let valid = bytes.len() == 18
        && bytes.iter().enumerate().all(|(i, b)| match i {
            6 | 9 | 16 => *b == b'-',
            _ => b.is_ascii_digit(),
        });

    if !valid {
        return Err(AppError::validation(format!(
            "Invalid IMEI '{}': expected format NNNNNN-NN-NNNNNN-N",
            imei
        )));
    }
    Ok(())
}

/// CPF must carry exactly 11 digits; dots and dashes are accepted.
pub fn validate_cpf(cpf: &str) -> Result<(), AppError> {
    let digits = cpf.chars().filter(char::is_ascii_digit).count();
    let only_expected = cpf.chars().all(|c| c.is_ascii_digit() || c == '.' || c == '-');

    if digits != 11 || !only_expected {
        return Err(AppError::validation(format!("Invalid CPF '{}'", cpf)));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), AppError> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    };

    if !valid {
        return Err(AppError::validation(format!("Invalid email '{}'", email)));
    }
    Ok(())
}

pub fn validate_role(role: &str) -> Result<(), AppError> {
    if !ROLES.contains(&role) {
        return Err(AppError::validation(format!(
            "Invalid role '{}': expected one of admin, manager, seller",
            role
        )));
    }
    Ok(())
}

pub fn validate_payment_method(method: &str) -> Result<(), AppError> {
    if !PAYMENT_METHODS.contains(&method) {
        return Err(AppError::validation(format!(
            "Invalid payment method '{}': expected one of cash, credit_card, debit_card, pix",
            method
        )));
    }
    Ok(())
}

pub fn validate_item_condition(condition: &str) -> Result<(), AppError> {
    if !ITEM_CONDITIONS.contains(&condition) {
        return Err(AppError::validation(format!(
            "Invalid item condition '{}': expected new or used",
            condition
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn imei_format() {
        assert!(validate_imei("123456-78-901234-5").is_ok());
        assert!(validate_imei("123456-78-901234-").is_err());
        assert!(validate_imei("12345678901234567").is_err());
        assert!(validate_imei("123456-78-9012a4-5").is_err());
        assert!(validate_imei("123456_78_901234_5").is_err());
    }

    #[test]
    fn cpf_digits() {
        assert!(validate_cpf("123.456.789-09").is_ok());
        assert!(validate_cpf("12345678909").is_ok());
        assert!(validate_cpf("123.456.789").is_err());
        assert!(validate_cpf("abc.456.789-09").is_err());
    }

    #[test]
    fn email_shape() {
        assert!(validate_email("joao@example.com").is_ok());
        assert!(validate_email("joao").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("joao@nodot").is_err());
    }

    #[test]
    fn enumerated_values() {
        assert!(validate_role("seller").is_ok());
        assert!(validate_role("driver").is_err());
        assert!(validate_payment_method("pix").is_ok());
        assert!(validate_payment_method("check").is_err());
        assert!(validate_item_condition("used").is_ok());
        assert!(validate_item_condition("refurbished").is_err());
    }

    #[test]
    fn required_fields() {
        assert!(require_non_empty("Name", "Ana").is_ok());
        assert!(require_non_empty("Name", "   ").is_err());
    }
}
