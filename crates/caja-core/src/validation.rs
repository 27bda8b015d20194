//! Field-level input validation.
//!
//! Small, composable checks used by the persistence layer before any
//! storage work begins. Each returns the first violation it finds.

use crate::error::ValidationError;
use crate::money::{Money, Quantity};
use crate::types::Rate;

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum length for product and customer names.
pub const MAX_NAME_LENGTH: usize = 200;

/// Maximum length for barcodes.
pub const MAX_BARCODE_LENGTH: usize = 50;

/// Maximum length for operator usernames.
pub const MAX_USERNAME_LENGTH: usize = 50;

/// Validates a product name: non-empty after trimming, bounded length.
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required { field: "name".to_string() });
    }
    if trimmed.len() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong { field: "name".to_string(), max: MAX_NAME_LENGTH });
    }
    Ok(())
}

/// Validates a customer name with the same bounds as product names.
pub fn validate_customer_name(name: &str) -> ValidationResult<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required { field: "name".to_string() });
    }
    if trimmed.len() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong { field: "name".to_string(), max: MAX_NAME_LENGTH });
    }
    Ok(())
}

/// Validates a barcode: non-empty, bounded, digits plus `-` and `_`.
pub fn validate_barcode(barcode: &str) -> ValidationResult<()> {
    let trimmed = barcode.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required { field: "barcode".to_string() });
    }
    if trimmed.len() > MAX_BARCODE_LENGTH {
        return Err(ValidationError::TooLong {
            field: "barcode".to_string(),
            max: MAX_BARCODE_LENGTH,
        });
    }
    if !trimmed.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(ValidationError::InvalidFormat {
            field: "barcode".to_string(),
            reason: "only letters, digits, hyphens, and underscores allowed".to_string(),
        });
    }
    Ok(())
}

/// Validates an operator username: non-empty, bounded, ascii word chars.
pub fn validate_username(username: &str) -> ValidationResult<()> {
    let trimmed = username.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required { field: "username".to_string() });
    }
    if trimmed.len() > MAX_USERNAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: "username".to_string(),
            max: MAX_USERNAME_LENGTH,
        });
    }
    if !trimmed.chars().all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-') {
        return Err(ValidationError::InvalidFormat {
            field: "username".to_string(),
            reason: "only letters, digits, '.', '_', and '-' allowed".to_string(),
        });
    }
    Ok(())
}

/// Validates a sale or intake quantity: strictly positive.
pub fn validate_quantity(quantity: Quantity) -> ValidationResult<()> {
    if !quantity.is_positive() {
        return Err(ValidationError::MustBePositive { field: "quantity".to_string() });
    }
    Ok(())
}

/// Validates a unit price: zero is allowed (giveaways), negative is not.
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::Negative { field: "price".to_string() });
    }
    Ok(())
}

/// Validates an intake unit cost: zero allowed, negative not.
pub fn validate_cost(cost: Money) -> ValidationResult<()> {
    if cost.is_negative() {
        return Err(ValidationError::Negative { field: "cost".to_string() });
    }
    Ok(())
}

/// Validates an amount tendered by the customer: strictly positive.
pub fn validate_tendered(amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive { field: "tendered".to_string() });
    }
    Ok(())
}

/// Validates a single payment split amount: strictly positive.
pub fn validate_split_amount(amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive { field: "split amount".to_string() });
    }
    Ok(())
}

/// Validates a discount or surcharge rate: 0% to 100% inclusive.
pub fn validate_percentage(field: &str, rate: Rate) -> ValidationResult<()> {
    if rate.bps() > 10_000 {
        return Err(ValidationError::OutOfRange { field: field.to_string(), min: 0, max: 100 });
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_name_rules() {
        assert!(validate_product_name("Yerba Mate 1kg").is_ok());
        assert!(validate_product_name("").is_err());
        assert!(validate_product_name("   ").is_err());
        assert!(validate_product_name(&"x".repeat(201)).is_err());
        assert!(validate_product_name(&"x".repeat(200)).is_ok());
    }

    #[test]
    fn test_barcode_rules() {
        assert!(validate_barcode("7790001001234").is_ok());
        assert!(validate_barcode("ABC-123_X").is_ok());
        assert!(validate_barcode("").is_err());
        assert!(validate_barcode("has spaces").is_err());
        assert!(validate_barcode(&"9".repeat(51)).is_err());
    }

    #[test]
    fn test_username_rules() {
        assert!(validate_username("maria.lopez").is_ok());
        assert!(validate_username("cajero_1").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("no way").is_err());
    }

    #[test]
    fn test_quantity_must_be_positive() {
        assert!(validate_quantity(Quantity::from_units(1)).is_ok());
        assert!(validate_quantity(Quantity::from_milli(1)).is_ok());
        assert!(validate_quantity(Quantity::zero()).is_err());
        assert!(validate_quantity(Quantity::from_milli(-500)).is_err());
    }

    #[test]
    fn test_prices_allow_zero_but_not_negative() {
        assert!(validate_price(Money::zero()).is_ok());
        assert!(validate_price(Money::from_cents(999)).is_ok());
        assert!(validate_price(Money::from_cents(-1)).is_err());
        assert!(validate_cost(Money::from_cents(-1)).is_err());
    }

    #[test]
    fn test_tendered_and_splits_strictly_positive() {
        assert!(validate_tendered(Money::from_cents(100)).is_ok());
        assert!(validate_tendered(Money::zero()).is_err());
        assert!(validate_split_amount(Money::from_cents(-50)).is_err());
    }

    #[test]
    fn test_percentage_bounds() {
        assert!(validate_percentage("discount", Rate::zero()).is_ok());
        assert!(validate_percentage("discount", Rate::from_percentage(100.0)).is_ok());
        assert!(validate_percentage("discount", Rate::from_bps(10_001)).is_err());

        let err = validate_percentage("surcharge", Rate::from_bps(25_000)).unwrap_err();
        assert_eq!(err.to_string(), "surcharge must be between 0 and 100");
    }
}
