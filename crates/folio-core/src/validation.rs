//! # Validation Module
//!
//! Input validation for issuance commands and the records the engine creates.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Command shape (THIS MODULE)                                  │
//! │  ├── cart size, quantities, prices, tax references                     │
//! │  └── identifier formats, tenders, discount range                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: References (folio-db, inside the issuance transaction)       │
//! │  ├── customer exists, user exists and is active                        │
//! │  └── discount exists and matches the submitted percentage              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK constraints on the numbering window                         │
//! │  ├── UNIQUE invoice numbers                                            │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,no_run
//! use folio_core::validation::{validate_sku, validate_quantity};
//!
//! validate_sku("COFFEE-1LB").unwrap();
//! validate_quantity(5).unwrap();
//! ```

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::types::{CartLine, IssueInvoiceCommand, Tender};
use crate::{
    MAX_CART_ITEMS, MAX_CREDIT_DAYS, MAX_ITEM_QUANTITY, MAX_PAYMENT_CENTS, MAX_TENDERS,
    MAX_UNIT_PRICE_CENTS,
};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum length of an authorization prefix.
const MAX_PREFIX_LEN: usize = 32;

// =============================================================================
// String Validators
// =============================================================================

/// Validates that a field is present.
pub fn validate_required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a SKU (Stock Keeping Unit).
///
/// ## Rules
/// - Must not be empty
/// - Must be between 1 and 50 characters
/// - Should contain only alphanumeric characters, hyphens, underscores
///
/// ## Example
/// ```rust
/// use folio_core::validation::validate_sku;
///
/// assert!(validate_sku("COFFEE-1LB").is_ok());
/// assert!(validate_sku("").is_err());
/// assert!(validate_sku("A".repeat(100).as_str()).is_err());
/// ```
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();
    validate_required("sku", sku)?;

    if sku.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: 50,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a product name (1 to 200 characters).
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();
    validate_required("name", name)?;

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity value.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in cents. Zero is allowed (free items).
///
/// ## Example
/// ```rust
/// use folio_core::validation::validate_price_cents;
/// use folio_core::MAX_UNIT_PRICE_CENTS;
///
/// assert!(validate_price_cents(1099).is_ok());
/// assert!(validate_price_cents(0).is_ok());
/// assert!(validate_price_cents(-100).is_err());
/// assert!(validate_price_cents(MAX_UNIT_PRICE_CENTS + 1).is_err());
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if !(0..=MAX_UNIT_PRICE_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: MAX_UNIT_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Validates a payment amount in cents. Must be positive and at most
/// MAX_PAYMENT_CENTS.
pub fn validate_payment_amount(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "payment amount".to_string(),
        });
    }

    if cents > MAX_PAYMENT_CENTS {
        return Err(ValidationError::OutOfRange {
            field: "payment amount".to_string(),
            min: 1,
            max: MAX_PAYMENT_CENTS,
        });
    }

    Ok(())
}

/// Validates a credit term. Zero and negative terms are a settlement
/// concern, so only the upper bound is checked here.
pub fn validate_credit_days(days: i64) -> ValidationResult<()> {
    if days > MAX_CREDIT_DAYS {
        return Err(ValidationError::OutOfRange {
            field: "credit_days".to_string(),
            min: 1,
            max: MAX_CREDIT_DAYS,
        });
    }

    Ok(())
}

/// Validates a tax rate in basis points (0% to 100%).
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10000 {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0,
            max: 10000,
        });
    }

    Ok(())
}

/// Validates a discount percentage in basis points (0% to 100%).
pub fn validate_discount_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10000 {
        return Err(ValidationError::OutOfRange {
            field: "discount".to_string(),
            min: 0,
            max: 10000,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates cart size: at least one line, at most MAX_CART_ITEMS (100).
pub fn validate_cart_size(items: usize) -> ValidationResult<()> {
    if items == 0 {
        return Err(ValidationError::Required {
            field: "lines".to_string(),
        });
    }

    if items > MAX_CART_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "cart items".to_string(),
            min: 1,
            max: MAX_CART_ITEMS as i64,
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use folio_core::validation::validate_uuid;
///
/// assert!(validate_uuid("customer_id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("customer_id", "not-a-uuid").is_err());
/// ```
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    validate_required(field, id)?;

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Numbering Window
// =============================================================================

/// Validates the static shape of a numbering authorization.
pub fn validate_authorization_window(
    prefix: &str,
    initial: i64,
    final_correlative: i64,
    valid_from: NaiveDate,
    valid_to: NaiveDate,
) -> ValidationResult<()> {
    validate_required("prefix", prefix)?;
    if prefix.len() > MAX_PREFIX_LEN {
        return Err(ValidationError::TooLong {
            field: "prefix".to_string(),
            max: MAX_PREFIX_LEN,
        });
    }

    if initial < 1 || final_correlative < initial {
        return Err(ValidationError::InvalidNumberingRange {
            reason: format!("{}..={} is not a valid range", initial, final_correlative),
        });
    }

    if valid_to < valid_from {
        return Err(ValidationError::InvalidNumberingRange {
            reason: format!("valid_to {} precedes valid_from {}", valid_to, valid_from),
        });
    }

    Ok(())
}

// =============================================================================
// Command Validators
// =============================================================================

/// Validates one cart line; `index` is zero-based.
pub fn validate_line(index: usize, line: &CartLine) -> ValidationResult<()> {
    let check = || -> ValidationResult<()> {
        validate_uuid("product_id", &line.product_id)?;
        validate_quantity(line.quantity)?;
        validate_price_cents(line.unit_price_cents)?;
        validate_required("tax_id", &line.tax_id)?;
        validate_tax_rate_bps(line.tax_rate.bps())?;
        Ok(())
    };

    check().map_err(|err| ValidationError::InvalidLine {
        line: index + 1,
        reason: err.to_string(),
    })
}

fn validate_tender(tender: &Tender) -> ValidationResult<()> {
    validate_required("payment_type_id", &tender.payment_type_id)?;
    validate_payment_amount(tender.amount_cents)
}

/// Validates the shape of an issuance command.
///
/// Runs before anything touches the database; a failure here has no side
/// effects. Reference existence is checked later, inside the transaction.
pub fn validate_command(command: &IssueInvoiceCommand) -> ValidationResult<()> {
    validate_cart_size(command.lines.len())?;
    validate_uuid("customer_id", &command.customer_id)?;
    validate_uuid("authorization_id", &command.authorization_id)?;
    validate_uuid("user_id", &command.session.user_id)?;

    if let Some(register) = &command.session.cash_register_id {
        validate_required("cash_register_id", register)?;
    }

    if let Some(discount) = &command.discount {
        validate_uuid("discount_id", &discount.discount_id)?;
        validate_discount_bps(discount.percentage_bps)?;
    }

    for (index, line) in command.lines.iter().enumerate() {
        validate_line(index, line)?;
    }

    if command.payments.len() > MAX_TENDERS {
        return Err(ValidationError::OutOfRange {
            field: "payments".to_string(),
            min: 0,
            max: MAX_TENDERS as i64,
        });
    }

    for tender in &command.payments {
        validate_tender(tender)?;
    }

    if let Some(days) = command.credit_days.filter(|_| command.is_credit) {
        validate_credit_days(days)?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
