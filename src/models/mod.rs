//! Typed records for every entity kind tracked by the dashboard.

use rust_decimal::Decimal;
use validator::ValidationError;

pub mod attendance;
pub mod cart;
pub mod chemical;
pub mod invoice;
pub mod worker;

pub use attendance::{AttendanceMark, AttendanceStatus};
pub use cart::{Cart, CartStatus};
pub use chemical::{Chemical, StockStatus};
pub use invoice::{Invoice, InvoiceDraft, InvoiceStatus, LineItem, LineItemDraft};
pub use worker::{Shift, Worker, WorkerStatus};

/// Rejects zero and negative amounts.
pub(crate) fn validate_positive(value: &Decimal) -> Result<(), ValidationError> {
    if *value > Decimal::ZERO {
        Ok(())
    } else {
        let mut err = ValidationError::new("positive");
        err.message = Some(format!("must be greater than zero, got {}", value).into());
        Err(err)
    }
}

/// Rejects negative amounts.
pub(crate) fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        let mut err = ValidationError::new("non_negative");
        err.message = Some(format!("must not be negative, got {}", value).into());
        Err(err)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_validate_positive() {
        assert!(validate_positive(&dec!(0.01)).is_ok());
        assert!(validate_positive(&Decimal::ZERO).is_err());
        assert!(validate_positive(&dec!(-5)).is_err());
    }

    #[test]
    fn test_validate_non_negative() {
        assert!(validate_non_negative(&Decimal::ZERO).is_ok());
        assert!(validate_non_negative(&dec!(12.5)).is_ok());
        assert!(validate_non_negative(&dec!(-0.01)).is_err());
    }
}
