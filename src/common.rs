/// Common types and utilities shared across services
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use rust_decimal::{Decimal, RoundingStrategy};
use std::sync::Arc;

use crate::errors::{field_error, ServiceError};

/// Number of decimal places money is kept at.
pub const MONEY_SCALE: u32 = 2;

/// Source of local wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }

    /// Current time truncated to hours:minutes (24-hour).
    fn time_of_day(&self) -> NaiveTime {
        let now = self.now().time();
        NaiveTime::from_hms_opt(now.hour(), now.minute(), 0).unwrap_or(now)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock pinned to a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

pub type SharedClock = Arc<dyn Clock>;

pub fn system_clock() -> SharedClock {
    Arc::new(SystemClock)
}

/// Rounds a money amount to cents, halves away from zero.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Error for an amount that does not fit in a `Decimal`.
pub(crate) fn out_of_range(field: &'static str) -> ServiceError {
    field_error(
        field,
        "overflow",
        format!("{} exceeds the supported decimal range", field),
    )
}

/// Sums amounts, failing with a validation error instead of overflowing.
pub fn checked_sum<I>(amounts: I, field: &'static str) -> Result<Decimal, ServiceError>
where
    I: IntoIterator<Item = Decimal>,
{
    amounts.into_iter().try_fold(Decimal::ZERO, |sum, amount| {
        sum.checked_add(amount).ok_or_else(|| out_of_range(field))
    })
}

/// Formats a money amount for display, e.g. `$17,400.00`.
pub fn format_money(symbol: &str, amount: Decimal) -> String {
    let rounded = round_money(amount);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = format!("{:.2}", rounded.abs());
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!(
        "{}{}{}.{}",
        if negative { "-" } else { "" },
        symbol,
        grouped,
        cents
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_money_half_away_from_zero() {
        assert_eq!(round_money(dec!(10.005)), dec!(10.01));
        assert_eq!(round_money(dec!(10.004)), dec!(10.00));
        assert_eq!(round_money(dec!(-1.125)), dec!(-1.13));
    }

    #[test]
    fn test_format_money_groups_thousands() {
        assert_eq!(format_money("$", dec!(17400)), "$17,400.00");
        assert_eq!(format_money("$", dec!(125000.5)), "$125,000.50");
        assert_eq!(format_money("$", dec!(999)), "$999.00");
        assert_eq!(format_money("$", dec!(0)), "$0.00");
        assert_eq!(format_money("$", dec!(-2400)), "-$2,400.00");
    }

    #[test]
    fn test_checked_sum_reports_overflow() {
        assert_eq!(
            checked_sum(vec![dec!(1.5), dec!(2.25)], "total").unwrap(),
            dec!(3.75)
        );
        assert_eq!(checked_sum(Vec::new(), "total").unwrap(), Decimal::ZERO);

        let err = checked_sum(vec![Decimal::MAX, Decimal::ONE], "total").unwrap_err();
        assert_eq!(err.kind(), "validation_failed");
        assert!(err.to_string().contains("total"));
    }

    #[test]
    fn test_fixed_clock_truncates_seconds() {
        let at = NaiveDate::from_ymd_opt(2024, 12, 13)
            .unwrap()
            .and_hms_opt(7, 4, 59)
            .unwrap();
        let clock = FixedClock(at);
        assert_eq!(clock.time_of_day(), NaiveTime::from_hms_opt(7, 4, 0).unwrap());
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 12, 13).unwrap());
    }
}
