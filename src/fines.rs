//! Overdue fine calculation engine
//!
//! Pure, deterministic arithmetic: the same inputs always produce the same
//! fine and the same auditable breakdown. No clock access happens here; the
//! caller supplies the reference date.

use bigdecimal::{BigDecimal, RoundingMode};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Whole days between due date and reference date, floored at zero
///
/// A reference date on or before the due date (book not yet due) yields zero.
pub fn days_overdue(due_date: NaiveDate, reference_date: NaiveDate) -> i64 {
    (reference_date - due_date).num_days().max(0)
}

/// Detailed fine calculation breakdown for audit display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FineBreakdown {
    pub due_date: NaiveDate,
    /// Reference date the fine was assessed against (return date at return time)
    pub return_date: NaiveDate,
    pub days_overdue: i64,
    pub grace_period_days: i64,
    /// Overdue days minus grace period, floored at zero
    pub chargeable_days: i64,
    pub fine_per_day: BigDecimal,
    /// Human-readable formula, e.g. `4 chargeable days x 5.00 per day = 20.00`
    pub formula: String,
    /// Final fine, rounded half-up to two decimal places
    pub fine: BigDecimal,
}

impl FineBreakdown {
    /// Calculate the fine for a transaction returned (or assessed) on
    /// `reference_date`
    ///
    /// ```
    /// use bigdecimal::BigDecimal;
    /// use chrono::NaiveDate;
    /// use circulation_core::fines::FineBreakdown;
    /// use std::str::FromStr;
    ///
    /// let breakdown = FineBreakdown::calculate(
    ///     NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
    ///     NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
    ///     &BigDecimal::from_str("5.00").unwrap(),
    ///     1,
    /// );
    /// assert_eq!(breakdown.days_overdue, 5);
    /// assert_eq!(breakdown.chargeable_days, 4);
    /// assert_eq!(breakdown.fine, BigDecimal::from_str("20.00").unwrap());
    /// ```
    pub fn calculate(
        due_date: NaiveDate,
        reference_date: NaiveDate,
        fine_per_day: &BigDecimal,
        grace_period_days: i64,
    ) -> Self {
        let days_overdue = days_overdue(due_date, reference_date);
        let chargeable_days = (days_overdue - grace_period_days).max(0);

        let fine = (BigDecimal::from(chargeable_days) * fine_per_day)
            .with_scale_round(2, RoundingMode::HalfUp);

        let formula = format!(
            "{} chargeable days x {} per day = {}",
            chargeable_days, fine_per_day, fine
        );

        Self {
            due_date,
            return_date: reference_date,
            days_overdue,
            grace_period_days,
            chargeable_days,
            fine_per_day: fine_per_day.clone(),
            formula,
            fine,
        }
    }

    /// Whether the breakdown produced no fine (on time or within grace)
    pub fn is_zero(&self) -> bool {
        self.fine == BigDecimal::from(0)
    }
}
