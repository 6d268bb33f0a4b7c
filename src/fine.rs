// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Overdue fine policies.
//!
//! A policy is anything implementing [`FineCalculator`]. The engine receives one
//! at construction and never inspects which one it got.
//!
//! # Example
//!
//! ```
//! use chrono::{Duration, Utc};
//! use library_lending::{DailyRateFine, FineCalculator, Loan};
//! use rust_decimal_macros::dec;
//!
//! let borrowed_at = Utc::now();
//! let loan = Loan::new("L1", "M1", "B1", borrowed_at);
//! let now = borrowed_at + Duration::days(20);
//!
//! assert_eq!(DailyRateFine::standard().calculate_fine(&loan, 14, now).unwrap(), dec!(3.00));
//! assert_eq!(DailyRateFine::student().calculate_fine(&loan, 14, now).unwrap(), dec!(1.50));
//! ```

use crate::error::FineError;
use crate::loan::Loan;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Computes the fine owed on a loan at a given instant.
pub trait FineCalculator: Send + Sync {
    /// Returns a non-negative amount; zero while `now` is at or before
    /// `borrowed_at + loan_duration_days`.
    fn calculate_fine(
        &self,
        loan: &Loan,
        loan_duration_days: u32,
        now: DateTime<Utc>,
    ) -> Result<Decimal, FineError>;
}

/// Charges a flat amount per whole overdue day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyRateFine {
    daily_rate: Decimal,
}

impl DailyRateFine {
    pub const STANDARD_DAILY_RATE: Decimal = dec!(0.50);
    pub const STUDENT_DAILY_RATE: Decimal = dec!(0.25);

    pub fn new(daily_rate: Decimal) -> Result<Self, FineError> {
        if daily_rate < Decimal::ZERO {
            return Err(FineError::NegativeRate(daily_rate));
        }
        Ok(Self { daily_rate })
    }

    pub fn standard() -> Self {
        Self {
            daily_rate: Self::STANDARD_DAILY_RATE,
        }
    }

    /// Discounted policy at half the standard rate.
    pub fn student() -> Self {
        Self {
            daily_rate: Self::STUDENT_DAILY_RATE,
        }
    }

    pub fn daily_rate(&self) -> Decimal {
        self.daily_rate
    }
}

impl FineCalculator for DailyRateFine {
    fn calculate_fine(
        &self,
        loan: &Loan,
        loan_duration_days: u32,
        now: DateTime<Utc>,
    ) -> Result<Decimal, FineError> {
        let overdue_days = loan.overdue_days(loan_duration_days, now)?;
        if overdue_days == 0 {
            return Ok(Decimal::ZERO);
        }
        Decimal::from(overdue_days)
            .checked_mul(self.daily_rate)
            .ok_or(FineError::Overflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn borrowed_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 10, 12, 0, 0).unwrap()
    }

    fn loan() -> Loan {
        Loan::new("L1", "M1", "B1", borrowed_at())
    }

    #[test]
    fn no_fine_within_loan_period() {
        let policy = DailyRateFine::standard();
        let now = borrowed_at() + Duration::days(14);
        assert_eq!(policy.calculate_fine(&loan(), 14, now).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn standard_charges_fifty_cents_per_day() {
        let policy = DailyRateFine::standard();
        let now = borrowed_at() + Duration::days(20);
        assert_eq!(policy.calculate_fine(&loan(), 14, now).unwrap(), dec!(3.00));
    }

    #[test]
    fn student_charges_half() {
        let policy = DailyRateFine::student();
        let now = borrowed_at() + Duration::days(20);
        assert_eq!(policy.calculate_fine(&loan(), 14, now).unwrap(), dec!(1.50));
    }

    #[test]
    fn partial_day_is_not_charged() {
        let policy = DailyRateFine::standard();
        let now = borrowed_at() + Duration::days(15) + Duration::hours(23);
        assert_eq!(policy.calculate_fine(&loan(), 14, now).unwrap(), dec!(0.50));
    }

    #[test]
    fn custom_rate() {
        let policy = DailyRateFine::new(dec!(1.25)).unwrap();
        let now = borrowed_at() + Duration::days(10);
        assert_eq!(policy.calculate_fine(&loan(), 7, now).unwrap(), dec!(3.75));
    }

    #[test]
    fn zero_rate_never_fines() {
        let policy = DailyRateFine::new(Decimal::ZERO).unwrap();
        let now = borrowed_at() + Duration::days(400);
        assert_eq!(policy.calculate_fine(&loan(), 14, now).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn negative_rate_rejected() {
        assert_eq!(
            DailyRateFine::new(dec!(-0.01)),
            Err(FineError::NegativeRate(dec!(-0.01)))
        );
    }

    #[test]
    fn rate_constants() {
        assert_eq!(DailyRateFine::standard().daily_rate(), dec!(0.50));
        assert_eq!(DailyRateFine::student().daily_rate(), dec!(0.25));
        assert_eq!(
            DailyRateFine::STUDENT_DAILY_RATE * dec!(2),
            DailyRateFine::STANDARD_DAILY_RATE
        );
    }
}
