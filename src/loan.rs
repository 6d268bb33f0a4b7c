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

//! Active loans.
//!
//! A [`Loan`] links a member to a borrowed book. It only exists while the book
//! is out; returning the book deletes the loan, no history is kept.

use crate::base::{BookId, LoanId, MemberId};
use crate::error::FineError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    id: LoanId,
    member_id: MemberId,
    book_id: BookId,
    borrowed_at: DateTime<Utc>,
}

impl Loan {
    pub fn new(
        id: impl Into<LoanId>,
        member_id: impl Into<MemberId>,
        book_id: impl Into<BookId>,
        borrowed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            member_id: member_id.into(),
            book_id: book_id.into(),
            borrowed_at,
        }
    }

    pub fn id(&self) -> &LoanId {
        &self.id
    }

    pub fn member_id(&self) -> &MemberId {
        &self.member_id
    }

    pub fn book_id(&self) -> &BookId {
        &self.book_id
    }

    pub fn borrowed_at(&self) -> DateTime<Utc> {
        self.borrowed_at
    }

    /// Instant after which the loan counts as overdue.
    pub fn due_at(&self, loan_duration_days: u32) -> Result<DateTime<Utc>, FineError> {
        Duration::try_days(i64::from(loan_duration_days))
            .and_then(|duration| self.borrowed_at.checked_add_signed(duration))
            .ok_or(FineError::Overflow)
    }

    /// Whole days elapsed between the due date and `now`.
    ///
    /// Partial days are truncated toward zero; the result is never negative.
    pub fn overdue_days(
        &self,
        loan_duration_days: u32,
        now: DateTime<Utc>,
    ) -> Result<i64, FineError> {
        let due_at = self.due_at(loan_duration_days)?;
        if now <= due_at {
            return Ok(0);
        }
        Ok((now - due_at).num_days().max(0))
    }
}
