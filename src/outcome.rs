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

//! Outcomes of the mutating engine operations.
//!
//! Expected failures (validation, missing entities, lending rules) and
//! collaborator faults are both reported as a `Failure` value. Callers should
//! branch on [`is_success`](BorrowOutcome::is_success) rather than on message text.

use crate::error::{ErrorKind, LendingError};
use crate::loan::Loan;

const BORROWED: &str = "Book borrowed successfully";
const RETURNED: &str = "Book returned successfully";

/// Builds the user-facing message for a rejected operation.
///
/// Collaborator faults are prefixed with what was being attempted.
fn failure_message(action: &str, error: &LendingError) -> String {
    match error.kind() {
        ErrorKind::Fault => format!("Failed to {action}: {error}"),
        _ => error.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BorrowOutcome {
    Success { loan: Loan },
    Failure { error: LendingError, message: String },
}

impl BorrowOutcome {
    pub(crate) fn success(loan: Loan) -> Self {
        Self::Success { loan }
    }

    pub(crate) fn failure(error: LendingError) -> Self {
        let message = failure_message("borrow book", &error);
        Self::Failure { error, message }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Success { .. } => BORROWED,
            Self::Failure { message, .. } => message,
        }
    }

    /// The created loan, if the borrow went through.
    pub fn loan(&self) -> Option<&Loan> {
        match self {
            Self::Success { loan } => Some(loan),
            Self::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&LendingError> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error, .. } => Some(error),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnOutcome {
    /// Carries the loan that was closed.
    Success { loan: Loan },
    Failure { error: LendingError, message: String },
}

impl ReturnOutcome {
    pub(crate) fn success(loan: Loan) -> Self {
        Self::Success { loan }
    }

    pub(crate) fn failure(error: LendingError) -> Self {
        let message = failure_message("return book", &error);
        Self::Failure { error, message }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Success { .. } => RETURNED,
            Self::Failure { message, .. } => message,
        }
    }

    pub fn loan(&self) -> Option<&Loan> {
        match self {
            Self::Success { loan } => Some(loan),
            Self::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&LendingError> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error, .. } => Some(error),
        }
    }
}
