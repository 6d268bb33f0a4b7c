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

//! Error types for lending operations, storage and fine policies.

use rust_decimal::Decimal;
use thiserror::Error;

/// Failures raised by a storage backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// An entity with the same ID is already stored
    #[error("{entity} '{id}' already exists")]
    Duplicate { entity: &'static str, id: String },

    /// Update targeted an ID the store does not hold
    #[error("{entity} '{id}' does not exist")]
    NotFound { entity: &'static str, id: String },

    /// Backend-specific failure (I/O, connection, corruption, ...)
    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Failures raised by a fine policy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FineError {
    /// Daily rate is below zero
    #[error("daily fine rate must not be negative (got {0})")]
    NegativeRate(Decimal),

    /// Due date or fine amount does not fit the numeric range
    #[error("fine calculation overflowed")]
    Overflow,
}

/// Configuration loading and validation errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Broad category of a [`LendingError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required identifier was blank; detected before any storage access.
    Validation,
    /// A member, book or loan is absent from its store.
    NotFound,
    /// The request breaks a lending rule.
    BusinessRule,
    /// A store or fine policy failed unexpectedly.
    Fault,
}

/// Reasons a lending operation is rejected.
///
/// Display strings are user-facing and stable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LendingError {
    #[error("Member ID cannot be null or empty")]
    BlankMemberId,

    #[error("Book ID cannot be null or empty")]
    BlankBookId,

    #[error("Loan ID cannot be null or empty")]
    BlankLoanId,

    #[error("Member not found")]
    MemberNotFound,

    #[error("Book not found")]
    BookNotFound,

    #[error("Loan not found")]
    LoanNotFound,

    #[error("Book is not available")]
    BookUnavailable,

    #[error("Member has reached maximum borrowing limit of {max} books")]
    BorrowLimitReached { max: usize },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Fine(#[from] FineError),
}

impl LendingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::BlankMemberId | Self::BlankBookId | Self::BlankLoanId => ErrorKind::Validation,
            Self::MemberNotFound | Self::BookNotFound | Self::LoanNotFound => ErrorKind::NotFound,
            Self::BookUnavailable | Self::BorrowLimitReached { .. } => ErrorKind::BusinessRule,
            Self::Store(_) | Self::Fine(_) => ErrorKind::Fault,
        }
    }
}
