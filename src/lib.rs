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

//! # Library Lending
//!
//! This library provides a lending workflow engine for a library: it tracks
//! catalog books, members and active loans, and enforces the lending rules
//! (availability, per-member borrowing caps, overdue fines).
//!
//! ## Core Components
//!
//! - [`LendingEngine`]: Orchestrates borrow, return, fines and queries
//! - [`BookStore`], [`MemberStore`], [`LoanStore`]: Storage contracts the engine depends on
//! - [`FineCalculator`]: Pluggable overdue fine policy ([`DailyRateFine`])
//! - [`BorrowOutcome`], [`ReturnOutcome`]: Results of the mutating operations
//! - [`LendingError`]: Reasons a lending operation is rejected
//!
//! ## Example
//!
//! ```
//! use library_lending::{
//!     Book, DailyRateFine, InMemoryBookStore, InMemoryLoanStore, InMemoryMemberStore,
//!     LendingEngine, Member,
//! };
//! use rust_decimal::Decimal;
//! use std::sync::Arc;
//!
//! let engine = LendingEngine::new(
//!     Arc::new(InMemoryBookStore::new()),
//!     Arc::new(InMemoryMemberStore::new()),
//!     Arc::new(InMemoryLoanStore::new()),
//!     Arc::new(DailyRateFine::standard()),
//! );
//!
//! assert!(engine.add_book(Book::new("B1", "Dune", "Frank Herbert")));
//! assert!(engine.add_member(Member::new("M1", "Ada", "ada@example.com")));
//!
//! // Borrow a book
//! let outcome = engine.borrow("M1", "B1");
//! assert!(outcome.is_success());
//! let loan_id = outcome.loan().unwrap().id().to_string();
//! assert!(engine.get_available_books().is_empty());
//!
//! // Nothing is owed on a fresh loan
//! assert_eq!(engine.calculate_fine(&loan_id), Decimal::ZERO);
//!
//! // Return it
//! assert!(engine.return_book(&loan_id).is_success());
//! assert_eq!(engine.get_available_books().len(), 1);
//! ```
//!
//! ## Storage
//!
//! The engine never touches storage directly. [`memory`] ships thread-safe
//! in-memory stores; any other backend only needs to implement the traits in
//! [`store`].

mod base;
mod book;
pub mod clock;
pub mod config;
mod engine;
pub mod error;
pub mod fine;
mod loan;
pub mod memory;
mod member;
mod outcome;
pub mod store;

pub use base::{BookId, LoanId, MemberId};
pub use book::Book;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{Config, EngineConfig, FineConfig, FinePolicy};
pub use engine::LendingEngine;
pub use error::{ConfigError, ErrorKind, FineError, LendingError, StoreError};
pub use fine::{DailyRateFine, FineCalculator};
pub use loan::Loan;
pub use member::Member;
pub use memory::{InMemoryBookStore, InMemoryLoanStore, InMemoryMemberStore};
pub use outcome::{BorrowOutcome, ReturnOutcome};
pub use store::{BookStore, LoanStore, MemberStore};
