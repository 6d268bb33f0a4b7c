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

//! Lending workflow engine.
//!
//! The [`LendingEngine`] is the central component that coordinates books,
//! members and loans. It validates requests, consults the stores, applies the
//! lending rules and writes state changes back through the stores.
//!
//! # Operations
//!
//! - **Borrow**: Creates a loan and marks the book as unavailable.
//! - **Return**: Deletes the loan and marks the book as available again.
//! - **Fines**: Delegates to the configured [`FineCalculator`].
//! - **Queries**: Available books, a member's loans, a single loan.
//! - **Registration**: Adds books to the catalog and members to the roll.
//!
//! # Failure handling
//!
//! Nothing escapes as an error. Mutating operations report failures through
//! [`BorrowOutcome`]/[`ReturnOutcome`] (or `false` for registration); queries
//! degrade to an empty or zero result.
//!
//! # Concurrency
//!
//! The engine holds no locks. A borrow issues two independent writes (save the
//! loan, then update the book); callers sharing an engine across threads must
//! serialize conflicting borrows themselves.

use crate::base::{BookId, LoanId, MemberId, is_blank};
use crate::book::Book;
use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::error::{ErrorKind, LendingError};
use crate::fine::FineCalculator;
use crate::loan::Loan;
use crate::member::Member;
use crate::outcome::{BorrowOutcome, ReturnOutcome};
use crate::store::{BookStore, LoanStore, MemberStore};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, warn};

/// Orchestrates lending over pluggable stores and a fine policy.
///
/// # Invariants
///
/// - A book is unavailable exactly while one active loan references it.
/// - A member never holds more than `max_books_per_member` active loans.
/// - The engine is the only writer of a book's availability flag.
pub struct LendingEngine {
    books: Arc<dyn BookStore>,
    members: Arc<dyn MemberStore>,
    loans: Arc<dyn LoanStore>,
    fines: Arc<dyn FineCalculator>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
}

impl LendingEngine {
    /// Creates an engine with the default [`EngineConfig`] and the system clock.
    pub fn new(
        books: Arc<dyn BookStore>,
        members: Arc<dyn MemberStore>,
        loans: Arc<dyn LoanStore>,
        fines: Arc<dyn FineCalculator>,
    ) -> Self {
        LendingEngine {
            books,
            members,
            loans,
            fines,
            clock: Arc::new(SystemClock),
            config: EngineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Lends a book to a member.
    ///
    /// Checks run in this order, the first failing one decides the outcome:
    ///
    /// | Check | Failure |
    /// |-------|---------|
    /// | member ID blank | [`LendingError::BlankMemberId`] |
    /// | book ID blank | [`LendingError::BlankBookId`] |
    /// | member exists | [`LendingError::MemberNotFound`] |
    /// | book exists | [`LendingError::BookNotFound`] |
    /// | book available | [`LendingError::BookUnavailable`] |
    /// | below borrow limit | [`LendingError::BorrowLimitReached`] |
    ///
    /// Store failures surface as [`LendingError::Store`].
    pub fn borrow(&self, member_id: &str, book_id: &str) -> BorrowOutcome {
        match self.try_borrow(member_id, book_id) {
            Ok(loan) => {
                debug!(loan_id = %loan.id(), member_id, book_id, "book borrowed");
                BorrowOutcome::success(loan)
            }
            Err(error) => {
                log_rejection("borrow", &error);
                BorrowOutcome::failure(error)
            }
        }
    }

    fn try_borrow(&self, member_id: &str, book_id: &str) -> Result<Loan, LendingError> {
        if is_blank(member_id) {
            return Err(LendingError::BlankMemberId);
        }
        if is_blank(book_id) {
            return Err(LendingError::BlankBookId);
        }
        let member_id = MemberId::new(member_id);
        let book_id = BookId::new(book_id);

        let member = self
            .members
            .find_by_id(&member_id)?
            .ok_or(LendingError::MemberNotFound)?;

        let mut book = self
            .books
            .find_by_id(&book_id)?
            .ok_or(LendingError::BookNotFound)?;

        if !book.is_available() {
            return Err(LendingError::BookUnavailable);
        }

        let max = self.config.max_books_per_member;
        if self.loans.find_by_member_id(member.id())?.len() >= max {
            return Err(LendingError::BorrowLimitReached { max });
        }

        let loan = Loan::new(LoanId::generate(), member_id, book_id, self.clock.now());
        self.loans.save(loan.clone())?;

        book.set_available(false);
        self.books.update(book)?;

        Ok(loan)
    }

    /// Closes a loan and puts the book back on the shelf.
    ///
    /// If the loaned book no longer exists in the catalog the loan is still
    /// closed.
    pub fn return_book(&self, loan_id: &str) -> ReturnOutcome {
        match self.try_return(loan_id) {
            Ok(loan) => {
                debug!(loan_id, book_id = %loan.book_id(), "book returned");
                ReturnOutcome::success(loan)
            }
            Err(error) => {
                log_rejection("return", &error);
                ReturnOutcome::failure(error)
            }
        }
    }

    fn try_return(&self, loan_id: &str) -> Result<Loan, LendingError> {
        if is_blank(loan_id) {
            return Err(LendingError::BlankLoanId);
        }
        let loan_id = LoanId::new(loan_id);

        let loan = self
            .loans
            .find_by_id(&loan_id)?
            .ok_or(LendingError::LoanNotFound)?;

        match self.books.find_by_id(loan.book_id())? {
            Some(mut book) => {
                book.set_available(true);
                self.books.update(book)?;
            }
            None => debug!(book_id = %loan.book_id(), "loaned book missing from catalog"),
        }

        self.loans.delete(&loan_id)?;
        Ok(loan)
    }

    /// Books that can currently be borrowed, in store order.
    pub fn get_available_books(&self) -> Vec<Book> {
        match self.books.find_all() {
            Ok(books) => books.into_iter().filter(Book::is_available).collect(),
            Err(error) => {
                warn!(%error, "listing books failed");
                Vec::new()
            }
        }
    }

    /// Active loans held by a member, in store order.
    pub fn get_member_loans(&self, member_id: &str) -> Vec<Loan> {
        if is_blank(member_id) {
            return Vec::new();
        }
        match self.loans.find_by_member_id(&MemberId::new(member_id)) {
            Ok(loans) => loans,
            Err(error) => {
                warn!(member_id, %error, "listing member loans failed");
                Vec::new()
            }
        }
    }

    /// Looks up a single active loan.
    pub fn find_loan(&self, loan_id: &str) -> Option<Loan> {
        if is_blank(loan_id) {
            return None;
        }
        match self.loans.find_by_id(&LoanId::new(loan_id)) {
            Ok(loan) => loan,
            Err(error) => {
                warn!(loan_id, %error, "loan lookup failed");
                None
            }
        }
    }

    /// Fine currently owed on a loan.
    ///
    /// Returns zero for blank or unknown loan IDs and when the store or the
    /// fine policy fails.
    pub fn calculate_fine(&self, loan_id: &str) -> Decimal {
        match self.try_calculate_fine(loan_id) {
            Ok(fine) => fine,
            Err(error) => {
                warn!(loan_id, %error, "fine calculation failed");
                Decimal::ZERO
            }
        }
    }

    fn try_calculate_fine(&self, loan_id: &str) -> Result<Decimal, LendingError> {
        if is_blank(loan_id) {
            return Ok(Decimal::ZERO);
        }
        let Some(loan) = self.loans.find_by_id(&LoanId::new(loan_id))? else {
            return Ok(Decimal::ZERO);
        };
        let fine = self.fines.calculate_fine(
            &loan,
            self.config.loan_duration_days,
            self.clock.now(),
        )?;
        Ok(fine)
    }

    /// Adds a book to the catalog.
    ///
    /// Accepts `Option<Book>` so an absent book is rejected rather than
    /// unrepresentable at the call site.
    pub fn add_book(&self, book: impl Into<Option<Book>>) -> bool {
        let Some(book) = book.into() else {
            return false;
        };
        if book.id().is_blank() {
            return false;
        }
        let book_id = book.id().clone();
        match self.books.save(book) {
            Ok(()) => {
                debug!(%book_id, "book added");
                true
            }
            Err(error) => {
                warn!(%book_id, %error, "adding book failed");
                false
            }
        }
    }

    /// Registers a member.
    pub fn add_member(&self, member: impl Into<Option<Member>>) -> bool {
        let Some(member) = member.into() else {
            return false;
        };
        if member.id().is_blank() {
            return false;
        }
        let member_id = member.id().clone();
        match self.members.save(member) {
            Ok(()) => {
                debug!(%member_id, "member added");
                true
            }
            Err(error) => {
                warn!(%member_id, %error, "adding member failed");
                false
            }
        }
    }
}

fn log_rejection(operation: &'static str, error: &LendingError) {
    match error.kind() {
        ErrorKind::Fault => warn!(operation, %error, "collaborator fault"),
        _ => debug!(operation, %error, "request rejected"),
    }
}
