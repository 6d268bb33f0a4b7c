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

//! Storage contracts consumed by the lending engine.
//!
//! The engine only ever talks to these traits. Any backend (in-memory, file,
//! database) can be plugged in as long as it honors the following rules:
//!
//! - `find_by_id` on a missing ID returns `Ok(None)`, never an error.
//! - `find_all` and `find_by_member_id` return an empty `Vec` when nothing matches.
//! - Every `Err` is treated by the engine as an unexpected collaborator fault.
//!
//! How `save` on an existing ID and `update`/`delete` on a missing ID behave is
//! left to the backend, which must document it. See [`crate::memory`] for the
//! reference behavior.

use crate::base::{BookId, LoanId, MemberId};
use crate::book::Book;
use crate::error::StoreError;
use crate::loan::Loan;
use crate::member::Member;

pub trait BookStore: Send + Sync {
    fn save(&self, book: Book) -> Result<(), StoreError>;
    fn find_by_id(&self, id: &BookId) -> Result<Option<Book>, StoreError>;
    fn update(&self, book: Book) -> Result<(), StoreError>;
    fn delete(&self, id: &BookId) -> Result<(), StoreError>;
    fn find_all(&self) -> Result<Vec<Book>, StoreError>;
}

pub trait MemberStore: Send + Sync {
    fn save(&self, member: Member) -> Result<(), StoreError>;
    fn find_by_id(&self, id: &MemberId) -> Result<Option<Member>, StoreError>;
    fn update(&self, member: Member) -> Result<(), StoreError>;
    fn delete(&self, id: &MemberId) -> Result<(), StoreError>;
    fn find_all(&self) -> Result<Vec<Member>, StoreError>;
}

pub trait LoanStore: Send + Sync {
    fn save(&self, loan: Loan) -> Result<(), StoreError>;
    fn find_by_id(&self, id: &LoanId) -> Result<Option<Loan>, StoreError>;
    fn update(&self, loan: Loan) -> Result<(), StoreError>;
    fn delete(&self, id: &LoanId) -> Result<(), StoreError>;
    fn find_all(&self) -> Result<Vec<Loan>, StoreError>;

    /// Active loans held by `member_id`, in store order.
    fn find_by_member_id(&self, member_id: &MemberId) -> Result<Vec<Loan>, StoreError>;
}
