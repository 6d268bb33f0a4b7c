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

//! Thread-safe in-memory stores.
//!
//! Reference implementations of the storage contracts in [`crate::store`].
//!
//! | Operation | Missing ID | Existing ID |
//! |-----------|------------|-------------|
//! | `save` | inserts | [`StoreError::Duplicate`] |
//! | `update` | [`StoreError::NotFound`] | replaces, keeps position |
//! | `delete` | no-op | removes |
//!
//! Listings come back in insertion order.

use crate::base::{BookId, LoanId, MemberId};
use crate::book::Book;
use crate::error::StoreError;
use crate::loan::Loan;
use crate::member::Member;
use crate::store::{BookStore, LoanStore, MemberStore};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};

/// Keyed table that remembers insertion order.
///
/// Each entry is stamped with a monotonically increasing sequence number on
/// insert; listings sort by it.
#[derive(Debug)]
struct Table<K, V>
where
    K: Eq + Hash,
{
    entity: &'static str,
    rows: DashMap<K, (u64, V)>,
    next_seq: AtomicU64,
}

impl<K, V> Table<K, V>
where
    K: Eq + Hash + Clone + ToString,
    V: Clone,
{
    fn new(entity: &'static str) -> Self {
        Self {
            entity,
            rows: DashMap::new(),
            next_seq: AtomicU64::new(0),
        }
    }

    fn insert(&self, key: K, value: V) -> Result<(), StoreError> {
        // Entry API keeps the check-and-insert atomic
        match self.rows.entry(key) {
            Entry::Occupied(entry) => Err(StoreError::Duplicate {
                entity: self.entity,
                id: entry.key().to_string(),
            }),
            Entry::Vacant(entry) => {
                let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
                entry.insert((seq, value));
                Ok(())
            }
        }
    }

    fn get(&self, key: &K) -> Option<V> {
        self.rows.get(key).map(|row| row.1.clone())
    }

    fn replace(&self, key: &K, value: V) -> Result<(), StoreError> {
        match self.rows.get_mut(key) {
            Some(mut row) => {
                row.1 = value;
                Ok(())
            }
            None => Err(StoreError::NotFound {
                entity: self.entity,
                id: key.to_string(),
            }),
        }
    }

    fn remove(&self, key: &K) {
        self.rows.remove(key);
    }

    fn list_where(&self, keep: impl Fn(&V) -> bool) -> Vec<V> {
        let mut rows: Vec<(u64, V)> = self
            .rows
            .iter()
            .filter(|row| keep(&row.1))
            .map(|row| (row.0, row.1.clone()))
            .collect();
        rows.sort_unstable_by_key(|(seq, _)| *seq);
        rows.into_iter().map(|(_, value)| value).collect()
    }

    fn len(&self) -> usize {
        self.rows.len()
    }
}

#[derive(Debug)]
pub struct InMemoryBookStore {
    table: Table<BookId, Book>,
}

impl InMemoryBookStore {
    pub fn new() -> Self {
        Self {
            table: Table::new("book"),
        }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryBookStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BookStore for InMemoryBookStore {
    fn save(&self, book: Book) -> Result<(), StoreError> {
        self.table.insert(book.id().clone(), book)
    }

    fn find_by_id(&self, id: &BookId) -> Result<Option<Book>, StoreError> {
        Ok(self.table.get(id))
    }

    fn update(&self, book: Book) -> Result<(), StoreError> {
        let id = book.id().clone();
        self.table.replace(&id, book)
    }

    fn delete(&self, id: &BookId) -> Result<(), StoreError> {
        self.table.remove(id);
        Ok(())
    }

    fn find_all(&self) -> Result<Vec<Book>, StoreError> {
        Ok(self.table.list_where(|_| true))
    }
}

#[derive(Debug)]
pub struct InMemoryMemberStore {
    table: Table<MemberId, Member>,
}

impl InMemoryMemberStore {
    pub fn new() -> Self {
        Self {
            table: Table::new("member"),
        }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryMemberStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemberStore for InMemoryMemberStore {
    fn save(&self, member: Member) -> Result<(), StoreError> {
        self.table.insert(member.id().clone(), member)
    }

    fn find_by_id(&self, id: &MemberId) -> Result<Option<Member>, StoreError> {
        Ok(self.table.get(id))
    }

    fn update(&self, member: Member) -> Result<(), StoreError> {
        let id = member.id().clone();
        self.table.replace(&id, member)
    }

    fn delete(&self, id: &MemberId) -> Result<(), StoreError> {
        self.table.remove(id);
        Ok(())
    }

    fn find_all(&self) -> Result<Vec<Member>, StoreError> {
        Ok(self.table.list_where(|_| true))
    }
}

#[derive(Debug)]
pub struct InMemoryLoanStore {
    table: Table<LoanId, Loan>,
}

impl InMemoryLoanStore {
    pub fn new() -> Self {
        Self {
            table: Table::new("loan"),
        }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryLoanStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LoanStore for InMemoryLoanStore {
    fn save(&self, loan: Loan) -> Result<(), StoreError> {
        self.table.insert(loan.id().clone(), loan)
    }

    fn find_by_id(&self, id: &LoanId) -> Result<Option<Loan>, StoreError> {
        Ok(self.table.get(id))
    }

    fn update(&self, loan: Loan) -> Result<(), StoreError> {
        let id = loan.id().clone();
        self.table.replace(&id, loan)
    }

    fn delete(&self, id: &LoanId) -> Result<(), StoreError> {
        self.table.remove(id);
        Ok(())
    }

    fn find_all(&self) -> Result<Vec<Loan>, StoreError> {
        Ok(self.table.list_where(|_| true))
    }

    fn find_by_member_id(&self, member_id: &MemberId) -> Result<Vec<Loan>, StoreError> {
        Ok(self.table.list_where(|loan| loan.member_id() == member_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_rejects_duplicate_keys() {
        let table: Table<BookId, u32> = Table::new("book");
        table.insert(BookId::new("B1"), 1).unwrap();
        assert_eq!(
            table.insert(BookId::new("B1"), 2),
            Err(StoreError::Duplicate {
                entity: "book",
                id: "B1".into()
            })
        );
        assert_eq!(table.get(&BookId::new("B1")), Some(1));
    }

    #[test]
    fn table_replace_keeps_position() {
        let table: Table<BookId, u32> = Table::new("book");
        table.insert(BookId::new("B1"), 1).unwrap();
        table.insert(BookId::new("B2"), 2).unwrap();
        table.replace(&BookId::new("B1"), 10).unwrap();
        assert_eq!(table.list_where(|_| true), vec![10, 2]);
    }

    #[test]
    fn table_replace_missing_reports_not_found() {
        let table: Table<BookId, u32> = Table::new("book");
        assert_eq!(
            table.replace(&BookId::new("B9"), 1),
            Err(StoreError::NotFound {
                entity: "book",
                id: "B9".into()
            })
        );
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn reinserted_key_moves_to_end() {
        let table: Table<BookId, u32> = Table::new("book");
        table.insert(BookId::new("B1"), 1).unwrap();
        table.insert(BookId::new("B2"), 2).unwrap();
        table.remove(&BookId::new("B1"));
        table.insert(BookId::new("B1"), 3).unwrap();
        assert_eq!(table.list_where(|_| true), vec![2, 3]);
    }
}
