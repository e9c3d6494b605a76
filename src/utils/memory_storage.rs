//! In-memory storage implementation for testing and development

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::inventory;
use crate::traits::CirculationStorage;
use crate::types::*;

#[derive(Debug, Default)]
struct StoreInner {
    books: HashMap<String, Book>,
    students: HashMap<String, Student>,
    transactions: HashMap<String, Transaction>,
}

/// In-memory circulation storage
///
/// One lock covers the whole store: the write guard taken by `commit_borrow`
/// and `commit_return` is what makes the counter mutation and the transaction
/// row land together, and what serializes concurrent borrows on the same
/// book. Clones share the underlying store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<RwLock<StoreInner>>,
}

impl MemoryStorage {
    /// Create a new memory storage instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) {
        let mut inner = self.inner.write().unwrap();
        inner.books.clear();
        inner.students.clear();
        inner.transactions.clear();
    }
}

#[async_trait]
impl CirculationStorage for MemoryStorage {
    async fn save_book(&mut self, book: &Book) -> CirculationResult<()> {
        self.inner
            .write()
            .unwrap()
            .books
            .insert(book.id.clone(), book.clone());
        Ok(())
    }

    async fn get_book(&self, book_id: &str) -> CirculationResult<Option<Book>> {
        Ok(self.inner.read().unwrap().books.get(book_id).cloned())
    }

    async fn list_books(&self, status: Option<BookStatus>) -> CirculationResult<Vec<Book>> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .books
            .values()
            .filter(|book| status.as_ref().is_none_or(|s| &book.status == s))
            .cloned()
            .collect())
    }

    async fn update_book(&mut self, book: &Book) -> CirculationResult<()> {
        let mut inner = self.inner.write().unwrap();
        if inner.books.contains_key(&book.id) {
            inner.books.insert(book.id.clone(), book.clone());
            Ok(())
        } else {
            Err(CirculationError::BookNotFound(book.id.clone()))
        }
    }

    async fn save_student(&mut self, student: &Student) -> CirculationResult<()> {
        self.inner
            .write()
            .unwrap()
            .students
            .insert(student.id.clone(), student.clone());
        Ok(())
    }

    async fn get_student(&self, student_id: &str) -> CirculationResult<Option<Student>> {
        Ok(self.inner.read().unwrap().students.get(student_id).cloned())
    }

    async fn update_student(&mut self, student: &Student) -> CirculationResult<()> {
        let mut inner = self.inner.write().unwrap();
        if inner.students.contains_key(&student.id) {
            inner.students.insert(student.id.clone(), student.clone());
            Ok(())
        } else {
            Err(CirculationError::StudentNotFound(student.id.clone()))
        }
    }

    async fn get_transaction(
        &self,
        transaction_id: &str,
    ) -> CirculationResult<Option<Transaction>> {
        Ok(self
            .inner
            .read()
            .unwrap()
            .transactions
            .get(transaction_id)
            .cloned())
    }

    async fn update_transaction(&mut self, transaction: &Transaction) -> CirculationResult<()> {
        let mut inner = self.inner.write().unwrap();
        let stored = inner.transactions.get(&transaction.id).ok_or_else(|| {
            CirculationError::TransactionNotFound(transaction.id.clone())
        })?;

        // Guards run under the same write lock as the insert, so a stale
        // snapshot can never reopen a returned transaction or overwrite a
        // settled fine's audit fields.
        if stored.status == TransactionStatus::Returned
            && transaction.status != TransactionStatus::Returned
        {
            return Err(CirculationError::AlreadyReturned(transaction.id.clone()));
        }
        if stored.fine_paid
            && (!transaction.fine_paid
                || transaction.payment_amount != stored.payment_amount
                || transaction.payment_method != stored.payment_method
                || transaction.waive_reason != stored.waive_reason)
        {
            return Err(CirculationError::FineAlreadyPaid(transaction.id.clone()));
        }

        inner
            .transactions
            .insert(transaction.id.clone(), transaction.clone());
        Ok(())
    }

    async fn get_student_transactions(
        &self,
        student_id: &str,
        active_only: bool,
    ) -> CirculationResult<Vec<Transaction>> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .transactions
            .values()
            .filter(|txn| txn.student_id == student_id && (!active_only || txn.is_active()))
            .cloned()
            .collect())
    }

    async fn get_book_transactions(
        &self,
        book_id: &str,
        active_only: bool,
    ) -> CirculationResult<Vec<Transaction>> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .transactions
            .values()
            .filter(|txn| txn.book_id == book_id && (!active_only || txn.is_active()))
            .cloned()
            .collect())
    }

    async fn list_active_transactions(&self) -> CirculationResult<Vec<Transaction>> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .transactions
            .values()
            .filter(|txn| txn.is_active())
            .cloned()
            .collect())
    }

    async fn commit_borrow(
        &mut self,
        book_id: &str,
        transaction: &Transaction,
        max_books_per_student: u32,
    ) -> CirculationResult<Book> {
        // Single write guard: precondition re-checks, counter decrement, and
        // transaction insert are one atomic unit.
        let mut inner = self.inner.write().unwrap();

        let mut book = inner
            .books
            .get(book_id)
            .cloned()
            .ok_or_else(|| CirculationError::BookNotFound(book_id.to_string()))?;

        if book.status != BookStatus::Available {
            return Err(CirculationError::BookUnavailable(book.id));
        }

        let active = inner
            .transactions
            .values()
            .filter(|t| t.student_id == transaction.student_id && t.is_active())
            .count();
        if active >= max_books_per_student as usize {
            return Err(CirculationError::EligibilityDenied(
                DenialReason::AtCapacity,
            ));
        }

        inventory::checkout_copy(&mut book)?;

        inner.books.insert(book.id.clone(), book.clone());
        inner
            .transactions
            .insert(transaction.id.clone(), transaction.clone());
        Ok(book)
    }

    async fn commit_return(
        &mut self,
        transaction: &Transaction,
        condition: Option<BookCondition>,
    ) -> CirculationResult<Book> {
        let mut inner = self.inner.write().unwrap();

        let stored = inner.transactions.get(&transaction.id).ok_or_else(|| {
            CirculationError::TransactionNotFound(transaction.id.clone())
        })?;
        // Re-check under the lock: a concurrent return may have already
        // committed, and a second increment would corrupt the counters.
        if stored.status == TransactionStatus::Returned {
            return Err(CirculationError::AlreadyReturned(transaction.id.clone()));
        }

        let mut book = inner
            .books
            .get(&transaction.book_id)
            .cloned()
            .ok_or_else(|| CirculationError::BookNotFound(transaction.book_id.clone()))?;

        inventory::return_copy(&mut book)?;
        if let Some(condition) = condition {
            book.condition = condition;
        }

        inner.books.insert(book.id.clone(), book.clone());
        inner
            .transactions
            .insert(transaction.id.clone(), transaction.clone());
        Ok(book)
    }
}
