//! Storage abstraction for the circulation system

use async_trait::async_trait;

use crate::types::*;

/// Storage abstraction for circulation state
///
/// This trait allows the circulation core to work with any storage backend
/// (PostgreSQL, MySQL, SQLite, in-memory, etc.) by implementing these methods.
///
/// # Atomicity contract
///
/// [`commit_borrow`](CirculationStorage::commit_borrow) and
/// [`commit_return`](CirculationStorage::commit_return) are the two
/// transactional boundaries of the system: each must persist the copy-counter
/// mutation and the transaction row together or not at all, and must be
/// serialized per book (row lock, single mutex, or optimistic version check).
/// When two concurrent borrows contest the last copy of a book, exactly one
/// commit succeeds; the other observes
/// [`CirculationError::NoCopiesAvailable`].
#[async_trait]
pub trait CirculationStorage: Send + Sync {
    /// Save a book to storage
    async fn save_book(&mut self, book: &Book) -> CirculationResult<()>;

    /// Get a book by accession number
    async fn get_book(&self, book_id: &str) -> CirculationResult<Option<Book>>;

    /// List all books, optionally filtered by shelf status
    async fn list_books(&self, status: Option<BookStatus>) -> CirculationResult<Vec<Book>>;

    /// Update a book
    async fn update_book(&mut self, book: &Book) -> CirculationResult<()>;

    /// Save a student to storage
    async fn save_student(&mut self, student: &Student) -> CirculationResult<()>;

    /// Get a student by ID
    async fn get_student(&self, student_id: &str) -> CirculationResult<Option<Student>>;

    /// Update a student
    async fn update_student(&mut self, student: &Student) -> CirculationResult<()>;

    /// Get a transaction by ID
    async fn get_transaction(&self, transaction_id: &str)
        -> CirculationResult<Option<Transaction>>;

    /// Update a transaction in place (fine settlement, overdue promotion)
    ///
    /// The write must be guarded against stale snapshots, atomically with the
    /// write itself: reject with [`CirculationError::AlreadyReturned`] when
    /// the stored row is `Returned` and the update would make it active
    /// again, and with [`CirculationError::FineAlreadyPaid`] when the stored
    /// fine is settled and the update would unset it or alter its payment/
    /// waiver audit fields.
    async fn update_transaction(&mut self, transaction: &Transaction) -> CirculationResult<()>;

    /// List transactions for a student, optionally only the active ones
    async fn get_student_transactions(
        &self,
        student_id: &str,
        active_only: bool,
    ) -> CirculationResult<Vec<Transaction>>;

    /// List transactions for a book, optionally only the active ones
    async fn get_book_transactions(
        &self,
        book_id: &str,
        active_only: bool,
    ) -> CirculationResult<Vec<Transaction>>;

    /// List every active (borrowed or overdue) transaction
    async fn list_active_transactions(&self) -> CirculationResult<Vec<Transaction>>;

    /// Atomically check out one copy and record the transaction
    ///
    /// Re-reads the book under the backend's lock, re-runs the availability
    /// precondition, decrements `copies_available`, and persists book and
    /// transaction together. The student's active-loan count is also
    /// re-checked against `max_books_per_student` under the same lock, so two
    /// concurrent borrows cannot both slip past the capacity check. Returns
    /// the book as persisted.
    async fn commit_borrow(
        &mut self,
        book_id: &str,
        transaction: &Transaction,
        max_books_per_student: u32,
    ) -> CirculationResult<Book>;

    /// Atomically put one copy back and persist the returned transaction
    ///
    /// Re-reads the stored transaction under the backend's lock and fails
    /// with [`CirculationError::AlreadyReturned`] when it is already
    /// `Returned`, so two concurrent returns of the same loan commit exactly
    /// once. Performs the bounded increment (failing with
    /// [`CirculationError::AtMaximumCapacity`] on a counter inconsistency),
    /// applies the optional condition update, and persists book and
    /// transaction together. Returns the book as persisted.
    async fn commit_return(
        &mut self,
        transaction: &Transaction,
        condition: Option<BookCondition>,
    ) -> CirculationResult<Book>;
}
