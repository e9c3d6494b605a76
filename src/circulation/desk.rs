//! Circulation desk orchestrator coordinating inventory, eligibility, fines,
//! and settlement

use bigdecimal::BigDecimal;
use chrono::{Duration, NaiveDate};
use tracing::{debug, info};

use crate::circulation::{EligibilityEvaluator, FineLedger};
use crate::fines::FineBreakdown;
use crate::settings::{CirculationPolicy, SettingsProvider};
use crate::traits::CirculationStorage;
use crate::types::*;
use crate::utils::validation::{validate_id, validate_non_empty};

/// Parameters for checking a book out
#[derive(Debug, Clone)]
pub struct BorrowRequest {
    pub student_id: String,
    pub book_id: String,
    pub librarian_id: String,
    /// Defaults to `borrowed_date + borrowing_period`
    pub due_date: Option<NaiveDate>,
    /// Defaults to today; set for backdated desk entry
    pub borrowed_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl BorrowRequest {
    pub fn new(student_id: String, book_id: String, librarian_id: String) -> Self {
        Self {
            student_id,
            book_id,
            librarian_id,
            due_date: None,
            borrowed_date: None,
            notes: None,
        }
    }
}

/// Parameters for checking a book back in
#[derive(Debug, Clone)]
pub struct ReturnRequest {
    pub transaction_id: String,
    /// Updated physical condition, recorded on the book
    pub condition: Option<BookCondition>,
    /// Defaults to today; set for backdated desk entry
    pub returned_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl ReturnRequest {
    pub fn new(transaction_id: String) -> Self {
        Self {
            transaction_id,
            condition: None,
            returned_date: None,
            notes: None,
        }
    }
}

/// The circulation desk: every borrow, return, and settlement goes through
/// here
///
/// Policy is loaded from the settings provider once per operation, so a
/// single borrow or return observes one consistent set of constants. The
/// storage backend owns the transactional boundary; the desk sequences the
/// checks and hands the backend a fully-built transaction to commit.
pub struct CirculationDesk<S: CirculationStorage, P: SettingsProvider> {
    storage: S,
    settings: P,
    eligibility: EligibilityEvaluator<S>,
    fine_ledger: FineLedger<S>,
}

impl<S: CirculationStorage + Clone, P: SettingsProvider> CirculationDesk<S, P> {
    /// Create a new desk over the given storage backend and settings provider
    pub fn new(storage: S, settings: P) -> Self {
        Self {
            eligibility: EligibilityEvaluator::new(storage.clone()),
            fine_ledger: FineLedger::new(storage.clone()),
            storage,
            settings,
        }
    }

    // Catalog and registry operations

    /// Add a book to the catalog with all copies on the shelf
    pub async fn add_book(
        &mut self,
        id: String,
        title: String,
        copies_total: u32,
    ) -> CirculationResult<Book> {
        validate_id(&id, "Accession number")?;
        validate_non_empty(&title, "Book title")?;

        if self.storage.get_book(&id).await?.is_some() {
            return Err(CirculationError::Validation(format!(
                "Book with accession number '{}' already exists",
                id
            )));
        }

        let book = Book::new(id, title, copies_total);
        self.storage.save_book(&book).await?;
        Ok(book)
    }

    /// Register a new active student
    pub async fn register_student(
        &mut self,
        id: String,
        name: String,
    ) -> CirculationResult<Student> {
        validate_id(&id, "Student id")?;
        validate_non_empty(&name, "Student name")?;

        if self.storage.get_student(&id).await?.is_some() {
            return Err(CirculationError::Validation(format!(
                "Student with id '{}' already exists",
                id
            )));
        }

        let student = Student::new(id, name);
        self.storage.save_student(&student).await?;
        Ok(student)
    }

    /// Get a book by accession number
    pub async fn get_book(&self, book_id: &str) -> CirculationResult<Option<Book>> {
        self.storage.get_book(book_id).await
    }

    /// Get a book, returning an error if not found
    pub async fn get_book_required(&self, book_id: &str) -> CirculationResult<Book> {
        self.storage
            .get_book(book_id)
            .await?
            .ok_or_else(|| CirculationError::BookNotFound(book_id.to_string()))
    }

    /// Get a student by ID
    pub async fn get_student(&self, student_id: &str) -> CirculationResult<Option<Student>> {
        self.storage.get_student(student_id).await
    }

    /// Update a student record (status changes, etc.)
    pub async fn update_student(&mut self, student: &Student) -> CirculationResult<()> {
        self.storage.update_student(student).await
    }

    // Eligibility operations

    /// Decide whether the student may borrow another book
    pub async fn can_borrow(&self, student_id: &str) -> CirculationResult<Eligibility> {
        let policy = CirculationPolicy::load(&self.settings).await?;
        self.eligibility.can_borrow(student_id, &policy).await
    }

    /// How many more books the student may borrow
    pub async fn remaining_capacity(&self, student_id: &str) -> CirculationResult<u32> {
        let policy = CirculationPolicy::load(&self.settings).await?;
        self.eligibility
            .remaining_capacity(student_id, &policy)
            .await
    }

    /// Books the student currently has out (borrowed or overdue)
    pub async fn current_borrowed_books(
        &self,
        student_id: &str,
    ) -> CirculationResult<Vec<Transaction>> {
        self.eligibility.current_borrowed_books(student_id).await
    }

    // Borrow / return state machine

    /// Check a book out to a student
    ///
    /// Fails with [`CirculationError::BookUnavailable`] when the book is
    /// withdrawn or has no copies on the shelf, and with
    /// [`CirculationError::EligibilityDenied`] when the student may not
    /// borrow. The inventory decrement and the transaction insert commit
    /// together; when two concurrent borrows contest the last copy, the
    /// loser observes [`CirculationError::NoCopiesAvailable`].
    pub async fn borrow_book(&mut self, request: BorrowRequest) -> CirculationResult<Transaction> {
        let policy = CirculationPolicy::load(&self.settings).await?;

        let book = self.get_book_required(&request.book_id).await?;
        if !book.is_borrowable() {
            return Err(CirculationError::BookUnavailable(book.id));
        }

        let eligibility = self
            .eligibility
            .can_borrow(&request.student_id, &policy)
            .await?;
        if let Some(reason) = eligibility.reason {
            debug!(student_id = %request.student_id, %reason, "borrow denied");
            return Err(CirculationError::EligibilityDenied(reason));
        }

        let borrowed_date = request
            .borrowed_date
            .unwrap_or_else(|| chrono::Utc::now().date_naive());
        let due_date = request
            .due_date
            .unwrap_or(borrowed_date + Duration::days(policy.borrowing_period_days));

        let mut transaction = Transaction::new(
            request.student_id,
            request.book_id,
            request.librarian_id,
            borrowed_date,
            due_date,
        );
        transaction.notes = request.notes;
        transaction.validate()?;

        let book = self
            .storage
            .commit_borrow(&book.id, &transaction, policy.max_books_per_student)
            .await?;

        info!(
            transaction_id = %transaction.id,
            student_id = %transaction.student_id,
            book_id = %book.id,
            due_date = %transaction.due_date,
            copies_available = book.copies_available,
            "book borrowed"
        );
        Ok(transaction)
    }

    /// Check a book back in, assessing any overdue fine
    ///
    /// The fine is computed from the policy snapshot loaded at the start of
    /// the call and frozen on the transaction; afterwards only the payment/
    /// waiver ledger touches it. Inventory increment and transaction update
    /// commit together, so a failed return leaves no partial state.
    pub async fn return_book(&mut self, request: ReturnRequest) -> CirculationResult<Transaction> {
        let policy = CirculationPolicy::load(&self.settings).await?;

        let mut transaction = self
            .fine_ledger
            .get_transaction_required(&request.transaction_id)
            .await?;
        if transaction.status == TransactionStatus::Returned {
            return Err(CirculationError::AlreadyReturned(transaction.id));
        }

        let reference_date = request
            .returned_date
            .unwrap_or_else(|| chrono::Utc::now().date_naive());
        let breakdown = FineBreakdown::calculate(
            transaction.due_date,
            reference_date,
            &policy.fine_per_day,
            policy.grace_period_days,
        );

        transaction.status = TransactionStatus::Returned;
        transaction.returned_date = Some(reference_date);
        transaction.fine_amount = breakdown.fine.clone();
        transaction.fine_per_day = Some(policy.fine_per_day.clone());
        transaction.grace_period_days = Some(policy.grace_period_days);
        if request.notes.is_some() {
            transaction.notes = request.notes.clone();
        }
        transaction.updated_at = chrono::Utc::now().naive_utc();

        let book = self
            .storage
            .commit_return(&transaction, request.condition)
            .await?;

        debug!(transaction_id = %transaction.id, formula = %breakdown.formula, "fine assessed");
        info!(
            transaction_id = %transaction.id,
            book_id = %book.id,
            fine = %transaction.fine_amount,
            copies_available = book.copies_available,
            "book returned"
        );
        Ok(transaction)
    }

    /// Flip every past-due borrowed transaction to overdue
    ///
    /// Convenience entry point for the periodic sweep job. Guarded by the
    /// overdue predicate, and the storage backend rejects the write when the
    /// transaction was returned after the sweep read it, so a returned
    /// transaction is never reopened; such races are skipped, not errors.
    pub async fn promote_overdue(
        &mut self,
        as_of: NaiveDate,
    ) -> CirculationResult<Vec<Transaction>> {
        let active = self.storage.list_active_transactions().await?;
        let mut promoted = Vec::new();

        for mut transaction in active {
            if transaction.status == TransactionStatus::Borrowed && transaction.is_overdue(as_of) {
                transaction.status = TransactionStatus::Overdue;
                transaction.updated_at = chrono::Utc::now().naive_utc();
                match self.storage.update_transaction(&transaction).await {
                    Ok(()) => promoted.push(transaction),
                    Err(CirculationError::AlreadyReturned(_)) => continue,
                    Err(err) => return Err(err),
                }
            }
        }

        if !promoted.is_empty() {
            info!(count = promoted.len(), %as_of, "transactions promoted to overdue");
        }
        Ok(promoted)
    }

    // Fine operations

    /// Fine breakdown for a transaction without mutating anything
    ///
    /// Uses the persisted return date for returned transactions; otherwise
    /// `as_of` (default today), giving an accruing preview for books still
    /// out. A returned transaction is recomputed from the rate and grace
    /// period frozen on it at return time, so the audit display stays
    /// consistent with the assessed `fine_amount` across later policy
    /// changes.
    pub async fn fine_breakdown(
        &self,
        transaction_id: &str,
        as_of: Option<NaiveDate>,
    ) -> CirculationResult<FineBreakdown> {
        let policy = CirculationPolicy::load(&self.settings).await?;
        let transaction = self
            .fine_ledger
            .get_transaction_required(transaction_id)
            .await?;

        let reference_date = transaction
            .returned_date
            .or(as_of)
            .unwrap_or_else(|| chrono::Utc::now().date_naive());
        let (fine_per_day, grace_period_days) =
            match (&transaction.fine_per_day, transaction.grace_period_days) {
                (Some(rate), Some(grace)) => (rate.clone(), grace),
                _ => (policy.fine_per_day, policy.grace_period_days),
            };

        Ok(FineBreakdown::calculate(
            transaction.due_date,
            reference_date,
            &fine_per_day,
            grace_period_days,
        ))
    }

    /// Record a payment against a transaction's fine
    pub async fn record_payment(
        &mut self,
        transaction_id: &str,
        amount: BigDecimal,
        method: &str,
    ) -> CirculationResult<Transaction> {
        self.fine_ledger
            .record_payment(transaction_id, amount, method)
            .await
    }

    /// Mark a transaction's fine as paid
    pub async fn mark_fine_paid(&mut self, transaction_id: &str) -> CirculationResult<Transaction> {
        self.fine_ledger.mark_fine_paid(transaction_id).await
    }

    /// Waive a transaction's fine for a documented reason
    pub async fn waive_fine(
        &mut self,
        transaction_id: &str,
        reason: &str,
    ) -> CirculationResult<Transaction> {
        self.fine_ledger.waive_fine(transaction_id, reason).await
    }

    /// Sum of the student's unpaid fines
    pub async fn total_unpaid_fines(&self, student_id: &str) -> CirculationResult<BigDecimal> {
        self.fine_ledger.total_unpaid_fines(student_id).await
    }

    // Settings and audit

    /// Write a policy setting; visible to the next operation
    pub async fn update_setting(&mut self, key: &str, value: &str) -> CirculationResult<()> {
        self.settings.set(key, value).await
    }

    /// Verify a book's copy counters against its active transactions
    ///
    /// Holds exactly when `copies_total - copies_available` equals the
    /// number of active transactions on the book.
    pub async fn audit_book(&self, book_id: &str) -> CirculationResult<bool> {
        let book = self.get_book_required(book_id).await?;
        let active = self.storage.get_book_transactions(book_id, true).await?;
        Ok(crate::inventory::verify_against_active(&book, active.len()))
    }
}
