//! Core types and data structures for the circulation system

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Shelf status of a book title
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookStatus {
    /// Book may be borrowed (subject to copy availability)
    Available,
    /// Book is withdrawn from circulation (lost, under repair, weeded)
    Unavailable,
}

/// Physical condition of a book, recorded at intake and updated at return time
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookCondition {
    New,
    Good,
    Fair,
    Poor,
    Damaged,
}

/// A book title in the catalog, with its copy counters
///
/// `copies_available` and `copies_total` are mutated only through the
/// inventory ledger ([`crate::inventory`]) so the invariant
/// `0 <= copies_available <= copies_total` holds at all times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    /// Accession number - the library's unique catalog identifier
    pub id: String,
    pub title: String,
    pub author: Option<String>,
    pub status: BookStatus,
    pub condition: BookCondition,
    /// Total copies owned by the library
    pub copies_total: u32,
    /// Copies currently on the shelf
    pub copies_available: u32,
    /// Additional metadata (ISBN, shelf location, ...)
    pub metadata: HashMap<String, String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Book {
    /// Create a new book with all copies on the shelf
    pub fn new(id: String, title: String, copies_total: u32) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id,
            title,
            author: None,
            status: BookStatus::Available,
            condition: BookCondition::Good,
            copies_total,
            copies_available: copies_total,
            metadata: HashMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether at least one copy can be handed out right now
    pub fn is_borrowable(&self) -> bool {
        self.status == BookStatus::Available && self.copies_available > 0
    }
}

/// Enrollment status of a student
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StudentStatus {
    Active,
    Inactive,
    Graduated,
}

/// A registered student
///
/// Only [`StudentStatus::Active`] students may borrow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub name: String,
    pub status: StudentStatus,
    pub metadata: HashMap<String, String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Student {
    /// Create a new active student
    pub fn new(id: String, name: String) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id,
            name,
            status: StudentStatus::Active,
            metadata: HashMap::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Lifecycle state of a circulation transaction
///
/// `Borrowed -> Overdue` is derived by time (or set by the periodic sweep);
/// `Returned` is terminal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionStatus {
    Borrowed,
    Overdue,
    Returned,
}

/// A circulation record: one copy of one book, out to one student
///
/// Transactions are the system of record for circulation history and are
/// never deleted. `fine_amount` is set once at return time and afterwards
/// touched only by the payment/waiver ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub student_id: String,
    pub book_id: String,
    /// Staff member who handled the checkout
    pub librarian_id: String,
    pub borrowed_date: NaiveDate,
    pub due_date: NaiveDate,
    /// Set exactly when the status becomes `Returned`
    pub returned_date: Option<NaiveDate>,
    pub status: TransactionStatus,
    /// Fine assessed at return time, rounded to two decimal places
    pub fine_amount: BigDecimal,
    /// Daily rate the fine was assessed at, frozen at return time
    #[serde(default)]
    pub fine_per_day: Option<BigDecimal>,
    /// Grace period the fine was assessed with, frozen at return time
    #[serde(default)]
    pub grace_period_days: Option<i64>,
    pub fine_paid: bool,
    /// Amount actually tendered, kept for audit
    pub payment_amount: Option<BigDecimal>,
    pub payment_method: Option<String>,
    /// Reason recorded when the fine was waived instead of paid
    pub waive_reason: Option<String>,
    pub notes: Option<String>,
    pub metadata: HashMap<String, String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Transaction {
    /// Create a new borrowed transaction
    pub fn new(
        student_id: String,
        book_id: String,
        librarian_id: String,
        borrowed_date: NaiveDate,
        due_date: NaiveDate,
    ) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            student_id,
            book_id,
            librarian_id,
            borrowed_date,
            due_date,
            returned_date: None,
            status: TransactionStatus::Borrowed,
            fine_amount: BigDecimal::from(0),
            fine_per_day: None,
            grace_period_days: None,
            fine_paid: false,
            payment_amount: None,
            payment_method: None,
            waive_reason: None,
            notes: None,
            metadata: HashMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the book is still out (borrowed or overdue)
    pub fn is_active(&self) -> bool {
        matches!(
            self.status,
            TransactionStatus::Borrowed | TransactionStatus::Overdue
        )
    }

    /// Whether the transaction is past due as of the given date
    ///
    /// Returned transactions are never overdue, regardless of dates. The
    /// periodic status-promotion job uses this predicate to flip
    /// `Borrowed -> Overdue` for reporting.
    pub fn is_overdue(&self, as_of: NaiveDate) -> bool {
        self.status != TransactionStatus::Returned && self.due_date < as_of
    }

    /// Whether a positive fine exists that has not been settled
    pub fn has_unpaid_fine(&self) -> bool {
        !self.fine_paid && self.fine_amount > BigDecimal::from(0)
    }

    /// Validate the transaction record
    pub fn validate(&self) -> CirculationResult<()> {
        if self.student_id.trim().is_empty() {
            return Err(CirculationError::Validation(
                "Transaction must reference a student".to_string(),
            ));
        }

        if self.book_id.trim().is_empty() {
            return Err(CirculationError::Validation(
                "Transaction must reference a book".to_string(),
            ));
        }

        if self.librarian_id.trim().is_empty() {
            return Err(CirculationError::Validation(
                "Transaction must reference the handling librarian".to_string(),
            ));
        }

        if self.due_date < self.borrowed_date {
            return Err(CirculationError::Validation(format!(
                "Due date {} is before borrowed date {}",
                self.due_date, self.borrowed_date
            )));
        }

        if self.fine_amount < BigDecimal::from(0) {
            return Err(CirculationError::Validation(
                "Fine amount cannot be negative".to_string(),
            ));
        }

        match (&self.status, &self.returned_date) {
            (TransactionStatus::Returned, None) => Err(CirculationError::Validation(
                "Returned transaction must carry a returned date".to_string(),
            )),
            (TransactionStatus::Borrowed | TransactionStatus::Overdue, Some(_)) => {
                Err(CirculationError::Validation(
                    "Active transaction cannot carry a returned date".to_string(),
                ))
            }
            _ => Ok(()),
        }
    }
}

/// Reason a borrow request was denied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DenialReason {
    /// Student is not active (inactive or graduated)
    Inactive,
    /// Student already has `max_books_per_student` books out
    AtCapacity,
}

impl std::fmt::Display for DenialReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DenialReason::Inactive => write!(f, "inactive"),
            DenialReason::AtCapacity => write!(f, "at_capacity"),
        }
    }
}

/// Outcome of an eligibility check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Eligibility {
    pub eligible: bool,
    pub reason: Option<DenialReason>,
}

impl Eligibility {
    pub fn approved() -> Self {
        Self {
            eligible: true,
            reason: None,
        }
    }

    pub fn denied(reason: DenialReason) -> Self {
        Self {
            eligible: false,
            reason: Some(reason),
        }
    }
}

/// Errors that can occur in the circulation system
///
/// These are business-rule violations surfaced as structured results; none of
/// them is retried automatically.
#[derive(Debug, thiserror::Error)]
pub enum CirculationError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Borrowing denied: {0}")]
    EligibilityDenied(DenialReason),
    #[error("Book is not available for borrowing: {0}")]
    BookUnavailable(String),
    #[error("No copies available for book: {0}")]
    NoCopiesAvailable(String),
    #[error("All copies already on the shelf for book: {0}")]
    AtMaximumCapacity(String),
    #[error("Transaction already returned: {0}")]
    AlreadyReturned(String),
    #[error("No fine to pay on transaction: {0}")]
    NoFineToPay(String),
    #[error("Fine already settled on transaction: {0}")]
    FineAlreadyPaid(String),
    #[error("No fine to waive on transaction: {0}")]
    NoFineToWaive(String),
    #[error("Book not found: {0}")]
    BookNotFound(String),
    #[error("Student not found: {0}")]
    StudentNotFound(String),
    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),
}

/// Result type for circulation operations
pub type CirculationResult<T> = Result<T, CirculationError>;
