//! Inventory ledger: bounded mutation of a book's copy counters
//!
//! These functions are the only place the `copies_available` counter moves.
//! Storage backends call them inside their transactional commits so the
//! precondition check and the mutation happen under the same lock.

use crate::types::*;

/// Take one copy off the shelf
///
/// Precondition: `copies_available > 0`, otherwise
/// [`CirculationError::NoCopiesAvailable`].
pub fn checkout_copy(book: &mut Book) -> CirculationResult<()> {
    if book.copies_available == 0 {
        return Err(CirculationError::NoCopiesAvailable(book.id.clone()));
    }

    book.copies_available -= 1;
    book.updated_at = chrono::Utc::now().naive_utc();
    Ok(())
}

/// Put one copy back on the shelf
///
/// Precondition: `copies_available < copies_total`. Failing it means the
/// counters disagree with the transaction history upstream, so this surfaces
/// [`CirculationError::AtMaximumCapacity`] instead of clamping.
pub fn return_copy(book: &mut Book) -> CirculationResult<()> {
    if book.copies_available >= book.copies_total {
        return Err(CirculationError::AtMaximumCapacity(book.id.clone()));
    }

    book.copies_available += 1;
    book.updated_at = chrono::Utc::now().naive_utc();
    Ok(())
}

/// Offline audit of the copy counters against the transaction history
///
/// Holds when `copies_total - copies_available` equals the number of active
/// (borrowed or overdue) transactions on the book.
pub fn verify_against_active(book: &Book, active_transactions: usize) -> bool {
    (book.copies_total - book.copies_available) as usize == active_transactions
}
