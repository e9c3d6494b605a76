//! Borrowing eligibility checks

use crate::settings::CirculationPolicy;
use crate::traits::CirculationStorage;
use crate::types::*;

/// Evaluates whether a student may borrow under the given policy
///
/// Unpaid fines are deliberately not part of the decision: they are surfaced
/// for display through [`crate::circulation::FineLedger::total_unpaid_fines`]
/// but never block a new loan.
pub struct EligibilityEvaluator<S: CirculationStorage> {
    storage: S,
}

impl<S: CirculationStorage> EligibilityEvaluator<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Get a student, returning an error if not found
    pub async fn get_student_required(&self, student_id: &str) -> CirculationResult<Student> {
        self.storage
            .get_student(student_id)
            .await?
            .ok_or_else(|| CirculationError::StudentNotFound(student_id.to_string()))
    }

    /// Decide whether the student may borrow another book
    ///
    /// Denial reasons, in check order: `inactive` when the student is not
    /// active, `at_capacity` when the active-loan count has reached
    /// `max_books_per_student`.
    pub async fn can_borrow(
        &self,
        student_id: &str,
        policy: &CirculationPolicy,
    ) -> CirculationResult<Eligibility> {
        let student = self.get_student_required(student_id).await?;

        if student.status != StudentStatus::Active {
            return Ok(Eligibility::denied(DenialReason::Inactive));
        }

        let active = self.count_active(student_id).await?;
        if active >= policy.max_books_per_student as usize {
            return Ok(Eligibility::denied(DenialReason::AtCapacity));
        }

        Ok(Eligibility::approved())
    }

    /// How many more books the student may borrow, floored at zero
    pub async fn remaining_capacity(
        &self,
        student_id: &str,
        policy: &CirculationPolicy,
    ) -> CirculationResult<u32> {
        // Existence check first so a missing student is not reported as zero
        self.get_student_required(student_id).await?;

        let active = self.count_active(student_id).await?;
        Ok((policy.max_books_per_student as usize).saturating_sub(active) as u32)
    }

    /// Transactions with status borrowed or overdue for the student
    pub async fn current_borrowed_books(
        &self,
        student_id: &str,
    ) -> CirculationResult<Vec<Transaction>> {
        self.storage.get_student_transactions(student_id, true).await
    }

    async fn count_active(&self, student_id: &str) -> CirculationResult<usize> {
        Ok(self
            .storage
            .get_student_transactions(student_id, true)
            .await?
            .len())
    }
}
