//! Payment and waiver settlement for assessed fines

use bigdecimal::BigDecimal;
use tracing::info;

use crate::traits::CirculationStorage;
use crate::types::*;
use crate::utils::validation::{validate_non_empty, validate_positive_amount};

/// Settles a transaction's fine by payment or administrative waiver
///
/// Settlement is one-shot: any accepted payment marks the fine paid in full.
/// The tendered amount and method are kept on the transaction for audit, so
/// a partial-balance model can be layered on later without losing history.
pub struct FineLedger<S: CirculationStorage> {
    storage: S,
}

impl<S: CirculationStorage> FineLedger<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Get a transaction, returning an error if not found
    pub async fn get_transaction_required(
        &self,
        transaction_id: &str,
    ) -> CirculationResult<Transaction> {
        self.storage
            .get_transaction(transaction_id)
            .await?
            .ok_or_else(|| CirculationError::TransactionNotFound(transaction_id.to_string()))
    }

    /// Record a payment against the transaction's fine
    ///
    /// The amount must satisfy `0 < amount <= fine_amount`; anything else is
    /// a validation error. On success the fine is settled and the amount and
    /// method are persisted.
    pub async fn record_payment(
        &mut self,
        transaction_id: &str,
        amount: BigDecimal,
        method: &str,
    ) -> CirculationResult<Transaction> {
        validate_positive_amount(&amount)?;
        validate_non_empty(method, "Payment method")?;

        let mut transaction = self.get_transaction_required(transaction_id).await?;
        self.check_settleable(&transaction, |id| CirculationError::NoFineToPay(id))?;

        if amount > transaction.fine_amount {
            return Err(CirculationError::Validation(format!(
                "Payment of {} exceeds fine of {}",
                amount, transaction.fine_amount
            )));
        }

        transaction.fine_paid = true;
        transaction.payment_amount = Some(amount.clone());
        transaction.payment_method = Some(method.to_string());
        transaction.updated_at = chrono::Utc::now().naive_utc();
        self.storage.update_transaction(&transaction).await?;

        info!(
            transaction_id = %transaction.id,
            %amount,
            method,
            "fine paid"
        );
        Ok(transaction)
    }

    /// Mark the fine paid without recording an amount (cash box settlement)
    pub async fn mark_fine_paid(&mut self, transaction_id: &str) -> CirculationResult<Transaction> {
        let mut transaction = self.get_transaction_required(transaction_id).await?;
        self.check_settleable(&transaction, |id| CirculationError::NoFineToPay(id))?;

        transaction.fine_paid = true;
        transaction.updated_at = chrono::Utc::now().naive_utc();
        self.storage.update_transaction(&transaction).await?;

        info!(transaction_id = %transaction.id, "fine marked paid");
        Ok(transaction)
    }

    /// Administratively settle the fine without payment
    ///
    /// The reason is mandatory and is persisted on the transaction for audit.
    /// Authorization (admin role) is the caller's responsibility.
    pub async fn waive_fine(
        &mut self,
        transaction_id: &str,
        reason: &str,
    ) -> CirculationResult<Transaction> {
        validate_non_empty(reason, "Waive reason")?;

        let mut transaction = self.get_transaction_required(transaction_id).await?;
        self.check_settleable(&transaction, |id| CirculationError::NoFineToWaive(id))?;

        transaction.fine_paid = true;
        transaction.waive_reason = Some(reason.to_string());
        transaction.updated_at = chrono::Utc::now().naive_utc();
        self.storage.update_transaction(&transaction).await?;

        info!(transaction_id = %transaction.id, reason, "fine waived");
        Ok(transaction)
    }

    /// Sum of unpaid positive fines across the student's transactions
    pub async fn total_unpaid_fines(&self, student_id: &str) -> CirculationResult<BigDecimal> {
        let transactions = self
            .storage
            .get_student_transactions(student_id, false)
            .await?;

        Ok(transactions
            .iter()
            .filter(|t| t.has_unpaid_fine())
            .map(|t| &t.fine_amount)
            .sum())
    }

    fn check_settleable(
        &self,
        transaction: &Transaction,
        no_fine: impl FnOnce(String) -> CirculationError,
    ) -> CirculationResult<()> {
        if transaction.fine_amount <= BigDecimal::from(0) {
            return Err(no_fine(transaction.id.clone()));
        }
        if transaction.fine_paid {
            return Err(CirculationError::FineAlreadyPaid(transaction.id.clone()));
        }
        Ok(())
    }
}
