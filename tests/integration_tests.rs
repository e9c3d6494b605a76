//! Integration tests for circulation-core

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use circulation_core::utils::MemoryStorage;
use circulation_core::{
    BorrowRequest, CirculationDesk, CirculationError, CirculationStorage, DenialReason,
    MemorySettings, ReturnRequest, StudentStatus, TransactionStatus,
};
use std::str::FromStr;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn dec(s: &str) -> BigDecimal {
    BigDecimal::from_str(s).unwrap()
}

async fn desk_with_policy(
    fine_per_day: &str,
    grace: &str,
) -> CirculationDesk<MemoryStorage, MemorySettings> {
    let mut desk = CirculationDesk::new(MemoryStorage::new(), MemorySettings::new());
    desk.update_setting("fine_per_day", fine_per_day).await.unwrap();
    desk.update_setting("grace_period", grace).await.unwrap();
    desk
}

#[tokio::test]
async fn test_full_circulation_workflow() {
    let mut desk = desk_with_policy("5.00", "1").await;

    desk.add_book("ACC-001".to_string(), "Dune".to_string(), 3)
        .await
        .unwrap();
    desk.register_student("s-100".to_string(), "Paul Atreides".to_string())
        .await
        .unwrap();

    // Borrow with an explicit desk date so the overdue math is deterministic
    let mut request = BorrowRequest::new(
        "s-100".to_string(),
        "ACC-001".to_string(),
        "lib-1".to_string(),
    );
    request.borrowed_date = Some(date(2025, 12, 27));
    request.due_date = Some(date(2026, 1, 10));
    let loan = desk.borrow_book(request).await.unwrap();

    assert_eq!(loan.status, TransactionStatus::Borrowed);
    assert_eq!(loan.due_date, date(2026, 1, 10));
    assert_eq!(
        desk.get_book_required("ACC-001")
            .await
            .unwrap()
            .copies_available,
        2
    );

    // The sweep promotes it once past due
    let promoted = desk.promote_overdue(date(2026, 1, 12)).await.unwrap();
    assert_eq!(promoted.len(), 1);
    assert_eq!(promoted[0].status, TransactionStatus::Overdue);

    // Still counted as a current borrowed book while overdue
    let current = desk.current_borrowed_books("s-100").await.unwrap();
    assert_eq!(current.len(), 1);

    // Return 5 days late with 1 grace day: 4 chargeable days x 5.00
    let mut ret = ReturnRequest::new(loan.id.clone());
    ret.returned_date = Some(date(2026, 1, 15));
    let returned = desk.return_book(ret).await.unwrap();

    assert_eq!(returned.status, TransactionStatus::Returned);
    assert_eq!(returned.returned_date, Some(date(2026, 1, 15)));
    assert_eq!(returned.fine_amount, dec("20.00"));
    assert!(!returned.fine_paid);
    assert_eq!(
        desk.get_book_required("ACC-001")
            .await
            .unwrap()
            .copies_available,
        3
    );

    // Unpaid fine is surfaced, then settled by payment
    assert_eq!(desk.total_unpaid_fines("s-100").await.unwrap(), dec("20.00"));

    let paid = desk
        .record_payment(&loan.id, dec("20.00"), "cash")
        .await
        .unwrap();
    assert!(paid.fine_paid);
    assert_eq!(paid.payment_amount, Some(dec("20.00")));
    assert_eq!(paid.payment_method.as_deref(), Some("cash"));
    assert_eq!(desk.total_unpaid_fines("s-100").await.unwrap(), dec("0"));

    assert!(desk.audit_book("ACC-001").await.unwrap());
}

#[tokio::test]
async fn test_inactive_student_cannot_borrow() {
    let mut desk = CirculationDesk::new(MemoryStorage::new(), MemorySettings::new());

    desk.add_book("ACC-001".to_string(), "Dune".to_string(), 1)
        .await
        .unwrap();
    let mut student = desk
        .register_student("s-100".to_string(), "Alumni".to_string())
        .await
        .unwrap();
    student.status = StudentStatus::Graduated;
    desk.update_student(&student).await.unwrap();

    let eligibility = desk.can_borrow("s-100").await.unwrap();
    assert!(!eligibility.eligible);
    assert_eq!(eligibility.reason, Some(DenialReason::Inactive));

    let result = desk
        .borrow_book(BorrowRequest::new(
            "s-100".to_string(),
            "ACC-001".to_string(),
            "lib-1".to_string(),
        ))
        .await;
    assert!(matches!(
        result,
        Err(CirculationError::EligibilityDenied(DenialReason::Inactive))
    ));

    // Denied borrow must not touch the inventory
    assert_eq!(
        desk.get_book_required("ACC-001")
            .await
            .unwrap()
            .copies_available,
        1
    );
}

#[tokio::test]
async fn test_capacity_limit_blocks_fourth_borrow() {
    let mut desk = CirculationDesk::new(MemoryStorage::new(), MemorySettings::new());
    desk.update_setting("max_books_per_student", "3")
        .await
        .unwrap();

    desk.register_student("s-100".to_string(), "Avid Reader".to_string())
        .await
        .unwrap();
    for i in 1..=4 {
        desk.add_book(format!("ACC-00{}", i), format!("Book {}", i), 1)
            .await
            .unwrap();
    }

    for i in 1..=3 {
        desk.borrow_book(BorrowRequest::new(
            "s-100".to_string(),
            format!("ACC-00{}", i),
            "lib-1".to_string(),
        ))
        .await
        .unwrap();
    }

    let eligibility = desk.can_borrow("s-100").await.unwrap();
    assert!(!eligibility.eligible);
    assert_eq!(eligibility.reason, Some(DenialReason::AtCapacity));
    assert_eq!(desk.remaining_capacity("s-100").await.unwrap(), 0);

    let result = desk
        .borrow_book(BorrowRequest::new(
            "s-100".to_string(),
            "ACC-004".to_string(),
            "lib-1".to_string(),
        ))
        .await;
    assert!(matches!(
        result,
        Err(CirculationError::EligibilityDenied(DenialReason::AtCapacity))
    ));

    // Returning one book frees one slot
    let loans = desk.current_borrowed_books("s-100").await.unwrap();
    desk.return_book(ReturnRequest::new(loans[0].id.clone()))
        .await
        .unwrap();
    assert_eq!(desk.remaining_capacity("s-100").await.unwrap(), 1);
    assert!(desk.can_borrow("s-100").await.unwrap().eligible);
}

#[tokio::test]
async fn test_last_copy_then_book_unavailable() {
    let mut desk = CirculationDesk::new(MemoryStorage::new(), MemorySettings::new());

    desk.add_book("ACC-001".to_string(), "Rare Folio".to_string(), 1)
        .await
        .unwrap();
    desk.register_student("s-1".to_string(), "First".to_string())
        .await
        .unwrap();
    desk.register_student("s-2".to_string(), "Second".to_string())
        .await
        .unwrap();

    let loan = desk
        .borrow_book(BorrowRequest::new(
            "s-1".to_string(),
            "ACC-001".to_string(),
            "lib-1".to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(loan.status, TransactionStatus::Borrowed);
    assert_eq!(
        desk.get_book_required("ACC-001")
            .await
            .unwrap()
            .copies_available,
        0
    );

    let result = desk
        .borrow_book(BorrowRequest::new(
            "s-2".to_string(),
            "ACC-001".to_string(),
            "lib-1".to_string(),
        ))
        .await;
    assert!(matches!(result, Err(CirculationError::BookUnavailable(_))));
}

#[tokio::test]
async fn test_concurrent_borrows_of_last_copy() {
    let storage = MemoryStorage::new();
    let mut setup = CirculationDesk::new(storage.clone(), MemorySettings::new());

    setup
        .add_book("ACC-001".to_string(), "Contested".to_string(), 1)
        .await
        .unwrap();
    setup
        .register_student("s-1".to_string(), "First".to_string())
        .await
        .unwrap();
    setup
        .register_student("s-2".to_string(), "Second".to_string())
        .await
        .unwrap();

    // Two desks over the same shared store, racing for one copy
    let mut desk_a = CirculationDesk::new(storage.clone(), MemorySettings::new());
    let mut desk_b = CirculationDesk::new(storage.clone(), MemorySettings::new());

    let task_a = tokio::spawn(async move {
        desk_a
            .borrow_book(BorrowRequest::new(
                "s-1".to_string(),
                "ACC-001".to_string(),
                "lib-1".to_string(),
            ))
            .await
    });
    let task_b = tokio::spawn(async move {
        desk_b
            .borrow_book(BorrowRequest::new(
                "s-2".to_string(),
                "ACC-001".to_string(),
                "lib-1".to_string(),
            ))
            .await
    });

    let results = [task_a.await.unwrap(), task_b.await.unwrap()];
    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one concurrent borrow must win");

    let loser = results.iter().find(|r| r.is_err()).unwrap();
    assert!(matches!(
        loser,
        Err(CirculationError::NoCopiesAvailable(_))
            | Err(CirculationError::BookUnavailable(_))
    ));

    let book = setup.get_book_required("ACC-001").await.unwrap();
    assert_eq!(book.copies_available, 0);
    assert!(setup.audit_book("ACC-001").await.unwrap());
}

#[tokio::test]
async fn test_concurrent_borrows_respect_student_capacity() {
    let storage = MemoryStorage::new();
    let settings = MemorySettings::new();
    let mut setup = CirculationDesk::new(storage.clone(), settings.clone());

    setup.update_setting("max_books_per_student", "1").await.unwrap();
    setup
        .register_student("s-1".to_string(), "One Slot".to_string())
        .await
        .unwrap();
    setup
        .add_book("ACC-001".to_string(), "First".to_string(), 1)
        .await
        .unwrap();
    setup
        .add_book("ACC-002".to_string(), "Second".to_string(), 1)
        .await
        .unwrap();

    let mut desk_a = CirculationDesk::new(storage.clone(), settings.clone());
    let mut desk_b = CirculationDesk::new(storage.clone(), settings.clone());

    let task_a = tokio::spawn(async move {
        desk_a
            .borrow_book(BorrowRequest::new(
                "s-1".to_string(),
                "ACC-001".to_string(),
                "lib-1".to_string(),
            ))
            .await
    });
    let task_b = tokio::spawn(async move {
        desk_b
            .borrow_book(BorrowRequest::new(
                "s-1".to_string(),
                "ACC-002".to_string(),
                "lib-1".to_string(),
            ))
            .await
    });

    let results = [task_a.await.unwrap(), task_b.await.unwrap()];
    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "the capacity check must hold under contention");

    let loser = results.iter().find(|r| r.is_err()).unwrap();
    assert!(matches!(
        loser,
        Err(CirculationError::EligibilityDenied(DenialReason::AtCapacity))
    ));

    let active = setup.current_borrowed_books("s-1").await.unwrap();
    assert_eq!(active.len(), 1);
}

#[tokio::test]
async fn test_concurrent_returns_commit_once() {
    let storage = MemoryStorage::new();
    let mut setup = CirculationDesk::new(storage.clone(), MemorySettings::new());

    setup
        .add_book("ACC-001".to_string(), "Dune".to_string(), 2)
        .await
        .unwrap();
    setup
        .register_student("s-1".to_string(), "Reader".to_string())
        .await
        .unwrap();
    setup
        .register_student("s-2".to_string(), "Other Reader".to_string())
        .await
        .unwrap();

    let loan = setup
        .borrow_book(BorrowRequest::new(
            "s-1".to_string(),
            "ACC-001".to_string(),
            "lib-1".to_string(),
        ))
        .await
        .unwrap();
    setup
        .borrow_book(BorrowRequest::new(
            "s-2".to_string(),
            "ACC-001".to_string(),
            "lib-1".to_string(),
        ))
        .await
        .unwrap();

    // Two desks race to return the same loan
    let mut desk_a = CirculationDesk::new(storage.clone(), MemorySettings::new());
    let mut desk_b = CirculationDesk::new(storage.clone(), MemorySettings::new());

    let id_a = loan.id.clone();
    let task_a = tokio::spawn(async move { desk_a.return_book(ReturnRequest::new(id_a)).await });
    let id_b = loan.id.clone();
    let task_b = tokio::spawn(async move { desk_b.return_book(ReturnRequest::new(id_b)).await });

    let results = [task_a.await.unwrap(), task_b.await.unwrap()];
    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "the same loan must be returned exactly once");

    let loser = results.iter().find(|r| r.is_err()).unwrap();
    assert!(matches!(loser, Err(CirculationError::AlreadyReturned(_))));

    // One copy back on the shelf, the other loan still out
    let book = setup.get_book_required("ACC-001").await.unwrap();
    assert_eq!(book.copies_available, 1);
    assert!(setup.audit_book("ACC-001").await.unwrap());
}

#[tokio::test]
async fn test_concurrent_settlements_settle_once() {
    let storage = MemoryStorage::new();
    let mut setup = CirculationDesk::new(storage.clone(), MemorySettings::new());
    setup.update_setting("fine_per_day", "5.00").await.unwrap();
    setup.update_setting("grace_period", "0").await.unwrap();

    setup
        .add_book("ACC-001".to_string(), "Dune".to_string(), 1)
        .await
        .unwrap();
    setup
        .register_student("s-1".to_string(), "Late Reader".to_string())
        .await
        .unwrap();

    let mut request = BorrowRequest::new(
        "s-1".to_string(),
        "ACC-001".to_string(),
        "lib-1".to_string(),
    );
    request.borrowed_date = Some(date(2026, 1, 1));
    request.due_date = Some(date(2026, 1, 10));
    let loan = setup.borrow_book(request).await.unwrap();

    let mut ret = ReturnRequest::new(loan.id.clone());
    ret.returned_date = Some(date(2026, 1, 12));
    let returned = setup.return_book(ret).await.unwrap();
    assert_eq!(returned.fine_amount, dec("10.00"));

    // A payment and a waiver race for the same fine
    let mut desk_a = CirculationDesk::new(storage.clone(), MemorySettings::new());
    let mut desk_b = CirculationDesk::new(storage.clone(), MemorySettings::new());

    let id_a = loan.id.clone();
    let task_a =
        tokio::spawn(async move { desk_a.record_payment(&id_a, dec("10.00"), "cash").await });
    let id_b = loan.id.clone();
    let task_b = tokio::spawn(async move { desk_b.waive_fine(&id_b, "lost receipt").await });

    let results = [task_a.await.unwrap(), task_b.await.unwrap()];
    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "the fine must settle exactly once");

    let loser = results.iter().find(|r| r.is_err()).unwrap();
    assert!(matches!(loser, Err(CirculationError::FineAlreadyPaid(_))));

    // The stored audit fields belong to the winner alone
    let stored = storage.get_transaction(&loan.id).await.unwrap().unwrap();
    assert!(stored.fine_paid);
    match (&stored.payment_method, &stored.waive_reason) {
        (Some(method), None) => assert_eq!(method, "cash"),
        (None, Some(reason)) => assert_eq!(reason, "lost receipt"),
        other => panic!("settlement audit fields are mixed: {:?}", other),
    }
}

#[tokio::test]
async fn test_double_return_is_rejected() {
    let mut desk = desk_with_policy("5.00", "0").await;

    desk.add_book("ACC-001".to_string(), "Dune".to_string(), 1)
        .await
        .unwrap();
    desk.register_student("s-1".to_string(), "Reader".to_string())
        .await
        .unwrap();

    let loan = desk
        .borrow_book(BorrowRequest::new(
            "s-1".to_string(),
            "ACC-001".to_string(),
            "lib-1".to_string(),
        ))
        .await
        .unwrap();

    desk.return_book(ReturnRequest::new(loan.id.clone()))
        .await
        .unwrap();
    assert_eq!(
        desk.get_book_required("ACC-001")
            .await
            .unwrap()
            .copies_available,
        1
    );

    let second = desk.return_book(ReturnRequest::new(loan.id.clone())).await;
    assert!(matches!(second, Err(CirculationError::AlreadyReturned(_))));

    // Failed second return leaves inventory untouched
    assert_eq!(
        desk.get_book_required("ACC-001")
            .await
            .unwrap()
            .copies_available,
        1
    );
}

#[tokio::test]
async fn test_payment_cannot_exceed_fine() {
    let mut desk = desk_with_policy("5.00", "0").await;

    desk.add_book("ACC-001".to_string(), "Dune".to_string(), 1)
        .await
        .unwrap();
    desk.register_student("s-1".to_string(), "Late Reader".to_string())
        .await
        .unwrap();

    let mut request = BorrowRequest::new(
        "s-1".to_string(),
        "ACC-001".to_string(),
        "lib-1".to_string(),
    );
    request.borrowed_date = Some(date(2026, 1, 1));
    request.due_date = Some(date(2026, 1, 10));
    let loan = desk.borrow_book(request).await.unwrap();

    let mut ret = ReturnRequest::new(loan.id.clone());
    ret.returned_date = Some(date(2026, 1, 12));
    let returned = desk.return_book(ret).await.unwrap();
    assert_eq!(returned.fine_amount, dec("10.00"));

    // fine + 1 is rejected, nothing settles
    let overshoot = desk
        .record_payment(&loan.id, dec("11.00"), "cash")
        .await;
    assert!(matches!(overshoot, Err(CirculationError::Validation(_))));
    assert_eq!(desk.total_unpaid_fines("s-1").await.unwrap(), dec("10.00"));

    // Non-positive amounts are rejected up front
    assert!(matches!(
        desk.record_payment(&loan.id, dec("0"), "cash").await,
        Err(CirculationError::Validation(_))
    ));

    // A partial amount settles in full (one-shot settlement)
    let paid = desk
        .record_payment(&loan.id, dec("4.00"), "card")
        .await
        .unwrap();
    assert!(paid.fine_paid);
    assert_eq!(paid.payment_amount, Some(dec("4.00")));

    // Already settled: further payments are rejected
    assert!(matches!(
        desk.record_payment(&loan.id, dec("1.00"), "cash").await,
        Err(CirculationError::FineAlreadyPaid(_))
    ));
}

#[tokio::test]
async fn test_waive_fine_requires_reason_and_persists_it() {
    let mut desk = desk_with_policy("2.00", "0").await;

    desk.add_book("ACC-001".to_string(), "Dune".to_string(), 1)
        .await
        .unwrap();
    desk.register_student("s-1".to_string(), "Reader".to_string())
        .await
        .unwrap();

    let mut request = BorrowRequest::new(
        "s-1".to_string(),
        "ACC-001".to_string(),
        "lib-1".to_string(),
    );
    request.borrowed_date = Some(date(2026, 1, 1));
    request.due_date = Some(date(2026, 1, 10));
    let loan = desk.borrow_book(request).await.unwrap();

    let mut ret = ReturnRequest::new(loan.id.clone());
    ret.returned_date = Some(date(2026, 1, 15));
    desk.return_book(ret).await.unwrap();

    assert!(matches!(
        desk.waive_fine(&loan.id, "").await,
        Err(CirculationError::Validation(_))
    ));

    let waived = desk.waive_fine(&loan.id, "lost receipt").await.unwrap();
    assert!(waived.fine_paid);
    assert_eq!(waived.waive_reason.as_deref(), Some("lost receipt"));
    assert_eq!(desk.total_unpaid_fines("s-1").await.unwrap(), dec("0"));
}

#[tokio::test]
async fn test_fine_settlement_guards_on_zero_fine() {
    let mut desk = desk_with_policy("5.00", "2").await;

    desk.add_book("ACC-001".to_string(), "Dune".to_string(), 1)
        .await
        .unwrap();
    desk.register_student("s-1".to_string(), "Punctual".to_string())
        .await
        .unwrap();

    let mut request = BorrowRequest::new(
        "s-1".to_string(),
        "ACC-001".to_string(),
        "lib-1".to_string(),
    );
    request.borrowed_date = Some(date(2026, 1, 1));
    request.due_date = Some(date(2026, 1, 10));
    let loan = desk.borrow_book(request).await.unwrap();

    // One day late but within the two-day grace period: no fine
    let mut ret = ReturnRequest::new(loan.id.clone());
    ret.returned_date = Some(date(2026, 1, 11));
    let returned = desk.return_book(ret).await.unwrap();
    assert_eq!(returned.fine_amount, dec("0"));

    assert!(matches!(
        desk.mark_fine_paid(&loan.id).await,
        Err(CirculationError::NoFineToPay(_))
    ));
    assert!(matches!(
        desk.waive_fine(&loan.id, "n/a").await,
        Err(CirculationError::NoFineToWaive(_))
    ));
}

#[tokio::test]
async fn test_fine_breakdown_preview_for_active_loan() {
    let mut desk = desk_with_policy("5.00", "1").await;

    desk.add_book("ACC-001".to_string(), "Dune".to_string(), 1)
        .await
        .unwrap();
    desk.register_student("s-1".to_string(), "Reader".to_string())
        .await
        .unwrap();

    let mut request = BorrowRequest::new(
        "s-1".to_string(),
        "ACC-001".to_string(),
        "lib-1".to_string(),
    );
    request.borrowed_date = Some(date(2026, 1, 1));
    request.due_date = Some(date(2026, 1, 10));
    let loan = desk.borrow_book(request).await.unwrap();

    let breakdown = desk
        .fine_breakdown(&loan.id, Some(date(2026, 1, 15)))
        .await
        .unwrap();
    assert_eq!(breakdown.days_overdue, 5);
    assert_eq!(breakdown.chargeable_days, 4);
    assert_eq!(breakdown.fine, dec("20.00"));

    // Preview mutates nothing
    let stored = desk.current_borrowed_books("s-1").await.unwrap();
    assert_eq!(stored[0].fine_amount, dec("0"));
}

#[tokio::test]
async fn test_policy_change_applies_to_next_operation() {
    let mut desk = desk_with_policy("5.00", "0").await;

    desk.add_book("ACC-001".to_string(), "Dune".to_string(), 2)
        .await
        .unwrap();
    desk.register_student("s-1".to_string(), "Reader".to_string())
        .await
        .unwrap();

    let mut request = BorrowRequest::new(
        "s-1".to_string(),
        "ACC-001".to_string(),
        "lib-1".to_string(),
    );
    request.borrowed_date = Some(date(2026, 1, 1));
    request.due_date = Some(date(2026, 1, 10));
    let loan = desk.borrow_book(request).await.unwrap();

    // Rate change lands synchronously; the return sees the new rate
    desk.update_setting("fine_per_day", "10.00").await.unwrap();

    let mut ret = ReturnRequest::new(loan.id.clone());
    ret.returned_date = Some(date(2026, 1, 12));
    let returned = desk.return_book(ret).await.unwrap();
    assert_eq!(returned.fine_amount, dec("20.00"));
}

#[tokio::test]
async fn test_breakdown_of_returned_loan_survives_policy_change() {
    let mut desk = desk_with_policy("2.00", "0").await;

    desk.add_book("ACC-001".to_string(), "Dune".to_string(), 1)
        .await
        .unwrap();
    desk.register_student("s-1".to_string(), "Reader".to_string())
        .await
        .unwrap();

    let mut request = BorrowRequest::new(
        "s-1".to_string(),
        "ACC-001".to_string(),
        "lib-1".to_string(),
    );
    request.borrowed_date = Some(date(2026, 1, 1));
    request.due_date = Some(date(2026, 1, 10));
    let loan = desk.borrow_book(request).await.unwrap();

    let mut ret = ReturnRequest::new(loan.id.clone());
    ret.returned_date = Some(date(2026, 1, 15));
    let returned = desk.return_book(ret).await.unwrap();
    assert_eq!(returned.fine_amount, dec("10.00"));

    // Later policy changes must not rewrite the assessed fine's audit trail
    desk.update_setting("fine_per_day", "9.00").await.unwrap();
    desk.update_setting("grace_period", "3").await.unwrap();

    let breakdown = desk.fine_breakdown(&loan.id, None).await.unwrap();
    assert_eq!(breakdown.fine_per_day, dec("2.00"));
    assert_eq!(breakdown.grace_period_days, 0);
    assert_eq!(breakdown.chargeable_days, 5);
    assert_eq!(breakdown.fine, returned.fine_amount);

    // An active loan's preview still follows the current policy
    desk.add_book("ACC-002".to_string(), "Other".to_string(), 1)
        .await
        .unwrap();
    let mut request = BorrowRequest::new(
        "s-1".to_string(),
        "ACC-002".to_string(),
        "lib-1".to_string(),
    );
    request.borrowed_date = Some(date(2026, 1, 1));
    request.due_date = Some(date(2026, 1, 10));
    let active = desk.borrow_book(request).await.unwrap();

    let preview = desk
        .fine_breakdown(&active.id, Some(date(2026, 1, 15)))
        .await
        .unwrap();
    assert_eq!(preview.fine_per_day, dec("9.00"));
    assert_eq!(preview.chargeable_days, 2);
}
