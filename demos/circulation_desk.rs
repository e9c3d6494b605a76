//! Circulation desk walkthrough: borrow, overdue return, fine settlement

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use circulation_core::utils::MemoryStorage;
use circulation_core::{
    BorrowRequest, CachedSettings, CirculationDesk, MemorySettings, ReturnRequest,
};
use std::str::FromStr;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("📚 Circulation Core - Desk Example\n");

    let settings = CachedSettings::new(MemorySettings::new());
    let mut desk = CirculationDesk::new(MemoryStorage::new(), settings);

    // 1. Policy: 5.00 per day fine with a one-day grace period
    desk.update_setting("fine_per_day", "5.00").await?;
    desk.update_setting("grace_period", "1").await?;
    desk.update_setting("max_books_per_student", "3").await?;

    // 2. Catalog and registry
    println!("🗂  Setting up catalog...");
    let book = desk
        .add_book("ACC-1001".to_string(), "The Rust Programming Language".to_string(), 2)
        .await?;
    println!(
        "  ✓ Added book: {} - {} ({} copies)",
        book.id, book.title, book.copies_total
    );

    let student = desk
        .register_student("s-42".to_string(), "Mia Chen".to_string())
        .await?;
    println!("  ✓ Registered student: {} - {}\n", student.id, student.name);

    // 3. Borrow
    println!("📖 Borrowing...");
    let mut request = BorrowRequest::new(
        student.id.clone(),
        book.id.clone(),
        "lib-1".to_string(),
    );
    request.borrowed_date = Some(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
    request.due_date = Some(NaiveDate::from_ymd_opt(2026, 1, 10).unwrap());
    let loan = desk.borrow_book(request).await?;
    println!(
        "  ✓ Borrowed: transaction {} due {}",
        loan.id, loan.due_date
    );
    println!(
        "  ✓ Copies remaining: {}\n",
        desk.get_book_required(&book.id).await?.copies_available
    );

    // 4. Return five days late
    println!("↩️  Returning late...");
    let mut ret = ReturnRequest::new(loan.id.clone());
    ret.returned_date = Some(NaiveDate::from_ymd_opt(2026, 1, 15).unwrap());
    let returned = desk.return_book(ret).await?;

    let breakdown = desk.fine_breakdown(&loan.id, None).await?;
    println!("  ✓ Returned on {}", returned.returned_date.unwrap());
    println!("  ✓ Fine: {} ({})\n", returned.fine_amount, breakdown.formula);

    // 5. Settle the fine
    println!("💰 Settling...");
    let paid = desk
        .record_payment(&loan.id, BigDecimal::from_str("20.00")?, "cash")
        .await?;
    println!(
        "  ✓ Paid {} by {}",
        paid.payment_amount.unwrap(),
        paid.payment_method.unwrap()
    );
    println!(
        "  ✓ Outstanding fines for {}: {}",
        student.name,
        desk.total_unpaid_fines(&student.id).await?
    );

    // 6. Audit the copy counters against the transaction history
    assert!(desk.audit_book(&book.id).await?);
    println!("\n✅ Inventory audit passed");

    Ok(())
}
