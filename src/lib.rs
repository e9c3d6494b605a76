//! # Circulation Core
//!
//! The circulation and fine engine for a school library: decides whether a
//! student may borrow, atomically moves book copies between available and
//! out, drives each transaction through its borrowed -> overdue -> returned
//! lifecycle, computes overdue fines deterministically, and settles payments
//! and waivers.
//!
//! ## Features
//!
//! - **Inventory ledger**: bounded copy counters that can never oversell the
//!   last copy, even under concurrent borrows
//! - **Eligibility checks**: student status and per-student borrowing capacity
//! - **Fine calculation**: pure, deterministic arithmetic with an auditable
//!   breakdown and a configurable grace period
//! - **Payment/waiver settlement**: one-shot settlement with an audit trail
//! - **Policy snapshots**: settings loaded once per operation, with a
//!   write-through cache that is never stale
//! - **Storage abstraction**: database-agnostic design with trait-based
//!   storage
//!
//! ## Quick Start
//!
//! ```rust
//! use circulation_core::utils::MemoryStorage;
//! use circulation_core::{BorrowRequest, CirculationDesk, MemorySettings};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut desk = CirculationDesk::new(MemoryStorage::new(), MemorySettings::new());
//!
//! desk.add_book("ACC-001".to_string(), "Dune".to_string(), 2).await?;
//! desk.register_student("s-100".to_string(), "Paul".to_string()).await?;
//!
//! let loan = desk
//!     .borrow_book(BorrowRequest::new(
//!         "s-100".to_string(),
//!         "ACC-001".to_string(),
//!         "lib-1".to_string(),
//!     ))
//!     .await?;
//! assert!(loan.is_active());
//! # Ok(())
//! # }
//! ```

pub mod circulation;
pub mod fines;
pub mod inventory;
pub mod settings;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use circulation::*;
pub use fines::*;
pub use settings::*;
pub use traits::*;
pub use types::*;
