//! Circulation module containing the desk orchestrator, eligibility checks,
//! and fine settlement

pub mod desk;
pub mod eligibility;
pub mod fines_ledger;

pub use desk::*;
pub use eligibility::*;
pub use fines_ledger::*;
