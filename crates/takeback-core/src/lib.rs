//! Takeback Core - Common infrastructure for takeout archival pipelines
//!
//! This crate provides the resume bookkeeping shared by the vendor
//! pipelines: the blacklist and progress stores, the work-queue planner,
//! the rate-limited sequential fetch loop, and the ambient logging,
//! pacing, and subprocess plumbing.

pub mod batch;
pub mod blacklist;
pub mod done;
pub mod error;
pub mod fsutil;
pub mod interrupt;
pub mod ledger;
pub mod logging;
pub mod pacing;
pub mod planner;
pub mod progress;
pub mod tool;

// Re-exports for convenience
pub use batch::{run_batch, BatchReport};
pub use blacklist::Blacklist;
pub use done::DoneList;
pub use error::{ExportError, FetchError, StoreError};
pub use interrupt::{interrupt_flag, interrupt_requested};
pub use ledger::{Ledger, LedgerRow};
pub use logging::{init_logging, Verbosity};
pub use pacing::Pacing;
pub use planner::{plan, Plan, PlanCounts};
pub use progress::{ProgressContext, SharedProgress};
