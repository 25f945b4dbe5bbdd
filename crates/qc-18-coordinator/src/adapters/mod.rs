//! Adapters (Hexagonal Architecture)
//!
//! In-memory implementations of the outbound ports.

pub mod clock;
pub mod job_registry;
pub mod token_ledger;

pub use clock::{ManualClock, SystemClock};
pub use job_registry::ScriptedJobRegistry;
pub use token_ledger::InMemoryTokenLedger;
