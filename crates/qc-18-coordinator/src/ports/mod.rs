//! Ports (Hexagonal Architecture)

pub mod inbound;
pub mod outbound;

pub use inbound::{BatchOutcome, CoordinatorApi};
pub use outbound::{Clock, JobExecution, JobRegistry, TokenLedger};
