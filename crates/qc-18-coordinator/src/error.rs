//! Error types for the Coordinator subsystem
//!
//! Every variant is a synchronous rejection of the triggering operation.
//! A rejected operation leaves coordination state untouched; the only
//! failure that is swallowed is a per-job failure inside `execute_batch`.

use crate::domain::{Address, ModuleId};
use crate::domain::Phase;
use thiserror::Error;

/// Token ledger failures reported by the `TokenLedger` port.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Sender does not hold enough tokens.
    #[error("Insufficient token balance: have {have}, need {need}")]
    InsufficientBalance { have: u128, need: u128 },

    /// Spender has not been approved for the amount.
    #[error("Insufficient allowance: have {have}, need {need}")]
    InsufficientAllowance { have: u128, need: u128 },

    /// Ledger refused the transfer.
    #[error("Transfer rejected: {0}")]
    Rejected(String),
}

/// Per-job failures reported by a `JobRegistry`.
///
/// These never abort a batch; they are counted and dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobError {
    #[error("Job {0} not found")]
    NotFound(u64),

    #[error("Job {0} is not executable yet")]
    NotExecutable(u64),

    #[error("Job {index} reverted: {reason}")]
    Reverted { index: u64, reason: String },
}

/// Coordinator error taxonomy.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    // ------------------------------------------------------------------
    // Timing violations
    // ------------------------------------------------------------------
    #[error("Operation {operation} not permitted during {phase:?}")]
    WrongPhase {
        operation: &'static str,
        phase: Phase,
    },

    #[error("Epoch has not elapsed: ends at {epoch_end_time}, now {now}")]
    EpochNotElapsed { epoch_end_time: u64, now: u64 },

    #[error("Epoch elapsed at {epoch_end_time}; initiate the next epoch first")]
    EpochElapsed { epoch_end_time: u64 },

    // ------------------------------------------------------------------
    // State-precondition violations
    // ------------------------------------------------------------------
    #[error("Executor {} is not initialized", hex::encode(.0))]
    NotInitialized(Address),

    #[error("Executor {} is not active", hex::encode(.0))]
    NotActive(Address),

    #[error("Executor {} is already staked", hex::encode(.0))]
    AlreadyStaked(Address),

    #[error("Minimum registration period not elapsed: available at {available_at}, now {now}")]
    MinimumRegistrationPeriod { available_at: u64, now: u64 },

    #[error("Too few modules: {count} selected, at least {minimum} required")]
    InsufficientModules { count: u32, minimum: u32 },

    #[error("Modules already registered")]
    ModulesAlreadyRegistered,

    #[error("No modules to register")]
    NoModulesToRegister,

    #[error("No modules to deregister")]
    NoModulesToDeregister,

    #[error("Module catalog is full")]
    ModuleCatalogFull,

    // ------------------------------------------------------------------
    // Selection / authorization violations
    // ------------------------------------------------------------------
    #[error("Executor {} was not selected for round {round}", hex::encode(.executor))]
    NotSelected { executor: Address, round: u32 },

    #[error("Executor {} already checked in for round {round}", hex::encode(.executor))]
    AlreadyCheckedIn { executor: Address, round: u32 },

    #[error("Executor {} already slashed for round {round}", hex::encode(.executor))]
    AlreadySlashed { executor: Address, round: u32 },

    #[error("Round {round} out of range: {rounds_per_epoch} rounds per epoch")]
    RoundOutOfRange { round: u32, rounds_per_epoch: u32 },

    #[error("Caller lacks support for execution module {execution_module} or fee module {fee_module}")]
    ModulesNotSupported {
        execution_module: ModuleId,
        fee_module: ModuleId,
    },

    #[error("Designated executor supports execution module {execution_module} and fee module {fee_module}")]
    DesignatedExecutorSupportsModules {
        execution_module: ModuleId,
        fee_module: ModuleId,
    },

    #[error("Unknown job registry index {0}")]
    UnknownJobRegistry(usize),

    #[error("Unauthorized caller {}", hex::encode(.0))]
    Unauthorized(Address),

    #[error("Batch length mismatch: {indices} indices, {gas_limits} gas limits")]
    LengthMismatch { indices: usize, gas_limits: usize },

    // ------------------------------------------------------------------
    // Commit-reveal violations
    // ------------------------------------------------------------------
    #[error("Malformed signature: expected {expected} bytes, got {actual}")]
    MalformedSignature { expected: usize, actual: usize },

    #[error("Signature recovery failed")]
    SignatureRecoveryFailed,

    #[error("Signer mismatch: expected {}, recovered {}", hex::encode(.expected), hex::encode(.actual))]
    SignerMismatch { expected: Address, actual: Address },

    #[error("Revealed value does not match commitment")]
    CommitmentMismatch,

    #[error("Commitment belongs to epoch {commitment_epoch}, current epoch is {current_epoch}")]
    StaleCommitment {
        commitment_epoch: u64,
        current_epoch: u64,
    },

    #[error("Executor {} has no commitment", hex::encode(.0))]
    NoCommitment(Address),

    #[error("Commitment already made for epoch {0}")]
    AlreadyCommitted(u64),

    #[error("Commitment already revealed or slashed")]
    AlreadyRevealed,

    // ------------------------------------------------------------------
    // Balance violations
    // ------------------------------------------------------------------
    #[error("Balance {balance} would fall below required minimum {minimum}")]
    BalanceBelowMinimum { balance: u128, minimum: u128 },

    #[error("Insufficient internal balance: have {have}, need {need}")]
    InsufficientBalance { have: u128, need: u128 },

    #[error("Token transfer failed: {0}")]
    TokenTransferFailed(#[from] TokenError),

    #[error("Arithmetic overflow in {0}")]
    ArithmeticOverflow(&'static str),

    // ------------------------------------------------------------------
    // Plumbing
    // ------------------------------------------------------------------
    #[error("Reentrant call into coordinator rejected")]
    Reentrancy,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for coordinator operations
pub type CoordinatorResult<T> = Result<T, CoordinatorError>;
