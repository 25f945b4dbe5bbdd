//! Job Registry Adapter
//!
//! Implements the `JobRegistry` port with a scripted table of jobs.

use crate::domain::{Address, ModuleId};
use crate::error::JobError;
use crate::ports::outbound::{JobExecution, JobRegistry};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

type ExecuteHook = Box<dyn Fn(u64) + Send + Sync>;

#[derive(Clone, Debug)]
enum ScriptedOutcome {
    Succeed(JobExecution),
    Revert(String),
}

/// Job registry whose outcomes are set up front.
pub struct ScriptedJobRegistry {
    jobs: RwLock<HashMap<u64, ScriptedOutcome>>,
    /// (index, gas_limit, fee_recipient) per call, in order
    calls: RwLock<Vec<(u64, u64, Address)>>,
    /// Runs before each execution
    hook: RwLock<Option<ExecuteHook>>,
}

impl ScriptedJobRegistry {
    pub fn new() -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
            calls: RwLock::new(Vec::new()),
            hook: RwLock::new(None),
        }
    }

    /// Job that succeeds with the given report.
    pub fn add_job(&self, index: u64, execution: JobExecution) {
        self.jobs
            .write()
            .insert(index, ScriptedOutcome::Succeed(execution));
    }

    /// Job outside its zero-fee window using the given modules.
    pub fn add_standard_job(&self, index: u64, execution_module: ModuleId, fee_module: ModuleId) {
        self.add_job(
            index,
            JobExecution {
                creation_time: 0,
                fee: 0,
                fee_token: [0; 20],
                execution_module,
                fee_module,
                in_zero_fee_window: false,
            },
        );
    }

    /// Job inside its zero-fee window.
    pub fn add_zero_fee_job(&self, index: u64, execution_module: ModuleId, fee_module: ModuleId) {
        self.add_job(
            index,
            JobExecution {
                creation_time: 0,
                fee: 0,
                fee_token: [0; 20],
                execution_module,
                fee_module,
                in_zero_fee_window: true,
            },
        );
    }

    /// Job that always reverts.
    pub fn add_reverting_job(&self, index: u64, reason: &str) {
        self.jobs
            .write()
            .insert(index, ScriptedOutcome::Revert(reason.to_string()));
    }

    pub fn set_hook(&self, hook: ExecuteHook) {
        *self.hook.write() = Some(hook);
    }

    pub fn calls(&self) -> Vec<(u64, u64, Address)> {
        self.calls.read().clone()
    }
}

impl Default for ScriptedJobRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl JobRegistry for ScriptedJobRegistry {
    fn execute(
        &self,
        index: u64,
        gas_limit: u64,
        fee_recipient: &Address,
    ) -> Result<JobExecution, JobError> {
        self.calls.write().push((index, gas_limit, *fee_recipient));

        if let Some(hook) = self.hook.read().as_ref() {
            hook(index);
        }

        let outcome = self.jobs.read().get(&index).cloned();
        match outcome {
            Some(ScriptedOutcome::Succeed(execution)) => {
                debug!("[qc-18] job {} executed", index);
                Ok(execution)
            }
            Some(ScriptedOutcome::Revert(reason)) => Err(JobError::Reverted { index, reason }),
            None => Err(JobError::NotFound(index)),
        }
    }
}
