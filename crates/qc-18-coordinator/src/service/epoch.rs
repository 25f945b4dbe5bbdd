//! # Commit-Reveal and Epoch Rollover

use super::*;
use crate::algorithms::{
    epoch_seed, fold_seed, plan_distribution, reveal_message, verify_reveal, DistributionPlan,
    Participation,
};

impl<L, C> Coordinator<L, C>
where
    L: TokenLedger,
    C: Clock,
{
    /// Message an executor signs for its reveal in `epoch`.
    pub fn reveal_message_for(&self, epoch: u64) -> Hash {
        reveal_message(self.config.chain_id, &self.custody, epoch)
    }

    pub(super) fn apply_commit(
        &self,
        state: &mut CoordinatorState,
        now: u64,
        caller: Address,
        commitment: Hash,
    ) -> CoordinatorResult<()> {
        let phase = self.phase_at(state, now);
        if phase != Phase::Commit {
            return Err(CoordinatorError::WrongPhase {
                operation: "commit",
                phase,
            });
        }
        let executor = state
            .initialized(&caller)
            .ok_or(CoordinatorError::NotInitialized(caller))?;
        if !executor.active {
            return Err(CoordinatorError::NotActive(caller));
        }

        let epoch = state.epoch;
        if state.commits.get(&caller).map(|c| c.epoch) == Some(epoch) {
            return Err(CoordinatorError::AlreadyCommitted(epoch));
        }
        state.commits.insert(caller, CommitData::new(commitment, epoch));
        state.pending_events.push(CoordinatorEvent::CommitmentMade {
            executor: caller,
            epoch,
            commitment,
        });

        debug!(
            "[qc-18] {} committed for epoch {}",
            hex::encode(caller),
            epoch
        );
        Ok(())
    }

    pub(super) fn apply_reveal(
        &self,
        state: &mut CoordinatorState,
        now: u64,
        caller: Address,
        signature: &[u8],
    ) -> CoordinatorResult<()> {
        let phase = self.phase_at(state, now);
        if phase != Phase::Reveal {
            return Err(CoordinatorError::WrongPhase {
                operation: "reveal",
                phase,
            });
        }

        let epoch = state.epoch;
        let message = self.reveal_message_for(epoch);
        verify_reveal(&caller, state.commits.get(&caller), &message, signature, epoch)?;

        state.seed = fold_seed(&state.seed, signature);
        if let Some(commit) = state.commits.get_mut(&caller) {
            commit.revealed = true;
        }
        state.pending_events.push(CoordinatorEvent::CommitmentRevealed {
            executor: caller,
            epoch,
            seed: state.seed,
        });

        debug!(
            "[qc-18] {} revealed for epoch {}, seed now {}",
            hex::encode(caller),
            epoch,
            hex::encode(state.seed)
        );
        Ok(())
    }

    pub(super) fn apply_initiate_epoch(
        &self,
        state: &mut CoordinatorState,
        now: u64,
    ) -> CoordinatorResult<DistributionPlan> {
        if now < state.epoch_end_time {
            return Err(CoordinatorError::EpochNotElapsed {
                epoch_end_time: state.epoch_end_time,
                now,
            });
        }

        // Receivers that unstaked since checking in are skipped
        let participants: Vec<Participation> = state
            .pool_cut_receivers
            .iter()
            .filter_map(|address| state.initialized(address))
            .map(|e| Participation {
                address: e.address,
                rounds_checked_in: e.rounds_checked_in_epoch,
                executions: e.executions_in_rounds_in_epoch,
            })
            .collect();

        let plan = plan_distribution(
            state.pools.epoch_pool,
            self.config.protocol_pool_cut_bps,
            self.config.rounds_per_epoch,
            self.config.max_reward_per_execution,
            &participants,
        );

        for (address, reward) in &plan.rewards {
            if let Some(executor) = state.executors.get_mut(address) {
                executor.balance = executor
                    .balance
                    .checked_add(*reward)
                    .ok_or(CoordinatorError::ArithmeticOverflow("epoch reward"))?;
                executor.reset_epoch_counters();
            }
        }

        let pools = &mut state.pools;
        pools.protocol = pools
            .protocol
            .checked_add(plan.protocol_cut)
            .ok_or(CoordinatorError::ArithmeticOverflow("protocol balance"))?;
        pools.epoch_pool = plan.next_epoch_pool(pools.epoch_pool, pools.next_epoch_pool);
        pools.next_epoch_pool = 0;

        state.pool_cut_receivers.clear();
        state.epoch_end_time = state
            .epoch_end_time
            .checked_add(self.config.epoch_duration())
            .ok_or(CoordinatorError::ArithmeticOverflow("epoch end time"))?;
        state.epoch += 1;
        state.seed = epoch_seed(self.config.chain_id, state.epoch);

        state.pending_events.push(CoordinatorEvent::EpochInitiated {
            epoch: state.epoch,
            epoch_end_time: state.epoch_end_time,
            protocol_cut: plan.protocol_cut,
            total_distributed: plan.total_distributed,
        });

        info!(
            "[qc-18] Epoch {} initiated: protocol cut {}, distributed {} to {} executors, pool {}",
            state.epoch,
            plan.protocol_cut,
            plan.total_distributed,
            plan.rewards.len(),
            state.pools.epoch_pool
        );
        Ok(plan)
    }
}
