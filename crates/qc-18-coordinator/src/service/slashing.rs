//! # Slashing Engine
//!
//! Both penalties are collectible only in the slashing window and split
//! between the reporting recipient and the protocol pot.

use super::*;
use crate::algorithms::{compute_slash, SlashKind, SlashSplit};

impl<L, C> Coordinator<L, C>
where
    L: TokenLedger,
    C: Clock,
{
    fn require_slashing_window(
        &self,
        state: &CoordinatorState,
        now: u64,
        operation: &'static str,
    ) -> CoordinatorResult<()> {
        let phase = self.phase_at(state, now);
        if phase != Phase::Slashing {
            return Err(CoordinatorError::WrongPhase { operation, phase });
        }
        Ok(())
    }

    pub(super) fn apply_slash_inactive_executor(
        &self,
        state: &mut CoordinatorState,
        now: u64,
        executor: Address,
        round: u32,
        recipient: Address,
    ) -> CoordinatorResult<SlashSplit> {
        self.require_slashing_window(state, now, "slash_inactive_executor")?;
        if round >= self.config.rounds_per_epoch {
            return Err(CoordinatorError::RoundOutOfRange {
                round,
                rounds_per_epoch: self.config.rounds_per_epoch,
            });
        }

        let epoch = state.epoch;
        let target = state
            .initialized(&executor)
            .ok_or(CoordinatorError::NotInitialized(executor))?;
        if !target.active {
            return Err(CoordinatorError::NotActive(executor));
        }
        if select(&state.seed, round, state.active.len()) != Some(target.array_index) {
            return Err(CoordinatorError::NotSelected { executor, round });
        }
        if target.has_checked_in(epoch, round) {
            return Err(CoordinatorError::AlreadyCheckedIn { executor, round });
        }
        if target.is_slashed_for(epoch, round) {
            return Err(CoordinatorError::AlreadySlashed { executor, round });
        }

        if let Some(target) = state.initialized_mut(&executor) {
            target.mark_slashed(epoch, round);
        }
        self.apply_penalty(
            state,
            SlashKind::Inactive,
            executor,
            recipient,
            self.config.inactive_slashing_amount_per_module,
        )
    }

    pub(super) fn apply_slash_committer(
        &self,
        state: &mut CoordinatorState,
        now: u64,
        executor: Address,
        recipient: Address,
    ) -> CoordinatorResult<SlashSplit> {
        self.require_slashing_window(state, now, "slash_committer")?;
        if state.initialized(&executor).is_none() {
            return Err(CoordinatorError::NotInitialized(executor));
        }

        let epoch = state.epoch;
        let commit = state
            .commits
            .get_mut(&executor)
            .ok_or(CoordinatorError::NoCommitment(executor))?;
        if commit.epoch != epoch {
            return Err(CoordinatorError::StaleCommitment {
                commitment_epoch: commit.epoch,
                current_epoch: epoch,
            });
        }
        if commit.revealed {
            return Err(CoordinatorError::AlreadyRevealed);
        }
        commit.revealed = true;

        self.apply_penalty(
            state,
            SlashKind::Committer,
            executor,
            recipient,
            self.config.commit_slashing_amount_per_module,
        )
    }

    /// Debit the penalty, pay the recipient half and the protocol the rest.
    fn apply_penalty(
        &self,
        state: &mut CoordinatorState,
        kind: SlashKind,
        executor: Address,
        recipient: Address,
        amount_per_module: u128,
    ) -> CoordinatorResult<SlashSplit> {
        let target = state
            .initialized_mut(&executor)
            .ok_or(CoordinatorError::NotInitialized(executor))?;
        let split = compute_slash(amount_per_module, target.module_count(), target.balance);
        target.balance -= split.penalty;

        state.pools.protocol = state
            .pools
            .protocol
            .checked_add(split.protocol_share)
            .ok_or(CoordinatorError::ArithmeticOverflow("protocol balance"))?;

        let pay_directly = match state.initialized_mut(&recipient) {
            Some(reporter) => {
                reporter.balance = reporter
                    .balance
                    .checked_add(split.recipient_share)
                    .ok_or(CoordinatorError::ArithmeticOverflow("slash reward"))?;
                false
            }
            None => true,
        };
        // Threshold is judged on the balance after the reward lands
        state.enforce_threshold(executor, self.config.staking_balance_threshold_per_module);

        state.pending_events.push(CoordinatorEvent::Slashed {
            kind,
            executor,
            recipient,
            penalty: split.penalty,
        });

        if pay_directly && split.recipient_share > 0 {
            self.ledger
                .transfer(&self.custody, &recipient, split.recipient_share)?;
        }

        warn!(
            "[qc-18] {} slashed ({}) for {}: {} to {}, {} to protocol",
            hex::encode(executor),
            kind.as_str(),
            split.penalty,
            split.recipient_share,
            hex::encode(recipient),
            split.protocol_share
        );
        Ok(split)
    }
}
