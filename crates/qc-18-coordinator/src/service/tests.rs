//! # Coordinator Service Tests

use super::*;
use crate::adapters::{InMemoryTokenLedger, ManualClock, ScriptedJobRegistry};
use crate::algorithms::{address_of, commitment_of, epoch_seed, fold_seed, sign_reveal};
use crate::domain::ModuleId;
use crate::error::TokenError;
use crate::events::DeactivationReason;
use crate::ports::inbound::CoordinatorApi;
use k256::ecdsa::SigningKey;
use std::sync::Mutex;

const T0: u64 = 1_700_000_000;
const OWNER: Address = [0xAA; 20];
const CUSTODY: Address = [0xCC; 20];
const ALICE: Address = [0x01; 20];
const BOB: Address = [0x02; 20];
const CAROL: Address = [0x03; 20];
const OUTSIDER: Address = [0x0F; 20];
const REPORTER: Address = [0x0E; 20];

// Default config offsets from epoch start
const REVEAL: u64 = 120;
const ROUND_0: u64 = 240;
const ROUND_2: u64 = 240 + 2 * 75;
const SLASHING: u64 = 540;
const ELAPSED: u64 = 720;

struct Harness {
    coordinator: Coordinator<InMemoryTokenLedger, ManualClock>,
    ledger: Arc<InMemoryTokenLedger>,
    clock: Arc<ManualClock>,
    registry: Arc<ScriptedJobRegistry>,
}

impl Harness {
    fn fund(&self, who: Address, amount: u128) {
        self.ledger.mint(who, amount);
        self.ledger.approve(who, CUSTODY, u128::MAX);
    }

    fn at(&self, offset: u64) {
        self.clock.set_time(T0 + offset);
    }

    fn stake_funded(&self, who: Address, ids: &[ModuleId]) -> u128 {
        self.fund(who, 100_000);
        self.coordinator
            .stake(who, ModuleSet::from_ids(ids))
            .unwrap()
    }

    fn balance(&self, who: &Address) -> u128 {
        self.coordinator.executor(who).map(|e| e.balance).unwrap_or(0)
    }

    fn assert_invariants(&self) {
        assert_eq!(self.coordinator.check_invariants(), Ok(()));
    }
}

fn harness_with(config: CoordinatorConfig) -> Harness {
    let ledger = Arc::new(InMemoryTokenLedger::new());
    let clock = Arc::new(ManualClock::new(T0));
    let coordinator = Coordinator::new(
        config,
        OWNER,
        CUSTODY,
        CoordinatorDependencies {
            ledger: ledger.clone(),
            clock: clock.clone(),
        },
    )
    .unwrap();

    for name in ["keeper", "native-fee", "erc20-fee"] {
        coordinator.add_module(OWNER, name).unwrap();
    }
    let registry = Arc::new(ScriptedJobRegistry::new());
    coordinator.add_job_registry(OWNER, registry.clone()).unwrap();
    registry.add_standard_job(1, 0, 1);
    registry.add_standard_job(2, 2, 2);
    registry.add_zero_fee_job(3, 0, 1);
    registry.add_reverting_job(4, "reverted");

    Harness {
        coordinator,
        ledger,
        clock,
        registry,
    }
}

fn harness() -> Harness {
    harness_with(CoordinatorConfig::default())
}

fn key(n: u8) -> SigningKey {
    SigningKey::from_slice(&[n; 32]).unwrap()
}

/// Two staked executors; returns (designated, other) for `round`.
fn two_executors(h: &Harness, round: u32) -> (Address, Address) {
    h.stake_funded(ALICE, &[0, 1]);
    h.stake_funded(BOB, &[0, 1]);
    let designated = h.coordinator.designated_executor(round).unwrap();
    let other = if designated == ALICE { BOB } else { ALICE };
    (designated, other)
}

// =============================================================================
// Construction and owner operations
// =============================================================================

#[test]
fn test_new_starts_epoch_one() {
    let h = harness();
    assert_eq!(h.coordinator.epoch(), 1);
    assert_eq!(h.coordinator.epoch_end_time(), T0 + ELAPSED);
    assert_eq!(h.coordinator.seed(), epoch_seed(1, 1));
    assert_eq!(h.coordinator.current_phase(), Phase::Commit);
    assert_eq!(h.coordinator.modules().len(), 3);
    h.assert_invariants();
}

#[test]
fn test_new_rejects_invalid_config() {
    let config = CoordinatorConfig {
        rounds_per_epoch: 0,
        ..Default::default()
    };
    let result = Coordinator::new(
        config,
        OWNER,
        CUSTODY,
        CoordinatorDependencies {
            ledger: Arc::new(InMemoryTokenLedger::new()),
            clock: Arc::new(ManualClock::new(T0)),
        },
    );
    assert!(matches!(result, Err(CoordinatorError::InvalidConfig(_))));
}

#[test]
fn test_owner_only_operations() {
    let h = harness();
    assert!(matches!(
        h.coordinator.add_module(ALICE, "rogue"),
        Err(CoordinatorError::Unauthorized(a)) if a == ALICE
    ));
    assert!(matches!(
        h.coordinator
            .add_job_registry(ALICE, Arc::new(ScriptedJobRegistry::new())),
        Err(CoordinatorError::Unauthorized(_))
    ));
    assert!(matches!(
        h.coordinator.withdraw_protocol_balance(ALICE, ALICE),
        Err(CoordinatorError::Unauthorized(_))
    ));
}

#[test]
fn test_module_catalog_is_bounded() {
    let h = harness();
    for n in 3..256 {
        assert_eq!(
            h.coordinator.add_module(OWNER, &format!("m{n}")).unwrap(),
            n as ModuleId
        );
    }
    assert!(matches!(
        h.coordinator.add_module(OWNER, "overflow"),
        Err(CoordinatorError::ModuleCatalogFull)
    ));
}

// =============================================================================
// Staking ledger
// =============================================================================

#[test]
fn test_stake_charges_per_module() {
    let h = harness();
    let staked = h.stake_funded(ALICE, &[0, 1]);

    assert_eq!(staked, 2_000);
    assert_eq!(h.balance(&ALICE), 2_000);
    assert_eq!(h.ledger.balance_of(&ALICE), 98_000);
    assert_eq!(h.coordinator.active_executors(), vec![ALICE]);

    let executor = h.coordinator.executor(&ALICE).unwrap();
    assert!(executor.active && executor.initialized);
    assert_eq!(executor.last_registration_timestamp, T0);

    let events = h.coordinator.drain_events();
    assert!(matches!(
        events[0],
        CoordinatorEvent::ExecutorActivated { executor, array_index: 0 } if executor == ALICE
    ));
    assert!(matches!(
        events[1],
        CoordinatorEvent::ModulesRegistered { amount_charged: 2_000, .. }
    ));
    h.assert_invariants();
}

#[test]
fn test_stake_filters_unknown_modules() {
    let h = harness();
    h.fund(ALICE, 10_000);
    let result = h.coordinator.stake(ALICE, ModuleSet::from_ids(&[0, 9]));
    assert!(matches!(
        result,
        Err(CoordinatorError::InsufficientModules { count: 1, minimum: 2 })
    ));
}

#[test]
fn test_stake_twice_rejected() {
    let h = harness();
    h.stake_funded(ALICE, &[0, 1]);
    assert!(matches!(
        h.coordinator.stake(ALICE, ModuleSet::from_ids(&[0, 1, 2])),
        Err(CoordinatorError::AlreadyStaked(_))
    ));
}

#[test]
fn test_stake_window() {
    let h = harness();
    h.fund(ALICE, 10_000);

    for offset in [REVEAL, ROUND_0, SLASHING] {
        h.at(offset);
        assert!(matches!(
            h.coordinator.stake(ALICE, ModuleSet::from_ids(&[0, 1])),
            Err(CoordinatorError::WrongPhase { operation: "stake", .. })
        ));
    }

    h.at(ELAPSED);
    assert!(h.coordinator.stake(ALICE, ModuleSet::from_ids(&[0, 1])).is_ok());
}

#[test]
fn test_stake_token_failure_leaves_no_trace() {
    let h = harness();
    h.ledger.mint(ALICE, 10_000); // no allowance

    let result = h.coordinator.stake(ALICE, ModuleSet::from_ids(&[0, 1]));
    assert!(matches!(
        result,
        Err(CoordinatorError::TokenTransferFailed(
            TokenError::InsufficientAllowance { .. }
        ))
    ));
    assert!(h.coordinator.executor(&ALICE).is_none());
    assert_eq!(h.coordinator.number_of_active_executors(), 0);
    assert!(h.coordinator.drain_events().is_empty());
    h.assert_invariants();
}


#[test]
fn test_topup_reactivates() {
    let config = CoordinatorConfig {
        staking_amount_per_module: 100,
        staking_balance_threshold_per_module: 100,
        ..Default::default()
    };
    let h = harness_with(config);
    h.stake_funded(ALICE, &[0, 1]);

    // One taxed job outside a round drops Alice below 2 * 100
    h.coordinator
        .execute_batch(ALICE, &[1], &[100_000], ALICE, 0)
        .unwrap();
    assert_eq!(h.balance(&ALICE), 190);
    assert!(!h.coordinator.executor(&ALICE).unwrap().active);
    assert_eq!(h.coordinator.number_of_active_executors(), 0);

    assert!(matches!(
        h.coordinator.topup(ALICE, 5),
        Err(CoordinatorError::BalanceBelowMinimum { balance: 195, minimum: 200 })
    ));

    h.coordinator.topup(ALICE, 10).unwrap();
    assert_eq!(h.balance(&ALICE), 200);
    assert_eq!(h.coordinator.active_executors(), vec![ALICE]);
    h.assert_invariants();
}

#[test]
fn test_topup_requires_stake() {
    let h = harness();
    h.fund(ALICE, 1_000);
    assert!(matches!(
        h.coordinator.topup(ALICE, 10),
        Err(CoordinatorError::NotInitialized(_))
    ));
}

#[test]
fn test_unstake_gates() {
    let h = harness();
    h.stake_funded(ALICE, &[0, 1]);

    h.at(REVEAL);
    assert!(matches!(
        h.coordinator.unstake(ALICE),
        Err(CoordinatorError::WrongPhase { .. })
    ));

    // Commit phase is closed to unstaking as well
    h.at(0);
    assert!(matches!(
        h.coordinator.unstake(ALICE),
        Err(CoordinatorError::WrongPhase { .. })
    ));

    h.at(ELAPSED);
    assert!(matches!(
        h.coordinator.unstake(ALICE),
        Err(CoordinatorError::MinimumRegistrationPeriod { available_at, .. })
            if available_at == T0 + 3_600
    ));

    h.at(3_600);
    assert_eq!(h.coordinator.unstake(ALICE).unwrap(), 2_000);
    assert!(h.coordinator.executor(&ALICE).is_none());
    assert_eq!(h.ledger.balance_of(&ALICE), 100_000);
    h.assert_invariants();
}

#[test]
fn test_unstake_keeps_active_set_dense() {
    let h = harness();
    h.stake_funded(ALICE, &[0, 1]);
    h.stake_funded(BOB, &[0, 1]);
    h.stake_funded(CAROL, &[0, 1]);

    h.at(3_600);
    h.coordinator.unstake(ALICE).unwrap();

    assert_eq!(h.coordinator.active_executors(), vec![CAROL, BOB]);
    assert_eq!(h.coordinator.executor(&CAROL).unwrap().array_index, 0);
    let events = h.coordinator.drain_events();
    assert!(events.iter().any(|e| matches!(
        e,
        CoordinatorEvent::ExecutorDeactivated { reason: DeactivationReason::Unstaked, .. }
    )));
    h.assert_invariants();

    // Restaking reuses the freed slot
    h.coordinator
        .stake(ALICE, ModuleSet::from_ids(&[0, 1]))
        .unwrap();
    assert_eq!(h.coordinator.executor(&ALICE).unwrap().array_index, 2);
    h.assert_invariants();
}

#[test]
fn test_register_modules() {
    let h = harness();
    h.stake_funded(ALICE, &[0, 1]);

    assert!(matches!(
        h.coordinator
            .register_modules(ALICE, ModuleSet::from_ids(&[1, 2])),
        Err(CoordinatorError::ModulesAlreadyRegistered)
    ));
    assert!(matches!(
        h.coordinator.register_modules(ALICE, ModuleSet::from_ids(&[7])),
        Err(CoordinatorError::NoModulesToRegister)
    ));

    h.clock.advance_time(30);
    let charged = h
        .coordinator
        .register_modules(ALICE, ModuleSet::from_ids(&[2]))
        .unwrap();
    assert_eq!(charged, 1_000);

    let executor = h.coordinator.executor(&ALICE).unwrap();
    assert_eq!(executor.balance, 3_000);
    assert_eq!(executor.registered_modules, ModuleSet::from_ids(&[0, 1, 2]));
    assert_eq!(executor.last_registration_timestamp, T0 + 30);
    h.assert_invariants();
}

#[test]
fn test_deregister_modules() {
    let h = harness();
    h.stake_funded(ALICE, &[0, 1, 2]);

    h.at(ELAPSED);
    assert!(matches!(
        h.coordinator
            .deregister_modules(ALICE, ModuleSet::from_ids(&[0])),
        Err(CoordinatorError::MinimumRegistrationPeriod { .. })
    ));

    h.at(3_600);
    assert!(matches!(
        h.coordinator
            .deregister_modules(ALICE, ModuleSet::from_ids(&[0, 1])),
        Err(CoordinatorError::InsufficientModules { count: 1, .. })
    ));
    assert!(matches!(
        h.coordinator.deregister_modules(ALICE, ModuleSet::from_ids(&[5])),
        Err(CoordinatorError::NoModulesToDeregister)
    ));

    h.coordinator
        .deregister_modules(ALICE, ModuleSet::from_ids(&[0]))
        .unwrap();
    assert_eq!(
        h.coordinator.executor(&ALICE).unwrap().registered_modules,
        ModuleSet::from_ids(&[1, 2])
    );
    h.assert_invariants();
}

#[test]
fn test_withdraw_staking_balance_keeps_floor() {
    let h = harness();
    h.stake_funded(ALICE, &[0, 1]);
    h.coordinator.topup(ALICE, 500).unwrap();

    assert!(matches!(
        h.coordinator.withdraw_staking_balance(ALICE, 600),
        Err(CoordinatorError::BalanceBelowMinimum { balance: 1_900, minimum: 2_000 })
    ));
    assert!(matches!(
        h.coordinator.withdraw_staking_balance(ALICE, 5_000),
        Err(CoordinatorError::InsufficientBalance { .. })
    ));

    // Any phase
    h.at(ROUND_0);
    h.coordinator.withdraw_staking_balance(ALICE, 500).unwrap();
    assert_eq!(h.balance(&ALICE), 2_000);
    h.assert_invariants();
}

// =============================================================================
// Batch execution
// =============================================================================

#[test]
fn test_batch_outside_round_feeds_next_pool() {
    let h = harness();
    h.stake_funded(ALICE, &[0, 1]);

    let outcome = h
        .coordinator
        .execute_batch(ALICE, &[1, 4, 2, 99], &[1, 1, 1, 1], OUTSIDER, 0)
        .unwrap();

    assert_eq!(outcome.success_count, 2);
    assert_eq!(outcome.failure_count, 2);
    assert_eq!(outcome.standard_tax, 20);
    assert_eq!(h.balance(&ALICE), 1_980);
    assert_eq!(h.coordinator.pools().next_epoch_pool, 20);
    assert_eq!(h.coordinator.pools().protocol, 0);
    assert_eq!(h.registry.calls()[0], (1, 1, OUTSIDER));
    h.assert_invariants();
}

#[test]
fn test_batch_rejections() {
    let h = harness();
    h.stake_funded(ALICE, &[0, 1]);

    assert!(matches!(
        h.coordinator.execute_batch(ALICE, &[1, 2], &[1], ALICE, 0),
        Err(CoordinatorError::LengthMismatch { indices: 2, gas_limits: 1 })
    ));
    assert!(matches!(
        h.coordinator.execute_batch(ALICE, &[1], &[1], ALICE, 3),
        Err(CoordinatorError::UnknownJobRegistry(3))
    ));

    h.at(ELAPSED);
    assert!(matches!(
        h.coordinator.execute_batch(ALICE, &[1], &[1], ALICE, 0),
        Err(CoordinatorError::EpochElapsed { .. })
    ));
}

#[test]
fn test_zero_fee_tax_split_for_outsider() {
    let config = CoordinatorConfig {
        zero_fee_execution_tax: 5,
        ..Default::default()
    };
    let h = harness_with(config);
    h.fund(OUTSIDER, 1_000);

    let outcome = h
        .coordinator
        .execute_batch(OUTSIDER, &[3, 1], &[1, 1], OUTSIDER, 0)
        .unwrap();

    assert_eq!(outcome.zero_fee_tax, 5);
    assert_eq!(outcome.standard_tax, 10);
    let pools = h.coordinator.pools();
    assert_eq!(pools.next_epoch_pool, 10 + 2);
    assert_eq!(pools.protocol, 3);
    assert_eq!(h.ledger.balance_of(&OUTSIDER), 985);
    h.assert_invariants();
}

#[test]
fn test_outsider_without_allowance_rolls_back() {
    let h = harness();
    h.ledger.mint(OUTSIDER, 1_000);

    let result = h
        .coordinator
        .execute_batch(OUTSIDER, &[1], &[1], OUTSIDER, 0);
    assert!(matches!(result, Err(CoordinatorError::TokenTransferFailed(_))));
    assert_eq!(h.coordinator.pools(), PoolBalances::default());
    assert!(h.coordinator.drain_events().is_empty());
}

#[test]
fn test_designated_executor_checks_in() {
    let h = harness();
    let (designated, _) = two_executors(&h, 0);

    h.at(ROUND_0);
    let outcome = h
        .coordinator
        .execute_batch(designated, &[1, 1, 3], &[1, 1, 1], designated, 0)
        .unwrap();
    assert_eq!(outcome.success_count, 3);

    // Round tax funds the protocol
    let pools = h.coordinator.pools();
    assert_eq!(pools.protocol, 20 + 2);
    assert_eq!(pools.next_epoch_pool, 2);

    let executor = h.coordinator.executor(&designated).unwrap();
    assert_eq!(executor.rounds_checked_in_epoch, 1);
    assert_eq!(executor.executions_in_rounds_in_epoch, 2);
    assert!(executor.has_checked_in(1, 0));
    assert_eq!(h.coordinator.pool_cut_receivers(), vec![designated]);

    // Same round again: executions accumulate, rounds do not
    h.coordinator
        .execute_batch(designated, &[1], &[1], designated, 0)
        .unwrap();
    let executor = h.coordinator.executor(&designated).unwrap();
    assert_eq!(executor.rounds_checked_in_epoch, 1);
    assert_eq!(executor.executions_in_rounds_in_epoch, 3);
    assert_eq!(h.coordinator.pool_cut_receivers(), vec![designated]);
    h.assert_invariants();
}

#[test]
fn test_zero_fee_only_batch_does_not_check_in() {
    let h = harness();
    let (designated, _) = two_executors(&h, 0);

    h.at(ROUND_0);
    h.coordinator
        .execute_batch(designated, &[3], &[1], designated, 0)
        .unwrap();
    assert!(h.coordinator.pool_cut_receivers().is_empty());
    assert!(!h.coordinator.executor(&designated).unwrap().has_checked_in(1, 0));
}

#[test]
fn test_non_designated_cannot_poach() {
    let h = harness();
    let (designated, other) = two_executors(&h, 0);

    h.at(ROUND_0);
    let before = h.balance(&other);
    assert!(matches!(
        h.coordinator.execute_batch(other, &[1], &[1], other, 0),
        Err(CoordinatorError::DesignatedExecutorSupportsModules {
            execution_module: 0,
            fee_module: 1
        })
    ));
    assert_eq!(h.balance(&other), before);

    // Module 2 is not supported by the designated executor
    h.coordinator
        .execute_batch(other, &[2], &[1], other, 0)
        .unwrap();
    assert_eq!(h.balance(&other), before - 10);
    assert!(h.coordinator.pool_cut_receivers().is_empty());

    // ...and the designated executor may not run it either
    assert!(matches!(
        h.coordinator.execute_batch(designated, &[2], &[1], designated, 0),
        Err(CoordinatorError::ModulesNotSupported { .. })
    ));
    h.assert_invariants();
}

#[test]
fn test_round_buffer_is_unrestricted() {
    let h = harness();
    let (_, other) = two_executors(&h, 0);

    // 60s into round 0 is the buffer
    h.at(ROUND_0 + 60);
    h.coordinator
        .execute_batch(other, &[1], &[1], other, 0)
        .unwrap();
    assert_eq!(h.coordinator.pools().next_epoch_pool, 10);
}

#[test]
fn test_batch_deactivates_below_threshold() {
    let config = CoordinatorConfig {
        staking_amount_per_module: 100,
        staking_balance_threshold_per_module: 95,
        ..Default::default()
    };
    let h = harness_with(config);
    h.stake_funded(ALICE, &[0, 1]);
    h.stake_funded(BOB, &[0, 1]);

    h.coordinator
        .execute_batch(ALICE, &[1, 1], &[1, 1], ALICE, 0)
        .unwrap();
    assert!(!h.coordinator.executor(&ALICE).unwrap().active);
    assert_eq!(h.coordinator.active_executors(), vec![BOB]);
    h.assert_invariants();
}

#[test]
fn test_reentrant_call_is_rejected() {
    let h = Arc::new(harness());
    h.stake_funded(ALICE, &[0, 1]);

    let seen: Arc<Mutex<Option<CoordinatorResult<()>>>> = Arc::new(Mutex::new(None));
    let seen_in_hook = seen.clone();
    let weak = Arc::downgrade(&h);
    h.registry.set_hook(Box::new(move |_| {
        if let Some(h) = weak.upgrade() {
            *seen_in_hook.lock().unwrap() = Some(h.coordinator.topup(ALICE, 1));
        }
    }));

    h.coordinator
        .execute_batch(ALICE, &[1], &[1], ALICE, 0)
        .unwrap();
    assert!(matches!(
        seen.lock().unwrap().take(),
        Some(Err(CoordinatorError::Reentrancy))
    ));

    // Guard released afterwards
    h.coordinator.topup(ALICE, 1).unwrap();
    assert_eq!(h.balance(&ALICE), 2_000 - 10 + 1);
}

// =============================================================================
// Commit-reveal
// =============================================================================

#[test]
fn test_commit_reveal_folds_seed() {
    let h = harness();
    let alice_key = key(1);
    let alice = address_of(alice_key.verifying_key());
    h.stake_funded(alice, &[0, 1]);

    let signature = sign_reveal(&alice_key, &h.coordinator.reveal_message_for(1)).unwrap();
    h.coordinator
        .commit(alice, commitment_of(&signature))
        .unwrap();
    assert!(matches!(
        h.coordinator.commit(alice, [0; 32]),
        Err(CoordinatorError::AlreadyCommitted(1))
    ));
    assert!(matches!(
        h.coordinator.reveal(alice, &signature),
        Err(CoordinatorError::WrongPhase { operation: "reveal", .. })
    ));

    h.at(REVEAL);
    let before = h.coordinator.seed();
    h.coordinator.reveal(alice, &signature).unwrap();
    assert_eq!(h.coordinator.seed(), fold_seed(&before, &signature));
    assert!(h.coordinator.commit_data(&alice).unwrap().revealed);

    assert!(matches!(
        h.coordinator.reveal(alice, &signature),
        Err(CoordinatorError::AlreadyRevealed)
    ));
}

#[test]
fn test_reveal_rejections() {
    let h = harness();
    let (alice_key, bob_key) = (key(1), key(2));
    let alice = address_of(alice_key.verifying_key());
    let bob = address_of(bob_key.verifying_key());
    h.stake_funded(alice, &[0, 1]);
    h.stake_funded(bob, &[0, 1]);

    let message = h.coordinator.reveal_message_for(1);
    let alice_sig = sign_reveal(&alice_key, &message).unwrap();
    let bob_sig = sign_reveal(&bob_key, &message).unwrap();
    h.coordinator.commit(bob, commitment_of(&bob_sig)).unwrap();

    h.at(REVEAL);
    assert!(matches!(
        h.coordinator.reveal(bob, &alice_sig),
        Err(CoordinatorError::SignerMismatch { .. })
    ));
    assert!(matches!(
        h.coordinator.reveal(bob, &bob_sig[..64]),
        Err(CoordinatorError::MalformedSignature { actual: 64, .. })
    ));
    // Alice never committed
    assert!(matches!(
        h.coordinator.reveal(alice, &alice_sig),
        Err(CoordinatorError::CommitmentMismatch)
    ));
    assert_eq!(h.coordinator.seed(), epoch_seed(1, 1));
}

#[test]
fn test_commit_requires_active_executor() {
    let h = harness();
    assert!(matches!(
        h.coordinator.commit(OUTSIDER, [1; 32]),
        Err(CoordinatorError::NotInitialized(_))
    ));

    h.stake_funded(ALICE, &[0, 1]);
    h.at(REVEAL);
    assert!(matches!(
        h.coordinator.commit(ALICE, [1; 32]),
        Err(CoordinatorError::WrongPhase { operation: "commit", .. })
    ));
}

#[test]
fn test_stale_commitment_cannot_be_revealed() {
    let h = harness();
    let alice_key = key(1);
    let alice = address_of(alice_key.verifying_key());
    h.stake_funded(alice, &[0, 1]);

    // Commit in epoch 1 to a secret for epoch 2
    let next_sig = sign_reveal(&alice_key, &h.coordinator.reveal_message_for(2)).unwrap();
    h.coordinator
        .commit(alice, commitment_of(&next_sig))
        .unwrap();

    h.at(ELAPSED);
    h.coordinator.initiate_epoch(OUTSIDER).unwrap();
    h.at(ELAPSED + REVEAL);
    assert!(matches!(
        h.coordinator.reveal(alice, &next_sig),
        Err(CoordinatorError::StaleCommitment {
            commitment_epoch: 1,
            current_epoch: 2
        })
    ));
}

// =============================================================================
// Slashing
// =============================================================================

#[test]
fn test_slash_committer() {
    let h = harness();
    h.stake_funded(ALICE, &[0, 1]);
    h.coordinator.commit(ALICE, [7; 32]).unwrap();

    h.at(ROUND_0);
    assert!(matches!(
        h.coordinator.slash_committer(OUTSIDER, ALICE, REPORTER),
        Err(CoordinatorError::WrongPhase { .. })
    ));

    h.at(SLASHING);
    let penalty = h
        .coordinator
        .slash_committer(OUTSIDER, ALICE, REPORTER)
        .unwrap();
    assert_eq!(penalty, 100);
    assert_eq!(h.balance(&ALICE), 1_900);
    assert_eq!(h.ledger.balance_of(&REPORTER), 50);
    assert_eq!(h.coordinator.pools().protocol, 50);

    assert!(matches!(
        h.coordinator.slash_committer(OUTSIDER, ALICE, REPORTER),
        Err(CoordinatorError::AlreadyRevealed)
    ));
    assert!(matches!(
        h.coordinator.slash_committer(OUTSIDER, BOB, REPORTER),
        Err(CoordinatorError::NotInitialized(_))
    ));
    h.assert_invariants();
}

#[test]
fn test_slash_inactive_executor() {
    let h = harness();
    let (designated, other) = two_executors(&h, 2);

    h.at(SLASHING);
    assert!(matches!(
        h.coordinator
            .slash_inactive_executor(OUTSIDER, other, 2, REPORTER),
        Err(CoordinatorError::NotSelected { round: 2, .. })
    ));
    assert!(matches!(
        h.coordinator
            .slash_inactive_executor(OUTSIDER, designated, 4, REPORTER),
        Err(CoordinatorError::RoundOutOfRange { round: 4, rounds_per_epoch: 4 })
    ));

    let penalty = h
        .coordinator
        .slash_inactive_executor(OUTSIDER, designated, 2, REPORTER)
        .unwrap();
    assert_eq!(penalty, 200);
    assert_eq!(h.balance(&designated), 1_800);
    assert_eq!(h.ledger.balance_of(&REPORTER), 100);
    assert_eq!(h.coordinator.pools().protocol, 100);

    assert!(matches!(
        h.coordinator
            .slash_inactive_executor(OUTSIDER, designated, 2, REPORTER),
        Err(CoordinatorError::AlreadySlashed { round: 2, .. })
    ));
    h.assert_invariants();
}

#[test]
fn test_interleaved_round_slashes_pay_once_each() {
    let h = harness();
    // Sole executor: designated for every round
    h.stake_funded(ALICE, &[0, 1, 2]);

    h.at(SLASHING);
    for round in [0, 1] {
        assert_eq!(
            h.coordinator
                .slash_inactive_executor(OUTSIDER, ALICE, round, REPORTER)
                .unwrap(),
            300
        );
    }
    for round in [0, 1] {
        assert!(matches!(
            h.coordinator
                .slash_inactive_executor(OUTSIDER, ALICE, round, REPORTER),
            Err(CoordinatorError::AlreadySlashed { round: r, .. }) if r == round
        ));
    }

    assert_eq!(h.balance(&ALICE), 2_400);
    assert_eq!(h.ledger.balance_of(&REPORTER), 300);
    assert_eq!(h.coordinator.pools().protocol, 300);
    h.assert_invariants();
}

#[test]
fn test_slash_of_other_round_keeps_checkin() {
    let h = harness();
    h.stake_funded(ALICE, &[0, 1, 2]);

    h.at(ROUND_0 + 75);
    h.coordinator
        .execute_batch(ALICE, &[1], &[1], ALICE, 0)
        .unwrap();

    h.at(SLASHING);
    h.coordinator
        .slash_inactive_executor(OUTSIDER, ALICE, 0, REPORTER)
        .unwrap();
    assert!(matches!(
        h.coordinator
            .slash_inactive_executor(OUTSIDER, ALICE, 1, REPORTER),
        Err(CoordinatorError::AlreadyCheckedIn { round: 1, .. })
    ));

    let executor = h.coordinator.executor(&ALICE).unwrap();
    assert!(executor.has_checked_in(1, 1));
    assert!(executor.is_slashed_for(1, 0));
    assert_eq!(executor.balance, 3_000 - 10 - 300);
    h.assert_invariants();
}

#[test]
fn test_self_report_judged_after_reward() {
    let h = harness_with(CoordinatorConfig {
        inactive_slashing_amount_per_module: 300,
        ..Default::default()
    });
    let (designated, _) = two_executors(&h, 3);

    // 2_000 - 600 + 300 stays above the 1_600 threshold
    h.at(SLASHING);
    h.coordinator
        .slash_inactive_executor(designated, designated, 3, designated)
        .unwrap();

    let executor = h.coordinator.executor(&designated).unwrap();
    assert_eq!(executor.balance, 1_700);
    assert!(executor.active);
    assert_eq!(h.coordinator.number_of_active_executors(), 2);
    assert_eq!(h.coordinator.pools().protocol, 300);
    h.assert_invariants();
}

#[test]
fn test_slash_reward_to_executor_stays_internal() {
    let h = harness();
    let (designated, other) = two_executors(&h, 1);

    h.at(SLASHING);
    h.coordinator
        .slash_inactive_executor(other, designated, 1, other)
        .unwrap();
    assert_eq!(h.balance(&other), 2_100);
    assert_eq!(h.ledger.balance_of(&other), 98_000);
    h.assert_invariants();
}

#[test]
fn test_checked_in_executor_cannot_be_slashed() {
    let h = harness();
    let (designated, _) = two_executors(&h, 2);

    h.at(ROUND_2);
    h.coordinator
        .execute_batch(designated, &[1], &[1], designated, 0)
        .unwrap();

    h.at(SLASHING);
    assert!(matches!(
        h.coordinator
            .slash_inactive_executor(OUTSIDER, designated, 2, REPORTER),
        Err(CoordinatorError::AlreadyCheckedIn { .. })
    ));
}

// =============================================================================
// Epoch rollover
// =============================================================================

#[test]
fn test_initiate_epoch_requires_elapsed() {
    let h = harness();
    h.at(SLASHING);
    assert!(matches!(
        h.coordinator.initiate_epoch(OUTSIDER),
        Err(CoordinatorError::EpochNotElapsed { .. })
    ));
}

#[test]
fn test_initiate_epoch_distributes() {
    let h = harness();
    h.fund(OUTSIDER, 10_000);
    two_executors(&h, 0);

    // Epoch 1: outsider fills the next-epoch pool with 50 taxed jobs
    let jobs = vec![1u64; 50];
    h.coordinator
        .execute_batch(OUTSIDER, &jobs, &jobs, OUTSIDER, 0)
        .unwrap();
    assert_eq!(h.coordinator.pools().next_epoch_pool, 500);

    h.at(ELAPSED);
    h.coordinator.initiate_epoch(OUTSIDER).unwrap();
    assert_eq!(h.coordinator.epoch(), 2);
    assert_eq!(h.coordinator.pools().epoch_pool, 500);
    assert_eq!(h.coordinator.pools().next_epoch_pool, 0);
    assert_eq!(h.coordinator.seed(), epoch_seed(1, 2));
    assert_eq!(h.coordinator.epoch_end_time(), T0 + 2 * ELAPSED);

    // Epoch 2: designated executor runs 3 jobs in round 0
    let designated = h.coordinator.designated_executor(0).unwrap();
    h.at(ELAPSED + ROUND_0);
    h.coordinator
        .execute_batch(designated, &[1, 1, 1], &[1, 1, 1], designated, 0)
        .unwrap();
    let before = h.balance(&designated);

    h.at(2 * ELAPSED);
    h.coordinator.initiate_epoch(OUTSIDER).unwrap();

    // cut = 500 * 10%; cap = 450 / 4; reward = min(3 * 20, 1 * 112)
    let pools = h.coordinator.pools();
    assert_eq!(pools.protocol, 30 + 50);
    assert_eq!(h.balance(&designated), before + 60);
    assert_eq!(pools.epoch_pool, 500 - 60 - 50);
    assert!(h.coordinator.pool_cut_receivers().is_empty());

    let executor = h.coordinator.executor(&designated).unwrap();
    assert_eq!(executor.rounds_checked_in_epoch, 0);
    assert_eq!(executor.executions_in_rounds_in_epoch, 0);
    h.assert_invariants();
}

#[test]
fn test_one_epoch_per_rollover() {
    let h = harness();
    h.at(5 * ELAPSED);
    h.coordinator.initiate_epoch(OUTSIDER).unwrap();
    assert_eq!(h.coordinator.epoch(), 2);
    assert_eq!(h.coordinator.current_phase(), Phase::EpochElapsed);
    h.coordinator.initiate_epoch(OUTSIDER).unwrap();
    assert_eq!(h.coordinator.epoch(), 3);
}

#[test]
fn test_withdraw_protocol_balance() {
    let h = harness();
    let (designated, _) = two_executors(&h, 0);
    h.at(ROUND_0);
    h.coordinator
        .execute_batch(designated, &[1], &[1], designated, 0)
        .unwrap();

    let amount = h
        .coordinator
        .withdraw_protocol_balance(OWNER, REPORTER)
        .unwrap();
    assert_eq!(amount, 10);
    assert_eq!(h.ledger.balance_of(&REPORTER), 10);
    assert_eq!(h.coordinator.pools().protocol, 0);
    h.assert_invariants();
}
