//! # Commit-Reveal Randomness
//!
//! Executors commit to `keccak256(signature)` during the commit phase and
//! reveal the signature during the reveal phase. The signature is a
//! recoverable secp256k1 signature over a message bound to the chain id,
//! the coordinator's custody address and the epoch number, so a secret
//! cannot be replayed across epochs or deployments.
//!
//! Every accepted reveal folds into the running seed:
//! `seed := keccak256(seed ‖ signature)`. No single revealer controls the
//! outcome and later reveals still move it. If every revealer colludes, or
//! only one ever reveals, the round schedule is predictable; at least one
//! honest, unpredictable revealer per epoch is assumed.

use crate::domain::{keccak256, Address, CommitData, Hash};
use crate::error::{CoordinatorError, CoordinatorResult};
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};

/// `r ‖ s ‖ v`
pub const REVEAL_SIGNATURE_LEN: usize = 65;

const REVEAL_DOMAIN: &[u8] = b"qc-18 reveal";
const SEED_DOMAIN: &[u8] = b"qc-18 seed";

/// Message an executor signs to produce its reveal for `epoch`.
pub fn reveal_message(chain_id: u64, coordinator: &Address, epoch: u64) -> Hash {
    keccak256(&[
        REVEAL_DOMAIN,
        &chain_id.to_be_bytes(),
        coordinator,
        &epoch.to_be_bytes(),
    ])
}

/// Commitment stored for a reveal signature.
pub fn commitment_of(signature: &[u8]) -> Hash {
    keccak256(&[signature])
}

/// Fresh seed for the start of `epoch`.
pub fn epoch_seed(chain_id: u64, epoch: u64) -> Hash {
    keccak256(&[SEED_DOMAIN, &chain_id.to_be_bytes(), &epoch.to_be_bytes()])
}

/// Fold an accepted reveal into the running seed.
pub fn fold_seed(seed: &Hash, signature: &[u8]) -> Hash {
    keccak256(&[seed, signature])
}

/// Ethereum address of a secp256k1 public key.
pub fn address_of(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let hash = keccak256(&[&point.as_bytes()[1..]]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    address
}

/// Produce the 65-byte reveal signature for `message`.
pub fn sign_reveal(key: &SigningKey, message: &Hash) -> CoordinatorResult<[u8; REVEAL_SIGNATURE_LEN]> {
    let (signature, recovery_id) = key
        .sign_prehash_recoverable(message)
        .map_err(|_| CoordinatorError::SignatureRecoveryFailed)?;
    let mut out = [0u8; REVEAL_SIGNATURE_LEN];
    out[..64].copy_from_slice(&signature.to_bytes());
    out[64] = 27 + recovery_id.to_byte();
    Ok(out)
}

/// Recover the signer of a reveal. Lengths other than 65 are rejected
/// before any hashing.
pub fn recover_revealer(message: &Hash, signature: &[u8]) -> CoordinatorResult<Address> {
    if signature.len() != REVEAL_SIGNATURE_LEN {
        return Err(CoordinatorError::MalformedSignature {
            expected: REVEAL_SIGNATURE_LEN,
            actual: signature.len(),
        });
    }
    let v = match signature[64] {
        v @ (0 | 1) => v,
        v @ (27 | 28) => v - 27,
        _ => return Err(CoordinatorError::SignatureRecoveryFailed),
    };
    let recovery_id = RecoveryId::from_byte(v).ok_or(CoordinatorError::SignatureRecoveryFailed)?;
    let sig = Signature::from_slice(&signature[..64])
        .map_err(|_| CoordinatorError::SignatureRecoveryFailed)?;
    let key = VerifyingKey::recover_from_prehash(message, &sig, recovery_id)
        .map_err(|_| CoordinatorError::SignatureRecoveryFailed)?;
    Ok(address_of(&key))
}

/// Check a reveal against the caller's stored commitment.
///
/// Order: length, signer, commitment match, epoch, not yet revealed.
pub fn verify_reveal(
    caller: &Address,
    commit: Option<&CommitData>,
    message: &Hash,
    signature: &[u8],
    current_epoch: u64,
) -> CoordinatorResult<()> {
    let signer = recover_revealer(message, signature)?;
    if signer != *caller {
        return Err(CoordinatorError::SignerMismatch {
            expected: *caller,
            actual: signer,
        });
    }

    let commit = commit.ok_or(CoordinatorError::CommitmentMismatch)?;
    if commit.commitment != commitment_of(signature) {
        return Err(CoordinatorError::CommitmentMismatch);
    }
    if commit.epoch != current_epoch {
        return Err(CoordinatorError::StaleCommitment {
            commitment_epoch: commit.epoch,
            current_epoch,
        });
    }
    if commit.revealed {
        return Err(CoordinatorError::AlreadyRevealed);
    }
    Ok(())
}
