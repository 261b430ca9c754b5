//! Ring assembly: one real output hidden among decoys.

use cnote_core::types::{KeyImage, Output, PublicKey, RandomOutput, SecretKey, TransactionKey};

use crate::error::WalletError;

/// A ring member as it appears in an input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RingMember {
    pub key: PublicKey,
    pub global_index: u64,
}

/// A spent output together with its ring, ready to be signed.
///
/// Only lives for the duration of one build.
#[derive(Clone, Debug)]
pub struct MixedInput {
    pub amount: u64,
    pub key_image: KeyImage,
    /// Ring members sorted by global index.
    pub ring: Vec<RingMember>,
    /// Position of the real output in `ring`.
    pub real_output_index: usize,
    pub transaction_key: TransactionKey,
    pub public_ephemeral: PublicKey,
    pub private_ephemeral: SecretKey,
}

impl MixedInput {
    /// Absolute global indices of the ring, in ring order.
    pub fn global_indices(&self) -> Vec<u64> {
        self.ring.iter().map(|m| m.global_index).collect()
    }

    pub fn ring_keys(&self) -> Vec<PublicKey> {
        self.ring.iter().map(|m| m.key).collect()
    }
}

/// Build the ring for one owned output.
///
/// Decoys are taken in global-index order, skipping any that collide with
/// the real output, until `mixin` have been collected. The real output is
/// then inserted and the ring sorted by global index.
pub fn mix_input(output: &Output, decoys: &[RandomOutput], mixin: usize) -> Result<MixedInput, WalletError> {
    let spendable = output.input.as_ref().zip(output.key_image);
    let Some((input, key_image)) = spendable else {
        return Err(WalletError::UnspendableOutput(output.global_index));
    };
    let Some(private_ephemeral) = input.private_ephemeral.clone() else {
        return Err(WalletError::UnspendableOutput(output.global_index));
    };

    let mut ring = Vec::with_capacity(mixin + 1);
    if mixin > 0 {
        let mut sorted = decoys.to_vec();
        sorted.sort_by_key(|d| d.global_index);
        ring.extend(
            sorted
                .iter()
                .filter(|d| d.global_index != output.global_index)
                .take(mixin)
                .map(|d| RingMember { key: d.key, global_index: d.global_index }),
        );
        if ring.len() < mixin {
            return Err(WalletError::InsufficientDecoys(format!(
                "output {} has {} usable decoys, mixin is {mixin}",
                output.global_index,
                ring.len()
            )));
        }
    }

    ring.push(RingMember { key: output.key, global_index: output.global_index });
    ring.sort_by_key(|m| m.global_index);
    let real_output_index = ring
        .iter()
        .position(|m| m.global_index == output.global_index && m.key == output.key)
        .ok_or(WalletError::UnspendableOutput(output.global_index))?;

    Ok(MixedInput {
        amount: output.amount,
        key_image,
        ring,
        real_output_index,
        transaction_key: input.transaction_key,
        public_ephemeral: input.public_ephemeral,
        private_ephemeral,
    })
}
