//! Ring-signed transaction builder.
//!
//! Building happens in three stages:
//! 1. Prepare: validate amounts and decoy sets, check the balance, assemble
//!    one ring per spent output, pick the transaction key and lay out the
//!    inputs and extra.
//! 2. Derive one one-time key per new output.
//! 3. Sign every input's ring over the prefix hash.
//!
//! [`TransactionBuilder::build`] and [`TransactionBuilder::build_async`] share
//! stage 1 and the per-item functions of stages 2 and 3; the async driver
//! only adds a yield point between items. With a pinned transaction key both
//! produce the same bytes.

use serde::Serialize;
use tracing::{debug, info};

use cnote_core::constants::AMOUNT_LIMIT;
use cnote_core::traits::CryptoProvider;
use cnote_core::transaction::{absolute_to_relative_offsets, Transaction, TransactionInput, TransactionOutput};
use cnote_core::types::{GeneratedOutput, Hash256, KeyPair, Output, PaymentId, RandomOutput, Signature};

use crate::error::WalletError;
use crate::ring::{mix_input, MixedInput};

/// A finished transaction with its serialized form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedTransaction {
    pub transaction: Transaction,
    pub raw_transaction: Vec<u8>,
    pub hash: Hash256,
    /// The one-off transaction key pair. The sender keeps the secret half to
    /// prove payment later.
    pub transaction_keys: KeyPair,
}

/// Everything up to, but not including, output keys and signatures.
struct Prepared {
    transaction: Transaction,
    inputs: Vec<MixedInput>,
    outputs: Vec<GeneratedOutput>,
    transaction_keys: KeyPair,
}

/// Builder for ring-signed transactions.
///
/// # Example
/// ```ignore
/// let mut builder = TransactionBuilder::new();
/// builder
///     .add_recipients(outputs)
///     .spend(owned, decoys)
///     .set_mixin(3)
///     .set_fee(10);
/// let generated = builder.build(&crypto)?;
/// ```
#[derive(Clone, Debug, Default)]
pub struct TransactionBuilder {
    recipients: Vec<GeneratedOutput>,
    our_outputs: Vec<Output>,
    random_outputs: Vec<Vec<RandomOutput>>,
    mixin: usize,
    fee: u64,
    payment_id: Option<PaymentId>,
    unlock_time: u64,
    extra_data: Option<Vec<u8>>,
    transaction_keys: Option<KeyPair>,
    maximum_output_amount: Option<u64>,
}

impl TransactionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_recipient(&mut self, output: GeneratedOutput) -> &mut Self {
        self.recipients.push(output);
        self
    }

    pub fn add_recipients(&mut self, outputs: impl IntoIterator<Item = GeneratedOutput>) -> &mut Self {
        self.recipients.extend(outputs);
        self
    }

    /// Set the outputs to spend and their decoy candidates.
    ///
    /// `random_outputs[i]` is the decoy set for `our_outputs[i]`. Decoys may
    /// be omitted entirely when the mixin is zero.
    pub fn spend(&mut self, our_outputs: Vec<Output>, random_outputs: Vec<Vec<RandomOutput>>) -> &mut Self {
        self.our_outputs = our_outputs;
        self.random_outputs = random_outputs;
        self
    }

    /// Number of decoys per ring.
    pub fn set_mixin(&mut self, mixin: usize) -> &mut Self {
        self.mixin = mixin;
        self
    }

    pub fn set_fee(&mut self, fee: u64) -> &mut Self {
        self.fee = fee;
        self
    }

    pub fn set_payment_id(&mut self, payment_id: PaymentId) -> &mut Self {
        self.payment_id = Some(payment_id);
        self
    }

    pub fn set_unlock_time(&mut self, unlock_time: u64) -> &mut Self {
        self.unlock_time = unlock_time;
        self
    }

    /// Attach raw bytes to the transaction extra.
    pub fn set_extra_data(&mut self, data: Vec<u8>) -> &mut Self {
        self.extra_data = Some(data);
        self
    }

    /// Attach `value` to the transaction extra as JSON.
    pub fn set_extra_json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<&mut Self, WalletError> {
        let data = serde_json::to_vec(value).map_err(|e| WalletError::Serialization(e.to_string()))?;
        Ok(self.set_extra_data(data))
    }

    /// Use this transaction key pair instead of a fresh random one.
    pub fn with_transaction_keys(&mut self, keys: KeyPair) -> &mut Self {
        self.transaction_keys = Some(keys);
        self
    }

    /// Reject any new output above `max`.
    pub fn set_maximum_output_amount(&mut self, max: Option<u64>) -> &mut Self {
        self.maximum_output_amount = max;
        self
    }

    /// Build and sign the transaction, blocking the caller.
    pub fn build(&self, crypto: &dyn CryptoProvider) -> Result<GeneratedTransaction, WalletError> {
        let mut prepared = self.prepare(crypto)?;

        for (index, output) in prepared.outputs.iter().enumerate() {
            let output = derive_output(crypto, &prepared.transaction_keys, index, output)?;
            prepared.transaction.outputs.push(output);
        }

        let prefix_hash = prepared.transaction.prefix_hash(crypto);
        for (position, input) in prepared.inputs.iter().enumerate() {
            let signatures = sign_input(crypto, &prefix_hash, position, input)?;
            prepared.transaction.signatures.push(signatures);
        }

        Ok(finish(crypto, prepared))
    }

    /// Build and sign the transaction, yielding to the runtime between
    /// output key derivations and between ring signatures.
    ///
    /// Dropping the future abandons the build; nothing partially signed is
    /// ever returned.
    pub async fn build_async(&self, crypto: &dyn CryptoProvider) -> Result<GeneratedTransaction, WalletError> {
        let mut prepared = self.prepare(crypto)?;

        for (index, output) in prepared.outputs.iter().enumerate() {
            tokio::task::yield_now().await;
            let output = derive_output(crypto, &prepared.transaction_keys, index, output)?;
            prepared.transaction.outputs.push(output);
        }

        let prefix_hash = prepared.transaction.prefix_hash(crypto);
        for (position, input) in prepared.inputs.iter().enumerate() {
            tokio::task::yield_now().await;
            let signatures = sign_input(crypto, &prefix_hash, position, input)?;
            prepared.transaction.signatures.push(signatures);
        }

        Ok(finish(crypto, prepared))
    }

    fn validate_decoys(&self) -> Result<(), WalletError> {
        if self.mixin == 0 {
            return Ok(());
        }
        if self.random_outputs.len() != self.our_outputs.len() {
            return Err(WalletError::InsufficientDecoys(format!(
                "{} decoy sets supplied for {} spent outputs",
                self.random_outputs.len(),
                self.our_outputs.len()
            )));
        }
        if let Some((i, set)) = self.random_outputs.iter().enumerate().find(|(_, set)| set.len() < self.mixin) {
            return Err(WalletError::InsufficientDecoys(format!(
                "decoy set {i} has {} candidates, mixin is {}",
                set.len(),
                self.mixin
            )));
        }
        Ok(())
    }

    fn check_balance(&self) -> Result<(), WalletError> {
        let needed = sum_amounts(self.recipients.iter().map(|o| o.amount), "output")?;
        if let Some(max) = self.maximum_output_amount {
            if let Some(o) = self.recipients.iter().find(|o| o.amount > max) {
                return Err(WalletError::InvalidAmount(format!(
                    "output amount {} exceeds maximum {max}",
                    o.amount
                )));
            }
        }
        let found = sum_amounts(self.our_outputs.iter().map(|o| o.amount), "input")?;

        if needed < found {
            let change = found - needed;
            if change != self.fee {
                return Err(WalletError::UnbalancedTransaction { change, fee: self.fee });
            }
        } else if needed > found {
            return Err(WalletError::InsufficientFunds { have: found, need: needed });
        }
        Ok(())
    }

    fn prepare(&self, crypto: &dyn CryptoProvider) -> Result<Prepared, WalletError> {
        self.validate_decoys()?;
        self.check_balance()?;

        let mut inputs = Vec::with_capacity(self.our_outputs.len());
        for (i, output) in self.our_outputs.iter().enumerate() {
            let decoys = self.random_outputs.get(i).map(Vec::as_slice).unwrap_or_default();
            inputs.push(mix_input(output, decoys, self.mixin)?);
        }
        debug!(inputs = inputs.len(), mixin = self.mixin, "tx_builder: rings assembled");

        let transaction_keys = match &self.transaction_keys {
            Some(keys) => keys.clone(),
            None => crypto.generate_keys(),
        };

        let mut outputs = self.recipients.clone();
        outputs.sort_by_key(|o| o.amount);

        let mut transaction = Transaction::new();
        transaction.unlock_time = self.unlock_time;
        if let Some(payment_id) = &self.payment_id {
            transaction.add_payment_id(payment_id);
        }
        if let Some(data) = &self.extra_data {
            transaction.add_arbitrary_data(data);
        }

        // Big-endian comparison of key images, largest first.
        inputs.sort_by(|a, b| b.key_image.cmp(&a.key_image));
        for input in &inputs {
            transaction.inputs.push(TransactionInput {
                amount: input.amount,
                key_offsets: absolute_to_relative_offsets(&input.global_indices()),
                key_image: input.key_image,
            });
        }
        transaction.add_public_key(&transaction_keys.public_key);

        Ok(Prepared { transaction, inputs, outputs, transaction_keys })
    }
}

fn sum_amounts(amounts: impl Iterator<Item = u64>, kind: &'static str) -> Result<u64, WalletError> {
    let mut total: u128 = 0;
    for amount in amounts {
        if amount == 0 {
            return Err(WalletError::InvalidAmount(format!("{kind} amount must be greater than zero")));
        }
        total += u128::from(amount);
        if total >= AMOUNT_LIMIT {
            return Err(WalletError::AmountOverflow(kind));
        }
    }
    // Bounded by AMOUNT_LIMIT above.
    Ok(total as u64)
}

/// One-time key for the output at `index` in amount order.
fn derive_output(
    crypto: &dyn CryptoProvider,
    transaction_keys: &KeyPair,
    index: usize,
    output: &GeneratedOutput,
) -> Result<TransactionOutput, WalletError> {
    let derivation = crypto.generate_key_derivation(&output.keys.public_view_key, &transaction_keys.secret_key)?;
    let key = crypto.derive_public_key(&derivation, index as u64, &output.keys.public_spend_key)?;
    Ok(TransactionOutput { amount: output.amount, key })
}

/// Ring signatures for one input, checked before they are accepted.
fn sign_input(
    crypto: &dyn CryptoProvider,
    prefix_hash: &Hash256,
    position: usize,
    input: &MixedInput,
) -> Result<Vec<Signature>, WalletError> {
    let ring = input.ring_keys();
    let signatures = crypto
        .generate_ring_signatures(prefix_hash, &input.key_image, &ring, &input.private_ephemeral, input.real_output_index)
        .map_err(|e| {
            debug!(input = position, error = %e, "tx_builder: ring signature failed");
            WalletError::SignatureGenerationFailed { input: position }
        })?;
    if !crypto.check_ring_signatures(prefix_hash, &input.key_image, &ring, &signatures) {
        debug!(input = position, "tx_builder: ring signature did not verify");
        return Err(WalletError::SignatureGenerationFailed { input: position });
    }
    Ok(signatures)
}

fn finish(crypto: &dyn CryptoProvider, prepared: Prepared) -> GeneratedTransaction {
    let Prepared { transaction, transaction_keys, .. } = prepared;
    let raw_transaction = transaction.to_bytes();
    let hash = transaction.hash(crypto);
    info!(
        %hash,
        inputs = transaction.inputs.len(),
        outputs = transaction.outputs.len(),
        size = raw_transaction.len(),
        "tx_builder: transaction built"
    );
    GeneratedTransaction { transaction, raw_transaction, hash, transaction_keys }
}
