//! The [`CryptoNote`] facade.
//!
//! Holds a [`Config`] and a shared [`CryptoProvider`] so callers set the
//! network parameters and primitives once. Every method that takes an
//! `Option<u64>` prefix falls back to [`Config::address_prefix`].

use std::sync::Arc;

use bip39::Language;
use serde::Serialize;

use cnote_core::address::{self, AddressPrefix, DecodedAddress};
use cnote_core::config::Config;
use cnote_core::crypto::DefaultCrypto;
use cnote_core::traits::CryptoProvider;
use cnote_core::types::{
    GeneratedOutput, KeyDerivation, Output, PaymentId, PublicKey, SecretKey, Signature,
};

use crate::builder::{GeneratedTransaction, TransactionBuilder};
use crate::denominations;
use crate::error::WalletError;
use crate::keys::{self, Seed};
use crate::message;
use crate::scanner::{self, KeyImageParts};
use crate::wallet::{self, Wallet};

const DEFAULT_LANGUAGE: Language = Language::English;

#[derive(Clone)]
pub struct CryptoNote {
    config: Config,
    crypto: Arc<dyn CryptoProvider>,
}

impl std::fmt::Debug for CryptoNote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CryptoNote").field("config", &self.config).finish_non_exhaustive()
    }
}

impl Default for CryptoNote {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl CryptoNote {
    /// Engine over the built-in primitives.
    pub fn new(config: Config) -> Self {
        Self::with_crypto(config, Arc::new(DefaultCrypto))
    }

    /// Engine over caller-supplied primitives, typically a
    /// [`CryptoOverrides`](cnote_core::overrides::CryptoOverrides).
    pub fn with_crypto(config: Config, crypto: Arc<dyn CryptoProvider>) -> Self {
        Self { config, crypto }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn crypto(&self) -> &dyn CryptoProvider {
        self.crypto.as_ref()
    }

    fn prefix(&self, prefix: Option<u64>) -> u64 {
        prefix.unwrap_or(self.config.address_prefix)
    }

    // --- Addresses ---

    pub fn encode_address(
        &self,
        public_view_key: &PublicKey,
        public_spend_key: &PublicKey,
        payment_id: Option<&PaymentId>,
        prefix: Option<u64>,
    ) -> String {
        address::encode_address(self.crypto(), public_view_key, public_spend_key, payment_id, self.prefix(prefix))
    }

    pub fn decode_address(&self, address: &str, prefix: Option<u64>) -> Result<DecodedAddress, WalletError> {
        Ok(address::decode_address(self.crypto(), address, self.prefix(prefix))?)
    }

    pub fn decode_address_prefix(&self, address: &str) -> Result<AddressPrefix, WalletError> {
        Ok(address::decode_address_prefix(address)?)
    }

    pub fn create_integrated_address(
        &self,
        address: &str,
        payment_id: &PaymentId,
        prefix: Option<u64>,
    ) -> Result<String, WalletError> {
        Ok(address::create_integrated_address(self.crypto(), address, payment_id, self.prefix(prefix))?)
    }

    pub fn encode_raw_address(&self, raw_hex: &str) -> Result<String, WalletError> {
        Ok(address::encode_raw_address(raw_hex)?)
    }

    pub fn decode_raw_address(&self, address: &str) -> Result<String, WalletError> {
        Ok(address::decode_raw_address(address)?)
    }

    // --- Wallets ---

    /// Fresh seed hashed [`Config::kdf_iterations`] times.
    pub fn create_new_seed(&self, entropy: Option<&[u8]>) -> Seed {
        keys::create_new_seed(self.crypto(), entropy, self.config.kdf_iterations)
    }

    pub fn create_new_address(
        &self,
        entropy: Option<&[u8]>,
        language: Option<Language>,
        prefix: Option<u64>,
    ) -> Result<Wallet, WalletError> {
        wallet::create_new_address(
            self.crypto(),
            entropy,
            self.config.kdf_iterations,
            language.unwrap_or(DEFAULT_LANGUAGE),
            self.prefix(prefix),
        )
    }

    pub fn create_address_from_seed(
        &self,
        seed: &Seed,
        language: Option<Language>,
        prefix: Option<u64>,
    ) -> Result<Wallet, WalletError> {
        wallet::create_address_from_seed(
            self.crypto(),
            seed,
            language.unwrap_or(DEFAULT_LANGUAGE),
            self.prefix(prefix),
        )
    }

    pub fn create_address_from_mnemonic(
        &self,
        phrase: &str,
        language: Option<Language>,
        prefix: Option<u64>,
    ) -> Result<Wallet, WalletError> {
        wallet::create_address_from_mnemonic(
            self.crypto(),
            phrase,
            language.unwrap_or(DEFAULT_LANGUAGE),
            self.prefix(prefix),
        )
    }

    pub fn create_address_from_keys(
        &self,
        private_spend_key: &SecretKey,
        private_view_key: &SecretKey,
        prefix: Option<u64>,
    ) -> Result<Wallet, WalletError> {
        wallet::create_address_from_keys(
            self.crypto(),
            private_spend_key,
            private_view_key,
            DEFAULT_LANGUAGE,
            self.prefix(prefix),
        )
    }

    pub fn create_sub_wallet_from_private_spend_key(
        &self,
        base_private_spend_key: &SecretKey,
        index: u64,
        language: Option<Language>,
        prefix: Option<u64>,
    ) -> Result<Wallet, WalletError> {
        wallet::create_sub_wallet_from_private_spend_key(
            self.crypto(),
            base_private_spend_key,
            index,
            language.unwrap_or(DEFAULT_LANGUAGE),
            self.prefix(prefix),
        )
    }

    pub fn private_key_to_public_key(&self, secret: &SecretKey) -> Result<PublicKey, WalletError> {
        keys::private_key_to_public_key(self.crypto(), secret)
    }

    // --- Scanning ---

    pub fn generate_key_derivation(
        &self,
        transaction_public_key: &PublicKey,
        private_view_key: &SecretKey,
    ) -> Result<KeyDerivation, WalletError> {
        scanner::generate_key_derivation(self.crypto(), transaction_public_key, private_view_key)
    }

    pub fn is_our_transaction_output(
        &self,
        transaction_public_key: &PublicKey,
        output: &Output,
        private_view_key: &SecretKey,
        public_spend_key: &PublicKey,
        private_spend_key: Option<&SecretKey>,
    ) -> Result<Option<Output>, WalletError> {
        scanner::is_our_transaction_output(
            self.crypto(),
            transaction_public_key,
            output,
            private_view_key,
            public_spend_key,
            private_spend_key,
        )
    }

    pub fn scan_transaction_outputs(
        &self,
        transaction_public_key: &PublicKey,
        outputs: &[Output],
        private_view_key: &SecretKey,
        public_spend_key: &PublicKey,
        private_spend_key: Option<&SecretKey>,
    ) -> Result<Vec<Output>, WalletError> {
        scanner::scan_transaction_outputs(
            self.crypto(),
            transaction_public_key,
            outputs,
            private_view_key,
            public_spend_key,
            private_spend_key,
        )
    }

    pub fn generate_key_image(
        &self,
        transaction_public_key: &PublicKey,
        private_view_key: &SecretKey,
        public_spend_key: &PublicKey,
        private_spend_key: &SecretKey,
        output_index: u64,
    ) -> Result<KeyImageParts, WalletError> {
        scanner::generate_key_image(
            self.crypto(),
            transaction_public_key,
            private_view_key,
            public_spend_key,
            private_spend_key,
            output_index,
        )
    }

    pub fn generate_key_image_primitive(
        &self,
        public_spend_key: &PublicKey,
        private_spend_key: &SecretKey,
        output_index: u64,
        derivation: &KeyDerivation,
    ) -> Result<KeyImageParts, WalletError> {
        scanner::generate_key_image_primitive(
            self.crypto(),
            public_spend_key,
            private_spend_key,
            output_index,
            derivation,
        )
    }

    pub fn underive_public_key(
        &self,
        derivation: &KeyDerivation,
        output_index: u64,
        output_key: &PublicKey,
    ) -> Result<PublicKey, WalletError> {
        scanner::underive_public_key(self.crypto(), derivation, output_index, output_key)
    }

    // --- Transactions ---

    /// Denominated outputs paying `amount` to `address`, split at
    /// [`Config::maximum_output_amount`] when set.
    pub fn create_transaction_outputs(
        &self,
        address: &str,
        amount: u64,
        prefix: Option<u64>,
    ) -> Result<Vec<GeneratedOutput>, WalletError> {
        let decoded = self.decode_address(address, prefix)?;
        denominations::create_transaction_outputs(&decoded.keys(), amount, self.config.maximum_output_amount)
    }

    /// A builder preloaded with the configured fee and output cap.
    pub fn transaction_builder(&self) -> TransactionBuilder {
        let mut builder = TransactionBuilder::new();
        builder
            .set_fee(self.config.default_network_fee)
            .set_maximum_output_amount(self.config.maximum_output_amount);
        builder
    }

    pub fn create_transaction(&self, builder: &TransactionBuilder) -> Result<GeneratedTransaction, WalletError> {
        builder.build(self.crypto())
    }

    pub async fn create_transaction_async(
        &self,
        builder: &TransactionBuilder,
    ) -> Result<GeneratedTransaction, WalletError> {
        builder.build_async(self.crypto()).await
    }

    // --- Messages ---

    pub fn sign_message(
        &self,
        message: impl AsRef<[u8]>,
        address: &str,
        private_spend_key: &SecretKey,
        prefix: Option<u64>,
    ) -> Result<Signature, WalletError> {
        message::sign_message(self.crypto(), message, address, private_spend_key, self.prefix(prefix))
    }

    pub fn sign_json_message<T: Serialize + ?Sized>(
        &self,
        message: &T,
        address: &str,
        private_spend_key: &SecretKey,
        prefix: Option<u64>,
    ) -> Result<Signature, WalletError> {
        message::sign_json_message(self.crypto(), message, address, private_spend_key, self.prefix(prefix))
    }

    pub fn verify_message_signature(
        &self,
        message: impl AsRef<[u8]>,
        address: &str,
        signature: &Signature,
        prefix: Option<u64>,
    ) -> Result<bool, WalletError> {
        message::verify_message_signature(self.crypto(), message, address, signature, self.prefix(prefix))
    }

    pub fn verify_json_message_signature<T: Serialize + ?Sized>(
        &self,
        message: &T,
        address: &str,
        signature: &Signature,
        prefix: Option<u64>,
    ) -> Result<bool, WalletError> {
        message::verify_json_message_signature(self.crypto(), message, address, signature, self.prefix(prefix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cnote_core::overrides::CryptoOverrides;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const ATHENA_PREFIX: u64 = 6_581_243_850;

    #[test]
    fn prefix_falls_back_to_config() {
        let engine = CryptoNote::new(Config::default().with_address_prefix(ATHENA_PREFIX));
        let wallet = engine.create_new_address(None, None, None).unwrap();
        assert!(wallet.address.starts_with("athena"));
        assert!(engine.decode_address(&wallet.address, None).is_ok());
        assert!(engine.decode_address(&wallet.address, Some(3_914_525)).is_err());
    }

    #[test]
    fn explicit_prefix_wins() {
        let engine = CryptoNote::default();
        let wallet = engine.create_new_address(None, None, Some(ATHENA_PREFIX)).unwrap();
        assert!(wallet.address.starts_with("athena"));
    }

    #[test]
    fn config_cap_applies_to_denominations() {
        let engine = CryptoNote::new(Config::default().with_maximum_output_amount(Some(100_000_000_000)));
        let wallet = engine.create_new_address(None, None, None).unwrap();
        let outputs = engine.create_transaction_outputs(&wallet.address, 500_000_000_000, None).unwrap();
        assert_eq!(outputs.len(), 5);
    }

    #[test]
    fn builder_carries_configured_fee() {
        let engine = CryptoNote::new(Config::default().with_default_network_fee(25));
        let wallet = engine.create_new_address(None, None, None).unwrap();
        let mut builder = engine.transaction_builder();
        builder.add_recipients(engine.create_transaction_outputs(&wallet.address, 75, None).unwrap());
        // No inputs: 75 needed, nothing found.
        assert_eq!(
            engine.create_transaction(&builder).unwrap_err(),
            WalletError::InsufficientFunds { have: 0, need: 75 }
        );
    }

    #[test]
    fn overridden_primitive_is_called() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let base: Arc<dyn CryptoProvider> = Arc::new(DefaultCrypto);
        let fallback = Arc::clone(&base);
        let overrides = CryptoOverrides::new(base).with_secret_key_to_public_key(move |secret| {
            counter.fetch_add(1, Ordering::SeqCst);
            fallback.secret_key_to_public_key(secret)
        });
        let engine = CryptoNote::with_crypto(Config::default(), Arc::new(overrides));

        let secret = engine.crypto().generate_keys().secret_key;
        let public = engine.private_key_to_public_key(&secret).unwrap();
        assert_eq!(public, DefaultCrypto.secret_key_to_public_key(&secret).unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn debug_does_not_expose_provider() {
        let dbg = format!("{:?}", CryptoNote::default());
        assert!(dbg.contains("CryptoNote"));
        assert!(dbg.contains("address_prefix"));
    }
}
