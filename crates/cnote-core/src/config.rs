//! Engine configuration.
//!
//! [`Config`] carries the network parameters every operation falls back to
//! when the caller does not pass one explicitly. It is plain data: build it
//! once, hand it to the engine, and it is never mutated afterwards.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_ADDRESS_PREFIX, DEFAULT_COIN_UNIT_PLACES, DEFAULT_KDF_ITERATIONS, DEFAULT_NETWORK_FEE,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Decimal places between atomic units and whole coins.
    pub coin_unit_places: u32,
    /// Numeric address prefix of the network.
    pub address_prefix: u64,
    /// Hash rounds applied to new seed entropy.
    pub kdf_iterations: u32,
    /// Fee suggested to callers that do not choose one.
    pub default_network_fee: u64,
    /// Largest amount a single output may carry. `None` means unbounded.
    pub maximum_output_amount: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            coin_unit_places: DEFAULT_COIN_UNIT_PLACES,
            address_prefix: DEFAULT_ADDRESS_PREFIX,
            kdf_iterations: DEFAULT_KDF_ITERATIONS,
            default_network_fee: DEFAULT_NETWORK_FEE,
            maximum_output_amount: None,
        }
    }
}

impl Config {
    pub fn with_address_prefix(mut self, prefix: u64) -> Self {
        self.address_prefix = prefix;
        self
    }

    pub fn with_kdf_iterations(mut self, iterations: u32) -> Self {
        self.kdf_iterations = iterations;
        self
    }

    pub fn with_maximum_output_amount(mut self, max: Option<u64>) -> Self {
        self.maximum_output_amount = max;
        self
    }

    pub fn with_default_network_fee(mut self, fee: u64) -> Self {
        self.default_network_fee = fee;
        self
    }

    /// Atomic units per whole coin.
    pub fn atomic_units_per_coin(&self) -> u64 {
        10u64.saturating_pow(self.coin_unit_places)
    }
}
