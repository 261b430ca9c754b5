//! Splitting an amount into canonical "pretty" denominations.
//!
//! Every non-zero decimal digit becomes its own output (`digit × 10^pos`),
//! which keeps outputs mixable with the many other outputs of the same
//! amount on chain.

use tracing::debug;

use cnote_core::types::{GeneratedOutput, RecipientKeys};

use crate::error::WalletError;

/// Decimal decomposition of `amount`, smallest denomination first.
pub fn split_amount(amount: u64) -> Vec<u64> {
    let mut parts = Vec::new();
    let mut remaining = amount;
    let mut place: u64 = 1;
    while remaining > 0 {
        let digit = remaining % 10;
        if digit != 0 {
            parts.push(digit * place);
        }
        remaining /= 10;
        place = place.saturating_mul(10);
    }
    parts
}

/// Outputs paying `amount` to `keys`, one per denomination.
///
/// With `maximum_output_amount` set, any denomination above the cap is
/// emitted as repeated cap-sized outputs followed by the remainder.
pub fn create_transaction_outputs(
    keys: &RecipientKeys,
    amount: u64,
    maximum_output_amount: Option<u64>,
) -> Result<Vec<GeneratedOutput>, WalletError> {
    if amount == 0 {
        return Err(WalletError::InvalidAmount("amount must be greater than zero".into()));
    }

    let mut amounts = Vec::new();
    for part in split_amount(amount) {
        match maximum_output_amount {
            Some(max) if max > 0 && part > max => {
                amounts.extend(std::iter::repeat_n(max, (part / max) as usize));
                if part % max != 0 {
                    amounts.push(part % max);
                }
            }
            _ => amounts.push(part),
        }
    }

    debug!(amount, outputs = amounts.len(), "denominations: amount split");
    Ok(amounts
        .into_iter()
        .map(|amount| GeneratedOutput { amount, keys: *keys })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cnote_core::crypto::base_point;

    fn keys() -> RecipientKeys {
        RecipientKeys { public_view_key: base_point(), public_spend_key: base_point() }
    }

    fn amounts(amount: u64, max: Option<u64>) -> Vec<u64> {
        create_transaction_outputs(&keys(), amount, max)
            .unwrap()
            .into_iter()
            .map(|o| o.amount)
            .collect()
    }

    #[test]
    fn splits_by_digit() {
        assert_eq!(amounts(1_234_567, None), vec![7, 60, 500, 4_000, 30_000, 200_000, 1_000_000]);
    }

    #[test]
    fn zero_digits_are_skipped() {
        assert_eq!(amounts(101_010, None), vec![10, 1_000, 100_000]);
    }

    #[test]
    fn single_digit() {
        assert_eq!(amounts(9, None), vec![9]);
    }

    #[test]
    fn zero_amount_rejected() {
        assert!(matches!(
            create_transaction_outputs(&keys(), 0, None),
            Err(WalletError::InvalidAmount(_))
        ));
    }

    #[test]
    fn max_u64_splits_without_overflow() {
        let parts = split_amount(u64::MAX);
        assert_eq!(parts.iter().map(|&p| p as u128).sum::<u128>(), u64::MAX as u128);
    }

    // --- Output cap ---

    #[test]
    fn cap_splits_large_denomination() {
        let parts = amounts(500_000_000_000, Some(100_000_000_000));
        assert_eq!(parts, vec![100_000_000_000; 5]);
    }

    #[test]
    fn cap_keeps_remainders() {
        let parts = amounts(955_555_555_555, Some(100_000_000_000));
        assert_eq!(parts.len(), 20);
        assert_eq!(parts.iter().sum::<u64>(), 955_555_555_555);
        assert!(parts.iter().all(|&p| p <= 100_000_000_000));
    }

    #[test]
    fn cap_above_amount_changes_nothing() {
        assert_eq!(amounts(1_234, Some(1_000_000)), amounts(1_234, None));
    }

    #[test]
    fn outputs_carry_recipient() {
        let outputs = create_transaction_outputs(&keys(), 11, None).unwrap();
        assert!(outputs.iter().all(|o| o.keys == keys()));
    }
}
