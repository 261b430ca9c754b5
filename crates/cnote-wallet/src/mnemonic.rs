//! BIP-39 mnemonic seed backup and restoration.

use bip39::{Language, Mnemonic};

use crate::error::WalletError;
use crate::keys::Seed;

/// Encode a seed as a mnemonic phrase.
///
/// Returns `None` when BIP-39 cannot represent the seed length (it accepts
/// 16 to 32 bytes in steps of 4); a 32-byte seed gives 24 words.
pub fn seed_to_mnemonic(seed: &Seed, language: Language) -> Option<String> {
    Mnemonic::from_entropy_in(language, seed.as_bytes())
        .ok()
        .map(|m| m.to_string())
}

/// Parse a mnemonic phrase back into its seed.
///
/// Normalizes whitespace and converts to lowercase before parsing.
pub fn mnemonic_to_seed(phrase: &str, language: Language) -> Result<Seed, WalletError> {
    let normalized = phrase
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    let m = Mnemonic::parse_in(language, &normalized)
        .map_err(|e| WalletError::InvalidMnemonic(e.to_string()))?;
    Ok(Seed::from_bytes(&m.to_entropy()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_generate() {
        let seed = Seed::generate();
        let phrase = seed_to_mnemonic(&seed, Language::English).unwrap();
        let restored = mnemonic_to_seed(&phrase, Language::English).expect("roundtrip should succeed");
        assert_eq!(seed.as_bytes(), restored.as_bytes());
    }

    #[test]
    fn mnemonic_is_24_words() {
        let seed = Seed::from_bytes(&[0xAB; 32]);
        let phrase = seed_to_mnemonic(&seed, Language::English).unwrap();
        let word_count = phrase.split_whitespace().count();
        assert_eq!(word_count, 24, "expected 24 words, got {word_count}: {phrase}");
    }

    #[test]
    fn short_seed_roundtrips_with_fewer_words() {
        let seed = Seed::from_bytes(&[0x10; 16]);
        let phrase = seed_to_mnemonic(&seed, Language::English).unwrap();
        assert_eq!(phrase.split_whitespace().count(), 12);
        assert_eq!(mnemonic_to_seed(&phrase, Language::English).unwrap(), seed);
    }

    #[test]
    fn unrepresentable_seed_has_no_mnemonic() {
        assert!(seed_to_mnemonic(&Seed::from_bytes(&[1; 5]), Language::English).is_none());
        assert!(seed_to_mnemonic(&Seed::from_bytes(&[1; 64]), Language::English).is_none());
    }

    #[test]
    fn invalid_word_rejected() {
        let result = mnemonic_to_seed("abandon abandon abandon invalidword", Language::English);
        let err_msg = result.unwrap_err().to_string();
        assert!(err_msg.contains("invalid mnemonic"), "error message was: {err_msg}");
    }

    #[test]
    fn bad_checksum_rejected() {
        let mut phrase = vec!["abandon"; 23].join(" ");
        phrase.push_str(" zoo");
        assert!(mnemonic_to_seed(&phrase, Language::English).is_err(), "expected checksum error for: {phrase}");
    }

    #[test]
    fn whitespace_and_case_normalization() {
        let seed = Seed::from_bytes(&[0x55; 32]);
        let clean_phrase = seed_to_mnemonic(&seed, Language::English).unwrap();
        let messy_phrase = clean_phrase
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("  \t ")
            .to_uppercase();
        let restored = mnemonic_to_seed(&messy_phrase, Language::English).expect("normalized phrase should parse");
        assert_eq!(seed.as_bytes(), restored.as_bytes());
    }
}
