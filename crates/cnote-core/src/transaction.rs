//! CryptoNote transaction container and its binary encoding.
//!
//! The prefix (everything except signatures) is what ring signatures sign:
//!
//! ```text
//! varint version ‖ varint unlock_time
//! varint #inputs  ‖ { 0x02 ‖ varint amount ‖ varint #offsets ‖ varint offset* ‖ key image }*
//! varint #outputs ‖ { varint amount ‖ 0x02 ‖ key }*
//! varint #extra   ‖ extra
//! ```
//!
//! followed, in the full blob, by every input's ring signatures in input
//! order. Both the prefix hash and the transaction hash are the provider's
//! fast hash over the respective bytes.

use serde::{Deserialize, Serialize};

use crate::constants::{
    KEY_SIZE, TRANSACTION_VERSION, TX_EXTRA_ARBITRARY_DATA_TAG, TX_EXTRA_NONCE_PAYMENT_ID_TAG,
    TX_EXTRA_NONCE_TAG, TX_EXTRA_PUBKEY_TAG, TX_IN_TO_KEY_TAG, TX_OUT_TO_KEY_TAG,
};
use crate::error::TransactionError;
use crate::traits::CryptoProvider;
use crate::types::{Hash256, KeyImage, PaymentId, PublicKey, Signature};
use crate::varint;

/// A to-key input spending one member of a ring.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionInput {
    pub amount: u64,
    /// Ring members' global indices as relative offsets.
    pub key_offsets: Vec<u64>,
    pub key_image: KeyImage,
}

/// A to-key output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOutput {
    pub amount: u64,
    pub key: PublicKey,
}

/// A parsed extra field entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExtraField {
    PublicKey(PublicKey),
    PaymentId(PaymentId),
    /// A nonce that does not carry a payment id.
    Nonce(Vec<u8>),
    ArbitraryData(Vec<u8>),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub version: u64,
    pub unlock_time: u64,
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,
    #[serde(with = "hex_extra")]
    pub extra: Vec<u8>,
    /// One list per input, one signature per ring member.
    pub signatures: Vec<Vec<Signature>>,
}

impl Default for Transaction {
    fn default() -> Self {
        Self::new()
    }
}

impl Transaction {
    /// An empty transaction at the current format version.
    pub fn new() -> Self {
        Self {
            version: TRANSACTION_VERSION,
            unlock_time: 0,
            inputs: Vec::new(),
            outputs: Vec::new(),
            extra: Vec::new(),
            signatures: Vec::new(),
        }
    }

    /// Append the transaction public key tag.
    pub fn add_public_key(&mut self, key: &PublicKey) {
        self.extra.push(TX_EXTRA_PUBKEY_TAG);
        self.extra.extend_from_slice(key.as_bytes());
    }

    /// Append a nonce carrying `payment_id`.
    pub fn add_payment_id(&mut self, payment_id: &PaymentId) {
        self.extra.push(TX_EXTRA_NONCE_TAG);
        varint::write(&mut self.extra, 1 + KEY_SIZE as u64);
        self.extra.push(TX_EXTRA_NONCE_PAYMENT_ID_TAG);
        self.extra.extend_from_slice(payment_id.as_bytes());
    }

    /// Append an arbitrary length-prefixed data blob.
    pub fn add_arbitrary_data(&mut self, data: &[u8]) {
        self.extra.push(TX_EXTRA_ARBITRARY_DATA_TAG);
        varint::write(&mut self.extra, data.len() as u64);
        self.extra.extend_from_slice(data);
    }

    /// Parse the extra field into its tagged entries.
    pub fn extra_fields(&self) -> Result<Vec<ExtraField>, TransactionError> {
        parse_extra(&self.extra)
    }

    /// The transaction public key from extra, if present.
    pub fn public_key(&self) -> Option<PublicKey> {
        self.extra_fields().ok()?.into_iter().find_map(|f| match f {
            ExtraField::PublicKey(k) => Some(k),
            _ => None,
        })
    }

    /// The payment id from extra, if present.
    pub fn payment_id(&self) -> Option<PaymentId> {
        self.extra_fields().ok()?.into_iter().find_map(|f| match f {
            ExtraField::PaymentId(p) => Some(p),
            _ => None,
        })
    }

    /// Serialized prefix.
    pub fn prefix_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        varint::write(&mut buf, self.version);
        varint::write(&mut buf, self.unlock_time);

        varint::write(&mut buf, self.inputs.len() as u64);
        for input in &self.inputs {
            buf.push(TX_IN_TO_KEY_TAG);
            varint::write(&mut buf, input.amount);
            varint::write(&mut buf, input.key_offsets.len() as u64);
            for offset in &input.key_offsets {
                varint::write(&mut buf, *offset);
            }
            buf.extend_from_slice(input.key_image.as_bytes());
        }

        varint::write(&mut buf, self.outputs.len() as u64);
        for output in &self.outputs {
            varint::write(&mut buf, output.amount);
            buf.push(TX_OUT_TO_KEY_TAG);
            buf.extend_from_slice(output.key.as_bytes());
        }

        varint::write(&mut buf, self.extra.len() as u64);
        buf.extend_from_slice(&self.extra);
        buf
    }

    /// Hash of the prefix; the message every ring signature signs.
    pub fn prefix_hash(&self, crypto: &dyn CryptoProvider) -> Hash256 {
        crypto.hash(&self.prefix_bytes())
    }

    /// Full serialized transaction: prefix then signatures.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = self.prefix_bytes();
        for ring in &self.signatures {
            for sig in ring {
                buf.extend_from_slice(sig.as_bytes());
            }
        }
        buf
    }

    /// Hash of the full serialized transaction.
    pub fn hash(&self, crypto: &dyn CryptoProvider) -> Hash256 {
        crypto.hash(&self.to_bytes())
    }

    /// Parse a serialized transaction. Every input is expected to carry
    /// one signature per ring member.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        let mut reader = Reader { bytes, pos: 0 };
        let version = reader.varint()?;
        let unlock_time = reader.varint()?;

        let input_count = reader.count()?;
        let mut inputs = Vec::with_capacity(input_count);
        for _ in 0..input_count {
            let tag = reader.byte()?;
            if tag != TX_IN_TO_KEY_TAG {
                return Err(TransactionError::UnsupportedTag { kind: "input", tag });
            }
            let amount = reader.varint()?;
            let offset_count = reader.count()?;
            let key_offsets = (0..offset_count).map(|_| reader.varint()).collect::<Result<Vec<_>, _>>()?;
            let key_image = KeyImage::from_slice(reader.take(KEY_SIZE)?)?;
            inputs.push(TransactionInput { amount, key_offsets, key_image });
        }

        let output_count = reader.count()?;
        let mut outputs = Vec::with_capacity(output_count);
        for _ in 0..output_count {
            let amount = reader.varint()?;
            let tag = reader.byte()?;
            if tag != TX_OUT_TO_KEY_TAG {
                return Err(TransactionError::UnsupportedTag { kind: "output", tag });
            }
            let key = PublicKey::from_slice(reader.take(KEY_SIZE)?)?;
            outputs.push(TransactionOutput { amount, key });
        }

        let extra_len = reader.count()?;
        let extra = reader.take(extra_len)?.to_vec();

        let mut signatures = Vec::with_capacity(inputs.len());
        for input in &inputs {
            let mut ring = Vec::with_capacity(input.key_offsets.len());
            for _ in 0..input.key_offsets.len() {
                ring.push(Signature::from_slice(reader.take(64)?)?);
            }
            signatures.push(ring);
        }
        if reader.pos != bytes.len() {
            return Err(TransactionError::TrailingBytes(bytes.len() - reader.pos));
        }

        Ok(Self { version, unlock_time, inputs, outputs, extra, signatures })
    }
}

/// Convert ascending absolute global indices to relative offsets.
///
/// Sequences shorter than two are returned unchanged.
pub fn absolute_to_relative_offsets(offsets: &[u64]) -> Vec<u64> {
    let mut out = offsets.to_vec();
    for i in (1..out.len()).rev() {
        out[i] = out[i].wrapping_sub(out[i - 1]);
    }
    out
}

/// Inverse of [`absolute_to_relative_offsets`].
pub fn relative_to_absolute_offsets(offsets: &[u64]) -> Vec<u64> {
    let mut out = offsets.to_vec();
    for i in 1..out.len() {
        out[i] = out[i].wrapping_add(out[i - 1]);
    }
    out
}

/// Parse a tagged extra field.
pub fn parse_extra(extra: &[u8]) -> Result<Vec<ExtraField>, TransactionError> {
    let mut reader = Reader { bytes: extra, pos: 0 };
    let mut fields = Vec::new();
    while reader.pos < extra.len() {
        match reader.byte()? {
            TX_EXTRA_PUBKEY_TAG => {
                fields.push(ExtraField::PublicKey(PublicKey::from_slice(reader.take(KEY_SIZE)?)?));
            }
            TX_EXTRA_NONCE_TAG => {
                let len = reader.count()?;
                let nonce = reader.take(len)?;
                if nonce.len() == 1 + KEY_SIZE && nonce[0] == TX_EXTRA_NONCE_PAYMENT_ID_TAG {
                    fields.push(ExtraField::PaymentId(PaymentId::from_slice(&nonce[1..])?));
                } else {
                    fields.push(ExtraField::Nonce(nonce.to_vec()));
                }
            }
            TX_EXTRA_ARBITRARY_DATA_TAG => {
                let len = reader.count()?;
                fields.push(ExtraField::ArbitraryData(reader.take(len)?.to_vec()));
            }
            tag => {
                return Err(TransactionError::UnsupportedTag { kind: "extra", tag });
            }
        }
    }
    Ok(fields)
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8], TransactionError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.bytes.len())
            .ok_or(TransactionError::Truncated(self.pos))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn byte(&mut self) -> Result<u8, TransactionError> {
        Ok(self.take(1)?[0])
    }

    fn varint(&mut self) -> Result<u64, TransactionError> {
        let (value, used) =
            varint::decode(&self.bytes[self.pos..]).map_err(|_| TransactionError::Truncated(self.pos))?;
        self.pos += used;
        Ok(value)
    }

    /// A varint length, bounded by the bytes that remain.
    fn count(&mut self) -> Result<usize, TransactionError> {
        let value = self.varint()?;
        let remaining = (self.bytes.len() - self.pos) as u64;
        if value > remaining {
            return Err(TransactionError::Truncated(self.pos));
        }
        Ok(value as usize)
    }
}

mod hex_extra {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::DefaultCrypto;

    fn sample() -> Transaction {
        let mut tx = Transaction::new();
        tx.unlock_time = 42;
        tx.add_payment_id(&PaymentId([0xaa; 32]));
        tx.add_arbitrary_data(b"hello");
        tx.add_public_key(&PublicKey([0x11; 32]));
        tx.inputs.push(TransactionInput {
            amount: 100,
            key_offsets: vec![53984, 349063, 1130812, 61739],
            key_image: KeyImage([0x22; 32]),
        });
        tx.outputs.push(TransactionOutput { amount: 90, key: PublicKey([0x33; 32]) });
        tx.signatures.push(vec![Signature([0x44; 64]); 4]);
        tx
    }

    // --- Offsets ---

    #[test]
    fn offsets_known_vector() {
        let absolute = [53984, 403047, 1533859, 1595598];
        let relative = [53984, 349063, 1130812, 61739];
        assert_eq!(absolute_to_relative_offsets(&absolute), relative);
        assert_eq!(relative_to_absolute_offsets(&relative), absolute);
    }

    #[test]
    fn offsets_short_sequences_unchanged() {
        assert!(absolute_to_relative_offsets(&[]).is_empty());
        assert_eq!(absolute_to_relative_offsets(&[7]), vec![7]);
        assert_eq!(relative_to_absolute_offsets(&[7]), vec![7]);
    }

    // --- Extra ---

    #[test]
    fn extra_fields_parse_in_order() {
        let tx = sample();
        let fields = tx.extra_fields().unwrap();
        assert_eq!(
            fields,
            vec![
                ExtraField::PaymentId(PaymentId([0xaa; 32])),
                ExtraField::ArbitraryData(b"hello".to_vec()),
                ExtraField::PublicKey(PublicKey([0x11; 32])),
            ]
        );
        assert_eq!(tx.public_key(), Some(PublicKey([0x11; 32])));
        assert_eq!(tx.payment_id(), Some(PaymentId([0xaa; 32])));
    }

    #[test]
    fn payment_id_nonce_layout() {
        let mut tx = Transaction::new();
        tx.add_payment_id(&PaymentId([0xbb; 32]));
        assert_eq!(&tx.extra[..3], &[0x02, 0x21, 0x00]);
        assert_eq!(tx.extra.len(), 35);
    }

    #[test]
    fn unknown_extra_tag_rejected() {
        assert_eq!(
            parse_extra(&[0x05]),
            Err(TransactionError::UnsupportedTag { kind: "extra", tag: 0x05 })
        );
    }

    // --- Encoding ---

    #[test]
    fn prefix_layout() {
        let mut tx = Transaction::new();
        tx.outputs.push(TransactionOutput { amount: 300, key: PublicKey([0x33; 32]) });
        let bytes = tx.prefix_bytes();
        assert_eq!(&bytes[..5], &[0x01, 0x00, 0x00, 0x01, 0xac]);
        assert_eq!(bytes[6], TX_OUT_TO_KEY_TAG);
        assert_eq!(*bytes.last().unwrap(), 0x00);
    }

    #[test]
    fn bytes_parse_back() {
        let tx = sample();
        let parsed = Transaction::from_bytes(&tx.to_bytes()).unwrap();
        assert_eq!(parsed, tx);
    }

    #[test]
    fn signatures_parse_back_per_input() {
        let mut tx = sample();
        tx.inputs.push(TransactionInput {
            amount: 7,
            key_offsets: vec![10, 5],
            key_image: KeyImage([0x23; 32]),
        });
        tx.signatures.push(vec![Signature([0x66; 64]), Signature([0x77; 64])]);

        let parsed = Transaction::from_bytes(&tx.to_bytes()).unwrap();
        assert_eq!(parsed.signatures.len(), 2);
        assert_eq!(parsed.signatures[0], vec![Signature([0x44; 64]); 4]);
        assert_eq!(parsed.signatures[1], vec![Signature([0x66; 64]), Signature([0x77; 64])]);
        assert_eq!(parsed, tx);
    }

    #[test]
    fn trailing_bytes_rejected() {
        let mut bytes = sample().to_bytes();
        bytes.push(0);
        assert_eq!(Transaction::from_bytes(&bytes), Err(TransactionError::TrailingBytes(1)));
    }

    #[test]
    fn truncated_bytes_rejected() {
        let bytes = sample().to_bytes();
        assert!(Transaction::from_bytes(&bytes[..bytes.len() - 1]).is_err());
    }

    #[test]
    fn signatures_change_hash_but_not_prefix_hash() {
        let crypto = DefaultCrypto;
        let tx = sample();
        let mut other = tx.clone();
        other.signatures[0][0] = Signature([0x55; 64]);
        assert_eq!(tx.prefix_hash(&crypto), other.prefix_hash(&crypto));
        assert_ne!(tx.hash(&crypto), other.hash(&crypto));
    }
}
