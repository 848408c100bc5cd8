//! Canonical byte encoding of transactions.
//!
//! One encoding serves three purposes: the bytes witnesses sign (without the
//! signature section), the bytes the identifier is hashed from (with it), and
//! the wire format (with it, plus the identifier). Field order is fixed and
//! every integer is little-endian, so equal content always encodes to equal
//! bytes. serde formats are not used here because they do not promise a
//! stable field order across versions.
//!
//! ```text
//! magic "TSRA" | version u16 | timestamp u64
//! relation_count u16
//!   index u16 | asset_count u16
//!     asset_group 32 | user_id 32 | nonce 32 | asset_id 32 | body_len u32 | body
//!   pointer_flag u8 [tx_id 32 | asset_flag u8 [asset_id 32]]
//! signer_count u16 | user_id 32 ...
//! signature_count u16 | (user_id 32 | public_key 32 | signature 64) ...
//! transaction_id 32                       (wire format only)
//! ```
//!
//! Decoding is strict: anything the encoder would not produce is rejected.

use thiserror::Error;

use super::asset::Asset;
use super::builder::Transaction;
use super::relation::Relation;
use super::witness::{SignatureEntry, Witness};
use crate::config::{
    ID_LENGTH, NONCE_LENGTH, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH, TRANSACTION_VERSION, WIRE_MAGIC,
};
use crate::crypto::keys::{PublicKey, Signature};
use crate::types::{AssetGroupId, AssetId, TransactionId, UserId};

/// Malformed wire bytes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeserializeError {
    #[error("input truncated at offset {offset}: needed {needed} more bytes")]
    Truncated { offset: usize, needed: usize },

    #[error("bad magic bytes")]
    BadMagic,

    #[error("unsupported transaction version {0}")]
    UnsupportedVersion(u16),

    #[error("invalid flag byte {byte:#04x} at offset {offset}")]
    InvalidFlag { byte: u8, offset: usize },

    #[error("{0} trailing bytes after transaction")]
    TrailingBytes(usize),

    #[error("malformed transaction: {reason}")]
    Malformed { reason: String },
}

impl DeserializeError {
    fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    fn u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn raw(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    fn count(&mut self, n: usize) {
        // Bounds are enforced by `Transaction::validate_structure`.
        self.u16(n as u16);
    }
}

/// Which parts of the transaction to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Section {
    /// Everything except signatures and identifier.
    Signable,
    /// Everything except the identifier.
    Content,
}

/// Encodes the transaction. Callers validate structure first.
pub(crate) fn encode(tx: &Transaction, section: Section) -> Vec<u8> {
    let mut w = Writer::default();
    w.raw(&WIRE_MAGIC);
    w.u16(tx.version);
    w.u64(tx.timestamp);

    w.count(tx.relations.len());
    for relation in &tx.relations {
        encode_relation(&mut w, relation);
    }

    w.count(tx.witness.signers().len());
    for signer in tx.witness.signers() {
        w.raw(signer.as_bytes());
    }

    if section == Section::Content {
        w.count(tx.witness.signatures().len());
        for entry in tx.witness.signatures() {
            w.raw(entry.user_id.as_bytes());
            w.raw(entry.public_key.as_bytes());
            w.raw(entry.signature.as_bytes());
        }
    }

    w.buf
}

fn encode_relation(w: &mut Writer, relation: &Relation) {
    w.u16(relation.index());
    w.count(relation.assets().len());
    for asset in relation.assets() {
        w.raw(asset.asset_group_id().as_bytes());
        w.raw(asset.user_id().as_bytes());
        w.raw(asset.nonce());
        w.raw(asset.asset_id().as_bytes());
        w.u32(asset.body().len() as u32);
        w.raw(asset.body());
    }
    match relation.pointer() {
        None => w.u8(0),
        Some(pointer) => {
            w.u8(1);
            w.raw(pointer.transaction_id.as_bytes());
            match pointer.asset_id {
                None => w.u8(0),
                Some(asset_id) => {
                    w.u8(1);
                    w.raw(asset_id.as_bytes());
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], DeserializeError> {
        let remaining = self.bytes.len() - self.offset;
        if remaining < n {
            return Err(DeserializeError::Truncated {
                offset: self.offset,
                needed: n - remaining,
            });
        }
        let slice = &self.bytes[self.offset..self.offset + n];
        self.offset += n;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], DeserializeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8, DeserializeError> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, DeserializeError> {
        Ok(u16::from_le_bytes(self.array()?))
    }

    fn u32(&mut self) -> Result<u32, DeserializeError> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    fn u64(&mut self) -> Result<u64, DeserializeError> {
        Ok(u64::from_le_bytes(self.array()?))
    }

    fn flag(&mut self) -> Result<bool, DeserializeError> {
        let offset = self.offset;
        match self.u8()? {
            0 => Ok(false),
            1 => Ok(true),
            byte => Err(DeserializeError::InvalidFlag { byte, offset }),
        }
    }

    fn id(&mut self) -> Result<[u8; ID_LENGTH], DeserializeError> {
        self.array()
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }
}

/// Decodes a full wire-format transaction (content followed by identifier).
///
/// The identifier is taken as claimed; checking it against the content is
/// verification's job.
pub(crate) fn decode(bytes: &[u8]) -> Result<Transaction, DeserializeError> {
    let mut r = Reader::new(bytes);

    if r.array::<4>()? != WIRE_MAGIC {
        return Err(DeserializeError::BadMagic);
    }
    let version = r.u16()?;
    if version != TRANSACTION_VERSION {
        return Err(DeserializeError::UnsupportedVersion(version));
    }
    let timestamp = r.u64()?;

    let mut tx = Transaction::with_timestamp(timestamp);

    let relation_count = r.u16()?;
    for _ in 0..relation_count {
        decode_relation(&mut r, &mut tx)?;
    }

    let signer_count = r.u16()?;
    let mut witness = Witness::default();
    for _ in 0..signer_count {
        let signer = UserId::from_bytes(r.id()?);
        if witness.is_declared(&signer) {
            return Err(DeserializeError::malformed(format!(
                "signer {signer} declared twice"
            )));
        }
        witness.declare(signer);
    }

    let signature_count = r.u16()?;
    for _ in 0..signature_count {
        let user_id = UserId::from_bytes(r.id()?);
        let public_key = PublicKey::try_from_slice(&r.array::<PUBLIC_KEY_LENGTH>()?)
            .map_err(|e| DeserializeError::malformed(e.to_string()))?;
        let signature = Signature::from_bytes(r.array::<SIGNATURE_LENGTH>()?);
        let entry = SignatureEntry {
            user_id,
            public_key,
            signature,
        };
        witness
            .attach(entry)
            .map_err(|e| DeserializeError::malformed(e.to_string()))?;
        // Canonical entries arrive in signer order, so each one lands last.
        if witness.signatures().last().map(|e| e.user_id) != Some(user_id) {
            return Err(DeserializeError::malformed(
                "signature entries out of signer order",
            ));
        }
    }
    tx.witness = witness;

    tx.id = Some(TransactionId::from_bytes(r.id()?));

    if r.remaining() != 0 {
        return Err(DeserializeError::TrailingBytes(r.remaining()));
    }

    tx.validate_structure()
        .map_err(|e| DeserializeError::malformed(e.to_string()))?;
    Ok(tx)
}

fn decode_relation(r: &mut Reader<'_>, tx: &mut Transaction) -> Result<(), DeserializeError> {
    let index = r.u16()?;
    let relation = tx
        .new_relation(index)
        .map_err(|e| DeserializeError::malformed(e.to_string()))?;

    let asset_count = r.u16()?;
    for _ in 0..asset_count {
        let asset_group_id = AssetGroupId::from_bytes(r.id()?);
        let user_id = UserId::from_bytes(r.id()?);
        let nonce = r.array::<NONCE_LENGTH>()?;
        let asset_id = AssetId::from_bytes(r.id()?);
        let body_len = r.u32()? as usize;
        let body = r.take(body_len)?.to_vec();
        let asset = Asset::from_parts(asset_id, asset_group_id, user_id, nonce, body);
        if !asset.id_is_consistent() {
            return Err(DeserializeError::malformed(format!(
                "asset {asset_id} in relation {index} does not match its content"
            )));
        }
        relation.push_asset(asset);
    }

    if r.flag()? {
        let predecessor = TransactionId::from_bytes(r.id()?);
        let predecessor_asset = if r.flag()? {
            Some(AssetId::from_bytes(r.id()?))
        } else {
            None
        };
        relation
            .attach_pointer(predecessor, predecessor_asset)
            .map_err(|e| DeserializeError::malformed(e.to_string()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Transaction {
        let mut tx = Transaction::with_timestamp(1_700_000_000_000);
        let user = UserId::from_bytes([1; 32]);
        let rel = tx.new_relation(0).unwrap();
        rel.push_asset(Asset::with_nonce(
            AssetGroupId::from_name("g"),
            user,
            [5; 32],
            b"hello".to_vec(),
        ));
        rel.attach_pointer(TransactionId::from_bytes([9; 32]), None)
            .unwrap();
        tx.declare_witness(user).unwrap();
        tx
    }

    fn wire(tx: &Transaction) -> Vec<u8> {
        let mut bytes = encode(tx, Section::Content);
        bytes.extend_from_slice(&[0xEE; 32]);
        bytes
    }

    #[test]
    fn encoding_is_deterministic() {
        let tx = sample();
        assert_eq!(encode(&tx, Section::Content), encode(&tx, Section::Content));
    }

    #[test]
    fn signable_section_omits_signatures() {
        let tx = sample();
        let signable = encode(&tx, Section::Signable);
        let content = encode(&tx, Section::Content);
        // Content adds only the (empty) signature count.
        assert_eq!(content.len(), signable.len() + 2);
        assert_eq!(&content[..signable.len()], signable.as_slice());
    }

    #[test]
    fn decode_inverts_encode() {
        let tx = sample();
        let decoded = decode(&wire(&tx)).unwrap();
        assert_eq!(decoded.relations(), tx.relations());
        assert_eq!(decoded.witness(), tx.witness());
        assert_eq!(decoded.timestamp(), tx.timestamp());
        assert_eq!(decoded.id(), Some(TransactionId::from_bytes([0xEE; 32])));
    }

    #[test]
    fn truncated_input_rejected() {
        let bytes = wire(&sample());
        for cut in [0, 3, 10, bytes.len() - 1] {
            assert!(matches!(
                decode(&bytes[..cut]),
                Err(DeserializeError::Truncated { .. })
            ));
        }
    }

    #[test]
    fn trailing_bytes_rejected() {
        let mut bytes = wire(&sample());
        bytes.push(0);
        assert_eq!(decode(&bytes), Err(DeserializeError::TrailingBytes(1)));
    }

    #[test]
    fn bad_magic_and_version_rejected() {
        let mut bytes = wire(&sample());
        bytes[0] = b'X';
        assert_eq!(decode(&bytes), Err(DeserializeError::BadMagic));

        let mut bytes = wire(&sample());
        bytes[4] = 0xFF;
        assert!(matches!(
            decode(&bytes),
            Err(DeserializeError::UnsupportedVersion(_))
        ));
    }

    #[test]
    fn tampered_body_rejected() {
        let mut bytes = wire(&sample());
        let pos = bytes.windows(5).position(|w| w == b"hello").unwrap();
        bytes[pos] = b'j';
        assert!(matches!(
            decode(&bytes),
            Err(DeserializeError::Malformed { .. })
        ));
    }

    #[test]
    fn empty_relation_rejected_on_decode() {
        let mut tx = Transaction::with_timestamp(1);
        tx.new_relation(0).unwrap();
        assert!(matches!(
            decode(&wire(&tx)),
            Err(DeserializeError::Malformed { .. })
        ));
    }
}
