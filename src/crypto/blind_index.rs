//! Keyed blind index for subject filtering
//!
//! Subjects are stored AES-GCM encrypted under random nonces, so two
//! encryptions of the same subject never compare equal. The index value is
//! instead HMAC-SHA-256 of the subject under a subkey of the session key: it is
//! stable across sessions for the same password and reveals nothing about the
//! subject to anyone without the key.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use zeroize::Zeroizing;

use super::key_derivation::SymmetricKey;
use super::provider::CryptoProvider;
use crate::error::VaultResult;

const SUBJECT_INDEX_LABEL: &[u8] = b"docvault/subject-index/v1";

/// Compute the persisted index value for `subject`
pub fn subject_index(
    crypto: &dyn CryptoProvider,
    key: &SymmetricKey,
    subject: &str,
) -> VaultResult<String> {
    let index_key = Zeroizing::new(crypto.hmac_sha256(key.expose(), SUBJECT_INDEX_LABEL)?);
    let tag = crypto.hmac_sha256(&index_key[..], subject.as_bytes())?;
    Ok(URL_SAFE_NO_PAD.encode(tag))
}
