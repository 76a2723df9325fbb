//! Orchestration of key generation, splitting and payload encryption.
//!
//! The engine owns nothing but its configuration. Each call generates or
//! receives its working material, uses it and drops it (zeroized) before
//! returning, so any number of calls can run concurrently on a shared engine.
//!
//! ```text
//! producer: Created -> SplitAndEncrypted
//! consumer: Reconstructing -> Recovered | Failed
//! ```

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::cipher::{CiphertextBundle, PayloadCipher};
use crate::config::EngineConfig;
use crate::constants::PAYLOAD_ID_LEN;
use crate::error::{Result, TssError};
use crate::secret::Secret;
use crate::share::{Share, ShareSet, SharingParams};

/// Lifecycle of one protected event, reported through `tracing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventState {
    Created,
    SplitAndEncrypted,
    Reconstructing,
    Recovered,
    Failed,
}

/// A ciphertext plus the public parameters of the key protecting it.
///
/// Never contains shares; those go to the custodians.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TssEvent {
    pub payload_id: String,
    /// Hex SHA-256 of the plaintext.
    pub payload_hash: String,
    pub params: SharingParams,
    pub bundle: CiphertextBundle,
}

impl TssEvent {
    fn new(plaintext: &[u8], params: SharingParams, bundle: CiphertextBundle) -> Self {
        TssEvent {
            payload_id: payload_id(&bundle),
            payload_hash: hex::encode(Sha256::digest(plaintext)),
            params,
            bundle,
        }
    }
}

/// Short public identifier derived from the ciphertext.
pub fn payload_id(bundle: &CiphertextBundle) -> String {
    let digest = hex::encode(Sha256::digest(hex::encode(&bundle.ciphertext).as_bytes()));
    digest[..PAYLOAD_ID_LEN].to_string()
}

#[cfg(feature = "sss")]
fn split_key(secret: &[u8], threshold: usize, total: usize) -> Result<ShareSet> {
    crate::sss::split_secret(secret, threshold, total)
}

#[cfg(not(feature = "sss"))]
fn split_key(_secret: &[u8], _threshold: usize, _total: usize) -> Result<ShareSet> {
    Err(TssError::sharing_unavailable())
}

#[cfg(feature = "sss")]
fn combine_key(shares: &[Share], threshold: usize) -> Result<Secret> {
    crate::sss::combine_shares(shares, threshold)
}

#[cfg(not(feature = "sss"))]
fn combine_key(_shares: &[Share], _threshold: usize) -> Result<Secret> {
    Err(TssError::sharing_unavailable())
}

/// Fails unless the crate was built with secret sharing support.
pub fn ensure_sharing_capability() -> Result<()> {
    if cfg!(feature = "sss") {
        Ok(())
    } else {
        Err(TssError::sharing_unavailable())
    }
}

/// Threshold protection engine.
///
/// # Example
///
/// ```rust
/// use shard_tss::config::EngineConfig;
/// use shard_tss::engine::TssEngine;
///
/// let engine = TssEngine::new(EngineConfig::default()).unwrap();
/// let (shares, bundle) = engine.protect(b"launch-code-42", 3, 5).unwrap();
///
/// let quorum = [
///     shares.shares()[0].clone(),
///     shares.shares()[2].clone(),
///     shares.shares()[4].clone(),
/// ];
/// let plaintext = engine.recover(&quorum, 3, &bundle).unwrap();
/// assert_eq!(plaintext, b"launch-code-42");
/// ```
#[derive(Debug, Clone)]
pub struct TssEngine {
    config: EngineConfig,
    cipher: PayloadCipher,
}

impl TssEngine {
    /// Builds an engine, checking once that secret sharing is available.
    ///
    /// # Errors
    ///
    /// * [`TssError::CapabilityUnavailable`] without the `sss` feature.
    /// * [`TssError::InvalidThreshold`] if the configured default quorum is invalid.
    pub fn new(config: EngineConfig) -> Result<Self> {
        ensure_sharing_capability()?;
        config.validate()?;

        debug!(cipher = %config.cipher, "engine ready");
        Ok(TssEngine {
            cipher: PayloadCipher::new(config.cipher),
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Splits a key of the configured length into `total` shares.
    pub fn split(&self, secret: &Secret, threshold: usize, total: usize) -> Result<ShareSet> {
        let expected = self.config.key_len();
        if secret.len() != expected {
            return Err(TssError::SecretLengthMismatch {
                expected,
                actual: secret.len(),
            });
        }
        split_key(secret.expose(), threshold, total)
    }

    /// Rebuilds a key from at least `threshold` shares.
    pub fn reconstruct(&self, shares: &[Share], threshold: usize) -> Result<Secret> {
        let secret = combine_key(shares, threshold)?;
        let expected = self.config.key_len();
        if secret.len() != expected {
            return Err(TssError::SecretLengthMismatch {
                expected,
                actual: secret.len(),
            });
        }
        Ok(secret)
    }

    pub fn encrypt(&self, plaintext: &[u8], key: &Secret) -> Result<CiphertextBundle> {
        self.cipher.encrypt(plaintext, key)
    }

    pub fn decrypt(&self, bundle: &CiphertextBundle, key: &Secret) -> Result<Vec<u8>> {
        self.cipher.decrypt(bundle, key)
    }

    /// Generates a fresh key, splits it and encrypts `plaintext` with it.
    /// The key is wiped before this returns.
    pub fn protect(
        &self,
        plaintext: &[u8],
        threshold: usize,
        total: usize,
    ) -> Result<(ShareSet, CiphertextBundle)> {
        debug!(state = ?EventState::Created, threshold, total);
        let key = Secret::generate(self.config.key_len());
        let shares = self.split(&key, threshold, total)?;
        let bundle = self.encrypt(plaintext, &key)?;
        drop(key);

        debug!(state = ?EventState::SplitAndEncrypted, threshold, total);
        Ok((shares, bundle))
    }

    /// Like [`protect`](Self::protect), returning the event record with its
    /// public digests.
    pub fn protect_event(
        &self,
        plaintext: &[u8],
        threshold: usize,
        total: usize,
    ) -> Result<(ShareSet, TssEvent)> {
        let (shares, bundle) = self.protect(plaintext, threshold, total)?;
        let event = TssEvent::new(plaintext, shares.params(), bundle);

        info!(payload_id = %event.payload_id, threshold, total, "protected event");
        Ok((shares, event))
    }

    /// Protects with the configured default quorum.
    pub fn protect_default(&self, plaintext: &[u8]) -> Result<(ShareSet, TssEvent)> {
        self.protect_event(
            plaintext,
            self.config.default_threshold,
            self.config.default_shares,
        )
    }

    /// Reconstructs the key from `shares` and decrypts `bundle` with it.
    ///
    /// Reconstruction errors are returned as is, without attempting
    /// decryption. A wrong key and a tampered bundle both surface as
    /// [`TssError::AuthenticationFailure`].
    pub fn recover(
        &self,
        shares: &[Share],
        threshold: usize,
        bundle: &CiphertextBundle,
    ) -> Result<Vec<u8>> {
        debug!(state = ?EventState::Reconstructing, threshold, provided = shares.len());

        let result = self
            .reconstruct(shares, threshold)
            .and_then(|key| self.decrypt(bundle, &key));

        match &result {
            Ok(_) => debug!(state = ?EventState::Recovered, threshold),
            Err(e) => warn!(state = ?EventState::Failed, error = %e, "recovery failed"),
        }
        result
    }

    /// Recovers an event using the threshold recorded with it.
    pub fn recover_event(&self, shares: &[Share], event: &TssEvent) -> Result<Vec<u8>> {
        let plaintext = self.recover(shares, event.params.threshold, &event.bundle)?;
        info!(payload_id = %event.payload_id, "recovered event");
        Ok(plaintext)
    }
}
