//! Authenticated encryption of event payloads.
//!
//! Payloads are sealed with AES-GCM under the key that gets split among the
//! custodians. Every call draws a fresh 96-bit nonce from the OS CSPRNG, and
//! the bundle's algorithm identifier and version are bound into the
//! associated data so that editing them breaks authentication.
//!
//! # Example
//!
//! ```rust
//! use shard_tss::cipher::{CipherSuite, PayloadCipher};
//! use shard_tss::secret::Secret;
//!
//! let cipher = PayloadCipher::new(CipherSuite::Aes256Gcm);
//! let key = Secret::generate(cipher.suite().key_len());
//!
//! let bundle = cipher.encrypt(b"launch-code-42", &key).unwrap();
//! let plaintext = cipher.decrypt(&bundle, &key).unwrap();
//! assert_eq!(plaintext, b"launch-code-42");
//! ```

use core::fmt;
use std::str::FromStr;

use aes_gcm::{
    aead::{generic_array::GenericArray, AeadInPlace, KeyInit},
    Aes128Gcm, Aes256Gcm,
};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::constants::{AAD_DOMAIN, BUNDLE_VERSION, NONCE_LEN, TAG_LEN};
use crate::error::{Result, TssError};
use crate::secret::Secret;

/// AEAD constructions a payload can be sealed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CipherSuite {
    #[serde(rename = "AES-128-GCM")]
    Aes128Gcm,
    #[default]
    #[serde(rename = "AES-256-GCM")]
    Aes256Gcm,
}

impl CipherSuite {
    /// Key length in bytes. This is also the length of the shared secret.
    pub fn key_len(self) -> usize {
        match self {
            CipherSuite::Aes128Gcm => 16,
            CipherSuite::Aes256Gcm => 32,
        }
    }

    /// Identifier recorded in each bundle.
    pub fn id(self) -> &'static str {
        match self {
            CipherSuite::Aes128Gcm => "AES-128-GCM",
            CipherSuite::Aes256Gcm => "AES-256-GCM",
        }
    }
}

impl fmt::Display for CipherSuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for CipherSuite {
    type Err = TssError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "AES-128-GCM" => Ok(CipherSuite::Aes128Gcm),
            "AES-256-GCM" => Ok(CipherSuite::Aes256Gcm),
            other => Err(TssError::malformed(format!("unknown algorithm {other:?}"))),
        }
    }
}

/// Output of one encryption: everything needed to decrypt except the key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CiphertextBundle {
    pub algorithm: String,
    pub version: String,
    #[serde(with = "hex")]
    pub nonce: Vec<u8>,
    #[serde(with = "hex")]
    pub ciphertext: Vec<u8>,
    #[serde(with = "hex")]
    pub tag: Vec<u8>,
    /// Caller-supplied associated data, authenticated but not encrypted.
    #[serde(default, with = "hex")]
    pub associated_data: Vec<u8>,
}

/// Associated data actually fed to the AEAD: domain, algorithm, version and
/// the caller's bytes, each separated by a zero byte.
fn bound_aad(algorithm: &str, version: &str, extra: &[u8]) -> Vec<u8> {
    let mut aad = Vec::with_capacity(AAD_DOMAIN.len() + algorithm.len() + version.len() + extra.len() + 3);
    aad.extend_from_slice(AAD_DOMAIN);
    aad.push(0);
    aad.extend_from_slice(algorithm.as_bytes());
    aad.push(0);
    aad.extend_from_slice(version.as_bytes());
    aad.push(0);
    aad.extend_from_slice(extra);
    aad
}

fn seal<C: AeadInPlace + KeyInit>(
    key: &[u8],
    nonce: &[u8],
    aad: &[u8],
    buffer: &mut [u8],
) -> Result<Vec<u8>> {
    let cipher = C::new_from_slice(key)
        .map_err(|_| TssError::InvalidOperation("key does not fit the cipher"))?;
    let tag = cipher
        .encrypt_in_place_detached(GenericArray::from_slice(nonce), aad, buffer)
        .map_err(|_| TssError::malformed("payload too large for AES-GCM"))?;
    Ok(tag.to_vec())
}

fn open<C: AeadInPlace + KeyInit>(
    key: &[u8],
    nonce: &[u8],
    aad: &[u8],
    tag: &[u8],
    buffer: &mut [u8],
) -> Result<()> {
    let cipher = C::new_from_slice(key)
        .map_err(|_| TssError::InvalidOperation("key does not fit the cipher"))?;
    cipher
        .decrypt_in_place_detached(
            GenericArray::from_slice(nonce),
            aad,
            buffer,
            GenericArray::from_slice(tag),
        )
        .map_err(|_| TssError::AuthenticationFailure)
}

/// Seals and opens payloads with a fixed cipher suite.
///
/// Holds no key material; keys are borrowed for the duration of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PayloadCipher {
    suite: CipherSuite,
}

impl PayloadCipher {
    pub fn new(suite: CipherSuite) -> Self {
        PayloadCipher { suite }
    }

    pub fn suite(&self) -> CipherSuite {
        self.suite
    }

    fn check_key(&self, key: &Secret) -> Result<()> {
        if key.len() != self.suite.key_len() {
            return Err(TssError::SecretLengthMismatch {
                expected: self.suite.key_len(),
                actual: key.len(),
            });
        }
        Ok(())
    }

    /// Encrypts `plaintext` under `key` with no caller associated data.
    pub fn encrypt(&self, plaintext: &[u8], key: &Secret) -> Result<CiphertextBundle> {
        self.encrypt_with_aad(plaintext, key, &[])
    }

    /// Encrypts `plaintext` under `key`, authenticating `associated_data`
    /// alongside it.
    pub fn encrypt_with_aad(
        &self,
        plaintext: &[u8],
        key: &Secret,
        associated_data: &[u8],
    ) -> Result<CiphertextBundle> {
        self.check_key(key)?;

        let mut nonce = vec![0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);

        let algorithm = self.suite.id();
        let aad = bound_aad(algorithm, BUNDLE_VERSION, associated_data);
        let mut ciphertext = plaintext.to_vec();

        let tag = match self.suite {
            CipherSuite::Aes128Gcm => seal::<Aes128Gcm>(key.expose(), &nonce, &aad, &mut ciphertext)?,
            CipherSuite::Aes256Gcm => seal::<Aes256Gcm>(key.expose(), &nonce, &aad, &mut ciphertext)?,
        };

        debug!(algorithm, len = plaintext.len(), "sealed payload");
        Ok(CiphertextBundle {
            algorithm: algorithm.to_string(),
            version: BUNDLE_VERSION.to_string(),
            nonce,
            ciphertext,
            tag,
            associated_data: associated_data.to_vec(),
        })
    }

    /// Decrypts a bundle.
    ///
    /// # Errors
    ///
    /// * [`TssError::MalformedInput`] if the bundle names another algorithm or
    ///   version, or its nonce or tag has the wrong length.
    /// * [`TssError::SecretLengthMismatch`] if the key has the wrong length.
    /// * [`TssError::AuthenticationFailure`] if the tag does not verify. No
    ///   plaintext is returned in that case.
    pub fn decrypt(&self, bundle: &CiphertextBundle, key: &Secret) -> Result<Vec<u8>> {
        let suite: CipherSuite = bundle.algorithm.parse()?;
        if suite != self.suite {
            return Err(TssError::malformed(format!(
                "bundle algorithm {suite} does not match configured {}",
                self.suite
            )));
        }
        if bundle.version != BUNDLE_VERSION {
            return Err(TssError::malformed(format!(
                "unsupported bundle version {:?}",
                bundle.version
            )));
        }
        if bundle.nonce.len() != NONCE_LEN {
            return Err(TssError::malformed(format!(
                "nonce must be {NONCE_LEN} bytes, got {}",
                bundle.nonce.len()
            )));
        }
        if bundle.tag.len() != TAG_LEN {
            return Err(TssError::malformed(format!(
                "tag must be {TAG_LEN} bytes, got {}",
                bundle.tag.len()
            )));
        }
        self.check_key(key)?;

        let aad = bound_aad(&bundle.algorithm, &bundle.version, &bundle.associated_data);
        let mut buffer = Zeroizing::new(bundle.ciphertext.clone());

        let opened = match suite {
            CipherSuite::Aes128Gcm => {
                open::<Aes128Gcm>(key.expose(), &bundle.nonce, &aad, &bundle.tag, &mut buffer)
            }
            CipherSuite::Aes256Gcm => {
                open::<Aes256Gcm>(key.expose(), &bundle.nonce, &aad, &bundle.tag, &mut buffer)
            }
        };
        if let Err(e) = opened {
            warn!(algorithm = %suite, "payload failed authentication");
            return Err(e);
        }

        Ok(std::mem::take(&mut *buffer))
    }
}
