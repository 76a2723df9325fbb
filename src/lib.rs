//! # Threshold-protected event payloads
//!
//! This library protects a sensitive payload by encrypting it under a fresh
//! symmetric key and splitting that key among custodians with Shamir's Secret
//! Sharing. The payload can only be decrypted once a quorum of custodians
//! hands their shares back.
//!
//! ## Shamir's Secret Sharing (SSS)
//!
//! Each byte `S` of the key becomes the constant term of a random polynomial
//! of degree `t-1` over GF(2^8), where `t` is the threshold:
//!
//! ```ignore
//! f(x) = a0 + a1*x + a2*x^2 + ... + a(t-1)*x^(t-1)
//! ```
//!
//! with `a0 = S`. The share for custodian `i` is `f(i)` for every byte. Any
//! `t` shares determine the polynomials, and Lagrange interpolation at `x = 0`
//! gives the key back. Fewer than `t` shares are consistent with every
//! possible key, so they reveal nothing about it.
//!
//! ## Authenticated payload encryption
//!
//! The payload is sealed with AES-GCM. A wrong or corrupted share rebuilds a
//! wrong key, which the authentication tag then rejects: decryption never
//! returns garbled plaintext.
//!
//! ## Example
//!
//! ```rust
//! use shard_tss::config::EngineConfig;
//! use shard_tss::engine::TssEngine;
//!
//! let engine = TssEngine::new(EngineConfig::default()).unwrap();
//! let (shares, event) = engine.protect_event(b"launch-code-42", 3, 5).unwrap();
//!
//! let quorum = &shares.shares()[2..];
//! let plaintext = engine.recover_event(quorum, &event).unwrap();
//! assert_eq!(plaintext, b"launch-code-42");
//! ```
//!
//! ## Modules
//!
//! - `field`: GF(2^8) arithmetic.
//! - `sss`: splitting and recombining secrets.
//! - `cipher`: AES-GCM payload encryption.
//! - `engine`: the protect / recover orchestration.
//! - `protocol`: serializable request and response types.
//! - `config`: layered engine configuration.

/// The `constants` module defines various constants used in the library.
pub mod constants;

/// Error taxonomy shared by every operation.
pub mod error;

/// The `field` module implements addition, multiplication and inversion in
/// GF(2^8), the field every share lives in.
#[cfg(feature = "sss")]
pub mod field;

/// The `sss` (Shamir's Secret Sharing) module splits a secret into shares and
/// recombines them with Lagrange interpolation.
#[cfg(feature = "sss")]
pub mod sss;

/// Key material that is wiped on drop.
pub mod secret;

/// Share and share-set types handed to custodians.
pub mod share;

/// The `cipher` module seals and opens payloads with AES-GCM.
pub mod cipher;

/// The `config` module loads engine settings from defaults, a TOML file and
/// the environment.
pub mod config;

/// The `engine` module ties key generation, splitting and encryption together
/// and validates every recovery.
pub mod engine;

/// The `protocol` module defines the request and response formats used to
/// drive the engine from outside, with every byte field hex-encoded.
pub mod protocol;

pub use cipher::{CipherSuite, CiphertextBundle, PayloadCipher};
pub use config::EngineConfig;
pub use engine::{TssEngine, TssEvent};
pub use error::{Result, TssError};
pub use secret::Secret;
pub use share::{Share, ShareSet, SharingParams};
