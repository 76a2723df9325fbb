use serde::{Deserialize, Serialize};

use crate::cipher::CiphertextBundle;
use crate::engine::{TssEngine, TssEvent};
use crate::error::Result;
use crate::share::{Share, ShareSet};

/// Request to protect a payload with a fresh, threshold-split key.
///
/// # Examples
///
/// ```rust
/// use shard_tss::protocol::ProtectRequest;
///
/// let request: ProtectRequest = serde_json::from_str(
///     r#"{"plaintext":"6869","threshold":2,"total_shares":3}"#,
/// ).unwrap();
/// assert_eq!(request.plaintext, b"hi");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectRequest {
    #[serde(with = "hex")]
    pub plaintext: Vec<u8>,
    pub threshold: usize,
    pub total_shares: usize,
}

/// Response to a [`ProtectRequest`]: the shares to hand out and the public
/// event record to store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectResponse {
    pub shares: Vec<Share>,
    pub bundle: CiphertextBundle,
    pub payload_id: String,
    pub payload_hash: String,
    pub threshold: usize,
    pub total_shares: usize,
}

impl ProtectResponse {
    pub fn new(shares: ShareSet, event: TssEvent) -> Self {
        let params = shares.params();
        ProtectResponse {
            shares: shares.into_shares(),
            bundle: event.bundle,
            payload_id: event.payload_id,
            payload_hash: event.payload_hash,
            threshold: params.threshold,
            total_shares: params.total,
        }
    }
}

/// Request to recover a payload from custodian shares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoverRequest {
    pub shares: Vec<Share>,
    pub threshold: usize,
    pub bundle: CiphertextBundle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoverResponse {
    #[serde(with = "hex")]
    pub plaintext: Vec<u8>,
}

/// Serves a [`ProtectRequest`].
pub fn handle_protect(engine: &TssEngine, request: &ProtectRequest) -> Result<ProtectResponse> {
    let (shares, event) =
        engine.protect_event(&request.plaintext, request.threshold, request.total_shares)?;
    Ok(ProtectResponse::new(shares, event))
}

/// Serves a [`RecoverRequest`].
pub fn handle_recover(engine: &TssEngine, request: &RecoverRequest) -> Result<RecoverResponse> {
    let plaintext = engine.recover(&request.shares, request.threshold, &request.bundle)?;
    Ok(RecoverResponse { plaintext })
}
