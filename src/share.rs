use core::fmt;

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::constants::FIELD_SIZE;

/// One point on the secret-encoding polynomials, handed to one custodian.
///
/// `value` holds one field element per secret byte. The index is public; the
/// value is wiped on drop and redacted from `Debug`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct Share {
    index: u32,
    #[serde(with = "hex")]
    value: Vec<u8>,
}

impl Share {
    pub fn new(index: u32, value: Vec<u8>) -> Self {
        Share { index, value }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }
}

impl fmt::Debug for Share {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Share")
            .field("index", &self.index)
            .field("value", &format_args!("[REDACTED; {}]", self.value.len()))
            .finish()
    }
}

/// Parameters of one sharing instance. Public, safe to store next to the ciphertext.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharingParams {
    pub threshold: usize,
    pub total: usize,
    /// Order of the field the shares live in.
    pub field_size: u32,
}

impl SharingParams {
    pub fn new(threshold: usize, total: usize) -> Self {
        SharingParams {
            threshold,
            total,
            field_size: FIELD_SIZE,
        }
    }
}

/// All shares produced for one secret, ordered by index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareSet {
    params: SharingParams,
    shares: Vec<Share>,
}

impl ShareSet {
    #[cfg(feature = "sss")]
    pub(crate) fn new(params: SharingParams, mut shares: Vec<Share>) -> Self {
        shares.sort_by_key(Share::index);
        ShareSet { params, shares }
    }

    pub fn params(&self) -> SharingParams {
        self.params
    }

    pub fn shares(&self) -> &[Share] {
        &self.shares
    }

    pub fn len(&self) -> usize {
        self.shares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }

    /// Looks a share up by its public index.
    pub fn get(&self, index: u32) -> Option<&Share> {
        self.shares.iter().find(|s| s.index == index)
    }

    pub fn into_shares(self) -> Vec<Share> {
        self.shares
    }
}
