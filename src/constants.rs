/// Number of elements in GF(2^8). Share indices must be nonzero and below this bound.
pub const FIELD_SIZE: u32 = 256;

/// Largest number of shares a single sharing can produce (`FIELD_SIZE - 1`).
pub const MAX_SHARES: usize = 255;

/// Smallest threshold accepted by the sharer.
pub const MIN_THRESHOLD: usize = 2;

/// AES-GCM nonce length in bytes (96 bits).
pub const NONCE_LEN: usize = 12;

/// AES-GCM authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

/// Version tag written into every ciphertext bundle.
pub const BUNDLE_VERSION: &str = "1";

/// Domain prefix bound into the AEAD associated data.
pub const AAD_DOMAIN: &[u8] = b"shard-tss::payload";

/// Environment variable prefix for configuration overrides, e.g. `SHARD_TSS_CIPHER`.
pub const ENV_PREFIX: &str = "SHARD_TSS";

/// Default quorum: two of the three custodians (user, operator, regulator).
pub const DEFAULT_THRESHOLD: usize = 2;
pub const DEFAULT_SHARES: usize = 3;

/// Number of hex characters kept from the ciphertext digest to form a payload id.
pub const PAYLOAD_ID_LEN: usize = 16;
