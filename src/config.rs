use config::{Config, ConfigError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::cipher::CipherSuite;
use crate::constants::{DEFAULT_SHARES, DEFAULT_THRESHOLD, ENV_PREFIX, MAX_SHARES, MIN_THRESHOLD};
use crate::error::{Result, TssError};

/// Engine settings.
///
/// Sources are layered: built-in defaults, then an optional TOML file, then
/// environment variables prefixed with `SHARD_TSS_` (e.g.
/// `SHARD_TSS_CIPHER=AES-128-GCM`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub cipher: CipherSuite,
    pub default_threshold: usize,
    pub default_shares: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            cipher: CipherSuite::default(),
            default_threshold: DEFAULT_THRESHOLD,
            default_shares: DEFAULT_SHARES,
        }
    }
}

impl EngineConfig {
    /// Loads the configuration, reading `path` if given and present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = EngineConfig::default();
        let mut builder = Config::builder()
            .set_default("cipher", defaults.cipher.id())?
            .set_default("default_threshold", defaults.default_threshold as u64)?
            .set_default("default_shares", defaults.default_shares as u64)?;

        if let Some(path) = path {
            debug!("📝 Loading config at path: {:#?}", path);
            builder = builder.add_source(config::File::from(path).required(false));
        }

        let settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()?;

        let my_config: EngineConfig = settings.try_into()?;
        my_config.validate()?;
        Ok(my_config)
    }

    /// Length in bytes of the keys the engine generates and accepts.
    pub fn key_len(&self) -> usize {
        self.cipher.key_len()
    }

    pub fn validate(&self) -> Result<()> {
        let (k, n) = (self.default_threshold, self.default_shares);
        if k < MIN_THRESHOLD || k > n || n > MAX_SHARES {
            return Err(TssError::InvalidThreshold {
                threshold: k,
                total: n,
            });
        }
        Ok(())
    }

    /// Writes this configuration as pretty TOML, creating parent directories.
    pub fn write_default(&self, path: &Path) -> Result<()> {
        let toml = toml::to_string_pretty(self)
            .map_err(|err| ConfigError::Foreign(Box::new(err)))?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|err| ConfigError::Foreign(Box::new(err)))?;
        }
        fs::write(path, toml).map_err(|err| ConfigError::Foreign(Box::new(err)))?;
        Ok(())
    }
}

impl TryFrom<Config> for EngineConfig {
    type Error = ConfigError;

    fn try_from(config: Config) -> std::result::Result<Self, Self::Error> {
        let cipher = config
            .get_string("cipher")?
            .parse::<CipherSuite>()
            .map_err(|err| ConfigError::Message(err.to_string()))?;

        Ok(EngineConfig {
            cipher,
            default_threshold: get_count(&config, "default_threshold")?,
            default_shares: get_count(&config, "default_shares")?,
        })
    }
}

fn get_count(config: &Config, key: &str) -> std::result::Result<usize, ConfigError> {
    let value = config.get_int(key)?;
    usize::try_from(value).map_err(|_| {
        ConfigError::Message(format!("{key} must be a non-negative integer, got {value}"))
    })
}
