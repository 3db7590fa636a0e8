//! Environment driven configuration. There are no command line flags.

use std::env;
use std::str::FromStr;

use crate::error::HarnessError;

pub const BACKEND_VAR: &str = "SPARSE_CONFORMANCE_BACKEND";
pub const SEED_VAR: &str = "SPARSE_CONFORMANCE_SEED";
pub const REPEAT_VAR: &str = "SPARSE_CONFORMANCE_REPEAT";
pub const VERIFY_VAR: &str = "SPARSE_CONFORMANCE_VERIFY";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Host,
    Wgpu,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    pub backend: BackendKind,
    /// Seeds fixture values. Shapes do not depend on it.
    pub seed: u64,
    /// How often each valid call is repeated; every repetition must agree.
    pub repeat: u32,
    /// Compare outputs against the host reference after a successful call.
    pub verify: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Host,
            seed: 0x5eed_2021,
            repeat: 2,
            verify: true,
        }
    }
}

impl HarnessConfig {
    pub fn from_env() -> Result<Self, HarnessError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, HarnessError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(value) = lookup(BACKEND_VAR) {
            config.backend = match value.trim().to_ascii_lowercase().as_str() {
                "host" => BackendKind::Host,
                "wgpu" | "gpu" => BackendKind::Wgpu,
                _ => return Err(invalid(BACKEND_VAR, value)),
            };
        }
        if let Some(value) = lookup(SEED_VAR) {
            config.seed = parse(SEED_VAR, value)?;
        }
        if let Some(value) = lookup(REPEAT_VAR) {
            config.repeat = parse(REPEAT_VAR, value)?;
            if config.repeat == 0 {
                return Err(invalid(REPEAT_VAR, "0".to_string()));
            }
        }
        if let Some(value) = lookup(VERIFY_VAR) {
            config.verify = match value.trim() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => return Err(invalid(VERIFY_VAR, value)),
            };
        }
        Ok(config)
    }
}

fn parse<T: FromStr>(key: &'static str, value: String) -> Result<T, HarnessError> {
    value.trim().parse().map_err(|_| invalid(key, value))
}

fn invalid(key: &'static str, value: String) -> HarnessError {
    HarnessError::Config { key, value }
}
