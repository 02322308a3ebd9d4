//! Program cache keys: structural identity (which effects are enabled) and
//! full identity (enabled set plus override values).

use crate::config::{ObjectShaderConfig, OverrideValue};
use sha2::{Digest, Sha256};

/// Structural cache key computed from the enabled-effect set only.
///
/// Override values are deliberately excluded: every effect's code path is
/// generated regardless, so overrides are uniform data, not program shape.
/// Objects with the same key share one compiled program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramCacheKey(pub u64);

impl ProgramCacheKey {
    pub fn from_config(config: &ObjectShaderConfig) -> Self {
        let mut hasher = Sha256::new();
        for id in config.enabled_ids() {
            hasher.update(id.as_bytes());
            hasher.update([0u8]);
        }
        Self(truncate(hasher))
    }
}

impl std::fmt::Display for ProgramCacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Full-identity key over the entire configuration, override values included.
/// Two objects with equal keys may share a handle (and its uniform storage)
/// outright; unequal keys always get distinct storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UniformSetKey(pub u64);

impl UniformSetKey {
    pub fn from_config(config: &ObjectShaderConfig) -> Self {
        let mut hasher = Sha256::new();
        for (id, effect) in &config.effects {
            hasher.update(id.as_bytes());
            hasher.update([if effect.enabled { 1u8 } else { 0u8 }]);
            for (name, value) in &effect.overrides {
                hasher.update(name.as_bytes());
                hasher.update([0u8]);
                match value {
                    OverrideValue::Bool(b) => {
                        hasher.update([b'b', u8::from(*b)]);
                    }
                    OverrideValue::Number(n) => {
                        hasher.update([b'n']);
                        hasher.update(n.to_bits().to_le_bytes());
                    }
                    OverrideValue::Text(s) => {
                        hasher.update([b't']);
                        hasher.update(s.as_bytes());
                    }
                }
                hasher.update([0xff]);
            }
            hasher.update([0xfe]);
        }
        Self(truncate(hasher))
    }
}

impl std::fmt::Display for UniformSetKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

fn truncate(hasher: Sha256) -> u64 {
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}
