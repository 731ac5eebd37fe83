//! Reserver tuning knobs (§6 "Observable configuration knobs").
//!
//! There is no config *file* format here — this is a library, not a
//! deployable service — but the env-var override idiom follows
//! `server/src/config/cfgenv.rs`'s `getenv!` macro in spirit.

use crate::error::{Error, QResult};
use std::env;

/// Default block size: 256 KiB.
pub const DEFAULT_BLOCK_SIZE: usize = 256 * 1024;

/// Default chunk alignment: `2 * size_of::<*const ()>()`.
pub const DEFAULT_ALIGNMENT: usize = 2 * core::mem::size_of::<*const ()>();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReserverConfig {
    block_size: usize,
    default_alignment: usize,
}

impl Default for ReserverConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            default_alignment: DEFAULT_ALIGNMENT,
        }
    }
}

impl ReserverConfig {
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn default_alignment(&self) -> usize {
        self.default_alignment
    }

    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn with_alignment(mut self, alignment: usize) -> Self {
        self.default_alignment = alignment;
        self
    }

    /// Validates the power-of-two and minimum-size invariants from §6.
    pub fn validate(self) -> QResult<Self> {
        if !self.block_size.is_power_of_two() {
            return Err(Error::InvalidConfig(format!(
                "block_size {} is not a power of two",
                self.block_size
            )));
        }
        if !self.default_alignment.is_power_of_two() {
            return Err(Error::InvalidConfig(format!(
                "default_alignment {} is not a power of two",
                self.default_alignment
            )));
        }
        if self.default_alignment < core::mem::size_of::<*const ()>() {
            return Err(Error::InvalidConfig(
                "default_alignment must be at least sizeof(pointer)".into(),
            ));
        }
        Ok(self)
    }

    /// Reads `QENTEM_BLOCK_SIZE`/`QENTEM_DEFAULT_ALIGNMENT` overrides, falling
    /// back to defaults for anything unset. Mirrors the teacher's
    /// environment-override-over-defaults precedence.
    pub fn from_env() -> QResult<Self> {
        let mut cfg = Self::default();
        if let Ok(v) = env::var("QENTEM_BLOCK_SIZE") {
            cfg.block_size = v
                .parse()
                .map_err(|_| Error::InvalidConfig(format!("bad QENTEM_BLOCK_SIZE: {v}")))?;
        }
        if let Ok(v) = env::var("QENTEM_DEFAULT_ALIGNMENT") {
            cfg.default_alignment = v
                .parse()
                .map_err(|_| Error::InvalidConfig(format!("bad QENTEM_DEFAULT_ALIGNMENT: {v}")))?;
        }
        cfg.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(ReserverConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_non_power_of_two_block_size() {
        let cfg = ReserverConfig::default().with_block_size(300);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_undersized_alignment() {
        let cfg = ReserverConfig::default().with_alignment(1);
        assert!(cfg.validate().is_err());
    }
}
