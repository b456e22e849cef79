use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ProbeError;
use crate::payload::Geometry;

pub const BLOCK_SIZE: u64 = 4096;
pub const BLOCK_COUNT: u64 = 100;
pub const TEST_COUNT: usize = 150;

/// Largest payload a single file may get.
pub const MAX_PAYLOAD_LEN: usize = 1 << 30;
/// Largest number of files in one batch.
pub const MAX_TEST_COUNT: usize = 1 << 20;
/// Upper bound on payload bytes held in memory for a whole batch.
pub const MAX_BATCH_BYTES: u64 = 1 << 34;

/// When file handles are released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseMode {
    /// Hold every write handle through the read phase and every read handle until
    /// the closing phase, then release them all.
    #[default]
    Stress,
    /// Close each handle as soon as its own phase is done with it.
    Simple,
}

/// What an I/O error does to the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultMode {
    #[default]
    FailFast,
    /// Record the error against the case and carry on with the rest of the batch.
    Isolate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub block_size: u64,
    pub block_count: u64,
    pub test_count: usize,
    pub close_mode: CloseMode,
    pub fault_mode: FaultMode,
    /// Seed for offsets and payload content. Entropy is used when absent.
    pub seed: Option<u64>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        ProbeConfig {
            block_size: BLOCK_SIZE,
            block_count: BLOCK_COUNT,
            test_count: TEST_COUNT,
            close_mode: CloseMode::default(),
            fault_mode: FaultMode::default(),
            seed: None,
        }
    }
}

impl ProbeConfig {
    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<ProbeConfig, ProbeError> {
        let text = fs::read_to_string(path).map_err(|source| ProbeError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ProbeError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ProbeError> {
        if self.block_size == 0 {
            return Err(ProbeError::Config("block_size must be at least 1".into()));
        }
        if self.test_count == 0 {
            return Err(ProbeError::Config("test_count must be at least 1".into()));
        }
        if self.test_count > MAX_TEST_COUNT {
            return Err(ProbeError::Config(format!(
                "test_count {} exceeds {MAX_TEST_COUNT}",
                self.test_count
            )));
        }
        let payload_len = self
            .geometry()
            .max_payload_len()
            .filter(|len| *len <= MAX_PAYLOAD_LEN)
            .ok_or_else(|| {
                ProbeError::Config(format!(
                    "block_size {} with block_count {} gives payloads over {MAX_PAYLOAD_LEN} bytes",
                    self.block_size, self.block_count
                ))
            })?;
        let batch_bytes = (payload_len as u64).checked_mul(self.test_count as u64);
        if batch_bytes.map_or(true, |bytes| bytes > MAX_BATCH_BYTES) {
            return Err(ProbeError::Config(format!(
                "{} files of up to {payload_len} bytes exceed {MAX_BATCH_BYTES} bytes in memory",
                self.test_count
            )));
        }
        Ok(())
    }

    pub fn geometry(&self) -> Geometry {
        Geometry {
            block_size: self.block_size,
            block_count: self.block_count,
        }
    }

    /// Descriptors the run holds open at its peak.
    pub fn peak_descriptors(&self) -> u64 {
        match self.close_mode {
            CloseMode::Stress => 2 * self.test_count as u64,
            CloseMode::Simple => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_fixed_constants() {
        let config = ProbeConfig::default();
        assert_eq!(config.block_size, 4096);
        assert_eq!(config.block_count, 100);
        assert_eq!(config.test_count, 150);
        assert_eq!(config.close_mode, CloseMode::Stress);
        assert_eq!(config.fault_mode, FaultMode::FailFast);
        assert_eq!(config.peak_descriptors(), 300);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"test_count": 3, "close_mode": "simple"}}"#).unwrap();
        let config = ProbeConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.test_count, 3);
        assert_eq!(config.close_mode, CloseMode::Simple);
        assert_eq!(config.block_size, BLOCK_SIZE);
    }

    #[test]
    fn bad_json_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = ProbeConfig::from_json_file(file.path()).unwrap_err();
        assert!(matches!(err, ProbeError::ConfigParse { .. }));
    }

    #[test]
    fn zero_sizes_rejected() {
        let config = ProbeConfig {
            block_size: 0,
            ..ProbeConfig::default()
        };
        assert!(config.validate().is_err());
        let config = ProbeConfig {
            test_count: 0,
            ..ProbeConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(ProbeConfig::default().validate().is_ok());
    }

    #[test]
    fn overflowing_geometry_rejected() {
        let config = ProbeConfig {
            test_count: 1,
            block_count: u64::MAX,
            ..ProbeConfig::default()
        };
        assert!(matches!(config.validate(), Err(ProbeError::Config(_))));
        let config = ProbeConfig {
            block_size: u64::MAX,
            block_count: 1,
            ..ProbeConfig::default()
        };
        assert!(matches!(config.validate(), Err(ProbeError::Config(_))));
    }

    #[test]
    fn oversized_payload_rejected() {
        let config = ProbeConfig {
            test_count: 1,
            block_count: (MAX_PAYLOAD_LEN as u64) / BLOCK_SIZE,
            ..ProbeConfig::default()
        };
        assert!(matches!(config.validate(), Err(ProbeError::Config(_))));
    }

    #[test]
    fn oversized_batch_rejected() {
        let config = ProbeConfig {
            test_count: usize::MAX,
            ..ProbeConfig::default()
        };
        assert!(matches!(config.validate(), Err(ProbeError::Config(_))));
        let config = ProbeConfig {
            test_count: MAX_TEST_COUNT,
            block_count: 1000,
            ..ProbeConfig::default()
        };
        assert!(matches!(config.validate(), Err(ProbeError::Config(_))));
    }
}
