//! Filesystem correctness and throughput probe.
//!
//! Writes random payloads at unaligned offsets into a batch of files, reads them
//! back, checks every byte and reports mean throughput for each direction.

pub mod cli;
pub mod config;
pub mod error;
pub mod exec;
pub mod harness;
pub mod identity;
pub mod limits;
pub mod oracle;
pub mod payload;
pub mod progress;
pub mod report;
pub mod target;

pub use config::{CloseMode, FaultMode, ProbeConfig};
pub use error::{Phase, ProbeError};
pub use harness::Harness;
pub use oracle::Outcome;
pub use payload::{Geometry, TestCase};
pub use report::Report;
pub use target::{MountTarget, ProbeTarget};
