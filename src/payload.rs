use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rand::Rng;

use crate::identity::FileToken;
use crate::oracle::Outcome;

/// Block size and per-file block multiplier used to size payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub block_size: u64,
    pub block_count: u64,
}

impl Geometry {
    /// Payload length for an offset pair.
    ///
    /// The head runs from `first_offset` to the end of its block, then `block_count`
    /// whole blocks follow, then a tail of `second_offset` bytes. The result is
    /// always larger than `block_size * block_count`.
    ///
    /// Callers must have checked the geometry with [`Geometry::max_payload_len`].
    ///
    pub fn payload_len(&self, first_offset: u64, second_offset: u64) -> usize {
        debug_assert!(first_offset < self.block_size);
        debug_assert!(second_offset < self.block_size);
        ((self.block_size - first_offset) + self.block_size * self.block_count + second_offset)
            as usize
    }

    /// Longest payload this geometry can produce, or `None` if it does not fit in
    /// memory arithmetic on this target.
    pub fn max_payload_len(&self) -> Option<usize> {
        let body = self.block_size.checked_mul(self.block_count)?;
        let len = body
            .checked_add(self.block_size)?
            .checked_add(self.block_size.checked_sub(1)?)?;
        usize::try_from(len).ok()
    }
}

/// One file's worth of generated data and its results.
#[derive(Debug, Clone)]
pub struct TestCase {
    pub path: PathBuf,
    pub first_offset: u64,
    pub second_offset: u64,
    pub payload: Vec<u8>,
    pub write_duration: Option<Duration>,
    pub read_duration: Option<Duration>,
    /// Number of bytes the read phase got back.
    pub read_len: Option<usize>,
    pub outcome: Outcome,
}

impl TestCase {
    /// Build a case with fixed offsets and random content.
    pub fn with_offsets<R: Rng + ?Sized>(
        rng: &mut R,
        path: PathBuf,
        geometry: Geometry,
        first_offset: u64,
        second_offset: u64,
    ) -> TestCase {
        let mut payload = vec![0u8; geometry.payload_len(first_offset, second_offset)];
        rng.fill(&mut payload[..]);
        TestCase {
            path,
            first_offset,
            second_offset,
            payload,
            write_duration: None,
            read_duration: None,
            read_len: None,
            outcome: Outcome::Pending,
        }
    }

    /// Draw both offsets uniformly from `[0, block_size)` and fill the payload.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, path: PathBuf, geometry: Geometry) -> TestCase {
        let first_offset = rng.gen_range(0..geometry.block_size);
        let second_offset = rng.gen_range(0..geometry.block_size);
        Self::with_offsets(rng, path, geometry, first_offset, second_offset)
    }

    /// Offset one past the last payload byte on disk.
    pub fn end_offset(&self) -> u64 {
        self.first_offset + self.payload.len() as u64
    }
}

/// Generate `count` cases under `mount`, each with its own file name.
pub fn generate_batch<R: Rng + ?Sized>(
    rng: &mut R,
    mount: &Path,
    geometry: Geometry,
    count: usize,
) -> Vec<TestCase> {
    let mut seen = HashSet::with_capacity(count);
    let mut cases = Vec::with_capacity(count);
    while cases.len() < count {
        let token = FileToken::new();
        if !seen.insert(token) {
            continue;
        }
        cases.push(TestCase::random(rng, token.path_in(mount), geometry));
    }
    cases
}
