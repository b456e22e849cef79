use std::path::Path;

use log::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::{CloseMode, FaultMode, ProbeConfig};
use crate::error::{Phase, ProbeError};
use crate::exec::{timed_read, timed_write};
use crate::oracle::{first_divergence, Outcome};
use crate::payload::{generate_batch, TestCase};
use crate::progress::Progress;
use crate::report::Report;
use crate::target::ProbeTarget;

/// Handles held open across phases, released together at the end of a run.
pub struct OpenHandles<W, R> {
    writers: Vec<W>,
    readers: Vec<R>,
}

impl<W, R> OpenHandles<W, R> {
    pub fn new() -> Self {
        OpenHandles {
            writers: Vec::new(),
            readers: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.writers.len() + self.readers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Release everything, newest first, a reader and a writer at a time.
    pub fn close_all(&mut self) {
        while !self.is_empty() {
            drop(self.readers.pop());
            drop(self.writers.pop());
        }
    }
}

impl<W, R> Default for OpenHandles<W, R> {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs a batch of cases through the write, read and close phases.
pub struct Harness<T: ProbeTarget, P: Progress> {
    target: T,
    config: ProbeConfig,
    progress: P,
    handles: OpenHandles<T::Writer, T::Reader>,
}

impl<T: ProbeTarget, P: Progress> Harness<T, P> {
    pub fn new(target: T, config: ProbeConfig, progress: P) -> Self {
        Harness {
            target,
            config,
            progress,
            handles: OpenHandles::new(),
        }
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Handles currently held open by the harness.
    pub fn open_handles(&self) -> usize {
        self.handles.len()
    }

    /// Generate the batch for `mount` from the configured seed, or entropy.
    ///
    /// The config is validated first, so sizes that would overflow or exhaust memory
    /// come back as [`ProbeError::Config`].
    ///
    pub fn generate(&self, mount: &Path) -> Result<Vec<TestCase>, ProbeError> {
        self.config.validate()?;
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        info!("{}: {} cases under {}", Phase::Generating, self.config.test_count, mount.display());
        Ok(generate_batch(&mut rng, mount, self.config.geometry(), self.config.test_count))
    }

    /// Write every case, then read every case, then close every handle.
    pub fn run(&mut self, cases: &mut [TestCase]) -> Result<Report, ProbeError> {
        self.write_phase(cases)?;
        self.progress.phase_break().map_err(ProbeError::Progress)?;
        self.read_phase(cases)?;
        self.close_phase();
        info!("{}: {} cases", Phase::Reporting, cases.len());
        Ok(Report::from_cases(cases, &self.config))
    }

    pub fn write_phase(&mut self, cases: &mut [TestCase]) -> Result<(), ProbeError> {
        info!("{}: {} cases", Phase::Writing, cases.len());
        let total = cases.len();
        for (i, case) in cases.iter_mut().enumerate() {
            self.progress
                .update(&format!("Writing file {}/{}", i + 1, total))
                .map_err(ProbeError::Progress)?;
            if let Err(err) = self.write_one(case) {
                self.isolate(case, err)?;
            }
        }
        Ok(())
    }

    /// Read every case back and judge it. Cases that already errored are skipped.
    ///
    /// Reading does not disturb what was written, so this can be repeated and gives
    /// the same outcomes.
    ///
    pub fn read_phase(&mut self, cases: &mut [TestCase]) -> Result<(), ProbeError> {
        info!("{}: {} cases", Phase::Reading, cases.len());
        let total = cases.len();
        for (i, case) in cases.iter_mut().enumerate() {
            self.progress
                .update(&format!("Reading file {}/{}", i + 1, total))
                .map_err(ProbeError::Progress)?;
            if case.outcome.is_error() {
                continue;
            }
            if let Err(err) = self.read_one(case) {
                self.isolate(case, err)?;
            }
        }
        Ok(())
    }

    pub fn close_phase(&mut self) {
        info!("{}: {} handles", Phase::Closing, self.handles.len());
        self.handles.close_all();
    }

    fn write_one(&mut self, case: &mut TestCase) -> Result<(), ProbeError> {
        let file = self
            .target
            .create(&case.path)
            .map_err(ProbeError::io(Phase::Writing, &case.path))?;
        let timed = timed_write(file, case.first_offset, &case.payload)
            .map_err(ProbeError::io(Phase::Writing, &case.path))?;
        debug!(
            "wrote {} bytes at {} to {} in {:?}",
            case.payload.len(),
            case.first_offset,
            case.path.display(),
            timed.elapsed
        );
        case.write_duration = Some(timed.elapsed);
        if self.config.close_mode == CloseMode::Stress {
            self.handles.writers.push(timed.value);
        }
        Ok(())
    }

    fn read_one(&mut self, case: &mut TestCase) -> Result<(), ProbeError> {
        let file = self
            .target
            .open(&case.path)
            .map_err(ProbeError::io(Phase::Reading, &case.path))?;
        let timed = timed_read(file, case.first_offset, case.payload.len())
            .map_err(ProbeError::io(Phase::Reading, &case.path))?;
        let (file, data) = timed.value;
        case.read_duration = Some(timed.elapsed);
        case.read_len = Some(data.len());
        case.outcome = Outcome::judge(&case.payload, &data);
        if !case.outcome.is_match() {
            warn!(
                "{}: read {} of {} bytes, first difference at byte {:?}",
                case.path.display(),
                data.len(),
                case.payload.len(),
                first_divergence(&case.payload, &data)
            );
        }
        if self.config.close_mode == CloseMode::Stress {
            self.handles.readers.push(file);
        }
        Ok(())
    }

    /// Record `err` against the case, or hand it back when running fail-fast.
    fn isolate(&self, case: &mut TestCase, err: ProbeError) -> Result<(), ProbeError> {
        match self.config.fault_mode {
            FaultMode::FailFast => Err(err),
            FaultMode::Isolate => {
                let message = match std::error::Error::source(&err) {
                    Some(source) => format!("{err}: {source}"),
                    None => err.to_string(),
                };
                warn!("{message}");
                case.outcome = Outcome::Error { message };
                Ok(())
            }
        }
    }
}
