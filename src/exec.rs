//! Timed, offset-seeked I/O against a single open handle.
//!
//! Opening the file is the caller's job so that open cost stays out of the timed
//! interval. Both executors hand the handle back; whether it is closed right away
//! or held until the end of the run is up to the harness.

use std::io::{self, Read, Seek, SeekFrom, Write};
use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct Timed<T> {
    pub value: T,
    pub elapsed: Duration,
}

/// Seek to `offset`, write all of `payload`, flush.
pub fn timed_write<W: Write + Seek>(mut file: W, offset: u64, payload: &[u8]) -> io::Result<Timed<W>> {
    let start = Instant::now();
    file.seek(SeekFrom::Start(offset))?;
    file.write_all(payload)?;
    file.flush()?;
    let elapsed = start.elapsed();
    Ok(Timed { value: file, elapsed })
}

/// Seek to `offset` and read up to `len` bytes.
///
/// Stops early at end of file, so a short file gives back a short buffer rather
/// than an error.
///
pub fn timed_read<R: Read + Seek>(mut file: R, offset: u64, len: usize) -> io::Result<Timed<(R, Vec<u8>)>> {
    let mut buf = Vec::with_capacity(len);
    let start = Instant::now();
    file.seek(SeekFrom::Start(offset))?;
    file.by_ref().take(len as u64).read_to_end(&mut buf)?;
    let elapsed = start.elapsed();
    Ok(Timed {
        value: (file, buf),
        elapsed,
    })
}
