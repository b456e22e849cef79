use std::fs::File;
use std::io::{self, Read, Seek, Write};
use std::path::Path;

/// Where the probe files live.
///
/// The harness only ever needs to create a file for writing and open it again for
/// reading. [`MountTarget`] does both on the real filesystem; tests swap in targets
/// that misbehave on purpose.
///
pub trait ProbeTarget {
    type Writer: Write + Seek;
    type Reader: Read + Seek;

    /// Create or truncate `path` for writing.
    fn create(&self, path: &Path) -> io::Result<Self::Writer>;

    /// Open `path` for reading.
    fn open(&self, path: &Path) -> io::Result<Self::Reader>;
}

/// The directory under test, accessed through the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct MountTarget;

impl ProbeTarget for MountTarget {
    type Writer = File;
    type Reader = File;

    fn create(&self, path: &Path) -> io::Result<File> {
        File::create(path)
    }

    fn open(&self, path: &Path) -> io::Result<File> {
        File::open(path)
    }
}
