use std::fmt;
use std::path::{Path, PathBuf};

use rand::Rng;

/// A random token naming one probe file.
///
/// The token is rendered as 32 hex digits after a `test` prefix, so the files a run
/// leaves behind look like `test3f9a...`.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileToken(u128);

impl FileToken {
    /// Create a new token from the thread-local generator.
    ///
    /// Tokens are drawn independently of any seeded payload generator, so replaying a
    /// seed never reuses the file names of an earlier run.
    ///
    pub fn new() -> Self {
        let mut rng = rand::thread_rng();
        FileToken(rng.gen::<u128>())
    }

    pub fn file_name(&self) -> String {
        format!("test{self}")
    }

    pub fn path_in(&self, mount: &Path) -> PathBuf {
        mount.join(self.file_name())
    }
}

impl Default for FileToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FileToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}
