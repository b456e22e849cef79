use log::*;

use crate::config::ProbeConfig;

/// Descriptors kept aside for stdio and whatever the runtime has open.
const DESCRIPTOR_MARGIN: u64 = 16;

/// Soft `RLIMIT_NOFILE` of this process, or `None` when unlimited or unknown.
#[cfg(unix)]
pub fn open_file_limit() -> Option<u64> {
    let mut limit = libc::rlimit {
        rlim_cur: 0,
        rlim_max: 0,
    };
    // getrlimit only writes into the struct we hand it.
    let rc = unsafe { libc::getrlimit(libc::RLIMIT_NOFILE, &mut limit) };
    if rc != 0 || limit.rlim_cur == libc::RLIM_INFINITY {
        return None;
    }
    Some(limit.rlim_cur as u64)
}

#[cfg(not(unix))]
pub fn open_file_limit() -> Option<u64> {
    None
}

/// Warn when the run is going to need more descriptors than the soft limit allows.
///
/// Returns `false` if the limit looks too low. The run still goes ahead: hitting
/// the limit is one of the things this probe is meant to find.
///
pub fn check_descriptor_budget(config: &ProbeConfig) -> bool {
    let needed = config.peak_descriptors() + DESCRIPTOR_MARGIN;
    match open_file_limit() {
        Some(limit) if needed > limit => {
            warn!("run holds up to {needed} descriptors but RLIMIT_NOFILE is {limit}; opens may fail");
            false
        }
        Some(limit) => {
            debug!("descriptor budget {needed} within RLIMIT_NOFILE {limit}");
            true
        }
        None => true,
    }
}
