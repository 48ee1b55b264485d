// Fast IP Change - Privilege Check
// Copyright (C) 2026 Fast IP Change contributors
// SPDX-License-Identifier: MIT

//! Administrator privilege detection.

use tracing::debug;

/// Check whether the process can change adapter configuration.
///
/// On Windows, opening the first physical drive only succeeds for an
/// elevated process.
#[cfg(windows)]
pub fn is_elevated() -> bool {
    match std::fs::File::open(r"\\.\PHYSICALDRIVE0") {
        Ok(_) => true,
        Err(e) => {
            debug!("Elevation check failed: {}", e);
            false
        }
    }
}

/// Other platforms have no netsh to protect; always true.
#[cfg(not(windows))]
pub fn is_elevated() -> bool {
    debug!("Elevation check skipped on this platform");
    true
}
