// Fast IP Change - Logging
// Copyright (C) 2026 Fast IP Change contributors
// SPDX-License-Identifier: MIT

//! Tracing setup and log file access.
//!
//! Events go to stderr and to a daily rolling file under
//! `<config dir>/FastIPChange/logs/`. `RUST_LOG` directives are honoured on
//! top of the configured level.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{warn, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::models::LOG_DIR_NAME;
use crate::storage::default_config_dir;

/// File name prefix of the rolling log files.
pub const LOG_FILE_PREFIX: &str = "fast-ip-change.log";

/// Default log directory.
pub fn default_log_dir() -> PathBuf {
    default_config_dir().join(LOG_DIR_NAME)
}

/// Parse a configured level name. Unknown names give INFO.
pub fn parse_level(name: &str) -> Level {
    match name.trim().to_ascii_uppercase().as_str() {
        "TRACE" => Level::TRACE,
        "DEBUG" => Level::DEBUG,
        "WARN" | "WARNING" => Level::WARN,
        "ERROR" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer when dropped and must live
/// until the process exits. Without a usable log directory only the console
/// layer is installed.
pub fn init(level: Level, log_dir: &Path) -> Option<WorkerGuard> {
    let filter = EnvFilter::from_default_env().add_directive(level.into());
    let console = fmt::layer().with_writer(io::stderr).with_target(false);

    match fs::create_dir_all(log_dir) {
        Ok(()) => {
            let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file = fmt::layer().with_writer(writer).with_ansi(false);

            let _ = tracing_subscriber::registry()
                .with(filter)
                .with(console)
                .with(file)
                .try_init();
            Some(guard)
        }
        Err(e) => {
            let _ = tracing_subscriber::registry()
                .with(filter)
                .with(console)
                .try_init();
            warn!("Cannot create log directory {:?}: {}", log_dir, e);
            None
        }
    }
}

/// Log files in a directory, newest first.
///
/// A missing directory yields an empty list.
pub fn list_log_files(log_dir: &Path) -> io::Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(log_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_log_file(path))
        .collect();

    // Daily suffixes (YYYY-MM-DD) sort chronologically
    files.sort_by(|a, b| b.file_name().cmp(&a.file_name()));
    Ok(files)
}

fn is_log_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name.starts_with(LOG_FILE_PREFIX) || path.extension().is_some_and(|ext| ext == "log")
}

/// Read a log file, replacing invalid UTF-8.
pub fn read_log_file(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Resolve a log file by bare file name inside `log_dir`, or the newest one.
///
/// Names containing path components are rejected.
pub fn find_log_file(log_dir: &Path, name: Option<&str>) -> io::Result<Option<PathBuf>> {
    let files = list_log_files(log_dir)?;
    let Some(name) = name else {
        return Ok(files.into_iter().next());
    };
    Ok(files
        .into_iter()
        .find(|path| path.file_name().and_then(|n| n.to_str()) == Some(name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("DEBUG"), Level::DEBUG);
        assert_eq!(parse_level("info"), Level::INFO);
        assert_eq!(parse_level(" Warn "), Level::WARN);
        assert_eq!(parse_level("WARNING"), Level::WARN);
        assert_eq!(parse_level("ERROR"), Level::ERROR);
        assert_eq!(parse_level("verbose"), Level::INFO);
        assert_eq!(parse_level(""), Level::INFO);
    }

    #[test]
    fn test_list_log_files_newest_first() {
        let dir = tempdir().unwrap();
        for name in [
            "fast-ip-change.log.2026-10-14",
            "fast-ip-change.log.2026-10-16",
            "fast-ip-change.log.2026-10-15",
            "app_20261001.log",
            "settings.json",
        ] {
            fs::write(dir.path().join(name), name).unwrap();
        }
        fs::create_dir(dir.path().join("archive.log")).unwrap();

        let files = list_log_files(dir.path()).unwrap();
        let names: Vec<&str> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(
            names,
            vec![
                "fast-ip-change.log.2026-10-16",
                "fast-ip-change.log.2026-10-15",
                "fast-ip-change.log.2026-10-14",
                "app_20261001.log",
            ]
        );
    }

    #[test]
    fn test_missing_dir_is_empty() {
        let dir = tempdir().unwrap();
        assert!(list_log_files(&dir.path().join("nope")).unwrap().is_empty());
    }

    #[test]
    fn test_find_and_read() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("fast-ip-change.log.2026-10-15"), "old").unwrap();
        fs::write(dir.path().join("fast-ip-change.log.2026-10-16"), b"new \xff").unwrap();

        let newest = find_log_file(dir.path(), None).unwrap().unwrap();
        assert_eq!(read_log_file(&newest).unwrap(), "new \u{fffd}");

        let named = find_log_file(dir.path(), Some("fast-ip-change.log.2026-10-15")).unwrap();
        assert_eq!(read_log_file(&named.unwrap()).unwrap(), "old");

        assert!(find_log_file(dir.path(), Some("../settings.json")).unwrap().is_none());
    }
}
