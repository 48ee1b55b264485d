// Fast IP Change - Error Types
// Copyright (C) 2026 Fast IP Change contributors
// SPDX-License-Identifier: MIT

//! Shared error types for Fast IP Change.
//!
//! Every error carries a stable machine code (see [`Error::code`]) that is
//! surfaced together with the human-readable message in notifications and
//! in the log.

use thiserror::Error;

/// Result type alias for Fast IP Change operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Reason a profile failed validation.
///
/// Only the first failing check is ever reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Profile name is empty")]
    EmptyName,

    #[error("IP address is empty")]
    EmptyIpAddress,

    #[error("Subnet mask is empty")]
    EmptySubnetMask,

    #[error("NIC name is empty")]
    EmptyNicName,

    #[error("NIC name contains forbidden characters or is too long")]
    UnsafeNicName,

    #[error("Invalid IP address: {0}")]
    InvalidIpAddress(String),

    #[error("Invalid subnet mask: {0}")]
    InvalidSubnetMask(String),

    #[error("Invalid gateway address: {0}")]
    InvalidGateway(String),

    #[error("Invalid primary DNS server: {0}")]
    InvalidDnsPrimary(String),

    #[error("Invalid secondary DNS server: {0}")]
    InvalidDnsSecondary(String),
}

/// Main error type for Fast IP Change operations.
#[derive(Debug, Error)]
pub enum Error {
    // ========================================
    // Validation Errors
    // ========================================
    #[error("Invalid profile: {0}")]
    Validation(#[from] ValidationError),

    #[error("NIC name contains forbidden characters: {0}")]
    InvalidNicName(String),

    // ========================================
    // Command Errors
    // ========================================
    #[error("{message}: {detail}")]
    Command {
        code: &'static str,
        message: String,
        detail: String,
    },

    #[error("Applied configuration could not be confirmed: expected {expected}, found {actual}")]
    VerificationMismatch { expected: String, actual: String },

    // ========================================
    // Profile Errors
    // ========================================
    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    #[error("Profile ID already exists: {0}")]
    DuplicateProfileId(String),

    #[error("No DHCP menu entry for adapter: {0}")]
    DhcpEntryNotFound(String),

    // ========================================
    // Storage Errors
    // ========================================
    #[error("Failed to read configuration: {0}")]
    ConfigReadFailed(String),

    #[error("Failed to write configuration: {0}")]
    ConfigWriteFailed(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParseFailed(String),

    // ========================================
    // System Errors
    // ========================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a new command error.
    pub fn command(code: &'static str, message: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Command {
            code,
            message: message.into(),
            detail: detail.into(),
        }
    }

    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_FAILED",
            Self::InvalidNicName(_) => "INVALID_NIC_NAME",
            Self::Command { code, .. } => code,
            Self::VerificationMismatch { .. } => "VERIFY_FAILED",
            Self::ProfileNotFound(_) => "PROFILE_NOT_FOUND",
            Self::DuplicateProfileId(_) => "DUPLICATE_PROFILE_ID",
            Self::DhcpEntryNotFound(_) => "DHCP_ENTRY_NOT_FOUND",
            Self::ConfigReadFailed(_) => "CONFIG_READ_FAILED",
            Self::ConfigWriteFailed(_) => "CONFIG_WRITE_FAILED",
            Self::ConfigParseFailed(_) => "CONFIG_PARSE_FAILED",
            Self::Io(_) => "IO_ERROR",
        }
    }

    /// Errors that abort an apply sequence regardless of the step policy.
    pub fn is_always_fatal(&self) -> bool {
        matches!(
            self,
            Self::VerificationMismatch { .. } | Self::Validation(_) | Self::InvalidNicName(_)
        )
    }
}

// Convert from serde_json errors
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ConfigParseFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_error_keeps_code() {
        let err = Error::command("APPLY_IP_FAILED", "Failed to apply IP settings", "exit code 1");
        assert_eq!(err.code(), "APPLY_IP_FAILED");
        assert!(matches!(err, Error::Command { .. }));
        assert!(!err.is_always_fatal());
        assert_eq!(err.to_string(), "Failed to apply IP settings: exit code 1");
    }

    #[test]
    fn test_verification_mismatch_is_distinct() {
        let err = Error::VerificationMismatch {
            expected: "192.168.1.10".into(),
            actual: "10.0.0.5".into(),
        };
        assert_eq!(err.code(), "VERIFY_FAILED");
        assert!(err.is_always_fatal());
        assert!(!matches!(err, Error::Command { .. }));
    }

    #[test]
    fn test_validation_wraps_reason() {
        let err: Error = ValidationError::EmptyName.into();
        assert_eq!(err.code(), "VALIDATION_FAILED");
        assert_eq!(err.to_string(), "Invalid profile: Profile name is empty");
    }
}
