// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for the Airship bridge.

use thiserror::Error;

/// Top-level error type for all bridge operations.
#[derive(Debug, Error)]
pub enum AirshipError {
    // -- Message center --
    #[error("message not found: {0}")]
    MessageNotFound(String),

    #[error("inbox failed to refresh")]
    DidNotRefresh,

    // -- Actions --
    #[error("action rejected arguments")]
    ActionRejectedArguments,

    #[error("action {0} not found")]
    ActionNotFound(String),

    #[error("action execution failed: {0}")]
    ActionExecution(String),

    // -- Notifications --
    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error("invalid notification identifier: {0}")]
    InvalidIdentifier(String),

    // -- Identity scopes --
    #[error("edit scope unavailable: {0}")]
    ScopeUnavailable(String),

    // -- Storage / persistence --
    #[error("preference store error: {0}")]
    Preferences(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -- Platform bridge --
    #[error("platform bridge error: {0}")]
    Bridge(String),
}

impl AirshipError {
    /// Rejection code handed to the scripting host when a promise fails.
    pub fn reject_code(&self) -> &'static str {
        match self {
            Self::MessageNotFound(_) => "STATUS_MESSAGE_NOT_FOUND",
            Self::DidNotRefresh => "STATUS_DID_NOT_REFRESH",
            Self::ActionRejectedArguments => "STATUS_REJECTED_ARGUMENTS",
            Self::ActionNotFound(_) => "STATUS_ACTION_NOT_FOUND",
            Self::ActionExecution(_) => "STATUS_EXECUTION_ERROR",
            Self::Unsupported(_) => "UNSUPPORTED",
            Self::InvalidIdentifier(_)
            | Self::ScopeUnavailable(_)
            | Self::Preferences(_)
            | Self::Io(_)
            | Self::Serialization(_)
            | Self::Bridge(_) => "STATUS_INTERNAL_ERROR",
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, AirshipError>;
