// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core types and error definitions shared across the airship crates.

pub mod config;
pub mod error;
pub mod types;

pub use config::{ModuleConfig, NotificationConfig};
pub use error::AirshipError;
pub use types::*;
