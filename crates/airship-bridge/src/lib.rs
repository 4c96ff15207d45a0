// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Airship: native push SDK bridge abstractions.
//
// The traits in `traits` are the seams between the bridge module and the
// SDK it wraps. The host application injects the real SDK implementation;
// desktop and CI builds use the in-memory `StubBridge`.

pub mod stub;
pub mod traits;

#[cfg(target_os = "android")]
pub mod android;

use std::sync::Arc;

pub use stub::StubBridge;
pub use traits::{PlatformBridge, PreferenceStore};

/// The preference store native to the target platform, if it has one.
///
/// Android keeps module preferences in `SharedPreferences`. Other targets
/// return `None` and the caller picks its own store.
pub fn platform_preferences() -> Option<Arc<dyn PreferenceStore>> {
    #[cfg(target_os = "android")]
    {
        Some(Arc::new(android::AndroidPreferences::new()))
    }
    #[cfg(not(target_os = "android"))]
    {
        None
    }
}
