// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Opt-in change detector.
//
// Notification permission is observed only when the host comes to the
// foreground. The current platform value is compared with the last persisted
// one and a change event goes out exactly once per flip.

use std::sync::{Mutex, PoisonError};

use airship_bridge::traits::NativePush;
use airship_core::error::Result;
use airship_core::types::Event;
use tracing::{debug, info, instrument};

use crate::preferences::ModulePreferences;
use crate::relay::EventRelay;

pub struct OptInDetector {
    preferences: ModulePreferences,
    /// Serialises read-compare-persist so two foreground hooks racing each
    /// other cannot both emit for the same flip.
    check_lock: Mutex<()>,
}

impl OptInDetector {
    pub fn new(preferences: ModulePreferences) -> Self {
        Self {
            preferences,
            check_lock: Mutex::new(()),
        }
    }

    /// Compare the platform's opt-in status against the persisted one.
    ///
    /// Returns `Some(new_status)` when it changed (and the event was emitted),
    /// `None` when it did not. A failed persist emits nothing so the next
    /// foreground transition retries.
    #[instrument(skip_all)]
    pub fn check<P>(&self, push: &P, relay: &EventRelay) -> Result<Option<bool>>
    where
        P: NativePush + ?Sized,
    {
        let _guard = self
            .check_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let current = push.is_opted_in();
        let previous = self.preferences.opt_in_status()?;
        if current == previous {
            debug!(opt_in = current, "opt-in status unchanged");
            return Ok(None);
        }

        self.preferences.set_opt_in_status(current)?;
        info!(opt_in = current, "opt-in status changed");
        relay.emit(Event::NotificationOptInChanged { opt_in: current });
        Ok(Some(current))
    }
}
