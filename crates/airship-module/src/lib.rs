// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Airship module: the host-facing half of the push SDK bridge. Batched
// tag-group and attribute edits, the event relay with its cold-start buffer,
// opt-in change detection, snapshot projection and persisted preferences.
// Native SDK access goes through the traits in `airship-bridge`.

pub mod batch;
pub mod decode;
pub mod module;
pub mod operations;
pub mod opt_in;
pub mod preferences;
pub mod promise;
pub mod relay;
pub mod snapshot;

pub use batch::{BatchEngine, BatchReport};
pub use module::AirshipModule;
pub use preferences::{MemoryPreferences, ModulePreferences, SqlitePreferences};
pub use promise::{HostResult, PendingRequest, Rejection};
pub use relay::{EventRelay, EventSink};
