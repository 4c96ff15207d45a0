// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service layer: wires the Airship module to its SDK, preference store and
// event channel for the harness.

pub mod data_dir;
pub mod host_services;
