// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Operation batch engine.
//
// A batch is an ordered list of edit records bound to one scope (identity +
// edit kind). The engine opens one scoped editor, records every valid
// operation in list order, drops malformed records without a trace, and
// commits exactly once. Batches against the same scope are serialised so
// two commits can never interleave.

use std::sync::{Mutex, MutexGuard, PoisonError};

use airship_bridge::traits::{AttributeEditor, NativeAudience, TagGroupsEditor};
use airship_core::error::Result;
use airship_core::types::{
    AttributeOperation, EditKind, EditScope, Identity, TagGroupOperation, TagOperationType,
};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::operations::{parse_attribute_operation, parse_tag_group_operation};

/// Summary of one committed batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchReport {
    pub scope: EditScope,
    /// Records recorded against the editor and committed.
    pub applied: usize,
    /// Records dropped as malformed.
    pub skipped: usize,
}

/// Applies operation batches with one critical section per edit scope.
pub struct BatchEngine {
    /// Indexed by [`EditScope::index`].
    scope_locks: [Mutex<()>; 4],
}

impl BatchEngine {
    pub fn new() -> Self {
        Self {
            scope_locks: Default::default(),
        }
    }

    fn lock(&self, scope: EditScope) -> MutexGuard<'_, ()> {
        self.scope_locks[scope.index()]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply raw tag-group records to `identity`'s tag groups.
    ///
    /// Fails only when the scope itself is unavailable or the commit is
    /// refused, in which case nothing from the batch lands.
    #[instrument(skip(self, audience, records), fields(records = records.len()))]
    pub fn apply_tag_group_batch<A>(
        &self,
        audience: &A,
        identity: Identity,
        records: &[Value],
    ) -> Result<BatchReport>
    where
        A: NativeAudience + ?Sized,
    {
        let operations = records.iter().filter_map(parse_tag_group_operation);
        let mut report = self.apply_tag_group_operations(audience, identity, operations)?;
        report.skipped = records.len() - report.applied;
        Ok(report)
    }

    /// Apply already-validated tag-group operations, in order, as one commit.
    pub fn apply_tag_group_operations<A, I>(
        &self,
        audience: &A,
        identity: Identity,
        operations: I,
    ) -> Result<BatchReport>
    where
        A: NativeAudience + ?Sized,
        I: IntoIterator<Item = TagGroupOperation>,
    {
        let scope = EditScope::new(identity, EditKind::TagGroups);
        let _guard = self.lock(scope);

        let mut editor = audience.edit_tag_groups(identity)?;
        let applied = record_tag_groups(editor.as_mut(), operations);
        editor.apply()?;

        debug!(%scope, applied, "tag group batch committed");
        Ok(BatchReport {
            scope,
            applied,
            skipped: 0,
        })
    }

    /// Apply raw attribute records to `identity`'s attributes.
    ///
    /// Fails only when the scope itself is unavailable or the commit is
    /// refused, in which case nothing from the batch lands.
    #[instrument(skip(self, audience, records), fields(records = records.len()))]
    pub fn apply_attribute_batch<A>(
        &self,
        audience: &A,
        identity: Identity,
        records: &[Value],
    ) -> Result<BatchReport>
    where
        A: NativeAudience + ?Sized,
    {
        let operations = records.iter().filter_map(parse_attribute_operation);
        let mut report = self.apply_attribute_operations(audience, identity, operations)?;
        report.skipped = records.len() - report.applied;
        Ok(report)
    }

    /// Apply already-validated attribute operations, in order, as one commit.
    pub fn apply_attribute_operations<A, I>(
        &self,
        audience: &A,
        identity: Identity,
        operations: I,
    ) -> Result<BatchReport>
    where
        A: NativeAudience + ?Sized,
        I: IntoIterator<Item = AttributeOperation>,
    {
        let scope = EditScope::new(identity, EditKind::Attributes);
        let _guard = self.lock(scope);

        let mut editor = audience.edit_attributes(identity)?;
        let applied = record_attributes(editor.as_mut(), operations);
        editor.apply()?;

        debug!(%scope, applied, "attribute batch committed");
        Ok(BatchReport {
            scope,
            applied,
            skipped: 0,
        })
    }
}

impl Default for BatchEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn record_tag_groups(
    editor: &mut dyn TagGroupsEditor,
    operations: impl IntoIterator<Item = TagGroupOperation>,
) -> usize {
    let mut applied = 0;
    for op in operations {
        match op.operation {
            TagOperationType::Add => editor.add_tags(&op.group, &op.tags),
            TagOperationType::Remove => editor.remove_tags(&op.group, &op.tags),
            TagOperationType::Set => editor.set_tags(&op.group, &op.tags),
        }
        applied += 1;
    }
    applied
}

fn record_attributes(
    editor: &mut dyn AttributeEditor,
    operations: impl IntoIterator<Item = AttributeOperation>,
) -> usize {
    let mut applied = 0;
    for op in operations {
        match &op {
            AttributeOperation::Set { key, value } => editor.set_attribute(key, value),
            AttributeOperation::Remove { key } => editor.remove_attribute(key),
        }
        applied += 1;
    }
    applied
}
