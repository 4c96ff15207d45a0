// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Boundary validation for host edit-operation records.
//
// Records arrive as loosely-typed JSON maps. Each parser either produces a
// fully-validated operation or `None`; malformed records are never an error.

use std::collections::BTreeSet;

use airship_core::types::{AttributeOperation, TagGroupOperation, TagOperationType};
use serde_json::Value;

use crate::decode::decode;

/// Wire keys for tag-group records.
pub mod tag_keys {
    pub const GROUP: &str = "group";
    pub const OPERATION_TYPE: &str = "operationType";
    pub const TAGS: &str = "tags";
}

/// Wire keys for attribute records.
pub mod attribute_keys {
    pub const KEY: &str = "key";
    pub const ACTION: &str = "action";
    pub const VALUE: &str = "value";
    pub const VALUE_TYPE: &str = "type";
    /// Accepted spelling of [`VALUE_TYPE`] used by some host wrappers.
    pub const VALUE_TYPE_ALT: &str = "valueType";
    pub const SET: &str = "set";
    pub const REMOVE: &str = "remove";
}

/// Validate one tag-group record.
///
/// Requires a non-empty `group`, a `tags` array and a known
/// `operationType`. Non-string tag entries are dropped and duplicates
/// collapse into one.
pub fn parse_tag_group_operation(record: &Value) -> Option<TagGroupOperation> {
    let record = record.as_object()?;

    let group = record.get(tag_keys::GROUP)?.as_str()?;
    if group.is_empty() {
        return None;
    }
    let tags = record.get(tag_keys::TAGS)?.as_array()?;
    let operation = TagOperationType::from_wire(record.get(tag_keys::OPERATION_TYPE)?.as_str()?)?;

    let tags: BTreeSet<String> = tags
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect();

    Some(TagGroupOperation {
        group: group.to_string(),
        operation,
        tags,
    })
}

/// Validate one attribute record.
///
/// `set` needs a resolvable type/value pair; `remove` ignores value fields.
pub fn parse_attribute_operation(record: &Value) -> Option<AttributeOperation> {
    let record = record.as_object()?;

    let action = record.get(attribute_keys::ACTION)?.as_str()?;
    let key = record.get(attribute_keys::KEY)?.as_str()?;
    if key.is_empty() {
        return None;
    }

    match action {
        attribute_keys::SET => {
            let value_type = record
                .get(attribute_keys::VALUE_TYPE)
                .or_else(|| record.get(attribute_keys::VALUE_TYPE_ALT))?
                .as_str()?;
            let value = decode(value_type, record.get(attribute_keys::VALUE)).ok()?;
            Some(AttributeOperation::Set {
                key: key.to_string(),
                value,
            })
        }
        attribute_keys::REMOVE => Some(AttributeOperation::Remove {
            key: key.to_string(),
        }),
        _ => None,
    }
}
