//! Deep merge and JSON Merge Patch over `serde_json::Value`.
//!
//! One primitive serves two callers with different array semantics:
//!
//! - Variables merge arrays positionally: element `i` of the overlay is
//!   deep-merged into element `i` of the base, and a shorter overlay leaves
//!   the remaining base elements in place.
//! - Provider fragments follow RFC 7396: arrays are replaced wholesale and a
//!   `null` value deletes the key from the accumulated result.

use serde_json::{Map, Value};

/// A mapping of variable names to values.
pub type Variables = Map<String, Value>;

/// How arrays in the overlay combine with arrays in the base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayMerge {
    /// Merge element-by-element, extending the base when the overlay is longer.
    Positional,
    /// The overlay array replaces the base array.
    Replace,
}

/// Options for [`merge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeOptions {
    pub arrays: ArrayMerge,
    /// When set, an object key whose overlay value is `null` is removed.
    pub null_deletes: bool,
}

impl MergeOptions {
    /// Semantics used for variable sources.
    pub const VARIABLES: Self = Self {
        arrays: ArrayMerge::Positional,
        null_deletes: false,
    };

    /// RFC 7396 semantics used for provider fragments.
    pub const MERGE_PATCH: Self = Self {
        arrays: ArrayMerge::Replace,
        null_deletes: true,
    };
}

/// Merge `overlay` onto `base`, with `overlay` taking precedence.
pub fn merge(base: Value, overlay: Value, options: MergeOptions) -> Value {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            Value::Object(merge_maps(base_map, overlay_map, options))
        }
        (Value::Array(base_items), Value::Array(overlay_items))
            if options.arrays == ArrayMerge::Positional =>
        {
            Value::Array(merge_positional(base_items, overlay_items, options))
        }
        // RFC 7396: a non-object target is discarded before patching.
        (_, Value::Object(overlay_map)) if options.null_deletes => {
            Value::Object(merge_maps(Map::new(), overlay_map, options))
        }
        (_, overlay) => overlay,
    }
}

fn merge_maps(
    mut base: Map<String, Value>,
    overlay: Map<String, Value>,
    options: MergeOptions,
) -> Map<String, Value> {
    for (key, overlay_value) in overlay {
        if overlay_value.is_null() && options.null_deletes {
            base.remove(&key);
            continue;
        }
        let merged = match base.remove(&key) {
            Some(base_value) => merge(base_value, overlay_value, options),
            None => merge(Value::Null, overlay_value, options),
        };
        base.insert(key, merged);
    }
    base
}

fn merge_positional(mut base: Vec<Value>, overlay: Vec<Value>, options: MergeOptions) -> Vec<Value> {
    for (index, overlay_item) in overlay.into_iter().enumerate() {
        if index < base.len() {
            let base_item = std::mem::take(&mut base[index]);
            base[index] = merge(base_item, overlay_item, options);
        } else {
            base.push(overlay_item);
        }
    }
    base
}

/// Apply a JSON Merge Patch (RFC 7396) to `target`.
pub fn merge_patch(target: Value, patch: Value) -> Value {
    merge(target, patch, MergeOptions::MERGE_PATCH)
}

/// Deep-merge variable sources in order; later sources win.
///
/// Inputs are not modified.
pub fn merge_variables<'a>(sources: impl IntoIterator<Item = &'a Variables>) -> Variables {
    sources.into_iter().fold(Variables::new(), |acc, source| {
        merge_maps(acc, source.clone(), MergeOptions::VARIABLES)
    })
}
