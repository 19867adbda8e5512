// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wire field names derived from domain names.
//!
//! Rule: insert `_` wherever an upper-case letter follows a lower-case
//! one, then lower-case everything. Attributes get an `_attr` suffix.
//! Enum symbols use the same separators but are upper-cased.

use crate::pm::{PmClass, PropDesc};

/// Suffix of attribute-kind wire fields.
pub const ATTR_SUFFIX: &str = "_attr";

fn split_case_transitions(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for c in name.chars() {
        if c.is_uppercase() && prev_lower {
            out.push('_');
        }
        prev_lower = c.is_lowercase();
        out.push(c);
    }
    out
}

/// Domain type or property name to wire field name.
///
/// A trailing `Container` and a leading `_` are stripped first.
pub fn name_to_p(name: &str) -> String {
    let name = name.strip_suffix("Container").unwrap_or(name);
    let name = name.strip_prefix('_').unwrap_or(name);
    split_case_transitions(name).to_lowercase()
}

/// Wire field name of an attribute-kind property.
pub fn attr_name_to_p(name: &str) -> String {
    format!("{}{}", name_to_p(name), ATTR_SUFFIX)
}

/// Wire field name of an element-kind property of `class`.
///
/// Irregular names: the text content of `LocalizedText` and every
/// extension element.
pub fn element_name_to_p(class: &PmClass, name: &str) -> String {
    match name {
        "text" if class.name == "LocalizedText" => "localized_text_content".to_string(),
        "Extension" | "ExtExtension" => "extension_element".to_string(),
        _ => name_to_p(name),
    }
}

/// Wire field name of any property declared in `class`.
pub fn p_name_for(class: &PmClass, prop: &PropDesc) -> String {
    if prop.kind.is_attribute() {
        attr_name_to_p(prop.name)
    } else {
        element_name_to_p(class, prop.name)
    }
}

/// Domain enum symbol to wire enum symbol.
pub fn enum_name_to_p(symbol: &str) -> String {
    split_case_transitions(symbol).to_uppercase()
}
