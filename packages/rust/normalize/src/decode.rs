//! Decode-with-default field extraction.
//!
//! Source documents are partial more often than not: a field may be absent,
//! empty, or carry a stale value from an older plugin version. Every
//! normalizer reads fields through these helpers so the defaulting rules
//! live in exactly one place: string → `""`, boolean → `false` (only the
//! literal `"true"` is true), integer → `0` (absence and parse failure
//! both degrade). Coercion never fails.

use paramexport_xml::XmlNode;

/// Named child's text, or the empty string.
pub fn text_field(item: &XmlNode, tag: &str) -> String {
    item.child(tag)
        .and_then(|node| node.text.clone())
        .unwrap_or_default()
}

/// Named child's text coerced to bool: exact `"true"` only.
pub fn bool_field(item: &XmlNode, tag: &str) -> bool {
    item.child(tag)
        .and_then(|node| node.text.as_deref())
        .is_some_and(|text| text == "true")
}

/// Named child's text parsed as base-10 integer; 0 on absence or parse failure.
pub fn int_field(item: &XmlNode, tag: &str) -> i64 {
    item.child(tag)
        .and_then(|node| node.text.as_deref())
        .and_then(|text| text.parse::<i64>().ok())
        .unwrap_or(0)
}
