//! External reference substitution

use std::collections::HashMap;

use crate::core::entities::encode_attribute;
use crate::edit::EditAccumulator;
use crate::error::Result;
use crate::index::DocumentIndex;

/// Prefix marking an attribute value as a reference placeholder
pub const REFERENCE_MARKER: char = '~';

/// Overwrite every attribute value `~<ref>` whose `ref` is a key of
/// `references` with the mapped value
///
/// Keys that appear nowhere are ignored. Nothing else in the buffer changes.
pub fn update_references(input: &[u8], references: &HashMap<String, String>) -> Result<Vec<u8>> {
    if references.is_empty() {
        return Ok(input.to_vec());
    }

    let doc = DocumentIndex::parse(input)?;
    let mut acc = EditAccumulator::new(input);

    for element in doc.all_elements() {
        for (name, value) in element.attributes() {
            let Some(key) = value.strip_prefix(REFERENCE_MARKER) else {
                continue;
            };
            let Some(replacement) = references.get(key) else {
                continue;
            };
            if let Some(span) = element.attribute_span(name) {
                acc.update_token(span, encode_attribute(replacement).as_bytes());
            }
        }
    }

    log::debug!(
        "updated {} reference placeholders from {} references",
        acc.len(),
        references.len()
    );
    if acc.is_empty() {
        return Ok(input.to_vec());
    }
    acc.apply()
}
