//! Identifier Generator
//!
//! Random alphanumeric identifiers, optionally prefixed with the id of the
//! nearest prefix-defining ancestor. No counters or other global state are
//! kept; uniqueness rests on the random part alone.

use rand::distributions::{Alphanumeric, Distribution};
use rand::Rng;

pub use crate::config::DEFAULT_ID_LENGTH;

/// Random characters kept even when a long prefix eats the whole length budget
pub const MIN_RANDOM_LENGTH: usize = 4;

/// Separator between a prefix and the random part
pub const PREFIX_SEPARATOR: char = '_';

/// Generate an identifier
///
/// Without a prefix the result is `length` random alphanumerics, the first
/// of which is a letter so the id is a valid XML name. With a prefix the
/// result is `prefix + "_" + random`, where the random part has
/// `length - prefix.len()` characters but never fewer than
/// [`MIN_RANDOM_LENGTH`].
pub fn generate(prefix: Option<&str>, length: usize) -> String {
    generate_with(&mut rand::thread_rng(), prefix, length)
}

/// Generate an identifier of [`DEFAULT_ID_LENGTH`]
pub fn generate_default(prefix: Option<&str>) -> String {
    generate(prefix, DEFAULT_ID_LENGTH)
}

/// Generate an identifier drawing from the given random source
pub fn generate_with<R: Rng>(rng: &mut R, prefix: Option<&str>, length: usize) -> String {
    match prefix.filter(|p| !p.is_empty()) {
        Some(prefix) => {
            let random_len = length.saturating_sub(prefix.len()).max(MIN_RANDOM_LENGTH);
            let mut id = String::with_capacity(prefix.len() + 1 + random_len);
            id.push_str(prefix);
            id.push(PREFIX_SEPARATOR);
            id.extend(Alphanumeric.sample_iter(&mut *rng).take(random_len).map(char::from));
            id
        }
        None => {
            let length = length.max(MIN_RANDOM_LENGTH);
            let mut id = String::with_capacity(length);
            id.push(char::from(rng.gen_range(b'a'..=b'z')));
            id.extend(Alphanumeric.sample_iter(&mut *rng).take(length - 1).map(char::from));
            id
        }
    }
}

/// Check that a string is a plausible identifier (`[a-zA-Z0-9_]+`)
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}
