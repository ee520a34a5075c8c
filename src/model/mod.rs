//! Typed document models for Artifactory resources
//!
//! Documents fetched from the server are parsed into these types before any
//! merge happens, then serialized back for the write. Fields the tool does not
//! model are kept in a flattened `extra` map so a read-modify-write never
//! drops server data.

mod group;
mod permission;
mod permission_target;
mod repository;
mod user;

pub use group::*;
pub use permission::*;
pub use permission_target::*;
pub use repository::*;
pub use user::*;

/// Append every item not already present, keeping first-seen order.
///
/// Returns true if anything was appended.
pub(crate) fn extend_unique<'a>(
    target: &mut Vec<String>,
    items: impl IntoIterator<Item = &'a String>,
) -> bool {
    let mut changed = false;
    for item in items {
        if !target.iter().any(|existing| existing == item) {
            target.push(item.clone());
            changed = true;
        }
    }
    changed
}

/// Drop duplicate entries, keeping the first occurrence.
pub(crate) fn dedup_in_order(items: &[String]) -> Vec<String> {
    let mut out = Vec::with_capacity(items.len());
    extend_unique(&mut out, items);
    out
}
