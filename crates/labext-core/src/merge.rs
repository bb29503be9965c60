//! Ordering and merge rules for the two published views.

use crate::entry::{Entry, EntryMap};

/// Whether `name` belongs to the trusted namespace, e.g. `@jupyterlab/git`
/// for namespace `@jupyterlab`.
pub fn is_trusted(name: &str, namespace: &str) -> bool {
    !name.is_empty() && name.split('/').next() == Some(namespace)
}

/// Move trusted entries ahead of all others.
///
/// The sort is stable and has no secondary key: entries of the same trust
/// class keep the order the upstream channel supplied.
pub fn sort_entries(entries: &mut [Entry], namespace: &str) {
    entries.sort_by_key(|entry| !is_trusted(&entry.name, namespace));
}

/// The installed view: every installed entry, sorted.
pub fn installed_view(installed: &EntryMap, namespace: &str) -> Vec<Entry> {
    let mut view: Vec<Entry> = installed.values().cloned().collect();
    sort_entries(&mut view, namespace);
    view
}

/// The search view: search entries with any installed counterpart
/// substituted for the registry snapshot, sorted.
pub fn search_view(search: &EntryMap, installed: &EntryMap, namespace: &str) -> Vec<Entry> {
    let mut view: Vec<Entry> = search
        .iter()
        .map(|(name, entry)| installed.get(name).unwrap_or(entry).clone())
        .collect();
    sort_entries(&mut view, namespace);
    view
}
