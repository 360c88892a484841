//! Fixed-point expansion of references between entries.
//!
//! There is no explicit dependency graph. Each entry carries an `unresolved`
//! flag meaning "my value still references an existing entry", and a pass only
//! ever substitutes the value of an entry whose flag is clear. Passes repeat
//! until one makes no substitution. Entries in a reference cycle keep their
//! flags forever and are simply reported at the end.

use tracing::debug;

use crate::{
    entry::EntryMap,
    reference::{find_reference, references},
};

/// A reference left in place after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnexpandedReference {
    /// Position of the entry in the [`EntryMap`].
    pub entry: usize,
    pub id: String,
}

/// Outcome of [`resolve`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Substitutions actually performed.
    pub expanded: usize,
    /// Number of passes that performed at least one substitution.
    pub passes: usize,
    /// References that could not be expanded, in entry order.
    pub unexpanded: Vec<UnexpandedReference>,
}

/// Expands references in every entry's value, in place.
pub fn resolve(entries: &mut EntryMap) -> Resolution {
    mark_unresolved(entries);

    let mut resolution = Resolution::default();
    loop {
        let expanded = run_pass(entries);
        if expanded == 0 {
            break;
        }
        resolution.expanded += expanded;
        resolution.passes += 1;
    }

    resolution.unexpanded = unexpanded_references(entries);
    debug!(
        expanded = resolution.expanded,
        passes = resolution.passes,
        unexpanded = resolution.unexpanded.len(),
        "reference resolution reached a fixed point"
    );
    resolution
}

fn mark_unresolved(entries: &mut EntryMap) {
    let flags: Vec<bool> = entries
        .iter()
        .map(|entry| entries.has_resolvable_reference(&entry.value))
        .collect();
    for (entry, unresolved) in entries.iter_mut().zip(flags) {
        entry.unresolved = unresolved;
    }
}

/// One pass over all unresolved entries. Returns the number of substitutions.
fn run_pass(entries: &mut EntryMap) -> usize {
    let mut expanded = 0;

    for position in 0..entries.len() {
        if !entries[position].unresolved {
            continue;
        }

        let mut cursor = 0;
        while let Some(reference) = find_reference(&entries[position].value, cursor) {
            cursor = reference.end();

            let Some(target) = entries.find(&reference.id) else {
                continue;
            };
            // Never expand through a value that still has work to do; this is
            // also what keeps self- and mutual references from expanding.
            if entries[target].unresolved {
                continue;
            }

            let replacement = entries[target].value.clone();
            let entry = &mut entries[position];
            entry.value.replace_range(reference.range(), &replacement);
            entry.changed = true;
            cursor = reference.start + replacement.len();

            let unresolved = entries.has_resolvable_reference(&entries[position].value);
            entries[position].unresolved = unresolved;
            expanded += 1;
        }
    }

    expanded
}

fn unexpanded_references(entries: &EntryMap) -> Vec<UnexpandedReference> {
    entries
        .iter()
        .enumerate()
        .flat_map(|(position, entry)| {
            references(&entry.value).map(move |reference| UnexpandedReference {
                entry: position,
                id: reference.id,
            })
        })
        .collect()
}
