//! Rebuilds the source text, rewriting only the msgstr lines of changed entries.

use std::collections::HashMap;

use crate::{
    entry::{Entry, EntryMap},
    line::{LineKind, LineRecord, Origin},
};

/// Replays `lines`, replacing the `msgstr` block of every changed entry with a
/// single `msgstr "<value>"` line. Every other line is copied byte for byte.
/// Each line is followed by `newline`.
pub fn reconstruct(lines: &[LineRecord], entries: &EntryMap, newline: &str) -> String {
    // Line numbers restart in every included file, so the origin is part of the key.
    let changed: HashMap<(Origin, usize), &Entry> = entries
        .iter()
        .filter(|entry| entry.changed)
        .map(|entry| ((entry.origin.origin, entry.origin.number), entry))
        .collect();

    let capacity = lines.iter().map(|l| l.text.len() + newline.len()).sum();
    let mut out = String::with_capacity(capacity);
    let mut skip = 0;

    for line in lines {
        // Continuation lines of a msgstr that was already written out. Anything
        // else inside the block (a stray comment) stays where it is.
        if skip > 0 && line.kind == LineKind::Continuation {
            skip -= 1;
            continue;
        }

        match changed.get(&(line.origin, line.number)) {
            Some(entry) => {
                out.push_str("msgstr \"");
                out.push_str(&entry.value);
                out.push('"');
                skip = entry.span;
            }
            None => out.push_str(&line.text),
        }
        out.push_str(newline);
    }

    out
}
