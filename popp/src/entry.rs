//! Translation entries and the state machine that builds them from classified
//! lines.

use std::{
    collections::HashMap,
    ops::{Index, IndexMut},
};

use tracing::debug;

use crate::{
    error::Error,
    line::{LineKind, LineRecord, extract_quoted, starts_with_keyword},
    options::PluralPolicy,
    reference::{find_reference, references},
    session::Session,
};

/// One msgctxt/msgid/msgstr record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub context: Option<String>,
    pub id: String,
    /// The msgstr, still PO-escaped, with continuation lines concatenated.
    pub value: String,
    /// Number of continuation lines following the `msgstr` header.
    pub span: usize,
    /// The `msgstr` header line.
    pub origin: LineRecord,
    /// The value still contains a reference to an existing entry.
    pub unresolved: bool,
    /// The value differs from the parsed text.
    pub changed: bool,
}

impl Entry {
    /// The key this entry is stored under. The PO format allows the same msgid
    /// with different contexts, so the context is part of the key.
    pub fn key(&self, case_sensitive: bool) -> String {
        entry_key(&self.id, self.context.as_deref(), case_sensitive)
    }
}

/// Builds the key for an id and optional context: `id` or `id-context`,
/// lower-cased unless `case_sensitive`.
pub fn entry_key(id: &str, context: Option<&str>, case_sensitive: bool) -> String {
    let key = match context {
        Some(context) => format!("{}-{}", id, context),
        None => id.to_string(),
    };
    fold_key(key, case_sensitive)
}

fn fold_key(key: String, case_sensitive: bool) -> String {
    if case_sensitive {
        key
    } else {
        key.to_lowercase()
    }
}

/// Entries in file order, addressable by position and by key.
#[derive(Debug, Clone, Default)]
pub struct EntryMap {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
    case_sensitive: bool,
}

impl EntryMap {
    pub fn new(case_sensitive: bool) -> Self {
        EntryMap {
            entries: Vec::new(),
            index: HashMap::new(),
            case_sensitive,
        }
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Inserts an entry. If its key is already taken the map is unchanged and
    /// the entry is handed back.
    pub fn insert(&mut self, entry: Entry) -> Result<usize, Entry> {
        let key = entry.key(self.case_sensitive);
        if self.index.contains_key(&key) {
            return Err(entry);
        }
        let position = self.entries.len();
        self.index.insert(key, position);
        self.entries.push(entry);
        Ok(position)
    }

    /// Finds the entry a reference id (`msgid` or `msgid-msgctxt`) names.
    pub fn find(&self, reference_id: &str) -> Option<usize> {
        let key = fold_key(reference_id.to_string(), self.case_sensitive);
        self.index.get(&key).copied()
    }

    pub fn get(&self, reference_id: &str) -> Option<&Entry> {
        self.find(reference_id).map(|position| &self.entries[position])
    }

    pub fn contains(&self, reference_id: &str) -> bool {
        self.find(reference_id).is_some()
    }

    /// Whether `text` holds at least one reference to an entry of this map.
    pub fn has_resolvable_reference(&self, text: &str) -> bool {
        references(text).any(|reference| self.contains(&reference.id))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    /// Mutable access to the entries. Keys are derived from id and context,
    /// which callers must not change.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Entry> {
        self.entries.iter_mut()
    }
}

impl Index<usize> for EntryMap {
    type Output = Entry;

    fn index(&self, position: usize) -> &Entry {
        &self.entries[position]
    }
}

impl IndexMut<usize> for EntryMap {
    fn index_mut(&mut self, position: usize) -> &mut Entry {
        &mut self.entries[position]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Looking for the start of the next entry.
    FinishedEntry,
    /// Found a msgctxt, which may continue over several lines.
    AddingMsgctxt,
    /// Found a msgid, which may continue over several lines.
    AddingMsgid,
    /// Found a msgstr, which may continue over several lines.
    AddingMsgstr,
}

/// The entry currently being assembled.
#[derive(Debug, Default)]
struct Pending {
    context: Option<String>,
    id: Option<String>,
    value: Option<String>,
    span: usize,
    origin: Option<LineRecord>,
    /// Saw `msgid_plural` or `msgstr[n]`; the entry will not be kept.
    plural: bool,
    /// Inside an extra msgstr form whose lines are skipped.
    skipping_form: bool,
}

impl Pending {
    fn into_entry(self) -> Option<Entry> {
        let origin = self.origin.filter(|origin| origin.number > 0)?;
        Some(Entry {
            context: self.context,
            id: self.id?,
            value: self.value?,
            span: self.span,
            origin,
            unresolved: false,
            changed: false,
        })
    }
}

/// Runs the entry state machine over the include-expanded lines.
///
/// The .PO layout it follows is roughly:
///
/// ```text
/// whitespace
/// # optional comments
/// msgctxt "optional context"      (may continue on "..." lines)
/// msgid "id"                      (may continue on "..." lines)
/// msgid_plural "..."              (plural forms are not supported)
/// msgstr "value"                  (may continue on "..." lines)
/// msgstr[n] "..."                 (plural forms are not supported)
/// whitespace or end of input
/// ```
pub(crate) fn build_entries(
    session: &mut Session<'_>,
    lines: &[LineRecord],
) -> Result<EntryMap, Error> {
    let mut entries = EntryMap::new(session.options.case_sensitive_ids);
    let terminator = LineRecord::terminator();

    let mut state = State::FinishedEntry;
    let mut pending = Pending::default();

    for line in lines.iter().chain(std::iter::once(&terminator)) {
        match state {
            State::FinishedEntry => match line.kind {
                LineKind::Msgid => {
                    state = State::AddingMsgid;
                    pending.id = Some(fragment(session, line));
                }
                LineKind::Msgctxt => {
                    state = State::AddingMsgctxt;
                    pending.context = Some(fragment(session, line));
                }
                LineKind::Msgstr | LineKind::Continuation => {
                    session.warn(line, "Unexpected string or msgstr");
                }
                _ => {}
            },

            State::AddingMsgctxt => match line.kind {
                LineKind::Continuation => {
                    let text = fragment(session, line);
                    pending.context.get_or_insert_with(String::new).push_str(&text);
                }
                LineKind::Msgid => {
                    state = State::AddingMsgid;
                    pending.id = Some(fragment(session, line));
                }
                _ => session.warn(line, "msgid not found after msgctxt"),
            },

            State::AddingMsgid => match line.kind {
                LineKind::Continuation => {
                    let text = fragment(session, line);
                    pending.id.get_or_insert_with(String::new).push_str(&text);
                }
                LineKind::Msgstr => {
                    state = State::AddingMsgstr;
                    let text = fragment(session, line);
                    if is_plural_msgstr(&line.text) {
                        pending.plural = true;
                    }
                    if pending.plural {
                        check_plural_fragment(session, line, &text)?;
                    }
                    pending.value = Some(text);
                    pending.origin = Some(line.clone());
                }
                LineKind::Msgid => {
                    if starts_with_keyword(&line.text, "msgid_plural") {
                        pending.plural = true;
                        session.warn(
                            line,
                            "Multiple msgids encountered, PO plural forms are not supported",
                        );
                    } else {
                        session.warn(line, "Unexpected msgid");
                    }
                }
                LineKind::Whitespace => {
                    session.warn(line, "msgstr not found after msgid");
                    state = State::FinishedEntry;
                    pending = Pending::default();
                }
                _ => {}
            },

            State::AddingMsgstr => match line.kind {
                LineKind::Continuation => {
                    let text = fragment(session, line);
                    if pending.plural || pending.skipping_form {
                        check_plural_fragment(session, line, &text)?;
                    } else {
                        pending.value.get_or_insert_with(String::new).push_str(&text);
                        pending.span += 1;
                    }
                }
                LineKind::Whitespace => {
                    state = State::FinishedEntry;
                    let finished = std::mem::take(&mut pending);
                    complete_entry(session, &mut entries, finished, line)?;
                }
                LineKind::Msgstr => {
                    session.warn(
                        line,
                        "Multiple msgstrs encountered, PO plural forms are not supported - skipping line",
                    );
                    pending.skipping_form = true;
                    let text = fragment(session, line);
                    check_plural_fragment(session, line, &text)?;
                }
                _ => session.warn(line, "Unexpected line encountered at end of entry"),
            },
        }
    }

    debug!(entries = entries.len(), "built entries");
    Ok(entries)
}

fn complete_entry(
    session: &mut Session<'_>,
    entries: &mut EntryMap,
    pending: Pending,
    end: &LineRecord,
) -> Result<(), Error> {
    if pending.plural {
        debug!(id = ?pending.id, "dropping plural-form entry");
        return Ok(());
    }

    let Some(entry) = pending.into_entry() else {
        return Err(session.fatal(end, "[End found of] invalid entry"));
    };

    if let Err(duplicate) = entries.insert(entry) {
        let key = duplicate.key(entries.case_sensitive());
        if find_reference(&duplicate.value, 0).is_some() {
            return Err(session.fatal(
                &duplicate.origin,
                format!(
                    "Duplicate msgid \"{}\" contains a reference, it would not be expanded",
                    key
                ),
            ));
        }
        session.warn(
            &duplicate.origin,
            format!("Duplicate msgid \"{}\", keeping the first entry", key),
        );
    }
    Ok(())
}

/// `msgstr[n]`, as opposed to a plain `msgstr`.
fn is_plural_msgstr(line: &str) -> bool {
    line.get("msgstr".len()..)
        .is_some_and(|rest| rest.trim_start().starts_with('['))
}

/// The quoted text of a header or continuation line.
fn fragment(session: &mut Session<'_>, line: &LineRecord) -> String {
    match extract_quoted(&line.text) {
        Some(text) => text.to_string(),
        None => {
            session.warn(
                line,
                "Missing quotemarks - very bad - line will be missing from output",
            );
            String::new()
        }
    }
}

/// References in plural forms are never expanded; report them per policy.
fn check_plural_fragment(
    session: &mut Session<'_>,
    line: &LineRecord,
    text: &str,
) -> Result<(), Error> {
    for reference in references(text) {
        let message = format!(
            "Reference \"{}\" is inside a plural form, plural forms are not supported",
            reference.id
        );
        match session.options.plural_policy {
            PluralPolicy::Ignore => session.warn(line, message),
            PluralPolicy::Abort => return Err(session.fatal(line, message)),
        }
    }
    Ok(())
}
