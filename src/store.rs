use tracing::{debug, info, warn};

use crate::{db::Database, error::Result, models::Note};

pub const DEFAULT_STORAGE_KEY: &str = "notes";

/// Ordered notes plus the index of the one being edited, if any.
///
/// `active` is always `None` or a valid index into `notes`.
#[derive(Debug, Default)]
pub struct NoteStore {
    notes: Vec<Note>,
    active: Option<usize>,
}

impl NoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn active_note(&self) -> Option<&Note> {
        self.active.and_then(|i| self.notes.get(i))
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Appends an empty note and makes it active. Returns its index.
    pub fn create(&mut self) -> usize {
        self.notes.push(Note::default());
        let index = self.notes.len() - 1;
        self.active = Some(index);
        index
    }

    /// Out-of-range indices are ignored.
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.notes.len() {
            return false;
        }
        self.active = Some(index);
        true
    }

    /// Removes the active note and clears the selection; no neighbour is re-selected.
    pub fn delete(&mut self) -> Option<Note> {
        let index = self.active.take()?;
        Some(self.notes.remove(index))
    }

    /// Returns `true` when a note was written, meaning the title list is stale.
    pub fn update_title(&mut self, text: &str) -> bool {
        match self.active_note_mut() {
            Some(note) => {
                note.title = text.to_string();
                true
            }
            None => false,
        }
    }

    pub fn update_content(&mut self, text: &str) -> bool {
        match self.active_note_mut() {
            Some(note) => {
                note.content = text.to_string();
                true
            }
            None => false,
        }
    }

    /// Writes the full list as JSON under `key`, replacing whatever was there.
    pub fn save(&self, db: &Database, key: &str) -> Result<()> {
        let payload = serde_json::to_string(&self.notes)?;
        db.set_item(key, &payload)?;
        info!(key, count = self.notes.len(), "saved notes");
        Ok(())
    }

    /// Replaces the list with the stored one, if any parses.
    ///
    /// The selection is kept as-is, so after the startup `create(); load();`
    /// the active index refers to a position in the freshly loaded list. It is
    /// only cleared when it would point past the end.
    pub fn load(&mut self, db: &Database, key: &str) -> bool {
        let data = match db.get_item(key) {
            Ok(Some(data)) => data,
            Ok(None) => {
                debug!(key, "no stored notes");
                return false;
            }
            Err(err) => {
                warn!(key, "failed to read stored notes: {err}");
                return false;
            }
        };

        let notes: Vec<Note> = match serde_json::from_str(&data) {
            Ok(notes) => notes,
            Err(err) => {
                warn!(key, "ignoring malformed stored notes: {err}");
                return false;
            }
        };

        self.notes = notes;
        if self.active.is_some_and(|i| i >= self.notes.len()) {
            self.active = None;
        }
        info!(key, count = self.notes.len(), "loaded notes");
        true
    }

    fn active_note_mut(&mut self) -> Option<&mut Note> {
        self.active.and_then(|i| self.notes.get_mut(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn note(title: &str, content: &str) -> Note {
        Note {
            title: title.to_string(),
            content: content.to_string(),
        }
    }

    fn assert_active_valid(store: &NoteStore) {
        if let Some(i) = store.active() {
            assert!(i < store.len(), "active {i} out of bounds for {}", store.len());
        }
    }

    #[test]
    fn create_appends_empty_note_and_selects_it() {
        let mut store = NoteStore::new();
        assert_eq!(store.create(), 0);
        assert_eq!(store.notes(), &[Note::default()]);
        assert_eq!(store.active(), Some(0));

        assert_eq!(store.create(), 1);
        assert_eq!(store.active(), Some(1));
    }

    #[test]
    fn select_ignores_out_of_range() {
        let mut store = NoteStore::new();
        assert!(!store.select(0));
        assert_eq!(store.active(), None);

        store.create();
        store.create();
        assert!(store.select(0));
        assert!(!store.select(2));
        assert_eq!(store.active(), Some(0));
    }

    #[test]
    fn groceries_scenario() {
        let mut store = NoteStore::new();
        store.create();
        assert!(store.update_title("Groceries"));
        assert_eq!(store.notes(), &[note("Groceries", "")]);

        store.create();
        store.update_content("second");
        assert_eq!(store.len(), 2);
        assert_eq!(store.active(), Some(1));

        store.select(0);
        assert_eq!(store.active(), Some(0));

        assert_eq!(store.delete(), Some(note("Groceries", "")));
        assert_eq!(store.notes(), &[note("", "second")]);
        assert_eq!(store.active(), None);
    }

    #[test]
    fn delete_without_selection_is_noop() {
        let mut store = NoteStore::new();
        assert_eq!(store.delete(), None);

        store.create();
        store.delete();
        store.create();
        store.create();
        store.delete();
        assert_eq!(store.len(), 1);
        assert_eq!(store.delete(), None);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn updates_without_selection_leave_notes_unchanged() {
        let mut store = NoteStore::new();
        store.create();
        store.update_title("kept");
        store.delete();
        store.create();
        store.update_title("other");
        store.delete();
        assert!(store.is_empty());

        store.create();
        store.update_title("kept");
        store.create();
        store.delete();
        let before = store.notes().to_vec();

        assert!(!store.update_title("lost"));
        assert!(!store.update_content("lost"));
        assert_eq!(store.notes(), before.as_slice());
    }

    #[test]
    fn active_index_stays_valid_across_create_delete_sequences() {
        // Each byte drives one step: even creates, odd deletes, high bit selects.
        let script: &[u8] = &[0, 0, 1, 1, 0, 130, 0, 0, 129, 1, 2, 131, 1, 1, 0, 1];
        let mut store = NoteStore::new();
        for &step in script {
            if step >= 128 {
                store.select(usize::from(step - 128));
            } else if step % 2 == 0 {
                store.create();
            } else {
                store.delete();
            }
            assert_active_valid(&store);
        }
    }

    #[test]
    fn save_writes_compact_json_under_key() {
        let db = Database::open_in_memory().unwrap();
        let mut store = NoteStore::new();
        store.create();
        store.update_title("A");
        store.update_content("x");

        store.save(&db, DEFAULT_STORAGE_KEY).unwrap();

        assert_eq!(
            db.get_item(DEFAULT_STORAGE_KEY).unwrap().as_deref(),
            Some(r#"[{"title":"A","content":"x"}]"#)
        );
    }

    #[test]
    fn save_then_load_restores_sequence() {
        let db = Database::open_in_memory().unwrap();
        let mut store = NoteStore::new();
        for (title, content) in [("first", "a"), ("", "untitled body"), ("third", "")] {
            store.create();
            store.update_title(title);
            store.update_content(content);
        }
        store.save(&db, DEFAULT_STORAGE_KEY).unwrap();

        let mut fresh = NoteStore::new();
        assert!(fresh.load(&db, DEFAULT_STORAGE_KEY));
        assert_eq!(fresh.notes(), store.notes());
        assert_eq!(fresh.active(), None);
    }

    #[test]
    fn load_without_stored_data_keeps_memory() {
        let db = Database::open_in_memory().unwrap();
        let mut store = NoteStore::new();
        store.create();

        assert!(!store.load(&db, DEFAULT_STORAGE_KEY));
        assert_eq!(store.notes(), &[Note::default()]);
        assert_eq!(store.active(), Some(0));
    }

    #[test]
    fn load_ignores_malformed_payload() {
        let db = Database::open_in_memory().unwrap();
        let mut store = NoteStore::new();
        store.create();
        store.update_title("in memory");

        for payload in ["not json", r#"{"title":"A"}"#, r#"[{"title":1}]"#] {
            db.set_item(DEFAULT_STORAGE_KEY, payload).unwrap();
            assert!(!store.load(&db, DEFAULT_STORAGE_KEY));
            assert_eq!(store.notes(), &[note("in memory", "")]);
        }
    }

    #[test]
    fn startup_load_keeps_stale_selection() {
        let db = Database::open_in_memory().unwrap();
        db.set_item(
            DEFAULT_STORAGE_KEY,
            r#"[{"title":"A","content":"x"},{"title":"B","content":"y"}]"#,
        )
        .unwrap();

        let mut store = NoteStore::new();
        store.create();
        assert!(store.load(&db, DEFAULT_STORAGE_KEY));

        assert_eq!(store.len(), 2);
        assert_eq!(store.active(), Some(0));
        assert_eq!(store.active_note(), Some(&note("A", "x")));
    }

    #[test]
    fn load_clears_selection_past_end() {
        let db = Database::open_in_memory().unwrap();
        db.set_item(DEFAULT_STORAGE_KEY, "[]").unwrap();

        let mut store = NoteStore::new();
        store.create();
        assert!(store.load(&db, DEFAULT_STORAGE_KEY));

        assert!(store.is_empty());
        assert_eq!(store.active(), None);
    }

    #[test]
    fn save_to_read_only_storage_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.db");
        Database::new(&path).unwrap();
        let db = Database::open_read_only(&path).unwrap();

        let mut store = NoteStore::new();
        store.create();
        assert!(store.save(&db, DEFAULT_STORAGE_KEY).is_err());
        assert_eq!(store.len(), 1);
    }
}
