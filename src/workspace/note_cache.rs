use log::warn;
use uuid::Uuid;
use crate::data::Note;

/// The current user's notes as last confirmed by the backend, newest first.
///
/// Only rows the backend returned ever get in, and every insert keeps the
/// `created_at` order, so the list is what a refetch would show.
#[derive(Clone, Debug, Default)]
pub struct NoteCache {
    notes: Vec<Note>,
}

impl NoteCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, mut notes: Vec<Note>) {
        if !notes.is_sorted_by(|a, b| a.created_at >= b.created_at) {
            warn!("received notes out of order, sorting");
            notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        }
        self.notes = notes;
    }

    /// Places the note after every note that isn't older.
    pub fn insert(&mut self, note: Note) {
        let position = self.notes.partition_point(|n| n.created_at >= note.created_at);
        self.notes.insert(position, note);
    }

    pub fn remove(&mut self, id: Uuid) -> Option<Note> {
        let position = self.notes.iter().position(|n| n.id == id)?;
        Some(self.notes.remove(position))
    }

    pub fn get(&self, id: Uuid) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.get(id).is_some()
    }

    pub fn newest(&self) -> Option<&Note> {
        self.notes.first()
    }

    pub fn as_slice(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn clear(&mut self) {
        self.notes.clear();
    }
}
