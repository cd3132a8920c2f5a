use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tbot::types::chat;
use thiserror::Error;

/// Most entries kept per chat. Older ones are dropped first.
const MAX_ENTRIES: usize = 50;

/// A mood the user can pick in the journal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mood {
    Sad,
    Angry,
    Tired,
    Happy,
    Calm,
}

impl Mood {
    pub(crate) const ALL: [Mood; 5] = [Mood::Sad, Mood::Angry, Mood::Tired, Mood::Happy, Mood::Calm];

    pub(crate) fn label(self) -> &'static str {
        match self {
            Mood::Sad => "Sad",
            Mood::Angry => "Angry",
            Mood::Tired => "Tired",
            Mood::Happy => "Happy",
            Mood::Calm => "Calm",
        }
    }

    pub(crate) fn emoji(self) -> &'static str {
        match self {
            Mood::Sad => "😢",
            Mood::Angry => "😡",
            Mood::Tired => "😴",
            Mood::Happy => "😊",
            Mood::Calm => "😌",
        }
    }

    pub(crate) fn from_label(label: &str) -> Option<Mood> {
        Mood::ALL.iter().copied().find(|mood| mood.label() == label)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum JournalError {
    #[error("pick a mood with /mood before adding a note")]
    NoMoodSelected,
    #[error("the note is empty")]
    EmptyNote,
}

/// A saved journal entry.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MoodEntry {
    pub(crate) mood: Mood,
    pub(crate) note: String,
    pub(crate) recorded_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct ChatJournal {
    current: Option<Mood>,
    entries: Vec<MoodEntry>,
}

/// In-memory mood journal, one per chat.
///
/// Nothing is persisted: the journal lives as long as the process.
#[derive(Debug, Default)]
pub(crate) struct Journal {
    chats: Mutex<HashMap<chat::Id, ChatJournal>>,
}

impl Journal {
    /// Select the current mood of a chat.
    pub(crate) fn select(&self, chat_id: chat::Id, mood: Mood) {
        self.chats().entry(chat_id).or_default().current = Some(mood);
    }

    pub(crate) fn current(&self, chat_id: chat::Id) -> Option<Mood> {
        self.chats()
            .get(&chat_id)
            .and_then(|journal| journal.current)
    }

    /// Save a note with the currently selected mood.
    pub(crate) fn save(
        &self,
        chat_id: chat::Id,
        note: &str,
        recorded_at: DateTime<Utc>,
    ) -> Result<MoodEntry, JournalError> {
        let note = note.trim();
        if note.is_empty() {
            return Err(JournalError::EmptyNote);
        }

        let mut chats = self.chats();
        let journal = chats.entry(chat_id).or_default();
        let mood = journal.current.ok_or(JournalError::NoMoodSelected)?;
        let entry = MoodEntry {
            mood,
            note: note.to_string(),
            recorded_at,
        };
        if journal.entries.len() == MAX_ENTRIES {
            journal.entries.remove(0);
        }
        journal.entries.push(entry.clone());
        Ok(entry)
    }

    /// Return up to `limit` entries of a chat, most recent first.
    pub(crate) fn recent(&self, chat_id: chat::Id, limit: usize) -> Vec<MoodEntry> {
        self.chats()
            .get(&chat_id)
            .map(|journal| journal.entries.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default()
    }

    fn chats(&self) -> MutexGuard<'_, HashMap<chat::Id, ChatJournal>> {
        self.chats.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
