//! History of generated codes, newest first and capped at [`HISTORY_CAPACITY`].

use std::fs;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::color::Color;
use crate::error::Result;
use crate::matrix::ErrorLevel;

/// Maximum number of entries kept.
pub const HISTORY_CAPACITY: usize = 20;

const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// A code that was downloaded, with everything needed to restore it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Creation time in milliseconds since the Unix epoch, unique per store.
    pub id: u64,
    pub category: Category,
    pub content: String,
    pub foreground: Color,
    pub background: Color,
    pub size: u32,
    pub error_level: ErrorLevel,
    /// Local time of creation, formatted for display.
    pub created_at: String,
    /// Snapshot of the surface as a PNG data URL.
    pub preview: String,
}

impl HistoryEntry {
    /// Wraps encoded PNG bytes into a `data:` URL suitable for [`HistoryEntry::preview`].
    pub fn preview_data_url(png: &[u8]) -> String {
        format!("{PNG_DATA_URL_PREFIX}{}", STANDARD.encode(png))
    }

    /// Decodes the preview back into PNG bytes. Returns `None` when the
    /// preview is not a base64 PNG data URL.
    pub fn preview_png(&self) -> Option<Vec<u8>> {
        let encoded = self.preview.strip_prefix(PNG_DATA_URL_PREFIX)?;
        STANDARD.decode(encoded).ok()
    }

    /// Content shortened to `max` characters with a trailing ellipsis, for
    /// listings.
    pub fn summary(&self, max: usize) -> String {
        if self.content.chars().count() > max {
            let head: String = self.content.chars().take(max).collect();
            format!("{head}...")
        } else {
            self.content.clone()
        }
    }
}

/// Ordered, capped list of [`HistoryEntry`] values.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HistoryStore {
    entries: Vec<HistoryEntry>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns an id for an entry created at `now_ms`.
    ///
    /// Ids follow creation time but never repeat: when the clock has not
    /// moved past the newest entry, the newest id plus one is used instead.
    pub fn next_id(&self, now_ms: u64) -> u64 {
        match self.entries.first() {
            Some(newest) if newest.id >= now_ms => newest.id + 1,
            _ => now_ms,
        }
    }

    /// Inserts `entry` as the newest one. Returns the evicted oldest entry
    /// when the store was already full.
    pub fn push(&mut self, entry: HistoryEntry) -> Option<HistoryEntry> {
        log::info!("history: recorded {} entry {}", entry.category, entry.id);
        self.entries.insert(0, entry);
        if self.entries.len() > HISTORY_CAPACITY {
            let evicted = self.entries.pop();
            if let Some(old) = &evicted {
                log::warn!(
                    "history: capacity {HISTORY_CAPACITY} reached, evicted entry {}",
                    old.id
                );
            }
            evicted
        } else {
            None
        }
    }

    /// Entries, newest first.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn get(&self, id: u64) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Removes the entry with `id`, keeping the order of the others.
    pub fn remove(&mut self, id: u64) -> Option<HistoryEntry> {
        let index = self.entries.iter().position(|e| e.id == id)?;
        log::info!("history: removed entry {id}");
        Some(self.entries.remove(index))
    }

    pub fn clear(&mut self) {
        log::info!("history: cleared {} entries", self.entries.len());
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reads a store saved with [`HistoryStore::save`]. A missing file gives
    /// an empty store; entries beyond the capacity are dropped.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let mut entries: Vec<HistoryEntry> = serde_json::from_str(&content)?;
        if entries.len() > HISTORY_CAPACITY {
            log::warn!(
                "history: {} holds {} entries, keeping the newest {HISTORY_CAPACITY}",
                path.display(),
                entries.len()
            );
            entries.truncate(HISTORY_CAPACITY);
        }
        Ok(Self { entries })
    }

    /// Writes the store as a JSON list, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(&self.entries)?)?;
        Ok(())
    }
}
