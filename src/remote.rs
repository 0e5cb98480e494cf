//! The simple form: codes are drawn by a third-party image endpoint and the
//! history lives in a persisted key-value record.
//!
//! This component shares nothing with [`crate::session`]. Its history is
//! keyed by exact text: submitting a text that is already present is refused.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::{Error, Result};
use crate::payload::encode_component;

/// Endpoint that renders the images.
pub const ENDPOINT: &str = "https://api.qrserver.com/v1/create-qr-code/";

/// Key under which the history list is stored.
pub const HISTORY_KEY: &str = "qrHistory";

/// Size used for thumbnails of entries saved without a url.
pub const THUMBNAIL_SIZE: u32 = 100;

/// Builds the image url for `data`. Colors are sent as six hex digits, with
/// no `#` and no alpha channel.
///
/// # Example
///
/// ```rust
/// use qrstudio::color::Color;
/// use qrstudio::remote::image_url;
///
/// let url = image_url(200, "a b", Color::BLACK, Color::WHITE);
/// assert_eq!(
///     url,
///     "https://api.qrserver.com/v1/create-qr-code/?size=200x200&data=a%20b&color=000000&bgcolor=FFFFFF"
/// );
/// ```
pub fn image_url(size: u32, data: &str, color: Color, background: Color) -> String {
    format!(
        "{ENDPOINT}?size={size}x{size}&data={}&color={}&bgcolor={}",
        encode_component(data),
        color.hex_digits(),
        background.hex_digits()
    )
}

/// One submitted code, stored with these exact field names.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEntry {
    pub text: String,
    /// Foreground as six hex digits.
    pub color: String,
    /// Background as six hex digits.
    pub bg: String,
    pub size: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Creation time, RFC 3339 in UTC.
    pub created: String,
}

/// Url to show for `entry`: the stored one, or a small thumbnail when the
/// entry predates stored urls.
pub fn thumbnail_url(entry: &RemoteEntry) -> String {
    if let Some(url) = &entry.url {
        return url.clone();
    }
    format!(
        "{ENDPOINT}?size={THUMBNAIL_SIZE}x{THUMBNAIL_SIZE}&data={}&color={}&bgcolor={}",
        encode_component(&entry.text),
        entry.color,
        entry.bg
    )
}

/// Persistent string storage addressed by key.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Store kept in memory only.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store that keeps every key in a single JSON object file.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut all = self.read_all()?;
        all.insert(key.to_string(), value.to_string());
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&all)?)?;
        Ok(())
    }
}

/// History of the simple form, oldest first.
pub struct RemoteHistory<S: KeyValueStore> {
    store: S,
    entries: Vec<RemoteEntry>,
}

impl<S: KeyValueStore> RemoteHistory<S> {
    /// Loads the list saved under [`HISTORY_KEY`]; an absent record is an
    /// empty history.
    pub fn open(store: S) -> Result<Self> {
        let entries = match store.get(HISTORY_KEY)? {
            Some(raw) => serde_json::from_str(&raw)?,
            None => Vec::new(),
        };
        Ok(Self { store, entries })
    }

    pub fn entries(&self) -> &[RemoteEntry] {
        &self.entries
    }

    pub fn contains(&self, text: &str) -> bool {
        self.entries.iter().any(|e| e.text == text)
    }

    /// Submits the form at the current time. See [`RemoteHistory::submit_at`].
    pub fn submit(
        &mut self,
        text: &str,
        color: Color,
        background: Color,
        size: u32,
    ) -> Result<Option<RemoteEntry>> {
        self.submit_at(text, color, background, size, Utc::now())
    }

    /// Submits the form.
    ///
    /// The text is trimmed; blank text does nothing and returns `Ok(None)`.
    /// Text already in the history is refused with
    /// [`Error::DuplicateEntry`] and leaves the history untouched. Otherwise
    /// the whole list with the new entry is persisted, and the entry is only
    /// kept in memory once the store accepted it.
    pub fn submit_at(
        &mut self,
        text: &str,
        color: Color,
        background: Color,
        size: u32,
        now: DateTime<Utc>,
    ) -> Result<Option<RemoteEntry>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        if self.contains(text) {
            log::warn!("remote: refusing duplicate submission");
            return Err(Error::DuplicateEntry(text.to_string()));
        }

        let entry = RemoteEntry {
            text: text.to_string(),
            color: color.hex_digits(),
            bg: background.hex_digits(),
            size,
            url: Some(image_url(size, text, color, background)),
            created: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        let mut candidate = self.entries.clone();
        candidate.push(entry.clone());
        self.store.set(HISTORY_KEY, &serde_json::to_string(&candidate)?)?;
        self.entries = candidate;
        log::info!("remote: stored entry #{}", self.entries.len());
        Ok(Some(entry))
    }

    pub fn into_store(self) -> S {
        self.store
    }
}
