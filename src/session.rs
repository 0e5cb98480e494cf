//! Generation session: the request being edited, its derived payload and
//! preview, and the history of downloads.
//!
//! Every mutation goes through a setter that re-runs the pipeline
//! (payload derivation, grid generation, rasterization), so the preview
//! surface always matches the request.

use chrono::{DateTime, Local};
use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::clipboard::ClipboardSink;
use crate::color::Color;
use crate::error::{Error, Result};
use crate::export::{self, Artifact, ExportFormat, ExportSource};
use crate::history::{HistoryEntry, HistoryStore};
use crate::matrix::{ErrorLevel, PseudoMatrix};
use crate::payload::{self, WhatsAppState};
use crate::render;

/// Smallest preview size offered by the size control.
pub const SIZE_MIN: u32 = 128;
/// Largest preview size offered by the size control.
pub const SIZE_MAX: u32 = 512;
/// Step of the size control.
pub const SIZE_STEP: u32 = 32;
/// Preview size of a fresh session.
pub const DEFAULT_SIZE: u32 = 256;

/// Brings `size` onto the size control: clamped to
/// [`SIZE_MIN`]..=[`SIZE_MAX`] and rounded to the nearest [`SIZE_STEP`].
pub fn snap_size(size: u32) -> u32 {
    let offset = size.clamp(SIZE_MIN, SIZE_MAX) - SIZE_MIN;
    let steps = (offset + SIZE_STEP / 2) / SIZE_STEP;
    (SIZE_MIN + steps * SIZE_STEP).min(SIZE_MAX)
}

/// Everything the user picked for the current code.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub category: Category,
    pub text: String,
    pub foreground: Color,
    pub background: Color,
    pub size: u32,
    pub error_level: ErrorLevel,
}

impl Default for GenerationRequest {
    fn default() -> Self {
        Self {
            category: Category::Url,
            text: Category::Url.default_payload().to_string(),
            foreground: Color::BLACK,
            background: Color::WHITE,
            size: DEFAULT_SIZE,
            error_level: ErrorLevel::Medium,
        }
    }
}

/// State of one generator session.
#[derive(Clone, Debug)]
pub struct Session {
    request: GenerationRequest,
    whatsapp: WhatsAppState,
    history: HistoryStore,
    matrix: PseudoMatrix,
    surface: RgbaImage,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(GenerationRequest::default())
    }
}

impl Session {
    /// Starts a session from `request`, rendering it immediately.
    pub fn new(request: GenerationRequest) -> Self {
        let matrix = PseudoMatrix::generate(&request.text, request.error_level);
        let surface =
            render::rasterize(&matrix, request.size, request.foreground, request.background);
        Self {
            request,
            whatsapp: WhatsAppState::default(),
            history: HistoryStore::new(),
            matrix,
            surface,
        }
    }

    /// Replaces the history, e.g. with one loaded from disk.
    pub fn with_history(mut self, history: HistoryStore) -> Self {
        self.history = history;
        self
    }

    pub fn request(&self) -> &GenerationRequest {
        &self.request
    }

    /// The payload currently drawn.
    pub fn payload(&self) -> &str {
        &self.request.text
    }

    pub fn whatsapp(&self) -> &WhatsAppState {
        &self.whatsapp
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn matrix(&self) -> &PseudoMatrix {
        &self.matrix
    }

    /// The preview surface for the current request.
    pub fn surface(&self) -> &RgbaImage {
        &self.surface
    }

    /// Switches category: the payload is replaced by the category default
    /// and the WhatsApp fields are cleared.
    pub fn set_category(&mut self, category: Category) {
        self.request.category = category;
        self.request.text = category.default_payload().to_string();
        self.whatsapp.clear();
        self.refresh(true);
    }

    /// Edits the payload directly.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.request.text = text.into();
        self.refresh(false);
    }

    pub fn set_whatsapp_number(&mut self, number: impl Into<String>) {
        self.whatsapp.number = number.into();
        self.refresh(true);
    }

    pub fn set_whatsapp_message(&mut self, message: impl Into<String>) {
        self.whatsapp.message = message.into();
        self.refresh(true);
    }

    pub fn set_colors(&mut self, foreground: Color, background: Color) {
        self.request.foreground = foreground;
        self.request.background = background;
        self.refresh(false);
    }

    pub fn set_size(&mut self, size: u32) {
        self.request.size = size;
        self.refresh(false);
    }

    pub fn set_error_level(&mut self, error_level: ErrorLevel) {
        self.request.error_level = error_level;
        self.refresh(false);
    }

    // Pipeline: derive the payload when its inputs changed, then regenerate
    // the grid and the surface.
    fn refresh(&mut self, derive_payload: bool) {
        if derive_payload {
            self.request.text =
                payload::format(self.request.category, &self.request.text, &self.whatsapp);
        }
        let request = &self.request;
        self.matrix = PseudoMatrix::generate(&request.text, request.error_level);
        self.surface =
            render::rasterize(&self.matrix, request.size, request.foreground, request.background);
        log::debug!(
            "session: re-rendered {} payload ({} bytes)",
            request.category,
            request.text.len()
        );
    }

    /// Exports the current code and records it in the history.
    ///
    /// `now` stamps the file name, the history id, the display date and the
    /// date line of the print sheet.
    pub fn download(
        &mut self,
        format: ExportFormat,
        quality: Option<f32>,
        now: DateTime<Local>,
    ) -> Result<Artifact> {
        let request = &self.request;
        let source = ExportSource {
            category: request.category,
            text: &request.text,
            foreground: request.foreground,
            background: request.background,
            error_level: request.error_level,
            surface: &self.surface,
        };
        let timestamp_ms = now.timestamp_millis();
        let date = now.format("%-m/%-d/%Y").to_string();
        let artifact = export::export(&source, format, quality, timestamp_ms, &date)?;

        let snapshot =
            export::encode_raster(&self.surface, ExportFormat::Png, export::DEFAULT_QUALITY)?;
        let entry = HistoryEntry {
            id: self.history.next_id(u64::try_from(timestamp_ms).unwrap_or_default()),
            category: request.category,
            content: request.text.clone(),
            foreground: request.foreground,
            background: request.background,
            size: request.size,
            error_level: request.error_level,
            created_at: now.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string(),
            preview: HistoryEntry::preview_data_url(&snapshot),
        };
        self.history.push(entry);
        Ok(artifact)
    }

    /// Exports with the current local time.
    pub fn download_now(&mut self, format: ExportFormat, quality: Option<f32>) -> Result<Artifact> {
        self.download(format, quality, Local::now())
    }

    /// Restores every field of the entry `id` into the request.
    ///
    /// For WhatsApp entries the number and message are recovered from the
    /// stored link, so further edits keep deriving the same payload.
    pub fn load_from_history(&mut self, id: u64) -> Result<()> {
        let entry = self.history.get(id).ok_or(Error::EntryNotFound(id))?.clone();
        self.request = GenerationRequest {
            category: entry.category,
            text: entry.content,
            foreground: entry.foreground,
            background: entry.background,
            size: entry.size,
            error_level: entry.error_level,
        };
        self.whatsapp.clear();
        if entry.category == Category::Whatsapp {
            if let Some(state) = payload::parse_whatsapp_link(&self.request.text) {
                self.whatsapp = state;
            }
        }
        log::info!("session: loaded history entry {id}");
        self.refresh(false);
        Ok(())
    }

    /// Removes one history entry. Returns whether it existed.
    pub fn delete_from_history(&mut self, id: u64) -> bool {
        self.history.remove(id).is_some()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Copies the current payload to `clipboard`.
    pub fn copy_payload(&self, clipboard: &mut dyn ClipboardSink) -> Result<()> {
        clipboard.set_text(&self.request.text)?;
        log::info!("session: payload copied to clipboard");
        Ok(())
    }

    /// Copies the payload of history entry `id` to `clipboard`.
    pub fn copy_entry(&self, id: u64, clipboard: &mut dyn ClipboardSink) -> Result<()> {
        let entry = self.history.get(id).ok_or(Error::EntryNotFound(id))?;
        clipboard.set_text(&entry.content)?;
        log::info!("session: history entry {id} copied to clipboard");
        Ok(())
    }
}
