//! # qrstudio
//!
//! A Rust library for composing QR-style codes: pick a content category, tune colors, size and
//! error level, preview the result, export it in several formats and keep a history of what was
//! generated.
//!
//! The grid drawn by this crate only *looks* like a QR symbol. It is a fixed 25x25 pattern with
//! finder markers, timing lines and a central block derived from the parity of the payload's
//! character-code sum. It is not scannable; see [`matrix`] for the exact construction.
//!
//! ## Features
//!
//! - Default payloads for URLs, text, email, phone, SMS, WiFi and eight social networks.
//! - WhatsApp deep links built from a phone number and message, and parsed back.
//! - Raster previews with custom colors, exported as PNG, JPEG, WebP, SVG or a printable sheet.
//! - A capped, newest-first history that restores every field of a past code.
//! - A separate "simple form" that delegates drawing to a remote image endpoint and persists a
//!   text-keyed history.
//!
//! ## Example
//!
//! ```rust
//! use qrstudio::{Category, ExportFormat, Session};
//!
//! let mut session = Session::default();
//! session.set_category(Category::Whatsapp);
//! session.set_whatsapp_number("+34 612 345 678");
//! session.set_whatsapp_message("Hola");
//! assert_eq!(session.payload(), "https://wa.me/34612345678?text=Hola");
//!
//! let artifact = session.download_now(ExportFormat::Svg, None).unwrap();
//! assert!(artifact.filename.starts_with("qr-whatsapp-"));
//! assert_eq!(session.history().len(), 1);
//! ```
//!
//! ## Modules
//!
//! - [`category`] and [`payload`]: what gets encoded.
//! - [`matrix`] and [`render`]: the grid and its raster/SVG/terminal renderings.
//! - [`export`]: downloadable artifacts.
//! - [`history`] and [`session`]: the stateful generator.
//! - [`remote`]: the simple form backed by a remote image endpoint.
//! - [`config`], [`clipboard`], [`color`], [`error`]: supporting pieces.

pub mod category;
pub mod clipboard;
pub mod color;
pub mod config;
pub mod error;
pub mod export;
mod font;
pub mod history;
pub mod matrix;
pub mod payload;
pub mod remote;
pub mod render;
pub mod session;

pub use category::Category;
pub use color::Color;
pub use error::{Error, Result};
pub use export::{Artifact, ExportFormat};
pub use history::{HistoryEntry, HistoryStore};
pub use matrix::{ErrorLevel, PseudoMatrix};
pub use payload::WhatsAppState;
pub use session::{GenerationRequest, Session};
