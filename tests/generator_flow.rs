//! End-to-end checks of the generator through the public API: category
//! defaults, WhatsApp round trips, history limits and export determinism.

use chrono::{Local, TimeZone};
use qrstudio::history::HISTORY_CAPACITY;
use qrstudio::matrix::char_code_sum;
use qrstudio::payload::{self, WhatsAppState};
use qrstudio::render::rasterize;
use qrstudio::{Category, Color, ErrorLevel, ExportFormat, HistoryStore, PseudoMatrix, Session};

fn at(ms: i64) -> chrono::DateTime<Local> {
    Local.timestamp_millis_opt(ms).unwrap()
}

#[test]
fn every_category_yields_its_default() {
    let mut session = Session::default();
    for category in Category::ALL {
        session.set_category(category);
        assert_eq!(session.payload(), category.default_payload(), "{category}");
    }
}

#[test]
fn whatsapp_formatting_is_idempotent() {
    let state = WhatsAppState::new("(52) 55-1234-5678", "¿Nos vemos a las 5?");
    let first = payload::format(Category::Whatsapp, "", &state);
    let second = payload::format(Category::Whatsapp, &first, &state);
    assert_eq!(first, second);
}

#[test]
fn twenty_first_download_evicts_the_oldest() {
    let mut session = Session::default();
    for i in 0..HISTORY_CAPACITY as i64 {
        session.download(ExportFormat::Svg, None, at(1_000 + i)).unwrap();
    }
    let oldest = session.history().entries().last().unwrap().id;
    assert_eq!(oldest, 1_000);

    session.download(ExportFormat::Svg, None, at(5_000)).unwrap();
    let history = session.history();
    assert_eq!(history.len(), HISTORY_CAPACITY);
    assert!(history.get(oldest).is_none());
    assert!(history.get(1_001).is_some());
    assert_eq!(history.entries()[0].id, 5_000);
}

#[test]
fn whatsapp_entry_restores_number_and_message() {
    let mut session = Session::default();
    session.set_category(Category::Whatsapp);
    session.set_whatsapp_number("15550100");
    session.set_whatsapp_message("a&b=c");
    session.download(ExportFormat::Png, None, at(42)).unwrap();

    session.set_category(Category::Text);
    session.load_from_history(42).unwrap();

    assert_eq!(session.whatsapp(), &WhatsAppState::new("15550100", "a&b=c"));
    assert_eq!(session.payload(), "https://wa.me/15550100?text=a%26b%3Dc");
}

#[test]
fn rendering_is_byte_identical_for_equal_inputs() {
    let fg = Color::rgb(0x7C, 0x3A, 0xED);
    let bg = Color::rgb(0xF3, 0xE8, 0xFF);
    let a = rasterize(&PseudoMatrix::generate("deterministic", ErrorLevel::Low), 320, fg, bg);
    let b = rasterize(&PseudoMatrix::generate("deterministic", ErrorLevel::Low), 320, fg, bg);
    assert_eq!(a.as_raw(), b.as_raw());

    let mut first = Session::default();
    let mut second = Session::default();
    let x = first.download(ExportFormat::Png, None, at(9)).unwrap();
    let y = second.download(ExportFormat::Png, None, at(9)).unwrap();
    assert_eq!(x, y);
}

#[test]
fn constructed_pair_collides() {
    // "AD" and "BC" share the sum 133; their grids cannot be told apart.
    assert_eq!(char_code_sum("AD"), char_code_sum("BC"));
    let first = PseudoMatrix::generate("AD", ErrorLevel::Medium);
    let second = PseudoMatrix::generate("BC", ErrorLevel::Medium);
    for y in 9..18 {
        for x in 9..18 {
            assert_eq!(first.get_module(x, y), second.get_module(x, y));
        }
    }
}

#[test]
fn delete_by_id_keeps_relative_order() {
    let mut session = Session::default();
    for ms in [100, 200, 300, 400] {
        session.download(ExportFormat::Svg, None, at(ms)).unwrap();
    }
    assert!(session.delete_from_history(300));
    let ids: Vec<u64> = session.history().entries().iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![400, 200, 100]);
}

#[test]
fn history_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");

    let mut session = Session::default();
    session.set_category(Category::Youtube);
    session.download(ExportFormat::Webp, Some(0.5), at(7)).unwrap();
    session.history().save(&path).unwrap();

    let restored = Session::default().with_history(HistoryStore::load(&path).unwrap());
    let entry = restored.history().get(7).unwrap();
    assert_eq!(entry.category, Category::Youtube);
    assert_eq!(entry.content, "https://youtube.com/@canal");
}

#[test]
fn whatsapp_message_keeps_unreserved_marks() {
    let mut session = Session::default();
    session.set_category(Category::Whatsapp);
    session.set_whatsapp_number("34 600 000 000");
    session.set_whatsapp_message("Hola! (ok) it's *fine*~");
    assert_eq!(
        session.payload(),
        "https://wa.me/34600000000?text=Hola!%20(ok)%20it's%20*fine*~"
    );

    session.download(ExportFormat::Svg, None, at(11)).unwrap();
    session.set_category(Category::Url);
    session.load_from_history(11).unwrap();
    assert_eq!(session.whatsapp().message, "Hola! (ok) it's *fine*~");
}
