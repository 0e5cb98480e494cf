//! Payload formatting: turns a category plus its auxiliary fields into the
//! string that gets drawn.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::error::Error;

/// Bytes escaped in URI components: everything but ASCII alphanumerics and
/// `- _ . ! ~ * ' ( )`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Base of every WhatsApp deep link.
pub const WHATSAPP_BASE: &str = "https://wa.me/";

/// Country prefixes recognised as already present on a phone number.
///
/// Anything else gets [`DEFAULT_COUNTRY_PREFIX`] prepended, so numbers from
/// countries outside this set may be tagged wrongly.
pub const KNOWN_COUNTRY_PREFIXES: [&str; 3] = ["1", "52", "34"];

/// Prefix assumed for numbers without a recognised country code.
pub const DEFAULT_COUNTRY_PREFIX: &str = "1";

/// Phone number and optional message behind a WhatsApp link.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhatsAppState {
    pub number: String,
    pub message: String,
}

impl WhatsAppState {
    pub fn new(number: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            message: message.into(),
        }
    }

    pub fn clear(&mut self) {
        self.number.clear();
        self.message.clear();
    }
}

/// Derives the payload for `category` from the current text and the
/// WhatsApp sub-state.
///
/// Only WhatsApp payloads are derived; every other category keeps the text
/// the user is editing. Applying this to its own output is a no-op.
pub fn format(category: Category, current_text: &str, whatsapp: &WhatsAppState) -> String {
    match category {
        Category::Whatsapp => whatsapp_link(whatsapp),
        _ => current_text.to_string(),
    }
}

/// Strips every non-digit and prepends the default country prefix when the
/// digits do not start with a known one. Blank input stays blank.
pub fn normalize_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() || KNOWN_COUNTRY_PREFIXES.iter().any(|p| digits.starts_with(p)) {
        digits
    } else {
        format!("{DEFAULT_COUNTRY_PREFIX}{digits}")
    }
}

/// Builds a `https://wa.me/<number>[?text=<message>]` link.
///
/// A blank number yields the bare base link, and the message is dropped with
/// it since there is nobody to send it to.
///
/// # Example
///
/// ```rust
/// use qrstudio::payload::{whatsapp_link, WhatsAppState};
///
/// let link = whatsapp_link(&WhatsAppState::new("(55) 1234-5678", "hi there"));
/// assert_eq!(link, "https://wa.me/15512345678?text=hi%20there");
/// ```
pub fn whatsapp_link(state: &WhatsAppState) -> String {
    let mut link = String::from(WHATSAPP_BASE);
    if state.number.is_empty() {
        return link;
    }
    link.push_str(&normalize_phone(&state.number));
    if !state.message.is_empty() {
        link.push_str("?text=");
        link.push_str(&encode_component(&state.message));
    }
    link
}

/// Recovers the number and message from a link built by [`whatsapp_link`].
///
/// Returns `None` when the link is not a `wa.me/` link. A missing `text`
/// parameter gives an empty message.
pub fn parse_whatsapp_link(link: &str) -> Option<WhatsAppState> {
    let start = link.find("wa.me/")? + "wa.me/".len();
    let rest = &link[start..];
    let rest = rest.split('#').next().unwrap_or_default();
    let (path, query) = match rest.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (rest, None),
    };

    let number = path.split('/').next().unwrap_or_default().to_string();
    let message = query
        .and_then(|q| {
            q.split('&').find_map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (key == "text").then_some(value)
            })
        })
        .map(decode_component)
        .unwrap_or_default();

    Some(WhatsAppState { number, message })
}

/// Percent-encodes `value` for use inside a URL query, leaving the
/// unreserved marks `- _ . ! ~ * ' ( )` as they are.
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

// Query values follow form encoding, where '+' stands for a space.
fn decode_component(value: &str) -> String {
    let spaced = value.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

/// Security scheme of a WiFi network.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum WifiSecurity {
    #[default]
    Wpa,
    Wep,
    Open,
}

impl WifiSecurity {
    fn tag(self) -> &'static str {
        match self {
            WifiSecurity::Wpa => "WPA",
            WifiSecurity::Wep => "WEP",
            WifiSecurity::Open => "nopass",
        }
    }
}

impl FromStr for WifiSecurity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wpa" | "wpa2" => Ok(WifiSecurity::Wpa),
            "wep" => Ok(WifiSecurity::Wep),
            "nopass" | "open" | "none" => Ok(WifiSecurity::Open),
            _ => Err(Error::UnknownSecurity(s.to_string())),
        }
    }
}

/// Builds a `WIFI:T:..;S:..;P:..;;` join string, escaping the reserved
/// characters `\ ; , "` inside the SSID and password.
pub fn wifi_payload(ssid: &str, password: &str, security: WifiSecurity) -> String {
    format!(
        "WIFI:T:{};S:{};P:{};;",
        security.tag(),
        escape_wifi_field(ssid),
        escape_wifi_field(password)
    )
}

fn escape_wifi_field(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for c in s.chars() {
        if matches!(c, '\\' | ';' | ',' | '"') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_phone() {
        assert_eq!(normalize_phone("+1 (555) 010-9999"), "15550109999");
        assert_eq!(normalize_phone("52 55 1234 5678"), "525512345678");
        assert_eq!(normalize_phone("34-600-000-000"), "34600000000");
        assert_eq!(normalize_phone("44 20 7946 0000"), "1442079460000");
        assert_eq!(normalize_phone("no digits"), "");
    }

    #[test]
    fn test_normalize_phone_idempotent() {
        for raw in ["(55) 1234-5678", "+52 1 55", "999", "34 1", ""] {
            let once = normalize_phone(raw);
            assert_eq!(normalize_phone(&once), once);
        }
    }

    #[test]
    fn test_whatsapp_link_blank_number() {
        let state = WhatsAppState::new("", "ignored");
        assert_eq!(whatsapp_link(&state), "https://wa.me/");
    }

    #[test]
    fn test_whatsapp_link_without_message() {
        let state = WhatsAppState::new("5512345678", "");
        assert_eq!(whatsapp_link(&state), "https://wa.me/15512345678");
        let state = WhatsAppState::new("525512345678", "");
        assert_eq!(whatsapp_link(&state), "https://wa.me/525512345678");
    }

    #[test]
    fn test_message_keeps_unreserved_marks() {
        let state = WhatsAppState::new("15550100", "Hola! (ok)");
        assert_eq!(whatsapp_link(&state), "https://wa.me/15550100?text=Hola!%20(ok)");
        assert_eq!(
            encode_component("it's *fine*~ a&b=c/?#"),
            "it's%20*fine*~%20a%26b%3Dc%2F%3F%23"
        );
        assert_eq!(encode_component("¿qué?"), "%C2%BFqu%C3%A9%3F");
    }

    #[test]
    fn test_whatsapp_formatting_idempotent() {
        let state = WhatsAppState::new("+34 612 345 678", "Hola, ¿qué tal?");
        let first = format(Category::Whatsapp, "", &state);
        let second = format(Category::Whatsapp, &first, &state);
        assert_eq!(first, second);

        let reparsed = parse_whatsapp_link(&first).unwrap();
        assert_eq!(whatsapp_link(&reparsed), first);
    }

    #[test]
    fn test_format_keeps_text_for_other_categories() {
        let state = WhatsAppState::new("123", "x");
        assert_eq!(
            format(Category::Email, "mailto:me@example.org", &state),
            "mailto:me@example.org"
        );
    }

    #[test]
    fn test_parse_reserved_characters() {
        let state = WhatsAppState::new("15550100", "a&b=c");
        let link = whatsapp_link(&state);
        assert_eq!(link, "https://wa.me/15550100?text=a%26b%3Dc");
        assert_eq!(parse_whatsapp_link(&link).unwrap(), state);
    }

    #[test]
    fn test_parse_plus_as_space() {
        let parsed = parse_whatsapp_link("https://wa.me/15550100?text=hello+world").unwrap();
        assert_eq!(parsed.message, "hello world");
    }

    #[test]
    fn test_parse_rejects_other_links() {
        assert!(parse_whatsapp_link("https://t.me/usuario").is_none());
        let bare = parse_whatsapp_link(WHATSAPP_BASE).unwrap();
        assert_eq!(bare, WhatsAppState::default());
    }

    #[test]
    fn test_wifi_security_parse() {
        assert_eq!("WPA2".parse::<WifiSecurity>().unwrap(), WifiSecurity::Wpa);
        assert_eq!("open".parse::<WifiSecurity>().unwrap(), WifiSecurity::Open);
        let err = "wpa3-enterprise".parse::<WifiSecurity>().unwrap_err();
        assert!(matches!(err, Error::UnknownSecurity(_)));
    }

    #[test]
    fn test_wifi_payload_escaping() {
        assert_eq!(
            wifi_payload("Cafe;Net", "p\"w,1", WifiSecurity::Wpa),
            "WIFI:T:WPA;S:Cafe\\;Net;P:p\\\"w\\,1;;"
        );
        assert_eq!(
            wifi_payload("Lobby", "", WifiSecurity::Open),
            "WIFI:T:nopass;S:Lobby;P:;;"
        );
    }
}
