//! Content categories and their default payloads.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// The kind of content a code carries.
///
/// Selecting a category replaces the payload wholesale with
/// [`Category::default_payload`]; the user then edits it from there.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Url,
    Text,
    Email,
    Phone,
    Sms,
    Wifi,
    Whatsapp,
    Instagram,
    Facebook,
    Twitter,
    Linkedin,
    Youtube,
    Tiktok,
    Telegram,
}

impl Category {
    /// Every category, in the order the generator presents them.
    pub const ALL: [Category; 14] = [
        Category::Url,
        Category::Text,
        Category::Email,
        Category::Phone,
        Category::Sms,
        Category::Wifi,
        Category::Whatsapp,
        Category::Instagram,
        Category::Facebook,
        Category::Twitter,
        Category::Linkedin,
        Category::Youtube,
        Category::Tiktok,
        Category::Telegram,
    ];

    /// The payload applied when the category is selected.
    pub const fn default_payload(self) -> &'static str {
        use Category::*;
        match self {
            Url => "https://example.com",
            Text => "Hola mundo",
            Email => "mailto:ejemplo@email.com",
            Phone => "tel:+1234567890",
            Sms => "sms:+1234567890?body=Hola",
            Wifi => "WIFI:T:WPA;S:MiWiFi;P:mipassword;;",
            Whatsapp => "https://wa.me/",
            Instagram => "https://instagram.com/usuario",
            Facebook => "https://facebook.com/usuario",
            Twitter => "https://twitter.com/usuario",
            Linkedin => "https://linkedin.com/in/usuario",
            Youtube => "https://youtube.com/@canal",
            Tiktok => "https://tiktok.com/@usuario",
            Telegram => "https://t.me/usuario",
        }
    }

    /// Human-readable label used in captions and listings.
    pub const fn label(self) -> &'static str {
        use Category::*;
        match self {
            Url => "URL/Link",
            Text => "Text",
            Email => "Email",
            Phone => "Phone",
            Sms => "SMS",
            Wifi => "WiFi",
            Whatsapp => "WhatsApp",
            Instagram => "Instagram",
            Facebook => "Facebook",
            Twitter => "Twitter/X",
            Linkedin => "LinkedIn",
            Youtube => "YouTube",
            Tiktok => "TikTok",
            Telegram => "Telegram",
        }
    }

    /// Lowercase identifier, used in file names and on the command line.
    pub const fn slug(self) -> &'static str {
        use Category::*;
        match self {
            Url => "url",
            Text => "text",
            Email => "email",
            Phone => "phone",
            Sms => "sms",
            Wifi => "wifi",
            Whatsapp => "whatsapp",
            Instagram => "instagram",
            Facebook => "facebook",
            Twitter => "twitter",
            Linkedin => "linkedin",
            Youtube => "youtube",
            Tiktok => "tiktok",
            Telegram => "telegram",
        }
    }

    /// Whether the category is one of the social-network shortcuts.
    pub const fn is_social(self) -> bool {
        use Category::*;
        matches!(
            self,
            Whatsapp | Instagram | Facebook | Twitter | Linkedin | Youtube | Tiktok | Telegram
        )
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.slug() == wanted)
            .ok_or_else(|| Error::UnknownCategory(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_payloads() {
        let expected = [
            (Category::Url, "https://example.com"),
            (Category::Text, "Hola mundo"),
            (Category::Email, "mailto:ejemplo@email.com"),
            (Category::Phone, "tel:+1234567890"),
            (Category::Sms, "sms:+1234567890?body=Hola"),
            (Category::Wifi, "WIFI:T:WPA;S:MiWiFi;P:mipassword;;"),
            (Category::Whatsapp, "https://wa.me/"),
            (Category::Instagram, "https://instagram.com/usuario"),
            (Category::Facebook, "https://facebook.com/usuario"),
            (Category::Twitter, "https://twitter.com/usuario"),
            (Category::Linkedin, "https://linkedin.com/in/usuario"),
            (Category::Youtube, "https://youtube.com/@canal"),
            (Category::Tiktok, "https://tiktok.com/@usuario"),
            (Category::Telegram, "https://t.me/usuario"),
        ];
        assert_eq!(expected.len(), Category::ALL.len());
        for (category, payload) in expected {
            assert_eq!(category.default_payload(), payload);
        }
    }

    #[test]
    fn test_parse_slug_roundtrip() {
        for category in Category::ALL {
            assert_eq!(category.slug().parse::<Category>().unwrap(), category);
        }
        assert_eq!(" WhatsApp ".parse::<Category>().unwrap(), Category::Whatsapp);
    }

    #[test]
    fn test_parse_unknown() {
        let err = "fax".parse::<Category>().unwrap_err();
        assert!(matches!(err, Error::UnknownCategory(name) if name == "fax"));
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&Category::Linkedin).unwrap();
        assert_eq!(json, "\"linkedin\"");
        let back: Category = serde_json::from_str("\"tiktok\"").unwrap();
        assert_eq!(back, Category::Tiktok);
    }

    #[test]
    fn test_social_split() {
        assert_eq!(Category::ALL.iter().filter(|c| c.is_social()).count(), 8);
        assert!(!Category::Wifi.is_social());
    }
}
