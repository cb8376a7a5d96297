//! Payload builders for the supported QR content types
//!
//! Every builder trims its inputs and returns `None` when the fields do not
//! amount to any content worth encoding.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which kind of payload to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadMode {
    /// Plain URL or free text
    Url,
    /// WiFi network credentials
    Wifi,
    /// vCard 3.0 contact
    Vcard,
    /// mailto link
    Email,
}

impl PayloadMode {
    /// Lowercase identifier, also used in export file names
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Url => "url",
            Self::Wifi => "wifi",
            Self::Vcard => "vcard",
            Self::Email => "email",
        }
    }
}

impl fmt::Display for PayloadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// WiFi authentication type as understood by the `WIFI:` scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WifiSecurity {
    /// WPA/WPA2/WPA3 personal
    #[default]
    #[serde(rename = "WPA")]
    Wpa,
    /// Legacy WEP
    #[serde(rename = "WEP")]
    Wep,
    /// Open network
    #[serde(rename = "nopass")]
    NoPass,
}

impl WifiSecurity {
    /// Parse `WPA`, `WEP` or `nopass` (case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "wpa" => Some(Self::Wpa),
            "wep" => Some(Self::Wep),
            "nopass" | "none" | "open" => Some(Self::NoPass),
            _ => None,
        }
    }

    /// Token written into the `T:` field
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Wpa => "WPA",
            Self::Wep => "WEP",
            Self::NoPass => "nopass",
        }
    }
}

/// Fields of the WiFi form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WifiCredentials {
    /// Network name
    pub ssid: String,
    /// Passphrase
    pub password: String,
    /// Authentication type
    pub security: WifiSecurity,
    /// Whether the SSID is hidden
    pub hidden: bool,
}

/// Fields of the contact form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VCardContact {
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Mobile phone number
    pub phone: String,
    /// Email address
    pub email: String,
    /// Organisation
    pub organization: String,
    /// Job title
    pub title: String,
}

/// Fields of the email form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailMessage {
    /// Recipient address
    pub address: String,
    /// Subject line
    pub subject: String,
    /// Message body
    pub body: String,
}

/// A fully described payload request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadRequest {
    /// URL or text
    Url(String),
    /// WiFi credentials
    Wifi(WifiCredentials),
    /// Contact card
    Vcard(VCardContact),
    /// mailto link
    Email(EmailMessage),
}

impl PayloadRequest {
    /// Mode of this request
    pub fn mode(&self) -> PayloadMode {
        match self {
            Self::Url(_) => PayloadMode::Url,
            Self::Wifi(_) => PayloadMode::Wifi,
            Self::Vcard(_) => PayloadMode::Vcard,
            Self::Email(_) => PayloadMode::Email,
        }
    }

    /// Build the payload string, or `None` when there is nothing to encode.
    pub fn build(&self) -> Option<String> {
        match self {
            Self::Url(text) => build_text(text),
            Self::Wifi(wifi) => build_wifi(wifi),
            Self::Vcard(contact) => build_vcard(contact),
            Self::Email(message) => build_mailto(message),
        }
    }
}

/// Trimmed text, `None` when empty.
pub fn build_text(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// `WIFI:T:<type>;S:<ssid>;P:<pass>;H:<hidden>;;`
pub fn build_wifi(wifi: &WifiCredentials) -> Option<String> {
    let ssid = wifi.ssid.trim();
    if ssid.is_empty() {
        return None;
    }

    Some(format!(
        "WIFI:T:{};S:{};P:{};H:{};;",
        wifi.security.as_str(),
        ssid,
        wifi.password.trim(),
        wifi.hidden
    ))
}

/// vCard 3.0 with N, FN, ORG, TITLE, TEL and EMAIL lines.
///
/// Requires at least one of a name, a phone number or an email address.
pub fn build_vcard(contact: &VCardContact) -> Option<String> {
    let first = contact.first_name.trim();
    let last = contact.last_name.trim();
    let phone = contact.phone.trim();
    let email = contact.email.trim();

    let full_name = format!("{first} {last}");
    if full_name.trim().is_empty() && phone.is_empty() && email.is_empty() {
        return None;
    }

    let lines = [
        "BEGIN:VCARD".to_string(),
        "VERSION:3.0".to_string(),
        format!("N:{last};{first};;;"),
        format!("FN:{full_name}"),
        format!("ORG:{}", contact.organization.trim()),
        format!("TITLE:{}", contact.title.trim()),
        format!("TEL;TYPE=CELL:{phone}"),
        format!("EMAIL:{email}"),
        "END:VCARD".to_string(),
    ];
    Some(lines.join("\n"))
}

/// Characters left unescaped in mailto query values: ASCII alphanumerics
/// plus `-_.!~*'()`.
const MAILTO_QUERY_ENCODE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// `mailto:<addr>?subject=<enc>&body=<enc>`
pub fn build_mailto(message: &EmailMessage) -> Option<String> {
    let address = message.address.trim();
    if address.is_empty() {
        return None;
    }

    Some(format!(
        "mailto:{}?subject={}&body={}",
        address,
        utf8_percent_encode(message.subject.trim(), MAILTO_QUERY_ENCODE),
        utf8_percent_encode(message.body.trim(), MAILTO_QUERY_ENCODE)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_is_trimmed() {
        assert_eq!(
            build_text("  https://example.com \n"),
            Some("https://example.com".to_string())
        );
        assert_eq!(build_text("   "), None);
    }

    #[test]
    fn test_wifi_format() {
        let wifi = WifiCredentials {
            ssid: " HomeNet ".to_string(),
            password: "hunter2".to_string(),
            security: WifiSecurity::Wpa,
            hidden: true,
        };
        assert_eq!(
            build_wifi(&wifi).as_deref(),
            Some("WIFI:T:WPA;S:HomeNet;P:hunter2;H:true;;")
        );
    }

    #[test]
    fn test_wifi_open_network() {
        let wifi = WifiCredentials {
            ssid: "Cafe".to_string(),
            security: WifiSecurity::NoPass,
            ..Default::default()
        };
        assert_eq!(
            build_wifi(&wifi).as_deref(),
            Some("WIFI:T:nopass;S:Cafe;P:;H:false;;")
        );
    }

    #[test]
    fn test_wifi_requires_ssid() {
        let wifi = WifiCredentials {
            password: "secret".to_string(),
            ..Default::default()
        };
        assert_eq!(build_wifi(&wifi), None);
    }

    #[test]
    fn test_vcard_format() {
        let contact = VCardContact {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            phone: "+44 20 7946 0000".to_string(),
            email: "ada@example.com".to_string(),
            organization: "Analytical Engines".to_string(),
            title: "Programmer".to_string(),
        };
        let expected = "BEGIN:VCARD\nVERSION:3.0\nN:Lovelace;Ada;;;\nFN:Ada Lovelace\n\
                        ORG:Analytical Engines\nTITLE:Programmer\nTEL;TYPE=CELL:+44 20 7946 0000\n\
                        EMAIL:ada@example.com\nEND:VCARD";
        assert_eq!(build_vcard(&contact).as_deref(), Some(expected));
    }

    #[test]
    fn test_vcard_phone_only_is_enough() {
        let contact = VCardContact {
            phone: "555-0100".to_string(),
            organization: "Ignored unless something else is set".to_string(),
            ..Default::default()
        };
        let card = build_vcard(&contact).unwrap();
        assert!(card.contains("FN: \n"));
        assert!(card.contains("TEL;TYPE=CELL:555-0100"));
    }

    #[test]
    fn test_vcard_needs_name_phone_or_email() {
        let contact = VCardContact {
            organization: "Acme".to_string(),
            title: "CEO".to_string(),
            ..Default::default()
        };
        assert_eq!(build_vcard(&contact), None);
    }

    #[test]
    fn test_mailto_encodes_subject_and_body() {
        let message = EmailMessage {
            address: "team@example.com".to_string(),
            subject: "Hello there".to_string(),
            body: "Line one & two".to_string(),
        };
        assert_eq!(
            build_mailto(&message).as_deref(),
            Some("mailto:team@example.com?subject=Hello%20there&body=Line%20one%20%26%20two")
        );
    }

    #[test]
    fn test_mailto_keeps_unreserved_punctuation() {
        let message = EmailMessage {
            address: "a@b.c".to_string(),
            subject: "Hi!".to_string(),
            body: "(ok) it's *".to_string(),
        };
        assert_eq!(
            build_mailto(&message).as_deref(),
            Some("mailto:a@b.c?subject=Hi!&body=(ok)%20it's%20*")
        );
    }

    #[test]
    fn test_mailto_escapes_reserved_and_non_ascii() {
        let message = EmailMessage {
            address: "a@b.c".to_string(),
            subject: "50% off?".to_string(),
            body: "caf\u{e9}/#".to_string(),
        };
        assert_eq!(
            build_mailto(&message).as_deref(),
            Some("mailto:a@b.c?subject=50%25%20off%3F&body=caf%C3%A9%2F%23")
        );
    }

    #[test]
    fn test_mailto_requires_address() {
        assert_eq!(build_mailto(&EmailMessage::default()), None);
    }

    #[test]
    fn test_request_dispatch() {
        let request = PayloadRequest::Url("example.org".to_string());
        assert_eq!(request.mode(), PayloadMode::Url);
        assert_eq!(request.build().as_deref(), Some("example.org"));
        assert_eq!(PayloadRequest::Email(EmailMessage::default()).build(), None);
    }

    #[test]
    fn test_security_parse() {
        assert_eq!(WifiSecurity::parse("wpa"), Some(WifiSecurity::Wpa));
        assert_eq!(WifiSecurity::parse("NOPASS"), Some(WifiSecurity::NoPass));
        assert_eq!(WifiSecurity::parse("wpa3"), None);
    }
}
