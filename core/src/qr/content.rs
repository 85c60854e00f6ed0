// bobabble/src/qr/content.rs

//! Text templates for general-purpose QR codes (links, contacts, WiFi and
//! so on). Each variant renders to the string a phone's scanner expects.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use std::fmt;

// Everything except the unreserved marks JavaScript's encodeURIComponent leaves alone.
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

pub(crate) fn encode_component(input: &str) -> String {
  utf8_percent_encode(input, COMPONENT).to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailContent {
  pub address: String,
  #[serde(default)]
  pub subject: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsContent {
  pub number: String,
  #[serde(default)]
  pub body: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WifiSecurity {
  #[default]
  #[serde(rename = "WPA")]
  Wpa,
  #[serde(rename = "WEP")]
  Wep,
  #[serde(rename = "nopass")]
  NoPass,
}

impl fmt::Display for WifiSecurity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      WifiSecurity::Wpa => "WPA",
      WifiSecurity::Wep => "WEP",
      WifiSecurity::NoPass => "nopass",
    })
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WifiContent {
  pub ssid: String,
  #[serde(default)]
  pub password: String,
  #[serde(default)]
  pub security: WifiSecurity,
  #[serde(default)]
  pub hidden: bool,
}

/// Dates are local `YYYY-MM-DDTHH:MM` strings as typed into a form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventContent {
  pub title: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub location: String,
  pub start: String,
  pub end: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactContent {
  pub name: String,
  #[serde(default)]
  pub organization: String,
  #[serde(default)]
  pub phone: String,
  #[serde(default)]
  pub email: String,
  #[serde(default)]
  pub url: String,
}

/// What a generic QR code carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum QrContent {
  Url(String),
  Email(EmailContent),
  Phone(String),
  Sms(SmsContent),
  Wifi(WifiContent),
  /// `"lat, lng"` or a free-text address.
  Geo(String),
  Event(EventContent),
  Contact(ContactContent),
  /// A payment URI, encoded as given.
  Payment(String),
  Text(String),
}

impl QrContent {
  pub fn kind(&self) -> &'static str {
    match self {
      QrContent::Url(_) => "url",
      QrContent::Email(_) => "email",
      QrContent::Phone(_) => "phone",
      QrContent::Sms(_) => "sms",
      QrContent::Wifi(_) => "wifi",
      QrContent::Geo(_) => "geo",
      QrContent::Event(_) => "event",
      QrContent::Contact(_) => "contact",
      QrContent::Payment(_) => "payment",
      QrContent::Text(_) => "text",
    }
  }

  /// The text encoded into the symbol.
  pub fn payload(&self) -> String {
    match self {
      QrContent::Url(url) => {
        if has_scheme(url) {
          url.clone()
        } else {
          format!("https://{}", url)
        }
      }
      QrContent::Email(email) => match email.subject.as_deref() {
        Some(subject) if !subject.is_empty() => {
          format!("mailto:{}?subject={}", email.address, encode_component(subject))
        }
        _ => format!("mailto:{}", email.address),
      },
      QrContent::Phone(number) => format!("tel:{}", number),
      QrContent::Sms(sms) => match sms.body.as_deref() {
        Some(body) if !body.is_empty() => format!("sms:{}?body={}", sms.number, encode_component(body)),
        _ => format!("sms:{}", sms.number),
      },
      QrContent::Wifi(wifi) => format!(
        "WIFI:T:{};S:{};P:{};H:{};;",
        wifi.security, wifi.ssid, wifi.password, wifi.hidden
      ),
      QrContent::Geo(input) => match input.split_once(',') {
        Some((lat, lng)) => format!("geo:{},{}", lat.trim(), lng.trim()),
        None => format!("geo:0,0?q={}", encode_component(input)),
      },
      QrContent::Event(event) => [
        "BEGIN:VEVENT".to_string(),
        format!("SUMMARY:{}", event.title),
        format!("DESCRIPTION:{}", event.description),
        format!("LOCATION:{}", event.location),
        format!("DTSTART:{}", compact_datetime(&event.start)),
        format!("DTEND:{}", compact_datetime(&event.end)),
        "END:VEVENT".to_string(),
      ]
      .join("\n"),
      QrContent::Contact(contact) => [
        "BEGIN:VCARD".to_string(),
        "VERSION:3.0".to_string(),
        format!("FN:{}", contact.name),
        format!("ORG:{}", contact.organization),
        format!("TEL:{}", contact.phone),
        format!("EMAIL:{}", contact.email),
        format!("URL:{}", contact.url),
        "END:VCARD".to_string(),
      ]
      .join("\n"),
      QrContent::Payment(text) | QrContent::Text(text) => text.clone(),
    }
  }
}

// `scheme://` where scheme is a letter followed by letters, digits, `+`, `-` or `.`.
fn has_scheme(url: &str) -> bool {
  let Some((scheme, _)) = url.split_once("://") else {
    return false;
  };
  let mut chars = scheme.chars();
  matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
    && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

// "2024-05-01T09:30" -> "20240501T093000Z". No timezone conversion happens:
// the trailing "00Z" is appended to whatever local time was entered.
fn compact_datetime(value: &str) -> String {
  let mut compact: String = value.chars().filter(|c| *c != '-' && *c != ':').collect();
  compact.push_str("00Z");
  compact
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn wifi_payload_is_exact() {
    let wifi = QrContent::Wifi(WifiContent {
      ssid: "Cafe".to_string(),
      password: "brew123".to_string(),
      security: WifiSecurity::Wpa,
      hidden: false,
    });
    assert_eq!(wifi.payload(), "WIFI:T:WPA;S:Cafe;P:brew123;H:false;;");
  }

  #[test]
  fn geo_coordinates_and_address() {
    assert_eq!(QrContent::Geo("40.7128, -74.0060".into()).payload(), "geo:40.7128,-74.0060");
    assert_eq!(QrContent::Geo("123 Main St".into()).payload(), "geo:0,0?q=123%20Main%20St");
  }

  #[test]
  fn url_gets_https_only_without_scheme() {
    assert_eq!(QrContent::Url("bobabble.app".into()).payload(), "https://bobabble.app");
    assert_eq!(QrContent::Url("http://x.test/a".into()).payload(), "http://x.test/a");
    assert_eq!(QrContent::Url("ftp://files.test".into()).payload(), "ftp://files.test");
  }

  #[test]
  fn email_and_sms_encode_like_uri_components() {
    let email = QrContent::Email(EmailContent {
      address: "hi@bobabble.app".into(),
      subject: Some("Order #12 (pickup) & more!".into()),
    });
    assert_eq!(
      email.payload(),
      "mailto:hi@bobabble.app?subject=Order%20%2312%20(pickup)%20%26%20more!"
    );

    let plain = QrContent::Email(EmailContent {
      address: "hi@bobabble.app".into(),
      subject: None,
    });
    assert_eq!(plain.payload(), "mailto:hi@bobabble.app");

    let sms = QrContent::Sms(SmsContent {
      number: "+15550100".into(),
      body: Some("Ready? ☕".into()),
    });
    assert_eq!(sms.payload(), "sms:+15550100?body=Ready%3F%20%E2%98%95");
  }

  #[test]
  fn event_dates_are_compacted_naively() {
    let event = QrContent::Event(EventContent {
      title: "Tasting".into(),
      description: "New menu".into(),
      location: "Shop".into(),
      start: "2024-05-01T09:30".into(),
      end: "2024-05-01T11:00".into(),
    });
    assert_eq!(
      event.payload(),
      "BEGIN:VEVENT\nSUMMARY:Tasting\nDESCRIPTION:New menu\nLOCATION:Shop\nDTSTART:20240501T093000Z\nDTEND:20240501T110000Z\nEND:VEVENT"
    );
  }

  #[test]
  fn contact_is_vcard_3() {
    let card = QrContent::Contact(ContactContent {
      name: "Bo Bubble".into(),
      organization: "Bobabble".into(),
      phone: "555-0100".into(),
      email: "bo@bobabble.app".into(),
      url: "https://bobabble.app".into(),
    })
    .payload();
    let lines: Vec<&str> = card.lines().collect();
    assert_eq!(lines.first(), Some(&"BEGIN:VCARD"));
    assert_eq!(lines.get(1), Some(&"VERSION:3.0"));
    assert!(lines.contains(&"FN:Bo Bubble"));
    assert!(lines.contains(&"ORG:Bobabble"));
    assert_eq!(lines.last(), Some(&"END:VCARD"));
  }

  #[test]
  fn phone_payment_text_pass_through() {
    assert_eq!(QrContent::Phone("555-0100".into()).payload(), "tel:555-0100");
    assert_eq!(QrContent::Payment("bitcoin:abc?amount=1".into()).payload(), "bitcoin:abc?amount=1");
    assert_eq!(QrContent::Text("ord-1".into()).payload(), "ord-1");
  }

  #[test]
  fn deserializes_from_tagged_json() {
    let content: QrContent = serde_json::from_str(r#"{"type":"wifi","value":{"ssid":"Cafe","security":"nopass"}}"#).unwrap();
    assert_eq!(content.payload(), "WIFI:T:nopass;S:Cafe;P:;H:false;;");
  }
}
