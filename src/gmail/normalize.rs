//! Conversion from the Gmail wire format into canonical `NewEmail` records.
//!
//! Everything here is pure. Malformed headers or bodies degrade to empty
//! strings rather than errors so a single odd message cannot abort a sync.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::DateTime;

use crate::gmail::{Message, MessagePayload};
use crate::models::NewEmail;

const PREVIEW_CHARS: usize = 200;

pub fn normalize(msg: &Message) -> NewEmail {
    let subject = header_value(&msg.payload, "Subject");
    let sender = header_value(&msg.payload, "From");
    let recipient = header_value(&msg.payload, "To");
    let date = header_value(&msg.payload, "Date");

    let (body_text, body_html) = extract_bodies(&msg.payload);
    let body_preview: String = body_text.chars().take(PREVIEW_CHARS).collect();

    NewEmail {
        gmail_message_id: msg.id.clone(),
        thread_id: msg.thread_id.clone(),
        subject,
        sender,
        recipient,
        body_preview,
        body_text,
        body_html,
        is_read: !msg.label_ids.iter().any(|l| l == "UNREAD"),
        is_starred: msg.label_ids.iter().any(|l| l == "STARRED"),
        is_important: msg.label_ids.iter().any(|l| l == "IMPORTANT"),
        labels: msg.label_ids.clone(),
        received_at: parse_received_at(&date, msg.internal_date.as_deref()),
    }
}

/// Case-sensitive exact header match; a missing header is an empty string.
fn header_value(payload: &MessagePayload, name: &str) -> String {
    payload
        .headers
        .iter()
        .find(|h| h.name == name)
        .map(|h| h.value.clone())
        .unwrap_or_default()
}

/// Single top-level payload decodes as plain text. Otherwise the flat parts
/// list is walked in order and the last text/plain and text/html parts win.
/// Nested multipart trees are not descended into (known limitation).
fn extract_bodies(payload: &MessagePayload) -> (String, String) {
    if let Some(data) = payload.body.as_ref().and_then(|b| b.data.as_deref()) {
        return (decode_base64url(data), String::new());
    }

    let mut body_text = String::new();
    let mut body_html = String::new();
    if let Some(parts) = &payload.parts {
        for part in parts {
            let Some(data) = part.body.as_ref().and_then(|b| b.data.as_deref()) else {
                continue;
            };
            match part.mime_type.as_str() {
                "text/plain" => body_text = decode_base64url(data),
                "text/html" => body_html = decode_base64url(data),
                _ => {}
            }
        }
    }
    (body_text, body_html)
}

/// Gmail body payloads use the URL-safe base64 alphabet, sometimes without
/// padding. Translate to the standard alphabet, re-pad, then decode; decode
/// failures yield an empty body.
pub fn decode_base64url(data: &str) -> String {
    let mut translated = data.replace('-', "+").replace('_', "/");
    while translated.len() % 4 != 0 {
        translated.push('=');
    }
    match STANDARD.decode(translated.as_bytes()) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(_) => String::new(),
    }
}

/// Date policy: RFC 2822 `Date` header first, then the provider's
/// `internalDate` (epoch millis), else None. A bad date never rejects the
/// message.
fn parse_received_at(date_header: &str, internal_date: Option<&str>) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc2822(date_header) {
        return Some(dt.timestamp());
    }
    internal_date
        .and_then(|ms| ms.parse::<i64>().ok())
        .map(|ms| ms / 1000)
}
