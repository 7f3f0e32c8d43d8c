//! Read-only mirror fields
//!
//! A connected app can read back what the badge shows. Fields are derived
//! on demand from the stored texts; nothing here is persisted.

use core::fmt::Write;

use heapless::String;

/// Longest mirror response line
pub const MAX_RESPONSE_LEN: usize = 180;

/// Mirror fields exposed over the link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MirrorField {
    /// First info line
    Name,
    /// Second info line
    Title,
    /// Remaining info lines
    Contact,
    /// QR payload
    QrUrl,
    /// Battery percentage
    BatteryLevel,
}

impl MirrorField {
    /// Look up a field by its query name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        const NAMES: [(&str, MirrorField); 5] = [
            ("name", MirrorField::Name),
            ("title", MirrorField::Title),
            ("contact", MirrorField::Contact),
            ("qr", MirrorField::QrUrl),
            ("battery", MirrorField::BatteryLevel),
        ];
        NAMES
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|&(_, field)| field)
    }

    /// Query name of this field
    pub fn name(self) -> &'static str {
        match self {
            MirrorField::Name => "name",
            MirrorField::Title => "title",
            MirrorField::Contact => "contact",
            MirrorField::QrUrl => "qr",
            MirrorField::BatteryLevel => "battery",
        }
    }

    /// Extract a text field from the info text
    ///
    /// Returns `None` for fields that do not come from the info text.
    pub fn extract(self, info: &str) -> Option<&str> {
        let mut parts = info.splitn(3, '\n');
        let name = parts.next().unwrap_or("");
        let title = parts.next().unwrap_or("");
        let contact = parts.next().unwrap_or("");
        match self {
            MirrorField::Name => Some(name.trim_end_matches('\r')),
            MirrorField::Title => Some(title.trim_end_matches('\r')),
            MirrorField::Contact => Some(contact),
            MirrorField::QrUrl | MirrorField::BatteryLevel => None,
        }
    }
}

/// Format a mirror response line: `<field>:<value>\n`
///
/// Values longer than the response buffer are cut at a character boundary.
pub fn format_response(field: MirrorField, value: &str) -> String<MAX_RESPONSE_LEN> {
    let mut out = String::new();
    let _ = out.push_str(field.name());
    let _ = out.push(':');
    let room = MAX_RESPONSE_LEN - out.len() - 1;
    let mut end = value.len().min(room);
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    let _ = out.push_str(&value[..end]);
    let _ = out.push('\n');
    out
}

/// Format a battery response line: `battery:<percent>\n`
pub fn format_battery(percent: u8) -> String<MAX_RESPONSE_LEN> {
    let mut out = String::new();
    let _ = writeln!(out, "{}:{}", MirrorField::BatteryLevel.name(), percent);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(MirrorField::from_name("NAME"), Some(MirrorField::Name));
        assert_eq!(MirrorField::from_name("qr"), Some(MirrorField::QrUrl));
        assert_eq!(MirrorField::from_name("url"), None);
    }

    #[test]
    fn test_info_lines() {
        let info = "Ada Lovelace\nEngineer\nada@example.com\n+44 1234";
        assert_eq!(MirrorField::Name.extract(info), Some("Ada Lovelace"));
        assert_eq!(MirrorField::Title.extract(info), Some("Engineer"));
        assert_eq!(
            MirrorField::Contact.extract(info),
            Some("ada@example.com\n+44 1234")
        );
        assert_eq!(MirrorField::QrUrl.extract(info), None);
    }

    #[test]
    fn test_short_info() {
        assert_eq!(MirrorField::Name.extract("Solo"), Some("Solo"));
        assert_eq!(MirrorField::Title.extract("Solo"), Some(""));
        assert_eq!(MirrorField::Contact.extract(""), Some(""));
    }

    #[test]
    fn test_format_response() {
        let line = format_response(MirrorField::QrUrl, "https://example.com/a");
        assert_eq!(line.as_str(), "qr:https://example.com/a\n");
        assert_eq!(format_battery(87).as_str(), "battery:87\n");
    }

    #[test]
    fn test_format_response_truncates() {
        let mut long: String<400> = String::new();
        while long.push('é').is_ok() {}
        let line = format_response(MirrorField::Contact, &long);
        assert!(line.len() <= MAX_RESPONSE_LEN);
        assert!(line.ends_with('\n'));
    }
}
