//! Inbound command tokens

use heapless::String;

use crate::mirror::MirrorField;

/// Prefix of an info text data token
pub const INFO_PREFIX: &str = "data:personal:";

/// Prefix of a QR payload data token
pub const QR_PREFIX: &str = "data:qr:";

/// Prefix of a mirror query token
pub const QUERY_PREFIX: &str = "read:";

/// A parsed wireless token
///
/// Payloads borrow from the received token; nothing is copied until the
/// reducer accepts the change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command<'a> {
    /// Blank the panel
    Clear,
    /// Switch to the info screen
    ShowInfo,
    /// Switch to the QR screen
    ShowQr,
    /// New info text, still carrying literal `\n` escapes
    InfoData(&'a str),
    /// New QR payload
    QrData(&'a str),
    /// Read-only mirror query
    Query(MirrorField),
}

impl<'a> Command<'a> {
    /// Parse a token
    ///
    /// Surrounding whitespace (including the line terminator) is stripped.
    /// Returns `None` for unrecognized tokens.
    pub fn parse(token: &'a str) -> Option<Self> {
        let token = token.trim();

        if let Some(payload) = token.strip_prefix(INFO_PREFIX) {
            return Some(Command::InfoData(payload));
        }
        if let Some(payload) = token.strip_prefix(QR_PREFIX) {
            return Some(Command::QrData(payload));
        }

        if token.eq_ignore_ascii_case("clear") || token.eq_ignore_ascii_case("command:clear") {
            return Some(Command::Clear);
        }
        if token.eq_ignore_ascii_case("display:info") {
            return Some(Command::ShowInfo);
        }
        if token.eq_ignore_ascii_case("display:qr") {
            return Some(Command::ShowQr);
        }

        if token.len() > QUERY_PREFIX.len()
            && token.is_char_boundary(QUERY_PREFIX.len())
            && token[..QUERY_PREFIX.len()].eq_ignore_ascii_case(QUERY_PREFIX)
        {
            return MirrorField::from_name(&token[QUERY_PREFIX.len()..]).map(Command::Query);
        }

        None
    }
}

/// Decoded text exceeds its buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TooLong;

/// Translate literal `\n` escape sequences into line breaks
///
/// Fails without a partial result when the decoded text does not fit in `N`
/// bytes.
pub fn unescape_newlines<const N: usize>(raw: &str) -> Result<String<N>, TooLong> {
    let mut out = String::new();
    let mut rest = raw;
    while let Some(pos) = rest.find("\\n") {
        out.push_str(&rest[..pos]).map_err(|_| TooLong)?;
        out.push('\n').map_err(|_| TooLong)?;
        rest = &rest[pos + 2..];
    }
    out.push_str(rest).map_err(|_| TooLong)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_control_tokens_case_insensitive() {
        assert_eq!(Command::parse("clear"), Some(Command::Clear));
        assert_eq!(Command::parse("COMMAND:CLEAR"), Some(Command::Clear));
        assert_eq!(Command::parse("Display:Info"), Some(Command::ShowInfo));
        assert_eq!(Command::parse("display:QR"), Some(Command::ShowQr));
    }

    #[test]
    fn test_data_tokens() {
        assert_eq!(
            Command::parse("data:personal:Ada\\nEngineer"),
            Some(Command::InfoData("Ada\\nEngineer"))
        );
        assert_eq!(
            Command::parse("data:qr:https://example.com/a\r\n"),
            Some(Command::QrData("https://example.com/a"))
        );
        assert_eq!(Command::parse("data:qr:"), Some(Command::QrData("")));
    }

    #[test]
    fn test_query_tokens() {
        assert_eq!(
            Command::parse("read:name"),
            Some(Command::Query(MirrorField::Name))
        );
        assert_eq!(
            Command::parse("READ:battery"),
            Some(Command::Query(MirrorField::BatteryLevel))
        );
        assert_eq!(Command::parse("read:"), None);
        assert_eq!(Command::parse("read:shoe-size"), None);
    }

    #[test]
    fn test_unknown_tokens_ignored() {
        assert_eq!(Command::parse(""), None);
        assert_eq!(Command::parse("display:status"), None);
        assert_eq!(Command::parse("hello"), None);
        assert_eq!(Command::parse("data:other:x"), None);
    }

    #[test]
    fn test_unescape_newlines() {
        let text: String<32> = unescape_newlines("Ada\\nEngineer\\n\\nx").unwrap();
        assert_eq!(text.as_str(), "Ada\nEngineer\n\nx");
    }

    #[test]
    fn test_unescape_counts_decoded_length() {
        // 6 raw bytes decode to 4
        assert!(unescape_newlines::<4>("a\\nb\\n").is_ok());
        assert!(unescape_newlines::<3>("a\\nb\\n").is_err());
    }

    #[test]
    fn test_unescape_multibyte() {
        let text: String<16> = unescape_newlines("Zoë\\nß").unwrap();
        assert_eq!(text.as_str(), "Zoë\nß");
    }

    proptest! {
        #[test]
        fn test_qr_payload_verbatim(payload in "[!-~]([ -~]{0,80}[!-~])?") {
            let token = std::format!("{}{}", QR_PREFIX, payload);
            prop_assert_eq!(Command::parse(&token), Some(Command::QrData(payload.as_str())));
        }

        #[test]
        fn test_unescape_has_no_escapes_left(raw in "([a-z ]{0,8}(\\\\n)?){0,8}") {
            let text: String<128> = unescape_newlines(&raw).unwrap();
            prop_assert!(!text.contains("\\n"));
            prop_assert_eq!(text.matches('\n').count(), raw.matches("\\n").count());
        }
    }
}
