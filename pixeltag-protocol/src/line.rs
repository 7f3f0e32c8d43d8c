//! Line assembly for the serial bridge
//!
//! The BLE bridge forwards each characteristic write as raw bytes followed
//! by a line terminator. `LineAssembler` turns that byte stream back into
//! whole tokens.

use heapless::{String, Vec};

use crate::command::{INFO_PREFIX, QR_PREFIX};

/// Longest accepted token in bytes
///
/// Large enough for the info prefix plus 150 characters of text in which
/// every line break is still escaped.
pub const MAX_TOKEN_LEN: usize = 320;

/// Errors raised while assembling a token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineError {
    /// Line exceeded `MAX_TOKEN_LEN` and was discarded
    ///
    /// Reported at the line's terminator. `data_write` is set when the line
    /// started with a data prefix, so the write can still be rejected
    /// visibly.
    Overflow { data_write: bool },
    /// Token was not valid UTF-8
    InvalidUtf8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineState {
    /// Accumulating bytes
    Collecting,
    /// Dropping bytes until the next terminator
    Discarding { data_write: bool },
}

/// Byte-at-a-time token assembler
#[derive(Debug, Clone)]
pub struct LineAssembler {
    state: LineState,
    buffer: Vec<u8, MAX_TOKEN_LEN>,
}

impl Default for LineAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl LineAssembler {
    pub fn new() -> Self {
        Self {
            state: LineState::Collecting,
            buffer: Vec::new(),
        }
    }

    /// Drop any partial token
    pub fn reset(&mut self) {
        self.state = LineState::Collecting;
        self.buffer.clear();
    }

    /// Feed a single byte
    ///
    /// Returns `Ok(Some(token))` when a terminator completes a non-empty
    /// token. Both `\n` and `\r` terminate, so CRLF senders produce one
    /// token and an ignored empty line.
    pub fn feed(&mut self, byte: u8) -> Result<Option<String<MAX_TOKEN_LEN>>, LineError> {
        let terminator = byte == b'\n' || byte == b'\r';

        match self.state {
            LineState::Discarding { data_write } => {
                if terminator {
                    self.reset();
                    return Err(LineError::Overflow { data_write });
                }
                Ok(None)
            }
            LineState::Collecting if terminator => {
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                let bytes = core::mem::take(&mut self.buffer);
                match String::from_utf8(bytes) {
                    Ok(token) => Ok(Some(token)),
                    Err(_) => Err(LineError::InvalidUtf8),
                }
            }
            LineState::Collecting => {
                if self.buffer.push(byte).is_err() {
                    let head = self.buffer.trim_ascii_start();
                    let data_write = head.starts_with(INFO_PREFIX.as_bytes())
                        || head.starts_with(QR_PREFIX.as_bytes());
                    self.buffer.clear();
                    self.state = LineState::Discarding { data_write };
                }
                Ok(None)
            }
        }
    }
}
