//! In-memory payload and mode state

use heapless::String;
use pixeltag_hal::{KeyValueStore, StorageKey};

use super::mode::DisplayMode;
use super::persist::{self, PersistError, PersistedState};
use crate::config::{MAX_INFO_LEN, MAX_QR_LEN};

/// Content validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ContentError {
    /// Text exceeds the field's limit; nothing was changed
    TooLong,
}

/// Keys with changes not yet written to storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
struct Unsaved {
    mode: bool,
    info: bool,
    qr: bool,
}

impl Unsaved {
    fn any(&self) -> bool {
        self.mode || self.info || self.qr
    }
}

/// Payloads, mode and dirty tracking
///
/// `current` is the mode the panel actually shows. `requested` is the most
/// recent mode asked for; the controller reconciles the two.
#[derive(Debug, Clone)]
pub struct ContentStore {
    info: String<MAX_INFO_LEN>,
    qr: String<MAX_QR_LEN>,
    info_dirty: bool,
    qr_dirty: bool,
    current: DisplayMode,
    requested: DisplayMode,
    unsaved: Unsaved,
}

impl Default for ContentStore {
    fn default() -> Self {
        Self::from_persisted(PersistedState::default())
    }
}

impl ContentStore {
    /// Seed the store from restored state
    pub fn from_persisted(state: PersistedState) -> Self {
        Self {
            info: state.info,
            qr: state.qr,
            info_dirty: false,
            qr_dirty: false,
            current: state.mode,
            requested: state.mode,
            unsaved: Unsaved::default(),
        }
    }

    pub fn info(&self) -> &str {
        &self.info
    }

    pub fn qr(&self) -> &str {
        &self.qr
    }

    pub fn current_mode(&self) -> DisplayMode {
        self.current
    }

    pub fn requested_mode(&self) -> DisplayMode {
        self.requested
    }

    /// Replace the info text
    ///
    /// Returns `Ok(true)` if the text changed, `Ok(false)` if it was equal.
    pub fn set_info(&mut self, text: &str) -> Result<bool, ContentError> {
        if text.len() > MAX_INFO_LEN {
            return Err(ContentError::TooLong);
        }
        if self.info.as_str() == text {
            return Ok(false);
        }
        self.info.clear();
        self.info.push_str(text).map_err(|_| ContentError::TooLong)?;
        self.info_dirty = true;
        self.unsaved.info = true;
        Ok(true)
    }

    /// Replace the QR payload
    ///
    /// Returns `Ok(true)` if the text changed, `Ok(false)` if it was equal.
    pub fn set_qr(&mut self, text: &str) -> Result<bool, ContentError> {
        if text.len() > MAX_QR_LEN {
            return Err(ContentError::TooLong);
        }
        if self.qr.as_str() == text {
            return Ok(false);
        }
        self.qr.clear();
        self.qr.push_str(text).map_err(|_| ContentError::TooLong)?;
        self.qr_dirty = true;
        self.unsaved.qr = true;
        Ok(true)
    }

    /// Record a requested mode
    pub fn set_mode(&mut self, requested: DisplayMode) {
        self.requested = requested;
    }

    /// Request a blank panel and drop unrendered payload changes
    ///
    /// The texts themselves are kept so a later mode switch can show them.
    pub fn clear_all(&mut self) {
        self.requested = DisplayMode::Blank;
        self.info_dirty = false;
        self.qr_dirty = false;
    }

    /// Forget the pending request
    pub fn revert_request(&mut self) {
        self.requested = self.current;
    }

    /// True if the payload behind `mode` changed since it was last drawn
    pub fn is_dirty(&self, mode: DisplayMode) -> bool {
        match mode {
            DisplayMode::Info => self.info_dirty,
            DisplayMode::Qr => self.qr_dirty,
            DisplayMode::Status | DisplayMode::Blank => false,
        }
    }

    /// Mark `mode` as shown on the panel
    ///
    /// Consumes the matching dirty flag and schedules a mode write when a
    /// persistent mode changed.
    pub fn confirm_mode(&mut self, mode: DisplayMode) {
        match mode {
            DisplayMode::Info => self.info_dirty = false,
            DisplayMode::Qr => self.qr_dirty = false,
            DisplayMode::Status | DisplayMode::Blank => {}
        }
        if mode != self.current && mode.is_persistent() {
            self.unsaved.mode = true;
        }
        self.current = mode;
        self.requested = mode;
    }

    /// True if a storage write is pending
    pub fn has_unsaved(&self) -> bool {
        self.unsaved.any()
    }

    /// Write pending changes
    ///
    /// Pending flags are consumed whether or not the writes succeed; a
    /// failed write is retried by the next change to the same key. The
    /// first error is returned after all keys were attempted.
    pub fn flush<S: KeyValueStore>(&mut self, storage: &mut S) -> Result<(), PersistError> {
        let pending = core::mem::take(&mut self.unsaved);
        let mut result = Ok(());

        if pending.mode {
            // A status screen is never stored; keep whatever was below it
            if self.current.is_persistent() {
                result = result.and(persist::save_mode(storage, self.current));
            }
        }
        if pending.info {
            result = result.and(persist::save_text(storage, StorageKey::InfoText, &self.info));
        }
        if pending.qr {
            result = result.and(persist::save_text(storage, StorageKey::QrText, &self.qr));
        }

        result
    }
}
