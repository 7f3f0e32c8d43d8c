//! Persisted badge state
//!
//! Three keys are stored independently, each postcard encoded: the last
//! confirmed mode and the two texts. A missing key falls back to its own
//! default. If storage cannot be opened at all the badge starts with a
//! hint telling the owner how to send data.

use heapless::String;
use pixeltag_hal::{FlashError, KeyValueStore, StorageKey};

use super::mode::DisplayMode;
use crate::config::{MAX_INFO_LEN, MAX_QR_LEN};

/// Info text when storage opens but holds no info yet
pub const DEFAULT_INFO: &str = "Default Name\nDefault Title";

/// Info text when storage cannot be opened
pub const UNAVAILABLE_INFO: &str = "No Info Received Yet.\nUse BLE to send data.";

/// Scratch size for one encoded value
const VALUE_BUFFER_SIZE: usize = 192;

/// Errors from persisting state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PersistError {
    /// Serialization failed
    Encode,
    /// Storage write failed
    Storage(FlashError),
}

impl From<FlashError> for PersistError {
    fn from(e: FlashError) -> Self {
        PersistError::Storage(e)
    }
}

impl From<postcard::Error> for PersistError {
    fn from(_: postcard::Error) -> Self {
        PersistError::Encode
    }
}

/// Everything restored at boot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedState {
    pub mode: DisplayMode,
    pub info: String<MAX_INFO_LEN>,
    pub qr: String<MAX_QR_LEN>,
}

impl Default for PersistedState {
    fn default() -> Self {
        Self {
            mode: DisplayMode::Info,
            info: text_or_empty(DEFAULT_INFO),
            qr: String::new(),
        }
    }
}

impl PersistedState {
    /// State used when storage could not be opened
    pub fn unavailable() -> Self {
        Self {
            info: text_or_empty(UNAVAILABLE_INFO),
            ..Self::default()
        }
    }
}

fn text_or_empty<const N: usize>(text: &str) -> String<N> {
    String::try_from(text).unwrap_or_default()
}

/// Outcome of reading one key
enum Fetched<T> {
    Value(T),
    Missing,
    Unavailable,
}

fn fetch_mode<S: KeyValueStore>(storage: &mut S) -> Fetched<DisplayMode> {
    let mut buf = [0u8; VALUE_BUFFER_SIZE];
    match storage.read(StorageKey::DisplayMode, &mut buf) {
        Ok(len) => match postcard::from_bytes::<DisplayMode>(&buf[..len]) {
            Ok(DisplayMode::Status) => Fetched::Value(DisplayMode::Info),
            Ok(mode) => Fetched::Value(mode),
            Err(_) => {
                warn!("Stored mode corrupted, using default");
                Fetched::Missing
            }
        },
        Err(FlashError::Unavailable) => Fetched::Unavailable,
        Err(FlashError::NotFound) => Fetched::Missing,
        Err(e) => {
            warn!("Failed to read mode: {}", e);
            Fetched::Missing
        }
    }
}

fn fetch_text<S: KeyValueStore, const N: usize>(
    storage: &mut S,
    key: StorageKey,
) -> Fetched<String<N>> {
    let mut buf = [0u8; VALUE_BUFFER_SIZE];
    match storage.read(key, &mut buf) {
        Ok(len) => match postcard::from_bytes::<&str>(&buf[..len]) {
            Ok(text) => match String::try_from(text) {
                Ok(text) => Fetched::Value(text),
                Err(_) => {
                    warn!("Stored {} too long, using default", key);
                    Fetched::Missing
                }
            },
            Err(_) => {
                warn!("Stored {} corrupted, using default", key);
                Fetched::Missing
            }
        },
        Err(FlashError::Unavailable) => Fetched::Unavailable,
        Err(FlashError::NotFound) => Fetched::Missing,
        Err(e) => {
            warn!("Failed to read {}: {}", key, e);
            Fetched::Missing
        }
    }
}

/// Restore state, falling back to defaults per key
pub fn load<S: KeyValueStore>(storage: &mut S) -> PersistedState {
    let defaults = PersistedState::default();

    let mode = match fetch_mode(storage) {
        Fetched::Value(mode) => mode,
        Fetched::Missing => defaults.mode,
        Fetched::Unavailable => {
            warn!("Storage unavailable, using defaults");
            return PersistedState::unavailable();
        }
    };
    let info = match fetch_text(storage, StorageKey::InfoText) {
        Fetched::Value(info) => info,
        Fetched::Missing => defaults.info,
        Fetched::Unavailable => return PersistedState::unavailable(),
    };
    let qr = match fetch_text(storage, StorageKey::QrText) {
        Fetched::Value(qr) => qr,
        Fetched::Missing => defaults.qr,
        Fetched::Unavailable => return PersistedState::unavailable(),
    };

    info!("Restored state: mode={}", mode);
    PersistedState { mode, info, qr }
}

/// Store the display mode
pub fn save_mode<S: KeyValueStore>(storage: &mut S, mode: DisplayMode) -> Result<(), PersistError> {
    let mut buf = [0u8; VALUE_BUFFER_SIZE];
    let bytes = postcard::to_slice(&mode, &mut buf)?;
    match storage.write(StorageKey::DisplayMode, bytes) {
        Ok(()) => {
            debug!("Saved mode {}", mode);
            Ok(())
        }
        Err(e) => {
            warn!("Failed to save mode: {}", e);
            Err(e.into())
        }
    }
}

/// Store one of the texts
pub fn save_text<S: KeyValueStore>(
    storage: &mut S,
    key: StorageKey,
    text: &str,
) -> Result<(), PersistError> {
    let mut buf = [0u8; VALUE_BUFFER_SIZE];
    let bytes = postcard::to_slice(text, &mut buf)?;
    match storage.write(key, bytes) {
        Ok(()) => {
            debug!("Saved {} ({} bytes)", key, bytes.len());
            Ok(())
        }
        Err(e) => {
            warn!("Failed to save {}: {}", key, e);
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MemoryStore;

    #[test]
    fn test_empty_storage_defaults() {
        let mut mem = MemoryStore::new();
        let state = load(&mut mem);
        assert_eq!(state.mode, DisplayMode::Info);
        assert_eq!(state.info.as_str(), "Default Name\nDefault Title");
        assert_eq!(state.qr.as_str(), "");
    }

    #[test]
    fn test_unavailable_storage_defaults() {
        let mut mem = MemoryStore::unavailable();
        let state = load(&mut mem);
        assert_eq!(state.mode, DisplayMode::Info);
        assert_eq!(state.info.as_str(), UNAVAILABLE_INFO);
        assert_eq!(state.qr.as_str(), "");
    }

    /// Store whose flash cannot be read, reported the way the flash driver does
    struct UnreadableFlash;

    impl KeyValueStore for UnreadableFlash {
        fn read(&mut self, _key: StorageKey, _buffer: &mut [u8]) -> Result<usize, FlashError> {
            Err(FlashError::from_fetch(sequential_storage::Error::Storage { value: () }))
        }

        fn write(&mut self, _key: StorageKey, _data: &[u8]) -> Result<(), FlashError> {
            Err(FlashError::from_store(sequential_storage::Error::Storage { value: () }))
        }
    }

    #[test]
    fn test_unreadable_flash_falls_back_to_unavailable_defaults() {
        let state = load(&mut UnreadableFlash);
        assert_eq!(state.mode, DisplayMode::Info);
        assert_eq!(state.info.as_str(), UNAVAILABLE_INFO);
        assert_eq!(state.qr.as_str(), "");
    }

    #[test]
    fn test_roundtrip_verbatim() {
        let mut mem = MemoryStore::new();
        save_mode(&mut mem, DisplayMode::Qr).unwrap();
        save_text(&mut mem, StorageKey::InfoText, "Ada\n\nEngineer ").unwrap();
        save_text(&mut mem, StorageKey::QrText, "https://example.com/a").unwrap();

        let state = load(&mut mem);
        assert_eq!(state.mode, DisplayMode::Qr);
        assert_eq!(state.info.as_str(), "Ada\n\nEngineer ");
        assert_eq!(state.qr.as_str(), "https://example.com/a");
    }

    #[test]
    fn test_missing_key_uses_own_default() {
        let mut mem = MemoryStore::new();
        save_text(&mut mem, StorageKey::QrText, "x").unwrap();
        let state = load(&mut mem);
        assert_eq!(state.info.as_str(), DEFAULT_INFO);
        assert_eq!(state.qr.as_str(), "x");
        assert_eq!(state.mode, DisplayMode::Info);
    }

    #[test]
    fn test_corrupted_value_uses_default() {
        let mut mem = MemoryStore::new();
        mem.write(StorageKey::DisplayMode, &[0xFF, 0xFF]).unwrap();
        let state = load(&mut mem);
        assert_eq!(state.mode, DisplayMode::Info);
    }

    #[test]
    fn test_save_error_surfaces() {
        let mut mem = MemoryStore::new();
        mem.fail_writes(true);
        assert_eq!(
            save_mode(&mut mem, DisplayMode::Blank),
            Err(PersistError::Storage(FlashError::Flash))
        );
    }
}
