//! Flash storage abstractions
//!
//! Provides traits for persistent key-value storage that can be implemented
//! by chip-specific HALs using their flash memory.

/// Storage keys for badge data
///
/// Together these keys form the badge's storage namespace. Each value is
/// read and written independently so that a text update never rewrites the
/// other fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum StorageKey {
    /// Last confirmed display mode (postcard encoded)
    DisplayMode = 0,
    /// Personal info text (postcard encoded)
    InfoText = 1,
    /// QR payload text (postcard encoded)
    QrText = 2,
}

impl StorageKey {
    /// All keys in the badge namespace
    pub const ALL: [StorageKey; 3] = [
        StorageKey::DisplayMode,
        StorageKey::InfoText,
        StorageKey::QrText,
    ];

    /// Get the key as a byte value
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Create a key from a byte value
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(StorageKey::DisplayMode),
            1 => Some(StorageKey::InfoText),
            2 => Some(StorageKey::QrText),
            _ => None,
        }
    }
}

/// Errors from flash storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashError {
    /// Storage could not be opened (partition missing or not initialized)
    Unavailable,
    /// Flash operation failed
    Flash,
    /// Storage operation failed
    Storage,
    /// Key not found
    NotFound,
    /// Buffer too small for the data
    BufferTooSmall,
    /// Data corrupted or invalid
    Corrupted,
    /// Storage is full
    Full,
}

/// Flash storage trait
///
/// Provides wear-leveled key-value storage for badge data.
/// Implementations should handle:
/// - Wear leveling across flash sectors
/// - Data integrity (CRC or similar)
/// - Atomic writes where possible
pub trait FlashStorage {
    /// Read a value by key into the provided buffer
    ///
    /// # Returns
    /// The number of bytes read, or an error.
    fn read(
        &mut self,
        key: StorageKey,
        buffer: &mut [u8],
    ) -> impl core::future::Future<Output = Result<usize, FlashError>>;

    /// Write a value by key
    fn write(
        &mut self,
        key: StorageKey,
        data: &[u8],
    ) -> impl core::future::Future<Output = Result<(), FlashError>>;

    /// Check if a key exists in storage
    fn exists(&mut self, key: StorageKey) -> impl core::future::Future<Output = bool>;

    /// Erase all stored data
    ///
    /// This erases the entire badge partition.
    fn erase_all(&mut self) -> impl core::future::Future<Output = Result<(), FlashError>>;
}

/// Blocking key-value store
///
/// The badge controller runs a single synchronous tick loop and treats a
/// storage access as one bounded, blocking step. Each call is a complete
/// open/access/close cycle; a failed open is reported as
/// [`FlashError::Unavailable`].
pub trait KeyValueStore {
    /// Read a value by key, returning the number of bytes copied
    fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, FlashError>;

    /// Write a value by key
    fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), FlashError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &mut T {
    fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, FlashError> {
        (**self).read(key, buffer)
    }

    fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), FlashError> {
        (**self).write(key, data)
    }
}

// Implement the sequential-storage Key trait when the feature is enabled
#[cfg(feature = "sequential-storage")]
impl sequential_storage::map::Key for StorageKey {
    fn serialize_into(
        &self,
        buffer: &mut [u8],
    ) -> Result<usize, sequential_storage::map::SerializationError> {
        if buffer.is_empty() {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        }
        buffer[0] = self.as_u8();
        Ok(1)
    }

    fn deserialize_from(
        buffer: &[u8],
    ) -> Result<(Self, usize), sequential_storage::map::SerializationError> {
        if buffer.is_empty() {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        }
        match StorageKey::from_u8(buffer[0]) {
            Some(key) => Ok((key, 1)),
            None => Err(sequential_storage::map::SerializationError::InvalidFormat),
        }
    }
}

#[cfg(feature = "sequential-storage")]
impl FlashError {
    /// Map an error from a sequential-storage fetch
    ///
    /// A fetch that cannot read the partition at all means the store could
    /// not be opened.
    pub fn from_fetch<E>(err: sequential_storage::Error<E>) -> Self {
        match err {
            sequential_storage::Error::Storage { .. } => FlashError::Unavailable,
            other => Self::from_store(other),
        }
    }

    /// Map an error from a sequential-storage store or erase
    pub fn from_store<E>(err: sequential_storage::Error<E>) -> Self {
        match err {
            sequential_storage::Error::Storage { .. } => FlashError::Flash,
            sequential_storage::Error::FullStorage => FlashError::Full,
            sequential_storage::Error::Corrupted { .. } => FlashError::Corrupted,
            _ => FlashError::Storage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "sequential-storage")]
    #[test]
    fn test_failed_fetch_is_unavailable() {
        let err = sequential_storage::Error::Storage { value: () };
        assert_eq!(FlashError::from_fetch(err), FlashError::Unavailable);
    }

    #[cfg(feature = "sequential-storage")]
    #[test]
    fn test_failed_store_is_flash_error() {
        let err = sequential_storage::Error::Storage { value: () };
        assert_eq!(FlashError::from_store(err), FlashError::Flash);
        assert_eq!(
            FlashError::from_store(sequential_storage::Error::<()>::FullStorage),
            FlashError::Full
        );
        assert_eq!(
            FlashError::from_fetch(sequential_storage::Error::<()>::FullStorage),
            FlashError::Full
        );
    }

    #[test]
    fn test_key_byte_roundtrip() {
        for key in StorageKey::ALL {
            assert_eq!(StorageKey::from_u8(key.as_u8()), Some(key));
        }
    }

    #[test]
    fn test_unknown_key_byte() {
        assert_eq!(StorageKey::from_u8(3), None);
        assert_eq!(StorageKey::from_u8(0xFF), None);
    }
}
