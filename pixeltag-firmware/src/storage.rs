//! Blocking adapter over the async flash store
//!
//! The badge controller persists synchronously from its tick; flash
//! operations are short and bounded, so they are driven to completion
//! in place.

use embassy_futures::block_on;
use pixeltag_hal::{FlashError, FlashStorage, KeyValueStore, StorageKey};

/// `KeyValueStore` over any `FlashStorage`
pub struct BlockingStore<F> {
    flash: F,
}

impl<F: FlashStorage> BlockingStore<F> {
    pub fn new(flash: F) -> Self {
        Self { flash }
    }
}

impl<F: FlashStorage> KeyValueStore for BlockingStore<F> {
    fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, FlashError> {
        block_on(self.flash.read(key, buffer))
    }

    fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), FlashError> {
        block_on(self.flash.write(key, data))
    }
}
