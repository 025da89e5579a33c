//! Persistent key/value storage.
//!
//! Keys are short strings: `mode`, `ble_idx` and `bt_host_<n>`. Integers are stored
//! as 4 little endian bytes, host records are postcard encoded.

#[cfg(feature = "storage")]
mod flash;
mod memory;

use core::fmt::Write;
use core::future::Future;

#[cfg(feature = "storage")]
pub use flash::FlashStore;
use heapless::String;
pub use memory::MemoryStore;

/// Key of the persisted transport mode
pub const MODE_KEY: &str = "mode";
/// Key of the active BLE host slot
pub const BLE_IDX_KEY: &str = "ble_idx";
/// Prefix of the host slot records, followed by the slot number
pub const HOST_KEY_PREFIX: &str = "bt_host_";
/// Longest key the store has to handle
pub const MAX_KEY_LEN: usize = 16;
/// Largest value the store has to handle
pub const MAX_VALUE_SIZE: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// The key has never been written or was deleted
    NotFound,
    /// The stored bytes can't be decoded
    Corrupted,
    /// The value doesn't fit into the given buffer
    BufferTooSmall,
    /// No room left for the value
    Full,
    /// The key is not one the store knows how to persist
    UnknownKey,
    /// The underlying flash failed
    Flash,
}

/// Persistent key/value store.
///
/// Writes are durable once the returned future resolves with `Ok`.
pub trait Store {
    /// Read the value of `key` into `buf`, returns the value length or `None` if the key is missing
    fn get(&mut self, key: &str, buf: &mut [u8]) -> impl Future<Output = Result<Option<usize>, StoreError>>;

    fn set(&mut self, key: &str, value: &[u8]) -> impl Future<Output = Result<(), StoreError>>;

    /// Remove `key`, removing a missing key is not an error
    fn delete(&mut self, key: &str) -> impl Future<Output = Result<(), StoreError>>;
}

/// Key of the record of host slot `index`
pub fn host_key(index: u8) -> String<MAX_KEY_LEN> {
    let mut key = String::new();
    // "bt_host_" + at most 3 digits always fits
    let _ = write!(key, "{}{}", HOST_KEY_PREFIX, index);
    key
}

pub async fn read_i32<S: Store>(store: &mut S, key: &str) -> Result<Option<i32>, StoreError> {
    let mut buf = [0u8; 4];
    match store.get(key, &mut buf).await {
        Ok(Some(4)) => Ok(Some(i32::from_le_bytes(buf))),
        Ok(Some(_)) => Err(StoreError::Corrupted),
        Ok(None) => Ok(None),
        // A value longer than 4 bytes is not an i32
        Err(StoreError::BufferTooSmall) => Err(StoreError::Corrupted),
        Err(e) => Err(e),
    }
}

pub async fn write_i32<S: Store>(store: &mut S, key: &str, value: i32) -> Result<(), StoreError> {
    store.set(key, &value.to_le_bytes()).await
}
