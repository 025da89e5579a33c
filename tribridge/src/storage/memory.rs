use heapless::{LinearMap, String, Vec};

use super::{MAX_KEY_LEN, MAX_VALUE_SIZE, Store, StoreError};

/// Number of keys a [`MemoryStore`] can hold
pub const MEMORY_STORE_CAPACITY: usize = 8;

/// RAM backed [`Store`].
///
/// Nothing survives a power cycle. Used on boards without a flash partition and in tests.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MemoryStore {
    entries: LinearMap<String<MAX_KEY_LEN>, Vec<u8, MAX_VALUE_SIZE>, MEMORY_STORE_CAPACITY>,
    read_only: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following `set` and `delete` fail, simulating a worn out flash
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.keys().any(|k| k.as_str() == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn owned_key(key: &str) -> Result<String<MAX_KEY_LEN>, StoreError> {
        String::try_from(key).map_err(|_| StoreError::UnknownKey)
    }
}

impl Store for MemoryStore {
    async fn get(&mut self, key: &str, buf: &mut [u8]) -> Result<Option<usize>, StoreError> {
        let key = Self::owned_key(key)?;
        match self.entries.get(&key) {
            Some(value) if value.len() > buf.len() => Err(StoreError::BufferTooSmall),
            Some(value) => {
                buf[..value.len()].copy_from_slice(value);
                Ok(Some(value.len()))
            }
            None => Ok(None),
        }
    }

    async fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        if self.read_only {
            return Err(StoreError::Flash);
        }
        let key = Self::owned_key(key)?;
        let value = Vec::from_slice(value).map_err(|_| StoreError::Full)?;
        self.entries.insert(key, value).map_err(|_| StoreError::Full)?;
        Ok(())
    }

    async fn delete(&mut self, key: &str) -> Result<(), StoreError> {
        if self.read_only {
            return Err(StoreError::Flash);
        }
        let key = Self::owned_key(key)?;
        self.entries.remove(&key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use embassy_futures::block_on;

    use super::*;

    #[test]
    fn test_set_get_delete() {
        block_on(async {
            let mut store = MemoryStore::new();
            let mut buf = [0u8; 4];
            assert_eq!(store.get("mode", &mut buf).await, Ok(None));

            store.set("mode", &[1, 0, 0, 0]).await.unwrap();
            assert_eq!(store.get("mode", &mut buf).await, Ok(Some(4)));
            assert_eq!(buf, [1, 0, 0, 0]);
            assert_eq!(store.get("mode", &mut [0u8; 2]).await, Err(StoreError::BufferTooSmall));

            store.delete("mode").await.unwrap();
            assert!(store.is_empty());
            // Deleting a missing key is fine
            store.delete("mode").await.unwrap();
        });
    }

    #[test]
    fn test_read_only_store_rejects_writes() {
        block_on(async {
            let mut store = MemoryStore::new();
            store.set("ble_idx", &[2, 0, 0, 0]).await.unwrap();
            store.set_read_only(true);
            assert_eq!(store.set("ble_idx", &[3, 0, 0, 0]).await, Err(StoreError::Flash));
            assert_eq!(store.delete("ble_idx").await, Err(StoreError::Flash));
            assert!(store.contains("ble_idx"));
            assert_eq!(store.len(), 1);
        });
    }

    #[test]
    fn test_oversized_value_and_key() {
        block_on(async {
            let mut store = MemoryStore::new();
            assert_eq!(store.set("mode", &[0u8; MAX_VALUE_SIZE + 1]).await, Err(StoreError::Full));
            assert_eq!(
                store.set("a_key_longer_than_sixteen", &[0]).await,
                Err(StoreError::UnknownKey)
            );
        });
    }
}
