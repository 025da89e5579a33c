use core::ops::Range;

use embassy_embedded_hal::adapter::BlockingAsync;
use embedded_storage::nor_flash::NorFlash;
use embedded_storage_async::nor_flash::NorFlash as AsyncNorFlash;
use sequential_storage::Error as SSError;
use sequential_storage::cache::NoCache;
use sequential_storage::map::{fetch_item, remove_item, store_item};

use super::{BLE_IDX_KEY, HOST_KEY_PREFIX, MODE_KEY, Store, StoreError};
use crate::config::StorageConfig;

/// Numeric keys of the items in flash
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum StorageKey {
    Mode = 0x10,
    BleIndex = 0x11,
    /// Host slot records take `HostRecord + slot`
    HostRecord = 0x2000,
}

impl StorageKey {
    fn resolve(key: &str) -> Result<u32, StoreError> {
        match key {
            MODE_KEY => Ok(StorageKey::Mode as u32),
            BLE_IDX_KEY => Ok(StorageKey::BleIndex as u32),
            _ => key
                .strip_prefix(HOST_KEY_PREFIX)
                .and_then(|slot| slot.parse::<u8>().ok())
                .map(|slot| StorageKey::HostRecord as u32 + slot as u32)
                .ok_or(StoreError::UnknownKey),
        }
    }
}

/// Buffer used by `sequential-storage`, aligned to 32 bytes for flashes with large write units
const FLASH_BUFFER_SIZE: usize = 64;

/// [`Store`] on top of a NOR flash range, using `sequential-storage` maps
pub struct FlashStore<F: AsyncNorFlash> {
    flash: F,
    storage_range: Range<u32>,
    buffer: [u8; FLASH_BUFFER_SIZE],
}

impl<F: NorFlash> FlashStore<BlockingAsync<F>> {
    /// Create a store on top of a blocking flash driver
    pub async fn new_blocking(flash: F, config: &StorageConfig) -> Self {
        FlashStore::new(BlockingAsync::new(flash), config).await
    }
}

impl<F: AsyncNorFlash> FlashStore<F> {
    pub async fn new(flash: F, config: &StorageConfig) -> Self {
        // Check storage setting
        assert!(
            config.num_sectors >= 2,
            "Number of used sector for storage must larger than 1"
        );

        info!(
            "Flash capacity {} KB, {} KB({} sectors) starting from 0x{:X} used as storage",
            flash.capacity() / 1024,
            (F::ERASE_SIZE * config.num_sectors as usize) / 1024,
            config.num_sectors,
            config.start_addr,
        );

        let storage_range = if config.start_addr == 0 {
            (flash.capacity() - config.num_sectors as usize * F::ERASE_SIZE) as u32..flash.capacity() as u32
        } else {
            assert!(
                config.start_addr % F::ERASE_SIZE == 0,
                "Storage's start addr MUST BE a multiplier of sector size"
            );
            config.start_addr as u32..(config.start_addr + config.num_sectors as usize * F::ERASE_SIZE) as u32
        };

        let mut store = Self {
            flash,
            storage_range,
            buffer: [0; FLASH_BUFFER_SIZE],
        };

        if config.clear_storage {
            debug!("Clearing storage!");
            if let Err(e) = sequential_storage::erase_all(&mut store.flash, store.storage_range.clone()).await {
                print_storage_error::<F>(e);
            }
        }

        store
    }
}

impl<F: AsyncNorFlash> Store for FlashStore<F> {
    async fn get(&mut self, key: &str, buf: &mut [u8]) -> Result<Option<usize>, StoreError> {
        let key = StorageKey::resolve(key)?;
        let item = fetch_item::<u32, &[u8], _>(
            &mut self.flash,
            self.storage_range.clone(),
            &mut NoCache::new(),
            &mut self.buffer,
            &key,
        )
        .await
        .map_err(storage_error::<F>)?;

        match item {
            Some(value) if value.len() > buf.len() => Err(StoreError::BufferTooSmall),
            Some(value) => {
                buf[..value.len()].copy_from_slice(value);
                Ok(Some(value.len()))
            }
            None => Ok(None),
        }
    }

    async fn set(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let key = StorageKey::resolve(key)?;
        store_item::<u32, &[u8], _>(
            &mut self.flash,
            self.storage_range.clone(),
            &mut NoCache::new(),
            &mut self.buffer,
            &key,
            &value,
        )
        .await
        .map_err(storage_error::<F>)
    }

    async fn delete(&mut self, key: &str) -> Result<(), StoreError> {
        let key = StorageKey::resolve(key)?;
        remove_item(
            &mut self.flash,
            self.storage_range.clone(),
            &mut NoCache::new(),
            &mut self.buffer,
            &key,
        )
        .await
        .map_err(storage_error::<F>)
    }
}

fn storage_error<F: AsyncNorFlash>(e: SSError<F::Error>) -> StoreError {
    let mapped = match &e {
        SSError::FullStorage => StoreError::Full,
        SSError::Corrupted {} => StoreError::Corrupted,
        SSError::BufferTooSmall(_) => StoreError::BufferTooSmall,
        _ => StoreError::Flash,
    };
    print_storage_error::<F>(e);
    mapped
}

fn print_storage_error<F: AsyncNorFlash>(e: SSError<F::Error>) {
    match e {
        #[cfg(feature = "defmt")]
        SSError::Storage { value: e } => error!("Flash error: {:?}", defmt::Debug2Format(&e)),
        #[cfg(not(feature = "defmt"))]
        SSError::Storage { value: _e } => error!("Flash error"),
        SSError::FullStorage => error!("Storage is full"),
        SSError::Corrupted {} => error!("Storage is corrupted"),
        SSError::BufferTooBig => error!("Buffer too big"),
        SSError::BufferTooSmall(x) => error!("Buffer too small, needs {} bytes", x),
        _ => error!("Unknown storage error"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_key_mapping() {
        assert_eq!(StorageKey::resolve("mode"), Ok(0x10));
        assert_eq!(StorageKey::resolve("ble_idx"), Ok(0x11));
        assert_eq!(StorageKey::resolve("bt_host_0"), Ok(0x2000));
        assert_eq!(StorageKey::resolve("bt_host_3"), Ok(0x2003));
        assert_eq!(StorageKey::resolve("bt_host_x"), Err(StoreError::UnknownKey));
        assert_eq!(StorageKey::resolve("layout"), Err(StoreError::UnknownKey));
    }
}
