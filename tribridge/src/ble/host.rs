//! Persisted host slots.

use core::fmt::Write;

use heapless::String;
use postcard::experimental::max_size::MaxSize;
use serde::{Deserialize, Serialize};

use super::BdAddr;
use crate::storage::{Store, StoreError, host_key};

/// Longest host name
pub const HOST_NAME_MAX_LEN: usize = 20;
/// Size of the name field of a persisted record, one byte longer than the name for the terminator
const HOST_RECORD_NAME_SIZE: usize = HOST_NAME_MAX_LEN + 1;
/// Size of a persisted host record
pub const HOST_RECORD_SIZE: usize = HostRecord::POSTCARD_MAX_SIZE;

/// A remembered central.
///
/// Slot 0 is scratch and holds the most recent pairing. Slots 1 to 3 are the ones the
/// user selects. An empty address marks an empty slot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HostSlot {
    pub index: u8,
    pub address: BdAddr,
    pub name: String<HOST_NAME_MAX_LEN>,
}

impl HostSlot {
    pub fn empty(index: u8) -> Self {
        Self {
            index,
            ..Default::default()
        }
    }

    /// Slot for a central that just paired, named `Host_<index>`
    pub fn paired(index: u8, address: BdAddr) -> Self {
        let mut name = String::new();
        let _ = write!(name, "Host_{}", index);
        Self { index, address, name }
    }

    pub fn is_empty(&self) -> bool {
        self.address.is_empty()
    }

    /// Serialize into the persisted record format
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize, StoreError> {
        let mut name = [0u8; HOST_RECORD_NAME_SIZE];
        name[..self.name.len()].copy_from_slice(self.name.as_bytes());
        let record = HostRecord {
            address: self.address.0,
            name,
        };
        postcard::to_slice(&record, buf)
            .map(|bytes| bytes.len())
            .map_err(|_| StoreError::BufferTooSmall)
    }

    pub fn decode(index: u8, bytes: &[u8]) -> Result<Self, StoreError> {
        let record: HostRecord = postcard::from_bytes(bytes).map_err(|_| StoreError::Corrupted)?;
        let len = record.name.iter().position(|b| *b == 0).unwrap_or(HOST_RECORD_NAME_SIZE);
        let name = core::str::from_utf8(&record.name[..len]).map_err(|_| StoreError::Corrupted)?;
        Ok(Self {
            index,
            address: BdAddr(record.address),
            name: String::try_from(name).map_err(|_| StoreError::Corrupted)?,
        })
    }
}

#[derive(Serialize, Deserialize, MaxSize)]
struct HostRecord {
    address: [u8; 6],
    name: [u8; HOST_RECORD_NAME_SIZE],
}

pub async fn save_host<S: Store>(store: &mut S, slot: &HostSlot) -> Result<(), StoreError> {
    let mut buf = [0u8; HOST_RECORD_SIZE];
    let n = slot.encode(&mut buf)?;
    store.set(&host_key(slot.index), &buf[..n]).await
}

/// Read a host slot, a missing or unreadable record gives an empty slot
pub async fn load_host<S: Store>(store: &mut S, index: u8) -> HostSlot {
    let mut buf = [0u8; HOST_RECORD_SIZE];
    match store.get(&host_key(index), &mut buf).await {
        Ok(Some(n)) => HostSlot::decode(index, &buf[..n]).unwrap_or_else(|e| {
            warn!("Host slot {} is unreadable: {:?}", index, e);
            HostSlot::empty(index)
        }),
        Ok(None) => HostSlot::empty(index),
        Err(e) => {
            warn!("Failed to read host slot {}: {:?}", index, e);
            HostSlot::empty(index)
        }
    }
}

pub async fn delete_host<S: Store>(store: &mut S, index: u8) -> Result<(), StoreError> {
    store.delete(&host_key(index)).await
}

#[cfg(test)]
mod tests {
    use embassy_futures::block_on;

    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_record_size() {
        assert_eq!(HOST_RECORD_SIZE, 27);
    }

    #[test]
    fn test_host_round_trip() {
        block_on(async {
            let mut store = MemoryStore::new();
            let slot = HostSlot::paired(2, BdAddr([0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]));
            save_host(&mut store, &slot).await.unwrap();
            let loaded = load_host(&mut store, 2).await;
            assert_eq!(loaded, slot);
            assert_eq!(loaded.name.as_str(), "Host_2");
        });
    }

    #[test]
    fn test_missing_and_corrupted_hosts_are_empty() {
        block_on(async {
            let mut store = MemoryStore::new();
            assert!(load_host(&mut store, 1).await.is_empty());
            store.set(&host_key(1), &[1, 2, 3]).await.unwrap();
            assert_eq!(load_host(&mut store, 1).await, HostSlot::empty(1));
        });
    }
}
