use heapless::Vec;

use crate::MAX_ACTIVE_KEYS;
use crate::ble::BdAddr;
use crate::types::Coordinate;

/// One matrix scan result.
///
/// `active` lists every pressed coordinate in scan order. `change_count` is the
/// net change of pressed keys since the previous scan: positive means new keys
/// went down, negative means keys went up, zero means nothing changed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyEvent {
    pub active: Vec<Coordinate, MAX_ACTIVE_KEYS>,
    pub change_count: i16,
}

impl KeyEvent {
    /// Build an event from a scan, coordinates past [`MAX_ACTIVE_KEYS`] are dropped
    pub fn new(active: &[Coordinate], change_count: i16) -> Self {
        let mut coordinates = Vec::new();
        for c in active {
            if coordinates.push(*c).is_err() {
                warn!("Too many active keys in one scan, dropping the rest");
                break;
            }
        }
        Self {
            active: coordinates,
            change_count,
        }
    }

    /// Event of a scan where keys were released and nothing is pressed anymore
    pub fn released(change_count: i16) -> Self {
        Self {
            active: Vec::new(),
            change_count,
        }
    }

    pub fn edge(&self) -> KeyEdge {
        match self.change_count {
            c if c > 0 => KeyEdge::Pressed,
            c if c < 0 => KeyEdge::Released,
            _ => KeyEdge::Unchanged,
        }
    }
}

/// Direction of the change carried by a [`KeyEvent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyEdge {
    Pressed,
    Released,
    Unchanged,
}

/// Connection events reported by the BLE stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BleEvent {
    /// A central connected, the link is not yet encrypted
    Connected(BdAddr),
    /// The link to the current central is gone
    Disconnected,
    /// The peer asks for pairing or encryption
    SecurityRequest(BdAddr),
    /// Pairing / encryption finished
    AuthComplete { address: BdAddr, success: bool },
    /// The advertising window expired without a connection
    AdvertisingTimeout,
}
