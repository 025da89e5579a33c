//! BLE host slots and the controller interface of the BLE stack.

pub mod host;
pub mod manager;

use core::future::Future;

use heapless::Vec;
use postcard::experimental::max_size::MaxSize;
use serde::{Deserialize, Serialize};

use crate::MAX_BONDED_DEVICES;

/// 48-bit Bluetooth device address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, MaxSize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BdAddr(pub [u8; 6]);

impl BdAddr {
    pub const EMPTY: BdAddr = BdAddr([0; 6]);

    pub const fn new(address: [u8; 6]) -> Self {
        Self(address)
    }

    /// The all-zero address marks an empty slot
    pub fn is_empty(&self) -> bool {
        self.0 == [0; 6]
    }

    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }
}

/// Who may connect while advertising
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdvertisingFilter {
    /// Any central may connect
    Undirected,
    /// Only this bonded central may connect
    Directed(BdAddr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BleError {
    /// More bonds than `MAX_BONDED_DEVICES`
    BondListOverflow,
    /// The BLE stack rejected the request
    Controller,
}

/// Connection and bonding control of the BLE stack
pub trait BleController {
    /// Drop the link to every bonded central
    fn disconnect_all_bonded(&mut self) -> impl Future<Output = Result<(), BleError>>;

    fn start_advertising(&mut self, filter: AdvertisingFilter) -> impl Future<Output = Result<(), BleError>>;

    fn stop_advertising(&mut self) -> impl Future<Output = Result<(), BleError>>;

    /// Append the address of every bonded central to `out`
    fn bonded_devices(
        &mut self,
        out: &mut Vec<BdAddr, MAX_BONDED_DEVICES>,
    ) -> impl Future<Output = Result<(), BleError>>;

    /// Forget the bond of one central
    fn remove_bond(&mut self, address: BdAddr) -> impl Future<Output = Result<(), BleError>>;

    fn remove_all_bonds(&mut self) -> impl Future<Output = Result<(), BleError>>;

    /// Answer a security request of `peer`
    fn security_response(&mut self, peer: BdAddr, accept: bool) -> impl Future<Output = Result<(), BleError>>;
}
