//! Pairing, reconnection and rollback of BLE hosts.

use heapless::Vec;

use super::host::{HostSlot, delete_host, load_host, save_host};
use super::{AdvertisingFilter, BdAddr, BleController, BleError};
use crate::event::BleEvent;
use crate::storage::{BLE_IDX_KEY, Store, read_i32, write_i32};
use crate::{MAX_BONDED_DEVICES, NUM_HOST_SLOTS};

/// Index of the scratch slot that always holds the most recent pairing
pub const SCRATCH_SLOT: u8 = 0;

/// Connection state of the BLE link as seen by the host manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BleState {
    #[default]
    Idle,
    Advertising,
    Connecting,
    Authenticating,
    Connected(u8),
    /// Waiting for any central to pair into the slot
    PairingNewHost(u8),
    /// A new host pairing failed, the pre-pairing bond snapshot is kept for inspection
    RollbackPending,
}

/// Flags of the flow that is currently in flight
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BleConnectionState {
    /// Slot a successful pairing is saved to, 0 until a gesture selects one
    pub active_slot: u8,
    pub is_pairing_new_host: bool,
    pub is_switching_to_saved_host: bool,
    /// Bonded centrals right before the last new host pairing started
    pub pre_pairing_bond_snapshot: Option<Vec<BdAddr, MAX_BONDED_DEVICES>>,
}

/// Owns the host slots and drives the BLE controller through pairing and reconnection.
///
/// All methods take the store and the controller as arguments, the manager itself only
/// holds state. It must only be driven from one task.
#[derive(Debug, Default)]
pub struct BleHostManager {
    state: BleState,
    connection: BleConnectionState,
    /// Cache of the persisted slots, scratch slot included
    hosts: [HostSlot; NUM_HOST_SLOTS + 1],
    /// Saved host the advertising is currently directed to
    directed_peer: Option<BdAddr>,
}

impl BleHostManager {
    pub fn new() -> Self {
        let mut manager = Self::default();
        for (index, host) in manager.hosts.iter_mut().enumerate() {
            *host = HostSlot::empty(index as u8);
        }
        manager
    }

    /// Restore the active slot and the host slots from the store
    pub async fn load<S: Store>(store: &mut S) -> Self {
        let mut manager = Self::new();
        manager.connection.active_slot = match read_i32(store, BLE_IDX_KEY).await {
            Ok(Some(index)) if (0..=NUM_HOST_SLOTS as i32).contains(&index) => index as u8,
            Ok(Some(index)) => {
                warn!("Invalid persisted BLE host index {}", index);
                0
            }
            Ok(None) => 0,
            Err(e) => {
                error!("Failed to read BLE host index: {:?}", e);
                0
            }
        };
        for index in 0..=NUM_HOST_SLOTS as u8 {
            manager.hosts[index as usize] = load_host(store, index).await;
        }
        info!("Active BLE host slot: {}", manager.connection.active_slot);
        manager
    }

    /// Start generic advertising after boot
    pub async fn start<C: BleController>(&mut self, controller: &mut C) {
        self.advertise(controller, AdvertisingFilter::Undirected).await;
        self.state = BleState::Advertising;
    }

    pub fn state(&self) -> BleState {
        self.state
    }

    pub fn connection(&self) -> &BleConnectionState {
        &self.connection
    }

    pub fn active_slot(&self) -> u8 {
        self.connection.active_slot
    }

    /// Cached content of slot `index`, 0 is the scratch slot
    pub fn host(&self, index: u8) -> Option<&HostSlot> {
        self.hosts.get(index as usize)
    }

    pub fn directed_peer(&self) -> Option<BdAddr> {
        self.directed_peer
    }

    /// Bring back the host saved in `slot`.
    ///
    /// The slot always becomes the active one. An empty slot stops there, the next host
    /// that authenticates is saved into it. Otherwise every bonded central is disconnected
    /// and advertising is directed to the saved address, other bonds are kept.
    pub async fn reconnect_saved_host<S: Store, C: BleController>(&mut self, slot: u8, store: &mut S, controller: &mut C) {
        if !is_user_slot(slot) {
            warn!("Invalid BLE host slot {}", slot);
            return;
        }
        self.connection.active_slot = slot;
        let host = load_host(store, slot).await;
        self.hosts[slot as usize] = host.clone();
        if host.is_empty() {
            info!("BLE host slot {} is empty, nothing to reconnect", slot);
            return;
        }

        self.cancel_in_flight(controller).await;
        info!("Reconnecting to BLE host {}: {:?}", slot, host.address);
        self.connection.is_switching_to_saved_host = true;
        self.directed_peer = Some(host.address);

        if let Err(e) = controller.disconnect_all_bonded().await {
            warn!("Failed to disconnect bonded centrals: {:?}", e);
        }
        self.advertise(controller, AdvertisingFilter::Directed(host.address)).await;
        self.state = BleState::Advertising;
    }

    /// Let any new central pair into `slot`.
    ///
    /// The bonds present right now are snapshotted first. If the bond list can't be read
    /// nothing is changed and the error is returned.
    pub async fn pair_new_host<C: BleController>(&mut self, slot: u8, controller: &mut C) -> Result<(), BleError> {
        if !is_user_slot(slot) {
            warn!("Invalid BLE host slot {}", slot);
            return Ok(());
        }
        let mut snapshot = Vec::new();
        if let Err(e) = controller.bonded_devices(&mut snapshot).await {
            error!("Failed to read bonded devices, pairing aborted: {:?}", e);
            return Err(e);
        }

        self.cancel_in_flight(controller).await;
        info!("Pairing new BLE host into slot {}", slot);
        self.connection.active_slot = slot;
        self.connection.is_pairing_new_host = true;
        self.connection.pre_pairing_bond_snapshot = Some(snapshot);
        self.state = BleState::PairingNewHost(slot);

        if let Err(e) = controller.disconnect_all_bonded().await {
            warn!("Failed to disconnect bonded centrals: {:?}", e);
        }
        self.advertise(controller, AdvertisingFilter::Undirected).await;
        Ok(())
    }

    /// Forget every saved host and every bond, then advertise for anyone
    pub async fn wipe_hosts<S: Store, C: BleController>(&mut self, store: &mut S, controller: &mut C) {
        info!("Wiping all BLE hosts");
        for index in 1..=NUM_HOST_SLOTS as u8 {
            if let Err(e) = delete_host(store, index).await {
                error!("Failed to delete BLE host slot {}: {:?}", index, e);
            }
            self.hosts[index as usize] = HostSlot::empty(index);
        }
        if let Err(e) = controller.remove_all_bonds().await {
            error!("Failed to remove bonds: {:?}", e);
        }

        self.connection.is_pairing_new_host = false;
        self.connection.is_switching_to_saved_host = false;
        self.connection.pre_pairing_bond_snapshot = None;
        self.directed_peer = None;
        self.advertise(controller, AdvertisingFilter::Undirected).await;
        self.state = BleState::Advertising;
    }

    /// Addresses from the pre-pairing snapshot that are no longer bonded
    pub async fn bond_drift<C: BleController>(
        &self,
        controller: &mut C,
    ) -> Result<Vec<BdAddr, MAX_BONDED_DEVICES>, BleError> {
        let mut drift = Vec::new();
        let Some(snapshot) = &self.connection.pre_pairing_bond_snapshot else {
            return Ok(drift);
        };
        let mut bonded = Vec::new();
        controller.bonded_devices(&mut bonded).await?;
        for address in snapshot.iter().filter(|a| !bonded.contains(*a)) {
            drift.push(*address).map_err(|_| BleError::BondListOverflow)?;
        }
        Ok(drift)
    }

    /// Apply a callback of the BLE stack
    pub async fn handle_event<S: Store, C: BleController>(&mut self, event: BleEvent, store: &mut S, controller: &mut C) {
        debug!("BLE event {:?} in state {:?}", event, self.state);
        match event {
            BleEvent::Connected(address) => self.on_connected(address),
            BleEvent::Disconnected => self.on_disconnected(controller).await,
            BleEvent::SecurityRequest(address) => {
                // Just works bonding, every request is accepted
                if let Err(e) = controller.security_response(address, true).await {
                    error!("Failed to answer security request: {:?}", e);
                }
                self.state = BleState::Authenticating;
            }
            BleEvent::AuthComplete { address, success: true } => self.on_auth_success(address, store, controller).await,
            BleEvent::AuthComplete { address, success: false } => self.on_auth_failure(address, controller).await,
            BleEvent::AdvertisingTimeout => self.on_advertising_timeout(controller).await,
        }
    }

    fn on_connected(&mut self, address: BdAddr) {
        if let Some(peer) = self.directed_peer
            && peer != address
        {
            warn!("Unexpected central {:?} while reconnecting to {:?}", address, peer);
        }
        match self.state {
            BleState::Advertising | BleState::PairingNewHost(_) | BleState::RollbackPending | BleState::Idle => {
                self.state = BleState::Connecting
            }
            _ => {}
        }
    }

    async fn on_disconnected<C: BleController>(&mut self, controller: &mut C) {
        if self.connection.is_switching_to_saved_host
            && let Some(peer) = self.directed_peer
        {
            // The disconnect was caused by the switch itself
            self.advertise(controller, AdvertisingFilter::Directed(peer)).await;
            self.state = BleState::Advertising;
            return;
        }

        self.directed_peer = None;
        self.advertise(controller, AdvertisingFilter::Undirected).await;
        self.state = if self.connection.is_pairing_new_host {
            BleState::PairingNewHost(self.connection.active_slot)
        } else if self.state == BleState::RollbackPending {
            BleState::RollbackPending
        } else {
            BleState::Advertising
        };
    }

    async fn on_auth_success<S: Store, C: BleController>(&mut self, address: BdAddr, store: &mut S, controller: &mut C) {
        let slot = self.connection.active_slot;
        info!("BLE host {:?} authenticated, saving to slot {}", address, slot);

        if is_user_slot(slot) {
            let host = HostSlot::paired(slot, address);
            if let Err(e) = save_host(store, &host).await {
                error!("Failed to save BLE host slot {}: {:?}", slot, e);
            }
            self.hosts[slot as usize] = host;
            if let Err(e) = write_i32(store, BLE_IDX_KEY, slot as i32).await {
                error!("Failed to save active BLE host slot: {:?}", e);
            }
        }
        let scratch = HostSlot::paired(SCRATCH_SLOT, address);
        if let Err(e) = save_host(store, &scratch).await {
            error!("Failed to save scratch BLE host: {:?}", e);
        }
        self.hosts[SCRATCH_SLOT as usize] = scratch;
        self.remove_unsaved_bonds(address, controller).await;

        if let Err(e) = controller.stop_advertising().await {
            warn!("Failed to stop advertising: {:?}", e);
        }
        self.connection.is_pairing_new_host = false;
        self.connection.is_switching_to_saved_host = false;
        self.directed_peer = None;
        self.state = BleState::Connected(slot);
    }

    async fn on_auth_failure<C: BleController>(&mut self, address: BdAddr, controller: &mut C) {
        warn!("Authentication with {:?} failed", address);
        if self.connection.is_pairing_new_host || self.state == BleState::RollbackPending {
            // The snapshot stays for bond_drift, nothing is restored implicitly
            self.connection.is_pairing_new_host = false;
            self.advertise(controller, AdvertisingFilter::Undirected).await;
            self.state = BleState::RollbackPending;
            return;
        }
        let filter = match self.directed_peer {
            Some(peer) if self.connection.is_switching_to_saved_host => AdvertisingFilter::Directed(peer),
            _ => AdvertisingFilter::Undirected,
        };
        self.advertise(controller, filter).await;
        self.state = BleState::Advertising;
    }

    async fn on_advertising_timeout<C: BleController>(&mut self, controller: &mut C) {
        if self.directed_peer.take().is_some() {
            info!("Saved host didn't come back, falling back to generic advertising");
            self.connection.is_switching_to_saved_host = false;
        }
        self.advertise(controller, AdvertisingFilter::Undirected).await;
        if !matches!(self.state, BleState::PairingNewHost(_) | BleState::RollbackPending) {
            self.state = BleState::Advertising;
        }
    }

    /// Remove every bond that belongs neither to a saved host nor to `current`
    async fn remove_unsaved_bonds<C: BleController>(&mut self, current: BdAddr, controller: &mut C) {
        let mut bonded = Vec::new();
        if let Err(e) = controller.bonded_devices(&mut bonded).await {
            error!("Failed to read bonded devices, unsaved bonds are kept: {:?}", e);
            return;
        }
        for address in bonded {
            let saved = self.hosts[1..]
                .iter()
                .any(|host| !host.is_empty() && host.address == address);
            if saved || address == current {
                continue;
            }
            info!("Removing bond of unsaved central {:?}", address);
            if let Err(e) = controller.remove_bond(address).await {
                error!("Failed to remove bond of {:?}: {:?}", address, e);
            }
        }
    }

    /// Drop the advertising filter of a reconnect or pairing that is still in flight
    async fn cancel_in_flight<C: BleController>(&mut self, controller: &mut C) {
        if !(self.connection.is_pairing_new_host || self.connection.is_switching_to_saved_host) {
            return;
        }
        debug!("Cancelling the BLE flow in flight");
        if let Err(e) = controller.stop_advertising().await {
            warn!("Failed to stop advertising: {:?}", e);
        }
        self.connection.is_pairing_new_host = false;
        self.connection.is_switching_to_saved_host = false;
        self.directed_peer = None;
    }

    async fn advertise<C: BleController>(&mut self, controller: &mut C, filter: AdvertisingFilter) {
        if let Err(e) = controller.start_advertising(filter).await {
            error!("Failed to start advertising: {:?}", e);
        }
    }
}

fn is_user_slot(slot: u8) -> bool {
    (1..=NUM_HOST_SLOTS as u8).contains(&slot)
}
