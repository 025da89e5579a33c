#![allow(dead_code)]

use embassy_sync::channel::Channel;
use embassy_time::Duration;
use heapless::Vec as HVec;
use tribridge::ble::{AdvertisingFilter, BdAddr, BleController, BleError};
use tribridge::boot::Restart;
use tribridge::config::{ChannelConfig, GestureConfig, KeyboardConfig, TimingConfig, WirelessConfig};
use tribridge::dispatcher::BleHidTransport;
use tribridge::event::{BleEvent, KeyEvent};
use tribridge::hid::{HidError, HidReport, ReportId};
use tribridge::keyboard::Keyboard;
use tribridge::layout::{COL, ROW, default_keymap};
use tribridge::storage::MemoryStore;
use tribridge::watchdog::Watchdog;
use tribridge::wireless::{WIRELESS_FRAME_SIZE, WirelessLink};
use tribridge::{
    BLE_EVENT_CHANNEL_SIZE, Coordinate, KEY_EVENT_CHANNEL_SIZE, MAX_BONDED_DEVICES, MODE_REQUEST_CHANNEL_SIZE,
    REPORT_CHANNEL_SIZE, RawMutex, TransportMode,
};

// Init logger for tests
#[ctor::ctor]
pub fn init_log() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

pub const LAYER_KEY: (u8, u8) = (5, 10);
pub const RIGHT_SHIFT: (u8, u8) = (4, 13);
pub const LEFT_SHIFT: (u8, u8) = (4, 0);
pub const KEY_A: (u8, u8) = (3, 1);
pub const KEY_S: (u8, u8) = (3, 2);
pub const KEY_D: (u8, u8) = (3, 3);
pub const KEY_GRAVE: (u8, u8) = (1, 0);
pub const KEY_5: (u8, u8) = (1, 5);
pub const KEY_6: (u8, u8) = (1, 6);
pub const KEY_7: (u8, u8) = (1, 7);
pub const KEY_8: (u8, u8) = (1, 8);
pub const KEY_9: (u8, u8) = (1, 9);
pub const KEY_0: (u8, u8) = (1, 10);
/// `F12` on the base layer, volume up on the function layer
pub const KEY_F12: (u8, u8) = (0, 13);
/// Q W E R T Y U
pub const SEVEN_KEYS: [(u8, u8); 7] = [(2, 1), (2, 2), (2, 3), (2, 4), (2, 5), (2, 6), (2, 7)];

pub const HOST_A: BdAddr = BdAddr([0x11, 0x22, 0x33, 0x44, 0x55, 0x66]);
pub const HOST_B: BdAddr = BdAddr([0xA1, 0xB2, 0xC3, 0xD4, 0xE5, 0xF6]);

pub fn press(coordinates: &[(u8, u8)]) -> KeyEvent {
    let active: HVec<Coordinate, 32> = coordinates.iter().map(|(o, i)| Coordinate::new(*o, *i)).collect();
    KeyEvent::new(&active, active.len() as i16)
}

pub fn release(count: i16) -> KeyEvent {
    KeyEvent::released(-count)
}

/// Every call made on the BLE controller, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BleCall {
    DisconnectAll,
    StartAdvertising(AdvertisingFilter),
    StopAdvertising,
    BondedDevices,
    RemoveBond(BdAddr),
    RemoveAllBonds,
    SecurityResponse(BdAddr, bool),
}

#[derive(Debug, Default)]
pub struct MockBle {
    pub connected: bool,
    pub bonds: Vec<BdAddr>,
    pub fail_bond_enumeration: bool,
    pub calls: Vec<BleCall>,
    pub sent: Vec<(ReportId, Vec<u8>)>,
}

impl MockBle {
    pub fn with_bonds(bonds: &[BdAddr]) -> Self {
        Self {
            bonds: bonds.to_vec(),
            ..Default::default()
        }
    }

    pub fn advertising_calls(&self) -> Vec<AdvertisingFilter> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                BleCall::StartAdvertising(filter) => Some(*filter),
                _ => None,
            })
            .collect()
    }
}

impl BleHidTransport for MockBle {
    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn send_value(&mut self, id: ReportId, value: &[u8]) -> Result<(), HidError> {
        self.sent.push((id, value.to_vec()));
        Ok(())
    }
}

impl BleController for MockBle {
    async fn disconnect_all_bonded(&mut self) -> Result<(), BleError> {
        self.calls.push(BleCall::DisconnectAll);
        Ok(())
    }

    async fn start_advertising(&mut self, filter: AdvertisingFilter) -> Result<(), BleError> {
        self.calls.push(BleCall::StartAdvertising(filter));
        Ok(())
    }

    async fn stop_advertising(&mut self) -> Result<(), BleError> {
        self.calls.push(BleCall::StopAdvertising);
        Ok(())
    }

    async fn bonded_devices(&mut self, out: &mut HVec<BdAddr, MAX_BONDED_DEVICES>) -> Result<(), BleError> {
        self.calls.push(BleCall::BondedDevices);
        if self.fail_bond_enumeration {
            return Err(BleError::Controller);
        }
        for bond in &self.bonds {
            out.push(*bond).map_err(|_| BleError::BondListOverflow)?;
        }
        Ok(())
    }

    async fn remove_bond(&mut self, address: BdAddr) -> Result<(), BleError> {
        self.calls.push(BleCall::RemoveBond(address));
        self.bonds.retain(|bond| *bond != address);
        Ok(())
    }

    async fn remove_all_bonds(&mut self) -> Result<(), BleError> {
        self.calls.push(BleCall::RemoveAllBonds);
        self.bonds.clear();
        Ok(())
    }

    async fn security_response(&mut self, peer: BdAddr, accept: bool) -> Result<(), BleError> {
        self.calls.push(BleCall::SecurityResponse(peer, accept));
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MockWireless {
    pub frames: Vec<([u8; 6], [u8; WIRELESS_FRAME_SIZE])>,
    pub fail: bool,
}

impl WirelessLink for MockWireless {
    async fn send_frame(&mut self, peer: &[u8; 6], frame: &[u8; WIRELESS_FRAME_SIZE]) -> Result<(), HidError> {
        if self.fail {
            return Err(HidError::WirelessSendError);
        }
        self.frames.push((*peer, *frame));
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MockRestart {
    pub count: usize,
}

impl Restart for MockRestart {
    fn restart(&mut self) {
        self.count += 1;
    }
}

#[derive(Debug, Default)]
pub struct MockWatchdog {
    pub feeds: usize,
}

impl Watchdog for MockWatchdog {
    fn feed(&mut self) {
        self.feeds += 1;
    }
}

/// Private channels, so tests running in parallel don't share the static ones
pub struct TestChannels {
    pub key_events: Channel<RawMutex, KeyEvent, KEY_EVENT_CHANNEL_SIZE>,
    pub ble_events: Channel<RawMutex, BleEvent, BLE_EVENT_CHANNEL_SIZE>,
    pub usb_reports: Channel<RawMutex, HidReport, REPORT_CHANNEL_SIZE>,
    pub mode_requests: Channel<RawMutex, TransportMode, MODE_REQUEST_CHANNEL_SIZE>,
}

impl TestChannels {
    pub fn new() -> Self {
        Self {
            key_events: Channel::new(),
            ble_events: Channel::new(),
            usb_reports: Channel::new(),
            mode_requests: Channel::new(),
        }
    }

    /// Every report queued for USB so far
    pub fn usb_reports(&self) -> Vec<HidReport> {
        let mut reports = Vec::new();
        while let Ok(report) = self.usb_reports.try_receive() {
            reports.push(report);
        }
        reports
    }
}

pub type TestKeyboard<'a> = Keyboard<'a, ROW, COL, MemoryStore, MockBle, MockWireless, MockRestart, MockWatchdog>;

pub fn test_config(channels: &TestChannels) -> KeyboardConfig<'_> {
    KeyboardConfig {
        channel_config: ChannelConfig {
            key_events: &channels.key_events,
            ble_events: &channels.ble_events,
            usb_reports: &channels.usb_reports,
            mode_requests: &channels.mode_requests,
        },
        timing: TimingConfig {
            send_timeout: Duration::from_millis(10),
            release_gap: Duration::from_ticks(0),
            watchdog_feed_interval: Duration::from_millis(500),
        },
        wireless: WirelessConfig::default(),
        gesture: GestureConfig::default(),
    }
}

pub async fn create_test_keyboard<'a>(channels: &'a TestChannels, store: MemoryStore, ble: MockBle) -> TestKeyboard<'a> {
    create_test_keyboard_with(channels, store, ble, MockWireless::default()).await
}

pub async fn create_test_keyboard_with<'a>(
    channels: &'a TestChannels,
    store: MemoryStore,
    ble: MockBle,
    wireless: MockWireless,
) -> TestKeyboard<'a> {
    Keyboard::new(
        default_keymap(),
        test_config(channels),
        store,
        ble,
        wireless,
        MockRestart::default(),
        MockWatchdog::default(),
    )
    .await
}

/// Boot keyboard report as it appears on the wire, report id excluded
pub fn boot(modifiers: u8, keycodes: [u8; 6]) -> HidReport {
    HidReport::BootKeyboard {
        modifiers: tribridge::types::modifier::HidModifiers::from_bits(modifiers),
        keycodes,
    }
}

/// HID writer that records every report, or never finishes a write when `stall` is set
#[derive(Debug, Default)]
pub struct MockHidWriter {
    pub written: Vec<HidReport>,
    pub stall: bool,
}

impl tribridge::hid::HidWriterTrait for MockHidWriter {
    async fn write_report(&mut self, report: &HidReport) -> Result<usize, HidError> {
        if self.stall {
            core::future::pending::<()>().await;
        }
        self.written.push(*report);
        let mut buf = [0u8; tribridge::hid::MAX_REPORT_SIZE];
        report.serialize_into(&mut buf)
    }
}
