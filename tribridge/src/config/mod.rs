use embassy_sync::channel::Channel;
use embassy_time::Duration;

use crate::channel::{BLE_EVENT_CHANNEL, KEY_EVENT_CHANNEL, MODE_REQUEST_CHANNEL, USB_REPORT_CHANNEL};
use crate::event::{BleEvent, KeyEvent};
use crate::hid::HidReport;
use crate::types::keycode::HidKeyCode;
use crate::types::TransportMode;
use crate::{
    BLE_EVENT_CHANNEL_SIZE, KEY_EVENT_CHANNEL_SIZE, MODE_REQUEST_CHANNEL_SIZE, NUM_HOST_SLOTS, REPORT_CHANNEL_SIZE,
    RawMutex,
};

/// The config struct for the keyboard core.
///
/// - `channel_config`: the channels that connect board code, the core and the USB writer
/// - `timing`: timeouts and delays of the report pipeline
/// - `wireless`: settings of the 2.4 GHz link
/// - `gesture`: which keys trigger the control gestures
pub struct KeyboardConfig<'a> {
    pub channel_config: ChannelConfig<'a>,
    pub timing: TimingConfig,
    pub wireless: WirelessConfig,
    pub gesture: GestureConfig,
}

impl Default for KeyboardConfig<'static> {
    fn default() -> Self {
        Self {
            channel_config: ChannelConfig::default(),
            timing: TimingConfig::default(),
            wireless: WirelessConfig::default(),
            gesture: GestureConfig::default(),
        }
    }
}

/// Channels used by the keyboard core.
///
/// The default config points at the static channels in [`crate::channel`].
pub struct ChannelConfig<'a> {
    pub key_events: &'a Channel<RawMutex, KeyEvent, KEY_EVENT_CHANNEL_SIZE>,
    pub ble_events: &'a Channel<RawMutex, BleEvent, BLE_EVENT_CHANNEL_SIZE>,
    pub usb_reports: &'a Channel<RawMutex, HidReport, REPORT_CHANNEL_SIZE>,
    pub mode_requests: &'a Channel<RawMutex, TransportMode, MODE_REQUEST_CHANNEL_SIZE>,
}

impl Default for ChannelConfig<'static> {
    fn default() -> Self {
        Self {
            key_events: &KEY_EVENT_CHANNEL,
            ble_events: &BLE_EVENT_CHANNEL,
            usb_reports: &USB_REPORT_CHANNEL,
            mode_requests: &MODE_REQUEST_CHANNEL,
        }
    }
}

/// Timeouts and delays of the report pipeline
#[derive(Clone, Copy, Debug)]
pub struct TimingConfig {
    /// Longest time a single USB report write may take before it is dropped
    pub send_timeout: Duration,
    /// Delay between the empty keyboard report and the empty consumer report on release
    pub release_gap: Duration,
    /// The keyboard task feeds the watchdog at least this often
    pub watchdog_feed_interval: Duration,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            send_timeout: Duration::from_millis(10),
            release_gap: Duration::from_millis(20),
            watchdog_feed_interval: Duration::from_millis(500),
        }
    }
}

/// Config of the 2.4 GHz link
#[derive(Clone, Copy, Debug)]
pub struct WirelessConfig {
    /// Address of the paired receiver dongle
    pub peer_address: [u8; 6],
}

impl Default for WirelessConfig {
    fn default() -> Self {
        Self {
            peer_address: [0x24, 0x58, 0x7C, 0xDE, 0x55, 0x5C],
        }
    }
}

/// Keys of the control gestures.
///
/// Gestures are `Fn` + one of these keys. `Fn` + `Right Shift` + a host key pairs a
/// new host into that slot.
#[derive(Clone, Copy, Debug)]
pub struct GestureConfig {
    pub usb_mode_key: HidKeyCode,
    pub ble_mode_key: HidKeyCode,
    pub wireless_mode_key: HidKeyCode,
    /// Host slot keys, `host_keys[i]` selects slot `i + 1`
    pub host_keys: [HidKeyCode; NUM_HOST_SLOTS],
    /// Forget every saved host
    pub wipe_key: HidKeyCode,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            usb_mode_key: HidKeyCode::Kc5,
            ble_mode_key: HidKeyCode::Kc6,
            wireless_mode_key: HidKeyCode::Kc7,
            host_keys: [HidKeyCode::Kc8, HidKeyCode::Kc9, HidKeyCode::Kc0],
            wipe_key: HidKeyCode::Grave,
        }
    }
}

/// Config for the flash backed store
#[derive(Clone, Copy, Debug)]
pub struct StorageConfig {
    /// Start address of local storage, MUST BE start of a sector.
    /// If start_addr is set to 0(this is the default value), the last `num_sectors` sectors will be used.
    pub start_addr: usize,
    // Number of sectors used for storage, >= 2.
    pub num_sectors: u8,
    pub clear_storage: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            start_addr: 0,
            num_sectors: 2,
            clear_storage: false,
        }
    }
}

/// Configurations for usb
#[derive(Clone, Copy, Debug)]
pub struct KeyboardUsbConfig<'a> {
    /// Vender id
    pub vid: u16,
    /// Product id
    pub pid: u16,
    /// Manufacturer
    pub manufacturer: &'a str,
    /// Product name
    pub product_name: &'a str,
    /// Serial number
    pub serial_number: &'a str,
}

impl Default for KeyboardUsbConfig<'_> {
    fn default() -> Self {
        Self {
            vid: 0x303A,
            pid: 0x4004,
            manufacturer: "Tribridge",
            product_name: "Tribridge Keyboard",
            serial_number: "000001",
        }
    }
}
