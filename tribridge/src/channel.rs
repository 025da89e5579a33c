//! Exposed channels which can be used to share data across board tasks and the keyboard core

use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
pub use embassy_sync::{blocking_mutex, channel};

use crate::event::{BleEvent, KeyEvent};
use crate::hid::HidReport;
use crate::types::TransportMode;
use crate::{BLE_EVENT_CHANNEL_SIZE, KEY_EVENT_CHANNEL_SIZE, MODE_REQUEST_CHANNEL_SIZE, REPORT_CHANNEL_SIZE, RawMutex};

/// Matrix scan results, filled by board code
pub static KEY_EVENT_CHANNEL: Channel<RawMutex, KeyEvent, KEY_EVENT_CHANNEL_SIZE> = Channel::new();
/// Connection events from the BLE stack
pub static BLE_EVENT_CHANNEL: Channel<RawMutex, BleEvent, BLE_EVENT_CHANNEL_SIZE> = Channel::new();
/// Mode changes requested outside the keymap, e.g. by mode select pins
pub static MODE_REQUEST_CHANNEL: Channel<RawMutex, TransportMode, MODE_REQUEST_CHANNEL_SIZE> = Channel::new();
/// Reports waiting for the USB HID writer
pub static USB_REPORT_CHANNEL: Channel<RawMutex, HidReport, REPORT_CHANNEL_SIZE> = Channel::new();
/// Asks the USB device task to wake a suspended host
pub static USB_REMOTE_WAKEUP: Signal<RawMutex, ()> = Signal::new();
