//! # tribridge
//!
//! The input and connection core of a keyboard that talks to its host over
//! USB, BLE or a proprietary 2.4 GHz link.
//!
//! Board code scans the matrix and pushes [`event::KeyEvent`]s into the key
//! event channel, the BLE stack pushes [`event::BleEvent`]s into the BLE
//! event channel, and [`keyboard::Keyboard`] does the rest:
//!
//! 1. resolve the active coordinates through the [`keymap::KeyMap`]
//! 2. catch control gestures (mode change, BLE host slots)
//! 3. encode boot / NKRO / consumer reports with [`hid::ReportEncoder`]
//! 4. hand the reports to the transport of the active [`TransportMode`]
//!
//! ## Feature flags
#![doc = document_features::document_features!()]
#![cfg_attr(not(test), no_std)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod ble;
pub mod boot;
pub mod channel;
pub mod config;
pub mod dispatcher;
pub mod event;
pub mod gesture;
pub mod hid;
pub mod keyboard;
pub mod keymap;
pub mod layout;
pub mod layout_macro;
pub mod mode;
pub mod reporter;
pub mod state;
pub mod storage;
#[cfg(feature = "usb")]
pub mod usb;
pub mod watchdog;
pub mod wireless;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
pub use tribridge_types as types;
pub use tribridge_types::{Coordinate, TransportMode};

/// Mutex used by every channel and signal in the crate
pub type RawMutex = CriticalSectionRawMutex;

/// Upper bound of simultaneously active coordinates in one key event
pub const MAX_ACTIVE_KEYS: usize = 128;
/// Number of user visible BLE host slots, selected by `Fn+8`, `Fn+9` and `Fn+0`
pub const NUM_HOST_SLOTS: usize = 3;
/// Upper bound of bonds the BLE stack reports when enumerating
pub const MAX_BONDED_DEVICES: usize = 8;
/// Capacity of the key event channel
pub const KEY_EVENT_CHANNEL_SIZE: usize = 16;
/// Capacity of the BLE event channel
pub const BLE_EVENT_CHANNEL_SIZE: usize = 8;
/// Capacity of the USB report queue
pub const REPORT_CHANNEL_SIZE: usize = 10;
/// Capacity of the mode request channel
pub const MODE_REQUEST_CHANNEL_SIZE: usize = 2;
