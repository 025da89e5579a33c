//! # tribridge types
//!
//! Value types shared by the tribridge keyboard core and board code.
//!
//! - [`keycode`] - HID keyboard page usages
//! - [`modifier`] - The modifier byte of a keyboard report
//! - [`consumer`] - HID consumer page usages
//! - [`symbol`] - What one cell of a layer table means
//! - [`Coordinate`] and [`TransportMode`]

#![no_std]

pub mod consumer;
pub mod keycode;
pub mod modifier;
pub mod symbol;

use postcard::experimental::max_size::MaxSize;
use serde::{Deserialize, Serialize};
use strum::FromRepr;

/// One intersection of the key matrix, `(output_index, input_index)`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, MaxSize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Coordinate {
    pub output: u8,
    pub input: u8,
}

impl Coordinate {
    pub const fn new(output: u8, input: u8) -> Self {
        Self { output, input }
    }
}

/// The transport that carries HID reports to the host.
///
/// The discriminant is the value persisted under the `mode` key.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize, FromRepr)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportMode {
    #[default]
    Usb = 0,
    Ble = 1,
    Wireless = 2,
}

impl TransportMode {
    /// Parse a persisted mode value, `None` for anything outside 0..=2
    pub fn from_i32(value: i32) -> Option<Self> {
        u8::try_from(value).ok().and_then(Self::from_repr)
    }

    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_mode_parses_persisted_values() {
        assert_eq!(TransportMode::from_i32(0), Some(TransportMode::Usb));
        assert_eq!(TransportMode::from_i32(1), Some(TransportMode::Ble));
        assert_eq!(TransportMode::from_i32(2), Some(TransportMode::Wireless));
        assert_eq!(TransportMode::from_i32(3), None);
        assert_eq!(TransportMode::from_i32(-1), None);
        assert_eq!(TransportMode::Wireless.as_i32(), 2);
    }
}
