//! Frames of the proprietary 2.4 GHz link.
//!
//! Every frame is 8 bytes: `[modifiers, fn_flag, ascii_decimal_keycode..., 0...]`.
//! The receiver dongle parses the decimal text back into a keycode, or into a
//! consumer usage when `fn_flag` is set.

use core::fmt::Write;
use core::future::Future;

use heapless::String;

use crate::hid::{HidError, HidReport, nkro_keycodes};
use crate::keymap::ResolvedInput;
use crate::types::modifier::HidModifiers;

pub const WIRELESS_FRAME_SIZE: usize = 8;
const CODE_TEXT_SIZE: usize = WIRELESS_FRAME_SIZE - 2;

/// Sends raw frames to a peer over the 2.4 GHz link
pub trait WirelessLink {
    fn send_frame(&mut self, peer: &[u8; 6], frame: &[u8; WIRELESS_FRAME_SIZE]) -> impl Future<Output = Result<(), HidError>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WirelessFrame([u8; WIRELESS_FRAME_SIZE]);

impl WirelessFrame {
    /// First frame of a release, clears keys and modifiers
    pub const RELEASED: Self = WirelessFrame([0; WIRELESS_FRAME_SIZE]);
    /// Second frame of a release, clears consumer controls
    pub const FUNCTION_RELEASED: Self = WirelessFrame([0, 1, 0, 0, 0, 0, 0, 0]);

    pub fn new(modifiers: HidModifiers, fn_flag: bool, code: u16) -> Self {
        let mut frame = [0; WIRELESS_FRAME_SIZE];
        frame[0] = modifiers.into_bits();
        frame[1] = fn_flag as u8;
        let mut text: String<CODE_TEXT_SIZE> = String::new();
        // u16 is at most 5 digits
        let _ = write!(text, "{}", code);
        frame[2..2 + text.len()].copy_from_slice(text.as_bytes());
        WirelessFrame(frame)
    }

    /// Frame for a resolved key batch, a consumer usage wins over the last keycode
    pub fn from_resolved(input: &ResolvedInput) -> Self {
        match input.consumer {
            Some(usage) => Self::new(input.modifiers, input.layer_trigger_active, usage.into()),
            None => Self::new(input.modifiers, input.layer_trigger_active, input.last_keycode as u16),
        }
    }

    /// Frame carrying the same key state as a HID report.
    ///
    /// Empty keyboard reports map to [`WirelessFrame::RELEASED`] and the empty consumer
    /// report to [`WirelessFrame::FUNCTION_RELEASED`].
    pub fn from_report(report: &HidReport) -> Self {
        if report.is_empty() {
            return match report {
                HidReport::Consumer { .. } => Self::FUNCTION_RELEASED,
                _ => Self::RELEASED,
            };
        }
        match report {
            HidReport::BootKeyboard { modifiers, keycodes } => {
                let code = keycodes.iter().rev().find(|k| **k != 0).copied().unwrap_or(0);
                Self::new(*modifiers, false, code as u16)
            }
            HidReport::NkroKeyboard { modifiers, bitmap } => {
                let code = nkro_keycodes(bitmap).last().map(|k| k as u16).unwrap_or(0);
                Self::new(*modifiers, false, code)
            }
            HidReport::Consumer { usage } => Self::new(HidModifiers::new(), true, *usage),
        }
    }

    pub fn as_bytes(&self) -> &[u8; WIRELESS_FRAME_SIZE] {
        &self.0
    }
}
