//! Control gestures typed on the function layer.

use crate::config::GestureConfig;
use crate::keymap::ResolvedInput;
use crate::types::TransportMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gesture {
    /// Persist a new transport mode and restart
    ModeChange(TransportMode),
    /// Reconnect to the host saved in the slot
    ReconnectHost(u8),
    /// Pair a new host into the slot
    PairNewHost(u8),
    /// Forget every saved host
    WipeHosts,
}

impl GestureConfig {
    /// Find the gesture typed by a resolved batch.
    ///
    /// Gestures need the function layer and are keyed by the last pressed keycode.
    /// A mode change to the current mode is not a gesture, and host gestures only
    /// exist in BLE mode.
    pub fn detect(&self, input: &ResolvedInput, current_mode: TransportMode) -> Option<Gesture> {
        if !input.layer_trigger_active {
            return None;
        }
        let key = input.last_keycode;

        let mode = if key == self.usb_mode_key {
            Some(TransportMode::Usb)
        } else if key == self.ble_mode_key {
            Some(TransportMode::Ble)
        } else if key == self.wireless_mode_key {
            Some(TransportMode::Wireless)
        } else {
            None
        };
        if let Some(mode) = mode {
            return (mode != current_mode).then_some(Gesture::ModeChange(mode));
        }

        if current_mode != TransportMode::Ble {
            return None;
        }
        if let Some(position) = self.host_keys.iter().position(|k| *k == key) {
            let slot = position as u8 + 1;
            return Some(if input.right_shift_active {
                Gesture::PairNewHost(slot)
            } else {
                Gesture::ReconnectHost(slot)
            });
        }
        (key == self.wipe_key).then_some(Gesture::WipeHosts)
    }
}
