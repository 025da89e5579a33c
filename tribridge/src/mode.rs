//! Selection and persistence of the transport mode.

use crate::boot::Restart;
use crate::storage::{MODE_KEY, Store, StoreError, read_i32, write_i32};
use crate::types::TransportMode;

/// Owns the transport mode of this boot.
///
/// The mode never changes while running: a mode change is written to the store and
/// then the keyboard restarts into it.
#[derive(Debug, Default, Clone, Copy)]
pub struct ModeManager {
    current: TransportMode,
}

impl ModeManager {
    pub fn new(current: TransportMode) -> Self {
        Self { current }
    }

    /// Read the persisted mode, a missing or invalid value falls back to USB
    pub async fn load<S: Store>(store: &mut S) -> Self {
        let current = match read_i32(store, MODE_KEY).await {
            Ok(Some(value)) => TransportMode::from_i32(value).unwrap_or_else(|| {
                warn!("Invalid persisted mode {}, using USB", value);
                TransportMode::Usb
            }),
            Ok(None) => TransportMode::Usb,
            Err(e) => {
                error!("Failed to read mode: {:?}, using USB", e);
                TransportMode::Usb
            }
        };
        info!("Transport mode: {:?}", current);
        Self { current }
    }

    pub fn current(&self) -> TransportMode {
        self.current
    }

    /// Persist `new_mode` and restart into it.
    ///
    /// Returns `Ok(false)` without touching the store if `new_mode` is already active.
    /// If persisting fails the keyboard keeps running in the current mode.
    pub async fn change_mode<S: Store, R: Restart>(
        &mut self,
        new_mode: TransportMode,
        store: &mut S,
        restart: &mut R,
    ) -> Result<bool, StoreError> {
        if new_mode == self.current {
            debug!("Already in {:?} mode", new_mode);
            return Ok(false);
        }
        write_i32(store, MODE_KEY, new_mode.as_i32()).await?;
        info!("Switching from {:?} to {:?}, restarting", self.current, new_mode);
        restart.restart();
        Ok(true)
    }
}
