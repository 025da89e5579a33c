//! The keyboard task: key events in, reports out.

use embassy_futures::select::{Either4, select4};
use embassy_sync::channel::Channel;
use embassy_time::Timer;

use crate::ble::BleController;
use crate::ble::manager::BleHostManager;
use crate::boot::Restart;
use crate::config::{GestureConfig, KeyboardConfig, TimingConfig};
use crate::dispatcher::{BleHidTransport, Dispatcher};
use crate::event::{BleEvent, KeyEdge, KeyEvent};
use crate::gesture::Gesture;
use crate::hid::{HidReport, ReportEncoder};
use crate::keymap::{KeyMap, ResolvedInput, ResolverState};
use crate::mode::ModeManager;
use crate::storage::Store;
use crate::types::TransportMode;
use crate::watchdog::Watchdog;
use crate::wireless::{WirelessFrame, WirelessLink};
use crate::{BLE_EVENT_CHANNEL_SIZE, KEY_EVENT_CHANNEL_SIZE, MODE_REQUEST_CHANNEL_SIZE, RawMutex};

/// Owns every piece of mutable state of the keyboard core.
///
/// Key events and BLE events are processed one at a time, in the order they arrive.
pub struct Keyboard<'a, const ROW: usize, const COL: usize, S, B, W, R, D>
where
    S: Store,
    B: BleHidTransport + BleController,
    W: WirelessLink,
    R: Restart,
    D: Watchdog,
{
    keymap: KeyMap<'a, ROW, COL>,
    resolver_state: ResolverState,
    encoder: ReportEncoder,
    dispatcher: Dispatcher<'a, B, W>,
    mode: ModeManager,
    ble_manager: BleHostManager,
    store: S,
    restart: R,
    watchdog: D,
    key_events: &'a Channel<RawMutex, KeyEvent, KEY_EVENT_CHANNEL_SIZE>,
    ble_events: &'a Channel<RawMutex, BleEvent, BLE_EVENT_CHANNEL_SIZE>,
    mode_requests: &'a Channel<RawMutex, TransportMode, MODE_REQUEST_CHANNEL_SIZE>,
    gesture: GestureConfig,
    timing: TimingConfig,
}

impl<'a, const ROW: usize, const COL: usize, S, B, W, R, D> Keyboard<'a, ROW, COL, S, B, W, R, D>
where
    S: Store,
    B: BleHidTransport + BleController,
    W: WirelessLink,
    R: Restart,
    D: Watchdog,
{
    /// Create the keyboard, the transport mode and the BLE hosts are restored from `store`
    pub async fn new(
        keymap: KeyMap<'a, ROW, COL>,
        config: KeyboardConfig<'a>,
        mut store: S,
        ble: B,
        wireless: W,
        restart: R,
        watchdog: D,
    ) -> Self {
        let mode = ModeManager::load(&mut store).await;
        let ble_manager = BleHostManager::load(&mut store).await;
        let channels = config.channel_config;
        Self {
            keymap,
            resolver_state: ResolverState::default(),
            encoder: ReportEncoder::new(),
            dispatcher: Dispatcher::new(
                channels.usb_reports,
                ble,
                wireless,
                config.wireless.peer_address,
                config.timing.send_timeout,
            ),
            mode,
            ble_manager,
            store,
            restart,
            watchdog,
            key_events: channels.key_events,
            ble_events: channels.ble_events,
            mode_requests: channels.mode_requests,
            gesture: config.gesture,
            timing: config.timing,
        }
    }

    /// Main keyboard task
    pub async fn run(&mut self) -> ! {
        self.start().await;
        loop {
            self.step().await;
        }
    }

    /// Bring up the transport of the current mode
    pub async fn start(&mut self) {
        if self.mode.current() == TransportMode::Ble {
            self.ble_manager.start(self.dispatcher.ble_mut()).await;
        }
    }

    /// Wait for one key event, BLE event or mode request and process it, or for the watchdog tick
    pub async fn step(&mut self) {
        let next = select4(
            self.key_events.receive(),
            self.ble_events.receive(),
            self.mode_requests.receive(),
            Timer::after(self.timing.watchdog_feed_interval),
        )
        .await;
        match next {
            Either4::First(event) => self.process_key_event(&event).await,
            Either4::Second(event) => self.process_ble_event(event).await,
            Either4::Third(mode) => self.request_mode(mode).await,
            Either4::Fourth(_) => {}
        }
        self.watchdog.feed();
    }

    pub async fn process_key_event(&mut self, event: &KeyEvent) {
        // The function layer is momentary
        self.resolver_state.reset();
        match event.edge() {
            KeyEdge::Pressed => self.process_press(event).await,
            KeyEdge::Released => self.send_release().await,
            KeyEdge::Unchanged => {}
        }
    }

    pub async fn process_ble_event(&mut self, event: BleEvent) {
        self.ble_manager
            .handle_event(event, &mut self.store, self.dispatcher.ble_mut())
            .await;
    }

    async fn process_press(&mut self, event: &KeyEvent) {
        let resolved = self
            .keymap
            .resolve(&event.active, self.resolver_state.fn_layer_active);
        self.resolver_state.update(&resolved);

        let mode = self.mode.current();
        if let Some(gesture) = self.gesture.detect(&resolved, mode) {
            self.run_gesture(gesture).await;
            return;
        }

        match mode {
            TransportMode::Wireless => self.send_frame(&WirelessFrame::from_resolved(&resolved)).await,
            _ => {
                for report in self.encoder.encode_all(&resolved) {
                    self.send_report(mode, &report).await;
                }
            }
        }
    }

    /// Clear keys, then consumer controls. Over 2.4 GHz these become the two release frames.
    async fn send_release(&mut self) {
        let mode = self.mode.current();
        for report in self.encoder.encode_all(&ResolvedInput::default()) {
            self.send_report(mode, &report).await;
        }
        self.release_gap().await;
        self.send_report(mode, &HidReport::empty_consumer()).await;
    }

    async fn release_gap(&self) {
        if self.timing.release_gap.as_ticks() > 0 {
            Timer::after(self.timing.release_gap).await;
        }
    }

    async fn send_report(&mut self, mode: TransportMode, report: &HidReport) {
        if let Err(e) = self.dispatcher.dispatch(mode, report).await {
            warn!("Failed to send report over {:?}: {:?}", mode, e);
        }
    }

    async fn send_frame(&mut self, frame: &WirelessFrame) {
        if let Err(e) = self.dispatcher.send_frame(frame).await {
            warn!("Failed to send wireless frame: {:?}", e);
        }
    }

    /// Switch to `mode` the same way the mode gesture does, used for the mode select pins
    pub async fn request_mode(&mut self, mode: TransportMode) {
        if let Err(e) = self.mode.change_mode(mode, &mut self.store, &mut self.restart).await {
            error!("Failed to persist mode {:?}, staying in {:?}: {:?}", mode, self.mode.current(), e);
        }
    }

    async fn run_gesture(&mut self, gesture: Gesture) {
        info!("Gesture: {:?}", gesture);
        match gesture {
            Gesture::ModeChange(mode) => self.request_mode(mode).await,
            Gesture::ReconnectHost(slot) => {
                self.ble_manager
                    .reconnect_saved_host(slot, &mut self.store, self.dispatcher.ble_mut())
                    .await
            }
            Gesture::PairNewHost(slot) => {
                // Failure is logged by the manager, the current bonds are untouched
                let _ = self.ble_manager.pair_new_host(slot, self.dispatcher.ble_mut()).await;
            }
            Gesture::WipeHosts => {
                self.ble_manager
                    .wipe_hosts(&mut self.store, self.dispatcher.ble_mut())
                    .await
            }
        }
    }

    pub fn mode(&self) -> TransportMode {
        self.mode.current()
    }

    pub fn ble_manager(&self) -> &BleHostManager {
        &self.ble_manager
    }

    pub fn resolver_state(&self) -> ResolverState {
        self.resolver_state
    }

    pub fn encoder(&self) -> &ReportEncoder {
        &self.encoder
    }

    pub fn dispatcher(&self) -> &Dispatcher<'a, B, W> {
        &self.dispatcher
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn restart_hook(&self) -> &R {
        &self.restart
    }

    pub fn watchdog(&self) -> &D {
        &self.watchdog
    }
}
