//! Routes reports to the transport of the active mode.

use core::future::Future;

use embassy_sync::channel::{Channel, TrySendError};
use embassy_time::{Duration, with_timeout};

use crate::hid::{HidError, HidReport, MAX_REPORT_SIZE, ReportId};
use crate::types::TransportMode;
use crate::wireless::{WirelessFrame, WirelessLink};
use crate::{REPORT_CHANNEL_SIZE, RawMutex};

/// The HID service of the BLE stack
pub trait BleHidTransport {
    /// Whether a central is connected and subscribed to input reports
    fn is_connected(&self) -> bool;

    /// Notify the input report characteristic of `id` with `value`, report id excluded
    fn send_value(&mut self, id: ReportId, value: &[u8]) -> impl Future<Output = Result<(), HidError>>;
}

/// Sends reports over USB, BLE or the 2.4 GHz link.
///
/// USB reports are queued for the USB writer task. BLE and 2.4 GHz reports are sent
/// directly and bounded by the send timeout.
pub struct Dispatcher<'a, B, W> {
    usb_reports: &'a Channel<RawMutex, HidReport, REPORT_CHANNEL_SIZE>,
    ble: B,
    wireless: W,
    peer_address: [u8; 6],
    send_timeout: Duration,
}

impl<'a, B: BleHidTransport, W: WirelessLink> Dispatcher<'a, B, W> {
    pub fn new(
        usb_reports: &'a Channel<RawMutex, HidReport, REPORT_CHANNEL_SIZE>,
        ble: B,
        wireless: W,
        peer_address: [u8; 6],
        send_timeout: Duration,
    ) -> Self {
        Self {
            usb_reports,
            ble,
            wireless,
            peer_address,
            send_timeout,
        }
    }

    pub async fn dispatch(&mut self, mode: TransportMode, report: &HidReport) -> Result<(), HidError> {
        match mode {
            TransportMode::Usb => {
                self.enqueue_usb(*report);
                Ok(())
            }
            TransportMode::Ble => self.send_ble(report).await,
            TransportMode::Wireless => self.send_frame(&WirelessFrame::from_report(report)).await,
        }
    }

    /// Queue a report for the USB writer, the oldest queued report is dropped when the queue is full.
    ///
    /// Returns false if a report had to be dropped.
    pub fn enqueue_usb(&self, report: HidReport) -> bool {
        match self.usb_reports.try_send(report) {
            Ok(()) => true,
            Err(TrySendError::Full(report)) => {
                warn!("USB report queue is full, dropping the oldest report");
                let _ = self.usb_reports.try_receive();
                if self.usb_reports.try_send(report).is_err() {
                    error!("Failed to queue USB report");
                }
                false
            }
        }
    }

    pub async fn send_ble(&mut self, report: &HidReport) -> Result<(), HidError> {
        if !self.ble.is_connected() {
            return Err(HidError::BleDisconnected);
        }
        let mut buf = [0u8; MAX_REPORT_SIZE];
        let n = report.serialize_payload(&mut buf)?;
        with_timeout(self.send_timeout, self.ble.send_value(report.report_id(), &buf[..n]))
            .await
            .map_err(|_| HidError::Timeout)?
    }

    pub async fn send_frame(&mut self, frame: &WirelessFrame) -> Result<(), HidError> {
        with_timeout(
            self.send_timeout,
            self.wireless.send_frame(&self.peer_address, frame.as_bytes()),
        )
        .await
        .map_err(|_| HidError::Timeout)?
    }

    pub fn ble(&self) -> &B {
        &self.ble
    }

    pub fn ble_mut(&mut self) -> &mut B {
        &mut self.ble
    }

    pub fn wireless(&self) -> &W {
        &self.wireless
    }
}
