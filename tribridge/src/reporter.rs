//! The task that drains the USB report queue into a HID writer.

use embassy_sync::channel::Channel;
use embassy_time::{Duration, with_timeout};

use crate::channel::USB_REMOTE_WAKEUP;
use crate::hid::{HidError, HidReport, HidWriterTrait, RunnableHidWriter};
use crate::state::is_usb_suspended;
use crate::{REPORT_CHANNEL_SIZE, RawMutex};

/// Sends queued reports through `W`, one at a time.
///
/// A write that doesn't finish within `send_timeout` is dropped. While the bus is
/// suspended, a queued report wakes the host up and the queue is discarded.
pub struct UsbReporter<'a, W: HidWriterTrait> {
    writer: W,
    reports: &'a Channel<RawMutex, HidReport, REPORT_CHANNEL_SIZE>,
    send_timeout: Duration,
}

impl<'a, W: HidWriterTrait> UsbReporter<'a, W> {
    pub fn new(writer: W, reports: &'a Channel<RawMutex, HidReport, REPORT_CHANNEL_SIZE>, send_timeout: Duration) -> Self {
        Self {
            writer,
            reports,
            send_timeout,
        }
    }

    /// Wait for the next queued report and deliver it
    pub async fn send_next(&mut self) {
        let report = self.get_report().await;
        if is_usb_suspended() {
            info!("USB is suspended, discarding queued reports and waking up the host");
            self.reports.clear();
            USB_REMOTE_WAKEUP.signal(());
            return;
        }
        if let Err(e) = self.write_report(&report).await {
            warn!("Report not sent: {:?}", e);
        }
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }
}

impl<W: HidWriterTrait> HidWriterTrait for UsbReporter<'_, W> {
    async fn write_report(&mut self, report: &HidReport) -> Result<usize, HidError> {
        match with_timeout(self.send_timeout, self.writer.write_report(report)).await {
            Ok(result) => result,
            Err(_) => Err(HidError::Timeout),
        }
    }
}

impl<W: HidWriterTrait> RunnableHidWriter for UsbReporter<'_, W> {
    async fn get_report(&mut self) -> HidReport {
        self.reports.receive().await
    }

    async fn run_writer(&mut self) {
        loop {
            self.send_next().await;
        }
    }
}
