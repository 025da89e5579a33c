//! Suspend state is global, so this lives in its own test binary.

mod common;
pub(crate) use crate::common::*;

mod usb_suspend_test {
    use super::*;

    use embassy_futures::block_on;
    use embassy_sync::channel::Channel;
    use embassy_time::Duration;
    use tribridge::channel::USB_REMOTE_WAKEUP;
    use tribridge::hid::HidReport;
    use tribridge::reporter::UsbReporter;
    use tribridge::state::{is_usb_suspended, set_usb_suspended};
    use tribridge::{REPORT_CHANNEL_SIZE, RawMutex};

    #[test]
    fn test_report_while_suspended_wakes_host_and_discards_queue() {
        block_on(async {
            let reports: Channel<RawMutex, HidReport, REPORT_CHANNEL_SIZE> = Channel::new();
            let mut reporter = UsbReporter::new(MockHidWriter::default(), &reports, Duration::from_millis(10));

            set_usb_suspended(true);
            assert!(is_usb_suspended());
            reports.try_send(boot(0, [4, 0, 0, 0, 0, 0])).unwrap();
            reports.try_send(HidReport::empty_keyboard()).unwrap();
            reporter.send_next().await;

            assert!(reporter.writer().written.is_empty());
            assert!(reports.is_empty());
            assert!(USB_REMOTE_WAKEUP.try_take().is_some());

            // Resumed, reports flow again
            set_usb_suspended(false);
            reports.try_send(HidReport::empty_keyboard()).unwrap();
            reporter.send_next().await;
            assert_eq!(reporter.writer().written, vec![HidReport::empty_keyboard()]);
            assert!(USB_REMOTE_WAKEUP.try_take().is_none());
        });
    }
}
