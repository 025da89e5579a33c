mod common;
pub(crate) use crate::common::*;

mod usb_reporter_test {
    use super::*;

    use embassy_futures::block_on;
    use embassy_sync::channel::Channel;
    use embassy_time::{Duration, MockDriver};
    use futures::join;
    use tribridge::dispatcher::Dispatcher;
    use tribridge::hid::{HidError, HidReport, HidWriterTrait};
    use tribridge::reporter::UsbReporter;
    use tribridge::{REPORT_CHANNEL_SIZE, RawMutex, TransportMode};

    fn key(code: u8) -> HidReport {
        boot(0, [code, 0, 0, 0, 0, 0])
    }

    #[test]
    fn test_queued_reports_are_written_in_order() {
        block_on(async {
            let reports: Channel<RawMutex, HidReport, REPORT_CHANNEL_SIZE> = Channel::new();
            let mut dispatcher = Dispatcher::new(
                &reports,
                MockBle::default(),
                MockWireless::default(),
                [0; 6],
                Duration::from_millis(10),
            );
            let mut reporter = UsbReporter::new(MockHidWriter::default(), &reports, Duration::from_millis(10));

            dispatcher.dispatch(TransportMode::Usb, &key(4)).await.unwrap();
            dispatcher
                .dispatch(TransportMode::Usb, &HidReport::empty_consumer())
                .await
                .unwrap();
            reporter.send_next().await;
            reporter.send_next().await;

            assert_eq!(reporter.writer().written, vec![key(4), HidReport::empty_consumer()]);
        });
    }

    #[test]
    fn test_full_queue_drops_oldest_report() {
        let reports: Channel<RawMutex, HidReport, REPORT_CHANNEL_SIZE> = Channel::new();
        let dispatcher = Dispatcher::new(
            &reports,
            MockBle::default(),
            MockWireless::default(),
            [0; 6],
            Duration::from_millis(10),
        );

        for code in 0..REPORT_CHANNEL_SIZE as u8 {
            assert!(dispatcher.enqueue_usb(key(4 + code)));
        }
        assert!(!dispatcher.enqueue_usb(key(0x30)));

        let mut queued = Vec::new();
        while let Ok(report) = reports.try_receive() {
            queued.push(report);
        }
        assert_eq!(queued.len(), REPORT_CHANNEL_SIZE);
        assert_eq!(queued.first(), Some(&key(5)));
        assert_eq!(queued.last(), Some(&key(0x30)));
    }

    #[test]
    fn test_stalled_write_times_out() {
        block_on(async {
            let reports: Channel<RawMutex, HidReport, REPORT_CHANNEL_SIZE> = Channel::new();
            let writer = MockHidWriter {
                stall: true,
                ..Default::default()
            };
            let mut reporter = UsbReporter::new(writer, &reports, Duration::from_millis(10));

            let report = key(4);
            let (result, _) = join!(reporter.write_report(&report), async {
                MockDriver::get().advance(Duration::from_millis(10));
            });
            assert_eq!(result, Err(HidError::Timeout));
            assert!(reporter.writer().written.is_empty());
        });
    }

    #[test]
    fn test_write_returns_report_length() {
        block_on(async {
            let reports: Channel<RawMutex, HidReport, REPORT_CHANNEL_SIZE> = Channel::new();
            let mut reporter = UsbReporter::new(MockHidWriter::default(), &reports, Duration::from_millis(10));

            assert_eq!(reporter.write_report(&key(4)).await, Ok(9));
            assert_eq!(reporter.write_report(&HidReport::empty_nkro()).await, Ok(17));
            assert_eq!(reporter.write_report(&HidReport::empty_consumer()).await, Ok(3));
        });
    }
}
