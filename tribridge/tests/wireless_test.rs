mod common;
pub(crate) use crate::common::*;

mod wireless_test {
    use super::*;

    use embassy_futures::block_on;
    use tribridge::TransportMode;
    use tribridge::config::WirelessConfig;
    use tribridge::storage::{MODE_KEY, MemoryStore, write_i32};
    use tribridge::wireless::WirelessFrame;

    async fn wireless_keyboard(channels: &TestChannels) -> TestKeyboard<'_> {
        let mut store = MemoryStore::new();
        write_i32(&mut store, MODE_KEY, TransportMode::Wireless.as_i32()).await.unwrap();
        create_test_keyboard(channels, store, MockBle::default()).await
    }

    fn frames(keyboard: &TestKeyboard<'_>) -> Vec<[u8; 8]> {
        keyboard.dispatcher().wireless().frames.iter().map(|(_, f)| *f).collect()
    }

    #[test]
    fn test_key_press_frame() {
        block_on(async {
            let channels = TestChannels::new();
            let mut keyboard = wireless_keyboard(&channels).await;

            keyboard.process_key_event(&press(&[LEFT_SHIFT, KEY_A])).await;
            let sent = &keyboard.dispatcher().wireless().frames;
            assert_eq!(sent.len(), 1);
            assert_eq!(sent[0].0, WirelessConfig::default().peer_address);
            assert_eq!(sent[0].1, [0x02, 0, b'4', 0, 0, 0, 0, 0]);
            assert!(channels.usb_reports().is_empty());
        });
    }

    #[test]
    fn test_consumer_frame_sets_fn_flag() {
        block_on(async {
            let channels = TestChannels::new();
            let mut keyboard = wireless_keyboard(&channels).await;

            // Fn + F12 is volume up, usage 233
            keyboard.process_key_event(&press(&[LAYER_KEY, KEY_F12])).await;
            assert_eq!(frames(&keyboard), vec![[0, 1, b'2', b'3', b'3', 0, 0, 0]]);
        });
    }

    #[test]
    fn test_release_sends_two_frames() {
        block_on(async {
            let channels = TestChannels::new();
            let mut keyboard = wireless_keyboard(&channels).await;

            keyboard.process_key_event(&press(&[KEY_D])).await;
            keyboard.process_key_event(&release(1)).await;
            assert_eq!(
                frames(&keyboard),
                vec![
                    [0, 0, b'7', 0, 0, 0, 0, 0],
                    *WirelessFrame::RELEASED.as_bytes(),
                    *WirelessFrame::FUNCTION_RELEASED.as_bytes(),
                ]
            );
            assert!(channels.usb_reports().is_empty());
        });
    }

    #[test]
    fn test_last_key_of_batch_is_sent() {
        block_on(async {
            let channels = TestChannels::new();
            let mut keyboard = wireless_keyboard(&channels).await;

            // S then A, A is 4
            keyboard.process_key_event(&press(&[KEY_S, KEY_A])).await;
            assert_eq!(frames(&keyboard), vec![[0, 0, b'4', 0, 0, 0, 0, 0]]);
        });
    }

    #[test]
    fn test_link_failure_is_not_fatal() {
        block_on(async {
            let channels = TestChannels::new();
            let mut store = MemoryStore::new();
            write_i32(&mut store, MODE_KEY, TransportMode::Wireless.as_i32()).await.unwrap();
            let wireless = MockWireless {
                fail: true,
                ..Default::default()
            };
            let mut keyboard = create_test_keyboard_with(&channels, store, MockBle::default(), wireless).await;

            keyboard.process_key_event(&press(&[KEY_A])).await;
            keyboard.process_key_event(&release(1)).await;
            assert!(frames(&keyboard).is_empty());
            assert_eq!(keyboard.mode(), TransportMode::Wireless);
            assert!(channels.usb_reports().is_empty());
        });
    }
}
