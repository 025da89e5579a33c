//! USB transport: device builder, HID writer and the device task.

pub mod descriptor;

use embassy_futures::select::{Either, select};
use embassy_usb::class::hid::{Config as HidConfig, HidBootProtocol, HidSubclass, HidWriter, ReportId, RequestHandler, State};
use embassy_usb::control::OutResponse;
use embassy_usb::driver::{Driver, EndpointError};
use embassy_usb::{Builder, Handler, UsbDevice};
use static_cell::StaticCell;

use self::descriptor::COMPOSITE_REPORT_DESCRIPTOR;
use crate::channel::USB_REMOTE_WAKEUP;
use crate::config::KeyboardUsbConfig;
use crate::hid::{HidError, HidReport, HidWriterTrait, MAX_REPORT_SIZE};
use crate::state::{set_usb_configured, set_usb_suspended};

/// Size of the HID IN endpoint
pub const USB_HID_WRITER_SIZE: usize = 32;

/// Writes [`HidReport`]s to the composite keyboard interface
pub struct UsbKeyboardWriter<'d, D: Driver<'d>> {
    writer: HidWriter<'d, D, USB_HID_WRITER_SIZE>,
}

impl<'d, D: Driver<'d>> UsbKeyboardWriter<'d, D> {
    pub fn new(writer: HidWriter<'d, D, USB_HID_WRITER_SIZE>) -> Self {
        Self { writer }
    }
}

impl<'d, D: Driver<'d>> HidWriterTrait for UsbKeyboardWriter<'d, D> {
    async fn write_report(&mut self, report: &HidReport) -> Result<usize, HidError> {
        let mut buf = [0u8; MAX_REPORT_SIZE];
        let n = report.serialize_into(&mut buf)?;
        self.writer.write(&buf[..n]).await.map_err(|e| match e {
            EndpointError::BufferOverflow => HidError::BufferOverflow,
            EndpointError::Disabled => HidError::UsbDisabled,
        })?;
        Ok(n)
    }
}

pub fn new_usb_builder<D: Driver<'static>>(driver: D, keyboard_config: KeyboardUsbConfig<'static>) -> Builder<'static, D> {
    let mut usb_config = embassy_usb::Config::new(keyboard_config.vid, keyboard_config.pid);
    usb_config.manufacturer = Some(keyboard_config.manufacturer);
    usb_config.product = Some(keyboard_config.product_name);
    usb_config.serial_number = Some(keyboard_config.serial_number);
    usb_config.max_power = 450;
    usb_config.supports_remote_wakeup = true;

    // Composite device with IADs, needed by Windows
    usb_config.max_packet_size_0 = 64;
    usb_config.device_class = 0xEF;
    usb_config.device_sub_class = 0x02;
    usb_config.device_protocol = 0x01;
    usb_config.composite_with_iads = true;

    const USB_BUF_SIZE: usize = 128;

    static CONFIG_DESC: StaticCell<[u8; USB_BUF_SIZE]> = StaticCell::new();
    static BOS_DESC: StaticCell<[u8; 16]> = StaticCell::new();
    static MSOS_DESC: StaticCell<[u8; 16]> = StaticCell::new();
    static CONTROL_BUF: StaticCell<[u8; USB_BUF_SIZE]> = StaticCell::new();

    let mut builder = Builder::new(
        driver,
        usb_config,
        &mut CONFIG_DESC.init([0; USB_BUF_SIZE])[..],
        &mut BOS_DESC.init([0; 16])[..],
        &mut MSOS_DESC.init([0; 16])[..],
        &mut CONTROL_BUF.init([0; USB_BUF_SIZE])[..],
    );

    static DEVICE_HANDLER: StaticCell<UsbDeviceHandler> = StaticCell::new();
    builder.handler(DEVICE_HANDLER.init(UsbDeviceHandler::default()));

    builder
}

/// Add the composite keyboard interface to the builder.
///
/// Can only be called once, the interface state lives in a static.
pub fn add_keyboard_writer<D: Driver<'static>>(builder: &mut Builder<'static, D>) -> UsbKeyboardWriter<'static, D> {
    static STATE: StaticCell<State> = StaticCell::new();
    static REQUEST_HANDLER: StaticCell<UsbRequestHandler> = StaticCell::new();

    let hid_config = HidConfig {
        report_descriptor: COMPOSITE_REPORT_DESCRIPTOR,
        request_handler: Some(REQUEST_HANDLER.init(UsbRequestHandler {})),
        poll_ms: 1,
        max_packet_size: 64,
        hid_subclass: HidSubclass::No,
        hid_boot_protocol: HidBootProtocol::None,
    };

    UsbKeyboardWriter::new(HidWriter::new(builder, STATE.init(State::new()), hid_config))
}

/// Run the USB device, waking the host up when a report is queued during suspend.
pub async fn run_usb_device<D: Driver<'static>>(mut device: UsbDevice<'static, D>) -> ! {
    loop {
        device.run_until_suspend().await;
        match select(device.wait_resume(), USB_REMOTE_WAKEUP.wait()).await {
            Either::First(_) => debug!("USB bus resumed by the host"),
            Either::Second(_) => {
                info!("Waking up the host");
                if let Err(e) = device.remote_wakeup().await {
                    warn!("Remote wakeup failed: {:?}", e);
                }
            }
        }
    }
}

/// Accepts the LED output report, the keyboard core has no indicators
pub(crate) struct UsbRequestHandler {}

impl RequestHandler for UsbRequestHandler {
    fn set_report(&mut self, id: ReportId, data: &[u8]) -> OutResponse {
        debug!("Host output report {:?}: {:?}", id, data);
        OutResponse::Accepted
    }
}

/// Mirrors the bus state into [`crate::state`]
#[derive(Default)]
pub(crate) struct UsbDeviceHandler {}

impl Handler for UsbDeviceHandler {
    fn enabled(&mut self, enabled: bool) {
        debug!("USB peripheral enabled: {}", enabled);
        if !enabled {
            set_usb_configured(false);
            set_usb_suspended(false);
        }
    }

    fn reset(&mut self) {
        debug!("USB bus reset");
        set_usb_configured(false);
    }

    fn configured(&mut self, configured: bool) {
        info!("USB configured: {}", configured);
        set_usb_configured(configured);
    }

    fn suspended(&mut self, suspended: bool) {
        info!("USB suspended: {}", suspended);
        set_usb_suspended(suspended);
    }
}
