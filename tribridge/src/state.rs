use core::sync::atomic::{AtomicBool, Ordering};

/// Whether the USB bus is currently suspended by the host
pub(crate) static USB_SUSPENDED: AtomicBool = AtomicBool::new(false);
/// Whether the USB device has been configured by the host
pub(crate) static USB_CONFIGURED: AtomicBool = AtomicBool::new(false);

pub fn is_usb_suspended() -> bool {
    USB_SUSPENDED.load(Ordering::Acquire)
}

pub fn is_usb_configured() -> bool {
    USB_CONFIGURED.load(Ordering::Acquire)
}

/// Record a bus suspend or resume, called by the USB device handler or by board code
/// that tracks the bus itself.
pub fn set_usb_suspended(suspended: bool) {
    USB_SUSPENDED.store(suspended, Ordering::Release);
}

pub fn set_usb_configured(configured: bool) {
    USB_CONFIGURED.store(configured, Ordering::Release);
}
