//! Report descriptor of the composite keyboard interface.
//!
//! One interface carries three top level collections: the 6KRO keyboard
//! (id 1), consumer control (id 3) and the NKRO bitmap keyboard (id 4).

use crate::hid::ReportId;

#[rustfmt::skip]
pub const COMPOSITE_REPORT_DESCRIPTOR: &[u8] = &[
    // Keyboard, 6KRO
    0x05, 0x01,                     // Usage Page (Generic Desktop)
    0x09, 0x06,                     // Usage (Keyboard)
    0xA1, 0x01,                     // Collection (Application)
    0x85, ReportId::Keyboard as u8, //   Report ID
    0x05, 0x07,                     //   Usage Page (Keyboard)
    0x19, 0xE0,                     //   Usage Minimum (Left Control)
    0x29, 0xE7,                     //   Usage Maximum (Right GUI)
    0x15, 0x00,                     //   Logical Minimum (0)
    0x25, 0x01,                     //   Logical Maximum (1)
    0x75, 0x01,                     //   Report Size (1)
    0x95, 0x08,                     //   Report Count (8)
    0x81, 0x02,                     //   Input (Data, Variable, Absolute)
    0x75, 0x08,                     //   Report Size (8)
    0x95, 0x01,                     //   Report Count (1)
    0x81, 0x01,                     //   Input (Constant), reserved byte
    0x05, 0x08,                     //   Usage Page (LEDs)
    0x19, 0x01,                     //   Usage Minimum (Num Lock)
    0x29, 0x05,                     //   Usage Maximum (Kana)
    0x95, 0x05,                     //   Report Count (5)
    0x75, 0x01,                     //   Report Size (1)
    0x91, 0x02,                     //   Output (Data, Variable, Absolute)
    0x95, 0x01,                     //   Report Count (1)
    0x75, 0x03,                     //   Report Size (3)
    0x91, 0x01,                     //   Output (Constant), padding
    0x05, 0x07,                     //   Usage Page (Keyboard)
    0x19, 0x00,                     //   Usage Minimum (0)
    0x2A, 0xFF, 0x00,               //   Usage Maximum (255)
    0x15, 0x00,                     //   Logical Minimum (0)
    0x26, 0xFF, 0x00,               //   Logical Maximum (255)
    0x75, 0x08,                     //   Report Size (8)
    0x95, 0x06,                     //   Report Count (6)
    0x81, 0x00,                     //   Input (Data, Array, Absolute)
    0xC0,                           // End Collection

    // Consumer control
    0x05, 0x0C,                     // Usage Page (Consumer)
    0x09, 0x01,                     // Usage (Consumer Control)
    0xA1, 0x01,                     // Collection (Application)
    0x85, ReportId::Consumer as u8, //   Report ID
    0x15, 0x00,                     //   Logical Minimum (0)
    0x26, 0xFF, 0x03,               //   Logical Maximum (0x3FF)
    0x19, 0x00,                     //   Usage Minimum (0)
    0x2A, 0xFF, 0x03,               //   Usage Maximum (0x3FF)
    0x75, 0x10,                     //   Report Size (16)
    0x95, 0x01,                     //   Report Count (1)
    0x81, 0x00,                     //   Input (Data, Array, Absolute)
    0xC0,                           // End Collection

    // Keyboard, NKRO bitmap
    0x05, 0x01,                     // Usage Page (Generic Desktop)
    0x09, 0x06,                     // Usage (Keyboard)
    0xA1, 0x01,                     // Collection (Application)
    0x85, ReportId::Nkro as u8,     //   Report ID
    0x05, 0x07,                     //   Usage Page (Keyboard)
    0x19, 0xE0,                     //   Usage Minimum (Left Control)
    0x29, 0xE7,                     //   Usage Maximum (Right GUI)
    0x15, 0x00,                     //   Logical Minimum (0)
    0x25, 0x01,                     //   Logical Maximum (1)
    0x75, 0x01,                     //   Report Size (1)
    0x95, 0x08,                     //   Report Count (8)
    0x81, 0x02,                     //   Input (Data, Variable, Absolute)
    0x05, 0x07,                     //   Usage Page (Keyboard)
    0x19, 0x04,                     //   Usage Minimum (A)
    0x29, 0x7B,                     //   Usage Maximum (Cut)
    0x15, 0x00,                     //   Logical Minimum (0)
    0x25, 0x01,                     //   Logical Maximum (1)
    0x75, 0x01,                     //   Report Size (1)
    0x95, 0x78,                     //   Report Count (120)
    0x81, 0x02,                     //   Input (Data, Variable, Absolute)
    0xC0,                           // End Collection
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collections_are_balanced() {
        let open = COMPOSITE_REPORT_DESCRIPTOR.windows(2).filter(|w| *w == [0xA1, 0x01]).count();
        let close = COMPOSITE_REPORT_DESCRIPTOR.iter().filter(|b| **b == 0xC0).count();
        assert_eq!(open, 3);
        assert_eq!(close, 3);
    }
}
