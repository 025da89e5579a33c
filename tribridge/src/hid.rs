//! HID reports, the report encoder and the traits used to write reports to the host.

use core::future::Future;

use heapless::Vec;

use crate::keymap::ResolvedInput;
use crate::types::consumer::ConsumerUsage;
use crate::types::keycode::{HidKeyCode, NKRO_FIRST_USAGE};
use crate::types::modifier::HidModifiers;

/// Number of keycode slots in a boot keyboard report
pub const BOOT_KEYCODE_SLOTS: usize = 6;
/// Size of the NKRO bitmap, one bit per usage 0x04..=0x7B
pub const NKRO_BITMAP_SIZE: usize = 15;
/// Largest serialized report, report id included
pub const MAX_REPORT_SIZE: usize = 2 + NKRO_BITMAP_SIZE;

/// Report ids of the composite HID descriptor
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReportId {
    Keyboard = 1,
    Consumer = 3,
    Nkro = 4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HidReport {
    /// 6 key rollover keyboard report, `[1, modifiers, 0, k0..k5]` on the wire
    BootKeyboard {
        modifiers: HidModifiers,
        keycodes: [u8; BOOT_KEYCODE_SLOTS],
    },
    /// Bitmap keyboard report, `[4, modifiers, bitmap[15]]` on the wire
    NkroKeyboard {
        modifiers: HidModifiers,
        bitmap: [u8; NKRO_BITMAP_SIZE],
    },
    /// Consumer control report, `[3, usage_lo, usage_hi]` on the wire
    Consumer { usage: u16 },
}

impl HidReport {
    pub const fn empty_keyboard() -> Self {
        HidReport::BootKeyboard {
            modifiers: HidModifiers::new(),
            keycodes: [0; BOOT_KEYCODE_SLOTS],
        }
    }

    pub const fn empty_nkro() -> Self {
        HidReport::NkroKeyboard {
            modifiers: HidModifiers::new(),
            bitmap: [0; NKRO_BITMAP_SIZE],
        }
    }

    pub const fn empty_consumer() -> Self {
        HidReport::Consumer { usage: 0 }
    }

    pub fn report_id(&self) -> ReportId {
        match self {
            HidReport::BootKeyboard { .. } => ReportId::Keyboard,
            HidReport::NkroKeyboard { .. } => ReportId::Nkro,
            HidReport::Consumer { .. } => ReportId::Consumer,
        }
    }

    /// Whether the report releases everything it covers
    pub fn is_empty(&self) -> bool {
        match self {
            HidReport::BootKeyboard { modifiers, keycodes } => modifiers.is_empty() && keycodes.iter().all(|k| *k == 0),
            HidReport::NkroKeyboard { modifiers, bitmap } => modifiers.is_empty() && bitmap.iter().all(|b| *b == 0),
            HidReport::Consumer { usage } => *usage == 0,
        }
    }

    /// Serialize the report without its report id, the form BLE report characteristics carry.
    pub fn serialize_payload(&self, buf: &mut [u8]) -> Result<usize, HidError> {
        let len = match self {
            HidReport::BootKeyboard { .. } => 2 + BOOT_KEYCODE_SLOTS,
            HidReport::NkroKeyboard { .. } => 1 + NKRO_BITMAP_SIZE,
            HidReport::Consumer { .. } => 2,
        };
        if buf.len() < len {
            return Err(HidError::BufferOverflow);
        }
        match self {
            HidReport::BootKeyboard { modifiers, keycodes } => {
                buf[0] = modifiers.into_bits();
                buf[1] = 0;
                buf[2..len].copy_from_slice(keycodes);
            }
            HidReport::NkroKeyboard { modifiers, bitmap } => {
                buf[0] = modifiers.into_bits();
                buf[1..len].copy_from_slice(bitmap);
            }
            HidReport::Consumer { usage } => buf[..2].copy_from_slice(&usage.to_le_bytes()),
        }
        Ok(len)
    }

    /// Serialize the report with its leading report id, the form written to the USB endpoint.
    pub fn serialize_into(&self, buf: &mut [u8]) -> Result<usize, HidError> {
        let Some((id, payload)) = buf.split_first_mut() else {
            return Err(HidError::BufferOverflow);
        };
        *id = self.report_id() as u8;
        Ok(1 + self.serialize_payload(payload)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HidError {
    UsbEndpointError,
    UsbDisabled,
    BufferOverflow,
    ReportSerializeError,
    BleDisconnected,
    BleRawError,
    WirelessSendError,
    Timeout,
}

/// Which keyboard report format the encoder is producing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncoderPhase {
    /// Up to six keys, boot reports
    #[default]
    Boot,
    /// The boot report was just cleared, the next report is the first NKRO one
    FlushPending,
    /// More than six keys, bitmap reports
    Nkro,
}

/// Turns [`ResolvedInput`] into HID reports.
///
/// The host must never see the boot report and the NKRO report claiming a key at
/// the same time, so every switch between the two formats first clears the report
/// that is being left.
#[derive(Debug, Default)]
pub struct ReportEncoder {
    phase: EncoderPhase,
}

impl ReportEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> EncoderPhase {
        self.phase
    }

    /// Encode one resolved batch into the next report.
    ///
    /// When the batch needs more than six slots and the previous report was a boot
    /// report, this returns the all-zero boot report and the NKRO report comes from
    /// the next call.
    pub fn encode(&mut self, input: &ResolvedInput) -> HidReport {
        if let Some(usage) = input.consumer {
            return HidReport::Consumer { usage: usage.into() };
        }

        if input.pressed.len() <= BOOT_KEYCODE_SLOTS {
            self.phase = EncoderPhase::Boot;
            return boot_report(input);
        }

        match self.phase {
            EncoderPhase::Boot => {
                self.phase = EncoderPhase::FlushPending;
                HidReport::empty_keyboard()
            }
            EncoderPhase::FlushPending | EncoderPhase::Nkro => {
                self.phase = EncoderPhase::Nkro;
                nkro_report(input)
            }
        }
    }

    /// Encode one resolved batch into every report the host has to receive for it.
    ///
    /// Unlike [`ReportEncoder::encode`] the boot flush and the NKRO report come out of
    /// one call. Leaving NKRO mode first sends an all-zero NKRO report.
    pub fn encode_all(&mut self, input: &ResolvedInput) -> Vec<HidReport, 3> {
        let mut reports = Vec::new();
        if input.consumer.is_none() && input.pressed.len() <= BOOT_KEYCODE_SLOTS && self.phase == EncoderPhase::Nkro {
            let _ = reports.push(HidReport::empty_nkro());
        }
        let report = self.encode(input);
        if self.phase == EncoderPhase::FlushPending {
            let _ = reports.push(report);
            let _ = reports.push(self.encode(input));
        } else {
            let _ = reports.push(report);
        }
        reports
    }

    pub fn reset(&mut self) {
        self.phase = EncoderPhase::Boot;
    }
}

/// First six keycodes in order, the rest are dropped
fn boot_report(input: &ResolvedInput) -> HidReport {
    let mut keycodes = [0; BOOT_KEYCODE_SLOTS];
    for (slot, code) in keycodes.iter_mut().zip(input.pressed.iter()) {
        *slot = (*code).into();
    }
    HidReport::BootKeyboard {
        modifiers: input.modifiers,
        keycodes,
    }
}

fn nkro_report(input: &ResolvedInput) -> HidReport {
    let mut bitmap = [0; NKRO_BITMAP_SIZE];
    for code in input.pressed.iter() {
        if !code.in_nkro_range() {
            debug!("{:?} can't be carried by the NKRO bitmap", code);
            continue;
        }
        let bit = (*code as u8 - NKRO_FIRST_USAGE) as usize;
        bitmap[bit / 8] |= 1 << (bit % 8);
    }
    HidReport::NkroKeyboard {
        modifiers: input.modifiers,
        bitmap,
    }
}

/// Keycodes set in an NKRO bitmap, lowest usage first
pub fn nkro_keycodes(bitmap: &[u8; NKRO_BITMAP_SIZE]) -> impl Iterator<Item = HidKeyCode> + '_ {
    (0..NKRO_BITMAP_SIZE * 8)
        .filter(|bit| bitmap[bit / 8] & (1 << (bit % 8)) != 0)
        .filter_map(|bit| HidKeyCode::from_repr(bit as u8 + NKRO_FIRST_USAGE))
}

impl From<ConsumerUsage> for HidReport {
    fn from(usage: ConsumerUsage) -> Self {
        HidReport::Consumer { usage: usage.into() }
    }
}

/// HidWriterTrait is used for writing HID reports to the host, via USB, BLE, etc.
pub trait HidWriterTrait {
    /// Write report to the host, return the number of bytes written if success.
    fn write_report(&mut self, report: &HidReport) -> impl Future<Output = Result<usize, HidError>>;
}

/// A HID writer that owns the source of its reports and can run on its own.
pub trait RunnableHidWriter: HidWriterTrait {
    /// Get the report to be sent to the host
    fn get_report(&mut self) -> impl Future<Output = HidReport>;

    /// Run the writer task.
    fn run_writer(&mut self) -> impl Future<Output = ()> {
        async {
            loop {
                let report = self.get_report().await;
                if let Err(e) = self.write_report(&report).await {
                    error!("Failed to send report: {:?}", e);
                }
            }
        }
    }
}
