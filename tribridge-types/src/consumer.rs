//! Consumer page (0x0C) usages used by the function layer.

use serde::{Deserialize, Serialize};
use strum::FromRepr;

#[repr(u16)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, FromRepr)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConsumerUsage {
    /// Release of every consumer control
    Zero = 0x00,
    BrightnessUp = 0x6F,
    BrightnessDown = 0x70,
    Play = 0xB0,
    Pause = 0xB1,
    Record = 0xB2,
    FastForward = 0xB3,
    Rewind = 0xB4,
    ScanNext = 0xB5,
    ScanPrevious = 0xB6,
    Stop = 0xB7,
    Eject = 0xB8,
    PlayPause = 0xCD,
    Mute = 0xE2,
    VolumeUp = 0xE9,
    VolumeDown = 0xEA,
}

impl From<ConsumerUsage> for u16 {
    fn from(usage: ConsumerUsage) -> u16 {
        usage as u16
    }
}
