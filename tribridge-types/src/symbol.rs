//! What a single matrix position means in one layer.

use serde::{Deserialize, Serialize};

use crate::consumer::ConsumerUsage;
use crate::keycode::HidKeyCode;
use crate::modifier::HidModifiers;

/// KeySymbol is the content of one cell of a layer table.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeySymbol {
    /// Nothing at this position
    #[default]
    None,
    /// One or more modifier bits, OR'd into the report's modifier byte
    Modifier(HidModifiers),
    /// A keycode on the keyboard page
    Key(HidKeyCode),
    /// A usage on the consumer page
    ConsumerUsage(ConsumerUsage),
}

impl KeySymbol {
    /// Build a symbol from a raw keycode, modifier usages (0xE0..=0xE7) become `Modifier`.
    pub fn from_keycode(code: HidKeyCode) -> Self {
        match code {
            HidKeyCode::No => KeySymbol::None,
            c if c.is_modifier() => KeySymbol::Modifier(c.to_hid_modifiers()),
            c => KeySymbol::Key(c),
        }
    }

    pub fn is_modifier(&self) -> bool {
        matches!(self, KeySymbol::Modifier(_))
    }
}
