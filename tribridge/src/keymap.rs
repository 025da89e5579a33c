use heapless::Vec;

use crate::MAX_ACTIVE_KEYS;
use crate::types::Coordinate;
use crate::types::consumer::ConsumerUsage;
use crate::types::keycode::HidKeyCode;
use crate::types::modifier::HidModifiers;
use crate::types::symbol::KeySymbol;

/// One layer of the keymap, indexed by `[output][input]`
pub type LayerTable<const ROW: usize, const COL: usize> = [[KeySymbol; COL]; ROW];

/// What a batch of active coordinates means.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ResolvedInput {
    /// OR of every modifier symbol in the batch
    pub modifiers: HidModifiers,
    /// Non-modifier keycodes in scan order
    pub pressed: Vec<HidKeyCode, MAX_ACTIVE_KEYS>,
    /// The function layer is active for the end of the batch
    pub layer_trigger_active: bool,
    /// The right shift position is part of the batch
    pub right_shift_active: bool,
    /// Keycode of the last coordinate, `No` if it is a modifier or empty
    pub last_keycode: HidKeyCode,
    /// Consumer usage of the last coordinate, if it maps to one
    pub consumer: Option<ConsumerUsage>,
}

impl ResolvedInput {
    pub fn is_empty(&self) -> bool {
        self.modifiers.is_empty() && self.pressed.is_empty() && self.consumer.is_none()
    }
}

/// Flags that only live for the duration of one key event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ResolverState {
    pub fn_layer_active: bool,
    pub right_shift_active: bool,
}

impl ResolverState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn update(&mut self, resolved: &ResolvedInput) {
        self.fn_layer_active = resolved.layer_trigger_active;
        self.right_shift_active = resolved.right_shift_active;
    }
}

/// Two layer keymap: the base layer and the function layer.
///
/// The function layer becomes active from the layer key onwards, coordinates scanned
/// before the layer key in the same batch keep using the base layer.
pub struct KeyMap<'a, const ROW: usize, const COL: usize> {
    base: &'a LayerTable<ROW, COL>,
    function: &'a LayerTable<ROW, COL>,
    layer_key: Coordinate,
    right_shift_key: Coordinate,
}

impl<'a, const ROW: usize, const COL: usize> KeyMap<'a, ROW, COL> {
    pub fn new(
        base: &'a LayerTable<ROW, COL>,
        function: &'a LayerTable<ROW, COL>,
        layer_key: Coordinate,
        right_shift_key: Coordinate,
    ) -> Self {
        const { assert!(ROW * COL <= MAX_ACTIVE_KEYS, "Matrix is larger than MAX_ACTIVE_KEYS") };
        Self {
            base,
            function,
            layer_key,
            right_shift_key,
        }
    }

    pub fn layer_key(&self) -> Coordinate {
        self.layer_key
    }

    pub fn right_shift_key(&self) -> Coordinate {
        self.right_shift_key
    }

    /// Look up a coordinate, `None` if it is outside of the matrix
    pub fn symbol(&self, coordinate: Coordinate, fn_layer_active: bool) -> Option<KeySymbol> {
        let table = if fn_layer_active { self.function } else { self.base };
        table
            .get(coordinate.output as usize)
            .and_then(|row| row.get(coordinate.input as usize))
            .copied()
    }

    /// Resolve a batch of active coordinates.
    ///
    /// This is a pure function of its arguments, `fn_layer_active` is the layer state
    /// at the start of the batch.
    pub fn resolve(&self, active: &[Coordinate], fn_layer_active: bool) -> ResolvedInput {
        let mut resolved = ResolvedInput {
            layer_trigger_active: fn_layer_active,
            ..Default::default()
        };

        for &coordinate in active {
            if coordinate == self.layer_key {
                resolved.layer_trigger_active = true;
                continue;
            }
            if coordinate == self.right_shift_key {
                resolved.right_shift_active = true;
            }
            match self.symbol(coordinate, resolved.layer_trigger_active) {
                Some(KeySymbol::Modifier(m)) => resolved.modifiers |= m,
                Some(KeySymbol::Key(code)) => {
                    if resolved.pressed.push(code).is_err() {
                        warn!("Pressed key list is full, dropping {:?}", code);
                    }
                }
                // Consumer usages only come from the last coordinate
                Some(KeySymbol::ConsumerUsage(_)) | Some(KeySymbol::None) => {}
                None => warn!("Coordinate {:?} is outside of the matrix", coordinate),
            }
        }

        if let Some(&last) = active.last()
            && last != self.layer_key
        {
            match self.symbol(last, resolved.layer_trigger_active) {
                Some(KeySymbol::Key(code)) => resolved.last_keycode = code,
                Some(KeySymbol::ConsumerUsage(usage)) => resolved.consumer = Some(usage),
                _ => {}
            }
        }

        resolved
    }
}
