//! The stock 6 x 17 layout.

use crate::keymap::{KeyMap, LayerTable};
use crate::types::Coordinate;
use crate::{cu, k, layer, md, no};

pub const ROW: usize = 6;
pub const COL: usize = 17;

/// Position of the `Fn` key
pub const DEFAULT_LAYER_KEY: Coordinate = Coordinate::new(5, 10);
/// Position of the right shift key, part of every control gesture
pub const DEFAULT_RIGHT_SHIFT_KEY: Coordinate = Coordinate::new(4, 13);

#[rustfmt::skip]
pub const BASE_LAYER: LayerTable<ROW, COL> = layer!([
    [k!(Escape), no!(), k!(F1), k!(F2), k!(F3), k!(F4), k!(F5), k!(F6), k!(F7), k!(F8), k!(F9), k!(F10), k!(F11), k!(F12), k!(PrintScreen), k!(ScrollLock), k!(Pause)],
    [k!(Grave), k!(Kc1), k!(Kc2), k!(Kc3), k!(Kc4), k!(Kc5), k!(Kc6), k!(Kc7), k!(Kc8), k!(Kc9), k!(Kc0), k!(Minus), k!(Equal), k!(Backspace), k!(Insert), k!(Home), k!(PageUp)],
    [k!(Tab), k!(Q), k!(W), k!(E), k!(R), k!(T), k!(Y), k!(U), k!(I), k!(O), k!(P), k!(LeftBracket), k!(RightBracket), k!(Backslash), k!(Delete), k!(End), k!(PageDown)],
    [k!(CapsLock), k!(A), k!(S), k!(D), k!(F), k!(G), k!(H), k!(J), k!(K), k!(L), k!(Semicolon), k!(Quote), no!(), k!(Enter), no!(), no!(), no!()],
    [md!(LShift), k!(Z), k!(X), k!(C), k!(V), k!(B), k!(N), k!(M), k!(Comma), k!(Dot), k!(Slash), no!(), no!(), md!(RShift), no!(), k!(Up), no!()],
    [md!(LCtrl), md!(LGui), md!(LAlt), no!(), no!(), no!(), k!(Space), no!(), no!(), no!(), no!(), no!(), k!(Application), md!(RCtrl), k!(Left), k!(Down), k!(Right)]
]);

#[rustfmt::skip]
pub const FUNCTION_LAYER: LayerTable<ROW, COL> = layer!([
    [k!(Escape), no!(), cu!(BrightnessDown), cu!(BrightnessUp), k!(F3), k!(F4), k!(F5), k!(F6), cu!(ScanPrevious), cu!(Pause), cu!(ScanNext), cu!(Mute), cu!(VolumeDown), cu!(VolumeUp), k!(PrintScreen), k!(ScrollLock), k!(Pause)],
    [k!(Grave), k!(Kc1), k!(Kc2), k!(Kc3), k!(Kc4), k!(Kc5), k!(Kc6), k!(Kc7), k!(Kc8), k!(Kc9), k!(Kc0), k!(Minus), k!(Equal), k!(Backspace), k!(Insert), k!(Home), k!(PageUp)],
    [k!(Tab), k!(Q), k!(W), k!(E), k!(R), k!(T), k!(Y), k!(U), k!(I), k!(O), k!(P), k!(LeftBracket), k!(RightBracket), k!(Backslash), k!(Delete), k!(End), k!(PageDown)],
    [k!(CapsLock), k!(A), k!(S), k!(D), k!(F), k!(G), k!(H), k!(J), k!(K), k!(L), k!(Semicolon), k!(Quote), no!(), k!(Enter), no!(), no!(), no!()],
    [md!(LShift), k!(Z), k!(X), k!(C), k!(V), k!(B), k!(N), k!(M), k!(Comma), k!(Dot), k!(Slash), no!(), no!(), md!(RShift), no!(), k!(Up), no!()],
    [md!(LCtrl), md!(LGui), md!(LAlt), no!(), no!(), no!(), k!(Space), no!(), no!(), no!(), no!(), no!(), k!(Application), md!(RCtrl), k!(Left), k!(Down), k!(Right)]
]);

/// Keymap of the stock board
pub fn default_keymap() -> KeyMap<'static, ROW, COL> {
    KeyMap::new(&BASE_LAYER, &FUNCTION_LAYER, DEFAULT_LAYER_KEY, DEFAULT_RIGHT_SHIFT_KEY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::consumer::ConsumerUsage;
    use crate::types::keycode::HidKeyCode;

    #[test]
    fn test_function_row_is_media_keys() {
        let keymap = default_keymap();
        let resolved = keymap.resolve(&[DEFAULT_LAYER_KEY, Coordinate::new(0, 13)], false);
        assert_eq!(resolved.consumer, Some(ConsumerUsage::VolumeUp));
        let resolved = keymap.resolve(&[Coordinate::new(0, 13)], false);
        assert_eq!(resolved.last_keycode, HidKeyCode::F12);
    }

    #[test]
    fn test_layer_key_position_is_empty() {
        let keymap = default_keymap();
        let resolved = keymap.resolve(&[DEFAULT_LAYER_KEY], false);
        assert!(resolved.is_empty());
        assert!(resolved.layer_trigger_active);
    }
}
