/// Create a layer in keymap
#[macro_export]
macro_rules! layer {
    ([$([$($x: expr), +]), +]) => {
        [$([$($x), +]),+]
    };
}

/// Create a normal key. For example, `k!(A)` represents `KeySymbol::Key(HidKeyCode::A)`
#[macro_export]
macro_rules! k {
    ($k: ident) => {
        $crate::types::symbol::KeySymbol::Key($crate::types::keycode::HidKeyCode::$k)
    };
}

/// Create a modifier key from its keycode, `md!(LShift)`
#[macro_export]
macro_rules! md {
    ($k: ident) => {
        $crate::types::symbol::KeySymbol::Modifier($crate::types::keycode::HidKeyCode::$k.to_hid_modifiers())
    };
}

/// Create a consumer control key, `cu!(VolumeUp)`
#[macro_export]
macro_rules! cu {
    ($u: ident) => {
        $crate::types::symbol::KeySymbol::ConsumerUsage($crate::types::consumer::ConsumerUsage::$u)
    };
}

/// Create an empty position
#[macro_export]
macro_rules! no {
    () => {
        $crate::types::symbol::KeySymbol::None
    };
}
