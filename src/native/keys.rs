//! winit 键盘/鼠标到工具包键码、键名的映射

use winit::event::MouseButton;
use winit::keyboard::{Key, ModifiersState, NamedKey};

use crate::event::Modifiers;

/// 非字符键的键码标志位
const SCANCODE_MASK: i64 = 1 << 30;

const fn scancode(code: i64) -> i64 {
    code | SCANCODE_MASK
}

/// 逻辑键 -> (键码, 键名)
pub fn map_key(key: &Key) -> (i64, String) {
    match key {
        Key::Character(s) => character_key(s),
        Key::Named(named) => named_key(*named)
            .map(|(code, name)| (code, name.to_string()))
            .unwrap_or((0, String::new())),
        _ => (0, String::new()),
    }
}

/// 字符键：键码为小写字符的码点，键名为大写形式
pub fn character_key(s: &str) -> (i64, String) {
    let Some(c) = s.chars().next() else {
        return (0, String::new());
    };
    let lower = c.to_lowercase().next().unwrap_or(c);
    (lower as i64, c.to_uppercase().collect())
}

/// 命名键
pub fn named_key(key: NamedKey) -> Option<(i64, &'static str)> {
    let mapped = match key {
        NamedKey::Enter => (13, "Return"),
        NamedKey::Escape => (27, "Escape"),
        NamedKey::Backspace => (8, "Backspace"),
        NamedKey::Tab => (9, "Tab"),
        NamedKey::Space => (32, "Space"),
        NamedKey::Delete => (127, "Delete"),
        NamedKey::CapsLock => (scancode(57), "CapsLock"),
        NamedKey::F1 => (scancode(58), "F1"),
        NamedKey::F2 => (scancode(59), "F2"),
        NamedKey::F3 => (scancode(60), "F3"),
        NamedKey::F4 => (scancode(61), "F4"),
        NamedKey::F5 => (scancode(62), "F5"),
        NamedKey::F6 => (scancode(63), "F6"),
        NamedKey::F7 => (scancode(64), "F7"),
        NamedKey::F8 => (scancode(65), "F8"),
        NamedKey::F9 => (scancode(66), "F9"),
        NamedKey::F10 => (scancode(67), "F10"),
        NamedKey::F11 => (scancode(68), "F11"),
        NamedKey::F12 => (scancode(69), "F12"),
        NamedKey::Insert => (scancode(73), "Insert"),
        NamedKey::Home => (scancode(74), "Home"),
        NamedKey::PageUp => (scancode(75), "PageUp"),
        NamedKey::End => (scancode(77), "End"),
        NamedKey::PageDown => (scancode(78), "PageDown"),
        NamedKey::ArrowRight => (scancode(79), "Right"),
        NamedKey::ArrowLeft => (scancode(80), "Left"),
        NamedKey::ArrowDown => (scancode(81), "Down"),
        NamedKey::ArrowUp => (scancode(82), "Up"),
        NamedKey::Control => (scancode(224), "Left Ctrl"),
        NamedKey::Shift => (scancode(225), "Left Shift"),
        NamedKey::Alt => (scancode(226), "Left Alt"),
        NamedKey::Super => (scancode(227), "Left GUI"),
        _ => return None,
    };
    Some(mapped)
}

pub fn map_modifiers(m: ModifiersState) -> Modifiers {
    Modifiers {
        alt: m.alt_key(),
        ctrl: m.control_key(),
        shift: m.shift_key(),
        meta: m.super_key(),
    }
}

/// 鼠标按键编号：1 左键，2 中键，3 右键，4 后退，5 前进
pub fn map_mouse_button(button: MouseButton) -> u8 {
    match button {
        MouseButton::Left => 1,
        MouseButton::Middle => 2,
        MouseButton::Right => 3,
        MouseButton::Back => 4,
        MouseButton::Forward => 5,
        MouseButton::Other(v) => v.min(u8::MAX as u16) as u8,
    }
}
