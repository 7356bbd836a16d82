//! 事件系统 - 从原生事件队列取出的输入事件

use crate::error::{CanvasError, CanvasResult};

/// 事件类型码（与原生工具包一致，脚本按数值比较）
pub mod types {
    pub const QUIT: u32 = 0x100;
    pub const KEY_DOWN: u32 = 0x300;
    pub const KEY_UP: u32 = 0x301;
    pub const MOUSE_MOTION: u32 = 0x400;
    pub const MOUSE_BUTTON_DOWN: u32 = 0x401;
    pub const MOUSE_BUTTON_UP: u32 = 0x402;
}

/// 修饰键状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub alt: bool,
    pub ctrl: bool,
    pub shift: bool,
    pub meta: bool,
}

/// 键盘事件
#[derive(Debug, Clone, PartialEq)]
pub struct KeyEvent {
    /// 原始键码
    pub code: i64,
    /// 可读键名，如 "A"、"Escape"、"Return"
    pub key: String,
    pub modifiers: Modifiers,
    pub repeat: bool,
}

impl KeyEvent {
    pub fn new(code: i64, key: impl Into<String>) -> Self {
        Self {
            code,
            key: key.into(),
            modifiers: Modifiers::default(),
            repeat: false,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_repeat(mut self, repeat: bool) -> Self {
        self.repeat = repeat;
        self
    }
}

/// 鼠标事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
    /// 按键编号：1 左键，2 中键，3 右键；移动事件为 0
    pub button: u8,
    pub x: i32,
    pub y: i32,
}

impl PointerEvent {
    pub fn new(button: u8, x: i32, y: i32) -> Self {
        Self { button, x, y }
    }
}

/// 输入事件
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Quit,
    KeyDown(KeyEvent),
    KeyUp(KeyEvent),
    MouseMotion(PointerEvent),
    MouseButtonDown(PointerEvent),
    MouseButtonUp(PointerEvent),
}

impl Event {
    /// 事件类型码
    pub fn type_code(&self) -> u32 {
        match self {
            Event::Quit => types::QUIT,
            Event::KeyDown(_) => types::KEY_DOWN,
            Event::KeyUp(_) => types::KEY_UP,
            Event::MouseMotion(_) => types::MOUSE_MOTION,
            Event::MouseButtonDown(_) => types::MOUSE_BUTTON_DOWN,
            Event::MouseButtonUp(_) => types::MOUSE_BUTTON_UP,
        }
    }

    pub fn variant_name(&self) -> &'static str {
        match self {
            Event::Quit => "quit",
            Event::KeyDown(_) | Event::KeyUp(_) => "keyboard",
            Event::MouseMotion(_) | Event::MouseButtonDown(_) | Event::MouseButtonUp(_) => "pointer",
        }
    }

    pub fn as_key(&self) -> Option<&KeyEvent> {
        match self {
            Event::KeyDown(k) | Event::KeyUp(k) => Some(k),
            _ => None,
        }
    }

    pub fn as_pointer(&self) -> Option<&PointerEvent> {
        match self {
            Event::MouseMotion(p) | Event::MouseButtonDown(p) | Event::MouseButtonUp(p) => Some(p),
            _ => None,
        }
    }

    /// 读取键盘字段，非键盘事件返回 `WrongVariant`
    pub fn key_field(&self, field: &'static str) -> CanvasResult<&KeyEvent> {
        self.as_key().ok_or_else(|| CanvasError::WrongVariant {
            field,
            expected: "keyboard",
            actual: self.variant_name(),
        })
    }

    /// 读取鼠标字段，非鼠标事件返回 `WrongVariant`
    pub fn pointer_field(&self, field: &'static str) -> CanvasResult<&PointerEvent> {
        self.as_pointer().ok_or_else(|| CanvasError::WrongVariant {
            field,
            expected: "pointer",
            actual: self.variant_name(),
        })
    }
}
