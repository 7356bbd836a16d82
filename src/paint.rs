//! 画笔模块

use crate::Color;

/// 画笔
#[derive(Debug, Clone)]
pub struct Paint {
    pub color: Color,
    /// 全局不透明度，作用于之后的所有填充
    pub opacity: f32,
}

impl Default for Paint {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            opacity: 1.0,
        }
    }
}

impl Paint {
    /// 实际写入像素的颜色（已乘上不透明度）
    pub fn source_color(&self) -> Color {
        if self.opacity >= 1.0 {
            self.color
        } else {
            self.color.with_opacity(self.opacity)
        }
    }
}
