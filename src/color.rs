//! 颜色模块

/// RGBA 颜色（非预乘）
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// 从 0.0-1.0 的归一化分量构造，超出范围的值会被截断
    pub fn from_normalized(r: f32, g: f32, b: f32, a: f32) -> Self {
        fn channel(v: f32) -> u8 {
            if v.is_nan() {
                return 0;
            }
            (v.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        Self::new(channel(r), channel(g), channel(b), channel(a))
    }

    /// 转换为 0.0-1.0 的归一化分量
    pub fn to_normalized(&self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }

    /// 打包为 0xAARRGGBB
    #[inline]
    pub const fn to_argb(&self) -> u32 {
        ((self.a as u32) << 24) | ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// 从 0xAARRGGBB 解包
    #[inline]
    pub const fn from_argb(word: u32) -> Self {
        Self {
            a: ((word >> 24) & 0xFF) as u8,
            r: ((word >> 16) & 0xFF) as u8,
            g: ((word >> 8) & 0xFF) as u8,
            b: (word & 0xFF) as u8,
        }
    }

    /// 按不透明度缩放 alpha
    pub fn with_opacity(&self, opacity: f32) -> Self {
        let opacity = if opacity.is_nan() { 0.0 } else { opacity.clamp(0.0, 1.0) };
        Self {
            a: (self.a as f32 * opacity).round() as u8,
            ..*self
        }
    }

    /// Alpha 混合 (使用整数运算优化)
    #[inline]
    pub fn blend(&self, dst: &Color) -> Color {
        // 如果源完全透明，返回目标色
        if self.a == 0 { return *dst; }

        // 针对目标是完全不透明的常见情况（如背景）进行优化
        if dst.a == 255 {
            if self.a == 255 { return *self; }

            let alpha = self.a as u32;
            let inv_alpha = 255 - alpha;

            return Color {
                r: ((self.r as u32 * alpha + dst.r as u32 * inv_alpha) / 255) as u8,
                g: ((self.g as u32 * alpha + dst.g as u32 * inv_alpha) / 255) as u8,
                b: ((self.b as u32 * alpha + dst.b as u32 * inv_alpha) / 255) as u8,
                a: 255,
            };
        }

        // 通用混合模式 (支持半透明目标)
        let src_a = self.a as u32;
        let dst_a = dst.a as u32;
        let inv_src_a = 255 - src_a;

        // out_a = src_a + dst_a * (1 - src_a)
        let out_a = src_a + (dst_a * inv_src_a) / 255;

        if out_a == 0 { return Color::TRANSPARENT; }

        let dst_factor = (dst_a * inv_src_a) / 255;

        Color {
            r: ((self.r as u32 * src_a + dst.r as u32 * dst_factor) / out_a) as u8,
            g: ((self.g as u32 * src_a + dst.g as u32 * dst_factor) / out_a) as u8,
            b: ((self.b as u32 * src_a + dst.b as u32 * dst_factor) / out_a) as u8,
            a: out_a as u8,
        }
    }

    // 预定义颜色
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const TRANSPARENT: Color = Color::new(0, 0, 0, 0);
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}
