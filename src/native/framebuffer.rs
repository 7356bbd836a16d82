//! 渲染器帧缓冲与纹理数据（两个后端共用）

use crate::surface::PixelBuffer;
use crate::{Color, Rect};

/// 从像素缓冲区拷贝出的纹理（0xAARRGGBB）
#[derive(Debug, Clone)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub words: Vec<u32>,
}

impl TextureData {
    pub fn from_pixels(pixels: &PixelBuffer) -> Self {
        Self {
            width: pixels.width(),
            height: pixels.height(),
            words: pixels.to_argb(),
        }
    }
}

/// 渲染器自身的帧缓冲
#[derive(Debug, Clone)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
    draw_color: Color,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::BLACK.to_argb(); width as usize * height as usize],
            draw_color: Color::BLACK,
        }
    }

    pub fn width(&self) -> u32 { self.width }
    pub fn height(&self) -> u32 { self.height }

    pub fn words(&self) -> &[u32] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Color {
        if x < self.width && y < self.height {
            Color::from_argb(self.pixels[(y * self.width + x) as usize])
        } else {
            Color::TRANSPARENT
        }
    }

    pub fn set_draw_color(&mut self, color: Color) {
        self.draw_color = color;
    }

    pub fn clear(&mut self) {
        self.pixels.fill(self.draw_color.to_argb());
    }

    pub fn fill_rect(&mut self, rect: &Rect) {
        let Some((x0, y0, x1, y1)) = rect.pixel_span(self.width, self.height) else {
            return;
        };
        let word = self.draw_color.to_argb();
        for y in y0..y1 {
            let row = (y * self.width) as usize;
            self.pixels[row + x0 as usize..row + x1 as usize].fill(word);
        }
    }

    /// 最近邻拉伸绘制纹理，按源 alpha 混合
    pub fn blit(&mut self, texture: &TextureData, dst: &Rect) {
        if texture.width == 0 || texture.height == 0 {
            return;
        }
        let Some((x0, y0, x1, y1)) = dst.pixel_span(self.width, self.height) else {
            return;
        };
        let dst = dst.normalized();
        let sx = texture.width as f32 / dst.width;
        let sy = texture.height as f32 / dst.height;

        for y in y0..y1 {
            let ty = (((y as f32 + 0.5 - dst.y) * sy) as u32).min(texture.height - 1);
            for x in x0..x1 {
                let tx = (((x as f32 + 0.5 - dst.x) * sx) as u32).min(texture.width - 1);
                let src = Color::from_argb(texture.words[(ty * texture.width + tx) as usize]);
                let idx = (y * self.width + x) as usize;
                let out = src.blend(&Color::from_argb(self.pixels[idx]));
                self.pixels[idx] = out.to_argb();
            }
        }
    }

    /// 缩放到目标尺寸并转为 0RGB（窗口呈现格式）
    pub fn scaled_rgb(&self, out_width: u32, out_height: u32, out: &mut [u32]) {
        if self.width == 0 || self.height == 0 || out_width == 0 || out_height == 0 {
            return;
        }
        for y in 0..out_height {
            let src_y = ((y as u64 * self.height as u64) / out_height as u64) as u32;
            for x in 0..out_width {
                let src_x = ((x as u64 * self.width as u64) / out_width as u64) as u32;
                let dst_idx = (y * out_width + x) as usize;
                if dst_idx < out.len() {
                    out[dst_idx] = self.pixels[(src_y * self.width + src_x) as usize] & 0x00FF_FFFF;
                }
            }
        }
    }
}
