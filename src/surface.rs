//! 像素缓冲区 - 软件表面与光栅化表面共享的内存

use crate::{Color, Rect};

/// 每像素字节数（RGBA8888）
pub const BYTES_PER_PIXEL: usize = 4;

/// 原始像素缓冲区
///
/// 软件表面（用于上传纹理）和光栅化表面都是这块内存的视图：
/// 光栅化写入后无需拷贝即可被 `show()` 读到。
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl PixelBuffer {
    /// 创建缓冲区并填充为指定颜色
    pub fn new(width: u32, height: u32, fill: Color) -> Self {
        Self {
            width,
            height,
            pixels: vec![fill; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 { self.width }
    pub fn height(&self) -> u32 { self.height }

    /// 每行字节数
    pub fn pitch(&self) -> usize {
        self.width as usize * BYTES_PER_PIXEL
    }

    /// 缓冲区总字节数，恒等于 width * height * 4
    pub fn byte_len(&self) -> usize {
        self.pixels.len() * BYTES_PER_PIXEL
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// 获取像素，越界返回透明色
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Color {
        if x < self.width && y < self.height {
            self.pixels[(y * self.width + x) as usize]
        } else {
            Color::TRANSPARENT
        }
    }

    /// 设置像素（带 alpha 混合）
    #[inline]
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: Color) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let idx = (y as u32 * self.width + x as u32) as usize;
        if color.a == 255 {
            self.pixels[idx] = color;
        } else if color.a > 0 {
            self.pixels[idx] = color.blend(&self.pixels[idx]);
        }
    }

    /// 设置像素（带抗锯齿 coverage）
    #[inline]
    pub fn blend_pixel_aa(&mut self, x: i32, y: i32, color: Color, coverage: f32) {
        if coverage <= 0.0 { return; }
        let a = (color.a as f32 * coverage.min(1.0)) as u8;
        self.blend_pixel(x, y, Color::new(color.r, color.g, color.b, a));
    }

    /// 整体覆盖为指定颜色（不混合）
    pub fn fill(&mut self, color: Color) {
        self.pixels.fill(color);
    }

    /// 将矩形区域直接覆盖为指定颜色（不混合）
    pub fn fill_rect_replace(&mut self, rect: &Rect, color: Color) {
        let Some((x0, y0, x1, y1)) = rect.pixel_span(self.width, self.height) else {
            return;
        };
        for y in y0..y1 {
            let row = (y * self.width) as usize;
            self.pixels[row + x0 as usize..row + x1 as usize].fill(color);
        }
    }

    /// 导出为 RGBA 字节数组
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.byte_len());
        for pixel in &self.pixels {
            data.extend_from_slice(&[pixel.r, pixel.g, pixel.b, pixel.a]);
        }
        data
    }

    /// 导出为 0xAARRGGBB 字（纹理上传格式）
    pub fn to_argb(&self) -> Vec<u32> {
        self.pixels.iter().map(Color::to_argb).collect()
    }

    /// 保存为 PNG
    pub fn save_png(&self, path: &str) -> Result<(), String> {
        use image::{ImageBuffer, Rgba};

        let img: ImageBuffer<Rgba<u8>, Vec<u8>> = ImageBuffer::from_raw(
            self.width,
            self.height,
            self.to_rgba()
        ).ok_or("Failed to create image buffer")?;

        img.save(path).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_len_is_four_per_cell() {
        let buf = PixelBuffer::new(7, 3, Color::WHITE);
        assert_eq!(buf.byte_len(), 7 * 3 * 4);
        assert_eq!(buf.pitch(), 28);
        assert_eq!(buf.to_rgba().len(), buf.byte_len());
    }

    #[test]
    fn out_of_range_reads_are_transparent() {
        let buf = PixelBuffer::new(2, 2, Color::WHITE);
        assert_eq!(buf.pixel(1, 1), Color::WHITE);
        assert_eq!(buf.pixel(2, 0), Color::TRANSPARENT);
    }

    #[test]
    fn replace_fill_ignores_alpha() {
        let mut buf = PixelBuffer::new(4, 4, Color::WHITE);
        buf.fill_rect_replace(&Rect::new(1.0, 1.0, 2.0, 2.0), Color::TRANSPARENT);
        assert_eq!(buf.pixel(1, 1), Color::TRANSPARENT);
        assert_eq!(buf.pixel(2, 2), Color::TRANSPARENT);
        assert_eq!(buf.pixel(3, 3), Color::WHITE);
        assert_eq!(buf.pixel(0, 0), Color::WHITE);
    }

    #[test]
    fn png_export_round_trips_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        let buf = PixelBuffer::new(3, 2, Color::RED);
        buf.save_png(path.to_str().unwrap()).unwrap();
        let img = image::open(&path).unwrap();
        assert_eq!((img.width(), img.height()), (3, 2));
    }
}
