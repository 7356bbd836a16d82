//! Canvas 光栅化模块 - 在像素缓冲区上填充矢量路径

use crate::surface::PixelBuffer;
use crate::{Color, Paint, Path, Point, Rect};

/// 路径展平容差（像素）
const FLATTEN_TOLERANCE: f32 = 0.5;

/// 抗锯齿子扫描线数量
const SUB_SAMPLES: usize = 4;

/// 光栅化画布
///
/// 只保存绘制状态（当前路径、画笔），像素写入调用方传入的
/// `PixelBuffer`，因此与软件表面共享同一块内存。
#[derive(Debug, Clone, Default)]
pub struct Canvas {
    path: Path,
    paint: Paint,
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn paint(&self) -> &Paint {
        &self.paint
    }

    /// 开始新路径
    pub fn new_path(&mut self) {
        self.path.reset();
    }

    /// 向当前路径追加圆弧
    pub fn arc(&mut self, cx: f32, cy: f32, radius: f32, start_angle: f32, end_angle: f32, counterclockwise: bool) {
        self.path.arc(cx, cy, radius, start_angle, end_angle, counterclockwise);
    }

    /// 设置填充颜色（0.0-1.0 归一化分量）
    pub fn set_rgba(&mut self, r: f32, g: f32, b: f32, a: f32) {
        self.paint.color = Color::from_normalized(r, g, b, a);
    }

    /// 设置不透明度，作用于之后的填充
    pub fn set_opacity(&mut self, opacity: f32) {
        self.paint.opacity = opacity;
    }

    /// 填充当前路径，之后开始新路径
    pub fn fill(&mut self, target: &mut PixelBuffer) {
        if self.path.is_empty() {
            return;
        }
        let contours: Vec<Vec<Point>> = self
            .path
            .flatten(FLATTEN_TOLERANCE)
            .into_iter()
            .filter(|c| c.len() > 2 && c.iter().all(Point::is_finite))
            .collect();
        fill_contours(target, &contours, &self.paint);
        self.path.reset();
    }

    /// 直接填充矩形，不影响当前路径
    pub fn fill_rect(&self, target: &mut PixelBuffer, rect: &Rect) {
        let Some((x0, y0, x1, y1)) = rect.pixel_span(target.width(), target.height()) else {
            return;
        };
        let color = self.paint.source_color();
        for y in y0..y1 {
            for x in x0..x1 {
                target.blend_pixel(x as i32, y as i32, color);
            }
        }
    }

    /// 清空表面为指定颜色
    pub fn clear(&self, target: &mut PixelBuffer, color: Color) {
        target.fill(color);
    }
}

/// 扫描线填充，奇偶规则
fn fill_contours(target: &mut PixelBuffer, contours: &[Vec<Point>], paint: &Paint) {
    if contours.is_empty() { return; }

    let color = paint.source_color();
    if color.a == 0 { return; }

    // 找边界
    let mut min_y = f32::MAX;
    let mut max_y = f32::MIN;
    for contour in contours {
        for p in contour {
            min_y = min_y.min(p.y);
            max_y = max_y.max(p.y);
        }
    }

    let y0 = ((min_y - 1.0).floor() as i64).max(0) as i32;
    let y1 = ((max_y + 1.0).ceil() as i64).min(target.height() as i64 - 1) as i32;
    let width = target.width() as i32;

    for y in y0..=y1 {
        // 收集多个子扫描线的交点
        let all_intersections: Vec<Vec<f32>> = (0..SUB_SAMPLES)
            .map(|sub| {
                let scan_y = y as f32 + (sub as f32 + 0.5) / SUB_SAMPLES as f32;
                scanline_intersections(contours, scan_y)
            })
            .collect();

        // 找出所有交点的 x 范围
        let mut x_min = f32::MAX;
        let mut x_max = f32::MIN;
        for &x in all_intersections.iter().flatten() {
            x_min = x_min.min(x);
            x_max = x_max.max(x);
        }
        if x_min > x_max { continue; }

        let x0 = ((x_min - 1.0).floor() as i64).max(0) as i32;
        let x1 = ((x_max + 1.0).ceil() as i64).min(width as i64 - 1) as i32;

        for x in x0..=x1 {
            let pixel_left = x as f32;
            let pixel_right = pixel_left + 1.0;
            let mut coverage = 0.0;

            for intersections in &all_intersections {
                for pair in intersections.chunks_exact(2) {
                    let (left, right) = (pair[0], pair[1]);
                    let overlap = pixel_right.min(right) - pixel_left.max(left);
                    if overlap > 0.0 {
                        coverage += overlap;
                    }
                }
            }

            coverage /= SUB_SAMPLES as f32;
            if coverage > 0.0 {
                target.blend_pixel_aa(x, y, color, coverage.min(1.0));
            }
        }
    }
}

fn scanline_intersections(contours: &[Vec<Point>], scan_y: f32) -> Vec<f32> {
    let mut intersections = Vec::new();
    for contour in contours {
        for i in 0..contour.len() {
            let p0 = &contour[i];
            let p1 = &contour[(i + 1) % contour.len()];

            if (p0.y <= scan_y && p1.y > scan_y) || (p1.y <= scan_y && p0.y > scan_y) {
                let t = (scan_y - p0.y) / (p1.y - p0.y);
                intersections.push(p0.x + t * (p1.x - p0.x));
            }
        }
    }
    intersections.sort_by(f32::total_cmp);
    intersections
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PathCommand;
    use std::f32::consts::PI;

    fn white(w: u32, h: u32) -> PixelBuffer {
        PixelBuffer::new(w, h, Color::WHITE)
    }

    #[test]
    fn fill_rect_writes_opaque_color() {
        let mut buf = white(20, 20);
        let mut canvas = Canvas::new();
        canvas.set_rgba(1.0, 0.0, 0.0, 1.0);
        canvas.fill_rect(&mut buf, &Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(buf.pixel(0, 0), Color::RED);
        assert_eq!(buf.pixel(9, 9), Color::RED);
        assert_eq!(buf.pixel(10, 10), Color::WHITE);
    }

    #[test]
    fn fill_rect_leaves_path_untouched() {
        let mut buf = white(10, 10);
        let mut canvas = Canvas::new();
        canvas.arc(5.0, 5.0, 2.0, 0.0, 2.0 * PI, false);
        let before = canvas.path().commands().len();
        canvas.fill_rect(&mut buf, &Rect::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(canvas.path().commands().len(), before);
    }

    #[test]
    fn filled_circle_covers_center_not_corner() {
        let mut buf = white(40, 40);
        let mut canvas = Canvas::new();
        canvas.set_rgba(0.0, 0.0, 1.0, 1.0);
        canvas.arc(20.0, 20.0, 10.0, 0.0, 2.0 * PI, false);
        canvas.fill(&mut buf);
        assert_eq!(buf.pixel(20, 20), Color::BLUE);
        assert_eq!(buf.pixel(0, 0), Color::WHITE);
        assert_eq!(buf.pixel(35, 35), Color::WHITE);
    }

    #[test]
    fn fill_consumes_the_path() {
        let mut buf = white(40, 20);
        let mut canvas = Canvas::new();
        canvas.set_rgba(1.0, 0.0, 0.0, 1.0);
        canvas.arc(10.0, 10.0, 5.0, 0.0, 2.0 * PI, false);
        canvas.fill(&mut buf);
        assert!(canvas.path().is_empty());

        canvas.set_rgba(0.0, 0.0, 1.0, 1.0);
        canvas.arc(30.0, 10.0, 5.0, 0.0, 2.0 * PI, false);
        assert!(matches!(canvas.path().commands()[0], PathCommand::MoveTo(_)));
        canvas.fill(&mut buf);
        assert_eq!(buf.pixel(10, 10), Color::RED);
        assert_eq!(buf.pixel(30, 10), Color::BLUE);
        // 两个圆之间不应被连成一个轮廓
        assert_eq!(buf.pixel(20, 10), Color::WHITE);
    }

    #[test]
    fn opacity_scales_fill_alpha() {
        let mut buf = PixelBuffer::new(4, 4, Color::TRANSPARENT);
        let mut canvas = Canvas::new();
        canvas.set_rgba(0.0, 1.0, 0.0, 1.0);
        canvas.set_opacity(0.5);
        canvas.fill_rect(&mut buf, &Rect::new(0.0, 0.0, 4.0, 4.0));
        let p = buf.pixel(1, 1);
        assert_eq!(p.g, 255);
        assert_eq!(p.a, 128);
    }

    #[test]
    fn fill_with_empty_path_is_noop() {
        let mut buf = white(4, 4);
        let mut canvas = Canvas::new();
        canvas.fill(&mut buf);
        assert!(buf.pixels().iter().all(|p| *p == Color::WHITE));
    }

    #[test]
    fn huge_or_nan_geometry_does_not_panic() {
        let mut buf = white(8, 8);
        let mut canvas = Canvas::new();
        canvas.arc(f32::NAN, 0.0, 5.0, 0.0, PI, false);
        canvas.fill(&mut buf);
        canvas.new_path();
        canvas.arc(4.0, 4.0, 1.0e9, 0.0, 2.0 * PI, false);
        canvas.fill(&mut buf);
        canvas.fill_rect(&mut buf, &Rect::new(f32::INFINITY, 0.0, 1.0, 1.0));
    }

    #[test]
    fn clear_overwrites_everything() {
        let mut buf = white(3, 3);
        Canvas::new().clear(&mut buf, Color::TRANSPARENT);
        assert!(buf.pixels().iter().all(|p| *p == Color::TRANSPARENT));
    }
}
