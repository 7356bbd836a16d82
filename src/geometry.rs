//! 几何图形模块

/// 2D 点
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// 矩形
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn left(&self) -> f32 { self.x }
    pub fn top(&self) -> f32 { self.y }
    pub fn right(&self) -> f32 { self.x + self.width }
    pub fn bottom(&self) -> f32 { self.y + self.height }

    /// 负宽高的矩形翻转为正向
    pub fn normalized(&self) -> Rect {
        let (x, width) = if self.width < 0.0 {
            (self.x + self.width, -self.width)
        } else {
            (self.x, self.width)
        };
        let (y, height) = if self.height < 0.0 {
            (self.y + self.height, -self.height)
        } else {
            (self.y, self.height)
        };
        Rect { x, y, width, height }
    }

    /// 裁剪到 [0, w) x [0, h) 的整数像素范围，返回 (x0, y0, x1, y1)
    pub fn pixel_span(&self, w: u32, h: u32) -> Option<(u32, u32, u32, u32)> {
        let r = self.normalized();
        if !(r.x.is_finite() && r.y.is_finite() && r.width.is_finite() && r.height.is_finite()) {
            return None;
        }
        let x0 = r.left().max(0.0).round() as u32;
        let y0 = r.top().max(0.0).round() as u32;
        let x1 = (r.right().min(w as f32).round().max(0.0) as u32).min(w);
        let y1 = (r.bottom().min(h as f32).round().max(0.0) as u32).min(h);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some((x0, y0, x1, y1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_span_clamps_to_bounds() {
        let r = Rect::new(-5.0, 2.0, 20.0, 100.0);
        assert_eq!(r.pixel_span(10, 10), Some((0, 2, 10, 10)));
    }

    #[test]
    fn negative_extent_is_flipped() {
        let r = Rect::new(10.0, 10.0, -4.0, -2.0);
        assert_eq!(r.pixel_span(20, 20), Some((6, 8, 10, 10)));
    }

    #[test]
    fn empty_or_non_finite_spans_are_none() {
        assert_eq!(Rect::new(0.0, 0.0, 0.0, 5.0).pixel_span(10, 10), None);
        assert_eq!(Rect::new(f32::NAN, 0.0, 1.0, 1.0).pixel_span(10, 10), None);
        assert_eq!(Rect::new(50.0, 50.0, 5.0, 5.0).pixel_span(10, 10), None);
    }
}
