//! 路径模块 - 直线、三次贝塞尔曲线和圆弧

use std::f32::consts::{FRAC_PI_2, TAU};

use crate::geometry::Point;

/// 路径命令
#[derive(Debug, Clone, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    CubicTo(Point, Point, Point), // 控制点1, 控制点2, 终点
}

/// 路径
#[derive(Debug, Clone, Default)]
pub struct Path {
    commands: Vec<PathCommand>,
    current: Option<Point>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// 清空为新路径
    pub fn reset(&mut self) {
        self.commands.clear();
        self.current = None;
    }

    pub fn current_point(&self) -> Option<Point> {
        self.current
    }

    pub fn move_to(&mut self, x: f32, y: f32) -> &mut Self {
        let p = Point::new(x, y);
        self.commands.push(PathCommand::MoveTo(p));
        self.current = Some(p);
        self
    }

    pub fn line_to(&mut self, x: f32, y: f32) -> &mut Self {
        if self.current.is_none() {
            return self.move_to(x, y);
        }
        let p = Point::new(x, y);
        self.commands.push(PathCommand::LineTo(p));
        self.current = Some(p);
        self
    }

    pub fn cubic_to(&mut self, c1x: f32, c1y: f32, c2x: f32, c2y: f32, x: f32, y: f32) -> &mut Self {
        if self.current.is_none() {
            self.move_to(c1x, c1y);
        }
        let c1 = Point::new(c1x, c1y);
        let c2 = Point::new(c2x, c2y);
        let end = Point::new(x, y);
        self.commands.push(PathCommand::CubicTo(c1, c2, end));
        self.current = Some(end);
        self
    }

    /// 添加圆弧
    ///
    /// 与 2D canvas 的 `arc` 语义一致：已有当前点时先连线到圆弧起点；
    /// 顺时针扫角归一化到 [0, 2π]，逆时针归一化到 [-2π, 0]。
    /// 每段不超过 90°，用三次贝塞尔近似。
    pub fn arc(&mut self, cx: f32, cy: f32, radius: f32, start_angle: f32, end_angle: f32, counterclockwise: bool) -> &mut Self {
        let radius = radius.abs();
        let sweep = arc_sweep(start_angle, end_angle, counterclockwise);

        let sx = cx + radius * start_angle.cos();
        let sy = cy + radius * start_angle.sin();
        if self.current.is_some() {
            self.line_to(sx, sy);
        } else {
            self.move_to(sx, sy);
        }

        if sweep == 0.0 || radius == 0.0 || !sweep.is_finite() {
            return self;
        }

        let segments = (sweep.abs() / FRAC_PI_2).ceil().max(1.0) as usize;
        let step = sweep / segments as f32;
        // 贝塞尔曲线近似圆弧的系数
        let k = 4.0 / 3.0 * (step / 4.0).tan();

        let mut a0 = start_angle;
        for _ in 0..segments {
            let a1 = a0 + step;
            let (sin0, cos0) = a0.sin_cos();
            let (sin1, cos1) = a1.sin_cos();

            let p0 = (cx + radius * cos0, cy + radius * sin0);
            let p3 = (cx + radius * cos1, cy + radius * sin1);
            let c1 = (p0.0 - k * radius * sin0, p0.1 + k * radius * cos0);
            let c2 = (p3.0 + k * radius * sin1, p3.1 - k * radius * cos1);

            self.cubic_to(c1.0, c1.1, c2.0, c2.1, p3.0, p3.1);
            a0 = a1;
        }
        self
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    /// 将路径转换为点序列（用于光栅化）
    pub fn flatten(&self, tolerance: f32) -> Vec<Vec<Point>> {
        let mut contours = Vec::new();
        let mut current_contour = Vec::new();
        let mut current = Point::default();

        for cmd in &self.commands {
            match cmd {
                PathCommand::MoveTo(p) => {
                    if !current_contour.is_empty() {
                        contours.push(std::mem::take(&mut current_contour));
                    }
                    current = *p;
                    current_contour.push(*p);
                }
                PathCommand::LineTo(p) => {
                    current_contour.push(*p);
                    current = *p;
                }
                PathCommand::CubicTo(c1, c2, end) => {
                    flatten_cubic(&current, c1, c2, end, tolerance, &mut current_contour);
                    current = *end;
                }
            }
        }

        if !current_contour.is_empty() {
            contours.push(current_contour);
        }

        contours
    }
}

fn arc_sweep(start: f32, end: f32, counterclockwise: bool) -> f32 {
    let delta = end - start;
    if !delta.is_finite() {
        return 0.0;
    }
    if counterclockwise {
        if delta <= -TAU {
            -TAU
        } else {
            let r = delta.rem_euclid(TAU);
            if r == 0.0 { 0.0 } else { r - TAU }
        }
    } else if delta >= TAU {
        TAU
    } else {
        delta.rem_euclid(TAU)
    }
}

/// 三次贝塞尔曲线展平
fn flatten_cubic(p0: &Point, p1: &Point, p2: &Point, p3: &Point, tolerance: f32, out: &mut Vec<Point>) {
    let length = p0.distance(p1) + p1.distance(p2) + p2.distance(p3);
    let steps = if length.is_finite() { (length / tolerance).ceil() as usize } else { 2 };
    let steps = steps.clamp(2, 100);

    for i in 1..=steps {
        let t = i as f32 / steps as f32;
        let t2 = t * t;
        let t3 = t2 * t;
        let mt = 1.0 - t;
        let mt2 = mt * mt;
        let mt3 = mt2 * mt;

        out.push(Point::new(
            mt3 * p0.x + 3.0 * mt2 * t * p1.x + 3.0 * mt * t2 * p2.x + t3 * p3.x,
            mt3 * p0.y + 3.0 * mt2 * t * p1.y + 3.0 * mt * t2 * p2.y + t3 * p3.y,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn full_circle_is_four_segments() {
        let mut path = Path::new();
        path.arc(50.0, 50.0, 10.0, 0.0, 2.0 * PI, false);
        let cubics = path
            .commands()
            .iter()
            .filter(|c| matches!(c, PathCommand::CubicTo(..)))
            .count();
        assert_eq!(cubics, 4);
        assert!(matches!(path.commands()[0], PathCommand::MoveTo(p) if (p.x - 60.0).abs() < 1e-4));
    }

    #[test]
    fn arc_after_current_point_connects_with_line() {
        let mut path = Path::new();
        path.move_to(0.0, 0.0);
        path.arc(10.0, 0.0, 5.0, 0.0, PI, false);
        assert!(matches!(path.commands()[1], PathCommand::LineTo(p) if (p.x - 15.0).abs() < 1e-4));
    }

    #[test]
    fn counterclockwise_sweep_is_negative() {
        assert!((arc_sweep(0.0, PI / 2.0, true) + 1.5 * PI).abs() < 1e-4);
        assert!((arc_sweep(0.0, -PI / 2.0, false) - 1.5 * PI).abs() < 1e-4);
        assert_eq!(arc_sweep(0.0, 10.0 * PI, false), TAU);
        assert_eq!(arc_sweep(1.0, 1.0, true), 0.0);
    }

    #[test]
    fn flattened_arc_stays_on_radius() {
        let mut path = Path::new();
        path.arc(0.0, 0.0, 20.0, 0.0, PI, false);
        for contour in path.flatten(0.5) {
            for p in contour {
                let r = (p.x * p.x + p.y * p.y).sqrt();
                assert!((r - 20.0).abs() < 0.1, "radius drifted: {}", r);
            }
        }
    }

    #[test]
    fn reset_clears_commands() {
        let mut path = Path::new();
        path.arc(5.0, 5.0, 2.0, 0.0, PI, false);
        path.reset();
        assert!(path.is_empty());
        assert_eq!(path.current_point(), None);
    }
}
