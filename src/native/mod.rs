//! 原生画布服务 - 窗口、渲染器、纹理与事件队列
//!
//! `Backend` 描述窗口/渲染工具包的调用约定，`WinitBackend` 打开真实窗口，
//! `HeadlessBackend` 在内存中模拟（测试和 `--headless` 运行使用）。
//! 句柄类型在 drop 时释放对应的原生资源，且只释放一次。

mod framebuffer;
mod handles;
mod headless;
pub mod keys;
mod service;
mod winit_backend;

pub use framebuffer::{Framebuffer, TextureData};
pub use handles::{RendererHandle, TextureHandle, WindowHandle};
pub use headless::{FailPoint, FrameSnapshot, HeadlessBackend, HeadlessMonitor};
pub use service::{NativeService, ServiceGuard, WindowDefaults};
pub use winit_backend::WinitBackend;

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{CanvasError, CanvasResult};
use crate::event::Event;
use crate::surface::PixelBuffer;
use crate::{Color, Rect};

/// 单边最大像素数
pub const MAX_DIMENSION: i32 = 16384;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RendererId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

/// 窗口创建参数
#[derive(Debug, Clone, PartialEq)]
pub struct WindowOptions {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub resizable: bool,
}

/// 存活的原生资源计数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResourceCounts {
    pub windows: usize,
    pub renderers: usize,
    pub textures: usize,
}

impl ResourceCounts {
    pub fn is_empty(&self) -> bool {
        self.windows == 0 && self.renderers == 0 && self.textures == 0
    }
}

/// 窗口/渲染工具包的调用约定
pub trait Backend {
    fn name(&self) -> &'static str;

    fn create_window(&mut self, options: &WindowOptions) -> CanvasResult<WindowId>;
    fn destroy_window(&mut self, window: WindowId);

    fn create_renderer(&mut self, window: WindowId) -> CanvasResult<RendererId>;
    fn destroy_renderer(&mut self, renderer: RendererId);

    /// 设置渲染器绘制颜色（不混合，直接覆盖）
    fn set_draw_color(&mut self, renderer: RendererId, color: Color) -> CanvasResult<()>;
    /// 用绘制颜色清空渲染器帧缓冲
    fn clear(&mut self, renderer: RendererId) -> CanvasResult<()>;
    /// 用绘制颜色填充渲染器帧缓冲中的矩形
    fn fill_rect(&mut self, renderer: RendererId, rect: Rect) -> CanvasResult<()>;

    fn create_texture(&mut self, renderer: RendererId, pixels: &PixelBuffer) -> CanvasResult<TextureId>;
    /// 将纹理拉伸绘制到帧缓冲的目标矩形
    fn render_texture(&mut self, renderer: RendererId, texture: TextureId, dst: Rect) -> CanvasResult<()>;
    fn destroy_texture(&mut self, texture: TextureId);

    fn present(&mut self, renderer: RendererId) -> CanvasResult<()>;

    /// 非阻塞地取出下一个输入事件
    fn poll_event(&mut self) -> Option<Event>;

    fn resources(&self) -> ResourceCounts;
}

pub type SharedBackend = Rc<RefCell<dyn Backend>>;

/// 校验窗口尺寸：宽高必须为正且不超过上限
pub fn validate_dimensions(width: i32, height: i32) -> CanvasResult<(u32, u32)> {
    if width <= 0 || height <= 0 {
        return Err(CanvasError::native(format!(
            "invalid window size {}x{}: width and height must be positive",
            width, height
        )));
    }
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(CanvasError::native(format!(
            "invalid window size {}x{}: exceeds {} pixels per side",
            width, height, MAX_DIMENSION
        )));
    }
    Ok((width as u32, height as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_and_negative_sizes_are_rejected() {
        assert!(validate_dimensions(0, 0).is_err());
        assert!(validate_dimensions(10, -1).is_err());
        assert!(validate_dimensions(MAX_DIMENSION + 1, 1).is_err());
        assert_eq!(validate_dimensions(100, 50).unwrap(), (100, 50));
    }
}
