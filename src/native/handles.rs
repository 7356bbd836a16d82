//! 原生资源句柄，drop 时释放

use std::rc::Rc;

use log::{debug, error};

use super::{RendererId, SharedBackend, TextureId, WindowId, WindowOptions};
use crate::error::CanvasResult;
use crate::surface::PixelBuffer;
use crate::{Color, Rect};

fn release(backend: &SharedBackend, what: &str, f: impl FnOnce(&mut dyn super::Backend)) {
    match backend.try_borrow_mut() {
        Ok(mut b) => f(&mut *b),
        Err(_) => error!("{} leaked: native service busy during release", what),
    }
}

/// 窗口句柄
pub struct WindowHandle {
    backend: SharedBackend,
    id: WindowId,
}

impl WindowHandle {
    pub fn create(backend: &SharedBackend, options: &WindowOptions) -> CanvasResult<Self> {
        let id = backend.borrow_mut().create_window(options)?;
        debug!("window {:?} created ({}x{})", id, options.width, options.height);
        Ok(Self { backend: Rc::clone(backend), id })
    }

    pub fn id(&self) -> WindowId {
        self.id
    }
}

impl Drop for WindowHandle {
    fn drop(&mut self) {
        let id = self.id;
        release(&self.backend, "window", |b| b.destroy_window(id));
        debug!("window {:?} destroyed", id);
    }
}

/// 渲染器句柄，依赖窗口，需先于窗口释放
pub struct RendererHandle {
    backend: SharedBackend,
    id: RendererId,
}

impl RendererHandle {
    pub fn create(window: &WindowHandle) -> CanvasResult<Self> {
        let id = window.backend.borrow_mut().create_renderer(window.id)?;
        debug!("renderer {:?} created for window {:?}", id, window.id);
        Ok(Self { backend: Rc::clone(&window.backend), id })
    }

    pub fn id(&self) -> RendererId {
        self.id
    }

    pub fn set_draw_color(&self, color: Color) -> CanvasResult<()> {
        self.backend.borrow_mut().set_draw_color(self.id, color)
    }

    pub fn clear(&self) -> CanvasResult<()> {
        self.backend.borrow_mut().clear(self.id)
    }

    pub fn fill_rect(&self, rect: Rect) -> CanvasResult<()> {
        self.backend.borrow_mut().fill_rect(self.id, rect)
    }

    pub fn present(&self) -> CanvasResult<()> {
        self.backend.borrow_mut().present(self.id)
    }
}

impl Drop for RendererHandle {
    fn drop(&mut self) {
        let id = self.id;
        release(&self.backend, "renderer", |b| b.destroy_renderer(id));
        debug!("renderer {:?} destroyed", id);
    }
}

/// 临时纹理句柄，作用域结束即销毁
pub struct TextureHandle<'r> {
    renderer: &'r RendererHandle,
    id: TextureId,
}

impl<'r> TextureHandle<'r> {
    pub fn from_pixels(renderer: &'r RendererHandle, pixels: &PixelBuffer) -> CanvasResult<Self> {
        let id = renderer.backend.borrow_mut().create_texture(renderer.id, pixels)?;
        Ok(Self { renderer, id })
    }

    pub fn render(&self, dst: Rect) -> CanvasResult<()> {
        self.renderer
            .backend
            .borrow_mut()
            .render_texture(self.renderer.id, self.id, dst)
    }
}

impl Drop for TextureHandle<'_> {
    fn drop(&mut self) {
        let id = self.id;
        release(&self.renderer.backend, "texture", |b| b.destroy_texture(id));
    }
}
