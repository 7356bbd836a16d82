//! 画布对象 - 脚本 `Canvas` 背后的原生状态
//!
//! 一个画布独占一个窗口、一个渲染器和一块像素缓冲区。光栅化器
//! 直接借用像素缓冲区绘制，`show()` 时把同一块缓冲区上传为临时纹理。

use log::{debug, warn};

use crate::canvas::Canvas;
use crate::error::{CanvasError, CanvasResult};
use crate::event::Event;
use crate::native::{validate_dimensions, NativeService, RendererHandle, RendererId, TextureHandle, WindowHandle};
use crate::surface::PixelBuffer;
use crate::{Color, Rect};

/// 存活画布持有的资源
///
/// 字段按释放顺序声明：光栅化状态、像素缓冲区、渲染器、窗口。
struct CanvasResources {
    raster: Canvas,
    pixels: PixelBuffer,
    renderer: RendererHandle,
    window: WindowHandle,
}

enum CanvasState {
    Live(Box<CanvasResources>),
    Finalized,
}

/// 画布对象
pub struct CanvasObject {
    state: CanvasState,
    service: NativeService,
    width: u32,
    height: u32,
    fill_color: Color,
}

impl CanvasObject {
    /// 创建窗口、渲染器和白色像素缓冲区
    ///
    /// 任一步失败时，已创建的句柄在返回前随 drop 释放。
    pub fn new(service: &NativeService, width: i32, height: i32) -> CanvasResult<Self> {
        let (w, h) = validate_dimensions(width, height)?;
        let options = service.window_options(w, h);

        let window = WindowHandle::create(service.backend(), &options).map_err(|e| {
            warn!("canvas {}x{}: {}", w, h, e);
            e
        })?;
        let renderer = RendererHandle::create(&window).map_err(|e| {
            warn!("canvas {}x{}: {}", w, h, e);
            e
        })?;
        renderer.set_draw_color(Color::TRANSPARENT)?;

        let resources = CanvasResources {
            raster: Canvas::new(),
            pixels: PixelBuffer::new(w, h, Color::WHITE),
            renderer,
            window,
        };
        debug!(
            "canvas {}x{} ready (window {:?}, renderer {:?})",
            w,
            h,
            resources.window.id(),
            resources.renderer.id()
        );

        Ok(Self {
            state: CanvasState::Live(Box::new(resources)),
            service: service.clone(),
            width: w,
            height: h,
            fill_color: Color::BLACK,
        })
    }

    fn live(&self, method: &'static str) -> CanvasResult<&CanvasResources> {
        match &self.state {
            CanvasState::Live(res) => Ok(res.as_ref()),
            CanvasState::Finalized => Err(CanvasError::InvalidReceiver { class: "Canvas", method }),
        }
    }

    fn live_mut(&mut self, method: &'static str) -> CanvasResult<&mut CanvasResources> {
        match &mut self.state {
            CanvasState::Live(res) => Ok(res.as_mut()),
            CanvasState::Finalized => Err(CanvasError::InvalidReceiver { class: "Canvas", method }),
        }
    }

    /// 已关闭时返回 `InvalidReceiver`
    pub fn check_live(&self, method: &'static str) -> CanvasResult<()> {
        self.live(method).map(|_| ())
    }

    pub fn width(&self) -> CanvasResult<u32> {
        self.live("width")?;
        Ok(self.width)
    }

    pub fn height(&self) -> CanvasResult<u32> {
        self.live("height")?;
        Ok(self.height)
    }

    pub fn fill_color(&self) -> Color {
        self.fill_color
    }

    pub fn begin_path(&mut self) -> CanvasResult<()> {
        self.live_mut("beginPath")?.raster.new_path();
        Ok(())
    }

    pub fn arc(&mut self, x: f64, y: f64, radius: f64, start: f64, end: f64, counterclockwise: bool) -> CanvasResult<()> {
        self.live_mut("arc")?.raster.arc(
            x as f32,
            y as f32,
            radius as f32,
            start as f32,
            end as f32,
            counterclockwise,
        );
        Ok(())
    }

    /// 用当前颜色和全局透明度填充当前路径
    pub fn fill(&mut self) -> CanvasResult<()> {
        let res = self.live_mut("fill")?;
        res.raster.fill(&mut res.pixels);
        Ok(())
    }

    pub fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) -> CanvasResult<()> {
        let res = self.live_mut("fillRect")?;
        let rect = Rect::new(x as f32, y as f32, w as f32, h as f32);
        res.raster.fill_rect(&mut res.pixels, &rect);
        Ok(())
    }

    /// 将矩形清为全透明：渲染器帧缓冲与像素缓冲区都会清除
    pub fn clear_rect(&mut self, x: f64, y: f64, w: f64, h: f64) -> CanvasResult<()> {
        let res = self.live_mut("clearRect")?;
        let rect = Rect::new(x as f32, y as f32, w as f32, h as f32);
        res.renderer.set_draw_color(Color::TRANSPARENT)?;
        res.renderer.fill_rect(rect)?;
        res.pixels.fill_rect_replace(&rect, Color::TRANSPARENT);
        Ok(())
    }

    /// 渲染器帧缓冲与像素缓冲区整体清为全透明
    pub fn clear(&mut self) -> CanvasResult<()> {
        let res = self.live_mut("clear")?;
        res.renderer.set_draw_color(Color::TRANSPARENT)?;
        res.renderer.clear()?;
        res.raster.clear(&mut res.pixels, Color::TRANSPARENT);
        Ok(())
    }

    /// 保存颜色并立即作为光栅化器的画笔颜色
    pub fn set_fill_color(&mut self, r: u8, g: u8, b: u8, a: u8) -> CanvasResult<()> {
        let color = Color::new(r, g, b, a);
        let [nr, ng, nb, na] = color.to_normalized();
        self.live_mut("setFillColor")?.raster.set_rgba(nr, ng, nb, na);
        self.fill_color = color;
        Ok(())
    }

    pub fn set_global_alpha(&mut self, alpha: f64) -> CanvasResult<()> {
        self.live_mut("setGlobalAlpha")?.raster.set_opacity(alpha as f32);
        Ok(())
    }

    /// 上传像素缓冲区为临时纹理，拉伸到整个窗口并呈现
    pub fn show(&self) -> CanvasResult<()> {
        let res = self.live("show")?;
        let dst = Rect::new(0.0, 0.0, self.width as f32, self.height as f32);
        {
            let texture = TextureHandle::from_pixels(&res.renderer, &res.pixels)?;
            texture.render(dst)?;
        }
        res.renderer.present()
    }

    /// 非阻塞取出下一个事件，队列为空返回 `None`
    pub fn poll_event(&self) -> CanvasResult<Option<Event>> {
        self.live("pollEvent")?;
        Ok(self.service.poll_event())
    }

    /// 占位操作
    pub fn quit(&self) -> CanvasResult<()> {
        self.live("quit")?;
        Ok(())
    }

    /// 立即释放所有原生资源；重复调用无效果
    pub fn close(&mut self) {
        if let CanvasState::Live(res) = std::mem::replace(&mut self.state, CanvasState::Finalized) {
            debug!("canvas {}x{} closing (renderer {:?})", self.width, self.height, res.renderer.id());
            drop(res);
        }
    }

    /// 像素缓冲区中的像素，越界返回透明色
    pub fn pixel(&self, x: u32, y: u32) -> CanvasResult<Color> {
        Ok(self.live("getPixel")?.pixels.pixel(x, y))
    }

    pub fn pixels(&self) -> CanvasResult<&PixelBuffer> {
        Ok(&self.live("pixels")?.pixels)
    }

    pub fn save_png(&self, path: &str) -> CanvasResult<()> {
        self.live("savePng")?
            .pixels
            .save_png(path)
            .map_err(|e| CanvasError::native(format!("could not save {}: {}", path, e)))
    }

    pub fn renderer_id(&self) -> CanvasResult<RendererId> {
        Ok(self.live("rendererId")?.renderer.id())
    }
}

impl Drop for CanvasObject {
    fn drop(&mut self) {
        self.close();
    }
}
