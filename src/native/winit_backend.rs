//! winit + softbuffer 后端 - 真实窗口
//!
//! 事件循环不接管主线程：`poll_event` 在队列为空时以零超时
//! 泵一次平台事件，因此脚本自己的循环可以反复调用而不阻塞。

use std::collections::{HashMap, VecDeque};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition};
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowAttributes};

use super::keys::{map_key, map_modifiers, map_mouse_button};
use super::{
    validate_dimensions, Backend, Framebuffer, RendererId, ResourceCounts, TextureData, TextureId,
    WindowId, WindowOptions,
};
use crate::error::{CanvasError, CanvasResult};
use crate::event::{Event, KeyEvent, Modifiers, PointerEvent};
use crate::surface::PixelBuffer;
use crate::{Color, Rect};

struct DesktopWindow {
    window: Arc<Window>,
    surface: softbuffer::Surface<Arc<Window>, Arc<Window>>,
}

struct DesktopRenderer {
    window: WindowId,
    framebuffer: Framebuffer,
}

/// 指针与修饰键的跟踪状态
#[derive(Default)]
struct InputTracker {
    modifiers: Modifiers,
    cursor: (f64, f64),
}

/// winit + softbuffer 后端
pub struct WinitBackend {
    event_loop: EventLoop<()>,
    next_id: u32,
    windows: HashMap<WindowId, DesktopWindow>,
    renderers: HashMap<RendererId, DesktopRenderer>,
    textures: HashMap<TextureId, TextureData>,
    queue: VecDeque<Event>,
    input: InputTracker,
    exited: bool,
}

impl WinitBackend {
    /// 初始化窗口子系统；每个进程只能调用一次
    pub fn new() -> CanvasResult<Self> {
        let event_loop = EventLoop::new()
            .map_err(|e| CanvasError::native(format!("could not initialize windowing: {}", e)))?;
        Ok(Self {
            event_loop,
            next_id: 0,
            windows: HashMap::new(),
            renderers: HashMap::new(),
            textures: HashMap::new(),
            queue: VecDeque::new(),
            input: InputTracker::default(),
            exited: false,
        })
    }

    fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn renderer(&mut self, id: RendererId) -> CanvasResult<&mut DesktopRenderer> {
        self.renderers
            .get_mut(&id)
            .ok_or_else(|| CanvasError::native(format!("unknown renderer {:?}", id)))
    }

    fn pump(&mut self) {
        let scale_factors = self
            .windows
            .values()
            .map(|w| (w.window.id(), w.window.scale_factor()))
            .collect();
        let mut collector = Collector {
            queue: &mut self.queue,
            input: &mut self.input,
            scale_factors,
        };
        let status = self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut collector);
        if let PumpStatus::Exit(code) = status {
            debug!("event loop exited with code {}", code);
            self.exited = true;
            self.queue.push_back(Event::Quit);
        }
    }
}

impl Backend for WinitBackend {
    fn name(&self) -> &'static str {
        "winit"
    }

    fn create_window(&mut self, options: &WindowOptions) -> CanvasResult<WindowId> {
        let (width, height) = validate_dimensions(options.width as i32, options.height as i32)?;
        let attrs = WindowAttributes::default()
            .with_title(options.title.clone())
            .with_inner_size(LogicalSize::new(width, height))
            .with_resizable(options.resizable);

        #[allow(deprecated)]
        let window = self
            .event_loop
            .create_window(attrs)
            .map_err(|e| CanvasError::native(format!("could not create window: {}", e)))?;
        let window = Arc::new(window);

        let context = softbuffer::Context::new(window.clone())
            .map_err(|e| CanvasError::native(format!("could not create surface context: {}", e)))?;
        let surface = softbuffer::Surface::new(&context, window.clone())
            .map_err(|e| CanvasError::native(format!("could not create surface: {}", e)))?;

        let id = WindowId(self.next_id());
        self.windows.insert(id, DesktopWindow { window, surface });
        Ok(id)
    }

    fn destroy_window(&mut self, window: WindowId) {
        self.windows.remove(&window);
    }

    fn create_renderer(&mut self, window: WindowId) -> CanvasResult<RendererId> {
        let desktop = self
            .windows
            .get(&window)
            .ok_or_else(|| CanvasError::native(format!("unknown window {:?}", window)))?;
        let logical = desktop
            .window
            .inner_size()
            .to_logical::<f64>(desktop.window.scale_factor());
        let framebuffer = Framebuffer::new(logical.width.round() as u32, logical.height.round() as u32);
        let id = RendererId(self.next_id());
        self.renderers.insert(id, DesktopRenderer { window, framebuffer });
        Ok(id)
    }

    fn destroy_renderer(&mut self, renderer: RendererId) {
        self.renderers.remove(&renderer);
    }

    fn set_draw_color(&mut self, renderer: RendererId, color: Color) -> CanvasResult<()> {
        self.renderer(renderer)?.framebuffer.set_draw_color(color);
        Ok(())
    }

    fn clear(&mut self, renderer: RendererId) -> CanvasResult<()> {
        self.renderer(renderer)?.framebuffer.clear();
        Ok(())
    }

    fn fill_rect(&mut self, renderer: RendererId, rect: Rect) -> CanvasResult<()> {
        self.renderer(renderer)?.framebuffer.fill_rect(&rect);
        Ok(())
    }

    fn create_texture(&mut self, renderer: RendererId, pixels: &PixelBuffer) -> CanvasResult<TextureId> {
        self.renderer(renderer)?;
        let id = TextureId(self.next_id());
        self.textures.insert(id, TextureData::from_pixels(pixels));
        Ok(id)
    }

    fn render_texture(&mut self, renderer: RendererId, texture: TextureId, dst: Rect) -> CanvasResult<()> {
        let data = self
            .textures
            .get(&texture)
            .ok_or_else(|| CanvasError::native(format!("unknown texture {:?}", texture)))?;
        let target = self
            .renderers
            .get_mut(&renderer)
            .ok_or_else(|| CanvasError::native(format!("unknown renderer {:?}", renderer)))?;
        target.framebuffer.blit(data, &dst);
        Ok(())
    }

    fn destroy_texture(&mut self, texture: TextureId) {
        self.textures.remove(&texture);
    }

    fn present(&mut self, renderer: RendererId) -> CanvasResult<()> {
        let target = self
            .renderers
            .get(&renderer)
            .ok_or_else(|| CanvasError::native(format!("unknown renderer {:?}", renderer)))?;
        let desktop = self
            .windows
            .get_mut(&target.window)
            .ok_or_else(|| CanvasError::native(format!("renderer {:?} has no window", renderer)))?;

        let size = desktop.window.inner_size();
        let (Some(width), Some(height)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height)) else {
            // 最小化时没有可呈现的区域
            return Ok(());
        };
        desktop
            .surface
            .resize(width, height)
            .map_err(|e| CanvasError::native(format!("could not resize surface: {}", e)))?;
        let mut buffer = desktop
            .surface
            .buffer_mut()
            .map_err(|e| CanvasError::native(format!("could not map surface: {}", e)))?;
        target.framebuffer.scaled_rgb(size.width, size.height, &mut buffer);
        buffer
            .present()
            .map_err(|e| CanvasError::native(format!("could not present window: {}", e)))
    }

    fn poll_event(&mut self) -> Option<Event> {
        if self.queue.is_empty() && !self.exited {
            self.pump();
        }
        self.queue.pop_front()
    }

    fn resources(&self) -> ResourceCounts {
        ResourceCounts {
            windows: self.windows.len(),
            renderers: self.renderers.len(),
            textures: self.textures.len(),
        }
    }
}

/// 一次泵取期间把 winit 事件翻译进队列
struct Collector<'a> {
    queue: &'a mut VecDeque<Event>,
    input: &'a mut InputTracker,
    scale_factors: HashMap<winit::window::WindowId, f64>,
}

impl Collector<'_> {
    fn logical(&self, window: winit::window::WindowId, pos: PhysicalPosition<f64>) -> (f64, f64) {
        let scale = self.scale_factors.get(&window).copied().unwrap_or(1.0);
        let logical = pos.to_logical::<f64>(scale);
        (logical.x, logical.y)
    }

    fn pointer(&self, button: u8) -> PointerEvent {
        PointerEvent::new(button, self.input.cursor.0 as i32, self.input.cursor.1 as i32)
    }
}

impl ApplicationHandler for Collector<'_> {
    fn resumed(&mut self, _event_loop: &ActiveEventLoop) {}

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, window_id: winit::window::WindowId, event: WindowEvent) {
        let translated = match event {
            WindowEvent::CloseRequested => Some(Event::Quit),

            WindowEvent::ModifiersChanged(m) => {
                self.input.modifiers = map_modifiers(m.state());
                None
            }

            WindowEvent::KeyboardInput { event, .. } => {
                let (code, key) = map_key(&event.logical_key);
                let key_event = KeyEvent::new(code, key)
                    .with_modifiers(self.input.modifiers)
                    .with_repeat(event.repeat);
                Some(match event.state {
                    ElementState::Pressed => Event::KeyDown(key_event),
                    ElementState::Released => Event::KeyUp(key_event),
                })
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.input.cursor = self.logical(window_id, position);
                Some(Event::MouseMotion(self.pointer(0)))
            }

            WindowEvent::MouseInput { state, button, .. } => {
                let pointer = self.pointer(map_mouse_button(button));
                Some(match state {
                    ElementState::Pressed => Event::MouseButtonDown(pointer),
                    ElementState::Released => Event::MouseButtonUp(pointer),
                })
            }

            WindowEvent::Destroyed => {
                warn!("window {:?} destroyed by the platform", window_id);
                None
            }

            _ => None,
        };

        if let Some(event) = translated {
            self.queue.push_back(event);
        }
    }
}
