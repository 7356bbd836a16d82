//! 无窗口后端 - 在内存中模拟窗口、渲染器和事件队列

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use super::{
    validate_dimensions, Backend, Framebuffer, RendererId, ResourceCounts, TextureData, TextureId,
    WindowId, WindowOptions,
};
use crate::error::{CanvasError, CanvasResult};
use crate::event::Event;
use crate::surface::PixelBuffer;
use crate::{Color, Rect};

/// 可注入失败的调用点
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    CreateWindow,
    CreateRenderer,
    CreateTexture,
    RenderTexture,
    Present,
}

/// 最近一次呈现的画面
#[derive(Debug, Clone)]
pub struct FrameSnapshot {
    pub renderer: RendererId,
    pub width: u32,
    pub height: u32,
    pub words: Vec<u32>,
}

impl FrameSnapshot {
    pub fn pixel(&self, x: u32, y: u32) -> Color {
        if x < self.width && y < self.height {
            Color::from_argb(self.words[(y * self.width + x) as usize])
        } else {
            Color::TRANSPARENT
        }
    }
}

#[derive(Default)]
struct HeadlessState {
    next_id: u32,
    windows: HashMap<WindowId, WindowOptions>,
    renderers: HashMap<RendererId, (WindowId, Framebuffer)>,
    textures: HashMap<TextureId, TextureData>,
    events: VecDeque<Event>,
    fail_next: Option<FailPoint>,
    presents: usize,
    last_frame: Option<FrameSnapshot>,
}

impl HeadlessState {
    fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn check(&mut self, point: FailPoint) -> CanvasResult<()> {
        if self.fail_next == Some(point) {
            self.fail_next = None;
            return Err(CanvasError::native(format!("injected failure at {:?}", point)));
        }
        Ok(())
    }

    fn renderer(&mut self, id: RendererId) -> CanvasResult<&mut Framebuffer> {
        self.renderers
            .get_mut(&id)
            .map(|(_, fb)| fb)
            .ok_or_else(|| CanvasError::native(format!("unknown renderer {:?}", id)))
    }
}

/// 无窗口后端
#[derive(Default)]
pub struct HeadlessBackend {
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取探针，用于注入事件和检查资源
    pub fn monitor(&self) -> HeadlessMonitor {
        HeadlessMonitor { state: Rc::clone(&self.state) }
    }
}

impl Backend for HeadlessBackend {
    fn name(&self) -> &'static str {
        "headless"
    }

    fn create_window(&mut self, options: &WindowOptions) -> CanvasResult<WindowId> {
        let mut state = self.state.borrow_mut();
        state.check(FailPoint::CreateWindow)?;
        validate_dimensions(options.width as i32, options.height as i32)?;
        let id = WindowId(state.next_id());
        state.windows.insert(id, options.clone());
        Ok(id)
    }

    fn destroy_window(&mut self, window: WindowId) {
        self.state.borrow_mut().windows.remove(&window);
    }

    fn create_renderer(&mut self, window: WindowId) -> CanvasResult<RendererId> {
        let mut state = self.state.borrow_mut();
        state.check(FailPoint::CreateRenderer)?;
        let (w, h) = state
            .windows
            .get(&window)
            .map(|o| (o.width, o.height))
            .ok_or_else(|| CanvasError::native(format!("unknown window {:?}", window)))?;
        let id = RendererId(state.next_id());
        state.renderers.insert(id, (window, Framebuffer::new(w, h)));
        Ok(id)
    }

    fn destroy_renderer(&mut self, renderer: RendererId) {
        self.state.borrow_mut().renderers.remove(&renderer);
    }

    fn set_draw_color(&mut self, renderer: RendererId, color: Color) -> CanvasResult<()> {
        self.state.borrow_mut().renderer(renderer)?.set_draw_color(color);
        Ok(())
    }

    fn clear(&mut self, renderer: RendererId) -> CanvasResult<()> {
        self.state.borrow_mut().renderer(renderer)?.clear();
        Ok(())
    }

    fn fill_rect(&mut self, renderer: RendererId, rect: Rect) -> CanvasResult<()> {
        self.state.borrow_mut().renderer(renderer)?.fill_rect(&rect);
        Ok(())
    }

    fn create_texture(&mut self, renderer: RendererId, pixels: &PixelBuffer) -> CanvasResult<TextureId> {
        let mut state = self.state.borrow_mut();
        state.check(FailPoint::CreateTexture)?;
        state.renderer(renderer)?;
        let id = TextureId(state.next_id());
        state.textures.insert(id, TextureData::from_pixels(pixels));
        Ok(id)
    }

    fn render_texture(&mut self, renderer: RendererId, texture: TextureId, dst: Rect) -> CanvasResult<()> {
        let mut state = self.state.borrow_mut();
        state.check(FailPoint::RenderTexture)?;
        let data = state
            .textures
            .get(&texture)
            .cloned()
            .ok_or_else(|| CanvasError::native(format!("unknown texture {:?}", texture)))?;
        state.renderer(renderer)?.blit(&data, &dst);
        Ok(())
    }

    fn destroy_texture(&mut self, texture: TextureId) {
        self.state.borrow_mut().textures.remove(&texture);
    }

    fn present(&mut self, renderer: RendererId) -> CanvasResult<()> {
        let mut state = self.state.borrow_mut();
        state.check(FailPoint::Present)?;
        let fb = state.renderer(renderer)?;
        let frame = FrameSnapshot {
            renderer,
            width: fb.width(),
            height: fb.height(),
            words: fb.words().to_vec(),
        };
        state.presents += 1;
        state.last_frame = Some(frame);
        Ok(())
    }

    fn poll_event(&mut self) -> Option<Event> {
        self.state.borrow_mut().events.pop_front()
    }

    fn resources(&self) -> ResourceCounts {
        let state = self.state.borrow();
        ResourceCounts {
            windows: state.windows.len(),
            renderers: state.renderers.len(),
            textures: state.textures.len(),
        }
    }
}

/// 无窗口后端的测试探针
#[derive(Clone)]
pub struct HeadlessMonitor {
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessMonitor {
    /// 向事件队列尾部注入事件
    pub fn push_event(&self, event: Event) {
        self.state.borrow_mut().events.push_back(event);
    }

    pub fn pending_events(&self) -> usize {
        self.state.borrow().events.len()
    }

    /// 让下一次对应调用失败
    pub fn fail_next(&self, point: FailPoint) {
        self.state.borrow_mut().fail_next = Some(point);
    }

    pub fn resources(&self) -> ResourceCounts {
        let state = self.state.borrow();
        ResourceCounts {
            windows: state.windows.len(),
            renderers: state.renderers.len(),
            textures: state.textures.len(),
        }
    }

    pub fn present_count(&self) -> usize {
        self.state.borrow().presents
    }

    pub fn last_frame(&self) -> Option<FrameSnapshot> {
        self.state.borrow().last_frame.clone()
    }

    /// 某个渲染器当前帧缓冲中的像素
    pub fn renderer_pixel(&self, renderer: RendererId, x: u32, y: u32) -> Option<Color> {
        self.state
            .borrow()
            .renderers
            .get(&renderer)
            .map(|(_, fb)| fb.pixel(x, y))
    }

    pub fn window_titles(&self) -> Vec<String> {
        self.state.borrow().windows.values().map(|o| o.title.clone()).collect()
    }
}
