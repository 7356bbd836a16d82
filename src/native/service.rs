//! 进程级原生服务：启动时初始化一次，退出时关闭

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, info};

use super::{Backend, ResourceCounts, SharedBackend, WindowOptions};
use crate::error::{CanvasError, CanvasResult};
use crate::event::Event;

/// 新建窗口的默认属性
#[derive(Debug, Clone, PartialEq)]
pub struct WindowDefaults {
    pub title: String,
    pub resizable: bool,
}

impl Default for WindowDefaults {
    fn default() -> Self {
        Self {
            title: "Canvas".to_string(),
            resizable: true,
        }
    }
}

enum ServiceSlot {
    Uninitialized,
    Running(NativeService),
    ShutDown,
}

thread_local! {
    static SERVICE: RefCell<ServiceSlot> = const { RefCell::new(ServiceSlot::Uninitialized) };
}

/// 原生服务句柄（可克隆，共享同一个后端）
#[derive(Clone)]
pub struct NativeService {
    backend: SharedBackend,
    defaults: Rc<WindowDefaults>,
}

impl NativeService {
    /// 初始化服务；每个执行线程只能成功一次，关闭后不可重新初始化
    pub fn init<B: Backend + 'static>(backend: B, defaults: WindowDefaults) -> CanvasResult<ServiceGuard> {
        SERVICE.with(|slot| {
            let mut slot = slot.borrow_mut();
            match *slot {
                ServiceSlot::Running(_) => {
                    return Err(CanvasError::native("native service is already initialized"));
                }
                ServiceSlot::ShutDown => {
                    return Err(CanvasError::native("native service has been shut down"));
                }
                ServiceSlot::Uninitialized => {}
            }
            info!("native service starting ({} backend)", backend.name());
            let backend: SharedBackend = Rc::new(RefCell::new(backend));
            *slot = ServiceSlot::Running(NativeService {
                backend,
                defaults: Rc::new(defaults),
            });
            Ok(ServiceGuard { _private: () })
        })
    }

    /// 当前运行中的服务
    pub fn current() -> CanvasResult<NativeService> {
        SERVICE.with(|slot| match &*slot.borrow() {
            ServiceSlot::Running(service) => Ok(service.clone()),
            ServiceSlot::Uninitialized => Err(CanvasError::native("native service is not initialized")),
            ServiceSlot::ShutDown => Err(CanvasError::native("native service has been shut down")),
        })
    }

    pub fn backend(&self) -> &SharedBackend {
        &self.backend
    }

    pub fn window_options(&self, width: u32, height: u32) -> WindowOptions {
        WindowOptions {
            title: self.defaults.title.clone(),
            width,
            height,
            resizable: self.defaults.resizable,
        }
    }

    /// 非阻塞取出下一个事件
    pub fn poll_event(&self) -> Option<Event> {
        self.backend.borrow_mut().poll_event()
    }

    pub fn resources(&self) -> ResourceCounts {
        self.backend.borrow().resources()
    }
}

/// 服务守卫，drop 时关闭服务
pub struct ServiceGuard {
    _private: (),
}

impl Drop for ServiceGuard {
    fn drop(&mut self) {
        SERVICE.with(|slot| {
            let previous = std::mem::replace(&mut *slot.borrow_mut(), ServiceSlot::ShutDown);
            if let ServiceSlot::Running(service) = previous {
                let live = service.resources();
                if !live.is_empty() {
                    debug!("native service shutting down with live resources: {:?}", live);
                }
            }
        });
        info!("native service shut down");
    }
}
