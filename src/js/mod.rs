//! QuickJS 引擎绑定

mod canvas;
mod event;
mod globals;
pub mod marshal;
mod runtime;

pub use canvas::JsCanvas;
pub use event::JsEvent;
pub use globals::{TimerQueue, Timer};
pub use runtime::JsRuntime;
