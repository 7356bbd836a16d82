//! QuickCanvas - QuickJS 脚本驱动的画布窗口
//! 支持路径填充、矩形绘制、窗口呈现和输入事件轮询

mod canvas;
mod color;
mod geometry;
mod paint;
mod path;
pub mod surface;

pub use canvas::Canvas;
pub use color::Color;
pub use geometry::{Point, Rect};
pub use paint::Paint;
pub use path::{Path, PathCommand};
pub use surface::PixelBuffer;

// 错误类型
pub mod error;
pub use error::{CanvasError, CanvasResult, ScriptError};

// 事件系统
pub mod event;

// 原生画布服务（窗口、渲染器、事件队列）
pub mod native;

// 脚本可见的画布对象
pub mod canvas_object;
pub use canvas_object::CanvasObject;

// JS 引擎绑定
pub mod js;

// 配置与日志
pub mod config;
pub mod logging;

// 应用运行时
pub mod runtime;

// 单元测试
#[cfg(test)]
mod tests;
