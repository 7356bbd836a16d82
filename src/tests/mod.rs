//! 单元测试模块
//! 覆盖脚本层的 Canvas/Event 绑定，全部运行在无窗口后端上

use crate::js::JsRuntime;
use crate::native::{HeadlessBackend, HeadlessMonitor, NativeService, ServiceGuard, WindowDefaults};

pub mod canvas_script_tests;

/// 测试环境：运行时先于服务守卫释放
pub struct Harness {
    pub rt: JsRuntime,
    pub monitor: HeadlessMonitor,
    _guard: ServiceGuard,
}

impl Harness {
    pub fn new() -> Self {
        let backend = HeadlessBackend::new();
        let monitor = backend.monitor();
        let guard = NativeService::init(backend, WindowDefaults::default()).unwrap();
        let rt = JsRuntime::new().unwrap();
        rt.register_bindings().unwrap();
        Self { rt, monitor, _guard: guard }
    }

    /// 执行代码，返回结果的字符串形式
    pub fn eval(&self, code: &str) -> String {
        match self.rt.eval(code) {
            Ok(v) => v,
            Err(e) => panic!("script failed: {}\n{}", e, code),
        }
    }

    /// 执行代码并返回抛出异常的 `name`，未抛出时返回 "no error"
    pub fn error_name(&self, code: &str) -> String {
        self.eval(&format!("(() => {{ try {{ {}; return 'no error'; }} catch (e) {{ return e.name; }} }})()", code))
    }

    pub fn error_message(&self, code: &str) -> String {
        self.eval(&format!("(() => {{ try {{ {}; return ''; }} catch (e) {{ return e.message; }} }})()", code))
    }
}
