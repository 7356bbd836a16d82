//! 进程启动流程
//!
//! 初始化原生服务 → 创建脚本运行时 → 注册绑定 → 执行入口脚本 →
//! 驱动任务循环直到空闲 → 关闭。

use std::process::ExitCode;

use log::{error, info};

use crate::config::{BackendKind, CanvasConfig};
use crate::error::CanvasError;
use crate::js::JsRuntime;
use crate::logging::init_logging;
use crate::native::{Backend, HeadlessBackend, NativeService, WinitBackend};

pub const EXIT_OK: u8 = 0;
/// 原生服务初始化失败或入口脚本执行失败
pub const EXIT_FAILURE: u8 = 1;
/// 脚本上下文无法创建
pub const EXIT_CONTEXT_FAILURE: u8 = 2;

/// 按配置运行入口脚本
pub fn run(config: &CanvasConfig) -> ExitCode {
    init_logging(config.log_filter.as_deref());

    let code = match config.backend {
        BackendKind::Winit => match WinitBackend::new() {
            Ok(backend) => run_with_backend(backend, config),
            Err(e) => native_failure(&e),
        },
        BackendKind::Headless => run_with_backend(HeadlessBackend::new(), config),
    };
    ExitCode::from(code)
}

/// 使用指定后端运行，返回进程退出码
pub fn run_with_backend<B: Backend + 'static>(backend: B, config: &CanvasConfig) -> u8 {
    let _service = match NativeService::init(backend, config.window_defaults()) {
        Ok(guard) => guard,
        Err(e) => return native_failure(&e),
    };

    let runtime = match JsRuntime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("{}", e);
            return EXIT_CONTEXT_FAILURE;
        }
    };
    if let Err(e) = runtime.register_bindings() {
        error!("{}", e);
        return EXIT_CONTEXT_FAILURE;
    }

    if let Err(e) = runtime.eval_file(&config.entry_script) {
        error!("{}", e);
        return EXIT_FAILURE;
    }

    runtime.run_until_idle();
    info!("{} finished", config.entry_script.display());
    EXIT_OK
}

fn native_failure(e: &CanvasError) -> u8 {
    eprintln!("native canvas service failed to start: {}", e);
    error!("{}", e);
    EXIT_FAILURE
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn config_for(script: &Path) -> CanvasConfig {
        CanvasConfig {
            entry_script: script.to_path_buf(),
            backend: BackendKind::Headless,
            ..CanvasConfig::default()
        }
    }

    #[test]
    fn script_that_completes_exits_zero() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("main.js");
        std::fs::write(
            &script,
            "const c = new Canvas(20, 10);\n\
             c.setFillColor(0, 128, 0);\n\
             c.fillRect(0, 0, 20, 10);\n\
             c.show();\n\
             os.setTimeout(() => c.close(), 1);\n",
        )
        .unwrap();
        assert_eq!(run_with_backend(HeadlessBackend::new(), &config_for(&script)), EXIT_OK);
    }

    #[test]
    fn throwing_script_exits_one() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("main.js");
        std::fs::write(&script, "new Canvas('wide', 10);").unwrap();
        assert_eq!(run_with_backend(HeadlessBackend::new(), &config_for(&script)), EXIT_FAILURE);
    }

    #[test]
    fn missing_script_exits_one() {
        let config = config_for(Path::new("/nonexistent/main.js"));
        assert_eq!(run_with_backend(HeadlessBackend::new(), &config), EXIT_FAILURE);
    }

    #[test]
    fn second_service_init_fails() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("main.js");
        std::fs::write(&script, "").unwrap();
        let config = config_for(&script);
        assert_eq!(run_with_backend(HeadlessBackend::new(), &config), EXIT_OK);
        // 同一线程内服务关闭后不能重新初始化
        assert_eq!(run_with_backend(HeadlessBackend::new(), &config), EXIT_FAILURE);
    }
}
