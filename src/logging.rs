//! 日志初始化

use std::sync::Once;

static INIT: Once = Once::new();

/// 初始化全局日志，只生效一次
///
/// 过滤规则优先使用传入值，其次 `RUST_LOG`，都没有时为 info。
/// 规则语法同 `env_logger`，如 `"warn,quickcanvas=debug,console=info"`。
pub fn init_logging(filter: Option<&str>) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        if let Some(filter) = filter {
            builder.parse_filters(filter);
        } else if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        } else {
            builder.filter_level(log::LevelFilter::Info);
        }

        builder.write_style(env_logger::WriteStyle::Auto);
        if builder.try_init().is_err() {
            return;
        }

        log::debug!("logging initialized");
    });
}
