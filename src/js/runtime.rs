//! QuickJS 运行时

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use std::time::Instant;

use log::{debug, error, info};
use rquickjs::{Class, Context, Ctx, Module, Runtime, Value};

use super::globals::{self, describe_caught, display_value, SharedTimers, TimerQueue};
use super::{JsCanvas, JsEvent};
use crate::error::ScriptError;

/// JS 运行时：一个 QuickJS 运行时和一个完整上下文
pub struct JsRuntime {
    timers: SharedTimers,
    context: Context,
    runtime: Runtime,
}

impl JsRuntime {
    pub fn new() -> Result<Self, ScriptError> {
        let runtime = Runtime::new().map_err(|e| ScriptError::Context(e.to_string()))?;
        let context = Context::full(&runtime).map_err(|e| ScriptError::Context(e.to_string()))?;
        Ok(Self {
            timers: Rc::new(RefCell::new(TimerQueue::default())),
            context,
            runtime,
        })
    }

    /// 注册 `Canvas`、`Event` 和 console/std/os 全局对象
    pub fn register_bindings(&self) -> Result<(), ScriptError> {
        let started = Instant::now();
        self.context.with(|ctx| -> rquickjs::Result<()> {
            let globals = ctx.globals();
            Class::<JsCanvas>::define(&globals)?;
            Class::<JsEvent>::define(&globals)?;
            globals::register_console(&ctx)?;
            globals::register_std(&ctx)?;
            globals::register_os(&ctx, &self.timers, started)?;
            Ok(())
        })?;
        debug!("script bindings registered");
        Ok(())
    }

    /// 执行代码并把结果转成字符串
    pub fn eval(&self, code: &str) -> Result<String, ScriptError> {
        self.context.with(|ctx| match ctx.eval::<Value, _>(code) {
            Ok(val) => Ok(value_to_string(&ctx, &val)),
            Err(e) => Err(script_error(&ctx, e)),
        })
    }

    /// 执行脚本文件；`.mjs` 或含顶层 import/export 的文件按模块执行
    pub fn eval_file(&self, path: &Path) -> Result<(), ScriptError> {
        let source = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let name = path.display().to_string();

        if is_module(path, &source) {
            info!("evaluating {} as module", name);
            self.context.with(|ctx| {
                let promise = Module::evaluate(ctx.clone(), name.as_str(), source.as_str())
                    .map_err(|e| script_error(&ctx, e))?;
                match promise.finish::<()>() {
                    Ok(()) | Err(rquickjs::Error::WouldBlock) => Ok(()),
                    Err(e) => Err(script_error(&ctx, e)),
                }
            })
        } else {
            info!("evaluating {}", name);
            self.context.with(|ctx| {
                ctx.eval::<(), _>(source.as_str())
                    .map_err(|e| script_error(&ctx, e))
            })
        }
    }

    /// 执行所有待处理任务，返回执行的数量
    pub fn run_pending_jobs(&self) -> usize {
        let mut count = 0;
        loop {
            match self.runtime.execute_pending_job() {
                Ok(true) => count += 1,
                Ok(false) => break,
                Err(job) => {
                    count += 1;
                    job.0.with(|ctx| error!("uncaught error in pending job: {}", describe_caught(&ctx)));
                }
            }
        }
        count
    }

    /// 触发所有已到期的定时器
    pub fn run_due_timers(&self) -> usize {
        let mut fired = 0;
        loop {
            // 回调可能注册新的定时器，取出后立即释放借用
            let next = self.timers.borrow_mut().take_due(Instant::now());
            let Some(timer) = next else { break };
            fired += 1;
            self.context.with(|ctx| {
                let result = timer
                    .callback
                    .restore(&ctx)
                    .and_then(|callback| callback.call::<_, ()>(()));
                if let Err(e) = result {
                    error!("timer {} failed: {}", timer.id, script_error(&ctx, e));
                }
            });
        }
        fired
    }

    /// 驱动任务和定时器，直到都没有剩余
    pub fn run_until_idle(&self) {
        loop {
            self.run_pending_jobs();
            let Some(due) = self.timers.borrow().next_due() else {
                break;
            };
            let now = Instant::now();
            if due > now {
                std::thread::sleep(due - now);
            }
            self.run_due_timers();
        }
        debug!("script run loop idle");
    }

    /// 立即执行一次垃圾回收
    pub fn collect_garbage(&self) {
        self.runtime.run_gc();
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.borrow().len()
    }

    /// 在上下文中执行任意操作（测试和嵌入使用）
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: for<'js> FnOnce(Ctx<'js>) -> R,
    {
        self.context.with(f)
    }
}

impl Drop for JsRuntime {
    fn drop(&mut self) {
        // 持久化的回调必须先于运行时释放
        self.timers.borrow_mut().clear();
    }
}

fn is_module(path: &Path, source: &str) -> bool {
    if path.extension().is_some_and(|ext| ext == "mjs") {
        return true;
    }
    source.lines().any(|line| {
        let line = line.trim_start();
        line.starts_with("import ")
            || line.starts_with("import{")
            || line.starts_with("export ")
            || line.starts_with("export{")
    })
}

fn script_error(ctx: &Ctx<'_>, err: rquickjs::Error) -> ScriptError {
    match err {
        rquickjs::Error::Exception => ScriptError::Exception(describe_caught(ctx)),
        other => ScriptError::Engine(other),
    }
}

/// 将 JS Value 转换为字符串
fn value_to_string<'js>(ctx: &Ctx<'js>, val: &Value<'js>) -> String {
    if val.is_undefined() {
        "undefined".to_string()
    } else if val.is_null() {
        "null".to_string()
    } else {
        display_value(ctx, val)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_detection() {
        assert!(is_module(Path::new("a.mjs"), ""));
        assert!(is_module(Path::new("a.js"), "import * as std from 'std';\n"));
        assert!(is_module(Path::new("a.js"), "  export const x = 1;"));
        assert!(!is_module(Path::new("a.js"), "const imported = 1;"));
    }

    #[test]
    fn eval_reports_exception_text() {
        let rt = JsRuntime::new().unwrap();
        rt.register_bindings().unwrap();
        assert_eq!(rt.eval("1 + 2").unwrap(), "3");
        let err = rt.eval("throw new TypeError('boom')").unwrap_err();
        assert!(err.to_string().contains("TypeError: boom"), "{}", err);
    }

    #[test]
    fn timers_run_until_idle() {
        let rt = JsRuntime::new().unwrap();
        rt.register_bindings().unwrap();
        rt.eval(
            "globalThis.order = [];
             os.setTimeout(() => order.push('b'), 50);
             os.setTimeout(() => { order.push('a'); os.setTimeout(() => order.push('c'), 0); }, 0);
             const dropped = os.setTimeout(() => order.push('x'), 1);
             os.clearTimeout(dropped);",
        )
        .unwrap();
        assert_eq!(rt.pending_timers(), 2);
        rt.run_until_idle();
        assert_eq!(rt.eval("order.join('')").unwrap(), "acb");
        assert_eq!(rt.pending_timers(), 0);
    }

    #[test]
    fn promise_jobs_are_drained() {
        let rt = JsRuntime::new().unwrap();
        rt.register_bindings().unwrap();
        rt.eval("globalThis.done = false; Promise.resolve().then(() => { done = true; });")
            .unwrap();
        assert!(rt.run_pending_jobs() >= 1);
        assert_eq!(rt.eval("done").unwrap(), "true");
    }
}
