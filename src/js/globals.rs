//! 全局对象：console、std、os

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use log::{debug, error, info, warn, Level};
use rquickjs::convert::Coerced;
use rquickjs::function::{Opt, Rest};
use rquickjs::{Ctx, FromJs, Function, Object, Persistent, Value};

/// 一次性定时器
pub struct Timer {
    pub id: u32,
    pub due: Instant,
    pub callback: Persistent<Function<'static>>,
}

/// 按到期时间触发的定时器队列
#[derive(Default)]
pub struct TimerQueue {
    next_id: u32,
    timers: Vec<Timer>,
}

impl TimerQueue {
    pub fn add(&mut self, delay: Duration, callback: Persistent<Function<'static>>) -> u32 {
        self.next_id += 1;
        let id = self.next_id;
        self.timers.push(Timer { id, due: Instant::now() + delay, callback });
        id
    }

    pub fn cancel(&mut self, id: u32) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.timers.iter().map(|t| t.due).min()
    }

    /// 取出最早到期的定时器；同时到期时先注册的先触发
    pub fn take_due(&mut self, now: Instant) -> Option<Timer> {
        let index = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= now)
            .min_by_key(|(_, t)| (t.due, t.id))
            .map(|(i, _)| i)?;
        Some(self.timers.remove(index))
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn clear(&mut self) {
        self.timers.clear();
    }
}

pub type SharedTimers = Rc<RefCell<TimerQueue>>;

/// 把任意 JS 值转成可打印文本
pub fn display_value<'js>(ctx: &Ctx<'js>, value: &Value<'js>) -> String {
    if let Some(s) = value.as_string() {
        return s.to_string().unwrap_or_default();
    }
    match Coerced::<String>::from_js(ctx, value.clone()) {
        Ok(Coerced(s)) => s,
        Err(_) => {
            let _ = ctx.catch();
            format!("[{:?}]", value.type_of())
        }
    }
}

fn join_args<'js>(ctx: &Ctx<'js>, args: &[Value<'js>]) -> String {
    args.iter()
        .map(|v| display_value(ctx, v))
        .collect::<Vec<_>>()
        .join(" ")
}

fn console_fn<'js>(ctx: &Ctx<'js>, level: Level) -> rquickjs::Result<Function<'js>> {
    Function::new(ctx.clone(), move |ctx: Ctx<'js>, args: Rest<Value<'js>>| {
        let msg = join_args(&ctx, &args);
        log::log!(target: "console", level, "{}", msg);
    })
}

/// `console.log/info/warn/error/debug`
pub fn register_console<'js>(ctx: &Ctx<'js>) -> rquickjs::Result<()> {
    let console = Object::new(ctx.clone())?;
    console.set("log", console_fn(ctx, Level::Info)?)?;
    console.set("info", console_fn(ctx, Level::Info)?)?;
    console.set("warn", console_fn(ctx, Level::Warn)?)?;
    console.set("error", console_fn(ctx, Level::Error)?)?;
    console.set("debug", console_fn(ctx, Level::Debug)?)?;
    ctx.globals().set("console", console)?;
    Ok(())
}

/// `std.exit(code)`、`std.getenv(name)`、`std.loadFile(path)`
pub fn register_std<'js>(ctx: &Ctx<'js>) -> rquickjs::Result<()> {
    let std_obj = Object::new(ctx.clone())?;

    std_obj.set(
        "exit",
        Function::new(ctx.clone(), |code: Opt<i32>| -> () {
            let code = code.0.unwrap_or(0);
            info!("script requested exit with code {}", code);
            log::logger().flush();
            std::process::exit(code);
        })?,
    )?;

    std_obj.set(
        "getenv",
        Function::new(ctx.clone(), |name: String| std::env::var(name).ok())?,
    )?;

    std_obj.set(
        "loadFile",
        Function::new(ctx.clone(), |path: String| match std::fs::read_to_string(&path) {
            Ok(text) => Some(text),
            Err(e) => {
                warn!("std.loadFile({}): {}", path, e);
                None
            }
        })?,
    )?;

    ctx.globals().set("std", std_obj)?;
    Ok(())
}

/// `os.sleep(ms)`、`os.now()`、`os.setTimeout(fn, ms)`、`os.clearTimeout(id)`、`os.platform`
pub fn register_os<'js>(ctx: &Ctx<'js>, timers: &SharedTimers, started: Instant) -> rquickjs::Result<()> {
    let os = Object::new(ctx.clone())?;

    os.set(
        "sleep",
        Function::new(ctx.clone(), |ms: f64| {
            if ms.is_finite() && ms > 0.0 {
                std::thread::sleep(Duration::from_secs_f64(ms / 1000.0));
            }
        })?,
    )?;

    os.set(
        "now",
        Function::new(ctx.clone(), move || started.elapsed().as_secs_f64() * 1000.0)?,
    )?;

    let queue = Rc::clone(timers);
    os.set(
        "setTimeout",
        Function::new(ctx.clone(), move |ctx: Ctx<'js>, callback: Function<'js>, delay: Opt<f64>| {
            let ms = delay.0.filter(|d| d.is_finite() && *d > 0.0).unwrap_or(0.0);
            let callback = Persistent::save(&ctx, callback);
            let id = queue.borrow_mut().add(Duration::from_secs_f64(ms / 1000.0), callback);
            debug!("timer {} scheduled in {}ms", id, ms);
            id
        })?,
    )?;

    let queue = Rc::clone(timers);
    os.set(
        "clearTimeout",
        Function::new(ctx.clone(), move |id: Opt<u32>| {
            if let Some(id) = id.0 {
                queue.borrow_mut().cancel(id);
            }
        })?,
    )?;

    os.set("platform", std::env::consts::OS)?;

    ctx.globals().set("os", os)?;
    Ok(())
}

/// 取出并格式化当前待处理的异常
pub fn describe_caught(ctx: &Ctx<'_>) -> String {
    let caught = ctx.catch();
    if let Some(exception) = caught.as_exception() {
        let name: Option<String> = exception.get("name").ok();
        let message = exception.message().unwrap_or_default();
        let mut text = match name {
            Some(name) if !name.is_empty() => format!("{}: {}", name, message),
            _ => message,
        };
        if let Some(stack) = exception.stack().filter(|s| !s.trim().is_empty()) {
            text.push('\n');
            text.push_str(stack.trim_end());
        }
        return text;
    }
    if caught.is_undefined() {
        error!("exception reported but none pending");
        return "unknown exception".to_string();
    }
    format!("uncaught value: {}", display_value(ctx, &caught))
}
