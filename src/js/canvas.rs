//! `Canvas` 脚本类
//!
//! 方法不直接借用 `self`：先把 `this` 解析为画布实例，非 `Canvas`
//! 对象或已关闭的画布统一抛出 `InvalidReceiver`。调用顺序为
//! 参数个数 → 接收者 → 参数转换 → 原生调用。

use std::marker::PhantomData;

use rquickjs::class::{Trace, Tracer};
use rquickjs::function::{Rest, This};
use rquickjs::{Class, Ctx, Value};

use super::event::JsEvent;
use super::marshal::{expect_args, to_bool, to_channel, to_f64, to_i32, to_string, OrThrow};
use crate::canvas_object::CanvasObject;
use crate::error::{CanvasError, CanvasResult};
use crate::native::NativeService;

#[rquickjs::class(rename = "Canvas")]
pub struct JsCanvas<'js> {
    inner: CanvasObject,
    _marker: PhantomData<&'js ()>,
}

impl<'js> Trace<'js> for JsCanvas<'js> {
    fn trace<'a>(&self, _tracer: Tracer<'a, 'js>) {}
}

type CanvasClass<'js> = Class<'js, JsCanvas<'js>>;

/// `canvas.fill` -> `Canvas.fill()` 形式的错误
fn invalid(method: &'static str) -> CanvasError {
    CanvasError::InvalidReceiver {
        class: "Canvas",
        method: method.trim_start_matches("canvas."),
    }
}

/// `this` 必须是 `Canvas` 实例（不检查是否已关闭）
fn class_of<'js>(this: &Value<'js>, method: &'static str) -> CanvasResult<CanvasClass<'js>> {
    Class::<JsCanvas>::from_value(this).map_err(|_| invalid(method))
}

/// `this` 必须是存活的 `Canvas` 实例
fn receiver<'js>(this: &Value<'js>, method: &'static str) -> CanvasResult<CanvasClass<'js>> {
    let class = class_of(this, method)?;
    class
        .try_borrow()
        .map_err(|_| invalid(method))?
        .inner
        .check_live(method)
        .map_err(|_| invalid(method))?;
    Ok(class)
}

/// 只读访问画布对象
fn with_ref<'js, R>(
    class: &CanvasClass<'js>,
    method: &'static str,
    f: impl FnOnce(&CanvasObject) -> CanvasResult<R>,
) -> CanvasResult<R> {
    let canvas = class.try_borrow().map_err(|_| invalid(method))?;
    f(&canvas.inner)
}

/// 可变访问画布对象；参数转换期间不持有借用
fn with_mut<'js, R>(
    class: &CanvasClass<'js>,
    method: &'static str,
    f: impl FnOnce(&mut CanvasObject) -> CanvasResult<R>,
) -> CanvasResult<R> {
    let mut canvas = class.try_borrow_mut().map_err(|_| invalid(method))?;
    f(&mut canvas.inner)
}

/// 取 4 个数值参数
fn rect_args<'js>(ctx: &Ctx<'js>, method: &'static str, args: &[Value<'js>]) -> CanvasResult<[f64; 4]> {
    Ok([
        to_f64(ctx, method, 0, &args[0])?,
        to_f64(ctx, method, 1, &args[1])?,
        to_f64(ctx, method, 2, &args[2])?,
        to_f64(ctx, method, 3, &args[3])?,
    ])
}

/// 无参数的方法：个数校验后直接调用
fn no_args<'js, R>(
    this: &Value<'js>,
    args: &[Value<'js>],
    method: &'static str,
    f: impl FnOnce(&mut CanvasObject) -> CanvasResult<R>,
) -> CanvasResult<R> {
    expect_args(method, args.len(), 0, 0)?;
    let class = receiver(this, method)?;
    with_mut(&class, method, f)
}

#[rquickjs::methods]
impl<'js> JsCanvas<'js> {
    /// `new Canvas(width, height)`
    #[qjs(constructor)]
    pub fn new(ctx: Ctx<'js>, args: Rest<Value<'js>>) -> rquickjs::Result<Self> {
        let build = || -> CanvasResult<CanvasObject> {
            expect_args("Canvas", args.len(), 2, 2)?;
            let width = to_i32(&ctx, "Canvas", 0, &args[0])?;
            let height = to_i32(&ctx, "Canvas", 1, &args[1])?;
            let service = NativeService::current()?;
            CanvasObject::new(&service, width, height)
        };
        let inner = build().or_throw_js(&ctx)?;
        Ok(Self { inner, _marker: PhantomData })
    }

    #[qjs(get, enumerable)]
    pub fn width(this: This<Value<'js>>, ctx: Ctx<'js>) -> rquickjs::Result<u32> {
        class_of(&this.0, "canvas.width")
            .and_then(|class| with_ref(&class, "canvas.width", |c| c.width()))
            .or_throw_js(&ctx)
    }

    #[qjs(get, enumerable)]
    pub fn height(this: This<Value<'js>>, ctx: Ctx<'js>) -> rquickjs::Result<u32> {
        class_of(&this.0, "canvas.height")
            .and_then(|class| with_ref(&class, "canvas.height", |c| c.height()))
            .or_throw_js(&ctx)
    }

    #[qjs(rename = "beginPath")]
    pub fn begin_path(this: This<Value<'js>>, ctx: Ctx<'js>, args: Rest<Value<'js>>) -> rquickjs::Result<()> {
        no_args(&this.0, &args, "canvas.beginPath", |c| c.begin_path()).or_throw_js(&ctx)
    }

    pub fn arc(this: This<Value<'js>>, ctx: Ctx<'js>, args: Rest<Value<'js>>) -> rquickjs::Result<()> {
        const M: &str = "canvas.arc";
        let call = || -> CanvasResult<()> {
            expect_args(M, args.len(), 5, 6)?;
            let class = receiver(&this.0, M)?;
            let x = to_f64(&ctx, M, 0, &args[0])?;
            let y = to_f64(&ctx, M, 1, &args[1])?;
            let radius = to_f64(&ctx, M, 2, &args[2])?;
            let start = to_f64(&ctx, M, 3, &args[3])?;
            let end = to_f64(&ctx, M, 4, &args[4])?;
            let ccw = args.get(5).map(to_bool).unwrap_or(false);
            with_mut(&class, M, |c| c.arc(x, y, radius, start, end, ccw))
        };
        call().or_throw_js(&ctx)
    }

    pub fn fill(this: This<Value<'js>>, ctx: Ctx<'js>, args: Rest<Value<'js>>) -> rquickjs::Result<()> {
        no_args(&this.0, &args, "canvas.fill", |c| c.fill()).or_throw_js(&ctx)
    }

    #[qjs(rename = "fillRect")]
    pub fn fill_rect(this: This<Value<'js>>, ctx: Ctx<'js>, args: Rest<Value<'js>>) -> rquickjs::Result<()> {
        const M: &str = "canvas.fillRect";
        let call = || -> CanvasResult<()> {
            expect_args(M, args.len(), 4, 4)?;
            let class = receiver(&this.0, M)?;
            let [x, y, w, h] = rect_args(&ctx, M, &args)?;
            with_mut(&class, M, |c| c.fill_rect(x, y, w, h))
        };
        call().or_throw_js(&ctx)
    }

    #[qjs(rename = "clearRect")]
    pub fn clear_rect(this: This<Value<'js>>, ctx: Ctx<'js>, args: Rest<Value<'js>>) -> rquickjs::Result<()> {
        const M: &str = "canvas.clearRect";
        let call = || -> CanvasResult<()> {
            expect_args(M, args.len(), 4, 4)?;
            let class = receiver(&this.0, M)?;
            let [x, y, w, h] = rect_args(&ctx, M, &args)?;
            with_mut(&class, M, |c| c.clear_rect(x, y, w, h))
        };
        call().or_throw_js(&ctx)
    }

    pub fn clear(this: This<Value<'js>>, ctx: Ctx<'js>, args: Rest<Value<'js>>) -> rquickjs::Result<()> {
        no_args(&this.0, &args, "canvas.clear", |c| c.clear()).or_throw_js(&ctx)
    }

    #[qjs(rename = "setFillColor")]
    pub fn set_fill_color(this: This<Value<'js>>, ctx: Ctx<'js>, args: Rest<Value<'js>>) -> rquickjs::Result<()> {
        const M: &str = "canvas.setFillColor";
        let call = || -> CanvasResult<()> {
            expect_args(M, args.len(), 3, 4)?;
            let class = receiver(&this.0, M)?;
            let r = to_channel(&ctx, M, 0, &args[0])?;
            let g = to_channel(&ctx, M, 1, &args[1])?;
            let b = to_channel(&ctx, M, 2, &args[2])?;
            let a = match args.get(3) {
                Some(v) => to_channel(&ctx, M, 3, v)?,
                None => 255,
            };
            with_mut(&class, M, |c| c.set_fill_color(r, g, b, a))
        };
        call().or_throw_js(&ctx)
    }

    #[qjs(rename = "setGlobalAlpha")]
    pub fn set_global_alpha(this: This<Value<'js>>, ctx: Ctx<'js>, args: Rest<Value<'js>>) -> rquickjs::Result<()> {
        const M: &str = "canvas.setGlobalAlpha";
        let call = || -> CanvasResult<()> {
            expect_args(M, args.len(), 1, 1)?;
            let class = receiver(&this.0, M)?;
            let alpha = to_f64(&ctx, M, 0, &args[0])?;
            with_mut(&class, M, |c| c.set_global_alpha(alpha))
        };
        call().or_throw_js(&ctx)
    }

    pub fn show(this: This<Value<'js>>, ctx: Ctx<'js>, args: Rest<Value<'js>>) -> rquickjs::Result<()> {
        no_args(&this.0, &args, "canvas.show", |c| c.show()).or_throw_js(&ctx)
    }

    /// 返回 `Event` 实例，队列为空时返回 `undefined`
    #[qjs(rename = "pollEvent")]
    pub fn poll_event(
        this: This<Value<'js>>,
        ctx: Ctx<'js>,
        args: Rest<Value<'js>>,
    ) -> rquickjs::Result<Option<Class<'js, JsEvent<'js>>>> {
        let event = no_args(&this.0, &args, "canvas.pollEvent", |c| c.poll_event()).or_throw_js(&ctx)?;
        match event {
            Some(event) => Class::instance(ctx.clone(), JsEvent::wrap(event)).map(Some),
            None => Ok(None),
        }
    }

    pub fn quit(this: This<Value<'js>>, ctx: Ctx<'js>, args: Rest<Value<'js>>) -> rquickjs::Result<()> {
        no_args(&this.0, &args, "canvas.quit", |c| c.quit()).or_throw_js(&ctx)
    }

    /// 立即释放窗口和渲染器；之后的调用抛出 `InvalidReceiver`，重复关闭无效果
    pub fn close(this: This<Value<'js>>, ctx: Ctx<'js>, args: Rest<Value<'js>>) -> rquickjs::Result<()> {
        let call = || -> CanvasResult<()> {
            expect_args("canvas.close", args.len(), 0, 0)?;
            let class = class_of(&this.0, "canvas.close")?;
            with_mut(&class, "canvas.close", |c| {
                c.close();
                Ok(())
            })
        };
        call().or_throw_js(&ctx)
    }

    /// 像素缓冲区中的 `[r, g, b, a]`
    #[qjs(rename = "getPixel")]
    pub fn get_pixel(this: This<Value<'js>>, ctx: Ctx<'js>, args: Rest<Value<'js>>) -> rquickjs::Result<Vec<u8>> {
        const M: &str = "canvas.getPixel";
        let call = || -> CanvasResult<Vec<u8>> {
            expect_args(M, args.len(), 2, 2)?;
            let class = receiver(&this.0, M)?;
            let x = to_i32(&ctx, M, 0, &args[0])?;
            let y = to_i32(&ctx, M, 1, &args[1])?;
            // 负坐标按越界处理
            let x = u32::try_from(x).unwrap_or(u32::MAX);
            let y = u32::try_from(y).unwrap_or(u32::MAX);
            let c = with_ref(&class, M, |c| c.pixel(x, y))?;
            Ok(vec![c.r, c.g, c.b, c.a])
        };
        call().or_throw_js(&ctx)
    }

    #[qjs(rename = "savePng")]
    pub fn save_png(this: This<Value<'js>>, ctx: Ctx<'js>, args: Rest<Value<'js>>) -> rquickjs::Result<()> {
        const M: &str = "canvas.savePng";
        let call = || -> CanvasResult<()> {
            expect_args(M, args.len(), 1, 1)?;
            let class = receiver(&this.0, M)?;
            let path = to_string(M, 0, &args[0])?;
            with_ref(&class, M, |c| c.save_png(&path))
        };
        call().or_throw_js(&ctx)
    }
}
