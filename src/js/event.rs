//! `Event` 脚本类 - 只能由 `canvas.pollEvent()` 创建

use std::marker::PhantomData;

use rquickjs::class::{Trace, Tracer};
use rquickjs::function::{Rest, This};
use rquickjs::{Class, Ctx, Value};

use super::marshal::{throw, OrThrow};
use crate::error::{CanvasError, CanvasResult};
use crate::event::{Event, KeyEvent, PointerEvent};

#[rquickjs::class(rename = "Event")]
pub struct JsEvent<'js> {
    event: Event,
    _marker: PhantomData<&'js ()>,
}

impl<'js> Trace<'js> for JsEvent<'js> {
    fn trace<'a>(&self, _tracer: Tracer<'a, 'js>) {}
}

impl<'js> JsEvent<'js> {
    /// 持有事件记录的独立副本
    pub fn wrap(event: Event) -> Self {
        Self { event, _marker: PhantomData }
    }
}

/// 读取 `this` 对应事件的一个字段；`this` 不是 `Event` 实例时抛出 `InvalidReceiver`
fn read<'js, R>(this: &Value<'js>, field: &'static str, f: impl FnOnce(&Event) -> CanvasResult<R>) -> CanvasResult<R> {
    let invalid = || CanvasError::InvalidReceiver { class: "Event", method: field };
    let class = Class::<JsEvent>::from_value(this).map_err(|_| invalid())?;
    let js_event = class.try_borrow().map_err(|_| invalid())?;
    f(&js_event.event)
}

fn key_field<'js, R>(this: &Value<'js>, field: &'static str, f: impl FnOnce(&KeyEvent) -> R) -> CanvasResult<R> {
    read(this, field, |e| e.key_field(field).map(f))
}

fn pointer_field<'js, R>(this: &Value<'js>, field: &'static str, f: impl FnOnce(&PointerEvent) -> R) -> CanvasResult<R> {
    read(this, field, |e| e.pointer_field(field).map(f))
}

#[rquickjs::methods]
impl<'js> JsEvent<'js> {
    #[qjs(constructor)]
    pub fn new(ctx: Ctx<'js>, _args: Rest<Value<'js>>) -> rquickjs::Result<Self> {
        Err(throw(
            &ctx,
            CanvasError::unsupported("Event objects are created by canvas.pollEvent()"),
        ))
    }

    #[qjs(get, enumerable, rename = "type")]
    pub fn event_type(this: This<Value<'js>>, ctx: Ctx<'js>) -> rquickjs::Result<u32> {
        read(&this.0, "type", |e| Ok(e.type_code())).or_throw_js(&ctx)
    }

    #[qjs(get, enumerable)]
    pub fn code(this: This<Value<'js>>, ctx: Ctx<'js>) -> rquickjs::Result<f64> {
        key_field(&this.0, "code", |k| k.code as f64).or_throw_js(&ctx)
    }

    #[qjs(get, enumerable)]
    pub fn key(this: This<Value<'js>>, ctx: Ctx<'js>) -> rquickjs::Result<String> {
        key_field(&this.0, "key", |k| k.key.clone()).or_throw_js(&ctx)
    }

    #[qjs(get, enumerable, rename = "altKey")]
    pub fn alt_key(this: This<Value<'js>>, ctx: Ctx<'js>) -> rquickjs::Result<bool> {
        key_field(&this.0, "altKey", |k| k.modifiers.alt).or_throw_js(&ctx)
    }

    #[qjs(get, enumerable, rename = "ctrlKey")]
    pub fn ctrl_key(this: This<Value<'js>>, ctx: Ctx<'js>) -> rquickjs::Result<bool> {
        key_field(&this.0, "ctrlKey", |k| k.modifiers.ctrl).or_throw_js(&ctx)
    }

    #[qjs(get, enumerable, rename = "shiftKey")]
    pub fn shift_key(this: This<Value<'js>>, ctx: Ctx<'js>) -> rquickjs::Result<bool> {
        key_field(&this.0, "shiftKey", |k| k.modifiers.shift).or_throw_js(&ctx)
    }

    #[qjs(get, enumerable, rename = "metaKey")]
    pub fn meta_key(this: This<Value<'js>>, ctx: Ctx<'js>) -> rquickjs::Result<bool> {
        key_field(&this.0, "metaKey", |k| k.modifiers.meta).or_throw_js(&ctx)
    }

    #[qjs(get, enumerable)]
    pub fn repeat(this: This<Value<'js>>, ctx: Ctx<'js>) -> rquickjs::Result<bool> {
        key_field(&this.0, "repeat", |k| k.repeat).or_throw_js(&ctx)
    }

    #[qjs(get, enumerable)]
    pub fn button(this: This<Value<'js>>, ctx: Ctx<'js>) -> rquickjs::Result<u32> {
        pointer_field(&this.0, "button", |p| p.button as u32).or_throw_js(&ctx)
    }

    #[qjs(get, enumerable)]
    pub fn x(this: This<Value<'js>>, ctx: Ctx<'js>) -> rquickjs::Result<i32> {
        pointer_field(&this.0, "x", |p| p.x).or_throw_js(&ctx)
    }

    #[qjs(get, enumerable)]
    pub fn y(this: This<Value<'js>>, ctx: Ctx<'js>) -> rquickjs::Result<i32> {
        pointer_field(&this.0, "y", |p| p.y).or_throw_js(&ctx)
    }
}
