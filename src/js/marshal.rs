//! 参数个数校验与类型转换，以及错误到 JS 异常的转换

use rquickjs::convert::Coerced;
use rquickjs::{Ctx, Exception, FromJs, Type, Value};

use crate::error::{CanvasError, CanvasResult};

/// 校验参数个数（在任何转换之前）
pub fn expect_args(method: &'static str, actual: usize, min: usize, max: usize) -> CanvasResult<()> {
    if actual >= min && actual <= max {
        return Ok(());
    }
    let expected = match (min, max) {
        (0, 0) => "0",
        (1, 1) => "1",
        (2, 2) => "2",
        (4, 4) => "4",
        (3, 4) => "3 or 4",
        (5, 6) => "5 or 6",
        _ => "a different number of",
    };
    Err(CanvasError::ArgumentCount { method, expected, actual })
}

fn conversion(method: &'static str, index: usize, detail: impl Into<String>) -> CanvasError {
    CanvasError::TypeConversion { method, index, detail: detail.into() }
}

/// 转换为 64 位浮点数
///
/// 数字、布尔、null 和数字字符串可以转换；undefined、symbol、
/// 非数字字符串以及转换结果为 NaN 的对象会失败。
pub fn to_f64<'js>(ctx: &Ctx<'js>, method: &'static str, index: usize, value: &Value<'js>) -> CanvasResult<f64> {
    match value.type_of() {
        Type::Int | Type::Float => value
            .as_number()
            .ok_or_else(|| conversion(method, index, "is not a number")),
        Type::Bool => Ok(if value.as_bool().unwrap_or(false) { 1.0 } else { 0.0 }),
        Type::Null => Ok(0.0),
        Type::Undefined | Type::Uninitialized => Err(conversion(method, index, "is undefined")),
        Type::Symbol => Err(conversion(method, index, "is a symbol")),
        Type::String | Type::Object | Type::Array | Type::Function | Type::Constructor => {
            match Coerced::<f64>::from_js(ctx, value.clone()) {
                Ok(Coerced(n)) if !n.is_nan() => Ok(n),
                Ok(_) => Err(conversion(method, index, "is not numeric")),
                Err(_) => {
                    // 丢弃 valueOf/toString 抛出的异常
                    let _ = ctx.catch();
                    Err(conversion(method, index, "could not be converted to a number"))
                }
            }
        }
        other => Err(conversion(method, index, format!("has unsupported type {:?}", other))),
    }
}

/// 转换为 32 位整数（与 JS ToInt32 相同的截断和回绕）
pub fn to_i32<'js>(ctx: &Ctx<'js>, method: &'static str, index: usize, value: &Value<'js>) -> CanvasResult<i32> {
    to_f64(ctx, method, index, value).map(wrap_i32)
}

/// 颜色分量：先按 ToInt32 转换，再取低 8 位
pub fn to_channel<'js>(ctx: &Ctx<'js>, method: &'static str, index: usize, value: &Value<'js>) -> CanvasResult<u8> {
    to_i32(ctx, method, index, value).map(|v| v as u8)
}

/// 按真值转换为布尔
pub fn to_bool(value: &Value<'_>) -> bool {
    match value.type_of() {
        Type::Bool => value.as_bool().unwrap_or(false),
        Type::Int | Type::Float => value.as_number().map(|n| n != 0.0 && !n.is_nan()).unwrap_or(false),
        Type::String => value
            .as_string()
            .and_then(|s| s.to_string().ok())
            .map(|s| !s.is_empty())
            .unwrap_or(false),
        Type::Undefined | Type::Uninitialized | Type::Null => false,
        _ => true,
    }
}

/// 字符串参数，只接受字符串
pub fn to_string(method: &'static str, index: usize, value: &Value<'_>) -> CanvasResult<String> {
    value
        .as_string()
        .and_then(|s| s.to_string().ok())
        .ok_or_else(|| conversion(method, index, "is not a string"))
}

pub fn wrap_i32(n: f64) -> i32 {
    if !n.is_finite() {
        return 0;
    }
    const TWO_32: f64 = 4_294_967_296.0;
    let mut t = n.trunc() % TWO_32;
    if t < 0.0 {
        t += TWO_32;
    }
    t as u32 as i32
}

/// 将 `CanvasError` 抛为 JS 异常，`name` 为错误类别
pub fn throw(ctx: &Ctx<'_>, err: CanvasError) -> rquickjs::Error {
    let message = err.to_string();
    match Exception::from_message(ctx.clone(), &message) {
        Ok(exception) => {
            if let Err(e) = exception.as_object().set("name", err.name()) {
                return e;
            }
            ctx.throw(exception.as_object().as_value().clone())
        }
        Err(e) => e,
    }
}

/// `CanvasResult` 到 `rquickjs::Result` 的转换
pub trait OrThrow<T> {
    fn or_throw_js(self, ctx: &Ctx<'_>) -> rquickjs::Result<T>;
}

impl<T> OrThrow<T> for CanvasResult<T> {
    fn or_throw_js(self, ctx: &Ctx<'_>) -> rquickjs::Result<T> {
        self.map_err(|e| throw(ctx, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rquickjs::{Context, Runtime};

    fn with_ctx(f: impl FnOnce(Ctx<'_>)) {
        let rt = Runtime::new().unwrap();
        let ctx = Context::full(&rt).unwrap();
        ctx.with(f);
    }

    #[test]
    fn int32_wraps_like_js() {
        assert_eq!(wrap_i32(1.9), 1);
        assert_eq!(wrap_i32(-1.9), -1);
        assert_eq!(wrap_i32(4_294_967_296.0 + 5.0), 5);
        assert_eq!(wrap_i32(2_147_483_648.0), i32::MIN);
        assert_eq!(wrap_i32(f64::NAN), 0);
        assert_eq!(wrap_i32(f64::INFINITY), 0);
    }

    #[test]
    fn argument_count_is_checked_first() {
        assert!(expect_args("canvas.arc", 5, 5, 6).is_ok());
        let err = expect_args("canvas.arc", 2, 5, 6).unwrap_err();
        assert_eq!(err.to_string(), "canvas.arc() expected 5 or 6 arguments, but got 2");
    }

    #[test]
    fn numbers_and_numeric_strings_convert() {
        with_ctx(|ctx| {
            let v: Value = ctx.eval("42.5").unwrap();
            assert_eq!(to_f64(&ctx, "m", 0, &v).unwrap(), 42.5);
            let v: Value = ctx.eval("'12'").unwrap();
            assert_eq!(to_f64(&ctx, "m", 0, &v).unwrap(), 12.0);
            let v: Value = ctx.eval("true").unwrap();
            assert_eq!(to_f64(&ctx, "m", 0, &v).unwrap(), 1.0);
            let v: Value = ctx.eval("null").unwrap();
            assert_eq!(to_f64(&ctx, "m", 0, &v).unwrap(), 0.0);
            let v: Value = ctx.eval("({ valueOf() { return 7; } })").unwrap();
            assert_eq!(to_f64(&ctx, "m", 0, &v).unwrap(), 7.0);
        });
    }

    #[test]
    fn non_numeric_values_fail() {
        with_ctx(|ctx| {
            for src in ["undefined", "'abc'", "Symbol('s')", "({})"] {
                let v: Value = ctx.eval(src).unwrap();
                let err = to_f64(&ctx, "m", 1, &v).unwrap_err();
                assert_eq!(err.name(), "TypeConversion", "{}", src);
            }
        });
    }

    #[test]
    fn truthiness() {
        with_ctx(|ctx| {
            let truthy: Value = ctx.eval("'x'").unwrap();
            let falsy: Value = ctx.eval("0").unwrap();
            assert!(to_bool(&truthy));
            assert!(!to_bool(&falsy));
        });
    }
}
