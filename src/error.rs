//! 错误类型

pub type CanvasResult<T> = Result<T, CanvasError>;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CanvasError {
    /// 参数无法转换为所需类型
    #[error("{method}(): argument {index} {detail}")]
    TypeConversion {
        method: &'static str,
        index: usize,
        detail: String,
    },

    /// 接收者不是对应类型，或已被释放
    #[error("{class}.{method}() called on an invalid or released receiver")]
    InvalidReceiver {
        class: &'static str,
        method: &'static str,
    },

    /// 原生服务调用失败
    #[error("native resource error: {0}")]
    NativeResource(String),

    /// 不允许的操作
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// 参数个数不匹配
    #[error("{method}() expected {expected} arguments, but got {actual}")]
    ArgumentCount {
        method: &'static str,
        expected: &'static str,
        actual: usize,
    },

    /// 读取了事件另一种变体的字段
    #[error("event field `{field}` requires a {expected} event, but this is a {actual} event")]
    WrongVariant {
        field: &'static str,
        expected: &'static str,
        actual: &'static str,
    },
}

impl CanvasError {
    pub fn native(msg: impl Into<String>) -> Self {
        Self::NativeResource(msg.into())
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedOperation(msg.into())
    }

    /// 脚本可见的异常名
    pub fn name(&self) -> &'static str {
        match self {
            Self::TypeConversion { .. } => "TypeConversion",
            Self::InvalidReceiver { .. } => "InvalidReceiver",
            Self::NativeResource(_) => "NativeResourceError",
            Self::UnsupportedOperation(_) => "UnsupportedOperation",
            Self::ArgumentCount { .. } => "ArgumentCountError",
            Self::WrongVariant { .. } => "WrongVariant",
        }
    }
}

/// 脚本宿主错误（读取、求值、引擎初始化）
#[derive(thiserror::Error, Debug)]
pub enum ScriptError {
    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// 脚本抛出的未捕获异常
    #[error("{0}")]
    Exception(String),

    #[error("could not create script context: {0}")]
    Context(String),

    #[error(transparent)]
    Engine(#[from] rquickjs::Error),
}
