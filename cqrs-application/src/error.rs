//! 应用层统一错误定义
//!
//! 区分三类错误：
//! - 配置错误：处理器未注册、重复注册、类型还原失败，属于装配问题，不应重试；
//! - 校验错误：命令在进入处理器之前被校验器拒绝；
//! - 处理器内部错误：由处理器自行返回，调度核心原样透传。
//!
use crate::validation::ValidationError;
use std::fmt;

/// 处理器所属的注册分组
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    Command,
    Query,
}

impl fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Command => f.write_str("command"),
            Self::Query => f.write_str("query"),
        }
    }
}

#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("validation: {0}")]
    Validation(#[from] ValidationError),

    #[error("authorization: {0}")]
    Authorization(String),

    #[error("domain: {0}")]
    Domain(String),

    #[error("infra: {0}")]
    Infra(String),

    #[error("handler not found: {kind}={name}, result={result}")]
    HandlerNotFound {
        kind: HandlerKind,
        name: &'static str,
        result: &'static str,
    },

    /// 重复注册；同一命令的第二个校验器时 `result` 为 `"validator"`
    #[error("already registered: {kind}={name}, for={result}")]
    AlreadyRegistered {
        kind: HandlerKind,
        name: &'static str,
        result: &'static str,
    },

    #[error("type mismatch: expected={expected}, found={found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// 是否为装配（配置）错误：此类错误应立即暴露，不应重试
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::HandlerNotFound { .. } | Self::AlreadyRegistered { .. } | Self::TypeMismatch { .. }
        )
    }
}

/// 统一 Result 类型别名
pub type AppResult<T> = Result<T, AppError>;
