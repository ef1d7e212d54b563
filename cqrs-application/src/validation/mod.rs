//! 命令校验（validation）
//!
//! - `Validator`：与某一命令类型关联的前置校验；
//! - `RuleValidator`：以规则列表描述的校验器，收集所有失败规则；
//! - `ValidatedCommandHandler`：校验装饰器，校验失败时短路，处理器不会被调用。
//!
pub mod decorator;
pub mod rule;

pub use decorator::{CommandHandlerExt, ValidatedCommandHandler};
pub use rule::RuleValidator;

use crate::{command::Command, context::AppContext};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// 单个字段的校验失败
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// 校验失败结果，包含一个或多个字段错误
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    errors: Vec<FieldError>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

impl ValidationError {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut err = Self::new();
        err.push(field, message);
        err
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// 无错误时视为通过
    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

/// 命令校验器：在对应命令的处理器执行前运行
///
/// 校验失败必须以 `Err` 明确返回，装饰器据此中断调度。
#[async_trait]
pub trait Validator<C>: Send + Sync
where
    C: Command,
{
    async fn validate(&self, ctx: &AppContext, cmd: &C) -> Result<(), ValidationError>;
}

#[async_trait]
impl<C, V> Validator<C> for Arc<V>
where
    C: Command,
    V: Validator<C> + ?Sized,
{
    async fn validate(&self, ctx: &AppContext, cmd: &C) -> Result<(), ValidationError> {
        (**self).validate(ctx, cmd).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_field_errors() {
        let mut err = ValidationError::single("name", "must not be empty");
        err.push("email", "invalid format");
        assert_eq!(
            err.to_string(),
            "name: must not be empty; email: invalid format"
        );
        assert_eq!(err.errors().len(), 2);
    }

    #[test]
    fn empty_error_converts_to_ok() {
        assert!(ValidationError::new().into_result().is_ok());
        assert!(ValidationError::single("x", "y").into_result().is_err());
    }
}
