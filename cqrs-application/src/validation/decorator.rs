use super::Validator;
use crate::{
    command::Command, command_handler::CommandHandler, command_result::CommandResult,
    context::AppContext, error::AppError,
};
use async_trait::async_trait;
use tracing::warn;

/// 校验装饰器：先校验，再执行被包装的处理器
///
/// 校验失败时直接返回 `AppError::Validation`，被包装的处理器不会被调用，
/// 因此不会产生任何副作用；校验通过后处理器恰好执行一次，结果原样返回。
pub struct ValidatedCommandHandler<H, V> {
    inner: H,
    validator: V,
}

impl<H, V> ValidatedCommandHandler<H, V> {
    pub fn new(inner: H, validator: V) -> Self {
        Self { inner, validator }
    }

    pub fn inner(&self) -> &H {
        &self.inner
    }
}

#[async_trait]
impl<C, R, H, V> CommandHandler<C, R> for ValidatedCommandHandler<H, V>
where
    C: Command,
    R: Send + 'static,
    H: CommandHandler<C, R>,
    V: Validator<C>,
{
    async fn handle(&self, ctx: &AppContext, cmd: C) -> Result<CommandResult<R>, AppError> {
        if let Err(err) = self.validator.validate(ctx, &cmd).await {
            warn!(command = C::NAME, errors = %err, "command rejected by validator");
            return Err(AppError::Validation(err));
        }

        self.inner.handle(ctx, cmd).await
    }
}

/// 为处理器提供 `with_validator` 组合方法
pub trait CommandHandlerExt: Sized {
    fn with_validator<V>(self, validator: V) -> ValidatedCommandHandler<Self, V> {
        ValidatedCommandHandler::new(self, validator)
    }
}

impl<H: Send + Sync> CommandHandlerExt for H {}
