use crate::{command::Command, command_result::CommandResult, context::AppContext, error::AppError};
use async_trait::async_trait;

/// 命令处理器：一个命令类型（及其结果类型）对应唯一一个处理器
#[async_trait]
pub trait CommandHandler<C, R = ()>: Send + Sync
where
    C: Command,
    R: Send + 'static,
{
    async fn handle(&self, ctx: &AppContext, cmd: C) -> Result<CommandResult<R>, AppError>;
}

#[async_trait]
impl<C, R, H> CommandHandler<C, R> for std::sync::Arc<H>
where
    C: Command,
    R: Send + 'static,
    H: CommandHandler<C, R> + ?Sized,
{
    async fn handle(&self, ctx: &AppContext, cmd: C) -> Result<CommandResult<R>, AppError> {
        (**self).handle(ctx, cmd).await
    }
}
