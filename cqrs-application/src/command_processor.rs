use crate::{command::Command, command_result::CommandResult, context::AppContext, error::AppError};
use async_trait::async_trait;

/// 命令处理器调度入口（Command Processor）
///
/// - 根据 `(命令类型, 结果类型)` 解析唯一的处理器并调用；
/// - 未注册时返回配置错误，不会产生任何默认结果；
/// - 该 trait 带有泛型方法，通常以具体实现类型注入使用。
#[async_trait]
pub trait CommandProcessor: Send + Sync {
    /// 执行命令
    ///
    /// - `ctx`：应用上下文（链路追踪、幂等键等）
    /// - `cmd`：具体命令实例，按值消费
    async fn execute<C, R>(&self, ctx: &AppContext, cmd: C) -> Result<CommandResult<R>, AppError>
    where
        C: Command,
        R: Send + 'static;
}
