use crate::{
    command::Command, command_processor::CommandProcessor, command_result::CommandResult,
    context::AppContext, error::AppError, inmemory_command_processor::InMemoryCommandProcessor,
    inmemory_query_processor::InMemoryQueryProcessor, query::Query,
    query_processor::QueryProcessor,
};
use async_trait::async_trait;
use std::sync::Arc;

/// 命令与查询的统一入口
///
/// 内部持有两个独立的处理器，命令与查询各自解析，互不串用。
/// 通常由 [`Registrar::build`](crate::registrar::Registrar::build) 构造，可廉价克隆后在各请求间共享。
#[derive(Clone)]
pub struct Dispatcher {
    commands: Arc<InMemoryCommandProcessor>,
    queries: Arc<InMemoryQueryProcessor>,
}

impl Dispatcher {
    pub fn new(commands: Arc<InMemoryCommandProcessor>, queries: Arc<InMemoryQueryProcessor>) -> Self {
        Self { commands, queries }
    }

    pub fn commands(&self) -> &Arc<InMemoryCommandProcessor> {
        &self.commands
    }

    pub fn queries(&self) -> &Arc<InMemoryQueryProcessor> {
        &self.queries
    }

    /// 执行命令（避免同时引入两个 trait 时 `execute` 的歧义）
    pub async fn execute_command<C, R>(
        &self,
        ctx: &AppContext,
        cmd: C,
    ) -> Result<CommandResult<R>, AppError>
    where
        C: Command,
        R: Send + 'static,
    {
        CommandProcessor::execute(self.commands.as_ref(), ctx, cmd).await
    }

    /// 执行查询
    pub async fn execute_query<Q, R>(&self, ctx: &AppContext, q: Q) -> Result<R, AppError>
    where
        Q: Query,
        R: Send + 'static,
    {
        QueryProcessor::execute(self.queries.as_ref(), ctx, q).await
    }
}

#[async_trait]
impl CommandProcessor for Dispatcher {
    async fn execute<C, R>(&self, ctx: &AppContext, cmd: C) -> Result<CommandResult<R>, AppError>
    where
        C: Command,
        R: Send + 'static,
    {
        self.execute_command(ctx, cmd).await
    }
}

#[async_trait]
impl QueryProcessor for Dispatcher {
    async fn execute<Q, R>(&self, ctx: &AppContext, q: Q) -> Result<R, AppError>
    where
        Q: Query,
        R: Send + 'static,
    {
        self.execute_query(ctx, q).await
    }
}
