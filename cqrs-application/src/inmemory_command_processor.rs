use crate::{
    command::Command,
    command_handler::CommandHandler,
    command_processor::CommandProcessor,
    command_result::CommandResult,
    config::ProcessorConfig,
    context::AppContext,
    error::{AppError, HandlerKind},
    registry::{BoxAnySend, HandlerRegistry, Registration, erased},
};
use async_trait::async_trait;
use std::any::type_name;
use std::sync::Arc;

/// 基于内存的 CommandProcessor 实现
/// - 通过 `(C, R)` 的 TypeId 注册不同 Command 对应的 Handler
/// - 运行时以类型擦除（Any）方式进行调度
pub struct InMemoryCommandProcessor {
    registry: HandlerRegistry,
}

impl Default for InMemoryCommandProcessor {
    fn default() -> Self {
        Self::with_config(ProcessorConfig::default())
    }
}

impl InMemoryCommandProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ProcessorConfig) -> Self {
        Self {
            registry: HandlerRegistry::new(HandlerKind::Command, config),
        }
    }

    /// 注册命令处理器（单例：所有调度共享同一实例）
    pub fn register<C, R, H>(&self, handler: Arc<H>) -> Result<(), AppError>
    where
        C: Command,
        R: Send + 'static,
        H: CommandHandler<C, R> + 'static,
    {
        self.register_provider::<C, R, H, _>(move || handler.clone())
    }

    /// 注册命令处理器工厂（瞬态：每次调度都会构造新的处理器实例）
    pub fn register_factory<C, R, H, F>(&self, factory: F) -> Result<(), AppError>
    where
        C: Command,
        R: Send + 'static,
        H: CommandHandler<C, R> + 'static,
        F: Fn() -> H + Send + Sync + 'static,
    {
        self.register_provider::<C, R, H, _>(move || Arc::new(factory()))
    }

    fn register_provider<C, R, H, P>(&self, provide: P) -> Result<(), AppError>
    where
        C: Command,
        R: Send + 'static,
        H: CommandHandler<C, R> + 'static,
        P: Fn() -> Arc<H> + Send + Sync + 'static,
    {
        let f = erased(move |boxed_cmd, ctx| {
            let handler = provide();

            Box::pin(async move {
                // 正常情况下这里的 downcast 永远不会失败（键与闭包同一泛型 C）
                match boxed_cmd.downcast::<C>() {
                    Ok(cmd) => {
                        let out = handler.handle(ctx, *cmd).await?;
                        Ok(Box::new(out) as BoxAnySend)
                    }
                    Err(_) => Err(AppError::TypeMismatch {
                        expected: C::NAME,
                        found: "unknown",
                    }),
                }
            })
        });

        self.registry
            .insert::<C, CommandResult<R>>(C::NAME, type_name::<R>(), f)
    }

    /// 是否已为 `(C, R)` 注册处理器
    pub fn contains<C: Command, R: Send + 'static>(&self) -> bool {
        self.registry.contains::<C, CommandResult<R>>()
    }

    /// 获取已注册的命令列表（只读视图）
    pub fn registered_commands(&self) -> Vec<Registration> {
        self.registry.registrations()
    }
}

#[async_trait]
impl CommandProcessor for InMemoryCommandProcessor {
    async fn execute<C, R>(&self, ctx: &AppContext, cmd: C) -> Result<CommandResult<R>, AppError>
    where
        C: Command,
        R: Send + 'static,
    {
        self.registry
            .dispatch::<C, CommandResult<R>>(ctx, cmd, C::NAME, type_name::<R>())
            .await
    }
}
