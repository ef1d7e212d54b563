use crate::{
    config::ProcessorConfig,
    context::AppContext,
    error::{AppError, HandlerKind},
    query::Query,
    query_handler::QueryHandler,
    query_processor::QueryProcessor,
    registry::{BoxAnySend, HandlerRegistry, Registration, erased},
};
use async_trait::async_trait;
use std::any::type_name;
use std::sync::Arc;

/// 基于内存的 QueryProcessor 实现
/// - 通过 TypeId 注册不同 Query 对应的 Handler
/// - 以类型擦除方式调度，并在调用端进行结果还原
pub struct InMemoryQueryProcessor {
    // 使用 (QueryTypeId, ResultTypeId) 作为键，避免相同 Query 不同返回类型的冲突
    registry: HandlerRegistry,
}

impl Default for InMemoryQueryProcessor {
    fn default() -> Self {
        Self::with_config(ProcessorConfig::default())
    }
}

impl InMemoryQueryProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ProcessorConfig) -> Self {
        Self {
            registry: HandlerRegistry::new(HandlerKind::Query, config),
        }
    }

    /// 注册查询处理器
    pub fn register<Q, R, H>(&self, handler: Arc<H>) -> Result<(), AppError>
    where
        Q: Query,
        R: Send + 'static,
        H: QueryHandler<Q, R> + 'static,
    {
        self.register_provider::<Q, R, H, _>(move || handler.clone())
    }

    /// 注册查询处理器工厂，每次调度构造新的处理器实例
    pub fn register_factory<Q, R, H, F>(&self, factory: F) -> Result<(), AppError>
    where
        Q: Query,
        R: Send + 'static,
        H: QueryHandler<Q, R> + 'static,
        F: Fn() -> H + Send + Sync + 'static,
    {
        self.register_provider::<Q, R, H, _>(move || Arc::new(factory()))
    }

    fn register_provider<Q, R, H, P>(&self, provide: P) -> Result<(), AppError>
    where
        Q: Query,
        R: Send + 'static,
        H: QueryHandler<Q, R> + 'static,
        P: Fn() -> Arc<H> + Send + Sync + 'static,
    {
        let f = erased(move |boxed_q, ctx| {
            let handler = provide();

            Box::pin(async move {
                match boxed_q.downcast::<Q>() {
                    Ok(q) => {
                        let out = handler.handle(ctx, *q).await?;
                        Ok(Box::new(out) as BoxAnySend)
                    }
                    Err(_) => Err(AppError::TypeMismatch {
                        expected: Q::NAME,
                        found: "unknown",
                    }),
                }
            })
        });

        self.registry.insert::<Q, R>(Q::NAME, type_name::<R>(), f)
    }

    pub fn contains<Q: Query, R: Send + 'static>(&self) -> bool {
        self.registry.contains::<Q, R>()
    }

    /// 获取已注册的查询列表（只读视图）
    pub fn registered_queries(&self) -> Vec<Registration> {
        self.registry.registrations()
    }
}

#[async_trait]
impl QueryProcessor for InMemoryQueryProcessor {
    async fn execute<Q, R>(&self, ctx: &AppContext, q: Q) -> Result<R, AppError>
    where
        Q: Query,
        R: Send + 'static,
    {
        self.registry
            .dispatch::<Q, R>(ctx, q, Q::NAME, type_name::<R>())
            .await
    }
}
