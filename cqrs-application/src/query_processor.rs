use crate::{context::AppContext, error::AppError, query::Query};
use async_trait::async_trait;

/// 查询处理器调度入口（Query Processor）
///
/// - 根据 `(查询类型, 结果类型)` 路由到对应的处理器；
/// - 同一查询可按不同结果类型注册多个处理器。
#[async_trait]
pub trait QueryProcessor: Send + Sync {
    /// 执行查询，返回处理器产出的结果
    async fn execute<Q, R>(&self, ctx: &AppContext, q: Q) -> Result<R, AppError>
    where
        Q: Query,
        R: Send + 'static;
}
