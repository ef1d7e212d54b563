use crate::{context::AppContext, error::AppError, query::Query};
use async_trait::async_trait;

#[async_trait]
pub trait QueryHandler<Q, R>: Send + Sync
where
    Q: Query,
    R: Send + 'static,
{
    async fn handle(&self, ctx: &AppContext, q: Q) -> Result<R, AppError>;
}
