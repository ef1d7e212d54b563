use async_trait::async_trait;
use cqrs_application::InMemoryQueryProcessor;
use cqrs_application::context::{AppContext, BusinessContext};
use cqrs_application::error::AppError;
use cqrs_application::query::Query;
use cqrs_application::query_handler::QueryHandler;
use cqrs_application::query_processor::QueryProcessor;
use std::sync::Arc;

#[derive(Debug)]
struct GetUser {
    id: u32,
}

impl Query for GetUser {
    const NAME: &'static str = "GetUser";
}

#[derive(Debug)]
struct UserDto {
    id: u32,
    name: String,
}

struct GetUserHandler;

#[async_trait]
impl QueryHandler<GetUser, UserDto> for GetUserHandler {
    async fn handle(&self, _ctx: &AppContext, q: GetUser) -> Result<UserDto, AppError> {
        Ok(UserDto {
            id: q.id,
            name: "Alice".into(),
        })
    }
}

#[derive(Debug)]
struct ListUsers;

impl Query for ListUsers {
    const NAME: &'static str = "ListUsers";
}

struct ListUsersHandler;

#[async_trait]
impl QueryHandler<ListUsers, Vec<UserDto>> for ListUsersHandler {
    async fn handle(&self, _ctx: &AppContext, _q: ListUsers) -> Result<Vec<UserDto>, AppError> {
        Ok(vec![
            UserDto {
                id: 1,
                name: "Alice".into(),
            },
            UserDto {
                id: 2,
                name: "Bob".into(),
            },
        ])
    }
}

// 同一查询的另一种结果：只返回数量
struct CountUsersHandler;

#[async_trait]
impl QueryHandler<ListUsers, usize> for CountUsersHandler {
    async fn handle(&self, _ctx: &AppContext, _q: ListUsers) -> Result<usize, AppError> {
        Ok(2)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let processor = InMemoryQueryProcessor::new();
    processor.register::<GetUser, UserDto, _>(Arc::new(GetUserHandler))?;
    processor.register::<ListUsers, Vec<UserDto>, _>(Arc::new(ListUsersHandler))?;
    processor.register::<ListUsers, usize, _>(Arc::new(CountUsersHandler))?;

    let ctx = AppContext {
        biz: BusinessContext::builder()
            .maybe_correlation_id(Some("cor-2".into()))
            .maybe_actor_type(Some("user".into()))
            .maybe_actor_id(Some("u-2".into()))
            .build(),
        idempotency_key: None,
    };
    let dto = processor
        .execute::<GetUser, UserDto>(&ctx, GetUser { id: 1 })
        .await?;
    println!("GetUser: id={}, name={}", dto.id, dto.name);

    let list = processor
        .execute::<ListUsers, Vec<UserDto>>(&ctx, ListUsers)
        .await?;
    let count = processor.execute::<ListUsers, usize>(&ctx, ListUsers).await?;
    println!("ListUsers: count={} (counted {count})", list.len());

    for r in processor.registered_queries() {
        println!("registered: {} -> {}", r.name, r.result);
    }

    // 未注册的查询 -> 返回 HandlerNotFound 错误
    #[derive(Debug)]
    struct GetOrders;

    impl Query for GetOrders {
        const NAME: &'static str = "GetOrders";
    }

    if let Err(err @ AppError::HandlerNotFound { .. }) =
        processor.execute::<GetOrders, Vec<UserDto>>(&ctx, GetOrders).await
    {
        eprintln!("not found as expected: {err}");
    }
    Ok(())
}
