use async_trait::async_trait;
use cqrs_application::InMemoryCommandProcessor;
use cqrs_application::command::Command;
use cqrs_application::command_handler::CommandHandler;
use cqrs_application::command_processor::CommandProcessor;
use cqrs_application::context::{AppContext, BusinessContext};
use cqrs_application::error::AppError;
use cqrs_application::validation::{CommandHandlerExt, RuleValidator};
use cqrs_application::CommandResult;
use std::sync::Arc;

#[derive(Debug)]
struct CreateUser {
    name: String,
}

impl Command for CreateUser {
    const NAME: &'static str = "CreateUser";
}

struct CreateUserHandler;

#[async_trait]
impl CommandHandler<CreateUser, u32> for CreateUserHandler {
    async fn handle(&self, _ctx: &AppContext, cmd: CreateUser) -> Result<CommandResult<u32>, AppError> {
        println!("CreateUser: name={}", cmd.name);
        Ok(CommandResult::success(7))
    }
}

#[derive(Debug)]
struct DeleteUser {
    id: u32,
}

impl Command for DeleteUser {
    const NAME: &'static str = "DeleteUser";
}

struct DeleteUserHandler;

#[async_trait]
impl CommandHandler<DeleteUser> for DeleteUserHandler {
    async fn handle(&self, _ctx: &AppContext, cmd: DeleteUser) -> Result<CommandResult<()>, AppError> {
        println!("DeleteUser: id={}", cmd.id);
        Ok(CommandResult::empty())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let processor = InMemoryCommandProcessor::new();

    // CreateUser 带校验：名称不能为空
    let validated = CreateUserHandler.with_validator(
        RuleValidator::new().rule("name", "must not be empty", |c: &CreateUser| !c.name.is_empty()),
    );
    processor.register::<CreateUser, u32, _>(Arc::new(validated))?;
    processor.register::<DeleteUser, (), _>(Arc::new(DeleteUserHandler))?;

    let ctx = AppContext {
        biz: BusinessContext::builder()
            .maybe_correlation_id(Some("cor-1".into()))
            .maybe_causation_id(Some("cau-1".into()))
            .maybe_actor_type(Some("user".into()))
            .maybe_actor_id(Some("u-1".into()))
            .build(),
        idempotency_key: Some("idem-1".into()),
    };

    let created = processor
        .execute::<CreateUser, u32>(
            &ctx,
            CreateUser {
                name: "Alice".into(),
            },
        )
        .await?;
    println!("created id={:?}", created.payload());
    processor.execute::<DeleteUser, ()>(&ctx, DeleteUser { id: 42 }).await?;

    // 校验失败 -> 返回 Validation 错误，处理器不会执行
    if let Err(AppError::Validation(err)) = processor
        .execute::<CreateUser, u32>(&ctx, CreateUser { name: String::new() })
        .await
    {
        eprintln!("rejected as expected: {err}");
    }

    // 未注册的命令 -> 返回 HandlerNotFound 错误
    #[allow(dead_code)]
    #[derive(Debug)]
    struct UpdateUser {
        id: u32,
        name: String,
    }

    impl Command for UpdateUser {
        const NAME: &'static str = "UpdateUser";
    }

    if let Err(err @ AppError::HandlerNotFound { .. }) = processor
        .execute::<UpdateUser, ()>(
            &ctx,
            UpdateUser {
                id: 7,
                name: "Eve".into(),
            },
        )
        .await
    {
        eprintln!("not found as expected: {err}");
    }
    Ok(())
}
