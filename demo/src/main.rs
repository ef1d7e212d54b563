use anyhow::{Context, Result};
use clap::Parser;
use cqrs_application::Registrar;
use cqrs_application::config::ProcessorConfig;
use cqrs_application::context::{AppContext, BusinessContext};
use cqrs_application::error::AppError;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use ulid::Ulid;

mod telemetry;
mod users;

use users::{GetUser, ListUsers, RegisterUser, RenameUser, UserModule, UserStore, UserView};

#[derive(Debug, Parser)]
#[command(name = "demo", about = "CQRS 调度演示")]
struct Cli {
    /// 处理器配置文件（JSON），也可通过环境变量 CQRS_CONFIG 指定
    #[arg(short, long, env = "CQRS_CONFIG")]
    config: Option<PathBuf>,

    /// 日志级别（RUST_LOG 优先）
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// 日志格式
    #[arg(long, default_value = "pretty", value_parser = ["json", "pretty"])]
    log_format: String,
}

fn load_config(path: Option<&PathBuf>) -> Result<ProcessorConfig> {
    let Some(path) = path else {
        return Ok(ProcessorConfig::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("读取配置文件失败: {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("解析配置文件失败: {}", path.display()))
}

fn request_context(actor: &str) -> AppContext {
    AppContext {
        biz: BusinessContext::builder()
            .correlation_id(Ulid::new().to_string())
            .actor_type("user".to_string())
            .actor_id(actor.to_string())
            .build(),
        idempotency_key: None,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init_logging(&cli.log_level, &cli.log_format)?;

    let config = load_config(cli.config.as_ref())?;
    info!(?config, "processor config loaded");

    let store = Arc::new(UserStore::default());
    let mut registrar = Registrar::with_config(config);
    registrar.scan(&UserModule {
        store: store.clone(),
    });
    let dispatcher = registrar.build()?;

    let ctx = request_context("admin");
    let id = dispatcher
        .execute_command::<RegisterUser, Ulid>(
            &ctx,
            RegisterUser {
                name: "Alice".into(),
                email: "alice@example.com".into(),
            },
        )
        .await?
        .into_payload()
        .context("register returned no id")?;

    // 校验失败：处理器不会执行
    match dispatcher
        .execute_command::<RegisterUser, Ulid>(
            &ctx,
            RegisterUser {
                name: " ".into(),
                email: "nobody".into(),
            },
        )
        .await
    {
        Err(AppError::Validation(err)) => warn!(%err, "registration rejected"),
        other => warn!(?other, "unexpected registration outcome"),
    }

    let renamed = dispatcher
        .execute_command::<RenameUser, ()>(
            &request_context("alice"),
            RenameUser {
                id,
                name: "Alice Liddell".into(),
            },
        )
        .await?;
    info!(success = renamed.is_success(), "rename finished");

    let user = dispatcher
        .execute_query::<GetUser, Option<UserView>>(&ctx, GetUser { id })
        .await?;
    info!(user = %serde_json::to_string(&user)?, "user loaded");

    let all = dispatcher
        .execute_query::<ListUsers, Vec<UserView>>(&ctx, ListUsers)
        .await?;
    info!(count = all.len(), "users listed");

    for r in dispatcher
        .commands()
        .registered_commands()
        .into_iter()
        .chain(dispatcher.queries().registered_queries())
    {
        info!(kind = %r.kind, name = r.name, result = r.result, "registered handler");
    }

    Ok(())
}
