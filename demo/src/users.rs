//! 用户目录：演示命令、查询、校验器与模块化注册
//!
use async_trait::async_trait;
use cqrs_application::command_handler::CommandHandler;
use cqrs_application::context::AppContext;
use cqrs_application::error::AppError;
use cqrs_application::query_handler::QueryHandler;
use cqrs_application::validation::{RuleValidator, ValidationError, Validator};
use cqrs_application::{CommandResult, HandlerModule, Registrar};
use cqrs_macros::{command, query};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use ulid::Ulid;

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("user not found: {0}")]
    NotFound(Ulid),
    #[error("email already taken: {0}")]
    EmailTaken(String),
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        AppError::Domain(err.to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub id: Ulid,
    pub name: String,
    pub email: String,
}

#[derive(Default)]
pub struct UserStore {
    users: RwLock<BTreeMap<Ulid, UserView>>,
}

#[command(name = "user.register")]
pub struct RegisterUser {
    pub name: String,
    pub email: String,
}

#[command(name = "user.rename")]
pub struct RenameUser {
    pub id: Ulid,
    pub name: String,
}

#[query(name = "user.get")]
pub struct GetUser {
    pub id: Ulid,
}

#[query(name = "user.list")]
pub struct ListUsers;

struct RegisterUserHandler {
    store: Arc<UserStore>,
}

#[async_trait]
impl CommandHandler<RegisterUser, Ulid> for RegisterUserHandler {
    async fn handle(&self, ctx: &AppContext, cmd: RegisterUser) -> Result<CommandResult<Ulid>, AppError> {
        let mut users = self.store.users.write().await;
        if users.values().any(|u| u.email == cmd.email) {
            return Err(UserError::EmailTaken(cmd.email).into());
        }

        let id = Ulid::new();
        users.insert(
            id,
            UserView {
                id,
                name: cmd.name,
                email: cmd.email,
            },
        );
        info!(user_id = %id, actor = ?ctx.biz.actor_id(), "user registered");
        Ok(CommandResult::success(id))
    }
}

struct RenameUserHandler {
    store: Arc<UserStore>,
}

#[async_trait]
impl CommandHandler<RenameUser> for RenameUserHandler {
    async fn handle(&self, _ctx: &AppContext, cmd: RenameUser) -> Result<CommandResult<()>, AppError> {
        let mut users = self.store.users.write().await;
        let user = users.get_mut(&cmd.id).ok_or(UserError::NotFound(cmd.id))?;
        if user.name == cmd.name {
            return Ok(CommandResult::failure("name unchanged"));
        }
        user.name = cmd.name;
        Ok(CommandResult::empty())
    }
}

struct GetUserHandler {
    store: Arc<UserStore>,
}

#[async_trait]
impl QueryHandler<GetUser, Option<UserView>> for GetUserHandler {
    async fn handle(&self, _ctx: &AppContext, q: GetUser) -> Result<Option<UserView>, AppError> {
        Ok(self.store.users.read().await.get(&q.id).cloned())
    }
}

struct ListUsersHandler {
    store: Arc<UserStore>,
}

#[async_trait]
impl QueryHandler<ListUsers, Vec<UserView>> for ListUsersHandler {
    async fn handle(&self, _ctx: &AppContext, _q: ListUsers) -> Result<Vec<UserView>, AppError> {
        Ok(self.store.users.read().await.values().cloned().collect())
    }
}

/// 重命名校验：新名称非空且不超过 32 个字符
struct RenameUserValidator;

#[async_trait]
impl Validator<RenameUser> for RenameUserValidator {
    async fn validate(&self, _ctx: &AppContext, cmd: &RenameUser) -> Result<(), ValidationError> {
        match cmd.name.trim() {
            "" => Err(ValidationError::single("name", "must not be blank")),
            name if name.chars().count() > 32 => {
                Err(ValidationError::single("name", "at most 32 characters"))
            }
            _ => Ok(()),
        }
    }
}

fn register_user_rules() -> RuleValidator<RegisterUser> {
    RuleValidator::new()
        .rule("name", "must not be blank", |c: &RegisterUser| {
            !c.name.trim().is_empty()
        })
        .rule("email", "must contain '@'", |c: &RegisterUser| {
            c.email.contains('@')
        })
}

pub struct UserModule {
    pub store: Arc<UserStore>,
}

impl HandlerModule for UserModule {
    fn register(&self, registrar: &mut Registrar) {
        let store = self.store.clone();
        registrar
            .command::<RegisterUser, Ulid, _>(Arc::new(RegisterUserHandler {
                store: store.clone(),
            }))
            .command::<RenameUser, (), _>(Arc::new(RenameUserHandler {
                store: store.clone(),
            }))
            .query::<GetUser, Option<UserView>, _>(Arc::new(GetUserHandler {
                store: store.clone(),
            }))
            .query::<ListUsers, Vec<UserView>, _>(Arc::new(ListUsersHandler { store }))
            .validator::<RegisterUser, _>(Arc::new(register_user_rules()))
            .validator::<RenameUser, _>(Arc::new(RenameUserValidator));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cqrs_application::Dispatcher;

    fn dispatcher(store: &Arc<UserStore>) -> Dispatcher {
        let mut registrar = Registrar::new();
        registrar.scan(&UserModule {
            store: store.clone(),
        });
        registrar.build().unwrap()
    }

    async fn register(d: &Dispatcher, name: &str, email: &str) -> Result<CommandResult<Ulid>, AppError> {
        d.execute_command::<RegisterUser, Ulid>(
            &AppContext::default(),
            RegisterUser {
                name: name.into(),
                email: email.into(),
            },
        )
        .await
    }

    #[tokio::test]
    async fn duplicate_email_is_a_domain_error() {
        let store = Arc::new(UserStore::default());
        let d = dispatcher(&store);

        register(&d, "Alice", "a@x.io").await.unwrap();
        let err = register(&d, "Alicia", "a@x.io").await.unwrap_err();
        match err {
            AppError::Domain(reason) => assert!(reason.contains("a@x.io")),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store.users.read().await.len(), 1);
    }

    #[tokio::test]
    async fn rename_to_same_name_is_a_failed_result() {
        let store = Arc::new(UserStore::default());
        let d = dispatcher(&store);
        let id = register(&d, "Bob", "b@x.io")
            .await
            .unwrap()
            .into_payload()
            .unwrap();

        let result = d
            .execute_command::<RenameUser, ()>(
                &AppContext::default(),
                RenameUser {
                    id,
                    name: "Bob".into(),
                },
            )
            .await
            .unwrap();
        assert!(!result.is_success());
        assert_eq!(result.message(), Some("name unchanged"));
    }

    #[tokio::test]
    async fn blank_rename_is_rejected_before_lookup() {
        let store = Arc::new(UserStore::default());
        let d = dispatcher(&store);

        // 不存在的用户：若校验未短路，将得到 NotFound 而非 Validation
        let err = d
            .execute_command::<RenameUser, ()>(
                &AppContext::default(),
                RenameUser {
                    id: Ulid::new(),
                    name: "   ".into(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn list_reflects_registrations() {
        let store = Arc::new(UserStore::default());
        let d = dispatcher(&store);
        register(&d, "A", "a@x.io").await.unwrap();
        register(&d, "B", "b@x.io").await.unwrap();

        let users = d
            .execute_query::<ListUsers, Vec<UserView>>(&AppContext::default(), ListUsers)
            .await
            .unwrap();
        assert_eq!(users.len(), 2);
    }
}
