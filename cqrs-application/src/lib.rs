//! CQRS 应用层调度库（cqrs-application）
//!
//! 提供命令/查询的契约与进程内调度：
//! - 契约：`Command`、`Query`、`CommandHandler`、`QueryHandler`、`CommandResult`
//! - 调度：按 `(输入类型, 结果类型)` 解析唯一处理器的 `InMemoryCommandProcessor` /
//!   `InMemoryQueryProcessor`，未注册即为装配错误
//! - 校验：`Validator` 与校验装饰器 `ValidatedCommandHandler`，校验失败时短路
//! - 装配：`Registrar` 收集处理器与校验器并构建 `Dispatcher`
//!
//! 调度核心不引入队列、重试或并发协调；每次调度都是独立的异步调用，
//! 取消与超时由调用方的异步调用链负责。
//!
pub mod command;
pub mod command_handler;
pub mod command_processor;
pub mod command_result;
pub mod config;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod inmemory_command_processor;
pub mod inmemory_query_processor;
pub mod query;
pub mod query_handler;
pub mod query_processor;
pub mod registrar;
mod registry;
pub mod validation;

pub use command_result::CommandResult;
pub use dispatcher::Dispatcher;
pub use inmemory_command_processor::InMemoryCommandProcessor;
pub use inmemory_query_processor::InMemoryQueryProcessor;
pub use registrar::{HandlerModule, Registrar};
pub use registry::Registration;
