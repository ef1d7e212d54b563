use bon::Builder;
use serde::{Deserialize, Serialize};

/// 业务语境信息
#[derive(Builder, Default, Debug, Clone, Serialize, Deserialize)]
pub struct BusinessContext {
    /// 关联ID
    correlation_id: Option<String>,
    /// 因果ID
    causation_id: Option<String>,
    /// 发起调用的主体类型（如用户、系统等）
    actor_type: Option<String>,
    /// 发起调用的主体ID
    actor_id: Option<String>,
}

impl BusinessContext {
    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    pub fn causation_id(&self) -> Option<&str> {
        self.causation_id.as_deref()
    }

    pub fn actor_type(&self) -> Option<&str> {
        self.actor_type.as_deref()
    }

    pub fn actor_id(&self) -> Option<&str> {
        self.actor_id.as_deref()
    }
}

/// 应用层上下文（Application Context）
///
/// 承载一次应用层调用（命令/查询）所需的横切信息，例如：
/// - 业务语境（`BusinessContext`）：关联追踪 `correlation_id`、因果链 `causation_id`、
///   执行者类型/ID 等；
/// - 幂等键（`idempotency_key`）：用于在基础设施层实现请求幂等（如 API 层重复提交保护）。
///
/// 上下文按引用依次传入处理器、校验器，调度核心不对其做任何修改。
///
/// 典型用法：
/// ```rust
/// use cqrs_application::context::{AppContext, BusinessContext};
///
/// let ctx = AppContext {
///     biz: BusinessContext::builder()
///         .maybe_correlation_id(Some("cor-123".into()))
///         .maybe_causation_id(Some("cau-abc".into()))
///         .maybe_actor_type(Some("user".into()))
///         .maybe_actor_id(Some("u-1".into()))
///         .build(),
///     idempotency_key: Some("idem-xyz".into()),
/// };
/// assert_eq!(ctx.correlation_id(), Some("cor-123"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct AppContext {
    /// 业务语境（链路追踪、审计主体、操作因果）
    pub biz: BusinessContext,
    /// 幂等键（可选）：为空则由上层或基础设施决定是否参与幂等
    pub idempotency_key: Option<String>,
}

impl AppContext {
    /// 便捷访问关联ID（用于日志 span 字段）
    pub fn correlation_id(&self) -> Option<&str> {
        self.biz.correlation_id()
    }
}
