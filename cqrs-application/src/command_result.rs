use serde::{Deserialize, Serialize};

/// 命令执行结果
///
/// 包含成功标志与可选载荷；业务上的“失败结果”并不等同于调度错误：
/// 处理器可以正常返回一个 `failure`，调用方据此决定后续动作，
/// 而校验失败、处理器缺失等则以 [`AppError`](crate::error::AppError) 形式中断调度。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResult<T> {
    success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    payload: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl<T> CommandResult<T> {
    /// 成功并携带载荷
    pub fn success(payload: T) -> Self {
        Self {
            success: true,
            payload: Some(payload),
            message: None,
        }
    }

    /// 成功但无载荷
    pub fn empty() -> Self {
        Self {
            success: true,
            payload: None,
            message: None,
        }
    }

    /// 业务失败，附带原因
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            payload: None,
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn payload(&self) -> Option<&T> {
        self.payload.as_ref()
    }

    pub fn into_payload(self) -> Option<T> {
        self.payload
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// 转换载荷类型，保留成功标志与消息
    pub fn map<U, F>(self, f: F) -> CommandResult<U>
    where
        F: FnOnce(T) -> U,
    {
        CommandResult {
            success: self.success,
            payload: self.payload.map(f),
            message: self.message,
        }
    }
}

impl<T> Default for CommandResult<T> {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_has_no_payload() {
        let r: CommandResult<u32> = CommandResult::failure("duplicate email");
        assert!(!r.is_success());
        assert_eq!(r.payload(), None);
        assert_eq!(r.message(), Some("duplicate email"));
    }

    #[test]
    fn map_keeps_flag_and_message() {
        let r = CommandResult::success(21).map(|v| v * 2);
        assert!(r.is_success());
        assert_eq!(r.into_payload(), Some(42));
    }

    #[test]
    fn serializes_without_empty_fields() {
        let json = serde_json::to_string(&CommandResult::success("u-1")).unwrap();
        assert_eq!(json, r#"{"success":true,"payload":"u-1"}"#);

        let back: CommandResult<String> = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert_eq!(back, CommandResult::empty());
    }
}
