//! 处理器配置
//!
//! 既可通过 builder 在代码中构造，也可由 serde 从配置文件反序列化：
//! ```rust
//! use cqrs_application::config::ProcessorConfig;
//!
//! let config = ProcessorConfig::builder()
//!     .allow_override(true)
//!     .slow_threshold_ms(250)
//!     .build();
//! assert!(config.allow_override);
//! ```
use bon::Builder;
use serde::Deserialize;
use std::time::Duration;

#[derive(Builder, Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// 重复注册同一 (输入类型, 结果类型) 时是否以新处理器覆盖旧处理器；
    /// 默认拒绝并返回 `AlreadyRegistered`
    #[builder(default)]
    pub allow_override: bool,
    /// 慢调度阈值（毫秒）：单次调度耗时超过该值时输出 warn 日志
    pub slow_threshold_ms: Option<u64>,
}

impl ProcessorConfig {
    pub fn slow_threshold(&self) -> Option<Duration> {
        self.slow_threshold_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_reject_override_and_disable_slow_log() {
        let config = ProcessorConfig::default();
        assert!(!config.allow_override);
        assert_eq!(config.slow_threshold(), None);
    }

    #[test]
    fn deserializes_partial_json() {
        let config: ProcessorConfig = serde_json::from_str(r#"{"slow_threshold_ms":50}"#).unwrap();
        assert!(!config.allow_override);
        assert_eq!(config.slow_threshold(), Some(Duration::from_millis(50)));
    }
}
