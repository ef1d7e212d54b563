//! 类型擦除的处理器注册表
//!
//! 命令处理器与查询处理器共用同一套注册/解析逻辑，但各自持有独立的注册表实例
//! （以 [`HandlerKind`] 标记），因此命令与查询之间不会相互解析。
//!
//! 键为 `(输入类型 TypeId, 输出类型 TypeId)`，值为擦除后的调用闭包；
//! 调用端负责装箱输入并还原输出。
//!
use crate::config::ProcessorConfig;
use crate::context::AppContext;
use crate::error::{AppError, HandlerKind};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::any::{Any, TypeId, type_name};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;
use tracing::{Instrument, debug, warn};

pub(crate) type BoxAnySend = Box<dyn Any + Send>;

pub(crate) type ErasedFuture<'a> =
    Pin<Box<dyn Future<Output = Result<BoxAnySend, AppError>> + Send + 'a>>;

pub(crate) type ErasedHandlerFn =
    Arc<dyn for<'a> Fn(BoxAnySend, &'a AppContext) -> ErasedFuture<'a> + Send + Sync>;

/// 固定闭包签名为高阶生命周期，避免推断为单一生命周期
pub(crate) fn erased<F>(f: F) -> ErasedHandlerFn
where
    F: for<'a> Fn(BoxAnySend, &'a AppContext) -> ErasedFuture<'a> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// 已注册处理器的只读描述
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Registration {
    pub kind: HandlerKind,
    /// 命令/查询的稳定名称
    pub name: &'static str,
    /// 结果类型名
    pub result: &'static str,
}

pub(crate) struct HandlerRegistry {
    kind: HandlerKind,
    config: ProcessorConfig,
    handlers: DashMap<(TypeId, TypeId), (Registration, ErasedHandlerFn)>,
}

impl HandlerRegistry {
    pub(crate) fn new(kind: HandlerKind, config: ProcessorConfig) -> Self {
        Self {
            kind,
            config,
            handlers: DashMap::new(),
        }
    }

    /// 注册擦除后的处理器；`O` 为闭包实际产出的（装箱前）类型
    pub(crate) fn insert<I, O>(
        &self,
        name: &'static str,
        result: &'static str,
        f: ErasedHandlerFn,
    ) -> Result<(), AppError>
    where
        I: 'static,
        O: 'static,
    {
        let registration = Registration {
            kind: self.kind,
            name,
            result,
        };

        match self.handlers.entry((TypeId::of::<I>(), TypeId::of::<O>())) {
            Entry::Occupied(mut entry) => {
                if !self.config.allow_override {
                    return Err(AppError::AlreadyRegistered {
                        kind: self.kind,
                        name,
                        result,
                    });
                }
                warn!(kind = %self.kind, name, result, "handler overridden");
                entry.insert((registration, f));
            }
            Entry::Vacant(entry) => {
                debug!(kind = %self.kind, name, result, "handler registered");
                entry.insert((registration, f));
            }
        }

        Ok(())
    }

    pub(crate) fn contains<I: 'static, O: 'static>(&self) -> bool {
        self.handlers
            .contains_key(&(TypeId::of::<I>(), TypeId::of::<O>()))
    }

    pub(crate) fn registrations(&self) -> Vec<Registration> {
        self.handlers.iter().map(|e| e.value().0.clone()).collect()
    }

    /// 解析并调用处理器，返回还原后的输出
    ///
    /// 未注册时在执行任何处理器代码之前返回 `HandlerNotFound`；
    /// 处理器返回的错误原样透传。
    pub(crate) async fn dispatch<I, O>(
        &self,
        ctx: &AppContext,
        input: I,
        name: &'static str,
        result: &'static str,
    ) -> Result<O, AppError>
    where
        I: Send + 'static,
        O: 'static,
    {
        let key = (TypeId::of::<I>(), TypeId::of::<O>());
        // 先克隆出闭包并释放分片锁，避免跨 await 持有
        let Some(f) = self.handlers.get(&key).map(|h| h.value().1.clone()) else {
            return Err(AppError::HandlerNotFound {
                kind: self.kind,
                name,
                result,
            });
        };

        let span = match self.kind {
            HandlerKind::Command => tracing::info_span!(
                "cqrs.command",
                command = name,
                result,
                correlation_id = ctx.correlation_id()
            ),
            HandlerKind::Query => tracing::info_span!(
                "cqrs.query",
                query = name,
                result,
                correlation_id = ctx.correlation_id()
            ),
        };

        let started = Instant::now();
        let out = (f)(Box::new(input), ctx).instrument(span.clone()).await;
        let elapsed = started.elapsed();

        span.in_scope(|| match self.config.slow_threshold() {
            Some(threshold) if elapsed > threshold => {
                warn!(elapsed_ms = elapsed.as_millis() as u64, "slow dispatch")
            }
            _ => debug!(
                elapsed_ms = elapsed.as_millis() as u64,
                ok = out.is_ok(),
                "dispatch finished"
            ),
        });

        match out?.downcast::<O>() {
            Ok(value) => Ok(*value),
            Err(_) => Err(AppError::TypeMismatch {
                expected: type_name::<O>(),
                found: "unknown",
            }),
        }
    }

    #[cfg(test)]
    pub(crate) fn insert_raw<I: 'static, O: 'static>(&self, f: ErasedHandlerFn) {
        let registration = Registration {
            kind: self.kind,
            name: type_name::<I>(),
            result: type_name::<O>(),
        };
        self.handlers
            .insert((TypeId::of::<I>(), TypeId::of::<O>()), (registration, f));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::Mutex;
    use std::time::Duration;

    struct Ping;
    struct Pong;

    fn pong_fn() -> ErasedHandlerFn {
        erased(|_boxed, _ctx| Box::pin(async move { Ok(Box::new(Pong) as BoxAnySend) }))
    }

    #[test]
    fn duplicate_key_is_rejected_by_default() {
        let registry = HandlerRegistry::new(HandlerKind::Query, ProcessorConfig::default());
        registry.insert::<Ping, Pong>("Ping", "Pong", pong_fn()).unwrap();

        let err = registry
            .insert::<Ping, Pong>("Ping", "Pong", pong_fn())
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::AlreadyRegistered {
                kind: HandlerKind::Query,
                name: "Ping",
                ..
            }
        ));
        assert_eq!(registry.registrations().len(), 1);
    }

    fn tagged_fn(tag: &'static str) -> ErasedHandlerFn {
        erased(move |_boxed, _ctx| Box::pin(async move { Ok(Box::new(tag) as BoxAnySend) }))
    }

    #[tokio::test]
    async fn duplicate_key_replaces_when_override_allowed() {
        let config = ProcessorConfig::builder().allow_override(true).build();
        let registry = HandlerRegistry::new(HandlerKind::Command, config);
        registry
            .insert::<Ping, &'static str>("Ping", "str", tagged_fn("first"))
            .unwrap();
        registry
            .insert::<Ping, &'static str>("Ping", "str", tagged_fn("second"))
            .unwrap();

        assert_eq!(registry.registrations().len(), 1);
        let out = registry
            .dispatch::<Ping, &'static str>(&AppContext::default(), Ping, "Ping", "str")
            .await
            .unwrap();
        assert_eq!(out, "second");
    }

    /// 收集日志输出
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    #[tokio::test]
    async fn slow_dispatch_warns_and_returns_output() {
        let logs = Captured::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let config = ProcessorConfig::builder().slow_threshold_ms(0).build();
        let registry = HandlerRegistry::new(HandlerKind::Query, config);
        registry
            .insert::<Ping, u32>(
                "Ping",
                "u32",
                erased(|_boxed, _ctx| {
                    Box::pin(async move {
                        tokio::time::sleep(Duration::from_millis(5)).await;
                        Ok(Box::new(7u32) as BoxAnySend)
                    })
                }),
            )
            .unwrap();

        let out = registry
            .dispatch::<Ping, u32>(&AppContext::default(), Ping, "Ping", "u32")
            .await
            .unwrap();
        assert_eq!(out, 7);

        let text = logs.text();
        assert!(text.contains("slow dispatch"), "logs: {text}");
        assert!(text.contains("cqrs.query"), "logs: {text}");
    }

    #[tokio::test]
    async fn fast_dispatch_stays_quiet_without_threshold() {
        let logs = Captured::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let registry = HandlerRegistry::new(HandlerKind::Query, ProcessorConfig::default());
        registry.insert::<Ping, Pong>("Ping", "Pong", pong_fn()).unwrap();
        registry
            .dispatch::<Ping, Pong>(&AppContext::default(), Ping, "Ping", "Pong")
            .await
            .unwrap();

        assert!(!logs.text().contains("slow dispatch"));
    }

    #[tokio::test]
    async fn wrong_output_type_is_a_type_mismatch() {
        let registry = HandlerRegistry::new(HandlerKind::Query, ProcessorConfig::default());
        // 键声明输出为 Pong，但闭包实际返回 String
        registry.insert_raw::<Ping, Pong>(erased(|_boxed, _ctx| {
            Box::pin(async move { Ok(Box::new(String::from("oops")) as BoxAnySend) })
        }));

        let err = registry
            .dispatch::<Ping, Pong>(&AppContext::default(), Ping, "Ping", "Pong")
            .await
            .err()
            .unwrap();
        assert!(matches!(err, AppError::TypeMismatch { .. }));
    }
}
