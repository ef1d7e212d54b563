//! 处理器装配（Registrar）
//!
//! 收集命令处理器、查询处理器与校验器，在 `build` 时统一注册：
//! - 若某命令类型存在校验器，其处理器会被自动包装为 [`ValidatedCommandHandler`]；
//! - 重复注册、同一命令的多个校验器等装配错误在 `build` 时返回；
//! - 通过 [`HandlerModule`] 按功能模块批量贡献处理器（`scan`）。
//!
use crate::{
    command::Command,
    command_handler::CommandHandler,
    config::ProcessorConfig,
    dispatcher::Dispatcher,
    error::{AppError, HandlerKind},
    inmemory_command_processor::InMemoryCommandProcessor,
    inmemory_query_processor::InMemoryQueryProcessor,
    query::Query,
    query_handler::QueryHandler,
    validation::{ValidatedCommandHandler, Validator},
};
use std::any::{Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

type PendingCommand =
    Box<dyn FnOnce(&InMemoryCommandProcessor, &ValidatorSet) -> Result<(), AppError> + Send>;

type PendingQuery = Box<dyn FnOnce(&InMemoryQueryProcessor) -> Result<(), AppError> + Send>;

/// 重复校验器错误中 `result` 字段的取值
pub const DUPLICATE_VALIDATOR: &str = "validator";

/// 功能模块：一次性向装配器贡献一组处理器与校验器
pub trait HandlerModule {
    fn register(&self, registrar: &mut Registrar);
}

impl<F> HandlerModule for F
where
    F: Fn(&mut Registrar),
{
    fn register(&self, registrar: &mut Registrar) {
        self(registrar)
    }
}

/// 以命令 TypeId 为键保存 `Arc<dyn Validator<C>>`
#[derive(Default)]
struct ValidatorSet {
    validators: HashMap<TypeId, (&'static str, Box<dyn Any + Send + Sync>)>,
}

impl ValidatorSet {
    fn get<C: Command>(&self) -> Option<Arc<dyn Validator<C>>> {
        self.validators
            .get(&TypeId::of::<C>())
            .and_then(|(_, v)| v.downcast_ref::<Arc<dyn Validator<C>>>())
            .cloned()
    }
}

#[derive(Default)]
pub struct Registrar {
    config: ProcessorConfig,
    commands: Vec<PendingCommand>,
    queries: Vec<PendingQuery>,
    validators: ValidatorSet,
    handled_commands: HashSet<TypeId>,
    errors: Vec<AppError>,
}

impl Registrar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ProcessorConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// 批量注册某功能模块提供的处理器
    pub fn scan<M>(&mut self, module: &M) -> &mut Self
    where
        M: HandlerModule + ?Sized,
    {
        module.register(self);
        self
    }

    /// 注册命令处理器（单例）
    pub fn command<C, R, H>(&mut self, handler: Arc<H>) -> &mut Self
    where
        C: Command,
        R: Send + 'static,
        H: CommandHandler<C, R> + 'static,
    {
        self.handled_commands.insert(TypeId::of::<C>());
        self.commands.push(Box::new(
            move |processor: &InMemoryCommandProcessor, validators: &ValidatorSet| match validators
                .get::<C>()
            {
                Some(validator) => processor.register::<C, R, _>(Arc::new(
                    ValidatedCommandHandler::new(handler, validator),
                )),
                None => processor.register::<C, R, _>(handler),
            },
        ));
        self
    }

    /// 注册命令处理器工厂（每次调度构造新实例）
    pub fn command_factory<C, R, H, F>(&mut self, factory: F) -> &mut Self
    where
        C: Command,
        R: Send + 'static,
        H: CommandHandler<C, R> + 'static,
        F: Fn() -> H + Send + Sync + 'static,
    {
        self.handled_commands.insert(TypeId::of::<C>());
        self.commands.push(Box::new(
            move |processor: &InMemoryCommandProcessor, validators: &ValidatorSet| match validators
                .get::<C>()
            {
                Some(validator) => processor.register_factory::<C, R, _, _>(move || {
                    ValidatedCommandHandler::new(factory(), validator.clone())
                }),
                None => processor.register_factory::<C, R, _, _>(factory),
            },
        ));
        self
    }

    /// 注册查询处理器（单例）
    pub fn query<Q, R, H>(&mut self, handler: Arc<H>) -> &mut Self
    where
        Q: Query,
        R: Send + 'static,
        H: QueryHandler<Q, R> + 'static,
    {
        self.queries
            .push(Box::new(move |processor: &InMemoryQueryProcessor| {
                processor.register::<Q, R, _>(handler)
            }));
        self
    }

    /// 注册查询处理器工厂
    pub fn query_factory<Q, R, H, F>(&mut self, factory: F) -> &mut Self
    where
        Q: Query,
        R: Send + 'static,
        H: QueryHandler<Q, R> + 'static,
        F: Fn() -> H + Send + Sync + 'static,
    {
        self.queries.push(Box::new(move |processor: &InMemoryQueryProcessor| {
            processor.register_factory::<Q, R, _, _>(factory)
        }));
        self
    }

    /// 为命令类型关联校验器；每个命令类型至多一个
    pub fn validator<C, V>(&mut self, validator: Arc<V>) -> &mut Self
    where
        C: Command,
        V: Validator<C> + 'static,
    {
        let key = TypeId::of::<C>();
        if self.validators.validators.contains_key(&key) {
            self.errors.push(AppError::AlreadyRegistered {
                kind: HandlerKind::Command,
                name: C::NAME,
                result: DUPLICATE_VALIDATOR,
            });
            return self;
        }

        let erased: Arc<dyn Validator<C>> = validator;
        let boxed: Box<dyn Any + Send + Sync> = Box::new(erased);
        self.validators.validators.insert(key, (C::NAME, boxed));
        self
    }

    /// 完成装配，返回可共享的调度入口
    ///
    /// 返回遇到的第一个装配错误。
    pub fn build(self) -> Result<Dispatcher, AppError> {
        let Self {
            config,
            commands,
            queries,
            validators,
            handled_commands,
            errors,
        } = self;

        if let Some(err) = errors.into_iter().next() {
            return Err(err);
        }

        for (key, (name, _)) in validators.validators.iter() {
            if !handled_commands.contains(key) {
                warn!(command = *name, "validator registered without a command handler");
            }
        }

        let command_processor = InMemoryCommandProcessor::with_config(config.clone());
        for pending in commands {
            pending(&command_processor, &validators)?;
        }

        let query_processor = InMemoryQueryProcessor::with_config(config);
        for pending in queries {
            pending(&query_processor)?;
        }

        debug!(
            commands = command_processor.registered_commands().len(),
            queries = query_processor.registered_queries().len(),
            validators = validators.validators.len(),
            "dispatcher built"
        );

        Ok(Dispatcher::new(
            Arc::new(command_processor),
            Arc::new(query_processor),
        ))
    }
}
