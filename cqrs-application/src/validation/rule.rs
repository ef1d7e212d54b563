use super::{ValidationError, Validator};
use crate::{command::Command, context::AppContext};
use async_trait::async_trait;

type Predicate<C> = Box<dyn Fn(&C) -> bool + Send + Sync>;

struct Rule<C> {
    field: &'static str,
    message: String,
    is_satisfied_by: Predicate<C>,
}

/// 规则校验器
///
/// 每条规则是一个作用于命令的谓词；校验时评估全部规则，
/// 将所有不满足的规则汇总为一个 [`ValidationError`]。
///
/// ```rust
/// use cqrs_application::command::Command;
/// use cqrs_application::validation::RuleValidator;
///
/// struct Rename { name: String }
/// impl Command for Rename { const NAME: &'static str = "Rename"; }
///
/// let validator = RuleValidator::<Rename>::new()
///     .rule("name", "must not be empty", |c| !c.name.is_empty())
///     .rule("name", "at most 32 chars", |c| c.name.len() <= 32);
/// assert_eq!(validator.len(), 2);
/// ```
pub struct RuleValidator<C> {
    rules: Vec<Rule<C>>,
}

impl<C> Default for RuleValidator<C> {
    fn default() -> Self {
        Self { rules: Vec::new() }
    }
}

impl<C> RuleValidator<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一条规则：`predicate` 返回 false 时记录 `field: message`
    pub fn rule<F>(mut self, field: &'static str, message: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&C) -> bool + Send + Sync + 'static,
    {
        self.rules.push(Rule {
            field,
            message: message.into(),
            is_satisfied_by: Box::new(predicate),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// 同步评估全部规则
    pub fn check(&self, cmd: &C) -> Result<(), ValidationError> {
        let mut err = ValidationError::new();
        for rule in self.rules.iter().filter(|r| !(r.is_satisfied_by)(cmd)) {
            err.push(rule.field, rule.message.clone());
        }
        err.into_result()
    }
}

#[async_trait]
impl<C> Validator<C> for RuleValidator<C>
where
    C: Command,
{
    async fn validate(&self, _ctx: &AppContext, cmd: &C) -> Result<(), ValidationError> {
        self.check(cmd)
    }
}
