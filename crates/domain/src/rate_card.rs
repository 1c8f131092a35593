use budget_core::config::ProgramConfig;
use budget_core::models::{Actor, ActorId, ParameterKey, ParameterValue, Pricing};
use budget_core::{ConfigurationError, ParameterSurface};

/// 参与方费率表，顺序即成本表的列顺序
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateCard {
    actors: Vec<Actor>,
}

impl RateCard {
    pub fn new(actors: Vec<Actor>) -> Self {
        Self { actors }
    }

    /// 计价方式和折算工时来自配置，金额取参数面板上的当前值
    pub fn assemble<S>(program: &ProgramConfig, surface: &S) -> Self
    where
        S: ParameterSurface + ?Sized,
    {
        let actors = program
            .actors
            .iter()
            .map(|actor| match surface.get(&ParameterKey::Rate(actor.id.clone())) {
                Some(ParameterValue::Amount(amount)) => Actor {
                    pricing: actor.pricing.with_amount(amount),
                    ..actor.clone()
                },
                _ => actor.clone(),
            })
            .collect();
        Self { actors }
    }

    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    pub fn actor_ids(&self) -> Vec<ActorId> {
        self.actors.iter().map(|actor| actor.id.clone()).collect()
    }

    pub fn get(&self, id: &ActorId) -> Option<&Actor> {
        self.actors.iter().find(|actor| &actor.id == id)
    }
}

/// 参与方的有效时薪
///
/// 按小时计价直接返回费率；按月或按年计价用金额除以折算工时。
/// 折算工时为零时返回配置错误，不做除法。
pub fn effective_hourly_rate(actor: &Actor) -> Result<f64, ConfigurationError> {
    let amount = actor.pricing.amount();
    if !amount.is_finite() || amount < 0.0 {
        return Err(ConfigurationError::InvalidRate {
            actor: actor.id.to_string(),
            value: amount,
        });
    }
    match actor.pricing {
        Pricing::Hourly { rate } => Ok(rate),
        Pricing::MonthlyProrated {
            prorating_hours, ..
        }
        | Pricing::AnnualProrated {
            prorating_hours, ..
        } => {
            if !prorating_hours.is_finite() || prorating_hours < 0.0 {
                Err(ConfigurationError::InvalidProratingHours {
                    actor: actor.id.to_string(),
                    value: prorating_hours,
                })
            } else if prorating_hours == 0.0 {
                Err(ConfigurationError::ZeroProratingHours {
                    actor: actor.id.to_string(),
                })
            } else {
                Ok(amount / prorating_hours)
            }
        }
    }
}
