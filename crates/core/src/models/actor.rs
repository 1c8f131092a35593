use std::fmt;

use serde::{Deserialize, Serialize};

/// 月度成本折算为时薪时使用的工时
pub const MONTHLY_PRORATING_HOURS: f64 = 160.0;
/// 年度成本折算为时薪时使用的工时
pub const ANNUAL_PRORATING_HOURS: f64 = 2000.0;

/// 参与方（团队或资源）标识
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(String);

impl ActorId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActorId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingMode {
    Hourly,
    MonthlyProrated,
    AnnualProrated,
}

impl PricingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PricingMode::Hourly => "hourly",
            PricingMode::MonthlyProrated => "monthly_prorated",
            PricingMode::AnnualProrated => "annual_prorated",
        }
    }
}

/// 参与方计价方式及费率
///
/// 金额部分（时薪、月度成本或年度成本）可以在参数面板上调整，
/// 折算工时是固定配置。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Pricing {
    Hourly {
        rate: f64,
    },
    MonthlyProrated {
        monthly_cost: f64,
        #[serde(default = "default_monthly_hours")]
        prorating_hours: f64,
    },
    AnnualProrated {
        annual_cost: f64,
        #[serde(default = "default_annual_hours")]
        prorating_hours: f64,
    },
}

fn default_monthly_hours() -> f64 {
    MONTHLY_PRORATING_HOURS
}

fn default_annual_hours() -> f64 {
    ANNUAL_PRORATING_HOURS
}

impl Pricing {
    pub fn hourly(rate: f64) -> Self {
        Pricing::Hourly { rate }
    }

    pub fn monthly(monthly_cost: f64) -> Self {
        Pricing::MonthlyProrated {
            monthly_cost,
            prorating_hours: MONTHLY_PRORATING_HOURS,
        }
    }

    pub fn annual(annual_cost: f64) -> Self {
        Pricing::AnnualProrated {
            annual_cost,
            prorating_hours: ANNUAL_PRORATING_HOURS,
        }
    }

    pub fn mode(&self) -> PricingMode {
        match self {
            Pricing::Hourly { .. } => PricingMode::Hourly,
            Pricing::MonthlyProrated { .. } => PricingMode::MonthlyProrated,
            Pricing::AnnualProrated { .. } => PricingMode::AnnualProrated,
        }
    }

    /// 可调整的金额
    pub fn amount(&self) -> f64 {
        match *self {
            Pricing::Hourly { rate } => rate,
            Pricing::MonthlyProrated { monthly_cost, .. } => monthly_cost,
            Pricing::AnnualProrated { annual_cost, .. } => annual_cost,
        }
    }

    /// 替换金额，保留计价方式与折算工时
    pub fn with_amount(self, amount: f64) -> Self {
        match self {
            Pricing::Hourly { .. } => Pricing::Hourly { rate: amount },
            Pricing::MonthlyProrated {
                prorating_hours, ..
            } => Pricing::MonthlyProrated {
                monthly_cost: amount,
                prorating_hours,
            },
            Pricing::AnnualProrated {
                prorating_hours, ..
            } => Pricing::AnnualProrated {
                annual_cost: amount,
                prorating_hours,
            },
        }
    }

    pub fn prorating_hours(&self) -> Option<f64> {
        match *self {
            Pricing::Hourly { .. } => None,
            Pricing::MonthlyProrated {
                prorating_hours, ..
            }
            | Pricing::AnnualProrated {
                prorating_hours, ..
            } => Some(prorating_hours),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ActorDef")]
pub struct Actor {
    pub id: ActorId,
    /// 汇总时所属团队，例如 SAS 下的三个级别
    pub team: String,
    pub pricing: Pricing,
}

/// 配置中的参与方，未写团队时以自身标识作为团队
#[derive(Deserialize)]
struct ActorDef {
    id: ActorId,
    #[serde(default)]
    team: Option<String>,
    pricing: Pricing,
}

impl From<ActorDef> for Actor {
    fn from(def: ActorDef) -> Self {
        let team = def.team.unwrap_or_else(|| def.id.to_string());
        Self {
            id: def.id,
            team,
            pricing: def.pricing,
        }
    }
}

impl Actor {
    pub fn new<I: Into<String>, T: Into<String>>(id: I, team: T, pricing: Pricing) -> Self {
        Self {
            id: ActorId::new(id),
            team: team.into(),
            pricing,
        }
    }
}
