use chrono::{DateTime, SubsecRound, Utc};

use super::domain::ApplicationId;

pub const APPLICATION_ID_PREFIX: &str = "APP-";

/// Source of "now" for the intake pipeline.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock truncated to whole seconds, matching identifier granularity.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now().trunc_subsecs(0)
    }
}

impl ApplicationId {
    /// Identifier for a submission received at `at`.
    ///
    /// Only unique per second: two submissions inside the same second share an id.
    pub fn at(at: DateTime<Utc>) -> Self {
        ApplicationId(format!("{APPLICATION_ID_PREFIX}{}", at.timestamp()))
    }

    pub fn generate(clock: &dyn Clock) -> Self {
        Self::at(clock.now())
    }
}
