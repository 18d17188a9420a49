//! 请求节奏控制
//!
//! 每次 PVGIS 请求之后（无论成功失败）都要经过一次 `delay_after`，
//! 以后要换成退避策略只需替换实现，`PvgisClient` 的契约不变。

use crate::clients::pvgis_client::FetchOutcome;
use crate::config::Config;
use std::time::Duration;

/// 请求之后的等待策略
pub trait PacingPolicy: Send + Sync {
    /// 本次请求之后需要等待多久
    fn delay_after(&self, outcome: &FetchOutcome) -> Duration;
}

/// 固定间隔
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDelay {
    delay: Duration,
}

impl FixedDelay {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.request_delay())
    }
}

impl PacingPolicy for FixedDelay {
    fn delay_after(&self, _outcome: &FetchOutcome) -> Duration {
        self.delay
    }
}
