//! 单条记录的处理流程 - 流程层
//!
//! 流程顺序：
//! 1. 查询 cw → 等待
//! 2. 查询 aw → 等待
//!
//! 同一时间只有一个请求在途；失败的请求同样要等待。

use tokio::time::sleep;

use crate::clients::PvgisClient;
use crate::models::{Orientation, YieldValue};
use crate::services::{PacingPolicy, QueryPair};
use crate::workflow::record_ctx::RecordCtx;

/// 一条记录两个朝向的结果
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RecordYields {
    pub cw: YieldValue,
    pub aw: YieldValue,
}

impl RecordYields {
    pub fn get(&self, orientation: Orientation) -> YieldValue {
        match orientation {
            Orientation::Cw => self.cw,
            Orientation::Aw => self.aw,
        }
    }

    /// 成功取得的结果个数
    pub fn successes(&self) -> usize {
        usize::from(self.cw.is_some()) + usize::from(self.aw.is_some())
    }
}

/// 记录处理流程
///
/// - 不持有数据集，只处理单条记录的两个查询
/// - 节奏由 `PacingPolicy` 决定
pub struct RecordFlow {
    client: PvgisClient,
    pacing: Box<dyn PacingPolicy>,
}

impl RecordFlow {
    pub fn new(client: PvgisClient, pacing: Box<dyn PacingPolicy>) -> Self {
        Self { client, pacing }
    }

    pub async fn run(&self, queries: &QueryPair<'_>, ctx: &RecordCtx) -> RecordYields {
        let mut yields = RecordYields::default();

        for orientation in Orientation::ALL {
            let value = self.fetch_paced(queries, ctx, orientation).await;
            match orientation {
                Orientation::Cw => yields.cw = value,
                Orientation::Aw => yields.aw = value,
            }
        }

        yields
    }

    async fn fetch_paced(
        &self,
        queries: &QueryPair<'_>,
        ctx: &RecordCtx,
        orientation: Orientation,
    ) -> YieldValue {
        let outcome = self
            .client
            .fetch(queries.get(orientation), ctx, orientation)
            .await;

        sleep(self.pacing.delay_after(&outcome)).await;

        outcome.ok()
    }
}
