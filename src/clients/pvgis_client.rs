/// PVGIS API 客户端
///
/// 一次调用对应一个朝向的查询，所有失败都收敛为 `FetchFailure`，不会向上抛错。
use crate::config::Config;
use crate::error::{AppError, FetchFailure};
use crate::models::Orientation;
use crate::services::request_builder::QueryDescriptor;
use crate::workflow::RecordCtx;
use reqwest::Url;
use serde_json::Value;
use tracing::{debug, info, warn};

/// 单次查询结果：年发电量 (kWh) 或失败原因
pub type FetchOutcome = Result<f64, FetchFailure>;

/// 结果字段在响应 JSON 中的位置
pub const YIELD_POINTER: &str = "/outputs/totals/fixed/E_y";

/// PVGIS 客户端
pub struct PvgisClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl PvgisClient {
    /// 创建客户端，超时时间取自配置
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("pvgis_enrich/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            endpoint: config.api_base_url()?,
        })
    }

    /// 查询一个朝向的年发电量
    ///
    /// 每次调用输出一行进度日志，说明记录、朝向和结果。
    pub async fn fetch(
        &self,
        query: &QueryDescriptor<'_>,
        ctx: &RecordCtx,
        orientation: Orientation,
    ) -> FetchOutcome {
        let url = query.to_url(&self.endpoint);
        debug!("{} GET {}", ctx, url);

        let outcome = self.request(url).await;
        match &outcome {
            Ok(e_y) => info!("查询 ID {} ({})... 成功, E_y = {:.2}", ctx.record_id, orientation, e_y),
            Err(reason) => warn!("查询 ID {} ({})... 失败 - {}", ctx.record_id, orientation, reason),
        }
        outcome
    }

    async fn request(&self, url: Url) -> FetchOutcome {
        let response = self.http.get(url).send().await.map_err(classify_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchFailure::HttpStatus(status.as_u16()));
        }

        let body = response.text().await.map_err(classify_error)?;
        extract_yield(&body)
    }
}

/// 从响应正文中取出 `outputs.totals.fixed.E_y`
pub fn extract_yield(body: &str) -> FetchOutcome {
    let data: Value =
        serde_json::from_str(body).map_err(|e| FetchFailure::InvalidJson(e.to_string()))?;

    match data.pointer(YIELD_POINTER) {
        None | Some(Value::Null) => Err(FetchFailure::MissingField),
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| FetchFailure::NonNumericField(n.to_string())),
        // 数值写成字符串时也接受
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| FetchFailure::NonNumericField(s.clone())),
        Some(other) => Err(FetchFailure::NonNumericField(other.to_string())),
    }
}

fn classify_error(err: reqwest::Error) -> FetchFailure {
    if err.is_timeout() {
        FetchFailure::Timeout
    } else {
        FetchFailure::Transport(err.to_string())
    }
}
