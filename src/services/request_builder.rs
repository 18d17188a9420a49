//! 请求构造 - 业务能力层
//!
//! 只负责把一条记录变成两个 PVGIS 查询，不发起任何网络请求。

use crate::config::Config;
use crate::models::{Dataset, Orientation, Record};
use reqwest::Url;

/// 每次运行中固定不变的 PVGIS 参数
#[derive(Debug, Clone, PartialEq)]
pub struct BaseParams {
    pub peak_power: f64,
    pub loss: f64,
    pub vertical_axis: u8,
    pub angle: f64,
    pub azimuth: f64,
    pub output_format: String,
}

impl BaseParams {
    pub fn from_config(config: &Config) -> Self {
        Self {
            peak_power: config.peak_power,
            loss: config.loss,
            vertical_axis: config.vertical_axis,
            angle: config.angle,
            azimuth: config.azimuth,
            output_format: config.output_format.clone(),
        }
    }
}

impl Default for BaseParams {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// 单次查询的完整参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryDescriptor<'a> {
    pub base: &'a BaseParams,
    pub aspect: f64,
    pub lat: f64,
    pub lon: f64,
}

impl<'a> QueryDescriptor<'a> {
    pub fn new(base: &'a BaseParams, record: &Record, orientation: Orientation) -> Self {
        Self {
            base,
            aspect: record.aspect(orientation),
            lat: record.lat,
            lon: record.lon,
        }
    }

    /// 查询参数，顺序固定
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("peakpower", format_number(self.base.peak_power)),
            ("loss", format_number(self.base.loss)),
            ("vertical_axis", self.base.vertical_axis.to_string()),
            ("angle", format_number(self.base.angle)),
            ("azimuth", format_number(self.base.azimuth)),
            ("outputformat", self.base.output_format.clone()),
            ("aspect", format_number(self.aspect)),
            ("lat", format_number(self.lat)),
            ("lon", format_number(self.lon)),
        ]
    }

    /// 拼出完整 URL，参数值由 `Url` 负责百分号编码
    pub fn to_url(&self, endpoint: &Url) -> Url {
        let mut url = endpoint.clone();
        url.query_pairs_mut().extend_pairs(self.query_pairs());
        url
    }
}

/// 一条记录的两个查询
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryPair<'a> {
    pub cw: QueryDescriptor<'a>,
    pub aw: QueryDescriptor<'a>,
}

impl<'a> QueryPair<'a> {
    pub fn new(base: &'a BaseParams, record: &Record) -> Self {
        Self {
            cw: QueryDescriptor::new(base, record, Orientation::Cw),
            aw: QueryDescriptor::new(base, record, Orientation::Aw),
        }
    }

    pub fn get(&self, orientation: Orientation) -> &QueryDescriptor<'a> {
        match orientation {
            Orientation::Cw => &self.cw,
            Orientation::Aw => &self.aw,
        }
    }
}

/// 为数据集中的每条记录构造查询，顺序与记录一致
pub fn build_queries<'a>(dataset: &Dataset, base: &'a BaseParams) -> Vec<QueryPair<'a>> {
    dataset
        .records
        .iter()
        .map(|record| QueryPair::new(base, record))
        .collect()
}

/// 浮点数的稳定文本形式
///
/// `Display` 输出能精确还原的最短十进制表示，且不使用科学计数法。
pub fn format_number(value: f64) -> String {
    value.to_string()
}
