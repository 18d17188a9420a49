pub mod pvgis_client;

pub use pvgis_client::{extract_yield, FetchOutcome, PvgisClient};
