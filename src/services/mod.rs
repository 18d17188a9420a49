pub mod pacing;
pub mod request_builder;
pub mod result_writer;

pub use pacing::{FixedDelay, PacingPolicy};
pub use request_builder::{build_queries, BaseParams, QueryDescriptor, QueryPair};
pub use result_writer::{output_path, render_csv, write_results};
