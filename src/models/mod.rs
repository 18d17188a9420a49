pub mod loaders;
pub mod record;

pub use loaders::{load_dataset, try_load_dataset};
pub use record::{ColumnIndex, Dataset, Orientation, Record, YieldTable, YieldValue};
