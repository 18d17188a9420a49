pub mod csv_loader;

pub use csv_loader::{is_missing, load_dataset, parse_dataset, parse_number, try_load_dataset};
