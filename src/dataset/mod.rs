pub mod column;
pub mod loader;
pub mod record;
pub mod table;

pub use column::{CategoricalColumn, GroupKey, KeyValue, NumericColumn};
pub use loader::{load_csv, LoadReport};
pub use record::Movie;
pub use table::Table;
