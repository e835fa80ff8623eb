pub mod builder;
pub mod error;
pub mod explode;
pub mod filter;
pub mod stats;

pub use builder::{AggregateView, AggregateViewBuilder, Reducer, SortOrder, ViewConfig};
pub use error::ViewError;
pub use filter::Filter;
pub use stats::{HistogramBin, SummaryStats};
