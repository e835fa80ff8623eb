pub mod catalog;
pub mod controls;
pub mod node;
pub mod render;
pub mod section;

pub use catalog::SECTIONS;
pub use controls::ControlEvent;
pub use node::{format_value, BarDatum, ScatterPoint, ViewNode};
pub use section::{DashboardSettings, Section, SectionSnapshot, View};
