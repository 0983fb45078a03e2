pub mod catalog;
pub mod engine;
pub mod extract;
pub mod months;
pub mod transfer;

pub use crate::domain::model::{DatasetId, FileCatalog, LinkFormat, MonthKey};
pub use crate::domain::ports::ConfigProvider;
pub use crate::utils::error::Result;
