pub mod etl;
pub mod pipeline;

pub use crate::domain::model::{Cell, Column, RawUpload, Table, TransformOutput};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
