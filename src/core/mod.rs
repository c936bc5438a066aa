pub mod bootstrap;
pub mod etl;
pub mod launcher;

pub use crate::domain::ports::{Pipeline, Storage, WordSegmenter};
pub use crate::utils::error::Result;
