pub mod etl;
pub mod fetcher;
pub mod normalizer;
pub mod pipeline;

pub use crate::domain::model::{ConsoleLog, EncodedPayload, PropertyRecord, RawApiRecord, RunOutcome};
pub use crate::domain::ports::{ConfigProvider, Pipeline};
pub use crate::utils::error::Result;
