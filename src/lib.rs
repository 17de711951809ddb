pub mod abi;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::RequestConfig;
pub use core::{etl::RequestEngine, pipeline::PropertyPipeline};
pub use domain::model::{ConsoleLog, EncodedPayload, PropertyRecord, RawApiRecord, RunOutcome};
pub use utils::error::{PipelineError, Result};
