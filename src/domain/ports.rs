use crate::domain::model::{ConsoleLog, EncodedPayload, PropertyRecord, RawApiRecord};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;

pub trait ConfigProvider: Send + Sync {
    /// URL template; `{0}`, `{1}`, … are replaced by `args()`.
    fn api_endpoint(&self) -> &str;
    fn args(&self) -> &[String];
    fn headers(&self) -> Option<&HashMap<String, String>>;
    fn timeout_ms(&self) -> u64;
    fn max_response_bytes(&self) -> usize;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn fetch(&self) -> Result<RawApiRecord>;
    fn normalize(&self, raw: RawApiRecord, console: &mut ConsoleLog) -> Result<PropertyRecord>;
    fn encode(&self, record: PropertyRecord) -> Result<EncodedPayload>;
}
