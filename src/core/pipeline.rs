use crate::abi;
use crate::core::fetcher::{build_endpoint, HttpFetcher};
use crate::core::normalizer;
use crate::core::{ConfigProvider, ConsoleLog, EncodedPayload, Pipeline, PropertyRecord, RawApiRecord};
use crate::utils::error::Result;
use crate::utils::redact::redact_url;

/// Fetches one property record and encodes it as `(string,uint256,uint256)`.
pub struct PropertyPipeline<C: ConfigProvider> {
    config: C,
    fetcher: HttpFetcher,
}

impl<C: ConfigProvider> PropertyPipeline<C> {
    pub fn new(config: C) -> Self {
        Self {
            config,
            fetcher: HttpFetcher::new(),
        }
    }
}

#[async_trait::async_trait]
impl<C: ConfigProvider> Pipeline for PropertyPipeline<C> {
    async fn fetch(&self) -> Result<RawApiRecord> {
        let url = build_endpoint(self.config.api_endpoint(), self.config.args())?;
        tracing::info!("📡 Fetching property record from {}", redact_url(&url));

        let record = self
            .fetcher
            .fetch(&url, self.config.headers(), self.config.timeout_ms())
            .await?;
        Ok(record)
    }

    fn normalize(&self, raw: RawApiRecord, console: &mut ConsoleLog) -> Result<PropertyRecord> {
        let record = normalizer::normalize(&raw, console)?;
        tracing::debug!("🔧 Normalized record: {:?}", record);
        Ok(record)
    }

    fn encode(&self, record: PropertyRecord) -> Result<EncodedPayload> {
        let bytes = abi::encode(&PropertyRecord::param_types(), &record.to_tokens())?;
        tracing::debug!("📦 Encoded {} bytes", bytes.len());
        Ok(EncodedPayload::new(bytes))
    }
}
