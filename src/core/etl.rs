use crate::core::{ConsoleLog, EncodedPayload, Pipeline, RunOutcome};
use crate::utils::error::{PipelineError, Result};

/// 預設回應大小上限，與鏈上 callback 可接收的位元組數一致
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 256;

/// Runs one request through fetch → normalize → encode.
pub struct RequestEngine<P: Pipeline> {
    pipeline: P,
    max_response_bytes: usize,
}

impl<P: Pipeline> RequestEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self {
            pipeline,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
        }
    }

    pub fn with_max_response_bytes(pipeline: P, max_response_bytes: usize) -> Self {
        Self {
            pipeline,
            max_response_bytes,
        }
    }

    pub async fn run(&self, console: &mut ConsoleLog) -> Result<EncodedPayload> {
        tracing::info!("🚀 Starting request");

        let raw = self.pipeline.fetch().await?;
        tracing::info!("📥 Fetched record with {} fields", raw.data.len());

        let record = self.pipeline.normalize(raw, console)?;

        let payload = self.pipeline.encode(record)?;
        if payload.len() > self.max_response_bytes {
            return Err(PipelineError::ResponseTooLarge {
                size: payload.len(),
                limit: self.max_response_bytes,
            });
        }
        tracing::info!("📦 Encoded payload: {} bytes", payload.len());

        Ok(payload)
    }

    /// Runs the request with a fresh console capture.
    pub async fn execute(&self) -> (Result<EncodedPayload>, ConsoleLog) {
        let mut console = ConsoleLog::new();
        let result = self.run(&mut console).await;
        (result, console)
    }

    /// Runs the request and folds the result into what the harness reports.
    pub async fn simulate(&self) -> RunOutcome {
        let (result, console) = self.execute().await;
        if let Err(e) = &result {
            tracing::error!(
                "❌ Request failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
        }
        RunOutcome::from_result(&result, &console)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{PropertyRecord, RawApiRecord};
    use crate::utils::error::FetchError;
    use alloy_primitives::U256;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// 不連網的 pipeline，記錄各階段被呼叫的次數
    struct StubPipeline {
        fetch_result: fn() -> Result<RawApiRecord>,
        address: String,
        normalize_calls: AtomicUsize,
        encode_calls: AtomicUsize,
    }

    impl StubPipeline {
        fn new(fetch_result: fn() -> Result<RawApiRecord>) -> Self {
            Self {
                fetch_result,
                address: "123 Main St".to_string(),
                normalize_calls: AtomicUsize::new(0),
                encode_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl Pipeline for StubPipeline {
        async fn fetch(&self) -> Result<RawApiRecord> {
            (self.fetch_result)()
        }

        fn normalize(&self, _raw: RawApiRecord, console: &mut ConsoleLog) -> Result<PropertyRecord> {
            self.normalize_calls.fetch_add(1, Ordering::SeqCst);
            console.log(format!("Real Estate Address: {}", self.address));
            Ok(PropertyRecord {
                address: self.address.clone(),
                year_built: U256::from(1998u64),
                lot_size_square_feet: U256::from(5000u64),
            })
        }

        fn encode(&self, record: PropertyRecord) -> Result<EncodedPayload> {
            self.encode_calls.fetch_add(1, Ordering::SeqCst);
            let bytes =
                crate::abi::encode(&PropertyRecord::param_types(), &record.to_tokens())?;
            Ok(EncodedPayload::new(bytes))
        }
    }

    fn ok_record() -> Result<RawApiRecord> {
        Ok(RawApiRecord::default())
    }

    fn server_error() -> Result<RawApiRecord> {
        Err(FetchError::Status {
            status: 500,
            body: "boom".to_string(),
        }
        .into())
    }

    #[tokio::test]
    async fn test_simulate_success() {
        let engine = RequestEngine::new(StubPipeline::new(ok_record));

        let outcome = engine.simulate().await;

        assert!(outcome.is_success());
        assert!(outcome.error_string.is_none());
        assert!(outcome.response_bytes_hexstring.unwrap().starts_with("0x"));
        assert_eq!(
            outcome.captured_terminal_output,
            "Real Estate Address: 123 Main St\n"
        );
    }

    #[tokio::test]
    async fn test_fetch_failure_skips_later_stages() {
        let engine = RequestEngine::new(StubPipeline::new(server_error));

        let outcome = engine.simulate().await;

        assert!(!outcome.is_success());
        assert_eq!(
            outcome.error_string.as_deref(),
            Some("Fetch failed: API returned status 500: boom")
        );
        assert!(outcome.captured_terminal_output.is_empty());
        assert_eq!(engine.pipeline.normalize_calls.load(Ordering::SeqCst), 0);
        assert_eq!(engine.pipeline.encode_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_oversized_payload_is_rejected() {
        let mut pipeline = StubPipeline::new(ok_record);
        pipeline.address = "x".repeat(200);
        let engine = RequestEngine::new(pipeline);

        let mut console = ConsoleLog::new();
        let err = engine.run(&mut console).await.unwrap_err();

        // 3 heads + length word + 7 data words
        assert!(matches!(
            err,
            PipelineError::ResponseTooLarge {
                size: 352,
                limit: 256
            }
        ));
    }

    #[tokio::test]
    async fn test_custom_response_limit() {
        let engine = RequestEngine::with_max_response_bytes(StubPipeline::new(ok_record), 64);
        let outcome = engine.simulate().await;

        assert!(outcome.response_bytes_hexstring.is_none());
        assert_eq!(
            outcome.error_string.as_deref(),
            Some("Encoded response is 160 bytes, limit is 64")
        );
    }
}
