use crate::domain::model::RawApiRecord;
use crate::utils::error::{FetchError, PipelineError, Result};
use crate::utils::redact::redact_url;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

/// 錯誤訊息中保留的回應內容長度上限
const ERROR_BODY_LIMIT: usize = 512;

/// 以呼叫參數取代 URL 樣板中的 `{0}`、`{1}` 佔位符
///
/// 參數會先做 percent-encoding，`&`、`#`、`?` 不會改變 URL 結構
pub fn build_endpoint(template: &str, args: &[String]) -> Result<Url> {
    let mut endpoint = template.to_string();

    for (i, arg) in args.iter().enumerate() {
        let placeholder = format!("{{{}}}", i);
        if endpoint.contains(&placeholder) {
            let encoded = urlencoding::encode(arg);
            endpoint = endpoint.replace(&placeholder, &encoded);
            tracing::debug!("📡 Replaced {} with {}", placeholder, encoded);
        }
    }

    if let Some(unresolved) = find_placeholder(&endpoint) {
        return Err(PipelineError::ConfigError {
            message: format!(
                "Unresolved placeholder {{{}}} in endpoint; {} argument(s) supplied",
                unresolved,
                args.len()
            ),
        });
    }

    Url::parse(&endpoint).map_err(|e| PipelineError::InvalidConfigValueError {
        field: "source.url".to_string(),
        value: crate::utils::redact::redact_url_str(&endpoint),
        reason: format!("Invalid URL format: {}", e),
    })
}

fn find_placeholder(endpoint: &str) -> Option<&str> {
    let start = endpoint.find('{')?;
    let rest = &endpoint[start + 1..];
    let end = rest.find('}')?;
    let inner = &rest[..end];
    if !inner.is_empty() && inner.bytes().all(|b| b.is_ascii_digit()) {
        Some(inner)
    } else {
        find_placeholder(&rest[end + 1..])
    }
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// 單次 GET，不重試
    pub async fn fetch(
        &self,
        url: &Url,
        headers: Option<&HashMap<String, String>>,
        timeout_ms: u64,
    ) -> std::result::Result<RawApiRecord, FetchError> {
        let mut request = self
            .client
            .get(url.clone())
            .timeout(Duration::from_millis(timeout_ms));

        if let Some(headers) = headers {
            for (key, value) in headers {
                request = request.header(key, value);
            }
        }

        tracing::debug!("📡 Making API request to: {}", redact_url(url));

        let response = request.send().await.map_err(|e| classify(e, timeout_ms))?;
        let status = response.status();
        tracing::debug!("📡 API response status: {}", status);

        let body = response.text().await.map_err(|e| classify(e, timeout_ms))?;

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let json_data: serde_json::Value =
            serde_json::from_str(&body).map_err(FetchError::InvalidJson)?;

        match json_data {
            serde_json::Value::Object(obj) => {
                tracing::debug!("📡 Received record with {} fields", obj.len());
                Ok(RawApiRecord::from(obj))
            }
            other => Err(FetchError::NotAnObject {
                kind: json_kind(&other),
            }),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

fn classify(error: reqwest::Error, timeout_ms: u64) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout { timeout_ms }
    } else {
        // reqwest 的錯誤訊息會帶完整 URL，先移除以免洩漏 access token
        FetchError::Transport(error.without_url())
    }
}

fn truncate_body(body: &str) -> String {
    if body.len() <= ERROR_BODY_LIMIT {
        return body.to_string();
    }
    let mut end = ERROR_BODY_LIMIT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &body[..end])
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[test]
    fn test_build_endpoint_substitutes_args() {
        let args = vec!["P_5dba1fb94aa4055b9f29696f".to_string()];
        let url = build_endpoint(
            "https://api.example.com/OData/test/Property('{0}')?access_token=abc",
            &args,
        )
        .unwrap();

        assert!(url.as_str().contains("Property('P_5dba1fb94aa4055b9f29696f')"));
    }

    #[test]
    fn test_build_endpoint_encodes_reserved_characters() {
        let args = vec!["P_1&access_token=x#frag?y".to_string()];
        let url = build_endpoint(
            "https://api.example.com/Property('{0}')?access_token=abc",
            &args,
        )
        .unwrap();

        assert_eq!(
            url.path(),
            "/Property('P_1%26access_token%3Dx%23frag%3Fy')"
        );
        assert_eq!(url.query(), Some("access_token=abc"));
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn test_build_endpoint_rejects_unresolved_placeholder() {
        let err = build_endpoint("https://api.example.com/{0}/{1}", &["a".to_string()]).unwrap_err();
        assert!(err.to_string().contains("{1}"));
    }

    #[test]
    fn test_build_endpoint_ignores_non_numeric_braces() {
        let url = build_endpoint("https://api.example.com/x?filter={name}", &[]).unwrap();
        assert_eq!(url.host_str(), Some("api.example.com"));
    }

    #[test]
    fn test_truncate_body_respects_char_boundaries() {
        let body = "é".repeat(400);
        let truncated = truncate_body(&body);
        assert!(truncated.ends_with('…'));
        assert!(truncated.len() <= ERROR_BODY_LIMIT + '…'.len_utf8());
    }

    #[tokio::test]
    async fn test_fetch_object_response() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/property")
                .header("Accept", "application/json");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"UnparsedAddress": "1 Elm St", "YearBuilt": 1950}));
        });

        let mut headers = HashMap::new();
        headers.insert("Accept".to_string(), "application/json".to_string());

        let url = Url::parse(&server.url("/property")).unwrap();
        let record = HttpFetcher::new()
            .fetch(&url, Some(&headers), 3000)
            .await
            .unwrap();

        api_mock.assert();
        assert_eq!(record.get("UnparsedAddress").unwrap(), "1 Elm St");
        assert_eq!(record.get("YearBuilt").unwrap().as_u64(), Some(1950));
    }

    #[tokio::test]
    async fn test_fetch_array_response_is_rejected() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/list");
            then.status(200).json_body(serde_json::json!([{"id": 1}]));
        });

        let url = Url::parse(&server.url("/list")).unwrap();
        let err = HttpFetcher::new().fetch(&url, None, 3000).await.unwrap_err();

        assert!(matches!(err, FetchError::NotAnObject { kind: "array" }));
    }

    #[tokio::test]
    async fn test_fetch_status_error_keeps_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/missing");
            then.status(404).body("Property not found");
        });

        let url = Url::parse(&server.url("/missing")).unwrap();
        let err = HttpFetcher::new().fetch(&url, None, 3000).await.unwrap_err();

        match err {
            FetchError::Status { status, body } => {
                assert_eq!(status, 404);
                assert_eq!(body, "Property not found");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
