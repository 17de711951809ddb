use url::Url;

const SENSITIVE_PARAMS: &[&str] = &["access_token", "token", "api_key", "apikey", "key", "secret"];

fn is_sensitive(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    SENSITIVE_PARAMS.contains(&name.as_str())
}

/// Returns the URL with credential-like query values replaced by `***`.
pub fn redact_url(url: &Url) -> String {
    if url.query().is_none() {
        return url.to_string();
    }

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let value = if is_sensitive(&k) {
                "***".to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), value)
        })
        .collect();

    let mut redacted = url.clone();
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted.to_string()
}

pub fn redact_url_str(url_str: &str) -> String {
    match Url::parse(url_str) {
        Ok(url) => redact_url(&url),
        // 無法解析時整個查詢字串都遮蔽
        Err(_) => match url_str.split_once('?') {
            Some((base, _)) => format!("{}?***", base),
            None => url_str.to_string(),
        },
    }
}
