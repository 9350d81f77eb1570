use super::debug::{HttpDebugConfig, body_for_log, header_line};
use reqwest::Client;
use reqwest::header::HeaderMap;
use serde::Serialize;
#[cfg(test)]
use std::sync::{Arc, Mutex};

/// reqwest client for provider calls, optionally dumping each exchange.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
    debug: HttpDebugConfig,
    #[cfg(test)]
    captured: Option<Arc<Mutex<Vec<String>>>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponseData {
    pub status: u16,
    pub body: String,
}

impl HttpResponseData {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl HttpClient {
    pub fn new(inner: Client, debug: HttpDebugConfig) -> Self {
        Self {
            inner,
            debug,
            #[cfg(test)]
            captured: None,
        }
    }

    /// Non-2xx statuses are returned as data; only transport failures are errors.
    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        url: &str,
        bearer_token: Option<&str>,
        payload: &T,
    ) -> Result<HttpResponseData, reqwest::Error> {
        let mut builder = self.inner.post(url).json(payload);
        if let Some(token) = bearer_token {
            builder = builder.bearer_auth(token);
        }
        let request = builder.build()?;

        if self.debug.enabled {
            let body = serde_json::to_string(payload).unwrap_or_default();
            self.emit(format!("> {} {}", request.method(), request.url()));
            self.emit_exchange('>', request.headers(), &body);
        }

        let response = self.inner.execute(request).await.inspect_err(|err| {
            tracing::warn!(error = %err, "provider request failed before a response arrived");
        })?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.text().await?;

        if self.debug.enabled {
            self.emit(format!("< HTTP {status}"));
            self.emit_exchange('<', &headers, &body);
        }

        Ok(HttpResponseData { status, body })
    }

    fn emit_exchange(&self, direction: char, headers: &HeaderMap, body: &str) {
        for (name, value) in headers {
            self.emit(format!("{direction} {}", header_line(name, value)));
        }
        let body = body_for_log(body, self.debug.max_body_chars);
        if body.is_empty() {
            self.emit(format!("{direction} <empty body>"));
        }
        for line in body.lines() {
            self.emit(format!("{direction} {line}"));
        }
    }

    fn emit(&self, line: String) {
        if self.capture(&line) {
            return;
        }
        tracing::debug!(target: "persona_chat::http", "{line}");
    }

    #[cfg(not(test))]
    fn capture(&self, _line: &str) -> bool {
        false
    }

    #[cfg(test)]
    fn capture(&self, line: &str) -> bool {
        let Some(captured) = &self.captured else {
            return false;
        };
        if let Ok(mut lines) = captured.lock() {
            lines.push(line.to_string());
        }
        true
    }

    #[cfg(test)]
    fn capturing(debug: HttpDebugConfig) -> (Self, Arc<Mutex<Vec<String>>>) {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let client = Self {
            inner: Client::new(),
            debug,
            captured: Some(Arc::clone(&captured)),
        };
        (client, captured)
    }
}
