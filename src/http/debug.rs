use reqwest::header::{HeaderName, HeaderValue};
use serde_json::Value;

const MASK: &str = "***REDACTED***";
const SECRET_HEADERS: [&str; 3] = ["authorization", "x-api-key", "openai-organization"];
const SECRET_JSON_KEYS: [&str; 5] = ["api_key", "apikey", "token", "access_token", "secret"];

/// Provider traffic dump toggled by `--verbose`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpDebugConfig {
    pub enabled: bool,
    pub max_body_chars: usize,
}

impl HttpDebugConfig {
    pub fn from_verbose(verbose: bool) -> Self {
        Self {
            enabled: verbose,
            max_body_chars: 4_000,
        }
    }

    pub fn disabled() -> Self {
        Self::from_verbose(false)
    }
}

/// `name: value`, with credential headers masked.
pub fn header_line(name: &HeaderName, value: &HeaderValue) -> String {
    let shown = if SECRET_HEADERS.contains(&name.as_str()) {
        MASK
    } else {
        value.to_str().unwrap_or("<non-utf8>")
    };
    format!("{name}: {shown}")
}

/// Masks secret keys in JSON bodies, then caps the length.
pub fn body_for_log(raw: &str, max_chars: usize) -> String {
    let masked = match serde_json::from_str::<Value>(raw) {
        Ok(mut json) => {
            mask_secrets(&mut json);
            json.to_string()
        }
        Err(_) => raw.to_string(),
    };
    truncate_for_log(&masked, max_chars)
}

pub fn truncate_for_log(input: &str, max_chars: usize) -> String {
    match input.char_indices().nth(max_chars) {
        None => input.to_string(),
        Some((cut, _)) => {
            let dropped = input[cut..].chars().count();
            format!("{}... <truncated {dropped} chars>", &input[..cut])
        }
    }
}

fn mask_secrets(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, item) in map.iter_mut() {
                if SECRET_JSON_KEYS
                    .iter()
                    .any(|secret| secret.eq_ignore_ascii_case(key))
                {
                    *item = Value::String(MASK.to_string());
                } else {
                    mask_secrets(item);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(mask_secrets),
        _ => {}
    }
}
