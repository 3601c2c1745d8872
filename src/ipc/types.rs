use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Mutable defaults applied when a request does not override them.
/// Analyses themselves are stateless; this is the only state the
/// sidecar keeps between requests.
#[derive(Debug, Clone, Copy)]
pub struct Defaults {
    pub identity_column_count: usize,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            identity_column_count: 3,
        }
    }
}

pub struct AppState {
    pub defaults: Defaults,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            defaults: Defaults::default(),
        }
    }
}
