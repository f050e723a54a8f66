use serde::Deserialize;

/// Query string for `GET /ai`.
#[derive(Debug, Deserialize)]
pub struct AiQuery {
    /// User message, optionally prefixed with `#<code>`. Missing is the same as empty.
    #[serde(default)]
    pub prompt: Option<String>,
}
