use serde::Deserialize;

/// Query string of `GET /vault`.
#[derive(Debug, Deserialize)]
pub struct SecretQuery {
    #[serde(default)]
    pub secret: Option<String>,
}
