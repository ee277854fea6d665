use thiserror::Error;

/// Failure modes of a single upstream request, in classification priority order.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Timeout, refused connection, or a body that never finished arriving.
    #[error("network error: {0}")]
    Transport(String),

    #[error("upstream returned status {0}")]
    UpstreamStatus(u16),

    #[error("unexpected response shape: {0}")]
    Parse(String),

    /// Response was well-formed but did not mention the requested symbol.
    #[error("{0} not present in response")]
    NotFound(String),

    #[error("non-positive price {0}")]
    InvalidValue(String),

    #[error("{0} is not configured")]
    Configuration(&'static str),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        // urls may carry credentials (bot token, api key)
        let e = e.without_url();
        if let Some(status) = e.status() {
            return FetchError::UpstreamStatus(status.as_u16());
        }
        if e.is_decode() {
            return FetchError::Parse(e.to_string());
        }
        // timeout, connect, request building, redirect, body read
        FetchError::Transport(e.to_string())
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Parse(e.to_string())
    }
}

/// Send `req`, reject non-2xx, and decode the body as `T`.
///
/// The body is read as bytes first so a slow body surfaces as `Transport`
/// while a malformed one surfaces as `Parse`.
pub async fn fetch_json<T>(req: reqwest::RequestBuilder) -> Result<T, FetchError>
where
    T: serde::de::DeserializeOwned,
{
    let res = req.send().await?;

    let status = res.status();
    if !status.is_success() {
        return Err(FetchError::UpstreamStatus(status.as_u16()));
    }

    let body = res.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}
