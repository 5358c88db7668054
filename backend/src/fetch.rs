use reqwest::{Client, StatusCode};
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid image URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("unsupported URL scheme: {0}")]
    UnsupportedScheme(String),
    #[error("failed to fetch image URL: {0}")]
    Request(#[from] reqwest::Error),
    #[error("image URL returned status {0}")]
    Status(StatusCode),
    #[error("URL does not point to an image (content-type: {0})")]
    NotAnImage(String),
}

/// Fetched image bytes plus the content type the origin declared.
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Fetches a user-supplied image URL. The response must be 2xx with an
/// `image/*` content type; anything else is a [`FetchError`] and nothing
/// reaches the normalizer.
pub async fn fetch_image_url(http: &Client, raw_url: &str) -> Result<FetchedImage, FetchError> {
    // Dragged URLs often carry stray whitespace or zero-width characters.
    let cleaned: String = raw_url
        .trim()
        .chars()
        .filter(|c| !matches!(c, '\u{200B}'..='\u{200D}' | '\u{FEFF}'))
        .collect();

    let url = Url::parse(&cleaned)?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(FetchError::UnsupportedScheme(url.scheme().to_string()));
    }

    let response = http.get(url).send().await?;
    if !response.status().is_success() {
        return Err(FetchError::Status(response.status()));
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    if !content_type.starts_with("image/") {
        return Err(FetchError::NotAnImage(content_type));
    }

    let bytes = response.bytes().await?.to_vec();
    Ok(FetchedImage { bytes, content_type })
}
