use std::net::IpAddr;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum UrlCheckError {
    #[error("Invalid URL: {0}")]
    Invalid(#[from] url::ParseError),
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    #[error("URL has no host")]
    MissingHost,
    #[error("Plain HTTP is only allowed for local or private hosts")]
    Insecure,
}

/// True for `localhost`, loopback, private, link-local and unique-local hosts.
pub fn host_is_local(url: &Url) -> bool {
    let Some(host) = url.host_str() else {
        return false;
    };
    if host.eq_ignore_ascii_case("localhost") {
        return true;
    }

    let bare = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);

    match bare.parse::<IpAddr>() {
        Ok(IpAddr::V4(v4)) => v4.is_loopback() || v4.is_private() || v4.is_link_local(),
        Ok(IpAddr::V6(v6)) => {
            let first = v6.segments()[0];
            v6.is_loopback() || (first & 0xfe00) == 0xfc00 || (first & 0xffc0) == 0xfe80
        }
        Err(_) => false,
    }
}

/// Validate the backend origin the session token will be sent to.
///
/// HTTPS is required, except for local and private-network hosts where
/// self-hosted instances commonly run on plain HTTP. The returned URL's path
/// always ends with `/` so relative endpoint paths join under it.
pub fn validate_base_url(raw: &str) -> Result<Url, UrlCheckError> {
    let mut url = Url::parse(raw.trim())?;

    match url.scheme() {
        "https" => {}
        "http" if host_is_local(&url) => {
            tracing::warn!(base_url = %url, "Using plain HTTP backend (local host only)");
        }
        "http" => return Err(UrlCheckError::Insecure),
        scheme => return Err(UrlCheckError::UnsupportedScheme(scheme.to_owned())),
    }

    if url.host_str().is_none() {
        return Err(UrlCheckError::MissingHost);
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);

    Ok(url)
}

/// Validate a link before handing it to the system browser.
pub fn validate_link(raw: &str) -> Result<Url, UrlCheckError> {
    let url = Url::parse(raw)?;
    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlCheckError::UnsupportedScheme(scheme.to_owned())),
    }
    if url.host_str().is_none() {
        return Err(UrlCheckError::MissingHost);
    }
    Ok(url)
}
