//! Access to the proxy provisioning API.

use crate::config::OutputFormat;
use crate::error::{Result, RotatorError};

use log::debug;
use reqwest::{Client, StatusCode};
use url::Url;

/// Build the request URL for one provider key.
///
/// The key becomes the last path segment of `endpoint`; `userpass` and, for
/// JSON output, `format=json` are appended as query parameters.
pub fn provider_url(
    endpoint: &Url,
    key: &str,
    format: OutputFormat,
    include_credentials: bool,
) -> Result<Url> {
    let mut url = endpoint.clone();
    url.path_segments_mut()
        .map_err(|_| {
            RotatorError::InvalidArgument(format!("endpoint {endpoint} cannot take a path"))
        })?
        .pop_if_empty()
        .push(key);
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("userpass", if include_credentials { "true" } else { "false" });
        if format == OutputFormat::Json {
            query.append_pair("format", "json");
        }
    }
    Ok(url)
}

// reqwest errors carry the request URL, and the URL carries the provider key.
fn transport(err: reqwest::Error) -> RotatorError {
    RotatorError::Transport(err.without_url())
}

/// Split a newline-delimited body into records, dropping blank lines.
pub(crate) fn split_raw_body(body: &str) -> Vec<String> {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Fetch the raw records for one provider URL.
pub(crate) async fn fetch_records(
    client: &Client,
    url: Url,
    format: OutputFormat,
) -> Result<Vec<String>> {
    debug!("Requesting proxy list from {}", url.host_str().unwrap_or_default());
    let response = client.get(url).send().await.map_err(transport)?;
    let status = response.status();
    if status != StatusCode::OK {
        return Err(RotatorError::ProviderRequestFailed { status });
    }

    match format {
        OutputFormat::Json => response.json::<Vec<String>>().await.map_err(transport),
        OutputFormat::Raw => Ok(split_raw_body(&response.text().await.map_err(transport)?)),
    }
}

/// Blocking counterpart of [`fetch_records`].
#[cfg(feature = "blocking")]
pub(crate) fn fetch_records_blocking(
    client: &reqwest::blocking::Client,
    url: Url,
    format: OutputFormat,
) -> Result<Vec<String>> {
    debug!("Requesting proxy list from {}", url.host_str().unwrap_or_default());
    let response = client.get(url).send().map_err(transport)?;
    let status = response.status();
    if status != StatusCode::OK {
        return Err(RotatorError::ProviderRequestFailed { status });
    }

    match format {
        OutputFormat::Json => response.json::<Vec<String>>().map_err(transport),
        OutputFormat::Raw => Ok(split_raw_body(&response.text().map_err(transport)?)),
    }
}
