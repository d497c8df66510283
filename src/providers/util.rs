use anyhow::Result;

/// HTTP client shared by the quote providers. No retries and no timeout:
/// a slow endpoint holds up the report.
pub fn http_client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .user_agent(concat!("kopilka/", env!("CARGO_PKG_VERSION")))
        .build()?)
}
