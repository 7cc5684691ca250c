//! Title resolution for links saved without a title
//!
//! Pages are fetched through an ordered list of [`HtmlFetcher`] strategies and
//! the first non-empty `<title>` wins. When every strategy fails the title is
//! derived from the URL's hostname, so resolution itself never fails.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use scraper::{Html, Selector};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;

/// Title used when nothing better can be derived
pub const UNTITLED: &str = "Untitled";

/// Public relay that wraps a page's HTML in a JSON envelope
pub const ALL_ORIGINS_ENDPOINT: &str = "https://api.allorigins.win/get";

/// Prefix-style CORS proxy
pub const CORS_PROXY_PREFIX: &str = "https://cors-anywhere.herokuapp.com/";

const USER_AGENT: &str = "Mozilla/5.0 (compatible; Clipbox/1.0)";

/// Errors from a single fetch strategy
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {0}")]
    Status(StatusCode),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid relay response: {0}")]
    InvalidResponse(#[from] serde_json::Error),

    #[error("Relay returned no page contents")]
    EmptyContents,

    #[error("Page has no usable <title>")]
    NoTitle,

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// Every strategy failed; never leaves this module
    #[error("All title strategies failed")]
    Exhausted,
}

/// A way of retrieving the HTML of a page
#[async_trait]
pub trait HtmlFetcher: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Fetch the page at `url` and return its HTML
    async fn fetch_html(&self, url: &str) -> Result<String, FetchError>;
}

/// Fetches the page itself
pub struct DirectFetcher {
    client: Client,
}

impl DirectFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HtmlFetcher for DirectFetcher {
    fn name(&self) -> &str {
        "direct"
    }

    async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        get_text(&self.client, url).await
    }
}

/// Fetches through the AllOrigins relay (`/get?url=...` returning JSON)
pub struct AllOriginsRelay {
    client: Client,
    endpoint: String,
}

#[derive(Deserialize)]
struct AllOriginsResponse {
    contents: Option<String>,
}

impl AllOriginsRelay {
    pub fn new(client: Client) -> Self {
        Self::with_endpoint(client, ALL_ORIGINS_ENDPOINT)
    }

    pub fn with_endpoint(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl HtmlFetcher for AllOriginsRelay {
    fn name(&self) -> &str {
        "allorigins"
    }

    async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        let request_url = Url::parse_with_params(&self.endpoint, &[("url", url)])
            .map_err(|e| FetchError::InvalidUrl(e.to_string()))?;

        let body = get_text(&self.client, request_url.as_str()).await?;
        let envelope: AllOriginsResponse = serde_json::from_str(&body)?;

        envelope
            .contents
            .filter(|c| !c.is_empty())
            .ok_or(FetchError::EmptyContents)
    }
}

/// Fetches through a proxy that takes the target URL as a path suffix
pub struct CorsProxyRelay {
    client: Client,
    prefix: String,
}

impl CorsProxyRelay {
    pub fn new(client: Client) -> Self {
        Self::with_prefix(client, CORS_PROXY_PREFIX)
    }

    pub fn with_prefix(client: Client, prefix: impl Into<String>) -> Self {
        Self {
            client,
            prefix: prefix.into(),
        }
    }
}

#[async_trait]
impl HtmlFetcher for CorsProxyRelay {
    fn name(&self) -> &str {
        "cors-proxy"
    }

    async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        get_text(&self.client, &format!("{}{}", self.prefix, url)).await
    }
}

async fn get_text(client: &Client, url: &str) -> Result<String, FetchError> {
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        return Err(FetchError::Status(response.status()));
    }

    Ok(response.text().await?)
}

/// Build the HTTP client shared by the network strategies
pub fn build_client(timeout: Duration) -> Result<Client, FetchError> {
    Ok(Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()?)
}

/// Ordered chain of fetch strategies with a local fallback
pub struct TitleResolver {
    fetchers: Vec<Box<dyn HtmlFetcher>>,
    timeout: Duration,
}

impl TitleResolver {
    /// Create a resolver that tries `fetchers` in order
    pub fn new(fetchers: Vec<Box<dyn HtmlFetcher>>, timeout: Duration) -> Self {
        Self { fetchers, timeout }
    }

    /// A resolver that never touches the network
    pub fn offline() -> Self {
        Self::new(Vec::new(), Duration::ZERO)
    }

    /// Build the default strategy chain from configuration
    ///
    /// Order: direct fetch (when enabled), AllOrigins, CORS proxy.
    pub fn from_config(config: &Config) -> Self {
        if config.offline {
            return Self::offline();
        }

        let timeout = config.fetch_timeout();
        let client = match build_client(timeout) {
            Ok(client) => client,
            Err(e) => {
                warn!("Could not build HTTP client, titles will come from URLs: {}", e);
                return Self::offline();
            }
        };

        let mut fetchers: Vec<Box<dyn HtmlFetcher>> = Vec::new();
        if config.direct_fetch {
            fetchers.push(Box::new(DirectFetcher::new(client.clone())));
        }
        fetchers.push(Box::new(AllOriginsRelay::new(client.clone())));
        fetchers.push(Box::new(CorsProxyRelay::new(client)));

        Self::new(fetchers, timeout)
    }

    /// Names of the configured strategies, in priority order
    pub fn strategy_names(&self) -> Vec<&str> {
        self.fetchers.iter().map(|f| f.name()).collect()
    }

    /// Resolve a display title for `url`
    pub async fn resolve(&self, url: &str) -> String {
        match self.resolve_remote(url).await {
            Ok(title) => title,
            Err(e) => {
                let title = fallback_title(url);
                debug!("{} for {}, using fallback title {:?}", e, url, title);
                title
            }
        }
    }

    async fn resolve_remote(&self, url: &str) -> Result<String, FetchError> {
        for fetcher in &self.fetchers {
            match self.try_fetcher(fetcher.as_ref(), url).await {
                Ok(title) => {
                    debug!("Title for {} fetched via {}: {:?}", url, fetcher.name(), title);
                    return Ok(title);
                }
                Err(e) => debug!("Strategy {} failed for {}: {}", fetcher.name(), url, e),
            }
        }
        Err(FetchError::Exhausted)
    }

    async fn try_fetcher(&self, fetcher: &dyn HtmlFetcher, url: &str) -> Result<String, FetchError> {
        let html = tokio::time::timeout(self.timeout, fetcher.fetch_html(url))
            .await
            .map_err(|_| FetchError::Timeout(self.timeout))??;

        extract_title(&html).ok_or(FetchError::NoTitle)
    }
}

/// Extract the trimmed text of the first `<title>` element
pub fn extract_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("title").ok()?;
    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Derive a title from the URL alone
///
/// Hostname without a leading `www.`, first letter capitalized.
/// Unparseable or host-less URLs give [`UNTITLED`].
pub fn fallback_title(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return UNTITLED.to_string();
    };

    match parsed.host_str() {
        Some(host) if !host.is_empty() => {
            let host = host.strip_prefix("www.").unwrap_or(host);
            capitalize_first(host)
        }
        _ => UNTITLED.to_string(),
    }
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => UNTITLED.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Fetcher returning a canned result and counting calls
    struct FakeFetcher {
        name: &'static str,
        html: Option<&'static str>,
        calls: Arc<AtomicUsize>,
    }

    impl FakeFetcher {
        fn boxed(
            name: &'static str,
            html: Option<&'static str>,
            calls: &Arc<AtomicUsize>,
        ) -> Box<dyn HtmlFetcher> {
            Box::new(Self {
                name,
                html,
                calls: Arc::clone(calls),
            })
        }
    }

    #[async_trait]
    impl HtmlFetcher for FakeFetcher {
        fn name(&self) -> &str {
            self.name
        }

        async fn fetch_html(&self, _url: &str) -> Result<String, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.html
                .map(str::to_string)
                .ok_or(FetchError::Status(StatusCode::BAD_GATEWAY))
        }
    }

    struct SlowFetcher;

    #[async_trait]
    impl HtmlFetcher for SlowFetcher {
        fn name(&self) -> &str {
            "slow"
        }

        async fn fetch_html(&self, _url: &str) -> Result<String, FetchError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok("<title>Too late</title>".to_string())
        }
    }

    /// Client that ignores any system proxy, for loopback servers
    fn local_client() -> Client {
        Client::builder()
            .timeout(Duration::from_secs(5))
            .no_proxy()
            .build()
            .unwrap()
    }

    /// Serve one canned HTTP response on a loopback port
    async fn serve_once(status: &'static str, body: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        });

        format!("http://{}/", addr)
    }

    #[test]
    fn test_extract_title() {
        let html = "<html><head><title>  Test Page \n</title></head><body></body></html>";
        assert_eq!(extract_title(html), Some("Test Page".to_string()));
    }

    #[test]
    fn test_extract_title_missing_or_blank() {
        assert_eq!(extract_title("<html><head></head></html>"), None);
        assert_eq!(extract_title("<html><head><title>   </title></head></html>"), None);
        assert_eq!(extract_title("not html at all"), None);
    }

    #[test]
    fn test_fallback_title_from_hostname() {
        assert_eq!(fallback_title("https://www.Example.com/page"), "Example.com");
        assert_eq!(fallback_title("https://github.com/rust-lang"), "Github.com");
        assert_eq!(fallback_title("http://docs.rs"), "Docs.rs");
    }

    #[test]
    fn test_fallback_title_only_strips_leading_www() {
        assert_eq!(fallback_title("https://blog.www.io"), "Blog.www.io");
    }

    #[test]
    fn test_fallback_title_unparseable() {
        assert_eq!(fallback_title("not a url"), UNTITLED);
        assert_eq!(fallback_title(""), UNTITLED);
        assert_eq!(fallback_title("mailto:someone@example.com"), UNTITLED);
    }

    #[tokio::test]
    async fn test_first_successful_strategy_wins() {
        let calls = Arc::new(AtomicUsize::new(0));
        let resolver = TitleResolver::new(
            vec![
                FakeFetcher::boxed("broken", None, &calls),
                FakeFetcher::boxed("untitled", Some("<html></html>"), &calls),
                FakeFetcher::boxed("good", Some("<title>Found It</title>"), &calls),
                FakeFetcher::boxed("never", Some("<title>Unused</title>"), &calls),
            ],
            Duration::from_secs(1),
        );

        assert_eq!(resolver.resolve("https://example.com").await, "Found It");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_all_strategies_fail_falls_back() {
        let calls = Arc::new(AtomicUsize::new(0));
        let resolver = TitleResolver::new(
            vec![
                FakeFetcher::boxed("a", None, &calls),
                FakeFetcher::boxed("b", None, &calls),
            ],
            Duration::from_secs(1),
        );

        assert_eq!(resolver.resolve("https://www.Example.com/page").await, "Example.com");
        assert_eq!(resolver.resolve("::::").await, UNTITLED);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_slow_strategy_times_out() {
        let calls = Arc::new(AtomicUsize::new(0));
        let resolver = TitleResolver::new(
            vec![
                Box::new(SlowFetcher) as Box<dyn HtmlFetcher>,
                FakeFetcher::boxed("backup", Some("<title>Backup</title>"), &calls),
            ],
            Duration::from_millis(50),
        );

        assert_eq!(resolver.resolve("https://example.com").await, "Backup");
    }

    #[tokio::test]
    async fn test_offline_resolver() {
        let resolver = TitleResolver::offline();
        assert!(resolver.strategy_names().is_empty());
        assert_eq!(resolver.resolve("https://www.rust-lang.org").await, "Rust-lang.org");
    }

    #[test]
    fn test_from_config_strategy_order() {
        let config = Config::default();
        let resolver = TitleResolver::from_config(&config);
        assert_eq!(
            resolver.strategy_names(),
            vec!["direct", "allorigins", "cors-proxy"]
        );

        let config = Config {
            direct_fetch: false,
            ..Config::default()
        };
        let resolver = TitleResolver::from_config(&config);
        assert_eq!(resolver.strategy_names(), vec!["allorigins", "cors-proxy"]);

        let config = Config {
            offline: true,
            ..Config::default()
        };
        assert!(TitleResolver::from_config(&config).strategy_names().is_empty());
    }

    #[tokio::test]
    async fn test_direct_fetcher_over_http() {
        let base = serve_once(
            "200 OK",
            "<html><head><title>Local Page</title></head></html>".to_string(),
        )
        .await;
        let fetcher = DirectFetcher::new(local_client());

        let html = fetcher.fetch_html(&base).await.unwrap();
        assert_eq!(extract_title(&html), Some("Local Page".to_string()));
    }

    #[tokio::test]
    async fn test_direct_fetcher_rejects_error_status() {
        let base = serve_once("404 Not Found", "<title>Missing</title>".to_string()).await;
        let fetcher = DirectFetcher::new(local_client());

        let err = fetcher.fetch_html(&base).await.unwrap_err();
        assert!(matches!(err, FetchError::Status(StatusCode::NOT_FOUND)));
    }

    #[tokio::test]
    async fn test_all_origins_relay_unwraps_contents() {
        let body = serde_json::json!({
            "contents": "<html><head><title>Relayed</title></head></html>"
        })
        .to_string();
        let base = serve_once("200 OK", body).await;
        let relay = AllOriginsRelay::with_endpoint(local_client(), base);

        let html = relay.fetch_html("https://example.com").await.unwrap();
        assert_eq!(extract_title(&html), Some("Relayed".to_string()));
    }

    #[tokio::test]
    async fn test_all_origins_relay_empty_contents() {
        let base = serve_once("200 OK", r#"{"contents": null}"#.to_string()).await;
        let relay = AllOriginsRelay::with_endpoint(local_client(), base);

        let err = relay.fetch_html("https://example.com").await.unwrap_err();
        assert!(matches!(err, FetchError::EmptyContents));
    }

    #[tokio::test]
    async fn test_cors_proxy_relay_appends_url() {
        let base = serve_once("200 OK", "<title>Proxied</title>".to_string()).await;
        let relay = CorsProxyRelay::with_prefix(local_client(), base);

        let html = relay.fetch_html("https://example.com").await.unwrap();
        assert_eq!(extract_title(&html), Some("Proxied".to_string()));
    }
}
