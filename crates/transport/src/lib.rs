//! HTTP transport for the Big Waffle reader.
//!
//! Implements the [`reader::Transport`] port with `reqwest`. The client follows
//! redirects and keeps a cookie store so that credentials set by the service
//! are sent back on later requests to the same origin.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Connection handling, redirects, cookies and timeouts
//! live here. The [`reader`] crate sees only [`reader::Transport`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reader::{BigWaffleReader, ReaderConfig, ReaderError, ReaderOptions, Transport, TransportResponse};
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use tracing::debug;
use url::Url;

/// Builds a reader for `options`, fetching through a default [`ReqwestTransport`].
///
/// # Errors
///
/// Returns [`ReaderError::Configuration`] if the options are invalid or the
/// HTTP client cannot be initialised.
pub fn get_reader(options: ReaderOptions) -> Result<BigWaffleReader, ReaderError> {
    let config = ReaderConfig::try_from(options)?;
    let transport = ReqwestTransport::new()?;
    Ok(BigWaffleReader::new(config, Arc::new(transport)))
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Settings for the underlying HTTP client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Whole-request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    /// Redirects followed before the request fails.
    pub max_redirects: usize,
    /// `User-Agent` sent with every request.
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            max_redirects: 10,
            user_agent: concat!("bigwaffle-reader/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// [`Transport`] backed by a `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport with [`TransportConfig::default`].
    ///
    /// # Errors
    ///
    /// Returns [`ReaderError::Configuration`] if the TLS backend or client
    /// cannot be initialised.
    pub fn new() -> Result<Self, ReaderError> {
        Self::with_config(&TransportConfig::default())
    }

    /// Creates a transport with explicit settings.
    ///
    /// # Errors
    ///
    /// Same conditions as [`ReqwestTransport::new`].
    pub fn with_config(config: &TransportConfig) -> Result<Self, ReaderError> {
        let mut builder = reqwest::Client::builder()
            .redirect(Policy::limited(config.max_redirects))
            .cookie_store(true)
            .user_agent(config.user_agent.as_str());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| ReaderError::Configuration {
            message: format!("could not build HTTP client: {}", error_chain(&e)),
        })?;
        Ok(Self { client })
    }

    /// Wraps an already configured client.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &Url) -> Result<TransportResponse, ReaderError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| transport_error(url, &e))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        if response.url() != url {
            debug!(from = %url, to = %response.url(), "Followed redirect");
        }

        let body = response.bytes().await.map_err(|e| transport_error(url, &e))?;
        Ok(TransportResponse {
            status,
            content_type,
            body,
        })
    }
}

fn transport_error(url: &Url, error: &reqwest::Error) -> ReaderError {
    ReaderError::Transport {
        url: url.to_string(),
        message: error_chain(error),
    }
}

/// `reqwest` errors hide the useful cause (refused, DNS, TLS) in the source chain.
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use reader::{Asset, ParserRegistry, Version};
    use serde_json::json;
    use std::net::SocketAddr;
    use std::sync::Mutex;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn http_response(status: u16, content_type: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status} Canned\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    /// Serves canned responses keyed by request target; unknown targets get 404.
    struct TestServer {
        addr: SocketAddr,
        heads: Arc<Mutex<Vec<String>>>,
    }

    impl TestServer {
        async fn start(routes: Vec<(&'static str, String)>) -> Self {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            let heads = Arc::new(Mutex::new(Vec::new()));
            let seen = heads.clone();
            let routes = Arc::new(routes);
            tokio::spawn(async move {
                while let Ok((mut socket, _)) = listener.accept().await {
                    let routes = routes.clone();
                    let seen = seen.clone();
                    tokio::spawn(async move {
                        let mut head = Vec::new();
                        let mut chunk = [0u8; 1024];
                        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                            match socket.read(&mut chunk).await {
                                Ok(0) | Err(_) => return,
                                Ok(n) => head.extend_from_slice(&chunk[..n]),
                            }
                        }
                        let head = String::from_utf8_lossy(&head).into_owned();
                        let target = head.split_whitespace().nth(1).unwrap_or_default().to_owned();
                        seen.lock().unwrap().push(head);
                        let response = routes
                            .iter()
                            .find(|(path, _)| *path == target)
                            .map(|(_, response)| response.clone())
                            .unwrap_or_else(|| http_response(404, "text/plain", "not found"));
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
            });
            Self { addr, heads }
        }

        fn url(&self) -> String {
            format!("http://{}", self.addr)
        }

        fn targets(&self) -> Vec<String> {
            self.heads
                .lock()
                .unwrap()
                .iter()
                .map(|head| head.split_whitespace().nth(1).unwrap_or_default().to_owned())
                .collect()
        }

        fn heads(&self) -> Vec<String> {
            self.heads.lock().unwrap().clone()
        }
    }

    fn reader_for(server: &TestServer) -> BigWaffleReader {
        get_reader(ReaderOptions {
            dataset: Some("sg".into()),
            service: Some(server.url()),
            version: None,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn read_decodes_rows_and_pins_the_reported_version() {
        init_tracing();
        let body = json!({
            "version": "5",
            "header": ["geo", "population"],
            "rows": [["swe", "10"], ["nor", "5"]]
        })
        .to_string();
        let server = TestServer::start(vec![
            ("/sg?$select$key@=geo", http_response(200, "application/json", &body)),
            ("/sg/5?$select$key@=geo", http_response(200, "application/json", r#"{"header":[],"rows":[]}"#)),
        ])
        .await;
        let reader = reader_for(&server);
        let query = json!({ "select": { "key": ["geo"] } });
        let parsers = ParserRegistry::new().with("population", reader::parsers::parse_int);

        let records = reader.read(&query, &parsers).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].get("geo"), Some(&json!("nor")));
        assert_eq!(records[1].get("population"), Some(&json!(5)));
        assert_eq!(reader.version().as_ref().map(Version::as_str), Some("5"));

        let records = reader.read(&query, &parsers).await.unwrap();
        assert!(records.is_empty());
        assert_eq!(server.targets(), vec!["/sg?$select$key@=geo", "/sg/5?$select$key@=geo"]);
    }

    #[tokio::test]
    async fn json_and_binary_assets() {
        init_tracing();
        let server = TestServer::start(vec![
            ("/sg/assets/world.json", http_response(200, "application/json", r#"{"type":"Topology"}"#)),
            ("/sg/assets/flags/swe.svg", http_response(200, "image/svg+xml", "<svg/>")),
        ])
        .await;
        let reader = reader_for(&server);

        let json = reader.get_asset("assets/world.json").await.unwrap();
        assert_eq!(json, Asset::Json(json!({ "type": "Topology" })));

        let svg = reader.get_asset("flags/swe.svg").await.unwrap();
        assert_eq!(svg.as_bytes().map(|b| b.as_ref()), Some(&b"<svg/>"[..]));
    }

    #[tokio::test]
    async fn error_statuses_become_service_errors() {
        init_tracing();
        let server = TestServer::start(vec![(
            "/sg/assets/secret.png",
            http_response(403, "text/plain", "Forbidden"),
        )])
        .await;
        let reader = reader_for(&server);

        let err = reader.get_asset("secret.png").await.unwrap_err();
        assert_eq!(
            err,
            ReaderError::Service {
                status: 403,
                message: "Forbidden".into()
            }
        );

        let err = reader.get_asset("missing.png").await.unwrap_err();
        assert_eq!(err.status_code(), Some(404));
    }

    #[tokio::test]
    async fn redirects_are_followed() {
        init_tracing();
        let redirect = "HTTP/1.1 302 Found\r\nLocation: /sg/assets/new.json\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_owned();
        let server = TestServer::start(vec![
            ("/sg/assets/old.json", redirect),
            ("/sg/assets/new.json", http_response(200, "application/json", "[1,2]")),
        ])
        .await;
        let reader = reader_for(&server);

        let asset = reader.get_asset("old.json").await.unwrap();
        assert_eq!(asset, Asset::Json(json!([1, 2])));
        assert_eq!(server.targets(), vec!["/sg/assets/old.json", "/sg/assets/new.json"]);
    }

    #[tokio::test]
    async fn cookies_set_by_the_service_are_sent_back() {
        init_tracing();
        let login = "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nSet-Cookie: session=abc; Path=/\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok".to_owned();
        let server = TestServer::start(vec![
            ("/sg/assets/login.txt", login),
            ("/sg/assets/data.json", http_response(200, "application/json", "{}")),
        ])
        .await;
        let reader = reader_for(&server);

        reader.get_asset("login.txt").await.unwrap();
        reader.get_asset("data.json").await.unwrap();
        let heads = server.heads();
        assert!(!heads[0].to_ascii_lowercase().contains("cookie:"));
        assert!(heads[1].to_ascii_lowercase().contains("cookie: session=abc"));
    }

    #[tokio::test]
    async fn wraps_a_caller_configured_client() {
        init_tracing();
        let server = TestServer::start(vec![(
            "/sg/assets/notes.txt",
            http_response(200, "text/plain", "hello"),
        )])
        .await;
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("x-ddf-client", reqwest::header::HeaderValue::from_static("dashboard"));
        let client = reqwest::Client::builder().default_headers(headers).build().unwrap();

        let transport = ReqwestTransport::from_client(client);
        let url = Url::parse(&format!("{}/sg/assets/notes.txt", server.url())).unwrap();
        let response = transport.get(&url).await.unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.content_type.as_deref(), Some("text/plain"));
        assert_eq!(response.text(), "hello");
        assert!(server.heads()[0].to_ascii_lowercase().contains("x-ddf-client: dashboard"));
    }

    #[tokio::test]
    async fn unreachable_service_is_a_transport_error() {
        init_tracing();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = ReqwestTransport::new().unwrap();
        let url = Url::parse(&format!("http://{addr}/sg")).unwrap();
        let err = transport.get(&url).await.unwrap_err();
        match err {
            ReaderError::Transport { url: failed, .. } => assert_eq!(failed, url.to_string()),
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[test]
    fn default_config() {
        let config = TransportConfig::default();
        assert_eq!(config.timeout, None);
        assert_eq!(config.max_redirects, 10);
        assert!(config.user_agent.starts_with("bigwaffle-reader/"));
    }
}
