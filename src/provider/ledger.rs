use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client, StatusCode};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::{
    clock::Clock,
    error::Error,
    provider::signer::{
        NonceSource, RequestSigner, API_KEY_HEADER, API_SIGN_HEADER,
    },
    types::{Credentials, LedgerPage, LedgerResponse},
};

const RATE_LIMIT_MARKERS: [&str; 2] =
    ["Rate limit exceeded", "EGeneral:Too many requests"];

/// Outcome of a single failed page request. Nothing here is retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageError {
    #[error("upstream rate limit exceeded")]
    RateLimited,

    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    Transport(String),
}

/// One page of the rollover ledger starting at `offset`.
#[async_trait]
pub trait LedgerSource: Send + Sync {
    async fn fetch_page(&self, offset: usize) -> Result<LedgerPage, PageError>;
}

/// Ledger listing of a single account on the Kraken REST API.
#[derive(Debug)]
pub struct KrakenLedger {
    client: Client,
    url: Url,
    public_key: String,
    signer: RequestSigner,
    nonces: NonceSource,
    clock: Arc<dyn Clock>,
}

impl KrakenLedger {
    pub fn new(
        client: Client,
        url: Url,
        credentials: &Credentials,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, Error> {
        let signer = RequestSigner::new(&credentials.private_key)?;

        Ok(Self {
            client,
            url,
            public_key: credentials.public_key.to_owned(),
            signer,
            nonces: NonceSource::new(),
            clock,
        })
    }

    pub fn request_body(nonce: &str, offset: usize) -> String {
        format!(
            "nonce={}&ofs={}&type=rollover&without_count=true",
            nonce, offset
        )
    }
}

#[async_trait]
impl LedgerSource for KrakenLedger {
    async fn fetch_page(&self, offset: usize) -> Result<LedgerPage, PageError> {
        let nonce = self.nonces.next(self.clock.as_ref()).to_string();
        let body = Self::request_body(&nonce, offset);
        let signature = self.signer.sign(self.url.path(), &body, &nonce);

        debug!("POST (private) {} ofs={}", self.url.path(), offset);

        let response = self
            .client
            .post(self.url.clone())
            .header(API_KEY_HEADER, &self.public_key)
            .header(API_SIGN_HEADER, signature)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let text = response.text().await.map_err(transport_error)?;

        classify(status, serde_json::from_str::<LedgerResponse>(&text))
    }
}

fn transport_error(error: reqwest::Error) -> PageError {
    if error.is_timeout() {
        return PageError::Transport(String::from("request timed out"));
    }
    PageError::Transport(error.to_string())
}

fn is_rate_limit(error: &str) -> bool {
    RATE_LIMIT_MARKERS.iter().any(|marker| error.contains(marker))
}

/// Turns a raw upstream answer into a page or a tagged failure.
pub fn classify(
    status: StatusCode,
    parsed: Result<LedgerResponse, serde_json::Error>,
) -> Result<LedgerPage, PageError> {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(PageError::RateLimited);
    }

    match parsed {
        Ok(response) if !response.error.is_empty() => {
            if response.error.iter().any(|e| is_rate_limit(e)) {
                return Err(PageError::RateLimited);
            }
            Err(PageError::Upstream(response.error.join(", ")))
        },
        _ if !status.is_success() => {
            Err(PageError::Upstream(format!("HTTP {}", status.as_u16())))
        },
        Ok(response) => Ok(response.into_page()),
        Err(e) => {
            Err(PageError::Upstream(format!("malformed response: {}", e)))
        },
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::{collections::VecDeque, sync::Mutex, time::Duration};

    use actix_web::{
        dev::ServerHandle, web, App, HttpRequest, HttpResponse, HttpServer,
    };
    use url::Url;

    use crate::provider::signer::{API_KEY_HEADER, API_SIGN_HEADER};

    #[derive(Debug, Clone)]
    pub struct Recorded {
        pub api_key: Option<String>,
        pub api_sign: Option<String>,
        pub content_type: Option<String>,
        pub body: String,
    }

    /// Scripted stand-in for the private ledger endpoint.
    #[derive(Debug, Default)]
    pub struct Upstream {
        pub requests: Mutex<Vec<Recorded>>,
        pub responses: Mutex<VecDeque<(u16, String)>>,
        pub delay: Option<Duration>,
    }

    impl Upstream {
        pub fn scripted(responses: Vec<(u16, &str)>) -> web::Data<Upstream> {
            web::Data::new(Upstream {
                responses: Mutex::new(
                    responses
                        .into_iter()
                        .map(|(s, b)| (s, String::from(b)))
                        .collect(),
                ),
                ..Default::default()
            })
        }

        pub fn recorded(&self) -> Vec<Recorded> {
            self.requests.lock().unwrap().clone()
        }
    }

    fn header(req: &HttpRequest, name: &str) -> Option<String> {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
    }

    async fn ledgers(
        upstream: web::Data<Upstream>,
        req: HttpRequest,
        body: String,
    ) -> HttpResponse {
        upstream.requests.lock().unwrap().push(Recorded {
            api_key: header(&req, API_KEY_HEADER),
            api_sign: header(&req, API_SIGN_HEADER),
            content_type: header(&req, "content-type"),
            body,
        });

        if let Some(delay) = upstream.delay {
            tokio::time::sleep(delay).await;
        }

        let (status, body) =
            upstream.responses.lock().unwrap().pop_front().unwrap_or((
                200,
                String::from(r#"{"error":[],"result":{"ledger":{}}}"#),
            ));

        HttpResponse::build(
            actix_web::http::StatusCode::from_u16(status).unwrap(),
        )
        .content_type("application/json")
        .body(body)
    }

    /// Serves `upstream` on an ephemeral port and returns the base url.
    pub async fn start(upstream: web::Data<Upstream>) -> (Url, ServerHandle) {
        let server = HttpServer::new(move || {
            App::new()
                .app_data(upstream.clone())
                .route("/0/private/Ledgers", web::post().to(ledgers))
        })
        .workers(1)
        .disable_signals()
        .bind(("127.0.0.1", 0))
        .unwrap();

        let addr = server.addrs()[0];
        let server = server.run();
        let handle = server.handle();
        tokio::spawn(server);

        let url = Url::parse(&format!("http://{}", addr)).unwrap();
        (url, handle)
    }
}
