use std::sync::{Arc, MutexGuard};

use async_trait::async_trait;
use cookie_store::CookieStore;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use reqwest_cookie_store::CookieStoreMutex;
use tracing::{debug, info};
use url::Url;

use crate::config::ClientConfig;
use crate::error::CdsError;
use crate::traits::Transport;

use super::cookie::Cookie;
use super::echo;
use super::types::{PortalRequest, PortalResponse};

/// reqwest ベースのトランスポート
///
/// 3xx は追わずにそのまま返す。Cookie はストアを共有して reqwest に
/// 送受信させ、ハンドシェイクではストアからパス付きCookieを参照する。
pub struct HttpTransport {
    client: reqwest::Client,
    cookie_store: Arc<CookieStoreMutex>,
    host: String,
    echo: bool,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, CdsError> {
        let cookie_store = Arc::new(CookieStoreMutex::new(CookieStore::default()));
        let client = reqwest::Client::builder()
            .cookie_provider(Arc::clone(&cookie_store))
            .redirect(Policy::none())
            .build()?;
        let host = Url::parse(&config.root_url)?
            .host_str()
            .unwrap_or_default()
            .to_string();
        Ok(Self {
            client,
            cookie_store,
            host,
            echo: config.echo,
        })
    }

    fn store(&self) -> MutexGuard<'_, CookieStore> {
        self.cookie_store
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: PortalRequest) -> Result<PortalResponse, CdsError> {
        let (url, body) = request.encoded();
        let parsed = Url::parse(&url)?;

        let mut builder = self.client.request(request.method.into(), parsed);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = body {
            builder = builder
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(body);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        if self.echo {
            info!(target: "odot_cds::echo", "{}", echo::render_request(&request));
        }
        debug!("{} {}", request.method.as_str(), url);

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let final_url = response.url().to_string();

        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| {
                (
                    k.as_str().to_string(),
                    String::from_utf8_lossy(v.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.bytes().await?.to_vec();

        let response = PortalResponse {
            status,
            url: final_url,
            headers,
            body,
        };
        if self.echo {
            info!(target: "odot_cds::echo", "{}", echo::render_response(&response));
        }
        debug!("{} -> {} ({} bytes)", url, status, response.body.len());

        Ok(response)
    }

    fn cookies(&self) -> Vec<Cookie> {
        self.store()
            .iter_unexpired()
            .map(|cookie| Cookie::from_stored(cookie, &self.host))
            .collect()
    }
}
