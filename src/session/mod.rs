//! CDS セッション
//!
//! ポータルのハンドシェイクでベースURLを確立し、CDSフォーム (TVC) の
//! 取得・ポストバックを行う。1セッションは逐次的にしか使えない。

mod bootstrap;

use std::time::Duration;

use tracing::debug;
use url::Url;

use crate::config::ClientConfig;
use crate::error::CdsError;
use crate::traits::Transport;
use crate::transport::{
    default_headers, merge_headers, FormData, HeaderOverrides, Method, PortalRequest,
    PortalResponse,
};

pub use bootstrap::{
    content_frame_url, main_frame_url, portal_home_page_url, redirect_to_orig_url,
    top_frame_url, validate_url, CDS_LINK_TEXT,
};

/// ヘッダー上書きを組み立てる
pub(crate) fn overrides(items: &[(&str, Option<&str>)]) -> HeaderOverrides {
    items
        .iter()
        .map(|(k, v)| (k.to_string(), v.map(str::to_string)))
        .collect()
}

pub struct Session<T: Transport> {
    transport: T,
    root: Url,
    host: String,
    user_agent: String,
    timeout: Option<Duration>,
    base_url: Option<String>,
    tvc_url: Option<String>,
    form_opened: bool,
}

impl<T: Transport> Session<T> {
    pub fn new(transport: T, config: &ClientConfig) -> Result<Self, CdsError> {
        let root = Url::parse(&config.root_url)?;
        let host = match (root.host_str(), root.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => {
                return Err(CdsError::Bootstrap(format!(
                    "ルートURLにホストがありません: {}",
                    config.root_url
                )))
            }
        };
        Ok(Self {
            transport,
            root,
            host,
            user_agent: config.user_agent.clone(),
            timeout: config.timeout,
            base_url: None,
            tvc_url: None,
            form_opened: false,
        })
    }

    /// 確立済みのURLでセッションを再開する (ハンドシェイクを省略)
    pub fn resume(mut self, base_url: impl Into<String>, tvc_url: impl Into<String>) -> Self {
        self.base_url = Some(ensure_trailing_slash(base_url.into()));
        self.tvc_url = Some(ensure_trailing_slash(tvc_url.into()));
        self.form_opened = true;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn domain_root_url(&self) -> &str {
        self.root.as_str()
    }

    /// 確立済みならベースURL
    pub fn established_base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// リクエスト送信
    ///
    /// `://` を含むパスはそのまま、それ以外はベースURL (必要ならここで確立) に連結する。
    pub async fn request(
        &mut self,
        path: &str,
        data: FormData,
        method: Method,
        headers: HeaderOverrides,
        timeout: Option<Duration>,
    ) -> Result<PortalResponse, CdsError> {
        let url = if path.contains("://") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url().await?, path)
        };
        self.send(&url, data, method, &headers, timeout.or(self.timeout))
            .await
    }

    /// 絶対URLへ送信 (ベースURLを必要としない)
    async fn send(
        &self,
        url: &str,
        data: FormData,
        method: Method,
        headers: &[(String, Option<String>)],
        timeout: Option<Duration>,
    ) -> Result<PortalResponse, CdsError> {
        let headers = merge_headers(default_headers(&self.host, &self.user_agent), headers);
        let request = PortalRequest::new(method, url)
            .with_data(data)
            .with_headers(headers)
            .with_timeout(timeout);
        self.transport.send(request).await
    }

    async fn get(
        &self,
        url: &str,
        headers: &[(&str, Option<&str>)],
    ) -> Result<PortalResponse, CdsError> {
        self.send(url, FormData::new(), Method::Get, &overrides(headers), self.timeout)
            .await
    }

    /// フォームページ (TVC) の現在のHTML
    ///
    /// 初回はオリジナルURLへのリダイレクト登録を挟む。
    pub async fn fetch_form(&mut self) -> Result<String, CdsError> {
        let tvc_url = self.tvc_url().await?;
        let base_url = self.base_url().await?;
        if !self.form_opened {
            debug!("Opening CDS form at {}", tvc_url);
            self.get_tvc(&tvc_url, &base_url).await?;
            self.get(
                &redirect_to_orig_url(&base_url),
                &[("Referer", Some(tvc_url.as_str())), ("Sec-Fetch-User", None)],
            )
            .await?;
            self.form_opened = true;
        }
        let response = self.get_tvc(&tvc_url, &base_url).await?;
        if response.is_empty() {
            return Err(CdsError::EmptyResponse(format!(
                "フォームを取得できませんでした: {} ({})",
                tvc_url, response.status
            )));
        }
        Ok(response.text().into_owned())
    }

    async fn get_tvc(&self, tvc_url: &str, base_url: &str) -> Result<PortalResponse, CdsError> {
        let referer = content_frame_url(base_url);
        self.get(
            tvc_url,
            &[("Referer", Some(referer.as_str())), ("Sec-Fetch-Mode", Some("cors"))],
        )
        .await
    }

    /// `default.aspx` へフォームをPOSTする
    pub async fn post_form(&mut self, data: FormData) -> Result<PortalResponse, CdsError> {
        let tvc_url = self.tvc_url().await?;
        let url = format!("{}default.aspx", tvc_url);
        self.send(
            &url,
            data,
            Method::Post,
            &overrides(&[
                ("Referer", Some(tvc_url.as_str())),
                ("Sec-Fetch-Mode", Some("nested-navigate")),
            ]),
            self.timeout,
        )
        .await
    }

    /// ポストバックして更新後のフォームHTMLを返す
    pub async fn postback(&mut self, data: FormData) -> Result<String, CdsError> {
        let response = self.post_form(data).await?;
        if response.is_empty() {
            let headers = response
                .headers
                .iter()
                .map(|(k, v)| format!("{}: {}", k, v))
                .collect::<Vec<_>>()
                .join("\n");
            return Err(CdsError::EmptyResponse(format!(
                "フォームを取得できませんでした ({}):\n{}",
                response.status, headers
            )));
        }
        Ok(response.text().into_owned())
    }

    /// レポート送信後のリダイレクト先を取得する
    pub async fn follow_report_redirect(
        &mut self,
        location: &str,
    ) -> Result<PortalResponse, CdsError> {
        let tvc_url = self.tvc_url().await?;
        let url = Url::parse(&tvc_url)?.join(location)?;
        self.get(
            url.as_str(),
            &[
                ("Sec-Fetch-Mode", Some("nested-navigate")),
                ("Referer", Some(tvc_url.as_str())),
            ],
        )
        .await
    }
}

pub(crate) fn ensure_trailing_slash(mut url: String) -> String {
    if !url.ends_with('/') {
        url.push('/');
    }
    url
}
