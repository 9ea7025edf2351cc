//! ポータルのハンドシェイク
//!
//! ルートへのアクセスで発行される署名付きCookieのパスがベースURLになる。
//! その後ブラウザと同じ順序・Refererでページを巡回し、サーバー側のセッションを
//! 有効化する。順序を変えるとポータルに拒否される。

use scraper::Html;
use tracing::{debug, info};
use url::Url;

use super::{ensure_trailing_slash, Session};
use crate::error::CdsError;
use crate::form::{element_text, parse_selector};
use crate::traits::Transport;
use crate::transport::PortalResponse;

/// コンテンツフレーム内のCDSへのリンク
pub const CDS_LINK_TEXT: &str = "Crash Data System";

pub fn portal_home_page_url(base_url: &str) -> String {
    format!("{}SecurezigzagPortalHomePage/", base_url)
}

pub fn top_frame_url(base_url: &str) -> String {
    format!("{}TopFrame.aspx", portal_home_page_url(base_url))
}

pub fn main_frame_url(base_url: &str) -> String {
    format!("{}MainFrame.aspx", portal_home_page_url(base_url))
}

pub fn content_frame_url(base_url: &str) -> String {
    format!("{}ContentFrame.aspx", portal_home_page_url(base_url))
}

pub fn validate_url(base_url: &str) -> String {
    format!("{}InternalSite/Validate.asp", base_url)
}

pub fn redirect_to_orig_url(base_url: &str) -> String {
    format!(
        "{}InternalSite/RedirectToOrigURL.asp?site_name=zigzag&secure=1",
        base_url
    )
}

/// フレーム遷移のヘッダー
fn frame_headers(referer: &str) -> [(&'static str, Option<&str>); 3] {
    [
        ("Referer", Some(referer)),
        ("Sec-Fetch-User", None),
        ("Sec-Fetch-Mode", Some("nested-navigate")),
    ]
}

fn required_location(response: &PortalResponse) -> Result<&str, CdsError> {
    response.location().ok_or_else(|| CdsError::MissingHeader {
        url: response.url.clone(),
        header: "Location".to_string(),
    })
}

impl<T: Transport> Session<T> {
    /// セッションのベースURL (未確立ならハンドシェイクを行う)
    pub async fn base_url(&mut self) -> Result<String, CdsError> {
        if let Some(base_url) = &self.base_url {
            return Ok(base_url.clone());
        }
        let base_url = self.bootstrap().await?;
        self.base_url = Some(base_url.clone());
        Ok(base_url)
    }

    async fn bootstrap(&self) -> Result<String, CdsError> {
        let root = self.root.to_string();
        info!("CDS セッション確立開始: {}", root);

        let response = self.get(&root, &[]).await?;
        if !response.is_redirect() {
            return Err(CdsError::UnexpectedStatus {
                url: root,
                status: response.status,
            });
        }
        let base_url = self.derive_base_url()?;
        debug!("Derived base URL: {}", base_url);

        self.init_params(&base_url, required_location(&response)?)
            .await?;

        info!("CDS セッション確立完了: {}", base_url);
        Ok(base_url)
    }

    /// ルート以外のパスを持つ最初のCookieからベースURLを得る
    fn derive_base_url(&self) -> Result<String, CdsError> {
        let cookie = self
            .transport
            .cookies()
            .into_iter()
            .find(|cookie| cookie.path != "/")
            .ok_or_else(|| {
                CdsError::Bootstrap("パス付きのセッションCookieが発行されませんでした".into())
            })?;
        let base_url = self.root.join(&cookie.path)?;
        Ok(ensure_trailing_slash(base_url.to_string()))
    }

    async fn init_params(&self, base_url: &str, location: &str) -> Result<(), CdsError> {
        let init_params_url = self.root.join(location)?.to_string();
        let response = self.get(&init_params_url, &[]).await?;

        let install_and_detect_url = self.root.join(required_location(&response)?)?.to_string();
        self.get(&install_and_detect_url, &[]).await?;

        self.white_list(&install_and_detect_url).await?;

        let home_url = portal_home_page_url(base_url);
        let validate = validate_url(base_url);
        let redirect = redirect_to_orig_url(base_url);

        self.get_portal_home_page(base_url, &install_and_detect_url)
            .await?;
        self.get(&validate, &[("Referer", Some(install_and_detect_url.as_str()))])
            .await?;
        self.get(
            &redirect,
            &[("Referer", Some(validate.as_str())), ("Sec-Fetch-User", None)],
        )
        .await?;
        self.get_portal_home_page(base_url, &validate).await?;
        self.get(
            &redirect,
            &[("Referer", Some(home_url.as_str())), ("Sec-Fetch-User", None)],
        )
        .await?;
        self.get_portal_home_page(base_url, &home_url).await?;
        Ok(())
    }

    /// 参照元URLをホワイトリストに登録する
    async fn white_list(&self, referer: &str) -> Result<(), CdsError> {
        let url = format!("{}InternalSite/?WhlST", self.root);
        self.get(
            &url,
            &[
                ("Sec-Fetch-Mode", Some("cors")),
                ("Sec-Fetch-User", None),
                ("Referer", Some(referer)),
            ],
        )
        .await?;
        Ok(())
    }

    async fn get_portal_home_page(&self, base_url: &str, referer: &str) -> Result<(), CdsError> {
        self.get(
            &portal_home_page_url(base_url),
            &[("Referer", Some(referer)), ("Sec-Fetch-User", None)],
        )
        .await?;
        Ok(())
    }

    /// CDSフォーム (TVC) のURL
    ///
    /// ポータルのフレームを巡回し、コンテンツフレームのリンクから取得する。
    pub async fn tvc_url(&mut self) -> Result<String, CdsError> {
        if let Some(tvc_url) = &self.tvc_url {
            return Ok(tvc_url.clone());
        }
        let base_url = self.base_url().await?;
        let home_url = portal_home_page_url(&base_url);
        let main_frame = main_frame_url(&base_url);
        self.get(&top_frame_url(&base_url), &frame_headers(home_url.as_str()))
            .await?;
        self.get(&main_frame, &frame_headers(home_url.as_str()))
            .await?;
        self.white_list(&main_frame).await?;

        let content_url = content_frame_url(&base_url);
        let content_frame = self
            .get(&content_url, &frame_headers(main_frame.as_str()))
            .await?;

        let href = find_link(&content_frame.text(), CDS_LINK_TEXT)?
            .ok_or_else(|| CdsError::ElementNotFound(format!("a[text()={:?}]", CDS_LINK_TEXT)))?;
        let tvc_url = ensure_trailing_slash(Url::parse(&content_url)?.join(&href)?.to_string());
        info!("CDS フォームURL取得: {}", tvc_url);

        self.tvc_url = Some(tvc_url.clone());
        Ok(tvc_url)
    }
}

/// テキストが一致するアンカーの href
fn find_link(html: &str, text: &str) -> Result<Option<String>, CdsError> {
    let document = Html::parse_document(html);
    let selector = parse_selector("a[href]")?;
    Ok(document
        .select(&selector)
        .find(|anchor| element_text(*anchor) == text)
        .and_then(|anchor| anchor.value().attr("href"))
        .map(str::to_string))
}
