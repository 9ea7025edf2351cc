//! リクエスト/レスポンスの型

use std::borrow::Cow;
use std::time::Duration;

use url::form_urlencoded;

/// 送信データ (順序付き)
pub type FormData = Vec<(String, String)>;

/// ヘッダー上書き: `None` はデフォルトヘッダーの抑制
pub type HeaderOverrides = Vec<(String, Option<String>)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PortalRequest {
    pub method: Method,
    /// 絶対URL (クエリ付与前)
    pub url: String,
    pub data: FormData,
    /// マージ済みのヘッダー
    pub headers: Vec<(String, String)>,
    pub timeout: Option<Duration>,
}

impl PortalRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            data: Vec::new(),
            headers: Vec::new(),
            timeout: None,
        }
    }

    pub fn with_data(mut self, data: FormData) -> Self {
        self.data = data;
        self
    }

    pub fn with_headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// 実際に送るURLとボディ
    ///
    /// GET はクエリ文字列に、POST/PUT は urlencoded ボディに載せる。
    pub fn encoded(&self) -> (String, Option<String>) {
        if self.data.is_empty() {
            return (self.url.clone(), None);
        }
        let encoded = encode_form(&self.data);
        match self.method {
            Method::Get => {
                let separator = if self.url.contains('?') { '&' } else { '?' };
                (format!("{}{}{}", self.url, separator, encoded), None)
            }
            Method::Post | Method::Put => (self.url.clone(), Some(encoded)),
        }
    }
}

pub fn encode_form(data: &[(String, String)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(data.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .finish()
}

pub fn decode_form(body: &str) -> FormData {
    form_urlencoded::parse(body.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

/// ブラウザ相当の固定ヘッダープロファイル
pub fn default_headers(host: &str, user_agent: &str) -> Vec<(String, String)> {
    [
        (
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,\
             image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3",
        ),
        ("Accept-Encoding", "gzip, deflate, br"),
        ("Accept-Language", "en-US,en;q=0.9"),
        ("Cache-Control", "no-cache"),
        ("Connection", "keep-alive"),
        ("Host", host),
        ("Pragma", "no-cache"),
        ("Sec-Fetch-Mode", "navigate"),
        ("Sec-Fetch-Site", "same-origin"),
        ("Sec-Fetch-User", "?1"),
        ("Upgrade-Insecure-Requests", "1"),
        ("User-Agent", user_agent),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// デフォルトヘッダーに呼び出し側の上書きを重ねる
pub fn merge_headers(
    defaults: Vec<(String, String)>,
    overrides: &[(String, Option<String>)],
) -> Vec<(String, String)> {
    let lookup = |name: &str| {
        overrides
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.clone())
    };

    let mut merged: Vec<(String, String)> = defaults
        .into_iter()
        .filter_map(|(name, value)| match lookup(&name) {
            Some(Some(replacement)) => Some((name, replacement)),
            Some(None) => None,
            None => Some((name, value)),
        })
        .collect();

    for (name, value) in overrides {
        if let Some(value) = value {
            if find_header(&merged, name).is_none() {
                merged.push((name.clone(), value.clone()));
            }
        }
    }
    merged
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

#[derive(Debug, Clone, Default)]
pub struct PortalResponse {
    pub status: u16,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl PortalResponse {
    pub fn new(status: u16, url: impl Into<String>) -> Self {
        Self {
            status,
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    pub fn location(&self) -> Option<&str> {
        self.header("Location")
    }

    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status)
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// `Content-Disposition: attachment; filename=CDS501.txt` のファイル名
    pub fn attachment_filename(&self) -> Option<String> {
        let disposition = self.header("Content-Disposition")?;
        disposition
            .split(';')
            .map(str::trim)
            .find_map(|part| part.strip_prefix("filename="))
            .map(|name| name.trim_matches('"').to_string())
            .filter(|name| !name.is_empty())
    }
}
