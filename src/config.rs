use std::time::Duration;

pub const DEFAULT_ROOT_URL: &str = "https://zigzag.odot.state.or.us/";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_1) \
     AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/78.0.3904.108 Safari/537.36";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientConfig {
    /// ポータルのルートURL (末尾 `/`)
    pub root_url: String,
    /// リクエスト/レスポンスのトレースを出力する
    pub echo: bool,
    /// リクエスト単位のタイムアウト (None なら無制限)
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            root_url: DEFAULT_ROOT_URL.to_string(),
            echo: false,
            timeout: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// 環境変数で上書き
    ///
    /// - `ODOT_CDS_ROOT_URL`
    /// - `ODOT_CDS_ECHO` (`1` / `true`)
    /// - `ODOT_CDS_TIMEOUT_SECS`
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(root_url) = std::env::var("ODOT_CDS_ROOT_URL") {
            config = config.with_root_url(root_url);
        }
        if let Ok(echo) = std::env::var("ODOT_CDS_ECHO") {
            config.echo = matches!(echo.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
        if let Some(secs) = std::env::var("ODOT_CDS_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
        {
            config.timeout = Some(Duration::from_secs(secs));
        }
        config
    }

    pub fn with_root_url(mut self, root_url: impl Into<String>) -> Self {
        let mut root_url = root_url.into();
        if !root_url.ends_with('/') {
            root_url.push('/');
        }
        self.root_url = root_url;
        self
    }

    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = ClientConfig::new()
            .with_root_url("http://127.0.0.1:8080")
            .with_echo(true)
            .with_timeout(Duration::from_secs(120));

        assert_eq!(config.root_url, "http://127.0.0.1:8080/");
        assert!(config.echo);
        assert_eq!(config.timeout, Some(Duration::from_secs(120)));
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_default_points_at_zigzag() {
        let config = ClientConfig::default();
        assert_eq!(config.root_url, "https://zigzag.odot.state.or.us/");
        assert!(!config.echo);
        assert!(config.timeout.is_none());
    }
}
