//! セッションのCookie

use serde::{Deserialize, Serialize};

/// 保持中のCookie 1件 (name/value/domain/path)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
}

impl Cookie {
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        domain: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: domain.into(),
            path: path.into(),
        }
    }

    /// Cookieストアの1件から。Domain/Path 属性がなければ発行元ホストと "/"
    pub fn from_stored(stored: &cookie_store::Cookie<'_>, default_domain: &str) -> Self {
        Self::new(
            stored.name(),
            stored.value(),
            stored.domain().unwrap_or(default_domain),
            stored.path().unwrap_or("/"),
        )
    }
}
