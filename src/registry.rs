//! 設定ごとに共有されるクライアント
//!
//! ハンドシェイクは重いので、同じ設定での接続は同じセッションを使い回す。

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use tracing::debug;

use crate::client::Client;
use crate::config::ClientConfig;
use crate::error::CdsError;
use crate::traits::Transport;
use crate::transport::HttpTransport;

pub type SharedClient<T = HttpTransport> = Arc<tokio::sync::Mutex<Client<T>>>;

pub struct Registry<T: Transport> {
    clients: Mutex<HashMap<ClientConfig, SharedClient<T>>>,
}

impl<T: Transport> Default for Registry<T> {
    fn default() -> Self {
        Self {
            clients: Mutex::new(HashMap::new()),
        }
    }
}

impl<T: Transport> Registry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn clients(&self) -> std::sync::MutexGuard<'_, HashMap<ClientConfig, SharedClient<T>>> {
        self.clients
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// 登録済みならそれを返し、なければ `create` で作って登録する
    pub fn get_or_create(
        &self,
        config: &ClientConfig,
        create: impl FnOnce(&ClientConfig) -> Result<Client<T>, CdsError>,
    ) -> Result<SharedClient<T>, CdsError> {
        let mut clients = self.clients();
        if let Some(client) = clients.get(config) {
            return Ok(Arc::clone(client));
        }
        debug!("Creating CDS client for {}", config.root_url);
        let client = Arc::new(tokio::sync::Mutex::new(create(config)?));
        clients.insert(config.clone(), Arc::clone(&client));
        Ok(client)
    }

    /// セッションを捨てる (次回の接続でハンドシェイクからやり直す)
    pub fn invalidate(&self, config: &ClientConfig) -> bool {
        self.clients().remove(config).is_some()
    }

    pub fn clear(&self) {
        self.clients().clear();
    }

    pub fn len(&self) -> usize {
        self.clients().len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients().is_empty()
    }
}

fn global() -> &'static Registry<HttpTransport> {
    static REGISTRY: OnceLock<Registry<HttpTransport>> = OnceLock::new();
    REGISTRY.get_or_init(Registry::new)
}

/// 設定に対応する共有クライアント
pub fn connect(config: &ClientConfig) -> Result<SharedClient, CdsError> {
    global().get_or_create(config, Client::new)
}

pub fn invalidate(config: &ClientConfig) -> bool {
    global().invalidate(config)
}

/// 登録済みのセッションをすべて捨てる
pub fn clear() {
    global().clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedTransport;

    fn scripted(config: &ClientConfig) -> Result<Client<ScriptedTransport>, CdsError> {
        Client::with_transport(ScriptedTransport::new(), config)
    }

    #[test]
    fn test_same_config_shares_client() {
        let registry = Registry::new();
        let config = ClientConfig::new().with_root_url("https://cds.test/");
        let a = registry.get_or_create(&config, scripted).unwrap();
        let b = registry.get_or_create(&config, scripted).unwrap();
        assert!(Arc::ptr_eq(&a, &b));

        let other = config.clone().with_echo(true);
        let c = registry.get_or_create(&other, scripted).unwrap();
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_invalidate_forces_new_client() {
        let registry = Registry::new();
        let config = ClientConfig::new().with_root_url("https://cds.test/");
        let a = registry.get_or_create(&config, scripted).unwrap();
        assert!(registry.invalidate(&config));
        assert!(!registry.invalidate(&config));
        let b = registry.get_or_create(&config, scripted).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));

        registry.clear();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_failed_creation_is_not_registered() {
        let registry: Registry<ScriptedTransport> = Registry::new();
        let config = ClientConfig::new();
        let result = registry.get_or_create(&config, |_| Err(CdsError::Bootstrap("down".into())));
        assert!(result.is_err());
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_global_connect() {
        let config = ClientConfig::new().with_root_url("https://connect.cds.test/");
        let a = connect(&config).unwrap();
        let b = connect(&config).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.lock().await.session().domain_root_url(), "https://connect.cds.test/");
        assert!(invalidate(&config));
    }
}
