use async_trait::async_trait;

use crate::error::CdsError;
use crate::transport::{Cookie, PortalRequest, PortalResponse};

#[async_trait]
pub trait Transport: Send + Sync {
    /// リクエスト送信 (3xx もそのまま返す)
    async fn send(&self, request: PortalRequest) -> Result<PortalResponse, CdsError>;

    /// 現在保持しているCookie
    fn cookies(&self) -> Vec<Cookie>;
}
