use std::sync::Arc;
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use tower::Service;
use tracing::info;

use crate::client::{ExtractOutcome, ExtractRequest};
use crate::config::ClientConfig;
use crate::error::CdsError;
use crate::registry::{self, SharedClient};
use crate::retry::RetryPolicy;
use crate::traits::Transport;
use crate::transport::HttpTransport;

/// tower::Serviceを実装した抽出サービス
///
/// 取得したレポートは内容を検証し、空やエラーページなら再試行する。
pub struct ExtractService<T: Transport = HttpTransport> {
    client: SharedClient<T>,
    retry: RetryPolicy,
}

impl<T: Transport> Clone for ExtractService<T> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            retry: self.retry,
        }
    }
}

impl ExtractService<HttpTransport> {
    /// 設定ごとの共有クライアントを使う
    pub fn new(config: &ClientConfig) -> Result<Self, CdsError> {
        Ok(Self::with_client(registry::connect(config)?))
    }
}

impl<T: Transport> ExtractService<T> {
    pub fn with_client(client: SharedClient<T>) -> Self {
        Self {
            client,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn client(&self) -> &SharedClient<T> {
        &self.client
    }
}

impl<T: Transport + 'static> Service<ExtractRequest> for ExtractService<T> {
    type Response = ExtractOutcome;
    type Error = CdsError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: ExtractRequest) -> Self::Future {
        info!("抽出リクエスト受信: {} ({})", req.extract, req.road_type);
        let client = Arc::clone(&self.client);
        let retry = self.retry;

        Box::pin(async move {
            let outcome = retry
                .run(|| {
                    let client = Arc::clone(&client);
                    let req = req.clone();
                    async move {
                        let mut client = client.lock().await;
                        match client.extract(&req).await? {
                            ExtractOutcome::Ready(response) => {
                                response.verify()?;
                                Ok(ExtractOutcome::Ready(response))
                            }
                            unavailable => Ok(unavailable),
                        }
                    }
                })
                .await?;

            if let ExtractOutcome::Ready(response) = &outcome {
                info!(
                    "抽出完了: {} ({}), size={}bytes",
                    response.extract,
                    response.filename(),
                    response.bytes().len()
                );
            }
            Ok(outcome)
        })
    }
}
