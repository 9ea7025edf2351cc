//! 再試行ポリシー
//!
//! CDS はまれに空のレスポンスやエラーページを返すため、抽出単位で再試行する。

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::warn;

use crate::error::CdsError;

const MAX_ATTEMPTS: u32 = 3;
const INITIAL_BACKOFF_MS: u64 = 1000;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// 初回を含む試行回数
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub multiplier: f64,
    /// 再試行対象のエラー判定
    pub retry_if: fn(&CdsError) -> bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            initial_backoff: Duration::from_millis(INITIAL_BACKOFF_MS),
            multiplier: 2.0,
            retry_if: CdsError::is_retryable,
        }
    }
}

impl RetryPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// 再試行しない
    pub fn none() -> Self {
        Self::default().with_max_attempts(1)
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn with_initial_backoff(mut self, initial_backoff: Duration) -> Self {
        self.initial_backoff = initial_backoff;
        self
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    pub fn with_retry_if(mut self, retry_if: fn(&CdsError) -> bool) -> Self {
        self.retry_if = retry_if;
        self
    }

    /// `attempt` 回目 (0始まり) の失敗後の待ち時間
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.max(1.0).powi(attempt as i32);
        self.initial_backoff.mul_f64(factor)
    }

    /// `attempt` 回目 (0始まり) の失敗を再試行するか
    pub fn should_retry(&self, error: &CdsError, attempt: u32) -> bool {
        (self.retry_if)(error) && attempt + 1 < self.max_attempts
    }

    /// 再試行可能なエラーの間、`op` を繰り返す
    pub async fn run<F, Fut, R>(&self, mut op: F) -> Result<R, CdsError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<R, CdsError>>,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if self.should_retry(&e, attempt) => {
                    let backoff = self.backoff(attempt);
                    warn!(
                        "Attempt {} failed, retrying in {}ms: {}",
                        attempt + 1,
                        backoff.as_millis(),
                        e
                    );
                    sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
