//! ODOT Crash Data System (CDS) クライアント
//!
//! - ポータルのハンドシェイクでセッションを確立し、ASP.NET フォームを自動操作
//! - 道路種別タブごとのレポート / 抽出 (CDS150 ～ CDS510, RRR 等) をダウンロード
//! - CDS501 (事故・車両・当事者の生データ) をデコードして表に分割
//!
//! # 抽出の使用例
//!
//! ```rust,ignore
//! use odot_cds::{Client, ClientConfig, Extract, ExtractRequest, RoadType};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), odot_cds::CdsError> {
//!     let mut client = Client::new(&ClientConfig::from_env())?;
//!
//!     let request = ExtractRequest::new(RoadType::All, Extract::Cds501)
//!         .with_county("Multnomah")
//!         .with_city("Portland");
//!
//!     if let Some(response) = client.extract(&request).await?.into_response() {
//!         response.verify()?;
//!         let tables = odot_cds::cds501::to_tables(&response.records()?);
//!         println!("crashes: {}", tables.crash.len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # tower::Service として使う
//!
//! ```rust,ignore
//! use odot_cds::{ClientConfig, Extract, ExtractRequest, ExtractService, RetryPolicy, RoadType};
//! use tower::Service;
//!
//! let mut service = ExtractService::new(&ClientConfig::default())?
//!     .with_retry(RetryPolicy::default().with_max_attempts(10));
//! let outcome = service
//!     .call(ExtractRequest::new(RoadType::Highway, Extract::Cds150).with_highway("026 - MT. HOOD"))
//!     .await?;
//! ```

pub mod cds501;
pub mod client;
pub mod config;
pub mod error;
pub mod form;
pub mod registry;
pub mod report;
pub mod retry;
pub mod service;
pub mod session;
pub mod traits;
pub mod transport;

#[cfg(test)]
mod testing;

// 主要な型をリエクスポート
pub use client::{
    Client, CodeMap, Extract, ExtractOutcome, ExtractRequest, HighwayType, ReportFormat, RoadType,
};
pub use config::ClientConfig;
pub use error::CdsError;
pub use form::{FieldId, FieldValue, FormField, FormFieldSet};
pub use registry::connect;
pub use report::{ExtractResponse, ReportKind};
pub use retry::RetryPolicy;
pub use service::ExtractService;
pub use session::Session;
pub use traits::Transport;
pub use transport::HttpTransport;
