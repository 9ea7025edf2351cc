//! トランスポート層
//!
//! 固定ヘッダープロファイル、Cookie管理、リダイレクト非追従のHTTP送受信

mod cookie;
pub mod echo;
mod http;
mod types;

pub use cookie::Cookie;
pub use http::HttpTransport;
pub use types::{
    decode_form, default_headers, encode_form, merge_headers, FormData, HeaderOverrides, Method,
    PortalRequest, PortalResponse,
};
