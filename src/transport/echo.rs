//! 送受信内容を人が読めるトレースにする (送信データは変更しない)

use super::types::{PortalRequest, PortalResponse};

const INDENT: &str = "\n        ";

pub fn render_request(request: &PortalRequest) -> String {
    let (url, body) = request.encoded();
    let mut trace = format!(
        "Request:\n\n    {}: {}\n\n    Headers:\n\n        {}",
        request.method.as_str(),
        url,
        join_headers(&request.headers)
    );
    if let Some(body) = body {
        trace.push_str("\n\n    Body:\n\n        ");
        trace.push_str(&body.split('\n').collect::<Vec<_>>().join(INDENT));
    }
    trace.push('\n');
    trace
}

pub fn render_response(response: &PortalResponse) -> String {
    let mut trace = format!(
        "Response:\n\n    URL: {}\n\n    Status: {}\n\n    Headers:\n\n        {}",
        response.url,
        response.status,
        join_headers(&response.headers)
    );
    if !response.body.is_empty() {
        trace.push_str("\n\n    Body:\n\n        ");
        trace.push_str(&response.text().split('\n').collect::<Vec<_>>().join(INDENT));
    }
    trace.push('\n');
    trace
}

fn join_headers(headers: &[(String, String)]) -> String {
    headers
        .iter()
        .map(|(k, v)| format!("{}: {}", k, v))
        .collect::<Vec<_>>()
        .join(INDENT)
}
