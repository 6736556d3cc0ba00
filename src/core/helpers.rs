use std::collections::HashSet;

use ammonia::Builder;
use spin_sdk::http::Response;

pub fn json_response(status: u16, body: &serde_json::Value) -> Response {
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(body.to_string().into_bytes())
        .build()
}

/// Strips all markup, leaving plain text.
///
/// Ammonia serializes its output as HTML, so the entities it writes are
/// decoded again: "Tom & Jerry" stays "Tom & Jerry".
pub fn sanitize_text(text: &str) -> String {
    let cleaned = Builder::default().tags(HashSet::new()).clean(text).to_string();
    html_escape::decode_html_entities(&cleaned).into_owned()
}
