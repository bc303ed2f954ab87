mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use bytes::Bytes;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderValue};
use reqwest::{Method, Request, StatusCode, Url};

/// Posts an encoded JSON document and returns the status with the raw body.
pub async fn post_json<C: HttpClient>(
    client: &C,
    url: &Url,
    json: Vec<u8>,
) -> reqwest::Result<(StatusCode, Bytes)> {
    let mut req = Request::new(Method::POST, url.clone());
    req.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    req.headers_mut()
        .insert(ACCEPT, HeaderValue::from_static("application/json"));
    *req.body_mut() = Some(json.into());

    let resp = client.execute(req).await?;
    let status = resp.status();
    Ok((status, resp.bytes().await?))
}
