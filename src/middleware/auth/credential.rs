/*
 * Responsibility
 * - リクエストから credential (JWT 文字列) を取り出す
 *   1. `Authorization: Bearer <token>`
 *   2. form / query の `form_key` フィールド (body が先、query が後)
 *   - body を読み切れない (上限超過など) 場合は復元できないので拒否する
 * - 見つからなければ空文字 (エラーにはしない。判断は middleware 側)
 */
use axum::{
    body::Body,
    http::{HeaderMap, Method, Request, header},
};

use crate::error::AuthRejection;

const BEARER_PREFIX: &str = "Bearer ";

/// Token from `Authorization: Bearer <token>`.
///
/// The scheme is matched literally (case-sensitive) and must be followed by
/// at least one character; anything else is ignored, not an error.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let auth = headers.get(header::AUTHORIZATION)?.to_str().ok()?;

    if auth.len() > BEARER_PREFIX.len() && auth.starts_with(BEARER_PREFIX) {
        Some(&auth[BEARER_PREFIX.len()..])
    } else {
        None
    }
}

/// First value of `key` in an `application/x-www-form-urlencoded` payload.
pub fn form_value(encoded: &[u8], key: &str) -> Option<String> {
    url::form_urlencoded::parse(encoded)
        .find(|(name, _)| name == key)
        .map(|(_, value)| value.into_owned())
}

fn has_form_body(req: &Request<Body>) -> bool {
    if ![Method::POST, Method::PUT, Method::PATCH].contains(req.method()) {
        return false;
    }

    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|mime| {
            mime.trim()
                .eq_ignore_ascii_case("application/x-www-form-urlencoded")
        })
}

/// Locate the credential for `req`.
///
/// Reading a form body consumes it, so the request is handed back with the
/// buffered bytes put back in place for downstream handlers. A body larger
/// than `body_limit` (or one that fails to read) cannot be restored, so the
/// request is rejected instead of continuing with an empty body.
pub async fn extract(
    req: Request<Body>,
    form_key: &str,
    body_limit: usize,
) -> Result<(Request<Body>, String), AuthRejection> {
    if let Some(token) = bearer_token(req.headers()) {
        let token = token.to_string();
        return Ok((req, token));
    }

    let mut req = req;
    let mut token = None;

    if has_form_body(&req) {
        let (parts, body) = req.into_parts();
        let bytes = axum::body::to_bytes(body, body_limit).await.map_err(|err| {
            tracing::debug!(error = %err, limit = body_limit, "failed to buffer form body");
            AuthRejection::UnreadableBody
        })?;

        token = form_value(&bytes, form_key);
        req = Request::from_parts(parts, Body::from(bytes));
    }

    if token.is_none() {
        token = req
            .uri()
            .query()
            .and_then(|query| form_value(query.as_bytes(), form_key));
    }

    Ok((req, token.unwrap_or_default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const KEY: &str = "_jwt";
    const LIMIT: usize = 1024;

    fn form_post(uri: &str, body: &'static str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    #[test]
    fn bearer_header_is_parsed() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));
    }

    #[test]
    fn malformed_headers_are_ignored() {
        for value in ["Bearer ", "Bearer", "bearer abc", "Basic dXNlcjpwYXNz", "Token abc"] {
            let mut headers = HeaderMap::new();
            headers.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
            assert_eq!(bearer_token(&headers), None, "header {value:?}");
        }
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn form_value_decodes_and_picks_first() {
        assert_eq!(
            form_value(b"title=hi&_jwt=a%2Bb&_jwt=second", KEY),
            Some("a+b".to_string())
        );
        assert_eq!(form_value(b"title=hi", KEY), None);
        assert_eq!(form_value(b"", KEY), None);
    }

    #[tokio::test]
    async fn query_string_is_used_without_header() {
        let req = Request::builder()
            .uri("/posts?_jwt=from-query")
            .body(Body::empty())
            .unwrap();

        let (_, token) = extract(req, KEY, LIMIT).await.unwrap();
        assert_eq!(token, "from-query");
    }

    #[tokio::test]
    async fn header_wins_over_form_and_query() {
        let mut req = form_post("/posts?_jwt=from-query", "_jwt=from-form");
        req.headers_mut()
            .insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));

        let (_, token) = extract(req, KEY, LIMIT).await.unwrap();
        assert_eq!(token, "from-header");
    }

    #[tokio::test]
    async fn form_body_wins_over_query_and_is_restored() {
        let req = form_post("/posts?_jwt=from-query", "title=hello&_jwt=from-form");

        let (req, token) = extract(req, KEY, LIMIT).await.unwrap();
        assert_eq!(token, "from-form");

        let body = axum::body::to_bytes(req.into_body(), LIMIT).await.unwrap();
        assert_eq!(&body[..], b"title=hello&_jwt=from-form");
    }

    #[tokio::test]
    async fn non_form_bodies_are_left_alone() {
        let req = Request::builder()
            .method(Method::POST)
            .uri("/posts")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("_jwt=nope"))
            .unwrap();

        let (req, token) = extract(req, KEY, LIMIT).await.unwrap();
        assert_eq!(token, "");

        let body = axum::body::to_bytes(req.into_body(), LIMIT).await.unwrap();
        assert_eq!(&body[..], b"_jwt=nope");
    }

    #[tokio::test]
    async fn get_requests_do_not_read_the_body() {
        let req = Request::builder()
            .method(Method::GET)
            .uri("/posts")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("_jwt=from-body"))
            .unwrap();

        let (_, token) = extract(req, KEY, LIMIT).await.unwrap();
        assert_eq!(token, "");
    }

    #[tokio::test]
    async fn oversized_form_body_is_rejected() {
        let req = form_post("/posts", "_jwt=this-body-is-longer-than-the-limit");

        let err = extract(req, KEY, 8).await.expect_err("body over the limit");
        assert_eq!(err, AuthRejection::UnreadableBody);
    }

    #[tokio::test]
    async fn oversized_form_body_is_rejected_even_with_a_query_token() {
        let req = form_post("/posts?_jwt=from-query", "title=a-long-post-body-over-the-limit");

        let err = extract(req, KEY, 8).await.expect_err("body cannot be restored");
        assert_eq!(err, AuthRejection::UnreadableBody);
    }

    #[tokio::test]
    async fn custom_form_key_is_honoured() {
        let req = form_post("/posts", "token=abc&_jwt=other");

        let (_, token) = extract(req, "token", LIMIT).await.unwrap();
        assert_eq!(token, "abc");
    }
}
