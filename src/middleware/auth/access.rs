//! access token（JWT）検証 → RequestState を extensions に入れる
//!
//! 流れ:
//! - credential 抽出 (Authorization: Bearer / form / query)
//!   - form body を読み切れない → 400
//!   - 見つからない → 400
//! - 署名検証 + claims の decode / validate (services::auth::verifier)
//!   - 失敗 → 401 (理由はログのみ)
//! - 検証済み token / claims を RequestState に格納して next へ

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Extensions, Request},
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::RequestState;
use crate::error::AuthRejection;
use crate::middleware::auth::credential;
use crate::services::auth::{ClaimSet, SigningConfig, VerifiedToken, claims, verify};

/// Gate every route of `router` behind token verification.
///
/// 例：
/// ```ignore
/// let v1 = api::v1::routes();
/// let v1 = middleware::auth::access::apply(v1, signing.clone());
/// app = app.nest("/api/v1", v1);
/// ```
pub fn apply<S>(router: Router<S>, signing: Arc<SigningConfig>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    // route_layer: 存在しない path は認証より先に 404 になる
    router.route_layer(middleware::from_fn_with_state(signing, access_middleware))
}

pub async fn access_middleware(
    State(signing): State<Arc<SigningConfig>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AuthRejection> {
    let (mut req, token) =
        credential::extract(req, signing.form_key(), signing.form_body_limit()).await?;

    if token.is_empty() {
        tracing::debug!(uri = %req.uri(), "no credential presented");
        return Err(AuthRejection::MissingCredential);
    }

    let (verified, claims) = match verify(&token, &signing) {
        Ok(verified) => verified,
        Err(err) => {
            tracing::warn!(
                error = %err,
                uri = %req.uri(),
                "access token verification failed"
            );
            return Err(AuthRejection::Unauthorized);
        }
    };

    tracing::debug!(alg = ?verified.header().alg, "access token verified");

    // middleware → extractor への受け渡し
    propagate(req.extensions_mut(), &signing, verified, claims);

    Ok(next.run(req).await)
}

/// Store the verified token and claims under the configured keys.
///
/// Values already in the request's `RequestState` under other keys are kept.
pub fn propagate(
    extensions: &mut Extensions,
    signing: &SigningConfig,
    token: VerifiedToken,
    claim_set: Arc<dyn ClaimSet>,
) {
    let mut state = extensions.remove::<RequestState>().unwrap_or_default();

    state.insert(signing.token_key(), token);
    state.insert_arc(signing.claims_key(), claims::into_any(claim_set));

    extensions.insert(state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::{MapClaims, StaticKey};
    use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
    use serde_json::json;

    fn signing() -> SigningConfig {
        SigningConfig::new(Algorithm::HS256, StaticKey::hmac(Algorithm::HS256, b"k"))
            .with_token_key("t")
            .with_claims_key("c")
    }

    #[test]
    fn propagate_writes_both_keys_and_keeps_existing_values() {
        let signing = signing();
        let token = encode(
            &Header::new(Algorithm::HS256),
            &json!({ "name": "foo" }),
            &EncodingKey::from_secret(b"k"),
        )
        .unwrap();
        let (verified, claim_set) = verify(&token, &signing).unwrap();

        let mut extensions = Extensions::new();
        let mut existing = RequestState::new();
        existing.insert("request.user-agent", "curl".to_string());
        extensions.insert(existing);

        propagate(&mut extensions, &signing, verified, claim_set);

        let state = extensions.get::<RequestState>().expect("state inserted");
        assert_eq!(state.len(), 3);
        assert_eq!(
            state.get::<VerifiedToken>("t").map(VerifiedToken::raw),
            Some(token.as_str())
        );
        assert_eq!(
            state.get::<MapClaims>("c").and_then(|c| c.get_str("name")),
            Some("foo")
        );
        assert!(state.contains("request.user-agent"));
    }
}
