//! Bearer-token (JWT) authentication gate for axum.
//!
//! A request passes through three steps:
//! - credential extraction: `Authorization: Bearer <token>`, else the form / query
//!   field configured on [`SigningConfig`] (`_jwt` by default);
//! - verification: signature check with a key from a [`KeyResolver`], then
//!   decoding (and validating) the claims through an optional [`ClaimSetFactory`];
//! - propagation: the verified token and claims land in the request's
//!   [`RequestState`] under the configured keys.
//!
//! A request without a credential is answered with `400`, one that fails
//! verification with `401`; handlers behind the gate read the identity with
//! the [`Authenticated`] extractor.
//!
//! ```ignore
//! let signing = Arc::new(
//!     SigningConfig::new(Algorithm::HS256, StaticKey::hmac(Algorithm::HS256, b"secret-key"))
//!         .with_claims::<UserClaims>(),
//! );
//! let router = middleware::auth::apply(Router::new().route("/posts", post(add_post)), signing);
//! ```

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;

pub use api::v1::extractors::{Authenticated, RequestState};
pub use error::{AppError, AuthRejection};
pub use services::auth::{
    ClaimSet, ClaimSetFactory, ClaimsError, KeyError, KeyResolver, MapClaims, RegisteredClaims,
    SigningConfig, StaticKey, TimeWindow, TypedClaims, VerifiedToken, VerifyError,
};
