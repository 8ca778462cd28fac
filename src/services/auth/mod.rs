pub mod claims;
pub mod factory;
pub mod key_resolver;
pub mod signing;
pub mod verifier;

pub use claims::{
    Audience, ClaimSet, ClaimSetFactory, ClaimsError, MapClaims, RegisteredClaims, TimeWindow,
    TypedClaims,
};
pub use factory::build_signing_config;
pub use key_resolver::{KeyError, KeyResolver, StaticKey};
pub use signing::SigningConfig;
pub use verifier::{VerifiedToken, VerifyError, verify};
