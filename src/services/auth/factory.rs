/// Factory: build `SigningConfig` from application `Config`.
use jsonwebtoken::Algorithm;

use crate::config::{Config, JwtKey};
use crate::services::auth::{KeyError, SigningConfig, StaticKey};

pub fn build_signing_config(config: &Config) -> Result<SigningConfig, KeyError> {
    let algorithm = config.jwt_algorithm;

    let resolver = match &config.jwt_key {
        JwtKey::Secret(secret) => StaticKey::hmac(algorithm, secret.as_bytes()),
        JwtKey::PublicKeyPem(pem) => match algorithm {
            Algorithm::EdDSA => StaticKey::from_ed_pem(pem.as_bytes())?,
            Algorithm::ES256 | Algorithm::ES384 => {
                StaticKey::from_ec_pem(algorithm, pem.as_bytes())?
            }
            _ => StaticKey::from_rsa_pem(algorithm, pem.as_bytes())?,
        },
    };

    tracing::debug!(?algorithm, "verification key loaded");

    Ok(SigningConfig::new(algorithm, resolver)
        .with_form_key(config.jwt_form_key.clone())
        .with_token_key(config.jwt_token_key.clone())
        .with_claims_key(config.jwt_claims_key.clone())
        .with_leeway(config.jwt_leeway_seconds)
        .with_form_body_limit(config.jwt_form_body_limit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_from_config() {
        let config = Config::from_lookup(|key| match key {
            "JWT_SECRET" => Some("secret-key".to_string()),
            "JWT_FORM_KEY" => Some("token".to_string()),
            "JWT_LEEWAY_SECONDS" => Some("15".to_string()),
            _ => None,
        })
        .unwrap();

        let signing = build_signing_config(&config).expect("hmac key");
        assert_eq!(signing.algorithm(), Algorithm::HS256);
        assert_eq!(signing.form_key(), "token");
        assert_eq!(signing.token_key(), "json.web.token");
        assert_eq!(signing.leeway_seconds(), 15);
    }

    #[test]
    fn broken_public_key_is_reported() {
        let config = Config::from_lookup(|key| match key {
            "JWT_ALGORITHM" => Some("EdDSA".to_string()),
            "JWT_PUBLIC_KEY_PEM" => Some("garbage".to_string()),
            _ => None,
        })
        .unwrap();

        assert!(matches!(
            build_signing_config(&config),
            Err(KeyError::InvalidKey(_))
        ));
    }
}
