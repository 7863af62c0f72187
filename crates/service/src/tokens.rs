#![forbid(unsafe_code)]

//! Bearer tokens: `base64url("{user_id}:{issued_at_secs}:{hex hmac}")`.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use tracker_core::ids::UserId;

type HmacSha256 = Hmac<Sha256>;

pub const DEFAULT_TOKEN_TTL_SECS: u64 = 86_400;
pub const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token signing key rejected")]
    Key,
}

pub trait TokenService: Send + Sync {
    fn issue(&self, user_id: UserId) -> Result<String, TokenError>;

    /// `None` for malformed, tampered, or expired tokens.
    fn verify(&self, token: &str) -> Option<UserId>;
}

#[derive(Clone)]
pub struct HmacTokenService {
    secret: Vec<u8>,
    ttl_secs: u64,
}

impl std::fmt::Debug for HmacTokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HmacTokenService")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

impl HmacTokenService {
    pub fn new(secret: impl Into<Vec<u8>>, ttl_secs: u64) -> Self {
        Self {
            secret: secret.into(),
            ttl_secs,
        }
    }

    /// Fresh secret for this process only; tokens do not survive a restart.
    pub fn random(ttl_secs: u64) -> Self {
        let mut secret = vec![0u8; MIN_SECRET_LEN];
        rand::thread_rng().fill_bytes(&mut secret);
        Self::new(secret, ttl_secs)
    }

    pub fn issue_at(&self, user_id: UserId, issued_at_secs: u64) -> Result<String, TokenError> {
        let payload = format!("{user_id}:{issued_at_secs}");
        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());
        Ok(URL_SAFE_NO_PAD.encode(format!("{payload}:{signature}")))
    }

    pub fn verify_at(&self, token: &str, now_secs: u64) -> Option<UserId> {
        let decoded = URL_SAFE_NO_PAD.decode(token.trim()).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;

        let mut parts = decoded.splitn(3, ':');
        let user_id = parts.next()?.parse::<UserId>().ok()?;
        let issued_at_secs = parts.next()?.parse::<u64>().ok()?;
        let signature = hex::decode(parts.next()?).ok()?;

        let mut mac = self.mac().ok()?;
        mac.update(format!("{user_id}:{issued_at_secs}").as_bytes());
        mac.verify_slice(&signature).ok()?;

        if now_secs.saturating_sub(issued_at_secs) > self.ttl_secs {
            return None;
        }
        Some(user_id)
    }

    fn mac(&self) -> Result<HmacSha256, TokenError> {
        HmacSha256::new_from_slice(&self.secret).map_err(|_| TokenError::Key)
    }
}

impl TokenService for HmacTokenService {
    fn issue(&self, user_id: UserId) -> Result<String, TokenError> {
        self.issue_at(user_id, now_secs())
    }

    fn verify(&self, token: &str) -> Option<UserId> {
        self.verify_at(token, now_secs())
    }
}

fn now_secs() -> u64 {
    let ms = tracker_core::timestamp::now_ms();
    u64::try_from(ms / 1000).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    #[test]
    fn token_round_trips_within_ttl() {
        let tokens = HmacTokenService::new(SECRET, 60);
        let token = tokens.issue_at(42, 1_000).expect("issue should succeed");
        assert_eq!(tokens.verify_at(&token, 1_000), Some(42));
        assert_eq!(tokens.verify_at(&token, 1_060), Some(42));
    }

    #[test]
    fn expired_token_is_rejected() {
        let tokens = HmacTokenService::new(SECRET, 60);
        let token = tokens.issue_at(42, 1_000).expect("issue should succeed");
        assert_eq!(tokens.verify_at(&token, 1_061), None);
    }

    #[test]
    fn tampered_user_id_is_rejected() {
        let tokens = HmacTokenService::new(SECRET, 60);
        let token = tokens.issue_at(42, 1_000).expect("issue should succeed");
        let decoded = String::from_utf8(URL_SAFE_NO_PAD.decode(&token).expect("valid base64"))
            .expect("valid utf-8");
        let forged = URL_SAFE_NO_PAD.encode(decoded.replacen("42:", "43:", 1));
        assert_eq!(tokens.verify_at(&forged, 1_000), None);
    }

    #[test]
    fn token_from_another_secret_is_rejected() {
        let issuer = HmacTokenService::new(SECRET, 60);
        let other = HmacTokenService::new(b"another-secret-another-secret-32".as_slice(), 60);
        let token = issuer.issue_at(7, 1_000).expect("issue should succeed");
        assert_eq!(other.verify_at(&token, 1_000), None);
    }

    #[test]
    fn garbage_is_rejected() {
        let tokens = HmacTokenService::random(60);
        assert_eq!(tokens.verify("not a token"), None);
        assert_eq!(tokens.verify(""), None);
        assert_eq!(tokens.verify(&URL_SAFE_NO_PAD.encode("1:2")), None);
    }

    #[test]
    fn live_token_verifies() {
        let tokens = HmacTokenService::random(DEFAULT_TOKEN_TTL_SECS);
        let token = tokens.issue(9).expect("issue should succeed");
        assert_eq!(tokens.verify(&token), Some(9));
    }
}
