//! RFC 6238 time-based one-time passwords.

use chrono::{DateTime, Utc};
use rand::RngCore;
use rand::rngs::OsRng;
use totp_rs::{Algorithm, Secret, TOTP};
use tracing::debug;

use autohub_core::error::AppError;
use autohub_core::result::AppResult;

/// Raw secret size in bytes.
pub const SECRET_BYTES: usize = 20;
/// Digits per code.
pub const DIGITS: usize = 6;
/// Accepted steps before and after the current one.
pub const SKEW: u8 = 1;
/// Step length in seconds.
pub const STEP_SECONDS: u64 = 30;

/// Generates a fresh base32 secret.
pub fn generate_secret() -> String {
    let mut bytes = vec![0u8; SECRET_BYTES];
    OsRng.fill_bytes(&mut bytes);
    Secret::Raw(bytes).to_encoded().to_string()
}

/// Checks a code against a base32 secret at `now`.
///
/// Malformed secrets and codes are rejected rather than reported.
pub fn verify_code(secret: &str, code: &str, now: DateTime<Utc>) -> bool {
    let code = code.trim();
    if code.len() != DIGITS || !code.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    match build(secret) {
        Ok(totp) => totp.check(code, unix_seconds(now)),
        Err(e) => {
            debug!(error = %e, "Rejected code for unusable secret");
            false
        }
    }
}

/// The code an authenticator would show at `now`.
pub fn current_code(secret: &str, now: DateTime<Utc>) -> AppResult<String> {
    Ok(build(secret)?.generate(unix_seconds(now)))
}

/// `otpauth://` URI for enrolling `account` in an authenticator app.
pub fn provisioning_uri(issuer: &str, account: &str, secret: &str) -> String {
    let issuer = urlencoding::encode(issuer);
    format!(
        "otpauth://totp/{issuer}:{account}?secret={secret}&issuer={issuer}",
        account = urlencoding::encode(account),
    )
}

fn build(secret: &str) -> AppResult<TOTP> {
    let bytes = Secret::Encoded(secret.to_string())
        .to_bytes()
        .map_err(|e| AppError::two_factor(format!("Invalid TOTP secret: {e:?}")))?;
    TOTP::new(
        Algorithm::SHA1,
        DIGITS,
        SKEW,
        STEP_SECONDS,
        bytes,
        None,
        "autohub".to_string(),
    )
    .map_err(|e| AppError::two_factor(format!("TOTP init error: {e}")))
}

fn unix_seconds(now: DateTime<Utc>) -> u64 {
    u64::try_from(now.timestamp()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_secret_is_base32_of_twenty_bytes() {
        let secret = generate_secret();
        assert_eq!(secret.len(), 32);
        assert!(secret.chars().all(|c| c.is_ascii_uppercase() || ('2'..='7').contains(&c)));
        assert_ne!(secret, generate_secret());
    }

    #[test]
    fn test_current_code_verifies_within_one_step() {
        let secret = generate_secret();
        let now = Utc::now();
        let code = current_code(&secret, now).unwrap();

        assert!(verify_code(&secret, &code, now));
        assert!(verify_code(&secret, &code, now + Duration::seconds(30)));
        assert!(!verify_code(&secret, &code, now + Duration::seconds(90)));
    }

    #[test]
    fn test_rfc_6238_vector() {
        // "12345678901234567890" in base32, 8-digit vector truncated to 6.
        let secret = "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ";
        let at = DateTime::from_timestamp(59, 0).unwrap();
        assert_eq!(current_code(secret, at).unwrap(), "287082");
    }

    #[test]
    fn test_malformed_input_is_rejected() {
        let secret = generate_secret();
        assert!(!verify_code(&secret, "12345", Utc::now()));
        assert!(!verify_code(&secret, "abcdef", Utc::now()));
        assert!(!verify_code("not base32!", "123456", Utc::now()));
    }

    #[test]
    fn test_provisioning_uri_encodes_label_and_issuer() {
        let uri = provisioning_uri("Auto Hub", "a+b@example.com", "ABC");
        assert_eq!(
            uri,
            "otpauth://totp/Auto%20Hub:a%2Bb%40example.com?secret=ABC&issuer=Auto%20Hub"
        );
    }
}
