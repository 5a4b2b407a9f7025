use lazy_static::lazy_static;
use rand::Rng;
use regex::Regex;
use sqlx::PgPool;
use tracing::warn;

use crate::auth::dto::SignupRequest;
use crate::error::{store_error, ApiError};
use crate::users::repo::User;

const MAX_ID_ATTEMPTS: u32 = 10;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn is_valid_mobile(mobile: &str) -> bool {
    mobile.len() == 10 && mobile.chars().all(|c| c.is_ascii_digit())
}

/// Emails are stored trimmed and lowercased; every write path goes through
/// this.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Login accepts a user id, email, or mobile in one field. When the value is
/// an email it gets the same normalization as the stored column, so the
/// lookup agrees with what signup wrote; ids and mobiles pass through
/// verbatim.
pub fn normalize_login_identifier(raw: &str) -> String {
    let trimmed = raw.trim();
    if is_valid_email(trimmed) {
        trimmed.to_lowercase()
    } else {
        trimmed.to_string()
    }
}

pub(crate) fn validate_full_name(full_name: &str) -> Result<(), ApiError> {
    if full_name.chars().count() < 3 {
        return Err(ApiError::Validation(
            "Full name must be at least 3 characters long".into(),
        ));
    }
    Ok(())
}

pub(crate) fn validate_email(email: &str) -> Result<(), ApiError> {
    if !is_valid_email(email) {
        return Err(ApiError::Validation(
            "Please enter a valid email address".into(),
        ));
    }
    Ok(())
}

pub(crate) fn validate_mobile(mobile: &str) -> Result<(), ApiError> {
    if !is_valid_mobile(mobile) {
        return Err(ApiError::Validation("Mobile number must be 10 digits".into()));
    }
    Ok(())
}

/// Field checks in a fixed order: name, email, mobile, password. The first
/// failure wins.
pub fn validate_signup(req: &SignupRequest) -> Result<(), ApiError> {
    validate_full_name(&req.full_name)?;
    validate_email(&req.email)?;
    validate_mobile(&req.mobile)?;
    if req.password.chars().count() < 6 {
        return Err(ApiError::Validation(
            "Password must be at least 6 characters long".into(),
        ));
    }
    Ok(())
}

/// Normalize a submitted referral code. An empty or whitespace-only value
/// counts as "no referral".
pub fn normalize_referral_code(raw: Option<&str>) -> Option<String> {
    let code = raw?.trim().to_uppercase();
    if code.is_empty() {
        None
    } else {
        Some(code)
    }
}

fn generate_user_id() -> String {
    let n = rand::thread_rng().gen_range(10000..=99999);
    format!("EP{n}")
}

/// Draw candidate ids until one is free, up to [`MAX_ID_ATTEMPTS`]. The check
/// and the later insert are not isolated from concurrent signups; a losing
/// race surfaces as a store-level conflict at insert time.
pub async fn allocate_user_id(db: &PgPool) -> Result<String, ApiError> {
    for _ in 0..MAX_ID_ATTEMPTS {
        let candidate = generate_user_id();
        if !User::user_id_exists(db, &candidate)
            .await
            .map_err(store_error)?
        {
            return Ok(candidate);
        }
        warn!(candidate = %candidate, "user id collision, retrying");
    }
    Err(ApiError::IdSpaceExhausted)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> SignupRequest {
        SignupRequest {
            full_name: "Jane Doe".into(),
            email: "jane@x.com".into(),
            mobile: "9876543210".into(),
            password: "secret1".into(),
            referral_id: None,
        }
    }

    #[test]
    fn generated_ids_match_pattern() {
        let re = Regex::new(r"^EP[0-9]{5}$").unwrap();
        for _ in 0..100 {
            let id = generate_user_id();
            assert!(re.is_match(&id), "bad id {id}");
        }
    }

    #[test]
    fn email_shape() {
        assert!(is_valid_email("jane@x.com"));
        assert!(is_valid_email("a.b+c@sub.domain.org"));
        assert!(!is_valid_email("jane@x"));
        assert!(!is_valid_email("janex.com"));
        assert!(!is_valid_email("jane @x.com"));
    }

    #[test]
    fn mobile_shape() {
        assert!(is_valid_mobile("9876543210"));
        assert!(!is_valid_mobile("987654321"));
        assert!(!is_valid_mobile("98765432100"));
        assert!(!is_valid_mobile("98765A3210"));
    }

    #[test]
    fn valid_request_passes() {
        assert!(validate_signup(&valid_request()).is_ok());
    }

    #[test]
    fn validation_order_name_first() {
        let mut req = valid_request();
        req.full_name = "Jo".into();
        req.email = "broken".into();
        let err = validate_signup(&req).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Full name must be at least 3 characters long"
        );
    }

    #[test]
    fn validation_order_email_before_mobile() {
        let mut req = valid_request();
        req.email = "broken".into();
        req.mobile = "123".into();
        let err = validate_signup(&req).unwrap_err();
        assert_eq!(err.to_string(), "Please enter a valid email address");
    }

    #[test]
    fn short_password_rejected() {
        let mut req = valid_request();
        req.password = "short".into();
        let err = validate_signup(&req).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Password must be at least 6 characters long"
        );
    }

    #[test]
    fn name_length_counts_characters_not_bytes() {
        assert!(validate_full_name("Ana").is_ok());
        assert!(validate_full_name("安娜娜").is_ok());
        // Two characters, six bytes.
        assert!(validate_full_name("李明").is_err());
    }

    #[test]
    fn password_length_counts_characters_not_bytes() {
        let mut req = valid_request();
        req.password = "paßwör".into();
        assert!(validate_signup(&req).is_ok());

        // Five characters, but more than six bytes.
        req.password = "ßßßßß".into();
        assert!(validate_signup(&req).is_err());
    }

    // Signup lowercases the stored email; a login with the exact casing the
    // user registered with must resolve to the same value.
    #[test]
    fn login_identifier_normalization_matches_signup() {
        let stored = normalize_email(" Jane@X.com ");
        assert_eq!(normalize_login_identifier(" Jane@X.com "), stored);
        assert_eq!(normalize_login_identifier("jane@x.com"), stored);
    }

    #[test]
    fn login_identifier_leaves_ids_and_mobiles_verbatim() {
        assert_eq!(normalize_login_identifier(" EP12345 "), "EP12345");
        assert_eq!(normalize_login_identifier("9876543210"), "9876543210");
    }

    #[test]
    fn referral_code_is_trimmed_and_uppercased() {
        assert_eq!(
            normalize_referral_code(Some("  ep12345 ")),
            Some("EP12345".into())
        );
        assert_eq!(normalize_referral_code(Some("   ")), None);
        assert_eq!(normalize_referral_code(Some("")), None);
        assert_eq!(normalize_referral_code(None), None);
    }
}
