use serde::{Deserialize, Serialize};

use crate::users::repo::User;

/// Request body for signup.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub full_name: String,
    pub email: String,
    pub mobile: String,
    pub password: String,
    /// Optional referral code; trimmed and upper-cased before lookup.
    pub referral_id: Option<String>,
}

/// Request body for login. `user_id` accepts a user id, email, or mobile.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub user_id: String,
    pub password: String,
}

/// Response returned after signup or login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signup_request_accepts_camel_case_fields() {
        let req: SignupRequest = serde_json::from_str(
            r#"{"fullName":"Jane Doe","email":"jane@x.com","mobile":"9876543210",
                "password":"secret1","referralId":"ep10001"}"#,
        )
        .unwrap();
        assert_eq!(req.full_name, "Jane Doe");
        assert_eq!(req.referral_id.as_deref(), Some("ep10001"));
    }

    #[test]
    fn signup_request_referral_is_optional() {
        let req: SignupRequest = serde_json::from_str(
            r#"{"fullName":"Jane Doe","email":"jane@x.com","mobile":"9876543210","password":"secret1"}"#,
        )
        .unwrap();
        assert!(req.referral_id.is_none());
    }
}
