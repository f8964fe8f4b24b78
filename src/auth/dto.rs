use serde::{Deserialize, Serialize};

/// Uniform response envelope: `{"status":"OK"}` on success,
/// `{"status":"Error","error":"..."}` on failure.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse {
    pub fn ok() -> Self {
        Self {
            status: "OK".into(),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "Error".into(),
            error: Some(message.into()),
        }
    }
}

/// Login response: the envelope plus the freshly minted session token.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    #[serde(flatten)]
    pub response: ApiResponse,
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub full_name: String,
    pub password: String,
    pub phone: String,
    pub email: String,
    pub user_role: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub contact_info: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub contact_info: String,
}

#[derive(Debug, Deserialize)]
pub struct RestorePasswordRequest {
    pub link: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub new_full_name: String,
    pub new_phone: String,
    pub new_email: String,
    pub user_id: i64,
}

/// What the authorization gate peeks out of a protected request body to
/// learn the target user; delete-user and restore-user bodies carry
/// exactly this shape.
#[derive(Debug, Deserialize)]
pub struct TargetUserRequest {
    #[serde(default)]
    pub user_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_envelope_shape() {
        let json = serde_json::to_string(&ApiResponse::ok()).unwrap();
        assert_eq!(json, r#"{"status":"OK"}"#);
    }

    #[test]
    fn error_envelope_shape() {
        let json = serde_json::to_string(&ApiResponse::error("user not found")).unwrap();
        assert_eq!(json, r#"{"status":"Error","error":"user not found"}"#);
    }

    #[test]
    fn token_response_flattens_envelope() {
        let resp = TokenResponse {
            response: ApiResponse::ok(),
            token: "abc.def.ghi".into(),
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert_eq!(json, r#"{"status":"OK","token":"abc.def.ghi"}"#);
    }

    #[test]
    fn target_user_id_defaults_to_zero() {
        let req: TargetUserRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.user_id, 0);
    }
}
