//! JSON bodies exchanged with the judge's `/session` endpoint.

use serde::{Deserialize, Serialize};

/// Body of `POST /session`.
///
/// `Debug` omits the password.
#[derive(Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub id: &'a str,
    pub password: &'a str,
}

impl std::fmt::Debug for LoginRequest<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("id", &self.id)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Successful `POST /session` response.
///
/// Only `id` is required to decode; the judge omits the other fields in
/// some responses. The gateway still refuses a login whose `id` or
/// `token` is empty.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    /// Server-confirmed user id.
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// The judge's own session handle. Not used as the local
    /// [`SessionId`](aoj_core::SessionId), which is generated locally.
    #[serde(default, rename = "sessionId")]
    pub session_id: String,
    #[serde(default)]
    pub token: String,
}

impl std::fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginResponse")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_shape() {
        let body = serde_json::to_value(LoginRequest {
            id: "alice",
            password: "pw",
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"id": "alice", "password": "pw"}));
    }

    #[test]
    fn test_login_request_debug_hides_password() {
        let debug = format!("{:?}", LoginRequest { id: "alice", password: "hunter2" });
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_login_response_parses_camel_case_session_id() {
        let resp: LoginResponse = serde_json::from_str(
            r#"{"id":"alice","name":"Alice","sessionId":"abc","token":"t0k"}"#,
        )
        .unwrap();
        assert_eq!(resp.id, "alice");
        assert_eq!(resp.session_id, "abc");
        assert_eq!(resp.token, "t0k");
    }

    #[test]
    fn test_login_response_requires_id() {
        assert!(serde_json::from_str::<LoginResponse>(r#"{"token":"t"}"#).is_err());
    }
}
