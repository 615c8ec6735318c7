//! HTTP gateway for the AOJ judge API.

use aoj_core::{DEFAULT_SESSION_DURATION, Error, Result, Session, SessionId};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response, StatusCode};

use crate::{AuthGateway, GatewayConfig, LoginRequest, LoginResponse};

const LOGIN_CONTENT_TYPE: &str = "application/json;charset=UTF-8";

/// [`AuthGateway`] backed by the judge's REST endpoints:
///
/// - `POST /session` to log in
/// - `DELETE /session` to log out
/// - `GET /user/{username}` to check a token
///
/// Holds one pooled [`reqwest::Client`]; clone the gateway rather than
/// building a new one per request.
#[derive(Debug, Clone)]
pub struct AojAuthGateway {
    config: GatewayConfig,
    client: Client,
}

impl AojAuthGateway {
    /// Builds a gateway whose client enforces `config.request_timeout`.
    ///
    /// # Errors
    /// [`ErrorKind::InternalServer`](aoj_core::ErrorKind::InternalServer)
    /// if the TLS backend cannot be initialised.
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| Error::internal("failed to build HTTP client").with_source(e))?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    async fn parse_login(&self, response: Response) -> Result<Session> {
        let body: LoginResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to decode login response");
            Error::internal("failed to decode login response").with_source(e)
        })?;

        if body.id.is_empty() || body.token.is_empty() {
            tracing::error!(
                id_empty = body.id.is_empty(),
                token_empty = body.token.is_empty(),
                "login response is missing credentials"
            );
            return Err(Error::internal("failed to decode login response")
                .with_source(Error::invalid_input("login response has no user id or token")));
        }

        let session = Session::with_duration(
            SessionId::generate()?,
            body.id,
            body.token,
            DEFAULT_SESSION_DURATION,
        );

        tracing::info!(
            username = %session.username(),
            session_id = %session.id().masked(),
            "login successful"
        );

        Ok(session)
    }
}

fn transport_error(e: reqwest::Error) -> Error {
    tracing::error!(error = %e, "HTTP request failed");
    Error::network("failed to reach AOJ").with_source(e)
}

impl AuthGateway for AojAuthGateway {
    async fn login(&self, username: &str, password: &str) -> Result<Session> {
        tracing::info!(%username, "attempting AOJ login");

        let response = self
            .client
            .post(self.config.url("/session"))
            .header(CONTENT_TYPE, LOGIN_CONTENT_TYPE)
            .json(&LoginRequest {
                id: username,
                password,
            })
            .send()
            .await
            .map_err(transport_error)?;

        match response.status() {
            StatusCode::OK => self.parse_login(response).await,
            StatusCode::UNAUTHORIZED => {
                tracing::warn!(%username, "login rejected");
                Err(Error::unauthorized("invalid username or password"))
            }
            StatusCode::BAD_REQUEST => Err(Error::invalid_input("invalid login request format")),
            StatusCode::INTERNAL_SERVER_ERROR => {
                Err(Error::service_unavailable("AOJ server error"))
            }
            status => {
                tracing::warn!(%status, "unexpected login response");
                Err(Error::internal(format!(
                    "unexpected response from AOJ: status {}",
                    status.as_u16()
                )))
            }
        }
    }

    async fn logout(&self, session: &Session) -> Result<()> {
        tracing::info!(
            username = %session.username(),
            session_id = %session.id().masked(),
            "logging out"
        );

        let response = self
            .client
            .delete(self.config.url("/session"))
            .bearer_auth(session.token())
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status != StatusCode::OK && status != StatusCode::NO_CONTENT {
            tracing::warn!(%status, "logout returned non-success status");
        }

        Ok(())
    }

    async fn validate_session(&self, session: &Session) -> Result<bool> {
        if session.is_expired() {
            tracing::debug!(session_id = %session.id().masked(), "session expired locally");
            return Ok(false);
        }

        let path = format!("/user/{}", urlencoding::encode(session.username()));
        let response = self
            .client
            .get(self.config.url(&path))
            .bearer_auth(session.token())
            .send()
            .await
            .map_err(transport_error)?;

        let valid = response.status() == StatusCode::OK;
        tracing::debug!(
            session_id = %session.id().masked(),
            status = %response.status(),
            valid,
            "session validated"
        );
        Ok(valid)
    }
}
