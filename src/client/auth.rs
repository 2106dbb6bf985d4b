//! Request authentication.
//!
//! Three credential kinds are supported: programmatic API keys (HTTP Digest), a pre-issued
//! access token (Bearer) and service accounts (OAuth2 client credentials, Bearer).
use std::{
    future::Future,
    pin::Pin,
    time::{Duration, Instant},
};

use oauth2::{
    AccessToken, AsyncHttpClient, ClientId, ClientSecret, HttpRequest, HttpResponse,
    TokenResponse, TokenUrl, basic::BasicClient,
};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};
use url::Url;

use super::{
    AtlasError,
    digest::{self, DigestChallenge, DigestSession},
};

/// Credentials resolved from a profile.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    None,
    ApiKeys {
        public_key: String,
        private_key: String,
    },
    AccessToken(String),
    ServiceAccount {
        client_id: String,
        client_secret: String,
    },
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::ApiKeys { public_key, .. } => f
                .debug_struct("ApiKeys")
                .field("public_key", public_key)
                .field("private_key", &"[REDACTED]")
                .finish(),
            Self::AccessToken(_) => write!(f, "AccessToken([REDACTED])"),
            Self::ServiceAccount { client_id, .. } => f
                .debug_struct("ServiceAccount")
                .field("client_id", client_id)
                .field("client_secret", &"[REDACTED]")
                .finish(),
        }
    }
}

/// Cached token with expiry tracking.
#[derive(Clone)]
struct CachedToken {
    access_token: AccessToken,
    expires_at: Instant,
}

impl CachedToken {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Default lifetime assumed when the token endpoint does not send `expires_in`.
const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(3600);

/// Signs requests for one set of credentials, caching digest challenges and OAuth tokens.
pub struct Authenticator {
    credentials: Credentials,
    http: reqwest::Client,
    token_url: TokenUrl,
    digest: Mutex<Option<DigestSession>>,
    token_cache: RwLock<Option<CachedToken>>,
}

impl Authenticator {
    pub fn new(credentials: Credentials, http: reqwest::Client, base_url: &Url) -> Result<Self, AtlasError> {
        Ok(Self {
            credentials,
            http,
            token_url: TokenUrl::from_url(base_url.join("api/oauth/token")?),
            digest: Mutex::new(None),
            token_cache: RwLock::new(None),
        })
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials != Credentials::None
    }

    /// `Authorization` header value for a request, if one can be built yet.
    ///
    /// Digest authentication needs a challenge first, so the very first request goes out
    /// unsigned and [`Authenticator::handle_unauthorized`] picks the challenge up.
    pub async fn authorization(&self, method: &str, uri: &str) -> Result<Option<String>, AtlasError> {
        match &self.credentials {
            Credentials::None => Ok(None),
            Credentials::AccessToken(token) => Ok(Some(format!("Bearer {token}"))),
            Credentials::ServiceAccount { .. } => {
                let token = self.service_account_token().await?;
                Ok(Some(format!("Bearer {token}")))
            }
            Credentials::ApiKeys {
                public_key,
                private_key,
            } => {
                let mut digest = self.digest.lock().await;
                Ok(digest.as_mut().map(|session| {
                    session.authorize(public_key, private_key, method, uri, &digest::cnonce())
                }))
            }
        }
    }

    /// React to a 401. Returns `true` when the request should be retried.
    pub async fn handle_unauthorized(&self, www_authenticate: Option<&str>) -> bool {
        match &self.credentials {
            Credentials::ApiKeys { .. } => {
                let Some(challenge) = www_authenticate.and_then(DigestChallenge::parse) else {
                    return false;
                };
                debug!(realm = %challenge.realm, "received digest challenge");
                *self.digest.lock().await = Some(DigestSession::new(challenge));
                true
            }
            Credentials::ServiceAccount { .. } => {
                debug!("access token rejected, refreshing");
                *self.token_cache.write().await = None;
                true
            }
            Credentials::None | Credentials::AccessToken(_) => false,
        }
    }

    async fn service_account_token(&self) -> Result<String, AtlasError> {
        if let Some(token) = self.token_cache.read().await.as_ref()
            && !token.is_expired()
        {
            return Ok(token.access_token.secret().clone());
        }

        let mut cache = self.token_cache.write().await;
        // Another task may have refreshed the token while we waited for the lock.
        if let Some(token) = cache.as_ref()
            && !token.is_expired()
        {
            return Ok(token.access_token.secret().clone());
        }

        let token = self.fetch_token().await?;
        let access_token = token.access_token.secret().clone();
        *cache = Some(token);
        Ok(access_token)
    }

    async fn fetch_token(&self) -> Result<CachedToken, AtlasError> {
        let Credentials::ServiceAccount {
            client_id,
            client_secret,
        } = &self.credentials
        else {
            return Err(AtlasError::MissingCredentials);
        };

        info!(token_url = %self.token_url.url(), client_id = %client_id, "fetching access token");

        let client = BasicClient::new(ClientId::new(client_id.clone()))
            .set_client_secret(ClientSecret::new(client_secret.clone()))
            .set_token_uri(self.token_url.clone());

        let token = client
            .exchange_client_credentials()
            .request_async(&TokenHttpClient(&self.http))
            .await
            .map_err(|err| AtlasError::Token(err.to_string()))?;

        // Refresh at 90% of the lifetime.
        let lifetime = token
            .expires_in()
            .unwrap_or(DEFAULT_TOKEN_LIFETIME)
            .mul_f64(0.9);
        debug!(expires_in_secs = lifetime.as_secs(), "obtained access token");

        Ok(CachedToken {
            access_token: token.access_token().clone(),
            expires_at: Instant::now() + lifetime,
        })
    }
}

#[derive(Debug, thiserror::Error)]
enum TokenHttpError {
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    #[error("invalid token response: {0}")]
    Response(#[from] oauth2::http::Error),
}

/// Sends token requests through the client's shared connection pool.
struct TokenHttpClient<'a>(&'a reqwest::Client);

impl<'c> AsyncHttpClient<'c> for TokenHttpClient<'_> {
    type Error = TokenHttpError;
    type Future = Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + Send + 'c>>;

    fn call(&'c self, request: HttpRequest) -> Self::Future {
        Box::pin(async move {
            let response = self.0.execute(request.try_into()?).await?;

            let mut builder = oauth2::http::Response::builder().status(response.status());
            for (name, value) in response.headers() {
                builder = builder.header(name, value);
            }
            let body = response.bytes().await?.to_vec();

            Ok(builder.body(body)?)
        })
    }
}
