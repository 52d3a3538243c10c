//! Resolution of bearer credentials to a caller identity.

use std::collections::HashMap;
use std::future::{ready, Ready};

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use taskdeck_shared::UserId;

use crate::error::TaskError;
use crate::AppState;

/// Maps an opaque bearer token to the user it authenticates.
pub trait IdentityResolver: Send + Sync {
    fn resolve(&self, token: &str) -> Option<UserId>;
}

/// Fixed token table, filled once at startup.
#[derive(Debug, Default)]
pub struct StaticTokens {
    tokens: HashMap<String, UserId>,
}

impl StaticTokens {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, token: impl Into<String>, user: UserId) {
        self.tokens.insert(token.into(), user);
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl IdentityResolver for StaticTokens {
    fn resolve(&self, token: &str) -> Option<UserId> {
        self.tokens.get(token).cloned()
    }
}

/// The authenticated user behind a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller(UserId);

impl Caller {
    pub fn id(&self) -> &UserId {
        &self.0
    }
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

impl FromRequest for Caller {
    type Error = TaskError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let caller = req
            .app_data::<web::Data<AppState>>()
            .zip(bearer_token(req))
            .and_then(|(state, token)| state.identities.resolve(token))
            .map(Caller)
            .ok_or(TaskError::Unauthorized);
        ready(caller)
    }
}
