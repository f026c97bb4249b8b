use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::{info, warn};
use uuid::Uuid;

use warbler_crypto::token;
use warbler_types::User;

use crate::{ApiResult, AppState, found};

/// Session key holding the logged-in user's id.
pub const CURR_USER_KEY: &str = "curr_user";

/// Session key holding the token every rendered form must echo back.
pub const CSRF_KEY: &str = "csrf_token";

const FLASHES_KEY: &str = "_flashes";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashCategory {
    Success,
    Danger,
}

impl FlashCategory {
    pub fn css_class(self) -> &'static str {
        match self {
            FlashCategory::Success => "success",
            FlashCategory::Danger => "danger",
        }
    }
}

/// One-shot notice shown on the next rendered page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flash {
    pub category: FlashCategory,
    pub message: String,
}

/// Page furniture every render needs: who is logged in, pending flashes and
/// the form token.
#[derive(Debug, Clone)]
pub struct Chrome {
    pub user: Option<User>,
    pub flashes: Vec<Flash>,
    pub csrf_token: String,
}

/// Per-request view of the session: the resolved current user (if any) and
/// the session handle used to change login state.
pub struct RequestContext {
    user: Option<User>,
    session: Session,
}

impl FromRequestParts<AppState> for RequestContext {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        let user = load_user(&session, state)
            .await
            .map_err(IntoResponse::into_response)?;

        Ok(Self { user, session })
    }
}

async fn load_user(session: &Session, state: &AppState) -> ApiResult<Option<User>> {
    let Some(user_id) = session.get::<Uuid>(CURR_USER_KEY).await? else {
        return Ok(None);
    };

    match state.db.get_user(user_id)? {
        Some(user) => Ok(Some(user)),
        None => {
            // Account deleted from another session.
            warn!("Session refers to missing user {}; logging out", user_id);
            session.remove::<Uuid>(CURR_USER_KEY).await?;
            Ok(None)
        }
    }
}

impl RequestContext {
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Put `user` in the session under a fresh session id.
    pub async fn login(&mut self, user: User) -> ApiResult<()> {
        self.session.cycle_id().await?;
        self.session.insert(CURR_USER_KEY, user.id).await?;
        info!("{} logged in", user);
        self.user = Some(user);
        Ok(())
    }

    pub async fn logout(&mut self) -> ApiResult<()> {
        if let Some(user_id) = self.session.remove::<Uuid>(CURR_USER_KEY).await? {
            info!("User {} logged out", user_id);
        }
        self.user = None;
        Ok(())
    }

    pub async fn flash(&self, category: FlashCategory, message: impl Into<String>) -> ApiResult<()> {
        let mut flashes: Vec<Flash> = self.session.get(FLASHES_KEY).await?.unwrap_or_default();
        flashes.push(Flash {
            category,
            message: message.into(),
        });
        self.session.insert(FLASHES_KEY, flashes).await?;
        Ok(())
    }

    /// The session's form token, minted on first use.
    pub async fn csrf_token(&self) -> ApiResult<String> {
        if let Some(existing) = self.session.get::<String>(CSRF_KEY).await? {
            return Ok(existing);
        }

        let fresh = token::generate_token();
        self.session.insert(CSRF_KEY, &fresh).await?;
        Ok(fresh)
    }

    /// Collect what a page render needs. Pending flashes are consumed.
    pub async fn chrome(&self) -> ApiResult<Chrome> {
        let flashes = self
            .session
            .remove::<Vec<Flash>>(FLASHES_KEY)
            .await?
            .unwrap_or_default();

        Ok(Chrome {
            user: self.user.clone(),
            flashes,
            csrf_token: self.csrf_token().await?,
        })
    }

    /// Answer for a request the current user may not make.
    pub async fn unauthorized(&self) -> ApiResult<Response> {
        match &self.user {
            Some(user) => warn!("Unauthorized request by {}", user),
            None => warn!("Unauthorized anonymous request"),
        }
        self.flash(FlashCategory::Danger, "Access unauthorized.").await?;
        Ok(found("/"))
    }
}
