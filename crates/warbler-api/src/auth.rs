use axum::{
    Form,
    extract::State,
    response::{Html, IntoResponse, Response},
};
use tokio::task;
use tracing::warn;

use warbler_types::forms::{LoginForm, SignupForm};

use crate::context::FlashCategory;
use crate::views::{self, SignupValues};
use crate::{ApiResult, AppState, RequestContext, found};

// -- Signup --

/// `GET /signup`. Visiting the signup page ends any current login.
pub async fn signup_page(mut ctx: RequestContext) -> ApiResult<Html<String>> {
    ctx.logout().await?;
    let chrome = ctx.chrome().await?;
    Ok(views::signup(&chrome, &SignupValues::default()))
}

pub async fn signup(
    State(state): State<AppState>,
    mut ctx: RequestContext,
    Form(form): Form<SignupForm>,
) -> ApiResult<Response> {
    ctx.logout().await?;

    let new_user = form.into_new_user();
    let username = new_user.username.clone().unwrap_or_default();
    let email = new_user.email.clone().unwrap_or_default();
    let image_url = new_user.image_url.clone().unwrap_or_default();

    let values = SignupValues {
        username: &username,
        email: &email,
        image_url: &image_url,
    };

    if new_user.username.is_none() || new_user.email.is_none() || new_user.password.is_none() {
        ctx.flash(FlashCategory::Danger, "Username, email and password are required.")
            .await?;
        return rerender_signup(&ctx, &values).await;
    }

    let db_state = state.clone();
    let created =
        task::spawn_blocking(move || db_state.db.signup(db_state.passwords.as_ref(), new_user))
            .await?;

    match created {
        Ok(user) => {
            ctx.login(user).await?;
            Ok(found("/"))
        }
        Err(e) if e.is_integrity() => {
            warn!("Signup rejected for {:?}: {}", username, e);
            ctx.flash(FlashCategory::Danger, "Username or email already taken.")
                .await?;
            rerender_signup(&ctx, &values).await
        }
        Err(e) => Err(e.into()),
    }
}

async fn rerender_signup(ctx: &RequestContext, values: &SignupValues<'_>) -> ApiResult<Response> {
    let chrome = ctx.chrome().await?;
    Ok(views::signup(&chrome, values).into_response())
}

// -- Login --

pub async fn login_page(ctx: RequestContext) -> ApiResult<Html<String>> {
    let chrome = ctx.chrome().await?;
    Ok(views::login(&chrome, ""))
}

pub async fn login(
    State(state): State<AppState>,
    mut ctx: RequestContext,
    Form(form): Form<LoginForm>,
) -> ApiResult<Response> {
    let LoginForm { username, password } = form;

    let db_state = state.clone();
    let lookup_name = username.clone();
    let user = task::spawn_blocking(move || {
        db_state
            .db
            .authenticate(db_state.passwords.as_ref(), &lookup_name, &password)
    })
    .await??;

    match user {
        Some(user) => {
            ctx.flash(FlashCategory::Success, format!("Hello, {}!", user.username))
                .await?;
            ctx.login(user).await?;
            Ok(found("/"))
        }
        None => {
            warn!("Failed login for {:?}", username);
            ctx.flash(FlashCategory::Danger, "Invalid credentials.").await?;
            let chrome = ctx.chrome().await?;
            Ok(views::login(&chrome, &username).into_response())
        }
    }
}

/// `GET /logout`.
pub async fn logout(mut ctx: RequestContext) -> ApiResult<Response> {
    ctx.logout().await?;
    ctx.flash(FlashCategory::Success, "You have successfully logged out.")
        .await?;
    Ok(found("/login"))
}
