use std::collections::HashSet;

use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use tokio::task;
use tracing::{info, warn};
use uuid::Uuid;

use warbler_db::queries::PAGE_LIMIT;
use warbler_types::User;
use warbler_types::forms::{ProfileForm, UserSearch};

use crate::context::FlashCategory;
use crate::views::{self, Profile, Relation};
use crate::{ApiError, ApiResult, AppState, RequestContext, found, parse_id};

fn lookup_user(state: &AppState, raw_id: &str) -> ApiResult<User> {
    let id = parse_id(raw_id)?;
    state.db.get_user(id)?.ok_or(ApiError::NotFound)
}

/// Pair each user with how `viewer` relates to them.
fn with_relations(
    state: &AppState,
    viewer: Option<&User>,
    users: Vec<User>,
) -> ApiResult<Vec<(User, Relation)>> {
    let followed: HashSet<Uuid> = match viewer {
        Some(viewer) => state.db.following(viewer.id)?.into_iter().map(|u| u.id).collect(),
        None => HashSet::new(),
    };

    Ok(users
        .into_iter()
        .map(|user| {
            let relation = Relation::between(viewer, &user, followed.contains(&user.id));
            (user, relation)
        })
        .collect())
}

fn load_profile<'a>(state: &AppState, viewer: Option<&User>, user: &'a User) -> ApiResult<Profile<'a>> {
    let following = match viewer {
        Some(viewer) if viewer.id != user.id => state.db.is_following(viewer.id, user.id)?,
        _ => false,
    };

    Ok(Profile {
        user,
        stats: state.db.user_stats(user.id)?,
        relation: Relation::between(viewer, user, following),
    })
}

// -- Browsing --

/// `GET /users?q=`: everyone, or those whose username contains `q`
/// (case-insensitive).
pub async fn list_users(
    State(state): State<AppState>,
    ctx: RequestContext,
    Query(search): Query<UserSearch>,
) -> ApiResult<Response> {
    if ctx.user().is_none() {
        return ctx.unauthorized().await;
    }

    let users = state.db.list_users(search.term())?;
    let users = with_relations(&state, ctx.user(), users)?;

    let chrome = ctx.chrome().await?;
    Ok(views::user_index(&chrome, &users).into_response())
}

pub async fn show_user(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(user_id): Path<String>,
) -> ApiResult<Response> {
    if ctx.user().is_none() {
        return ctx.unauthorized().await;
    }

    let user = lookup_user(&state, &user_id)?;
    let messages = state.db.messages_for_user(user.id, PAGE_LIMIT)?;
    let profile = load_profile(&state, ctx.user(), &user)?;

    let chrome = ctx.chrome().await?;
    Ok(views::user_messages(&chrome, &profile, &messages).into_response())
}

pub async fn show_following(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(user_id): Path<String>,
) -> ApiResult<Response> {
    if ctx.user().is_none() {
        return ctx.unauthorized().await;
    }

    let user = lookup_user(&state, &user_id)?;
    let following = with_relations(&state, ctx.user(), state.db.following(user.id)?)?;
    let profile = load_profile(&state, ctx.user(), &user)?;

    let chrome = ctx.chrome().await?;
    Ok(views::user_relations(&chrome, &profile, "Following", &following).into_response())
}

pub async fn show_followers(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(user_id): Path<String>,
) -> ApiResult<Response> {
    if ctx.user().is_none() {
        return ctx.unauthorized().await;
    }

    let user = lookup_user(&state, &user_id)?;
    let followers = with_relations(&state, ctx.user(), state.db.followers(user.id)?)?;
    let profile = load_profile(&state, ctx.user(), &user)?;

    let chrome = ctx.chrome().await?;
    Ok(views::user_relations(&chrome, &profile, "Followers", &followers).into_response())
}

// -- Follows --

/// `POST /users/follow/{user_id}`: the current user starts following
/// `user_id`.
pub async fn follow(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(user_id): Path<String>,
) -> ApiResult<Response> {
    let Some(me) = ctx.user() else {
        return ctx.unauthorized().await;
    };

    let target = lookup_user(&state, &user_id)?;
    let back = format!("/users/{}/following", me.id);

    if target.id == me.id {
        ctx.flash(FlashCategory::Danger, "You cannot follow yourself.")
            .await?;
        return Ok(found(&back));
    }

    state.db.follow(me.id, target.id)?;
    Ok(found(&back))
}

/// `POST /users/stop-following/{user_id}`.
pub async fn stop_following(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(user_id): Path<String>,
) -> ApiResult<Response> {
    let Some(me) = ctx.user() else {
        return ctx.unauthorized().await;
    };

    let target = lookup_user(&state, &user_id)?;
    state.db.unfollow(me.id, target.id)?;

    Ok(found(&format!("/users/{}/following", me.id)))
}

// -- Profile --

pub async fn edit_profile_page(ctx: RequestContext) -> ApiResult<Response> {
    let Some(me) = ctx.user() else {
        return ctx.unauthorized().await;
    };

    let chrome = ctx.chrome().await?;
    Ok(views::edit_profile(&chrome, me).into_response())
}

/// `POST /users/profile`. Changes apply only when the form carries the
/// user's current password.
pub async fn edit_profile(
    State(state): State<AppState>,
    ctx: RequestContext,
    Form(form): Form<ProfileForm>,
) -> ApiResult<Response> {
    let Some(me) = ctx.user().cloned() else {
        return ctx.unauthorized().await;
    };

    let verify_state = state.clone();
    let stored_hash = me.password.clone();
    let raw_password = form.password.clone();
    let verified = task::spawn_blocking(move || {
        verify_state.passwords.verify(&raw_password, &stored_hash)
    })
    .await?;

    if !verified {
        warn!("Profile edit by {} rejected: wrong password", me);
        ctx.flash(FlashCategory::Danger, "Wrong password, please try again.")
            .await?;
        let chrome = ctx.chrome().await?;
        return Ok(views::edit_profile(&chrome, &me).into_response());
    }

    let mut updated = me.clone();
    updated.update_info(form.to_update());

    match state.db.save_user(&updated) {
        Ok(()) => {
            info!("Updated profile of {}", updated);
            Ok(found(&format!("/users/{}", updated.id)))
        }
        Err(e) if e.is_integrity() => {
            warn!("Profile edit by {} rejected: {}", me, e);
            ctx.flash(FlashCategory::Danger, "Username or email already taken.")
                .await?;
            let chrome = ctx.chrome().await?;
            Ok(views::edit_profile(&chrome, &updated).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// `POST /users/delete`: log out and remove the account with everything it
/// owns.
pub async fn delete_account(
    State(state): State<AppState>,
    mut ctx: RequestContext,
) -> ApiResult<Response> {
    let Some(me) = ctx.user().cloned() else {
        return ctx.unauthorized().await;
    };

    state.db.delete_user(me.id)?;
    info!("Deleted account {}", me);
    ctx.logout().await?;

    ctx.flash(FlashCategory::Success, "Your account has been deleted.")
        .await?;
    Ok(found("/signup"))
}
