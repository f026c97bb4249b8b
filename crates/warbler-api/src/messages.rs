use axum::{
    Form,
    extract::{Path, State},
    response::{Html, IntoResponse, Response},
};
use tracing::{info, warn};

use warbler_types::MAX_MESSAGE_LEN;
use warbler_types::forms::MessageForm;

use crate::context::FlashCategory;
use crate::{ApiError, ApiResult, AppState, RequestContext, found, parse_id, views};

pub async fn new_message_page(ctx: RequestContext) -> ApiResult<Response> {
    if ctx.user().is_none() {
        return ctx.unauthorized().await;
    }

    let chrome = ctx.chrome().await?;
    Ok(views::new_message(&chrome, "").into_response())
}

/// `POST /messages/new`: post as the current user, then back to the feed.
pub async fn new_message(
    State(state): State<AppState>,
    ctx: RequestContext,
    Form(form): Form<MessageForm>,
) -> ApiResult<Response> {
    let Some(me) = ctx.user() else {
        return ctx.unauthorized().await;
    };

    let Some(text) = form.text() else {
        ctx.flash(FlashCategory::Danger, "Message text is required.")
            .await?;
        let chrome = ctx.chrome().await?;
        return Ok(views::new_message(&chrome, "").into_response());
    };

    match state.db.create_message(me.id, text) {
        Ok(message) => {
            info!("{} posted message {}", me, message.id);
            Ok(found("/"))
        }
        Err(e) if e.is_data() => {
            warn!("Message by {} rejected: {}", me, e);
            ctx.flash(
                FlashCategory::Danger,
                format!("Messages are limited to {MAX_MESSAGE_LEN} characters."),
            )
            .await?;
            let chrome = ctx.chrome().await?;
            Ok(views::new_message(&chrome, text).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// `GET /messages/{message_id}`. Anyone may read a message; only its author
/// sees the delete button.
pub async fn show_message(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(message_id): Path<String>,
) -> ApiResult<Html<String>> {
    let id = parse_id(&message_id)?;
    let item = state
        .db
        .get_authored_message(id)?
        .ok_or(ApiError::NotFound)?;

    let can_delete = ctx.user().is_some_and(|me| item.message.is_owned_by(me));
    let chrome = ctx.chrome().await?;
    Ok(views::show_message(&chrome, &item, can_delete))
}

pub async fn delete_message(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(message_id): Path<String>,
) -> ApiResult<Response> {
    let Some(me) = ctx.user() else {
        return ctx.unauthorized().await;
    };

    let id = parse_id(&message_id)?;
    let message = state.db.get_message(id)?.ok_or(ApiError::NotFound)?;

    if !message.is_owned_by(me) {
        return ctx.unauthorized().await;
    }

    state.db.delete_message(message.id)?;
    info!("{} deleted message {}", me, message.id);
    Ok(found(&format!("/users/{}", me.id)))
}
