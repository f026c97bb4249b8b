use axum::{extract::State, response::Html};

use warbler_db::queries::PAGE_LIMIT;

use crate::{ApiResult, AppState, RequestContext, views};

/// `GET /`: the followed-users feed for a logged-in user, the landing page
/// otherwise.
pub async fn homepage(State(state): State<AppState>, ctx: RequestContext) -> ApiResult<Html<String>> {
    let chrome = ctx.chrome().await?;

    let Some(user) = ctx.user() else {
        return Ok(views::home_anon(&chrome));
    };

    let feed = state.db.home_feed(user.id, PAGE_LIMIT)?;
    let stats = state.db.user_stats(user.id)?;

    Ok(views::home(&chrome, user, &stats, &feed))
}
