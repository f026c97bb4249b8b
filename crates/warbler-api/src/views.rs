//! HTML rendering. Templates live in `templates/` and are compiled into the
//! binary; `{name}` placeholders are filled in a single pass so substituted
//! text is never rescanned.

use axum::response::Html;
use chrono::{DateTime, Utc};

use warbler_db::UserStats;
use warbler_types::{AuthoredMessage, Message, User};

use crate::context::Chrome;

macro_rules! template {
    ($path:literal) => {
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/templates/", $path))
    };
}

const BASE: &str = template!("base.html");
const HOME_ANON: &str = template!("home-anon.html");
const HOME: &str = template!("home.html");
const SIGNUP: &str = template!("signup.html");
const LOGIN: &str = template!("login.html");
const NOT_FOUND: &str = template!("404.html");
const USER_INDEX: &str = template!("users/index.html");
const USER_DETAIL: &str = template!("users/detail.html");
const USER_EDIT: &str = template!("users/edit.html");
const MESSAGE_NEW: &str = template!("messages/new.html");
const MESSAGE_SHOW: &str = template!("messages/show.html");
const MESSAGE_ITEM: &str = template!("partials/message.html");
const USER_CARD: &str = template!("partials/user-card.html");

/// Escape text for use in element content and quoted attribute values.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Replace `{key}` placeholders in `template`. Unknown placeholders are left
/// as written.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];

        let substituted = after.find('}').and_then(|end| {
            let key = &after[..end];
            values
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (*value, end))
        });

        match substituted {
            Some((value, end)) => {
                out.push_str(value);
                rest = &after[end + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%d %B %Y").to_string()
}

fn csrf_field(chrome: &Chrome) -> String {
    format!(
        r#"<input type="hidden" name="csrf_token" value="{}">"#,
        escape(&chrome.csrf_token)
    )
}

fn nav(chrome: &Chrome) -> String {
    match &chrome.user {
        None => concat!(
            "      <li><a href=\"/signup\">Sign up</a></li>\n",
            "      <li><a href=\"/login\">Log in</a></li>",
        )
        .to_string(),
        Some(user) => format!(
            concat!(
                "      <li>\n",
                "        <form class=\"navbar-form navbar-right\" action=\"/users\">\n",
                "          <input name=\"q\" class=\"form-control\" placeholder=\"Search Warbler\" id=\"search\">\n",
                "          <button class=\"btn btn-default\">Search</button>\n",
                "        </form>\n",
                "      </li>\n",
                "      <li><a href=\"/users/{id}\"><img src=\"{image}\" alt=\"{name}\"></a></li>\n",
                "      <li><a href=\"/messages/new\">New Message</a></li>\n",
                "      <li><a href=\"/logout\">Log out</a></li>",
            ),
            id = user.id,
            image = escape(&user.image_url),
            name = escape(&user.username),
        ),
    }
}

fn flashes(chrome: &Chrome) -> String {
    chrome
        .flashes
        .iter()
        .map(|flash| {
            format!(
                "<div class=\"alert alert-{}\">{}</div>\n",
                flash.category.css_class(),
                escape(&flash.message)
            )
        })
        .collect()
}

fn page(chrome: &Chrome, title: &str, body_class: &str, content: &str) -> Html<String> {
    let title = match title {
        "" => "Warbler".to_string(),
        title => format!("{} | Warbler", escape(title)),
    };

    Html(fill(
        BASE,
        &[
            ("title", &title),
            ("body_class", body_class),
            ("nav", &nav(chrome)),
            ("flashes", &flashes(chrome)),
            ("content", content),
        ],
    ))
}

/// Body of 404 responses. Rendered without session chrome.
pub fn not_found() -> String {
    NOT_FOUND.to_string()
}

// -- Home --

pub fn home_anon(chrome: &Chrome) -> Html<String> {
    page(chrome, "", "homepage", HOME_ANON)
}

pub fn home(
    chrome: &Chrome,
    user: &User,
    stats: &UserStats,
    feed: &[AuthoredMessage],
) -> Html<String> {
    let messages: String = feed
        .iter()
        .map(|item| {
            message_item(
                &item.message,
                &item.username,
                &item.image_url,
            )
        })
        .collect();

    let content = fill(
        HOME,
        &[
            ("user_id", &user.id.to_string()),
            ("username", &escape(&user.username)),
            ("image_url", &escape(&user.image_url)),
            ("header_image_url", &escape(&user.header_image_url)),
            ("message_count", &stats.messages.to_string()),
            ("following_count", &stats.following.to_string()),
            ("follower_count", &stats.followers.to_string()),
            ("messages", &messages),
        ],
    );

    page(chrome, "", "", &content)
}

fn message_item(message: &Message, username: &str, image_url: &str) -> String {
    fill(
        MESSAGE_ITEM,
        &[
            ("message_id", &message.id.to_string()),
            ("user_id", &message.user_id.to_string()),
            ("username", &escape(username)),
            ("image_url", &escape(image_url)),
            ("timestamp", &format_timestamp(&message.timestamp)),
            ("text", &escape(&message.text)),
        ],
    )
}

// -- Auth --

/// Values echoed back into the signup form after a failed attempt.
#[derive(Debug, Default)]
pub struct SignupValues<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub image_url: &'a str,
}

pub fn signup(chrome: &Chrome, values: &SignupValues<'_>) -> Html<String> {
    let content = fill(
        SIGNUP,
        &[
            ("csrf_field", &csrf_field(chrome)),
            ("username", &escape(values.username)),
            ("email", &escape(values.email)),
            ("image_url", &escape(values.image_url)),
        ],
    );
    page(chrome, "Sign up", "", &content)
}

pub fn login(chrome: &Chrome, username: &str) -> Html<String> {
    let content = fill(
        LOGIN,
        &[
            ("csrf_field", &csrf_field(chrome)),
            ("username", &escape(username)),
        ],
    );
    page(chrome, "Log in", "", &content)
}

// -- Users --

/// Relationship between the viewer and a user shown on a card or profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Anonymous,
    Own,
    Following,
    NotFollowing,
}

impl Relation {
    pub fn between(viewer: Option<&User>, shown: &User, following: bool) -> Self {
        match viewer {
            None => Relation::Anonymous,
            Some(viewer) if viewer.id == shown.id => Relation::Own,
            Some(_) if following => Relation::Following,
            Some(_) => Relation::NotFollowing,
        }
    }
}

fn follow_button(chrome: &Chrome, user: &User, relation: Relation) -> String {
    match relation {
        Relation::Anonymous | Relation::Own => String::new(),
        Relation::Following => format!(
            r#"<form method="POST" action="/users/stop-following/{}">{}<button class="btn btn-primary btn-sm">Unfollow</button></form>"#,
            user.id,
            csrf_field(chrome)
        ),
        Relation::NotFollowing => format!(
            r#"<form method="POST" action="/users/follow/{}">{}<button class="btn btn-outline-primary btn-sm">Follow</button></form>"#,
            user.id,
            csrf_field(chrome)
        ),
    }
}

fn user_card(chrome: &Chrome, user: &User, relation: Relation) -> String {
    fill(
        USER_CARD,
        &[
            ("user_id", &user.id.to_string()),
            ("username", &escape(&user.username)),
            ("image_url", &escape(&user.image_url)),
            ("header_image_url", &escape(&user.header_image_url)),
            ("bio", &escape(user.bio.as_deref().unwrap_or_default())),
            ("actions", &follow_button(chrome, user, relation)),
        ],
    )
}

fn card_grid(chrome: &Chrome, users: &[(User, Relation)]) -> String {
    if users.is_empty() {
        return "<h3>Sorry, no users found</h3>".to_string();
    }

    let cards: String = users
        .iter()
        .map(|(user, relation)| user_card(chrome, user, *relation))
        .collect();

    fill(USER_INDEX, &[("cards", &cards)])
}

pub fn user_index(chrome: &Chrome, users: &[(User, Relation)]) -> Html<String> {
    page(chrome, "Users", "", &card_grid(chrome, users))
}

/// Header block of every profile page.
pub struct Profile<'a> {
    pub user: &'a User,
    pub stats: UserStats,
    pub relation: Relation,
}

fn profile_actions(chrome: &Chrome, profile: &Profile<'_>) -> String {
    match profile.relation {
        Relation::Own => format!(
            concat!(
                "<a href=\"/users/profile\" class=\"btn btn-outline-secondary\">Edit Profile</a>\n",
                "<form method=\"POST\" action=\"/users/delete\" class=\"form-inline\">{}",
                "<button class=\"btn btn-outline-danger ml-2\">Delete Profile</button></form>",
            ),
            csrf_field(chrome)
        ),
        relation => follow_button(chrome, profile.user, relation),
    }
}

fn profile_page(chrome: &Chrome, profile: &Profile<'_>, title: &str, content: &str) -> Html<String> {
    let user = profile.user;
    let body = fill(
        USER_DETAIL,
        &[
            ("user_id", &user.id.to_string()),
            ("username", &escape(&user.username)),
            ("image_url", &escape(&user.image_url)),
            ("header_image_url", &escape(&user.header_image_url)),
            ("bio", &escape(user.bio.as_deref().unwrap_or_default())),
            ("location", &escape(user.location.as_deref().unwrap_or_default())),
            ("message_count", &profile.stats.messages.to_string()),
            ("following_count", &profile.stats.following.to_string()),
            ("follower_count", &profile.stats.followers.to_string()),
            ("actions", &profile_actions(chrome, profile)),
            ("content", content),
        ],
    );

    page(chrome, title, "", &body)
}

pub fn user_messages(chrome: &Chrome, profile: &Profile<'_>, messages: &[Message]) -> Html<String> {
    let items: String = messages
        .iter()
        .map(|m| message_item(m, &profile.user.username, &profile.user.image_url))
        .collect();

    let content = format!(
        "  <div class=\"col-sm-6\">\n    <ul class=\"list-group\" id=\"messages\">\n{items}    </ul>\n  </div>\n"
    );

    profile_page(chrome, profile, &profile.user.username, &content)
}

/// Following or followers listing under a profile header.
pub fn user_relations(
    chrome: &Chrome,
    profile: &Profile<'_>,
    heading: &str,
    users: &[(User, Relation)],
) -> Html<String> {
    let content = format!(
        "  <div class=\"col-sm-9\">\n    <h4>{}</h4>\n{}\n  </div>\n",
        escape(heading),
        card_grid(chrome, users)
    );

    profile_page(chrome, profile, heading, &content)
}

pub fn edit_profile(chrome: &Chrome, user: &User) -> Html<String> {
    let content = fill(
        USER_EDIT,
        &[
            ("csrf_field", &csrf_field(chrome)),
            ("user_id", &user.id.to_string()),
            ("username", &escape(&user.username)),
            ("email", &escape(&user.email)),
            ("image_url", &escape(&user.image_url)),
            ("header_image_url", &escape(&user.header_image_url)),
            ("bio", &escape(user.bio.as_deref().unwrap_or_default())),
            ("location", &escape(user.location.as_deref().unwrap_or_default())),
        ],
    );
    page(chrome, "Edit profile", "", &content)
}

// -- Messages --

pub fn new_message(chrome: &Chrome, text: &str) -> Html<String> {
    let content = fill(
        MESSAGE_NEW,
        &[("csrf_field", &csrf_field(chrome)), ("text", &escape(text))],
    );
    page(chrome, "New message", "", &content)
}

pub fn show_message(chrome: &Chrome, item: &AuthoredMessage, can_delete: bool) -> Html<String> {
    let message = &item.message;
    let actions = if can_delete {
        format!(
            r#"<form method="POST" action="/messages/{}/delete">{}<button class="btn btn-outline-danger">Delete</button></form>"#,
            message.id,
            csrf_field(chrome)
        )
    } else {
        String::new()
    };

    let content = fill(
        MESSAGE_SHOW,
        &[
            ("user_id", &message.user_id.to_string()),
            ("username", &escape(&item.username)),
            ("image_url", &escape(&item.image_url)),
            ("text", &escape(&message.text)),
            ("timestamp", &format_timestamp(&message.timestamp)),
            ("actions", &actions),
        ],
    );
    page(chrome, "Message", "", &content)
}
