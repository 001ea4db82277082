//! Server-rendered `/` and `/dashboard`.
//!
//! Markup is assembled with `format!`; every dynamic value goes through
//! `html_escape` before it lands in the page.

use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use std::fmt::Write;
use std::sync::Arc;
use tower_sessions::Session;

use super::auth::current_user;
use super::{ApiError, AppState, MoverDto, WatchItemDto};

/// GET /
pub async fn index(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Html<String>, ApiError> {
    let user = current_user(&state, &session).await?;
    let movers = state.movers.get_movers(user.as_ref().map(|u| u.id)).await?;

    let mut body = String::new();
    match &user {
        Some(user) => {
            let _ = write!(
                body,
                r#"<nav><strong>stockwatch</strong><span>Signed in as {}</span><a href="/dashboard">Dashboard</a><button id="btnLogout">Log out</button></nav>"#,
                text(&user.username)
            );
        }
        None => {
            body.push_str(concat!(
                r#"<nav><strong>stockwatch</strong></nav>"#,
                r#"<section><form id="loginForm"><input name="username" placeholder="Username" required>"#,
                r#"<input name="password" type="password" placeholder="Password" required><button>Log in</button></form>"#,
                r#"<form id="registerForm"><input name="username" placeholder="Username" required>"#,
                r#"<input name="password" type="password" placeholder="Password" required><button>Register</button></form>"#,
                r#"<p id="authMsg"></p></section>"#,
            ));
        }
    }
    body.push_str("<h2>Market movers</h2>");
    body.push_str(&movers_table(&movers, user.is_some()));

    Ok(layout("stockwatch", &body))
}

/// GET /dashboard; anonymous visitors are sent back to `/`.
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Response, ApiError> {
    let Some(user) = current_user(&state, &session).await? else {
        return Ok(Redirect::to("/").into_response());
    };

    let (movers, watchlist) = tokio::join!(
        state.movers.get_movers(Some(user.id)),
        state.watchlist.view(user.id)
    );
    let (movers, watchlist) = (movers?, watchlist?);

    let mut body = String::new();
    let _ = write!(
        body,
        r#"<nav><a href="/"><strong>stockwatch</strong></a><span>Signed in as {}</span><button id="btnLogout">Log out</button></nav>"#,
        text(&user.username)
    );
    body.push_str(concat!(
        r#"<h2>Search</h2><input id="searchInput" placeholder="Ticker symbol, e.g. AAPL" autocomplete="off">"#,
        r#"<div id="searchResults"></div>"#,
    ));
    body.push_str("<h2>Your watchlist</h2>");
    body.push_str(&watchlist_items(&watchlist));
    body.push_str("<h2>Market movers</h2>");
    body.push_str(&movers_table(&movers, true));

    Ok(layout("Dashboard - stockwatch", &body).into_response())
}

fn layout(title: &str, body: &str) -> Html<String> {
    Html(format!(
        r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{}</title>
<link rel="stylesheet" href="/static/style.css">
</head>
<body>
{body}
<script src="/static/app.js"></script>
</body>
</html>
"#,
        text(title)
    ))
}

fn change_class(change: &str) -> &'static str {
    if change.starts_with('-') {
        "down"
    } else if change.trim_start_matches(['0', '.']).is_empty() {
        ""
    } else {
        "up"
    }
}

fn movers_table(movers: &[MoverDto], can_watch: bool) -> String {
    let mut html = String::from(
        "<table><thead><tr><th>Symbol</th><th>Name</th><th>Price</th><th>Change</th><th>%</th><th></th></tr></thead><tbody>",
    );

    for m in movers {
        let action = if m.already_in_watchlist {
            "Watching".to_string()
        } else if can_watch {
            format!(
                r#"<button data-watch="{}" data-name="{}">Watch</button>"#,
                attr(&m.symbol),
                attr(&m.name)
            )
        } else {
            String::new()
        };

        let _ = write!(
            html,
            r#"<tr><td>{}</td><td>{}</td><td class="num">{}</td><td class="num {cls}">{}</td><td class="num {cls}">{}</td><td>{action}</td></tr>"#,
            text(&m.symbol),
            text(&m.name),
            text(&m.price),
            text(&m.change),
            text(&m.percent_change),
            cls = change_class(&m.change),
        );
    }

    html.push_str("</tbody></table>");
    html
}

fn watchlist_items(items: &[WatchItemDto]) -> String {
    let mut html = String::from(r#"<ul id="watchlist">"#);
    for item in items {
        let label = if item.name.is_empty() {
            item.symbol.clone()
        } else {
            format!("{} ({})", item.symbol, item.name)
        };
        let _ = write!(
            html,
            r#"<li>{}  {}  {}  {} <button type="button" data-remove="{}">Remove</button></li>"#,
            text(&label),
            text(&item.price),
            text(&item.change),
            text(&item.percent_change),
            item.id,
        );
    }
    if items.is_empty() {
        html.push_str("<li>Nothing watched yet.</li>");
    }
    html.push_str("</ul>");
    html
}
