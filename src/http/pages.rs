//! Page responses for route resolutions.
//!
//! # Responsibilities
//! - Redirect → 302 with `Location`
//! - Matched view → 200 page shell (or JSON)
//! - No match → 404 not-found shell (or JSON)
//!
//! # Design Decisions
//! - The list component is not rendered here; the shell carries the match
//!   as JSON for the client to mount with
//! - JSON is returned when `Accept` asks for it and not for HTML

use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Json, Response},
};
use serde::Serialize;

use crate::config::ServerConfig;
use crate::routing::{MatchResult, Resolution};

/// Static parts of the HTML page shell.
#[derive(Debug, Clone, Default)]
pub struct PageShell {
    entry_script: Option<String>,
}

impl PageShell {
    pub fn new(entry_script: Option<String>) -> Self {
        Self { entry_script }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(config.entry_script.clone())
    }

    /// Render a full HTML document for `view` with `state` embedded as JSON.
    pub fn render<T: Serialize>(&self, title: &str, view: &str, state: &T) -> String {
        // `</` would end the script element early
        let json = serde_json::to_string(state)
            .unwrap_or_else(|_| "null".to_string())
            .replace("</", "<\\/");

        let script = self
            .entry_script
            .as_deref()
            .map(|src| format!("\n<script type=\"module\" src=\"{}\"></script>", escape_attr(src)))
            .unwrap_or_default();

        format!(
            "<!DOCTYPE html>\n\
             <html lang=\"fa\" dir=\"rtl\">\n\
             <head>\n\
             <meta charset=\"utf-8\">\n\
             <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
             <title>{title}</title>\n\
             </head>\n\
             <body>\n\
             <div id=\"app\" data-view=\"{view}\"></div>\n\
             <script type=\"application/json\" id=\"route-match\">{json}</script>{script}\n\
             </body>\n\
             </html>\n",
            title = escape_attr(title),
            view = escape_attr(view),
        )
    }
}

#[derive(Serialize)]
struct NotFoundState<'a> {
    view: &'static str,
    path: &'a str,
}

/// Build the response for a resolution.
///
/// `query` is the raw query string of the request; it is carried over to
/// redirect targets.
pub fn respond(
    shell: &PageShell,
    resolution: &Resolution,
    query: Option<&str>,
    headers: &HeaderMap,
) -> Response {
    let json = wants_json(headers);

    match resolution {
        Resolution::Redirect { to } => {
            let location = match query {
                Some(q) if !q.is_empty() && !to.contains('?') => format!("{}?{}", to, q),
                _ => to.clone(),
            };
            (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
        }
        Resolution::Matched(matched) => {
            if json {
                Json(matched).into_response()
            } else {
                Html(render_matched(shell, matched)).into_response()
            }
        }
        Resolution::NotFound { path } => {
            let state = NotFoundState {
                view: "not-found",
                path,
            };
            if json {
                (StatusCode::NOT_FOUND, Json(state)).into_response()
            } else {
                let body = shell.render("Page not found", state.view, &state);
                (StatusCode::NOT_FOUND, Html(body)).into_response()
            }
        }
    }
}

fn render_matched(shell: &PageShell, matched: &MatchResult) -> String {
    shell.render("Products", matched.view.slug(), matched)
}

/// True when the client asks for JSON and not for HTML.
pub fn wants_json(headers: &HeaderMap) -> bool {
    let accept = headers
        .get_all(header::ACCEPT)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect::<Vec<_>>()
        .join(",");

    accept.contains("application/json") && !accept.contains("text/html")
}

fn escape_attr(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
