use axum::response::Html;

/// The single-page form UI. All workflow state lives in the page; the server stays stateless.
const INDEX_HTML: &str = include_str!("../../static/index.html");

/// GET /
pub async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}
