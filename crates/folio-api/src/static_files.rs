//! Static file serving: uploaded media from the persist directory and the
//! site itself from `SITE_ROOT`.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use axum::Router;
use folio_core::defaults::{ICON_DIR, IMAGE_DIR, THUMB_DIR};
use tower_http::services::ServeDir;

use crate::config::Config;
use crate::error::ApiError;
use crate::AppState;

/// Mount `/img`, `/thumbs`, `/icons` and the site fallback onto `router`.
///
/// Icons uploaded through the admin UI live under the persist directory; the
/// stock icons shipped with the site are the fallback.
pub fn mount(router: Router<AppState>, config: &Config) -> Router<AppState> {
    let persist = &config.persist_path;
    let site = &config.site_root;

    let icons = ServeDir::new(persist.join(ICON_DIR)).fallback(ServeDir::new(site.join(ICON_DIR)));
    let site_files = ServeDir::new(site).append_index_html_on_directories(true);

    router
        .nest_service(&format!("/{}", IMAGE_DIR), ServeDir::new(persist.join(IMAGE_DIR)))
        .nest_service(&format!("/{}", THUMB_DIR), ServeDir::new(persist.join(THUMB_DIR)))
        .nest_service(&format!("/{}", ICON_DIR), icons)
        .fallback_service(site_files)
}

/// True when any path segment is hidden (`.env`, `.sessions`, `.git`, ...).
///
/// Segments are checked after percent-decoding, the same form the file
/// services open. A path that does not decode to UTF-8 counts as hidden.
pub fn is_hidden_path(path: &str) -> bool {
    match urlencoding::decode(path) {
        Ok(decoded) => decoded.split('/').any(|segment| segment.starts_with('.')),
        Err(_) => true,
    }
}

/// Answer 404 for hidden paths before they reach a file service.
pub async fn reject_hidden_paths(request: Request, next: Next) -> Result<Response, ApiError> {
    if is_hidden_path(request.uri().path()) {
        return Err(ApiError::Core(folio_core::Error::NotFound(
            "Not found.".to_string(),
        )));
    }
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_paths() {
        assert!(is_hidden_path("/.env"));
        assert!(is_hidden_path("/.sessions/abc.json"));
        assert!(is_hidden_path("/img/../data/books.json"));
        assert!(is_hidden_path("/icons/.hidden.svg"));
        assert!(!is_hidden_path("/img/upload-1-2.png"));
        assert!(!is_hidden_path("/"));
        assert!(!is_hidden_path("/api/data/cv/skills"));
    }

    #[test]
    fn test_encoded_hidden_paths() {
        assert!(is_hidden_path("/%2Eenv"));
        assert!(is_hidden_path("/%2eenv"));
        assert!(is_hidden_path("/%2esessions/x.json"));
        assert!(is_hidden_path("/img%2F.env"));
        assert!(is_hidden_path("/%FF%FE"));
        assert!(!is_hidden_path("/img/my%20photo.png"));
    }
}
