//! Static file serving.
//!
//! Maps request paths onto files under the root directory. HTML pages get
//! the reload script injected when live reload is enabled.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use axum::extract::State;
use axum::http::{Method, Uri, header};
use axum::response::{IntoResponse, Response};
use percent_encoding::percent_decode_str;

use crate::error::ServerError;
use crate::inject::inject_script;
use crate::state::AppState;

/// File served for directory paths.
const INDEX_FILE: &str = "index.html";

/// Serve a file from the root directory.
pub(crate) async fn serve_file(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
) -> Response {
    let request_path = uri.path();

    let Some(path) = resolve_path(&state.root_dir, request_path) else {
        tracing::info!(%method, path = request_path, "Rejected request path");
        return ServerError::FileNotFound(PathBuf::from(request_path)).into_response();
    };

    tracing::info!(%method, path = request_path, resolved = %path.display(), "Serving file");

    match read_file(&state, &path).await {
        Ok(content) => {
            let mime = mime_guess::from_path(&path).first_or_octet_stream();
            ([(header::CONTENT_TYPE, mime.to_string())], content).into_response()
        }
        Err(err) => {
            tracing::warn!(resolved = %path.display(), error = %err, "Failed to serve file");
            err.into_response()
        }
    }
}

/// Resolve a URL path to a file path under `root`.
///
/// Trailing slashes map to `index.html`. Returns `None` for paths that are
/// not valid UTF-8 once decoded or that try to leave the root.
pub(crate) fn resolve_path(root: &Path, request_path: &str) -> Option<PathBuf> {
    let decoded = percent_decode_str(request_path).decode_utf8().ok()?;
    let relative = decoded.trim_start_matches('/');

    let mut path = root.to_path_buf();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(segment) => path.push(segment),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    if relative.is_empty() || relative.ends_with('/') {
        path.push(INDEX_FILE);
    }

    Some(path)
}

/// Read a resolved file, instrumenting HTML when live reload is enabled.
async fn read_file(state: &AppState, path: &Path) -> Result<Vec<u8>, ServerError> {
    let content = tokio::fs::read(path).await?;

    let is_html = path.extension().is_some_and(|ext| ext == "html");
    if !(is_html && state.live_reload_enabled()) {
        return Ok(content);
    }

    let html = String::from_utf8(content)?;
    Ok(inject_script(&html, &state.reload_script).into_bytes())
}
