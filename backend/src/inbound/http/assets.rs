//! Stylesheets under `/css/`, read from the root of the static directory.
//!
//! `/css/app.css` resolves to `<static_dir>/app.css`. Only plain file names
//! directly in that directory are served.

use std::io;
use std::path::{Component, Path, PathBuf};

use actix_web::http::header::{self, ContentType};
use actix_web::{HttpResponse, get, web};
use cap_std::{ambient_authority, fs::Dir};
use tracing::warn;

use crate::domain::{DomainError, TraceId};
use crate::inbound::http::ApiResult;

/// Location of the static asset tree.
#[derive(Debug, Clone)]
pub struct StaticAssets {
    root: PathBuf,
}

impl StaticAssets {
    /// Serve stylesheets from `static_dir`.
    #[must_use]
    pub fn new(static_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: static_dir.into(),
        }
    }

    /// Read `file` from the static directory.
    ///
    /// The directory is opened as a capability, so only plain file names
    /// directly inside it resolve.
    fn read_stylesheet(&self, file: &str) -> io::Result<Vec<u8>> {
        let mut components = Path::new(file).components();
        if !matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        ) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "asset name must be a plain file name",
            ));
        }
        let dir = Dir::open_ambient_dir(&self.root, ambient_authority())?;
        dir.read(file)
    }
}

fn content_type(file: &str) -> ContentType {
    match Path::new(file).extension().and_then(|ext| ext.to_str()) {
        Some("css") => ContentType(actix_web::mime::TEXT_CSS_UTF_8),
        _ => ContentType::octet_stream(),
    }
}

fn map_asset_error(file: &str, error: &io::Error) -> DomainError {
    match error.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied | io::ErrorKind::InvalidInput => {
            DomainError::not_found(format!("asset {file} not found"))
        }
        _ => {
            warn!(asset = file, %error, "stylesheet read failed");
            DomainError::internal(format!("could not read asset {file}: {error}"))
        }
    }
}

/// Serve one stylesheet.
///
/// # Errors
/// 404 for unknown or non-plain names.
#[get("/css/{file}")]
pub async fn stylesheet(
    assets: web::Data<StaticAssets>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let file = path.into_inner();
    let name = file.clone();
    let trace_id = TraceId::current();
    let read = web::block(move || {
        TraceId::sync_scope(trace_id, || assets.read_stylesheet(&name))
    })
    .await?;

    let body = read.map_err(|err| map_asset_error(&file, &err))?;
    Ok(HttpResponse::Ok()
        .insert_header(content_type(&file))
        .insert_header((header::CACHE_CONTROL, "public, max-age=300"))
        .body(body))
}
