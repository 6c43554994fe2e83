//! HTTP sink for generated artifacts.
//!
//! Frames the artifact as an `application/octet-stream` attachment and
//! honours a single `Range: bytes=...` request. The actual read runs on the
//! blocking pool through [`deliver`], which removes the file afterwards.

use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use actix_web::http::header::{
    self, ByteRangeSpec, ContentDisposition, ContentType, DispositionParam, DispositionType, Header,
    Range,
};
use actix_web::web::{self, Bytes};
use actix_web::{HttpRequest, HttpResponse};
use tracing::warn;

use crate::domain::{
    ArtifactName, ArtifactReader, ArtifactSink, Delivered, DeliveryError, DomainError,
    GeneratedArtifact, TraceId, deliver,
};
use crate::inbound::http::ApiResult;

/// Body selection made by the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Download {
    /// Whole file.
    Full {
        /// Attachment file name.
        name: String,
        /// File contents.
        body: Bytes,
    },
    /// Inclusive byte range `start..=end` of a file of `length` bytes.
    Partial {
        /// Attachment file name.
        name: String,
        /// First byte sent.
        start: u64,
        /// Last byte sent.
        end: u64,
        /// Size of the whole file.
        length: u64,
        /// Selected bytes.
        body: Bytes,
    },
    /// The requested range lies outside a file of `length` bytes.
    Unsatisfiable {
        /// Size of the whole file.
        length: u64,
    },
}

impl Download {
    /// Build the HTTP response for this selection.
    #[must_use]
    pub fn into_response(self) -> HttpResponse {
        match self {
            Self::Full { name, body } => HttpResponse::Ok()
                .insert_header(attachment(name))
                .insert_header(ContentType::octet_stream())
                .insert_header((header::ACCEPT_RANGES, "bytes"))
                .body(body),
            Self::Partial {
                name,
                start,
                end,
                length,
                body,
            } => HttpResponse::PartialContent()
                .insert_header(attachment(name))
                .insert_header(ContentType::octet_stream())
                .insert_header((header::ACCEPT_RANGES, "bytes"))
                .insert_header((
                    header::CONTENT_RANGE,
                    format!("bytes {start}-{end}/{length}"),
                ))
                .body(body),
            Self::Unsatisfiable { length } => HttpResponse::RangeNotSatisfiable()
                .insert_header((header::ACCEPT_RANGES, "bytes"))
                .insert_header((header::CONTENT_RANGE, format!("bytes */{length}")))
                .finish(),
        }
    }
}

fn attachment(name: String) -> ContentDisposition {
    ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters: vec![DispositionParam::Filename(name)],
    }
}

/// [`ArtifactSink`] that reads the requested bytes for an HTTP response.
#[derive(Debug, Clone, Default)]
pub struct HttpDownload {
    ranges: Option<Vec<ByteRangeSpec>>,
}

impl HttpDownload {
    /// Capture the `Range` header of `req`, ignoring unparseable values.
    #[must_use]
    pub fn from_request(req: &HttpRequest) -> Self {
        let ranges = match <Range as Header>::parse(req) {
            Ok(Range::Bytes(specs)) => Some(specs),
            _ => None,
        };
        Self { ranges }
    }
}

impl ArtifactSink for HttpDownload {
    type Delivered = Download;
    type Error = io::Error;

    fn transmit(
        self,
        artifact: &ArtifactName,
        _path: &Path,
        mut reader: Box<dyn ArtifactReader>,
    ) -> Result<Self::Delivered, Self::Error> {
        let length = reader.seek(SeekFrom::End(0))?;
        let name = artifact.to_string();

        // Multiple ranges fall back to the whole body.
        let single = self.ranges.as_deref().and_then(|specs| match specs {
            [spec] => Some(spec.to_satisfiable_range(length)),
            _ => None,
        });

        match single {
            None => {
                reader.seek(SeekFrom::Start(0))?;
                let mut body = Vec::new();
                reader.read_to_end(&mut body)?;
                Ok(Download::Full {
                    name,
                    body: Bytes::from(body),
                })
            }
            Some(None) => Ok(Download::Unsatisfiable { length }),
            Some(Some((start, end))) => {
                reader.seek(SeekFrom::Start(start))?;
                let mut body = Vec::new();
                reader.take(end - start + 1).read_to_end(&mut body)?;
                Ok(Download::Partial {
                    name,
                    start,
                    end,
                    length,
                    body: Bytes::from(body),
                })
            }
        }
    }
}

/// Stream `artifact` in response to `req`, then remove it.
///
/// A removal failure after the bytes were read is logged and the response
/// is still sent.
///
/// # Errors
/// Read failures surface as internal errors.
pub async fn deliver_over_http(
    req: &HttpRequest,
    artifact: GeneratedArtifact,
) -> ApiResult<HttpResponse> {
    let sink = HttpDownload::from_request(req);
    let trace_id = TraceId::current();
    let Delivered { value, cleanup } =
        web::block(move || TraceId::sync_scope(trace_id, || deliver(artifact, sink)))
            .await?
            .map_err(|err: DeliveryError<io::Error>| {
                DomainError::internal(format!("could not read generated file: {}", err.source))
            })?;
    if let Some(error) = cleanup {
        warn!(%error, "responding although the generated file is still on disk");
    }
    Ok(value.into_response())
}
