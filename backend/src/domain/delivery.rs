//! Stream-then-delete delivery of generated artifacts.

use std::path::Path;

use tracing::{error, info};

use crate::domain::ports::ArtifactStoreError;
use crate::domain::{ArtifactName, ArtifactReader, GeneratedArtifact};

/// Destination that consumes an artifact's bytes.
pub trait ArtifactSink {
    /// Value produced by a successful transmission.
    type Delivered;
    /// Transmission failure.
    type Error: std::error::Error + 'static;

    /// Send the artifact. The reader is closed when this returns.
    fn transmit(
        self,
        name: &ArtifactName,
        path: &Path,
        reader: Box<dyn ArtifactReader>,
    ) -> Result<Self::Delivered, Self::Error>;
}

/// Transmission that reached the sink.
///
/// A removal failure after a successful transmission does not undo the
/// delivery; it is reported next to the delivered value.
#[derive(Debug)]
pub struct Delivered<T> {
    /// Value produced by the sink.
    pub value: T,
    /// Removal error observed after the transmission.
    pub cleanup: Option<ArtifactStoreError>,
}

/// The sink failed. Any cleanup failure is kept alongside.
#[derive(Debug, thiserror::Error)]
#[error("artifact transmission failed: {source}")]
pub struct DeliveryError<E: std::error::Error + 'static> {
    /// Sink error.
    #[source]
    pub source: E,
    /// Removal error observed after the transmission failure.
    pub cleanup: Option<ArtifactStoreError>,
}

/// Transmit `artifact` through `sink`, then remove it from its store.
///
/// Removal runs whether or not the transmission succeeded. A transmission
/// error always takes precedence over a removal error, and a removal error
/// never discards a successful transmission.
///
/// # Errors
/// Returns [`DeliveryError`] when the sink fails.
pub fn deliver<S: ArtifactSink>(
    artifact: GeneratedArtifact,
    sink: S,
) -> Result<Delivered<S::Delivered>, DeliveryError<S::Error>> {
    let GeneratedArtifact {
        name,
        path,
        reader,
        lease,
    } = artifact;

    let transmitted = sink.transmit(&name, &path, reader);
    let cleanup = lease.release().err();
    if let Some(error) = &cleanup {
        error!(artifact = %name, %error, "generated artifact was not removed");
    }

    match transmitted {
        Ok(value) => {
            info!(artifact = %name, "artifact delivered");
            Ok(Delivered { value, cleanup })
        }
        Err(source) => Err(DeliveryError { source, cleanup }),
    }
}
