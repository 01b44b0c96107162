//! Asynchronous loading of custom shape images.
//!
//! Reads run on a Tokio runtime while rendering stays on the caller's thread:
//! the loader hands out an [`ImageTicket`] per request and later yields an
//! [`ImageCompletion`] carrying the raw file bytes. Decoding into a Cairo
//! surface happens on the rendering side because Cairo surfaces are not `Send`.
//!
//! Every request is stamped with the generation it was issued in. Advancing
//! the generation aborts outstanding reads, and completions of older
//! generations are never delivered.

use super::error::ImageError;
use log::debug;
use std::io::Cursor;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Identifies one image request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageTicket {
    pub generation: u64,
    pub id: u64,
    pub key: String,
}

/// Result of an image request, delivered back to the rendering thread.
#[derive(Debug)]
pub struct ImageCompletion {
    pub ticket: ImageTicket,
    pub result: Result<Vec<u8>, ImageError>,
}

/// Background reader for images stored under a fixed directory.
pub struct ImageLoader {
    runtime: Handle,
    directory: PathBuf,
    generation: Arc<AtomicU64>,
    next_id: u64,
    in_flight: Vec<JoinHandle<()>>,
    completion_tx: mpsc::UnboundedSender<ImageCompletion>,
    completion_rx: mpsc::UnboundedReceiver<ImageCompletion>,
}

impl ImageLoader {
    /// Creates a loader resolving keys against `directory`.
    ///
    /// # Arguments
    /// * `runtime` - Tokio runtime handle for spawning reads
    /// * `directory` - Directory holding the custom shape images
    pub fn new(runtime: &Handle, directory: impl Into<PathBuf>) -> Self {
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        Self {
            runtime: runtime.clone(),
            directory: directory.into(),
            generation: Arc::new(AtomicU64::new(0)),
            next_id: 0,
            in_flight: Vec::new(),
            completion_tx,
            completion_rx,
        }
    }

    /// The generation new requests are stamped with.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Starts a new generation, aborting every outstanding read.
    ///
    /// Completions from earlier generations that are already queued are
    /// skipped by [`try_next`](Self::try_next) and [`wait_next`](Self::wait_next).
    pub fn advance_generation(&mut self) -> u64 {
        for task in self.in_flight.drain(..) {
            task.abort();
        }
        self.generation.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Returns true if `ticket` belongs to the current generation.
    pub fn is_current(&self, ticket: &ImageTicket) -> bool {
        ticket.generation == self.generation()
    }

    /// Queues a read of `key` and returns immediately.
    pub fn request(&mut self, key: &str) -> ImageTicket {
        self.next_id += 1;
        let ticket = ImageTicket {
            generation: self.generation(),
            id: self.next_id,
            key: key.to_string(),
        };

        self.in_flight.retain(|task| !task.is_finished());

        let generation = self.generation.clone();
        let directory = self.directory.clone();
        let tx = self.completion_tx.clone();
        let request = ticket.clone();

        let task = self.runtime.spawn(async move {
            if generation.load(Ordering::Acquire) != request.generation {
                debug!("Dropping stale image request '{}'", request.key);
                return;
            }

            let result = read_image(&directory, &request.key).await;

            if generation.load(Ordering::Acquire) != request.generation {
                debug!("Discarding stale image '{}'", request.key);
                return;
            }
            let _ = tx.send(ImageCompletion {
                ticket: request,
                result,
            });
        });
        self.in_flight.push(task);

        ticket
    }

    /// Returns a finished completion of the current generation without waiting.
    pub fn try_next(&mut self) -> Option<ImageCompletion> {
        while let Ok(done) = self.completion_rx.try_recv() {
            if self.is_current(&done.ticket) {
                return Some(done);
            }
            debug!("Skipping stale image '{}'", done.ticket.key);
        }
        None
    }

    /// Blocks until a completion of the current generation arrives.
    ///
    /// Only call this while a current request is outstanding; the loader keeps
    /// its own sender alive, so the wait never ends otherwise. Must not be
    /// called from within the loader's runtime.
    pub fn wait_next(&mut self) -> Option<ImageCompletion> {
        while let Some(done) = self.completion_rx.blocking_recv() {
            if self.is_current(&done.ticket) {
                return Some(done);
            }
            debug!("Skipping stale image '{}'", done.ticket.key);
        }
        None
    }
}

/// Resolves `key` to a file under `directory`.
///
/// Keys must be relative paths made only of normal components, so a record
/// cannot reach outside the image directory.
pub fn resolve_image_path(directory: &Path, key: &str) -> Result<PathBuf, ImageError> {
    let relative = Path::new(key);
    let well_formed = !key.is_empty()
        && relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
    if !well_formed {
        return Err(ImageError::InvalidKey(key.to_string()));
    }
    Ok(directory.join(relative))
}

async fn read_image(directory: &Path, key: &str) -> Result<Vec<u8>, ImageError> {
    let path = resolve_image_path(directory, key)?;
    tokio::fs::read(&path)
        .await
        .map_err(|source| ImageError::Read { path, source })
}

/// Decodes PNG bytes into a Cairo image surface.
pub fn decode_png(bytes: &[u8]) -> Result<cairo::ImageSurface, ImageError> {
    let surface = cairo::ImageSurface::create_from_png(&mut Cursor::new(bytes))?;
    if surface.width() <= 0 || surface.height() <= 0 {
        return Err(ImageError::Empty);
    }
    Ok(surface)
}
