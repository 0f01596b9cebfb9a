use anyhow::{anyhow, Context, Result};
use image::imageops::FilterType;
use image::RgbaImage;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::thread::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    Applied,
    NoFile,
    DecodeFailed,
    /// The surface has no bitmap to draw into.
    Unavailable,
}

/// Result of an off-loop file read and decode, queued back to the event loop.
#[derive(Debug)]
pub struct UploadCompletion {
    pub ticket: u64,
    pub path: PathBuf,
    pub decoded: Result<RgbaImage>,
}

pub fn decode_image(bytes: &[u8]) -> Result<RgbaImage> {
    let decoded = image::load_from_memory(bytes).context("decode uploaded image")?;
    Ok(decoded.to_rgba8())
}

/// Stretches `img` to exactly `width` x `height`, ignoring aspect ratio.
pub fn stretch_to_surface(img: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    if img.dimensions() == (width, height) {
        return img.clone();
    }
    image::imageops::resize(img, width, height, FilterType::Triangle)
}

pub fn read_and_decode(path: &Path) -> Result<RgbaImage> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("read uploaded image {}", path.display()))?;
    decode_image(&bytes).with_context(|| format!("decode {}", path.display()))
}

/// Reads and decodes `path` on a worker thread. The completion is sent to
/// `completions`; a dropped receiver discards it.
pub fn spawn_decode(
    ticket: u64,
    path: PathBuf,
    completions: Sender<UploadCompletion>,
) -> Result<JoinHandle<()>> {
    spawn_decode_with(ticket, path, completions, read_and_decode)
}

/// Like [`spawn_decode`] with a custom decoder. Exactly one completion is
/// sent per worker; a panicking decoder completes with an error.
pub fn spawn_decode_with<F>(
    ticket: u64,
    path: PathBuf,
    completions: Sender<UploadCompletion>,
    decode: F,
) -> Result<JoinHandle<()>>
where
    F: FnOnce(&Path) -> Result<RgbaImage> + Send + 'static,
{
    std::thread::Builder::new()
        .name(format!("upload-decode-{ticket}"))
        .spawn(move || {
            let decoded = match panic::catch_unwind(AssertUnwindSafe(|| decode(&path))) {
                Ok(decoded) => decoded,
                Err(payload) => {
                    let message = if let Some(message) = payload.downcast_ref::<&str>() {
                        (*message).to_string()
                    } else if let Some(message) = payload.downcast_ref::<String>() {
                        message.clone()
                    } else {
                        "unknown panic payload".to_string()
                    };
                    tracing::error!(ticket, panic = %message, "upload decoder panicked");
                    Err(anyhow!("decoder panicked: {message}"))
                }
            };
            let _ = completions.send(UploadCompletion {
                ticket,
                path,
                decoded,
            });
        })
        .context("spawn upload decode thread")
}
