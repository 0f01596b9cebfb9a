use crate::draw::model::Point;
use crate::draw::save::ExportedImage;
use crate::draw::upload::UploadOutcome;
use std::path::PathBuf;

/// One UI trigger, applied to the surface as a single atomic turn.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceMessage {
    Press(Point),
    Move(Point),
    Release,
    Enable,
    Disable,
    Clear,
    Export,
    /// Raw file contents; `None` when the picker closed without a file.
    Upload(Option<Vec<u8>>),
    /// Read and decode off the event loop, then apply on completion.
    UploadFile(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    /// The message changed state (or nothing); no further report.
    Applied,
    PointCaptured(Point),
    Cleared,
    Exported(ExportedImage),
    /// Export requested while no bitmap exists.
    ExportSkipped,
    Upload(UploadOutcome),
    UploadQueued { ticket: u64, path: PathBuf },
    /// The message could not be applied; later messages still run.
    Failed(String),
}
