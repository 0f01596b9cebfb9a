pub mod controller;
pub mod input;
pub mod messages;
pub mod model;
pub mod render;
pub mod save;
pub mod state;
pub mod surface;
pub mod upload;

pub use controller::SurfaceController;
pub use messages::{SurfaceEvent, SurfaceMessage};
pub use model::{Color, Point, PointSequence, StrokeStyle};
pub use render::RenderMode;
pub use surface::DrawingSurface;
pub use upload::UploadOutcome;
