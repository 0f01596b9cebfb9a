use crate::draw::model::{Point, PointSequence};
use crate::draw::state::DrawingState;

/// Point-capture protocol: the drawing flags plus the captured sequence.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TraceInput {
    state: DrawingState,
    points: PointSequence,
}

impl TraceInput {
    pub fn state(&self) -> DrawingState {
        self.state
    }

    pub fn points(&self) -> &PointSequence {
        &self.points
    }

    pub fn enable_drawing(&mut self) {
        self.state.enable();
        tracing::debug!("drawing enabled");
    }

    pub fn disable_drawing(&mut self) {
        self.state.disable();
        tracing::debug!(still_tracing = self.state.is_tracing(), "drawing disabled");
    }

    /// Returns `true` when `point` was appended.
    pub fn handle_press(&mut self, point: Point) -> bool {
        if !self.state.press() {
            return false;
        }
        self.points.push(point);
        true
    }

    /// Returns `true` when `point` was appended. Gated on the tracing flag
    /// only, so a trace outlives `disable_drawing`.
    pub fn handle_move(&mut self, point: Point) -> bool {
        if !self.state.accepts_move() {
            return false;
        }
        self.points.push(point);
        true
    }

    pub fn handle_release(&mut self) {
        self.state.release();
    }

    pub fn clear_points(&mut self) {
        self.points.clear();
    }
}
