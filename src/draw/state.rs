/// The two independent flags driving point capture.
///
/// `is_tracing` can only become true through [`DrawingState::press`] while
/// drawing is enabled, and only becomes false through
/// [`DrawingState::release`]. Disabling drawing leaves an in-progress trace
/// running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrawingState {
    drawing_enabled: bool,
    is_tracing: bool,
}

impl DrawingState {
    pub fn drawing_enabled(self) -> bool {
        self.drawing_enabled
    }

    pub fn is_tracing(self) -> bool {
        self.is_tracing
    }

    pub fn enable(&mut self) {
        self.drawing_enabled = true;
    }

    pub fn disable(&mut self) {
        self.drawing_enabled = false;
    }

    /// Returns whether the press started (or continued) a trace.
    pub fn press(&mut self) -> bool {
        if !self.drawing_enabled {
            return false;
        }
        self.is_tracing = true;
        true
    }

    pub fn accepts_move(self) -> bool {
        self.is_tracing
    }

    pub fn release(&mut self) {
        self.is_tracing = false;
    }
}
