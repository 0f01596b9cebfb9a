use crate::draw::messages::{SurfaceEvent, SurfaceMessage};
use crate::draw::surface::DrawingSurface;
use crate::draw::upload::{self, UploadCompletion, UploadOutcome};
use anyhow::Result;
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};

/// Event-loop side of the surface. Messages and finished uploads are applied
/// one per turn, in arrival order, on the thread calling [`pump`].
///
/// Uploads are never cancelled. With several in flight, each completion is
/// applied as it arrives, so the last one to finish wins.
///
/// [`pump`]: SurfaceController::pump
pub struct SurfaceController {
    surface: DrawingSurface,
    messages_rx: Receiver<SurfaceMessage>,
    completions_tx: Sender<UploadCompletion>,
    completions_rx: Receiver<UploadCompletion>,
    next_ticket: u64,
    in_flight: usize,
    disconnected: bool,
}

impl SurfaceController {
    pub fn new(surface: DrawingSurface, messages_rx: Receiver<SurfaceMessage>) -> Self {
        let (completions_tx, completions_rx) = channel();
        Self {
            surface,
            messages_rx,
            completions_tx,
            completions_rx,
            next_ticket: 0,
            in_flight: 0,
            disconnected: false,
        }
    }

    /// A controller plus the sender the UI posts messages through.
    pub fn with_channel(surface: DrawingSurface) -> (Sender<SurfaceMessage>, Self) {
        let (tx, rx) = channel();
        (tx, Self::new(surface, rx))
    }

    pub fn surface(&self) -> &DrawingSurface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut DrawingSurface {
        &mut self.surface
    }

    pub fn uploads_in_flight(&self) -> usize {
        self.in_flight
    }

    /// Whether every message sender has been dropped.
    pub fn is_disconnected(&self) -> bool {
        self.disconnected
    }

    /// Applies a single message now, queueing `UploadFile` decodes on a
    /// worker thread instead of blocking.
    pub fn handle(&mut self, message: SurfaceMessage) -> Result<SurfaceEvent> {
        match message {
            SurfaceMessage::UploadFile(path) => {
                self.next_ticket += 1;
                let ticket = self.next_ticket;
                upload::spawn_decode(ticket, path.clone(), self.completions_tx.clone())?;
                self.in_flight += 1;
                tracing::debug!(ticket, path = %path.display(), "upload queued");
                Ok(SurfaceEvent::UploadQueued { ticket, path })
            }
            other => self.surface.dispatch(other),
        }
    }

    /// Drains pending messages, then finished uploads. Each produces one
    /// event; a failing message is reported as [`SurfaceEvent::Failed`].
    pub fn pump(&mut self) -> Vec<SurfaceEvent> {
        let mut events = Vec::new();
        loop {
            match self.messages_rx.try_recv() {
                Ok(message) => match self.handle(message) {
                    Ok(event) => events.push(event),
                    Err(err) => {
                        tracing::error!(error = %format!("{err:#}"), "surface message failed");
                        events.push(SurfaceEvent::Failed(format!("{err:#}")));
                    }
                },
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.disconnected = true;
                    break;
                }
            }
        }
        while let Ok(completion) = self.completions_rx.try_recv() {
            events.push(self.apply_completion(completion));
        }
        events
    }

    /// Blocks until every queued upload has completed and been applied.
    pub fn wait_for_uploads(&mut self) -> Vec<SurfaceEvent> {
        let mut events = Vec::new();
        while self.in_flight > 0 {
            match self.completions_rx.recv() {
                Ok(completion) => events.push(self.apply_completion(completion)),
                Err(_) => break,
            }
        }
        events
    }

    fn apply_completion(&mut self, completion: UploadCompletion) -> SurfaceEvent {
        self.in_flight = self.in_flight.saturating_sub(1);
        let outcome = match completion.decoded {
            Ok(decoded) => self.surface.apply_decoded(&decoded),
            Err(err) => {
                tracing::warn!(
                    ticket = completion.ticket,
                    error = %format!("{err:#}"),
                    "ignoring undecodable upload"
                );
                UploadOutcome::DecodeFailed
            }
        };
        SurfaceEvent::Upload(outcome)
    }
}
