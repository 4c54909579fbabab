use std::sync::Arc;

use engine::{Bitmap, PointPx, RectPx};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Cue {
    Place,
    SolveLevel,
    CompleteGame,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AckKind {
    Advance,
    Expired,
    Completed,
}

/// What the session tells the screen hosting it. Dismissal of an
/// acknowledgment comes back through `PuzzleSession::on_acknowledged`.
pub(crate) trait Presenter {
    /// `None` asks for the whole frame.
    fn request_redraw(&mut self, region: Option<RectPx>);
    fn play_cue(&mut self, cue: Cue);
    fn show_acknowledgment(&mut self, kind: AckKind);
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct TileView<'a> {
    pub(crate) bitmap: &'a Arc<Bitmap>,
    pub(crate) position: PointPx,
    pub(crate) size: (u32, u32),
}

#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingPresenter {
    pub(crate) redraws: Vec<Option<RectPx>>,
    pub(crate) cues: Vec<Cue>,
    pub(crate) acks: Vec<AckKind>,
}

#[cfg(test)]
impl Presenter for RecordingPresenter {
    fn request_redraw(&mut self, region: Option<RectPx>) {
        self.redraws.push(region);
    }

    fn play_cue(&mut self, cue: Cue) {
        self.cues.push(cue);
    }

    fn show_acknowledgment(&mut self, kind: AckKind) {
        self.acks.push(kind);
    }
}
