use std::sync::Arc;

use engine::{Bitmap, IntervalTimer, PointPx};
use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::app::config::PuzzleConfig;

use super::drag::{snap_slot, DragState};
use super::layout::{build_layout, BoardGeometry, Layout};
use super::levels::{LevelTable, LevelTableError};
use super::presenter::{AckKind, Cue, Presenter, TileView};

const TICK_INTERVAL_SECONDS: f32 = 1.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SessionRules {
    pub(crate) levels: LevelTable,
    pub(crate) snap_tolerance: i32,
    pub(crate) countdown_base_seconds: u32,
    pub(crate) countdown_per_level_seconds: u32,
    pub(crate) score_per_level: u32,
}

impl SessionRules {
    pub(crate) fn from_config(config: &PuzzleConfig) -> Result<Self, LevelTableError> {
        Ok(Self {
            levels: config.level_table()?,
            snap_tolerance: config.snap_tolerance_px,
            countdown_base_seconds: config.countdown_base_seconds,
            countdown_per_level_seconds: config.countdown_per_level_seconds,
            score_per_level: config.score_per_level,
        })
    }

    pub(crate) fn countdown_for(&self, level: u32) -> u32 {
        self.countdown_base_seconds
            .saturating_add(level.saturating_mul(self.countdown_per_level_seconds))
    }
}

/// Where control goes after a session event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SessionCommand {
    Continue,
    ReturnToMenu,
}

/// One play-through on one picture: level, tiles, countdown and high score.
///
/// While an acknowledgment is pending tile input is ignored. The countdown
/// keeps ticking through the advance acknowledgment and stops only on expiry,
/// on completion, or when leaving for the menu.
#[derive(Debug)]
pub(crate) struct PuzzleSession {
    image_id: String,
    image: Arc<Bitmap>,
    rules: SessionRules,
    geometry: BoardGeometry,
    rng: StdRng,
    level: u32,
    layout: Layout,
    drag: Option<DragState>,
    time_left: u32,
    high_score: u32,
    clock: IntervalTimer,
    pending_ack: Option<AckKind>,
}

impl PuzzleSession {
    pub(crate) fn start(
        image_id: impl Into<String>,
        image: Arc<Bitmap>,
        rules: SessionRules,
        geometry: BoardGeometry,
        high_score: u32,
        mut rng: StdRng,
        presenter: &mut dyn Presenter,
    ) -> Self {
        let level = 1;
        let side = rules.levels.grid_side(level).unwrap_or(1);
        let layout = build_layout(side, &image, &geometry, &mut rng);
        let mut clock = IntervalTimer::new(TICK_INTERVAL_SECONDS);
        clock.start();
        let session = Self {
            image_id: image_id.into(),
            time_left: rules.countdown_for(level),
            image,
            rules,
            geometry,
            rng,
            level,
            layout,
            drag: None,
            high_score,
            clock,
            pending_ack: None,
        };
        info!(
            image = session.image_id.as_str(),
            level,
            tiles = session.layout.tiles().len(),
            time_left = session.time_left,
            "session_started"
        );
        presenter.request_redraw(None);
        session
    }

    pub(crate) fn level(&self) -> u32 {
        self.level
    }

    /// Level shown to the player. Stays on the last level once the game is
    /// complete.
    pub(crate) fn displayed_level(&self) -> u32 {
        self.level.min(self.last_level())
    }

    pub(crate) fn last_level(&self) -> u32 {
        self.rules.levels.last_level()
    }

    pub(crate) fn time_left(&self) -> u32 {
        self.time_left
    }

    pub(crate) fn high_score(&self) -> u32 {
        self.high_score
    }

    pub(crate) fn pending_ack(&self) -> Option<AckKind> {
        self.pending_ack
    }

    pub(crate) fn dragged_tile(&self) -> Option<usize> {
        self.drag.map(|drag| drag.tile)
    }

    pub(crate) fn is_clock_running(&self) -> bool {
        self.clock.is_running()
    }

    pub(crate) fn geometry(&self) -> &BoardGeometry {
        &self.geometry
    }

    pub(crate) fn layout(&self) -> &Layout {
        &self.layout
    }

    pub(crate) fn tile_at(&self, point: PointPx) -> Option<usize> {
        self.layout.tile_at(point)
    }

    /// Tiles bottom to top.
    pub(crate) fn tile_views(&self) -> impl Iterator<Item = TileView<'_>> + '_ {
        self.layout.tiles_in_draw_order().map(|tile| TileView {
            bitmap: &tile.bitmap,
            position: tile.position,
            size: tile.size(),
        })
    }

    pub(crate) fn on_press(
        &mut self,
        tile: usize,
        pointer: PointPx,
        presenter: &mut dyn Presenter,
    ) -> bool {
        if self.pending_ack.is_some() {
            return false;
        }
        let Some(pressed) = self.layout.tile(tile) else {
            return false;
        };
        let drag = DragState::begin(pressed, pointer);
        let bounds = pressed.bounds();
        self.layout.raise_to_top(tile);
        self.drag = Some(drag);
        presenter.request_redraw(Some(bounds));
        true
    }

    pub(crate) fn on_drag(&mut self, tile: usize, pointer: PointPx, presenter: &mut dyn Presenter) {
        let Some(drag) = self.drag.as_mut().filter(|drag| drag.tile == tile) else {
            return;
        };
        let Some(dragged) = self.layout.tile_mut(tile) else {
            return;
        };
        let dirty = drag.follow(dragged, pointer);
        presenter.request_redraw(Some(dirty));
    }

    pub(crate) fn on_release(
        &mut self,
        tile: usize,
        presenter: &mut dyn Presenter,
    ) -> SessionCommand {
        if self.drag.map(|drag| drag.tile) != Some(tile) {
            return SessionCommand::Continue;
        }
        self.drag = None;

        let Some(released) = self.layout.tile(tile) else {
            return SessionCommand::Continue;
        };
        let before = released.bounds();
        let slot = snap_slot(
            released.position,
            self.layout.correct_positions(),
            self.rules.snap_tolerance,
        );

        let Some(released) = self.layout.tile_mut(tile) else {
            return SessionCommand::Continue;
        };
        match slot {
            Some((slot_index, slot_position)) => {
                released.position = slot_position;
                debug!(tile, slot = slot_index, "tile_snapped");
                presenter.play_cue(Cue::Place);
            }
            None => {
                released.position = released.initial;
                debug!(tile, "tile_returned");
            }
        }
        presenter.request_redraw(Some(before.union(&released.bounds())));

        self.check_win(presenter);
        SessionCommand::Continue
    }

    /// Feeds frame time into the one-second countdown tick.
    pub(crate) fn advance_clock(&mut self, dt_seconds: f32, presenter: &mut dyn Presenter) {
        for _ in 0..self.clock.advance(dt_seconds) {
            self.on_tick(presenter);
        }
    }

    /// One second elapsed.
    pub(crate) fn on_tick(&mut self, presenter: &mut dyn Presenter) {
        if !self.clock.is_running() {
            return;
        }
        self.time_left = self.time_left.saturating_sub(1);
        if self.time_left > 0 {
            return;
        }

        self.clock.stop();
        if let Some(replaced) = self.pending_ack {
            debug!(?replaced, "acknowledgment_replaced");
        }
        info!(level = self.level, "time_expired");
        self.show_ack(AckKind::Expired, presenter);
        self.enter_level(1);
        presenter.request_redraw(None);
    }

    pub(crate) fn on_reset_requested(&mut self, presenter: &mut dyn Presenter) {
        if self.pending_ack.is_some() {
            return;
        }
        info!(level = self.level, "level_reset");
        self.enter_level(self.level);
        presenter.request_redraw(None);
    }

    pub(crate) fn on_main_menu_requested(&mut self) -> SessionCommand {
        self.clock.stop();
        self.drag = None;
        info!(level = self.level, high_score = self.high_score, "main_menu_requested");
        SessionCommand::ReturnToMenu
    }

    pub(crate) fn on_hint_requested(&self, presenter: &mut dyn Presenter) -> Arc<Bitmap> {
        debug!(image = self.image_id.as_str(), "hint_requested");
        presenter.request_redraw(None);
        Arc::clone(&self.image)
    }

    /// The player dismissed the pending acknowledgment.
    pub(crate) fn on_acknowledged(&mut self, presenter: &mut dyn Presenter) -> SessionCommand {
        let Some(kind) = self.pending_ack.take() else {
            return SessionCommand::Continue;
        };
        presenter.request_redraw(None);
        match kind {
            AckKind::Completed => SessionCommand::ReturnToMenu,
            AckKind::Advance => SessionCommand::Continue,
            AckKind::Expired => {
                self.clock.restart();
                SessionCommand::Continue
            }
        }
    }

    fn check_win(&mut self, presenter: &mut dyn Presenter) {
        if !self.layout.is_solved() {
            return;
        }
        presenter.play_cue(Cue::SolveLevel);
        let solved_level = self.level;
        self.high_score = self
            .high_score
            .max(solved_level.saturating_mul(self.rules.score_per_level));
        self.level += 1;
        info!(level = solved_level, high_score = self.high_score, "level_solved");

        if self.rules.levels.is_past_last(self.level) {
            self.clock.stop();
            presenter.play_cue(Cue::CompleteGame);
            info!(high_score = self.high_score, "game_completed");
            self.show_ack(AckKind::Completed, presenter);
            presenter.request_redraw(None);
            return;
        }

        self.enter_level(self.level);
        self.show_ack(AckKind::Advance, presenter);
        presenter.request_redraw(None);
    }

    fn show_ack(&mut self, kind: AckKind, presenter: &mut dyn Presenter) {
        self.drag = None;
        self.pending_ack = Some(kind);
        presenter.show_acknowledgment(kind);
    }

    fn enter_level(&mut self, level: u32) {
        self.level = level;
        self.drag = None;
        self.time_left = self.rules.countdown_for(level);
        let side = self.rules.levels.grid_side(level).unwrap_or(1);
        self.layout = build_layout(side, &self.image, &self.geometry, &mut self.rng);
        debug!(
            level,
            tiles = self.layout.tiles().len(),
            time_left = self.time_left,
            "layout_built"
        );
    }
}
