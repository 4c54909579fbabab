use std::sync::Arc;

use engine::{
    Bitmap, ButtonId, FrameLabel, FrameOutline, InputAction, InputSnapshot, Modal, PointPx,
    RectPx, SceneWorld, Sprite, UiButton,
};
use tracing::debug;

use super::WorldPresenter;
use crate::app::catalog::ChromeAssets;
use crate::app::puzzle::{AckKind, BoardGeometry, Presenter, PuzzleSession, SessionCommand};

const RESET_BUTTON: ButtonId = ButtonId("reset");
const MENU_BUTTON: ButtonId = ButtonId("main_menu");
const HINT_BUTTON: ButtonId = ButtonId("hint");
const ACK_BUTTON: ButtonId = ButtonId("acknowledge");
const CLOSE_HINT_BUTTON: ButtonId = ButtonId("close_hint");

const BUTTON_WIDTH: u32 = 150;
const BUTTON_HEIGHT: u32 = 30;
const BUTTON_GAP_PX: i32 = 20;
const BUTTON_BOTTOM_MARGIN_PX: i32 = 40;

const HUD_HEIGHT_PX: u32 = 60;
const HUD_MARGIN_PX: i32 = 20;
const HUD_SCALE: i32 = 3;
const PIECES_TITLE: &str = "The Pieces";

const TEXT_COLOR: [u8; 4] = [244, 246, 250, 255];
const GRID_COLOR: [u8; 4] = [200, 200, 210, 160];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HudValues {
    time_left: u32,
    high_score: u32,
    level: u32,
}

/// The play screen: hosts one `PuzzleSession` and turns pointer, key and
/// button input into session calls.
pub(super) struct BoardScreen {
    session: PuzzleSession,
    hint: Option<Arc<Bitmap>>,
    hovered_button: Option<ButtonId>,
    hud: HudValues,
}

impl BoardScreen {
    pub(super) fn new(session: PuzzleSession) -> Self {
        let hud = hud_values(&session);
        Self {
            session,
            hint: None,
            hovered_button: None,
            hud,
        }
    }

    pub(super) fn level(&self) -> u32 {
        self.session.displayed_level()
    }

    pub(super) fn high_score(&self) -> u32 {
        self.session.high_score()
    }

    pub(super) fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SessionCommand {
        let pointer = input.cursor_position_px();
        let under_pointer = pointer.and_then(|point| world.button_at(point));
        if under_pointer != self.hovered_button {
            self.hovered_button = under_pointer;
            world.mark_dirty(None);
        }
        let clicked = under_pointer.filter(|_| input.left_click_pressed());

        let command = self.handle_input(input, pointer, clicked, world);
        if command == SessionCommand::ReturnToMenu {
            return command;
        }

        self.session
            .advance_clock(fixed_dt_seconds, &mut WorldPresenter::new(world));
        if self.session.pending_ack().is_some() && self.hint.take().is_some() {
            world.mark_dirty(None);
        }

        let hud = hud_values(&self.session);
        if hud != self.hud {
            self.hud = hud;
            let region = self.hud_rect(world);
            world.mark_dirty(Some(region));
        }
        SessionCommand::Continue
    }

    fn handle_input(
        &mut self,
        input: &InputSnapshot,
        pointer: Option<PointPx>,
        clicked: Option<ButtonId>,
        world: &mut SceneWorld,
    ) -> SessionCommand {
        let confirm = input.action_pressed(InputAction::Confirm);
        let mut presenter = WorldPresenter::new(world);

        if self.session.pending_ack().is_some() {
            if confirm || clicked == Some(ACK_BUTTON) {
                return self.session.on_acknowledged(&mut presenter);
            }
            return SessionCommand::Continue;
        }

        if self.hint.is_some() {
            if confirm || clicked == Some(CLOSE_HINT_BUTTON) {
                debug!("hint_closed");
                self.hint = None;
                presenter.request_redraw(None);
            }
            return SessionCommand::Continue;
        }

        if clicked == Some(MENU_BUTTON) || input.action_pressed(InputAction::MainMenu) {
            return self.session.on_main_menu_requested();
        }
        if clicked == Some(RESET_BUTTON) || input.action_pressed(InputAction::Reset) {
            self.session.on_reset_requested(&mut presenter);
            return SessionCommand::Continue;
        }
        if clicked == Some(HINT_BUTTON) || input.action_pressed(InputAction::Hint) {
            self.hint = Some(self.session.on_hint_requested(&mut presenter));
            return SessionCommand::Continue;
        }

        self.handle_pointer(input, pointer, clicked.is_some(), &mut presenter)
    }

    fn handle_pointer(
        &mut self,
        input: &InputSnapshot,
        pointer: Option<PointPx>,
        over_button: bool,
        presenter: &mut WorldPresenter<'_>,
    ) -> SessionCommand {
        if let Some(tile) = self.session.dragged_tile() {
            if let Some(point) = pointer {
                self.session.on_drag(tile, point, presenter);
            }
            if input.left_click_released() || !input.left_mouse_down() {
                return self.session.on_release(tile, presenter);
            }
            return SessionCommand::Continue;
        }

        if input.left_click_pressed() && !over_button {
            if let Some(point) = pointer {
                if let Some(tile) = self.session.tile_at(point) {
                    self.session.on_press(tile, point, presenter);
                    if input.left_click_released() {
                        return self.session.on_release(tile, presenter);
                    }
                }
            }
        }
        SessionCommand::Continue
    }

    fn hud_rect(&self, world: &SceneWorld) -> RectPx {
        let width = world
            .labels()
            .iter()
            .map(|label| label.position.x + label.width_px())
            .max()
            .unwrap_or(0)
            .max(0) as u32;
        RectPx::new(0, 0, width + HUD_MARGIN_PX as u32, HUD_HEIGHT_PX)
    }

    pub(super) fn draw(&self, world: &mut SceneWorld, chrome: &ChromeAssets) {
        let geometry = self.session.geometry();
        let frame = geometry.frame_rect();
        let layout = self.session.layout();
        for tile in layout.tiles() {
            let (width, height) = tile.size();
            world.push_outline(FrameOutline {
                rect: RectPx::at(tile.correct, width, height),
                color: GRID_COLOR,
            });
        }
        if let Some(border) = &chrome.border {
            world.push_sprite(Sprite {
                bitmap: Arc::clone(border),
                position: geometry.border_rect().origin(),
            });
        }
        for view in self.session.tile_views() {
            let (width, height) = view.size;
            if !RectPx::at(view.position, width, height).intersects(&frame) {
                continue;
            }
            world.push_sprite(Sprite {
                bitmap: Arc::clone(view.bitmap),
                position: view.position,
            });
        }

        self.draw_hud(world, geometry);
        for (id, label, rect) in button_rects(geometry) {
            world.push_button(UiButton {
                id,
                rect,
                label: label.to_string(),
                hovered: self.hovered_button == Some(id),
            });
        }

        let modal = match (self.session.pending_ack(), &self.hint) {
            (Some(kind), _) => {
                let (caption, button_label) = ack_text(kind);
                Some(Modal::centered(
                    frame,
                    chrome.illustration(kind),
                    caption,
                    ACK_BUTTON,
                    button_label,
                ))
            }
            (None, Some(image)) => Some(Modal::centered(
                frame,
                Some(Arc::clone(image)),
                "Hint",
                CLOSE_HINT_BUTTON,
                "Close",
            )),
            (None, None) => None,
        };
        world.set_modal(modal.map(|mut modal| {
            modal.button.hovered = self.hovered_button == Some(modal.button.id);
            modal
        }));
    }

    fn draw_hud(&self, world: &mut SceneWorld, geometry: &BoardGeometry) {
        let hud = hud_values(&self.session);
        let mut x = HUD_MARGIN_PX;
        for text in [
            format!("Time left: {}", hud.time_left),
            format!("High Score: {}", hud.high_score),
            format!("Level {}/{}", hud.level, self.session.last_level()),
        ] {
            let label =
                FrameLabel::new(text, PointPx::new(x, HUD_MARGIN_PX), TEXT_COLOR, HUD_SCALE);
            x += label.width_px() + HUD_MARGIN_PX * 2;
            world.push_label(label);
        }

        let scatter = geometry.scatter_origin();
        world.push_label(FrameLabel::new(
            PIECES_TITLE,
            PointPx::new(scatter.x, scatter.y - HUD_MARGIN_PX * 2),
            TEXT_COLOR,
            HUD_SCALE,
        ));
    }
}

fn hud_values(session: &PuzzleSession) -> HudValues {
    HudValues {
        time_left: session.time_left(),
        high_score: session.high_score(),
        level: session.displayed_level(),
    }
}

fn ack_text(kind: AckKind) -> (&'static str, &'static str) {
    match kind {
        AckKind::Advance => ("Level complete!", "Next Level"),
        AckKind::Expired => ("Time's up!", "Try Again"),
        AckKind::Completed => ("You solved every level!", "Main Menu"),
    }
}

/// Reset, Main Menu and Hint, centered along the bottom edge.
fn button_rects(geometry: &BoardGeometry) -> [(ButtonId, &'static str, RectPx); 3] {
    let width = BUTTON_WIDTH as i32;
    let row_width = width * 3 + BUTTON_GAP_PX * 2;
    let left = (geometry.board_width as i32 - row_width) / 2;
    let top = geometry.board_height as i32 - BUTTON_BOTTOM_MARGIN_PX - BUTTON_HEIGHT as i32;
    let rect = |slot: i32| {
        RectPx::new(
            left + slot * (width + BUTTON_GAP_PX),
            top,
            BUTTON_WIDTH,
            BUTTON_HEIGHT,
        )
    };
    [
        (RESET_BUTTON, "Reset", rect(0)),
        (MENU_BUTTON, "Main Menu", rect(1)),
        (HINT_BUTTON, "Hint", rect(2)),
    ]
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::app::config::PuzzleConfig;
    use crate::app::puzzle::SessionRules;

    const DT: f32 = 1.0 / 60.0;

    fn board(world: &mut SceneWorld) -> (BoardScreen, BoardGeometry) {
        board_with(PuzzleConfig::default(), world)
    }

    fn board_with(config: PuzzleConfig, world: &mut SceneWorld) -> (BoardScreen, BoardGeometry) {
        let geometry = BoardGeometry::from_config(&config);
        let session = PuzzleSession::start(
            "1.png",
            Arc::new(Bitmap::filled(400, 400, [10, 200, 90, 255])),
            SessionRules::from_config(&config).expect("rules"),
            geometry,
            0,
            StdRng::seed_from_u64(21),
            &mut WorldPresenter::new(world),
        );
        (BoardScreen::new(session), geometry)
    }

    fn redraw(screen: &BoardScreen, world: &mut SceneWorld) {
        world.begin_frame();
        screen.draw(world, &ChromeAssets::default());
    }

    fn center(rect: RectPx) -> PointPx {
        PointPx::new(rect.x + rect.width as i32 / 2, rect.y + rect.height as i32 / 2)
    }

    fn press_at(point: PointPx) -> InputSnapshot {
        InputSnapshot::empty()
            .with_cursor_position_px(Some(point))
            .with_left_click_pressed(true)
    }

    fn drag_to(point: PointPx) -> InputSnapshot {
        InputSnapshot::empty()
            .with_cursor_position_px(Some(point))
            .with_left_mouse_down(true)
    }

    fn release_at(point: PointPx) -> InputSnapshot {
        InputSnapshot::empty()
            .with_cursor_position_px(Some(point))
            .with_left_click_released(true)
    }

    fn move_tile(
        screen: &mut BoardScreen,
        world: &mut SceneWorld,
        tile: usize,
        target: PointPx,
    ) {
        let from = screen.session.layout().tile(tile).expect("tile").position;
        screen.update(DT, &press_at(from), world);
        screen.update(DT, &drag_to(target), world);
        screen.update(DT, &release_at(target), world);
    }

    #[test]
    fn draw_lists_grid_tiles_hud_and_buttons() {
        let mut world = SceneWorld::default();
        let (screen, _geometry) = board(&mut world);
        redraw(&screen, &mut world);

        assert_eq!(world.outlines().len(), 4);
        assert_eq!(world.sprites().len(), 4);
        assert_eq!(world.buttons().len(), 3);
        let texts: Vec<_> = world.labels().iter().map(|label| label.text.as_str()).collect();
        assert!(texts.contains(&"Time left: 80"));
        assert!(texts.contains(&"High Score: 0"));
        assert!(texts.contains(&"Level 1/4"));
        assert!(texts.contains(&"The Pieces"));
        assert!(world.modal().is_none());
    }

    #[test]
    fn dragging_a_tile_to_its_slot_snaps_and_queues_a_cue() {
        let mut world = SceneWorld::default();
        let (mut screen, _geometry) = board(&mut world);
        let slot = screen.session.layout().tile(2).expect("tile").correct;

        move_tile(&mut screen, &mut world, 2, slot.offset(5, -5));

        assert_eq!(screen.session.layout().tile(2).expect("tile").position, slot);
        assert_eq!(world.drain_sounds().count(), 1);
        assert_eq!(screen.session.dragged_tile(), None);
    }

    #[test]
    fn countdown_changes_mark_the_hud_dirty() {
        let mut world = SceneWorld::default();
        let (mut screen, _geometry) = board(&mut world);
        redraw(&screen, &mut world);
        world.take_dirty();

        for _ in 0..61 {
            screen.update(DT, &InputSnapshot::empty(), &mut world);
        }

        assert_eq!(screen.session.time_left(), 79);
        assert!(world.is_dirty());
    }

    #[test]
    fn reset_button_rebuilds_the_level() {
        let mut world = SceneWorld::default();
        let (mut screen, geometry) = board(&mut world);
        let slot = screen.session.layout().tile(0).expect("tile").correct;
        move_tile(&mut screen, &mut world, 0, slot);
        redraw(&screen, &mut world);

        let (_, _, reset) = button_rects(&geometry)[0];
        screen.update(DT, &press_at(center(reset)), &mut world);

        assert!(screen
            .session
            .layout()
            .tiles()
            .iter()
            .all(|tile| tile.position == tile.initial));
    }

    #[test]
    fn hint_opens_and_confirm_closes_it() {
        let mut world = SceneWorld::default();
        let (mut screen, _geometry) = board(&mut world);

        let input = InputSnapshot::empty().with_action_pressed(InputAction::Hint);
        screen.update(DT, &input, &mut world);
        redraw(&screen, &mut world);
        let modal = world.modal().expect("hint modal");
        assert_eq!(modal.caption.text, "Hint");
        assert_eq!(modal.button.id, CLOSE_HINT_BUTTON);

        let input = InputSnapshot::empty().with_action_pressed(InputAction::Confirm);
        screen.update(DT, &input, &mut world);
        redraw(&screen, &mut world);
        assert!(world.modal().is_none());
    }

    #[test]
    fn solving_shows_the_advance_modal_until_dismissed() {
        let mut world = SceneWorld::default();
        let (mut screen, _geometry) = board(&mut world);
        let slots: Vec<_> = screen.session.layout().correct_positions().collect();
        for (tile, slot) in slots.into_iter().enumerate() {
            move_tile(&mut screen, &mut world, tile, slot);
        }
        redraw(&screen, &mut world);

        let modal = world.modal().expect("advance modal");
        assert_eq!(modal.caption.text, "Level complete!");
        assert_eq!(modal.button.label, "Next Level");
        let next = center(modal.button.rect);

        screen.update(DT, &press_at(next), &mut world);

        assert_eq!(screen.level(), 2);
        assert!(screen.session.pending_ack().is_none());
        assert!(screen.session.is_clock_running());
    }

    #[test]
    fn completed_game_keeps_showing_the_last_level() {
        let config = PuzzleConfig {
            level_tile_counts: vec![4],
            ..PuzzleConfig::default()
        };
        let mut world = SceneWorld::default();
        let (mut screen, _geometry) = board_with(config, &mut world);
        let slots: Vec<_> = screen.session.layout().correct_positions().collect();
        for (tile, slot) in slots.into_iter().enumerate() {
            move_tile(&mut screen, &mut world, tile, slot);
        }
        redraw(&screen, &mut world);

        assert_eq!(screen.session.pending_ack(), Some(AckKind::Completed));
        assert_eq!(screen.level(), 1);
        let texts: Vec<_> = world.labels().iter().map(|label| label.text.as_str()).collect();
        assert!(texts.contains(&"Level 1/1"));
    }

    #[test]
    fn main_menu_button_leaves_the_board() {
        let mut world = SceneWorld::default();
        let (mut screen, geometry) = board(&mut world);
        redraw(&screen, &mut world);

        let (_, _, menu) = button_rects(&geometry)[1];
        let command = screen.update(DT, &press_at(center(menu)), &mut world);

        assert_eq!(command, SessionCommand::ReturnToMenu);
    }

    #[test]
    fn buttons_sit_along_the_bottom_edge() {
        let geometry = BoardGeometry::from_config(&PuzzleConfig::default());
        let rects = button_rects(&geometry);
        assert_eq!(rects[0].2, RectPx::new(555, 830, 150, 30));
        assert_eq!(rects[2].2.right(), 1045);
    }
}
