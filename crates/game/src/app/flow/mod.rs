mod board;
mod menu;

use std::path::PathBuf;

use engine::{InputSnapshot, RectPx, Scene, SceneCommand, SceneWorld};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use super::catalog::{cue_sound, ChromeAssets, ImageChoice};
use super::config::PuzzleConfig;
use super::puzzle::{
    AckKind, BoardGeometry, Cue, ImageSource, LevelTableError, Presenter, PuzzleSession,
    SessionCommand, SessionRules,
};
use board::BoardScreen;
use menu::MenuScreen;

pub(crate) const WINDOW_TITLE: &str = "Simple Puzzle Game";

enum Screen {
    Menu(MenuScreen),
    Board(BoardScreen),
}

/// Root scene: the picture menu and the board, with the state they share
/// across sessions (decoded pictures, chrome, high score, shuffle source).
pub(crate) struct PuzzleApp {
    rules: SessionRules,
    geometry: BoardGeometry,
    thumbnail_size: u32,
    images: ImageSource,
    images_dir: PathBuf,
    chrome: ChromeAssets,
    rng: StdRng,
    high_score: u32,
    screen: Screen,
}

impl PuzzleApp {
    pub(crate) fn new(config: &PuzzleConfig, images_dir: PathBuf) -> Result<Self, LevelTableError> {
        let rules = SessionRules::from_config(config)?;
        let rng = match config.shuffle_seed {
            Some(seed) => {
                info!(seed, "shuffle_seeded");
                StdRng::seed_from_u64(seed)
            }
            None => StdRng::from_os_rng(),
        };
        Ok(Self {
            rules,
            geometry: BoardGeometry::from_config(config),
            thumbnail_size: config.thumbnail_size,
            images: ImageSource::new(images_dir.clone(), config.image_size),
            images_dir,
            chrome: ChromeAssets::default(),
            rng,
            high_score: 0,
            screen: Screen::Menu(MenuScreen::empty()),
        })
    }

    fn show_menu(&mut self, world: &mut SceneWorld) {
        let menu = MenuScreen::new(&mut self.images, &self.geometry, self.thumbnail_size);
        self.screen = Screen::Menu(menu);
        world.mark_dirty(None);
        info!(high_score = self.high_score, "menu_shown");
    }

    /// Starts a session on `choice`. A picture that cannot be loaded leaves
    /// the menu up with an error line.
    fn on_image_chosen(&mut self, choice: ImageChoice, world: &mut SceneWorld) {
        let image = match self.images.canonical(choice.file) {
            Ok(image) => image,
            Err(error) => {
                warn!(image = choice.file, error = %error, "session_start_failed");
                if let Screen::Menu(menu) = &mut self.screen {
                    menu.set_error(format!("Could not load {}.", choice.name));
                }
                world.mark_dirty(None);
                return;
            }
        };
        let rng = StdRng::from_rng(&mut self.rng);
        let session = PuzzleSession::start(
            choice.file,
            image,
            self.rules.clone(),
            self.geometry,
            self.high_score,
            rng,
            &mut WorldPresenter::new(world),
        );
        self.screen = Screen::Board(BoardScreen::new(session));
    }

    fn draw(&self, world: &mut SceneWorld) {
        world.begin_frame();
        match &self.screen {
            Screen::Menu(menu) => menu.draw(world, &self.geometry),
            Screen::Board(board) => board.draw(world, &self.chrome),
        }
    }
}

impl Scene for PuzzleApp {
    fn load(&mut self, world: &mut SceneWorld) {
        self.chrome = ChromeAssets::load(&self.images_dir, &self.geometry);
        world.set_background(self.chrome.background.clone());
        self.show_menu(world);
        self.draw(world);
        info!(
            levels = self.rules.levels.last_level(),
            images_dir = %self.images_dir.display(),
            "scene_loaded"
        );
    }

    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand {
        if input.quit_requested() {
            return SceneCommand::Quit;
        }

        match &mut self.screen {
            Screen::Menu(menu) => {
                if let Some(choice) = menu.update(input, world) {
                    self.on_image_chosen(choice, world);
                }
            }
            Screen::Board(board) => {
                let command = board.update(fixed_dt_seconds, input, world);
                self.high_score = self.high_score.max(board.high_score());
                if command == SessionCommand::ReturnToMenu {
                    self.show_menu(world);
                }
            }
        }

        if world.is_dirty() {
            self.draw(world);
        }
        SceneCommand::None
    }

    fn unload(&mut self, world: &mut SceneWorld) {
        world.begin_frame();
        world.set_background(None);
        info!(high_score = self.high_score, "scene_unloaded");
    }

    fn debug_title(&self) -> Option<String> {
        match &self.screen {
            Screen::Menu(_) => Some(WINDOW_TITLE.to_string()),
            Screen::Board(board) => Some(format!("{WINDOW_TITLE} - Level {}", board.level())),
        }
    }
}

/// Routes session output into the frame: redraws become dirty regions and
/// cues become queued sounds.
pub(crate) struct WorldPresenter<'a> {
    world: &'a mut SceneWorld,
}

impl<'a> WorldPresenter<'a> {
    pub(crate) fn new(world: &'a mut SceneWorld) -> Self {
        Self { world }
    }
}

impl Presenter for WorldPresenter<'_> {
    fn request_redraw(&mut self, region: Option<RectPx>) {
        self.world.mark_dirty(region);
    }

    fn play_cue(&mut self, cue: Cue) {
        debug!(?cue, "cue_queued");
        self.world.queue_sound(cue_sound(cue));
    }

    fn show_acknowledgment(&mut self, kind: AckKind) {
        debug!(?kind, "acknowledgment_shown");
        self.world.mark_dirty(None);
    }
}

#[cfg(test)]
mod tests {
    use engine::{InputAction, PointPx};

    use super::*;

    fn app_with_images(images: &[&str]) -> (tempfile::TempDir, PuzzleApp) {
        let dir = tempfile::tempdir().expect("tempdir");
        for name in images {
            image::RgbaImage::from_pixel(64, 64, image::Rgba([200, 100, 50, 255]))
                .save(dir.path().join(name))
                .expect("save");
        }
        let config = PuzzleConfig {
            shuffle_seed: Some(11),
            ..PuzzleConfig::default()
        };
        let app = PuzzleApp::new(&config, dir.path().to_path_buf()).expect("app");
        (dir, app)
    }

    fn click(point: PointPx) -> InputSnapshot {
        InputSnapshot::empty()
            .with_cursor_position_px(Some(point))
            .with_left_click_pressed(true)
    }

    fn first_thumbnail_center(world: &SceneWorld) -> PointPx {
        let rect = world.outlines()[0].rect;
        PointPx::new(rect.x + rect.width as i32 / 2, rect.y + rect.height as i32 / 2)
    }

    #[test]
    fn load_shows_the_menu() {
        let (_dir, mut app) = app_with_images(&["1.png"]);
        let mut world = SceneWorld::default();
        app.load(&mut world);

        assert!(matches!(app.screen, Screen::Menu(_)));
        assert_eq!(world.outlines().len(), 5);
        assert!(world.is_dirty());
        assert_eq!(app.debug_title().as_deref(), Some("Simple Puzzle Game"));
    }

    #[test]
    fn choosing_an_image_starts_level_one() {
        let (_dir, mut app) = app_with_images(&["1.png"]);
        let mut world = SceneWorld::default();
        app.load(&mut world);
        let target = first_thumbnail_center(&world);

        app.update(1.0 / 60.0, &click(target), &mut world);

        assert!(matches!(app.screen, Screen::Board(_)));
        assert_eq!(
            app.debug_title().as_deref(),
            Some("Simple Puzzle Game - Level 1")
        );
        assert_eq!(world.sprites().len(), 4);
    }

    #[test]
    fn missing_image_stays_on_menu_with_error() {
        let (_dir, mut app) = app_with_images(&[]);
        let mut world = SceneWorld::default();
        app.load(&mut world);
        let target = first_thumbnail_center(&world);

        app.update(1.0 / 60.0, &click(target), &mut world);

        assert!(matches!(app.screen, Screen::Menu(_)));
        assert!(world
            .labels()
            .iter()
            .any(|label| label.text == "Could not load Image 1."));
    }

    #[test]
    fn main_menu_key_returns_to_menu() {
        let (_dir, mut app) = app_with_images(&["1.png"]);
        let mut world = SceneWorld::default();
        app.load(&mut world);
        let target = first_thumbnail_center(&world);
        app.update(1.0 / 60.0, &click(target), &mut world);

        let input = InputSnapshot::empty().with_action_pressed(InputAction::MainMenu);
        app.update(1.0 / 60.0, &input, &mut world);

        assert!(matches!(app.screen, Screen::Menu(_)));
    }

    #[test]
    fn world_presenter_queues_cue_sounds() {
        let mut world = SceneWorld::default();
        WorldPresenter::new(&mut world).play_cue(Cue::Place);
        let sounds: Vec<_> = world.drain_sounds().collect();
        assert_eq!(sounds, vec![cue_sound(Cue::Place)]);
    }
}
