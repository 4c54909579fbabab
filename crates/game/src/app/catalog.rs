use std::path::Path;
use std::sync::Arc;

use engine::{load_bitmap, Bitmap, SoundKey};
use tracing::{debug, warn};

use super::puzzle::{AckKind, BoardGeometry, Cue};

/// A picture the player can pick on the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ImageChoice {
    pub(crate) name: &'static str,
    pub(crate) file: &'static str,
}

pub(crate) const IMAGE_CHOICES: [ImageChoice; 5] = [
    ImageChoice {
        name: "Image 1",
        file: "1.png",
    },
    ImageChoice {
        name: "Image 2",
        file: "2.png",
    },
    ImageChoice {
        name: "Image 3",
        file: "3.png",
    },
    ImageChoice {
        name: "Image 4",
        file: "4.png",
    },
    ImageChoice {
        name: "Image 5",
        file: "5.png",
    },
];

const BACKGROUND_FILE: &str = "background.png";
const BORDER_FILE: &str = "border.png";
const VICTORY_FILE: &str = "victory.png";
const LOST_FILE: &str = "lost.png";
const FINAL_FILE: &str = "final.png";

const PLACE_SOUND: &str = "pop.wav";
const SOLVE_SOUND: &str = "victory.wav";
const COMPLETE_SOUND: &str = "final_victory.wav";

/// Largest edge of an acknowledgment illustration on screen.
const ILLUSTRATION_MAX_EDGE: u32 = 360;

pub(crate) fn cue_sound(cue: Cue) -> SoundKey {
    SoundKey::new(match cue {
        Cue::Place => PLACE_SOUND,
        Cue::SolveLevel => SOLVE_SOUND,
        Cue::CompleteGame => COMPLETE_SOUND,
    })
}

pub(crate) fn all_cue_sounds() -> [SoundKey; 3] {
    [
        cue_sound(Cue::Place),
        cue_sound(Cue::SolveLevel),
        cue_sound(Cue::CompleteGame),
    ]
}

/// Decorations around the puzzle. Each one is optional: a file that fails to
/// load is logged once and the board is drawn without it.
#[derive(Debug, Clone, Default)]
pub(crate) struct ChromeAssets {
    pub(crate) background: Option<Arc<Bitmap>>,
    pub(crate) border: Option<Arc<Bitmap>>,
    pub(crate) victory: Option<Arc<Bitmap>>,
    pub(crate) lost: Option<Arc<Bitmap>>,
    pub(crate) final_screen: Option<Arc<Bitmap>>,
}

impl ChromeAssets {
    pub(crate) fn load(images_dir: &Path, geometry: &BoardGeometry) -> Self {
        let load = |file_name: &str| load_optional(images_dir, file_name);
        Self {
            background: load(BACKGROUND_FILE).map(|bitmap| {
                Arc::new(bitmap.resized(geometry.board_width, geometry.board_height))
            }),
            border: load(BORDER_FILE)
                .map(|bitmap| Arc::new(bitmap.resized(geometry.border_size, geometry.border_size))),
            victory: load(VICTORY_FILE).map(fit_illustration),
            lost: load(LOST_FILE).map(fit_illustration),
            final_screen: load(FINAL_FILE).map(fit_illustration),
        }
    }

    pub(crate) fn illustration(&self, kind: AckKind) -> Option<Arc<Bitmap>> {
        match kind {
            AckKind::Advance => self.victory.clone(),
            AckKind::Expired => self.lost.clone(),
            AckKind::Completed => self.final_screen.clone(),
        }
    }
}

fn load_optional(images_dir: &Path, file_name: &str) -> Option<Bitmap> {
    match load_bitmap(&images_dir.join(file_name)) {
        Ok(bitmap) => {
            debug!(asset = file_name, "chrome_loaded");
            Some(bitmap)
        }
        Err(error) => {
            warn!(asset = file_name, error = %error, "chrome_unavailable");
            None
        }
    }
}

/// Scales down, keeping the aspect ratio, so the longest edge fits.
fn fit_illustration(bitmap: Bitmap) -> Arc<Bitmap> {
    let longest = bitmap.width().max(bitmap.height());
    if longest <= ILLUSTRATION_MAX_EDGE {
        return Arc::new(bitmap);
    }
    let scale = ILLUSTRATION_MAX_EDGE as f32 / longest as f32;
    let width = ((bitmap.width() as f32 * scale).round() as u32).max(1);
    let height = ((bitmap.height() as f32 * scale).round() as u32).max(1);
    Arc::new(bitmap.resized(width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::config::PuzzleConfig;

    #[test]
    fn every_cue_has_a_distinct_sound() {
        let sounds = all_cue_sounds();
        assert_eq!(sounds[0], SoundKey::new("pop.wav"));
        assert_ne!(sounds[0], sounds[1]);
        assert_ne!(sounds[1], sounds[2]);
    }

    #[test]
    fn image_choices_are_numbered_pngs() {
        for (index, choice) in IMAGE_CHOICES.iter().enumerate() {
            assert_eq!(choice.file, format!("{}.png", index + 1));
            assert_eq!(choice.name, format!("Image {}", index + 1));
        }
    }

    #[test]
    fn missing_chrome_loads_as_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let geometry = BoardGeometry::from_config(&PuzzleConfig::default());
        let chrome = ChromeAssets::load(dir.path(), &geometry);
        assert!(chrome.background.is_none());
        assert!(chrome.illustration(AckKind::Completed).is_none());
    }

    #[test]
    fn chrome_is_scaled_to_its_slot() {
        let dir = tempfile::tempdir().expect("tempdir");
        image::RgbaImage::from_pixel(64, 32, image::Rgba([1, 2, 3, 255]))
            .save(dir.path().join(BORDER_FILE))
            .expect("save");
        image::RgbaImage::from_pixel(800, 400, image::Rgba([1, 2, 3, 255]))
            .save(dir.path().join(VICTORY_FILE))
            .expect("save");
        let geometry = BoardGeometry::from_config(&PuzzleConfig::default());

        let chrome = ChromeAssets::load(dir.path(), &geometry);

        let border = chrome.border.as_ref().expect("border");
        assert_eq!((border.width(), border.height()), (700, 700));
        let victory = chrome.illustration(AckKind::Advance).expect("victory");
        assert_eq!((victory.width(), victory.height()), (360, 180));
    }
}
