use std::sync::Arc;

use engine::{
    text_height_px, text_width_px, Bitmap, FrameLabel, FrameOutline, InputSnapshot, PointPx,
    RectPx, SceneWorld, Sprite,
};
use tracing::warn;

use crate::app::catalog::{ImageChoice, IMAGE_CHOICES};
use crate::app::puzzle::{BoardGeometry, ImageSource};

const COLUMNS: usize = 3;
const COLUMN_GAP_PX: i32 = 40;
const ROW_GAP_PX: i32 = 60;
const GRID_TOP_PX: i32 = 200;
const TITLE_TOP_PX: i32 = 90;
const TITLE_SCALE: i32 = 5;
const NAME_SCALE: i32 = 2;
const NAME_GAP_PX: i32 = 10;

const TITLE: &str = "Choose a picture";
const NO_PREVIEW: &str = "No preview";

const TEXT_COLOR: [u8; 4] = [236, 240, 246, 255];
const ERROR_COLOR: [u8; 4] = [255, 110, 100, 255];
const OUTLINE_COLOR: [u8; 4] = [90, 100, 120, 255];
const HOVER_COLOR: [u8; 4] = [255, 214, 92, 255];
const PLACEHOLDER_COLOR: [u8; 4] = [52, 56, 66, 255];

struct MenuEntry {
    choice: ImageChoice,
    rect: RectPx,
    thumbnail: Arc<Bitmap>,
    has_preview: bool,
}

/// Picture selection grid. Thumbnails are built once per visit from the
/// shared image cache.
pub(super) struct MenuScreen {
    entries: Vec<MenuEntry>,
    hovered: Option<usize>,
    error: Option<String>,
}

impl MenuScreen {
    pub(super) fn empty() -> Self {
        Self {
            entries: Vec::new(),
            hovered: None,
            error: None,
        }
    }

    pub(super) fn new(
        images: &mut ImageSource,
        geometry: &BoardGeometry,
        thumbnail_size: u32,
    ) -> Self {
        let placeholder = Arc::new(Bitmap::filled(
            thumbnail_size,
            thumbnail_size,
            PLACEHOLDER_COLOR,
        ));
        let rects = thumbnail_rects(IMAGE_CHOICES.len(), geometry.board_width, thumbnail_size);
        let entries = IMAGE_CHOICES
            .iter()
            .zip(rects)
            .map(|(choice, rect)| {
                let thumbnail = match images.original(choice.file) {
                    Ok(original) => {
                        Some(Arc::new(original.resized(thumbnail_size, thumbnail_size)))
                    }
                    Err(error) => {
                        warn!(image = choice.file, error = %error, "thumbnail_unavailable");
                        None
                    }
                };
                MenuEntry {
                    choice: *choice,
                    rect,
                    has_preview: thumbnail.is_some(),
                    thumbnail: thumbnail.unwrap_or_else(|| Arc::clone(&placeholder)),
                }
            })
            .collect();
        Self {
            entries,
            hovered: None,
            error: None,
        }
    }

    pub(super) fn set_error(&mut self, message: String) {
        self.error = Some(message);
    }

    /// Tracks hover and returns the picture clicked this tick.
    pub(super) fn update(
        &mut self,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> Option<ImageChoice> {
        let hovered = input
            .cursor_position_px()
            .and_then(|point| self.entries.iter().position(|entry| entry.rect.contains(point)));
        if hovered != self.hovered {
            for index in [self.hovered, hovered].into_iter().flatten() {
                world.mark_dirty(Some(self.entries[index].rect));
            }
            self.hovered = hovered;
        }

        if input.left_click_pressed() {
            return hovered.map(|index| self.entries[index].choice);
        }
        None
    }

    pub(super) fn draw(&self, world: &mut SceneWorld, geometry: &BoardGeometry) {
        world.push_label(centered_label(
            TITLE,
            geometry.board_width,
            TITLE_TOP_PX,
            TEXT_COLOR,
            TITLE_SCALE,
        ));

        for (index, entry) in self.entries.iter().enumerate() {
            let color = if self.hovered == Some(index) {
                HOVER_COLOR
            } else {
                OUTLINE_COLOR
            };
            world.push_outline(FrameOutline {
                rect: entry.rect,
                color,
            });
            world.push_sprite(Sprite {
                bitmap: Arc::clone(&entry.thumbnail),
                position: entry.rect.origin(),
            });
            if !entry.has_preview {
                let width = text_width_px(NO_PREVIEW, NAME_SCALE);
                let inner = entry
                    .rect
                    .centered(width.max(0) as u32, text_height_px(NAME_SCALE) as u32);
                world.push_label(FrameLabel::new(
                    NO_PREVIEW,
                    inner.origin(),
                    TEXT_COLOR,
                    NAME_SCALE,
                ));
            }
            let name_width = text_width_px(entry.choice.name, NAME_SCALE);
            world.push_label(FrameLabel::new(
                entry.choice.name,
                PointPx::new(
                    entry.rect.x + (entry.rect.width as i32 - name_width) / 2,
                    entry.rect.bottom() + NAME_GAP_PX,
                ),
                color,
                NAME_SCALE,
            ));
        }

        if let Some(error) = &self.error {
            let top = self
                .entries
                .iter()
                .map(|entry| entry.rect.bottom())
                .max()
                .unwrap_or(GRID_TOP_PX)
                + ROW_GAP_PX;
            world.push_label(centered_label(
                error,
                geometry.board_width,
                top,
                ERROR_COLOR,
                NAME_SCALE,
            ));
        }
    }
}

fn centered_label(
    text: &str,
    frame_width: u32,
    top: i32,
    color: [u8; 4],
    scale: i32,
) -> FrameLabel {
    let width = text_width_px(text, scale);
    FrameLabel::new(
        text,
        PointPx::new((frame_width as i32 - width) / 2, top),
        color,
        scale,
    )
}

/// Rows of `COLUMNS` thumbnails, each row centered horizontally.
fn thumbnail_rects(count: usize, frame_width: u32, size: u32) -> Vec<RectPx> {
    let size_px = size as i32;
    (0..count)
        .map(|index| {
            let row = index / COLUMNS;
            let col = index % COLUMNS;
            let in_row = (count - row * COLUMNS).min(COLUMNS) as i32;
            let row_width = in_row * size_px + (in_row - 1) * COLUMN_GAP_PX;
            let left = (frame_width as i32 - row_width) / 2;
            RectPx::new(
                left + col as i32 * (size_px + COLUMN_GAP_PX),
                GRID_TOP_PX + row as i32 * (size_px + ROW_GAP_PX),
                size,
                size,
            )
        })
        .collect()
}
