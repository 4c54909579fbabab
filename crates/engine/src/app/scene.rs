use std::sync::Arc;

use super::input::{ActionStates, InputAction};
use super::rendering::text_width_px;
use crate::assets::{Bitmap, SoundKey};

/// Integer position in framebuffer pixels, origin top-left.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PointPx {
    pub x: i32,
    pub y: i32,
}

impl PointPx {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RectPx {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl RectPx {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn at(origin: PointPx, width: u32, height: u32) -> Self {
        Self::new(origin.x, origin.y, width, height)
    }

    /// Rectangle of the given size centered inside `self`.
    pub fn centered(&self, width: u32, height: u32) -> Self {
        Self::new(
            self.x + (self.width as i32 - width as i32) / 2,
            self.y + (self.height as i32 - height as i32) / 2,
            width,
            height,
        )
    }

    pub fn origin(&self) -> PointPx {
        PointPx::new(self.x, self.y)
    }

    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    pub fn contains(&self, point: PointPx) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    pub fn intersects(&self, other: &RectPx) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn union(&self, other: &RectPx) -> RectPx {
        let left = self.x.min(other.x);
        let top = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        RectPx::new(left, top, (right - left) as u32, (bottom - top) as u32)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    actions: ActionStates,
    cursor_position_px: Option<PointPx>,
    left_click_pressed: bool,
    left_click_released: bool,
    left_mouse_down: bool,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(
        quit_requested: bool,
        actions: ActionStates,
        cursor_position_px: Option<PointPx>,
        left_click_pressed: bool,
        left_click_released: bool,
        left_mouse_down: bool,
    ) -> Self {
        Self {
            quit_requested,
            actions,
            cursor_position_px,
            left_click_pressed,
            left_click_released,
            left_mouse_down,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn action_pressed(&self, action: InputAction) -> bool {
        self.actions.was_pressed(action)
    }

    pub fn with_action_pressed(mut self, action: InputAction) -> Self {
        self.actions.set(action, true);
        self
    }

    pub fn with_cursor_position_px(mut self, cursor_position_px: Option<PointPx>) -> Self {
        self.cursor_position_px = cursor_position_px;
        self
    }

    pub fn with_left_click_pressed(mut self, pressed: bool) -> Self {
        self.left_click_pressed = pressed;
        self.left_mouse_down |= pressed;
        self
    }

    pub fn with_left_click_released(mut self, released: bool) -> Self {
        self.left_click_released = released;
        if released {
            self.left_mouse_down = false;
        }
        self
    }

    pub fn with_left_mouse_down(mut self, down: bool) -> Self {
        self.left_mouse_down = down;
        self
    }

    pub fn cursor_position_px(&self) -> Option<PointPx> {
        self.cursor_position_px
    }

    pub fn left_click_pressed(&self) -> bool {
        self.left_click_pressed
    }

    pub fn left_click_released(&self) -> bool {
        self.left_click_released
    }

    pub fn left_mouse_down(&self) -> bool {
        self.left_mouse_down
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    Quit,
}

pub trait Scene {
    fn load(&mut self, world: &mut SceneWorld);
    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand;
    fn unload(&mut self, world: &mut SceneWorld);
    fn debug_title(&self) -> Option<String> {
        None
    }
}

#[derive(Debug, Clone)]
pub struct Sprite {
    pub bitmap: Arc<Bitmap>,
    pub position: PointPx,
}

impl Sprite {
    pub fn bounds(&self) -> RectPx {
        RectPx::at(self.position, self.bitmap.width(), self.bitmap.height())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameOutline {
    pub rect: RectPx,
    pub color: [u8; 4],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameLabel {
    pub text: String,
    pub position: PointPx,
    pub color: [u8; 4],
    pub scale: i32,
}

impl FrameLabel {
    pub fn new(text: impl Into<String>, position: PointPx, color: [u8; 4], scale: i32) -> Self {
        Self {
            text: text.into(),
            position,
            color,
            scale,
        }
    }

    pub fn width_px(&self) -> i32 {
        text_width_px(&self.text, self.scale)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ButtonId(pub &'static str);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiButton {
    pub id: ButtonId,
    pub rect: RectPx,
    pub label: String,
    pub hovered: bool,
}

const MODAL_SPACING_PX: i32 = 12;
const MODAL_BUTTON_WIDTH: u32 = 150;
const MODAL_BUTTON_HEIGHT: u32 = 30;
const MODAL_CAPTION_SCALE: i32 = 3;
const MODAL_TEXT_COLOR: [u8; 4] = [244, 248, 252, 255];

/// A blocking message drawn over a dimmed frame. While a modal is shown only
/// its own button is hit-testable.
#[derive(Debug, Clone)]
pub struct Modal {
    pub illustration: Option<Sprite>,
    pub caption: FrameLabel,
    pub button: UiButton,
}

impl Modal {
    /// Stacks illustration, caption and button vertically in the middle of `frame`.
    pub fn centered(
        frame: RectPx,
        illustration: Option<Arc<Bitmap>>,
        caption: &str,
        button_id: ButtonId,
        button_label: &str,
    ) -> Self {
        let caption_width = text_width_px(caption, MODAL_CAPTION_SCALE);
        let caption_height = super::rendering::text_height_px(MODAL_CAPTION_SCALE);
        let (image_width, image_height) = illustration
            .as_ref()
            .map(|bitmap| (bitmap.width() as i32, bitmap.height() as i32))
            .unwrap_or((0, 0));
        let stack_height = image_height
            + MODAL_SPACING_PX
            + caption_height
            + MODAL_SPACING_PX
            + MODAL_BUTTON_HEIGHT as i32;
        let center_x = frame.x + frame.width as i32 / 2;
        let mut y = frame.y + (frame.height as i32 - stack_height) / 2;

        let illustration = illustration.map(|bitmap| {
            let sprite = Sprite {
                position: PointPx::new(center_x - image_width / 2, y),
                bitmap,
            };
            y += image_height + MODAL_SPACING_PX;
            sprite
        });
        let caption = FrameLabel::new(
            caption,
            PointPx::new(center_x - caption_width / 2, y),
            MODAL_TEXT_COLOR,
            MODAL_CAPTION_SCALE,
        );
        y += caption_height + MODAL_SPACING_PX;
        let button = UiButton {
            id: button_id,
            rect: RectPx::new(
                center_x - MODAL_BUTTON_WIDTH as i32 / 2,
                y,
                MODAL_BUTTON_WIDTH,
                MODAL_BUTTON_HEIGHT,
            ),
            label: button_label.to_string(),
            hovered: false,
        };

        Self {
            illustration,
            caption,
            button,
        }
    }
}

/// Everything a scene wants on screen for one frame, plus the side requests
/// (sounds, dirty regions) the loop drains after each tick.
#[derive(Debug, Default)]
pub struct SceneWorld {
    background: Option<Arc<Bitmap>>,
    outlines: Vec<FrameOutline>,
    sprites: Vec<Sprite>,
    labels: Vec<FrameLabel>,
    buttons: Vec<UiButton>,
    modal: Option<Modal>,
    pending_sounds: Vec<SoundKey>,
    dirty: Option<DirtyRegion>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirtyRegion {
    Full,
    Region(RectPx),
}

impl SceneWorld {
    /// Drops the previous frame's draw list. Background, queued sounds and
    /// dirty state survive.
    pub fn begin_frame(&mut self) {
        self.outlines.clear();
        self.sprites.clear();
        self.labels.clear();
        self.buttons.clear();
        self.modal = None;
    }

    pub fn set_background(&mut self, background: Option<Arc<Bitmap>>) {
        self.background = background;
    }

    pub fn push_outline(&mut self, outline: FrameOutline) {
        self.outlines.push(outline);
    }

    pub fn push_sprite(&mut self, sprite: Sprite) {
        self.sprites.push(sprite);
    }

    pub fn push_label(&mut self, label: FrameLabel) {
        self.labels.push(label);
    }

    pub fn push_button(&mut self, button: UiButton) {
        self.buttons.push(button);
    }

    pub fn set_modal(&mut self, modal: Option<Modal>) {
        self.modal = modal;
    }

    pub fn background(&self) -> Option<&Arc<Bitmap>> {
        self.background.as_ref()
    }

    pub fn outlines(&self) -> &[FrameOutline] {
        &self.outlines
    }

    pub fn sprites(&self) -> &[Sprite] {
        &self.sprites
    }

    pub fn labels(&self) -> &[FrameLabel] {
        &self.labels
    }

    pub fn buttons(&self) -> &[UiButton] {
        &self.buttons
    }

    pub fn modal(&self) -> Option<&Modal> {
        self.modal.as_ref()
    }

    /// Button under `point`, honoring modal capture.
    pub fn button_at(&self, point: PointPx) -> Option<ButtonId> {
        if let Some(modal) = &self.modal {
            return modal.button.rect.contains(point).then_some(modal.button.id);
        }
        self.buttons
            .iter()
            .find(|button| button.rect.contains(point))
            .map(|button| button.id)
    }

    pub fn queue_sound(&mut self, key: SoundKey) {
        self.pending_sounds.push(key);
    }

    pub fn drain_sounds(&mut self) -> std::vec::Drain<'_, SoundKey> {
        self.pending_sounds.drain(..)
    }

    /// `None` asks for a full-frame redraw.
    pub fn mark_dirty(&mut self, region: Option<RectPx>) {
        self.dirty = match (self.dirty, region) {
            (Some(DirtyRegion::Full), _) | (_, None) => Some(DirtyRegion::Full),
            (Some(DirtyRegion::Region(existing)), Some(rect)) => {
                Some(DirtyRegion::Region(existing.union(&rect)))
            }
            (None, Some(rect)) => Some(DirtyRegion::Region(rect)),
        };
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.is_some()
    }

    pub fn take_dirty(&mut self) -> Option<DirtyRegion> {
        self.dirty.take()
    }
}

pub(crate) struct SceneRuntime {
    scene: Box<dyn Scene>,
    world: SceneWorld,
    is_loaded: bool,
}

impl SceneRuntime {
    pub(crate) fn new(scene: Box<dyn Scene>) -> Self {
        Self {
            scene,
            world: SceneWorld::default(),
            is_loaded: false,
        }
    }

    pub(crate) fn load(&mut self) {
        if self.is_loaded {
            return;
        }
        self.scene.load(&mut self.world);
        self.world.mark_dirty(None);
        self.is_loaded = true;
    }

    pub(crate) fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> SceneCommand {
        self.scene.update(fixed_dt_seconds, input, &mut self.world)
    }

    pub(crate) fn shutdown(&mut self) {
        if !self.is_loaded {
            return;
        }
        self.scene.unload(&mut self.world);
        self.is_loaded = false;
    }

    pub(crate) fn world(&self) -> &SceneWorld {
        &self.world
    }

    pub(crate) fn world_mut(&mut self) -> &mut SceneWorld {
        &mut self.world
    }

    pub(crate) fn debug_title(&self) -> Option<String> {
        self.scene.debug_title()
    }
}
