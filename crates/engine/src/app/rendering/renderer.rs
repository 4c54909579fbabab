use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use crate::app::scene::DirtyRegion;
use crate::app::{PointPx, RectPx, SceneWorld, UiButton};

use super::canvas::Canvas;
use super::text::{draw_text, text_height_px, text_width_px};

const CLEAR_COLOR: [u8; 4] = [20, 22, 28, 255];
const BUTTON_FILL_COLOR: [u8; 4] = [52, 58, 70, 255];
const BUTTON_HOVER_COLOR: [u8; 4] = [74, 84, 104, 255];
const BUTTON_BORDER_COLOR: [u8; 4] = [196, 202, 214, 255];
const BUTTON_TEXT_COLOR: [u8; 4] = [244, 248, 252, 255];
const BUTTON_TEXT_SCALE: i32 = 2;
const MODAL_DIM_COLOR: [u8; 4] = [0, 0, 0, 168];

/// Presents a [`SceneWorld`] draw list through a fixed-size pixel buffer that
/// `pixels` scales onto the window surface.
pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    buffer_width: u32,
    buffer_height: u32,
}

impl Renderer {
    pub fn new(window: Arc<Window>, buffer_width: u32, buffer_height: u32) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(
            Arc::clone(&window),
            buffer_width,
            buffer_height,
            size.width,
            size.height,
        )?;
        Ok(Self {
            window,
            pixels,
            buffer_width,
            buffer_height,
        })
    }

    /// Rebuilds the surface. The buffer comes back blank, so callers must
    /// follow up with a full redraw.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(
            Arc::clone(&self.window),
            self.buffer_width,
            self.buffer_height,
            width,
            height,
        )?;
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        buffer_width: u32,
        buffer_height: u32,
        surface_width: u32,
        surface_height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(surface_width, surface_height, window);
        Pixels::new(buffer_width, buffer_height, surface)
    }

    /// Maps a physical window position to buffer pixels. Positions outside the
    /// buffer keep their out-of-range coordinates so drags can leave the board.
    pub fn window_pos_to_buffer_px(&self, x: f32, y: f32) -> PointPx {
        match self.pixels.window_pos_to_pixel((x, y)) {
            Ok((px, py)) => PointPx::new(px as i32, py as i32),
            Err((px, py)) => PointPx::new(px as i32, py as i32),
        }
    }

    pub(crate) fn render(&mut self, world: &SceneWorld, dirty: DirtyRegion) -> Result<(), Error> {
        let (width, height) = (self.buffer_width, self.buffer_height);
        let canvas = Canvas::new(self.pixels.frame_mut(), width, height);
        let mut canvas = match dirty {
            DirtyRegion::Full => canvas,
            DirtyRegion::Region(rect) => canvas.with_clip(rect),
        };
        draw_world(&mut canvas, world);
        self.pixels.render()
    }
}

/// Paints the whole draw list inside the canvas clip, back to front.
pub(crate) fn draw_world(canvas: &mut Canvas<'_>, world: &SceneWorld) {
    let (width, height) = canvas.size();
    let frame_rect = RectPx::new(0, 0, width, height);

    canvas.fill_rect(canvas.clip(), CLEAR_COLOR);
    if let Some(background) = world.background() {
        canvas.blit(background, PointPx::new(0, 0));
    }
    for outline in world.outlines() {
        canvas.outline_rect(outline.rect, outline.color);
    }
    for sprite in world.sprites() {
        if sprite.bounds().intersects(&canvas.clip()) {
            canvas.blit(&sprite.bitmap, sprite.position);
        }
    }
    for label in world.labels() {
        draw_text(
            canvas,
            label.position.x,
            label.position.y,
            &label.text,
            label.color,
            label.scale,
        );
    }
    for button in world.buttons() {
        draw_button(canvas, button);
    }

    if let Some(modal) = world.modal() {
        canvas.blend_rect(frame_rect, MODAL_DIM_COLOR);
        if let Some(illustration) = &modal.illustration {
            canvas.blit(&illustration.bitmap, illustration.position);
        }
        let caption = &modal.caption;
        draw_text(
            canvas,
            caption.position.x,
            caption.position.y,
            &caption.text,
            caption.color,
            caption.scale,
        );
        draw_button(canvas, &modal.button);
    }
}

fn draw_button(canvas: &mut Canvas<'_>, button: &UiButton) {
    let fill = if button.hovered {
        BUTTON_HOVER_COLOR
    } else {
        BUTTON_FILL_COLOR
    };
    canvas.fill_rect(button.rect, fill);
    canvas.outline_rect(button.rect, BUTTON_BORDER_COLOR);

    let text_rect = button.rect.centered(
        text_width_px(&button.label, BUTTON_TEXT_SCALE).max(0) as u32,
        text_height_px(BUTTON_TEXT_SCALE) as u32,
    );
    draw_text(
        canvas,
        text_rect.x,
        text_rect.y,
        &button.label,
        BUTTON_TEXT_COLOR,
        BUTTON_TEXT_SCALE,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{ButtonId, FrameOutline, Modal, Sprite};
    use crate::assets::Bitmap;

    const BLUE: [u8; 4] = [0, 0, 255, 255];
    const GREEN: [u8; 4] = [0, 255, 0, 255];

    #[test]
    fn later_sprites_paint_over_earlier_ones() {
        let mut world = SceneWorld::default();
        world.push_sprite(Sprite {
            bitmap: Arc::new(Bitmap::filled(4, 4, BLUE)),
            position: PointPx::new(0, 0),
        });
        world.push_sprite(Sprite {
            bitmap: Arc::new(Bitmap::filled(2, 2, GREEN)),
            position: PointPx::new(1, 1),
        });

        let mut frame = vec![0u8; 6 * 6 * 4];
        let mut canvas = Canvas::new(&mut frame, 6, 6);
        draw_world(&mut canvas, &world);

        assert_eq!(canvas.pixel(0, 0), Some(BLUE));
        assert_eq!(canvas.pixel(1, 1), Some(GREEN));
        assert_eq!(canvas.pixel(5, 5), Some(CLEAR_COLOR));
    }

    #[test]
    fn partial_redraw_leaves_pixels_outside_region() {
        let mut world = SceneWorld::default();
        world.push_outline(FrameOutline {
            rect: RectPx::new(0, 0, 8, 8),
            color: GREEN,
        });

        let mut frame = vec![7u8; 8 * 8 * 4];
        let mut canvas = Canvas::new(&mut frame, 8, 8).with_clip(RectPx::new(0, 0, 2, 2));
        draw_world(&mut canvas, &world);

        assert_eq!(canvas.pixel(0, 0), Some(GREEN));
        assert_eq!(canvas.pixel(1, 1), Some(CLEAR_COLOR));
        assert_eq!(canvas.pixel(7, 7), Some([7; 4]));
    }

    #[test]
    fn modal_dims_the_frame_beneath() {
        let mut world = SceneWorld::default();
        world.set_background(Some(Arc::new(Bitmap::filled(200, 200, [200, 200, 200, 255]))));
        world.set_modal(Some(Modal::centered(
            RectPx::new(0, 0, 200, 200),
            None,
            "Hi",
            ButtonId("ok"),
            "OK",
        )));

        let mut frame = vec![0u8; 200 * 200 * 4];
        let mut canvas = Canvas::new(&mut frame, 200, 200);
        draw_world(&mut canvas, &world);

        let corner = canvas.pixel(0, 0).expect("pixel");
        assert!(corner[0] < 100);
    }
}
