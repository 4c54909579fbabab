use crate::app::{PointPx, RectPx};
use crate::assets::Bitmap;

/// RGBA8 framebuffer view. Every write is clipped to `clip`, which is always
/// inside the frame, so a partial redraw touches only the dirty rectangle.
pub(crate) struct Canvas<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
    clip: RectPx,
}

impl<'a> Canvas<'a> {
    pub(crate) fn new(frame: &'a mut [u8], width: u32, height: u32) -> Self {
        Self {
            frame,
            width,
            height,
            clip: RectPx::new(0, 0, width, height),
        }
    }

    pub(crate) fn with_clip(mut self, clip: RectPx) -> Self {
        let frame_rect = RectPx::new(0, 0, self.width, self.height);
        self.clip = clip_to(&frame_rect, &clip).unwrap_or(RectPx::new(0, 0, 0, 0));
        self
    }

    pub(crate) fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub(crate) fn clip(&self) -> RectPx {
        self.clip
    }

    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if !self.clip.contains(PointPx::new(x, y)) {
            return None;
        }
        let offset = (y as usize)
            .checked_mul(self.width as usize)?
            .checked_add(x as usize)?
            .checked_mul(4)?;
        (offset + 4 <= self.frame.len()).then_some(offset)
    }

    pub(crate) fn put(&mut self, x: i32, y: i32, color: [u8; 4]) {
        if let Some(offset) = self.offset(x, y) {
            self.frame[offset..offset + 4].copy_from_slice(&color);
        }
    }

    /// Source-over blend of `color` onto the pixel at (`x`, `y`).
    pub(crate) fn blend(&mut self, x: i32, y: i32, color: [u8; 4]) {
        let alpha = color[3] as u32;
        if alpha == 0 {
            return;
        }
        if alpha == 255 {
            self.put(x, y, color);
            return;
        }
        let Some(offset) = self.offset(x, y) else {
            return;
        };
        let inverse = 255 - alpha;
        for channel in 0..3 {
            let dst = self.frame[offset + channel] as u32;
            self.frame[offset + channel] =
                ((color[channel] as u32 * alpha + dst * inverse) / 255) as u8;
        }
        self.frame[offset + 3] = 255;
    }

    #[cfg(test)]
    pub(crate) fn pixel(&self, x: i32, y: i32) -> Option<[u8; 4]> {
        let frame_rect = RectPx::new(0, 0, self.width, self.height);
        if !frame_rect.contains(PointPx::new(x, y)) {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let mut rgba = [0; 4];
        rgba.copy_from_slice(&self.frame[offset..offset + 4]);
        Some(rgba)
    }

    pub(crate) fn fill_rect(&mut self, rect: RectPx, color: [u8; 4]) {
        let Some(area) = clip_to(&self.clip, &rect) else {
            return;
        };
        for y in area.y..area.bottom() {
            for x in area.x..area.right() {
                self.put(x, y, color);
            }
        }
    }

    pub(crate) fn blend_rect(&mut self, rect: RectPx, color: [u8; 4]) {
        let Some(area) = clip_to(&self.clip, &rect) else {
            return;
        };
        for y in area.y..area.bottom() {
            for x in area.x..area.right() {
                self.blend(x, y, color);
            }
        }
    }

    /// One-pixel border drawn just inside `rect`.
    pub(crate) fn outline_rect(&mut self, rect: RectPx, color: [u8; 4]) {
        if rect.width < 2 || rect.height < 2 {
            return;
        }
        let (right, bottom) = (rect.right() - 1, rect.bottom() - 1);
        self.fill_rect(RectPx::new(rect.x, rect.y, rect.width, 1), color);
        self.fill_rect(RectPx::new(rect.x, bottom, rect.width, 1), color);
        self.fill_rect(RectPx::new(rect.x, rect.y, 1, rect.height), color);
        self.fill_rect(RectPx::new(right, rect.y, 1, rect.height), color);
    }

    /// Copies `bitmap` with its top-left at `origin`, blending translucent pixels.
    pub(crate) fn blit(&mut self, bitmap: &Bitmap, origin: PointPx) {
        let bounds = RectPx::at(origin, bitmap.width(), bitmap.height());
        let Some(area) = clip_to(&self.clip, &bounds) else {
            return;
        };
        let rgba = bitmap.rgba();
        let stride = bitmap.width() as usize * 4;
        for y in area.y..area.bottom() {
            let src_row = (y - origin.y) as usize * stride;
            for x in area.x..area.right() {
                let src = src_row + (x - origin.x) as usize * 4;
                let Some(pixel) = rgba.get(src..src + 4) else {
                    continue;
                };
                self.blend(x, y, [pixel[0], pixel[1], pixel[2], pixel[3]]);
            }
        }
    }
}

fn clip_to(outer: &RectPx, rect: &RectPx) -> Option<RectPx> {
    if !outer.intersects(rect) {
        return None;
    }
    let left = outer.x.max(rect.x);
    let top = outer.y.max(rect.y);
    let right = outer.right().min(rect.right());
    let bottom = outer.bottom().min(rect.bottom());
    Some(RectPx::new(left, top, (right - left) as u32, (bottom - top) as u32))
}
