use std::sync::Arc;

use engine::{Bitmap, PointPx, RectPx};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::app::config::PuzzleConfig;

/// Fixed screen geometry of the board in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BoardGeometry {
    pub(crate) board_width: u32,
    pub(crate) board_height: u32,
    pub(crate) image_size: u32,
    pub(crate) vertical_reserve: u32,
    pub(crate) scatter_gap: i32,
    pub(crate) scatter_margin: i32,
    pub(crate) border_size: u32,
}

impl BoardGeometry {
    pub(crate) fn from_config(config: &PuzzleConfig) -> Self {
        Self {
            board_width: config.board_width,
            board_height: config.board_height,
            image_size: config.image_size,
            vertical_reserve: config.board_vertical_reserve_px,
            scatter_gap: config.scatter_gap_px,
            scatter_margin: config.scatter_margin_px,
            border_size: config.border_overlay_size,
        }
    }

    pub(crate) fn frame_rect(&self) -> RectPx {
        RectPx::new(0, 0, self.board_width, self.board_height)
    }

    /// Top-left of the target square: centered horizontally, and vertically
    /// within the height left after the HUD reserve.
    pub(crate) fn target_origin(&self) -> PointPx {
        let image = self.image_size as i32;
        PointPx::new(
            (self.board_width as i32 - image) / 2,
            (self.board_height as i32 - image - self.vertical_reserve as i32) / 2,
        )
    }

    pub(crate) fn target_rect(&self) -> RectPx {
        RectPx::at(self.target_origin(), self.image_size, self.image_size)
    }

    pub(crate) fn border_rect(&self) -> RectPx {
        let target = self.target_rect();
        let inset = (self.border_size as i32 - self.image_size as i32) / 2;
        RectPx::new(
            target.x - inset,
            target.y - inset,
            self.border_size,
            self.border_size,
        )
    }

    pub(crate) fn scatter_origin(&self) -> PointPx {
        PointPx::new(
            self.scatter_margin,
            (self.board_height as i32 - self.image_size as i32) / 2,
        )
    }

    /// Area covered by the scattered tiles of a `side` x `side` grid. Each
    /// row holds `side` tiles, so the extent is the image plus the gaps.
    pub(crate) fn scatter_rect(&self, side: u32) -> RectPx {
        let gaps = side.saturating_sub(1).saturating_mul(self.scatter_gap.max(0) as u32);
        let extent = self.image_size.saturating_add(gaps);
        RectPx::at(self.scatter_origin(), extent, extent)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Tile {
    pub(crate) index: usize,
    pub(crate) bitmap: Arc<Bitmap>,
    pub(crate) position: PointPx,
    pub(crate) correct: PointPx,
    pub(crate) initial: PointPx,
}

impl Tile {
    pub(crate) fn size(&self) -> (u32, u32) {
        (self.bitmap.width(), self.bitmap.height())
    }

    pub(crate) fn bounds(&self) -> RectPx {
        RectPx::at(self.position, self.bitmap.width(), self.bitmap.height())
    }

    pub(crate) fn is_placed(&self) -> bool {
        self.position == self.correct
    }
}

/// One level's tile set plus its draw order.
#[derive(Debug, Clone)]
pub(crate) struct Layout {
    tiles: Vec<Tile>,
    z_order: Vec<usize>,
}

impl Layout {
    pub(crate) fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub(crate) fn tile(&self, index: usize) -> Option<&Tile> {
        self.tiles.get(index)
    }

    pub(crate) fn tile_mut(&mut self, index: usize) -> Option<&mut Tile> {
        self.tiles.get_mut(index)
    }

    pub(crate) fn correct_positions(&self) -> impl Iterator<Item = PointPx> + '_ {
        self.tiles.iter().map(|tile| tile.correct)
    }

    /// Tiles bottom to top.
    pub(crate) fn tiles_in_draw_order(&self) -> impl Iterator<Item = &Tile> + '_ {
        self.z_order.iter().filter_map(|index| self.tiles.get(*index))
    }

    /// Top-most tile under `point`.
    pub(crate) fn tile_at(&self, point: PointPx) -> Option<usize> {
        self.z_order
            .iter()
            .rev()
            .copied()
            .find(|index| self.tiles[*index].bounds().contains(point))
    }

    pub(crate) fn raise_to_top(&mut self, index: usize) {
        if let Some(slot) = self.z_order.iter().position(|entry| *entry == index) {
            let entry = self.z_order.remove(slot);
            self.z_order.push(entry);
        }
    }

    pub(crate) fn is_solved(&self) -> bool {
        self.tiles.iter().all(Tile::is_placed)
    }
}

/// Slices `image` into `side` x `side` tiles, assigns each its target slot
/// and a shuffled scatter position.
pub(crate) fn build_layout<R: Rng + ?Sized>(
    side: u32,
    image: &Bitmap,
    geometry: &BoardGeometry,
    rng: &mut R,
) -> Layout {
    let side = side.max(1);
    let count = (side * side) as usize;
    let cell_width = (image.width() / side).max(1);
    let cell_height = (image.height() / side).max(1);

    let correct = correct_positions(side, cell_width, cell_height, geometry.target_origin());

    let widest = image.width().saturating_sub(cell_width * (side - 1)).max(cell_width);
    let tallest = image
        .height()
        .saturating_sub(cell_height * (side - 1))
        .max(cell_height);
    let mut initial = scatter_positions(
        count,
        widest,
        tallest,
        geometry.scatter_gap,
        geometry.scatter_origin(),
    );
    initial.shuffle(rng);

    let tiles = (0..count)
        .map(|index| {
            let col = index as u32 % side;
            let row = index as u32 / side;
            let x = col * cell_width;
            let y = row * cell_height;
            let width = if col == side - 1 {
                image.width().saturating_sub(x)
            } else {
                cell_width
            };
            let height = if row == side - 1 {
                image.height().saturating_sub(y)
            } else {
                cell_height
            };
            Tile {
                index,
                bitmap: Arc::new(image.cropped(x, y, width, height)),
                position: initial[index],
                correct: correct[index],
                initial: initial[index],
            }
        })
        .collect();

    Layout {
        tiles,
        z_order: (0..count).collect(),
    }
}

/// Row-major target slots spaced one cell apart from `origin`.
pub(crate) fn correct_positions(
    side: u32,
    cell_width: u32,
    cell_height: u32,
    origin: PointPx,
) -> Vec<PointPx> {
    (0..side * side)
        .map(|index| {
            origin.offset(
                ((index % side) * cell_width) as i32,
                ((index / side) * cell_height) as i32,
            )
        })
        .collect()
}

/// Unshuffled scatter slots: a ceil(sqrt(count))-wide grid whose stride is
/// one tile plus `gap`, so tiles of at most `tile_width` x `tile_height`
/// never overlap.
pub(crate) fn scatter_positions(
    count: usize,
    tile_width: u32,
    tile_height: u32,
    gap: i32,
    origin: PointPx,
) -> Vec<PointPx> {
    let columns = ((count as f64).sqrt().ceil() as usize).max(1);
    let stride_x = tile_width as i32 + gap;
    let stride_y = tile_height as i32 + gap;
    (0..count)
        .map(|index| {
            origin.offset(
                (index % columns) as i32 * stride_x,
                (index / columns) as i32 * stride_y,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn geometry() -> BoardGeometry {
        BoardGeometry::from_config(&PuzzleConfig::default())
    }

    fn gradient(size: u32) -> Bitmap {
        let mut rgba = Vec::with_capacity((size * size * 4) as usize);
        for y in 0..size {
            for x in 0..size {
                rgba.extend_from_slice(&[x as u8, y as u8, (x ^ y) as u8, 255]);
            }
        }
        Bitmap::from_rgba(size, size, rgba).expect("rgba")
    }

    #[test]
    fn target_square_is_centered_above_reserve() {
        let geometry = geometry();
        assert_eq!(geometry.target_origin(), PointPx::new(600, 225));
        assert_eq!(geometry.border_rect(), RectPx::new(450, 75, 700, 700));
        assert_eq!(geometry.scatter_origin(), PointPx::new(20, 250));
    }

    #[test]
    fn correct_positions_are_row_major_and_a_cell_apart() {
        let origin = PointPx::new(600, 225);
        let positions = correct_positions(3, 133, 133, origin);
        assert_eq!(positions.len(), 9);
        assert_eq!(positions[0], origin);
        assert_eq!(positions[1], PointPx::new(733, 225));
        assert_eq!(positions[3], PointPx::new(600, 358));
        for (i, a) in positions.iter().enumerate() {
            for b in positions.iter().skip(i + 1) {
                assert!((a.x - b.x).abs() >= 133 || (a.y - b.y).abs() >= 133);
            }
        }
    }

    #[test]
    fn last_row_and_column_absorb_remainder() {
        let image = gradient(400);
        let layout = build_layout(3, &image, &geometry(), &mut StdRng::seed_from_u64(1));
        let sizes: Vec<_> = layout.tiles().iter().map(Tile::size).collect();
        assert_eq!(sizes[0], (133, 133));
        assert_eq!(sizes[2], (134, 133));
        assert_eq!(sizes[6], (133, 134));
        assert_eq!(sizes[8], (134, 134));
        assert_eq!(layout.tile(4).expect("tile").correct, PointPx::new(733, 358));
    }

    #[test]
    fn tiles_carry_their_slice_of_the_image() {
        let image = gradient(400);
        let layout = build_layout(2, &image, &geometry(), &mut StdRng::seed_from_u64(2));
        let tile = layout.tile(3).expect("tile");
        assert_eq!(tile.bitmap.pixel(0, 0), image.pixel(200, 200));
        assert_eq!(tile.correct, PointPx::new(800, 425));
    }

    #[test]
    fn scatter_slots_do_not_overlap_each_other_or_the_target() {
        let geometry = geometry();
        for side in 2..=5u32 {
            let image = gradient(400);
            let layout = build_layout(side, &image, &geometry, &mut StdRng::seed_from_u64(3));
            let bounds: Vec<_> = layout.tiles().iter().map(Tile::bounds).collect();
            for (i, a) in bounds.iter().enumerate() {
                assert!(!a.intersects(&geometry.target_rect()), "side {side}");
                for b in bounds.iter().skip(i + 1) {
                    assert!(!a.intersects(b), "side {side}");
                }
            }
        }
    }

    #[test]
    fn shuffle_is_a_bijection_onto_scatter_slots() {
        let geometry = geometry();
        let image = gradient(400);
        let layout = build_layout(4, &image, &geometry, &mut StdRng::seed_from_u64(4));
        let expected: HashSet<_> = scatter_positions(16, 100, 100, 20, geometry.scatter_origin())
            .into_iter()
            .collect();
        let actual: HashSet<_> = layout.tiles().iter().map(|tile| tile.initial).collect();
        assert_eq!(actual, expected);
        assert!(layout.tiles().iter().all(|tile| tile.position == tile.initial));
    }

    #[test]
    fn shuffle_is_close_to_uniform() {
        let geometry = geometry();
        let image = gradient(40);
        let slots = scatter_positions(4, 20, 20, 20, geometry.scatter_origin());
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut counts: HashMap<Vec<usize>, u32> = HashMap::new();
        let trials = 24_000;
        for _ in 0..trials {
            let layout = build_layout(2, &image, &geometry, &mut rng);
            let permutation: Vec<usize> = layout
                .tiles()
                .iter()
                .map(|tile| slots.iter().position(|slot| *slot == tile.initial).expect("slot"))
                .collect();
            *counts.entry(permutation).or_default() += 1;
        }
        assert_eq!(counts.len(), 24);
        for count in counts.values() {
            assert!((800..=1200).contains(count), "count {count}");
        }
    }

    #[test]
    fn tile_at_prefers_top_of_draw_order() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut layout = build_layout(2, &gradient(400), &geometry(), &mut rng);
        for index in 0..4 {
            layout.tile_mut(index).expect("tile").position = PointPx::new(0, 0);
        }
        assert_eq!(layout.tile_at(PointPx::new(10, 10)), Some(3));
        layout.raise_to_top(1);
        assert_eq!(layout.tile_at(PointPx::new(10, 10)), Some(1));
        assert_eq!(
            layout.tiles_in_draw_order().map(|tile| tile.index).collect::<Vec<_>>(),
            vec![0, 2, 3, 1]
        );
        assert_eq!(layout.tile_at(PointPx::new(500, 10)), None);
    }

    #[test]
    fn solved_only_when_every_tile_is_exact() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut layout = build_layout(2, &gradient(400), &geometry(), &mut rng);
        for index in 0..4 {
            let tile = layout.tile_mut(index).expect("tile");
            tile.position = tile.correct;
        }
        assert!(layout.is_solved());
        layout.tile_mut(2).expect("tile").position.x += 1;
        assert!(!layout.is_solved());
    }
}
