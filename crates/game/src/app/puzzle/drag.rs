use engine::{PointPx, RectPx};

use super::layout::Tile;

/// Transient state of the tile being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DragState {
    pub(crate) tile: usize,
    grab_offset: (i32, i32),
    last_bounds: RectPx,
}

impl DragState {
    pub(crate) fn begin(tile: &Tile, pointer: PointPx) -> Self {
        Self {
            tile: tile.index,
            grab_offset: (pointer.x - tile.position.x, pointer.y - tile.position.y),
            last_bounds: tile.bounds(),
        }
    }

    /// Moves `tile` under the pointer and returns the region to repaint: the
    /// union of where the tile was and where it is now.
    pub(crate) fn follow(&mut self, tile: &mut Tile, pointer: PointPx) -> RectPx {
        tile.position = PointPx::new(
            pointer.x - self.grab_offset.0,
            pointer.y - self.grab_offset.1,
        );
        let bounds = tile.bounds();
        let dirty = self.last_bounds.union(&bounds);
        self.last_bounds = bounds;
        dirty
    }
}

/// First slot, in index order, within `tolerance` of `position` on both axes.
pub(crate) fn snap_slot(
    position: PointPx,
    slots: impl IntoIterator<Item = PointPx>,
    tolerance: i32,
) -> Option<(usize, PointPx)> {
    slots.into_iter().enumerate().find(|(_, slot)| {
        (position.x - slot.x).abs() < tolerance && (position.y - slot.y).abs() < tolerance
    })
}
