use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum LevelTableError {
    #[error("the table has no levels")]
    Empty,
    #[error("level {level} has {count} tiles, which is not a positive perfect square")]
    NotSquare { level: usize, count: u32 },
}

/// Tile count per level, 1-based. Every count is a perfect square.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LevelTable {
    tile_counts: Vec<u32>,
}

impl Default for LevelTable {
    fn default() -> Self {
        Self {
            tile_counts: vec![4, 9, 16, 25],
        }
    }
}

impl LevelTable {
    pub(crate) fn new(tile_counts: Vec<u32>) -> Result<Self, LevelTableError> {
        if tile_counts.is_empty() {
            return Err(LevelTableError::Empty);
        }
        for (index, count) in tile_counts.iter().copied().enumerate() {
            if count == 0 || exact_sqrt(count).is_none() {
                return Err(LevelTableError::NotSquare {
                    level: index + 1,
                    count,
                });
            }
        }
        Ok(Self { tile_counts })
    }

    pub(crate) fn last_level(&self) -> u32 {
        self.tile_counts.len() as u32
    }

    pub(crate) fn tile_count(&self, level: u32) -> Option<u32> {
        let index = usize::try_from(level).ok()?.checked_sub(1)?;
        self.tile_counts.get(index).copied()
    }

    pub(crate) fn grid_side(&self, level: u32) -> Option<u32> {
        self.tile_count(level).and_then(exact_sqrt)
    }

    pub(crate) fn max_grid_side(&self) -> Option<u32> {
        self.tile_counts.iter().copied().filter_map(exact_sqrt).max()
    }

    pub(crate) fn is_past_last(&self, level: u32) -> bool {
        level > self.last_level()
    }
}

fn exact_sqrt(value: u32) -> Option<u32> {
    let root = (value as f64).sqrt().round() as u32;
    (root.checked_mul(root) == Some(value)).then_some(root)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_levels_are_square() {
        let table = LevelTable::default();
        for level in 1..=table.last_level() {
            let count = table.tile_count(level).expect("count");
            let side = table.grid_side(level).expect("side");
            assert_eq!(side * side, count);
        }
        assert_eq!(table.grid_side(1), Some(2));
        assert_eq!(table.grid_side(4), Some(5));
    }

    #[test]
    fn levels_are_one_based_and_bounded() {
        let table = LevelTable::default();
        assert_eq!(table.tile_count(0), None);
        assert_eq!(table.tile_count(5), None);
        assert!(!table.is_past_last(4));
        assert!(table.is_past_last(5));
    }

    #[test]
    fn rejects_non_square_and_empty_tables() {
        assert_eq!(LevelTable::new(Vec::new()), Err(LevelTableError::Empty));
        assert_eq!(
            LevelTable::new(vec![4, 10]),
            Err(LevelTableError::NotSquare {
                level: 2,
                count: 10
            })
        );
        assert!(matches!(
            LevelTable::new(vec![0]),
            Err(LevelTableError::NotSquare { level: 1, .. })
        ));
    }

    #[test]
    fn max_grid_side_picks_largest() {
        let table = LevelTable::new(vec![9, 1, 36]).expect("table");
        assert_eq!(table.max_grid_side(), Some(6));
    }
}
