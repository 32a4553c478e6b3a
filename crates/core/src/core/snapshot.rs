use serde::{Deserialize, Serialize};

use crate::catalog::GridSize;
use crate::error::{Result, SlitherError};

/// One simulation frame as sent by the backend.
///
/// `snake` lists occupied cells in the backend's body order; cell indices
/// address the full grid including the border (`row * total + col`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub snake: Vec<u32>,
    pub fruit: u32,
    #[serde(default)]
    pub won: bool,
    #[serde(default)]
    pub died: bool,
}

impl Snapshot {
    pub fn body_len(&self) -> usize {
        self.snake.len()
    }

    /// Fruit eaten so far: every segment past the first came from a fruit.
    pub fn fruit_count(&self) -> usize {
        self.snake.len().saturating_sub(1)
    }

    pub fn is_terminal(&self) -> bool {
        self.won || self.died
    }
}

/// Reject a run that cannot be drawn on `grid`: empty runs and any cell that
/// falls outside the grid.
pub fn validate_run(grid: GridSize, snapshots: &[Snapshot]) -> Result<()> {
    if snapshots.is_empty() {
        return Err(SlitherError::Shape("run has no snapshots".to_string()));
    }
    let limit = grid.cell_count();
    for s in snapshots {
        if let Some(&cell) = s
            .snake
            .iter()
            .chain(core::iter::once(&s.fruit))
            .find(|&&c| c >= limit)
        {
            return Err(SlitherError::CellOutOfRange { cell, grid });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(snake: &[u32], fruit: u32) -> Snapshot {
        Snapshot {
            snake: snake.to_vec(),
            fruit,
            won: false,
            died: false,
        }
    }

    #[test]
    fn decodes_backend_frame() {
        let s: Snapshot =
            serde_json::from_str(r#"{"snake":[12,11],"fruit":6,"won":false,"died":true}"#)
                .unwrap();
        assert_eq!(s.snake, vec![12, 11]);
        assert_eq!(s.fruit_count(), 1);
        assert!(s.is_terminal());
    }

    #[test]
    fn flags_default_to_false() {
        let s: Snapshot = serde_json::from_str(r#"{"snake":[7],"fruit":8}"#).unwrap();
        assert!(!s.won && !s.died);
    }

    #[test]
    fn validation_rejects_empty_and_out_of_range_runs() {
        assert!(matches!(
            validate_run(GridSize::Small, &[]),
            Err(SlitherError::Shape(_))
        ));
        assert_eq!(
            validate_run(GridSize::Small, &[snap(&[12], 25)]),
            Err(SlitherError::CellOutOfRange {
                cell: 25,
                grid: GridSize::Small
            })
        );
        assert!(validate_run(GridSize::Small, &[snap(&[12, 11], 6)]).is_ok());
    }
}
