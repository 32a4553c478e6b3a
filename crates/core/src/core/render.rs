//! Grid rendering contract: classify every cell of a lane's current frame
//! and map it to a colour. Pure, recomputed on every read.

use crate::catalog::GridSize;
use crate::lane::Lane;
use crate::snapshot::Snapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Wall,
    Fruit,
    /// `from_tail` is the segment's distance from the last entry of the body list.
    Body { from_tail: u32 },
    /// `shaded` alternates by `(row + col)` parity.
    Floor { shaded: bool },
}

/// What the status line under a grid shows for the drawn frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameStatus {
    pub index: usize,
    pub last_index: usize,
    pub fruit_count: usize,
    pub length: usize,
    pub won: bool,
    pub died: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub grid: GridSize,
    /// Row-major, `grid.total()` squared.
    pub cells: Vec<CellKind>,
    pub status: Option<FrameStatus>,
}

impl Frame {
    /// Classify `snapshot` on `grid`. `None` draws just walls and floor.
    pub fn render(grid: GridSize, snapshot: Option<&Snapshot>) -> Self {
        let n = grid.total();
        let mut cells: Vec<CellKind> = (0..n * n)
            .map(|i| {
                let (row, col) = (i / n, i % n);
                if row == 0 || col == 0 || row == n - 1 || col == n - 1 {
                    CellKind::Wall
                } else {
                    CellKind::Floor {
                        shaded: (row + col) % 2 == 1,
                    }
                }
            })
            .collect();

        if let Some(s) = snapshot {
            let len = s.snake.len() as u32;
            for (i, &cell) in s.snake.iter().enumerate() {
                if let Some(slot) = cells.get_mut(cell as usize) {
                    if *slot != CellKind::Wall {
                        *slot = CellKind::Body {
                            from_tail: len - 1 - i as u32,
                        };
                    }
                }
            }
            if let Some(slot) = cells.get_mut(s.fruit as usize) {
                if *slot != CellKind::Wall {
                    *slot = CellKind::Fruit;
                }
            }
        }

        Self {
            grid,
            cells,
            status: None,
        }
    }

    /// Frame a lane shows at `cursor`. Empty lanes draw on `fallback` grid.
    pub fn for_lane(lane: &Lane, cursor: usize, fallback: GridSize) -> Self {
        match lane.effective_index(cursor) {
            Some(index) => {
                let s = &lane.snapshots()[index];
                let mut frame = Frame::render(lane.grid(), Some(s));
                frame.status = Some(FrameStatus {
                    index,
                    last_index: lane.len() - 1,
                    fruit_count: s.fruit_count(),
                    length: s.body_len(),
                    won: s.won,
                    died: s.died,
                });
                frame
            }
            None => Frame::render(fallback, None),
        }
    }

    pub fn side(&self) -> u32 {
        self.grid.total()
    }

    /// Cells grouped by row.
    pub fn rows(&self) -> impl Iterator<Item = &[CellKind]> {
        self.cells.chunks(self.side() as usize)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn lerp(self, to: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgb::new(mix(self.r, to.r), mix(self.g, to.g), mix(self.b, to.b))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub wall: Rgb,
    pub fruit: Rgb,
    pub floor: Rgb,
    pub floor_shaded: Rgb,
    /// Colour at the tail end of the body list.
    pub body_from: Rgb,
    /// Colour a segment would get at the longest body the grid can hold.
    pub body_to: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            wall: Rgb::new(0x2b, 0x2d, 0x42),
            fruit: Rgb::new(0xe7, 0x47, 0x1d),
            floor: Rgb::new(0xaa, 0xd7, 0x51),
            floor_shaded: Rgb::new(0xa2, 0xd1, 0x49),
            body_from: Rgb::new(0x4e, 0x7c, 0xf6),
            body_to: Rgb::new(0x1b, 0x2a, 0x8c),
        }
    }
}

impl Palette {
    /// Colour for one cell. Body shades scale against the grid's maximum
    /// body length, so a given segment looks the same however long the
    /// snake currently is.
    pub fn color(&self, kind: CellKind, grid: GridSize) -> Rgb {
        match kind {
            CellKind::Wall => self.wall,
            CellKind::Fruit => self.fruit,
            CellKind::Floor { shaded: false } => self.floor,
            CellKind::Floor { shaded: true } => self.floor_shaded,
            CellKind::Body { from_tail } => {
                let t = from_tail as f32 / grid.max_body_len().max(1) as f32;
                self.body_from.lerp(self.body_to, t)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AgentKind, TrainingBudget};

    fn snap(snake: &[u32], fruit: u32) -> Snapshot {
        Snapshot {
            snake: snake.to_vec(),
            fruit,
            won: false,
            died: false,
        }
    }

    #[test]
    fn empty_frame_is_walls_and_floor() {
        let f = Frame::render(GridSize::Small, None);
        assert_eq!(f.cells.len(), 25);
        let walls = f.cells.iter().filter(|c| **c == CellKind::Wall).count();
        assert_eq!(walls, 16);
        assert!(f
            .cells
            .iter()
            .all(|c| matches!(c, CellKind::Wall | CellKind::Floor { .. })));
        assert_eq!(f.rows().count(), 5);
    }

    #[test]
    fn body_segments_count_from_the_tail_end() {
        let f = Frame::render(GridSize::Small, Some(&snap(&[12, 11, 6], 8)));
        assert_eq!(f.cells[12], CellKind::Body { from_tail: 2 });
        assert_eq!(f.cells[11], CellKind::Body { from_tail: 1 });
        assert_eq!(f.cells[6], CellKind::Body { from_tail: 0 });
        assert_eq!(f.cells[8], CellKind::Fruit);
        assert_eq!(f.cells[7], CellKind::Floor { shaded: true });
        assert_eq!(f.cells[16], CellKind::Floor { shaded: false });
    }

    #[test]
    fn gradient_is_stable_across_body_lengths() {
        let p = Palette::default();
        let g = GridSize::Small;
        assert_eq!(p.color(CellKind::Body { from_tail: 0 }, g), p.body_from);
        assert_eq!(p.color(CellKind::Body { from_tail: 9 }, g), p.body_to);

        let short = Frame::render(g, Some(&snap(&[7, 6], 18)));
        let long = Frame::render(g, Some(&snap(&[13, 12, 7, 6], 18)));
        assert_eq!(p.color(short.cells[6], g), p.color(long.cells[6], g));
    }

    #[test]
    fn lane_frame_clamps_and_reports_status() {
        let mut lane = Lane::new(AgentKind::AStar);
        lane.set(
            vec![snap(&[12], 6), snap(&[12, 11], 6)],
            GridSize::Small,
            AgentKind::AStar,
            TrainingBudget::NOT_APPLICABLE,
        )
        .unwrap();
        let f = Frame::for_lane(&lane, 40, GridSize::Large);
        assert_eq!(f.grid, GridSize::Small);
        let st = f.status.unwrap();
        assert_eq!((st.index, st.last_index, st.length), (1, 1, 2));

        let empty = Frame::for_lane(&Lane::default(), 3, GridSize::Large);
        assert_eq!(empty.grid, GridSize::Large);
        assert!(empty.status.is_none());
    }

    #[test]
    fn hex_formats_lowercase() {
        assert_eq!(Rgb::new(0xe7, 0x47, 0x1d).hex(), "#e7471d");
    }
}
