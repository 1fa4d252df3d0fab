use cavewar_core::Theme;

use crate::grid::CaveGrid;
use crate::level::LevelConfig;
use crate::segment::{Segment, SegmentId, SegmentIdentity};

/// A horizontal run of solid cells within one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    pub row: usize,
    pub start: usize,
    pub len: usize,
}

impl Run {
    #[inline]
    pub fn end(&self) -> usize {
        self.start + self.len - 1
    }
}

/// Greedy left-to-right run-length merge of solid cells in every row.
pub fn merge_runs(grid: &CaveGrid) -> Vec<Run> {
    let mut runs = Vec::new();
    for row in 0..grid.height() {
        let mut start: Option<usize> = None;
        for (x, solid) in grid.row(row).iter().copied().enumerate() {
            match (solid, start) {
                (true, None) => start = Some(x),
                (false, Some(s)) => {
                    runs.push(Run {
                        row,
                        start: s,
                        len: x - s,
                    });
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(s) = start {
            runs.push(Run {
                row,
                start: s,
                len: grid.width() - s,
            });
        }
    }
    runs
}

/// Turn the finished grid into wall segments plus the three frame walls.
///
/// A run touching the outer ring becomes an indestructible boundary; every
/// other run is a destructible voxel at full health.
pub fn voxelize(grid: &CaveGrid, config: &LevelConfig, theme: Theme) -> Vec<Segment> {
    let ts = config.tile();
    let floor_y = config.floor_y();
    let (w, h) = (grid.width(), grid.height());
    let mut segments = Vec::new();

    for run in merge_runs(grid) {
        let x = run.start as f32 * ts + run.len as f32 * ts / 2.0;
        let y = ts + run.row as f32 * ts + ts / 2.0;
        if !(y > ts && y < floor_y) {
            continue;
        }
        let identity = SegmentIdentity::new(x, y, run.len as f32 * ts, ts);
        let id = SegmentId::from_grid(run.row, run.start, w);
        let touches_ring = run.start == 0 || run.end() == w - 1 || run.row == 0 || run.row == h - 1;
        segments.push(if touches_ring {
            Segment::boundary(id, identity, theme)
        } else {
            Segment::destructible(id, identity, theme, config.voxel_max_health)
        });
    }

    let world_w = config.world_width as f32;
    let playable = config.playable_height();
    let frame = [
        SegmentIdentity::new(ts / 2.0, playable / 2.0 + ts, ts, playable),
        SegmentIdentity::new(world_w - ts / 2.0, playable / 2.0 + ts, ts, playable),
        SegmentIdentity::new(world_w / 2.0, ts / 2.0, world_w, ts),
    ];
    let first_frame_id = (w * h) as u32;
    for (offset, identity) in frame.into_iter().enumerate() {
        segments.push(Segment::boundary(
            SegmentId(first_frame_id + offset as u32),
            identity,
            theme,
        ));
    }
    segments
}
