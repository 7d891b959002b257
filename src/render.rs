//! Text rendering of the dial for terminals

use crate::{
    geometry::{dial_ticks, DialLayout, Point},
    state::TimerSnapshot,
};

const HIGHLIGHT: char = '#';
const TRACK: char = '.';
const EMPTY: char = ' ';

/// Samples taken along each tick, per cell of radius
const SAMPLES_PER_CELL: f32 = 4.0;

/// Format seconds as `MM:SS`, or `H:MM:SS` from one hour up
pub fn format_elapsed(seconds: u32) -> String {
    let h = seconds / 3600;
    let m = (seconds % 3600) / 60;
    let s = seconds % 60;
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{:02}:{:02}", m, s)
    }
}

/// Square character grid the dial is rasterized into
#[derive(Debug, Clone)]
pub struct DialCanvas {
    size: u16,
    layout: DialLayout,
}

impl DialCanvas {
    pub fn new(size: u16) -> Self {
        let size = size.max(1);
        let side = f32::from(size);
        Self {
            size,
            layout: DialLayout::for_size(side, side),
        }
    }

    pub fn size(&self) -> u16 {
        self.size
    }

    /// Dial center in cell coordinates
    pub fn center(&self) -> Point {
        self.layout.center
    }

    /// Point at the middle of a cell, for turning typed coordinates into touches
    pub fn cell_center(&self, column: u16, row: u16) -> Point {
        Point::new(f32::from(column) + 0.5, f32::from(row) + 0.5)
    }

    fn cell_at(&self, point: Point) -> Option<(usize, usize)> {
        if point.x < 0.0 || point.y < 0.0 {
            return None;
        }
        let (column, row) = (point.x as usize, point.y as usize);
        let size = usize::from(self.size);
        (column < size && row < size).then_some((column, row))
    }

    /// Rasterize the ticks for `progress` into rows of characters
    pub fn rasterize(&self, progress: f32, tick_count: u32) -> Vec<Vec<char>> {
        let size = usize::from(self.size);
        let mut cells = vec![vec![EMPTY; size]; size];

        let DialLayout { center, inner_radius, outer_radius } = self.layout;
        let length = (outer_radius - inner_radius).max(0.0);
        let samples = ((length * SAMPLES_PER_CELL).ceil() as usize).max(1);

        for tick in dial_ticks(progress, tick_count) {
            let segment = tick.segment(center, inner_radius, outer_radius);
            for step in 0..=samples {
                let t = step as f32 / samples as f32;
                let point = Point::new(
                    segment.start.x + (segment.track_end.x - segment.start.x) * t,
                    segment.start.y + (segment.track_end.y - segment.start.y) * t,
                );
                let Some((column, row)) = self.cell_at(point) else {
                    continue;
                };

                let glyph = if tick.is_highlighted() && t <= tick.fill {
                    HIGHLIGHT
                } else {
                    TRACK
                };
                let cell = &mut cells[row][column];
                if *cell != HIGHLIGHT {
                    *cell = glyph;
                }
            }
        }

        cells
    }

    /// Draw the dial with the remaining time centered inside it
    pub fn draw(&self, snapshot: &TimerSnapshot) -> String {
        let cells = self.rasterize(snapshot.progress, snapshot.time_limit);
        let label = format_elapsed(snapshot.time_remaining);
        let middle = cells.len() / 2;

        let mut out = String::new();
        for (index, row) in cells.iter().enumerate() {
            // Cells are two characters wide so the dial looks round
            let mut line: Vec<char> = row.iter().flat_map(|&c| [c, ' ']).collect();
            if index == middle {
                let start = (line.len().saturating_sub(label.len())) / 2;
                for (offset, c) in label.chars().enumerate() {
                    if let Some(slot) = line.get_mut(start + offset) {
                        *slot = c;
                    }
                }
            }
            out.push_str(line.iter().collect::<String>().trim_end());
            out.push('\n');
        }

        out.push_str(&status_line(snapshot));
        out.push('\n');
        out
    }
}

/// One-line summary of the controls' state
pub fn status_line(snapshot: &TimerSnapshot) -> String {
    let mut line = format!(
        "{} [{}]",
        format_elapsed(snapshot.time_remaining),
        if snapshot.running { "stop" } else { "start" }
    );
    if snapshot.reset_visible {
        line.push_str(" [reset]");
    }
    line
}
