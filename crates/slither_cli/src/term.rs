//! Text rendering of frames and the history table.

use std::fmt::Write as _;

use owo_colors::OwoColorize;
use slither::ledger::HistoryEntry;
use slither::render::{CellKind, Frame, Palette};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermStyle {
    /// Truecolor background blocks.
    Ansi,
    /// One ASCII glyph per cell, for logs and dumb terminals.
    Plain,
}

fn plain_glyph(kind: CellKind) -> char {
    match kind {
        CellKind::Wall => '#',
        CellKind::Fruit => '@',
        CellKind::Body { from_tail: 0 } => 'o',
        CellKind::Body { .. } => 'O',
        CellKind::Floor { .. } => '.',
    }
}

fn cell_text(kind: CellKind, frame: &Frame, palette: &Palette, style: TermStyle) -> String {
    match style {
        TermStyle::Plain => plain_glyph(kind).to_string(),
        TermStyle::Ansi => {
            let c = palette.color(kind, frame.grid);
            let glyph = if kind == CellKind::Fruit { "()" } else { "  " };
            glyph.on_truecolor(c.r, c.g, c.b).to_string()
        }
    }
}

fn blank_row(frame: &Frame, style: TermStyle) -> String {
    let width = match style {
        TermStyle::Plain => frame.side() as usize,
        TermStyle::Ansi => frame.side() as usize * 2,
    };
    " ".repeat(width)
}

/// Lay out frames side by side, separated by `gap` spaces.
pub fn render_frames(frames: &[&Frame], palette: &Palette, style: TermStyle, gap: usize) -> String {
    let height = frames.iter().map(|f| f.side()).max().unwrap_or(0) as usize;
    let mut out = String::new();
    for row in 0..height {
        let line: Vec<String> = frames
            .iter()
            .map(|f| match f.rows().nth(row) {
                Some(cells) => cells
                    .iter()
                    .map(|&k| cell_text(k, f, palette, style))
                    .collect(),
                None => blank_row(f, style),
            })
            .collect();
        out.push_str(line.join(&" ".repeat(gap)).trim_end());
        out.push('\n');
    }
    out
}

pub fn render_history<'a>(entries: impl IntoIterator<Item = &'a HistoryEntry>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>3} {:<16} {:<7} {:<9} {:>6} {:>6} {:>6} {:>11}  {}",
        "#", "agent", "grid", "training", "moves", "fruits", "length", "moves/fruit", "result"
    );
    // Row numbers start at 1 and are what the restore commands take.
    for (row, e) in entries.into_iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3} {:<16} {:<7} {:<9} {:>6} {:>6} {:>6} {:>11.3}  {}",
            row + 1,
            e.agent.display_name(),
            e.grid.to_string(),
            e.training.display(),
            e.summary.move_count,
            e.summary.fruit_count,
            e.summary.final_length,
            e.summary.avg_moves_per_fruit,
            e.summary.outcome.label()
        );
    }
    out
}
