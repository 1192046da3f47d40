//! Snapshot renderer - aligned textual board dump.
//!
//! Rendering always works from a [`BoardSnapshot`] taken between turns,
//! never from live state, so slow output can never stall the arbiter.

use gridrace_core::{BoardSnapshot, Cell, Position};

/// Formats the board: one line per row, each cell label left-aligned to
/// four columns, `(C)` appended to a racer's mark while it carries a
/// carrot.
pub fn format_board(snapshot: &BoardSnapshot) -> String {
    let mut out = String::new();
    for row in 0..snapshot.size {
        let mut line = String::new();
        for col in 0..snapshot.size {
            let cell = snapshot.cells[row * snapshot.size + col];
            let label = cell_label(snapshot, cell, Position::new(row, col));
            line.push_str(&format!("{:<4} ", label));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

fn cell_label(snapshot: &BoardSnapshot, cell: Cell, pos: Position) -> String {
    if let Cell::Racer(symbol) = cell {
        let carrying = snapshot
            .racers
            .iter()
            .any(|r| r.alive && r.carrying && r.symbol == symbol && r.position == pos);
        if carrying {
            return format!("{}(C)", symbol);
        }
    }
    cell.glyph().to_string()
}
