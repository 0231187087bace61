//! Text readout of the model matrix.

use std::fmt::Write;

use nalgebra::Matrix4;

use crate::error::Result;

/// Destination for the exported matrix text
pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> Result<()>;
}

/// Format `matrix` row by row with three decimals.
///
/// Each row reads `[a, b, c, d]`; every column is right-aligned to its widest
/// entry so the grid lines up in a monospaced font.
pub fn format_matrix(matrix: &Matrix4<f32>) -> String {
    let cells: [[String; 4]; 4] =
        std::array::from_fn(|row| std::array::from_fn(|col| format_cell(matrix[(row, col)])));
    let widths: [usize; 4] =
        std::array::from_fn(|col| cells.iter().map(|row| row[col].len()).max().unwrap_or(0));

    let mut out = String::new();
    for row in &cells {
        out.push('[');
        for (col, cell) in row.iter().enumerate() {
            if col > 0 {
                out.push_str(", ");
            }
            let _ = write!(out, "{cell:>width$}", width = widths[col]);
        }
        out.push_str("]\n");
    }
    out
}

fn format_cell(value: f32) -> String {
    let text = format!("{value:.3}");
    // Tiny negatives round to "-0.000"
    if text == "-0.000" {
        "0.000".to_string()
    } else {
        text
    }
}

/// Copy the formatted matrix to `clipboard`, returning the text written
pub fn export_matrix(matrix: &Matrix4<f32>, clipboard: &mut dyn Clipboard) -> Result<String> {
    let text = format_matrix(matrix);
    clipboard.set_text(&text)?;
    log::info!("matrix copied to clipboard");
    Ok(text)
}
