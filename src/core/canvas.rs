use std::fmt;

use crate::error::{Result, TraceError};

/// Height/width ratio of a terminal character cell, used to keep the picture
/// from being squashed: a cell is roughly four times as tall as the unit the
/// NDC mapping works in.
pub const CHAR_DIM: f64 = 4.0;

/// A rows x cols grid of glyphs plus the pixel-to-NDC mapping for it.
/// Created once per camera, cleared between frames, never resized.
#[derive(Debug, Clone)]
pub struct Canvas {
    rows: usize,
    cols: usize,
    aspect: f64,
    cells: Vec<char>,
}

impl Canvas {
    /// Dimensions come from the terminal (or a debug override) and are not
    /// trusted: a zero-sized canvas is an error, not an empty render.
    pub fn new(rows: u16, cols: u16) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(TraceError::InvalidCanvas { rows, cols });
        }
        let (rows, cols) = (rows as usize, cols as usize);
        Ok(Self {
            rows,
            cols,
            aspect: cols as f64 / (rows as f64 * CHAR_DIM),
            cells: vec![' '; rows * cols],
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Column index to NDC x, in [-1, 1] scaled by the aspect ratio.
    pub fn ndc_x(&self, col: usize) -> f64 {
        (2.0 * (col as f64 / self.cols as f64) - 1.0) / self.aspect
    }

    /// Row index to NDC y. Rows grow downward, NDC y grows upward, hence the
    /// sign flip; CHAR_DIM compensates for the tall character cells.
    pub fn ndc_y(&self, row: usize) -> f64 {
        -(2.0 * (row as f64 / self.rows as f64) - 1.0) / CHAR_DIM
    }

    pub fn draw(&mut self, ch: char, row: usize, col: usize) {
        self.cells[row * self.cols + col] = ch;
    }

    pub fn glyph(&self, row: usize, col: usize) -> char {
        self.cells[row * self.cols + col]
    }

    pub fn clear(&mut self) {
        self.cells.fill(' ');
    }

    /// One row as a string, for cursor-addressed redraws in raw mode.
    pub fn line(&self, row: usize) -> String {
        self.cells[row * self.cols..(row + 1) * self.cols]
            .iter()
            .collect()
    }
}

impl fmt::Display for Canvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows {
            for &ch in &self.cells[row * self.cols..(row + 1) * self.cols] {
                write!(f, "{ch}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
