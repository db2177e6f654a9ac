use std::path::Path;

use crate::error::EvalError;
use crate::imaging::RasterImage;

/// 8in x 8in, in PDF points.
pub const FIGURE_SIZE_PT: f32 = 576.0;

#[derive(Debug, Clone, PartialEq)]
pub enum CellContent {
    Image(RasterImage),
    /// Framed box with a short message, used where no image exists.
    Placeholder(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub content: CellContent,
    pub caption: Option<String>,
}

/// A titled grid of images on one page. Each figure owns its own canvas state.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    width: f32,
    height: f32,
    title: Vec<String>,
    rows: usize,
    columns: usize,
    row_labels: Vec<Option<String>>,
    cells: Vec<Option<Cell>>,
}

impl Figure {
    pub fn grid(rows: usize, columns: usize) -> Self {
        Self {
            width: FIGURE_SIZE_PT,
            height: FIGURE_SIZE_PT,
            title: Vec::new(),
            rows,
            columns,
            row_labels: vec![None; rows],
            cells: vec![None; rows * columns],
        }
    }

    /// Title text; embedded newlines start new lines.
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.lines().map(str::to_string).collect();
        self
    }

    pub fn set_cell(
        &mut self,
        row: usize,
        column: usize,
        content: CellContent,
        caption: Option<String>,
    ) -> Result<(), EvalError> {
        let slot = self.slot(row, column)?;
        self.cells[slot] = Some(Cell { content, caption });
        Ok(())
    }

    pub fn set_row_label(&mut self, row: usize, label: impl Into<String>) -> Result<(), EvalError> {
        let label_slot = self.row_labels.get_mut(row).ok_or_else(|| {
            EvalError::invalid_input(format!("row {row} is outside a {}-row figure", self.rows))
        })?;
        *label_slot = Some(label.into());
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn title(&self) -> &[String] {
        &self.title
    }

    pub fn page_size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&Cell> {
        self.slot(row, column)
            .ok()
            .and_then(|slot| self.cells[slot].as_ref())
    }

    pub fn row_label(&self, row: usize) -> Option<&str> {
        self.row_labels.get(row).and_then(|l| l.as_deref())
    }

    pub fn filled_cells(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    pub fn save_pdf(&self, path: &Path) -> Result<(), EvalError> {
        let bytes = super::pdf::render_pdf(self)?;
        std::fs::write(path, bytes).map_err(|e| EvalError::io("writing PDF figure", path, e))
    }

    pub(crate) fn cells(&self) -> impl Iterator<Item = (usize, usize, &Cell)> {
        let columns = self.columns.max(1);
        self.cells
            .iter()
            .enumerate()
            .filter_map(move |(slot, cell)| cell.as_ref().map(|c| (slot / columns, slot % columns, c)))
    }

    fn slot(&self, row: usize, column: usize) -> Result<usize, EvalError> {
        if row >= self.rows || column >= self.columns {
            return Err(EvalError::invalid_input(format!(
                "cell ({row}, {column}) is outside a {}x{} grid",
                self.rows, self.columns
            )));
        }
        Ok(row * self.columns + column)
    }
}
