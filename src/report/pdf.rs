//! Single-page PDF rendering for [`Figure`] on top of `pdf-writer`.
//!
//! The grid is laid out here in PDF user space (origin bottom-left). Image
//! cells become Flate `DeviceRGB` XObjects composited on white; text uses
//! the standard Helvetica font with WinAnsi encoding.

use std::io::Write as _;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref, Str};

use super::figure::{CellContent, Figure};
use crate::error::EvalError;

const MARGIN: f32 = 18.0;
const TITLE_LINE_HEIGHT: f32 = 14.0;
const TITLE_GAP: f32 = 8.0;
const ROW_LABEL_WIDTH: f32 = 36.0;
const CAPTION_HEIGHT: f32 = 12.0;
const CELL_PADDING: f32 = 3.0;

const TITLE_FONT_SIZE: f32 = 11.0;
const LABEL_FONT_SIZE: f32 = 8.0;
const FONT: Name<'static> = Name(b"F1");

/// Helvetica advance widths for ASCII 32..=126, in 1/1000 em (Adobe AFM).
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

/// Box in PDF user space; `y` is the bottom edge.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Area {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

/// Page geometry for one figure.
#[derive(Debug, Clone, Copy)]
struct Layout {
    page_width: f32,
    page_height: f32,
    grid_left: f32,
    grid_top: f32,
    cell_width: f32,
    cell_height: f32,
    caption_height: f32,
}

impl Layout {
    fn new(figure: &Figure) -> Self {
        let (page_width, page_height) = figure.page_size();
        let title_height = if figure.title().is_empty() {
            0.0
        } else {
            figure.title().len() as f32 * TITLE_LINE_HEIGHT + TITLE_GAP
        };
        let label_width = if (0..figure.rows()).any(|row| figure.row_label(row).is_some()) {
            ROW_LABEL_WIDTH
        } else {
            0.0
        };
        let grid_left = MARGIN + label_width;
        let grid_top = page_height - MARGIN - title_height;
        let grid_width = (page_width - grid_left - MARGIN).max(0.0);
        let grid_height = (grid_top - MARGIN).max(0.0);
        let caption_height = if figure.cells().any(|(_, _, cell)| cell.caption.is_some()) {
            CAPTION_HEIGHT
        } else {
            0.0
        };
        Self {
            page_width,
            page_height,
            grid_left,
            grid_top,
            cell_width: grid_width / figure.columns().max(1) as f32,
            cell_height: grid_height / figure.rows().max(1) as f32,
            caption_height,
        }
    }

    fn title_baseline(&self, line: usize) -> f32 {
        self.page_height - MARGIN - (line as f32 + 1.0) * TITLE_LINE_HEIGHT + 3.0
    }

    fn cell(&self, row: usize, column: usize) -> Area {
        Area {
            x: self.grid_left + column as f32 * self.cell_width,
            y: self.grid_top - (row as f32 + 1.0) * self.cell_height,
            width: self.cell_width,
            height: self.cell_height,
        }
    }

    /// Area inside a cell left for its content once padding and caption are taken.
    fn content(&self, row: usize, column: usize) -> Area {
        let cell = self.cell(row, column);
        Area {
            x: cell.x + CELL_PADDING,
            y: cell.y + CELL_PADDING + self.caption_height,
            width: (cell.width - 2.0 * CELL_PADDING).max(0.0),
            height: (cell.height - 2.0 * CELL_PADDING - self.caption_height).max(0.0),
        }
    }

    fn caption_anchor(&self, row: usize, column: usize) -> (f32, f32) {
        let cell = self.cell(row, column);
        (cell.x + cell.width / 2.0, cell.y + 3.0)
    }

    fn row_label_baseline(&self, row: usize) -> f32 {
        let cell = self.cell(row, 0);
        cell.y + cell.height / 2.0 - LABEL_FONT_SIZE / 3.0
    }
}

/// Largest aspect-preserving box for a `width x height` image, centred in `area`.
fn fit_image(area: Area, width: u32, height: u32) -> Option<Area> {
    if width == 0 || height == 0 || area.width <= 0.0 || area.height <= 0.0 {
        return None;
    }
    let scale = (area.width / width as f32).min(area.height / height as f32);
    let fitted_width = width as f32 * scale;
    let fitted_height = height as f32 * scale;
    Some(Area {
        x: area.x + (area.width - fitted_width) / 2.0,
        y: area.y + (area.height - fitted_height) / 2.0,
        width: fitted_width,
        height: fitted_height,
    })
}

pub(crate) fn render_pdf(figure: &Figure) -> Result<Vec<u8>, EvalError> {
    let layout = Layout::new(figure);
    let catalog_id = Ref::new(1);
    let page_tree_id = Ref::new(2);
    let page_id = Ref::new(3);
    let font_id = Ref::new(4);
    let content_id = Ref::new(5);
    let mut next_id = Ref::new(6);

    let mut pdf = Pdf::new();
    let mut content = Content::new();
    let mut image_names: Vec<(Ref, String)> = Vec::new();

    for (line_no, line) in figure.title().iter().enumerate() {
        show_centered(
            &mut content,
            layout.page_width / 2.0,
            layout.title_baseline(line_no),
            TITLE_FONT_SIZE,
            line,
        );
    }
    for row in 0..figure.rows() {
        if let Some(label) = figure.row_label(row) {
            show_text(&mut content, MARGIN, layout.row_label_baseline(row), LABEL_FONT_SIZE, label);
        }
    }

    for (row, column, cell) in figure.cells() {
        let area = layout.content(row, column);
        match &cell.content {
            CellContent::Image(image) => match fit_image(area, image.width(), image.height()) {
                Some(placement) => {
                    let id = next_id.bump();
                    let name = format!("Im{}", image_names.len());
                    let width = pdf_dimension(image.width())?;
                    let height = pdf_dimension(image.height())?;
                    let pixels = deflate(&image.composite_on_white())?;

                    let mut xobject = pdf.image_xobject(id, &pixels);
                    xobject.filter(Filter::FlateDecode);
                    xobject.width(width);
                    xobject.height(height);
                    xobject.color_space().device_rgb();
                    xobject.bits_per_component(8);
                    xobject.finish();

                    content.save_state();
                    content.transform([
                        placement.width,
                        0.0,
                        0.0,
                        placement.height,
                        placement.x,
                        placement.y,
                    ]);
                    content.x_object(Name(name.as_bytes()));
                    content.restore_state();
                    frame(&mut content, placement, 0.0);
                    image_names.push((id, name));
                }
                None => placeholder(&mut content, area, "empty image"),
            },
            CellContent::Placeholder(message) => placeholder(&mut content, area, message),
        }
        if let Some(caption) = &cell.caption {
            let (x, y) = layout.caption_anchor(row, column);
            show_centered(&mut content, x, y, LABEL_FONT_SIZE, caption);
        }
    }

    pdf.catalog(catalog_id).pages(page_tree_id);
    pdf.pages(page_tree_id).kids([page_id]).count(1);
    {
        let mut page = pdf.page(page_id);
        page.media_box(Rect::new(0.0, 0.0, layout.page_width, layout.page_height));
        page.parent(page_tree_id);
        page.contents(content_id);
        let mut resources = page.resources();
        resources.fonts().pair(FONT, font_id);
        let mut xobjects = resources.x_objects();
        for (id, name) in &image_names {
            xobjects.pair(Name(name.as_bytes()), *id);
        }
        xobjects.finish();
        resources.finish();
        page.finish();
    }
    pdf.type1_font(font_id)
        .base_font(Name(b"Helvetica"))
        .encoding_predefined(Name(b"WinAnsiEncoding"));

    let operators = deflate(&content.finish())?;
    pdf.stream(content_id, &operators).filter(Filter::FlateDecode);

    Ok(pdf.finish())
}

fn pdf_dimension(value: u32) -> Result<i32, EvalError> {
    i32::try_from(value)
        .map_err(|_| EvalError::render(format!("image dimension {value} is too large for PDF")))
}

fn deflate(data: &[u8]) -> Result<Vec<u8>, EvalError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .and_then(|_| encoder.finish())
        .map_err(|e| EvalError::render(format!("failed to compress PDF stream: {e}")))
}

/// WinAnsi bytes for `text`; characters outside printable ASCII become `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| if (' '..='~').contains(&ch) { ch as u8 } else { b'?' })
        .collect()
}

fn text_width(text: &[u8], size: f32) -> f32 {
    let units: u32 = text
        .iter()
        .map(|&b| {
            let glyph = usize::from(b.saturating_sub(b' '));
            u32::from(HELVETICA_WIDTHS.get(glyph).copied().unwrap_or(556))
        })
        .sum();
    units as f32 * size / 1000.0
}

fn show_text(content: &mut Content, x: f32, baseline: f32, size: f32, text: &str) {
    let bytes = win_ansi(text);
    content.begin_text();
    content.set_font(FONT, size);
    content.next_line(x, baseline);
    content.show(Str(&bytes));
    content.end_text();
}

fn show_centered(content: &mut Content, center_x: f32, baseline: f32, size: f32, text: &str) {
    let width = text_width(&win_ansi(text), size);
    show_text(content, (center_x - width / 2.0).max(0.0), baseline, size, text);
}

fn frame(content: &mut Content, at: Area, gray: f32) {
    content.save_state();
    content.set_line_width(0.5);
    content.set_stroke_gray(gray);
    content.rect(at.x, at.y, at.width, at.height);
    content.stroke();
    content.restore_state();
}

fn placeholder(content: &mut Content, area: Area, message: &str) {
    frame(content, area, 0.6);
    content.save_state();
    content.set_fill_gray(0.4);
    show_centered(
        content,
        area.x + area.width / 2.0,
        area.y + area.height / 2.0 - LABEL_FONT_SIZE / 3.0,
        LABEL_FONT_SIZE,
        message,
    );
    content.restore_state();
}
