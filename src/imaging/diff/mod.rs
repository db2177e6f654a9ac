use crate::error::EvalError;
use crate::imaging::background::{pixel_is_white, remove_background, Tint};
use crate::imaging::raster::RasterImage;


pub const OVERLAP_PIXEL: [u8; 4] = [0, 0, 0, 255];
pub const GOLD_TINT: Tint = Tint::Blue;
pub const PREDICTED_TINT: Tint = Tint::Red;

const OPAQUE: u8 = 255;
const TRANSPARENT: u8 = 0;

/// Category a pixel falls into when a gold and a predicted render are overlaid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelClass {
    PredictedOnly,
    GoldOnly,
    Overlap,
    Background,
}

/// Per-category pixel counts of one overlap image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiffSummary {
    pub predicted_only: u64,
    pub gold_only: u64,
    pub overlap: u64,
    pub background: u64,
}

impl DiffSummary {
    fn record(&mut self, class: PixelClass) {
        match class {
            PixelClass::PredictedOnly => self.predicted_only += 1,
            PixelClass::GoldOnly => self.gold_only += 1,
            PixelClass::Overlap => self.overlap += 1,
            PixelClass::Background => self.background += 1,
        }
    }

    pub fn ink_pixels(&self) -> u64 {
        self.predicted_only + self.gold_only + self.overlap
    }
}

#[derive(Debug, Clone)]
pub struct OverlapDiff {
    pub image: RasterImage,
    pub summary: DiffSummary,
}

/// Classify one RGBA pixel pair. Rules are checked in order; the first match wins:
/// 1. gold transparent and predicted opaque: predicted-only
/// 2. both white: background
/// 3. both opaque: overlap
/// 4. otherwise gold is kept, which is gold-only ink when gold is opaque
pub fn classify_pixel(gold: &[u8; 4], predicted: &[u8; 4]) -> PixelClass {
    if gold[3] == TRANSPARENT && predicted[3] == OPAQUE {
        PixelClass::PredictedOnly
    } else if pixel_is_white(gold) && pixel_is_white(predicted) {
        PixelClass::Background
    } else if gold[3] == OPAQUE && predicted[3] == OPAQUE {
        PixelClass::Overlap
    } else if gold[3] == OPAQUE {
        PixelClass::GoldOnly
    } else {
        PixelClass::Background
    }
}

/// Overlay two tinted RGBA images of identical shape.
///
/// Both inputs are expected to have gone through [`remove_background`]
/// already (gold in blue, predicted in red). Predicted-only pixels take
/// the predicted colour, overlapping ink becomes opaque black and every
/// other pixel keeps the gold value.
pub fn overlap_diff(gold: &RasterImage, predicted: &RasterImage) -> Result<OverlapDiff, EvalError> {
    gold.ensure_same_shape(predicted)?;
    if gold.channels() != RasterImage::RGBA_CHANNELS {
        return Err(EvalError::invalid_input(format!(
            "overlap diff needs RGBA input, got {} channels",
            gold.channels()
        )));
    }

    let mut out = gold.clone();
    let mut summary = DiffSummary::default();
    for (out_px, pred_px) in out.pixels_mut().zip(predicted.pixels()) {
        let (gold_rgba, predicted_rgba) = (rgba(out_px)?, rgba(pred_px)?);
        let class = classify_pixel(&gold_rgba, &predicted_rgba);
        match class {
            PixelClass::PredictedOnly => out_px.copy_from_slice(&predicted_rgba),
            PixelClass::Overlap => out_px.copy_from_slice(&OVERLAP_PIXEL),
            PixelClass::GoldOnly | PixelClass::Background => {}
        }
        summary.record(class);
    }

    Ok(OverlapDiff {
        image: out,
        summary,
    })
}

fn rgba(pixel: &[u8]) -> Result<[u8; 4], EvalError> {
    <[u8; 4]>::try_from(pixel).map_err(|_| {
        EvalError::invalid_input(format!("expected an RGBA pixel, got {} channels", pixel.len()))
    })
}

/// Tint both renders and overlay them.
pub fn tinted_overlap(gold: &RasterImage, predicted: &RasterImage) -> Result<OverlapDiff, EvalError> {
    let gold = remove_background(gold, GOLD_TINT)?;
    let predicted = remove_background(predicted, PREDICTED_TINT)?;
    overlap_diff(&gold, &predicted)
}
