use crate::error::EvalError;
use crate::imaging::raster::RasterImage;
use crate::types::{RenderOutcome, RenderedPair};

/// Original size of each side of a pair before padding. `None` marks a failed render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairSizes {
    pub index: usize,
    pub predicted: Option<(u32, u32)>,
    pub gold: Option<(u32, u32)>,
}

#[derive(Debug, Clone)]
pub struct NormalizedBatch {
    pub pairs: Vec<RenderedPair>,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub channels: u8,
    pub sizes: Vec<PairSizes>,
}

/// Pad every rendered image in both sides to one shared canvas.
///
/// The canvas is the largest width and height seen across all rendered
/// images; each image is anchored top-left and padded with opaque white.
/// Failed slots pass through unchanged.
pub fn resize(pairs: Vec<RenderedPair>, num_channels: u8) -> Result<NormalizedBatch, EvalError> {
    if num_channels != 3 && num_channels != 4 {
        return Err(EvalError::invalid_input(format!(
            "size normalization supports 3 or 4 channels, got {num_channels}"
        )));
    }

    let (canvas_width, canvas_height) = pairs
        .iter()
        .flat_map(|pair| [pair.predicted.image(), pair.gold.image()])
        .flatten()
        .fold((0u32, 0u32), |(w, h), img| {
            (w.max(img.width()), h.max(img.height()))
        });

    let mut sizes = Vec::with_capacity(pairs.len());
    let mut normalized = Vec::with_capacity(pairs.len());
    for pair in pairs {
        sizes.push(PairSizes {
            index: pair.index,
            predicted: pair.predicted.image().map(|i| (i.width(), i.height())),
            gold: pair.gold.image().map(|i| (i.width(), i.height())),
        });
        normalized.push(RenderedPair {
            index: pair.index,
            predicted: pad_outcome(pair.predicted, canvas_width, canvas_height, num_channels)?,
            gold: pad_outcome(pair.gold, canvas_width, canvas_height, num_channels)?,
        });
    }

    tracing::debug!(
        canvas_width,
        canvas_height,
        pairs = normalized.len(),
        "normalized image sizes"
    );

    Ok(NormalizedBatch {
        pairs: normalized,
        canvas_width,
        canvas_height,
        channels: num_channels,
        sizes,
    })
}

fn pad_outcome(
    outcome: RenderOutcome,
    width: u32,
    height: u32,
    channels: u8,
) -> Result<RenderOutcome, EvalError> {
    match outcome {
        RenderOutcome::Rendered(image) => Ok(RenderOutcome::Rendered(pad_to_canvas(
            &image, width, height, channels,
        )?)),
        failed @ RenderOutcome::Failed { .. } => Ok(failed),
    }
}

pub fn pad_to_canvas(
    image: &RasterImage,
    width: u32,
    height: u32,
    channels: u8,
) -> Result<RasterImage, EvalError> {
    if image.width() > width || image.height() > height {
        return Err(EvalError::invalid_input(format!(
            "image {}x{} does not fit canvas {width}x{height}",
            image.width(),
            image.height()
        )));
    }
    let source = image.with_channels(channels)?;
    let white = [255u8; 4];
    let mut canvas = RasterImage::filled(width, height, &white[..channels as usize])?;
    for y in 0..source.height() {
        for x in 0..source.width() {
            canvas.pixel_mut(x, y).copy_from_slice(source.pixel(x, y));
        }
    }
    Ok(canvas)
}
