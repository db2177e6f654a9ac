use crate::error::EvalError;
use crate::imaging::raster::RasterImage;

/// Minimum value of every colour channel for a pixel to count as white.
pub const WHITE_THRESHOLD: u8 = 240;

/// Colour given to the remaining ink after background removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tint {
    Red,
    Blue,
}

impl Tint {
    pub const fn rgb(self) -> [u8; 3] {
        match self {
            Self::Red => [255, 0, 0],
            Self::Blue => [0, 0, 255],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Blue => "blue",
        }
    }
}

/// Whiteness predicate shared by background removal and the overlap diff.
/// Alpha is ignored.
pub fn pixel_is_white(pixel: &[u8]) -> bool {
    match pixel.len() {
        0 => false,
        1 | 2 => pixel[0] >= WHITE_THRESHOLD,
        _ => pixel[..3].iter().all(|&c| c >= WHITE_THRESHOLD),
    }
}

/// White pixels become transparent white; everything else becomes opaque `tint`.
pub fn remove_background(image: &RasterImage, tint: Tint) -> Result<RasterImage, EvalError> {
    let mut out = image.with_channels(RasterImage::RGBA_CHANNELS)?;
    let [r, g, b] = tint.rgb();
    for px in out.pixels_mut() {
        if pixel_is_white(px) {
            px.copy_from_slice(&[255, 255, 255, 0]);
        } else {
            px.copy_from_slice(&[r, g, b, 255]);
        }
    }
    Ok(out)
}
