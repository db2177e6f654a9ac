use crate::error::EvalError;

/// Channel layout of a raster as produced by an equation renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelOrder {
    Gray,
    Rgb,
    Bgr,
    Rgba,
    Bgra,
}

impl ChannelOrder {
    pub fn channels(self) -> u8 {
        match self {
            Self::Gray => 1,
            Self::Rgb | Self::Bgr => 3,
            Self::Rgba | Self::Bgra => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gray => "gray",
            Self::Rgb => "rgb",
            Self::Bgr => "bgr",
            Self::Rgba => "rgba",
            Self::Bgra => "bgra",
        }
    }
}

/// Raster in whatever channel order the renderer emitted.
#[derive(Debug, Clone)]
pub struct NativeRaster {
    pub width: u32,
    pub height: u32,
    pub order: ChannelOrder,
    pub data: Vec<u8>,
}

impl NativeRaster {
    pub fn from_dynamic(image: image::DynamicImage) -> Self {
        let (width, height) = (image.width(), image.height());
        match image {
            image::DynamicImage::ImageLuma8(buf) => Self {
                width,
                height,
                order: ChannelOrder::Gray,
                data: buf.into_raw(),
            },
            image::DynamicImage::ImageRgb8(buf) => Self {
                width,
                height,
                order: ChannelOrder::Rgb,
                data: buf.into_raw(),
            },
            other => Self {
                width,
                height,
                order: ChannelOrder::Rgba,
                data: other.to_rgba8().into_raw(),
            },
        }
    }
}

/// Row-major 8-bit raster with an explicit channel count.
///
/// Pixel-wise operations across two rasters must go through
/// [`RasterImage::ensure_same_shape`] first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    channels: u8,
    data: Vec<u8>,
}

impl RasterImage {
    pub const RGBA_CHANNELS: u8 = 4;

    pub fn from_raw(width: u32, height: u32, channels: u8, data: Vec<u8>) -> Result<Self, EvalError> {
        if channels == 0 || channels > 4 {
            return Err(EvalError::invalid_input(format!(
                "unsupported channel count {channels}"
            )));
        }
        let expected = width as usize * height as usize * channels as usize;
        if data.len() != expected {
            return Err(EvalError::invalid_input(format!(
                "raster buffer holds {} bytes, expected {expected} for {width}x{height}x{channels}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    pub fn filled(width: u32, height: u32, pixel: &[u8]) -> Result<Self, EvalError> {
        let channels = u8::try_from(pixel.len())
            .map_err(|_| EvalError::invalid_input("fill pixel has too many channels"))?;
        let mut data = Vec::with_capacity(width as usize * height as usize * pixel.len());
        for _ in 0..(width as usize * height as usize) {
            data.extend_from_slice(pixel);
        }
        Self::from_raw(width, height, channels, data)
    }

    /// Convert a renderer raster to RGBA. Sources without alpha become fully opaque.
    pub fn from_native(native: NativeRaster) -> Result<Self, EvalError> {
        let src_channels = native.order.channels() as usize;
        let pixel_count = native.width as usize * native.height as usize;
        if native.data.len() != pixel_count * src_channels {
            return Err(EvalError::invalid_input(format!(
                "{} raster buffer holds {} bytes, expected {}",
                native.order.as_str(),
                native.data.len(),
                pixel_count * src_channels
            )));
        }

        if native.order == ChannelOrder::Rgba {
            return Self::from_raw(native.width, native.height, 4, native.data);
        }

        let mut rgba = Vec::with_capacity(pixel_count * 4);
        for px in native.data.chunks_exact(src_channels) {
            let converted = match native.order {
                ChannelOrder::Gray => [px[0], px[0], px[0], 255],
                ChannelOrder::Rgb => [px[0], px[1], px[2], 255],
                ChannelOrder::Bgr => [px[2], px[1], px[0], 255],
                ChannelOrder::Bgra => [px[2], px[1], px[0], px[3]],
                ChannelOrder::Rgba => [px[0], px[1], px[2], px[3]],
            };
            rgba.extend_from_slice(&converted);
        }
        Self::from_raw(native.width, native.height, 4, rgba)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn shape(&self) -> (u32, u32, u8) {
        (self.width, self.height, self.channels)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let start = self.offset(x, y);
        &self.data[start..start + self.channels as usize]
    }

    pub fn pixel_mut(&mut self, x: u32, y: u32) -> &mut [u8] {
        let start = self.offset(x, y);
        let channels = self.channels as usize;
        &mut self.data[start..start + channels]
    }

    pub fn pixels(&self) -> impl Iterator<Item = &[u8]> {
        self.data.chunks_exact(self.channels as usize)
    }

    pub fn pixels_mut(&mut self) -> impl Iterator<Item = &mut [u8]> {
        let channels = self.channels as usize;
        self.data.chunks_exact_mut(channels)
    }

    pub fn ensure_same_shape(&self, other: &RasterImage) -> Result<(), EvalError> {
        if self.shape() != other.shape() {
            return Err(EvalError::DimensionMismatch {
                left: describe_shape(self.shape()),
                right: describe_shape(other.shape()),
            });
        }
        Ok(())
    }

    /// Re-express the raster with `channels` channels (3 or 4).
    pub fn with_channels(&self, channels: u8) -> Result<Self, EvalError> {
        if channels == self.channels {
            return Ok(self.clone());
        }
        let mut data =
            Vec::with_capacity(self.width as usize * self.height as usize * channels as usize);
        for px in self.pixels() {
            let rgba = match px.len() {
                1 => [px[0], px[0], px[0], 255],
                2 => [px[0], px[0], px[0], px[1]],
                3 => [px[0], px[1], px[2], 255],
                _ => [px[0], px[1], px[2], px[3]],
            };
            match channels {
                3 => data.extend_from_slice(&rgba[..3]),
                4 => data.extend_from_slice(&rgba),
                other => {
                    return Err(EvalError::invalid_input(format!(
                        "cannot convert raster to {other} channels"
                    )))
                }
            }
        }
        Self::from_raw(self.width, self.height, channels, data)
    }

    /// Flatten onto a white background, dropping alpha.
    pub fn composite_on_white(&self) -> Vec<u8> {
        let mut rgb = Vec::with_capacity(self.width as usize * self.height as usize * 3);
        for px in self.pixels() {
            match px.len() {
                4 => {
                    let alpha = px[3] as u32;
                    for &c in &px[..3] {
                        let blended = (c as u32 * alpha + 255 * (255 - alpha) + 127) / 255;
                        rgb.push(blended as u8);
                    }
                }
                3 => rgb.extend_from_slice(px),
                _ => rgb.extend_from_slice(&[px[0], px[0], px[0]]),
            }
        }
        rgb
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * self.channels as usize
    }
}

fn describe_shape((width, height, channels): (u32, u32, u8)) -> String {
    format!("{width}x{height}x{channels}")
}
