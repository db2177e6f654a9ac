pub mod background;
pub mod diff;
pub mod normalize;
pub mod raster;

pub use background::{pixel_is_white, remove_background, Tint};
pub use diff::{overlap_diff, tinted_overlap, DiffSummary, OverlapDiff, PixelClass};
pub use normalize::{resize, NormalizedBatch, PairSizes};
pub use raster::{ChannelOrder, NativeRaster, RasterImage};
