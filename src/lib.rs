//! Per-region map image composition library
//!
//! Accumulates one 512x512 pixel image per map region and saves it as an
//! uncompressed 32bpp BMP file. Re-exports modules for use by binaries and
//! tools.

pub mod bmp_export;
pub mod color;
pub mod compositor;
pub mod region_image;

pub use compositor::{DefaultHooks, RegionCompositor, RegionHooks};
pub use region_image::{
    RegionImage, CHUNKS_PER_REGION, IMAGE_HEIGHT, IMAGE_WIDTH, PIXELS_PER_CHUNK, PIXEL_COUNT,
};
