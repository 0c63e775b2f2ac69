//! Uncompressed 32bpp BMP export for region images.
//!
//! The layout is fixed: a 14-byte file header, a 40-byte info header, then
//! raw BGR0 pixel rows written bottom-up. All multi-byte fields are
//! little-endian. A 512x512 image needs no row padding (512 * 4 is already a
//! multiple of 4), so the file size is always `54 + 512 * 512 * 4` bytes.

use std::ffi::OsString;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::region_image::{RegionImage, IMAGE_HEIGHT, IMAGE_WIDTH, PIXEL_COUNT};

/// Byte size of the BITMAPFILEHEADER.
const FILE_HEADER_SIZE: u32 = 14;

/// Byte size of the BITMAPINFOHEADER.
const INFO_HEADER_SIZE: u32 = 40;

/// File offset where pixel data starts.
const PIXEL_DATA_OFFSET: u32 = FILE_HEADER_SIZE + INFO_HEADER_SIZE;

/// Byte size of the raw pixel data.
const PIXEL_DATA_SIZE: u32 = (PIXEL_COUNT * 4) as u32;

/// Total size of a written file.
pub const FILE_SIZE: u32 = PIXEL_DATA_OFFSET + PIXEL_DATA_SIZE;

/// Write the image to `path` as an uncompressed 32bpp BMP.
///
/// The data is streamed to a `.tmp` sibling and renamed onto `path` only
/// after a successful flush, so a failed write never leaves a file with the
/// final name behind.
pub fn export_bmp(image: &RegionImage, path: &Path) -> io::Result<()> {
    let tmp_path = tmp_sibling(path);
    match write_file(&tmp_path, image) {
        Ok(()) => fs::rename(&tmp_path, path),
        Err(err) => {
            let _ = fs::remove_file(&tmp_path);
            Err(err)
        }
    }
}

/// Append ".tmp" to the full file name, keeping the real extension intact.
fn tmp_sibling(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

fn write_file(path: &Path, image: &RegionImage) -> io::Result<()> {
    let mut out = BufWriter::new(fs::File::create(path)?);
    write_headers(&mut out)?;
    write_pixels(&mut out, image.data())?;
    out.flush()
}

fn write_u16(out: &mut impl Write, value: u16) -> io::Result<()> {
    out.write_all(&value.to_le_bytes())
}

fn write_u32(out: &mut impl Write, value: u32) -> io::Result<()> {
    out.write_all(&value.to_le_bytes())
}

fn write_i32(out: &mut impl Write, value: i32) -> io::Result<()> {
    out.write_all(&value.to_le_bytes())
}

fn write_headers(out: &mut impl Write) -> io::Result<()> {
    // BITMAPFILEHEADER
    out.write_all(b"BM")?;
    write_u32(out, FILE_SIZE)?;
    write_u16(out, 0)?; // reserved
    write_u16(out, 0)?; // reserved
    write_u32(out, PIXEL_DATA_OFFSET)?;

    // BITMAPINFOHEADER
    write_u32(out, INFO_HEADER_SIZE)?;
    write_i32(out, IMAGE_WIDTH as i32)?;
    write_i32(out, IMAGE_HEIGHT as i32)?; // positive height = bottom-up rows
    write_u16(out, 1)?; // color planes
    write_u16(out, 32)?; // bits per pixel
    write_u32(out, 0)?; // BI_RGB, no compression
    write_u32(out, PIXEL_DATA_SIZE)?;
    write_i32(out, 0)?; // x pixels per meter
    write_i32(out, 0)?; // y pixels per meter
    write_u32(out, 0)?; // palette colors
    write_u32(out, 0)?; // important colors
    Ok(())
}

/// Write pixel rows from the bottom image row up, B, G, R, 0 per pixel.
fn write_pixels(out: &mut impl Write, data: &[i32]) -> io::Result<()> {
    let mut row = [0u8; IMAGE_WIDTH * 4];
    for v in (0..IMAGE_HEIGHT).rev() {
        let line = &data[v * IMAGE_WIDTH..(v + 1) * IMAGE_WIDTH];
        for (bytes, &color) in row.chunks_exact_mut(4).zip(line) {
            bytes[0] = color as u8;
            bytes[1] = (color >> 8) as u8;
            bytes[2] = (color >> 16) as u8;
            bytes[3] = 0;
        }
        out.write_all(&row)?;
    }
    Ok(())
}
