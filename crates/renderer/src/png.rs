//! PNG encoding for RGBA canvases.
//!
//! Two encoders: indexed (color type 3) for images with at most 256
//! distinct colors, RGBA (color type 6) otherwise. `encode_auto` picks
//! between them.

use std::collections::HashMap;
use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;

/// Maximum colors for indexed output.
const MAX_PALETTE_SIZE: usize = 256;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n'];

#[derive(Debug, thiserror::Error)]
pub enum PngError {
    #[error("pixel buffer is {got} bytes, expected {expected} for {width}x{height}")]
    BadDimensions {
        width: u32,
        height: u32,
        expected: usize,
        got: usize,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Encode RGBA pixels, choosing indexed output when the image has few
/// enough distinct colors.
pub fn encode_auto(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>, PngError> {
    check_dimensions(pixels, width, height)?;
    match extract_palette(pixels) {
        Some((palette, indices)) => encode_indexed(&palette, &indices, width, height),
        None => encode_rgba(pixels, width, height),
    }
}

/// Encode RGBA pixels as a truecolor-with-alpha PNG.
pub fn encode_rgba(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>, PngError> {
    check_dimensions(pixels, width, height)?;

    let row_bytes = width as usize * 4;
    let mut raw = Vec::with_capacity(pixels.len() + height as usize);
    for row in pixels.chunks(row_bytes) {
        raw.push(0); // filter type: none
        raw.extend_from_slice(row);
    }

    let mut out = Vec::new();
    out.extend_from_slice(&PNG_SIGNATURE);
    write_chunk(&mut out, b"IHDR", &ihdr(width, height, 6));
    write_chunk(&mut out, b"IDAT", &deflate(&raw)?);
    write_chunk(&mut out, b"IEND", &[]);
    Ok(out)
}

/// Encode palette indices as an indexed PNG with a tRNS alpha table.
fn encode_indexed(
    palette: &[[u8; 4]],
    indices: &[u8],
    width: u32,
    height: u32,
) -> Result<Vec<u8>, PngError> {
    let row_bytes = width as usize;
    let mut raw = Vec::with_capacity(indices.len() + height as usize);
    for row in indices.chunks(row_bytes) {
        raw.push(0);
        raw.extend_from_slice(row);
    }

    let mut plte = Vec::with_capacity(palette.len() * 3);
    let mut trns = Vec::with_capacity(palette.len());
    for color in palette {
        plte.extend_from_slice(&color[..3]);
        trns.push(color[3]);
    }

    let mut out = Vec::new();
    out.extend_from_slice(&PNG_SIGNATURE);
    write_chunk(&mut out, b"IHDR", &ihdr(width, height, 3));
    write_chunk(&mut out, b"PLTE", &plte);
    write_chunk(&mut out, b"tRNS", &trns);
    write_chunk(&mut out, b"IDAT", &deflate(&raw)?);
    write_chunk(&mut out, b"IEND", &[]);
    Ok(out)
}

fn check_dimensions(pixels: &[u8], width: u32, height: u32) -> Result<(), PngError> {
    let expected = width as usize * height as usize * 4;
    if pixels.len() != expected {
        return Err(PngError::BadDimensions {
            width,
            height,
            expected,
            got: pixels.len(),
        });
    }
    Ok(())
}

/// Map pixels to a palette plus per-pixel indices, or `None` once the
/// image exceeds 256 distinct colors.
fn extract_palette(pixels: &[u8]) -> Option<(Vec<[u8; 4]>, Vec<u8>)> {
    let mut color_to_index: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut palette: Vec<[u8; 4]> = Vec::with_capacity(MAX_PALETTE_SIZE);
    let mut indices: Vec<u8> = Vec::with_capacity(pixels.len() / 4);

    for chunk in pixels.chunks_exact(4) {
        let packed = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        let index = match color_to_index.get(&packed) {
            Some(&idx) => idx,
            None => {
                if palette.len() >= MAX_PALETTE_SIZE {
                    return None;
                }
                let idx = palette.len() as u8;
                palette.push([chunk[0], chunk[1], chunk[2], chunk[3]]);
                color_to_index.insert(packed, idx);
                idx
            }
        };
        indices.push(index);
    }

    Some((palette, indices))
}

fn ihdr(width: u32, height: u32, color_type: u8) -> [u8; 13] {
    let mut data = [0u8; 13];
    data[0..4].copy_from_slice(&width.to_be_bytes());
    data[4..8].copy_from_slice(&height.to_be_bytes());
    data[8] = 8; // bit depth
    data[9] = color_type;
    // compression, filter, interlace all zero
    data
}

fn deflate(raw: &[u8]) -> Result<Vec<u8>, PngError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(raw)?;
    Ok(encoder.finish()?)
}

fn write_chunk(out: &mut Vec<u8>, tag: &[u8; 4], data: &[u8]) {
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(tag);
    out.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(tag);
    hasher.update(data);
    out.extend_from_slice(&hasher.finalize().to_be_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
        let mut pixels = Vec::new();
        for _ in 0..width * height {
            pixels.extend_from_slice(&color);
        }
        pixels
    }

    #[test]
    fn test_rgba_encoding_layout() {
        let pixels = solid(4, 2, [10, 20, 30, 255]);
        let png = encode_rgba(&pixels, 4, 2).unwrap();

        assert_eq!(&png[..8], &PNG_SIGNATURE);
        // IHDR is the first chunk: 4 length + 4 tag, then width/height
        assert_eq!(&png[12..16], b"IHDR");
        assert_eq!(&png[16..20], &4u32.to_be_bytes());
        assert_eq!(&png[20..24], &2u32.to_be_bytes());
        assert_eq!(png[25], 6); // color type
    }

    #[test]
    fn test_auto_picks_indexed_for_flat_images() {
        let pixels = solid(16, 16, [200, 100, 50, 255]);
        let png = encode_auto(&pixels, 16, 16).unwrap();
        // indexed output carries a PLTE chunk
        assert!(png.windows(4).any(|w| w == b"PLTE"));
    }

    #[test]
    fn test_auto_falls_back_to_rgba() {
        // 512 distinct colors
        let mut pixels = Vec::new();
        for i in 0..512u32 {
            pixels.extend_from_slice(&[(i % 256) as u8, (i / 256) as u8, 0, 255]);
        }
        let png = encode_auto(&pixels, 32, 16).unwrap();
        assert_eq!(png[25], 6); // IHDR color type: truecolor with alpha
    }

    #[test]
    fn test_dimension_mismatch() {
        let err = encode_rgba(&[0u8; 12], 2, 2).unwrap_err();
        assert!(matches!(err, PngError::BadDimensions { expected: 16, .. }));
    }
}
