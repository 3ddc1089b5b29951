//! Tile-compressed thumbnail reconstruction.
//!
//! The pixel stream walks the canvas in 256×256 tiles. Every tile row of a
//! tile is delta-compressed ([`super::bitstream`]) against the previously
//! reconstructed row of the same tile; a 16-bit sync marker precedes each
//! band of tiles and one more closes the stream. Marker values are opaque.

use byteorder::{ByteOrder, LittleEndian};

use super::bitstream::decode_row;
use super::{CanvasHeader, DELTA_PIXELS_TAG};
use crate::document::{swizzle_bgra_to_rgba, Thumbnail};
use crate::error::{Error, Result};

const TILE_SIZE: usize = 256;
const OUTPUT_CHANNELS: usize = 4;

pub(super) fn decode(header: &CanvasHeader, blob: &[u8]) -> Result<Thumbnail> {
    if blob.len() < 8 {
        return Err(Error::InvalidFormat("thumbnail blob truncated"));
    }
    if LittleEndian::read_u32(&blob[0..4]) != DELTA_PIXELS_TAG {
        return Err(Error::InvalidFormat("thumbnail blob is not tagged dpcm"));
    }
    // Declared payload size; the tile walk is self-terminating.
    let _payload_len = LittleEndian::read_u32(&blob[4..8]);
    let mut cursor = 8usize;

    let width = header.width as usize;
    let height = header.height as usize;
    let input_channels = header.thumbnail_channels();

    let mut pixels = vec![0u8; width * height * OUTPUT_CHANNELS];
    if width == 0 || height == 0 {
        return Ok(Thumbnail {
            pixels,
            width: header.width,
            height: header.height,
        });
    }

    let tiles_x = width.div_ceil(TILE_SIZE);
    let tiles_y = height.div_ceil(TILE_SIZE);

    let mut deltas = [0i16; TILE_SIZE * OUTPUT_CHANNELS];
    let mut row = [0u8; TILE_SIZE * OUTPUT_CHANNELS];
    let mut previous_row = [0u8; TILE_SIZE * OUTPUT_CHANNELS];

    for tile_y in 0..tiles_y {
        let row_base = tile_y * TILE_SIZE;
        let tile_height = (height - row_base).min(TILE_SIZE);

        let _band_marker = read_marker(blob, &mut cursor)?;

        for tile_x in 0..tiles_x {
            let col_base = tile_x * TILE_SIZE;
            let tile_width = (width - col_base).min(TILE_SIZE);

            previous_row.fill(0);

            for tile_row in 0..tile_height {
                // The window is generous but bounded; only the consumed
                // prefix belongs to this row.
                let window = 3 * input_channels * tile_width;
                let end = (cursor + window).min(blob.len());
                if cursor >= end {
                    return Err(Error::Codec("tile stream ran out of input"));
                }

                deltas.fill(0);
                let consumed = decode_row(
                    &blob[cursor..end],
                    &mut deltas,
                    tile_width,
                    OUTPUT_CHANNELS,
                    input_channels,
                )?;
                cursor += consumed;

                unpack_row(&previous_row, &deltas, &mut row, tile_width);
                previous_row.copy_from_slice(&row);

                let y = row_base + tile_row;
                let start = (y * width + col_base) * OUTPUT_CHANNELS;
                let target = &mut pixels[start..start + tile_width * OUTPUT_CHANNELS];
                target.copy_from_slice(&row[..tile_width * OUTPUT_CHANNELS]);
                if input_channels == 3 {
                    for pixel in target.chunks_exact_mut(OUTPUT_CHANNELS) {
                        pixel[3] = 0xFF;
                    }
                }
            }
        }
    }

    let _closing_marker = read_marker(blob, &mut cursor)?;

    swizzle_bgra_to_rgba(&mut pixels);
    Ok(Thumbnail {
        pixels,
        width: header.width,
        height: header.height,
    })
}

fn read_marker(blob: &[u8], cursor: &mut usize) -> Result<u16> {
    if *cursor + 2 > blob.len() {
        return Err(Error::Codec("tile stream missing sync marker"));
    }
    let marker = LittleEndian::read_u16(&blob[*cursor..*cursor + 2]);
    *cursor += 2;
    Ok(marker)
}

/// Reconstructs one row of 8-bit BGRA pixels from the previous row and the
/// current 16-bit delta row.
///
/// Per channel lane the integrator is
/// `sum = clamp((sum +w cur) -s last) +w delta`, where `+w` wraps, `-s`
/// saturates, and `clamp` is the saturating add-then-subtract of 0xFF00
/// that pins anything at or above 0x100 to 0xFF. The op order is
/// load-bearing; reordering changes the output bytes.
pub(super) fn unpack_row(previous: &[u8], deltas: &[i16], out: &mut [u8], pixel_count: usize) {
    let mut sum = [0u16; OUTPUT_CHANNELS];
    let mut last = [0u16; OUTPUT_CHANNELS];

    for i in 0..pixel_count {
        for c in 0..OUTPUT_CHANNELS {
            let index = i * OUTPUT_CHANNELS + c;
            let cur = previous[index] as u16;

            let mut value = sum[c].wrapping_add(cur);
            value = value.saturating_sub(last[c]);
            value = value.saturating_add(0xFF00).saturating_sub(0xFF00);
            value = value.wrapping_add(deltas[index] as u16);

            sum[c] = value;
            last[c] = cur;
            out[index] = if value > 0xFF { 0xFF } else { value as u8 };
        }
    }
}
