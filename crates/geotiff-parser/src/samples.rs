//! Raster layout extraction and band assembly.
//!
//! Supports strip and tile chunking, chunky and planar band organization,
//! and unsigned/signed/float samples at 8/16/32 bits (plus 64-bit float),
//! all widened or narrowed to `f32` planes.

use std::io::Read;

use flate2::read::{DeflateDecoder, ZlibDecoder};

use crate::error::{GeoTiffError, Result};
use crate::ifd::{ByteOrder, Ifd};
use crate::tags::{self, compression, planar, sample_format};

/// Upper bound on total decoded samples (width x height x bands).
/// Roof-scale rasters are far smaller; anything past this is a hostile or
/// corrupt header rather than real data.
const MAX_SAMPLES: u64 = 1 << 28;

/// How the raster's sample data is chunked in the file.
#[derive(Debug, Clone)]
pub enum ChunkLayout {
    Strips {
        rows_per_strip: usize,
        offsets: Vec<u32>,
        byte_counts: Vec<u32>,
    },
    Tiles {
        tile_width: usize,
        tile_height: usize,
        offsets: Vec<u32>,
        byte_counts: Vec<u32>,
    },
}

/// Everything needed to turn chunk bytes into band planes.
#[derive(Debug, Clone)]
pub struct RasterLayout {
    pub width: usize,
    pub height: usize,
    pub samples_per_pixel: usize,
    pub bits_per_sample: u16,
    pub sample_format: u16,
    pub compression: u16,
    pub planar: u16,
    pub byte_order: ByteOrder,
    pub chunks: ChunkLayout,
}

impl RasterLayout {
    /// Extract the layout from a parsed directory, validating that every
    /// declared combination is one the decoder supports.
    pub fn from_ifd(ifd: &Ifd, data: &[u8]) -> Result<Self> {
        let width = ifd
            .u32_value(tags::IMAGE_WIDTH, data)?
            .ok_or(GeoTiffError::MissingTag("ImageWidth"))? as usize;
        let height = ifd
            .u32_value(tags::IMAGE_LENGTH, data)?
            .ok_or(GeoTiffError::MissingTag("ImageLength"))? as usize;
        if width == 0 || height == 0 {
            return Err(GeoTiffError::invalid("zero raster dimension"));
        }

        let samples_per_pixel = ifd
            .u32_value(tags::SAMPLES_PER_PIXEL, data)?
            .unwrap_or(1) as usize;
        if samples_per_pixel == 0 {
            return Err(GeoTiffError::invalid("SamplesPerPixel is zero"));
        }

        let total = (width as u64 * height as u64).saturating_mul(samples_per_pixel as u64);
        if total > MAX_SAMPLES {
            return Err(GeoTiffError::invalid(format!(
                "raster of {} samples exceeds the {} sample limit",
                total, MAX_SAMPLES
            )));
        }

        let bits_per_sample = uniform_value(
            ifd.u32_values(tags::BITS_PER_SAMPLE, data)?.unwrap_or_else(|| vec![8]),
            "BitsPerSample",
        )? as u16;
        let format = uniform_value(
            ifd.u32_values(tags::SAMPLE_FORMAT, data)?
                .unwrap_or_else(|| vec![sample_format::UNSIGNED as u32]),
            "SampleFormat",
        )? as u16;
        if !conversion_supported(format, bits_per_sample) {
            return Err(GeoTiffError::UnsupportedSampleFormat {
                format,
                bits: bits_per_sample,
            });
        }

        let comp = ifd
            .u32_value(tags::COMPRESSION, data)?
            .unwrap_or(compression::NONE as u32) as u16;
        match comp {
            compression::NONE | compression::DEFLATE | compression::ADOBE_DEFLATE => {}
            other => return Err(GeoTiffError::UnsupportedCompression(other)),
        }

        let planar_config = ifd
            .u32_value(tags::PLANAR_CONFIG, data)?
            .unwrap_or(planar::CHUNKY as u32) as u16;
        if planar_config != planar::CHUNKY && planar_config != planar::SEPARATE {
            return Err(GeoTiffError::invalid(format!(
                "unknown planar configuration {}",
                planar_config
            )));
        }

        let planes = if planar_config == planar::SEPARATE {
            samples_per_pixel
        } else {
            1
        };

        let chunks = if ifd.find(tags::TILE_OFFSETS).is_some() {
            let tile_width = ifd
                .u32_value(tags::TILE_WIDTH, data)?
                .ok_or(GeoTiffError::MissingTag("TileWidth"))? as usize;
            let tile_height = ifd
                .u32_value(tags::TILE_LENGTH, data)?
                .ok_or(GeoTiffError::MissingTag("TileLength"))? as usize;
            if tile_width == 0 || tile_height == 0 {
                return Err(GeoTiffError::invalid("zero tile dimension"));
            }
            // Tiles decode at full declared size even on image edges, so
            // the declaration is bounded like the raster itself.
            let tile_samples =
                (tile_width as u64 * tile_height as u64).saturating_mul(samples_per_pixel as u64);
            if tile_samples > MAX_SAMPLES {
                return Err(GeoTiffError::invalid(format!(
                    "tile of {}x{} pixels exceeds the {} sample limit",
                    tile_width, tile_height, MAX_SAMPLES
                )));
            }

            let offsets = ifd
                .u32_values(tags::TILE_OFFSETS, data)?
                .ok_or(GeoTiffError::MissingTag("TileOffsets"))?;
            let byte_counts = ifd
                .u32_values(tags::TILE_BYTE_COUNTS, data)?
                .ok_or(GeoTiffError::MissingTag("TileByteCounts"))?;

            let across = width.div_ceil(tile_width);
            let down = height.div_ceil(tile_height);
            check_segment_counts(offsets.len(), byte_counts.len(), across * down * planes)?;

            ChunkLayout::Tiles {
                tile_width,
                tile_height,
                offsets,
                byte_counts,
            }
        } else {
            let offsets = ifd
                .u32_values(tags::STRIP_OFFSETS, data)?
                .ok_or(GeoTiffError::MissingTag("StripOffsets"))?;
            let byte_counts = ifd
                .u32_values(tags::STRIP_BYTE_COUNTS, data)?
                .ok_or(GeoTiffError::MissingTag("StripByteCounts"))?;

            // Writers emit huge values for "single strip"; clamp to the image.
            let rows_per_strip = ifd
                .u32_value(tags::ROWS_PER_STRIP, data)?
                .map(|v| v as usize)
                .unwrap_or(height)
                .min(height)
                .max(1);

            let per_plane = height.div_ceil(rows_per_strip);
            check_segment_counts(offsets.len(), byte_counts.len(), per_plane * planes)?;

            ChunkLayout::Strips {
                rows_per_strip,
                offsets,
                byte_counts,
            }
        };

        Ok(Self {
            width,
            height,
            samples_per_pixel,
            bits_per_sample,
            sample_format: format,
            compression: comp,
            planar: planar_config,
            byte_order: ifd.byte_order,
            chunks,
        })
    }
}

/// Assemble row-major f32 band planes from the chunked sample data.
pub fn read_bands(layout: &RasterLayout, data: &[u8]) -> Result<Vec<Vec<f32>>> {
    let bps = (layout.bits_per_sample / 8) as usize;
    let width = layout.width;
    let spp = layout.samples_per_pixel;
    let separate = layout.planar == planar::SEPARATE;
    let mut bands = vec![vec![0.0f32; width * layout.height]; spp];

    match &layout.chunks {
        ChunkLayout::Strips {
            rows_per_strip,
            offsets,
            byte_counts,
        } => {
            let per_plane = layout.height.div_ceil(*rows_per_strip);
            for (seg, (&offset, &count)) in offsets.iter().zip(byte_counts.iter()).enumerate() {
                let (plane, index) = plane_and_index(separate, seg, per_plane);
                let row0 = index * rows_per_strip;
                let rows = (*rows_per_strip).min(layout.height - row0);
                let row_samples = if separate { width } else { width * spp };

                let decoded = decode_segment(data, offset, count, layout.compression)?;
                let needed = rows * row_samples * bps;
                if decoded.len() < needed {
                    return Err(GeoTiffError::truncated(format!(
                        "strip {} decoded to {} bytes, needs {}",
                        seg,
                        decoded.len(),
                        needed
                    )));
                }

                for r in 0..rows {
                    let y = row0 + r;
                    for i in 0..row_samples {
                        let at = (r * row_samples + i) * bps;
                        let value = read_sample(
                            &decoded[at..at + bps],
                            layout.byte_order,
                            layout.sample_format,
                            layout.bits_per_sample,
                        );
                        if separate {
                            bands[plane][y * width + i] = value;
                        } else {
                            bands[i % spp][y * width + i / spp] = value;
                        }
                    }
                }
            }
        }
        ChunkLayout::Tiles {
            tile_width,
            tile_height,
            offsets,
            byte_counts,
        } => {
            let across = width.div_ceil(*tile_width);
            let down = layout.height.div_ceil(*tile_height);
            let per_plane = across * down;
            for (seg, (&offset, &count)) in offsets.iter().zip(byte_counts.iter()).enumerate() {
                let (plane, index) = plane_and_index(separate, seg, per_plane);
                let x0 = (index % across) * tile_width;
                let y0 = (index / across) * tile_height;
                let copy_w = (*tile_width).min(width - x0);
                let copy_h = (*tile_height).min(layout.height - y0);
                let row_samples = if separate {
                    *tile_width
                } else {
                    tile_width * spp
                };

                let decoded = decode_segment(data, offset, count, layout.compression)?;
                // Edge tiles are stored at full tile size, padded.
                let needed = tile_height * row_samples * bps;
                if decoded.len() < needed {
                    return Err(GeoTiffError::truncated(format!(
                        "tile {} decoded to {} bytes, needs {}",
                        seg,
                        decoded.len(),
                        needed
                    )));
                }

                for r in 0..copy_h {
                    let y = y0 + r;
                    for c in 0..copy_w {
                        let x = x0 + c;
                        if separate {
                            let at = (r * row_samples + c) * bps;
                            bands[plane][y * width + x] = read_sample(
                                &decoded[at..at + bps],
                                layout.byte_order,
                                layout.sample_format,
                                layout.bits_per_sample,
                            );
                        } else {
                            for s in 0..spp {
                                let at = (r * row_samples + c * spp + s) * bps;
                                bands[s][y * width + x] = read_sample(
                                    &decoded[at..at + bps],
                                    layout.byte_order,
                                    layout.sample_format,
                                    layout.bits_per_sample,
                                );
                            }
                        }
                    }
                }
            }
        }
    }

    Ok(bands)
}

/// Decompress one strip or tile payload.
pub fn decompress(data: &[u8], scheme: u16) -> Result<Vec<u8>> {
    match scheme {
        compression::NONE => Ok(data.to_vec()),
        compression::DEFLATE | compression::ADOBE_DEFLATE => inflate(data),
        other => Err(GeoTiffError::UnsupportedCompression(other)),
    }
}

/// Inflate a Deflate payload, accepting both zlib-wrapped and raw streams.
fn inflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut zlib = ZlibDecoder::new(data);
    match zlib.read_to_end(&mut out) {
        Ok(_) => Ok(out),
        Err(_) => {
            // Some writers emit raw deflate without the zlib wrapper.
            out.clear();
            let mut raw = DeflateDecoder::new(data);
            raw.read_to_end(&mut out)
                .map_err(|e| GeoTiffError::Decompress(e.to_string()))?;
            Ok(out)
        }
    }
}

fn decode_segment(data: &[u8], offset: u32, count: u32, scheme: u16) -> Result<Vec<u8>> {
    let start = offset as usize;
    let end = start
        .checked_add(count as usize)
        .ok_or_else(|| GeoTiffError::invalid("segment extent overflows"))?;
    if end > data.len() {
        return Err(GeoTiffError::truncated(format!(
            "segment at {}..{} past end of {} bytes",
            start,
            end,
            data.len()
        )));
    }
    decompress(&data[start..end], scheme)
}

fn plane_and_index(separate: bool, seg: usize, per_plane: usize) -> (usize, usize) {
    if separate {
        (seg / per_plane, seg % per_plane)
    } else {
        (0, seg)
    }
}

fn uniform_value(values: Vec<u32>, tag_name: &str) -> Result<u32> {
    let first = *values
        .first()
        .ok_or_else(|| GeoTiffError::invalid(format!("{} is empty", tag_name)))?;
    if values.iter().any(|&v| v != first) {
        return Err(GeoTiffError::invalid(format!(
            "mixed {} values are not supported",
            tag_name
        )));
    }
    Ok(first)
}

fn conversion_supported(format: u16, bits: u16) -> bool {
    matches!(
        (format, bits),
        (sample_format::UNSIGNED, 8 | 16 | 32)
            | (sample_format::SIGNED, 8 | 16 | 32)
            | (sample_format::FLOAT, 32 | 64)
    )
}

/// Convert one sample's bytes to f32. Combinations outside
/// `conversion_supported` are rejected before this is reached.
fn read_sample(bytes: &[u8], order: ByteOrder, format: u16, bits: u16) -> f32 {
    match (format, bits) {
        (sample_format::UNSIGNED, 8) => bytes[0] as f32,
        (sample_format::UNSIGNED, 16) => order.read_u16(bytes) as f32,
        (sample_format::UNSIGNED, 32) => order.read_u32(bytes) as f32,
        (sample_format::SIGNED, 8) => bytes[0] as i8 as f32,
        (sample_format::SIGNED, 16) => order.read_u16(bytes) as i16 as f32,
        (sample_format::SIGNED, 32) => order.read_u32(bytes) as i32 as f32,
        (sample_format::FLOAT, 32) => order.read_f32(bytes),
        (sample_format::FLOAT, 64) => order.read_f64(bytes) as f32,
        _ => 0.0,
    }
}

fn check_segment_counts(offsets: usize, byte_counts: usize, expected: usize) -> Result<()> {
    if offsets != byte_counts {
        return Err(GeoTiffError::invalid(format!(
            "{} segment offsets but {} byte counts",
            offsets, byte_counts
        )));
    }
    if offsets != expected {
        return Err(GeoTiffError::invalid(format!(
            "{} segments declared, layout requires {}",
            offsets, expected
        )));
    }
    Ok(())
}
