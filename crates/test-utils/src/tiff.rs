//! In-memory GeoTIFF encoder for tests.
//!
//! Produces small classic-TIFF payloads covering the layouts the decoder
//! supports: strip or tile chunking, chunky or planar bands, zlib-wrapped
//! Deflate, both byte orders, and the GeoTIFF placement/no-data tags.
//! Values, counts, and offsets are emitted exactly as a well-behaved
//! writer would, so decoder tests exercise realistic byte streams.

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;

const TYPE_ASCII: u16 = 2;
const TYPE_SHORT: u16 = 3;
const TYPE_LONG: u16 = 4;
const TYPE_DOUBLE: u16 = 12;

/// On-disk sample representation for encoded bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleKind {
    U8,
    U16,
    U32,
    I16,
    I32,
    F32,
    F64,
}

impl SampleKind {
    fn bits(self) -> u16 {
        match self {
            SampleKind::U8 => 8,
            SampleKind::U16 | SampleKind::I16 => 16,
            SampleKind::U32 | SampleKind::I32 | SampleKind::F32 => 32,
            SampleKind::F64 => 64,
        }
    }

    fn format(self) -> u16 {
        match self {
            SampleKind::U8 | SampleKind::U16 | SampleKind::U32 => 1,
            SampleKind::I16 | SampleKind::I32 => 2,
            SampleKind::F32 | SampleKind::F64 => 3,
        }
    }

    fn encode(self, value: f32, big_endian: bool, out: &mut Vec<u8>) {
        // Float-to-int casts saturate, which is what tests want for
        // out-of-range inputs.
        match (self, big_endian) {
            (SampleKind::U8, _) => out.push(value as u8),
            (SampleKind::U16, false) => out.extend_from_slice(&(value as u16).to_le_bytes()),
            (SampleKind::U16, true) => out.extend_from_slice(&(value as u16).to_be_bytes()),
            (SampleKind::U32, false) => out.extend_from_slice(&(value as u32).to_le_bytes()),
            (SampleKind::U32, true) => out.extend_from_slice(&(value as u32).to_be_bytes()),
            (SampleKind::I16, false) => out.extend_from_slice(&(value as i16).to_le_bytes()),
            (SampleKind::I16, true) => out.extend_from_slice(&(value as i16).to_be_bytes()),
            (SampleKind::I32, false) => out.extend_from_slice(&(value as i32).to_le_bytes()),
            (SampleKind::I32, true) => out.extend_from_slice(&(value as i32).to_be_bytes()),
            (SampleKind::F32, false) => out.extend_from_slice(&value.to_le_bytes()),
            (SampleKind::F32, true) => out.extend_from_slice(&value.to_be_bytes()),
            (SampleKind::F64, false) => out.extend_from_slice(&(value as f64).to_le_bytes()),
            (SampleKind::F64, true) => out.extend_from_slice(&(value as f64).to_be_bytes()),
        }
    }
}

/// Builder for synthetic GeoTIFF payloads.
///
/// Defaults: one band required, `F32` samples, single strip, chunky,
/// little-endian, uncompressed, no geographic tags.
///
/// # Panics
///
/// `build` panics when no bands were added or a band's length does not
/// match the dimensions. Test inputs are expected to be well formed.
pub struct TiffBuilder {
    width: usize,
    height: usize,
    bands: Vec<Vec<f32>>,
    kind: SampleKind,
    deflate: bool,
    planar_separate: bool,
    rows_per_strip: Option<usize>,
    tile: Option<(usize, usize)>,
    big_endian: bool,
    pixel_scale: Option<(f64, f64)>,
    origin: Option<(f64, f64)>,
    epsg: Option<(u16, bool)>,
    no_data: Option<f32>,
}

impl TiffBuilder {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            bands: Vec::new(),
            kind: SampleKind::F32,
            deflate: false,
            planar_separate: false,
            rows_per_strip: None,
            tile: None,
            big_endian: false,
            pixel_scale: None,
            origin: None,
            epsg: None,
            no_data: None,
        }
    }

    /// Append one band of `width * height` samples.
    pub fn band(mut self, samples: Vec<f32>) -> Self {
        self.bands.push(samples);
        self
    }

    pub fn kind(mut self, kind: SampleKind) -> Self {
        self.kind = kind;
        self
    }

    /// Compress every strip/tile with zlib-wrapped Deflate.
    pub fn deflate(mut self) -> Self {
        self.deflate = true;
        self
    }

    /// Store each band in its own planes (PlanarConfiguration = 2).
    pub fn planar(mut self) -> Self {
        self.planar_separate = true;
        self
    }

    /// Chunk into strips of `rows` rows instead of a single strip.
    pub fn strips(mut self, rows: usize) -> Self {
        self.rows_per_strip = Some(rows);
        self.tile = None;
        self
    }

    /// Chunk into tiles instead of strips.
    pub fn tiles(mut self, tile_width: usize, tile_height: usize) -> Self {
        self.tile = Some((tile_width, tile_height));
        self
    }

    pub fn big_endian(mut self) -> Self {
        self.big_endian = true;
        self
    }

    /// Emit ModelPixelScale + ModelTiepoint anchored at pixel (0, 0).
    ///
    /// `pixel_scale` uses the tag's convention: both components positive,
    /// rows stepping southward.
    pub fn georef(mut self, pixel_scale: (f64, f64), origin: (f64, f64)) -> Self {
        self.pixel_scale = Some(pixel_scale);
        self.origin = Some(origin);
        self
    }

    /// Emit a GeoKeyDirectory with a geographic CRS code.
    pub fn epsg(mut self, code: u16) -> Self {
        self.epsg = Some((code, false));
        self
    }

    /// Emit a GeoKeyDirectory with a projected CRS code.
    pub fn projected_epsg(mut self, code: u16) -> Self {
        self.epsg = Some((code, true));
        self
    }

    /// Emit a GDAL_NODATA ASCII tag.
    pub fn no_data(mut self, value: f32) -> Self {
        self.no_data = Some(value);
        self
    }

    /// Encode the TIFF payload.
    pub fn build(&self) -> Vec<u8> {
        assert!(!self.bands.is_empty(), "at least one band is required");
        for (i, band) in self.bands.iter().enumerate() {
            assert_eq!(
                band.len(),
                self.width * self.height,
                "band {} length must match dimensions",
                i
            );
        }

        let segments = self.encode_segments();

        let mut file = Vec::new();
        if self.big_endian {
            file.extend_from_slice(b"MM");
        } else {
            file.extend_from_slice(b"II");
        }
        file.extend_from_slice(&self.u16_bytes(42));
        file.extend_from_slice(&[0, 0, 0, 0]); // first IFD offset, patched below

        let mut seg_offsets = Vec::with_capacity(segments.len());
        let mut seg_counts = Vec::with_capacity(segments.len());
        for seg in &segments {
            if file.len() % 2 == 1 {
                file.push(0);
            }
            seg_offsets.push(file.len() as u32);
            seg_counts.push(seg.len() as u32);
            file.extend_from_slice(seg);
        }

        let mut entries = self.tag_entries(&seg_offsets, &seg_counts);
        entries.sort_by_key(|e| e.0);

        // External value blocks go between the data and the IFD.
        let mut placements = Vec::with_capacity(entries.len());
        for (_, _, _, value) in &entries {
            if value.len() > 4 {
                if file.len() % 2 == 1 {
                    file.push(0);
                }
                placements.push(Some(file.len() as u32));
                file.extend_from_slice(value);
            } else {
                placements.push(None);
            }
        }

        if file.len() % 2 == 1 {
            file.push(0);
        }
        let ifd_offset = file.len() as u32;
        file.extend_from_slice(&self.u16_bytes(entries.len() as u16));
        for ((tag, type_id, count, value), placement) in entries.iter().zip(&placements) {
            file.extend_from_slice(&self.u16_bytes(*tag));
            file.extend_from_slice(&self.u16_bytes(*type_id));
            file.extend_from_slice(&self.u32_bytes(*count));
            match placement {
                Some(offset) => file.extend_from_slice(&self.u32_bytes(*offset)),
                None => {
                    let mut inline = value.clone();
                    inline.resize(4, 0);
                    file.extend_from_slice(&inline);
                }
            }
        }
        file.extend_from_slice(&self.u32_bytes(0)); // next IFD

        let offset_bytes = self.u32_bytes(ifd_offset);
        file[4..8].copy_from_slice(&offset_bytes);
        file
    }

    fn encode_segments(&self) -> Vec<Vec<u8>> {
        let spp = self.bands.len();
        let planes = if self.planar_separate { spp } else { 1 };
        let mut segments = Vec::new();

        if let Some((tw, th)) = self.tile {
            let across = self.width.div_ceil(tw);
            let down = self.height.div_ceil(th);
            for plane in 0..planes {
                for ty in 0..down {
                    for tx in 0..across {
                        let mut raw = Vec::new();
                        for r in 0..th {
                            for c in 0..tw {
                                let x = tx * tw + c;
                                let y = ty * th + r;
                                let inside = x < self.width && y < self.height;
                                if self.planar_separate {
                                    let v = if inside {
                                        self.bands[plane][y * self.width + x]
                                    } else {
                                        0.0
                                    };
                                    self.kind.encode(v, self.big_endian, &mut raw);
                                } else {
                                    for band in &self.bands {
                                        let v = if inside { band[y * self.width + x] } else { 0.0 };
                                        self.kind.encode(v, self.big_endian, &mut raw);
                                    }
                                }
                            }
                        }
                        segments.push(self.compress(raw));
                    }
                }
            }
        } else {
            let rps = self
                .rows_per_strip
                .unwrap_or(self.height)
                .min(self.height)
                .max(1);
            for plane in 0..planes {
                for strip in 0..self.height.div_ceil(rps) {
                    let row0 = strip * rps;
                    let rows = rps.min(self.height - row0);
                    let mut raw = Vec::new();
                    for y in row0..row0 + rows {
                        for x in 0..self.width {
                            if self.planar_separate {
                                let v = self.bands[plane][y * self.width + x];
                                self.kind.encode(v, self.big_endian, &mut raw);
                            } else {
                                for band in &self.bands {
                                    self.kind.encode(band[y * self.width + x], self.big_endian, &mut raw);
                                }
                            }
                        }
                    }
                    segments.push(self.compress(raw));
                }
            }
        }

        segments
    }

    fn compress(&self, raw: Vec<u8>) -> Vec<u8> {
        if !self.deflate {
            return raw;
        }
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&raw).expect("in-memory deflate");
        encoder.finish().expect("in-memory deflate")
    }

    fn tag_entries(
        &self,
        seg_offsets: &[u32],
        seg_counts: &[u32],
    ) -> Vec<(u16, u16, u32, Vec<u8>)> {
        let spp = self.bands.len();
        let mut entries = Vec::new();

        entries.push((256, TYPE_LONG, 1, self.u32_bytes(self.width as u32).to_vec()));
        entries.push((257, TYPE_LONG, 1, self.u32_bytes(self.height as u32).to_vec()));
        entries.push((258, TYPE_SHORT, spp as u32, self.u16_list(&vec![self.kind.bits(); spp])));
        let compression = if self.deflate { 8 } else { 1 };
        entries.push((259, TYPE_SHORT, 1, self.u16_bytes(compression).to_vec()));
        entries.push((262, TYPE_SHORT, 1, self.u16_bytes(1).to_vec())); // BlackIsZero
        entries.push((277, TYPE_SHORT, 1, self.u16_bytes(spp as u16).to_vec()));
        entries.push((284, TYPE_SHORT, 1, self.u16_bytes(if self.planar_separate { 2 } else { 1 }).to_vec()));
        entries.push((339, TYPE_SHORT, spp as u32, self.u16_list(&vec![self.kind.format(); spp])));

        if let Some((tw, th)) = self.tile {
            entries.push((322, TYPE_LONG, 1, self.u32_bytes(tw as u32).to_vec()));
            entries.push((323, TYPE_LONG, 1, self.u32_bytes(th as u32).to_vec()));
            entries.push((324, TYPE_LONG, seg_offsets.len() as u32, self.u32_list(seg_offsets)));
            entries.push((325, TYPE_LONG, seg_counts.len() as u32, self.u32_list(seg_counts)));
        } else {
            let rps = self
                .rows_per_strip
                .unwrap_or(self.height)
                .min(self.height)
                .max(1);
            entries.push((273, TYPE_LONG, seg_offsets.len() as u32, self.u32_list(seg_offsets)));
            entries.push((278, TYPE_LONG, 1, self.u32_bytes(rps as u32).to_vec()));
            entries.push((279, TYPE_LONG, seg_counts.len() as u32, self.u32_list(seg_counts)));
        }

        if let (Some(scale), Some(origin)) = (self.pixel_scale, self.origin) {
            entries.push((
                33550,
                TYPE_DOUBLE,
                3,
                self.f64_list(&[scale.0, scale.1, 0.0]),
            ));
            entries.push((
                33922,
                TYPE_DOUBLE,
                6,
                self.f64_list(&[0.0, 0.0, 0.0, origin.0, origin.1, 0.0]),
            ));
        }

        if let Some((code, projected)) = self.epsg {
            let key_id: u16 = if projected { 3072 } else { 2048 };
            let directory = [1u16, 1, 0, 1, key_id, 0, 1, code];
            entries.push((34735, TYPE_SHORT, 8, self.u16_list(&directory)));
        }

        if let Some(nd) = self.no_data {
            let mut text = format!("{}", nd).into_bytes();
            text.push(0);
            let count = text.len() as u32;
            entries.push((42113, TYPE_ASCII, count, text));
        }

        entries
    }

    fn u16_bytes(&self, v: u16) -> [u8; 2] {
        if self.big_endian {
            v.to_be_bytes()
        } else {
            v.to_le_bytes()
        }
    }

    fn u32_bytes(&self, v: u32) -> [u8; 4] {
        if self.big_endian {
            v.to_be_bytes()
        } else {
            v.to_le_bytes()
        }
    }

    fn u16_list(&self, values: &[u16]) -> Vec<u8> {
        values.iter().flat_map(|&v| self.u16_bytes(v)).collect()
    }

    fn u32_list(&self, values: &[u32]) -> Vec<u8> {
        values.iter().flat_map(|&v| self.u32_bytes(v)).collect()
    }

    fn f64_list(&self, values: &[f64]) -> Vec<u8> {
        values
            .iter()
            .flat_map(|&v| {
                if self.big_endian {
                    v.to_be_bytes()
                } else {
                    v.to_le_bytes()
                }
            })
            .collect()
    }
}
