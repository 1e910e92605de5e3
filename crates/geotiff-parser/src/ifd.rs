//! TIFF header and Image File Directory parsing.
//!
//! Classic (non-Big) TIFF only. The whole payload is in memory, so tag
//! values are resolved directly against the buffer rather than through a
//! reader abstraction.

use crate::error::{GeoTiffError, Result};
use crate::tags::{self, field_type};

/// Byte order declared by the TIFF header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    pub fn read_u16(self, data: &[u8]) -> u16 {
        let b = [data[0], data[1]];
        match self {
            ByteOrder::Little => u16::from_le_bytes(b),
            ByteOrder::Big => u16::from_be_bytes(b),
        }
    }

    pub fn read_u32(self, data: &[u8]) -> u32 {
        let b = [data[0], data[1], data[2], data[3]];
        match self {
            ByteOrder::Little => u32::from_le_bytes(b),
            ByteOrder::Big => u32::from_be_bytes(b),
        }
    }

    pub fn read_u64(self, data: &[u8]) -> u64 {
        let b = [
            data[0], data[1], data[2], data[3], data[4], data[5], data[6], data[7],
        ];
        match self {
            ByteOrder::Little => u64::from_le_bytes(b),
            ByteOrder::Big => u64::from_be_bytes(b),
        }
    }

    pub fn read_f32(self, data: &[u8]) -> f32 {
        f32::from_bits(self.read_u32(data))
    }

    pub fn read_f64(self, data: &[u8]) -> f64 {
        f64::from_bits(self.read_u64(data))
    }
}

/// Parsed 8-byte TIFF header.
#[derive(Debug, Clone, Copy)]
pub struct TiffHeader {
    pub byte_order: ByteOrder,
    pub first_ifd_offset: u32,
}

/// One 12-byte directory entry.
///
/// `raw_value` keeps the last four header bytes verbatim so inline values
/// can be re-read in the file's byte order regardless of type.
#[derive(Debug, Clone)]
pub struct IfdEntry {
    pub tag: u16,
    pub type_id: u16,
    pub count: u32,
    pub value_or_offset: u32,
    raw_value: [u8; 4],
}

impl IfdEntry {
    /// Total byte size of this entry's value data.
    pub fn byte_len(&self) -> u64 {
        tags::type_byte_size(self.type_id).unwrap_or(1) as u64 * self.count as u64
    }

    /// Values of at most four bytes are stored inline in the entry itself.
    pub fn is_inline(&self) -> bool {
        self.byte_len() <= 4
    }
}

/// A single parsed directory with its entries.
#[derive(Debug, Clone)]
pub struct Ifd {
    pub byte_order: ByteOrder,
    pub entries: Vec<IfdEntry>,
    /// Offset of the next directory, zero when this is the last one.
    pub next_ifd_offset: u32,
}

/// Parse the TIFF header: byte-order marker, magic 42, first IFD offset.
pub fn parse_header(data: &[u8]) -> Result<TiffHeader> {
    if data.len() < 8 {
        return Err(GeoTiffError::truncated("header shorter than 8 bytes"));
    }

    let byte_order = match (data[0], data[1]) {
        (b'I', b'I') => ByteOrder::Little,
        (b'M', b'M') => ByteOrder::Big,
        _ => return Err(GeoTiffError::invalid("unrecognized byte-order marker")),
    };

    let magic = byte_order.read_u16(&data[2..4]);
    if magic != 42 {
        return Err(GeoTiffError::invalid(format!(
            "expected magic 42, got {}",
            magic
        )));
    }

    let first_ifd_offset = byte_order.read_u32(&data[4..8]);

    Ok(TiffHeader {
        byte_order,
        first_ifd_offset,
    })
}

/// Parse the directory at `offset`.
pub fn parse_ifd(byte_order: ByteOrder, data: &[u8], offset: usize) -> Result<Ifd> {
    if offset + 2 > data.len() {
        return Err(GeoTiffError::truncated(format!(
            "IFD offset {} past end of {} bytes",
            offset,
            data.len()
        )));
    }

    let entry_count = byte_order.read_u16(&data[offset..offset + 2]) as usize;
    let needed = offset + 2 + entry_count * 12 + 4;
    if needed > data.len() {
        return Err(GeoTiffError::truncated(format!(
            "IFD with {} entries needs {} bytes, have {}",
            entry_count,
            needed,
            data.len()
        )));
    }

    let mut entries = Vec::with_capacity(entry_count);
    for i in 0..entry_count {
        let at = offset + 2 + i * 12;
        let raw_value = [data[at + 8], data[at + 9], data[at + 10], data[at + 11]];
        entries.push(IfdEntry {
            tag: byte_order.read_u16(&data[at..at + 2]),
            type_id: byte_order.read_u16(&data[at + 2..at + 4]),
            count: byte_order.read_u32(&data[at + 4..at + 8]),
            value_or_offset: byte_order.read_u32(&data[at + 8..at + 12]),
            raw_value,
        });
    }

    let next_at = offset + 2 + entry_count * 12;
    let next_ifd_offset = byte_order.read_u32(&data[next_at..next_at + 4]);

    Ok(Ifd {
        byte_order,
        entries,
        next_ifd_offset,
    })
}

impl Ifd {
    /// Find an entry by tag ID.
    pub fn find(&self, tag: u16) -> Option<&IfdEntry> {
        self.entries.iter().find(|e| e.tag == tag)
    }

    /// Resolve an entry's value bytes, inline or from its file offset.
    fn value_bytes(&self, entry: &IfdEntry, data: &[u8]) -> Result<Vec<u8>> {
        let len = entry.byte_len() as usize;
        if entry.is_inline() {
            return Ok(entry.raw_value[..len].to_vec());
        }

        let start = entry.value_or_offset as usize;
        let end = start
            .checked_add(len)
            .ok_or_else(|| GeoTiffError::invalid(format!("tag {} value overflows", entry.tag)))?;
        if end > data.len() {
            return Err(GeoTiffError::truncated(format!(
                "tag {} value at {}..{} past end of {} bytes",
                entry.tag,
                start,
                end,
                data.len()
            )));
        }
        Ok(data[start..end].to_vec())
    }

    /// Read a tag's values as u32, widening SHORT entries.
    pub fn u32_values(&self, tag: u16, data: &[u8]) -> Result<Option<Vec<u32>>> {
        let entry = match self.find(tag) {
            Some(e) => e,
            None => return Ok(None),
        };
        let bytes = self.value_bytes(entry, data)?;

        let mut values = Vec::with_capacity(entry.count as usize);
        match entry.type_id {
            field_type::SHORT => {
                for chunk in bytes.chunks_exact(2) {
                    values.push(self.byte_order.read_u16(chunk) as u32);
                }
            }
            field_type::LONG => {
                for chunk in bytes.chunks_exact(4) {
                    values.push(self.byte_order.read_u32(chunk));
                }
            }
            other => {
                return Err(GeoTiffError::invalid(format!(
                    "tag {} has type {}, expected SHORT or LONG",
                    tag, other
                )))
            }
        }
        Ok(Some(values))
    }

    /// Read a single numeric tag value, taking the first element of arrays.
    pub fn u32_value(&self, tag: u16, data: &[u8]) -> Result<Option<u32>> {
        Ok(self.u32_values(tag, data)?.and_then(|v| v.first().copied()))
    }

    /// Read a tag's values as f64, widening FLOAT entries.
    pub fn f64_values(&self, tag: u16, data: &[u8]) -> Result<Option<Vec<f64>>> {
        let entry = match self.find(tag) {
            Some(e) => e,
            None => return Ok(None),
        };
        let bytes = self.value_bytes(entry, data)?;

        let mut values = Vec::with_capacity(entry.count as usize);
        match entry.type_id {
            field_type::DOUBLE => {
                for chunk in bytes.chunks_exact(8) {
                    values.push(self.byte_order.read_f64(chunk));
                }
            }
            field_type::FLOAT => {
                for chunk in bytes.chunks_exact(4) {
                    values.push(self.byte_order.read_f32(chunk) as f64);
                }
            }
            other => {
                return Err(GeoTiffError::invalid(format!(
                    "tag {} has type {}, expected FLOAT or DOUBLE",
                    tag, other
                )))
            }
        }
        Ok(Some(values))
    }

    /// Read a null-terminated ASCII tag value.
    pub fn ascii_value(&self, tag: u16, data: &[u8]) -> Result<Option<String>> {
        let entry = match self.find(tag) {
            Some(e) => e,
            None => return Ok(None),
        };
        if entry.type_id != field_type::ASCII {
            return Err(GeoTiffError::invalid(format!(
                "tag {} has type {}, expected ASCII",
                tag, entry.type_id
            )));
        }
        let bytes = self.value_bytes(entry, data)?;
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        Ok(Some(String::from_utf8_lossy(&bytes[..end]).to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_header_both_orders() {
        let le = [b'I', b'I', 42, 0, 8, 0, 0, 0];
        let header = parse_header(&le).unwrap();
        assert_eq!(header.byte_order, ByteOrder::Little);
        assert_eq!(header.first_ifd_offset, 8);

        let be = [b'M', b'M', 0, 42, 0, 0, 0, 8];
        let header = parse_header(&be).unwrap();
        assert_eq!(header.byte_order, ByteOrder::Big);
        assert_eq!(header.first_ifd_offset, 8);
    }

    #[test]
    fn test_bad_magic_rejected() {
        let data = [b'I', b'I', 43, 0, 8, 0, 0, 0];
        assert!(matches!(
            parse_header(&data),
            Err(GeoTiffError::InvalidContainer(_))
        ));
    }

    #[test]
    fn test_parse_single_entry_ifd() {
        let mut data = Vec::new();
        data.extend_from_slice(&1u16.to_le_bytes()); // entry count
        data.extend_from_slice(&256u16.to_le_bytes()); // ImageWidth
        data.extend_from_slice(&3u16.to_le_bytes()); // SHORT
        data.extend_from_slice(&1u32.to_le_bytes()); // count
        data.extend_from_slice(&512u32.to_le_bytes()); // inline value
        data.extend_from_slice(&0u32.to_le_bytes()); // next IFD

        let ifd = parse_ifd(ByteOrder::Little, &data, 0).unwrap();
        assert_eq!(ifd.entries.len(), 1);
        assert_eq!(ifd.next_ifd_offset, 0);

        let entry = ifd.find(256).unwrap();
        assert!(entry.is_inline());
        assert_eq!(ifd.u32_value(256, &data).unwrap(), Some(512));
    }

    #[test]
    fn test_inline_short_array_respects_byte_order() {
        // Big-endian entry holding two SHORT values inline: 8 and 16.
        let mut data = Vec::new();
        data.extend_from_slice(&1u16.to_be_bytes());
        data.extend_from_slice(&258u16.to_be_bytes()); // BitsPerSample
        data.extend_from_slice(&3u16.to_be_bytes());
        data.extend_from_slice(&2u32.to_be_bytes());
        data.extend_from_slice(&8u16.to_be_bytes());
        data.extend_from_slice(&16u16.to_be_bytes());
        data.extend_from_slice(&0u32.to_be_bytes());

        let ifd = parse_ifd(ByteOrder::Big, &data, 0).unwrap();
        let values = ifd.u32_values(258, &data).unwrap().unwrap();
        assert_eq!(values, vec![8, 16]);
    }

    #[test]
    fn test_external_value_out_of_bounds() {
        let mut data = Vec::new();
        data.extend_from_slice(&1u16.to_le_bytes());
        data.extend_from_slice(&33550u16.to_le_bytes()); // ModelPixelScale
        data.extend_from_slice(&12u16.to_le_bytes()); // DOUBLE
        data.extend_from_slice(&3u32.to_le_bytes()); // 24 bytes, external
        data.extend_from_slice(&4096u32.to_le_bytes()); // offset past the end
        data.extend_from_slice(&0u32.to_le_bytes());

        let ifd = parse_ifd(ByteOrder::Little, &data, 0).unwrap();
        assert!(matches!(
            ifd.f64_values(33550, &data),
            Err(GeoTiffError::Truncated(_))
        ));
    }

    #[test]
    fn test_truncated_ifd_rejected() {
        // Claims 4 entries but provides none.
        let data = [4u8, 0];
        assert!(matches!(
            parse_ifd(ByteOrder::Little, &data, 0),
            Err(GeoTiffError::Truncated(_))
        ));
    }
}
