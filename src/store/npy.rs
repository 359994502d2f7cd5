//! NumPy `.npy` encoding of assignments.
//!
//! Format (version 1.0, as written):
//! - Magic: `\x93NUMPY` (6 bytes)
//! - Version: major, minor (2 bytes)
//! - Header length: u16 (2 bytes, little-endian)
//! - Header: Python dict literal
//!   `{'descr': '<i8', 'fortran_order': False, 'shape': (2, M), }`,
//!   space padded and newline terminated so the data starts on a 64-byte
//!   boundary
//! - Data: `2 × M` little-endian i64, row 0 = source indices, row 1 =
//!   destination indices
//!
//! The reader also accepts version 2.0/3.0 headers (u32 length), `<i4` data
//! and Fortran order, which covers what `np.save` produces for an integer
//! `2 × M` array.

use std::io::{Read, Write};

use crate::core::Assignment;

/// Magic bytes for .npy files
const MAGIC: &[u8; 6] = b"\x93NUMPY";

/// Data alignment required by the format
const ALIGNMENT: usize = 64;

/// Decoding failure, reported with the entry location by the caller.
pub(crate) type DecodeError = String;

/// Write an assignment as a `2 × M` int64 array.
pub(crate) fn write_npy<W: Write>(assignment: &Assignment, writer: &mut W) -> std::io::Result<()> {
    let dict = format!(
        "{{'descr': '<i8', 'fortran_order': False, 'shape': (2, {}), }}",
        assignment.len()
    );
    // magic + version + header length + dict + newline
    let unpadded = MAGIC.len() + 2 + 2 + dict.len() + 1;
    let padding = (ALIGNMENT - unpadded % ALIGNMENT) % ALIGNMENT;
    let header = format!("{}{}\n", dict, " ".repeat(padding));

    let mut bytes = Vec::with_capacity(unpadded + padding + 16 * assignment.len());
    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&[1, 0]);
    bytes.extend_from_slice(&(header.len() as u16).to_le_bytes());
    bytes.extend_from_slice(header.as_bytes());
    for &index in assignment.src().iter().chain(assignment.dst()) {
        bytes.extend_from_slice(&(index as i64).to_le_bytes());
    }
    writer.write_all(&bytes)
}

/// Read a `2 × M` integer array back into an assignment.
pub(crate) fn read_npy<R: Read>(reader: &mut R) -> Result<Assignment, DecodeError> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| format!("read failed: {}", e))?;
    decode(&bytes)
}

fn decode(bytes: &[u8]) -> Result<Assignment, DecodeError> {
    if bytes.len() < 10 || &bytes[0..6] != MAGIC {
        return Err("Invalid magic bytes".to_string());
    }

    let (header_len, header_start) = match bytes[6] {
        1 => (u16::from_le_bytes([bytes[8], bytes[9]]) as usize, 10),
        2 | 3 if bytes.len() >= 12 => (
            u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize,
            12,
        ),
        major => return Err(format!("Unsupported version {}.{}", major, bytes[7])),
    };
    let data_start = header_start + header_len;
    if bytes.len() < data_start {
        return Err("Truncated header".to_string());
    }
    let header = std::str::from_utf8(&bytes[header_start..data_start])
        .map_err(|_| "Header is not valid text".to_string())?;

    let descr = quoted_value(header, "descr").ok_or("Missing 'descr'")?;
    let item_size = match descr {
        "<i8" => 8,
        "<i4" => 4,
        other => return Err(format!("Unsupported dtype {}", other)),
    };
    let fortran_order = match raw_value(header, "fortran_order") {
        Some(v) if v.starts_with("True") => true,
        Some(v) if v.starts_with("False") => false,
        _ => return Err("Missing 'fortran_order'".to_string()),
    };
    let shape = shape(header).ok_or("Missing or invalid 'shape'")?;
    let m = match shape.as_slice() {
        [2, m] => *m,
        other => return Err(format!("Expected shape (2, M), found {:?}", other)),
    };

    let data = &bytes[data_start..];
    let expected = m
        .checked_mul(2 * item_size)
        .ok_or_else(|| format!("Shape (2, {}) overflows", m))?;
    if data.len() != expected {
        return Err(format!(
            "Expected {} data bytes, found {}",
            expected,
            data.len()
        ));
    }

    let mut values = Vec::with_capacity(2 * m);
    for chunk in data.chunks_exact(item_size) {
        let value = match item_size {
            8 => i64::from_le_bytes([
                chunk[0], chunk[1], chunk[2], chunk[3], chunk[4], chunk[5], chunk[6], chunk[7],
            ]),
            _ => i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]) as i64,
        };
        let index = usize::try_from(value).map_err(|_| format!("Negative index {}", value))?;
        values.push(index);
    }

    // Element (r, c) sits at r * M + c in C order, c * 2 + r in Fortran order
    let at = |r: usize, c: usize| {
        if fortran_order {
            values[c * 2 + r]
        } else {
            values[r * m + c]
        }
    };
    let src = (0..m).map(|c| at(0, c)).collect();
    let dst = (0..m).map(|c| at(1, c)).collect();
    Assignment::new(src, dst).ok_or_else(|| "Indices are not unique".to_string())
}

/// Text following `'key':`, trimmed.
fn raw_value<'a>(header: &'a str, key: &str) -> Option<&'a str> {
    let pattern = format!("'{}':", key);
    let start = header.find(&pattern)? + pattern.len();
    Some(header[start..].trim_start())
}

fn quoted_value<'a>(header: &'a str, key: &str) -> Option<&'a str> {
    let rest = raw_value(header, key)?.strip_prefix('\'')?;
    let end = rest.find('\'')?;
    Some(&rest[..end])
}

fn shape(header: &str) -> Option<Vec<usize>> {
    let rest = raw_value(header, "shape")?.strip_prefix('(')?;
    let end = rest.find(')')?;
    rest[..end]
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(assignment: &Assignment) -> Vec<u8> {
        let mut bytes = Vec::new();
        write_npy(assignment, &mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_header_layout() {
        let assignment = Assignment::new(vec![0, 2, 5], vec![3, 1, 4]).unwrap();
        let bytes = encoded(&assignment);
        assert_eq!(&bytes[0..6], MAGIC);
        assert_eq!(&bytes[6..8], &[1, 0]);
        let header_len = u16::from_le_bytes([bytes[8], bytes[9]]) as usize;
        assert_eq!((10 + header_len) % ALIGNMENT, 0);
        assert_eq!(bytes[10 + header_len - 1], b'\n');
        assert_eq!(bytes.len(), 10 + header_len + 6 * 8);
        // First data element is src[0], fourth is dst[0]
        let data = &bytes[10 + header_len..];
        assert_eq!(data[0], 0);
        assert_eq!(data[3 * 8], 3);
    }

    #[test]
    fn test_roundtrip() {
        let assignment = Assignment::new(vec![7, 1, 3], vec![0, 9, 2]).unwrap();
        let decoded = read_npy(&mut encoded(&assignment).as_slice()).unwrap();
        assert_eq!(decoded, assignment);
    }

    /// Version 1.0 file with the given header dictionary and no data.
    fn with_header(dict: &str) -> Vec<u8> {
        let padding = ALIGNMENT - (10 + dict.len() + 1) % ALIGNMENT;
        let header = format!("{}{}\n", dict, " ".repeat(padding));
        let mut bytes = MAGIC.to_vec();
        bytes.extend_from_slice(&[1, 0]);
        bytes.extend_from_slice(&(header.len() as u16).to_le_bytes());
        bytes.extend_from_slice(header.as_bytes());
        bytes
    }

    #[test]
    fn test_reads_numpy_int32_fortran() {
        // np.asfortranarray(np.array([[0, 1], [5, 6]], dtype='<i4'))
        let mut bytes = with_header("{'descr': '<i4', 'fortran_order': True, 'shape': (2, 2), }");
        for v in [0i32, 5, 1, 6] {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.src(), &[0, 1]);
        assert_eq!(decoded.dst(), &[5, 6]);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(decode(b"not a numpy file").is_err());
    }

    #[test]
    fn test_rejects_truncated_data() {
        let assignment = Assignment::new(vec![0, 1], vec![1, 0]).unwrap();
        let bytes = encoded(&assignment);
        assert!(decode(&bytes[..bytes.len() - 3]).is_err());
    }

    #[test]
    fn test_rejects_oversized_shape() {
        let bytes = with_header(
            "{'descr': '<i8', 'fortran_order': False, 'shape': (2, 2305843009213693952), }",
        );
        assert!(decode(&bytes).unwrap_err().contains("overflows"));
    }

    #[test]
    fn test_rejects_duplicate_indices() {
        let mut bytes = encoded(&Assignment::new(vec![0, 1], vec![2, 3]).unwrap());
        let len = bytes.len();
        // Overwrite dst[1] with dst[0]
        bytes[len - 8] = 2;
        assert_eq!(decode(&bytes).unwrap_err(), "Indices are not unique");
    }
}
