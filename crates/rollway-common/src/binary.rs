// binary.rs — fixed-width record I/O
//
// Replay headers and a handful of other on-disk records use a plain
// little-endian layout: 4-byte floats and indices, 2-byte shorts,
// NUL-terminated strings. Byte order is explicit so records written on
// one platform read back on any other.

use std::io::{self, Read, Write};

pub const FLOAT_BYTES: usize = 4;
pub const INDEX_BYTES: usize = 4;
pub const SHORT_BYTES: usize = 2;

pub fn string_bytes(s: &str) -> usize {
    s.len() + 1
}

// ============================================================
// Writers
// ============================================================

pub fn put_float<W: Write>(fout: &mut W, f: f32) -> io::Result<()> {
    fout.write_all(&f.to_le_bytes())
}

pub fn put_index<W: Write>(fout: &mut W, val: i32) -> io::Result<()> {
    fout.write_all(&val.to_le_bytes())
}

pub fn put_short<W: Write>(fout: &mut W, val: i16) -> io::Result<()> {
    fout.write_all(&val.to_le_bytes())
}

pub fn put_array<W: Write>(fout: &mut W, v: &[f32]) -> io::Result<()> {
    for &f in v {
        put_float(fout, f)?;
    }
    Ok(())
}

/// Write a NUL-terminated string. The NUL is the only terminator; no
/// length prefix is stored.
pub fn put_string<W: Write>(fout: &mut W, s: &str) -> io::Result<()> {
    fout.write_all(s.as_bytes())?;
    fout.write_all(&[0])
}

// ============================================================
// Readers
// ============================================================

pub fn get_float<R: Read>(fin: &mut R) -> io::Result<f32> {
    let mut buf = [0u8; FLOAT_BYTES];
    fin.read_exact(&mut buf)?;
    Ok(f32::from_le_bytes(buf))
}

pub fn get_index<R: Read>(fin: &mut R) -> io::Result<i32> {
    let mut buf = [0u8; INDEX_BYTES];
    fin.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

pub fn get_short<R: Read>(fin: &mut R) -> io::Result<i16> {
    let mut buf = [0u8; SHORT_BYTES];
    fin.read_exact(&mut buf)?;
    Ok(i16::from_le_bytes(buf))
}

pub fn get_array<R: Read>(fin: &mut R, v: &mut [f32]) -> io::Result<()> {
    for f in v.iter_mut() {
        *f = get_float(fin)?;
    }
    Ok(())
}

/// Read a NUL-terminated string of at most `max` bytes. Overlong input is
/// truncated but the stream still consumes up to the NUL, so subsequent
/// fields stay aligned. Non-UTF-8 bytes are replaced.
pub fn get_string<R: Read>(fin: &mut R, max: usize) -> io::Result<String> {
    let mut bytes = Vec::new();
    let mut buf = [0u8; 1];

    loop {
        fin.read_exact(&mut buf)?;
        if buf[0] == 0 {
            break;
        }
        if bytes.len() < max {
            bytes.push(buf[0]);
        }
    }

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn index_is_little_endian() {
        let mut out = Vec::new();
        put_index(&mut out, 0x0403_0201).unwrap();
        assert_eq!(out, [0x01, 0x02, 0x03, 0x04]);
    }

    #[test]
    fn short_roundtrip_negative() {
        let mut out = Vec::new();
        put_short(&mut out, -2).unwrap();
        let mut cur = Cursor::new(out);
        assert_eq!(get_short(&mut cur).unwrap(), -2);
    }

    #[test]
    fn string_stays_aligned_when_truncated() {
        let mut out = Vec::new();
        put_string(&mut out, "abcdef").unwrap();
        put_index(&mut out, 7).unwrap();

        let mut cur = Cursor::new(out);
        // Reading with a smaller cap still consumes through the NUL.
        assert_eq!(get_string(&mut cur, 3).unwrap(), "abc");
        assert_eq!(get_index(&mut cur).unwrap(), 7);
    }

    #[test]
    fn string_empty() {
        let mut out = Vec::new();
        put_string(&mut out, "").unwrap();
        let mut cur = Cursor::new(out);
        assert_eq!(get_string(&mut cur, 16).unwrap(), "");
    }

    #[test]
    fn truncated_stream_is_an_error() {
        let mut cur = Cursor::new(vec![0x01, 0x02]);
        assert!(get_index(&mut cur).is_err());
    }

    #[test]
    fn float_array_roundtrip() {
        let mut out = Vec::new();
        put_array(&mut out, &[0.0, -1.5, 1024.25]).unwrap();

        let mut cur = Cursor::new(out);
        let mut v = [0.0f32; 3];
        get_array(&mut cur, &mut v).unwrap();
        assert_eq!(v, [0.0, -1.5, 1024.25]);
    }
}
