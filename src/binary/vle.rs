//! Variable-length encoding of unsigned integers.
//!
//! Little-endian groups of 7 bits, the high bit of each byte flags that
//! another byte follows. At most 4 bytes are used: the fourth byte carries a
//! full 8 bits, giving 29 significant bits in total.
//!
//! ```text
//! value < 2^7    : 0xxxxxxx
//! value < 2^14   : 1xxxxxxx 0xxxxxxx
//! value < 2^21   : 1xxxxxxx 1xxxxxxx 0xxxxxxx
//! value < 2^29   : 1xxxxxxx 1xxxxxxx 1xxxxxxx xxxxxxxx
//! ```

use std::io::{self, Read, Write};

use byteorder::ReadBytesExt;

/// Largest value representable with VLE.
pub const VLE_MAX: u32 = 0x1FFF_FFFF;

/// Encode `value` into `buf`, returning the number of bytes used.
/// Bits above [`VLE_MAX`] are dropped; callers check the range first.
pub fn encode(value: u32, buf: &mut [u8; 4]) -> usize {
    buf[0] = (value & 0x7f) as u8;
    if value < 0x80 {
        return 1;
    }
    buf[0] |= 0x80;
    buf[1] = ((value >> 7) & 0x7f) as u8;
    if value < 0x4000 {
        return 2;
    }
    buf[1] |= 0x80;
    buf[2] = ((value >> 14) & 0x7f) as u8;
    if value < 0x20_0000 {
        return 3;
    }
    buf[2] |= 0x80;
    buf[3] = (value >> 21) as u8;
    4
}

/// Write a VLE value.
pub fn write_vle<W: Write + ?Sized>(writer: &mut W, value: u32) -> io::Result<()> {
    let mut buf = [0u8; 4];
    let len = encode(value, &mut buf);
    writer.write_all(&buf[..len])
}

/// Read a VLE value.
pub fn read_vle<R: Read + ?Sized>(reader: &mut R) -> io::Result<u32> {
    let mut value = 0u32;
    for shift in [0u32, 7, 14] {
        let byte = reader.read_u8()?;
        value |= ((byte & 0x7f) as u32) << shift;
        if byte & 0x80 == 0 {
            return Ok(value);
        }
    }
    let byte = reader.read_u8()?;
    Ok(value | ((byte as u32) << 21))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn roundtrip(value: u32) -> (u32, usize) {
        let mut buf = Vec::new();
        write_vle(&mut buf, value).unwrap();
        let len = buf.len();
        let decoded = read_vle(&mut Cursor::new(buf)).unwrap();
        (decoded, len)
    }

    #[test]
    fn test_boundaries() {
        for (value, len) in [
            (0, 1),
            (0x7f, 1),
            (0x80, 2),
            (0x3fff, 2),
            (0x4000, 3),
            (0x1f_ffff, 3),
            (0x20_0000, 4),
            (VLE_MAX, 4),
        ] {
            assert_eq!(roundtrip(value), (value, len), "value {value:#x}");
        }
    }

    #[test]
    fn test_wire_bytes() {
        let mut buf = [0u8; 4];
        assert_eq!(encode(300, &mut buf), 2);
        assert_eq!(&buf[..2], &[0xac, 0x02]);
    }

    #[test]
    fn test_truncated_input() {
        let err = read_vle(&mut Cursor::new(vec![0x80u8])).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
