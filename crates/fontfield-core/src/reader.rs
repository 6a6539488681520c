//! Sequential big-endian reader over a font table.
//!
//! All sfnt data is big-endian regardless of host byte order. Every read is
//! bounds checked and reports the owning table and offset on failure.

use crate::error::{FontError, Result};
use bytes::Buf;
use std::fmt;

/// A 4-byte table identifier such as `head` or `OS/2`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(pub [u8; 4]);

impl Tag {
    pub const CMAP: Self = Self(*b"cmap");
    pub const GLYF: Self = Self(*b"glyf");
    pub const HEAD: Self = Self(*b"head");
    pub const HHEA: Self = Self(*b"hhea");
    pub const HMTX: Self = Self(*b"hmtx");
    pub const KERN: Self = Self(*b"kern");
    pub const LOCA: Self = Self(*b"loca");
    pub const MAXP: Self = Self(*b"maxp");
    pub const NAME: Self = Self(*b"name");
    pub const OS2: Self = Self(*b"OS/2");
    pub const POST: Self = Self(*b"post");

    /// Pseudo-tag used for the table directory at the start of the file.
    pub const DIRECTORY: Self = Self(*b"sfnt");

    pub const fn new(bytes: &[u8; 4]) -> Self {
        Self(*bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            let c = if b.is_ascii_graphic() || b == b' ' {
                b as char
            } else {
                '?'
            };
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag('{self}')")
    }
}

/// Seconds between the OpenType epoch (1904-01-01) and the Unix epoch.
const OPENTYPE_TO_UNIX_SECONDS: i64 = 2_082_844_800;

/// A `LONGDATETIME` converted to a UTC calendar timestamp.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timestamp {
    pub year: i64,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    /// Seconds since 1970-01-01T00:00:00Z (negative before it).
    pub unix_seconds: i64,
}

impl Timestamp {
    pub fn from_opentype_seconds(seconds: i64) -> Self {
        let unix_seconds = seconds.saturating_sub(OPENTYPE_TO_UNIX_SECONDS);
        let days = unix_seconds.div_euclid(86_400);
        let secs_of_day = unix_seconds.rem_euclid(86_400);
        let (year, month, day) = civil_from_days(days);

        Self {
            year,
            month,
            day,
            hour: (secs_of_day / 3600) as u8,
            minute: (secs_of_day % 3600 / 60) as u8,
            second: (secs_of_day % 60) as u8,
            unix_seconds,
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// Proleptic Gregorian date for a count of days since 1970-01-01.
fn civil_from_days(days: i64) -> (i64, u8, u8) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u8;
    let month = if mp < 10 { mp + 3 } else { mp - 9 } as u8;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

/// Cursor over one table's bytes.
#[derive(Clone)]
pub struct TableReader<'a> {
    table: Tag,
    data: &'a [u8],
    buf: &'a [u8],
}

impl<'a> TableReader<'a> {
    pub fn new(table: Tag, data: &'a [u8]) -> Self {
        Self {
            table,
            data,
            buf: data,
        }
    }

    pub fn table(&self) -> Tag {
        self.table
    }

    /// Offset of the next byte relative to the start of the table.
    pub fn position(&self) -> usize {
        self.data.len() - self.buf.len()
    }

    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    /// A new reader over the same table, positioned at `offset`.
    pub fn at(&self, offset: usize) -> Result<Self> {
        if offset > self.data.len() {
            return Err(self.eof_at(offset, 0));
        }
        Ok(Self {
            table: self.table,
            data: self.data,
            buf: &self.data[offset..],
        })
    }

    /// Bytes `offset..offset + len` of the table, independent of the cursor.
    pub fn slice(&self, offset: usize, len: usize) -> Result<&'a [u8]> {
        offset
            .checked_add(len)
            .and_then(|end| self.data.get(offset..end))
            .ok_or_else(|| self.eof_at(offset, len))
    }

    fn eof_at(&self, offset: usize, wanted: usize) -> FontError {
        FontError::UnexpectedEof {
            table: self.table,
            offset,
            wanted,
        }
    }

    fn eof(&self, wanted: usize) -> FontError {
        self.eof_at(self.position(), wanted)
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        if self.buf.remaining() < n {
            return Err(self.eof(n));
        }
        self.buf.advance(n);
        Ok(())
    }

    pub fn bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.buf.len() < n {
            return Err(self.eof(n));
        }
        let (head, tail) = self.buf.split_at(n);
        self.buf = tail;
        Ok(head)
    }

    pub fn u8(&mut self) -> Result<u8> {
        self.buf.try_get_u8().map_err(|_| self.eof(1))
    }

    pub fn i8(&mut self) -> Result<i8> {
        self.buf.try_get_i8().map_err(|_| self.eof(1))
    }

    pub fn u16(&mut self) -> Result<u16> {
        self.buf.try_get_u16().map_err(|_| self.eof(2))
    }

    pub fn i16(&mut self) -> Result<i16> {
        self.buf.try_get_i16().map_err(|_| self.eof(2))
    }

    pub fn u32(&mut self) -> Result<u32> {
        self.buf.try_get_u32().map_err(|_| self.eof(4))
    }

    pub fn i32(&mut self) -> Result<i32> {
        self.buf.try_get_i32().map_err(|_| self.eof(4))
    }

    /// 16.16 signed fixed point.
    pub fn fixed(&mut self) -> Result<f64> {
        Ok(f64::from(self.i32()?) / 65_536.0)
    }

    /// 2.14 signed fixed point, used by composite glyph transforms.
    pub fn f2dot14(&mut self) -> Result<f64> {
        Ok(f64::from(self.i16()?) / 16_384.0)
    }

    pub fn tag(&mut self) -> Result<Tag> {
        let b = self.bytes(4)?;
        Ok(Tag([b[0], b[1], b[2], b[3]]))
    }

    /// `LONGDATETIME`: signed 64-bit seconds since 1904-01-01T00:00:00Z.
    pub fn long_date_time(&mut self) -> Result<Timestamp> {
        let seconds = self.buf.try_get_i64().map_err(|_| self.eof(8))?;
        Ok(Timestamp::from_opentype_seconds(seconds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_big_endian_regardless_of_host() {
        let data = [0x12, 0x34, 0xFF, 0xFE, 0x00, 0x01, 0x80, 0x00];
        let mut r = TableReader::new(Tag::HEAD, &data);
        assert_eq!(r.u16().unwrap(), 0x1234);
        assert_eq!(r.i16().unwrap(), -2);
        assert_eq!(r.fixed().unwrap(), 1.5);
        assert_eq!(r.position(), 8);
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn f2dot14_values() {
        let data = [0x40, 0x00, 0xC0, 0x00, 0x70, 0x00];
        let mut r = TableReader::new(Tag::GLYF, &data);
        assert_eq!(r.f2dot14().unwrap(), 1.0);
        assert_eq!(r.f2dot14().unwrap(), -1.0);
        assert_eq!(r.f2dot14().unwrap(), 1.75);
    }

    #[test]
    fn read_past_end_names_table_and_offset() {
        let data = [0x00, 0x01, 0x02];
        let mut r = TableReader::new(Tag::MAXP, &data);
        r.u16().unwrap();
        match r.u32() {
            Err(FontError::UnexpectedEof {
                table,
                offset,
                wanted,
            }) => {
                assert_eq!(table, Tag::MAXP);
                assert_eq!(offset, 2);
                assert_eq!(wanted, 4);
            }
            other => panic!("expected eof, got {other:?}"),
        }
    }

    #[test]
    fn skip_and_at_are_bounds_checked() {
        let data = [0u8; 4];
        let mut r = TableReader::new(Tag::NAME, &data);
        assert!(r.skip(5).is_err());
        assert!(r.at(5).is_err());
        assert!(r.slice(2, 3).is_err());
        assert_eq!(r.slice(1, 3).unwrap().len(), 3);
    }

    #[test]
    fn tag_display() {
        assert_eq!(Tag::OS2.to_string(), "OS/2");
        assert_eq!(Tag([0x00, b'a', b'b', b'c']).to_string(), "?abc");
    }

    #[test]
    fn opentype_epoch_is_1904() {
        let ts = Timestamp::from_opentype_seconds(0);
        assert_eq!((ts.year, ts.month, ts.day), (1904, 1, 1));
        assert_eq!(ts.unix_seconds, -OPENTYPE_TO_UNIX_SECONDS);
    }

    #[test]
    fn long_date_time_converts_to_calendar() {
        // 2021-03-04T05:06:07Z
        let unix = 1_614_834_367i64;
        let data = (unix + OPENTYPE_TO_UNIX_SECONDS).to_be_bytes();
        let mut r = TableReader::new(Tag::HEAD, &data);
        let ts = r.long_date_time().unwrap();
        assert_eq!(ts.to_string(), "2021-03-04T05:06:07Z");
        assert_eq!(ts.unix_seconds, unix);
    }
}
