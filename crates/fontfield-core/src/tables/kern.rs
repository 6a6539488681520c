//! Legacy `kern` table (the Windows/OpenType version 0 layout).

use crate::error::{FontError, Result};
use crate::reader::{TableReader, Tag};

const COVERAGE_HORIZONTAL: u16 = 0x0001;
const COVERAGE_MINIMUM: u16 = 0x0002;
const COVERAGE_CROSS_STREAM: u16 = 0x0004;
const COVERAGE_OVERRIDE: u16 = 0x0008;

#[derive(Clone, Debug)]
pub struct KernSubtable {
    pub coverage: u16,
    pub format: KernFormat,
}

/// The subtable formats this parser knows how to read.
#[derive(Clone, Debug)]
pub enum KernFormat {
    /// Format 0: sorted list of glyph pairs.
    OrderedPairs(Vec<KernPair>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KernPair {
    pub left: u16,
    pub right: u16,
    pub value: i16,
}

impl KernPair {
    fn key(&self) -> u32 {
        (u32::from(self.left) << 16) | u32::from(self.right)
    }
}

impl KernSubtable {
    pub fn is_horizontal(&self) -> bool {
        self.coverage & COVERAGE_HORIZONTAL != 0
    }

    /// Subtables that hold ordinary pair adjustments along the baseline.
    fn applies_to_advances(&self) -> bool {
        self.is_horizontal() && self.coverage & (COVERAGE_MINIMUM | COVERAGE_CROSS_STREAM) == 0
    }

    fn lookup(&self, left: u16, right: u16) -> Option<i16> {
        let KernFormat::OrderedPairs(pairs) = &self.format;
        let key = (u32::from(left) << 16) | u32::from(right);
        pairs
            .binary_search_by_key(&key, KernPair::key)
            .ok()
            .map(|i| pairs[i].value)
    }
}

#[derive(Clone, Debug, Default)]
pub struct KernTable {
    pub subtables: Vec<KernSubtable>,
}

impl KernTable {
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut r = TableReader::new(Tag::KERN, data);

        let version = r.u16()?;
        if version != 0 {
            return Err(FontError::UnsupportedVersion {
                table: Tag::KERN,
                version: u32::from(version),
            });
        }

        let n_tables = r.u16()?;
        let mut subtables = Vec::with_capacity(n_tables as usize);
        for _ in 0..n_tables {
            let start = r.position();
            let _sub_version = r.u16()?;
            let length = r.u16()? as usize;
            let coverage = r.u16()?;
            let format = coverage >> 8;

            let format = match format {
                0 => {
                    let n_pairs = r.u16()?;
                    // searchRange, entrySelector, rangeShift
                    r.skip(6)?;
                    let mut pairs = Vec::with_capacity(n_pairs as usize);
                    for _ in 0..n_pairs {
                        pairs.push(KernPair {
                            left: r.u16()?,
                            right: r.u16()?,
                            value: r.i16()?,
                        });
                    }
                    pairs.sort_by_key(KernPair::key);
                    KernFormat::OrderedPairs(pairs)
                }
                _ => {
                    return Err(FontError::FormatNotImplemented {
                        table: Tag::KERN,
                        format,
                    });
                }
            };
            subtables.push(KernSubtable { coverage, format });

            // The 16-bit length overflows for big pair lists, so only trust
            // it when it points past what was read.
            let end = start + length;
            if end > r.position() {
                r = r.at(end)?;
            }
        }

        Ok(Self { subtables })
    }

    /// Horizontal adjustment in design units to add to `left`'s advance.
    pub fn kerning(&self, left: u16, right: u16) -> i32 {
        self.subtables
            .iter()
            .filter(|sub| sub.applies_to_advances())
            .fold(0i32, |acc, sub| match sub.lookup(left, right) {
                Some(v) if sub.coverage & COVERAGE_OVERRIDE != 0 => i32::from(v),
                Some(v) => acc + i32::from(v),
                None => acc,
            })
    }
}
