use crate::error::{FontError, Result};
use crate::reader::{TableReader, Tag};

pub const NAME_COPYRIGHT: u16 = 0;
pub const NAME_FAMILY: u16 = 1;
pub const NAME_SUBFAMILY: u16 = 2;
pub const NAME_UNIQUE_ID: u16 = 3;
pub const NAME_FULL: u16 = 4;
pub const NAME_VERSION: u16 = 5;
pub const NAME_POSTSCRIPT: u16 = 6;

const PLATFORM_UNICODE: u16 = 0;
const PLATFORM_MACINTOSH: u16 = 1;
const PLATFORM_WINDOWS: u16 = 3;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NameRecord {
    pub platform_id: u16,
    pub encoding_id: u16,
    pub language_id: u16,
    pub name_id: u16,
    /// Decoded string, `None` for encodings this parser does not decode.
    pub value: Option<String>,
}

#[derive(Clone, Debug)]
pub struct NameTable {
    pub format: u16,
    pub records: Vec<NameRecord>,
    /// Format 1 language tags, indexed by `language_id - 0x8000`.
    pub language_tags: Vec<String>,
}

impl NameTable {
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut r = TableReader::new(Tag::NAME, data);

        let format = r.u16()?;
        if format > 1 {
            return Err(FontError::UnsupportedVersion {
                table: Tag::NAME,
                version: u32::from(format),
            });
        }
        let count = r.u16()?;
        let storage_offset = r.u16()? as usize;

        let mut raw = Vec::with_capacity(count as usize);
        for _ in 0..count {
            raw.push((
                r.u16()?, // platform
                r.u16()?, // encoding
                r.u16()?, // language
                r.u16()?, // name id
                r.u16()? as usize,
                r.u16()? as usize,
            ));
        }

        let mut language_tags = Vec::new();
        if format == 1 {
            let tag_count = r.u16()?;
            for _ in 0..tag_count {
                let length = r.u16()? as usize;
                let offset = r.u16()? as usize;
                let bytes = r.slice(storage_offset + offset, length)?;
                language_tags.push(decode_utf16be(bytes));
            }
        }

        let mut records = Vec::with_capacity(raw.len());
        for (platform_id, encoding_id, language_id, name_id, length, offset) in raw {
            let bytes = r.slice(storage_offset + offset, length)?;
            let value = match platform_id {
                PLATFORM_UNICODE | PLATFORM_WINDOWS => Some(decode_utf16be(bytes)),
                // Roman encoding; treated as Latin-1 which matches for ASCII names
                PLATFORM_MACINTOSH if encoding_id == 0 => {
                    Some(bytes.iter().map(|&b| b as char).collect())
                }
                _ => None,
            };
            records.push(NameRecord {
                platform_id,
                encoding_id,
                language_id,
                name_id,
                value,
            });
        }

        Ok(Self {
            format,
            records,
            language_tags,
        })
    }

    /// First decodable string for `name_id`, Windows records first.
    pub fn get(&self, name_id: u16) -> Option<&str> {
        let decoded = || {
            self.records
                .iter()
                .filter(move |rec| rec.name_id == name_id)
                .filter_map(|rec| rec.value.as_deref().map(|v| (rec.platform_id, v)))
        };
        decoded()
            .find(|(platform, _)| *platform == PLATFORM_WINDOWS)
            .or_else(|| decoded().next())
            .map(|(_, v)| v)
    }

    pub fn family(&self) -> Option<&str> {
        self.get(NAME_FAMILY)
    }

    pub fn subfamily(&self) -> Option<&str> {
        self.get(NAME_SUBFAMILY)
    }

    pub fn full_name(&self) -> Option<&str> {
        self.get(NAME_FULL)
    }

    pub fn version(&self) -> Option<&str> {
        self.get(NAME_VERSION)
    }

    pub fn postscript_name(&self) -> Option<&str> {
        self.get(NAME_POSTSCRIPT)
    }
}

fn decode_utf16be(bytes: &[u8]) -> String {
    let units = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
    char::decode_utf16(units)
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}
