//! EPUB container: the archive's members as an in-memory path → payload map.
//!
//! Loading reads every non-directory entry of the ZIP archive; packing writes
//! them back out. The OCF rules are kept on the way out: the `mimetype`
//! member, if present, is written first and stored uncompressed so that
//! readers can sniff the format from a fixed offset.

use std::borrow::Cow;
use std::collections::HashMap;
use std::io::{Cursor, Read, Seek, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{Error, Result};

/// Path of the member that identifies the container format.
pub const MIMETYPE_PATH: &str = "mimetype";

/// Contents of one member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Text set by a transformation; written out as UTF-8.
    Text(String),
    /// Bytes as read from the archive.
    Binary(Vec<u8>),
}

impl Payload {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Payload::Text(text) => text.as_bytes(),
            Payload::Binary(data) => data,
        }
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

impl From<Vec<u8>> for Payload {
    fn from(data: Vec<u8>) -> Self {
        Payload::Binary(data)
    }
}

/// One file inside the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub path: String,
    pub payload: Payload,
}

impl Member {
    pub fn new(path: impl Into<String>, payload: impl Into<Payload>) -> Self {
        Self {
            path: path.into(),
            payload: payload.into(),
        }
    }

    /// The payload as text. Binary payloads must be UTF-8; a leading byte
    /// order mark is dropped.
    pub fn text(&self) -> Result<Cow<'_, str>> {
        match &self.payload {
            Payload::Text(text) => Ok(Cow::Borrowed(text.as_str())),
            Payload::Binary(data) => {
                let data = data.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(data);
                encoding_rs::UTF_8
                    .decode_without_bom_handling_and_without_replacement(data)
                    .ok_or_else(|| Error::Encoding {
                        path: self.path.clone(),
                    })
            }
        }
    }
}

/// In-memory EPUB container.
///
/// Members keep the order they were inserted in (archive order after
/// [`load`](Self::load)); paths are unique and compared case-sensitively.
#[derive(Debug, Clone, Default)]
pub struct Container {
    members: Vec<Member>,
    index: HashMap<String, usize>,
    compression_level: Option<i64>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deflate level used by [`pack`](Self::pack).
    pub fn with_compression_level(mut self, level: Option<i64>) -> Self {
        self.compression_level = level;
        self
    }

    /// Read every non-directory entry of a ZIP archive.
    ///
    /// Fails as a whole if the archive or any entry cannot be read.
    pub fn load(bytes: &[u8]) -> Result<Self> {
        let archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut container = Self::new();
        for member in read_members(archive)? {
            container.set(member.path, member.payload);
        }
        tracing::debug!(members = container.len(), "loaded container");
        Ok(container)
    }

    pub fn get(&self, path: &str) -> Option<&Member> {
        self.index.get(path).map(|&i| &self.members[i])
    }

    /// Insert a member, or replace the payload of the member at `path`.
    pub fn set(&mut self, path: impl Into<String>, payload: impl Into<Payload>) {
        let path = path.into();
        let payload = payload.into();
        match self.index.get(&path) {
            Some(&i) => self.members[i].payload = payload,
            None => {
                self.index.insert(path.clone(), self.members.len());
                self.members.push(Member { path, payload });
            }
        }
    }

    /// Members in insertion order, optionally only those whose path ends with
    /// `suffix`.
    pub fn list<'a>(&'a self, suffix: Option<&'a str>) -> impl Iterator<Item = &'a Member> + 'a {
        self.members
            .iter()
            .filter(move |m| suffix.is_none_or(|s| m.path.ends_with(s)))
    }

    /// Paths in insertion order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|m| m.path.as_str())
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Write the container as a ZIP archive.
    pub fn pack(&self) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        self.pack_to_writer(&mut cursor)?;
        Ok(cursor.into_inner())
    }

    /// Write the container to any [`Write`] + [`Seek`] destination.
    pub fn pack_to_writer<W: Write + Seek>(&self, writer: W) -> Result<()> {
        let mut zip = ZipWriter::new(writer);

        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        let deflated = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(self.compression_level);

        // 1. mimetype (must be first, uncompressed)
        if let Some(mimetype) = self.get(MIMETYPE_PATH) {
            zip.start_file(MIMETYPE_PATH, stored)?;
            zip.write_all(mimetype.payload.as_bytes())
                .map_err(zip::result::ZipError::Io)?;
        }

        // 2. everything else, in insertion order
        for member in self.members.iter().filter(|m| m.path != MIMETYPE_PATH) {
            zip.start_file(member.path.as_str(), deflated)?;
            zip.write_all(member.payload.as_bytes())
                .map_err(zip::result::ZipError::Io)?;
        }

        zip.finish()?;
        Ok(())
    }
}

/// Decompress all entries, in parallel where threads are available. Results
/// are joined in archive order.
#[cfg(not(target_arch = "wasm32"))]
fn read_members(archive: ZipArchive<Cursor<&[u8]>>) -> Result<Vec<Member>> {
    use rayon::prelude::*;

    let entries: Vec<Option<Member>> = (0..archive.len())
        .into_par_iter()
        .map_init(|| archive.clone(), |archive, i| read_entry(archive, i))
        .collect::<Result<_>>()?;
    Ok(entries.into_iter().flatten().collect())
}

#[cfg(target_arch = "wasm32")]
fn read_members(mut archive: ZipArchive<Cursor<&[u8]>>) -> Result<Vec<Member>> {
    let mut members = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        if let Some(member) = read_entry(&mut archive, i)? {
            members.push(member);
        }
    }
    Ok(members)
}

fn read_entry<R: Read + Seek>(archive: &mut ZipArchive<R>, index: usize) -> Result<Option<Member>> {
    let mut file = archive.by_index(index)?;
    if file.is_dir() {
        return Ok(None);
    }
    let path = file.name().to_string();
    let mut contents = Vec::with_capacity(initial_capacity(file.size()));
    file.read_to_end(&mut contents)
        .map_err(zip::result::ZipError::Io)?;
    Ok(Some(Member::new(path, contents)))
}

/// Buffer to reserve for an entry. The size comes from the archive header
/// and is not trusted beyond [`MAX_RESERVE`].
fn initial_capacity(declared: u64) -> usize {
    usize::try_from(declared).map_or(MAX_RESERVE, |size| size.min(MAX_RESERVE))
}

const MAX_RESERVE: usize = 1 << 20;
