//! Archive loading from files and byte buffers.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use memmap2::Mmap;
use tracing::debug;

use super::decode::decode;
use super::format::HEADER_SIZE;
use super::options::ReadOptions;
use crate::core::Commands;
use crate::guid::GuidCache;
use crate::util::{Error, Result};

/// Archive bytes, either mapped or read into memory.
pub(crate) enum PakSource {
    /// Memory-mapped file (preferred for large files)
    Mmap(Mmap),
    /// Fully buffered contents
    Buffer(Vec<u8>),
}

impl PakSource {
    /// Open a file, mapping it if requested.
    pub fn open(path: &Path, use_mmap: bool) -> Result<Self> {
        let mut file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound(path.to_path_buf())
            } else {
                Error::Io(e)
            }
        })?;

        let size = file.metadata()?.len();
        if size < HEADER_SIZE as u64 {
            return Err(Error::UnexpectedEof(size));
        }

        if use_mmap {
            // Safety: the file is opened read-only and the map is dropped
            // before the decoded archive is returned.
            let mmap = unsafe { Mmap::map(&file) }?;
            Ok(PakSource::Mmap(mmap))
        } else {
            let mut buf = Vec::with_capacity(size as usize);
            file.read_to_end(&mut buf)?;
            Ok(PakSource::Buffer(buf))
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            PakSource::Mmap(mmap) => mmap,
            PakSource::Buffer(buf) => buf,
        }
    }
}

impl Commands {
    /// Load an archive with default options.
    pub fn open(path: impl AsRef<Path>, cache: &GuidCache) -> Result<Self> {
        Self::open_opts(path, &ReadOptions::default(), cache)
    }

    /// Load an archive.
    ///
    /// Names found in the archive are registered in `cache` when
    /// [`ReadOptions::register_names`] is set.
    pub fn open_opts(path: impl AsRef<Path>, opts: &ReadOptions, cache: &GuidCache) -> Result<Self> {
        let path = path.as_ref();
        debug!("Opening {} (mmap: {})", path.display(), opts.use_mmap);
        let source = PakSource::open(path, opts.use_mmap)?;
        decode(source.as_bytes(), opts, cache)
    }

    /// Decode an archive held in memory with default options.
    pub fn from_bytes(data: &[u8], cache: &GuidCache) -> Result<Self> {
        Self::from_bytes_opts(data, &ReadOptions::default(), cache)
    }

    pub fn from_bytes_opts(data: &[u8], opts: &ReadOptions, cache: &GuidCache) -> Result<Self> {
        decode(data, opts, cache)
    }
}
