use flate2::read::DeflateDecoder;
use log::warn;
use std::fs;
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::io::{LocalFileReader, ReadAt};

use super::parser::ZipParser;
use super::structures::{CompressionMethod, ZipEntry};

/// Upper bound on buffer capacity reserved from declared entry sizes.
const PREALLOC_CAP: u64 = 16 * 1024 * 1024;

/// An opened ZIP archive with its entry table.
///
/// Opening parses the central directory exactly once; a failed parse fails
/// construction, so an instance is always queryable. One archive owns one
/// byte source and performs synchronous blocking reads against it; open
/// independent instances for concurrent use.
#[derive(Debug)]
pub struct ZipArchive<R: ReadAt = LocalFileReader> {
    parser: ZipParser<R>,
    entries: Vec<ZipEntry>,
    source: Arc<PathBuf>,
    verify_checksums: bool,
}

impl ZipArchive<LocalFileReader> {
    /// Open the archive file at `path` and parse its directory.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Open`] if the file cannot be opened or is
    /// empty, and with [`Error::Format`] if it is not a valid ZIP
    /// container.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = LocalFileReader::new(path).map_err(|source| Error::Open {
            path: path.to_path_buf(),
            source,
        })?;
        if reader.size() == 0 {
            return Err(Error::Open {
                path: path.to_path_buf(),
                source: io::Error::new(io::ErrorKind::UnexpectedEof, "file is empty"),
            });
        }
        Self::with_reader(Arc::new(reader), path)
    }
}

impl<R: ReadAt> ZipArchive<R> {
    /// Build an archive over any random-access source.
    ///
    /// `source` identifies the archive for descriptors and error messages;
    /// for in-memory archives any label will do.
    pub fn with_reader(reader: Arc<R>, source: impl Into<PathBuf>) -> Result<Self> {
        let source = Arc::new(source.into());
        let parser = ZipParser::new(reader);
        let entries = parser.read_central_directory(&source)?;
        Ok(Self {
            parser,
            entries,
            source,
            verify_checksums: true,
        })
    }

    /// Set whether a CRC-32 mismatch after decompression is a hard error.
    ///
    /// Enabled by default. When disabled, a mismatch logs a warning and the
    /// decompressed bytes are returned anyway, tolerating producers with
    /// slightly non-conformant records.
    pub fn verify_checksums(mut self, verify: bool) -> Self {
        self.verify_checksums = verify;
        self
    }

    /// All entries, in central-directory order.
    pub fn entries(&self) -> &[ZipEntry] {
        &self.entries
    }

    /// Path of the backing archive file.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Find entries by path, in central-directory order.
    ///
    /// With `exact` the whole path must match (duplicates, if the archive
    /// legally contains them, are all returned). Without it the pattern is
    /// a suffix match, used to find well-known files irrespective of the
    /// nesting directory that varies across producers. An empty result is
    /// not an error; it signals "not present".
    pub fn lookup(&self, pattern: &str, exact: bool) -> Vec<&ZipEntry> {
        self.entries
            .iter()
            .filter(|e| e.matches(pattern, exact))
            .collect()
    }

    /// Enumerate entries whose path starts with `prefix`, in
    /// central-directory order.
    ///
    /// Collaborators use this to walk a bundle subtree (e.g. everything
    /// under `Payload/App.app/`) without repeated directory scans.
    pub fn entries_with_prefix(&self, prefix: &str) -> Vec<&ZipEntry> {
        self.entries
            .iter()
            .filter(|e| e.path.starts_with(prefix))
            .collect()
    }

    /// Extract one entry into memory, decompressing as needed.
    ///
    /// The payload position is computed from the entry's local header, the
    /// compressed bytes are read in one bounded pass, and the result is
    /// verified against the declared CRC-32. The decompressed payload is
    /// cached on the descriptor, so repeated extraction of the same entry
    /// does not re-read the file.
    ///
    /// # Errors
    ///
    /// [`Error::Format`] if the local header is not where the directory
    /// said, [`Error::Decompression`] for unsupported methods and
    /// malformed or truncated streams, [`Error::Checksum`] on an integrity
    /// mismatch (unless [`verify_checksums`](Self::verify_checksums) is
    /// disabled).
    pub fn extract_to_memory(&self, entry: &ZipEntry) -> Result<Vec<u8>> {
        if let Some(data) = entry.cached_payload.get() {
            return Ok(data.clone());
        }

        let payload_offset = self.parser.payload_offset(entry)?;
        if payload_offset
            .checked_add(entry.compressed_size)
            .is_none_or(|end| end > self.parser.size())
        {
            return Err(Error::format("entry payload extends past end of file"));
        }

        let mut compressed = vec![0u8; entry.compressed_size as usize];
        self.parser.reader().read_at(payload_offset, &mut compressed)?;

        let data = match entry.method {
            CompressionMethod::Stored => compressed,
            CompressionMethod::Deflated => {
                // Raw deflate stream, no zlib framing. The declared size is
                // untrusted until decompression proves it, so it only seeds
                // the allocation up to a cap.
                let mut decoder = DeflateDecoder::new(compressed.as_slice());
                let mut data =
                    Vec::with_capacity(entry.uncompressed_size.min(PREALLOC_CAP) as usize);
                decoder
                    .read_to_end(&mut data)
                    .map_err(|e| Error::decompression(&entry.path, e.to_string()))?;
                if data.len() as u64 != entry.uncompressed_size {
                    return Err(Error::decompression(
                        &entry.path,
                        format!(
                            "decompressed {} bytes, expected {}",
                            data.len(),
                            entry.uncompressed_size
                        ),
                    ));
                }
                data
            }
            CompressionMethod::Unsupported(method) => {
                return Err(Error::decompression(
                    &entry.path,
                    format!("unsupported compression method {method}"),
                ));
            }
        };

        let actual = crc32fast::hash(&data);
        if actual != entry.crc32 {
            if self.verify_checksums {
                return Err(Error::Checksum {
                    path: entry.path.clone(),
                    expected: entry.crc32,
                    actual,
                });
            }
            warn!(
                "checksum mismatch for `{}` in {}: expected {:#010x}, got {:#010x}",
                entry.path,
                self.source.display(),
                entry.crc32,
                actual
            );
        }

        let _ = entry.cached_payload.set(data.clone());
        Ok(data)
    }

    /// Extract one entry below `target_dir`, creating any missing
    /// intermediate directories of the entry path.
    ///
    /// Returns the path of the written file. Entry paths are kept relative
    /// to `target_dir`; absolute or parent-traversing paths are rejected.
    ///
    /// # Errors
    ///
    /// Everything [`extract_to_memory`](Self::extract_to_memory) can fail
    /// with, plus [`Error::Io`] if the target cannot be created or written.
    pub fn extract_to_directory(&self, entry: &ZipEntry, target_dir: &Path) -> Result<PathBuf> {
        let output = target_dir.join(sanitized_relative_path(&entry.path)?);

        if entry.is_dir {
            fs::create_dir_all(&output)?;
            return Ok(output);
        }

        let data = self.extract_to_memory(entry)?;

        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&output, &data)?;

        Ok(output)
    }

    /// Extract the first entry matching `pattern` into memory.
    ///
    /// Convenience composition of [`lookup`](Self::lookup) and
    /// [`extract_to_memory`](Self::extract_to_memory) for callers that
    /// need one well-known file (e.g. the embedded property list).
    ///
    /// # Errors
    ///
    /// [`Error::EntryNotFound`] when nothing matches.
    pub fn extract_first_match(&self, pattern: &str, exact: bool) -> Result<Vec<u8>> {
        let entry = self
            .lookup(pattern, exact)
            .into_iter()
            .next()
            .ok_or_else(|| Error::EntryNotFound {
                pattern: pattern.to_string(),
            })?;
        self.extract_to_memory(entry)
    }
}

/// Turn an entry path into a path safe to join below a target directory.
///
/// Rejects absolute paths and any `..` component, so a hostile archive
/// cannot write outside the extraction root.
fn sanitized_relative_path(path: &str) -> Result<PathBuf> {
    let mut out = PathBuf::new();
    for component in Path::new(path).components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(Error::format(format!(
                    "refusing to extract unsafe entry path `{path}`"
                )));
            }
        }
    }
    if out.as_os_str().is_empty() {
        return Err(Error::format(format!("empty entry path `{path}`")));
    }
    Ok(out)
}
