//! ZIP archive parsing and extraction.
//!
//! This module provides functionality for reading and extracting ZIP
//! archives, supporting the standard format and the ZIP64 extensions
//! needed for large app-bundle archives.
//!
//! ## Architecture
//!
//! The module is organized into three main components:
//!
//! - [`structures`]: Data structures representing ZIP format elements
//!   (EOCD, file headers, entry descriptors)
//! - [`parser`]: Low-level parsing of ZIP structures from raw bytes
//! - [`archive`]: The opened-archive surface: path lookup and extraction
//!
//! ## ZIP Format Overview
//!
//! A ZIP file consists of:
//! 1. Local file headers and compressed data for each file
//! 2. Central Directory with metadata for all files
//! 3. End of Central Directory (EOCD) record at the end
//!
//! This implementation reads the EOCD first (from the end of the file),
//! then the Central Directory, which allows resolving any member without
//! scanning the entire archive.
//!
//! ## Supported Features
//!
//! - Standard ZIP format (PKZIP APPNOTE 6.3.x compatible)
//! - ZIP64 extensions for files > 4GB
//! - STORED (no compression) method
//! - DEFLATE compression method
//! - CRC-32 verification of extracted payloads
//!
//! ## Limitations
//!
//! - No encryption support
//! - No multi-disk archive support
//! - No BZIP2, LZMA, or other compression methods
//! - Read-only; no archive writing or updating

mod archive;
mod parser;
mod structures;

pub use archive::ZipArchive;
pub use parser::ZipParser;
pub use structures::*;
