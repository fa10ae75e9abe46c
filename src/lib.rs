//! # bundlezip
//!
//! A minimal ZIP reader for inspecting app bundle archives.
//!
//! This library opens an archive file (an `.ipa` app bundle, an installer
//! package, an Xcode archive), parses its central directory once, and
//! resolves members by exact or suffix path match for extraction into
//! memory or onto disk. It exists to serve preview/inspection tooling:
//! downstream consumers hand the extracted bytes to plist parsers, icon
//! pipelines and profile decoders.
//!
//! A corrupt or non-ZIP input is always reported as a typed [`Error`],
//! never a panic, so one bad archive cannot take down a host process that
//! serves many unrelated requests.
//!
//! ## Example
//!
//! ```no_run
//! use bundlezip::ZipArchive;
//!
//! fn main() -> bundlezip::Result<()> {
//!     let archive = ZipArchive::open("MyApp.ipa")?;
//!
//!     // Find the app's property list wherever the producer nested it
//!     let plist = archive.extract_first_match("Info.plist", false)?;
//!     println!("Info.plist is {} bytes", plist.len());
//!
//!     // Enumerate everything below the payload directory
//!     for entry in archive.entries() {
//!         println!("{}", entry.path);
//!     }
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod error;
pub mod io;
pub mod kinds;
pub mod zip;

pub use cli::Cli;
pub use error::{Error, Result};
pub use io::{LocalFileReader, ReadAt};
pub use kinds::FileKind;
pub use zip::{CompressionMethod, ZipArchive, ZipEntry, find_by_path};
