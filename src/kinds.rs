//! Constant identifiers for the file types this reader serves.
//!
//! These are process-wide constants with no mutable state; collaborators
//! use them for type dispatch and for locating well-known members inside
//! an archive.

/// Uniform type identifiers of the supported inputs.
pub const UTI_IPA: &str = "com.apple.itunes.ipa";
pub const UTI_IOS_PROVISION: &str = "com.apple.mobileprovision";
pub const UTI_IOS_PROVISION_OLD: &str = "com.apple.iphone.mobileprovision";
pub const UTI_OSX_PROVISION: &str = "com.apple.provisionprofile";
pub const UTI_XCODE_ARCHIVE: &str = "com.apple.xcode.archive";
pub const UTI_APP_EXTENSION: &str = "com.apple.application-and-system-extension";

/// Well-known member names collaborators ask this core for.
pub const INFO_PLIST: &str = "Info.plist";
pub const EMBEDDED_PROVISION: &str = "embedded.mobileprovision";
/// App bundles inside an ipa live under this directory.
pub const PAYLOAD_PREFIX: &str = "Payload/";

/// The kinds of input file the reader is pointed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// An `.ipa` app bundle archive (a ZIP container)
    AppArchive,
    /// An `.xcarchive` produced by Xcode
    XcodeArchive,
    /// An `.appex` application extension
    AppExtension,
    /// A provisioning profile (flat CMS blob, not a container)
    Provision,
}

impl FileKind {
    /// Resolve a kind from a uniform type identifier.
    pub fn from_uti(uti: &str) -> Option<FileKind> {
        match uti {
            UTI_IPA => Some(FileKind::AppArchive),
            UTI_XCODE_ARCHIVE => Some(FileKind::XcodeArchive),
            UTI_APP_EXTENSION => Some(FileKind::AppExtension),
            UTI_IOS_PROVISION | UTI_IOS_PROVISION_OLD | UTI_OSX_PROVISION => {
                Some(FileKind::Provision)
            }
            _ => None,
        }
    }

    /// Resolve a kind from a file extension, for callers without UTI
    /// metadata. Plain `.zip` is treated as an app archive candidate.
    pub fn from_path(path: &std::path::Path) -> Option<FileKind> {
        match path.extension()?.to_str()? {
            "ipa" | "zip" => Some(FileKind::AppArchive),
            "xcarchive" => Some(FileKind::XcodeArchive),
            "appex" => Some(FileKind::AppExtension),
            "mobileprovision" | "provisionprofile" => Some(FileKind::Provision),
            _ => None,
        }
    }

    /// Whether this kind is a ZIP container (as opposed to a flat blob).
    pub fn is_zipped(&self) -> bool {
        !matches!(self, FileKind::Provision)
    }
}
