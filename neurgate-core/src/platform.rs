//! Platform executable naming

use std::path::{Path, PathBuf};

/// Suffix of executables on the current platform (`".exe"` on Windows, empty elsewhere)
pub const EXE_SUFFIX: &str = std::env::consts::EXE_SUFFIX;

/// Path of the executable `neurc build` writes for `source`: the source path
/// with its extension replaced by the platform executable extension.
pub fn executable_for(source: &Path) -> PathBuf {
    source.with_extension(std::env::consts::EXE_EXTENSION)
}
