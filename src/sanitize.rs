//! Turning participant names into output file names.

use std::path::{Path, PathBuf};

/// Characters that are unsafe in file names on at least one common platform.
pub const FORBIDDEN: [char; 10] = [' ', '/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Replace each forbidden character with `_`.
///
/// No other changes are made: no length limit, no Unicode normalization, and
/// distinct names may map to the same result.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| if FORBIDDEN.contains(&c) { '_' } else { c })
        .collect()
}

/// Name of the certificate file for a participant, without a directory.
pub fn certificate_filename(name: &str) -> String {
    format!("certificado_{}.pdf", sanitize_filename(name))
}

pub fn certificate_path(output_directory: &Path, name: &str) -> PathBuf {
    output_directory.join(certificate_filename(name))
}
