//! Data integrity checks against a recorded hash list.
//!
//! The data directory carries `group-00/hash_list.txt`, one
//! `<sha1-hex> <path relative to the data directory>` entry per line.

use anyhow::{bail, Context, Result};
use sha1::{Digest, Sha1};
use std::path::Path;
use tracing::{debug, info};

/// Location of the hash list, relative to the data directory.
pub const HASH_LIST: &str = "group-00/hash_list.txt";

/// SHA1 hex digest of the contents of `path`.
pub fn file_hash(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(hex::encode(Sha1::digest(&bytes)))
}

/// Check every file listed in the hash list under `data_dir`.
///
/// Stops at the first file whose digest differs from the recorded one.
pub fn validate_data(data_dir: &Path) -> Result<()> {
    let list_path = data_dir.join(HASH_LIST);
    let content = std::fs::read_to_string(&list_path)
        .with_context(|| format!("Failed to read hash list: {}", list_path.display()))?;

    let mut checked = 0;
    for (lineno, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (expected, relative) = match line.split_once(char::is_whitespace) {
            Some((hash, name)) => (hash, name.trim()),
            None => bail!(
                "Malformed entry on line {} of {}: {}",
                lineno + 1,
                list_path.display(),
                line
            ),
        };

        let actual = file_hash(&data_dir.join(relative))?;
        if !actual.eq_ignore_ascii_case(expected) {
            bail!(
                "{} is corrupted (expected {}, got {})",
                relative,
                expected,
                actual
            );
        }

        debug!("Hash ok: {}", relative);
        checked += 1;
    }

    info!("Validated {} files against {}", checked, list_path.display());
    Ok(())
}
