//! Flat-list serialization back to disk.

use idb_common::{Error, Item, Result};
use idb_encoding::TextEncoding;
use std::fs;
use std::path::Path;
use tracing::info;

/// Serialize records as a flat list and write them with the given
/// encoding.
///
/// Only fields the record model understands round-trip; unknown keys
/// from the originally loaded file are not preserved.
pub fn save(path: &Path, records: &[Item], encoding: TextEncoding) -> Result<()> {
    let yaml = serde_yaml::to_string(records)?;
    let bytes = encoding
        .encode(&yaml)
        .ok_or(Error::UnsupportedSaveEncoding(encoding.name()))?;
    fs::write(path, bytes)?;

    info!(
        path = %path.display(),
        records = records.len(),
        encoding = encoding.name(),
        "saved item database"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use idb_common::ErrorCategory;

    #[test]
    fn test_save_rejects_encodings_without_writer() {
        let tmp = tempfile::TempDir::new().expect("tempdir");
        let path = tmp.path().join("out.yml");
        let records = vec![Item {
            id: 501,
            ..Item::default()
        }];

        let err = save(&path, &records, TextEncoding::Utf7).expect_err("must refuse UTF-7");
        assert_eq!(err.category(), ErrorCategory::Encoding);
        assert!(!path.exists());
    }
}
