//! On-disk snapshots.
//!
//! A snapshot file is an 8-byte magic header followed by a bincode-encoded
//! [`StoreImage`]. Snapshots are written to a sibling temporary file and
//! renamed over the previous one, so a reader sees either the old or the new
//! image. Indexes are not stored; they are rebuilt from the objects on open.

use crate::arena::Slot;
use crate::object::Object;
use bincode::Options;
use serde::{Deserialize, Serialize};
use sos_core::schema::Schema;
use sos_core::{Error, Result};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

pub(crate) const MAGIC: &[u8; 8] = b"SOSSNAP1";

/// Everything needed to rebuild a store.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct StoreImage {
    pub(crate) schema: Schema,
    pub(crate) slots: Vec<Slot<Object>>,
    pub(crate) free: Vec<u32>,
}

/// Borrowed form of [`StoreImage`] with the same encoding, used on commit.
#[derive(Serialize)]
pub(crate) struct StoreImageRef<'a> {
    pub(crate) schema: &'a Schema,
    pub(crate) slots: &'a [Slot<Object>],
    pub(crate) free: &'a [u32],
}

/// Checks that `dir` is an existing directory.
pub(crate) fn check_dir(dir: &Path) -> Result<()> {
    let meta = fs::metadata(dir).map_err(|e| Error::storage_unavailable(dir, e))?;
    if !meta.is_dir() {
        return Err(Error::storage_unavailable(dir, "not a directory"));
    }
    if meta.permissions().readonly() {
        return Err(Error::storage_unavailable(dir, "directory is read-only"));
    }
    Ok(())
}

/// Fixed-width little-endian integers, the layout of bincode's default
/// functions.
fn codec() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
        .allow_trailing_bytes()
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Writes `image` to `path`, replacing any previous snapshot.
pub(crate) fn write_snapshot<T: Serialize>(path: &Path, image: &T, sync: bool) -> Result<()> {
    let tmp = temp_path(path);
    let unavailable = |e: &dyn std::fmt::Display| Error::storage_unavailable(path, e);

    let file = File::create(&tmp).map_err(|e| unavailable(&e))?;
    let mut writer = BufWriter::new(file);
    writer.write_all(MAGIC).map_err(|e| unavailable(&e))?;
    codec()
        .serialize_into(&mut writer, image)
        .map_err(|e| unavailable(&e))?;
    let file = writer.into_inner().map_err(|e| unavailable(&e))?;
    if sync {
        file.sync_all().map_err(|e| unavailable(&e))?;
    }
    drop(file);

    fs::rename(&tmp, path).map_err(|e| unavailable(&e))?;
    Ok(())
}

/// Reads the snapshot at `path`.
pub(crate) fn read_snapshot(path: &Path) -> Result<StoreImage> {
    let file = File::open(path).map_err(|e| Error::storage_unavailable(path, e))?;
    let len = file
        .metadata()
        .map_err(|e| Error::storage_unavailable(path, e))?
        .len();
    let mut reader = BufReader::new(file);

    let mut magic = [0u8; 8];
    reader
        .read_exact(&mut magic)
        .map_err(|_| Error::corrupted(format!("{}: truncated header", path.display())))?;
    if &magic != MAGIC {
        return Err(Error::corrupted(format!("{}: not a store snapshot", path.display())));
    }

    // Nothing in the image can be larger than the file holding it.
    codec()
        .with_limit(len.saturating_sub(MAGIC.len() as u64))
        .deserialize_from(reader)
        .map_err(|e| Error::corrupted(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::SlotState;
    use sos_core::schema::SchemaBuilder;
    use sos_core::{DataType, Value};
    use tempfile::tempdir;

    fn image() -> StoreImage {
        let schema = SchemaBuilder::new("job")
            .unwrap()
            .add_attribute("id", DataType::UInt32, true)
            .unwrap()
            .build()
            .unwrap();
        StoreImage {
            schema,
            slots: vec![
                Slot {
                    generation: 2,
                    state: SlotState::Live(Object::new(vec![Value::UInt32(7)])),
                },
                Slot {
                    generation: 1,
                    state: SlotState::Free,
                },
            ],
            free: vec![1],
        }
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.sos");
        write_snapshot(&path, &image(), false).unwrap();
        assert!(!temp_path(&path).exists());

        let back = read_snapshot(&path).unwrap();
        assert_eq!(back.schema, image().schema);
        assert_eq!(back.slots, image().slots);
        assert_eq!(back.free, vec![1]);
    }

    #[test]
    fn test_bad_magic_is_corrupted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.sos");
        fs::write(&path, b"NOTASNAPSHOT").unwrap();
        assert!(matches!(read_snapshot(&path), Err(Error::Corrupted { .. })));

        fs::write(&path, b"SOS").unwrap();
        assert!(matches!(read_snapshot(&path), Err(Error::Corrupted { .. })));
    }

    #[test]
    fn test_truncated_body_is_corrupted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.sos");
        write_snapshot(&path, &image(), false).unwrap();
        let bytes = fs::read(&path).unwrap();
        fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();
        assert!(matches!(read_snapshot(&path), Err(Error::Corrupted { .. })));
    }

    #[test]
    fn test_length_prefix_past_end_of_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.sos");
        // The schema name claims 2^60 bytes but three follow.
        let mut bytes = MAGIC.to_vec();
        bytes.extend_from_slice(&(1u64 << 60).to_le_bytes());
        bytes.extend_from_slice(b"job");
        fs::write(&path, &bytes).unwrap();
        assert!(matches!(read_snapshot(&path), Err(Error::Corrupted { .. })));
    }

    #[test]
    fn test_layout_matches_default_bincode() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.sos");
        write_snapshot(&path, &image(), false).unwrap();
        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[MAGIC.len()..], bincode::serialize(&image()).unwrap().as_slice());
    }

    #[test]
    fn test_missing_dir() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(check_dir(&missing), Err(Error::StorageUnavailable { .. })));
        assert!(check_dir(dir.path()).is_ok());

        let file = dir.path().join("plain");
        fs::write(&file, b"x").unwrap();
        assert!(matches!(check_dir(&file), Err(Error::StorageUnavailable { .. })));
    }
}
