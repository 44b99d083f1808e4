//! JSON snapshot I/O shared by the catalog and ranking stores; writes go through a temp file and a rename.

use std::ffi::OsString;
use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StoreError;

pub(crate) fn read_bytes(path: &Path) -> Result<Vec<u8>, StoreError> {
    fs::read(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let bytes = read_bytes(path)?;
    serde_json::from_slice(&bytes).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads a snapshot, or returns `T::default()` when it is missing or
/// unreadable. `what` names the snapshot in log lines.
pub(crate) fn load_or_default<T, F>(path: &Path, what: &str, read: F) -> T
where
    T: Default,
    F: FnOnce(&Path) -> Result<T, StoreError>,
{
    match read(path) {
        Ok(value) => value,
        Err(e) if e.is_not_found() => {
            tracing::info!(snapshot = what, path = %path.display(), "no prior snapshot; cold start");
            T::default()
        }
        Err(e) => {
            tracing::warn!(snapshot = what, error = %e, "prior snapshot unreadable; cold start");
            T::default()
        }
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp: OsString = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

/// Serializes `value` as pretty JSON to `<path>.tmp`, syncs it, then renames
/// it over `path`. Parent directories are created as needed.
pub(crate) fn write_json_atomic<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
) -> Result<(), StoreError> {
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let mut bytes = serde_json::to_vec_pretty(value).map_err(|source| StoreError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;
    bytes.push(b'\n');

    let tmp = tmp_path(path);
    {
        let mut file = fs::File::create(&tmp).map_err(io_err)?;
        file.write_all(&bytes).map_err(io_err)?;
        file.sync_all().map_err(io_err)?;
    }
    fs::rename(&tmp, path).map_err(io_err)?;
    Ok(())
}

/// Fresh, empty directory under the system temp dir for one test.
#[cfg(test)]
pub(crate) fn test_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("giftrank-store-{}-{name}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("create test dir");
    dir
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atomic_write_leaves_no_tmp_file_and_creates_parents() {
        let dir = test_dir("atomic");
        let path = dir.join("nested").join("values.json");

        write_json_atomic(&path, &vec![1, 2, 3]).unwrap();

        assert!(path.exists());
        assert!(!tmp_path(&path).exists());
        let back: Vec<i32> = read_json(&path).unwrap();
        assert_eq!(back, vec![1, 2, 3]);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn atomic_write_replaces_existing_file() {
        let dir = test_dir("replace");
        let path = dir.join("values.json");

        write_json_atomic(&path, &vec!["old"]).unwrap();
        write_json_atomic(&path, &vec!["new", "newer"]).unwrap();

        let back: Vec<String> = read_json(&path).unwrap();
        assert_eq!(back, vec!["new", "newer"]);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn missing_file_is_reported_as_not_found() {
        let dir = test_dir("missing");
        let err = read_json::<Vec<i32>>(&dir.join("absent.json")).unwrap_err();
        assert!(err.is_not_found());
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn load_or_default_cold_starts_on_garbage() {
        let dir = test_dir("garbage");
        let path = dir.join("values.json");
        fs::write(&path, "{not json").unwrap();

        let value: Vec<i32> = load_or_default(&path, "values", read_json);
        assert!(value.is_empty());
        let _ = fs::remove_dir_all(dir);
    }
}
