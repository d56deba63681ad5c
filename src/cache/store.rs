//! Cache store - Probe, read and write entry files

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use crate::cache::config::WriteMode;

/// Permission bits for new entry files (rw-r--r--)
pub const ENTRY_MODE: u32 = 0o644;

/// Prefix of the temporary files used by atomic writes
const TEMP_PREFIX: &str = ".readthru-";

/// Check whether an entry file exists.
///
/// Returns `Ok(false)` only for "not found"; any other failure is an error.
pub fn probe_entry(path: &Path) -> io::Result<bool> {
    path.try_exists()
}

/// Read a whole entry file
pub fn read_entry(path: &Path) -> io::Result<Vec<u8>> {
    fs::read(path)
}

/// Write an entry file
pub fn write_entry(path: &Path, bytes: &[u8], mode: WriteMode) -> io::Result<()> {
    match mode {
        WriteMode::Direct => write_direct(path, bytes),
        WriteMode::Atomic => write_atomic(path, bytes),
    }
}

fn write_direct(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(ENTRY_MODE);
    }

    let mut file = options.open(path)?;

    // The open mode is filtered by the umask; pin it like atomic writes do.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(ENTRY_MODE))?;
    }

    file.write_all(bytes)?;
    Ok(())
}

fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .tempfile_in(dir)?;
    tmp.write_all(bytes)?;

    // Temp files are created 0600; widen before the rename makes it visible.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(fs::Permissions::from_mode(ENTRY_MODE))?;
    }

    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_probe_missing_entry() {
        let temp = tempdir().unwrap();
        assert!(!probe_entry(&temp.path().join("abc.json")).unwrap());
    }

    #[test]
    fn test_probe_existing_entry() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("abc.json");
        fs::write(&path, "1").unwrap();
        assert!(probe_entry(&path).unwrap());
    }

    #[test]
    fn test_probe_through_a_file_is_an_error() {
        let temp = tempdir().unwrap();
        let not_a_dir = temp.path().join("plain");
        fs::write(&not_a_dir, "x").unwrap();

        assert!(probe_entry(&not_a_dir.join("abc.json")).is_err());
    }

    #[test]
    fn test_write_direct_truncates() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("abc.json");
        fs::write(&path, "a much longer previous body").unwrap();

        write_entry(&path, b"[1]", WriteMode::Direct).unwrap();
        assert_eq!(read_entry(&path).unwrap(), b"[1]");
    }

    #[test]
    fn test_write_atomic_leaves_only_the_entry() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("abc.json");

        write_entry(&path, b"{\"a\":1}", WriteMode::Atomic).unwrap();
        assert_eq!(read_entry(&path).unwrap(), b"{\"a\":1}");

        let names: Vec<_> = fs::read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["abc.json"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_write_direct_sets_entry_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempdir().unwrap();
        let path = temp.path().join("abc.json");
        write_entry(&path, b"1", WriteMode::Direct).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, ENTRY_MODE);
    }

    #[cfg(unix)]
    #[test]
    fn test_write_modes_agree_on_entry_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempdir().unwrap();
        let direct = temp.path().join("direct.json");
        let atomic = temp.path().join("atomic.json");
        write_entry(&direct, b"1", WriteMode::Direct).unwrap();
        write_entry(&atomic, b"1", WriteMode::Atomic).unwrap();

        let mode = |p: &Path| fs::metadata(p).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode(&direct), mode(&atomic));
    }

    #[cfg(unix)]
    #[test]
    fn test_write_atomic_sets_entry_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempdir().unwrap();
        let path = temp.path().join("abc.json");
        write_entry(&path, b"1", WriteMode::Atomic).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, ENTRY_MODE);
    }

    #[test]
    fn test_write_into_missing_dir_fails() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("missing").join("abc.json");

        assert!(write_entry(&path, b"1", WriteMode::Direct).is_err());
        assert!(write_entry(&path, b"1", WriteMode::Atomic).is_err());
    }

    #[test]
    fn test_read_directory_fails() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("abc.json");
        fs::create_dir(&path).unwrap();

        assert!(read_entry(&path).is_err());
    }
}
