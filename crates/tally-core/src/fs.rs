//! Filesystem helpers for the content-addressed statement store.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use uuid::Uuid;

const COPY_BUFFER_BYTES: usize = 64 * 1024;

/// A file copied into a staging location, with its content hash.
#[derive(Debug)]
pub struct StagedFile {
    pub temp_path: PathBuf,
    /// Lowercase hex SHA-256 of the contents
    pub hash: String,
    pub size: u64,
}

impl StagedFile {
    /// Remove the staged copy. Missing files are not an error.
    pub fn discard(&self) -> io::Result<()> {
        match fs::remove_file(&self.temp_path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

/// Stream `source` into a fresh temp file under `dir`, hashing as it goes.
///
/// The temp file is removed if copying fails part way.
pub fn stage_with_hash(source: &Path, dir: &Path) -> io::Result<StagedFile> {
    let mut input = File::open(source)?;
    let temp_path = dir.join(format!(".import-{}.tmp", Uuid::new_v4().simple()));
    let mut output = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&temp_path)?;

    let result = copy_hashing(&mut input, &mut output).and_then(|staged| {
        output.sync_all()?;
        Ok(staged)
    });

    match result {
        Ok((hash, size)) => Ok(StagedFile {
            temp_path,
            hash,
            size,
        }),
        Err(e) => {
            let _ = fs::remove_file(&temp_path);
            Err(e)
        }
    }
}

fn copy_hashing(input: &mut impl Read, output: &mut impl Write) -> io::Result<(String, u64)> {
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; COPY_BUFFER_BYTES];
    let mut size: u64 = 0;
    loop {
        let n = input.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        output.write_all(&buf[..n])?;
        size += n as u64;
    }
    Ok((hex::encode(hasher.finalize()), size))
}

/// Move `temp_path` to `destination`, refusing to replace an existing file.
///
/// Fails with `ErrorKind::AlreadyExists` if `destination` exists. The temp
/// file is removed whenever the move does not happen. Once `destination` is
/// linked the call succeeds, even if the temp file cannot be removed.
pub fn persist_no_clobber(temp_path: &Path, destination: &Path) -> io::Result<()> {
    persist_with(temp_path, destination, |path| fs::remove_file(path))
}

fn persist_with<R>(temp_path: &Path, destination: &Path, remove_temp: R) -> io::Result<()>
where
    R: Fn(&Path) -> io::Result<()>,
{
    let error = match fs::hard_link(temp_path, destination) {
        Ok(()) => {
            if let Err(error) = remove_temp(temp_path) {
                tracing::warn!(
                    path = %temp_path.display(),
                    %error,
                    "staged copy left behind after linking"
                );
            }
            return Ok(());
        }
        Err(e) => e,
    };

    let result = if error.kind() == io::ErrorKind::AlreadyExists {
        Err(error)
    } else if destination.exists() {
        // Filesystems without hard links: check then rename.
        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} already exists", destination.display()),
        ))
    } else {
        fs::rename(temp_path, destination)
    };

    if result.is_err() {
        let _ = remove_temp(temp_path);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    // SHA-256 of "hello\n"
    const HELLO_SHA256: &str = "5891b5b522d5df086d0ff0b110fbd9d21bb4fc7163af34d08286a2e846f6be03";

    #[test]
    fn test_stage_with_hash_copies_and_hashes() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("statement.csv");
        fs::write(&source, "hello\n").unwrap();

        let staged = stage_with_hash(&source, dir.path()).unwrap();

        assert_eq!(staged.hash, HELLO_SHA256);
        assert_eq!(staged.size, 6);
        assert_eq!(fs::read_to_string(&staged.temp_path).unwrap(), "hello\n");
        assert!(source.exists());
    }

    #[test]
    fn test_stage_missing_source_leaves_nothing_behind() {
        let dir = tempdir().unwrap();
        let err = stage_with_hash(&dir.path().join("missing.csv"), dir.path()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_persist_moves_new_file() {
        let dir = tempdir().unwrap();
        let temp = dir.path().join("temp");
        let dest = dir.path().join("dest");
        fs::write(&temp, "new").unwrap();

        persist_no_clobber(&temp, &dest).unwrap();

        assert!(!temp.exists());
        assert_eq!(fs::read_to_string(&dest).unwrap(), "new");
    }

    #[test]
    fn test_persist_refuses_to_overwrite() {
        let dir = tempdir().unwrap();
        let temp = dir.path().join("temp");
        let dest = dir.path().join("dest");
        fs::write(&dest, "old").unwrap();
        fs::write(&temp, "new").unwrap();

        let err = persist_no_clobber(&temp, &dest).unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert!(!temp.exists());
        assert_eq!(fs::read_to_string(&dest).unwrap(), "old");
    }

    #[test]
    fn test_persist_succeeds_when_temp_cannot_be_removed() {
        let dir = tempdir().unwrap();
        let temp = dir.path().join("temp");
        let dest = dir.path().join("dest");
        fs::write(&temp, "new").unwrap();

        persist_with(&temp, &dest, |_| {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
        })
        .unwrap();

        assert_eq!(fs::read_to_string(&dest).unwrap(), "new");
        assert!(temp.exists());
    }
}
