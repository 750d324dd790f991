//! Per-user data directory: the database file and the statement store.
//!
//! ```text
//! <data_dir>/
//!   tally.db
//!   statements/
//!     <sha256>.<ext>
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::{Result, TallyError};
use crate::fs::{persist_no_clobber, stage_with_hash};
use crate::storage::{LedgerStore, NewStatement, SqliteStorage, Statement};

pub const DATA_DIR_ENV: &str = "TALLY_DATA_DIR";
pub const DB_FILE_NAME: &str = "tally.db";
pub const STATEMENTS_DIR_NAME: &str = "statements";

/// SQLite sidecar files removed together with the database.
const DB_SIDECAR_SUFFIXES: [&str; 3] = ["-wal", "-shm", "-journal"];

/// Parameters for importing a statement file.
#[derive(Debug, Clone)]
pub struct ImportStatement {
    pub account_id: Uuid,
    pub institution: String,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    /// Defaults to the account's currency
    pub currency: Option<String>,
    /// Existing statement the import supersedes
    pub replaces: Option<Uuid>,
}

/// Locations of the user's database and imported statement files.
#[derive(Debug, Clone)]
pub struct UserData {
    data_dir: PathBuf,
}

impl UserData {
    pub fn from_data_dir(path: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: path.into(),
        }
    }

    /// Resolve the data directory from the process environment.
    ///
    /// `TALLY_DATA_DIR`, then `$XDG_DATA_HOME/tally`, then
    /// `$HOME/.local/share/tally`.
    pub fn from_environment() -> Result<Self> {
        resolve_data_dir(|key| std::env::var(key).ok())
            .map(Self::from_data_dir)
            .ok_or_else(|| {
                TallyError::Validation(format!(
                    "Cannot determine data directory; set {} or HOME",
                    DATA_DIR_ENV
                ))
            })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }

    pub fn statements_dir(&self) -> PathBuf {
        self.data_dir.join(STATEMENTS_DIR_NAME)
    }

    pub fn db_exists(&self) -> bool {
        self.db_path().is_file()
    }

    /// Create the directory layout and a migrated database.
    ///
    /// Safe to call on an existing data directory; pending migrations are
    /// applied.
    pub fn init(&self) -> Result<SqliteStorage> {
        fs::create_dir_all(self.statements_dir())?;
        let storage = SqliteStorage::open(&self.db_path())?;
        tracing::info!(path = %self.db_path().display(), "database ready");
        Ok(storage)
    }

    /// Open the existing database, applying any pending migrations.
    ///
    /// # Errors
    ///
    /// Returns `TallyError::NotFound` if the database has not been created.
    pub fn open_db(&self) -> Result<SqliteStorage> {
        if !self.db_exists() {
            return Err(TallyError::NotFound(format!(
                "database at {}",
                self.db_path().display()
            )));
        }
        SqliteStorage::open(&self.db_path())
    }

    /// Remove the database file. Returns `false` when there was none.
    ///
    /// Imported statement files are left in place.
    pub fn delete_db(&self) -> Result<bool> {
        let db_path = self.db_path();
        let existed = match fs::remove_file(&db_path) {
            Ok(()) => true,
            Err(e) if e.kind() == io::ErrorKind::NotFound => false,
            Err(e) => return Err(e.into()),
        };

        for suffix in DB_SIDECAR_SUFFIXES {
            let mut sidecar = db_path.clone().into_os_string();
            sidecar.push(suffix);
            match fs::remove_file(&sidecar) {
                Err(e) if e.kind() != io::ErrorKind::NotFound => return Err(e.into()),
                _ => {}
            }
        }

        if existed {
            tracing::info!(path = %db_path.display(), "database deleted");
        }
        Ok(existed)
    }

    /// Locate the managed copy of a statement file by content hash.
    pub fn statement_file_path(&self, file_hash: &str) -> Result<Option<PathBuf>> {
        let dir = self.statements_dir();
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        for entry in entries {
            let path = entry?.path();
            let stem = path.file_stem().and_then(|s| s.to_str());
            if path.is_file() && stem == Some(file_hash) {
                return Ok(Some(path));
            }
        }
        Ok(None)
    }

    /// Copy `source` into the statement store and record it.
    ///
    /// The file is hashed while it is copied. A hash that is already known,
    /// either as a stored row or as a managed file, is rejected with
    /// `TallyError::DuplicateFileHash` and nothing is overwritten. With
    /// `replaces` set, the new row and the replacement link are written in one
    /// transaction. If either cannot be written the managed copy is removed
    /// again.
    pub fn import_statement<S: LedgerStore>(
        &self,
        store: &mut S,
        source: &Path,
        import: &ImportStatement,
    ) -> Result<Statement> {
        if !source.is_file() {
            return Err(TallyError::NotFound(format!(
                "statement file {}",
                source.display()
            )));
        }
        if import.period_start > import.period_end {
            return Err(TallyError::Validation(format!(
                "Statement period starts after it ends ({} > {})",
                import.period_start, import.period_end
            )));
        }

        let account = store
            .get_account(&import.account_id)?
            .ok_or_else(|| TallyError::NotFound(format!("account {}", import.account_id)))?;

        if let Some(old) = import.replaces {
            let replaced = store
                .get_statement(&old)?
                .ok_or_else(|| TallyError::NotFound(format!("statement {}", old)))?;
            if let Some(existing) = replaced.replaced_by {
                return Err(TallyError::Validation(format!(
                    "Statement {} is already replaced by {}",
                    old, existing
                )));
            }
        }

        let store_dir = self.statements_dir();
        fs::create_dir_all(&store_dir)?;
        let staged = stage_with_hash(source, &store_dir)?;

        if let Some(path) = self.statement_file_path(&staged.hash)? {
            staged.discard()?;
            return Err(TallyError::DuplicateFileHash {
                hash: staged.hash,
                path,
            });
        }
        if store.find_statement_by_hash(&staged.hash)?.is_some() {
            staged.discard()?;
            return Err(TallyError::DuplicateFileHash {
                path: self.managed_path(&staged.hash, source),
                hash: staged.hash,
            });
        }

        let destination = self.managed_path(&staged.hash, source);
        match persist_no_clobber(&staged.temp_path, &destination) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(TallyError::DuplicateFileHash {
                    hash: staged.hash,
                    path: destination,
                });
            }
            Err(e) => return Err(e.into()),
        }

        let size = i64::try_from(staged.size)
            .map_err(|_| TallyError::Validation("Statement file is too large".to_string()))?;
        let new_statement = NewStatement::new(
            import.institution.clone(),
            account.id,
            import.period_start,
            import.period_end,
            import.currency.clone().unwrap_or(account.currency),
        )
        .with_file(staged.hash.clone(), size);

        let recorded = match import.replaces {
            Some(old) => store.create_replacement(&new_statement, &old),
            None => store.create_statement(&new_statement),
        };
        let statement = match recorded {
            Ok(statement) => statement,
            Err(error) => {
                tracing::warn!(hash = %staged.hash, %error, "statement insert failed, removing copied file");
                return match fs::remove_file(&destination) {
                    Ok(()) => Err(error),
                    Err(cleanup) => Err(TallyError::ImportCleanup {
                        error: Box::new(error),
                        path: destination,
                        cleanup,
                    }),
                };
            }
        };

        tracing::info!(
            id = %statement.id,
            hash = %statement.file_hash,
            account = %statement.account_id,
            "imported statement"
        );
        Ok(statement)
    }

    fn managed_path(&self, hash: &str, source: &Path) -> PathBuf {
        let file_name = match source.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if !ext.is_empty() => format!("{}.{}", hash, ext.to_ascii_lowercase()),
            _ => hash.to_string(),
        };
        self.statements_dir().join(file_name)
    }
}

fn resolve_data_dir<F>(lookup: F) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(dir) = non_empty(DATA_DIR_ENV) {
        return Some(PathBuf::from(dir));
    }
    if let Some(xdg) = non_empty("XDG_DATA_HOME") {
        return Some(PathBuf::from(xdg).join("tally"));
    }
    non_empty("HOME").map(|home| {
        PathBuf::from(home)
            .join(".local")
            .join("share")
            .join("tally")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_data_dir_env_wins() {
        let dir = resolve_data_dir(lookup(&[
            (DATA_DIR_ENV, "/srv/tally"),
            ("XDG_DATA_HOME", "/xdg"),
            ("HOME", "/home/u"),
        ]));
        assert_eq!(dir, Some(PathBuf::from("/srv/tally")));
    }

    #[test]
    fn test_data_dir_xdg_then_home() {
        let xdg = resolve_data_dir(lookup(&[("XDG_DATA_HOME", "/xdg"), ("HOME", "/home/u")]));
        assert_eq!(xdg, Some(PathBuf::from("/xdg/tally")));

        let home = resolve_data_dir(lookup(&[("XDG_DATA_HOME", ""), ("HOME", "/home/u")]));
        assert_eq!(home, Some(PathBuf::from("/home/u/.local/share/tally")));

        assert_eq!(resolve_data_dir(lookup(&[])), None);
    }

    #[test]
    fn test_open_db_requires_init() {
        let dir = tempdir().unwrap();
        let user_data = UserData::from_data_dir(dir.path());

        assert!(matches!(
            user_data.open_db(),
            Err(TallyError::NotFound(_))
        ));
        user_data.init().unwrap();
        assert!(user_data.statements_dir().is_dir());
        user_data.open_db().unwrap();
    }

    #[test]
    fn test_delete_db_reports_absence() {
        let dir = tempdir().unwrap();
        let user_data = UserData::from_data_dir(dir.path());

        assert!(!user_data.delete_db().unwrap());
        drop(user_data.init().unwrap());
        assert!(user_data.delete_db().unwrap());
        assert!(!user_data.db_exists());
        assert!(user_data.statements_dir().is_dir());
    }

    #[test]
    fn test_managed_path_lowercases_extension() {
        let user_data = UserData::from_data_dir("/data");
        assert_eq!(
            user_data.managed_path("abc", Path::new("/tmp/Jan.PDF")),
            PathBuf::from("/data/statements/abc.pdf")
        );
        assert_eq!(
            user_data.managed_path("abc", Path::new("/tmp/README")),
            PathBuf::from("/data/statements/abc")
        );
    }
}
