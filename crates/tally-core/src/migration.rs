//! Ordered, forward-only schema migrations.
//!
//! Migrations are `.sql` files named `<VERSION>_<NAME>.sql`. The embedded set
//! is compiled from `migrations/` at the crate root; a filesystem directory can
//! be used instead (tests, tooling). Applied versions are recorded in
//! `schema_migrations` so running the same set twice is a no-op.

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OptionalExtension};
use rust_embed::RustEmbed;
use thiserror::Error;

#[derive(RustEmbed)]
#[folder = "migrations/"]
struct EmbeddedMigrations;

const CREATE_SCHEMA_MIGRATIONS_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

/// Errors raised while discovering, loading or applying migrations.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("migration file extension must be .sql: {0}")]
    InvalidExtension(String),

    #[error("migration filename must be <VERSION>_<NAME>.sql: {0}")]
    InvalidFilename(String),

    #[error("invalid migration version in {file_name}: {source}")]
    InvalidVersion {
        file_name: String,
        source: std::num::ParseIntError,
    },

    #[error("duplicate migration version found: {0}")]
    DuplicateVersion(u32),

    #[error("migration file name must be valid utf-8")]
    InvalidUtf8FileName,

    #[error("migration file not found: {0}")]
    MissingFile(String),

    #[error("migration file is not valid utf-8: {0}")]
    NonUtf8Content(String),

    #[error("failed to read migrations: {0}")]
    Io(#[from] std::io::Error),

    #[error("migration {version} ({name}) failed: {source}")]
    Apply {
        version: u32,
        name: String,
        source: rusqlite::Error,
    },

    #[error("sqlite error while tracking migrations: {0}")]
    Sql(#[from] rusqlite::Error),
}

/// Where migration files are read from.
#[derive(Debug, Clone)]
pub enum MigrationSource {
    /// The set compiled into this crate.
    Embedded,
    /// A directory on disk.
    Fs(PathBuf),
}

impl MigrationSource {
    pub fn embedded() -> Self {
        Self::Embedded
    }

    pub fn fs(path: impl AsRef<Path>) -> Self {
        Self::Fs(path.as_ref().to_path_buf())
    }

    /// List `.sql` file names available in this source (unsorted).
    pub fn migration_files(&self) -> Result<Vec<String>, MigrationError> {
        match self {
            Self::Embedded => Ok(EmbeddedMigrations::iter()
                .map(|name| name.into_owned())
                .filter(|name| has_sql_extension(Path::new(name)))
                .collect()),
            Self::Fs(base_dir) => {
                let mut files = Vec::new();
                for entry in std::fs::read_dir(base_dir)? {
                    let entry = entry?;
                    let path = entry.path();
                    if !path.is_file() || !has_sql_extension(&path) {
                        continue;
                    }
                    let file_name = entry
                        .file_name()
                        .into_string()
                        .map_err(|_| MigrationError::InvalidUtf8FileName)?;
                    files.push(file_name);
                }
                Ok(files)
            }
        }
    }

    /// Read a migration's SQL on demand.
    pub fn read_sql(&self, file_name: &str) -> Result<String, MigrationError> {
        match self {
            Self::Embedded => {
                let file = EmbeddedMigrations::get(file_name)
                    .ok_or_else(|| MigrationError::MissingFile(file_name.to_string()))?;
                String::from_utf8(file.data.into_owned())
                    .map_err(|_| MigrationError::NonUtf8Content(file_name.to_string()))
            }
            Self::Fs(base_dir) => {
                let path = base_dir.join(file_name);
                if !path.is_file() {
                    return Err(MigrationError::MissingFile(file_name.to_string()));
                }
                Ok(std::fs::read_to_string(path)?)
            }
        }
    }
}

fn has_sql_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("sql"))
        .unwrap_or(false)
}

/// A single migration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    pub version: u32,
    pub name: String,
    pub file_name: String,
}

impl Migration {
    /// Parse `<VERSION>_<NAME>.sql`. The version may be zero-padded.
    pub fn from_file_name(file_name: &str) -> Result<Self, MigrationError> {
        let path = Path::new(file_name);
        if !has_sql_extension(path) {
            return Err(MigrationError::InvalidExtension(file_name.to_string()));
        }

        let stem = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| MigrationError::InvalidFilename(file_name.to_string()))?;
        let (version_str, name) = stem
            .split_once('_')
            .ok_or_else(|| MigrationError::InvalidFilename(file_name.to_string()))?;
        if version_str.is_empty() || name.is_empty() {
            return Err(MigrationError::InvalidFilename(file_name.to_string()));
        }

        let version =
            version_str
                .parse::<u32>()
                .map_err(|source| MigrationError::InvalidVersion {
                    file_name: file_name.to_string(),
                    source,
                })?;

        Ok(Self {
            version,
            name: name.to_string(),
            file_name: file_name.to_string(),
        })
    }

    /// Discover every migration in `source`, sorted by version.
    pub fn discover(source: &MigrationSource) -> Result<Vec<Self>, MigrationError> {
        let mut migrations = source
            .migration_files()?
            .iter()
            .map(|file_name| Self::from_file_name(file_name))
            .collect::<Result<Vec<_>, _>>()?;

        migrations.sort_by(|a, b| {
            a.version
                .cmp(&b.version)
                .then_with(|| a.file_name.cmp(&b.file_name))
        });

        for pair in migrations.windows(2) {
            if pair[0].version == pair[1].version {
                return Err(MigrationError::DuplicateVersion(pair[0].version));
            }
        }

        Ok(migrations)
    }

    pub fn sql(&self, source: &MigrationSource) -> Result<String, MigrationError> {
        source.read_sql(&self.file_name)
    }
}

/// A row of `schema_migrations`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct AppliedMigration {
    pub version: u32,
    pub name: String,
    pub applied_at: String,
}

/// A known migration paired with when it was applied, if ever.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct MigrationStatus {
    pub version: u32,
    pub name: String,
    pub applied_at: Option<String>,
}

impl MigrationStatus {
    pub fn is_applied(&self) -> bool {
        self.applied_at.is_some()
    }
}

/// Applies migrations to a connection and records them.
pub struct MigrationRunner<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> MigrationRunner<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }

    /// Apply every migration in `migrations` not yet recorded, in order.
    ///
    /// Each migration runs in its own transaction together with its
    /// `schema_migrations` row. Returns the versions applied by this call.
    pub fn run(
        &mut self,
        source: &MigrationSource,
        migrations: &[Migration],
    ) -> Result<Vec<u32>, MigrationError> {
        self.conn.execute_batch(CREATE_SCHEMA_MIGRATIONS_SQL)?;

        let mut applied = Vec::new();
        for migration in migrations {
            if self.is_applied(migration.version)? {
                continue;
            }

            let sql = migration.sql(source)?;
            let tx = self.conn.transaction()?;
            tx.execute_batch(&sql)
                .map_err(|source| MigrationError::Apply {
                    version: migration.version,
                    name: migration.name.clone(),
                    source,
                })?;
            tx.execute(
                "INSERT INTO schema_migrations (version, name) VALUES (?1, ?2)",
                rusqlite::params![migration.version, migration.name],
            )?;
            tx.commit()?;

            tracing::info!(
                version = migration.version,
                name = %migration.name,
                "applied migration"
            );
            applied.push(migration.version);
        }

        Ok(applied)
    }

    fn is_applied(&self, version: u32) -> Result<bool, MigrationError> {
        let found: Option<u32> = self
            .conn
            .query_row(
                "SELECT version FROM schema_migrations WHERE version = ?1",
                [version],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Migrations recorded as applied, oldest version first.
    pub fn applied(&self) -> Result<Vec<AppliedMigration>, MigrationError> {
        applied_migrations(&*self.conn)
    }

    /// Pair each known migration with its applied timestamp.
    pub fn status(&self, migrations: &[Migration]) -> Result<Vec<MigrationStatus>, MigrationError> {
        migration_status(&*self.conn, migrations)
    }
}

pub(crate) fn applied_migrations(conn: &Connection) -> Result<Vec<AppliedMigration>, MigrationError> {
    let exists: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'schema_migrations'",
        [],
        |row| row.get(0),
    )?;
    if exists == 0 {
        return Ok(Vec::new());
    }

    let mut stmt =
        conn.prepare("SELECT version, name, applied_at FROM schema_migrations ORDER BY version")?;
    let rows = stmt.query_map([], |row| {
        Ok(AppliedMigration {
            version: row.get(0)?,
            name: row.get(1)?,
            applied_at: row.get(2)?,
        })
    })?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub(crate) fn migration_status(
    conn: &Connection,
    migrations: &[Migration],
) -> Result<Vec<MigrationStatus>, MigrationError> {
    let applied = applied_migrations(conn)?;
    Ok(migrations
        .iter()
        .map(|migration| MigrationStatus {
            version: migration.version,
            name: migration.name.clone(),
            applied_at: applied
                .iter()
                .find(|a| a.version == migration.version)
                .map(|a| a.applied_at.clone()),
        })
        .collect())
}
