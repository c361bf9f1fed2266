//! Persistent RSVP storage.
//!
//! Handlers only see [`RsvpStore`]. Which implementation backs it is decided
//! once at ignition from [`RsvpConfig`].

use std::error::Error as StdError;
use std::path::{Path, PathBuf};

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PoolError};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use log::info;
use rocket::tokio::sync::Mutex;
use rocket::tokio::task::{spawn_blocking, JoinError};
use thiserror::Error;

use crate::config::{RsvpConfig, StorageKind};
use crate::models::{NewRsvp, Rsvp};
use crate::workbook::{self, WorkbookError};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

pub type Store = Box<dyn RsvpStore>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("connection pool: {0}")]
    Pool(#[from] PoolError),

    #[error("query failed: {0}")]
    Query(#[from] diesel::result::Error),

    #[error("migration failed: {0}")]
    Migration(Box<dyn StdError + Send + Sync>),

    #[error(transparent)]
    Workbook(#[from] WorkbookError),

    #[error("storage task failed: {0}")]
    Task(#[from] JoinError),
}

#[rocket::async_trait]
pub trait RsvpStore: Send + Sync {
    /// Appends one RSVP.
    async fn insert(&self, rsvp: NewRsvp) -> Result<(), StoreError>;

    /// Every stored RSVP, oldest first.
    async fn all(&self) -> Result<Vec<Rsvp>, StoreError>;
}

pub async fn open(config: &RsvpConfig) -> Result<Store, StoreError> {
    let store: Store = match config.storage {
        StorageKind::Sqlite => {
            let path = config.database_path.clone();
            Box::new(spawn_blocking(move || SqliteStore::open(&path)).await??)
        }
        StorageKind::Workbook => {
            let path = config.workbook_path.clone();
            Box::new(spawn_blocking(move || WorkbookStore::open(path)).await??)
        }
    };
    Ok(store)
}

type SqlitePool = Pool<ConnectionManager<SqliteConnection>>;

#[derive(Debug)]
struct ConnectionOptions;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute("PRAGMA busy_timeout = 5000;")
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// RSVPs in the `rsvps` table of a SQLite file.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let manager = ConnectionManager::<SqliteConnection>::new(path.to_string_lossy());
        let pool = Pool::builder()
            .connection_customizer(Box::new(ConnectionOptions))
            .build(manager)?;

        let mut conn = pool.get()?;
        conn.run_pending_migrations(MIGRATIONS)
            .map_err(StoreError::Migration)?;

        info!("Opened RSVP database at {}", path.display());
        Ok(Self { pool })
    }
}

#[rocket::async_trait]
impl RsvpStore for SqliteStore {
    async fn insert(&self, rsvp: NewRsvp) -> Result<(), StoreError> {
        let pool = self.pool.clone();
        spawn_blocking(move || -> Result<(), StoreError> {
            use crate::schema::rsvps::dsl::*;
            let mut conn = pool.get()?;
            diesel::insert_into(rsvps).values(&rsvp).execute(&mut conn)?;
            Ok(())
        })
        .await?
    }

    async fn all(&self) -> Result<Vec<Rsvp>, StoreError> {
        let pool = self.pool.clone();
        spawn_blocking(move || -> Result<Vec<Rsvp>, StoreError> {
            use crate::schema::rsvps::dsl::*;
            let mut conn = pool.get()?;
            let stored = rsvps
                .order(id.asc())
                .select(Rsvp::as_select())
                .load(&mut conn)?;
            Ok(stored)
        })
        .await?
    }
}

/// RSVPs kept in the `RSVPs` sheet of an xlsx file.
///
/// Every insert rewrites the whole file, so inserts are serialized through one
/// lock and the new file replaces the old one only once fully written.
pub struct WorkbookStore {
    path: PathBuf,
    rows: Mutex<Vec<Rsvp>>,
}

impl WorkbookStore {
    pub fn open(path: PathBuf) -> Result<Self, StoreError> {
        let rows = if path.exists() {
            workbook::read_rsvps(&path)?
        } else {
            workbook::write_rsvps(&[], &path)?;
            Vec::new()
        };

        info!("Opened RSVP workbook at {} ({} rows)", path.display(), rows.len());
        Ok(Self { path, rows: Mutex::new(rows) })
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn replace_workbook(rows: &[Rsvp], path: &Path) -> Result<(), WorkbookError> {
    let staging = staging_path(path);
    workbook::write_rsvps(rows, &staging)?;
    std::fs::rename(&staging, path)?;
    Ok(())
}

#[rocket::async_trait]
impl RsvpStore for WorkbookStore {
    async fn insert(&self, rsvp: NewRsvp) -> Result<(), StoreError> {
        let mut rows = self.rows.lock().await;

        let mut updated = rows.clone();
        updated.push(rsvp.with_id(rows.len() as i32 + 1));

        let path = self.path.clone();
        let updated = spawn_blocking(move || replace_workbook(&updated, &path).map(|_| updated)).await??;

        *rows = updated;
        Ok(())
    }

    async fn all(&self) -> Result<Vec<Rsvp>, StoreError> {
        Ok(self.rows.lock().await.clone())
    }
}
