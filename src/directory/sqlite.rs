use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::core::{GeoLocation, NgoCandidate};
use crate::directory::{CandidateProvider, NewNgo};
use crate::error::{MatchEngineError, Result};

/// SQLite-backed NGO directory
///
/// Schema:
/// ```sql
/// CREATE TABLE ngos (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,
///     name TEXT NOT NULL,
///     organization TEXT NOT NULL DEFAULT '',
///     email TEXT,
///     capacity INTEGER NOT NULL CHECK (capacity >= 0),
///     specialization TEXT,
///     is_active INTEGER NOT NULL DEFAULT 1,
///     created_at TEXT NOT NULL,
///     updated_at TEXT NOT NULL
/// );
/// CREATE TABLE ngo_locations (
///     ngo_id INTEGER PRIMARY KEY REFERENCES ngos (id),
///     latitude REAL NOT NULL,
///     longitude REAL NOT NULL,
///     address TEXT NOT NULL DEFAULT '',
///     city TEXT NOT NULL DEFAULT '',
///     updated_at TEXT NOT NULL
/// );
/// ```
pub struct SqliteDirectory {
    conn: Arc<Mutex<Connection>>,
}

/// Directory statistics
#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryStats {
    pub total_ngos: u64,
    pub active_ngos: u64,
    pub located_ngos: u64,
    pub total_capacity: u64,
}

const CANDIDATE_COLUMNS: &str = "n.id, n.name, n.organization, n.capacity, n.specialization,
     l.latitude, l.longitude, l.address, l.city";

impl SqliteDirectory {
    /// Open (or create) the directory database
    pub async fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS ngos (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                organization TEXT NOT NULL DEFAULT '',
                email TEXT,
                capacity INTEGER NOT NULL CHECK (capacity >= 0),
                specialization TEXT,
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS ngo_locations (
                ngo_id INTEGER PRIMARY KEY REFERENCES ngos (id),
                latitude REAL NOT NULL,
                longitude REAL NOT NULL,
                address TEXT NOT NULL DEFAULT '',
                city TEXT NOT NULL DEFAULT '',
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_ngos_active_capacity ON ngos (is_active, capacity);
            CREATE INDEX IF NOT EXISTS idx_ngo_locations_coords ON ngo_locations (latitude, longitude);",
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| MatchEngineError::Directory("connection lock poisoned".to_string()))
    }

    /// Register an NGO, returning its id
    pub async fn register(&self, ngo: &NewNgo) -> Result<i64> {
        if let Some(location) = &ngo.location {
            location.validate()?;
        }

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let now = Utc::now().to_rfc3339();

        tx.execute(
            "INSERT INTO ngos (name, organization, email, capacity, specialization, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            params![
                ngo.name,
                ngo.organization,
                ngo.email,
                ngo.capacity,
                ngo.specialization,
                now,
            ],
        )?;
        let id = tx.last_insert_rowid();

        if let Some(location) = &ngo.location {
            upsert_location(&tx, id, location, &now)?;
        }

        tx.commit()?;
        tracing::debug!("Registered NGO {} ({})", id, ngo.name);
        Ok(id)
    }

    /// Get one NGO by id, active or not
    pub async fn get(&self, id: i64) -> Result<NgoCandidate> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {} FROM ngos n LEFT JOIN ngo_locations l ON l.ngo_id = n.id WHERE n.id = ?",
            CANDIDATE_COLUMNS
        );
        conn.query_row(&sql, params![id], row_to_candidate)
            .optional()?
            .ok_or(MatchEngineError::NotFound(id))
    }

    /// Replace the stated capacity of an NGO
    pub async fn update_capacity(&self, id: i64, capacity: u32) -> Result<()> {
        let conn = self.lock()?;
        let updated = conn.execute(
            "UPDATE ngos SET capacity = ?1, updated_at = ?2 WHERE id = ?3",
            params![capacity, Utc::now().to_rfc3339(), id],
        )?;
        if updated == 0 {
            return Err(MatchEngineError::NotFound(id));
        }
        Ok(())
    }

    /// Save or replace the location of an NGO
    pub async fn save_location(&self, id: i64, location: &GeoLocation) -> Result<()> {
        location.validate()?;

        let conn = self.lock()?;
        let exists = conn
            .query_row("SELECT 1 FROM ngos WHERE id = ?", params![id], |_| Ok(()))
            .optional()?
            .is_some();
        if !exists {
            return Err(MatchEngineError::NotFound(id));
        }

        upsert_location(&conn, id, location, &Utc::now().to_rfc3339())
    }

    /// Soft-deactivate: the row stays, matching stops seeing it
    pub async fn deactivate(&self, id: i64) -> Result<()> {
        let conn = self.lock()?;
        let updated = conn.execute(
            "UPDATE ngos SET is_active = 0, updated_at = ?1 WHERE id = ?2",
            params![Utc::now().to_rfc3339(), id],
        )?;
        if updated == 0 {
            return Err(MatchEngineError::NotFound(id));
        }
        Ok(())
    }

    /// Get directory statistics
    pub async fn stats(&self) -> Result<DirectoryStats> {
        let conn = self.lock()?;

        let (total_ngos, active_ngos, total_capacity): (u64, u64, u64) = conn.query_row(
            "SELECT COUNT(*),
                    COALESCE(SUM(is_active), 0),
                    COALESCE(SUM(CASE WHEN is_active = 1 THEN capacity ELSE 0 END), 0)
             FROM ngos",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;

        let located_ngos: u64 = conn.query_row(
            "SELECT COUNT(*) FROM ngo_locations l JOIN ngos n ON n.id = l.ngo_id WHERE n.is_active = 1",
            [],
            |row| row.get(0),
        )?;

        Ok(DirectoryStats {
            total_ngos,
            active_ngos,
            located_ngos,
            total_capacity,
        })
    }
}

fn upsert_location(conn: &Connection, id: i64, location: &GeoLocation, now: &str) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO ngo_locations (ngo_id, latitude, longitude, address, city, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            id,
            location.latitude,
            location.longitude,
            location.address,
            location.city,
            now,
        ],
    )?;
    Ok(())
}

fn row_to_candidate(row: &Row<'_>) -> rusqlite::Result<NgoCandidate> {
    let latitude: Option<f64> = row.get(5)?;
    let longitude: Option<f64> = row.get(6)?;

    let location = match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => Some(GeoLocation {
            latitude,
            longitude,
            address: row.get::<_, Option<String>>(7)?.unwrap_or_default(),
            city: row.get::<_, Option<String>>(8)?.unwrap_or_default(),
        }),
        _ => None,
    };

    Ok(NgoCandidate {
        id: row.get(0)?,
        name: row.get(1)?,
        organization: row.get(2)?,
        capacity: row.get(3)?,
        location,
        specialization: row.get(4)?,
    })
}

#[async_trait]
impl CandidateProvider for SqliteDirectory {
    async fn get_candidates(&self, min_capacity: u32) -> Result<Vec<NgoCandidate>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT {} FROM ngos n
             LEFT JOIN ngo_locations l ON l.ngo_id = n.id
             WHERE n.is_active = 1 AND n.capacity >= ?
             ORDER BY n.capacity DESC, n.id ASC",
            CANDIDATE_COLUMNS
        );

        let mut stmt = conn.prepare(&sql)?;
        let candidates = stmt
            .query_map(params![min_capacity], row_to_candidate)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(candidates)
    }

    fn name(&self) -> &str {
        "sqlite"
    }
}
