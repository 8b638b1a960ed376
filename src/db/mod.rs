mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension};
use uuid::Uuid;

use crate::models::dates::{default_date, format_date, parse_date};
use crate::models::*;
use crate::store::{CountryStore, StoreError};

const COUNTRY_COLUMNS: &str =
    "id, code, name, start_date, end_date, presidents, monarchs, created_at, updated_at";

pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> Result<Self> {
        Self::open(default_path()?)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        schema::run_migrations(&conn)
    }

    // ============================================================
    // Country operations
    // ============================================================

    pub fn list_countries(&self) -> Result<Vec<CountrySummary>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, code, name, start_date, end_date FROM countries ORDER BY name, code",
        )?;

        let countries = stmt
            .query_map([], |row| {
                Ok(CountrySummary {
                    id: parse_uuid(row.get::<_, String>(0)?),
                    code: row.get(1)?,
                    name: row.get(2)?,
                    start: parse_day(row.get::<_, String>(3)?),
                    end: row.get::<_, Option<String>>(4)?.map(parse_day),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(countries)
    }

    pub fn get_country(&self, id: Uuid) -> Result<Option<Country>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        load_country(&conn, id)
    }

    pub fn get_country_by_code(&self, code: &str) -> Result<Option<Country>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let row = conn
            .query_row(
                &format!("SELECT {COUNTRY_COLUMNS} FROM countries WHERE code = ?"),
                [code],
                CountryRow::read,
            )
            .optional()?;
        row.map(CountryRow::into_country).transpose()
    }

    pub fn create_country(&self, input: CountryInput) -> Result<Country, StoreError> {
        input.check().map_err(StoreError::Validation)?;

        let conn = self.conn.lock().expect("database lock poisoned");
        ensure_code_free(&conn, &input.code, None)?;

        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO countries (id, code, name, start_date, end_date, presidents, monarchs, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            (
                id.to_string(),
                &input.code,
                &input.name,
                format_date(input.start),
                input.end.map(format_date),
                serde_json::to_string(&input.presidents).map_err(anyhow::Error::from)?,
                serde_json::to_string(&input.monarchs).map_err(anyhow::Error::from)?,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ),
        )
        .map_err(anyhow::Error::from)?;

        tracing::debug!("Created country {} ({})", input.code, id);

        Ok(Country {
            id,
            code: input.code,
            name: input.name,
            start: input.start,
            end: input.end,
            presidents: input.presidents,
            monarchs: input.monarchs,
            created_at: now,
            updated_at: now,
        })
    }

    /// Replace every field of an existing country. Checks and write share one
    /// lock; a row missing at either point is `NotFound`.
    pub fn update_country(&self, id: Uuid, input: CountryInput) -> Result<Country, StoreError> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let Some(existing) = load_country(&conn, id)? else {
            return Err(StoreError::NotFound(id));
        };
        input.check().map_err(StoreError::Validation)?;
        ensure_code_free(&conn, &input.code, Some(id))?;

        let now = Utc::now();
        let rows = conn
            .execute(
                "UPDATE countries SET code = ?, name = ?, start_date = ?, end_date = ?,
                     presidents = ?, monarchs = ?, updated_at = ?
                 WHERE id = ?",
                (
                    &input.code,
                    &input.name,
                    format_date(input.start),
                    input.end.map(format_date),
                    serde_json::to_string(&input.presidents).map_err(anyhow::Error::from)?,
                    serde_json::to_string(&input.monarchs).map_err(anyhow::Error::from)?,
                    now.to_rfc3339(),
                    id.to_string(),
                ),
            )
            .map_err(anyhow::Error::from)?;
        if rows == 0 {
            return Err(StoreError::NotFound(id));
        }

        Ok(Country {
            id,
            code: input.code,
            name: input.name,
            start: input.start,
            end: input.end,
            presidents: input.presidents,
            monarchs: input.monarchs,
            created_at: existing.created_at,
            updated_at: now,
        })
    }

    pub fn delete_country(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM countries WHERE id = ?", [id.to_string()])?;
        Ok(rows > 0)
    }
}

impl CountryStore for Database {
    async fn load(&self, id: Uuid) -> Result<Country, StoreError> {
        self.get_country(id)?.ok_or(StoreError::NotFound(id))
    }

    async fn create(&self, payload: CountryInput) -> Result<Country, StoreError> {
        self.create_country(payload)
    }

    async fn update(&self, id: Uuid, payload: CountryInput) -> Result<Country, StoreError> {
        self.update_country(id, payload)
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

/// `<data dir>/chronicle/chronicle.db` for the current user.
pub fn default_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "chronicle")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    Ok(dirs.data_dir().join("chronicle.db"))
}

fn load_country(conn: &Connection, id: Uuid) -> Result<Option<Country>> {
    let row = conn
        .query_row(
            &format!("SELECT {COUNTRY_COLUMNS} FROM countries WHERE id = ?"),
            [id.to_string()],
            CountryRow::read,
        )
        .optional()?;
    row.map(CountryRow::into_country).transpose()
}

fn ensure_code_free(conn: &Connection, code: &str, own_id: Option<Uuid>) -> Result<(), StoreError> {
    let holder: Option<String> = conn
        .query_row("SELECT id FROM countries WHERE code = ?", [code], |row| {
            row.get(0)
        })
        .optional()
        .map_err(anyhow::Error::from)?;

    match holder {
        Some(holder) if Some(parse_uuid(holder.clone())) != own_id => Err(StoreError::Conflict(
            format!("country code `{code}` is already used by {holder}"),
        )),
        _ => Ok(()),
    }
}

/// Raw column values; JSON decoding happens outside the row callback so that
/// corrupt data is reported rather than replaced.
struct CountryRow {
    id: String,
    code: String,
    name: String,
    start: String,
    end: Option<String>,
    presidents: String,
    monarchs: String,
    created_at: String,
    updated_at: String,
}

impl CountryRow {
    fn read(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            code: row.get(1)?,
            name: row.get(2)?,
            start: row.get(3)?,
            end: row.get(4)?,
            presidents: row.get(5)?,
            monarchs: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }

    fn into_country(self) -> Result<Country> {
        Ok(Country {
            id: parse_uuid(self.id),
            code: self.code,
            name: self.name,
            start: parse_day(self.start),
            end: self.end.map(parse_day),
            presidents: serde_json::from_str(&self.presidents)?,
            monarchs: serde_json::from_str(&self.monarchs)?,
            created_at: parse_datetime(self.created_at),
            updated_at: parse_datetime(self.updated_at),
        })
    }
}

fn parse_uuid(s: String) -> Uuid {
    Uuid::parse_str(&s).unwrap_or_else(|_| Uuid::nil())
}

fn parse_day(s: String) -> NaiveDate {
    parse_date(&s).unwrap_or_else(default_date)
}

fn parse_datetime(s: String) -> chrono::DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
