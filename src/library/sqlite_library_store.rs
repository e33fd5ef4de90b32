use super::models::*;
use super::schema::LIBRARY_VERSIONED_SCHEMAS;
use super::views;
use super::{LibraryStore, StoreError};
use crate::sqlite_persistence::BASE_DB_VERSION;
use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::info;

const TOUCH_UPDATED_AT: &str = "updated_at = cast(strftime('%s','now') as int)";

/// SQLite-backed library store. One write connection and one read connection
/// over the same WAL-mode file, each serialized behind a mutex, so readers
/// are not blocked while a mutation commits.
#[derive(Clone)]
pub struct SqliteLibraryStore {
    read_conn: Arc<Mutex<Connection>>,
    write_conn: Arc<Mutex<Connection>>,
}

impl SqliteLibraryStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref();
        let write_conn = if db_path.exists() {
            Connection::open_with_flags(
                db_path,
                rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                    | rusqlite::OpenFlags::SQLITE_OPEN_URI
                    | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
            .context("Failed to open library database")?
        } else {
            let conn = Connection::open(db_path).context("Failed to create library database")?;
            LIBRARY_VERSIONED_SCHEMAS
                .last()
                .context("No library schema versions declared")?
                .create(&conn)?;
            conn
        };

        // Cascading deletes hang off the FK declarations, and SQLite only
        // enforces them when the pragma is set on the live connection.
        write_conn.execute("PRAGMA foreign_keys = ON;", [])?;
        write_conn
            .pragma_update(None, "journal_mode", "WAL")
            .context("Failed to set WAL mode on library write connection")?;

        let db_version = write_conn
            .query_row("PRAGMA user_version;", [], |row| row.get::<usize, i64>(0))
            .context("Failed to read library database version")?
            - BASE_DB_VERSION as i64;
        if db_version < 0 {
            bail!(
                "Library database predates versioned schemas (user_version below {})",
                BASE_DB_VERSION
            );
        }
        let version = db_version as usize;
        if version >= LIBRARY_VERSIONED_SCHEMAS.len() {
            bail!("Library database version {} is too new", version);
        }
        LIBRARY_VERSIONED_SCHEMAS[version].validate(&write_conn)?;
        Self::migrate_if_needed(&write_conn, version)?;

        let read_conn = Connection::open_with_flags(
            db_path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY
                | rusqlite::OpenFlags::SQLITE_OPEN_URI
                | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .context("Failed to open library database for reading")?;
        read_conn
            .pragma_update(None, "journal_mode", "WAL")
            .context("Failed to set WAL mode on library read connection")?;

        Ok(Self {
            read_conn: Arc::new(Mutex::new(read_conn)),
            write_conn: Arc::new(Mutex::new(write_conn)),
        })
    }

    fn migrate_if_needed(conn: &Connection, version: usize) -> Result<()> {
        let mut latest_from = version;
        for schema in LIBRARY_VERSIONED_SCHEMAS.iter().skip(version + 1) {
            if let Some(migration_fn) = schema.migration {
                info!(
                    "Migrating library db from version {} to {}",
                    latest_from, schema.version
                );
                migration_fn(conn)?;
                latest_from = schema.version;
            }
        }
        conn.execute(
            &format!("PRAGMA user_version = {}", BASE_DB_VERSION + latest_from),
            [],
        )?;
        Ok(())
    }
}

pub(super) fn row_to_user(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        display_name: row.get(1)?,
        created_at: row.get(2)?,
        updated_at: row.get(3)?,
    })
}

pub(super) fn row_to_account(row: &Row) -> rusqlite::Result<Account> {
    Ok(Account {
        id: row.get(0)?,
        external_user_id: row.get(1)?,
        display_name: row.get(2)?,
        user_id: row.get(3)?,
        account_type: row.get(4)?,
        access_token: row.get(5)?,
        refresh_token: row.get(6)?,
        token_expires_at: row.get(7)?,
        scope: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

pub(super) fn row_to_track(row: &Row) -> rusqlite::Result<Track> {
    Ok(Track {
        id: row.get(0)?,
        external_track_id: row.get(1)?,
        name: row.get(2)?,
        artist: row.get(3)?,
        album: row.get(4)?,
        duration_ms: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

pub(super) fn row_to_playlist(row: &Row) -> rusqlite::Result<Playlist> {
    Ok(Playlist {
        id: row.get(0)?,
        external_playlist_id: row.get(1)?,
        account_id: row.get(2)?,
        name: row.get(3)?,
        description: row.get(4)?,
        is_public: row.get::<_, i64>(5)? != 0,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

pub(super) fn row_to_playlist_entry(row: &Row) -> rusqlite::Result<PlaylistEntry> {
    Ok(PlaylistEntry {
        id: row.get(0)?,
        playlist_id: row.get(1)?,
        track_id: row.get(2)?,
        added_at: row.get(3)?,
        position: row.get(4)?,
        created_at: row.get(5)?,
    })
}

pub(super) fn row_to_listening_event(row: &Row) -> rusqlite::Result<ListeningEvent> {
    Ok(ListeningEvent {
        id: row.get(0)?,
        account_id: row.get(1)?,
        track_id: row.get(2)?,
        listened_at: row.get(3)?,
        duration_played_ms: row.get(4)?,
        created_at: row.get(5)?,
    })
}

pub(super) fn row_to_device(row: &Row) -> rusqlite::Result<Device> {
    Ok(Device {
        id: row.get(0)?,
        external_device_id: row.get(1)?,
        account_id: row.get(2)?,
        name: row.get(3)?,
        device_type: row.get(4)?,
        is_active: row.get::<_, i64>(5)? != 0,
        volume_percent: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

pub(super) fn row_to_subscription(row: &Row) -> rusqlite::Result<Subscription> {
    Ok(Subscription {
        id: row.get(0)?,
        account_id: row.get(1)?,
        plan_name: row.get(2)?,
        product_type: row.get(3)?,
        currency: row.get(4)?,
        next_billing_amount: row.get(5)?,
        billing_date: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

pub(super) fn row_to_rule(row: &Row) -> rusqlite::Result<AutomationRule> {
    let rule_type_raw: String = row.get(3)?;
    let rule_type = RuleType::parse(&rule_type_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            format!("unknown rule type '{}'", rule_type_raw).into(),
        )
    })?;
    let criteria_raw: String = row.get(4)?;
    let criteria = serde_json::from_str(&criteria_raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            rusqlite::types::Type::Text,
            format!("criteria is not valid JSON: {}", e).into(),
        )
    })?;
    Ok(AutomationRule {
        id: row.get(0)?,
        account_id: row.get(1)?,
        name: row.get(2)?,
        rule_type,
        criteria,
        is_active: row.get::<_, i64>(5)? != 0,
        last_executed_at: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

pub(super) fn row_to_setting(row: &Row) -> rusqlite::Result<Setting> {
    Ok(Setting {
        id: row.get(0)?,
        name: row.get(1)?,
        value: row.get(2)?,
        description: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

const USER_SELECT: &str = "SELECT id, display_name, created_at, updated_at FROM user";
const ACCOUNT_SELECT: &str = "SELECT id, external_user_id, display_name, user_id, account_type, \
     access_token, refresh_token, token_expires_at, scope, created_at, updated_at FROM account";
const TRACK_SELECT: &str =
    "SELECT id, external_track_id, name, artist, album, duration_ms, created_at, updated_at FROM track";
const PLAYLIST_SELECT: &str = "SELECT id, external_playlist_id, account_id, name, description, \
     is_public, created_at, updated_at FROM playlist";
const PLAYLIST_ENTRY_SELECT: &str =
    "SELECT id, playlist_id, track_id, added_at, position, created_at FROM playlist_entry";
const LISTENING_EVENT_SELECT: &str =
    "SELECT id, account_id, track_id, listened_at, duration_played_ms, created_at FROM listening_event";
const DEVICE_SELECT: &str = "SELECT id, external_device_id, account_id, name, device_type, \
     is_active, volume_percent, created_at, updated_at FROM device";
const SUBSCRIPTION_SELECT: &str = "SELECT id, account_id, plan_name, product_type, currency, \
     next_billing_amount, billing_date, created_at, updated_at FROM subscription";
const RULE_SELECT: &str = "SELECT id, account_id, name, rule_type, criteria, is_active, \
     last_executed_at, created_at, updated_at FROM automation_rule";
const SETTING_SELECT: &str =
    "SELECT id, name, value, description, created_at, updated_at FROM setting";

fn fetch_user(conn: &Connection, id: i64) -> Result<User, StoreError> {
    conn.query_row(
        &format!("{} WHERE id = ?1", USER_SELECT),
        params![id],
        row_to_user,
    )
    .optional()?
    .ok_or_else(|| StoreError::not_found("user", id))
}

fn fetch_account(conn: &Connection, id: i64) -> Result<Account, StoreError> {
    conn.query_row(
        &format!("{} WHERE id = ?1", ACCOUNT_SELECT),
        params![id],
        row_to_account,
    )
    .optional()?
    .ok_or_else(|| StoreError::not_found("account", id))
}

fn fetch_track(conn: &Connection, id: i64) -> Result<Track, StoreError> {
    conn.query_row(
        &format!("{} WHERE id = ?1", TRACK_SELECT),
        params![id],
        row_to_track,
    )
    .optional()?
    .ok_or_else(|| StoreError::not_found("track", id))
}

fn fetch_playlist(conn: &Connection, id: i64) -> Result<Playlist, StoreError> {
    conn.query_row(
        &format!("{} WHERE id = ?1", PLAYLIST_SELECT),
        params![id],
        row_to_playlist,
    )
    .optional()?
    .ok_or_else(|| StoreError::not_found("playlist", id))
}

fn fetch_listening_event(conn: &Connection, id: i64) -> Result<ListeningEvent, StoreError> {
    conn.query_row(
        &format!("{} WHERE id = ?1", LISTENING_EVENT_SELECT),
        params![id],
        row_to_listening_event,
    )
    .optional()?
    .ok_or_else(|| StoreError::not_found("listening event", id))
}

fn fetch_device(conn: &Connection, id: i64) -> Result<Device, StoreError> {
    conn.query_row(
        &format!("{} WHERE id = ?1", DEVICE_SELECT),
        params![id],
        row_to_device,
    )
    .optional()?
    .ok_or_else(|| StoreError::not_found("device", id))
}

fn fetch_subscription(conn: &Connection, id: i64) -> Result<Subscription, StoreError> {
    conn.query_row(
        &format!("{} WHERE id = ?1", SUBSCRIPTION_SELECT),
        params![id],
        row_to_subscription,
    )
    .optional()?
    .ok_or_else(|| StoreError::not_found("subscription", id))
}

fn fetch_rule(conn: &Connection, id: i64) -> Result<AutomationRule, StoreError> {
    conn.query_row(
        &format!("{} WHERE id = ?1", RULE_SELECT),
        params![id],
        row_to_rule,
    )
    .optional()?
    .ok_or_else(|| StoreError::not_found("automation rule", id))
}

fn fetch_setting(conn: &Connection, name: &str) -> Result<Setting, StoreError> {
    conn.query_row(
        &format!("{} WHERE name = ?1", SETTING_SELECT),
        params![name],
        row_to_setting,
    )
    .optional()?
    .ok_or_else(|| StoreError::not_found("setting", name))
}

pub(super) fn ensure_playlist_exists(conn: &Connection, id: i64) -> Result<(), StoreError> {
    conn.query_row("SELECT 1 FROM playlist WHERE id = ?1", params![id], |_| {
        Ok(())
    })
    .optional()?
    .ok_or_else(|| StoreError::not_found("playlist", id))
}

impl LibraryStore for SqliteLibraryStore {
    fn create_user(&self, input: NewUser) -> Result<User, StoreError> {
        input.validate()?;
        let conn = self.write_conn.lock().unwrap();
        conn.execute(
            "INSERT INTO user (display_name) VALUES (?1)",
            params![input.display_name],
        )?;
        fetch_user(&conn, conn.last_insert_rowid())
    }

    fn get_user(&self, id: i64) -> Result<User, StoreError> {
        let conn = self.read_conn.lock().unwrap();
        fetch_user(&conn, id)
    }

    fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let conn = self.read_conn.lock().unwrap();
        views::query_rows(&conn, &format!("{} ORDER BY id", USER_SELECT), params![], row_to_user)
    }

    fn update_user(&self, id: i64, patch: UserPatch) -> Result<User, StoreError> {
        let conn = self.write_conn.lock().unwrap();
        let changed = conn.execute(
            &format!(
                "UPDATE user SET display_name = COALESCE(?1, display_name), {} WHERE id = ?2",
                TOUCH_UPDATED_AT
            ),
            params![patch.display_name, id],
        )?;
        if changed == 0 {
            return Err(StoreError::not_found("user", id));
        }
        fetch_user(&conn, id)
    }

    fn delete_user(&self, id: i64) -> Result<(), StoreError> {
        let conn = self.write_conn.lock().unwrap();
        let changed = conn.execute("DELETE FROM user WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(StoreError::not_found("user", id));
        }
        Ok(())
    }

    fn create_account(&self, input: NewAccount) -> Result<Account, StoreError> {
        input.validate()?;
        let token_expires_at = normalize_instant(&input.token_expires_at)?;
        let conn = self.write_conn.lock().unwrap();
        conn.execute(
            "INSERT INTO account (external_user_id, display_name, user_id, account_type, \
             access_token, refresh_token, token_expires_at, scope) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                input.external_user_id,
                input.display_name,
                input.user_id,
                input.account_type,
                input.access_token,
                input.refresh_token,
                token_expires_at,
                input.scope,
            ],
        )?;
        fetch_account(&conn, conn.last_insert_rowid())
    }

    fn get_account(&self, id: i64) -> Result<Account, StoreError> {
        let conn = self.read_conn.lock().unwrap();
        fetch_account(&conn, id)
    }

    fn list_accounts(&self, user_id: Option<i64>) -> Result<Vec<AccountWithOwner>, StoreError> {
        let conn = self.read_conn.lock().unwrap();
        views::accounts_with_owner(&conn, user_id)
    }

    fn update_account(&self, id: i64, patch: AccountPatch) -> Result<Account, StoreError> {
        let token_expires_at = patch
            .token_expires_at
            .as_deref()
            .map(normalize_instant)
            .transpose()?;
        let conn = self.write_conn.lock().unwrap();
        let changed = conn.execute(
            &format!(
                "UPDATE account SET \
                 display_name = COALESCE(?1, display_name), \
                 account_type = COALESCE(?2, account_type), \
                 access_token = COALESCE(?3, access_token), \
                 refresh_token = COALESCE(?4, refresh_token), \
                 token_expires_at = COALESCE(?5, token_expires_at), \
                 scope = COALESCE(?6, scope), {} WHERE id = ?7",
                TOUCH_UPDATED_AT
            ),
            params![
                patch.display_name,
                patch.account_type,
                patch.access_token,
                patch.refresh_token,
                token_expires_at,
                patch.scope,
                id,
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::not_found("account", id));
        }
        fetch_account(&conn, id)
    }

    fn delete_account(&self, id: i64) -> Result<(), StoreError> {
        let conn = self.write_conn.lock().unwrap();
        let changed = conn.execute("DELETE FROM account WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(StoreError::not_found("account", id));
        }
        Ok(())
    }

    fn create_track(&self, input: NewTrack) -> Result<Track, StoreError> {
        input.validate()?;
        let conn = self.write_conn.lock().unwrap();
        conn.execute(
            "INSERT INTO track (external_track_id, name, artist, album, duration_ms) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                input.external_track_id,
                input.name,
                input.artist,
                input.album,
                input.duration_ms,
            ],
        )?;
        fetch_track(&conn, conn.last_insert_rowid())
    }

    fn get_track(&self, id: i64) -> Result<Track, StoreError> {
        let conn = self.read_conn.lock().unwrap();
        fetch_track(&conn, id)
    }

    fn list_tracks(&self) -> Result<Vec<Track>, StoreError> {
        let conn = self.read_conn.lock().unwrap();
        views::query_rows(
            &conn,
            &format!("{} ORDER BY id", TRACK_SELECT),
            params![],
            row_to_track,
        )
    }

    fn update_track(&self, id: i64, patch: TrackPatch) -> Result<Track, StoreError> {
        patch.validate()?;
        let conn = self.write_conn.lock().unwrap();
        let changed = conn.execute(
            &format!(
                "UPDATE track SET \
                 name = COALESCE(?1, name), \
                 artist = COALESCE(?2, artist), \
                 album = COALESCE(?3, album), \
                 duration_ms = COALESCE(?4, duration_ms), {} WHERE id = ?5",
                TOUCH_UPDATED_AT
            ),
            params![patch.name, patch.artist, patch.album, patch.duration_ms, id],
        )?;
        if changed == 0 {
            return Err(StoreError::not_found("track", id));
        }
        fetch_track(&conn, id)
    }

    fn delete_track(&self, id: i64) -> Result<(), StoreError> {
        let conn = self.write_conn.lock().unwrap();
        let changed = conn.execute("DELETE FROM track WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(StoreError::not_found("track", id));
        }
        Ok(())
    }

    fn create_playlist(&self, input: NewPlaylist) -> Result<Playlist, StoreError> {
        input.validate()?;
        let conn = self.write_conn.lock().unwrap();
        conn.execute(
            "INSERT INTO playlist (external_playlist_id, account_id, name, description, is_public) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                input.external_playlist_id,
                input.account_id,
                input.name,
                input.description,
                input.is_public as i64,
            ],
        )?;
        fetch_playlist(&conn, conn.last_insert_rowid())
    }

    fn get_playlist(&self, id: i64) -> Result<Playlist, StoreError> {
        let conn = self.read_conn.lock().unwrap();
        fetch_playlist(&conn, id)
    }

    fn list_playlists(
        &self,
        account_id: Option<i64>,
    ) -> Result<Vec<PlaylistWithStats>, StoreError> {
        let conn = self.read_conn.lock().unwrap();
        views::playlists_with_stats(&conn, account_id)
    }

    fn update_playlist(&self, id: i64, patch: PlaylistPatch) -> Result<Playlist, StoreError> {
        let conn = self.write_conn.lock().unwrap();
        let changed = conn.execute(
            &format!(
                "UPDATE playlist SET \
                 name = COALESCE(?1, name), \
                 description = COALESCE(?2, description), \
                 is_public = COALESCE(?3, is_public), {} WHERE id = ?4",
                TOUCH_UPDATED_AT
            ),
            params![
                patch.name,
                patch.description,
                patch.is_public.map(|v| v as i64),
                id,
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::not_found("playlist", id));
        }
        fetch_playlist(&conn, id)
    }

    fn delete_playlist(&self, id: i64) -> Result<(), StoreError> {
        let conn = self.write_conn.lock().unwrap();
        let changed = conn.execute("DELETE FROM playlist WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(StoreError::not_found("playlist", id));
        }
        Ok(())
    }

    fn add_playlist_track(
        &self,
        playlist_id: i64,
        input: NewPlaylistEntry,
    ) -> Result<PlaylistEntry, StoreError> {
        let added_at = match input.added_at.as_deref() {
            Some(value) => normalize_instant(value)?,
            None => now_instant(),
        };
        let conn = self.write_conn.lock().unwrap();
        conn.execute(
            "INSERT INTO playlist_entry (playlist_id, track_id, added_at, position) \
             VALUES (?1, ?2, ?3, ?4)",
            params![playlist_id, input.track_id, added_at, input.position],
        )?;
        let id = conn.last_insert_rowid();
        conn.query_row(
            &format!("{} WHERE id = ?1", PLAYLIST_ENTRY_SELECT),
            params![id],
            row_to_playlist_entry,
        )
        .map_err(StoreError::from)
    }

    fn remove_playlist_track(
        &self,
        playlist_id: i64,
        track_id: i64,
    ) -> Result<usize, StoreError> {
        let conn = self.write_conn.lock().unwrap();
        let removed = conn.execute(
            "DELETE FROM playlist_entry WHERE playlist_id = ?1 AND track_id = ?2",
            params![playlist_id, track_id],
        )?;
        if removed == 0 {
            return Err(StoreError::not_found(
                "playlist entry",
                format!("playlist {} track {}", playlist_id, track_id),
            ));
        }
        Ok(removed)
    }

    fn list_playlist_tracks(
        &self,
        playlist_id: i64,
    ) -> Result<Vec<PlaylistTrackRow>, StoreError> {
        let conn = self.read_conn.lock().unwrap();
        ensure_playlist_exists(&conn, playlist_id)?;
        views::playlist_tracks(&conn, playlist_id)
    }

    fn create_listening_event(
        &self,
        input: NewListeningEvent,
    ) -> Result<ListeningEvent, StoreError> {
        input.validate()?;
        let listened_at = normalize_instant(&input.listened_at)?;
        let conn = self.write_conn.lock().unwrap();
        conn.execute(
            "INSERT INTO listening_event (account_id, track_id, listened_at, duration_played_ms) \
             VALUES (?1, ?2, ?3, ?4)",
            params![
                input.account_id,
                input.track_id,
                listened_at,
                input.duration_played_ms,
            ],
        )?;
        fetch_listening_event(&conn, conn.last_insert_rowid())
    }

    fn get_listening_event(&self, id: i64) -> Result<ListeningEvent, StoreError> {
        let conn = self.read_conn.lock().unwrap();
        fetch_listening_event(&conn, id)
    }

    fn update_listening_event(
        &self,
        id: i64,
        patch: ListeningEventPatch,
    ) -> Result<ListeningEvent, StoreError> {
        patch.validate()?;
        let listened_at = patch
            .listened_at
            .as_deref()
            .map(normalize_instant)
            .transpose()?;
        let conn = self.write_conn.lock().unwrap();
        let changed = conn.execute(
            "UPDATE listening_event SET \
             listened_at = COALESCE(?1, listened_at), \
             duration_played_ms = COALESCE(?2, duration_played_ms) WHERE id = ?3",
            params![listened_at, patch.duration_played_ms, id],
        )?;
        if changed == 0 {
            return Err(StoreError::not_found("listening event", id));
        }
        fetch_listening_event(&conn, id)
    }

    fn delete_listening_event(&self, id: i64) -> Result<(), StoreError> {
        let conn = self.write_conn.lock().unwrap();
        let changed = conn.execute("DELETE FROM listening_event WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(StoreError::not_found("listening event", id));
        }
        Ok(())
    }

    fn create_device(&self, input: NewDevice) -> Result<Device, StoreError> {
        input.validate()?;
        let conn = self.write_conn.lock().unwrap();
        conn.execute(
            "INSERT INTO device (external_device_id, account_id, name, device_type, is_active, \
             volume_percent) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                input.external_device_id,
                input.account_id,
                input.name,
                input.device_type,
                input.is_active as i64,
                input.volume_percent,
            ],
        )?;
        fetch_device(&conn, conn.last_insert_rowid())
    }

    fn get_device(&self, id: i64) -> Result<Device, StoreError> {
        let conn = self.read_conn.lock().unwrap();
        fetch_device(&conn, id)
    }

    fn list_devices(&self, account_id: Option<i64>) -> Result<Vec<DeviceWithAccount>, StoreError> {
        let conn = self.read_conn.lock().unwrap();
        views::devices_with_account(&conn, account_id)
    }

    fn update_device(&self, id: i64, patch: DevicePatch) -> Result<Device, StoreError> {
        patch.validate()?;
        let conn = self.write_conn.lock().unwrap();
        let changed = conn.execute(
            &format!(
                "UPDATE device SET \
                 name = COALESCE(?1, name), \
                 is_active = COALESCE(?2, is_active), \
                 volume_percent = COALESCE(?3, volume_percent), {} WHERE id = ?4",
                TOUCH_UPDATED_AT
            ),
            params![
                patch.name,
                patch.is_active.map(|v| v as i64),
                patch.volume_percent,
                id,
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::not_found("device", id));
        }
        fetch_device(&conn, id)
    }

    fn delete_device(&self, id: i64) -> Result<(), StoreError> {
        let conn = self.write_conn.lock().unwrap();
        let changed = conn.execute("DELETE FROM device WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(StoreError::not_found("device", id));
        }
        Ok(())
    }

    fn create_subscription(&self, input: NewSubscription) -> Result<Subscription, StoreError> {
        input.validate()?;
        let conn = self.write_conn.lock().unwrap();
        conn.execute(
            "INSERT INTO subscription (account_id, plan_name, product_type, currency, \
             next_billing_amount, billing_date) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                input.account_id,
                input.plan_name,
                input.product_type,
                input.currency,
                input.next_billing_amount,
                input.billing_date,
            ],
        )?;
        fetch_subscription(&conn, conn.last_insert_rowid())
    }

    fn get_subscription(&self, id: i64) -> Result<Subscription, StoreError> {
        let conn = self.read_conn.lock().unwrap();
        fetch_subscription(&conn, id)
    }

    fn list_subscriptions(&self) -> Result<Vec<SubscriptionWithAccount>, StoreError> {
        let conn = self.read_conn.lock().unwrap();
        views::subscriptions_with_account(&conn)
    }

    fn update_subscription(
        &self,
        id: i64,
        patch: SubscriptionPatch,
    ) -> Result<Subscription, StoreError> {
        let conn = self.write_conn.lock().unwrap();
        let changed = conn.execute(
            &format!(
                "UPDATE subscription SET \
                 plan_name = COALESCE(?1, plan_name), \
                 product_type = COALESCE(?2, product_type), \
                 currency = COALESCE(?3, currency), \
                 next_billing_amount = COALESCE(?4, next_billing_amount), \
                 billing_date = COALESCE(?5, billing_date), {} WHERE id = ?6",
                TOUCH_UPDATED_AT
            ),
            params![
                patch.plan_name,
                patch.product_type,
                patch.currency,
                patch.next_billing_amount,
                patch.billing_date,
                id,
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::not_found("subscription", id));
        }
        fetch_subscription(&conn, id)
    }

    fn delete_subscription(&self, id: i64) -> Result<(), StoreError> {
        let conn = self.write_conn.lock().unwrap();
        let changed = conn.execute("DELETE FROM subscription WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(StoreError::not_found("subscription", id));
        }
        Ok(())
    }

    fn create_rule(&self, input: NewAutomationRule) -> Result<AutomationRule, StoreError> {
        input.validate()?;
        let conn = self.write_conn.lock().unwrap();
        conn.execute(
            "INSERT INTO automation_rule (account_id, name, rule_type, criteria, is_active) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                input.account_id,
                input.name,
                input.rule_type.as_str(),
                input.criteria.to_string(),
                input.is_active as i64,
            ],
        )?;
        fetch_rule(&conn, conn.last_insert_rowid())
    }

    fn get_rule(&self, id: i64) -> Result<AutomationRule, StoreError> {
        let conn = self.read_conn.lock().unwrap();
        fetch_rule(&conn, id)
    }

    fn list_rules(&self, account_id: Option<i64>) -> Result<Vec<RuleWithAccount>, StoreError> {
        let conn = self.read_conn.lock().unwrap();
        views::rules_with_account(&conn, account_id)
    }

    fn update_rule(
        &self,
        id: i64,
        patch: AutomationRulePatch,
    ) -> Result<AutomationRule, StoreError> {
        let last_executed_at = patch
            .last_executed_at
            .as_deref()
            .map(normalize_instant)
            .transpose()?;
        let conn = self.write_conn.lock().unwrap();
        let changed = conn.execute(
            &format!(
                "UPDATE automation_rule SET \
                 name = COALESCE(?1, name), \
                 rule_type = COALESCE(?2, rule_type), \
                 criteria = COALESCE(?3, criteria), \
                 is_active = COALESCE(?4, is_active), \
                 last_executed_at = COALESCE(?5, last_executed_at), {} WHERE id = ?6",
                TOUCH_UPDATED_AT
            ),
            params![
                patch.name,
                patch.rule_type.map(|v| v.as_str()),
                patch.criteria.map(|v| v.to_string()),
                patch.is_active.map(|v| v as i64),
                last_executed_at,
                id,
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::not_found("automation rule", id));
        }
        fetch_rule(&conn, id)
    }

    fn delete_rule(&self, id: i64) -> Result<(), StoreError> {
        let conn = self.write_conn.lock().unwrap();
        let changed = conn.execute("DELETE FROM automation_rule WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(StoreError::not_found("automation rule", id));
        }
        Ok(())
    }

    fn list_settings(&self) -> Result<Vec<Setting>, StoreError> {
        let conn = self.read_conn.lock().unwrap();
        views::query_rows(
            &conn,
            &format!("{} ORDER BY name", SETTING_SELECT),
            params![],
            row_to_setting,
        )
    }

    fn get_setting(&self, name: &str) -> Result<Setting, StoreError> {
        let conn = self.read_conn.lock().unwrap();
        fetch_setting(&conn, name)
    }

    fn create_setting(&self, input: NewSetting) -> Result<Setting, StoreError> {
        input.validate()?;
        let conn = self.write_conn.lock().unwrap();
        conn.execute(
            "INSERT INTO setting (name, value, description) VALUES (?1, ?2, ?3)",
            params![input.name, input.value, input.description],
        )?;
        let id = conn.last_insert_rowid();
        conn.query_row(
            &format!("{} WHERE id = ?1", SETTING_SELECT),
            params![id],
            row_to_setting,
        )
        .map_err(StoreError::from)
    }

    fn update_setting(&self, name: &str, patch: SettingPatch) -> Result<Setting, StoreError> {
        let conn = self.write_conn.lock().unwrap();
        let changed = conn.execute(
            &format!(
                "UPDATE setting SET \
                 value = COALESCE(?1, value), \
                 description = COALESCE(?2, description), {} WHERE name = ?3",
                TOUCH_UPDATED_AT
            ),
            params![patch.value, patch.description, name],
        )?;
        if changed == 0 {
            return Err(StoreError::not_found("setting", name));
        }
        fetch_setting(&conn, name)
    }

    fn delete_setting(&self, name: &str) -> Result<(), StoreError> {
        let conn = self.write_conn.lock().unwrap();
        let changed = conn.execute("DELETE FROM setting WHERE name = ?1", params![name])?;
        if changed == 0 {
            return Err(StoreError::not_found("setting", name));
        }
        Ok(())
    }

    fn dashboard_overview(
        &self,
        user_id: Option<i64>,
    ) -> Result<Vec<AccountOverview>, StoreError> {
        let conn = self.read_conn.lock().unwrap();
        views::dashboard_overview(&conn, user_id)
    }

    fn listening_report(
        &self,
        account_id: Option<i64>,
    ) -> Result<Vec<ListeningReportRow>, StoreError> {
        let conn = self.read_conn.lock().unwrap();
        views::listening_report(&conn, account_id)
    }
}
