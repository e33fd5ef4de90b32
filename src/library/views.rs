//! Read-only composite queries over the library tables. Nothing in here
//! mutates state, and "no rows" is always an empty result, never an error.
//!
//! Optional parent filters use the `?1 IS NULL OR …` shape so that the same
//! prepared statement serves both the filtered and the unfiltered listing.

use rusqlite::{params, Connection, Row};

use super::error::StoreError;
use super::models::*;
use super::sqlite_library_store::{
    row_to_account, row_to_device, row_to_listening_event, row_to_playlist,
    row_to_playlist_entry, row_to_rule, row_to_subscription,
};

pub(super) fn query_rows<T, P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
    f: impl FnMut(&Row) -> rusqlite::Result<T>,
) -> Result<Vec<T>, StoreError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, f)?
        .collect::<rusqlite::Result<Vec<T>>>()?;
    Ok(rows)
}

pub(super) fn accounts_with_owner(
    conn: &Connection,
    user_id: Option<i64>,
) -> Result<Vec<AccountWithOwner>, StoreError> {
    query_rows(
        conn,
        "SELECT a.id, a.external_user_id, a.display_name, a.user_id, a.account_type, \
         a.access_token, a.refresh_token, a.token_expires_at, a.scope, a.created_at, \
         a.updated_at, u.display_name \
         FROM account a LEFT JOIN user u ON u.id = a.user_id \
         WHERE ?1 IS NULL OR a.user_id = ?1 \
         ORDER BY a.id",
        params![user_id],
        |row| {
            Ok(AccountWithOwner {
                account: row_to_account(row)?,
                user_display_name: row.get(11)?,
            })
        },
    )
}

/// Each playlist with its owner's display fields and the number of entries.
/// The count is a correlated subquery, so playlists with no entries report 0
/// instead of dropping out of a join.
pub(super) fn playlists_with_stats(
    conn: &Connection,
    account_id: Option<i64>,
) -> Result<Vec<PlaylistWithStats>, StoreError> {
    query_rows(
        conn,
        "SELECT p.id, p.external_playlist_id, p.account_id, p.name, p.description, \
         p.is_public, p.created_at, p.updated_at, a.display_name, a.external_user_id, \
         (SELECT COUNT(*) FROM playlist_entry e WHERE e.playlist_id = p.id) \
         FROM playlist p LEFT JOIN account a ON a.id = p.account_id \
         WHERE ?1 IS NULL OR p.account_id = ?1 \
         ORDER BY p.id",
        params![account_id],
        |row| {
            Ok(PlaylistWithStats {
                playlist: row_to_playlist(row)?,
                account_display_name: row.get(8)?,
                external_user_id: row.get(9)?,
                track_count: row.get(10)?,
            })
        },
    )
}

/// Entries of one playlist joined with track metadata, in traversal order:
/// position ascending with NULLs last, then added_at, then insertion id.
pub(super) fn playlist_tracks(
    conn: &Connection,
    playlist_id: i64,
) -> Result<Vec<PlaylistTrackRow>, StoreError> {
    query_rows(
        conn,
        "SELECT e.id, e.playlist_id, e.track_id, e.added_at, e.position, e.created_at, \
         t.external_track_id, t.name, t.artist, t.album, t.duration_ms \
         FROM playlist_entry e JOIN track t ON t.id = e.track_id \
         WHERE e.playlist_id = ?1 \
         ORDER BY e.position IS NULL, e.position, e.added_at, e.id",
        params![playlist_id],
        |row| {
            Ok(PlaylistTrackRow {
                entry: row_to_playlist_entry(row)?,
                external_track_id: row.get(6)?,
                name: row.get(7)?,
                artist: row.get(8)?,
                album: row.get(9)?,
                duration_ms: row.get(10)?,
            })
        },
    )
}

pub(super) fn devices_with_account(
    conn: &Connection,
    account_id: Option<i64>,
) -> Result<Vec<DeviceWithAccount>, StoreError> {
    query_rows(
        conn,
        "SELECT d.id, d.external_device_id, d.account_id, d.name, d.device_type, \
         d.is_active, d.volume_percent, d.created_at, d.updated_at, a.display_name \
         FROM device d LEFT JOIN account a ON a.id = d.account_id \
         WHERE ?1 IS NULL OR d.account_id = ?1 \
         ORDER BY d.is_active DESC, d.id",
        params![account_id],
        |row| {
            Ok(DeviceWithAccount {
                device: row_to_device(row)?,
                account_display_name: row.get(9)?,
            })
        },
    )
}

pub(super) fn subscriptions_with_account(
    conn: &Connection,
) -> Result<Vec<SubscriptionWithAccount>, StoreError> {
    query_rows(
        conn,
        "SELECT s.id, s.account_id, s.plan_name, s.product_type, s.currency, \
         s.next_billing_amount, s.billing_date, s.created_at, s.updated_at, \
         a.display_name, a.external_user_id \
         FROM subscription s JOIN account a ON a.id = s.account_id \
         ORDER BY s.id",
        params![],
        |row| {
            Ok(SubscriptionWithAccount {
                subscription: row_to_subscription(row)?,
                account_display_name: row.get(9)?,
                external_user_id: row.get(10)?,
            })
        },
    )
}

pub(super) fn rules_with_account(
    conn: &Connection,
    account_id: Option<i64>,
) -> Result<Vec<RuleWithAccount>, StoreError> {
    query_rows(
        conn,
        "SELECT r.id, r.account_id, r.name, r.rule_type, r.criteria, r.is_active, \
         r.last_executed_at, r.created_at, r.updated_at, a.display_name \
         FROM automation_rule r LEFT JOIN account a ON a.id = r.account_id \
         WHERE ?1 IS NULL OR r.account_id = ?1 \
         ORDER BY r.id",
        params![account_id],
        |row| {
            Ok(RuleWithAccount {
                rule: row_to_rule(row)?,
                account_display_name: row.get(9)?,
            })
        },
    )
}

/// One row per account. The playlist count and the most recent listening
/// event are independent correlated subqueries: a plain join-then-group
/// would multiply the count by the number of events and drop accounts with
/// none. Accounts with no playlists or no history still get a row.
pub(super) fn dashboard_overview(
    conn: &Connection,
    user_id: Option<i64>,
) -> Result<Vec<AccountOverview>, StoreError> {
    query_rows(
        conn,
        "SELECT a.id, a.display_name, a.account_type, \
         (SELECT COUNT(DISTINCT p.id) FROM playlist p WHERE p.account_id = a.id), \
         (SELECT t.name FROM listening_event le JOIN track t ON t.id = le.track_id \
          WHERE le.account_id = a.id ORDER BY le.listened_at DESC, le.id DESC LIMIT 1), \
         (SELECT t.artist FROM listening_event le JOIN track t ON t.id = le.track_id \
          WHERE le.account_id = a.id ORDER BY le.listened_at DESC, le.id DESC LIMIT 1), \
         (SELECT le.listened_at FROM listening_event le \
          WHERE le.account_id = a.id ORDER BY le.listened_at DESC, le.id DESC LIMIT 1) \
         FROM account a \
         WHERE ?1 IS NULL OR a.user_id = ?1 \
         ORDER BY a.id",
        params![user_id],
        |row| {
            Ok(AccountOverview {
                account_id: row.get(0)?,
                display_name: row.get(1)?,
                account_type: row.get(2)?,
                playlist_count: row.get(3)?,
                last_listened_track: row.get(4)?,
                last_listened_artist: row.get(5)?,
                last_listened_at: row.get(6)?,
            })
        },
    )
}

/// Full listening history decorated with track and account fields, newest
/// first. Rollups (play count, total duration, top artists) are left to the
/// consumer of this feed.
pub(super) fn listening_report(
    conn: &Connection,
    account_id: Option<i64>,
) -> Result<Vec<ListeningReportRow>, StoreError> {
    query_rows(
        conn,
        "SELECT le.id, le.account_id, le.track_id, le.listened_at, le.duration_played_ms, \
         le.created_at, t.name, t.artist, t.album, a.display_name \
         FROM listening_event le \
         JOIN track t ON t.id = le.track_id \
         JOIN account a ON a.id = le.account_id \
         WHERE ?1 IS NULL OR le.account_id = ?1 \
         ORDER BY le.listened_at DESC, le.id DESC",
        params![account_id],
        |row| {
            Ok(ListeningReportRow {
                event: row_to_listening_event(row)?,
                track_name: row.get(6)?,
                artist: row.get(7)?,
                album: row.get(8)?,
                account_display_name: row.get(9)?,
            })
        },
    )
}
