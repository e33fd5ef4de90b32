use crate::sqlite_column;
use crate::sqlite_persistence::{
    Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema, DEFAULT_TIMESTAMP,
};

/// V 0
const USER_TABLE_V_0: Table = Table {
    name: "user",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("display_name", &SqlType::Text, non_null = true),
        sqlite_column!(
            "created_at",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        sqlite_column!(
            "updated_at",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[],
    unique_constraints: &[],
};

const ACCOUNT_TABLE_V_0: Table = Table {
    name: "account",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("external_user_id", &SqlType::Text, non_null = true),
        sqlite_column!("display_name", &SqlType::Text),
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "user",
                foreign_column: "id",
                on_delete: ForeignKeyOnChange::Cascade,
            })
        ),
        sqlite_column!("account_type", &SqlType::Text),
        sqlite_column!("access_token", &SqlType::Text, non_null = true),
        sqlite_column!("refresh_token", &SqlType::Text, non_null = true),
        sqlite_column!("token_expires_at", &SqlType::Text, non_null = true),
        sqlite_column!("scope", &SqlType::Text),
        sqlite_column!(
            "created_at",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        sqlite_column!(
            "updated_at",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[("idx_account_user_id", "user_id")],
    unique_constraints: &[&["external_user_id"]],
};

const TRACK_TABLE_V_0: Table = Table {
    name: "track",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("external_track_id", &SqlType::Text, non_null = true),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("artist", &SqlType::Text, non_null = true),
        sqlite_column!("album", &SqlType::Text, non_null = true),
        sqlite_column!("duration_ms", &SqlType::Integer, non_null = true),
        sqlite_column!(
            "created_at",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        sqlite_column!(
            "updated_at",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[],
    unique_constraints: &[&["external_track_id"]],
};

const PLAYLIST_TABLE_V_0: Table = Table {
    name: "playlist",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("external_playlist_id", &SqlType::Text, non_null = true),
        sqlite_column!(
            "account_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "account",
                foreign_column: "id",
                on_delete: ForeignKeyOnChange::Cascade,
            })
        ),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("description", &SqlType::Text),
        sqlite_column!(
            "is_public",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "created_at",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        sqlite_column!(
            "updated_at",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[("idx_playlist_account_id", "account_id")],
    unique_constraints: &[],
};

// Duplicate (playlist_id, track_id) pairs are legal, so no unique constraint
// on the pair. Traversal order is resolved at query time.
const PLAYLIST_ENTRY_TABLE_V_0: Table = Table {
    name: "playlist_entry",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "playlist_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "playlist",
                foreign_column: "id",
                on_delete: ForeignKeyOnChange::Cascade,
            })
        ),
        sqlite_column!(
            "track_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "track",
                foreign_column: "id",
                on_delete: ForeignKeyOnChange::Cascade,
            })
        ),
        sqlite_column!("added_at", &SqlType::Text, non_null = true),
        sqlite_column!("position", &SqlType::Integer),
        sqlite_column!(
            "created_at",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[
        ("idx_playlist_entry_playlist_id", "playlist_id"),
        ("idx_playlist_entry_track_id", "track_id"),
    ],
    unique_constraints: &[],
};

const LISTENING_EVENT_TABLE_V_0: Table = Table {
    name: "listening_event",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "account_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "account",
                foreign_column: "id",
                on_delete: ForeignKeyOnChange::Cascade,
            })
        ),
        sqlite_column!(
            "track_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "track",
                foreign_column: "id",
                on_delete: ForeignKeyOnChange::Cascade,
            })
        ),
        sqlite_column!("listened_at", &SqlType::Text, non_null = true),
        sqlite_column!("duration_played_ms", &SqlType::Integer, non_null = true),
        sqlite_column!(
            "created_at",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[
        ("idx_listening_event_account_id", "account_id"),
        ("idx_listening_event_track_id", "track_id"),
        ("idx_listening_event_listened_at", "listened_at"),
    ],
    unique_constraints: &[],
};

const DEVICE_TABLE_V_0: Table = Table {
    name: "device",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("external_device_id", &SqlType::Text, non_null = true),
        sqlite_column!(
            "account_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "account",
                foreign_column: "id",
                on_delete: ForeignKeyOnChange::Cascade,
            })
        ),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("device_type", &SqlType::Text, non_null = true),
        sqlite_column!(
            "is_active",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!("volume_percent", &SqlType::Integer),
        sqlite_column!(
            "created_at",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        sqlite_column!(
            "updated_at",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[("idx_device_account_id", "account_id")],
    unique_constraints: &[],
};

// The account_id unique constraint is what limits an account to one
// subscription; it doubles as the lookup index.
const SUBSCRIPTION_TABLE_V_0: Table = Table {
    name: "subscription",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "account_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "account",
                foreign_column: "id",
                on_delete: ForeignKeyOnChange::Cascade,
            })
        ),
        sqlite_column!("plan_name", &SqlType::Text, non_null = true),
        sqlite_column!("product_type", &SqlType::Text, non_null = true),
        sqlite_column!("currency", &SqlType::Text),
        sqlite_column!("next_billing_amount", &SqlType::Real),
        sqlite_column!("billing_date", &SqlType::Text),
        sqlite_column!(
            "created_at",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        sqlite_column!(
            "updated_at",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[],
    unique_constraints: &[&["account_id"]],
};

const AUTOMATION_RULE_TABLE_V_0: Table = Table {
    name: "automation_rule",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "account_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "account",
                foreign_column: "id",
                on_delete: ForeignKeyOnChange::Cascade,
            })
        ),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("rule_type", &SqlType::Text, non_null = true),
        sqlite_column!("criteria", &SqlType::Text, non_null = true),
        sqlite_column!(
            "is_active",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("1")
        ),
        sqlite_column!("last_executed_at", &SqlType::Text),
        sqlite_column!(
            "created_at",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        sqlite_column!(
            "updated_at",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[("idx_automation_rule_account_id", "account_id")],
    unique_constraints: &[],
};

const SETTING_TABLE_V_0: Table = Table {
    name: "setting",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("value", &SqlType::Text, non_null = true),
        sqlite_column!("description", &SqlType::Text),
        sqlite_column!(
            "created_at",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        sqlite_column!(
            "updated_at",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[],
    unique_constraints: &[&["name"]],
};

pub const LIBRARY_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[
        USER_TABLE_V_0,
        ACCOUNT_TABLE_V_0,
        TRACK_TABLE_V_0,
        PLAYLIST_TABLE_V_0,
        PLAYLIST_ENTRY_TABLE_V_0,
        LISTENING_EVENT_TABLE_V_0,
        DEVICE_TABLE_V_0,
        SUBSCRIPTION_TABLE_V_0,
        AUTOMATION_RULE_TABLE_V_0,
        SETTING_TABLE_V_0,
    ],
    migration: None,
}];
