//! Demo dataset insertion. Every row is keyed by its natural identity
//! (external id, name, or instant) and only inserted when absent, so seeding
//! an already-seeded database is a no-op.

use tracing::info;

use super::models::*;
use super::{LibraryStore, StoreError};

struct SeedAccount {
    external_user_id: &'static str,
    display_name: &'static str,
    owner_display_name: &'static str,
    account_type: &'static str,
    access_token: &'static str,
    refresh_token: &'static str,
    scope: &'static str,
}

const SEED_USERS: &[&str] = &["John Doe", "Jane Smith"];

const SEED_ACCOUNTS: &[SeedAccount] = &[
    SeedAccount {
        external_user_id: "spotify_user_001",
        display_name: "John Personal",
        owner_display_name: "John Doe",
        account_type: "Premium",
        access_token: "access_token_001",
        refresh_token: "refresh_token_001",
        scope: "user-read-playback-state user-modify-playback-state",
    },
    SeedAccount {
        external_user_id: "spotify_user_002",
        display_name: "John Work",
        owner_display_name: "John Doe",
        account_type: "Premium",
        access_token: "access_token_002",
        refresh_token: "refresh_token_002",
        scope: "user-read-playback-state user-modify-playback-state",
    },
    SeedAccount {
        external_user_id: "spotify_user_003",
        display_name: "Jane Personal",
        owner_display_name: "Jane Smith",
        account_type: "Free",
        access_token: "access_token_003",
        refresh_token: "refresh_token_003",
        scope: "user-read-playback-state",
    },
];

const SEED_TOKEN_EXPIRY: &str = "2024-12-31T23:59:59Z";

// (external id, name, artist, album, duration ms)
const SEED_TRACKS: &[(&str, &str, &str, &str, i64)] = &[
    ("track_001", "Bohemian Rhapsody", "Queen", "A Night at the Opera", 354_000),
    ("track_002", "Imagine", "John Lennon", "Imagine", 183_000),
    ("track_003", "Billie Jean", "Michael Jackson", "Thriller", 294_000),
    ("track_004", "Hotel California", "Eagles", "Hotel California", 391_000),
    ("track_005", "Stairway to Heaven", "Led Zeppelin", "Led Zeppelin IV", 482_000),
];

// (external id, owning account external id, name, description, public)
const SEED_PLAYLISTS: &[(&str, &str, &str, &str, bool)] = &[
    ("playlist_001", "spotify_user_001", "My Favorites", "Personal favorite tracks", true),
    ("playlist_002", "spotify_user_001", "Workout Mix", "High energy workout music", false),
    ("playlist_003", "spotify_user_002", "Focus Music", "Concentration and productivity", true),
    ("playlist_004", "spotify_user_003", "Chill Vibes", "Relaxing evening playlist", true),
];

// (playlist external id, track external id, added at, position)
const SEED_PLAYLIST_ENTRIES: &[(&str, &str, &str, i64)] = &[
    ("playlist_001", "track_001", "2024-01-15T10:30:00Z", 1),
    ("playlist_001", "track_002", "2024-01-15T10:31:00Z", 2),
    ("playlist_001", "track_003", "2024-01-15T10:32:00Z", 3),
    ("playlist_002", "track_003", "2024-01-16T09:00:00Z", 1),
    ("playlist_002", "track_004", "2024-01-16T09:01:00Z", 2),
    ("playlist_003", "track_005", "2024-01-17T14:00:00Z", 1),
];

// (account external id, track external id, listened at, duration played ms)
const SEED_LISTENING_EVENTS: &[(&str, &str, &str, i64)] = &[
    ("spotify_user_001", "track_001", "2024-01-20T15:30:00Z", 354_000),
    ("spotify_user_001", "track_002", "2024-01-20T16:00:00Z", 183_000),
    ("spotify_user_001", "track_003", "2024-01-20T16:15:00Z", 294_000),
    ("spotify_user_002", "track_005", "2024-01-20T10:00:00Z", 482_000),
];

// (external id, account external id, name, type, active, volume)
const SEED_DEVICES: &[(&str, &str, &str, &str, bool, i64)] = &[
    ("device_001", "spotify_user_001", "Johns iPhone", "Smartphone", true, 75),
    ("device_002", "spotify_user_001", "Living Room Speaker", "Speaker", false, 50),
    ("device_003", "spotify_user_002", "MacBook Pro", "Computer", true, 60),
];

/// Inserts the demo library if (and only where) it is not already present.
/// Returns the number of rows actually inserted.
pub fn seed_demo_library(store: &dyn LibraryStore) -> Result<usize, StoreError> {
    let mut inserted = 0;

    let existing_users = store.list_users()?;
    let mut user_id_by_name = |display_name: &str| -> Result<i64, StoreError> {
        if let Some(user) = existing_users.iter().find(|u| u.display_name == display_name) {
            return Ok(user.id);
        }
        let user = store.create_user(NewUser {
            display_name: display_name.to_string(),
        })?;
        inserted += 1;
        Ok(user.id)
    };
    let mut user_ids = Vec::with_capacity(SEED_USERS.len());
    for display_name in SEED_USERS {
        user_ids.push((*display_name, user_id_by_name(display_name)?));
    }

    let existing_accounts = store.list_accounts(None)?;
    let mut account_ids = Vec::with_capacity(SEED_ACCOUNTS.len());
    for seed in SEED_ACCOUNTS {
        let id = match existing_accounts
            .iter()
            .find(|a| a.account.external_user_id == seed.external_user_id)
        {
            Some(existing) => existing.account.id,
            None => {
                let owner_id = user_ids
                    .iter()
                    .find(|(name, _)| *name == seed.owner_display_name)
                    .map(|(_, id)| *id)
                    .ok_or_else(|| {
                        StoreError::validation(format!(
                            "seed account {} references unknown user {}",
                            seed.external_user_id, seed.owner_display_name
                        ))
                    })?;
                let account = store.create_account(NewAccount {
                    external_user_id: seed.external_user_id.to_string(),
                    display_name: Some(seed.display_name.to_string()),
                    user_id: owner_id,
                    account_type: Some(seed.account_type.to_string()),
                    access_token: seed.access_token.to_string(),
                    refresh_token: seed.refresh_token.to_string(),
                    token_expires_at: SEED_TOKEN_EXPIRY.to_string(),
                    scope: Some(seed.scope.to_string()),
                })?;
                inserted += 1;
                account.id
            }
        };
        account_ids.push((seed.external_user_id, id));
    }
    let account_id = |external: &str| -> i64 {
        account_ids
            .iter()
            .find(|(ext, _)| *ext == external)
            .map(|(_, id)| *id)
            .unwrap_or_default()
    };

    let existing_tracks = store.list_tracks()?;
    let mut track_ids = Vec::with_capacity(SEED_TRACKS.len());
    for (external, name, artist, album, duration_ms) in SEED_TRACKS {
        let id = match existing_tracks
            .iter()
            .find(|t| t.external_track_id == *external)
        {
            Some(existing) => existing.id,
            None => {
                let track = store.create_track(NewTrack {
                    external_track_id: external.to_string(),
                    name: name.to_string(),
                    artist: artist.to_string(),
                    album: album.to_string(),
                    duration_ms: *duration_ms,
                })?;
                inserted += 1;
                track.id
            }
        };
        track_ids.push((*external, id));
    }
    let track_id = |external: &str| -> i64 {
        track_ids
            .iter()
            .find(|(ext, _)| *ext == external)
            .map(|(_, id)| *id)
            .unwrap_or_default()
    };

    let existing_playlists = store.list_playlists(None)?;
    let mut playlist_ids = Vec::with_capacity(SEED_PLAYLISTS.len());
    for (external, account_external, name, description, is_public) in SEED_PLAYLISTS {
        let id = match existing_playlists
            .iter()
            .find(|p| p.playlist.external_playlist_id == *external)
        {
            Some(existing) => existing.playlist.id,
            None => {
                let playlist = store.create_playlist(NewPlaylist {
                    external_playlist_id: external.to_string(),
                    account_id: account_id(account_external),
                    name: name.to_string(),
                    description: Some(description.to_string()),
                    is_public: *is_public,
                })?;
                inserted += 1;
                playlist.id
            }
        };
        playlist_ids.push((*external, id));
    }
    let playlist_id = |external: &str| -> i64 {
        playlist_ids
            .iter()
            .find(|(ext, _)| *ext == external)
            .map(|(_, id)| *id)
            .unwrap_or_default()
    };

    for (playlist_external, track_external, added_at, position) in SEED_PLAYLIST_ENTRIES {
        let playlist_id = playlist_id(playlist_external);
        let track_id = track_id(track_external);
        let already_present = store
            .list_playlist_tracks(playlist_id)?
            .iter()
            .any(|row| row.entry.track_id == track_id && row.entry.position == Some(*position));
        if !already_present {
            store.add_playlist_track(
                playlist_id,
                NewPlaylistEntry {
                    track_id,
                    position: Some(*position),
                    added_at: Some(added_at.to_string()),
                },
            )?;
            inserted += 1;
        }
    }

    for (account_external, track_external, listened_at, duration_played_ms) in
        SEED_LISTENING_EVENTS
    {
        let account_id = account_id(account_external);
        let track_id = track_id(track_external);
        let listened_at = normalize_instant(listened_at)?;
        let already_present = store
            .listening_report(Some(account_id))?
            .iter()
            .any(|row| row.event.track_id == track_id && row.event.listened_at == listened_at);
        if !already_present {
            store.create_listening_event(NewListeningEvent {
                account_id,
                track_id,
                listened_at,
                duration_played_ms: *duration_played_ms,
            })?;
            inserted += 1;
        }
    }

    let existing_devices = store.list_devices(None)?;
    for (external, account_external, name, device_type, is_active, volume) in SEED_DEVICES {
        if existing_devices
            .iter()
            .any(|d| d.device.external_device_id == *external)
        {
            continue;
        }
        store.create_device(NewDevice {
            external_device_id: external.to_string(),
            account_id: account_id(account_external),
            name: name.to_string(),
            device_type: device_type.to_string(),
            is_active: *is_active,
            volume_percent: Some(*volume),
        })?;
        inserted += 1;
    }

    let existing_subscriptions = store.list_subscriptions()?;
    let seed_subscriptions: &[(&str, &str, &str, Option<f64>, Option<&str>)] = &[
        ("spotify_user_001", "Premium Individual", "Premium", Some(9.99), Some("2024-02-01")),
        ("spotify_user_002", "Premium Individual", "Premium", Some(9.99), Some("2024-02-05")),
        ("spotify_user_003", "Free", "Free", None, None),
    ];
    for (account_external, plan_name, product_type, amount, billing_date) in seed_subscriptions {
        let account_id = account_id(account_external);
        if existing_subscriptions
            .iter()
            .any(|s| s.subscription.account_id == account_id)
        {
            continue;
        }
        store.create_subscription(NewSubscription {
            account_id,
            plan_name: plan_name.to_string(),
            product_type: product_type.to_string(),
            currency: Some("USD".to_string()),
            next_billing_amount: *amount,
            billing_date: billing_date.map(str::to_string),
        })?;
        inserted += 1;
    }

    let seed_rules: &[(&str, &str, RuleType, &str)] = &[
        (
            "spotify_user_001",
            "Auto-add Recent Favorites",
            RuleType::AutoAdd,
            r#"{"condition":"recently_liked","days":7}"#,
        ),
        (
            "spotify_user_001",
            "Sync Work and Personal",
            RuleType::Sync,
            r#"{"sourcePlaylist":"playlist_001","targetPlaylist":"playlist_003"}"#,
        ),
    ];
    let existing_rules = store.list_rules(None)?;
    for (account_external, name, rule_type, criteria) in seed_rules {
        let account_id = account_id(account_external);
        if existing_rules
            .iter()
            .any(|r| r.rule.account_id == account_id && r.rule.name == *name)
        {
            continue;
        }
        let criteria: serde_json::Value = serde_json::from_str(criteria)
            .map_err(|e| StoreError::validation(format!("seed rule criteria: {}", e)))?;
        store.create_rule(NewAutomationRule {
            account_id,
            name: name.to_string(),
            rule_type: *rule_type,
            criteria,
            is_active: true,
        })?;
        inserted += 1;
    }

    info!("Seeded demo library ({} rows inserted)", inserted);
    Ok(inserted)
}
