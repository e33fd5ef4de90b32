mod error;
mod models;
mod schema;
mod seed;
mod sqlite_library_store;
mod views;

pub use error::StoreError;
pub use models::*;
pub use schema::LIBRARY_VERSIONED_SCHEMAS;
pub use seed::seed_demo_library;
pub use sqlite_library_store::SqliteLibraryStore;

/// Durable storage for the linked-accounts library: users, their streaming
/// accounts, and everything hanging off an account. Uniqueness and
/// referential integrity are enforced per operation; deleting a parent
/// cascades through every dependent row atomically.
pub trait LibraryStore: Send + Sync {
    // Users
    fn create_user(&self, input: NewUser) -> Result<User, StoreError>;
    fn get_user(&self, id: i64) -> Result<User, StoreError>;
    fn list_users(&self) -> Result<Vec<User>, StoreError>;
    fn update_user(&self, id: i64, patch: UserPatch) -> Result<User, StoreError>;
    fn delete_user(&self, id: i64) -> Result<(), StoreError>;

    // Accounts
    fn create_account(&self, input: NewAccount) -> Result<Account, StoreError>;
    fn get_account(&self, id: i64) -> Result<Account, StoreError>;
    /// Accounts decorated with the owner's display name, optionally
    /// restricted to one user.
    fn list_accounts(&self, user_id: Option<i64>) -> Result<Vec<AccountWithOwner>, StoreError>;
    fn update_account(&self, id: i64, patch: AccountPatch) -> Result<Account, StoreError>;
    fn delete_account(&self, id: i64) -> Result<(), StoreError>;

    // Tracks
    fn create_track(&self, input: NewTrack) -> Result<Track, StoreError>;
    fn get_track(&self, id: i64) -> Result<Track, StoreError>;
    fn list_tracks(&self) -> Result<Vec<Track>, StoreError>;
    fn update_track(&self, id: i64, patch: TrackPatch) -> Result<Track, StoreError>;
    fn delete_track(&self, id: i64) -> Result<(), StoreError>;

    // Playlists
    fn create_playlist(&self, input: NewPlaylist) -> Result<Playlist, StoreError>;
    fn get_playlist(&self, id: i64) -> Result<Playlist, StoreError>;
    /// Playlists decorated with owner fields and entry counts, optionally
    /// restricted to one account. Empty playlists report a zero count.
    fn list_playlists(&self, account_id: Option<i64>)
        -> Result<Vec<PlaylistWithStats>, StoreError>;
    fn update_playlist(&self, id: i64, patch: PlaylistPatch) -> Result<Playlist, StoreError>;
    fn delete_playlist(&self, id: i64) -> Result<(), StoreError>;

    // Playlist↔track association
    fn add_playlist_track(
        &self,
        playlist_id: i64,
        input: NewPlaylistEntry,
    ) -> Result<PlaylistEntry, StoreError>;
    /// Removes every link between the playlist and the track. Returns how
    /// many were removed; NotFound when there was none.
    fn remove_playlist_track(&self, playlist_id: i64, track_id: i64)
        -> Result<usize, StoreError>;
    /// Entries joined with track metadata, ordered by position (ascending,
    /// absent positions last), then added_at, then insertion id.
    fn list_playlist_tracks(&self, playlist_id: i64)
        -> Result<Vec<PlaylistTrackRow>, StoreError>;

    // Listening events
    fn create_listening_event(
        &self,
        input: NewListeningEvent,
    ) -> Result<ListeningEvent, StoreError>;
    fn get_listening_event(&self, id: i64) -> Result<ListeningEvent, StoreError>;
    fn update_listening_event(
        &self,
        id: i64,
        patch: ListeningEventPatch,
    ) -> Result<ListeningEvent, StoreError>;
    fn delete_listening_event(&self, id: i64) -> Result<(), StoreError>;

    // Devices
    fn create_device(&self, input: NewDevice) -> Result<Device, StoreError>;
    fn get_device(&self, id: i64) -> Result<Device, StoreError>;
    fn list_devices(&self, account_id: Option<i64>) -> Result<Vec<DeviceWithAccount>, StoreError>;
    fn update_device(&self, id: i64, patch: DevicePatch) -> Result<Device, StoreError>;
    fn delete_device(&self, id: i64) -> Result<(), StoreError>;

    // Subscriptions (at most one per account)
    fn create_subscription(&self, input: NewSubscription) -> Result<Subscription, StoreError>;
    fn get_subscription(&self, id: i64) -> Result<Subscription, StoreError>;
    fn list_subscriptions(&self) -> Result<Vec<SubscriptionWithAccount>, StoreError>;
    fn update_subscription(
        &self,
        id: i64,
        patch: SubscriptionPatch,
    ) -> Result<Subscription, StoreError>;
    fn delete_subscription(&self, id: i64) -> Result<(), StoreError>;

    // Automation rules
    fn create_rule(&self, input: NewAutomationRule) -> Result<AutomationRule, StoreError>;
    fn get_rule(&self, id: i64) -> Result<AutomationRule, StoreError>;
    fn list_rules(&self, account_id: Option<i64>) -> Result<Vec<RuleWithAccount>, StoreError>;
    fn update_rule(&self, id: i64, patch: AutomationRulePatch)
        -> Result<AutomationRule, StoreError>;
    fn delete_rule(&self, id: i64) -> Result<(), StoreError>;

    // Settings (keyed by name)
    fn list_settings(&self) -> Result<Vec<Setting>, StoreError>;
    fn get_setting(&self, name: &str) -> Result<Setting, StoreError>;
    fn create_setting(&self, input: NewSetting) -> Result<Setting, StoreError>;
    fn update_setting(&self, name: &str, patch: SettingPatch) -> Result<Setting, StoreError>;
    fn delete_setting(&self, name: &str) -> Result<(), StoreError>;

    // Aggregations
    /// One row per account with playlist count and most recent listening
    /// event, optionally restricted to accounts of one user.
    fn dashboard_overview(&self, user_id: Option<i64>)
        -> Result<Vec<AccountOverview>, StoreError>;
    /// Full listening history decorated with track and account fields,
    /// newest first, optionally restricted to one account.
    fn listening_report(
        &self,
        account_id: Option<i64>,
    ) -> Result<Vec<ListeningReportRow>, StoreError>;
}
