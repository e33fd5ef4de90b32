use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::error::StoreError;

/// Normalizes an RFC 3339 instant to UTC with millisecond precision and a
/// `Z` suffix. Every instant column goes through this on write so that
/// lexicographic ordering of the stored text is chronological ordering.
pub fn normalize_instant(value: &str) -> Result<String, StoreError> {
    let parsed = DateTime::parse_from_rfc3339(value).map_err(|e| {
        StoreError::validation(format!("invalid RFC 3339 instant '{}': {}", value, e))
    })?;
    Ok(parsed
        .with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Current instant in the stored representation.
pub fn now_instant() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn require(field: &'static str, value: &str) -> Result<(), StoreError> {
    if value.trim().is_empty() {
        Err(StoreError::validation(format!("{} must not be empty", field)))
    } else {
        Ok(())
    }
}

fn require_non_negative(field: &'static str, value: i64) -> Result<(), StoreError> {
    if value < 0 {
        Err(StoreError::validation(format!(
            "{} must not be negative, got {}",
            field, value
        )))
    } else {
        Ok(())
    }
}

fn validate_volume(volume_percent: Option<i64>) -> Result<(), StoreError> {
    match volume_percent {
        Some(v) if !(0..=100).contains(&v) => Err(StoreError::validation(format!(
            "volumePercent must be within 0..=100, got {}",
            v
        ))),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub display_name: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub display_name: String,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), StoreError> {
        require("displayName", &self.display_name)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    pub display_name: Option<String>,
}

/// A linked streaming-service identity owned by a [`User`]. Tokens are
/// carried verbatim; refreshing them is outside this system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: i64,
    pub external_user_id: String,
    pub display_name: Option<String>,
    pub user_id: i64,
    pub account_type: Option<String>,
    pub access_token: String,
    pub refresh_token: String,
    pub token_expires_at: String,
    pub scope: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount {
    pub external_user_id: String,
    pub display_name: Option<String>,
    pub user_id: i64,
    pub account_type: Option<String>,
    pub access_token: String,
    pub refresh_token: String,
    pub token_expires_at: String,
    pub scope: Option<String>,
}

impl NewAccount {
    pub fn validate(&self) -> Result<(), StoreError> {
        require("externalUserId", &self.external_user_id)?;
        require("accessToken", &self.access_token)?;
        require("refreshToken", &self.refresh_token)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountPatch {
    pub display_name: Option<String>,
    pub account_type: Option<String>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub token_expires_at: Option<String>,
    pub scope: Option<String>,
}

/// Catalog entry shared across accounts; immutable apart from metadata edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: i64,
    pub external_track_id: String,
    pub name: String,
    pub artist: String,
    pub album: String,
    pub duration_ms: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTrack {
    pub external_track_id: String,
    pub name: String,
    pub artist: String,
    pub album: String,
    pub duration_ms: i64,
}

impl NewTrack {
    pub fn validate(&self) -> Result<(), StoreError> {
        require("externalTrackId", &self.external_track_id)?;
        require("name", &self.name)?;
        require("artist", &self.artist)?;
        require("album", &self.album)?;
        require_non_negative("durationMs", self.duration_ms)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackPatch {
    pub name: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub duration_ms: Option<i64>,
}

impl TrackPatch {
    pub fn validate(&self) -> Result<(), StoreError> {
        if let Some(duration_ms) = self.duration_ms {
            require_non_negative("durationMs", duration_ms)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub id: i64,
    pub external_playlist_id: String,
    pub account_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPlaylist {
    pub external_playlist_id: String,
    pub account_id: i64,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub is_public: bool,
}

impl NewPlaylist {
    pub fn validate(&self) -> Result<(), StoreError> {
        require("externalPlaylistId", &self.external_playlist_id)?;
        require("name", &self.name)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
}

/// One playlist↔track link. Duplicate (playlist, track) pairs are allowed;
/// `position` is optional and position-less links traverse last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistEntry {
    pub id: i64,
    pub playlist_id: i64,
    pub track_id: i64,
    pub added_at: String,
    pub position: Option<i64>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPlaylistEntry {
    pub track_id: i64,
    pub position: Option<i64>,
    /// Defaults to now when omitted.
    pub added_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListeningEvent {
    pub id: i64,
    pub account_id: i64,
    pub track_id: i64,
    pub listened_at: String,
    pub duration_played_ms: i64,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewListeningEvent {
    pub account_id: i64,
    pub track_id: i64,
    pub listened_at: String,
    pub duration_played_ms: i64,
}

impl NewListeningEvent {
    pub fn validate(&self) -> Result<(), StoreError> {
        require_non_negative("durationPlayedMs", self.duration_played_ms)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListeningEventPatch {
    pub listened_at: Option<String>,
    pub duration_played_ms: Option<i64>,
}

impl ListeningEventPatch {
    pub fn validate(&self) -> Result<(), StoreError> {
        if let Some(duration_played_ms) = self.duration_played_ms {
            require_non_negative("durationPlayedMs", duration_played_ms)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: i64,
    pub external_device_id: String,
    pub account_id: i64,
    pub name: String,
    pub device_type: String,
    pub is_active: bool,
    pub volume_percent: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDevice {
    pub external_device_id: String,
    pub account_id: i64,
    pub name: String,
    pub device_type: String,
    #[serde(default)]
    pub is_active: bool,
    pub volume_percent: Option<i64>,
}

impl NewDevice {
    pub fn validate(&self) -> Result<(), StoreError> {
        require("externalDeviceId", &self.external_device_id)?;
        require("name", &self.name)?;
        require("deviceType", &self.device_type)?;
        validate_volume(self.volume_percent)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevicePatch {
    pub name: Option<String>,
    pub is_active: Option<bool>,
    pub volume_percent: Option<i64>,
}

impl DevicePatch {
    pub fn validate(&self) -> Result<(), StoreError> {
        validate_volume(self.volume_percent)
    }
}

/// Billing state for an account. At most one row per account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: i64,
    pub account_id: i64,
    pub plan_name: String,
    pub product_type: String,
    pub currency: Option<String>,
    pub next_billing_amount: Option<f64>,
    pub billing_date: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubscription {
    pub account_id: i64,
    pub plan_name: String,
    pub product_type: String,
    pub currency: Option<String>,
    pub next_billing_amount: Option<f64>,
    pub billing_date: Option<String>,
}

impl NewSubscription {
    pub fn validate(&self) -> Result<(), StoreError> {
        require("planName", &self.plan_name)?;
        require("productType", &self.product_type)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionPatch {
    pub plan_name: Option<String>,
    pub product_type: Option<String>,
    pub currency: Option<String>,
    pub next_billing_amount: Option<f64>,
    pub billing_date: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleType {
    AutoAdd,
    Sync,
    Filter,
}

impl RuleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleType::AutoAdd => "auto-add",
            RuleType::Sync => "sync",
            RuleType::Filter => "filter",
        }
    }

    pub fn parse(value: &str) -> Option<RuleType> {
        match value {
            "auto-add" => Some(RuleType::AutoAdd),
            "sync" => Some(RuleType::Sync),
            "filter" => Some(RuleType::Filter),
            _ => None,
        }
    }
}

/// Stored automation rule. `criteria` is an opaque JSON document; the system
/// records rules but never evaluates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationRule {
    pub id: i64,
    pub account_id: i64,
    pub name: String,
    pub rule_type: RuleType,
    pub criteria: serde_json::Value,
    pub is_active: bool,
    pub last_executed_at: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

fn default_rule_active() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAutomationRule {
    pub account_id: i64,
    pub name: String,
    pub rule_type: RuleType,
    pub criteria: serde_json::Value,
    #[serde(default = "default_rule_active")]
    pub is_active: bool,
}

impl NewAutomationRule {
    pub fn validate(&self) -> Result<(), StoreError> {
        require("name", &self.name)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationRulePatch {
    pub name: Option<String>,
    pub rule_type: Option<RuleType>,
    pub criteria: Option<serde_json::Value>,
    pub is_active: Option<bool>,
    pub last_executed_at: Option<String>,
}

/// Name-keyed application setting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Setting {
    pub id: i64,
    pub name: String,
    pub value: String,
    pub description: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSetting {
    pub name: String,
    pub value: String,
    pub description: Option<String>,
}

impl NewSetting {
    pub fn validate(&self) -> Result<(), StoreError> {
        require("name", &self.name)?;
        require("value", &self.value)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingPatch {
    pub value: Option<String>,
    pub description: Option<String>,
}

/// Account row decorated with the owning user's display name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountWithOwner {
    #[serde(flatten)]
    pub account: Account,
    pub user_display_name: Option<String>,
}

/// Playlist row decorated with owner fields and the number of entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistWithStats {
    #[serde(flatten)]
    pub playlist: Playlist,
    pub account_display_name: Option<String>,
    pub external_user_id: Option<String>,
    pub track_count: i64,
}

/// Playlist entry joined with its track's metadata, in traversal order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistTrackRow {
    #[serde(flatten)]
    pub entry: PlaylistEntry,
    pub external_track_id: String,
    pub name: String,
    pub artist: String,
    pub album: String,
    pub duration_ms: i64,
}

/// Listening event decorated with track and account display fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListeningReportRow {
    #[serde(flatten)]
    pub event: ListeningEvent,
    pub track_name: String,
    pub artist: String,
    pub album: String,
    pub account_display_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceWithAccount {
    #[serde(flatten)]
    pub device: Device,
    pub account_display_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionWithAccount {
    #[serde(flatten)]
    pub subscription: Subscription,
    pub account_display_name: Option<String>,
    pub external_user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleWithAccount {
    #[serde(flatten)]
    pub rule: AutomationRule,
    pub account_display_name: Option<String>,
}

/// One dashboard row per account. Accounts with no playlists or listening
/// history still get a row, with zero count and empty last-listened fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountOverview {
    pub account_id: i64,
    pub display_name: Option<String>,
    pub account_type: Option<String>,
    pub playlist_count: i64,
    pub last_listened_track: Option<String>,
    pub last_listened_artist: Option<String>,
    pub last_listened_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_instant_pads_to_millis_utc() {
        assert_eq!(
            normalize_instant("2024-01-20T15:30:00Z").unwrap(),
            "2024-01-20T15:30:00.000Z"
        );
        assert_eq!(
            normalize_instant("2024-01-20T15:30:00.5Z").unwrap(),
            "2024-01-20T15:30:00.500Z"
        );
        assert_eq!(
            normalize_instant("2024-01-20T16:30:00+01:00").unwrap(),
            "2024-01-20T15:30:00.000Z"
        );
    }

    #[test]
    fn test_normalize_instant_rejects_garbage() {
        let err = normalize_instant("yesterday").unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(normalize_instant("2024-13-40T99:00:00Z").is_err());
    }

    #[test]
    fn test_normalized_instants_sort_chronologically() {
        let mut instants = vec![
            normalize_instant("2024-01-20T15:30:00.25Z").unwrap(),
            normalize_instant("2024-01-20T15:30:00Z").unwrap(),
            normalize_instant("2024-01-20T15:30:01Z").unwrap(),
        ];
        instants.sort();
        assert_eq!(
            instants,
            vec![
                "2024-01-20T15:30:00.000Z",
                "2024-01-20T15:30:00.250Z",
                "2024-01-20T15:30:01.000Z"
            ]
        );
    }

    #[test]
    fn test_rule_type_round_trips() {
        for rule_type in [RuleType::AutoAdd, RuleType::Sync, RuleType::Filter] {
            assert_eq!(RuleType::parse(rule_type.as_str()), Some(rule_type));
        }
        assert_eq!(RuleType::parse("shuffle"), None);
    }

    #[test]
    fn test_rule_type_wire_format_is_kebab_case() {
        assert_eq!(
            serde_json::to_string(&RuleType::AutoAdd).unwrap(),
            "\"auto-add\""
        );
        let parsed: RuleType = serde_json::from_str("\"filter\"").unwrap();
        assert_eq!(parsed, RuleType::Filter);
    }

    #[test]
    fn test_new_track_rejects_negative_duration() {
        let track = NewTrack {
            external_track_id: "track_001".to_string(),
            name: "Bohemian Rhapsody".to_string(),
            artist: "Queen".to_string(),
            album: "A Night at the Opera".to_string(),
            duration_ms: -1,
        };
        assert!(matches!(
            track.validate(),
            Err(StoreError::Validation(_))
        ));
    }

    #[test]
    fn test_new_track_accepts_zero_duration() {
        let track = NewTrack {
            external_track_id: "track_001".to_string(),
            name: "Silence".to_string(),
            artist: "Nobody".to_string(),
            album: "Empty".to_string(),
            duration_ms: 0,
        };
        assert!(track.validate().is_ok());
    }

    #[test]
    fn test_new_user_rejects_blank_display_name() {
        let user = NewUser {
            display_name: "   ".to_string(),
        };
        assert!(matches!(user.validate(), Err(StoreError::Validation(_))));
    }

    #[test]
    fn test_device_volume_bounds() {
        let mut device = NewDevice {
            external_device_id: "device_001".to_string(),
            account_id: 1,
            name: "Kitchen Speaker".to_string(),
            device_type: "Speaker".to_string(),
            is_active: false,
            volume_percent: Some(100),
        };
        assert!(device.validate().is_ok());

        device.volume_percent = Some(101);
        assert!(device.validate().is_err());

        device.volume_percent = Some(-1);
        assert!(device.validate().is_err());

        device.volume_percent = None;
        assert!(device.validate().is_ok());

        assert!(DevicePatch {
            volume_percent: Some(101),
            ..DevicePatch::default()
        }
        .validate()
        .is_err());
    }

    #[test]
    fn test_new_rule_defaults_to_active_on_the_wire() {
        let rule: NewAutomationRule = serde_json::from_value(serde_json::json!({
            "accountId": 1,
            "name": "Auto-add Recent Favorites",
            "ruleType": "auto-add",
            "criteria": {"condition": "recently_liked", "days": 7}
        }))
        .unwrap();
        assert!(rule.is_active);
    }

    #[test]
    fn test_patch_with_absent_fields_deserializes_to_none() {
        let patch: PlaylistPatch = serde_json::from_str("{}").unwrap();
        assert!(patch.name.is_none());
        assert!(patch.description.is_none());
        assert!(patch.is_public.is_none());

        let patch: PlaylistPatch =
            serde_json::from_str("{\"description\":\"Evening rotation\"}").unwrap();
        assert_eq!(patch.description.as_deref(), Some("Evening rotation"));
        assert!(patch.name.is_none());
    }
}
