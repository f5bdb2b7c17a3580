//! Relative endpoint paths of the track API

use serde::{Deserialize, Serialize};

/// Placeholder substituted by [`Endpoints::track`] and [`Endpoints::user_tracks`]
const PLACEHOLDER: &str = "{}";

/// Endpoint path templates, relative to the configured base URL
///
/// Templates use `{}` as the single placeholder. Values substituted into a
/// template are percent-encoded, so a username or id can never add path
/// segments.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    /// Listing of all tracks
    #[serde(default = "default_tracks")]
    pub tracks: String,

    /// One track document, `{}` is the track id
    #[serde(default = "default_track")]
    pub track: String,

    /// Listing of one user's tracks, `{}` is the username
    #[serde(default = "default_user_tracks")]
    pub user_tracks: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            tracks: default_tracks(),
            track: default_track(),
            user_tracks: default_user_tracks(),
        }
    }
}

impl Endpoints {
    /// Listing path: the user's tracks when a username is given, all tracks otherwise
    pub fn listing(&self, username: Option<&str>) -> String {
        match username {
            Some(name) => fill(&self.user_tracks, name),
            None => self.tracks.clone(),
        }
    }

    /// Path of a single track document
    pub fn track(&self, track_id: &str) -> String {
        fill(&self.track, track_id)
    }
}

fn fill(template: &str, value: &str) -> String {
    template.replacen(PLACEHOLDER, &urlencoding::encode(value), 1)
}

fn default_tracks() -> String {
    "tracks".to_string()
}

fn default_track() -> String {
    "tracks/{}".to_string()
}

fn default_user_tracks() -> String {
    "users/{}/tracks".to_string()
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_paths() {
        let endpoints = Endpoints::default();
        assert_eq!(endpoints.listing(None), "tracks");
        assert_eq!(endpoints.listing(Some("alice")), "users/alice/tracks");
        assert_eq!(endpoints.track("5e8b93"), "tracks/5e8b93");
    }

    #[test]
    fn substituted_values_are_percent_encoded() {
        let endpoints = Endpoints::default();
        assert_eq!(endpoints.listing(Some("jane doe")), "users/jane%20doe/tracks");
        assert_eq!(endpoints.track("../admin"), "tracks/..%2Fadmin");
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let endpoints: Endpoints = serde_json::from_str(r#"{"tracks":"v2/tracks"}"#).unwrap();
        assert_eq!(endpoints.listing(None), "v2/tracks");
        assert_eq!(endpoints.track("a"), "tracks/a");
    }
}
