//! JSON messages exchanged with the progress backend.
//!
//! Every response carries a `success` flag, anything else may be missing and falls back to its default.

use serde::{Deserialize, Serialize};

pub const SAVE_ENDPOINT: &str = "/relax/save/";
pub const LOAD_ENDPOINT: &str = "/relax/load/";
pub const LEADERBOARD_ENDPOINT: &str = "/relax/leaderboard/";
pub const RESET_ENDPOINT: &str = "/relax/reset/";

/// Header carrying the value of [`CSRF_COOKIE`] on every POST.
pub const CSRF_HEADER: &str = "X-CSRFToken";
pub const CSRF_COOKIE: &str = "csrftoken";

/// Body of a POST to [`SAVE_ENDPOINT`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveProgressRequest {
    pub level: u32,
    pub score: i64,
}

/// Answer of [`LOAD_ENDPOINT`]; `found` is false for players without saved progress.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadProgressResponse {
    pub success: bool,
    pub found: bool,
    pub level: u32,
    pub score: i64,
}

impl LoadProgressResponse {
    /// Saved `(level, score)`, if the backend has any.
    pub fn progress(&self) -> Option<(u32, i64)> {
        (self.success && self.found).then_some((self.level, self.score))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: i64,
    pub level: u32,
    pub is_current_user: bool,
}

/// Answer of [`LEADERBOARD_ENDPOINT`]: a window of entries around the current player.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaderboardResponse {
    pub success: bool,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub user_rank: u32,
    pub total_players: u32,
}

impl LeaderboardResponse {
    /// Entries paired with their 1-based display position.
    pub fn positioned(&self) -> impl Iterator<Item = (u32, &LeaderboardEntry)> + use<'_> {
        (display_start(self.user_rank)..).zip(&self.leaderboard)
    }

    /// "You are #3 of 12 players"
    pub fn rank_text(&self) -> String {
        let plural = if self.total_players == 1 { "" } else { "s" };
        format!(
            "You are #{} of {} player{}",
            self.user_rank, self.total_players, plural
        )
    }
}

/// Position of the first leaderboard entry, the window starts three places above the player.
pub fn display_start(user_rank: u32) -> u32 {
    user_rank.saturating_sub(3).max(1)
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResetResponse {
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn save_request_is_plain_level_and_score() {
        let body = serde_json::to_value(SaveProgressRequest {
            level: 42,
            score: -7,
        })
        .unwrap();
        assert_eq!(body, json!({ "level": 42, "score": -7 }));
    }

    #[test]
    fn load_response_without_progress() {
        let response: LoadProgressResponse =
            serde_json::from_value(json!({ "success": true, "found": false })).unwrap();
        assert_eq!(response.progress(), None);

        let response: LoadProgressResponse = serde_json::from_value(json!({
            "success": true,
            "found": true,
            "level": 17,
            "score": 230,
        }))
        .unwrap();
        assert_eq!(response.progress(), Some((17, 230)));
    }

    #[test]
    fn failed_load_is_ignored() {
        let response: LoadProgressResponse =
            serde_json::from_value(json!({ "success": false, "found": true, "level": 9 })).unwrap();
        assert_eq!(response.progress(), None);
    }

    #[test]
    fn leaderboard_positions_start_three_above_the_player() {
        let response: LeaderboardResponse = serde_json::from_value(json!({
            "success": true,
            "leaderboard": [
                { "name": "ada", "score": 900, "level": 40, "is_current_user": false },
                { "name": "bo", "score": 850, "level": 38, "is_current_user": false },
                { "name": "cy", "score": 700, "level": 31, "is_current_user": false },
                { "name": "me", "score": 650, "level": 30, "is_current_user": true },
            ],
            "user_rank": 7,
            "total_players": 20,
        }))
        .unwrap();

        let positions: Vec<(u32, &str)> = response
            .positioned()
            .map(|(pos, entry)| (pos, entry.name.as_str()))
            .collect();
        assert_eq!(positions, [(4, "ada"), (5, "bo"), (6, "cy"), (7, "me")]);
        assert_eq!(response.rank_text(), "You are #7 of 20 players");
    }

    #[test]
    fn display_start_never_drops_below_one() {
        assert_eq!(display_start(0), 1);
        assert_eq!(display_start(1), 1);
        assert_eq!(display_start(4), 1);
        assert_eq!(display_start(5), 2);
    }

    #[test]
    fn single_player_rank_text() {
        let response = LeaderboardResponse {
            success: true,
            user_rank: 1,
            total_players: 1,
            ..Default::default()
        };
        assert_eq!(response.rank_text(), "You are #1 of 1 player");
    }

    #[test]
    fn reset_response_defaults_to_failure() {
        let response: ResetResponse = serde_json::from_str("{}").unwrap();
        assert!(!response.success);
    }
}
