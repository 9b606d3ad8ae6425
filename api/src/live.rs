//! Serde shapes for the cdn.nba.com liveData feeds.
//!
//! Unlike the stats endpoints these have fixed nested layouts, one per feed.
//! Anything the feed is known to null out or drop is optional here.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Shared pieces
// ---------------------------------------------------------------------------

/// Envelope metadata sent with every live feed.
#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
pub struct Meta {
    #[serde(default)]
    pub version: i64,
    #[serde(default)]
    pub request: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub code: i64,
}

#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PeriodScore {
    pub period: u8,
    #[serde(default)]
    pub period_type: String,
    #[serde(default)]
    pub score: i64,
}

// ---------------------------------------------------------------------------
// Scoreboard  (scoreboard/todaysScoreboard_00.json)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
pub struct ScoreboardResponse {
    #[serde(default)]
    pub meta: Meta,
    pub scoreboard: Scoreboard,
}

#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Scoreboard {
    #[serde(default)]
    pub game_date: String,
    #[serde(default)]
    pub league_id: String,
    #[serde(default)]
    pub league_name: String,
    #[serde(default)]
    pub games: Vec<ScoreboardGame>,
}

#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScoreboardGame {
    pub game_id: String,
    #[serde(default)]
    pub game_code: String,
    /// 1 = scheduled, 2 = in progress, 3 = final.
    #[serde(default)]
    pub game_status: u8,
    #[serde(default)]
    pub game_status_text: String,
    #[serde(default)]
    pub period: u8,
    /// ISO 8601 duration such as `PT05M12.00S`; empty between periods.
    #[serde(default)]
    pub game_clock: String,
    #[serde(rename = "gameTimeUTC")]
    pub game_time_utc: Option<DateTime<Utc>>,
    /// Eastern wall-clock time, sent with a misleading `Z` suffix.
    #[serde(default)]
    pub game_et: String,
    #[serde(default)]
    pub regulation_periods: u8,
    pub if_necessary: Option<bool>,
    #[serde(default)]
    pub series_game_number: String,
    #[serde(default)]
    pub series_text: String,
    pub home_team: LiveTeam,
    pub away_team: LiveTeam,
    pub game_leaders: Option<GameLeaders>,
    pub pb_odds: Option<PbOdds>,
}

impl ScoreboardGame {
    pub fn is_live(&self) -> bool {
        self.game_status == 2
    }

    pub fn is_final(&self) -> bool {
        self.game_status == 3
    }
}

/// Team line as the scoreboard reports it.
#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LiveTeam {
    pub team_id: i64,
    #[serde(default)]
    pub team_name: String,
    #[serde(default)]
    pub team_city: String,
    #[serde(default)]
    pub team_tricode: String,
    pub wins: Option<i64>,
    pub losses: Option<i64>,
    #[serde(default)]
    pub score: i64,
    pub seed: Option<i64>,
    /// `"1"` / `"0"` when known, null before tip-off.
    pub in_bonus: Option<String>,
    pub timeouts_remaining: Option<i64>,
    #[serde(default)]
    pub periods: Vec<PeriodScore>,
}

impl LiveTeam {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.team_city, self.team_name).trim().to_owned()
    }
}

#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameLeaders {
    pub home_leaders: Option<GameLeader>,
    pub away_leaders: Option<GameLeader>,
}

#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameLeader {
    pub person_id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub jersey_num: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub team_tricode: String,
    pub player_slug: Option<String>,
    #[serde(default)]
    pub points: i64,
    #[serde(default)]
    pub rebounds: i64,
    #[serde(default)]
    pub assists: i64,
}

#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
pub struct PbOdds {
    pub team: Option<String>,
    #[serde(default)]
    pub odds: f64,
    #[serde(default)]
    pub suspended: i64,
}

// ---------------------------------------------------------------------------
// Box score  (boxscore/boxscore_{gameId}.json)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
pub struct BoxScoreResponse {
    #[serde(default)]
    pub meta: Meta,
    pub game: BoxScoreGame,
}

#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BoxScoreGame {
    pub game_id: String,
    #[serde(rename = "gameTimeUTC")]
    pub game_time_utc: Option<DateTime<Utc>>,
    #[serde(default)]
    pub game_et: String,
    #[serde(default)]
    pub duration: i64,
    #[serde(default)]
    pub game_code: String,
    #[serde(default)]
    pub game_status_text: String,
    #[serde(default)]
    pub game_status: u8,
    #[serde(default)]
    pub regulation_periods: u8,
    #[serde(default)]
    pub period: u8,
    #[serde(default)]
    pub game_clock: String,
    #[serde(default)]
    pub attendance: i64,
    #[serde(default)]
    pub sellout: String,
    pub arena: Option<Arena>,
    #[serde(default)]
    pub officials: Vec<Official>,
    pub home_team: BoxScoreTeam,
    pub away_team: BoxScoreTeam,
}

#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Arena {
    pub arena_id: i64,
    #[serde(default)]
    pub arena_name: String,
    #[serde(default)]
    pub arena_city: String,
    #[serde(default)]
    pub arena_state: String,
    #[serde(default)]
    pub arena_country: String,
    #[serde(default)]
    pub arena_timezone: String,
}

#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Official {
    pub person_id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub name_i: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub family_name: String,
    #[serde(default)]
    pub jersey_num: String,
    #[serde(default)]
    pub assignment: String,
}

#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BoxScoreTeam {
    pub team_id: i64,
    #[serde(default)]
    pub team_name: String,
    #[serde(default)]
    pub team_city: String,
    #[serde(default)]
    pub team_tricode: String,
    #[serde(default)]
    pub score: i64,
    pub in_bonus: Option<String>,
    pub timeouts_remaining: Option<i64>,
    #[serde(default)]
    pub periods: Vec<PeriodScore>,
    #[serde(default)]
    pub players: Vec<BoxScorePlayer>,
    pub statistics: Option<TeamStatistics>,
}

#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BoxScorePlayer {
    #[serde(default)]
    pub status: String,
    pub order: Option<i64>,
    pub person_id: i64,
    #[serde(default)]
    pub jersey_num: String,
    pub position: Option<String>,
    /// `"1"` or `"0"`.
    #[serde(default)]
    pub starter: String,
    #[serde(default)]
    pub oncourt: String,
    #[serde(default)]
    pub played: String,
    pub not_playing_reason: Option<String>,
    pub not_playing_description: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub name_i: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub family_name: String,
    pub statistics: Option<PlayerStatistics>,
}

impl BoxScorePlayer {
    pub fn is_starter(&self) -> bool {
        self.starter == "1"
    }

    pub fn on_court(&self) -> bool {
        self.oncourt == "1"
    }
}

#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerStatistics {
    pub assists: i64,
    pub blocks: i64,
    pub blocks_received: i64,
    pub field_goals_attempted: i64,
    pub field_goals_made: i64,
    pub field_goals_percentage: f64,
    pub fouls_offensive: i64,
    pub fouls_drawn: i64,
    pub fouls_personal: i64,
    pub fouls_technical: i64,
    pub free_throws_attempted: i64,
    pub free_throws_made: i64,
    pub free_throws_percentage: f64,
    pub minus: f64,
    /// ISO 8601 duration, e.g. `PT34M12.00S`.
    pub minutes: String,
    pub plus: f64,
    pub plus_minus_points: f64,
    pub points: i64,
    pub points_fast_break: i64,
    pub points_in_the_paint: i64,
    pub points_second_chance: i64,
    pub rebounds_defensive: i64,
    pub rebounds_offensive: i64,
    pub rebounds_total: i64,
    pub steals: i64,
    pub three_pointers_attempted: i64,
    pub three_pointers_made: i64,
    pub three_pointers_percentage: f64,
    pub turnovers: i64,
    pub two_pointers_attempted: i64,
    pub two_pointers_made: i64,
    pub two_pointers_percentage: f64,
}

#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TeamStatistics {
    pub assists: i64,
    pub blocks: i64,
    pub field_goals_attempted: i64,
    pub field_goals_made: i64,
    pub field_goals_percentage: f64,
    pub fouls_personal: i64,
    pub free_throws_attempted: i64,
    pub free_throws_made: i64,
    pub free_throws_percentage: f64,
    pub lead_changes: i64,
    pub biggest_lead: i64,
    pub minutes: String,
    pub points: i64,
    pub points_fast_break: i64,
    pub points_from_turnovers: i64,
    pub points_in_the_paint: i64,
    pub points_second_chance: i64,
    pub rebounds_defensive: i64,
    pub rebounds_offensive: i64,
    pub rebounds_total: i64,
    pub steals: i64,
    pub three_pointers_attempted: i64,
    pub three_pointers_made: i64,
    pub three_pointers_percentage: f64,
    pub times_tied: i64,
    pub turnovers: i64,
    pub turnovers_total: i64,
}

// ---------------------------------------------------------------------------
// Play-by-play  (playbyplay/playbyplay_{gameId}.json)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
pub struct PlayByPlayResponse {
    #[serde(default)]
    pub meta: Meta,
    pub game: PlayByPlayGame,
}

#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlayByPlayGame {
    pub game_id: String,
    #[serde(default)]
    pub actions: Vec<Action>,
}

impl PlayByPlayGame {
    pub fn actions_in_period(&self, period: u8) -> impl Iterator<Item = &Action> {
        self.actions.iter().filter(move |a| a.period == period)
    }
}

/// One play-by-play event. The feed adds type-specific keys
/// (`shotResult`, `foulDrawnPersonId`, ...) which are kept when known.
#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub action_number: i64,
    #[serde(default)]
    pub clock: String,
    #[serde(default)]
    pub time_actual: String,
    pub period: u8,
    #[serde(default)]
    pub period_type: String,
    pub team_id: Option<i64>,
    pub team_tricode: Option<String>,
    #[serde(default)]
    pub action_type: String,
    #[serde(default)]
    pub sub_type: String,
    pub descriptor: Option<String>,
    #[serde(default)]
    pub qualifiers: Vec<String>,
    #[serde(default)]
    pub person_id: i64,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub possession: Option<i64>,
    #[serde(default)]
    pub score_home: String,
    #[serde(default)]
    pub score_away: String,
    #[serde(default)]
    pub edited: String,
    #[serde(default)]
    pub order_number: i64,
    pub x_legacy: Option<i64>,
    pub y_legacy: Option<i64>,
    #[serde(default)]
    pub is_field_goal: i64,
    pub shot_distance: Option<f64>,
    pub shot_result: Option<String>,
    pub points_total: Option<i64>,
    #[serde(default)]
    pub description: String,
    pub player_name: Option<String>,
    #[serde(rename = "playerNameI")]
    pub player_name_i: Option<String>,
    #[serde(default)]
    pub person_ids_filter: Vec<i64>,
}

impl Action {
    pub fn is_field_goal(&self) -> bool {
        self.is_field_goal == 1
    }
}

// ---------------------------------------------------------------------------
// Odds  (odds/odds_todaysGames.json)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
pub struct OddsResponse {
    #[serde(default)]
    pub games: Vec<OddsGame>,
}

#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OddsGame {
    pub game_id: String,
    #[serde(rename = "sr_id", default)]
    pub sr_id: String,
    #[serde(default)]
    pub sr_match_id: String,
    #[serde(default)]
    pub home_team_id: String,
    #[serde(default)]
    pub away_team_id: String,
    #[serde(default)]
    pub markets: Vec<Market>,
}

#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
pub struct Market {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub odds_type_id: i64,
    #[serde(default)]
    pub group_name: String,
    #[serde(default)]
    pub books: Vec<Book>,
}

#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub outcomes: Vec<Outcome>,
    pub url: Option<String>,
    pub country_code: Option<String>,
}

/// Odds arrive as decimal strings (`"1.750"`); spreads carry a point line.
#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
pub struct Outcome {
    #[serde(default)]
    pub odds_field_id: i64,
    #[serde(rename = "type", default)]
    pub outcome_type: String,
    #[serde(default)]
    pub odds: String,
    pub opening_odds: Option<String>,
    pub odds_trend: Option<String>,
    pub spread: Option<String>,
    pub opening_spread: Option<f64>,
}

impl Outcome {
    pub fn decimal_odds(&self) -> Option<f64> {
        self.odds.trim().parse().ok()
    }
}
