//! Endpoint table.
//!
//! Every stats endpoint is one entry in the `stats_endpoints!` invocation
//! below: its path fragment plus the wire names of its query parameters.
//! From that entry the macro generates a parameter struct (all fields are
//! plain strings, exactly as they go on the wire), its [`EndpointDescriptor`],
//! and an `NbaApi` method. All of them funnel into [`NbaApi::fetch_stats`].
use crate::client::{ApiError, ApiResult, NbaApi, RequestContext};
use crate::live::{BoxScoreResponse, OddsResponse, PlayByPlayResponse, ScoreboardResponse};
use crate::params::Params;
use crate::stats::StatsResponse;
use serde::de::DeserializeOwned;

pub const LIVE_SCOREBOARD: &str = "scoreboard/todaysScoreboard_00.json";
pub const LIVE_ODDS: &str = "odds/odds_todaysGames.json";

/// How a parameter is treated when its value is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Left off the query string.
    Optional,
    /// Rejected before any request is made.
    Required,
    /// Sent as `Name=` so the API sees it.
    Always,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub wire: &'static str,
    pub presence: Presence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointDescriptor {
    pub name: &'static str,
    /// Fragment substituted into the base URL.
    pub path: &'static str,
    pub params: &'static [ParamSpec],
}

impl EndpointDescriptor {
    pub fn param(&self, wire: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.wire == wire)
    }

    pub fn required(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.params
            .iter()
            .filter(|p| p.presence == Presence::Required)
            .map(|p| p.wire)
    }

    /// Turn `(wire name, value)` pairs into request parameters.
    ///
    /// Pairs for names the descriptor does not list are passed through.
    /// Empty `Required` parameters are an error; `Always` parameters are
    /// kept on the wire even when empty.
    pub fn build_params<'a, I>(&self, values: I) -> ApiResult<Params>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut params: Params = values.into_iter().collect();
        for spec in self.params {
            match spec.presence {
                Presence::Required if params.get(spec.wire).is_none_or(str::is_empty) => {
                    return Err(ApiError::MissingParameter {
                        endpoint: self.name.to_owned(),
                        param: spec.wire.to_owned(),
                    });
                }
                Presence::Always => {
                    params.keep_empty(spec.wire);
                }
                _ => {}
            }
        }
        Ok(params)
    }
}

/// A typed parameter struct for one stats endpoint.
pub trait StatsEndpoint {
    const DESCRIPTOR: EndpointDescriptor;

    /// `(wire name, value)` for every field, empty ones included.
    fn values(&self) -> Vec<(&str, &str)>;
}

/// Look a stats endpoint up by struct name or path fragment, ignoring case.
pub fn find_endpoint(name: &str) -> Option<&'static EndpointDescriptor> {
    STATS_ENDPOINTS
        .iter()
        .find(|d| d.name.eq_ignore_ascii_case(name) || d.path.eq_ignore_ascii_case(name))
}

impl NbaApi {
    /// The one generic stats call: validate, request, JSON-gate, decode, log.
    pub async fn fetch_stats<'a, I>(
        &self,
        ctx: &RequestContext,
        descriptor: &EndpointDescriptor,
        values: I,
    ) -> ApiResult<StatsResponse>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        self.log_start(descriptor.name);
        let params = descriptor.build_params(values).inspect_err(|e| {
            self.log_failure(descriptor.name, e);
        })?;

        let response: StatsResponse = self
            .fetch_json(ctx, descriptor.name, descriptor.path, &params)
            .await?;
        self.log_success(descriptor.name, "result_sets", response.result_sets.len());
        Ok(response)
    }

    pub async fn fetch_endpoint<E: StatsEndpoint>(
        &self,
        ctx: &RequestContext,
        params: &E,
    ) -> ApiResult<StatsResponse> {
        self.fetch_stats(ctx, &E::DESCRIPTOR, params.values()).await
    }

    /// Today's games from the live scoreboard.
    pub async fn scoreboard(&self, ctx: &RequestContext) -> ApiResult<ScoreboardResponse> {
        let response: ScoreboardResponse = self.fetch_live(ctx, "Scoreboard", LIVE_SCOREBOARD).await?;
        self.log_success("Scoreboard", "games", response.scoreboard.games.len());
        Ok(response)
    }

    /// Live box score for one game, e.g. `0022300573`.
    pub async fn boxscore(&self, ctx: &RequestContext, game_id: &str) -> ApiResult<BoxScoreResponse> {
        let response: BoxScoreResponse = self
            .fetch_live_game(ctx, "BoxScore", "boxscore", game_id)
            .await?;
        let players = response.game.home_team.players.len() + response.game.away_team.players.len();
        self.log_success("BoxScore", "players", players);
        Ok(response)
    }

    pub async fn play_by_play(
        &self,
        ctx: &RequestContext,
        game_id: &str,
    ) -> ApiResult<PlayByPlayResponse> {
        let response: PlayByPlayResponse = self
            .fetch_live_game(ctx, "PlayByPlay", "playbyplay", game_id)
            .await?;
        self.log_success("PlayByPlay", "actions", response.game.actions.len());
        Ok(response)
    }

    /// Betting odds for today's games.
    pub async fn odds(&self, ctx: &RequestContext) -> ApiResult<OddsResponse> {
        let response: OddsResponse = self.fetch_live(ctx, "Odds", LIVE_ODDS).await?;
        self.log_success("Odds", "games", response.games.len());
        Ok(response)
    }

    async fn fetch_live<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        name: &str,
        fragment: &str,
    ) -> ApiResult<T> {
        self.log_start(name);
        self.fetch_json(ctx, name, fragment, &Params::new()).await
    }

    async fn fetch_live_game<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        name: &str,
        feed: &str,
        game_id: &str,
    ) -> ApiResult<T> {
        self.log_start(name);
        let game_id = check_game_id(name, game_id).inspect_err(|e| self.log_failure(name, e))?;
        let fragment = format!("{feed}/{feed}_{game_id}.json");
        self.fetch_json(ctx, name, &fragment, &Params::new()).await
    }
}

/// Game ids go into the URL path, so only ASCII alphanumerics are let through.
fn check_game_id<'a>(endpoint: &str, game_id: &'a str) -> ApiResult<&'a str> {
    let game_id = game_id.trim();
    if game_id.is_empty() {
        return Err(ApiError::MissingParameter {
            endpoint: endpoint.to_owned(),
            param: "gameId".to_owned(),
        });
    }
    if !game_id.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(ApiError::InvalidParameter {
            endpoint: endpoint.to_owned(),
            param: "gameId".to_owned(),
            value: game_id.to_owned(),
        });
    }
    Ok(game_id)
}

macro_rules! presence {
    () => {
        Presence::Optional
    };
    (required) => {
        Presence::Required
    };
    (always) => {
        Presence::Always
    };
}

macro_rules! stats_endpoints {
    ($(
        $(#[$meta:meta])*
        $method:ident => $ty:ident($path:literal) {
            $($field:ident: $wire:literal $($presence:ident)?),* $(,)?
        }
    )*) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Default, PartialEq, Eq)]
            pub struct $ty {
                $(pub $field: String,)*
            }

            impl StatsEndpoint for $ty {
                const DESCRIPTOR: EndpointDescriptor = EndpointDescriptor {
                    name: stringify!($ty),
                    path: $path,
                    params: &[$(ParamSpec { wire: $wire, presence: presence!($($presence)?) }),*],
                };

                fn values(&self) -> Vec<(&str, &str)> {
                    vec![$(($wire, self.$field.as_str())),*]
                }
            }

            impl NbaApi {
                $(#[$meta])*
                pub async fn $method(
                    &self,
                    ctx: &RequestContext,
                    params: &$ty,
                ) -> ApiResult<StatsResponse> {
                    self.fetch_endpoint(ctx, params).await
                }
            }
        )*

        /// Every stats endpoint, in declaration order.
        pub static STATS_ENDPOINTS: &[EndpointDescriptor] = &[
            $(<$ty as StatsEndpoint>::DESCRIPTOR),*
        ];
    };
}

stats_endpoints! {
    // -----------------------------------------------------------------------
    // Players, teams, franchises
    // -----------------------------------------------------------------------

    /// Every player the league knows for a season.
    common_all_players => CommonAllPlayers("commonallplayers") {
        is_only_current_season: "IsOnlyCurrentSeason" required,
        league_id: "LeagueID" required,
        season: "Season" required,
    }

    /// Bio, draft and headline stats for one player.
    common_player_info => CommonPlayerInfo("commonplayerinfo") {
        player_id: "PlayerID" required,
        league_id: "LeagueID",
    }

    common_team_roster => CommonTeamRoster("commonteamroster") {
        team_id: "TeamID" required,
        season: "Season" required,
        league_id: "LeagueID",
    }

    common_team_years => CommonTeamYears("commonteamyears") {
        league_id: "LeagueID" required,
    }

    common_playoff_series => CommonPlayoffSeries("commonplayoffseries") {
        league_id: "LeagueID" required,
        season: "Season" required,
        series_id: "SeriesID",
    }

    /// Season-by-season and career totals for one player.
    player_career_stats => PlayerCareerStats("playercareerstats") {
        player_id: "PlayerID" required,
        per_mode: "PerMode36",
        league_id: "LeagueID",
    }

    player_game_log => PlayerGameLog("playergamelog") {
        player_id: "PlayerID" required,
        season: "Season" required,
        season_type: "SeasonType" required,
        date_from: "DateFrom" always,
        date_to: "DateTo" always,
        league_id: "LeagueID",
    }

    player_awards => PlayerAwards("playerawards") {
        player_id: "PlayerID" required,
    }

    player_profile_v2 => PlayerProfileV2("playerprofilev2") {
        player_id: "PlayerID" required,
        per_mode: "PerMode" required,
        league_id: "LeagueID",
    }

    team_game_log => TeamGameLog("teamgamelog") {
        team_id: "TeamID" required,
        season: "Season" required,
        season_type: "SeasonType" required,
        date_from: "DateFrom" always,
        date_to: "DateTo" always,
        league_id: "LeagueID",
    }

    team_info_common => TeamInfoCommon("teaminfocommon") {
        team_id: "TeamID" required,
        league_id: "LeagueID" required,
        season: "Season",
        season_type: "SeasonType",
    }

    team_year_by_year_stats => TeamYearByYearStats("teamyearbyyearstats") {
        team_id: "TeamID" required,
        league_id: "LeagueID" required,
        per_mode: "PerMode",
        season_type: "SeasonType",
    }

    franchise_history => FranchiseHistory("franchisehistory") {
        league_id: "LeagueID" required,
    }

    player_index => PlayerIndex("playerindex") {
        league_id: "LeagueID" required,
        season: "Season" required,
        active: "Active",
        all_star: "AllStar",
        college: "College",
        country: "Country",
        draft_pick: "DraftPick",
        draft_year: "DraftYear",
        height: "Height",
        historical: "Historical",
        team_id: "TeamID",
        weight: "Weight",
    }

    // -----------------------------------------------------------------------
    // League-wide
    // -----------------------------------------------------------------------

    /// Game search across players or teams. `PlayerOrTeam` is `P` or `T`.
    league_game_finder => LeagueGameFinder("leaguegamefinder") {
        player_or_team: "PlayerOrTeam" required,
        league_id: "LeagueID",
        season: "Season",
        season_type: "SeasonType",
        team_id: "TeamID",
        vs_team_id: "VsTeamID",
        player_id: "PlayerID",
        game_id: "GameID",
        date_from: "DateFrom",
        date_to: "DateTo",
        outcome: "Outcome",
        location: "Location",
    }

    league_game_log => LeagueGameLog("leaguegamelog") {
        counter: "Counter" always,
        direction: "Direction" required,
        league_id: "LeagueID" required,
        player_or_team: "PlayerOrTeam" required,
        season: "Season" required,
        season_type: "SeasonType" required,
        sorter: "Sorter" required,
        date_from: "DateFrom" always,
        date_to: "DateTo" always,
    }

    /// Per-player dashboard across the league; the API wants every filter present.
    league_dash_player_stats => LeagueDashPlayerStats("leaguedashplayerstats") {
        college: "College",
        conference: "Conference" always,
        country: "Country",
        date_from: "DateFrom" always,
        date_to: "DateTo" always,
        division: "Division" always,
        draft_pick: "DraftPick",
        draft_year: "DraftYear",
        game_scope: "GameScope",
        game_segment: "GameSegment" always,
        height: "Height",
        last_n_games: "LastNGames" required,
        league_id: "LeagueID",
        location: "Location" always,
        measure_type: "MeasureType" required,
        month: "Month" required,
        opponent_team_id: "OpponentTeamID" required,
        outcome: "Outcome" always,
        po_round: "PORound",
        pace_adjust: "PaceAdjust" required,
        per_mode: "PerMode" required,
        period: "Period" required,
        player_experience: "PlayerExperience",
        player_position: "PlayerPosition",
        plus_minus: "PlusMinus" required,
        rank: "Rank" required,
        season: "Season" required,
        season_segment: "SeasonSegment" always,
        season_type: "SeasonType" required,
        shot_clock_range: "ShotClockRange" always,
        starter_bench: "StarterBench",
        team_id: "TeamID",
        vs_conference: "VsConference" always,
        vs_division: "VsDivision" always,
        weight: "Weight",
    }

    league_dash_team_stats => LeagueDashTeamStats("leaguedashteamstats") {
        conference: "Conference" always,
        date_from: "DateFrom" always,
        date_to: "DateTo" always,
        division: "Division" always,
        game_scope: "GameScope",
        game_segment: "GameSegment" always,
        last_n_games: "LastNGames" required,
        league_id: "LeagueID",
        location: "Location" always,
        measure_type: "MeasureType" required,
        month: "Month" required,
        opponent_team_id: "OpponentTeamID" required,
        outcome: "Outcome" always,
        po_round: "PORound",
        pace_adjust: "PaceAdjust" required,
        per_mode: "PerMode" required,
        period: "Period" required,
        player_experience: "PlayerExperience",
        player_position: "PlayerPosition",
        plus_minus: "PlusMinus" required,
        rank: "Rank" required,
        season: "Season" required,
        season_segment: "SeasonSegment" always,
        season_type: "SeasonType" required,
        shot_clock_range: "ShotClockRange" always,
        starter_bench: "StarterBench",
        team_id: "TeamID",
        vs_conference: "VsConference" always,
        vs_division: "VsDivision" always,
    }

    /// Stat leaders. Answers with a single `resultSet` object.
    league_leaders => LeagueLeaders("leagueleaders") {
        active_flag: "ActiveFlag",
        league_id: "LeagueID" required,
        per_mode: "PerMode" required,
        scope: "Scope" required,
        season: "Season" required,
        season_type: "SeasonType" required,
        stat_category: "StatCategory" required,
    }

    league_standings_v3 => LeagueStandingsV3("leaguestandingsv3") {
        league_id: "LeagueID" required,
        season: "Season" required,
        season_type: "SeasonType" required,
        season_year: "SeasonYear",
    }

    playoff_picture => PlayoffPicture("playoffpicture") {
        league_id: "LeagueID" required,
        season_id: "SeasonID" required,
    }

    league_hustle_stats_player => LeagueHustleStatsPlayer("leaguehustlestatsplayer") {
        college: "College",
        conference: "Conference",
        country: "Country",
        date_from: "DateFrom",
        date_to: "DateTo",
        division: "Division",
        draft_pick: "DraftPick",
        draft_year: "DraftYear",
        height: "Height",
        league_id: "LeagueID",
        location: "Location",
        month: "Month",
        opponent_team_id: "OpponentTeamID",
        outcome: "Outcome",
        po_round: "PORound",
        per_mode: "PerMode" required,
        player_experience: "PlayerExperience",
        player_position: "PlayerPosition",
        season: "Season" required,
        season_segment: "SeasonSegment",
        season_type: "SeasonType" required,
        team_id: "TeamID",
        vs_conference: "VsConference",
        vs_division: "VsDivision",
        weight: "Weight",
    }

    player_estimated_metrics => PlayerEstimatedMetrics("playerestimatedmetrics") {
        league_id: "LeagueID" required,
        season: "Season" required,
        season_type: "SeasonType" required,
    }

    // -----------------------------------------------------------------------
    // Games
    // -----------------------------------------------------------------------

    /// Games on a date (`MM/DD/YYYY`), with line scores and standings.
    scoreboard_v2 => ScoreboardV2("scoreboardv2") {
        day_offset: "DayOffset" required,
        game_date: "GameDate" required,
        league_id: "LeagueID" required,
    }

    box_score_summary_v2 => BoxScoreSummaryV2("boxscoresummaryv2") {
        game_id: "GameID" required,
    }

    box_score_traditional_v2 => BoxScoreTraditionalV2("boxscoretraditionalv2") {
        game_id: "GameID" required,
        start_period: "StartPeriod" required,
        end_period: "EndPeriod" required,
        start_range: "StartRange" required,
        end_range: "EndRange" required,
        range_type: "RangeType" required,
    }

    box_score_advanced_v2 => BoxScoreAdvancedV2("boxscoreadvancedv2") {
        game_id: "GameID" required,
        start_period: "StartPeriod" required,
        end_period: "EndPeriod" required,
        start_range: "StartRange" required,
        end_range: "EndRange" required,
        range_type: "RangeType" required,
    }

    box_score_scoring_v2 => BoxScoreScoringV2("boxscorescoringv2") {
        game_id: "GameID" required,
        start_period: "StartPeriod" required,
        end_period: "EndPeriod" required,
        start_range: "StartRange" required,
        end_range: "EndRange" required,
        range_type: "RangeType" required,
    }

    box_score_misc_v2 => BoxScoreMiscV2("boxscoremiscv2") {
        game_id: "GameID" required,
        start_period: "StartPeriod" required,
        end_period: "EndPeriod" required,
        start_range: "StartRange" required,
        end_range: "EndRange" required,
        range_type: "RangeType" required,
    }

    box_score_four_factors_v2 => BoxScoreFourFactorsV2("boxscorefourfactorsv2") {
        game_id: "GameID" required,
        start_period: "StartPeriod" required,
        end_period: "EndPeriod" required,
        start_range: "StartRange" required,
        end_range: "EndRange" required,
        range_type: "RangeType" required,
    }

    box_score_usage_v2 => BoxScoreUsageV2("boxscoreusagev2") {
        game_id: "GameID" required,
        start_period: "StartPeriod" required,
        end_period: "EndPeriod" required,
        start_range: "StartRange" required,
        end_range: "EndRange" required,
        range_type: "RangeType" required,
    }

    /// Player tracking box score (speed, distance, touches, contested shots).
    box_score_player_track_v2 => BoxScorePlayerTrackV2("boxscoreplayertrackv2") {
        game_id: "GameID" required,
    }

    hustle_stats_box_score => HustleStatsBoxScore("hustlestatsboxscore") {
        game_id: "GameID" required,
    }

    /// Tabular play-by-play. Periods are `0`..`14`; `0`/`0` means the whole game.
    play_by_play_v2 => PlayByPlayV2("playbyplayv2") {
        game_id: "GameID" required,
        start_period: "StartPeriod" required,
        end_period: "EndPeriod" required,
    }

    win_probability_pbp => WinProbabilityPbp("winprobabilitypbp") {
        game_id: "GameID" required,
        run_type: "RunType" required,
    }

    /// Shot locations for a player or team. `PlayerID`/`TeamID` of `0` mean "all".
    shot_chart_detail => ShotChartDetail("shotchartdetail") {
        context_measure: "ContextMeasure" required,
        date_from: "DateFrom" always,
        date_to: "DateTo" always,
        game_id: "GameID" always,
        game_segment: "GameSegment" always,
        last_n_games: "LastNGames" required,
        league_id: "LeagueID" required,
        location: "Location" always,
        month: "Month" required,
        opponent_team_id: "OpponentTeamID" required,
        outcome: "Outcome" always,
        period: "Period" required,
        player_id: "PlayerID" required,
        player_position: "PlayerPosition" always,
        rookie_year: "RookieYear" always,
        season: "Season" always,
        season_segment: "SeasonSegment" always,
        season_type: "SeasonType" required,
        team_id: "TeamID" required,
        vs_conference: "VsConference" always,
        vs_division: "VsDivision" always,
    }

    // -----------------------------------------------------------------------
    // Dashboards
    // -----------------------------------------------------------------------

    player_dashboard_by_general_splits => PlayerDashboardByGeneralSplits("playerdashboardbygeneralsplits") {
        date_from: "DateFrom" always,
        date_to: "DateTo" always,
        game_segment: "GameSegment" always,
        last_n_games: "LastNGames" required,
        league_id: "LeagueID",
        location: "Location" always,
        measure_type: "MeasureType" required,
        month: "Month" required,
        opponent_team_id: "OpponentTeamID" required,
        outcome: "Outcome" always,
        pace_adjust: "PaceAdjust" required,
        per_mode: "PerMode" required,
        period: "Period" required,
        player_id: "PlayerID" required,
        plus_minus: "PlusMinus" required,
        rank: "Rank" required,
        season: "Season" required,
        season_segment: "SeasonSegment" always,
        season_type: "SeasonType" required,
        vs_conference: "VsConference" always,
        vs_division: "VsDivision" always,
    }

    team_dashboard_by_general_splits => TeamDashboardByGeneralSplits("teamdashboardbygeneralsplits") {
        date_from: "DateFrom" always,
        date_to: "DateTo" always,
        game_segment: "GameSegment" always,
        last_n_games: "LastNGames" required,
        league_id: "LeagueID",
        location: "Location" always,
        measure_type: "MeasureType" required,
        month: "Month" required,
        opponent_team_id: "OpponentTeamID" required,
        outcome: "Outcome" always,
        pace_adjust: "PaceAdjust" required,
        per_mode: "PerMode" required,
        period: "Period" required,
        plus_minus: "PlusMinus" required,
        rank: "Rank" required,
        season: "Season" required,
        season_segment: "SeasonSegment" always,
        season_type: "SeasonType" required,
        team_id: "TeamID" required,
        vs_conference: "VsConference" always,
        vs_division: "VsDivision" always,
    }

    // -----------------------------------------------------------------------
    // Draft
    // -----------------------------------------------------------------------

    draft_combine_stats => DraftCombineStats("draftcombinestats") {
        league_id: "LeagueID" required,
        season_year: "SeasonYear" required,
    }

    draft_history => DraftHistory("drafthistory") {
        league_id: "LeagueID" required,
        season: "Season",
        round_num: "RoundNum",
        round_pick: "RoundPick",
        overall_pick: "OverallPick",
        team_id: "TeamID",
        college: "College",
        top_x: "TopX",
    }
}
