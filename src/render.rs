use chrono::Local;
use nba_api::endpoints::Presence;
use nba_api::live::{BoxScoreResponse, BoxScoreTeam, OddsResponse, PlayByPlayResponse, ScoreboardResponse};
use nba_api::{ApiResult, ResultSet, RowMap, StatsResponse, STATS_ENDPOINTS};
use std::collections::BTreeMap;
use tabled::builder::Builder;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Every stats endpoint and its wire parameters. `*` marks required, `=`
/// marks parameters sent even when empty.
pub fn endpoint_list() -> String {
    let mut builder = Builder::default();
    builder.push_record(["Endpoint", "Name", "Parameters"]);
    for descriptor in STATS_ENDPOINTS {
        let params = descriptor
            .params
            .iter()
            .map(|p| match p.presence {
                Presence::Required => format!("{}*", p.wire),
                Presence::Always => format!("{}=", p.wire),
                Presence::Optional => p.wire.to_owned(),
            })
            .collect::<Vec<_>>()
            .join(" ");
        builder.push_record([descriptor.path.to_owned(), descriptor.name.to_owned(), params]);
    }
    let mut table = builder.build();
    table.with(Style::psql());
    table.to_string()
}

pub fn result_set_table(set: &ResultSet) -> String {
    let mut builder = Builder::default();
    builder.push_record(set.headers.iter().map(String::as_str));
    for row in &set.row_set {
        builder.push_record(
            (0..set.headers.len()).map(|i| row.get(i).map(ToString::to_string).unwrap_or_default()),
        );
    }
    let mut table = builder.build();
    table.with(Style::psql());
    table.to_string()
}

/// Each result set as a titled table, or all of them as one JSON object keyed
/// by result-set name.
pub fn stats(response: &StatsResponse, json: bool) -> ApiResult<String> {
    if json {
        let sets: BTreeMap<&str, Vec<RowMap>> = response
            .result_sets
            .iter()
            .map(|set| (set.name.as_str(), set.to_maps()))
            .collect();
        return serde_json::to_string_pretty(&sets)
            .map_err(|e| nba_api::ApiError::Encode(e, response.resource.clone()));
    }

    let mut out = String::new();
    for set in &response.result_sets {
        out.push_str(&format!("{} ({} rows)\n", set.name, set.row_count()));
        if !set.headers.is_empty() {
            out.push_str(&result_set_table(set));
            out.push('\n');
        }
        out.push('\n');
    }
    Ok(out)
}

#[derive(Tabled)]
struct GameRow {
    #[tabled(rename = "Game")]
    game_id: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Away")]
    away: String,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "Home")]
    home: String,
}

pub fn scoreboard(response: &ScoreboardResponse) -> String {
    let board = &response.scoreboard;
    if board.games.is_empty() {
        return format!("No games on {}", board.game_date);
    }

    let rows = board.games.iter().map(|game| {
        let status = match game.game_time_utc {
            Some(tip) if game.game_status == 1 => tip.with_timezone(&Local).format("%H:%M").to_string(),
            _ => game.game_status_text.trim().to_owned(),
        };
        let score = if game.game_status == 1 {
            String::new()
        } else {
            format!("{} - {}", game.away_team.score, game.home_team.score)
        };
        GameRow {
            game_id: game.game_id.clone(),
            status,
            away: game.away_team.display_name(),
            score,
            home: game.home_team.display_name(),
        }
    });

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    format!("{}\n{table}", board.game_date)
}

#[derive(Tabled)]
struct PlayerRow {
    #[tabled(rename = "Player")]
    name: String,
    #[tabled(rename = "Pos")]
    position: String,
    #[tabled(rename = "Min")]
    minutes: String,
    #[tabled(rename = "Pts")]
    points: i64,
    #[tabled(rename = "Reb")]
    rebounds: i64,
    #[tabled(rename = "Ast")]
    assists: i64,
    #[tabled(rename = "FG")]
    field_goals: String,
    #[tabled(rename = "+/-")]
    plus_minus: String,
}

fn team_box(team: &BoxScoreTeam) -> String {
    let rows = team.players.iter().filter(|p| p.played == "1").map(|player| {
        let stats = player.statistics.clone().unwrap_or_default();
        PlayerRow {
            name: player.name.clone(),
            position: player.position.clone().unwrap_or_default(),
            minutes: clock(&stats.minutes),
            points: stats.points,
            rebounds: stats.rebounds_total,
            assists: stats.assists,
            field_goals: format!("{}-{}", stats.field_goals_made, stats.field_goals_attempted),
            plus_minus: format!("{:+}", stats.plus_minus_points),
        }
    });
    let mut table = Table::new(rows);
    table.with(Style::psql());
    format!("{} {}\n{table}", team.team_tricode, team.score)
}

pub fn boxscore(response: &BoxScoreResponse) -> String {
    let game = &response.game;
    format!(
        "{} {}\n\n{}\n\n{}",
        game.game_id,
        game.game_status_text.trim(),
        team_box(&game.away_team),
        team_box(&game.home_team)
    )
}

pub fn play_by_play(response: &PlayByPlayResponse) -> String {
    let mut out = String::new();
    for action in &response.game.actions {
        let team = action.team_tricode.as_deref().unwrap_or("");
        out.push_str(&format!(
            "Q{:<2} {:>5}  {:<3}  {:>3}-{:<3}  {}\n",
            action.period,
            clock(&action.clock),
            team,
            action.score_away,
            action.score_home,
            action.description
        ));
    }
    out
}

pub fn odds(response: &OddsResponse) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Game", "Market", "Book", "Outcome", "Odds", "Spread"]);
    for game in &response.games {
        for market in &game.markets {
            for book in &market.books {
                for outcome in &book.outcomes {
                    builder.push_record([
                        game.game_id.clone(),
                        market.name.clone(),
                        book.name.clone(),
                        outcome.outcome_type.clone(),
                        outcome.odds.clone(),
                        outcome.spread.clone().unwrap_or_default(),
                    ]);
                }
            }
        }
    }
    let mut table = builder.build();
    table.with(Style::psql());
    table.to_string()
}

/// `PT05M12.00S` → `5:12`. Anything else is returned as-is.
pub fn clock(iso: &str) -> String {
    let Some(rest) = iso.strip_prefix("PT") else {
        return iso.to_owned();
    };
    let Some((minutes, rest)) = rest.split_once('M') else {
        return iso.to_owned();
    };
    let seconds = rest.trim_end_matches('S');
    match (minutes.parse::<u32>(), seconds.parse::<f64>()) {
        (Ok(m), Ok(s)) => format!("{m}:{:02}", s.floor() as u32),
        _ => iso.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nba_api::Cell;
    use nba_api::live::{Action, PlayByPlayGame};

    fn sample_set() -> ResultSet {
        ResultSet {
            name: "LeagueLeaders".to_owned(),
            headers: vec!["PLAYER".to_owned(), "PTS".to_owned(), "TEAM".to_owned()],
            row_set: vec![
                vec![Cell::from("Joel Embiid"), Cell::from(33.1), Cell::from("PHI")],
                vec![Cell::from("Luka Dončić"), Cell::from(32)],
            ],
        }
    }

    #[test]
    fn result_set_table_pads_short_rows() {
        let table = result_set_table(&sample_set());
        assert!(table.contains("PLAYER"));
        assert!(table.contains("Joel Embiid"));
        assert!(table.contains("33.1"));
        assert_eq!(table.lines().count(), 4);
    }

    #[test]
    fn stats_json_is_keyed_by_set_name() {
        let response = StatsResponse {
            resource: "leagueleaders".to_owned(),
            result_sets: vec![sample_set()],
            ..Default::default()
        };
        let json: serde_json::Value = serde_json::from_str(&stats(&response, true).unwrap()).unwrap();
        assert_eq!(json["LeagueLeaders"][0]["PTS"], 33.1);
        assert_eq!(json["LeagueLeaders"][1]["PLAYER"], "Luka Dončić");
        assert!(json["LeagueLeaders"][1].get("TEAM").is_none());
    }

    #[test]
    fn stats_text_titles_each_set() {
        let response = StatsResponse {
            result_sets: vec![sample_set()],
            ..Default::default()
        };
        assert!(stats(&response, false).unwrap().starts_with("LeagueLeaders (2 rows)\n"));
    }

    #[test]
    fn stats_text_separates_sets() {
        let empty = ResultSet {
            name: "Empty".to_owned(),
            ..Default::default()
        };
        let response = StatsResponse {
            result_sets: vec![sample_set(), empty],
            ..Default::default()
        };
        let text = stats(&response, false).unwrap();
        assert!(text.contains("\n\nEmpty (0 rows)\n"));
        assert!(text.ends_with("Empty (0 rows)\n\n"));
    }

    #[test]
    fn play_by_play_prints_one_line_per_action() {
        let action = |period, clock: &str, team: Option<&str>, description: &str| Action {
            period,
            clock: clock.to_owned(),
            team_tricode: team.map(str::to_owned),
            score_away: "0".to_owned(),
            score_home: "2".to_owned(),
            description: description.to_owned(),
            ..Default::default()
        };
        let response = PlayByPlayResponse {
            game: PlayByPlayGame {
                game_id: "0022300001".to_owned(),
                actions: vec![
                    action(1, "PT12M00.00S", None, "Period Start"),
                    action(1, "PT11M41.00S", Some("BOS"), "Tatum 2' Driving Layup (2 PTS)"),
                ],
            },
            ..Default::default()
        };
        let text = play_by_play(&response);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(text.ends_with('\n'));
        assert!(lines[0].starts_with("Q1  12:00"));
        assert!(lines[1].contains("BOS"));
        assert!(lines[1].ends_with("Tatum 2' Driving Layup (2 PTS)"));
    }

    #[test]
    fn endpoint_list_marks_presence() {
        let list = endpoint_list();
        assert!(list.contains("commonallplayers"));
        assert!(list.contains("GameID*"));
        assert!(list.contains("DateFrom="));
    }

    #[test]
    fn clock_formats_iso_durations() {
        assert_eq!(clock("PT05M12.00S"), "5:12");
        assert_eq!(clock("PT00M00.40S"), "0:00");
        assert_eq!(clock("PT12M00.00S"), "12:00");
        assert_eq!(clock(""), "");
        assert_eq!(clock("Final"), "Final");
    }
}
