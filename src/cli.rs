use nba_api::EndpointDescriptor;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Version,
    List,
    Stats {
        endpoint: &'static EndpointDescriptor,
        params: Vec<(String, String)>,
        json: bool,
    },
    Scoreboard,
    BoxScore { game_id: String },
    PlayByPlay { game_id: String },
    Odds,
}

/// Bad command line. The binary prints it with the usage text and exits 2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageError(pub String);

impl fmt::Display for UsageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for UsageError {}

fn usage(message: impl Into<String>) -> UsageError {
    UsageError(message.into())
}

pub fn parse_args<I>(args: I) -> Result<Command, UsageError>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    let mut args = args.into_iter().map(Into::<String>::into);
    let Some(command) = args.next() else {
        return Ok(Command::Help);
    };

    let command = match command.as_str() {
        "-h" | "--help" | "help" => Command::Help,
        "-V" | "--version" => Command::Version,
        "list" => Command::List,
        "scoreboard" => Command::Scoreboard,
        "odds" => Command::Odds,
        "boxscore" => Command::BoxScore {
            game_id: game_id_arg(&command, args.next())?,
        },
        "playbyplay" => Command::PlayByPlay {
            game_id: game_id_arg(&command, args.next())?,
        },
        "stats" => return parse_stats(args),
        other => return Err(usage(format!("Unknown argument: {other}"))),
    };

    match args.next() {
        Some(extra) => Err(usage(format!("Unexpected argument: {extra}"))),
        None => Ok(command),
    }
}

fn game_id_arg(command: &str, arg: Option<String>) -> Result<String, UsageError> {
    match arg {
        Some(id) if !id.trim().is_empty() => Ok(id.trim().to_owned()),
        _ => Err(usage(format!("{command} needs a game id, e.g. 0022300573"))),
    }
}

fn parse_stats(args: impl Iterator<Item = String>) -> Result<Command, UsageError> {
    let mut endpoint = None;
    let mut params = Vec::new();
    let mut json = false;

    for arg in args {
        if arg == "--json" {
            json = true;
        } else if endpoint.is_none() {
            endpoint = Some(
                nba_api::find_endpoint(&arg)
                    .ok_or_else(|| usage(format!("Unknown endpoint: {arg} (try `nbastats list`)")))?,
            );
        } else {
            let (key, value) = arg
                .split_once('=')
                .filter(|(key, _)| !key.is_empty())
                .ok_or_else(|| usage(format!("Expected Key=Value, got {arg}")))?;
            params.push((key.to_owned(), value.to_owned()));
        }
    }

    let endpoint = endpoint.ok_or_else(|| usage("stats needs an endpoint name"))?;
    Ok(Command::Stats {
        endpoint,
        params,
        json,
    })
}

/// Fill in `Season` and `LeagueID` when the endpoint takes them and the
/// caller left them out.
pub fn with_defaults(
    endpoint: &EndpointDescriptor,
    mut params: Vec<(String, String)>,
    season: &str,
) -> Vec<(String, String)> {
    let defaults = [("Season", season), ("LeagueID", nba_api::LEAGUE_ID_NBA)];
    for (key, value) in defaults {
        if endpoint.param(key).is_some() && !params.iter().any(|(k, _)| k == key) {
            params.push((key.to_owned(), value.to_owned()));
        }
    }
    params
}

pub fn usage_text() -> &'static str {
    "nbastats - NBA Stats and Live Data from the terminal

Usage:
  nbastats list
  nbastats stats <endpoint> [Key=Value ...] [--json]
  nbastats scoreboard
  nbastats boxscore <gameId>
  nbastats playbyplay <gameId>
  nbastats odds
  nbastats --help
  nbastats --version

Season defaults to the current season and LeagueID to 00 when an endpoint
takes them.

Environment:
  NBASTATS_STATS_URL      Stats base URL (default https://stats.nba.com/stats/{endpoint})
  NBASTATS_LIVE_URL       Live base URL (default https://cdn.nba.com/static/json/liveData/{endpoint})
  NBASTATS_TIMEOUT_SECS   Request timeout in seconds (default 30)
  NBASTATS_LOG            Log filter, falls back to RUST_LOG (default warn)"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Command, UsageError> {
        parse_args(args.iter().copied())
    }

    #[test]
    fn no_arguments_prints_help() {
        assert_eq!(parse(&[]), Ok(Command::Help));
        assert_eq!(parse(&["-h"]), Ok(Command::Help));
        assert_eq!(parse(&["--version"]), Ok(Command::Version));
    }

    #[test]
    fn stats_collects_endpoint_params_and_json_flag() {
        let Ok(Command::Stats {
            endpoint,
            params,
            json,
        }) = parse(&["stats", "playercareerstats", "PlayerID=2544", "--json", "PerMode36=Totals"])
        else {
            panic!("expected stats command");
        };
        assert_eq!(endpoint.name, "PlayerCareerStats");
        assert!(json);
        assert_eq!(
            params,
            vec![
                ("PlayerID".to_owned(), "2544".to_owned()),
                ("PerMode36".to_owned(), "Totals".to_owned()),
            ]
        );
    }

    #[test]
    fn values_may_contain_equals_or_be_empty() {
        let Ok(Command::Stats { params, .. }) =
            parse(&["stats", "leaguegamefinder", "PlayerOrTeam=T", "DateFrom=", "Q=a=b"])
        else {
            panic!("expected stats command");
        };
        assert_eq!(params[1], ("DateFrom".to_owned(), String::new()));
        assert_eq!(params[2], ("Q".to_owned(), "a=b".to_owned()));
    }

    #[test]
    fn stats_usage_errors() {
        assert!(parse(&["stats"]).is_err());
        assert!(parse(&["stats", "nosuchendpoint"]).unwrap_err().0.contains("Unknown endpoint"));
        assert!(parse(&["stats", "commonallplayers", "Season"]).is_err());
        assert!(parse(&["stats", "commonallplayers", "=2023-24"]).is_err());
    }

    #[test]
    fn live_commands() {
        assert_eq!(parse(&["scoreboard"]), Ok(Command::Scoreboard));
        assert_eq!(parse(&["odds"]), Ok(Command::Odds));
        assert_eq!(
            parse(&["boxscore", "0022300573"]),
            Ok(Command::BoxScore {
                game_id: "0022300573".to_owned()
            })
        );
        assert_eq!(
            parse(&["playbyplay", "0022300573"]),
            Ok(Command::PlayByPlay {
                game_id: "0022300573".to_owned()
            })
        );
        assert!(parse(&["boxscore"]).is_err());
        assert!(parse(&["scoreboard", "extra"]).is_err());
        assert!(parse(&["--bogus"]).is_err());
    }

    #[test]
    fn defaults_fill_only_known_missing_params() {
        let endpoint = nba_api::find_endpoint("commonallplayers").unwrap();
        let params = with_defaults(
            endpoint,
            vec![("Season".to_owned(), "1999-00".to_owned())],
            "2025-26",
        );
        assert_eq!(
            params,
            vec![
                ("Season".to_owned(), "1999-00".to_owned()),
                ("LeagueID".to_owned(), "00".to_owned()),
            ]
        );

        let awards = nba_api::find_endpoint("playerawards").unwrap();
        assert!(with_defaults(awards, Vec::new(), "2025-26").is_empty());
    }
}
