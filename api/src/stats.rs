//! The `resource / parameters / resultSets[]` envelope shared by the
//! tabular stats endpoints, and helpers to read it without fixed schemas.
use crate::client::{ApiError, ApiResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One row zipped with its headers.
pub type RowMap = BTreeMap<String, Cell>;

/// A single `rowSet` value. The feeds only ever put scalars in rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Cell::Int(i) => Some(*i),
            // i64::MAX as f64 rounds up to 2^63, hence the half-open range.
            Cell::Float(f) if f.fract() == 0.0 && (i64::MIN as f64..i64::MAX as f64).contains(f) => {
                Some(*f as i64)
            }
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(i) => Some(*i as f64),
            Cell::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Cell::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => Ok(()),
            Cell::Bool(b) => write!(f, "{b}"),
            Cell::Int(i) => write!(f, "{i}"),
            Cell::Float(x) => write!(f, "{x}"),
            Cell::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Str(value.to_owned())
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Int(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Float(value)
    }
}

/// Decoded tabular stats response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsResponse {
    #[serde(default)]
    pub resource: String,
    /// Echo of the request parameters; shape varies by endpoint.
    #[serde(default)]
    pub parameters: serde_json::Value,
    /// `leagueleaders` and a few others send a single `resultSet` object.
    #[serde(
        rename = "resultSets",
        alias = "resultSet",
        default,
        deserialize_with = "one_or_many"
    )]
    pub result_sets: Vec<ResultSet>,
}

impl StatsResponse {
    /// First result set whose name matches exactly (case-sensitive).
    pub fn data_set(&self, name: &str) -> ApiResult<&ResultSet> {
        self.result_sets
            .iter()
            .find(|rs| rs.name == name)
            .ok_or_else(|| ApiError::DataSetNotFound(name.to_owned()))
    }

    pub fn data_set_names(&self) -> impl Iterator<Item = &str> {
        self.result_sets.iter().map(|rs| rs.name.as_str())
    }
}

/// One named dataset: column headers plus positional rows.
///
/// Rows are expected to be at least as long as `headers`, but nothing
/// enforces it; anything past the shorter of the two reads as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSet {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "flat_headers")]
    pub headers: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub row_set: Vec<Vec<Cell>>,
}

impl ResultSet {
    pub fn row_count(&self) -> usize {
        self.row_set.len()
    }

    /// Position of `header`, if present.
    pub fn column(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    /// Cell at `row` under `header`. `None` when either is out of range.
    pub fn cell(&self, row: usize, header: &str) -> Option<&Cell> {
        let col = self.column(header)?;
        self.row_set.get(row)?.get(col)
    }

    /// Every row as a header → cell map.
    pub fn to_maps(&self) -> Vec<RowMap> {
        self.row_set.iter().map(|row| self.zip_row(row)).collect()
    }

    /// Bounds-checked single row.
    pub fn row(&self, index: usize) -> ApiResult<RowMap> {
        self.row_set
            .get(index)
            .map(|row| self.zip_row(row))
            .ok_or(ApiError::RowOutOfRange {
                index,
                len: self.row_count(),
            })
    }

    /// `to_maps` as a JSON array of objects.
    pub fn to_json(&self) -> ApiResult<String> {
        serde_json::to_string(&self.to_maps()).map_err(|e| ApiError::Encode(e, self.name.clone()))
    }

    /// Deserialize every row into `T`, matching struct fields to headers.
    pub fn rows_as<T: DeserializeOwned>(&self) -> ApiResult<Vec<T>> {
        self.row_set
            .iter()
            .map(|row| {
                let value = serde_json::to_value(self.zip_row(row))
                    .map_err(|e| ApiError::Encode(e, self.name.clone()))?;
                serde_json::from_value(value).map_err(|e| ApiError::Decode(e, self.name.clone()))
            })
            .collect()
    }

    // zip stops at the shorter side.
    fn zip_row(&self, row: &[Cell]) -> RowMap {
        self.headers
            .iter()
            .zip(row)
            .map(|(header, cell)| (header.clone(), cell.clone()))
            .collect()
    }
}

fn one_or_many<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<ResultSet>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        Many(Vec<ResultSet>),
        One(ResultSet),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::Many(sets)) => sets,
        Some(OneOrMany::One(set)) => vec![set],
        None => Vec::new(),
    })
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Headers are usually plain strings. Shot-location style endpoints send
/// grouped headers instead; the last group carries the leaf column names.
fn flat_headers<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Header {
        Name(String),
        Group {
            #[serde(rename = "columnNames", default)]
            column_names: Vec<String>,
        },
    }

    let entries: Vec<Header> = null_as_default(deserializer)?;
    let last_group = entries.iter().rev().find_map(|h| match h {
        Header::Group { column_names } => Some(column_names.clone()),
        Header::Name(_) => None,
    });
    Ok(match last_group {
        Some(names) => names,
        None => entries
            .into_iter()
            .filter_map(|h| match h {
                Header::Name(name) => Some(name),
                Header::Group { .. } => None,
            })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    const SAMPLE: &str = r#"{
        "resource": "commonallplayers",
        "parameters": {"LeagueID": "00", "Season": "2023-24", "IsOnlyCurrentSeason": 1},
        "resultSets": [
            {
                "name": "CommonAllPlayers",
                "headers": ["PERSON_ID", "DISPLAY_FIRST_LAST", "ROSTERSTATUS", "PTS", "TEAM_ABBREVIATION"],
                "rowSet": [
                    [2544, "LeBron James", 1, 25.7, "LAL"],
                    [201939, "Stephen Curry", 1, 26.4, "GSW"],
                    [1630173, "Precious Achiuwa", 0, null, ""]
                ]
            },
            {"name": "Empty", "headers": ["A"], "rowSet": []}
        ]
    }"#;

    fn sample() -> StatsResponse {
        serde_json::from_str(SAMPLE).unwrap()
    }

    #[test]
    fn decodes_envelope() {
        let resp = sample();
        assert_eq!(resp.resource, "commonallplayers");
        assert_eq!(resp.parameters["Season"], "2023-24");
        assert_eq!(resp.result_sets.len(), 2);
        assert_eq!(
            resp.data_set_names().collect::<Vec<_>>(),
            vec!["CommonAllPlayers", "Empty"]
        );
    }

    #[test]
    fn cells_keep_their_types() {
        let resp = sample();
        let rs = resp.data_set("CommonAllPlayers").unwrap();
        assert_eq!(rs.row_set[0][0], Cell::Int(2544));
        assert_eq!(rs.row_set[0][1], Cell::Str("LeBron James".into()));
        assert_eq!(rs.row_set[0][3], Cell::Float(25.7));
        assert_eq!(rs.row_set[2][3], Cell::Null);
    }

    #[test]
    fn data_set_is_exact_and_case_sensitive() {
        let resp = sample();
        assert!(resp.data_set("CommonAllPlayers").is_ok());
        assert!(matches!(
            resp.data_set("commonallplayers"),
            Err(ApiError::DataSetNotFound(name)) if name == "commonallplayers"
        ));
        assert!(resp.data_set("Missing").is_err());
    }

    #[test]
    fn data_set_returns_first_of_duplicates() {
        let resp: StatsResponse = serde_json::from_str(
            r#"{"resultSets":[{"name":"A","headers":["X"],"rowSet":[[1]]},
                              {"name":"A","headers":["X"],"rowSet":[[2],[3]]}]}"#,
        )
        .unwrap();
        assert_eq!(resp.data_set("A").unwrap().row_count(), 1);
    }

    #[test]
    fn to_maps_uses_shorter_of_headers_and_row() {
        let rs = ResultSet {
            name: "Ragged".into(),
            headers: vec!["A".into(), "B".into(), "C".into()],
            row_set: vec![
                vec![Cell::Int(1)],
                vec![Cell::Int(1), Cell::Int(2), Cell::Int(3), Cell::Int(4)],
                vec![],
            ],
        };
        let maps = rs.to_maps();
        assert_eq!(maps.len(), 3);
        assert_eq!(maps[0].len(), 1);
        assert_eq!(maps[0]["A"], Cell::Int(1));
        assert_eq!(maps[1].len(), 3);
        assert_eq!(maps[1]["C"], Cell::Int(3));
        assert!(maps[2].is_empty());
    }

    #[test]
    fn row_matches_to_maps_and_checks_bounds() {
        let resp = sample();
        let rs = resp.data_set("CommonAllPlayers").unwrap();
        let maps = rs.to_maps();
        for i in 0..rs.row_count() {
            assert_eq!(rs.row(i).unwrap(), maps[i]);
        }
        assert!(matches!(
            rs.row(3),
            Err(ApiError::RowOutOfRange { index: 3, len: 3 })
        ));
        assert!(resp.data_set("Empty").unwrap().row(0).is_err());
    }

    #[test]
    fn to_json_serialises_row_maps() {
        let rs = ResultSet {
            name: "A".into(),
            headers: vec!["X".into(), "Y".into()],
            row_set: vec![vec![Cell::Int(1), Cell::Null], vec![Cell::Bool(true), "s".into()]],
        };
        assert_eq!(
            rs.to_json().unwrap(),
            r#"[{"X":1,"Y":null},{"X":true,"Y":"s"}]"#
        );
    }

    #[test]
    fn cell_lookup_by_header() {
        let resp = sample();
        let rs = resp.data_set("CommonAllPlayers").unwrap();
        assert_eq!(rs.column("PTS"), Some(3));
        assert_eq!(rs.cell(1, "TEAM_ABBREVIATION").and_then(Cell::as_str), Some("GSW"));
        assert_eq!(rs.cell(9, "PTS"), None);
        assert_eq!(rs.cell(0, "NOPE"), None);
    }

    #[test]
    fn rows_deserialise_into_structs() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Player {
            #[serde(rename = "PERSON_ID")]
            id: i64,
            #[serde(rename = "DISPLAY_FIRST_LAST")]
            name: String,
            #[serde(rename = "PTS")]
            points: Option<f64>,
        }

        let resp = sample();
        let players: Vec<Player> = resp.data_set("CommonAllPlayers").unwrap().rows_as().unwrap();
        assert_eq!(players.len(), 3);
        assert_eq!(
            players[1],
            Player { id: 201939, name: "Stephen Curry".into(), points: Some(26.4) }
        );
        assert_eq!(players[2].points, None);
    }

    #[test]
    fn singular_result_set_is_accepted() {
        let resp: StatsResponse = serde_json::from_str(
            r#"{"resource":"leagueleaders","parameters":{},
                "resultSet":{"name":"LeagueLeaders","headers":["PLAYER_ID","RANK"],"rowSet":[[203999,1]]}}"#,
        )
        .unwrap();
        assert_eq!(resp.result_sets.len(), 1);
        assert_eq!(resp.data_set("LeagueLeaders").unwrap().row_count(), 1);
    }

    #[test]
    fn missing_and_null_pieces_default() {
        let resp: StatsResponse =
            serde_json::from_str(r#"{"resultSets":[{"name":"A","headers":null,"rowSet":null}]}"#)
                .unwrap();
        assert_eq!(resp.resource, "");
        assert!(resp.parameters.is_null());
        let rs = resp.data_set("A").unwrap();
        assert!(rs.headers.is_empty());
        assert_eq!(rs.row_count(), 0);

        let none: StatsResponse = serde_json::from_str(r#"{"resultSets":null}"#).unwrap();
        assert!(none.result_sets.is_empty());
    }

    #[test]
    fn grouped_headers_flatten_to_leaf_columns() {
        let resp: StatsResponse = serde_json::from_str(
            r#"{"resultSets":{"name":"Shot Locations","headers":[
                {"name":"SHOT_CATEGORY","columnSpan":1,"columnsToSkip":2,"columnNames":["Restricted Area","Mid-Range"]},
                {"name":"columns","columnSpan":1,"columnNames":["PLAYER_ID","PLAYER_NAME","FGM"]}
              ],"rowSet":[[1,"A",3]]}}"#,
        )
        .unwrap();
        let rs = resp.data_set("Shot Locations").unwrap();
        assert_eq!(rs.headers, vec!["PLAYER_ID", "PLAYER_NAME", "FGM"]);
        assert_eq!(rs.cell(0, "FGM"), Some(&Cell::Int(3)));
    }

    #[test]
    fn cell_accessors_and_display() {
        assert_eq!(Cell::Int(7).as_f64(), Some(7.0));
        assert_eq!(Cell::Float(3.0).as_i64(), Some(3));
        assert_eq!(Cell::Float(3.5).as_i64(), None);
        assert_eq!(Cell::Bool(true).as_bool(), Some(true));
        assert!(Cell::Null.is_null());
        assert_eq!(Cell::Null.to_string(), "");
        assert_eq!(Cell::Float(0.5).to_string(), "0.5");
        assert_eq!(Cell::from("LAL").to_string(), "LAL");
    }

    #[test]
    fn large_unsigned_ids_fall_back_to_float() {
        let cells: Vec<Cell> = serde_json::from_str("[18446744073709551615, 1.0]").unwrap();
        assert!(matches!(cells[0], Cell::Float(_)));
        assert_eq!(cells[1], Cell::Float(1.0));
        assert_eq!(cells[0].as_i64(), None);
        assert_eq!(cells[1].as_i64(), Some(1));
    }

    #[test]
    fn as_i64_rejects_whole_floats_outside_i64() {
        assert_eq!(Cell::Float(1e30).as_i64(), None);
        assert_eq!(Cell::Float(-1e30).as_i64(), None);
        assert_eq!(Cell::Float(9_223_372_036_854_775_808.0).as_i64(), None);
        assert_eq!(Cell::Float(-9_223_372_036_854_775_808.0).as_i64(), Some(i64::MIN));
        assert_eq!(Cell::Float(f64::INFINITY).as_i64(), None);
        assert_eq!(Cell::Float(-42.0).as_i64(), Some(-42));
    }
}
