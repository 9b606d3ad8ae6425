//! Request parameters and query-string encoding.
use chrono::{DateTime, Datelike, Utc};
use std::collections::{BTreeMap, BTreeSet};
use url::form_urlencoded;

/// `LeagueID` value for the NBA. The stats API also knows `10` (WNBA) and `20` (G League).
pub const LEAGUE_ID_NBA: &str = "00";

/// Wire-name → value mapping for one request.
///
/// Keys iterate in ascending byte order, so the same parameters always encode
/// to the same query string. Empty values are left out of the query unless
/// the key was marked with [`Params::keep_empty`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    values: BTreeMap<String, String>,
    keep_empty: BTreeSet<String>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`Params::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Set `key`, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Send `key=` even when its value is empty. Some stats endpoints answer
    /// 400 when a parameter is missing outright.
    pub fn keep_empty(&mut self, key: impl Into<String>) -> &mut Self {
        let key = key.into();
        self.values.entry(key.clone()).or_default();
        self.keep_empty.insert(key);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Every stored pair, sorted by key, empty values included.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The pairs that make it onto the wire, sorted by key.
    pub fn encoded_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter()
            .filter(|(k, v)| !v.is_empty() || self.keep_empty.contains(*k))
    }

    /// Form-urlencoded query string without the leading `?`. Empty when no
    /// pair survives filtering.
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in self.encoded_pairs() {
            serializer.append_pair(key, value);
        }
        serializer.finish()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for Params {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

/// First calendar year of the season in progress at `now`. Regular seasons
/// tip off in October, so January through September belong to the season
/// that started the previous autumn.
pub fn season_start_year(now: DateTime<Utc>) -> i32 {
    if now.month() >= 10 { now.year() } else { now.year() - 1 }
}

/// Season label in the form the stats API expects, e.g. `2024-25`.
pub fn season_label(start_year: i32) -> String {
    format!("{start_year}-{:02}", (start_year + 1).rem_euclid(100))
}

pub fn current_season() -> String {
    season_label(season_start_year(Utc::now()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn query_keys_are_sorted_ascending() {
        let params = Params::from([
            ("Season", "2023-24"),
            ("LeagueID", "00"),
            ("PerMode", "Totals"),
            ("IsOnlyCurrentSeason", "1"),
        ]);
        assert_eq!(
            params.to_query_string(),
            "IsOnlyCurrentSeason=1&LeagueID=00&PerMode=Totals&Season=2023-24"
        );

        let keys: Vec<&str> = params.encoded_pairs().map(|(k, _)| k).collect();
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn sort_order_is_bytewise_not_case_folded() {
        let params = Params::from([("b", "1"), ("B", "2"), ("a", "3")]);
        assert_eq!(params.to_query_string(), "B=2&a=3&b=1");
    }

    #[test]
    fn empty_values_are_omitted() {
        let params = Params::from([("b", "2"), ("a", "1"), ("c", "")]);
        assert_eq!(params.to_query_string(), "a=1&b=2");
        assert!(params.contains_key("c"));
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn only_empty_values_give_empty_query() {
        let params = Params::from([("a", ""), ("b", "")]);
        assert_eq!(params.to_query_string(), "");
        assert_eq!(Params::new().to_query_string(), "");
    }

    #[test]
    fn keep_empty_sends_bare_key() {
        let mut params = Params::from([("Season", "2023-24")]);
        params.keep_empty("DateFrom");
        assert_eq!(params.to_query_string(), "DateFrom=&Season=2023-24");
    }

    #[test]
    fn keep_empty_does_not_clobber_existing_value() {
        let mut params = Params::new().with("Period", "2");
        params.keep_empty("Period");
        assert_eq!(params.get("Period"), Some("2"));
        assert_eq!(params.to_query_string(), "Period=2");
    }

    #[test]
    fn values_are_form_encoded() {
        let params = Params::from([("PlayerName", "Luka Dončić"), ("Q", "a&b=c")]);
        assert_eq!(
            params.to_query_string(),
            "PlayerName=Luka+Don%C4%8Di%C4%87&Q=a%26b%3Dc"
        );
    }

    #[test]
    fn insert_replaces_previous_value() {
        let mut params = Params::new();
        params.insert("GameID", "1").insert("GameID", "0022300001");
        assert_eq!(params.get("GameID"), Some("0022300001"));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn season_start_year_rolls_over_in_october() {
        let sep = Utc.with_ymd_and_hms(2025, 9, 30, 23, 59, 59).unwrap();
        let oct = Utc.with_ymd_and_hms(2025, 10, 1, 0, 0, 0).unwrap();
        let feb = Utc.with_ymd_and_hms(2026, 2, 24, 12, 0, 0).unwrap();
        assert_eq!(season_start_year(sep), 2024);
        assert_eq!(season_start_year(oct), 2025);
        assert_eq!(season_start_year(feb), 2025);
    }

    #[test]
    fn season_label_wraps_century() {
        assert_eq!(season_label(2024), "2024-25");
        assert_eq!(season_label(1999), "1999-00");
        assert_eq!(season_label(2008), "2008-09");
    }
}
