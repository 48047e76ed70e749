// 🥇 Aggregation Engine - Per-(edition, country) medal summary
// Streams all participation records into lazily-created buckets.
//
// Counting rules:
// - Historical editions count row-based: a team of eleven medal winners is
//   eleven medals, matching the archive's convention.
// - The addendum edition counts each team medal exactly once per
//   (edition, country, event, medal), however many member rows share it.
// - Participant count is the cardinality of the distinct identity set,
//   never a row count.

use crate::records::{Medal, ResultRow};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

// ============================================================================
// TALLY BUCKET
// ============================================================================

/// Aggregation state for one (edition_id, country code) pair.
#[derive(Debug, Clone, Default)]
struct TallyBucket {
    /// Edition label seen on the rows, fallback when the edition map misses
    edition: String,
    athletes: HashSet<String>,
    gold: u32,
    silver: u32,
    bronze: u32,
}

/// One finalized summary row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallyRow {
    pub edition_id: String,
    pub edition: String,
    pub noc: String,
    pub country: String,
    pub gold: u32,
    pub silver: u32,
    pub bronze: u32,
    pub total: u32,
    pub athletes: u32,
}

// ============================================================================
// AGGREGATION ENGINE
// ============================================================================

pub struct AggregationEngine {
    /// Edition whose team medals are deduplicated (exactly-once rule)
    addendum_edition_id: String,
}

impl AggregationEngine {
    pub fn new(addendum_edition_id: &str) -> Self {
        AggregationEngine {
            addendum_edition_id: addendum_edition_id.to_string(),
        }
    }

    /// Aggregate the full participation record set into sorted tally rows.
    pub fn tally(
        &self,
        rows: &[ResultRow],
        countries: &HashMap<String, String>,
        edition_names: &HashMap<String, String>,
    ) -> Vec<TallyRow> {
        let mut buckets: HashMap<(String, String), TallyBucket> = HashMap::new();
        let mut seen_team_medals: HashSet<(String, String, String, Medal)> = HashSet::new();

        for row in rows {
            let noc = row.country_noc.trim().to_uppercase();
            if row.edition_id.is_empty() || noc.is_empty() || row.athlete_id.is_empty() {
                continue;
            }

            let bucket = buckets
                .entry((row.edition_id.clone(), noc.clone()))
                .or_default();
            if bucket.edition.is_empty() {
                bucket.edition = row.edition.clone();
            }
            bucket.athletes.insert(row.athlete_id.clone());

            let medal = match row.medal {
                Some(medal) => medal,
                None => continue,
            };

            // Exactly-once rule for addendum team medals
            if row.edition_id == self.addendum_edition_id
                && row.is_team_sport
                && !row.event.is_empty()
            {
                let key = (row.edition_id.clone(), noc.clone(), row.event.clone(), medal);
                if !seen_team_medals.insert(key) {
                    continue;
                }
            }

            match medal {
                Medal::Gold => bucket.gold += 1,
                Medal::Silver => bucket.silver += 1,
                Medal::Bronze => bucket.bronze += 1,
            }
        }

        let mut keys: Vec<(String, String)> = buckets.keys().cloned().collect();
        // Numeric ascending where parseable (unparseable first), then noc
        keys.sort_by_key(|(edition_id, noc)| {
            (edition_id.parse::<i64>().unwrap_or(0), noc.clone())
        });

        keys.into_iter()
            .map(|key| {
                let bucket = &buckets[&key];
                let (edition_id, noc) = key;
                TallyRow {
                    edition: edition_names
                        .get(&edition_id)
                        .cloned()
                        .unwrap_or_else(|| bucket.edition.clone()),
                    country: countries.get(&noc).cloned().unwrap_or_else(|| noc.clone()),
                    gold: bucket.gold,
                    silver: bucket.silver,
                    bronze: bucket.bronze,
                    total: bucket.gold + bucket.silver + bucket.bronze,
                    athletes: bucket.athletes.len() as u32,
                    edition_id,
                    noc,
                }
            })
            .collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const ADDENDUM_ID: &str = "63";

    fn row(
        edition_id: &str,
        noc: &str,
        athlete_id: &str,
        event: &str,
        medal: Option<Medal>,
        is_team: bool,
    ) -> ResultRow {
        ResultRow {
            edition: format!("Edition {}", edition_id),
            edition_id: edition_id.to_string(),
            country_noc: noc.to_string(),
            sport: "Sport".to_string(),
            event: event.to_string(),
            result_id: "1".to_string(),
            athlete: "Test Athlete".to_string(),
            athlete_id: athlete_id.to_string(),
            pos: String::new(),
            medal,
            is_team_sport: is_team,
            age: None,
        }
    }

    fn tally(rows: &[ResultRow]) -> Vec<TallyRow> {
        AggregationEngine::new(ADDENDUM_ID).tally(rows, &HashMap::new(), &HashMap::new())
    }

    #[test]
    fn test_historical_team_medals_count_row_based() {
        // Historical convention: every member row counts
        let rows: Vec<ResultRow> = (0..11)
            .map(|i| row("10", "URU", &format!("a{}", i), "Football", Some(Medal::Gold), true))
            .collect();
        let result = tally(&rows);
        assert_eq!(result[0].gold, 11);
        assert_eq!(result[0].athletes, 11);
    }

    #[test]
    fn test_addendum_team_medal_counts_once() {
        let rows: Vec<ResultRow> = (0..11)
            .map(|i| {
                row(ADDENDUM_ID, "ESP", &format!("a{}", i), "Football", Some(Medal::Gold), true)
            })
            .collect();
        let result = tally(&rows);
        assert_eq!(result[0].gold, 1);
        assert_eq!(result[0].athletes, 11);
        assert_eq!(result[0].total, 1);
    }

    #[test]
    fn test_addendum_individual_medals_stay_row_based() {
        let rows = vec![
            row(ADDENDUM_ID, "USA", "a1", "100m", Some(Medal::Gold), false),
            row(ADDENDUM_ID, "USA", "a2", "200m", Some(Medal::Gold), false),
        ];
        let result = tally(&rows);
        assert_eq!(result[0].gold, 2);
    }

    #[test]
    fn test_addendum_distinct_team_medals_both_count() {
        // Same country, two different team events
        let rows = vec![
            row(ADDENDUM_ID, "FRA", "a1", "Team Foil", Some(Medal::Silver), true),
            row(ADDENDUM_ID, "FRA", "a2", "Team Foil", Some(Medal::Silver), true),
            row(ADDENDUM_ID, "FRA", "a3", "Team Epee", Some(Medal::Silver), true),
        ];
        let result = tally(&rows);
        assert_eq!(result[0].silver, 2);
    }

    #[test]
    fn test_participant_count_is_distinct_identities() {
        let rows = vec![
            row("5", "HUN", "a1", "100m", None, false),
            row("5", "HUN", "a1", "200m", None, false),
            row("5", "HUN", "a2", "100m", None, false),
        ];
        let result = tally(&rows);
        assert_eq!(result[0].athletes, 2);
        assert_eq!(result[0].total, 0);
    }

    #[test]
    fn test_rows_missing_keys_are_skipped() {
        let rows = vec![
            row("5", "", "a1", "100m", Some(Medal::Gold), false),
            row("", "HUN", "a1", "100m", Some(Medal::Gold), false),
            row("5", "HUN", "", "100m", Some(Medal::Gold), false),
        ];
        assert!(tally(&rows).is_empty());
    }

    #[test]
    fn test_sorted_numeric_then_noc() {
        let rows = vec![
            row("10", "URU", "a1", "e", None, false),
            row("2", "USA", "a2", "e", None, false),
            row("2", "FRA", "a3", "e", None, false),
        ];
        let result = tally(&rows);
        let order: Vec<(&str, &str)> = result
            .iter()
            .map(|r| (r.edition_id.as_str(), r.noc.as_str()))
            .collect();
        assert_eq!(order, vec![("2", "FRA"), ("2", "USA"), ("10", "URU")]);
    }

    #[test]
    fn test_name_maps_applied_with_fallback() {
        let rows = vec![row("5", "HUN", "a1", "e", None, false)];
        let mut countries = HashMap::new();
        countries.insert("HUN".to_string(), "Hungary".to_string());
        let mut editions = HashMap::new();
        editions.insert("5".to_string(), "1906 Intercalated Games".to_string());

        let result = AggregationEngine::new(ADDENDUM_ID).tally(&rows, &countries, &editions);
        assert_eq!(result[0].country, "Hungary");
        assert_eq!(result[0].edition, "1906 Intercalated Games");

        // Fallbacks: noc stands in for the country, row label for the edition
        let bare = tally(&rows);
        assert_eq!(bare[0].country, "HUN");
        assert_eq!(bare[0].edition, "Edition 5");
    }
}
