// 🔍 Entity Resolver - One identity per person across both corpora
// Exact-key matching on (normalized name, country code). Deliberate
// precision/recall trade: fast and deterministic, but a person whose name
// order or spelling diverges beyond the normalization rules becomes a
// second identity. No fuzzy or phonetic fallback.

use crate::dates::normalize_date;
use crate::names::normalize_roster_name;
use crate::records::{Athlete, RosterEntry};
use std::collections::HashMap;

// ============================================================================
// ENTITY RESOLVER
// ============================================================================

/// Identity index over the athlete population.
///
/// Built once by scanning the population; thereafter resolves addendum
/// entities to existing identities or mints new ones. Identity ids are
/// never reused or mutated; matched rows are only enriched (empty-field
/// backfill via the id -> row-index map).
pub struct EntityResolver {
    /// (name lower-cased, noc upper-cased) -> athlete_id
    key_to_id: HashMap<(String, String), String>,

    /// athlete_id -> position in the athlete vector, for O(1) enrichment
    id_to_index: HashMap<String, usize>,

    /// Next free numeric id (historical max + 1)
    next_athlete_id: u64,

    /// New identities minted during resolution
    pub minted: usize,

    /// Existing identities that received at least one backfilled field
    pub enriched: usize,
}

impl EntityResolver {
    pub fn new(athletes: &[Athlete]) -> Self {
        let mut key_to_id = HashMap::new();
        let mut id_to_index = HashMap::new();
        let mut max_id = 0u64;

        for (idx, athlete) in athletes.iter().enumerate() {
            if !athlete.name.is_empty() && !athlete.country_noc.is_empty() {
                key_to_id
                    .entry(identity_key(&athlete.name, &athlete.country_noc))
                    .or_insert_with(|| athlete.athlete_id.clone());
            }
            if !athlete.athlete_id.is_empty() {
                id_to_index.insert(athlete.athlete_id.clone(), idx);
                if let Ok(id) = athlete.athlete_id.parse::<u64>() {
                    max_id = max_id.max(id);
                }
            }
        }

        EntityResolver {
            key_to_id,
            id_to_index,
            next_athlete_id: max_id + 1,
            minted: 0,
            enriched: 0,
        }
    }

    /// Exact-key identity lookup.
    pub fn lookup(&self, name: &str, noc: &str) -> Option<&str> {
        self.key_to_id
            .get(&identity_key(name, noc))
            .map(|id| id.as_str())
    }

    /// Resolve one roster entry: retrieve the matching identity and backfill
    /// its empty attributes, or mint a new identity and register it.
    /// Returns None when the entry lacks a code, name, or country.
    pub fn resolve_roster_entry(
        &mut self,
        athletes: &mut Vec<Athlete>,
        entry: &RosterEntry,
    ) -> Option<String> {
        let name = normalize_roster_name(&entry.name, &entry.alt_name);
        let noc = entry.country_noc.trim().to_uppercase();
        if entry.code.trim().is_empty() || name.is_empty() || noc.is_empty() {
            return None;
        }

        // "0" height/weight means unknown in the roster source
        let height = non_zero(&entry.height);
        let weight = non_zero(&entry.weight);

        if let Some(athlete_id) = self.lookup(&name, &noc) {
            let athlete_id = athlete_id.to_string();
            if let Some(&idx) = self.id_to_index.get(&athlete_id) {
                let row = &mut athletes[idx];
                let mut touched = false;

                if row.born.is_none() {
                    if let Some(born) = normalize_date(&entry.birth) {
                        row.born = Some(born);
                        touched = true;
                    }
                }
                if row.height.is_empty() && !height.is_empty() {
                    row.height = height.to_string();
                    touched = true;
                }
                if row.weight.is_empty() && !weight.is_empty() {
                    row.weight = weight.to_string();
                    touched = true;
                }
                if row.country.is_empty() && !entry.country_name.is_empty() {
                    row.country = entry.country_name.clone();
                    touched = true;
                }

                if touched {
                    self.enriched += 1;
                }
            }
            return Some(athlete_id);
        }

        let athlete = Athlete {
            athlete_id: String::new(), // assigned by register
            name,
            sex: sex_from_gender(&entry.gender),
            born: normalize_date(&entry.birth),
            height: height.to_string(),
            weight: weight.to_string(),
            country: entry.country_name.clone(),
            country_noc: noc,
        };
        Some(self.register(athletes, athlete))
    }

    /// Mint an identity carrying only name/sex/country. Used for medallists
    /// that appear in no roster (the backfill pass).
    pub fn register_minimal(
        &mut self,
        athletes: &mut Vec<Athlete>,
        name: &str,
        noc: &str,
        gender: &str,
    ) -> String {
        self.register(
            athletes,
            Athlete {
                athlete_id: String::new(),
                name: name.to_string(),
                sex: sex_from_gender(gender),
                born: None,
                height: String::new(),
                weight: String::new(),
                country: String::new(),
                country_noc: noc.to_uppercase(),
            },
        )
    }

    fn register(&mut self, athletes: &mut Vec<Athlete>, mut athlete: Athlete) -> String {
        let athlete_id = self.next_athlete_id.to_string();
        self.next_athlete_id += 1;
        athlete.athlete_id = athlete_id.clone();

        self.key_to_id.insert(
            identity_key(&athlete.name, &athlete.country_noc),
            athlete_id.clone(),
        );
        self.id_to_index.insert(athlete_id.clone(), athletes.len());
        athletes.push(athlete);
        self.minted += 1;

        athlete_id
    }
}

fn identity_key(name: &str, noc: &str) -> (String, String) {
    (name.trim().to_lowercase(), noc.trim().to_uppercase())
}

fn non_zero(value: &str) -> &str {
    let value = value.trim();
    if value == "0" {
        ""
    } else {
        value
    }
}

/// Map a roster gender field onto the historical sex convention.
fn sex_from_gender(gender: &str) -> String {
    let gender = gender.trim().to_lowercase();
    if gender.starts_with('m') {
        "Male".to_string()
    } else if gender.starts_with('f') {
        "Female".to_string()
    } else {
        String::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn athlete(id: &str, name: &str, noc: &str) -> Athlete {
        Athlete {
            athlete_id: id.to_string(),
            name: name.to_string(),
            sex: "Male".to_string(),
            born: None,
            height: String::new(),
            weight: String::new(),
            country: String::new(),
            country_noc: noc.to_string(),
        }
    }

    fn entry(code: &str, name: &str, noc: &str) -> RosterEntry {
        RosterEntry {
            code: code.to_string(),
            name: name.to_string(),
            alt_name: String::new(),
            gender: "Male".to_string(),
            country_noc: noc.to_string(),
            country_name: String::new(),
            birth: String::new(),
            height: String::new(),
            weight: String::new(),
            events: Vec::new(),
        }
    }

    #[test]
    fn test_lookup_is_case_insensitive_on_key() {
        let population = vec![athlete("17", "Artur Aleksanyan", "ARM")];
        let resolver = EntityResolver::new(&population);
        assert_eq!(resolver.lookup("artur aleksanyan", "arm"), Some("17"));
        assert_eq!(resolver.lookup("artur aleksanyan", "USA"), None);
    }

    #[test]
    fn test_existing_identity_is_reused() {
        let mut population = vec![athlete("17", "Artur Aleksanyan", "ARM")];
        let mut resolver = EntityResolver::new(&population);

        let id = resolver
            .resolve_roster_entry(&mut population, &entry("1535270", "ALEKSANYAN Artur", "ARM"))
            .unwrap();
        assert_eq!(id, "17");
        assert_eq!(population.len(), 1);
        assert_eq!(resolver.minted, 0);
    }

    #[test]
    fn test_new_identity_minted_after_max_id() {
        let mut population = vec![athlete("17", "Artur Aleksanyan", "ARM"), athlete("903", "B C", "USA")];
        let mut resolver = EntityResolver::new(&population);

        let id = resolver
            .resolve_roster_entry(&mut population, &entry("77", "NOWAK Jan", "POL"))
            .unwrap();
        assert_eq!(id, "904");
        assert_eq!(population.len(), 3);
        assert_eq!(population[2].name, "Jan Nowak");
        assert_eq!(resolver.minted, 1);
    }

    #[test]
    fn test_backfill_never_overwrites() {
        let mut population = vec![athlete("17", "Artur Aleksanyan", "ARM")];
        population[0].height = "184".to_string();
        let mut resolver = EntityResolver::new(&population);

        let mut e = entry("1535270", "ALEKSANYAN Artur", "ARM");
        e.birth = "1991-10-21".to_string();
        e.height = "190".to_string();
        e.weight = "97".to_string();
        resolver.resolve_roster_entry(&mut population, &e);

        // Empty fields filled, existing height untouched
        assert_eq!(
            population[0].born,
            Some(NaiveDate::from_ymd_opt(1991, 10, 21).unwrap())
        );
        assert_eq!(population[0].height, "184");
        assert_eq!(population[0].weight, "97");
        assert_eq!(resolver.enriched, 1);
    }

    #[test]
    fn test_zero_height_weight_treated_as_missing() {
        let mut population = vec![athlete("17", "Artur Aleksanyan", "ARM")];
        let mut resolver = EntityResolver::new(&population);

        let mut e = entry("1535270", "ALEKSANYAN Artur", "ARM");
        e.height = "0".to_string();
        resolver.resolve_roster_entry(&mut population, &e);
        assert_eq!(population[0].height, "");
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let base = vec![athlete("5", "A B", "SUI")];
        let entries = vec![entry("1", "NOWAK Jan", "POL"), entry("2", "SMITH Ann", "USA")];

        let mut run = |entries: &[RosterEntry]| {
            let mut population = base.clone();
            let mut resolver = EntityResolver::new(&population);
            entries
                .iter()
                .map(|e| resolver.resolve_roster_entry(&mut population, e).unwrap())
                .collect::<Vec<_>>()
        };

        assert_eq!(run(&entries), run(&entries));
        assert_eq!(run(&entries), vec!["6".to_string(), "7".to_string()]);
    }

    #[test]
    fn test_divergent_spelling_is_two_identities() {
        // Known false negative: exact-key only, no fuzzy matching
        let mut population = vec![athlete("17", "Artur Aleksanian", "ARM")];
        let mut resolver = EntityResolver::new(&population);
        let id = resolver
            .resolve_roster_entry(&mut population, &entry("1", "ALEKSANYAN Artur", "ARM"))
            .unwrap();
        assert_eq!(id, "18");
        assert_eq!(population.len(), 2);
    }

    #[test]
    fn test_incomplete_entry_is_skipped() {
        let mut population = vec![];
        let mut resolver = EntityResolver::new(&population);
        assert!(resolver
            .resolve_roster_entry(&mut population, &entry("", "NOWAK Jan", "POL"))
            .is_none());
        assert!(resolver
            .resolve_roster_entry(&mut population, &entry("9", "", "POL"))
            .is_none());
    }
}
