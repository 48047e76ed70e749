// 🧬 Event Synthesizer - Participation records for the addendum edition
// The addendum edition ships no native results file; its participation
// records are synthesized by joining four sources:
//   participant roster + event catalog + medallist results + team rosters
//
// Every row carries the addendum edition id and a team-event flag whose
// sole determinant is event-level evidence from the medallist source.

use crate::dates::ADDENDUM_EDITION_LABEL;
use crate::names::{format_display_name, normalize_roster_name};
use crate::records::{Athlete, Medal, ResultRow, RosterEntry};
use crate::resolver::EntityResolver;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

// ============================================================================
// ADDENDUM SOURCE RECORDS
// ============================================================================

/// One event -> sport association from the addendum event catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub event: String,
    pub sport: String,
}

/// One medallist result row. A non-empty team code marks the event as a
/// team event for every record sharing that event name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Medallist {
    pub code: String,
    pub name: String,
    pub gender: String,
    pub country_noc: String,
    pub event: String,
    pub medal_label: String,
    pub team_code: String,
}

/// One team with its member list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamRoster {
    pub team_code: String,
    pub event: String,
    pub country_noc: String,
    pub discipline: String,
    pub member_names: Vec<String>,
    pub member_codes: Vec<String>,
}

// ============================================================================
// SYNTHESIS REPORT
// ============================================================================

/// Row counts per pass plus data-quality gaps (skipped records).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SynthesisReport {
    pub roster_rows: usize,
    pub team_rows: usize,
    pub backfill_rows: usize,
    pub skipped: usize,
}

// ============================================================================
// EVENT SYNTHESIZER
// ============================================================================

pub struct EventSynthesizer {
    /// Captured addendum edition id, stamped on every synthesized row
    edition_id: String,

    /// Event name -> sport, from the catalog
    event_to_sport: HashMap<String, String>,

    /// (person code, event name) -> medal outcome
    medal_by_code_event: HashMap<(String, String), Medal>,

    /// Events with at least one medallist row carrying a team code.
    /// Sole determinant of the team-event flag.
    team_events: HashSet<String>,

    /// Continues the historical result-id sequence
    next_result_id: u64,

    /// Person code -> resolved athlete_id, filled by the roster pass
    code_to_athlete_id: HashMap<String, String>,

    /// (athlete_id, event) pairs already emitted, shared across all passes
    emitted: HashSet<(String, String)>,
}

impl EventSynthesizer {
    pub fn new(
        edition_id: &str,
        catalog: &[CatalogEntry],
        medallists: &[Medallist],
        next_result_id: u64,
    ) -> Self {
        let mut event_to_sport = HashMap::new();
        for entry in catalog {
            if !entry.event.is_empty() {
                event_to_sport.insert(entry.event.clone(), entry.sport.clone());
            }
        }

        let mut medal_by_code_event = HashMap::new();
        let mut team_events = HashSet::new();
        for m in medallists {
            if !m.code.is_empty() && !m.event.is_empty() {
                if let Some(medal) = Medal::from_label(&m.medal_label) {
                    medal_by_code_event.insert((m.code.clone(), m.event.clone()), medal);
                }
            }
            if !m.team_code.is_empty() && !m.event.is_empty() {
                team_events.insert(m.event.clone());
            }
        }

        EventSynthesizer {
            edition_id: edition_id.to_string(),
            event_to_sport,
            medal_by_code_event,
            team_events,
            next_result_id,
            code_to_athlete_id: HashMap::new(),
            emitted: HashSet::new(),
        }
    }

    /// Whether event-level evidence marks this a team event.
    pub fn is_team_event(&self, event: &str) -> bool {
        self.team_events.contains(event)
    }

    /// Run all synthesis passes. Unresolvable person codes or blank keys
    /// skip that single record and bump the gap counter, never abort.
    pub fn synthesize(
        &mut self,
        resolver: &mut EntityResolver,
        athletes: &mut Vec<Athlete>,
        roster: &[RosterEntry],
        teams: &[TeamRoster],
        medallists: &[Medallist],
    ) -> (Vec<ResultRow>, SynthesisReport) {
        let mut rows = Vec::new();
        let mut report = SynthesisReport::default();

        self.roster_pass(resolver, athletes, roster, &mut rows, &mut report);
        self.team_pass(resolver, teams, &mut rows, &mut report);
        self.backfill_pass(resolver, athletes, medallists, &mut rows, &mut report);

        (rows, report)
    }

    /// Pass 1: one row per (roster person, entered event).
    fn roster_pass(
        &mut self,
        resolver: &mut EntityResolver,
        athletes: &mut Vec<Athlete>,
        roster: &[RosterEntry],
        rows: &mut Vec<ResultRow>,
        report: &mut SynthesisReport,
    ) {
        for entry in roster {
            let athlete_id = match resolver.resolve_roster_entry(athletes, entry) {
                Some(id) => id,
                None => {
                    report.skipped += 1;
                    continue;
                }
            };
            self.code_to_athlete_id
                .insert(entry.code.trim().to_string(), athlete_id.clone());

            let display_name = normalize_roster_name(&entry.name, &entry.alt_name);
            let noc = entry.country_noc.trim().to_uppercase();

            for event in &entry.events {
                if event.is_empty() {
                    continue;
                }
                let medal = self
                    .medal_by_code_event
                    .get(&(entry.code.trim().to_string(), event.clone()))
                    .copied();
                rows.push(self.emit(&athlete_id, &display_name, &noc, event, medal));
                report.roster_rows += 1;
            }
        }
    }

    /// Pass 2: team members not already covered by the roster pass.
    /// Member resolution: person code first, then exact (name, team country).
    fn team_pass(
        &mut self,
        resolver: &EntityResolver,
        teams: &[TeamRoster],
        rows: &mut Vec<ResultRow>,
        report: &mut SynthesisReport,
    ) {
        for team in teams {
            if team.event.is_empty() || team.country_noc.is_empty() {
                report.skipped += 1;
                continue;
            }
            let noc = team.country_noc.trim().to_uppercase();

            for (i, raw_name) in team.member_names.iter().enumerate() {
                let code = match team.member_codes.get(i) {
                    Some(code) => code.trim().to_string(),
                    None => break, // member/code lists diverge past this point
                };
                let display_name = format_display_name(raw_name);

                let athlete_id = match self.code_to_athlete_id.get(&code) {
                    Some(id) => id.clone(),
                    None => match resolver.lookup(&display_name, &noc) {
                        Some(id) => id.to_string(),
                        None => {
                            report.skipped += 1;
                            continue;
                        }
                    },
                };

                let key = (athlete_id.clone(), team.event.clone());
                if self.emitted.contains(&key) {
                    continue;
                }

                let medal = self
                    .medal_by_code_event
                    .get(&(code, team.event.clone()))
                    .copied();
                let mut row = self.emit(&athlete_id, &display_name, &noc, &team.event, medal);
                // The catalog may not list team events; the roster's
                // discipline stands in for the sport there.
                if row.sport == "Unknown" && !team.discipline.is_empty() {
                    row.sport = team.discipline.clone();
                }
                rows.push(row);
                report.team_rows += 1;
            }
        }
    }

    /// Pass 3: medallists absent from the roster join. Mints an identity
    /// when even the exact-key lookup misses.
    fn backfill_pass(
        &mut self,
        resolver: &mut EntityResolver,
        athletes: &mut Vec<Athlete>,
        medallists: &[Medallist],
        rows: &mut Vec<ResultRow>,
        report: &mut SynthesisReport,
    ) {
        for m in medallists {
            let code = m.code.trim().to_string();
            let display_name = format_display_name(&m.name);
            let noc = m.country_noc.trim().to_uppercase();
            if code.is_empty() || display_name.is_empty() || noc.is_empty() || m.event.is_empty() {
                report.skipped += 1;
                continue;
            }

            let athlete_id = match self.code_to_athlete_id.get(&code) {
                Some(id) => id.clone(),
                None => match resolver.lookup(&display_name, &noc) {
                    Some(id) => id.to_string(),
                    None => resolver.register_minimal(athletes, &display_name, &noc, &m.gender),
                },
            };
            self.code_to_athlete_id.insert(code.clone(), athlete_id.clone());

            let key = (athlete_id.clone(), m.event.clone());
            if self.emitted.contains(&key) {
                continue;
            }

            let medal = Medal::from_label(&m.medal_label);
            rows.push(self.emit(&athlete_id, &display_name, &noc, &m.event, medal));
            report.backfill_rows += 1;
        }
    }

    /// Build one synthesized row, mark it emitted, advance the result id.
    fn emit(
        &mut self,
        athlete_id: &str,
        display_name: &str,
        noc: &str,
        event: &str,
        medal: Option<Medal>,
    ) -> ResultRow {
        self.emitted
            .insert((athlete_id.to_string(), event.to_string()));
        let result_id = self.next_result_id.to_string();
        self.next_result_id += 1;

        ResultRow {
            edition: ADDENDUM_EDITION_LABEL.to_string(),
            edition_id: self.edition_id.clone(),
            country_noc: noc.to_string(),
            sport: self
                .event_to_sport
                .get(event)
                .cloned()
                .unwrap_or_else(|| "Unknown".to_string()),
            event: event.to_string(),
            result_id,
            athlete: display_name.to_string(),
            athlete_id: athlete_id.to_string(),
            pos: medal.map(|m| m.pos().to_string()).unwrap_or_default(),
            medal,
            is_team_sport: self.team_events.contains(event),
            age: None,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn roster_entry(code: &str, name: &str, noc: &str, events: &[&str]) -> RosterEntry {
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
            events: events.iter().map(|e| e.to_string()).collect(),
        }
    }

    fn medallist(code: &str, name: &str, noc: &str, event: &str, medal: &str, team: &str) -> Medallist {
        Medallist {
            code: code.to_string(),
            name: name.to_string(),
            gender: "Male".to_string(),
            country_noc: noc.to_string(),
            event: event.to_string(),
            medal_label: medal.to_string(),
            team_code: team.to_string(),
        }
    }

    fn catalog(pairs: &[(&str, &str)]) -> Vec<CatalogEntry> {
        pairs
            .iter()
            .map(|(event, sport)| CatalogEntry {
                event: event.to_string(),
                sport: sport.to_string(),
            })
            .collect()
    }

    fn run(
        roster: &[RosterEntry],
        teams: &[TeamRoster],
        medallists: &[Medallist],
        catalog_entries: &[CatalogEntry],
    ) -> (Vec<ResultRow>, SynthesisReport, Vec<Athlete>) {
        let mut athletes: Vec<Athlete> = Vec::new();
        let mut resolver = EntityResolver::new(&athletes);
        let mut synthesizer = EventSynthesizer::new("63", catalog_entries, medallists, 1);
        let (rows, report) =
            synthesizer.synthesize(&mut resolver, &mut athletes, roster, teams, medallists);
        (rows, report, athletes)
    }

    #[test]
    fn test_roster_pass_joins_catalog_and_medals() {
        let roster = vec![roster_entry("100", "ALEKSANYAN Artur", "ARM", &["Greco 97kg"])];
        let medallists = vec![medallist("100", "ALEKSANYAN Artur", "ARM", "Greco 97kg", "Gold Medal", "")];
        let (rows, report, _) = run(
            &roster,
            &[],
            &medallists,
            &catalog(&[("Greco 97kg", "Wrestling")]),
        );

        assert_eq!(report.roster_rows, 1);
        let row = &rows[0];
        assert_eq!(row.edition, "2024 Summer Olympics");
        assert_eq!(row.edition_id, "63");
        assert_eq!(row.sport, "Wrestling");
        assert_eq!(row.medal, Some(Medal::Gold));
        assert_eq!(row.pos, "1");
        assert!(!row.is_team_sport);
    }

    #[test]
    fn test_unknown_event_maps_to_unknown_sport() {
        let roster = vec![roster_entry("100", "NOWAK Jan", "POL", &["Mystery Event"])];
        let (rows, _, _) = run(&roster, &[], &[], &[]);
        assert_eq!(rows[0].sport, "Unknown");
    }

    #[test]
    fn test_team_flag_uniform_from_medallist_evidence() {
        // Two entrants in the same event; one medalled with a team code.
        // Both rows carry the team flag.
        let roster = vec![
            roster_entry("100", "NOWAK Jan", "POL", &["4 x 100m Relay"]),
            roster_entry("101", "SMITH Ann", "USA", &["4 x 100m Relay"]),
        ];
        let medallists = vec![medallist("100", "NOWAK Jan", "POL", "4 x 100m Relay", "Bronze Medal", "T-POL")];
        let (rows, _, _) = run(&roster, &[], &medallists, &[]);

        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.is_team_sport));
    }

    #[test]
    fn test_team_pass_dedupes_against_roster_pass() {
        let roster = vec![roster_entry("100", "NOWAK Jan", "POL", &["Team Foil"])];
        let teams = vec![TeamRoster {
            team_code: "T1".to_string(),
            event: "Team Foil".to_string(),
            country_noc: "POL".to_string(),
            discipline: "Fencing".to_string(),
            member_names: vec!["NOWAK Jan".to_string(), "KOWALSKI Piotr".to_string()],
            member_codes: vec!["100".to_string(), "102".to_string()],
        }];
        // Piotr is in the roster (so his code resolves) but not entered in
        // the event; the team pass adds him exactly once.
        let mut roster = roster;
        roster.push(roster_entry("102", "KOWALSKI Piotr", "POL", &[]));

        let (rows, report, _) = run(&roster, &teams, &[], &[]);
        assert_eq!(report.roster_rows, 1);
        assert_eq!(report.team_rows, 1);
        assert_eq!(rows.len(), 2);
        // Team-pass names are case-normalized only, never reordered
        let piotr = rows.iter().find(|r| r.athlete == "Kowalski Piotr").unwrap();
        assert_eq!(piotr.sport, "Fencing");
    }

    #[test]
    fn test_team_member_medal_resolved_by_code() {
        let roster = vec![roster_entry("102", "KOWALSKI Piotr", "POL", &[])];
        let teams = vec![TeamRoster {
            team_code: "T1".to_string(),
            event: "Team Foil".to_string(),
            country_noc: "POL".to_string(),
            discipline: "Fencing".to_string(),
            member_names: vec!["KOWALSKI Piotr".to_string()],
            member_codes: vec!["102".to_string()],
        }];
        let medallists = vec![medallist("102", "KOWALSKI Piotr", "POL", "Team Foil", "Silver Medal", "T1")];
        let (rows, _, _) = run(&roster, &teams, &medallists, &[]);

        let piotr = rows.iter().find(|r| r.athlete == "Kowalski Piotr").unwrap();
        assert_eq!(piotr.medal, Some(Medal::Silver));
        assert!(piotr.is_team_sport);
    }

    #[test]
    fn test_unresolvable_team_member_is_skipped() {
        let teams = vec![TeamRoster {
            team_code: "T1".to_string(),
            event: "Team Foil".to_string(),
            country_noc: "POL".to_string(),
            discipline: "Fencing".to_string(),
            member_names: vec!["GHOST Person".to_string()],
            member_codes: vec!["999".to_string()],
        }];
        let (rows, report, _) = run(&[], &teams, &[], &[]);
        assert!(rows.is_empty());
        assert_eq!(report.skipped, 1);
    }

    #[test]
    fn test_backfill_covers_medallist_missing_from_roster() {
        let medallists = vec![medallist("500", "DOE Jane", "CAN", "100m", "Gold Medal", "")];
        let (rows, report, athletes) = run(&[], &[], &medallists, &catalog(&[("100m", "Athletics")]));

        assert_eq!(report.backfill_rows, 1);
        assert_eq!(rows[0].medal, Some(Medal::Gold));
        assert_eq!(rows[0].sport, "Athletics");
        // A minimal identity was minted for her (case-normalized only)
        assert_eq!(athletes.len(), 1);
        assert_eq!(athletes[0].name, "Doe Jane");
        assert_eq!(athletes[0].country_noc, "CAN");
    }

    #[test]
    fn test_backfill_skips_pairs_already_emitted() {
        let roster = vec![roster_entry("100", "ALEKSANYAN Artur", "ARM", &["Greco 97kg"])];
        let medallists = vec![medallist("100", "ALEKSANYAN Artur", "ARM", "Greco 97kg", "Gold Medal", "")];
        let (rows, report, _) = run(&roster, &[], &medallists, &[]);

        // Exactly one row for the (identity, event) pair, from the roster pass
        assert_eq!(rows.len(), 1);
        assert_eq!(report.backfill_rows, 0);
    }

    #[test]
    fn test_result_ids_continue_sequence() {
        let roster = vec![roster_entry("100", "NOWAK Jan", "POL", &["100m", "200m"])];
        let mut athletes: Vec<Athlete> = Vec::new();
        let mut resolver = EntityResolver::new(&athletes);
        let mut synthesizer = EventSynthesizer::new("63", &[], &[], 90001);
        let (rows, _) = synthesizer.synthesize(&mut resolver, &mut athletes, &roster, &[], &[]);

        assert_eq!(rows[0].result_id, "90001");
        assert_eq!(rows[1].result_id, "90002");
    }
}
