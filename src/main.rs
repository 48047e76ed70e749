use anyhow::Result;
use std::env;
use std::path::{Path, PathBuf};

use olympic_reconciliation::table::{load_table, store_table};
use olympic_reconciliation::{pipeline, PipelineInputs, VERSION};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let data_dir = PathBuf::from(args.get(1).map(String::as_str).unwrap_or("."));

    println!("🏅 Olympic Reconciliation Pipeline v{}", VERSION);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // 1. Load all sources
    println!("\n📂 Loading input tables from {}...", data_dir.display());
    let inputs = load_inputs(&data_dir)?;
    println!(
        "✓ Loaded {} athletes, {} results, {} editions",
        inputs.athletes.rows.len(),
        inputs.results.rows.len(),
        inputs.editions.rows.len()
    );
    println!(
        "✓ Loaded addendum sources: {} roster entries, {} medallists, {} teams",
        inputs.roster.rows.len(),
        inputs.medallists.rows.len(),
        inputs.teams.rows.len()
    );

    // 2. Run the pipeline
    println!("\n🔁 Reconciling...");
    let outputs = pipeline::run(inputs)?;
    let summary = &outputs.summary;
    println!(
        "✓ Addendum edition id: {}",
        summary.addendum_edition_id
    );
    println!(
        "✓ Identities: {} total ({} minted, {} enriched)",
        summary.athletes_total, summary.athletes_minted, summary.athletes_enriched
    );
    println!(
        "✓ Participation records: {} total ({} roster, {} team, {} backfill)",
        summary.results_total, summary.roster_rows, summary.team_rows, summary.backfill_rows
    );
    println!("✓ Records with derived age: {}", summary.results_with_age);
    if summary.skipped_records > 0 {
        println!("⚠️  Skipped {} incomplete addendum records", summary.skipped_records);
    }

    // 3. Write outputs
    println!("\n💾 Writing output tables...");
    store_table(&data_dir.join("new_olympic_athlete_bio.csv"), &outputs.athletes)?;
    store_table(
        &data_dir.join("new_olympic_athlete_event_results.csv"),
        &outputs.results,
    )?;
    store_table(&data_dir.join("new_olympics_country.csv"), &outputs.countries)?;
    store_table(&data_dir.join("new_olympics_games.csv"), &outputs.editions)?;
    store_table(&data_dir.join("new_medal_tally.csv"), &outputs.tally)?;
    println!("✓ Wrote 5 output files ({} tally rows)", summary.tally_rows);

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("🎉 Reconciliation complete");

    Ok(())
}

fn load_inputs(data_dir: &Path) -> Result<PipelineInputs> {
    Ok(PipelineInputs {
        athletes: load_table(&data_dir.join("olympic_athlete_bio.csv"))?,
        results: load_table(&data_dir.join("olympic_athlete_event_results.csv"))?,
        countries: load_table(&data_dir.join("olympics_country.csv"))?,
        editions: load_table(&data_dir.join("olympics_games.csv"))?,
        roster: load_table(&data_dir.join("paris/athletes.csv"))?,
        catalog: load_table(&data_dir.join("paris/events.csv"))?,
        medallists: load_table(&data_dir.join("paris/medallists.csv"))?,
        teams: load_table(&data_dir.join("paris/teams.csv"))?,
        noc_supplement: load_table(&data_dir.join("paris/nocs.csv"))?,
    })
}
