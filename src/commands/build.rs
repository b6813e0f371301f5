use anyhow::Result;
use std::time::Instant;

use heritage_kg::db;
use heritage_kg::entity::NodeLabel;
use heritage_kg::ingest::{load_corpus, GraphAccumulator, GraphLoader, LoadReport, WriteMode};
use heritage_kg::relationship::RelationshipType;
use heritage_kg::{GraphStore, MemoryGraph};

use crate::cli::{LoadMode, LoadStage};

/// Main entry point for the build command
pub fn run(corpus: &str, db_path: &str, mode: LoadMode, stage: LoadStage, dry_run: bool) -> Result<()> {
    println!("Loading heritage corpus: {}", corpus);
    let start_time = Instant::now();

    let corpus = load_corpus(corpus)?;
    if corpus.skipped > 0 {
        println!("Skipped {} entries that were not JSON objects", corpus.skipped);
    }

    let accumulator = GraphAccumulator::from_records(&corpus.records);
    println!(
        "Collected {} records describing {} distinct sites",
        accumulator.sites().len(),
        accumulator.site_names().len()
    );

    let mode = WriteMode::from(mode);
    let report = if dry_run {
        println!("Dry run: loading into an in-memory graph");
        let store = MemoryGraph::new();
        let report = load(&store, &accumulator, mode, stage);
        print_statistics(&store)?;
        report
    } else {
        let database = db::get_database(db_path)?;
        let report = load(&database, &accumulator, mode, stage);
        print_statistics(&database)?;
        println!("Graph saved to {}.", database.path());
        report
    };

    println!("Write results ({:?} mode, {} stage):", mode, stage);
    print!("{}", report);

    let failures = report.failures();
    if failures > 0 {
        tracing::warn!("{} writes failed; see the log above for details", failures);
    }

    println!("Build complete in {:.2?}.", start_time.elapsed());
    Ok(())
}

fn load<S: GraphStore + ?Sized>(
    store: &S,
    accumulator: &GraphAccumulator,
    mode: WriteMode,
    stage: LoadStage,
) -> LoadReport {
    let loader = GraphLoader::new(store, mode);
    let mut report = LoadReport::default();

    if stage.includes_nodes() {
        println!("Pass 1: Creating nodes...");
        report.nodes = loader.create_nodes(accumulator);
    }

    if stage.includes_relationships() {
        println!("Pass 2: Creating relationships...");
        report.relationships = loader.create_all_relationships(accumulator);
    }

    report
}

fn print_statistics<S: GraphStore + ?Sized>(store: &S) -> Result<()> {
    println!("Knowledge Graph Statistics:");
    for label in NodeLabel::ALL {
        println!("  - {} {} nodes", store.count_nodes(label)?, label);
    }
    for relationship_type in RelationshipType::ALL {
        println!(
            "  - {} {} relationships",
            store.count_relationships(relationship_type)?,
            relationship_type
        );
    }
    Ok(())
}
