use anyhow::Result;
use std::path::Path;

use heritage_kg::db;
use heritage_kg::prompt::{get_llm_config, LlmClient};
use heritage_kg::query::{
    GraphQueryEngine, LookupOutcome, OutputFormat, QuestionAnswerer, ResultFormatter,
};

/// Runs the ask command with the provided arguments
pub async fn run(
    question: &str,
    db_path: &str,
    format: &str,
    no_llm: bool,
    llm_provider: Option<&str>,
    llm_model: Option<&str>,
) -> Result<()> {
    tracing::info!("Question: {}", question);

    let output_format: OutputFormat = format.parse().unwrap_or(OutputFormat::Text);
    let formatter = ResultFormatter::new(output_format);

    if !Path::new(db_path).exists() {
        let outcome = LookupOutcome::Failed(format!(
            "database {} does not exist; run `heritage-kg build` first",
            db_path
        ));
        println!("{}", formatter.format(&outcome)?);
        return Ok(());
    }

    let database = db::get_database(db_path)?;

    let outcome = if no_llm {
        eprintln!("Skipping the language model; looking up the question as a site name");
        GraphQueryEngine::new(&database).lookup(question)
    } else {
        match get_llm_config(llm_provider, llm_model).and_then(LlmClient::new) {
            Ok(client) => {
                QuestionAnswerer::new(&database, client, output_format)
                    .lookup(question)
                    .await
            }
            Err(e) => {
                tracing::error!("Language model is not configured: {:#}", e);
                LookupOutcome::Failed(format!("language model is not configured: {}", e))
            }
        }
    };

    println!("{}", formatter.format(&outcome)?);

    // Add help text when nothing matched
    if outcome == LookupOutcome::NotFound {
        eprintln!("\nNo heritage site matched. Here are some tips:");
        eprintln!(" - Mention the site by its common name (e.g., 颐和园, 泰山)");
        eprintln!(" - Make sure the graph was built with `heritage-kg build <corpus>`");
        eprintln!(" - Run with --no-llm and an English site name to bypass name resolution");
    }

    Ok(())
}
