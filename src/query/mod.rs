pub mod engine;
pub mod formatter;
pub mod resolver;

pub use engine::{fuzzy_pattern, GraphQueryEngine, LookupOutcome, MatchStage, SiteProfile};
pub use formatter::{OutputFormat, ResultFormatter, NOT_FOUND_MESSAGE};
pub use resolver::{build_resolution_prompt, NameResolver};

use anyhow::Result;

use crate::graph::GraphStore;
use crate::prompt::LanguageModel;

/// Answers a natural-language question: resolve the site name, look it up, render it
pub struct QuestionAnswerer<'a, S: GraphStore + ?Sized, M: LanguageModel> {
    resolver: NameResolver<M>,
    engine: GraphQueryEngine<'a, S>,
    formatter: ResultFormatter,
}

impl<'a, S: GraphStore + ?Sized, M: LanguageModel> QuestionAnswerer<'a, S, M> {
    pub fn new(store: &'a S, model: M, format: OutputFormat) -> Self {
        Self {
            resolver: NameResolver::new(model),
            engine: GraphQueryEngine::new(store),
            formatter: ResultFormatter::new(format),
        }
    }

    /// Resolve and look up without rendering. A model failure yields `Failed`.
    pub async fn lookup(&self, question: &str) -> LookupOutcome {
        match self.resolver.resolve(question).await {
            Ok(name) => self.engine.lookup(&name),
            Err(e) => {
                tracing::error!("Failed to resolve heritage name: {:#}", e);
                LookupOutcome::Failed(format!("could not resolve the site name: {}", e))
            }
        }
    }

    pub async fn answer(&self, question: &str) -> Result<String> {
        let outcome = self.lookup(question).await;
        self.formatter.format(&outcome)
    }
}
