use clap::{Parser, Subcommand, ValueEnum};

use heritage_kg::ingest::WriteMode;

/// heritage-kg: a knowledge graph of China's World Heritage sites
#[derive(Parser)]
#[command(
    author,
    version,
    about = "Builds a heritage-site knowledge graph and answers questions against it"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load a JSON corpus of heritage records into the graph
    Build {
        /// Path to the JSON array of heritage records
        corpus: String,

        /// SQLite database holding the graph
        #[arg(long, default_value = "heritage.db")]
        db: String,

        /// How writes treat nodes and edges that already exist
        #[arg(long, short, default_value = "create")]
        mode: LoadMode,

        /// Which pass to run
        #[arg(long, short, default_value = "all")]
        stage: LoadStage,

        /// Load into an in-memory graph and report, leaving the database untouched
        #[arg(long)]
        dry_run: bool,
    },

    /// Ask a question about a heritage site
    Ask {
        /// Natural language question (e.g., "颐和园是什么时候建造的？")
        question: String,

        /// SQLite database holding the graph
        #[arg(long, default_value = "heritage.db")]
        db: String,

        /// Output format (text, json)
        #[arg(long, short, default_value = "text")]
        format: String,

        /// Treat the question as the site name and skip the language model
        #[arg(long)]
        no_llm: bool,

        /// LLM provider (openai, openrouter, ollama, mock)
        #[arg(long)]
        llm_provider: Option<String>,

        /// LLM model name
        #[arg(long)]
        llm_model: Option<String>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LoadMode {
    /// Always create new nodes and edges
    Create,

    /// Update nodes matched by label and name; skip edges already stored
    Merge,
}

impl From<LoadMode> for WriteMode {
    fn from(mode: LoadMode) -> Self {
        match mode {
            LoadMode::Create => WriteMode::Create,
            LoadMode::Merge => WriteMode::Merge,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LoadStage {
    /// Nodes, then relationships
    All,

    /// Only site and secondary-entity nodes
    Nodes,

    /// Only relationships between nodes already stored
    Relationships,
}

impl LoadStage {
    pub fn includes_nodes(&self) -> bool {
        matches!(self, LoadStage::All | LoadStage::Nodes)
    }

    pub fn includes_relationships(&self) -> bool {
        matches!(self, LoadStage::All | LoadStage::Relationships)
    }
}

impl std::fmt::Display for LoadStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadStage::All => write!(f, "all"),
            LoadStage::Nodes => write!(f, "nodes"),
            LoadStage::Relationships => write!(f, "relationships"),
        }
    }
}
