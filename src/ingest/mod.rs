pub mod accumulator;
pub mod corpus;
pub mod loader;
pub mod normalizer;
pub mod record;

pub use accumulator::GraphAccumulator;
pub use corpus::{load_corpus, Corpus};
pub use loader::{GraphLoader, LoadReport, WriteMode, WriteStats};
pub use normalizer::{normalize_record, parse_criteria, EdgeCandidate, NormalizedRecord};
pub use record::RawRecord;
