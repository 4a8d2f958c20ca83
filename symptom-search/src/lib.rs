/*!
# Symptom Search

Keyword ranking over flattened complaint narratives.

Queries and summaries are normalized the same way (lower-case, ASCII
alphanumerics and spaces only, collapsed whitespace). Each distinct query
term found as a substring of a summary is worth one point; there is no
stemming or fuzzy matching.

```rust
use recallscope_records::FlatComplaint;
use recallscope_symptom_search::SymptomRanker;

fn top_matches(rows: &[FlatComplaint]) -> Vec<String> {
    SymptomRanker::default()
        .rank(rows, "stall brake", 10)
        .hits
        .into_iter()
        .map(|hit| hit.complaint.record_id)
        .collect()
}
```
*/

mod config;
mod error;
mod normalize;
mod ranker;
mod result;

pub use config::SearchConfig;
pub use error::{Result, SearchError};
pub use normalize::{normalize_text, query_terms};
pub use ranker::{SymptomRanker, score_summary};
pub use result::{RankMode, SearchHit, SearchResults};
