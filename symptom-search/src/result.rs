use recallscope_records::FlatComplaint;
use serde::{Deserialize, Serialize};

/// How a result list was ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RankMode {
    /// Scored against query terms and sorted
    Ranked,
    /// Query had no terms; rows returned in input order
    Unranked,
}

/// A single ranked row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub complaint: FlatComplaint,

    /// Number of distinct query terms found in the summary; 0 when unranked
    pub score: usize,

    /// Position in the result list (0 = best)
    pub rank: usize,
}

/// Ordered hits plus what produced them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    /// Query as given
    pub query: String,

    /// Normalized distinct terms used for scoring
    pub terms: Vec<String>,

    pub mode: RankMode,

    pub hits: Vec<SearchHit>,

    /// Rows that qualified before the limit was applied: those with a
    /// non-zero score when ranked, every input row when unranked
    pub total_matches: usize,
}

impl SearchResults {
    /// Get top N results
    pub fn top(&self, n: usize) -> &[SearchHit] {
        &self.hits[..n.min(self.hits.len())]
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }
}
