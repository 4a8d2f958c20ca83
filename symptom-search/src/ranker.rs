use crate::config::SearchConfig;
use crate::error::{Result, SearchError};
use crate::normalize::{normalize_text, query_terms};
use crate::result::{RankMode, SearchHit, SearchResults};
use log::debug;
use recallscope_records::FlatComplaint;
use std::cmp::Ordering;

/// Keyword ranker over flattened complaint narratives.
///
/// A row scores one point per distinct query term found as a substring of
/// its normalized summary. Zero-score rows are dropped; the rest are
/// ordered by score, then deaths, injuries, fire and crash (all
/// descending), keeping input order among equals.
#[derive(Debug, Clone, Default)]
pub struct SymptomRanker {
    config: SearchConfig,
}

impl SymptomRanker {
    pub fn new(config: SearchConfig) -> Result<Self> {
        config.validate().map_err(SearchError::InvalidConfig)?;
        Ok(Self { config })
    }

    /// Rank with the configured default limit.
    pub fn search(&self, rows: &[FlatComplaint], query: &str) -> SearchResults {
        self.rank(rows, query, self.config.default_limit)
    }

    /// Rank `rows` against `query`, returning at most `limit` hits.
    ///
    /// A query with no terms after normalization returns the first `limit`
    /// rows in input order.
    pub fn rank(&self, rows: &[FlatComplaint], query: &str, limit: usize) -> SearchResults {
        let terms = query_terms(query);

        if terms.is_empty() {
            debug!("Query {query:?} has no terms, returning rows unranked");
            let hits = rows
                .iter()
                .take(limit)
                .enumerate()
                .map(|(rank, row)| SearchHit {
                    complaint: row.clone(),
                    score: 0,
                    rank,
                })
                .collect();
            return SearchResults {
                query: query.to_string(),
                terms,
                mode: RankMode::Unranked,
                hits,
                total_matches: rows.len(),
            };
        }

        let mut scored: Vec<(usize, &FlatComplaint)> = rows
            .iter()
            .filter_map(|row| {
                let score = score_summary(&terms, &row.summary);
                (score > 0).then_some((score, row))
            })
            .collect();
        scored.sort_by(compare_hits);

        let total_matches = scored.len();
        debug!(
            "Ranked {total_matches} of {} rows for terms {terms:?}",
            rows.len()
        );

        let hits = scored
            .into_iter()
            .take(limit)
            .enumerate()
            .map(|(rank, (score, row))| SearchHit {
                complaint: row.clone(),
                score,
                rank,
            })
            .collect();

        SearchResults {
            query: query.to_string(),
            terms,
            mode: RankMode::Ranked,
            hits,
            total_matches,
        }
    }
}

/// Count of `terms` occurring in the normalized summary.
pub fn score_summary(terms: &[String], summary: &str) -> usize {
    let summary = normalize_text(summary);
    terms.iter().filter(|t| summary.contains(t.as_str())).count()
}

fn compare_hits(a: &(usize, &FlatComplaint), b: &(usize, &FlatComplaint)) -> Ordering {
    let (a_score, a_row) = a;
    let (b_score, b_row) = b;
    b_score
        .cmp(a_score)
        .then_with(|| b_row.deaths.cmp(&a_row.deaths))
        .then_with(|| b_row.injuries.cmp(&a_row.injuries))
        .then_with(|| b_row.fire.cmp(&a_row.fire))
        .then_with(|| b_row.crash.cmp(&a_row.crash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    fn row(id: &str, summary: &str) -> FlatComplaint {
        FlatComplaint {
            record_id: id.to_string(),
            year: 2020,
            make: "HONDA".into(),
            model: "ACCORD".into(),
            date_filed: None,
            state: None,
            crash: false,
            fire: false,
            injuries: 0,
            deaths: 0,
            components: String::new(),
            summary: summary.to_string(),
            raw: Value::Null,
        }
    }

    fn ids(results: &SearchResults) -> Vec<&str> {
        results
            .hits
            .iter()
            .map(|h| h.complaint.record_id.as_str())
            .collect()
    }

    #[test]
    fn test_more_terms_rank_first() {
        let rows = vec![
            row("one", "Vehicle would STALL at lights."),
            row("none", "Paint peeling on hood"),
            row("both", "Engine stalled, then the brake pedal went soft"),
        ];
        let results = SymptomRanker::default().rank(&rows, "stall brake", 10);

        assert_eq!(results.mode, RankMode::Ranked);
        assert_eq!(ids(&results), vec!["both", "one"]);
        assert_eq!(results.hits[0].score, 2);
        assert_eq!(results.hits[1].score, 1);
        assert_eq!(results.hits[1].rank, 1);
        assert_eq!(results.total_matches, 2);
    }

    #[test]
    fn test_repeated_term_scores_once() {
        let rows = vec![
            row("a", "brake brake brake"),
            row("b", "brake and stall"),
        ];
        let results = SymptomRanker::default().rank(&rows, "brake brake stall", 10);
        assert_eq!(ids(&results), vec!["b", "a"]);
        assert_eq!(results.hits[1].score, 1);
    }

    #[test]
    fn test_severity_breaks_ties_and_order_is_stable() {
        let mut crash = row("crash", "brake failure");
        crash.crash = true;
        let mut fire = row("fire", "brake failure");
        fire.fire = true;
        let mut injured = row("injured", "brake failure");
        injured.injuries = 1;
        let mut fatal = row("fatal", "brake failure");
        fatal.deaths = 1;
        let rows = vec![
            row("plain-1", "brake failure"),
            crash,
            row("plain-2", "brake failure"),
            fire,
            injured,
            fatal,
        ];

        let results = SymptomRanker::default().rank(&rows, "brake", 10);
        assert_eq!(
            ids(&results),
            vec!["fatal", "injured", "fire", "crash", "plain-1", "plain-2"]
        );
    }

    #[test]
    fn test_limit_applies_after_sort() {
        let rows = vec![
            row("one", "stall"),
            row("two", "stall brake"),
            row("three", "stall brake"),
        ];
        let results = SymptomRanker::default().rank(&rows, "stall brake", 1);
        assert_eq!(ids(&results), vec!["two"]);
        assert_eq!(results.total_matches, 3);
        assert!(results.top(5).len() == 1);
    }

    #[test]
    fn test_termless_query_returns_input_order() {
        let rows = vec![row("a", "x"), row("b", "y"), row("c", "z")];
        let results = SymptomRanker::default().rank(&rows, " -- !! ", 2);

        assert_eq!(results.mode, RankMode::Unranked);
        assert_eq!(ids(&results), vec!["a", "b"]);
        assert!(results.hits.iter().all(|h| h.score == 0));
        assert_eq!(results.total_matches, 3);
    }

    #[test]
    fn test_punctuation_in_summary_does_not_block_match() {
        let rows = vec![row("a", "Air-bag didn't deploy")];
        let results = SymptomRanker::default().rank(&rows, "airbag bag", 10);
        assert_eq!(results.hits[0].score, 1);
    }

    #[test]
    fn test_search_uses_default_limit() {
        let rows: Vec<_> = (0..3).map(|i| row(&i.to_string(), "stall")).collect();
        let ranker = SymptomRanker::new(SearchConfig { default_limit: 2 }).unwrap();
        assert_eq!(ranker.search(&rows, "stall").len(), 2);
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(matches!(
            SymptomRanker::new(SearchConfig { default_limit: 0 }),
            Err(SearchError::InvalidConfig(_))
        ));
    }
}
