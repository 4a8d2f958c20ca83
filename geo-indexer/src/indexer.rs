use crate::config::GeoIndexConfig;
use crate::error::{GeoIndexError, Result};
use crate::layout::{DumpRow, GeoKey, parse_line};
use crate::store::GeoCountStore;
use log::{debug, info};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::sync::Arc;

/// Progress callback for ingestion runs
pub type ProgressCallback = Arc<dyn Fn(IngestProgress) + Send + Sync>;

/// Ingestion progress information
#[derive(Debug, Clone)]
pub struct IngestProgress {
    pub phase: IngestPhase,
    /// 1-based chunk number; 0 before the first chunk
    pub chunk: usize,
    pub rows_read: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestPhase {
    Reading,
    Committing,
    Complete,
}

/// Statistics about an ingestion run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IngestStats {
    /// Chunks read, including chunks where every row was rejected
    pub chunks: usize,
    /// Parsed rows (blank and overlong lines excluded)
    pub rows_read: usize,
    pub rows_kept: usize,
    pub rows_rejected: usize,
    /// Blank or overlong lines dropped at parse
    pub lines_skipped: usize,
    /// Sum over chunks of the groups written by that chunk
    pub groups_upserted: usize,
}

impl IngestStats {
    fn absorb(&mut self, other: &IngestStats) {
        self.chunks += other.chunks;
        self.rows_read += other.rows_read;
        self.rows_kept += other.rows_kept;
        self.rows_rejected += other.rows_rejected;
        self.lines_skipped += other.lines_skipped;
        self.groups_upserted += other.groups_upserted;
    }
}

/// Builds the (year, make, model, state) count index from the flat dump.
///
/// Input is read `chunk_size` rows at a time. Each chunk is grouped in
/// memory and its group sizes are added to the store in one transaction,
/// so killing the process between chunks leaves every committed chunk
/// intact.
pub struct GeoIndexBuilder<'a> {
    config: GeoIndexConfig,
    store: &'a GeoCountStore,
}

impl<'a> GeoIndexBuilder<'a> {
    pub fn new(config: GeoIndexConfig, store: &'a GeoCountStore) -> Result<Self> {
        config.validate().map_err(GeoIndexError::InvalidConfig)?;
        Ok(Self { config, store })
    }

    /// Ingest the configured input file.
    pub fn build(&self, progress: Option<ProgressCallback>) -> Result<IngestStats> {
        let path = &self.config.input_path;
        if !path.is_file() {
            return Err(GeoIndexError::InputNotFound(path.clone()));
        }

        info!("Building geo index from {}", path.display());
        let file = File::open(path)?;
        self.ingest_reader(BufReader::new(file), progress)
    }

    /// Ingest any line-oriented reader.
    pub fn ingest_reader<R: BufRead>(
        &self,
        mut reader: R,
        progress: Option<ProgressCallback>,
    ) -> Result<IngestStats> {
        let mut stats = IngestStats::default();
        let mut chunk: Vec<DumpRow> = Vec::with_capacity(self.config.chunk_size.min(65_536));
        let mut buf: Vec<u8> = Vec::new();

        loop {
            buf.clear();
            let read = reader.read_until(b'\n', &mut buf)?;
            if read == 0 {
                break;
            }

            match parse_line(&decode_lossy(&buf)) {
                Some(row) => chunk.push(row),
                None => stats.lines_skipped += 1,
            }

            if chunk.len() >= self.config.chunk_size {
                let chunk_stats = self.flush(&mut chunk, stats.chunks + 1, &stats, &progress)?;
                stats.absorb(&chunk_stats);
            }
        }

        if !chunk.is_empty() {
            let chunk_stats = self.flush(&mut chunk, stats.chunks + 1, &stats, &progress)?;
            stats.absorb(&chunk_stats);
        }

        Self::report_progress(&progress, IngestPhase::Complete, stats.chunks, stats.rows_read);

        info!(
            "Geo index build complete: {} chunks, {} rows kept of {}, {} groups upserted",
            stats.chunks, stats.rows_kept, stats.rows_read, stats.groups_upserted
        );
        if stats.lines_skipped > 0 {
            info!("Skipped {} blank or malformed lines", stats.lines_skipped);
        }

        Ok(stats)
    }

    fn flush(
        &self,
        chunk: &mut Vec<DumpRow>,
        chunk_no: usize,
        running: &IngestStats,
        progress: &Option<ProgressCallback>,
    ) -> Result<IngestStats> {
        let rows_before = running.rows_read;
        Self::report_progress(progress, IngestPhase::Reading, chunk_no, rows_before + chunk.len());

        let rows = chunk.len();
        let groups = group_rows(chunk.drain(..));
        let kept: u64 = groups.values().sum();
        let kept = usize::try_from(kept).unwrap_or(usize::MAX);

        Self::report_progress(progress, IngestPhase::Committing, chunk_no, rows_before + rows);
        let upserted = self.ingest_groups(&groups)?;

        info!("Processed chunk {chunk_no}, kept_rows={kept}, groups={upserted}");

        Ok(IngestStats {
            chunks: 1,
            rows_read: rows,
            rows_kept: kept,
            rows_rejected: rows - kept,
            lines_skipped: 0,
            groups_upserted: upserted,
        })
    }

    /// Add one pre-grouped chunk to the store.
    pub fn ingest_groups(&self, groups: &HashMap<GeoKey, u64>) -> Result<usize> {
        if groups.is_empty() {
            debug!("Chunk had no surviving rows");
            return Ok(0);
        }
        self.store.accumulate(groups)
    }

    fn report_progress(
        callback: &Option<ProgressCallback>,
        phase: IngestPhase,
        chunk: usize,
        rows_read: usize,
    ) {
        if let Some(cb) = callback {
            cb(IngestProgress {
                phase,
                chunk,
                rows_read,
            });
        }
    }
}

/// Normalize, filter and group rows by their full key.
pub fn group_rows<I>(rows: I) -> HashMap<GeoKey, u64>
where
    I: IntoIterator<Item = DumpRow>,
{
    let mut groups = HashMap::new();
    for key in rows.into_iter().filter_map(DumpRow::into_key) {
        *groups.entry(key).or_insert(0) += 1;
    }
    groups
}

/// UTF-8 decode that drops invalid bytes instead of replacing them.
fn decode_lossy(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => String::from_utf8_lossy(bytes)
            .chars()
            .filter(|c| *c != char::REPLACEMENT_CHARACTER)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{FIELD_COUNT, MAKE_COL, MODEL_COL, STATE_COL, YEAR_COL};
    use pretty_assertions::assert_eq;
    use std::io::Cursor;
    use std::sync::Mutex;

    fn line(make: &str, model: &str, year: &str, state: &str) -> String {
        let mut fields = vec![""; FIELD_COUNT];
        fields[MAKE_COL] = make;
        fields[MODEL_COL] = model;
        fields[YEAR_COL] = year;
        fields[STATE_COL] = state;
        fields.join("\t")
    }

    fn geo_key(state: &str) -> GeoKey {
        GeoKey {
            year_text: "2020".into(),
            make_text: "HONDA".into(),
            model_text: "ACCORD".into(),
            state: state.into(),
        }
    }

    fn builder(store: &GeoCountStore, chunk_size: usize) -> GeoIndexBuilder<'_> {
        let config = GeoIndexConfig {
            chunk_size,
            ..Default::default()
        };
        GeoIndexBuilder::new(config, store).expect("valid config")
    }

    #[test]
    fn test_group_rows_counts_per_state() {
        let rows = vec![
            parse_line(&line("HONDA", "ACCORD", "2020", "CA")).unwrap(),
            parse_line(&line("honda", "accord", "2020", "ca")).unwrap(),
            parse_line(&line("HONDA", "ACCORD", "2020", "TX")).unwrap(),
        ];
        let groups = group_rows(rows);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[&geo_key("CA")], 2);
        assert_eq!(groups[&geo_key("TX")], 1);
    }

    #[test]
    fn test_stats_and_chunking() {
        let store = GeoCountStore::open_in_memory().unwrap();
        let input = [
            line("HONDA", "ACCORD", "2020", "CA"),
            String::new(),
            line("HONDA", "ACCORD", "2020", "CA"),
            line("HONDA", "ACCORD", "20", "TX"),
            line("HONDA", "ACCORD", "2020", "TX"),
            format!("{}\textra", line("HONDA", "ACCORD", "2020", "TX")),
            line("HONDA", "ACCORD", "2020", "XYZ"),
        ]
        .join("\n");

        let stats = builder(&store, 2)
            .ingest_reader(Cursor::new(input), None)
            .unwrap();

        assert_eq!(
            stats,
            IngestStats {
                chunks: 3,
                rows_read: 5,
                rows_kept: 3,
                rows_rejected: 2,
                lines_skipped: 2,
                groups_upserted: 2,
            }
        );
        assert_eq!(store.count(&geo_key("CA")).unwrap(), 2);
        assert_eq!(store.count(&geo_key("TX")).unwrap(), 1);
    }

    #[test]
    fn test_invalid_utf8_bytes_are_dropped() {
        let store = GeoCountStore::open_in_memory().unwrap();
        let mut bytes = line("HON\u{0}DA", "ACCORD", "2020", "CA").into_bytes();
        let pos = bytes.iter().position(|b| *b == 0).unwrap();
        bytes[pos] = 0xFF;

        builder(&store, 10)
            .ingest_reader(Cursor::new(bytes), None)
            .unwrap();
        assert_eq!(store.count(&geo_key("CA")).unwrap(), 1);
    }

    #[test]
    fn test_progress_reports_each_chunk() {
        let store = GeoCountStore::open_in_memory().unwrap();
        let input = (0..5)
            .map(|_| line("HONDA", "ACCORD", "2020", "CA"))
            .collect::<Vec<_>>()
            .join("\n");

        let seen: Arc<Mutex<Vec<(IngestPhase, usize, usize)>>> = Arc::default();
        let sink = Arc::clone(&seen);
        let callback: ProgressCallback = Arc::new(move |p: IngestProgress| {
            sink.lock().unwrap().push((p.phase, p.chunk, p.rows_read));
        });

        builder(&store, 2)
            .ingest_reader(Cursor::new(input), Some(callback))
            .unwrap();

        let seen = seen.lock().unwrap().clone();
        assert_eq!(
            seen,
            vec![
                (IngestPhase::Reading, 1, 2),
                (IngestPhase::Committing, 1, 2),
                (IngestPhase::Reading, 2, 4),
                (IngestPhase::Committing, 2, 4),
                (IngestPhase::Reading, 3, 5),
                (IngestPhase::Committing, 3, 5),
                (IngestPhase::Complete, 3, 5),
            ]
        );
    }

    #[test]
    fn test_missing_input_is_fatal() {
        let store = GeoCountStore::open_in_memory().unwrap();
        let config = GeoIndexConfig {
            input_path: "/definitely/not/here/FLAT_CMPL.txt".into(),
            ..Default::default()
        };
        let builder = GeoIndexBuilder::new(config, &store).unwrap();
        assert!(matches!(builder.build(None), Err(GeoIndexError::InputNotFound(_))));
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let store = GeoCountStore::open_in_memory().unwrap();
        let config = GeoIndexConfig {
            chunk_size: 0,
            ..Default::default()
        };
        assert!(matches!(
            GeoIndexBuilder::new(config, &store),
            Err(GeoIndexError::InvalidConfig(_))
        ));
    }
}
