/*!
# Geo Indexer

Offline per-state complaint counts built from the bulk flat-file dump.

The dump is far too large to hold in memory, so it is streamed in
fixed-size chunks. Each chunk is normalized, filtered, grouped by
(year, make, model, state) and added to a SQLite table in its own
transaction:

```text
FLAT_CMPL.txt
  └─> chunk of N lines
        ├─> parse_line      (positional, tab-delimited, 49 fields)
        ├─> DumpRow::into_key  (trim, upper-case, validate)
        ├─> group_rows      (count per key)
        └─> GeoCountStore::accumulate  (count = count + excluded.count)
```

Lookups match on exact year and make plus a prefix match on an
alphanumeric-only model spelling, so `F-150` finds `F150 4DR`.

## Example

```rust,no_run
use recallscope_geo_indexer::{GeoCountStore, GeoIndexBuilder, GeoIndexConfig, state_counts};
use recallscope_records::VehicleKey;

fn main() -> anyhow::Result<()> {
    let config = GeoIndexConfig::default();
    let store = GeoCountStore::open(&config.db_path)?;
    let stats = GeoIndexBuilder::new(config, &store)?.build(None)?;
    println!("kept {} of {} rows", stats.rows_kept, stats.rows_read);

    let key = VehicleKey::parse("2018", "Ford", "F-150")?;
    for row in state_counts(&store, &key)? {
        println!("{} {}", row.state, row.count);
    }
    Ok(())
}
```

Re-ingesting the same dump into an existing database doubles every count.
Start from a fresh database file to rebuild.
*/

mod config;
mod error;
mod indexer;
pub mod layout;
mod query;
mod store;

pub use config::GeoIndexConfig;
pub use error::{GeoIndexError, Result};
pub use indexer::{
    GeoIndexBuilder, IngestPhase, IngestProgress, IngestStats, ProgressCallback, group_rows,
};
pub use layout::GeoKey;
pub use query::{BreakdownSource, StateBreakdown, model_variants, normalize_model, state_counts};
pub use store::{GeoCount, GeoCountStore, ModelVariant};
