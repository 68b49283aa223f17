//! Table-name canonicalization for sharded and partitioned tables
//!
//! Date-sharded tables (`events_20230101`) and wildcard references
//! (`events_*`) share one logical schema; usage accounting and catalog
//! enumeration must agree on the base name or their join silently misses.

use regex::Regex;
use std::sync::OnceLock;

static SHARD_SUFFIX: OnceLock<Regex> = OnceLock::new();

fn shard_suffix() -> &'static Regex {
    // An underscore followed by 1-10 digits (and anything after it), or a
    // wildcard suffix.
    SHARD_SUFFIX.get_or_init(|| Regex::new(r"_\d{1,10}.*|_\*").expect("valid shard pattern"))
}

/// Strip a shard/partition suffix from a table identifier.
///
/// `events_20230101` and `events_*` both canonicalize to `events`; names
/// without a suffix come back unchanged.
pub fn strip_shard_suffix(table_id: &str) -> String {
    shard_suffix().replace(table_id, "").into_owned()
}
