/// Default embedding dimensionality (common sentence-embedding size).
pub const DEFAULT_DIMENSIONS: usize = 384;

/// Default minimum confidence for surfacing a duplicate candidate.
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.6;

/// Default maximum number of candidates returned per query.
pub const DEFAULT_MAX_RESULTS: usize = 10;

/// Default ANN search effort (HNSW ef parameter).
pub const DEFAULT_ANN_EFFORT: usize = 64;

/// Default maximum encoder input length, in characters.
pub const DEFAULT_MAX_INPUT_CHARS: usize = 8192;

/// Default embedding cache capacity, in entries.
pub const DEFAULT_CACHE_SIZE: u64 = 4096;

/// Default encoder call timeout in milliseconds. Zero disables the bound.
pub const DEFAULT_ENCODER_TIMEOUT_MS: u64 = 0;

/// Snapshot wire format version. Bump on incompatible layout changes.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;
