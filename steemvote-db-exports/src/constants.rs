// Commons
pub const METADATA_CF: &str = "metadata";
pub const VOTES_CF: &str = "votes";

// Schema version
pub const SCHEMA_VERSION_KEY: &[u8; 1] = b"v";
/// Version written by this code.
pub const SCHEMA_VERSION: u32 = 2;
/// Oldest on-disk version this code can read without migration.
pub const MIN_SUPPORTED_SCHEMA_VERSION: u32 = 2;

// Errors
pub const CF_ERROR: &str = "critical: rocksdb column family operation failed";
pub const CRUD_ERROR: &str = "critical: rocksdb crud operation failed";
pub const SCHEMA_VERSION_DESER_ERROR: &str = "critical: schema version deserialization failed";
pub const VOTE_RECORD_DESER_ERROR: &str = "critical: vote record deserialization failed";
