//! API constants

/// Served OpenAPI document (version-independent)
pub const OPENAPI_PATH: &str = "/api/openapi.json";

/// Versioned prefix for every catalog route.
pub const API_PREFIX: &str = "/api/v1";

/// Multipart field carrying the uploaded file.
pub const FILE_FIELD: &str = "file";

/// Slack on top of the import ceiling for multipart framing.
pub const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Uploads processed at once per route; further requests wait for a slot.
pub const IMPORT_CONCURRENCY_LIMIT: usize = 2;
