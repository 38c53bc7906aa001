//! Size limits applied while decoding untrusted documents.

/// Maximum size of an input document in bytes.
pub const MAX_DOCUMENT_SIZE: usize = 64 * 1024 * 1024;

/// Maximum size of an inflated page body in bytes.
pub const MAX_INFLATED_SIZE: usize = 256 * 1024 * 1024;

/// Maximum number of cells in one graph model.
pub const MAX_CELLS: usize = 1_000_000;
