// Upload history
//
// Records of prior uploads, persisted per subject through a pluggable
// key-value backend.

pub mod backend;
pub mod record;
pub mod store;

pub use backend::{FileBackend, HistoryBackend, MemoryBackend};
pub use record::{reorder, SortOrder, SubjectKey, UploadRecord};
pub use store::{HistoryStore, StoreError};
