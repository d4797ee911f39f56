// ABOUTME: Repository module group (C16) - one file per persisted entity
// ABOUTME: Each exposes a trait for testability plus a SqlitePool-backed implementation

mod bulk_import_job;
mod pairing_token;
mod popularity;
mod user_mapping;
mod workout_record;

pub use bulk_import_job::{BulkImportJobRecord, BulkImportJobRepository, SqliteBulkImportJobRepository};
pub use pairing_token::{PairingTokenRecord, PairingTokenRepository, SqlitePairingTokenRepository};
pub use popularity::SqlitePopularityRepository;
pub use user_mapping::SqliteUserMappingRepository;
pub use workout_record::{SqliteWorkoutRepository, WorkoutRepository};
