//! Schedule generation, conflict detection, and the draft workflow.
//!
//! The submodules are deliberately pure: [`fixture`] turns a team list into
//! round-robin pairings, [`conflict`] scans proposed matches for violations,
//! [`draft`] holds the draft aggregate and its status machine, and
//! [`transfer`] serialises schedules to and from CSV, JSON, and iCalendar.
//! Persistence and HTTP concerns stay in the adapters.

pub mod blackout;
pub mod conflict;
pub mod draft;
pub mod fixture;
pub mod transfer;

pub use self::blackout::{BlackoutDate, BlackoutScope, BlackoutValidationError};
pub use self::conflict::{
    ConflictKind, ConflictSeverity, PublishedFixture, ResolutionOutcome, ScheduleConflict,
    auto_resolve, detect_conflicts, has_blocking, unresolved_count,
};
pub use self::draft::{
    ApprovalLogEntry, DraftAction, DraftMatch, DraftStatus, GenerationParams,
    InvalidDraftTransition, ScheduleDraft,
};
pub use self::fixture::{FixtureError, FixtureParams, FixtureSlot, generate_fixtures};
pub use self::transfer::{
    ImportRejection, ImportedMatch, ParsedImport, ScheduleRow, TransferError, TransferFormat,
    export_rows, parse_import,
};
