//! Deserialize-only payload types for the upstream endpoints.

pub mod archives;
pub mod callback;
pub mod game;
pub mod profile;
pub mod stats;

pub use archives::ArchiveIndex;
pub use callback::{CallbackPlayer, CallbackResponse};
pub use game::{MonthlyArchive, RawGame, RawPlayer};
pub use profile::Profile;
pub use stats::{PlayerStats, RatingSnapshot};
