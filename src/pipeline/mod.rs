//! The extract, analyze, review, save workflow for one UI instance.

pub mod session;
pub mod target;

pub use session::{AUTO_DISMISS_DELAY, Phase, PhaseObserver, Preview, Session};
pub use target::{RESTRICTED_SCHEMES, is_usable_url, resolve_target_url, restricted_scheme};
