//! Five-step content creation wizard.
//!
//! Pure synchronous state transitions; nothing here blocks or performs IO.
//! The wizard accumulates a [`crate::request::RequestDraft`] and, on the
//! review step, freezes it into the immutable request the pipeline accepts.

mod model;

pub use model::{DraftSeedStore, GenerationOutcome, WizardState, WizardStep};
