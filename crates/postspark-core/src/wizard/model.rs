use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::request::{DraftPatch, GenerationRequest, RequestDraft};
use crate::result::GenerationResult;

/// Ordered wizard steps, 1-based for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    /// Step 1: content type and language
    ContentType,
    /// Step 2: topic and platform
    TopicPlatform,
    /// Step 3: tone and goal
    StyleGoal,
    /// Step 4: key points (optional)
    KeyPoints,
    /// Step 5: review and generate
    Review,
}

impl WizardStep {
    pub fn index(self) -> u8 {
        match self {
            Self::ContentType => 1,
            Self::TopicPlatform => 2,
            Self::StyleGoal => 3,
            Self::KeyPoints => 4,
            Self::Review => 5,
        }
    }

    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            1 => Some(Self::ContentType),
            2 => Some(Self::TopicPlatform),
            3 => Some(Self::StyleGoal),
            4 => Some(Self::KeyPoints),
            5 => Some(Self::Review),
            _ => None,
        }
    }

    fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    fn prev(self) -> Option<Self> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }
}

/// Terminal state of one generation attempt, as shown on the review step.
pub type GenerationOutcome = Result<GenerationResult>;

/// External key-value hand-off that can pre-fill a fresh wizard
/// (e.g. "use this template" from a gallery page).
pub trait DraftSeedStore: Send + Sync {
    /// Takes the pending seed, clearing it from the store.
    fn take_seed(&self) -> Option<DraftPatch>;
}

/// Single-owner state of one wizard session.
///
/// All operations are synchronous pure transitions. An in-flight
/// generation is tied to the session via [`WizardState::generation_token`];
/// a reset bumps the token so a stale result is discarded instead of being
/// applied to the wrong session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WizardState {
    step: WizardStep,
    draft: RequestDraft,
    generation_seq: u64,
    outcome: Option<GenerationOutcome>,
}

impl WizardState {
    /// Fresh wizard at step 1 with an empty draft.
    pub fn new() -> Self {
        Self {
            step: WizardStep::ContentType,
            draft: RequestDraft::default(),
            generation_seq: 0,
            outcome: None,
        }
    }

    /// Fresh wizard pre-filled from an external hand-off, if one is pending.
    pub fn with_seed(seeds: &dyn DraftSeedStore) -> Self {
        let mut state = Self::new();
        if let Some(seed) = seeds.take_seed() {
            state.draft.apply(seed);
        }
        state
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn draft(&self) -> &RequestDraft {
        &self.draft
    }

    pub fn outcome(&self) -> Option<&GenerationOutcome> {
        self.outcome.as_ref()
    }

    /// Merges form input into the draft, last write wins per field.
    ///
    /// No side effects beyond the merge; step predicates are pure queries.
    pub fn update(&mut self, patch: DraftPatch) {
        self.draft.apply(patch);
    }

    /// Whether the current step's completeness predicate holds.
    ///
    /// Pure and repeatable, so a UI can poll it to enable a "Next" control.
    /// Step 4 never blocks; step 5 has no next.
    pub fn can_proceed(&self) -> bool {
        match self.step {
            WizardStep::ContentType => self.draft.content_type.is_some(),
            WizardStep::TopicPlatform => {
                !self.draft.topic.trim().is_empty() && self.draft.platform.is_some()
            }
            WizardStep::StyleGoal => self.draft.tone.is_some() && self.draft.goal.is_some(),
            WizardStep::KeyPoints => true,
            WizardStep::Review => false,
        }
    }

    /// Advances to the next step when the current one validates.
    /// Returns whether the step changed.
    pub fn next_step(&mut self) -> bool {
        if !self.can_proceed() {
            return false;
        }
        match self.step.next() {
            Some(next) => {
                self.step = next;
                true
            }
            None => false,
        }
    }

    /// Goes back one step; always permitted except from step 1.
    pub fn prev_step(&mut self) -> bool {
        match self.step.prev() {
            Some(prev) => {
                self.step = prev;
                true
            }
            None => false,
        }
    }

    /// Jumps to any step 1..=5 regardless of validation, as clickable
    /// progress indicators allow. Returns false for an out-of-range index.
    pub fn jump_to(&mut self, index: u8) -> bool {
        match WizardStep::from_index(index) {
            Some(step) => {
                self.step = step;
                true
            }
            None => false,
        }
    }

    /// Returns to step 1 with an empty draft and invalidates any in-flight
    /// generation.
    pub fn reset_form(&mut self) {
        self.step = WizardStep::ContentType;
        self.draft = RequestDraft::default();
        self.outcome = None;
        self.generation_seq += 1;
    }

    /// Token identifying the current session incarnation. Capture it before
    /// starting a generation and pass it back to [`WizardState::apply_outcome`].
    pub fn generation_token(&self) -> u64 {
        self.generation_seq
    }

    /// Freezes the draft into a request. Only exposed from the review step.
    pub fn build_request(&self) -> Result<GenerationRequest> {
        if self.step != WizardStep::Review {
            return Err(crate::error::GenerationError::validation(
                "generation is only available from the review step",
            ));
        }
        self.draft.build()
    }

    /// Applies a finished generation to the display state, unless the
    /// session was reset while the generation was in flight. Returns
    /// whether the outcome was applied.
    pub fn apply_outcome(&mut self, token: u64, outcome: GenerationOutcome) -> bool {
        if token != self.generation_seq {
            tracing::debug!("[WizardState] discarding stale generation outcome");
            return false;
        }
        self.outcome = Some(outcome);
        true
    }
}

impl Default for WizardState {
    fn default() -> Self {
        Self::new()
    }
}
