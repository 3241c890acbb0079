//! Supported provider model IDs and update procedure.
//!
//! # Supported Models
//!
//! ## Anthropic Claude
//!
//! | Model ID | Tier | Notes |
//! |----------|------|-------|
//! | `claude-sonnet-4-20250514` | Balanced | Best speed/quality ratio for short-form copy (default) |
//! | `claude-opus-4-20250514` | Flagship | Long scripts, nuanced brand voice |
//!
//! ## OpenAI
//!
//! | Model ID | Tier | Notes |
//! |----------|------|-------|
//! | `gpt-4o` | Flagship | Default model (default) |
//! | `gpt-4o-mini` | Mini | Smaller, faster, fine for captions |
//!
//! # How to Add or Update Model Versions
//!
//! When a provider releases a new model, update these locations:
//!
//! 1. **Backend default constants** (one per backend file in `postspark-interaction/src/`)
//!    - `anthropic_backend.rs` -> `DEFAULT_ANTHROPIC_MODEL`
//!    - `openai_backend.rs` -> `DEFAULT_OPENAI_MODEL`
//! 2. **This documentation** (`postspark-interaction/src/supported_models.rs`)
//!    - Update the model tables above
//!
//! ## Notes
//!
//! - `DEFAULT_*_MODEL` constants apply when `secrets.toml` has no `model`
//!   entry for the provider.
//! - The `model` field in `~/.config/postspark/secrets.toml` overrides the
//!   default per provider.
