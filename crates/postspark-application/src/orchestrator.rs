//! Coordinates one generation: quota, cache, backend, classification,
//! enrichment, staged progress.
//!
//! One attempt per call, no internal retries; a caller acting on
//! `retryable` re-invokes explicitly. Usage and cache are only touched by
//! a fully successful non-cached generation.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use postspark_core::backend::GenerationBackend;
use postspark_core::cache::{Fingerprint, ResultCache};
use postspark_core::classify::classify;
use postspark_core::error::{GenerationError, Result};
use postspark_core::identity::IdentityProvider;
use postspark_core::quota::{QuotaLimit, UsageStore};
use postspark_core::request::GenerationRequest;
use postspark_core::result::{GenerationResult, ResultMetadata};

use crate::hashtag::{DEFAULT_MAX_HASHTAGS, HashtagEnricher};
use crate::progress::{GenerationStage, ProgressSink, ProgressUpdate};
use crate::prompt::{PROMPT_VERSION, build_prompt};

/// Runs the generation pipeline for one wizard session.
pub struct GenerationOrchestrator {
    backend: Arc<dyn GenerationBackend>,
    usage: Arc<dyn UsageStore>,
    cache: Arc<ResultCache>,
    enricher: HashtagEnricher,
    identity: Arc<dyn IdentityProvider>,
}

impl GenerationOrchestrator {
    pub fn new(
        backend: Arc<dyn GenerationBackend>,
        usage: Arc<dyn UsageStore>,
        cache: Arc<ResultCache>,
        enricher: HashtagEnricher,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            backend,
            usage,
            cache,
            enricher,
            identity,
        }
    }

    /// Executes one generation attempt.
    ///
    /// Stages are reported in pipeline order with non-decreasing
    /// percentages; on failure the `error` stage is emitted at the failing
    /// stage's percentage and the classified error is returned.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        progress: &dyn ProgressSink,
    ) -> Result<GenerationResult> {
        // Unauthenticated callers are refused before any stage runs.
        let Some(user) = self.identity.current_user() else {
            let err = GenerationError::authentication("no authenticated caller for generation");
            progress.report(ProgressUpdate::error(0, err.user_message()));
            return Err(err);
        };

        let run_id = Uuid::new_v4();
        tracing::info!(
            "[GenerationOrchestrator] run {run_id} starting, user={user}, platform={}, type={}",
            request.platform,
            request.content_type
        );

        progress.report(ProgressUpdate::stage(GenerationStage::Initializing));
        if let Err(err) = request.validate() {
            return Err(self.fail(GenerationStage::Initializing, err, progress));
        }

        // Atomic check-and-reserve: holding the claim is what prevents two
        // concurrent calls from both passing a check that only one unit of
        // quota allows. The claim is returned on any non-charged outcome.
        if !self.usage.try_claim_unit().await {
            let quota = self.usage.quota().await;
            let err = match quota.limit {
                QuotaLimit::Limited(limit) => {
                    GenerationError::quota_exceeded(quota.used_this_period, limit)
                }
                QuotaLimit::Unlimited => {
                    GenerationError::unknown("usage store refused a claim on an unlimited plan")
                }
            };
            return Err(self.fail(GenerationStage::Initializing, err, progress));
        }

        progress.report(ProgressUpdate::stage(GenerationStage::Analyzing));
        let key = Fingerprint::compute(&user, request);
        if request.use_cache {
            if let Some(mut hit) = self.cache.lookup(&key).await {
                self.usage.release_unit().await;
                hit.cached = true;
                tracing::info!("[GenerationOrchestrator] run {run_id} served from cache");
                progress.report(
                    ProgressUpdate::stage(GenerationStage::Completed).with_detail("served from cache"),
                );
                return Ok(hit);
            }
        }

        progress.report(ProgressUpdate::stage(GenerationStage::Generating));
        let prompt = match build_prompt(request) {
            Ok(prompt) => prompt,
            Err(err) => {
                self.usage.release_unit().await;
                return Err(self.fail(GenerationStage::Generating, err, progress));
            }
        };

        let response = match self.backend.generate(&prompt).await {
            Ok(response) => response,
            Err(raw) => {
                self.usage.release_unit().await;
                let err = classify(raw);
                tracing::warn!(
                    "[GenerationOrchestrator] run {run_id} backend {} failed: {err}",
                    self.backend.name()
                );
                return Err(self.fail(GenerationStage::Generating, err, progress));
            }
        };

        progress.report(ProgressUpdate::stage(GenerationStage::Optimizing));
        let hashtags = self
            .enricher
            .suggest(&response.text, DEFAULT_MAX_HASHTAGS)
            .await;

        progress.report(ProgressUpdate::stage(GenerationStage::Finalizing));
        let result = GenerationResult {
            content: response.text,
            hashtags,
            cached: false,
            usage: response.usage,
            metadata: ResultMetadata {
                platform: request.platform,
                content_type: request.content_type,
                generated_at_ms: Utc::now().timestamp_millis(),
                prompt_version: PROMPT_VERSION.to_string(),
            },
        };
        if request.use_cache {
            self.cache.store(key, result.clone()).await;
        }
        // The claimed unit stays: that is the one usage increment for this
        // successful non-cached generation.

        tracing::info!(
            "[GenerationOrchestrator] run {run_id} completed, {} units",
            result.usage.total_units
        );
        progress.report(ProgressUpdate::stage(GenerationStage::Completed));
        Ok(result)
    }

    fn fail(
        &self,
        at: GenerationStage,
        err: GenerationError,
        progress: &dyn ProgressSink,
    ) -> GenerationError {
        progress.report(ProgressUpdate::error(at.percent(), err.user_message()));
        err
    }
}
