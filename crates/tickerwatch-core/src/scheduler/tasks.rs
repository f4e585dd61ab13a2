//! Per-cycle work: the keyword pipeline and the cycle orchestrator.

use std::sync::Arc;

use chrono::Local;
use tokio::task::JoinSet;

use crate::ai::Summarizer;
use crate::dedup::DeliveryLog;
use crate::notify::{format_delivery, Notifier};
use crate::source::ArticleSource;
use crate::watch::WatchSnapshot;

/// Substituted when an article body cannot be fetched or located.
pub const CONTENT_NOT_FOUND: &str = "Article content not found.";
/// Substituted when the summarizer returns nothing.
pub const SUMMARY_UNAVAILABLE: &str = "Summary not available.";
/// Substituted when the summarizer fails outright.
pub const SUMMARY_ERROR: &str = "Summary not available due to an error.";

/// Collaborators shared by every pipeline run in a cycle.
pub struct CycleContext {
    pub channel_id: String,
    pub source: Arc<dyn ArticleSource>,
    pub summarizer: Arc<Summarizer>,
    pub delivery_log: Arc<DeliveryLog>,
    pub notifier: Arc<dyn Notifier>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CycleOutcome {
    pub keywords: usize,
    pub delivered: u32,
}

/// Run the full pipeline for one keyword: fetch, filter, extract,
/// summarize, dedup-check, notify. Returns the number of notifications
/// delivered. Collaborator failures degrade to sentinels or a skipped
/// article; they never abort the run.
pub async fn run_keyword_pipeline(keyword: &str, prompt: &str, ctx: &CycleContext) -> u32 {
    tracing::debug!(keyword, "Running keyword pipeline");

    let candidates = match ctx.source.fetch_candidates().await {
        Ok(candidates) => candidates,
        Err(e) => {
            tracing::warn!(keyword, "Failed to fetch candidates: {}", e);
            return 0;
        }
    };

    let mut delivered = 0;

    for mut article in candidates {
        if !article.matches_keyword(keyword) {
            continue;
        }

        let text = match ctx.source.extract_full_text(&article.link).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(link = %article.link, "Failed to extract article text: {}", e);
                CONTENT_NOT_FOUND.to_string()
            }
        };
        let source_text = article.source_text.insert(text);

        let summary = match ctx.summarizer.summarize(source_text, prompt).await {
            Ok(summary) if summary.trim().is_empty() => SUMMARY_UNAVAILABLE.to_string(),
            Ok(summary) => summary,
            Err(e) => {
                tracing::warn!(link = %article.link, "Failed to summarize article: {}", e);
                SUMMARY_ERROR.to_string()
            }
        };

        if !ctx.delivery_log.record_if_new(&summary, article.link.as_str()) {
            tracing::debug!(link = %article.link, "Skipping already-delivered article");
            continue;
        }

        let message = format_delivery(&summary, article.link.as_str(), Local::now());
        match ctx.notifier.send(&ctx.channel_id, &message).await {
            Ok(()) => {
                tracing::info!(keyword, link = %article.link, "Delivered notification");
                delivered += 1;
            }
            Err(e) => {
                tracing::error!(link = %article.link, "Failed to deliver notification: {}", e);
            }
        }
    }

    delivered
}

/// Fan a refresh out to one pipeline task per keyword and join on all of
/// them. The keyword set and prompt come from the snapshot taken at cycle
/// start; edits made while the cycle runs apply to the next cycle.
pub async fn execute_cycle(snapshot: WatchSnapshot, ctx: Arc<CycleContext>) -> CycleOutcome {
    let mut join_set: JoinSet<u32> = JoinSet::new();

    for keyword in &snapshot.keywords {
        let keyword = keyword.clone();
        let prompt = snapshot.prompt.clone();
        let ctx = Arc::clone(&ctx);
        join_set.spawn(async move { run_keyword_pipeline(&keyword, &prompt, &ctx).await });
    }

    let mut delivered = 0;
    while let Some(result) = join_set.join_next().await {
        match result {
            Ok(count) => delivered += count,
            Err(e) => tracing::error!("Keyword pipeline task failed: {}", e),
        }
    }

    CycleOutcome {
        keywords: snapshot.keywords.len(),
        delivered,
    }
}
