//! The suggestion engine: extraction → chunked model querying →
//! incremental accumulation, with retry-on-rate-limit and keyword fallback.
//!
//! One fold drives both calling modes. Each processed chunk produces an
//! immutable [`SuggestionResult`] snapshot pushed into an unbounded channel:
//! [`SuggestionEngine::suggest_stream`] hands the receiver to the transport
//! (one record per chunk), while [`SuggestionEngine::suggest`] runs the fold
//! to completion and returns the last record. Chunks are processed strictly
//! in order: the early-fallback rule depends on knowing the first chunk's
//! outcome, and later chunks only ever add to the running set.
//!
//! Failure policy (see `completion`): a rate-limited call is retried exactly
//! once after a backoff; any other failure abandons the model path. If the
//! first chunk fails before any success the whole request is delegated to
//! the keyword fallback; a later failure finalizes with whatever has been
//! accumulated. Partial results from completed chunks are worth more than
//! a keyword guess.

use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use tokio::sync::mpsc;

use crate::chunk::chunk_text;
use crate::completion::{CompletionClient, CompletionError, OpenAiClient};
use crate::config::Config;
use crate::extract::extract_text;
use crate::fallback::suggest_fallback;
use crate::models::{DocumentRef, SuggestionResult, Unit, MAX_SUGGESTIONS, NO_MATCH_MESSAGE};
use crate::prompt;

/// Margin added to a provider wait hint before retrying.
const RETRY_HINT_MARGIN_SECS: u64 = 5;

/// Per-process suggestion context: configuration plus the lazily built,
/// single-initialization model client. Safe to share across concurrent
/// requests; everything is read-only after the client cell is populated.
pub struct SuggestionEngine {
    config: Config,
    client: OnceCell<Option<Arc<dyn CompletionClient>>>,
}

impl SuggestionEngine {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            client: OnceCell::new(),
        }
    }

    /// Build an engine with an injected client (tests, alternate providers).
    pub fn with_client(config: Config, client: Arc<dyn CompletionClient>) -> Self {
        let cell = OnceCell::new();
        let _ = cell.set(Some(client));
        Self {
            config,
            client: cell,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The shared client handle, built on first use. `None` means no model
    /// is configured (missing API key) and requests take the fallback.
    fn client(&self) -> Option<Arc<dyn CompletionClient>> {
        self.client
            .get_or_init(|| {
                OpenAiClient::from_env(&self.config.model)
                    .map(|client| Arc::new(client) as Arc<dyn CompletionClient>)
            })
            .clone()
    }

    /// Non-streaming mode: run the full fold and collapse to the final
    /// record, whose id set is already the bounded running union.
    pub async fn suggest(&self, document: &DocumentRef, units: &[Unit]) -> SuggestionResult {
        let (tx, mut rx) = mpsc::unbounded_channel();
        self.run(document, units, &tx).await;
        drop(tx);

        let mut last = None;
        while let Ok(record) = rx.try_recv() {
            last = Some(record);
        }
        // The fold always emits at least one record.
        last.unwrap_or_else(|| SuggestionResult::none(0, 1, true))
    }

    /// Streaming mode: spawn the fold and hand back the record stream.
    ///
    /// Dropping the receiver cancels processing at the next chunk boundary;
    /// an in-flight model call still runs to completion.
    pub fn suggest_stream(
        self: Arc<Self>,
        document: DocumentRef,
        units: Vec<Unit>,
    ) -> mpsc::UnboundedReceiver<SuggestionResult> {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            self.run(&document, &units, &tx).await;
        });
        rx
    }

    async fn run(
        &self,
        document: &DocumentRef,
        units: &[Unit],
        tx: &mpsc::UnboundedSender<SuggestionResult>,
    ) {
        let keywords = &self.config.fallback.keywords;

        if units.is_empty() {
            let _ = tx.send(SuggestionResult::none(0, 1, false));
            return;
        }

        // No extractable content: the model has nothing to read, so the
        // keyword matcher works from the display name alone.
        let Some(content) = extract_text(&document.filepath, &self.config.extraction) else {
            let _ = tx.send(suggest_fallback(&document.name, None, units, keywords));
            return;
        };

        let Some(client) = self.client() else {
            let _ = tx.send(suggest_fallback(
                &document.name,
                Some(&content),
                units,
                keywords,
            ));
            return;
        };

        let chunks = chunk_text(&content, self.config.chunking.chunk_size);
        let total_chunks = chunks.len();
        let unit_list = prompt::format_unit_list(units);

        let mut accumulated: Vec<String> = Vec::new();
        let mut any_success = false;
        let mut last_success = 0usize;
        let mut completed = true;

        for (idx, chunk) in chunks.iter().enumerate() {
            let user_prompt = prompt::build_chunk_prompt(chunk, idx, total_chunks, &unit_list);
            let reply = match self.call_with_retry(client.as_ref(), &user_prompt).await {
                Ok(reply) => reply,
                Err(_) if idx == 0 && !any_success => {
                    let _ = tx.send(suggest_fallback(
                        &document.name,
                        Some(&content),
                        units,
                        keywords,
                    ));
                    return;
                }
                Err(_) => {
                    completed = false;
                    break;
                }
            };
            any_success = true;
            last_success = idx + 1;

            // First-seen order is the reported priority; duplicates and
            // out-of-range indices were already filtered by the parser.
            for index in prompt::parse_reply_indices(&reply, units.len()) {
                let id = &units[index].id;
                if !accumulated.contains(id) {
                    accumulated.push(id.clone());
                }
            }

            let is_final = idx + 1 == total_chunks;
            let record = snapshot(&accumulated, idx + 1, total_chunks, is_final);
            if tx.send(record).is_err() {
                return;
            }
        }

        // A later-chunk failure stops processing but keeps partial results;
        // close the stream with a well-formed final record.
        if !completed {
            let _ = tx.send(snapshot(&accumulated, last_success, total_chunks, true));
        }
    }

    /// One model call, retried exactly once on a rate limit. The wait is
    /// the provider hint plus a margin when present, else the configured
    /// default backoff.
    async fn call_with_retry(
        &self,
        client: &dyn CompletionClient,
        user_prompt: &str,
    ) -> Result<String, CompletionError> {
        match client.complete(prompt::SYSTEM_INSTRUCTION, user_prompt).await {
            Ok(reply) => Ok(reply),
            Err(CompletionError::RateLimited { wait_hint_secs }) => {
                let wait = wait_hint_secs
                    .map(|secs| secs + RETRY_HINT_MARGIN_SECS)
                    .unwrap_or(self.config.model.retry_wait_secs);
                tokio::time::sleep(Duration::from_secs(wait)).await;
                client.complete(prompt::SYSTEM_INSTRUCTION, user_prompt).await
            }
            Err(other) => Err(other),
        }
    }
}

/// Immutable per-chunk snapshot: running union re-sliced to the top 5.
fn snapshot(
    accumulated: &[String],
    chunk_index: usize,
    total_chunks: usize,
    is_final: bool,
) -> SuggestionResult {
    let mut suggested_ids = accumulated.to_vec();
    suggested_ids.truncate(MAX_SUGGESTIONS);
    let has_suggestions = !suggested_ids.is_empty();
    let message = if is_final && !has_suggestions {
        NO_MATCH_MESSAGE.to_string()
    } else {
        String::new()
    };
    SuggestionResult {
        suggested_ids,
        has_suggestions,
        message,
        is_fallback: false,
        chunk_index,
        total_chunks,
        is_final,
    }
}
