//! Assistant controller
//!
//! Wires the catalog, selection, display preference and chat session to a
//! completion client. At most one completion runs at a time: it is spawned as
//! a background task whose result comes back over a channel and is applied
//! by `poll` (from the TUI tick) or `wait` (from one-shot commands).

use std::sync::Arc;
use std::time::Duration;

use eyre::{Context, Result};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::catalog::{Catalog, CatalogLoader, CatalogSource, Product, ProductId};
use crate::chat::{ChatError, ChatSession, EMPTY_SELECTION_NOTICE};
use crate::completion::{CompletionClient, CompletionError, CompletionReply, CompletionRequest, HttpCompletionClient};
use crate::config::Config;
use crate::preference::{DisplayDirection, DisplayPreference};
use crate::prompts::{PromptLoader, RoutineContext, SystemContext};
use crate::selection::SelectionStore;
use crate::storage::{FileStorage, MemoryStorage, Storage};

/// Shown when the catalog could not be loaded
pub const CATALOG_FAILED_NOTICE: &str = "Could not load products. Check the catalog source and try again.";

const ROUTINE_PROMPT_FAILED_NOTICE: &str = "Sorry, I couldn't generate a routine. Please try again.";

type CompletionOutcome = Result<CompletionReply, CompletionError>;

/// The outstanding completion
struct InFlight {
    task: JoinHandle<()>,
    result_rx: mpsc::Receiver<CompletionOutcome>,
}

/// Application controller shared by the TUI and the CLI commands
pub struct Assistant {
    catalog: Catalog,
    selection: SelectionStore,
    preference: DisplayPreference,
    chat: ChatSession,
    prompts: PromptLoader,
    client: Arc<dyn CompletionClient>,
    in_flight: Option<InFlight>,
}

impl Assistant {
    /// Build a controller, restoring selection and direction from `storage`
    pub fn new(
        catalog: Catalog,
        storage: Arc<dyn Storage>,
        client: Arc<dyn CompletionClient>,
        prompts: PromptLoader,
        window_size: usize,
    ) -> Result<Self> {
        debug!(products = catalog.len(), window_size, "Assistant::new: called");
        let context = SystemContext::from_catalog(&catalog);
        let system_prompt = match prompts.system_prompt(&context) {
            Ok(prompt) => prompt,
            Err(e) => {
                warn!(error = %e, "System prompt override failed, using embedded prompt");
                PromptLoader::embedded_only()
                    .system_prompt(&context)
                    .context("Failed to render embedded system prompt")?
            }
        };

        Ok(Self {
            selection: SelectionStore::restore(Arc::clone(&storage)),
            preference: DisplayPreference::load(storage),
            chat: ChatSession::new(system_prompt, window_size),
            catalog,
            prompts,
            client,
            in_flight: None,
        })
    }

    /// Build everything from configuration
    ///
    /// Storage and catalog failures degrade (in-memory storage, empty
    /// catalog plus a notice) so the interface still comes up.
    pub async fn bootstrap(config: &Config) -> Result<Self> {
        debug!("Assistant::bootstrap: called");
        let storage: Arc<dyn Storage> = match FileStorage::open(&config.storage.dir) {
            Ok(storage) => {
                info!("Using storage at {}", storage.path().display());
                Arc::new(storage)
            }
            Err(e) => {
                warn!(error = %e, "Durable storage unavailable, selections will not be saved");
                Arc::new(MemoryStorage::new())
            }
        };

        let source = CatalogSource::parse(&config.catalog.source);
        let loader = CatalogLoader::new(source, Duration::from_millis(config.catalog.timeout_ms))
            .context("Failed to create catalog loader")?;
        let (catalog, catalog_failed) = match loader.load().await {
            Ok(catalog) => (catalog, false),
            Err(e) => {
                warn!(error = %e, source = %loader.source(), "Failed to load catalog");
                (Catalog::empty(), true)
            }
        };

        let client =
            HttpCompletionClient::from_config(&config.completion).context("Failed to create completion client")?;
        let prompts = PromptLoader::new(config.prompts.dir.as_deref());

        let mut assistant = Self::new(catalog, storage, Arc::new(client), prompts, config.chat.window_size)?;
        if catalog_failed {
            assistant.chat.notice(CATALOG_FAILED_NOTICE);
        }
        Ok(assistant)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn selection(&self) -> &SelectionStore {
        &self.selection
    }

    pub fn chat(&self) -> &ChatSession {
        &self.chat
    }

    pub fn direction(&self) -> DisplayDirection {
        self.preference.direction()
    }

    /// Selected products that resolve against the catalog, in selection order
    pub fn selected_products(&self) -> Vec<&Product> {
        self.selection.resolve(&self.catalog)
    }

    /// Toggle a product; returns true when it is now selected
    pub fn toggle(&mut self, id: &ProductId) -> bool {
        self.selection.toggle(id)
    }

    /// Deselect from the selected panel
    pub fn remove(&mut self, id: &ProductId) -> bool {
        self.selection.remove(id)
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn toggle_direction(&mut self) -> DisplayDirection {
        self.preference.toggle()
    }

    pub fn set_direction(&mut self, direction: DisplayDirection) {
        self.preference.set(direction);
    }

    /// Drop the transcript; refused while a reply is pending
    pub fn clear_chat(&mut self) -> Result<(), ChatError> {
        self.chat.clear()
    }

    pub fn is_busy(&self) -> bool {
        self.chat.is_awaiting_reply()
    }

    /// Send typed chat input
    pub fn submit_chat(&mut self, text: &str) -> Result<(), ChatError> {
        debug!(len = text.len(), "Assistant::submit_chat: called");
        let request = self.chat.submit(text)?;
        self.dispatch(request);
        Ok(())
    }

    /// Ask for a routine built from the selected products
    pub fn generate_routine(&mut self) -> Result<(), ChatError> {
        debug!(selected = self.selection.len(), "Assistant::generate_routine: called");
        self.chat.ensure_idle()?;

        let products = self.selection.resolve(&self.catalog);
        if products.is_empty() {
            self.chat.notice(EMPTY_SELECTION_NOTICE);
            return Err(ChatError::EmptySelection);
        }

        let prompt = match self.prompts.routine_prompt(&RoutineContext::from_products(&products)) {
            Ok(prompt) => prompt,
            Err(e) => {
                warn!(error = %e, "Failed to render routine prompt");
                self.chat.notice(ROUTINE_PROMPT_FAILED_NOTICE);
                return Err(ChatError::Prompt);
            }
        };

        let request = self.chat.submit_routine(prompt)?;
        self.dispatch(request);
        Ok(())
    }

    /// Spawn the completion task
    fn dispatch(&mut self, request: CompletionRequest) {
        info!(messages = request.messages.len(), "Spawning completion task");
        let client = Arc::clone(&self.client);
        let (result_tx, result_rx) = mpsc::channel::<CompletionOutcome>(1);

        let task = tokio::spawn(async move {
            debug!("Completion task started");
            let outcome = client.complete(request).await;
            if let Err(e) = &outcome {
                warn!(error = %e, "Completion failed");
            }
            let _ = result_tx.send(outcome).await;
        });

        self.in_flight = Some(InFlight { task, result_rx });
    }

    /// Apply a finished completion without blocking
    ///
    /// Returns true when the transcript changed. A task that ended without
    /// sending (panicked or aborted) is reported as cancelled.
    pub fn poll(&mut self) -> bool {
        let Some(in_flight) = &mut self.in_flight else {
            return false;
        };

        let outcome = match in_flight.result_rx.try_recv() {
            Ok(outcome) => outcome,
            Err(mpsc::error::TryRecvError::Empty) => return false,
            Err(mpsc::error::TryRecvError::Disconnected) => Err(CompletionError::Cancelled),
        };
        self.finish(outcome)
    }

    /// Wait for the outstanding completion and apply it
    ///
    /// Returns false when nothing was in flight.
    pub async fn wait(&mut self) -> bool {
        let Some(in_flight) = &mut self.in_flight else {
            return false;
        };

        let outcome = in_flight
            .result_rx
            .recv()
            .await
            .unwrap_or(Err(CompletionError::Cancelled));
        self.finish(outcome)
    }

    /// Abort the outstanding completion; the session gets a cancellation notice
    pub fn cancel(&mut self) -> bool {
        let Some(in_flight) = self.in_flight.take() else {
            return false;
        };
        in_flight.task.abort();
        self.chat.finish_request(Err(CompletionError::Cancelled))
    }

    fn finish(&mut self, outcome: CompletionOutcome) -> bool {
        self.in_flight = None;
        self.chat.finish_request(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{BUSY_NOTICE, EntryKind, Role};
    use crate::completion::mock::MockCompletionClient;

    fn product(id: &str, name: &str, brand: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            brand: brand.to_string(),
            category: "skincare".to_string(),
            description: String::new(),
            image: String::new(),
            price: None,
        }
    }

    fn catalog() -> Catalog {
        Catalog::new(vec![
            product("1", "Foaming Cleanser", "CeraVe"),
            product("2", "Micellar Water", "Garnier"),
            product("3", "Night Cream", "Olay"),
        ])
    }

    fn assistant(client: Arc<MockCompletionClient>) -> Assistant {
        Assistant::new(
            catalog(),
            Arc::new(MemoryStorage::new()),
            client,
            PromptLoader::embedded_only(),
            20,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_chat_round_trip() {
        let client = Arc::new(MockCompletionClient::replying("Use it twice a day."));
        let mut assistant = assistant(client.clone());

        assistant.submit_chat("How often should I cleanse?").unwrap();
        assert!(assistant.is_busy());
        assert!(assistant.wait().await);

        assert!(!assistant.is_busy());
        assert_eq!(client.call_count(), 1);
        let last = assistant.chat().entries().last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert_eq!(last.content, "Use it twice a day.");
        assert!(assistant.chat().entries().iter().all(|e| e.kind != EntryKind::Loading));
    }

    #[tokio::test]
    async fn test_routine_lists_selected_products() {
        let client = Arc::new(MockCompletionClient::replying("Step 1..."));
        let mut assistant = assistant(client.clone());
        assistant.toggle(&ProductId::new("3"));
        assistant.toggle(&ProductId::new("1"));

        assistant.generate_routine().unwrap();
        assistant.wait().await;

        let request = &client.requests()[0];
        let prompt = &request.messages.last().unwrap().content;
        assert!(prompt.contains("1. Night Cream (Olay)\n2. Foaming Cleanser (CeraVe)"));
        assert!(request.system_prompt.contains("skincare"));
    }

    #[tokio::test]
    async fn test_routine_with_empty_selection_sends_nothing() {
        let client = Arc::new(MockCompletionClient::replying("unused"));
        let mut assistant = assistant(client.clone());

        assert_eq!(assistant.generate_routine().unwrap_err(), ChatError::EmptySelection);
        assert!(!assistant.wait().await);
        assert_eq!(client.call_count(), 0);
        assert_eq!(assistant.chat().entries().last().unwrap().content, EMPTY_SELECTION_NOTICE);
    }

    #[tokio::test]
    async fn test_routine_with_only_stale_ids_is_empty_selection() {
        let client = Arc::new(MockCompletionClient::replying("unused"));
        let mut assistant = assistant(client.clone());
        assistant.toggle(&ProductId::new("404"));

        assert_eq!(assistant.generate_routine().unwrap_err(), ChatError::EmptySelection);
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_second_submit_while_busy_is_rejected() {
        let client = Arc::new(MockCompletionClient::replying("first"));
        let mut assistant = assistant(client.clone());

        assistant.submit_chat("one").unwrap();
        assert_eq!(assistant.submit_chat("two").unwrap_err(), ChatError::Busy);
        assistant.toggle(&ProductId::new("1"));
        assert_eq!(assistant.generate_routine().unwrap_err(), ChatError::Busy);

        assistant.wait().await;
        assert_eq!(client.call_count(), 1);
        assert!(assistant.chat().entries().iter().any(|e| e.content == BUSY_NOTICE));
    }

    #[tokio::test]
    async fn test_failure_leaves_no_loading_entry() {
        let client = Arc::new(MockCompletionClient::new(vec![Err(CompletionError::Api {
            status: 500,
            message: "boom".to_string(),
        })]));
        let mut assistant = assistant(client);

        assistant.submit_chat("hello").unwrap();
        assistant.wait().await;

        let entries = assistant.chat().entries();
        assert!(entries.iter().all(|e| e.kind != EntryKind::Loading));
        assert_eq!(entries.last().unwrap().kind, EntryKind::Notice);
        assert!(!assistant.is_busy());
    }

    #[tokio::test]
    async fn test_poll_applies_result_eventually() {
        let client = Arc::new(MockCompletionClient::replying("done"));
        let mut assistant = assistant(client);

        assistant.submit_chat("hi").unwrap();
        let mut applied = false;
        for _ in 0..100 {
            if assistant.poll() {
                applied = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(applied);
        assert!(!assistant.poll());
    }

    #[tokio::test]
    async fn test_cancel_clears_busy_state() {
        let client = Arc::new(MockCompletionClient::replying("late"));
        let mut assistant = assistant(client);

        assistant.submit_chat("hi").unwrap();
        assert!(assistant.cancel());
        assert!(!assistant.is_busy());
        assert!(assistant.chat().entries().iter().all(|e| e.kind != EntryKind::Loading));
        assert!(!assistant.poll());
    }

    #[test]
    fn test_selection_and_direction_restore_from_storage() {
        let storage = MemoryStorage::new();
        let client: Arc<dyn CompletionClient> = Arc::new(MockCompletionClient::new(vec![]));
        {
            let mut first =
                Assistant::new(catalog(), Arc::new(storage.clone()), client.clone(), PromptLoader::embedded_only(), 20)
                    .unwrap();
            first.toggle(&ProductId::new("2"));
            first.toggle_direction();
        }

        let second =
            Assistant::new(catalog(), Arc::new(storage), client, PromptLoader::embedded_only(), 20).unwrap();
        assert!(second.selection().contains(&ProductId::new("2")));
        assert!(second.direction().is_rtl());
    }
}
