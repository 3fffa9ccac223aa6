//! Runs room loads on a worker runtime and hands results back to the frame.
//!
//! Load futures execute on a tokio runtime. Their results are queued on an
//! unbounded channel and only observed when the frame thread calls
//! [`LoadDispatcher::drain`], so no scene state is touched off-thread.

use std::future::Future;
use std::pin::Pin;

use roomviz_ipc::RoomType;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::{debug, error};

use crate::error::AssetLoadError;
use crate::load::LoadTicket;

/// Future returned by [`SceneLoader::load`]
pub type LoadFuture<S> = Pin<Box<dyn Future<Output = Result<S, AssetLoadError>> + Send + 'static>>;

/// Produces the scene for a room. Implemented by the rendering host.
pub trait SceneLoader: Send + Sync + 'static {
    /// Whatever the host needs to put the loaded room on screen
    type Scene: Send + 'static;

    fn load(&self, room: RoomType) -> LoadFuture<Self::Scene>;
}

/// A finished load, tagged with the ticket it was issued for
#[derive(Debug)]
pub struct LoadCompletion<S> {
    pub ticket: LoadTicket,
    pub result: Result<S, AssetLoadError>,
}

/// Issues loads for tickets and collects their results.
///
/// At most one load runs at a time: dispatching a new ticket aborts the
/// previous task. Results that were already queued are still delivered and
/// must be filtered by the load state machine.
pub struct LoadDispatcher<L: SceneLoader> {
    loader: L,
    runtime: Handle,
    completions_tx: mpsc::UnboundedSender<LoadCompletion<L::Scene>>,
    completions_rx: mpsc::UnboundedReceiver<LoadCompletion<L::Scene>>,
    in_flight: Option<AbortHandle>,
}

impl<L: SceneLoader> LoadDispatcher<L> {
    pub fn new(loader: L, runtime: Handle) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            loader,
            runtime,
            completions_tx,
            completions_rx,
            in_flight: None,
        }
    }

    /// Start loading the ticket's room, replacing any running load.
    pub fn dispatch(&mut self, ticket: LoadTicket) {
        self.cancel();
        debug!(
            "Dispatching {} load (request {}, attempt {})",
            ticket.room, ticket.request_id, ticket.attempt
        );

        let load = self.runtime.spawn(self.loader.load(ticket.room));
        self.in_flight = Some(load.abort_handle());

        // Watch the load task so a panic still produces a result
        let tx = self.completions_tx.clone();
        self.runtime.spawn(async move {
            let result = match load.await {
                Ok(result) => result,
                Err(join_error) if join_error.is_cancelled() => return,
                Err(join_error) => {
                    error!("{} load task failed: {}", ticket.room, join_error);
                    Err(AssetLoadError::Aborted(join_error.to_string()))
                }
            };
            // The receiver only goes away with the dispatcher
            let _ = tx.send(LoadCompletion { ticket, result });
        });
    }

    /// Abort the running load, if any. Its result is never delivered.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }

    /// Everything that finished since the last call, in completion order.
    pub fn drain(&mut self) -> Vec<LoadCompletion<L::Scene>> {
        let mut completions = Vec::new();
        while let Ok(completion) = self.completions_rx.try_recv() {
            completions.push(completion);
        }
        completions
    }
}

impl<L: SceneLoader> Drop for LoadDispatcher<L> {
    fn drop(&mut self) {
        self.cancel();
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{FakeLoader, Scripted};
    use super::*;
    use std::time::Duration;

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_time()
            .build()
            .unwrap()
    }

    fn ticket(room: RoomType, request_id: u64) -> LoadTicket {
        LoadTicket {
            room,
            request_id,
            attempt: 0,
        }
    }

    fn wait_for<L: SceneLoader>(
        dispatcher: &mut LoadDispatcher<L>,
        count: usize,
    ) -> Vec<LoadCompletion<L::Scene>> {
        let mut completions = Vec::new();
        for _ in 0..200 {
            completions.extend(dispatcher.drain());
            if completions.len() >= count {
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        completions
    }

    #[test]
    fn test_delivers_result_with_ticket() {
        let rt = runtime();
        let mut dispatcher = LoadDispatcher::new(FakeLoader::default(), rt.handle().clone());
        dispatcher.dispatch(ticket(RoomType::Bedroom, 1));

        let completions = wait_for(&mut dispatcher, 1);
        assert_eq!(completions.len(), 1);
        assert_eq!(completions[0].ticket, ticket(RoomType::Bedroom, 1));
        assert_eq!(completions[0].result, Ok("bedroom#1".to_string()));
    }

    #[test]
    fn test_failure_is_delivered() {
        let rt = runtime();
        let loader = FakeLoader::default();
        loader.script(RoomType::Office, [Scripted::Fail]);
        let mut dispatcher = LoadDispatcher::new(loader, rt.handle().clone());
        dispatcher.dispatch(ticket(RoomType::Office, 1));

        let completions = wait_for(&mut dispatcher, 1);
        assert!(matches!(
            completions[0].result,
            Err(AssetLoadError::NotFound { .. })
        ));
    }

    #[test]
    fn test_panicking_loader_reports_aborted() {
        let rt = runtime();
        let loader = FakeLoader::default();
        loader.script(RoomType::Office, [Scripted::Panic]);
        let mut dispatcher = LoadDispatcher::new(loader, rt.handle().clone());
        dispatcher.dispatch(ticket(RoomType::Office, 1));

        let completions = wait_for(&mut dispatcher, 1);
        assert!(matches!(completions[0].result, Err(AssetLoadError::Aborted(_))));
    }

    #[test]
    fn test_new_dispatch_aborts_previous() {
        let rt = runtime();
        let loader = FakeLoader::default();
        loader.script(RoomType::LivingRoom, [Scripted::Slow(Duration::from_millis(300))]);
        let mut dispatcher = LoadDispatcher::new(loader.clone(), rt.handle().clone());

        dispatcher.dispatch(ticket(RoomType::LivingRoom, 1));
        dispatcher.dispatch(ticket(RoomType::Bedroom, 2));

        let completions = wait_for(&mut dispatcher, 1);
        std::thread::sleep(Duration::from_millis(400));
        let late = dispatcher.drain();

        assert_eq!(completions.len(), 1);
        assert_eq!(completions[0].ticket.room, RoomType::Bedroom);
        assert!(late.is_empty());
        assert_eq!(loader.calls(), vec![RoomType::LivingRoom, RoomType::Bedroom]);
    }

    #[test]
    fn test_drain_empty_without_loads() {
        let rt = runtime();
        let mut dispatcher = LoadDispatcher::new(FakeLoader::default(), rt.handle().clone());
        assert!(dispatcher.drain().is_empty());
    }
}
