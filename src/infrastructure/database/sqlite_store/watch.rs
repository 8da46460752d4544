use std::future::Future;

use futures::StreamExt;
use tokio::sync::broadcast;

use crate::application::ports::local_store::LiveStream;
use crate::shared::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Table {
    Trips,
    Activities,
    Messages,
    BudgetItems,
    Notifications,
    Users,
}

/// One broadcast channel of "table touched" ticks shared by every live query
/// on a store. Receivers that lag simply re-run their query against the
/// current state.
#[derive(Clone)]
pub(super) struct TableWatch {
    sender: broadcast::Sender<Table>,
}

impl TableWatch {
    pub(super) fn new() -> Self {
        let (sender, _) = broadcast::channel(256);
        Self { sender }
    }

    pub(super) fn notify(&self, table: Table) {
        let _ = self.sender.send(table);
    }

    fn subscribe(&self) -> broadcast::Receiver<Table> {
        self.sender.subscribe()
    }
}

struct LiveState<F, T> {
    receiver: broadcast::Receiver<Table>,
    table: Table,
    query: F,
    last: Option<T>,
    failed: bool,
}

/// Builds a live query stream: run the query once immediately, then again on
/// every tick for `table`, emitting only when the result changed. A query
/// error is emitted once and closes the stream.
pub(super) fn live_query<T, F, Fut>(tables: &TableWatch, table: Table, query: F) -> LiveStream<T>
where
    T: Clone + PartialEq + Send + 'static,
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, AppError>> + Send + 'static,
{
    let state = LiveState {
        receiver: tables.subscribe(),
        table,
        query,
        last: None,
        failed: false,
    };
    futures::stream::unfold(state, |mut state| async move {
        if state.failed {
            return None;
        }
        loop {
            if state.last.is_some() {
                match state.receiver.recv().await {
                    Ok(touched) => {
                        if touched != state.table {
                            continue;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(_)) => {}
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
            match (state.query)().await {
                Ok(result) => {
                    if state.last.as_ref() == Some(&result) {
                        continue;
                    }
                    state.last = Some(result.clone());
                    return Some((Ok(result), state));
                }
                Err(err) => {
                    state.failed = true;
                    return Some((Err(err), state));
                }
            }
        }
    })
    .boxed()
}
