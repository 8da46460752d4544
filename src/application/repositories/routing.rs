use crate::infrastructure::connectivity::ConnectivityMonitor;

/// Which store a read is served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceSelection {
    Remote,
    Local,
}

/// Evaluated once when a read attaches and fixed for the life of the
/// returned stream. A later connectivity flip never re-routes a live
/// stream; consumers re-subscribe to re-evaluate.
pub(super) fn select_source(connectivity: &ConnectivityMonitor, subject: &str) -> SourceSelection {
    let selection = if connectivity.is_available() {
        SourceSelection::Remote
    } else {
        SourceSelection::Local
    };
    tracing::debug!(subject, ?selection, "read source selected");
    selection
}
