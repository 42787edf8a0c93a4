pub mod app;
pub mod domain;
pub mod infra;
pub mod ui;

pub use app::extract::extract;
pub use app::format::{FormatStyle, Formatter};
pub use app::select::{SelectionOutcome, ToolChoice, select};
pub use domain::model::{ItemCollection, ItemId, MarkerKind, SelectableItem};

/// Install the global tracing subscriber, logging to stderr so stdout stays
/// clean for piped output.
pub fn init() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();
}
