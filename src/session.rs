//! One document, one builder, one tracker.

use crate::config::LayoutConfig;
use crate::error::Result;
use crate::host::DocumentHost;
use crate::layout::{TableBuilder, TableGroup};
use crate::selection::{CurrentTableRef, SelectionTracker};
use crate::types::{TableMetadata, TableSpec};

/// Owns the state a panel needs between calls: the host, the layout
/// builder (with its measurement cache) and the selection tracker.
pub struct TableSession<H: DocumentHost> {
    host: H,
    builder: TableBuilder,
    tracker: SelectionTracker,
}

impl<H: DocumentHost> TableSession<H> {
    /// Start a session and begin following the user's selection, so tables
    /// drawn before this session existed can be picked up by clicking them.
    pub fn new(host: H, config: LayoutConfig) -> Result<Self> {
        let mut session = Self {
            host,
            builder: TableBuilder::new(config)?,
            tracker: SelectionTracker::new(),
        };
        session.ensure_observing();
        Ok(session)
    }

    pub fn with_defaults(host: H) -> Result<Self> {
        Self::new(host, LayoutConfig::default())
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    pub fn builder(&self) -> &TableBuilder {
        &self.builder
    }

    pub fn tracker(&self) -> &SelectionTracker {
        &self.tracker
    }

    /// Draw a table and make it the target of later selection calls.
    ///
    /// A failed build leaves the tracked table as it was.
    pub fn create_table(&mut self, spec: &TableSpec) -> Result<TableGroup> {
        let table = self.builder.create_table(&mut self.host, spec)?;
        self.tracker.track(table.root.clone());
        self.ensure_observing();
        Ok(table)
    }

    /// Subscribe to selection changes unless already subscribed.
    ///
    /// Failure is logged; explicit selection calls keep working without it.
    fn ensure_observing(&mut self) {
        if self.tracker.is_observing() {
            return;
        }
        if let Err(e) = self.tracker.observe(&mut self.host) {
            tracing::warn!(
                target: "express_tables::selection",
                error = %e,
                "could not subscribe to selection changes"
            );
        }
    }

    pub fn current_table(&self) -> CurrentTableRef {
        self.tracker.current()
    }

    pub fn select_row(&mut self, row_index: i64) -> bool {
        self.tracker.select_row(&mut self.host, row_index)
    }

    pub fn select_column(&mut self, column_index: i64) -> bool {
        self.tracker.select_column(&mut self.host, column_index)
    }

    pub fn select_all(&mut self) -> bool {
        self.tracker.select_all(&mut self.host)
    }

    pub fn clear_selection(&mut self) -> bool {
        self.tracker.clear_selection(&mut self.host)
    }

    /// Width of `text` in the host's current default font
    pub fn measure_text(&mut self, text: &str) -> Result<f64> {
        self.builder.measure_width_fresh(&mut self.host, text)
    }

    /// Wrap `text` for a cell `available_width` wide, measuring it first
    pub fn wrap_text(&mut self, text: &str, available_width: f64) -> Result<String> {
        let measured = self.builder.measure_width_fresh(&mut self.host, text)?;
        self.builder
            .wrap(&mut self.host, text, available_width, measured)
    }

    pub fn table_metadata(&self) -> Option<TableMetadata> {
        self.tracker.table_metadata(&self.host)
    }

    /// Metadata keys present on the tracked table
    pub fn table_metadata_keys(&self) -> Vec<String> {
        let Some(id) = self.tracker.current_id() else {
            return Vec::new();
        };
        self.host.metadata_keys(&id).unwrap_or_else(|e| {
            tracing::warn!(
                target: "express_tables::selection",
                table = %id,
                error = %e,
                "could not list table metadata"
            );
            Vec::new()
        })
    }

    /// Stop following user selection
    pub fn close(&mut self) -> Result<()> {
        self.tracker.stop_observing(&mut self.host)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp
)]
mod tests {
    use super::*;
    use crate::host::{DocumentQuery, HostOp, MemoryDocument, TextMetrics};
    use crate::types::METADATA_KEY;

    #[test]
    fn test_create_tracks_and_observes() {
        let mut session = TableSession::with_defaults(MemoryDocument::new()).unwrap();
        let table = session.create_table(&TableSpec::new(2, 2)).unwrap();
        assert_eq!(session.current_table(), CurrentTableRef::Present(table.root.clone()));
        assert_eq!(session.host().listener_count(), 1);
        session.create_table(&TableSpec::new(1, 1)).unwrap();
        assert_eq!(session.host().listener_count(), 1);
        session.close().unwrap();
        assert_eq!(session.host().listener_count(), 0);
    }

    #[test]
    fn test_observes_from_the_start() {
        let mut doc = MemoryDocument::new();
        let mut builder = TableBuilder::new(LayoutConfig::default()).unwrap();
        let earlier = builder.create_table(&mut doc, &TableSpec::new(2, 2)).unwrap();

        let mut session = TableSession::with_defaults(doc).unwrap();
        assert_eq!(session.host().listener_count(), 1);
        assert_eq!(session.current_table(), CurrentTableRef::Absent);
        session.host_mut().user_select(&[earlier.root.clone()]).unwrap();
        assert!(session.select_row(1));
        assert_eq!(
            session.host().selection().unwrap(),
            vec![earlier.rows[1].group.clone()]
        );
    }

    #[test]
    fn test_subscribe_failure_retried_on_create() {
        let mut doc = MemoryDocument::new();
        doc.fail(HostOp::Subscribe);
        let mut session = TableSession::with_defaults(doc).unwrap();
        assert!(!session.tracker().is_observing());
        session.host_mut().recover(HostOp::Subscribe);
        session.create_table(&TableSpec::new(1, 1)).unwrap();
        assert_eq!(session.host().listener_count(), 1);
    }

    #[test]
    fn test_measure_text_follows_font_change() {
        let mut session = TableSession::with_defaults(MemoryDocument::new()).unwrap();
        assert_eq!(session.measure_text("abcd").unwrap(), 30.0);
        let metrics = TextMetrics {
            char_width: 10.0,
            ..session.host().metrics()
        };
        session.host_mut().set_metrics(metrics);
        assert_eq!(session.measure_text("abcd").unwrap(), 40.0);
        assert_eq!(session.host().orphan_count(), 0);
    }

    #[test]
    fn test_failed_build_keeps_previous_table() {
        let mut session = TableSession::with_defaults(MemoryDocument::new()).unwrap();
        let first = session.create_table(&TableSpec::new(2, 1)).unwrap();
        assert!(session.create_table(&TableSpec::new(0, 1)).is_err());
        assert_eq!(session.tracker().current_id(), Some(first.root));
    }

    #[test]
    fn test_metadata_keys_listed() {
        let mut session = TableSession::with_defaults(MemoryDocument::new()).unwrap();
        assert!(session.table_metadata_keys().is_empty());
        let table = session.create_table(&TableSpec::new(3, 2)).unwrap();
        assert_eq!(session.table_metadata_keys(), vec![METADATA_KEY.to_string()]);
        let meta = session.table_metadata().unwrap();
        assert_eq!(meta.node_id, table.root);
        assert_eq!((meta.columns, meta.rows), (3, 2));
    }

    #[test]
    fn test_wrap_text_measures_first() {
        let mut session = TableSession::with_defaults(MemoryDocument::new()).unwrap();
        let wrapped = session.wrap_text("alpha beta gamma delta", 60.0).unwrap();
        assert!(wrapped.contains('\n'));
        assert_eq!(session.host().orphan_count(), 0);
        assert_eq!(session.wrap_text("ok", 60.0).unwrap(), "ok");
    }

    #[test]
    fn test_selection_errors_do_not_escape() {
        let mut session = TableSession::with_defaults(MemoryDocument::new()).unwrap();
        session.create_table(&TableSpec::new(2, 2)).unwrap();
        session.host_mut().fail(HostOp::Children);
        assert!(!session.select_row(0));
        assert_eq!(session.current_table(), CurrentTableRef::Absent);
        session.host_mut().recover(HostOp::Children);
        assert!(!session.select_all());
        assert!(session.host().selection().unwrap().is_empty());
    }
}
