use std::cell::RefCell;
use std::rc::Rc;

use crate::error::Result;
use crate::host::{contains_node, DocumentHost, DocumentQuery, SubscriptionId};
use crate::types::{NodeId, TableMetadata, METADATA_KEY};

/// Cached reference to the table selection operations act on
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CurrentTableRef {
    #[default]
    Absent,
    Present(NodeId),
}

impl CurrentTableRef {
    pub fn id(&self) -> Option<&NodeId> {
        match self {
            Self::Absent => None,
            Self::Present(id) => Some(id),
        }
    }
}

/// Selects rows, columns or whole tables of the most recent table.
///
/// The document is the source of truth: every operation first checks that
/// the tracked root is still reachable from the document root and drops
/// the reference when it is not. Operations report failure as `false`.
#[derive(Debug, Default)]
pub struct SelectionTracker {
    current: Rc<RefCell<CurrentTableRef>>,
    subscription: Option<SubscriptionId>,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> CurrentTableRef {
        self.current.borrow().clone()
    }

    pub fn current_id(&self) -> Option<NodeId> {
        self.current.borrow().id().cloned()
    }

    /// Make `root` the table later operations act on
    pub fn track(&self, root: NodeId) {
        tracing::debug!(target: "express_tables::selection", table = %root, "tracking table");
        self.current.replace(CurrentTableRef::Present(root));
    }

    pub fn forget(&self) {
        self.current.replace(CurrentTableRef::Absent);
    }

    pub fn is_observing(&self) -> bool {
        self.subscription.is_some()
    }

    /// Follow the user into tables they select in the document.
    ///
    /// Replaces any earlier subscription held by this tracker.
    pub fn observe<H: DocumentHost + ?Sized>(&mut self, host: &mut H) -> Result<()> {
        self.stop_observing(host)?;
        let current = Rc::clone(&self.current);
        let subscription = host.subscribe_selection_change(Box::new(
            move |doc: &dyn DocumentQuery, selected: &[NodeId]| {
                on_selection_changed(&current, doc, selected);
            },
        ))?;
        self.subscription = Some(subscription);
        Ok(())
    }

    pub fn stop_observing<H: DocumentHost + ?Sized>(&mut self, host: &mut H) -> Result<()> {
        if let Some(subscription) = self.subscription.take() {
            host.unsubscribe_selection_change(subscription)?;
        }
        Ok(())
    }

    /// Select data row `row_index` (0-based; -1 addresses the header row)
    pub fn select_row<H: DocumentHost + ?Sized>(&self, host: &mut H, row_index: i64) -> bool {
        let Some(table) = self.live_table(host) else {
            return false;
        };
        let rows = match host.children(&table) {
            Ok(rows) => rows,
            Err(e) => return self.host_failed("read table rows", &e),
        };
        let target = usize::try_from(row_index.saturating_add(1))
            .ok()
            .and_then(|i| rows.get(i));
        let Some(row) = target else {
            tracing::warn!(
                target: "express_tables::selection",
                row_index,
                rows = rows.len().saturating_sub(1),
                "row out of range"
            );
            return false;
        };
        self.apply(host, std::slice::from_ref(row), "row")
    }

    /// Select the cells of column `column_index` in every row, header included
    pub fn select_column<H: DocumentHost + ?Sized>(&self, host: &mut H, column_index: i64) -> bool {
        let Some(table) = self.live_table(host) else {
            return false;
        };
        match self.column_cells(host, &table, column_index) {
            Ok(cells) if cells.is_empty() => {
                tracing::warn!(
                    target: "express_tables::selection",
                    column_index,
                    "column out of range"
                );
                false
            }
            Ok(cells) => self.apply(host, &cells, "column"),
            Err(e) => self.host_failed("read table columns", &e),
        }
    }

    /// Select the table root itself
    pub fn select_all<H: DocumentHost + ?Sized>(&self, host: &mut H) -> bool {
        let Some(table) = self.live_table(host) else {
            return false;
        };
        self.apply(host, &[table], "table")
    }

    /// Empty the document selection. The tracked table is left alone.
    pub fn clear_selection<H: DocumentHost + ?Sized>(&self, host: &mut H) -> bool {
        match host.set_selection(&[]) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(
                    target: "express_tables::selection",
                    error = %e,
                    "failed to clear selection"
                );
                false
            }
        }
    }

    /// Identification record stored on the tracked table
    pub fn table_metadata<Q: DocumentQuery + ?Sized>(&self, doc: &Q) -> Option<TableMetadata> {
        let id = self.current_id()?;
        let raw = doc.metadata(&id, METADATA_KEY).ok().flatten()?;
        match TableMetadata::from_json(&raw) {
            Ok(meta) => Some(meta),
            Err(e) => {
                tracing::warn!(
                    target: "express_tables::selection",
                    table = %id,
                    error = %e,
                    "unreadable table metadata"
                );
                None
            }
        }
    }

    fn column_cells<H: DocumentHost + ?Sized>(
        &self,
        host: &H,
        table: &NodeId,
        column_index: i64,
    ) -> Result<Vec<NodeId>> {
        let rows = host.children(table)?;
        let Some(header) = rows.first() else {
            return Ok(Vec::new());
        };
        let columns = host.child_count(header)?;
        let Some(column) = usize::try_from(column_index).ok().filter(|c| *c < columns) else {
            return Ok(Vec::new());
        };
        let mut cells = Vec::with_capacity(rows.len());
        for row in &rows {
            if let Some(cell) = host.child_at(row, column)? {
                cells.push(cell);
            }
        }
        Ok(cells)
    }

    /// Tracked root if it is still part of the document.
    ///
    /// Walks the whole document tree; the reference is dropped when the
    /// walk does not find it.
    fn live_table<H: DocumentHost + ?Sized>(&self, host: &H) -> Option<NodeId> {
        let Some(id) = self.current_id() else {
            tracing::debug!(target: "express_tables::selection", "no table tracked");
            return None;
        };
        let found = host
            .document_root()
            .and_then(|root| contains_node(host, &root, &id));
        match found {
            Ok(true) => Some(id),
            Ok(false) => {
                tracing::warn!(
                    target: "express_tables::selection",
                    table = %id,
                    "tracked table no longer in document"
                );
                self.forget();
                None
            }
            Err(e) => {
                self.host_failed("verify tracked table", &e);
                None
            }
        }
    }

    fn apply<H: DocumentHost + ?Sized>(&self, host: &mut H, targets: &[NodeId], what: &str) -> bool {
        match host.set_selection(targets) {
            Ok(()) => {
                tracing::debug!(
                    target: "express_tables::selection",
                    what,
                    nodes = targets.len(),
                    "selected"
                );
                true
            }
            Err(e) => self.host_failed("set selection", &e),
        }
    }

    fn host_failed(&self, action: &str, error: &crate::error::TableError) -> bool {
        tracing::error!(
            target: "express_tables::selection",
            action,
            error = %error,
            "host failure, dropping tracked table"
        );
        self.forget();
        false
    }
}

/// Point `current` at a selected table root, if the selection touches one.
///
/// A node counts when it, or its immediate parent, carries the table
/// identification record.
pub fn on_selection_changed(
    current: &RefCell<CurrentTableRef>,
    doc: &dyn DocumentQuery,
    selected: &[NodeId],
) {
    for node in selected {
        let candidates = std::iter::once(Some(node.clone()))
            .chain(std::iter::once(doc.parent(node).ok().flatten()))
            .flatten();
        for candidate in candidates {
            if matches!(doc.metadata(&candidate, METADATA_KEY), Ok(Some(_))) {
                tracing::debug!(
                    target: "express_tables::selection",
                    table = %candidate,
                    "selection entered a table"
                );
                current.replace(CurrentTableRef::Present(candidate));
                return;
            }
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::host::{HostOp, MemoryDocument};

    /// root -> row x2 -> cell x3, appended to the artboard and tagged
    fn tiny_table(doc: &mut MemoryDocument) -> (NodeId, Vec<NodeId>) {
        let root = doc.create_group().unwrap();
        let mut rows = Vec::new();
        for _ in 0..2 {
            let row = doc.create_group().unwrap();
            for _ in 0..3 {
                let cell = doc.create_group().unwrap();
                doc.append_child(&row, &cell).unwrap();
            }
            doc.append_child(&root, &row).unwrap();
            rows.push(row);
        }
        let artboard = doc.insertion_parent().unwrap();
        doc.append_child(&artboard, &root).unwrap();
        let meta = TableMetadata::new(root.clone(), 3, 1).to_json().unwrap();
        doc.set_metadata(&root, METADATA_KEY, &meta).unwrap();
        (root, rows)
    }

    #[test]
    fn test_absent_fails_fast() {
        let mut doc = MemoryDocument::new();
        let tracker = SelectionTracker::new();
        assert!(!tracker.select_all(&mut doc));
        assert!(!tracker.select_row(&mut doc, 0));
        assert!(!tracker.select_column(&mut doc, 0));
        assert!(tracker.clear_selection(&mut doc));
    }

    #[test]
    fn test_select_row_offsets_header() {
        let mut doc = MemoryDocument::new();
        let (root, rows) = tiny_table(&mut doc);
        let tracker = SelectionTracker::new();
        tracker.track(root);
        assert!(tracker.select_row(&mut doc, 0));
        assert_eq!(doc.selection().unwrap(), vec![rows[1].clone()]);
        assert!(tracker.select_row(&mut doc, -1));
        assert_eq!(doc.selection().unwrap(), vec![rows[0].clone()]);
    }

    #[test]
    fn test_out_of_range_row_leaves_selection() {
        let mut doc = MemoryDocument::new();
        let (root, rows) = tiny_table(&mut doc);
        let tracker = SelectionTracker::new();
        tracker.track(root.clone());
        doc.set_selection(&[rows[0].clone()]).unwrap();
        for index in [1, 7, -2, i64::MIN, i64::MAX] {
            assert!(!tracker.select_row(&mut doc, index), "row {index}");
        }
        assert_eq!(doc.selection().unwrap(), vec![rows[0].clone()]);
        assert_eq!(tracker.current_id(), Some(root));
    }

    #[test]
    fn test_select_column_spans_rows() {
        let mut doc = MemoryDocument::new();
        let (root, rows) = tiny_table(&mut doc);
        let tracker = SelectionTracker::new();
        tracker.track(root);
        assert!(tracker.select_column(&mut doc, 2));
        let expected: Vec<NodeId> = rows
            .iter()
            .map(|r| doc.children(r).unwrap()[2].clone())
            .collect();
        assert_eq!(doc.selection().unwrap(), expected);
        assert!(!tracker.select_column(&mut doc, 3));
        assert!(!tracker.select_column(&mut doc, -1));
    }

    #[test]
    fn test_deleted_table_goes_absent() {
        let mut doc = MemoryDocument::new();
        let (root, _) = tiny_table(&mut doc);
        let tracker = SelectionTracker::new();
        tracker.track(root.clone());
        doc.remove_node(&root).unwrap();
        assert!(!tracker.select_all(&mut doc));
        assert_eq!(tracker.current(), CurrentTableRef::Absent);
    }

    #[test]
    fn test_host_failure_on_select_goes_absent() {
        let mut doc = MemoryDocument::new();
        let (root, _) = tiny_table(&mut doc);
        let tracker = SelectionTracker::new();
        tracker.track(root);
        doc.fail(HostOp::SetSelection);
        assert!(!tracker.select_all(&mut doc));
        assert_eq!(tracker.current(), CurrentTableRef::Absent);
    }

    #[test]
    fn test_clear_keeps_reference() {
        let mut doc = MemoryDocument::new();
        let (root, _) = tiny_table(&mut doc);
        let tracker = SelectionTracker::new();
        tracker.track(root.clone());
        assert!(tracker.select_all(&mut doc));
        assert!(tracker.clear_selection(&mut doc));
        assert!(doc.selection().unwrap().is_empty());
        assert_eq!(tracker.current_id(), Some(root));
        doc.fail(HostOp::SetSelection);
        assert!(!tracker.clear_selection(&mut doc));
    }

    #[test]
    fn test_observer_reacquires_from_child() {
        let mut doc = MemoryDocument::new();
        let (root, rows) = tiny_table(&mut doc);
        let mut tracker = SelectionTracker::new();
        tracker.observe(&mut doc).unwrap();
        assert_eq!(tracker.current(), CurrentTableRef::Absent);
        doc.user_select(&[rows[1].clone()]).unwrap();
        assert_eq!(tracker.current_id(), Some(root));
    }

    #[test]
    fn test_observe_replaces_subscription() {
        let mut doc = MemoryDocument::new();
        let mut tracker = SelectionTracker::new();
        tracker.observe(&mut doc).unwrap();
        tracker.observe(&mut doc).unwrap();
        assert_eq!(doc.listener_count(), 1);
        tracker.stop_observing(&mut doc).unwrap();
        assert_eq!(doc.listener_count(), 0);
        assert!(!tracker.is_observing());
    }

    #[test]
    fn test_metadata_read_back() {
        let mut doc = MemoryDocument::new();
        let (root, _) = tiny_table(&mut doc);
        let tracker = SelectionTracker::new();
        assert!(tracker.table_metadata(&doc).is_none());
        tracker.track(root.clone());
        let meta = tracker.table_metadata(&doc).unwrap();
        assert_eq!(meta.node_id, root);
        assert_eq!(meta.columns, 3);
    }
}
