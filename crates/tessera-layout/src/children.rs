// crates/tessera-layout/src/children.rs
use crate::{ChildRejected, Widget};
use tessera_core::{HostSurface, NodeId, Point, WidgetError, WidgetId, WidgetResult};
use tracing::{debug, warn};

/// The child list of a container, kept in insertion order.
///
/// Mounting goes through here so a child is only stored once the host took
/// it, and only dropped from the list once the host let go of it.
pub struct Children {
    owner: WidgetId,
    widgets: Vec<Box<dyn Widget>>,
    limit: Option<usize>,
}

impl Children {
    pub fn new(owner: WidgetId) -> Self {
        Self {
            owner,
            widgets: Vec::new(),
            limit: None,
        }
    }

    /// A list that holds at most one child.
    pub fn single(owner: WidgetId) -> Self {
        Self {
            owner,
            widgets: Vec::new(),
            limit: Some(1),
        }
    }

    pub fn as_slice(&self) -> &[Box<dyn Widget>] {
        &self.widgets
    }

    pub fn as_mut_slice(&mut self) -> &mut [Box<dyn Widget>] {
        &mut self.widgets
    }

    pub fn first_mut(&mut self) -> Option<&mut Box<dyn Widget>> {
        self.widgets.first_mut()
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    pub fn accepts(&self) -> WidgetResult<()> {
        match self.limit {
            Some(limit) if self.widgets.len() >= limit => Err(WidgetError::ChildSlotOccupied(self.owner)),
            _ => Ok(()),
        }
    }

    /// Appends `child`, first mounting it under `node` when the owner is mounted.
    pub fn insert(
        &mut self,
        mut child: Box<dyn Widget>,
        host: &mut dyn HostSurface,
        node: Option<NodeId>,
    ) -> Result<(), ChildRejected> {
        if let Err(error) = self.accepts() {
            return Err(ChildRejected { child, error });
        }

        if let Some(node) = node {
            if let Err(error) = child.mount_to(host, node) {
                // Take down whatever part of the subtree made it onto the surface
                if let Err(cleanup) = child.unmount_from(host, node) {
                    warn!("Widget {}: could not unmount rejected child {}: {}", self.owner, child.widget_id(), cleanup);
                }
                return Err(ChildRejected { child, error });
            }
        }

        debug!("Widget {}: added child {}", self.owner, child.widget_id());
        self.widgets.push(child);
        Ok(())
    }

    /// Unmounts and removes the child with `child_id`. A child the host
    /// refuses to detach stays in the list.
    pub fn remove(
        &mut self,
        child_id: WidgetId,
        host: &mut dyn HostSurface,
        node: Option<NodeId>,
    ) -> WidgetResult<Option<Box<dyn Widget>>> {
        let Some(index) = self.widgets.iter().position(|child| child.widget_id() == child_id) else {
            return Ok(None);
        };

        if let Some(node) = node {
            self.widgets[index].unmount_from(host, node)?;
        }
        debug!("Widget {}: removed child {}", self.owner, child_id);
        Ok(Some(self.widgets.remove(index)))
    }

    pub fn mount(&mut self, host: &mut dyn HostSurface, node: NodeId) -> WidgetResult<()> {
        for child in &mut self.widgets {
            child.mount_to(host, node)?;
        }
        Ok(())
    }

    pub fn unmount(&mut self, host: &mut dyn HostSurface, node: Option<NodeId>) -> WidgetResult<()> {
        if let Some(node) = node {
            for child in &mut self.widgets {
                child.unmount_from(host, node)?;
            }
        }
        Ok(())
    }

    /// Moves every child by `delta` without measuring again.
    pub fn translate(&mut self, delta: Point) {
        for child in &mut self.widgets {
            let origin = child.rectangle().origin() + delta;
            child.set_origin(origin);
        }
    }
}
