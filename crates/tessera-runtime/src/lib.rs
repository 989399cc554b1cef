// crates/tessera-runtime/src/lib.rs

use serde_json::Value;
use std::collections::HashMap;
use std::rc::Rc;
use tessera_core::{
    HostSurface, NodeId, Point, Rectangle, Size, SizeConstraints, WidgetError, WidgetId, WidgetResult,
};
use tessera_layout::{
    collect_widget_ids, find_parent_id, find_widget, find_widget_mut, ChildRejected, MonospaceMeasure, TextMeasure,
    Widget,
};
use tracing::{debug, info, warn};

pub mod command;
pub mod events;
pub mod id_provider;
pub mod widget_type;

pub use command::Command;
pub use events::*;
pub use id_provider::WidgetIdProvider;
pub use widget_type::WidgetType;

/// Failures collected while processing a batch of commands.
///
/// Every command in the batch runs; `failures` holds the index of each
/// command that failed together with its error.
#[derive(Debug, thiserror::Error)]
#[error("{} of {} commands failed", .failures.len(), .total)]
pub struct BatchError {
    pub total: usize,
    pub failures: Vec<(usize, WidgetError)>,
}

/// Owns every widget of an application and applies commands to them.
///
/// A widget lives either in the detached pool (created, not yet added to a
/// parent) or inside exactly one tree. The main widget is the root of the tree
/// mounted on the surface and is laid out with a tight viewport constraint.
pub struct WidgetManager<S: HostSurface> {
    surface: S,
    id_provider: WidgetIdProvider,
    measure: Rc<dyn TextMeasure>,
    detached: HashMap<WidgetId, Box<dyn Widget>>,
    main_widget: Option<Box<dyn Widget>>,
    viewport: Size,
    event_handler: Option<EventHandler>,
    observations: HashMap<WidgetId, Vec<EventObservation>>,
}

/// Finds a widget in the main tree or anywhere in the detached pool.
///
/// Takes the two owning fields rather than the manager so the caller can
/// still borrow the surface mutably.
fn locate_mut<'a>(
    main_widget: &'a mut Option<Box<dyn Widget>>,
    detached: &'a mut HashMap<WidgetId, Box<dyn Widget>>,
    widget_id: WidgetId,
) -> WidgetResult<&'a mut dyn Widget> {
    main_widget
        .iter_mut()
        .chain(detached.values_mut())
        .find_map(|widget| find_widget_mut(widget.as_mut(), widget_id))
        .ok_or(WidgetError::UnknownWidgetReference(widget_id))
}

impl<S: HostSurface> WidgetManager<S> {
    pub fn new(surface: S) -> Self {
        Self::with_measure(surface, Rc::new(MonospaceMeasure::default()))
    }

    pub fn with_measure(surface: S, measure: Rc<dyn TextMeasure>) -> Self {
        Self {
            surface,
            id_provider: WidgetIdProvider::new(),
            measure,
            detached: HashMap::new(),
            main_widget: None,
            viewport: Size::ZERO,
            event_handler: None,
            observations: HashMap::new(),
        }
    }

    pub fn next_widget_id(&mut self) -> WidgetId {
        self.id_provider.next_widget_id()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn main_widget(&self) -> Option<&dyn Widget> {
        self.main_widget.as_deref()
    }

    pub fn widget(&self, widget_id: WidgetId) -> Option<&dyn Widget> {
        self.main_widget
            .iter()
            .chain(self.detached.values())
            .find_map(|widget| find_widget(widget.as_ref(), widget_id))
    }

    /// Geometry from the most recent layout of the widget.
    pub fn rectangle(&self, widget_id: WidgetId) -> Option<Rectangle> {
        self.widget(widget_id).map(|widget| *widget.rectangle())
    }

    pub fn value(&self, widget_id: WidgetId) -> Option<String> {
        self.widget(widget_id).and_then(|widget| widget.value())
    }

    /// Widgets that exist but are not part of any tree.
    pub fn detached_widget_ids(&self) -> Vec<WidgetId> {
        let mut ids: Vec<_> = self.detached.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    fn contains(&self, widget_id: WidgetId) -> bool {
        self.widget(widget_id).is_some()
    }

    /// Binds the main widget to a new viewport size and lays it out again.
    pub fn resize(&mut self, viewport: Size) -> WidgetResult<()> {
        SizeConstraints::new(viewport, viewport)?;
        debug!("Viewport resized to {:?}", viewport);
        self.viewport = viewport;
        self.relayout()
    }

    fn relayout(&mut self) -> WidgetResult<()> {
        let Some(main_widget) = self.main_widget.as_mut() else {
            return Ok(());
        };
        let size = main_widget.apply_size_constraints(SizeConstraints::tight(self.viewport))?;
        main_widget.set_origin(Point::ZERO);
        main_widget.sync_geometry(&mut self.surface)?;
        debug!("Laid out main widget {} at {:?}", main_widget.widget_id(), size);
        Ok(())
    }

    /// Registers the receiver of observed event payloads.
    pub fn handle_events(&mut self, handler: impl FnMut(WidgetId, &Value) + 'static) {
        self.event_handler = Some(Box::new(handler));
    }

    /// Delivers every payload observed for `event_type` on the widget and
    /// returns how many were delivered.
    pub fn notify(&mut self, widget_id: WidgetId, event_type: WidgetEventType) -> WidgetResult<usize> {
        if !self.contains(widget_id) {
            return Err(WidgetError::UnknownWidgetReference(widget_id));
        }
        let (Some(handler), Some(observations)) =
            (self.event_handler.as_mut(), self.observations.get(&widget_id))
        else {
            return Ok(0);
        };

        let mut delivered = 0;
        for observation in observations.iter().filter(|o| o.event_type == event_type) {
            handler(widget_id, &observation.payload);
            delivered += 1;
        }
        debug!("Delivered {} {:?} payloads for widget {}", delivered, event_type, widget_id);
        Ok(delivered)
    }

    pub fn handle_command(&mut self, command: Command) -> WidgetResult<()> {
        debug!("Handling {:?}", command);
        match command {
            Command::CreateWidget(widget_id, widget_type) => self.create_widget(widget_id, widget_type),
            Command::AddChild {
                parent_widget_id,
                child_widget_id,
            } => self.add_child(parent_widget_id, child_widget_id),
            Command::RemoveChild {
                parent_widget_id,
                child_widget_id,
                destroy_child_widget,
            } => self.remove_child(parent_widget_id, child_widget_id, destroy_child_widget),
            Command::RemoveChildren {
                parent_widget_id,
                destroy_child_widgets,
            } => self.remove_children(parent_widget_id, destroy_child_widgets),
            Command::Destroy(widget_id) => self.destroy(widget_id),
            Command::SetValue(widget_id, value) => {
                locate_mut(&mut self.main_widget, &mut self.detached, widget_id)?
                    .set_value(&value, &mut self.surface)?;
                self.relayout()
            }
            Command::SetHorizontalAlignment(widget_id, alignment) => {
                locate_mut(&mut self.main_widget, &mut self.detached, widget_id)?.set_horizontal_alignment(alignment)?;
                self.relayout()
            }
            Command::SetVerticalAlignment(widget_id, alignment) => {
                locate_mut(&mut self.main_widget, &mut self.detached, widget_id)?.set_vertical_alignment(alignment)?;
                self.relayout()
            }
            Command::SetMainWidget(widget_id) => self.set_main_widget(widget_id),
            Command::AddEventObservation(widget_id, event_type, payload) => {
                self.add_event_observation(widget_id, event_type, payload)
            }
            Command::RemoveEventObservation(widget_id, event_type) => {
                self.remove_event_observation(widget_id, event_type)
            }
        }
    }

    /// Runs every command, even after failures, and reports the failures.
    pub fn handle_commands(&mut self, commands: Vec<Command>) -> Result<(), BatchError> {
        let total = commands.len();
        let mut failures = Vec::new();
        for (index, command) in commands.into_iter().enumerate() {
            if let Err(e) = self.handle_command(command) {
                warn!("Command {} failed: {}", index, e);
                failures.push((index, e));
            }
        }
        Self::batch_result(total, failures)
    }

    /// Like `handle_commands`, for commands still in their JSON tuple form.
    /// Tuples that do not parse count as failures.
    pub fn handle_command_tuples(&mut self, tuples: &[Value]) -> Result<(), BatchError> {
        let mut failures = Vec::new();
        for (index, tuple) in tuples.iter().enumerate() {
            let result = Command::from_tuple(tuple).and_then(|command| self.handle_command(command));
            if let Err(e) = result {
                warn!("Command {} failed: {}", index, e);
                failures.push((index, e));
            }
        }
        Self::batch_result(tuples.len(), failures)
    }

    fn batch_result(total: usize, failures: Vec<(usize, WidgetError)>) -> Result<(), BatchError> {
        if failures.is_empty() {
            Ok(())
        } else {
            Err(BatchError { total, failures })
        }
    }

    fn create_widget(&mut self, widget_id: WidgetId, widget_type: WidgetType) -> WidgetResult<()> {
        if self.contains(widget_id) {
            return Err(WidgetError::WidgetExistsAlready(widget_id));
        }
        self.id_provider.observe(widget_id);
        let widget = widget_type.build(widget_id, &self.measure);
        debug!("Created {} widget {}", widget.kind(), widget_id);
        self.detached.insert(widget_id, widget);
        Ok(())
    }

    /// Takes a widget out of the detached pool for attaching somewhere.
    fn take_detached(&mut self, widget_id: WidgetId) -> WidgetResult<Box<dyn Widget>> {
        match self.detached.remove(&widget_id) {
            Some(widget) => Ok(widget),
            None if self.contains(widget_id) => Err(WidgetError::ChildAlreadyAttached(widget_id)),
            None => Err(WidgetError::UnknownWidgetReference(widget_id)),
        }
    }

    /// Puts a widget back into the detached pool, unmounting whatever part
    /// of it is still on the surface.
    fn return_to_pool(&mut self, mut widget: Box<dyn Widget>, parent: NodeId) {
        if let Err(e) = widget.unmount_from(&mut self.surface, parent) {
            warn!("Widget {} could not be unmounted: {}", widget.widget_id(), e);
        }
        self.detached.insert(widget.widget_id(), widget);
    }

    /// Forgets the observations of a widget and its whole subtree.
    fn drop_observations(&mut self, widget: &dyn Widget) {
        for widget_id in collect_widget_ids(widget) {
            self.observations.remove(&widget_id);
        }
    }

    fn add_child(&mut self, parent_widget_id: WidgetId, child_widget_id: WidgetId) -> WidgetResult<()> {
        locate_mut(&mut self.main_widget, &mut self.detached, parent_widget_id)?.accepts_child()?;

        let child = self.take_detached(child_widget_id)?;
        if find_widget(child.as_ref(), parent_widget_id).is_some() {
            self.detached.insert(child_widget_id, child);
            return Err(WidgetError::WouldCreateCycle {
                parent: parent_widget_id,
                child: child_widget_id,
            });
        }

        let added = match locate_mut(&mut self.main_widget, &mut self.detached, parent_widget_id) {
            Ok(parent) => parent.add_child(child, &mut self.surface),
            Err(error) => Err(ChildRejected { child, error }),
        };
        if let Err(rejected) = added {
            warn!(
                "Widget {} stays detached, adding it to widget {} failed: {}",
                child_widget_id, parent_widget_id, rejected.error
            );
            self.detached.insert(child_widget_id, rejected.child);
            return Err(rejected.error);
        }

        debug!("Added widget {} to widget {}", child_widget_id, parent_widget_id);
        self.relayout()
    }

    /// Takes a child out of its parent and either pools or destroys it.
    /// Returns whether there was such a child.
    fn take_child(
        &mut self,
        parent_widget_id: WidgetId,
        child_widget_id: WidgetId,
        destroy: bool,
    ) -> WidgetResult<bool> {
        let parent = locate_mut(&mut self.main_widget, &mut self.detached, parent_widget_id)?;
        let Some(child) = parent.remove_child(child_widget_id, &mut self.surface)? else {
            debug!(
                "Widget {} is not a child of widget {}, nothing to remove",
                child_widget_id, parent_widget_id
            );
            return Ok(false);
        };

        if destroy {
            self.drop_observations(child.as_ref());
            debug!("Removed and destroyed widget {}", child_widget_id);
        } else {
            debug!("Removed widget {} from widget {}", child_widget_id, parent_widget_id);
            self.detached.insert(child_widget_id, child);
        }
        Ok(true)
    }

    fn remove_child(
        &mut self,
        parent_widget_id: WidgetId,
        child_widget_id: WidgetId,
        destroy: bool,
    ) -> WidgetResult<()> {
        if !self.contains(child_widget_id) {
            return Err(WidgetError::UnknownWidgetReference(child_widget_id));
        }
        if self.take_child(parent_widget_id, child_widget_id, destroy)? {
            self.relayout()?;
        }
        Ok(())
    }

    /// Removes the children in order. On failure the children removed so far
    /// stay removed and the rest stay in place.
    fn remove_children(&mut self, parent_widget_id: WidgetId, destroy: bool) -> WidgetResult<()> {
        let child_ids: Vec<WidgetId> = self
            .widget(parent_widget_id)
            .ok_or(WidgetError::UnknownWidgetReference(parent_widget_id))?
            .children()
            .iter()
            .map(|child| child.widget_id())
            .collect();

        let mut result = Ok(());
        for child_id in child_ids {
            if let Err(e) = self.take_child(parent_widget_id, child_id, destroy) {
                result = Err(e);
                break;
            }
        }
        self.relayout()?;
        result
    }

    fn destroy(&mut self, widget_id: WidgetId) -> WidgetResult<()> {
        let is_main = self.main_widget.as_ref().map(|widget| widget.widget_id()) == Some(widget_id);

        let widget = if is_main {
            let root = self.surface.root();
            if let Some(main_widget) = self.main_widget.as_mut() {
                main_widget.unmount_from(&mut self.surface, root)?;
            }
            info!("Main widget {} destroyed, nothing is bound to the viewport", widget_id);
            self.main_widget.take()
        } else if let Some(widget) = self.detached.remove(&widget_id) {
            Some(widget)
        } else {
            let parent_id = self
                .main_widget
                .iter()
                .chain(self.detached.values())
                .find_map(|widget| find_parent_id(widget.as_ref(), widget_id))
                .ok_or(WidgetError::UnknownWidgetReference(widget_id))?;
            locate_mut(&mut self.main_widget, &mut self.detached, parent_id)?
                .remove_child(widget_id, &mut self.surface)?
        };

        let widget = widget.ok_or(WidgetError::UnknownWidgetReference(widget_id))?;
        self.drop_observations(widget.as_ref());
        debug!(
            "Destroyed widget {} ({} widgets in its subtree)",
            widget_id,
            collect_widget_ids(widget.as_ref()).len()
        );
        self.relayout()
    }

    /// The new main widget is mounted before the old one is unmounted, so a
    /// failure on either side leaves the previous main widget in charge.
    fn set_main_widget(&mut self, widget_id: WidgetId) -> WidgetResult<()> {
        if self.main_widget.as_ref().map(|widget| widget.widget_id()) == Some(widget_id) {
            return Ok(());
        }
        let mut widget = self.take_detached(widget_id)?;
        let root = self.surface.root();

        if let Err(e) = widget.mount_to(&mut self.surface, root) {
            self.return_to_pool(widget, root);
            return Err(e);
        }
        if let Some(previous) = self.main_widget.as_mut() {
            if let Err(e) = previous.unmount_from(&mut self.surface, root) {
                self.return_to_pool(widget, root);
                return Err(e);
            }
        }

        if let Some(previous) = self.main_widget.replace(widget) {
            info!("Widget {} is no longer the main widget", previous.widget_id());
            self.detached.insert(previous.widget_id(), previous);
        }
        info!("Widget {} is the main widget", widget_id);
        self.relayout()
    }

    fn add_event_observation(
        &mut self,
        widget_id: WidgetId,
        event_type: WidgetEventType,
        payload: Value,
    ) -> WidgetResult<()> {
        if !self.contains(widget_id) {
            return Err(WidgetError::UnknownWidgetReference(widget_id));
        }
        if self.event_handler.is_none() {
            return Err(WidgetError::MissingEventHandler(widget_id));
        }
        self.observations
            .entry(widget_id)
            .or_default()
            .push(EventObservation { event_type, payload });
        Ok(())
    }

    fn remove_event_observation(&mut self, widget_id: WidgetId, event_type: WidgetEventType) -> WidgetResult<()> {
        if !self.contains(widget_id) {
            return Err(WidgetError::UnknownWidgetReference(widget_id));
        }
        if let Some(observations) = self.observations.get_mut(&widget_id) {
            observations.retain(|observation| observation.event_type != event_type);
            if observations.is_empty() {
                self.observations.remove(&widget_id);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::{Cell, RefCell};
    use tessera_core::{HorizontalAlignment, NodeKind, SurfaceError, SurfaceResult, VerticalAlignment};
    use tessera_render::RetainedSurface;

    fn manager() -> WidgetManager<RetainedSurface> {
        WidgetManager::new(RetainedSurface::new())
    }

    /// A `RetainedSurface` whose attach and detach calls can be made to fail.
    #[derive(Default)]
    struct FlakySurface {
        inner: RetainedSurface,
        fail_attach: Rc<Cell<bool>>,
        fail_detach: Rc<Cell<bool>>,
    }

    impl HostSurface for FlakySurface {
        fn root(&self) -> NodeId {
            self.inner.root()
        }

        fn attach(&mut self, parent: NodeId, kind: NodeKind) -> SurfaceResult<NodeId> {
            if self.fail_attach.get() {
                return Err(SurfaceError::UnknownNode(parent));
            }
            self.inner.attach(parent, kind)
        }

        fn detach(&mut self, parent: NodeId, node: NodeId) -> SurfaceResult<()> {
            if self.fail_detach.get() {
                return Err(SurfaceError::NotAChild { parent, node });
            }
            self.inner.detach(parent, node)
        }

        fn set_text(&mut self, node: NodeId, text: &str) -> SurfaceResult<()> {
            self.inner.set_text(node, text)
        }

        fn place(&mut self, node: NodeId, rectangle: Rectangle) -> SurfaceResult<()> {
            self.inner.place(node, rectangle)
        }
    }

    fn add(parent_widget_id: WidgetId, child_widget_id: WidgetId) -> Command {
        Command::AddChild {
            parent_widget_id,
            child_widget_id,
        }
    }

    fn placeholder(width: f64, height: f64) -> WidgetType {
        WidgetType::Placeholder {
            desired_size: Size::new(width, height),
            flex_factor: 0,
        }
    }

    fn row() -> WidgetType {
        WidgetType::Row {
            spacing: 0.0,
            vertical_alignment: VerticalAlignment::Top,
        }
    }

    #[test]
    fn test_main_widget_fills_viewport() {
        let mut manager = manager();
        manager
            .handle_commands(vec![
                Command::CreateWidget(1, row()),
                Command::CreateWidget(2, placeholder(100.0, 50.0)),
                Command::AddChild {
                    parent_widget_id: 1,
                    child_widget_id: 2,
                },
                Command::SetMainWidget(1),
            ])
            .unwrap();
        manager.resize(Size::new(800.0, 600.0)).unwrap();

        assert_eq!(manager.rectangle(1), Some(Rectangle::new(0.0, 0.0, 800.0, 600.0)));
        assert_eq!(manager.rectangle(2), Some(Rectangle::new(0.0, 0.0, 100.0, 50.0)));
        assert!(manager.detached_widget_ids().is_empty());
    }

    #[test]
    fn test_geometry_reaches_surface() {
        let mut manager = manager();
        manager.handle_command(Command::CreateWidget(1, row())).unwrap();
        manager
            .handle_command(Command::CreateWidget(2, placeholder(40.0, 20.0)))
            .unwrap();
        manager.handle_command(Command::SetMainWidget(1)).unwrap();
        manager
            .handle_command(Command::AddChild {
                parent_widget_id: 1,
                child_widget_id: 2,
            })
            .unwrap();
        manager.resize(Size::new(200.0, 100.0)).unwrap();

        let node = manager.widget(2).and_then(|w| w.mounted_node()).unwrap();
        let surface_node = manager.surface().node(node).unwrap();
        assert_eq!(surface_node.size.x, 40.0);
        assert_eq!(surface_node.size.y, 20.0);
    }

    #[test]
    fn test_duplicate_and_unknown_ids() {
        let mut manager = manager();
        manager.handle_command(Command::CreateWidget(1, row())).unwrap();
        assert!(matches!(
            manager.handle_command(Command::CreateWidget(1, row())),
            Err(WidgetError::WidgetExistsAlready(1))
        ));
        assert!(matches!(
            manager.handle_command(Command::SetMainWidget(9)),
            Err(WidgetError::UnknownWidgetReference(9))
        ));
        assert!(matches!(
            manager.handle_command(Command::AddChild {
                parent_widget_id: 1,
                child_widget_id: 9
            }),
            Err(WidgetError::UnknownWidgetReference(9))
        ));
        assert_eq!(manager.next_widget_id(), 2);
    }

    #[test]
    fn test_child_cannot_have_two_parents() {
        let mut manager = manager();
        manager
            .handle_commands(vec![
                Command::CreateWidget(1, row()),
                Command::CreateWidget(2, row()),
                Command::CreateWidget(3, placeholder(10.0, 10.0)),
                Command::AddChild {
                    parent_widget_id: 1,
                    child_widget_id: 3,
                },
            ])
            .unwrap();
        assert!(matches!(
            manager.handle_command(Command::AddChild {
                parent_widget_id: 2,
                child_widget_id: 3
            }),
            Err(WidgetError::ChildAlreadyAttached(3))
        ));
    }

    #[test]
    fn test_cycles_are_rejected() {
        let mut manager = manager();
        manager
            .handle_commands(vec![
                Command::CreateWidget(1, row()),
                Command::CreateWidget(2, row()),
                Command::AddChild {
                    parent_widget_id: 1,
                    child_widget_id: 2,
                },
            ])
            .unwrap();
        assert!(matches!(
            manager.handle_command(Command::AddChild {
                parent_widget_id: 2,
                child_widget_id: 1
            }),
            Err(WidgetError::WouldCreateCycle { parent: 2, child: 1 })
        ));
        assert_eq!(manager.detached_widget_ids(), vec![1]);
    }

    #[test]
    fn test_remove_child_returns_it_to_the_pool() {
        let mut manager = manager();
        manager
            .handle_commands(vec![
                Command::CreateWidget(1, row()),
                Command::CreateWidget(2, placeholder(10.0, 10.0)),
                Command::AddChild {
                    parent_widget_id: 1,
                    child_widget_id: 2,
                },
                Command::SetMainWidget(1),
                Command::RemoveChild {
                    parent_widget_id: 1,
                    child_widget_id: 2,
                    destroy_child_widget: false,
                },
            ])
            .unwrap();
        assert_eq!(manager.detached_widget_ids(), vec![2]);
        assert!(manager.widget(1).unwrap().children().is_empty());
        assert_eq!(manager.widget(2).and_then(|w| w.mounted_node()), None);
        assert_eq!(manager.surface().node_count(), 2);
    }

    #[test]
    fn test_replacing_main_widget() {
        let mut manager = manager();
        manager
            .handle_commands(vec![
                Command::CreateWidget(1, row()),
                Command::CreateWidget(2, row()),
                Command::SetMainWidget(1),
                Command::SetMainWidget(2),
            ])
            .unwrap();
        assert_eq!(manager.main_widget().map(|w| w.widget_id()), Some(2));
        assert_eq!(manager.detached_widget_ids(), vec![1]);
        assert_eq!(manager.surface().node_count(), 2);
    }

    #[test]
    fn test_set_value_relayouts() {
        let mut manager = manager();
        manager
            .handle_commands(vec![
                Command::CreateWidget(1, row()),
                Command::CreateWidget(2, WidgetType::Text("Hi".to_string())),
                Command::AddChild {
                    parent_widget_id: 1,
                    child_widget_id: 2,
                },
                Command::SetMainWidget(1),
            ])
            .unwrap();
        manager.resize(Size::new(400.0, 100.0)).unwrap();
        assert_eq!(manager.rectangle(2).unwrap().width(), 16.0);

        manager
            .handle_command(Command::SetValue(2, "Hello".to_string()))
            .unwrap();
        assert_eq!(manager.rectangle(2).unwrap().width(), 40.0);
        assert_eq!(manager.value(2).as_deref(), Some("Hello"));

        assert!(matches!(
            manager.handle_command(Command::SetValue(1, "x".to_string())),
            Err(WidgetError::ValueNotSupported(1))
        ));
    }

    #[test]
    fn test_observation_needs_handler() {
        let mut manager = manager();
        manager.handle_command(Command::CreateWidget(1, row())).unwrap();
        let observe = Command::AddEventObservation(1, WidgetEventType::Clicked, json!("tap"));
        assert!(matches!(
            manager.handle_command(observe.clone()),
            Err(WidgetError::MissingEventHandler(1))
        ));

        let received = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&received);
        manager.handle_events(move |widget_id, payload| sink.borrow_mut().push((widget_id, payload.clone())));
        manager.handle_command(observe).unwrap();

        assert_eq!(manager.notify(1, WidgetEventType::Clicked).unwrap(), 1);
        assert_eq!(manager.notify(1, WidgetEventType::LostFocus).unwrap(), 0);
        assert_eq!(*received.borrow(), vec![(1, json!("tap"))]);
        assert!(manager.notify(5, WidgetEventType::Clicked).is_err());
    }

    #[test]
    fn test_batch_continues_after_failures() {
        let mut manager = manager();
        let error = manager
            .handle_command_tuples(&[
                json!(["Command::CreateWidget", 1, "WidgetType::Row"]),
                json!(["Command::CreateWidget", 2, "WidgetType::TextButton", "OK"]),
                json!(["Command::Frobnicate"]),
                json!(["Command::SetMainWidget", 1]),
            ])
            .unwrap_err();

        assert_eq!(error.total, 4);
        assert_eq!(error.failures.len(), 2);
        assert!(matches!(error.failures[0], (1, WidgetError::UnsupportedWidgetType(_))));
        assert!(matches!(error.failures[1], (2, WidgetError::UnsupportedCommand(_))));
        assert_eq!(error.to_string(), "2 of 4 commands failed");
        assert_eq!(manager.main_widget().map(|w| w.widget_id()), Some(1));
    }

    #[test]
    fn test_resize_rejects_negative_viewport() {
        let mut manager = manager();
        assert!(matches!(
            manager.resize(Size::new(-1.0, 10.0)),
            Err(WidgetError::InvalidConstraint { .. })
        ));
    }

    #[test]
    fn test_failed_attach_keeps_child_in_pool() {
        let surface = FlakySurface::default();
        let fail_attach = Rc::clone(&surface.fail_attach);
        let mut manager = WidgetManager::new(surface);
        manager
            .handle_commands(vec![
                Command::CreateWidget(1, row()),
                Command::CreateWidget(2, placeholder(10.0, 10.0)),
                Command::SetMainWidget(1),
            ])
            .unwrap();

        fail_attach.set(true);
        assert!(matches!(manager.handle_command(add(1, 2)), Err(WidgetError::Surface(_))));
        assert_eq!(manager.detached_widget_ids(), vec![2]);
        assert!(manager.widget(1).unwrap().children().is_empty());

        fail_attach.set(false);
        manager.handle_command(add(1, 2)).unwrap();
        assert!(manager.detached_widget_ids().is_empty());
        assert_eq!(manager.surface().inner.node_count(), 3);
    }

    #[test]
    fn test_failed_detach_keeps_child_in_parent() {
        let surface = FlakySurface::default();
        let fail_detach = Rc::clone(&surface.fail_detach);
        let mut manager = WidgetManager::new(surface);
        manager
            .handle_commands(vec![
                Command::CreateWidget(1, row()),
                Command::CreateWidget(2, placeholder(10.0, 10.0)),
                add(1, 2),
                Command::SetMainWidget(1),
            ])
            .unwrap();
        let remove = Command::RemoveChild {
            parent_widget_id: 1,
            child_widget_id: 2,
            destroy_child_widget: false,
        };

        fail_detach.set(true);
        assert!(manager.handle_command(remove.clone()).is_err());
        assert_eq!(manager.widget(1).unwrap().children().len(), 1);
        assert!(manager.detached_widget_ids().is_empty());

        fail_detach.set(false);
        manager.handle_command(remove).unwrap();
        assert_eq!(manager.detached_widget_ids(), vec![2]);
    }

    #[test]
    fn test_failed_main_widget_switch_keeps_previous() {
        let surface = FlakySurface::default();
        let fail_attach = Rc::clone(&surface.fail_attach);
        let fail_detach = Rc::clone(&surface.fail_detach);
        let mut manager = WidgetManager::new(surface);
        manager
            .handle_commands(vec![
                Command::CreateWidget(1, row()),
                Command::CreateWidget(2, row()),
                Command::SetMainWidget(1),
            ])
            .unwrap();

        fail_attach.set(true);
        assert!(manager.handle_command(Command::SetMainWidget(2)).is_err());
        fail_attach.set(false);
        fail_detach.set(true);
        assert!(manager.handle_command(Command::SetMainWidget(2)).is_err());

        assert_eq!(manager.main_widget().map(|w| w.widget_id()), Some(1));
        assert_eq!(manager.detached_widget_ids(), vec![2]);

        fail_detach.set(false);
        manager.handle_command(Command::SetMainWidget(2)).unwrap();
        assert_eq!(manager.detached_widget_ids(), vec![1]);
        assert_eq!(manager.surface().inner.node_count(), 2);
    }

    fn nested_tree(manager: &mut WidgetManager<RetainedSurface>) {
        manager.handle_events(|_, _| {});
        manager
            .handle_commands(vec![
                Command::CreateWidget(1, row()),
                Command::CreateWidget(2, row()),
                Command::CreateWidget(3, placeholder(10.0, 10.0)),
                Command::CreateWidget(4, placeholder(20.0, 10.0)),
                add(2, 3),
                add(1, 2),
                add(1, 4),
                Command::SetMainWidget(1),
                Command::AddEventObservation(3, WidgetEventType::Clicked, json!("three")),
                Command::AddEventObservation(4, WidgetEventType::Clicked, json!("four")),
            ])
            .unwrap();
        manager.resize(Size::new(200.0, 100.0)).unwrap();
    }

    #[test]
    fn test_destroy_drops_subtree_and_observations() {
        let mut manager = manager();
        nested_tree(&mut manager);

        manager.handle_command(Command::Destroy(2)).unwrap();

        assert!(manager.widget(2).is_none());
        assert!(manager.widget(3).is_none());
        assert!(!manager.observations.contains_key(&3));
        assert!(manager.observations.contains_key(&4));
        assert_eq!(manager.rectangle(4).map(|r| r.x0), Some(0.0));
        assert_eq!(manager.surface().node_count(), 3);
        assert!(matches!(
            manager.handle_command(Command::Destroy(2)),
            Err(WidgetError::UnknownWidgetReference(2))
        ));
    }

    #[test]
    fn test_destroy_main_and_detached_widgets() {
        let mut manager = manager();
        nested_tree(&mut manager);
        manager
            .handle_command(Command::CreateWidget(9, placeholder(1.0, 1.0)))
            .unwrap();

        manager.handle_command(Command::Destroy(9)).unwrap();
        manager.handle_command(Command::Destroy(1)).unwrap();

        assert!(manager.main_widget().is_none());
        assert!(manager.detached_widget_ids().is_empty());
        assert!(manager.observations.is_empty());
        assert_eq!(manager.surface().node_count(), 1);
        manager.handle_command(Command::CreateWidget(3, row())).unwrap();
    }

    #[test]
    fn test_remove_children_detaches_or_destroys() {
        let mut manager = manager();
        nested_tree(&mut manager);

        manager
            .handle_command(Command::RemoveChildren {
                parent_widget_id: 1,
                destroy_child_widgets: false,
            })
            .unwrap();
        assert_eq!(manager.detached_widget_ids(), vec![2, 4]);
        assert_eq!(manager.surface().node_count(), 2);

        manager
            .handle_command(Command::RemoveChildren {
                parent_widget_id: 2,
                destroy_child_widgets: true,
            })
            .unwrap();
        assert!(manager.widget(3).is_none());
        assert!(!manager.observations.contains_key(&3));
        assert!(manager.widget(2).unwrap().children().is_empty());
    }

    #[test]
    fn test_remove_child_can_destroy() {
        let mut manager = manager();
        nested_tree(&mut manager);

        manager
            .handle_command(Command::RemoveChild {
                parent_widget_id: 1,
                child_widget_id: 4,
                destroy_child_widget: true,
            })
            .unwrap();

        assert!(manager.widget(4).is_none());
        assert!(manager.detached_widget_ids().is_empty());
        assert!(!manager.observations.contains_key(&4));
    }

    #[test]
    fn test_remove_event_observation() {
        let mut manager = manager();
        nested_tree(&mut manager);
        manager
            .handle_command(Command::AddEventObservation(4, WidgetEventType::LostFocus, json!("blur")))
            .unwrap();

        manager
            .handle_command(Command::RemoveEventObservation(4, WidgetEventType::Clicked))
            .unwrap();

        assert_eq!(manager.notify(4, WidgetEventType::Clicked).unwrap(), 0);
        assert_eq!(manager.notify(4, WidgetEventType::LostFocus).unwrap(), 1);
        assert!(matches!(
            manager.handle_command(Command::RemoveEventObservation(77, WidgetEventType::Clicked)),
            Err(WidgetError::UnknownWidgetReference(77))
        ));
    }

    #[test]
    fn test_alignment_commands_move_children() {
        let mut manager = manager();
        manager
            .handle_commands(vec![
                Command::CreateWidget(1, row()),
                Command::CreateWidget(2, placeholder(10.0, 20.0)),
                add(1, 2),
                Command::SetMainWidget(1),
            ])
            .unwrap();
        manager.resize(Size::new(100.0, 100.0)).unwrap();
        assert_eq!(manager.rectangle(2).map(|r| r.y0), Some(0.0));

        manager
            .handle_command(Command::SetVerticalAlignment(1, VerticalAlignment::Bottom))
            .unwrap();
        assert_eq!(manager.rectangle(2).map(|r| r.y0), Some(80.0));

        assert!(matches!(
            manager.handle_command(Command::SetHorizontalAlignment(1, HorizontalAlignment::Left)),
            Err(WidgetError::AlignmentNotSupported(1))
        ));
    }

    #[test]
    fn test_main_row_centres_children_in_viewport() {
        let mut manager = manager();
        manager
            .handle_commands(vec![
                Command::CreateWidget(
                    1,
                    WidgetType::Row {
                        spacing: 0.0,
                        vertical_alignment: VerticalAlignment::Middle,
                    },
                ),
                Command::CreateWidget(2, placeholder(40.0, 20.0)),
                add(1, 2),
                Command::SetMainWidget(1),
            ])
            .unwrap();
        manager.resize(Size::new(300.0, 200.0)).unwrap();

        // The tight viewport floors the row at full height before alignment
        assert_eq!(manager.rectangle(1).map(|r| r.size()), Some(Size::new(300.0, 200.0)));
        assert_eq!(manager.rectangle(2), Some(Rectangle::new(0.0, 90.0, 40.0, 110.0)));
    }

    #[test]
    fn test_padding_and_center_through_commands() {
        let mut manager = manager();
        manager
            .handle_command_tuples(&[
                json!(["Command::CreateWidget", 1, "WidgetType::Padding", {"padding": 10}]),
                json!(["Command::CreateWidget", 2, "WidgetType::Center"]),
                json!(["Command::CreateWidget", 3, "WidgetType::SizedBox", {"width": 50, "height": 30}]),
                json!(["Command::AddChild", {"parent_widget_id": 2, "child_widget_id": 3}]),
                json!(["Command::AddChild", {"parent_widget_id": 1, "child_widget_id": 2}]),
                json!(["Command::SetMainWidget", 1]),
            ])
            .unwrap();
        manager.resize(Size::new(220.0, 130.0)).unwrap();

        assert_eq!(manager.rectangle(2), Some(Rectangle::new(10.0, 10.0, 210.0, 120.0)));
        assert_eq!(manager.rectangle(3), Some(Rectangle::new(85.0, 50.0, 135.0, 80.0)));
    }
}
