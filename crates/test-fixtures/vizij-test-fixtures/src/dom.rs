//! In-memory document implementing [`Host`] on a virtual clock.
//!
//! Styles come from [`StyleSheetFixture`]s: a rule matches an element when the
//! element carries every class of the rule's dotted selector, and later rules
//! win. Whenever an element's computed `animation-name` gains a name backed by
//! a keyframes rule (in any sheet, readable or not), the document schedules
//! `animationstart` after the element's delay and `animationend` after its
//! duration. Dropping the name before those fire cancels them. Nothing runs
//! until the clock is advanced with [`FakeDocument::run_next_due`].

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use vizij_css_animator_core::keyframes::parse_animation_names;
use vizij_css_animator_core::resolver::parse_time_ms;
use vizij_css_animator_core::{
    AnimationEvent, AnimationEventKind, AnimationHandler, Host, HostError, ListenerId, TimerId,
};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleSheetFixture {
    /// Rules apply, but enumerating the sheet's rules fails.
    #[serde(default)]
    pub cross_origin: bool,
    #[serde(default)]
    pub keyframes: Vec<String>,
    #[serde(default)]
    pub rules: Vec<StyleRule>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleRule {
    /// Dotted class list, e.g. `animated-item.au-enter-active`.
    pub selector: String,
    #[serde(default)]
    pub animation_name: Option<String>,
    #[serde(default)]
    pub animation_delay: Option<String>,
    #[serde(default)]
    pub animation_duration: Option<String>,
}

impl StyleRule {
    fn matches(&self, classes: &[String]) -> bool {
        self.selector
            .split('.')
            .filter(|c| !c.is_empty())
            .all(|c| classes.iter().any(|have| have == c))
    }

    fn value(&self, property: &str) -> Option<&str> {
        match property {
            "animation-name" => self.animation_name.as_deref(),
            "animation-delay" => self.animation_delay.as_deref(),
            "animation-duration" => self.animation_duration.as_deref(),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// A lifecycle event dispatched on the document.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedEvent {
    pub name: String,
    pub detail: Option<NodeId>,
    pub at_ms: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClassMutation {
    pub node: NodeId,
    pub class: String,
    pub added: bool,
    pub at_ms: f64,
}

struct Node {
    element: bool,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    parent: Option<NodeId>,
    /// Cleared to model elements that never render (e.g. `display: none`).
    playback: bool,
}

struct Listener {
    id: ListenerId,
    node: NodeId,
    event: String,
    handler: AnimationHandler<NodeId>,
}

enum TaskKind {
    Timer(Box<dyn FnOnce()>),
    Animation {
        node: NodeId,
        name: String,
        kind: AnimationEventKind,
        generation: u64,
    },
}

struct Task {
    due: f64,
    seq: u64,
    timer: Option<TimerId>,
    kind: TaskKind,
}

#[derive(Clone)]
struct Applied {
    name: String,
    generation: u64,
}

#[derive(Default)]
struct State {
    nodes: Vec<Node>,
    sheets: Vec<StyleSheetFixture>,
    now_ms: f64,
    tasks: Vec<Task>,
    next_seq: u64,
    next_listener: u64,
    next_timer: u64,
    next_generation: u64,
    listeners: Vec<Listener>,
    events: Vec<RecordedEvent>,
    mutations: Vec<ClassMutation>,
    applied: HashMap<NodeId, Vec<Applied>>,
    finished: Vec<(NodeId, String, f64)>,
}

impl State {
    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    fn computed(&self, id: NodeId, property: &str) -> Option<String> {
        let classes = &self.node(id).classes;
        let mut value = None;
        for sheet in &self.sheets {
            for rule in &sheet.rules {
                if let Some(v) = rule.value(property) {
                    if rule.matches(classes) {
                        value = Some(v.to_string());
                    }
                }
            }
        }
        value
    }

    fn keyframes_defined(&self, name: &str) -> bool {
        self.sheets
            .iter()
            .any(|s| s.keyframes.iter().any(|k| k == name))
    }

    fn push_task(&mut self, due: f64, timer: Option<TimerId>, kind: TaskKind) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.tasks.push(Task {
            due,
            seq,
            timer,
            kind,
        });
    }

    fn is_current(&self, node: NodeId, name: &str, generation: u64) -> bool {
        self.applied
            .get(&node)
            .is_some_and(|list| list.iter().any(|a| a.name == name && a.generation == generation))
    }

    /// Start animations for newly applied names; forget dropped ones.
    fn refresh_playback(&mut self, id: NodeId) {
        if !self.node(id).element {
            return;
        }
        let names = parse_animation_names(&self.computed(id, "animation-name").unwrap_or_default());
        let previous = self.applied.remove(&id).unwrap_or_default();
        let delay = parse_time_ms(&self.computed(id, "animation-delay").unwrap_or_default());
        let duration = parse_time_ms(&self.computed(id, "animation-duration").unwrap_or_default());

        let mut next = Vec::new();
        for name in names {
            if let Some(running) = previous.iter().find(|a| a.name == name) {
                next.push(running.clone());
                continue;
            }
            let generation = self.next_generation;
            self.next_generation += 1;
            if self.node(id).playback && self.keyframes_defined(&name) {
                let start = self.now_ms + delay;
                for (due, kind) in [
                    (start, AnimationEventKind::Start),
                    (start + duration, AnimationEventKind::End),
                ] {
                    self.push_task(
                        due,
                        None,
                        TaskKind::Animation {
                            node: id,
                            name: name.clone(),
                            kind,
                            generation,
                        },
                    );
                }
            }
            next.push(Applied { name, generation });
        }
        self.applied.insert(id, next);
    }

    fn record_mutation(&mut self, node: NodeId, class: &str, added: bool) {
        let at_ms = self.now_ms;
        self.mutations.push(ClassMutation {
            node,
            class: class.to_string(),
            added,
            at_ms,
        });
    }
}

/// See the module docs.
pub struct FakeDocument {
    state: RefCell<State>,
}

impl FakeDocument {
    pub fn new(sheets: Vec<StyleSheetFixture>) -> Rc<Self> {
        Rc::new(Self {
            state: RefCell::new(State {
                sheets,
                ..State::default()
            }),
        })
    }

    /// Document styled by the named fixtures from `fixtures/manifest.json`.
    pub fn from_fixtures(names: &[&str]) -> Result<Rc<Self>> {
        let sheets = names
            .iter()
            .map(|name| crate::stylesheets::load::<StyleSheetFixture>(name))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(sheets))
    }

    pub fn create_element(&self, parent: Option<NodeId>, classes: &[&str]) -> NodeId {
        let mut st = self.state.borrow_mut();
        let id = NodeId(st.nodes.len());
        st.nodes.push(Node {
            element: true,
            classes: classes.iter().map(|c| c.to_string()).collect(),
            attributes: BTreeMap::new(),
            parent,
            playback: true,
        });
        st.refresh_playback(id);
        id
    }

    pub fn create_text(&self, parent: Option<NodeId>) -> NodeId {
        let mut st = self.state.borrow_mut();
        let id = NodeId(st.nodes.len());
        st.nodes.push(Node {
            element: false,
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            parent,
            playback: false,
        });
        id
    }

    /// Keep CSS animations on `node` from ever running.
    pub fn suppress_playback(&self, node: NodeId) {
        self.state.borrow_mut().nodes[node.0].playback = false;
    }

    pub fn add_sheet(&self, sheet: StyleSheetFixture) {
        self.state.borrow_mut().sheets.push(sheet);
    }

    pub fn now(&self) -> f64 {
        self.state.borrow().now_ms
    }

    pub fn set_now(&self, now_ms: f64) {
        let mut st = self.state.borrow_mut();
        if now_ms > st.now_ms {
            st.now_ms = now_ms;
        }
    }

    pub fn classes(&self, node: NodeId) -> Vec<String> {
        self.state.borrow().node(node).classes.clone()
    }

    pub fn has(&self, node: NodeId, class: &str) -> bool {
        self.state.borrow().node(node).classes.iter().any(|c| c == class)
    }

    pub fn attr(&self, node: NodeId, name: &str) -> Option<String> {
        self.state.borrow().node(node).attributes.get(name).cloned()
    }

    pub fn events(&self) -> Vec<RecordedEvent> {
        self.state.borrow().events.clone()
    }

    pub fn events_named(&self, name: &str) -> Vec<RecordedEvent> {
        self.state
            .borrow()
            .events
            .iter()
            .filter(|e| e.name == name)
            .cloned()
            .collect()
    }

    /// Time of the first `name` event whose detail is `node`.
    pub fn event_time(&self, name: &str, node: NodeId) -> Option<f64> {
        self.state
            .borrow()
            .events
            .iter()
            .find(|e| e.name == name && e.detail == Some(node))
            .map(|e| e.at_ms)
    }

    pub fn mutations(&self) -> Vec<ClassMutation> {
        self.state.borrow().mutations.clone()
    }

    /// Times at which `class` was added to `node`.
    pub fn class_added_at(&self, node: NodeId, class: &str) -> Vec<f64> {
        self.state
            .borrow()
            .mutations
            .iter()
            .filter(|m| m.node == node && m.added && m.class == class)
            .map(|m| m.at_ms)
            .collect()
    }

    /// Animations on `node` that reached `animationend`.
    pub fn finished_animations(&self, node: NodeId) -> Vec<String> {
        self.state
            .borrow()
            .finished
            .iter()
            .filter(|(n, _, _)| *n == node)
            .map(|(_, name, _)| name.clone())
            .collect()
    }

    pub fn listener_count(&self) -> usize {
        self.state.borrow().listeners.len()
    }

    pub fn pending_timers(&self) -> usize {
        self.state
            .borrow()
            .tasks
            .iter()
            .filter(|t| t.timer.is_some())
            .count()
    }

    /// Dispatch a native animation event at `target`, bubbling to ancestors
    /// until a listener stops propagation.
    pub fn dispatch_animation_event(&self, target: NodeId, event_name: &str, animation_name: &str) {
        let event = AnimationEvent::new(target, animation_name);
        let mut current = Some(target);
        while let Some(node) = current {
            let handlers: Vec<(ListenerId, AnimationHandler<NodeId>)> = self
                .state
                .borrow()
                .listeners
                .iter()
                .filter(|l| l.node == node && l.event == event_name)
                .map(|l| (l.id, l.handler.clone()))
                .collect();
            for (id, handler) in handlers {
                let bound = self.state.borrow().listeners.iter().any(|l| l.id == id);
                if bound {
                    handler(&event);
                }
            }
            if event.propagation_stopped() {
                break;
            }
            current = self.state.borrow().node(node).parent;
        }
    }

    pub fn fire_animation_start(&self, target: NodeId, animation_name: &str) {
        self.dispatch_animation_event(
            target,
            AnimationEventKind::Start.standard_name(),
            animation_name,
        );
    }

    pub fn fire_animation_end(&self, target: NodeId, animation_name: &str) {
        self.dispatch_animation_event(target, AnimationEventKind::End.standard_name(), animation_name);
    }

    /// Run the earliest task due at or before `until_ms`, moving the clock to
    /// its due time. Returns false when nothing is due.
    pub fn run_next_due(&self, until_ms: f64) -> bool {
        let task = {
            let mut st = self.state.borrow_mut();
            let next = st
                .tasks
                .iter()
                .enumerate()
                .filter(|(_, t)| t.due <= until_ms)
                .min_by(|(_, a), (_, b)| a.due.total_cmp(&b.due).then(a.seq.cmp(&b.seq)))
                .map(|(i, _)| i);
            let Some(index) = next else {
                return false;
            };
            let task = st.tasks.remove(index);
            if task.due > st.now_ms {
                st.now_ms = task.due;
            }
            task
        };

        match task.kind {
            TaskKind::Timer(callback) => callback(),
            TaskKind::Animation {
                node,
                name,
                kind,
                generation,
            } => {
                let current = self.state.borrow().is_current(node, &name, generation);
                if current {
                    if kind == AnimationEventKind::End {
                        let mut st = self.state.borrow_mut();
                        let at = st.now_ms;
                        st.finished.push((node, name.clone(), at));
                    }
                    self.dispatch_animation_event(node, kind.standard_name(), &name);
                }
            }
        }
        true
    }
}

impl Host for FakeDocument {
    type Element = NodeId;

    fn is_element(&self, node: &NodeId) -> bool {
        self.state.borrow().node(*node).element
    }

    fn has_class(&self, element: &NodeId, class: &str) -> bool {
        self.has(*element, class)
    }

    fn add_class(&self, element: &NodeId, class: &str) {
        let mut st = self.state.borrow_mut();
        if st.node(*element).classes.iter().any(|c| c == class) {
            return;
        }
        st.nodes[element.0].classes.push(class.to_string());
        st.record_mutation(*element, class, true);
        st.refresh_playback(*element);
    }

    fn remove_class(&self, element: &NodeId, class: &str) {
        let mut st = self.state.borrow_mut();
        let before = st.node(*element).classes.len();
        st.nodes[element.0].classes.retain(|c| c != class);
        if st.node(*element).classes.len() != before {
            st.record_mutation(*element, class, false);
            st.refresh_playback(*element);
        }
    }

    fn parent_element(&self, element: &NodeId) -> Option<NodeId> {
        let st = self.state.borrow();
        st.node(*element)
            .parent
            .filter(|p| st.node(*p).element)
    }

    fn attribute(&self, element: &NodeId, name: &str) -> Option<String> {
        self.attr(*element, name)
    }

    fn set_attribute(&self, element: &NodeId, name: &str, value: &str) {
        self.state.borrow_mut().nodes[element.0]
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    fn computed_style(&self, element: &NodeId, property: &str) -> String {
        let default = match property {
            "animation-name" => "none",
            "animation-delay" | "animation-duration" => "0s",
            // vendor-prefixed and unrelated properties are unknown here
            _ => return String::new(),
        };
        self.state
            .borrow()
            .computed(*element, property)
            .unwrap_or_else(|| default.to_string())
    }

    fn style_sheet_count(&self) -> usize {
        self.state.borrow().sheets.len()
    }

    fn keyframes_names(&self, sheet: usize) -> Result<Vec<String>, HostError> {
        let st = self.state.borrow();
        match st.sheets.get(sheet) {
            Some(s) if s.cross_origin => Err(HostError::StylesheetAccessDenied { sheet }),
            Some(s) => Ok(s.keyframes.clone()),
            None => Ok(Vec::new()),
        }
    }

    fn add_animation_listener(
        &self,
        element: &NodeId,
        event_name: &str,
        handler: AnimationHandler<NodeId>,
    ) -> ListenerId {
        let mut st = self.state.borrow_mut();
        let id = ListenerId(st.next_listener);
        st.next_listener += 1;
        st.listeners.push(Listener {
            id,
            node: *element,
            event: event_name.to_string(),
            handler,
        });
        id
    }

    fn remove_animation_listener(&self, id: ListenerId) {
        let removed: Vec<Listener> = {
            let mut st = self.state.borrow_mut();
            let (gone, kept) = std::mem::take(&mut st.listeners)
                .into_iter()
                .partition(|l| l.id == id);
            st.listeners = kept;
            gone
        };
        // handlers may own the last reference to operation state
        drop(removed);
    }

    fn dispatch_custom_event(&self, name: &str, detail: Option<&NodeId>) {
        let mut st = self.state.borrow_mut();
        let at_ms = st.now_ms;
        st.events.push(RecordedEvent {
            name: name.to_string(),
            detail: detail.copied(),
            at_ms,
        });
    }

    fn set_timeout(&self, delay_ms: f64, callback: Box<dyn FnOnce()>) -> TimerId {
        let mut st = self.state.borrow_mut();
        let id = TimerId(st.next_timer);
        st.next_timer += 1;
        let due = st.now_ms + delay_ms.max(0.0);
        st.push_task(due, Some(id), TaskKind::Timer(callback));
        id
    }

    fn clear_timeout(&self, id: TimerId) {
        let removed: Vec<Task> = {
            let mut st = self.state.borrow_mut();
            let (gone, kept) = std::mem::take(&mut st.tasks)
                .into_iter()
                .partition(|t| t.timer == Some(id));
            st.tasks = kept;
            gone
        };
        drop(removed);
    }
}
