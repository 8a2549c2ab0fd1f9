// SPDX-License-Identifier: MIT OR Apache-2.0
//! The tick-driven graph interpreter.
//!
//! Execution is dual-edged: `Exec` edges are pushed eagerly depth-first
//! (fan-out in declaration order), data edges are pulled lazily when an
//! executing node resolves its inputs. Nodes without `Exec` inputs are
//! evaluated on demand during resolution and memoized for that pass;
//! everything else publishes outputs only when an `Exec` edge reaches it.
//!
//! One tick is: apply pending save/load requests, poll the session,
//! advance timers and waits, fire `OnTick`, then drain queued signals in
//! FIFO order. Events fire in the active graph only, in node declaration
//! order. All randomness flows through the engine's single seeded RNG
//! stream, so a given project, seed and event sequence replays exactly.

use crate::events::{InputEvent, Signal};
use crate::handlers::{self, HandlerCtx, Inputs};
use crate::result::{EntitySnapshot, ExecutionResult};
use crate::save::SaveGame;
use crate::session::{NullSession, SessionLink};
use crate::state::{EngineState, PendingOp, PendingWait};
use crate::value::Value;
use crate::world::World;
use glyphplay_graph::{
    EventKind, Graph, GraphId, Node, NodeId, NodeKind, PortId, Project, ValidationError,
};
use std::collections::{HashMap, HashSet};

/// Exec recursion limit, counting loop bodies and graph calls
const MAX_EXEC_DEPTH: u32 = 512;
/// Nested `CallGraph`/`RunCustomProcgen` limit
const MAX_CALL_DEPTH: u32 = 32;
/// `WhileLoop` iteration cap
const MAX_WHILE_ITERATIONS: i64 = 65_536;
/// Signals processed per tick before the rest are deferred
const MAX_SIGNALS_PER_TICK: usize = 1_024;

/// A running instance of a project.
pub struct Engine {
    project: Project,
    session: Box<dyn SessionLink>,
    state: EngineState,
}

impl Engine {
    /// Create an engine for a validated project. The seed fixes the RNG
    /// stream for the whole run.
    pub fn new(project: Project, seed: u64) -> Result<Self, ValidationError> {
        project.validate()?;
        // validate() guarantees the start graph exists
        let start = project.start_graph.ok_or(ValidationError::NoStartGraph)?;
        Ok(Self {
            project,
            session: Box::new(NullSession),
            state: EngineState::new(seed, start),
        })
    }

    /// Attach a session link for multiplayer nodes
    pub fn with_session(mut self, session: Box<dyn SessionLink>) -> Self {
        self.session = session;
        self
    }

    /// The project this engine runs
    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Run the start graph's entry traversal. Called once, before the
    /// first tick.
    pub fn start(&mut self) -> ExecutionResult {
        self.state.outputs.clear();
        self.state.map_touched = false;
        let graph_id = self.state.active_graph;
        if let Some(entry) = self
            .project
            .graph(graph_id)
            .and_then(|g| g.entry_node().ok())
        {
            let mut ctx = Ctx {
                project: &self.project,
                state: &mut self.state,
                session: self.session.as_mut(),
            };
            exec_node(&mut ctx, graph_id, entry, None, 0);
        }
        self.switch_graph_if_requested();
        self.build_result()
    }

    /// Inject a host event; it fires on the next tick
    pub fn inject(&mut self, event: InputEvent) {
        let signal = match event {
            InputEvent::KeyPress(key) => Signal::Key(key),
            InputEvent::EntityEnterTile { entity, x, y } => Signal::EnterTile(entity, x, y),
        };
        self.state.queued.push_back(signal);
    }

    /// Answer the most recent `ShowChoice`/`DialogueChoice` prompt.
    /// The answer is read by `Choice` outputs resolved afterwards.
    pub fn choose(&mut self, choice: i64) {
        self.state.dialogue.last_choice = choice;
    }

    /// Advance the engine by one tick
    pub fn tick(&mut self) -> ExecutionResult {
        self.state.tick += 1;
        self.state.outputs.clear();
        self.state.map_touched = false;

        self.apply_pending_ops();

        for message in self.session.poll() {
            self.state.queued.push_back(Signal::Message(message));
        }

        self.advance_timers();
        self.resume_waits();
        self.fire_on_tick();
        self.drain_signals();

        self.switch_graph_if_requested();
        self.build_result()
    }

    /// The serialized contents of a save slot, if present. The host
    /// persists these to disk between runs.
    pub fn slot_text(&self, slot: &str) -> Option<&str> {
        self.state.slots.get(slot).map(String::as_str)
    }

    /// Preload a save slot, typically read back from disk
    pub fn set_slot_text(&mut self, slot: impl Into<String>, text: impl Into<String>) {
        self.state.slots.insert(slot.into(), text.into());
    }

    /// Current status line, if a script set one
    pub fn status_line(&self) -> Option<&str> {
        self.state.status_line.as_deref()
    }

    /// Read a script variable
    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.state.variables.get(name)
    }

    fn apply_pending_ops(&mut self) {
        for op in std::mem::take(&mut self.state.pending_ops) {
            match op {
                PendingOp::Save { slot, ok } => {
                    self.state.queued.push_back(Signal::SaveCompleted {
                        slot,
                        op: "save",
                        ok,
                    });
                }
                PendingOp::Load { slot } => {
                    let ok = self.apply_load(&slot);
                    self.state.queued.push_back(Signal::SaveCompleted {
                        slot,
                        op: "load",
                        ok,
                    });
                }
            }
        }
    }

    fn apply_load(&mut self, slot: &str) -> bool {
        let Some(text) = self.state.slots.get(slot) else {
            tracing::warn!(%slot, "load requested for missing slot");
            self.state.log_line(format!("warning: no save in slot '{slot}'"));
            return false;
        };
        match SaveGame::decode(text) {
            Ok(save) => {
                self.state.world = save.restore_world();
                self.state.overworld = save.overworld.clone();
                self.state.factions = save.factions.clone();
                self.state.store = save.store.clone();
                self.state.map_touched = true;
                true
            }
            Err(err) => {
                tracing::warn!(%slot, %err, "save slot failed to decode");
                false
            }
        }
    }

    fn advance_timers(&mut self) {
        let mut expired = Vec::new();
        for (name, remaining) in &mut self.state.timers {
            *remaining -= 1;
            if *remaining <= 0 {
                expired.push(name.clone());
            }
        }
        for name in expired {
            self.state.timers.shift_remove(&name);
            self.state.queued.push_back(Signal::TimerTimeout(name));
        }
    }

    fn resume_waits(&mut self) {
        let mut still_waiting = Vec::new();
        for mut wait in std::mem::take(&mut self.state.waits) {
            wait.remaining -= 1;
            if wait.remaining > 0 {
                still_waiting.push(wait);
                continue;
            }
            // Waits created in an inactive graph resume only there
            if let Some(node) = self.project.graph(wait.graph).and_then(|g| g.node(wait.node))
            {
                let mut ctx = Ctx {
                    project: &self.project,
                    state: &mut self.state,
                    session: self.session.as_mut(),
                };
                follow(&mut ctx, wait.graph, node, "Then", 0);
            }
        }
        self.state.waits.extend(still_waiting);
    }

    fn fire_on_tick(&mut self) {
        let graph_id = self.state.active_graph;
        let tick = self.state.tick as i64;
        let Some(graph) = self.project.graph(graph_id) else {
            return;
        };
        let sources: Vec<NodeId> = graph.event_nodes(EventKind::Tick).map(|n| n.id).collect();
        for node_id in sources {
            self.run_trigger(graph_id, node_id, &[("Tick", Value::Int(tick))]);
        }
    }

    fn drain_signals(&mut self) {
        let mut handled = 0;
        while handled < MAX_SIGNALS_PER_TICK {
            let Some(signal) = self.state.queued.pop_front() else {
                break;
            };
            handled += 1;
            self.fire_event(&signal);
        }
        if !self.state.queued.is_empty() {
            tracing::warn!(
                deferred = self.state.queued.len(),
                "signal budget exhausted, deferring the rest to the next tick"
            );
        }
    }

    fn fire_event(&mut self, signal: &Signal) {
        let (event, seeds): (EventKind, Vec<(&str, Value)>) = match signal {
            Signal::Key(key) => (EventKind::KeyPress, vec![("Key", Value::Str(key.clone()))]),
            Signal::EnterTile(entity, x, y) => (
                EventKind::EntityEnterTile,
                vec![
                    ("Entity", Value::Entity(*entity)),
                    ("Cell", Value::Cell(*x, *y)),
                ],
            ),
            Signal::PlayerDeath(entity) => (
                EventKind::PlayerDeath,
                vec![("Entity", Value::Entity(*entity))],
            ),
            Signal::TimerTimeout(name) => (
                EventKind::TimerTimeout,
                vec![("Name", Value::Str(name.clone()))],
            ),
            Signal::Message(message) => (
                EventKind::MessageReceived,
                vec![
                    ("Sender", Value::Str(message.sender.clone())),
                    ("Type", Value::Str(message.message_type.clone())),
                    ("Payload", Value::Str(message.payload.clone())),
                ],
            ),
            Signal::SaveCompleted { slot, op, ok } => (
                EventKind::SaveCompleted,
                vec![
                    ("Slot", Value::Str(slot.clone())),
                    ("Op", Value::Str((*op).to_owned())),
                    ("Ok", Value::Bool(*ok)),
                ],
            ),
            Signal::BattleEnded { winner } => (
                EventKind::BattleEnded,
                vec![("Winner", Value::Entity(*winner))],
            ),
        };

        let graph_id = self.state.active_graph;
        let Some(graph) = self.project.graph(graph_id) else {
            return;
        };
        let sources: Vec<NodeId> = graph.event_nodes(event).map(|n| n.id).collect();
        for node_id in sources {
            self.run_trigger(graph_id, node_id, &seeds);
        }
    }

    fn run_trigger(&mut self, graph_id: GraphId, node_id: NodeId, seeds: &[(&str, Value)]) {
        let Some(node) = self.project.graph(graph_id).and_then(|g| g.node(node_id)) else {
            return;
        };
        for (name, value) in seeds {
            if let Some(port) = node.output_named(name) {
                self.state.outputs.insert((node_id, port.id), value.clone());
            }
        }
        let mut ctx = Ctx {
            project: &self.project,
            state: &mut self.state,
            session: self.session.as_mut(),
        };
        follow(&mut ctx, graph_id, node, "Then", 0);
    }

    fn switch_graph_if_requested(&mut self) {
        if let Some(next) = self.state.next_graph.take() {
            self.state.active_graph = next;
        }
    }

    fn build_result(&mut self) -> ExecutionResult {
        let map = if self.state.map_touched {
            self.state
                .active_map
                .and_then(|id| self.state.maps.get(&id))
                .cloned()
        } else {
            None
        };
        ExecutionResult {
            map,
            entities: snapshot_entities(&self.state.world),
            log: std::mem::take(&mut self.state.log),
        }
    }
}

fn snapshot_entities(world: &World) -> Vec<EntitySnapshot> {
    world
        .iter()
        .filter(|e| e.alive)
        .map(|e| EntitySnapshot {
            id: e.id,
            name: e.name.clone(),
            glyph: e.glyph,
            x: e.x,
            y: e.y,
            hp: e.hp,
        })
        .collect()
}

/// Borrow bundle threaded through a traversal. The project reference is
/// copied out wherever a graph borrow must outlive a state mutation.
struct Ctx<'a> {
    project: &'a Project,
    state: &'a mut EngineState,
    session: &'a mut dyn SessionLink,
}

/// Execute one node reached by an `Exec` edge. `via` identifies the input
/// port the edge arrived on, which `Gate` uses to tell its control inputs
/// apart from its flow input.
fn exec_node(ctx: &mut Ctx<'_>, graph_id: GraphId, node_id: NodeId, via: Option<PortId>, depth: u32) {
    if depth > MAX_EXEC_DEPTH {
        tracing::warn!(?node_id, "exec depth limit hit, pruning traversal");
        return;
    }
    let project = ctx.project;
    let Some(graph) = project.graph(graph_id) else {
        return;
    };
    let Some(node) = graph.node(node_id) else {
        return;
    };

    match node.kind {
        NodeKind::Branch => {
            let inputs = resolve_inputs(ctx, graph, node);
            let branch = if inputs.bool("Condition") { "True" } else { "False" };
            follow(ctx, graph_id, node, branch, depth);
        }
        NodeKind::Sequence => {
            for name in ["Then 1", "Then 2", "Then 3", "Then 4"] {
                follow(ctx, graph_id, node, name, depth);
            }
        }
        NodeKind::ForLoop => {
            let count = resolve_inputs(ctx, graph, node).int("Count").max(0);
            let index_port = node.output_named("Index").map(|p| p.id);
            for i in 0..count {
                if let Some(port) = index_port {
                    ctx.state.outputs.insert((node_id, port), Value::Int(i));
                }
                follow(ctx, graph_id, node, "Loop Body", depth);
            }
            follow(ctx, graph_id, node, "Completed", depth);
        }
        NodeKind::WhileLoop => {
            let mut iterations = 0;
            // Condition re-resolves every iteration with a fresh memo
            while resolve_inputs(ctx, graph, node).bool("Condition") {
                follow(ctx, graph_id, node, "Loop Body", depth);
                iterations += 1;
                if iterations >= MAX_WHILE_ITERATIONS {
                    tracing::warn!(?node_id, "while loop iteration cap hit");
                    break;
                }
            }
            follow(ctx, graph_id, node, "Completed", depth);
        }
        NodeKind::Wait => {
            let ticks = resolve_inputs(ctx, graph, node).int("Ticks").max(0);
            if ticks == 0 {
                follow(ctx, graph_id, node, "Then", depth);
            } else {
                ctx.state.waits.push(PendingWait {
                    graph: graph_id,
                    node: node_id,
                    remaining: ticks,
                });
            }
        }
        NodeKind::Gate => {
            let via_name = via
                .and_then(|p| node.port(p))
                .map(|p| p.name.as_str())
                .unwrap_or("In");
            match via_name {
                "Open" => {
                    ctx.state.gates.insert(node_id, true);
                }
                "Close" => {
                    ctx.state.gates.insert(node_id, false);
                }
                _ => {
                    let open = *ctx.state.gates.entry(node_id).or_insert_with(|| {
                        node.property("StartOpen")
                            .map_or(true, |p| matches!(p, "true" | "True" | "1"))
                    });
                    if open {
                        follow(ctx, graph_id, node, "Out", depth);
                    }
                }
            }
        }
        NodeKind::Switch => {
            let value = resolve_inputs(ctx, graph, node).int("Value");
            let case = format!("Case {value}");
            if node.output_named(&case).is_some() {
                follow(ctx, graph_id, node, &case, depth);
            } else {
                follow(ctx, graph_id, node, "Default", depth);
            }
        }
        NodeKind::CallGraph => {
            let name = resolve_inputs(ctx, graph, node).str("Graph");
            call_graph(ctx, &name, depth);
            follow(ctx, graph_id, node, "Then", depth);
        }
        NodeKind::ChangeGraph => {
            let name = resolve_inputs(ctx, graph, node).str("Graph");
            match project.graph_named(&name) {
                Some(target) => ctx.state.next_graph = Some(target.id),
                None => ctx.state.warn_missing("graph", &name),
            }
            follow(ctx, graph_id, node, "Then", depth);
        }
        NodeKind::RunCustomProcgen => {
            let name = resolve_inputs(ctx, graph, node).str("Graph");
            ctx.state.procgen_result = None;
            call_graph(ctx, &name, depth);
            if let Some(map_id) = ctx.state.procgen_result.take() {
                if let Some(port) = node.output_named("Map") {
                    ctx.state
                        .outputs
                        .insert((node_id, port.id), Value::Map(map_id));
                }
                ctx.state.active_map = Some(map_id);
                ctx.state.map_touched = true;
            } else {
                ctx.state.warn_missing("procgen output", &name);
            }
            follow(ctx, graph_id, node, "Then", depth);
        }
        // Entries and event sources reached via an edge just continue
        _ if node.kind.descriptor().is_trigger() => {
            follow(ctx, graph_id, node, "Then", depth);
        }
        _ => {
            let inputs = resolve_inputs(ctx, graph, node);
            let outcome = handlers::dispatch(
                node,
                &inputs,
                &mut HandlerCtx {
                    state: ctx.state,
                    session: ctx.session,
                },
            );
            for (name, value) in outcome.outputs {
                if let Some(port) = node.output_named(name) {
                    ctx.state.outputs.insert((node_id, port.id), value);
                }
            }
            for name in outcome.exec {
                follow(ctx, graph_id, node, name, depth);
            }
        }
    }
}

/// Run the named graph's entry traversal as a subroutine
fn call_graph(ctx: &mut Ctx<'_>, name: &str, depth: u32) {
    if ctx.state.call_depth >= MAX_CALL_DEPTH {
        tracing::warn!(%name, "call depth limit hit, skipping graph call");
        return;
    }
    let project = ctx.project;
    let Some(target) = project.graph_named(name) else {
        ctx.state.warn_missing("graph", name);
        return;
    };
    let Ok(entry) = target.entry_node() else {
        return;
    };
    ctx.state.call_depth += 1;
    exec_node(ctx, target.id, entry, None, depth + 1);
    ctx.state.call_depth -= 1;
}

/// Push execution along every `Exec` edge leaving the named output, in
/// connection declaration order.
fn follow(ctx: &mut Ctx<'_>, graph_id: GraphId, node: &Node, port_name: &str, depth: u32) {
    let project = ctx.project;
    let Some(graph) = project.graph(graph_id) else {
        return;
    };
    let Some(port) = node.output_named(port_name) else {
        return;
    };
    let targets: Vec<(NodeId, PortId)> = graph
        .connections_from(port.id)
        .map(|c| (c.to_node, c.to_port))
        .collect();
    for (to_node, to_port) in targets {
        exec_node(ctx, graph_id, to_node, Some(to_port), depth + 1);
    }
}

/// Memo for one data-resolution pass. A fresh resolver per pass keeps
/// loop-carried values (like a `ForLoop` index) current while still
/// evaluating shared pure subgraphs once.
#[derive(Default)]
struct Resolver {
    memo: HashMap<(NodeId, PortId), Value>,
    visiting: HashSet<NodeId>,
}

/// Resolve every data input of a node, in port order
fn resolve_inputs(ctx: &mut Ctx<'_>, graph: &Graph, node: &Node) -> Inputs {
    let mut resolver = Resolver::default();
    let mut inputs = Inputs::default();
    for port in node
        .inputs
        .iter()
        .filter(|p| p.data_type != glyphplay_graph::DataType::Exec)
    {
        let value = match graph.connection_to(port.id) {
            Some(conn) => {
                resolve_port(ctx, graph, conn.from_node, conn.from_port, &mut resolver)
            }
            // Designer-set properties override the descriptor default
            None => match node.property(&port.name).or(port.default.as_deref()) {
                Some(text) => Value::parse(port.data_type, text),
                None => Value::zero(port.data_type),
            },
        };
        inputs.insert(port.name.clone(), value);
    }
    inputs
}

/// Resolve one producer port: already-published outputs win, then the
/// pass memo, then on-demand evaluation of pull-eligible nodes. A node
/// with `Exec` inputs that has not executed this tick reads as zero.
fn resolve_port(
    ctx: &mut Ctx<'_>,
    graph: &Graph,
    from_node: NodeId,
    from_port: PortId,
    resolver: &mut Resolver,
) -> Value {
    if let Some(value) = ctx.state.outputs.get(&(from_node, from_port)) {
        return value.clone();
    }
    if let Some(value) = resolver.memo.get(&(from_node, from_port)) {
        return value.clone();
    }

    let Some(node) = graph.node(from_node) else {
        return Value::Int(0);
    };
    let zero = || {
        node.port(from_port)
            .map_or(Value::Int(0), |p| Value::zero(p.data_type))
    };

    let pull_eligible = !node.kind.descriptor().is_trigger()
        && node
            .inputs
            .iter()
            .all(|p| p.data_type != glyphplay_graph::DataType::Exec);
    if !pull_eligible {
        return zero();
    }
    if !resolver.visiting.insert(from_node) {
        tracing::warn!(?from_node, "value cycle detected, reading as zero");
        return zero();
    }

    let mut inputs = Inputs::default();
    for port in &node.inputs {
        let value = match graph.connection_to(port.id) {
            Some(conn) => resolve_port(ctx, graph, conn.from_node, conn.from_port, resolver),
            None => match node.property(&port.name).or(port.default.as_deref()) {
                Some(text) => Value::parse(port.data_type, text),
                None => Value::zero(port.data_type),
            },
        };
        inputs.insert(port.name.clone(), value);
    }
    let outcome = handlers::dispatch(
        node,
        &inputs,
        &mut HandlerCtx {
            state: ctx.state,
            session: ctx.session,
        },
    );
    for (name, value) in outcome.outputs {
        if let Some(port) = node.output_named(name) {
            resolver.memo.insert((from_node, port.id), value);
        }
    }
    resolver.visiting.remove(&from_node);

    resolver
        .memo
        .get(&(from_node, from_port))
        .cloned()
        .unwrap_or_else(zero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphplay_graph::{Graph, Node, NodeKind, Project};

    fn wire(graph: &mut Graph, from: NodeId, from_port: &str, to: NodeId, to_port: &str) {
        let from_id = graph
            .node(from)
            .and_then(|n| n.output_named(from_port))
            .map(|p| p.id)
            .unwrap();
        let to_id = graph
            .node(to)
            .and_then(|n| n.input_named(to_port))
            .map(|p| p.id)
            .unwrap();
        graph.connect(from, from_id, to, to_id).unwrap();
    }

    fn project_with(graph: Graph) -> Project {
        let mut project = Project::new("test");
        project.add_graph(graph);
        project
    }

    #[test]
    fn start_runs_the_entry_traversal() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let mut graph = Graph::new("main");
        let start = graph.add_node(Node::new(NodeKind::Start));
        let log = graph.add_node(Node::new(NodeKind::PrintLog).with_property("Text", "hello"));
        wire(&mut graph, start, "Then", log, "In");

        let mut engine = Engine::new(project_with(graph), 1).unwrap();
        let result = engine.start();
        assert_eq!(result.log, ["hello"]);
    }

    #[test]
    fn divide_by_zero_reads_as_zero() {
        let mut graph = Graph::new("main");
        let start = graph.add_node(Node::new(NodeKind::Start));
        let ten = graph.add_node(Node::new(NodeKind::IntValue).with_property("Value", "10"));
        let div = graph.add_node(Node::new(NodeKind::Divide));
        let set = graph.add_node(Node::new(NodeKind::SetVariable).with_property("Name", "q"));
        wire(&mut graph, start, "Then", set, "In");
        wire(&mut graph, ten, "Value", div, "A");
        wire(&mut graph, div, "Result", set, "Value");

        let mut engine = Engine::new(project_with(graph), 1).unwrap();
        engine.start();
        assert_eq!(engine.variable("q"), Some(&Value::Int(0)));
    }

    #[test]
    fn for_loop_fires_body_then_completed() {
        let mut graph = Graph::new("main");
        let start = graph.add_node(Node::new(NodeKind::Start));
        let looper =
            graph.add_node(Node::new(NodeKind::ForLoop).with_property("Count", "3"));
        let body = graph.add_node(Node::new(NodeKind::PrintLog).with_property("Text", "body"));
        let done = graph.add_node(Node::new(NodeKind::PrintLog).with_property("Text", "done"));
        wire(&mut graph, start, "Then", looper, "In");
        wire(&mut graph, looper, "Loop Body", body, "In");
        wire(&mut graph, looper, "Completed", done, "In");

        let mut engine = Engine::new(project_with(graph), 1).unwrap();
        let result = engine.start();
        assert_eq!(result.log, ["body", "body", "body", "done"]);
    }

    #[test]
    fn for_loop_index_advances_per_iteration() {
        let mut graph = Graph::new("main");
        let start = graph.add_node(Node::new(NodeKind::Start));
        let looper =
            graph.add_node(Node::new(NodeKind::ForLoop).with_property("Count", "3"));
        let set = graph.add_node(Node::new(NodeKind::SetVariable).with_property("Name", "last"));
        wire(&mut graph, start, "Then", looper, "In");
        wire(&mut graph, looper, "Loop Body", set, "In");
        wire(&mut graph, looper, "Index", set, "Value");

        let mut engine = Engine::new(project_with(graph), 1).unwrap();
        engine.start();
        assert_eq!(engine.variable("last"), Some(&Value::Int(2)));
    }

    #[test]
    fn while_loop_reruns_until_the_condition_clears() {
        let mut graph = Graph::new("main");
        let start = graph.add_node(Node::new(NodeKind::Start));
        let looper = graph.add_node(Node::new(NodeKind::WhileLoop));
        let read = graph.add_node(Node::new(NodeKind::GetVariable).with_property("Name", "i"));
        let cmp = graph.add_node(Node::new(NodeKind::LessThan).with_property("B", "3"));
        let bump = graph.add_node(Node::new(NodeKind::Add).with_property("B", "1"));
        let set = graph.add_node(Node::new(NodeKind::SetVariable).with_property("Name", "i"));
        let body = graph.add_node(Node::new(NodeKind::PrintLog).with_property("Text", "body"));
        let done = graph.add_node(Node::new(NodeKind::PrintLog).with_property("Text", "done"));
        wire(&mut graph, start, "Then", looper, "In");
        wire(&mut graph, read, "Value", cmp, "A");
        wire(&mut graph, cmp, "Result", looper, "Condition");
        wire(&mut graph, looper, "Loop Body", set, "In");
        wire(&mut graph, read, "Value", bump, "A");
        wire(&mut graph, bump, "Result", set, "Value");
        wire(&mut graph, set, "Then", body, "In");
        wire(&mut graph, looper, "Completed", done, "In");

        let mut engine = Engine::new(project_with(graph), 1).unwrap();
        // The condition is re-read each iteration, so the increment in the
        // body ends the loop after three passes
        assert_eq!(engine.start().log, ["body", "body", "body", "done"]);
        assert_eq!(engine.variable("i"), Some(&Value::Int(3)));
    }

    #[test]
    fn while_loop_iteration_cap_stops_a_runaway_condition() {
        let mut graph = Graph::new("main");
        let start = graph.add_node(Node::new(NodeKind::Start));
        let always =
            graph.add_node(Node::new(NodeKind::BoolValue).with_property("Value", "true"));
        let looper = graph.add_node(Node::new(NodeKind::WhileLoop));
        let read = graph.add_node(Node::new(NodeKind::GetVariable).with_property("Name", "n"));
        let bump = graph.add_node(Node::new(NodeKind::Add).with_property("B", "1"));
        let set = graph.add_node(Node::new(NodeKind::SetVariable).with_property("Name", "n"));
        let done = graph.add_node(Node::new(NodeKind::PrintLog).with_property("Text", "done"));
        wire(&mut graph, start, "Then", looper, "In");
        wire(&mut graph, always, "Value", looper, "Condition");
        wire(&mut graph, looper, "Loop Body", set, "In");
        wire(&mut graph, read, "Value", bump, "A");
        wire(&mut graph, bump, "Result", set, "Value");
        wire(&mut graph, looper, "Completed", done, "In");

        let mut engine = Engine::new(project_with(graph), 1).unwrap();
        assert_eq!(engine.start().log, ["done"]);
        assert_eq!(
            engine.variable("n"),
            Some(&Value::Int(MAX_WHILE_ITERATIONS))
        );
    }

    #[test]
    fn switch_routes_to_the_matching_case() {
        let mut graph = Graph::new("main");
        let start = graph.add_node(Node::new(NodeKind::Start));
        let switch = graph.add_node(Node::new(NodeKind::Switch).with_property("Value", "2"));
        let two = graph.add_node(Node::new(NodeKind::PrintLog).with_property("Text", "two"));
        let other = graph.add_node(Node::new(NodeKind::PrintLog).with_property("Text", "other"));
        wire(&mut graph, start, "Then", switch, "In");
        wire(&mut graph, switch, "Case 2", two, "In");
        wire(&mut graph, switch, "Default", other, "In");

        let mut engine = Engine::new(project_with(graph), 1).unwrap();
        assert_eq!(engine.start().log, ["two"]);
    }

    #[test]
    fn switch_falls_back_to_default_for_an_unhandled_value() {
        let mut graph = Graph::new("main");
        let start = graph.add_node(Node::new(NodeKind::Start));
        let switch = graph.add_node(Node::new(NodeKind::Switch).with_property("Value", "7"));
        let two = graph.add_node(Node::new(NodeKind::PrintLog).with_property("Text", "two"));
        let other = graph.add_node(Node::new(NodeKind::PrintLog).with_property("Text", "other"));
        wire(&mut graph, start, "Then", switch, "In");
        wire(&mut graph, switch, "Case 2", two, "In");
        wire(&mut graph, switch, "Default", other, "In");

        let mut engine = Engine::new(project_with(graph), 1).unwrap();
        assert_eq!(engine.start().log, ["other"]);
    }

    #[test]
    fn branch_takes_the_condition_edge() {
        let mut graph = Graph::new("main");
        let start = graph.add_node(Node::new(NodeKind::Start));
        let flag = graph.add_node(Node::new(NodeKind::BoolValue).with_property("Value", "true"));
        let branch = graph.add_node(Node::new(NodeKind::Branch));
        let yes = graph.add_node(Node::new(NodeKind::PrintLog).with_property("Text", "yes"));
        let no = graph.add_node(Node::new(NodeKind::PrintLog).with_property("Text", "no"));
        wire(&mut graph, start, "Then", branch, "In");
        wire(&mut graph, flag, "Value", branch, "Condition");
        wire(&mut graph, branch, "True", yes, "In");
        wire(&mut graph, branch, "False", no, "In");

        let mut engine = Engine::new(project_with(graph), 1).unwrap();
        assert_eq!(engine.start().log, ["yes"]);
    }

    #[test]
    fn wait_suspends_and_resumes() {
        let mut graph = Graph::new("main");
        let start = graph.add_node(Node::new(NodeKind::Start));
        let wait = graph.add_node(Node::new(NodeKind::Wait).with_property("Ticks", "2"));
        let after = graph.add_node(Node::new(NodeKind::PrintLog).with_property("Text", "woke"));
        wire(&mut graph, start, "Then", wait, "In");
        wire(&mut graph, wait, "Then", after, "In");

        let mut engine = Engine::new(project_with(graph), 1).unwrap();
        assert!(engine.start().log.is_empty());
        assert!(engine.tick().log.is_empty());
        assert_eq!(engine.tick().log, ["woke"]);
    }

    #[test]
    fn gate_blocks_after_close() {
        let mut graph = Graph::new("main");
        let start = graph.add_node(Node::new(NodeKind::Start));
        let seq = graph.add_node(Node::new(NodeKind::Sequence));
        let gate = graph.add_node(Node::new(NodeKind::Gate));
        let out = graph.add_node(Node::new(NodeKind::PrintLog).with_property("Text", "through"));
        wire(&mut graph, start, "Then", seq, "In");
        // First pass goes through the open gate, then Close, then a
        // second pass that must be blocked
        wire(&mut graph, seq, "Then 1", gate, "In");
        wire(&mut graph, seq, "Then 2", gate, "Close");
        wire(&mut graph, seq, "Then 3", gate, "In");
        wire(&mut graph, gate, "Out", out, "In");

        let mut engine = Engine::new(project_with(graph), 1).unwrap();
        assert_eq!(engine.start().log, ["through"]);
    }

    #[test]
    fn on_tick_fires_each_tick_with_the_counter() {
        let mut graph = Graph::new("main");
        graph.add_node(Node::new(NodeKind::Start));
        let tick = graph.add_node(Node::new(NodeKind::OnTick));
        let set = graph.add_node(Node::new(NodeKind::SetVariable).with_property("Name", "t"));
        wire(&mut graph, tick, "Then", set, "In");
        wire(&mut graph, tick, "Tick", set, "Value");

        let mut engine = Engine::new(project_with(graph), 1).unwrap();
        engine.start();
        engine.tick();
        engine.tick();
        assert_eq!(engine.variable("t"), Some(&Value::Int(2)));
    }

    #[test]
    fn key_press_fires_only_its_event_nodes() {
        let mut graph = Graph::new("main");
        graph.add_node(Node::new(NodeKind::Start));
        let key = graph.add_node(Node::new(NodeKind::OnKeyPress));
        let set = graph.add_node(Node::new(NodeKind::SetVariable).with_property("Name", "key"));
        wire(&mut graph, key, "Then", set, "In");
        wire(&mut graph, key, "Key", set, "Value");

        let mut engine = Engine::new(project_with(graph), 1).unwrap();
        engine.start();
        engine.tick();
        assert_eq!(engine.variable("key"), None);

        engine.inject(InputEvent::KeyPress("ArrowUp".to_owned()));
        engine.tick();
        assert_eq!(engine.variable("key"), Some(&Value::Str("ArrowUp".to_owned())));
    }

    #[test]
    fn same_seed_and_events_replay_identically() {
        let build = || {
            let mut graph = Graph::new("main");
            let start = graph.add_node(Node::new(NodeKind::Start));
            let map = graph.add_node(Node::new(NodeKind::CreateMap).with_property("Width", "20"));
            let cave = graph.add_node(Node::new(NodeKind::GenerateCaveCellular));
            let roll = graph.add_node(Node::new(NodeKind::RandomInt));
            let set = graph.add_node(Node::new(NodeKind::SetVariable).with_property("Name", "r"));
            wire(&mut graph, start, "Then", map, "In");
            wire(&mut graph, map, "Then", cave, "In");
            wire(&mut graph, map, "Map", cave, "Map");
            wire(&mut graph, cave, "Then", set, "In");
            wire(&mut graph, roll, "Value", set, "Value");
            project_with(graph)
        };

        let mut a = Engine::new(build(), 99).unwrap();
        let mut b = Engine::new(build(), 99).unwrap();
        let (ra, rb) = (a.start(), b.start());
        assert_eq!(ra.map.as_ref().map(|m| m.render()), rb.map.as_ref().map(|m| m.render()));
        assert_eq!(a.variable("r"), b.variable("r"));
        assert!(ra.map.is_some());
    }

    #[test]
    fn call_graph_runs_the_named_subgraph() {
        let mut main = Graph::new("main");
        let start = main.add_node(Node::new(NodeKind::Start));
        let call = main.add_node(Node::new(NodeKind::CallGraph).with_property("Graph", "sub"));
        let after = main.add_node(Node::new(NodeKind::PrintLog).with_property("Text", "after"));
        wire(&mut main, start, "Then", call, "In");
        wire(&mut main, call, "Then", after, "In");

        let mut sub = Graph::new("sub");
        let sub_start = sub.add_node(Node::new(NodeKind::Start));
        let inner = sub.add_node(Node::new(NodeKind::PrintLog).with_property("Text", "inner"));
        wire(&mut sub, sub_start, "Then", inner, "In");

        let mut project = Project::new("test");
        project.add_graph(main);
        project.add_graph(sub);

        let mut engine = Engine::new(project, 1).unwrap();
        assert_eq!(engine.start().log, ["inner", "after"]);
    }

    #[test]
    fn recursive_graph_calls_are_bounded() {
        let mut main = Graph::new("main");
        let start = main.add_node(Node::new(NodeKind::Start));
        let call = main.add_node(Node::new(NodeKind::CallGraph).with_property("Graph", "main"));
        let after = main.add_node(Node::new(NodeKind::PrintLog).with_property("Text", "x"));
        wire(&mut main, start, "Then", call, "In");
        wire(&mut main, call, "Then", after, "In");

        let mut engine = Engine::new(project_with(main), 1).unwrap();
        // Must terminate; one log line per level up to the call cap
        let result = engine.start();
        assert_eq!(result.log.len(), MAX_CALL_DEPTH as usize + 1);
    }

    #[test]
    fn missing_project_start_graph_is_rejected() {
        let project = Project::new("empty");
        assert!(Engine::new(project, 1).is_err());
    }

    #[test]
    fn open_room_renders_with_border() {
        let mut graph = Graph::new("main");
        let start = graph.add_node(Node::new(NodeKind::Start));
        let map = graph.add_node(
            Node::new(NodeKind::CreateMap)
                .with_property("Width", "10")
                .with_property("Height", "5"),
        );
        let cave = graph.add_node(
            Node::new(NodeKind::GenerateCaveCellular)
                .with_property("FillRatio", "0")
                .with_property("Iterations", "0"),
        );
        let render = graph.add_node(Node::new(NodeKind::RenderMap));
        wire(&mut graph, start, "Then", map, "In");
        wire(&mut graph, map, "Then", cave, "In");
        wire(&mut graph, map, "Map", cave, "Map");
        wire(&mut graph, cave, "Then", render, "In");
        wire(&mut graph, cave, "Map", render, "Map");

        let mut engine = Engine::new(project_with(graph), 7).unwrap();
        let rendered = engine.start().map.unwrap().render();
        let rows: Vec<&str> = rendered.lines().collect();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0], "##########");
        assert_eq!(rows[2], "#........#");
        assert_eq!(rows[4], "##########");
    }

    #[test]
    fn timer_timeout_fires_after_the_countdown() {
        let mut graph = Graph::new("main");
        let start = graph.add_node(Node::new(NodeKind::Start));
        let timer = graph.add_node(
            Node::new(NodeKind::StartTimer)
                .with_property("Name", "spawner")
                .with_property("Ticks", "2"),
        );
        let on = graph.add_node(Node::new(NodeKind::OnTimerTimeout));
        let set = graph.add_node(Node::new(NodeKind::SetVariable).with_property("Name", "fired"));
        wire(&mut graph, start, "Then", timer, "In");
        wire(&mut graph, on, "Then", set, "In");
        wire(&mut graph, on, "Name", set, "Value");

        let mut engine = Engine::new(project_with(graph), 1).unwrap();
        engine.start();
        engine.tick();
        assert_eq!(engine.variable("fired"), None);
        engine.tick();
        assert_eq!(
            engine.variable("fired"),
            Some(&Value::Str("spawner".to_owned()))
        );
    }

    #[test]
    fn save_completion_lands_on_the_next_tick() {
        let mut graph = Graph::new("main");
        let start = graph.add_node(Node::new(NodeKind::Start));
        let save = graph.add_node(Node::new(NodeKind::SaveGame).with_property("Slot", "a"));
        let on = graph.add_node(Node::new(NodeKind::OnSaveCompleted));
        let set = graph.add_node(Node::new(NodeKind::SetVariable).with_property("Name", "ok"));
        wire(&mut graph, start, "Then", save, "In");
        wire(&mut graph, on, "Then", set, "In");
        wire(&mut graph, on, "Ok", set, "Value");

        let mut engine = Engine::new(project_with(graph), 1).unwrap();
        engine.start();
        assert_eq!(engine.variable("ok"), None);
        engine.tick();
        assert_eq!(engine.variable("ok"), Some(&Value::Bool(true)));
        assert!(engine.slot_text("a").is_some());
    }

    #[test]
    fn load_round_trips_world_state() {
        let mut graph = Graph::new("main");
        graph.add_node(Node::new(NodeKind::Start));
        let key = graph.add_node(Node::new(NodeKind::OnKeyPress));
        let store = graph.add_node(
            Node::new(NodeKind::StoreValue)
                .with_property("Key", "quest")
                .with_property("Value", "act1"),
        );
        let save = graph.add_node(Node::new(NodeKind::SaveGame).with_property("Slot", "a"));
        wire(&mut graph, key, "Then", store, "In");
        wire(&mut graph, store, "Then", save, "In");

        let mut engine = Engine::new(project_with(graph.clone()), 1).unwrap();
        engine.start();
        engine.inject(InputEvent::KeyPress("s".to_owned()));
        engine.tick();
        let slot = engine.slot_text("a").unwrap().to_owned();

        let loaded = SaveGame::decode(&slot).unwrap();
        assert_eq!(loaded.store.get("quest").map(String::as_str), Some("act1"));
    }

    #[test]
    fn broadcast_goes_through_the_session_link() {
        use crate::session::{LoopbackSession, MessageScope};

        let mut graph = Graph::new("main");
        let start = graph.add_node(Node::new(NodeKind::Start));
        let host = graph.add_node(Node::new(NodeKind::HostSession));
        let send = graph.add_node(
            Node::new(NodeKind::BroadcastMessage)
                .with_property("Type", "chat")
                .with_property("Payload", "hi"),
        );
        wire(&mut graph, start, "Then", host, "In");
        wire(&mut graph, host, "Then", send, "In");

        let link = LoopbackSession::new(2);
        let sent = link.sent();
        let mut engine = Engine::new(project_with(graph), 1)
            .unwrap()
            .with_session(Box::new(link));
        engine.start();

        let sent = sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].scope, MessageScope::Broadcast);
        assert_eq!(sent[0].message_type, "chat");
        assert_eq!(sent[0].payload, "hi");
    }

    #[test]
    fn received_messages_fire_the_event() {
        use crate::session::{IncomingMessage, LoopbackSession};

        let mut graph = Graph::new("main");
        graph.add_node(Node::new(NodeKind::Start));
        let on = graph.add_node(Node::new(NodeKind::OnMessageReceived));
        let set = graph.add_node(Node::new(NodeKind::SetVariable).with_property("Name", "msg"));
        wire(&mut graph, on, "Then", set, "In");
        wire(&mut graph, on, "Payload", set, "Value");

        let mut link = LoopbackSession::new(2);
        link.push_incoming(IncomingMessage {
            sender: "peer1".to_owned(),
            message_type: "chat".to_owned(),
            payload: "hello".to_owned(),
        });

        let mut engine = Engine::new(project_with(graph), 1)
            .unwrap()
            .with_session(Box::new(link));
        engine.start();
        engine.tick();
        assert_eq!(engine.variable("msg"), Some(&Value::Str("hello".to_owned())));
    }

    #[test]
    fn movement_is_blocked_by_walls() {
        let mut graph = Graph::new("main");
        let start = graph.add_node(Node::new(NodeKind::Start));
        let map = graph.add_node(
            Node::new(NodeKind::CreateMap)
                .with_property("Width", "5")
                .with_property("Height", "5"),
        );
        let wall = graph.add_node(
            Node::new(NodeKind::FillRegion)
                .with_property("X", "3")
                .with_property("Y", "1")
                .with_property("Width", "1")
                .with_property("Height", "1")
                .with_property("Tile", "Wall"),
        );
        let sprite = graph.add_node(
            Node::new(NodeKind::DefineSprite)
                .with_property("Name", "hero")
                .with_property("Glyph", "@"),
        );
        let spawn = graph.add_node(
            Node::new(NodeKind::SpawnEntity)
                .with_property("Name", "Hero")
                .with_property("Sprite", "hero")
                .with_property("Cell", "2,1")
                .with_property("Player", "true"),
        );
        let step = graph.add_node(Node::new(NodeKind::MoveEntity).with_property("Dx", "1"));
        let set = graph.add_node(Node::new(NodeKind::SetVariable).with_property("Name", "moved"));
        wire(&mut graph, start, "Then", map, "In");
        wire(&mut graph, map, "Then", wall, "In");
        wire(&mut graph, wall, "Then", sprite, "In");
        wire(&mut graph, sprite, "Then", spawn, "In");
        wire(&mut graph, spawn, "Then", step, "In");
        wire(&mut graph, spawn, "Entity", step, "Entity");
        wire(&mut graph, step, "Then", set, "In");
        wire(&mut graph, step, "Moved", set, "Value");

        let mut engine = Engine::new(project_with(graph), 1).unwrap();
        let result = engine.start();
        assert_eq!(engine.variable("moved"), Some(&Value::Bool(false)));
        let hero = &result.entities[0];
        assert_eq!((hero.x, hero.y), (2, 1));
    }

    #[test]
    fn custom_procgen_publishes_the_subgraph_map() {
        let mut sub = Graph::new("maker");
        let sub_start = sub.add_node(Node::new(NodeKind::CustomProcgenStart));
        let map = sub.add_node(
            Node::new(NodeKind::CreateMap)
                .with_property("Width", "6")
                .with_property("Height", "4"),
        );
        let out = sub.add_node(Node::new(NodeKind::CustomProcgenOutput));
        wire(&mut sub, sub_start, "Then", map, "In");
        wire(&mut sub, map, "Then", out, "In");
        wire(&mut sub, map, "Map", out, "Map");

        let mut main = Graph::new("main");
        let start = main.add_node(Node::new(NodeKind::Start));
        let run = main.add_node(
            Node::new(NodeKind::RunCustomProcgen).with_property("Graph", "maker"),
        );
        let render = main.add_node(Node::new(NodeKind::RenderMap));
        wire(&mut main, start, "Then", run, "In");
        wire(&mut main, run, "Then", render, "In");
        wire(&mut main, run, "Map", render, "Map");

        let mut project = Project::new("test");
        project.add_graph(main);
        project.add_graph(sub);

        let mut engine = Engine::new(project, 1).unwrap();
        let rendered = engine.start().map.unwrap();
        assert_eq!(rendered.width(), 6);
        assert_eq!(rendered.height(), 4);
    }
}
