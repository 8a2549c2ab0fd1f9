// SPDX-License-Identifier: MIT OR Apache-2.0
//! Static catalogue of node kinds and their handler descriptors.
//!
//! Every [`NodeKind`] resolves to exactly one [`NodeDescriptor`] through an
//! exhaustive match, so adding a kind means adding one enum variant and one
//! descriptor arm; the compiler flags anything missed. Unknown tags from a
//! document degrade to [`NodeKind::InlineExpression`] at the codec layer
//! rather than failing the load.

use crate::port::DataType;
use serde::{Deserialize, Serialize};

/// The closed set of script node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)] // variant names are the documentation; see NodeDescriptor
pub enum NodeKind {
    // Entry
    Start,
    CustomProcgenStart,
    // Events
    OnTick,
    OnKeyPress,
    OnEntityEnterTile,
    OnPlayerDeath,
    OnTimerTimeout,
    OnMessageReceived,
    OnSaveCompleted,
    OnBattleEnded,
    // Variables
    IntValue,
    FloatValue,
    StringValue,
    BoolValue,
    SetVariable,
    GetVariable,
    RandomInt,
    InlineExpression,
    // Math
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Negate,
    Abs,
    Min,
    Max,
    Clamp,
    IntToFloat,
    FloatToInt,
    // Logic
    And,
    Or,
    Not,
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
    Compare,
    // Flow
    Branch,
    Sequence,
    ForLoop,
    WhileLoop,
    Wait,
    Gate,
    Switch,
    CallGraph,
    // Map / procgen
    CreateMap,
    GenerateCaveCellular,
    GenerateBspRooms,
    GenerateDrunkardWalk,
    FillRegion,
    SetCell,
    GetCell,
    DefineRoomTemplate,
    PlaceRoomTemplate,
    RenderMap,
    MapSize,
    FindOpenCell,
    RunCustomProcgen,
    CustomProcgenOutput,
    // Entity
    DefineSprite,
    SpawnEntity,
    DestroyEntity,
    MoveEntity,
    TeleportEntity,
    GetEntityCell,
    EntityAtCell,
    GetPlayer,
    SetEntitySprite,
    GetEntityName,
    EntityExists,
    // UI
    PrintLog,
    ShowMessage,
    ShowChoice,
    ClearLog,
    SetStatusLine,
    DrawText,
    // Persistence
    SaveGame,
    LoadGame,
    StoreValue,
    FetchValue,
    HasValue,
    DeleteValue,
    // Dialogue
    StartDialogue,
    DialogueLine,
    DialogueChoice,
    AdvanceDialogue,
    EndDialogue,
    IsDialogueActive,
    // Faction
    DefineFaction,
    SetFactionRelation,
    GetFactionRelation,
    AssignFaction,
    GetEntityFaction,
    IsHostile,
    // Time
    GetTick,
    StartTimer,
    StopTimer,
    GetTimeOfDay,
    AdvanceTime,
    // Scene tree
    ChangeGraph,
    GetSceneNode,
    AddSceneNode,
    RemoveSceneNode,
    SetSceneNodeProperty,
    GetSceneNodeProperty,
    // Overworld
    CreateOverworld,
    EnterLocation,
    LeaveLocation,
    CurrentLocation,
    // Networking
    HostSession,
    JoinSession,
    LeaveSession,
    SendMessage,
    BroadcastMessage,
    IsHost,
    PlayerCount,
    // Battle
    StartBattle,
    EndBattle,
    RollDice,
    RollInitiative,
    DealDamage,
    Heal,
    GetHealth,
    // RPG
    AddItem,
    RemoveItem,
    HasItem,
    GetStat,
    SetStat,
}

/// Node kind category, used for editor palettes and descriptor grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum NodeCategory {
    Entry,
    Event,
    Variable,
    Math,
    Logic,
    Flow,
    Procgen,
    Entity,
    Ui,
    Persistence,
    Dialogue,
    Faction,
    Time,
    Scene,
    Overworld,
    Network,
    Battle,
    Rpg,
}

/// How a node kind behaves when invoked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Invocation {
    /// Pure compute: safe to evaluate on demand during data resolution
    Pure,
    /// Keeps per-node or per-engine state across ticks
    Stateful,
    /// Mutates the world, map, log, store or session
    Effect,
}

/// External signal that fires an event-source node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum EventKind {
    Tick,
    KeyPress,
    EntityEnterTile,
    PlayerDeath,
    TimerTimeout,
    MessageReceived,
    SaveCompleted,
    BattleEnded,
}

/// How a node kind is reached during execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Entry point, executed once at engine start
    Entry,
    /// Fires spontaneously from an external signal
    Event(EventKind),
    /// Reached only via an incoming Exec edge (or pulled for its value)
    Ordinary,
}

/// Template for a port declared by a descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct PortSpec {
    /// Port name
    pub name: &'static str,
    /// Port data type
    pub data_type: DataType,
    /// Default value for unconnected data inputs
    pub default: Option<&'static str>,
}

/// Static descriptor for one node kind
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDescriptor {
    /// The kind this descriptor belongs to
    pub kind: NodeKind,
    /// Display name
    pub name: &'static str,
    /// Category
    pub category: NodeCategory,
    /// Invocation class
    pub invocation: Invocation,
    /// Execution role
    pub role: Role,
    /// Input port templates
    pub inputs: Vec<PortSpec>,
    /// Output port templates
    pub outputs: Vec<PortSpec>,
}

impl NodeDescriptor {
    fn new(
        kind: NodeKind,
        name: &'static str,
        category: NodeCategory,
        invocation: Invocation,
        role: Role,
    ) -> Self {
        Self {
            kind,
            name,
            category,
            invocation,
            role,
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    fn input(mut self, name: &'static str, data_type: DataType) -> Self {
        self.inputs.push(PortSpec {
            name,
            data_type,
            default: None,
        });
        self
    }

    fn input_default(
        mut self,
        name: &'static str,
        data_type: DataType,
        default: &'static str,
    ) -> Self {
        self.inputs.push(PortSpec {
            name,
            data_type,
            default: Some(default),
        });
        self
    }

    fn output(mut self, name: &'static str, data_type: DataType) -> Self {
        self.outputs.push(PortSpec {
            name,
            data_type,
            default: None,
        });
        self
    }

    /// Standard `In` exec input
    fn exec_in(self) -> Self {
        self.input("In", DataType::Exec)
    }

    /// Standard `Then` exec output
    fn exec_out(self) -> Self {
        self.output("Then", DataType::Exec)
    }

    /// Whether this kind can begin a traversal (entry or event)
    pub fn is_trigger(&self) -> bool {
        !matches!(self.role, Role::Ordinary)
    }
}

impl NodeKind {
    /// Every node kind, in palette order.
    pub const ALL: [NodeKind; 129] = [
        NodeKind::Start,
        NodeKind::CustomProcgenStart,
        NodeKind::OnTick,
        NodeKind::OnKeyPress,
        NodeKind::OnEntityEnterTile,
        NodeKind::OnPlayerDeath,
        NodeKind::OnTimerTimeout,
        NodeKind::OnMessageReceived,
        NodeKind::OnSaveCompleted,
        NodeKind::OnBattleEnded,
        NodeKind::IntValue,
        NodeKind::FloatValue,
        NodeKind::StringValue,
        NodeKind::BoolValue,
        NodeKind::SetVariable,
        NodeKind::GetVariable,
        NodeKind::RandomInt,
        NodeKind::InlineExpression,
        NodeKind::Add,
        NodeKind::Subtract,
        NodeKind::Multiply,
        NodeKind::Divide,
        NodeKind::Modulo,
        NodeKind::Negate,
        NodeKind::Abs,
        NodeKind::Min,
        NodeKind::Max,
        NodeKind::Clamp,
        NodeKind::IntToFloat,
        NodeKind::FloatToInt,
        NodeKind::And,
        NodeKind::Or,
        NodeKind::Not,
        NodeKind::Equals,
        NodeKind::NotEquals,
        NodeKind::GreaterThan,
        NodeKind::LessThan,
        NodeKind::Compare,
        NodeKind::Branch,
        NodeKind::Sequence,
        NodeKind::ForLoop,
        NodeKind::WhileLoop,
        NodeKind::Wait,
        NodeKind::Gate,
        NodeKind::Switch,
        NodeKind::CallGraph,
        NodeKind::CreateMap,
        NodeKind::GenerateCaveCellular,
        NodeKind::GenerateBspRooms,
        NodeKind::GenerateDrunkardWalk,
        NodeKind::FillRegion,
        NodeKind::SetCell,
        NodeKind::GetCell,
        NodeKind::DefineRoomTemplate,
        NodeKind::PlaceRoomTemplate,
        NodeKind::RenderMap,
        NodeKind::MapSize,
        NodeKind::FindOpenCell,
        NodeKind::RunCustomProcgen,
        NodeKind::CustomProcgenOutput,
        NodeKind::DefineSprite,
        NodeKind::SpawnEntity,
        NodeKind::DestroyEntity,
        NodeKind::MoveEntity,
        NodeKind::TeleportEntity,
        NodeKind::GetEntityCell,
        NodeKind::EntityAtCell,
        NodeKind::GetPlayer,
        NodeKind::SetEntitySprite,
        NodeKind::GetEntityName,
        NodeKind::EntityExists,
        NodeKind::PrintLog,
        NodeKind::ShowMessage,
        NodeKind::ShowChoice,
        NodeKind::ClearLog,
        NodeKind::SetStatusLine,
        NodeKind::DrawText,
        NodeKind::SaveGame,
        NodeKind::LoadGame,
        NodeKind::StoreValue,
        NodeKind::FetchValue,
        NodeKind::HasValue,
        NodeKind::DeleteValue,
        NodeKind::StartDialogue,
        NodeKind::DialogueLine,
        NodeKind::DialogueChoice,
        NodeKind::AdvanceDialogue,
        NodeKind::EndDialogue,
        NodeKind::IsDialogueActive,
        NodeKind::DefineFaction,
        NodeKind::SetFactionRelation,
        NodeKind::GetFactionRelation,
        NodeKind::AssignFaction,
        NodeKind::GetEntityFaction,
        NodeKind::IsHostile,
        NodeKind::GetTick,
        NodeKind::StartTimer,
        NodeKind::StopTimer,
        NodeKind::GetTimeOfDay,
        NodeKind::AdvanceTime,
        NodeKind::ChangeGraph,
        NodeKind::GetSceneNode,
        NodeKind::AddSceneNode,
        NodeKind::RemoveSceneNode,
        NodeKind::SetSceneNodeProperty,
        NodeKind::GetSceneNodeProperty,
        NodeKind::CreateOverworld,
        NodeKind::EnterLocation,
        NodeKind::LeaveLocation,
        NodeKind::CurrentLocation,
        NodeKind::HostSession,
        NodeKind::JoinSession,
        NodeKind::LeaveSession,
        NodeKind::SendMessage,
        NodeKind::BroadcastMessage,
        NodeKind::IsHost,
        NodeKind::PlayerCount,
        NodeKind::StartBattle,
        NodeKind::EndBattle,
        NodeKind::RollDice,
        NodeKind::RollInitiative,
        NodeKind::DealDamage,
        NodeKind::Heal,
        NodeKind::GetHealth,
        NodeKind::AddItem,
        NodeKind::RemoveItem,
        NodeKind::HasItem,
        NodeKind::GetStat,
        NodeKind::SetStat,
    ];

    /// Document tag for this kind (the variant name)
    pub fn tag(self) -> String {
        format!("{self:?}")
    }

    /// Parse a document tag. Returns `None` for unknown tags; the codec
    /// degrades those to [`NodeKind::InlineExpression`].
    pub fn from_tag(tag: &str) -> Option<NodeKind> {
        NodeKind::ALL.iter().copied().find(|k| k.tag() == tag)
    }

    /// The descriptor for this kind. Total over the closed set.
    pub fn descriptor(self) -> NodeDescriptor {
        use DataType::{
            Any, Bool, Cell, Entity, Exec, Float, Int, Location, Map, Overworld, SceneNode,
            Session, String as Str,
        };
        use Invocation::{Effect, Pure, Stateful};
        use NodeCategory as C;
        use Role::{Entry, Event, Ordinary};

        let d = |name, category, invocation, role| {
            NodeDescriptor::new(self, name, category, invocation, role)
        };

        match self {
            // ---- Entry ----
            NodeKind::Start => d("Start", C::Entry, Stateful, Entry).exec_out(),
            NodeKind::CustomProcgenStart => {
                d("Custom Procgen Start", C::Entry, Stateful, Entry).exec_out()
            }

            // ---- Events ----
            NodeKind::OnTick => d("On Tick", C::Event, Stateful, Event(EventKind::Tick))
                .exec_out()
                .output("Tick", Int),
            NodeKind::OnKeyPress => d("On Key Press", C::Event, Stateful, Event(EventKind::KeyPress))
                .exec_out()
                .output("Key", Str),
            NodeKind::OnEntityEnterTile => d(
                "On Entity Enter Tile",
                C::Event,
                Stateful,
                Event(EventKind::EntityEnterTile),
            )
            .exec_out()
            .output("Entity", Entity)
            .output("Cell", Cell),
            NodeKind::OnPlayerDeath => d(
                "On Player Death",
                C::Event,
                Stateful,
                Event(EventKind::PlayerDeath),
            )
            .exec_out()
            .output("Entity", Entity),
            NodeKind::OnTimerTimeout => d(
                "On Timer Timeout",
                C::Event,
                Stateful,
                Event(EventKind::TimerTimeout),
            )
            .exec_out()
            .output("Name", Str),
            NodeKind::OnMessageReceived => d(
                "On Message Received",
                C::Event,
                Stateful,
                Event(EventKind::MessageReceived),
            )
            .exec_out()
            .output("Sender", Str)
            .output("Type", Str)
            .output("Payload", Str),
            NodeKind::OnSaveCompleted => d(
                "On Save Completed",
                C::Event,
                Stateful,
                Event(EventKind::SaveCompleted),
            )
            .exec_out()
            .output("Slot", Str)
            .output("Op", Str)
            .output("Ok", Bool),
            NodeKind::OnBattleEnded => d(
                "On Battle Ended",
                C::Event,
                Stateful,
                Event(EventKind::BattleEnded),
            )
            .exec_out()
            .output("Winner", Entity),

            // ---- Variables ----
            NodeKind::IntValue => d("Int", C::Variable, Pure, Ordinary).output("Value", Int),
            NodeKind::FloatValue => d("Float", C::Variable, Pure, Ordinary).output("Value", Float),
            NodeKind::StringValue => d("String", C::Variable, Pure, Ordinary).output("Value", Str),
            NodeKind::BoolValue => d("Bool", C::Variable, Pure, Ordinary).output("Value", Bool),
            NodeKind::SetVariable => d("Set Variable", C::Variable, Effect, Ordinary)
                .exec_in()
                .input("Name", Str)
                .input("Value", Any)
                .exec_out(),
            NodeKind::GetVariable => d("Get Variable", C::Variable, Pure, Ordinary)
                .input("Name", Str)
                .output("Value", Any),
            NodeKind::RandomInt => d("Random Int", C::Variable, Stateful, Ordinary)
                .input_default("Min", Int, "0")
                .input_default("Max", Int, "100")
                .output("Value", Int),
            NodeKind::InlineExpression => d("Inline Expression", C::Variable, Pure, Ordinary)
                .exec_in()
                .input("Value", Any)
                .exec_out()
                .output("Value", Any),

            // ---- Math ----
            NodeKind::Add => binary_math(d("Add", C::Math, Pure, Ordinary)),
            NodeKind::Subtract => binary_math(d("Subtract", C::Math, Pure, Ordinary)),
            NodeKind::Multiply => binary_math(d("Multiply", C::Math, Pure, Ordinary)),
            NodeKind::Divide => binary_math(d("Divide", C::Math, Pure, Ordinary)),
            NodeKind::Modulo => binary_math(d("Modulo", C::Math, Pure, Ordinary)),
            NodeKind::Negate => d("Negate", C::Math, Pure, Ordinary)
                .input_default("Value", Int, "0")
                .output("Result", Int),
            NodeKind::Abs => d("Abs", C::Math, Pure, Ordinary)
                .input_default("Value", Int, "0")
                .output("Result", Int),
            NodeKind::Min => binary_math(d("Min", C::Math, Pure, Ordinary)),
            NodeKind::Max => binary_math(d("Max", C::Math, Pure, Ordinary)),
            NodeKind::Clamp => d("Clamp", C::Math, Pure, Ordinary)
                .input_default("Value", Int, "0")
                .input_default("Min", Int, "0")
                .input_default("Max", Int, "100")
                .output("Result", Int),
            NodeKind::IntToFloat => d("Int To Float", C::Math, Pure, Ordinary)
                .input_default("Value", Int, "0")
                .output("Result", Float),
            NodeKind::FloatToInt => d("Float To Int", C::Math, Pure, Ordinary)
                .input_default("Value", Float, "0")
                .output("Result", Int),

            // ---- Logic ----
            NodeKind::And => binary_bool(d("And", C::Logic, Pure, Ordinary)),
            NodeKind::Or => binary_bool(d("Or", C::Logic, Pure, Ordinary)),
            NodeKind::Not => d("Not", C::Logic, Pure, Ordinary)
                .input_default("Value", Bool, "false")
                .output("Result", Bool),
            NodeKind::Equals => binary_any(d("Equals", C::Logic, Pure, Ordinary)),
            NodeKind::NotEquals => binary_any(d("Not Equals", C::Logic, Pure, Ordinary)),
            NodeKind::GreaterThan => binary_cmp(d("Greater Than", C::Logic, Pure, Ordinary)),
            NodeKind::LessThan => binary_cmp(d("Less Than", C::Logic, Pure, Ordinary)),
            NodeKind::Compare => binary_any(d("Compare", C::Logic, Pure, Ordinary)),

            // ---- Flow ----
            NodeKind::Branch => d("Branch", C::Flow, Stateful, Ordinary)
                .exec_in()
                .input_default("Condition", Bool, "false")
                .output("True", Exec)
                .output("False", Exec),
            NodeKind::Sequence => d("Sequence", C::Flow, Stateful, Ordinary)
                .exec_in()
                .output("Then 1", Exec)
                .output("Then 2", Exec)
                .output("Then 3", Exec)
                .output("Then 4", Exec),
            NodeKind::ForLoop => d("For Loop", C::Flow, Stateful, Ordinary)
                .exec_in()
                .input_default("Count", Int, "0")
                .output("Loop Body", Exec)
                .output("Index", Int)
                .output("Completed", Exec),
            NodeKind::WhileLoop => d("While Loop", C::Flow, Stateful, Ordinary)
                .exec_in()
                .input_default("Condition", Bool, "false")
                .output("Loop Body", Exec)
                .output("Completed", Exec),
            NodeKind::Wait => d("Wait", C::Flow, Stateful, Ordinary)
                .exec_in()
                .input_default("Ticks", Int, "1")
                .exec_out(),
            NodeKind::Gate => d("Gate", C::Flow, Stateful, Ordinary)
                .exec_in()
                .input("Open", Exec)
                .input("Close", Exec)
                .output("Out", Exec),
            NodeKind::Switch => d("Switch", C::Flow, Stateful, Ordinary)
                .exec_in()
                .input_default("Value", Int, "0")
                .output("Case 0", Exec)
                .output("Case 1", Exec)
                .output("Case 2", Exec)
                .output("Case 3", Exec)
                .output("Default", Exec),
            NodeKind::CallGraph => d("Call Graph", C::Flow, Stateful, Ordinary)
                .exec_in()
                .input("Graph", Str)
                .exec_out(),

            // ---- Map / procgen ----
            NodeKind::CreateMap => d("Create Map", C::Procgen, Effect, Ordinary)
                .exec_in()
                .input_default("Width", Int, "80")
                .input_default("Height", Int, "25")
                .exec_out()
                .output("Map", Map),
            NodeKind::GenerateCaveCellular => d("Generate Cave (Cellular)", C::Procgen, Effect, Ordinary)
                .exec_in()
                .input("Map", Map)
                .input_default("FillRatio", Float, "0.45")
                .input_default("Iterations", Int, "4")
                .exec_out()
                .output("Map", Map),
            NodeKind::GenerateBspRooms => d("Generate BSP Rooms", C::Procgen, Effect, Ordinary)
                .exec_in()
                .input("Map", Map)
                .input_default("MinRoomSize", Int, "4")
                .input_default("MaxRoomSize", Int, "10")
                .exec_out()
                .output("Map", Map),
            NodeKind::GenerateDrunkardWalk => d("Generate Drunkard Walk", C::Procgen, Effect, Ordinary)
                .exec_in()
                .input("Map", Map)
                .input_default("Steps", Int, "500")
                .exec_out()
                .output("Map", Map),
            NodeKind::FillRegion => d("Fill Region", C::Procgen, Effect, Ordinary)
                .exec_in()
                .input("Map", Map)
                .input_default("X", Int, "0")
                .input_default("Y", Int, "0")
                .input_default("Width", Int, "1")
                .input_default("Height", Int, "1")
                .input_default("Tile", Str, "Wall")
                .exec_out(),
            NodeKind::SetCell => d("Set Cell", C::Procgen, Effect, Ordinary)
                .exec_in()
                .input("Map", Map)
                .input("Cell", Cell)
                .input_default("Tile", Str, "Floor")
                .exec_out(),
            NodeKind::GetCell => d("Get Cell", C::Procgen, Pure, Ordinary)
                .input("Map", Map)
                .input("Cell", Cell)
                .output("Tile", Str),
            NodeKind::DefineRoomTemplate => d("Define Room Template", C::Procgen, Stateful, Ordinary)
                .exec_in()
                .input("Name", Str)
                .input("Layout", Str)
                .exec_out(),
            NodeKind::PlaceRoomTemplate => d("Place Room Template", C::Procgen, Effect, Ordinary)
                .exec_in()
                .input("Map", Map)
                .input("Name", Str)
                .input("Cell", Cell)
                .exec_out(),
            NodeKind::RenderMap => d("Render Map", C::Procgen, Effect, Ordinary)
                .exec_in()
                .input("Map", Map)
                .exec_out(),
            NodeKind::MapSize => d("Map Size", C::Procgen, Pure, Ordinary)
                .input("Map", Map)
                .output("Width", Int)
                .output("Height", Int),
            NodeKind::FindOpenCell => d("Find Open Cell", C::Procgen, Stateful, Ordinary)
                .input("Map", Map)
                .output("Cell", Cell)
                .output("Found", Bool),
            NodeKind::RunCustomProcgen => d("Run Custom Procgen", C::Procgen, Stateful, Ordinary)
                .exec_in()
                .input("Graph", Str)
                .exec_out()
                .output("Map", Map),
            NodeKind::CustomProcgenOutput => d("Custom Procgen Output", C::Procgen, Stateful, Ordinary)
                .exec_in()
                .input("Map", Map)
                .exec_out(),

            // ---- Entity ----
            NodeKind::DefineSprite => d("Define Sprite", C::Entity, Stateful, Ordinary)
                .exec_in()
                .input("Name", Str)
                .input_default("Glyph", Str, "@")
                .exec_out(),
            NodeKind::SpawnEntity => d("Spawn Entity", C::Entity, Effect, Ordinary)
                .exec_in()
                .input("Name", Str)
                .input("Sprite", Str)
                .input("Cell", Cell)
                .exec_out()
                .output("Entity", Entity),
            NodeKind::DestroyEntity => d("Destroy Entity", C::Entity, Effect, Ordinary)
                .exec_in()
                .input("Entity", Entity)
                .exec_out(),
            NodeKind::MoveEntity => d("Move Entity", C::Entity, Effect, Ordinary)
                .exec_in()
                .input("Entity", Entity)
                .input_default("Dx", Int, "0")
                .input_default("Dy", Int, "0")
                .exec_out()
                .output("Moved", Bool),
            NodeKind::TeleportEntity => d("Teleport Entity", C::Entity, Effect, Ordinary)
                .exec_in()
                .input("Entity", Entity)
                .input("Cell", Cell)
                .exec_out(),
            NodeKind::GetEntityCell => d("Get Entity Cell", C::Entity, Pure, Ordinary)
                .input("Entity", Entity)
                .output("Cell", Cell),
            NodeKind::EntityAtCell => d("Entity At Cell", C::Entity, Pure, Ordinary)
                .input("Cell", Cell)
                .output("Entity", Entity)
                .output("Found", Bool),
            NodeKind::GetPlayer => d("Get Player", C::Entity, Pure, Ordinary).output("Entity", Entity),
            NodeKind::SetEntitySprite => d("Set Entity Sprite", C::Entity, Effect, Ordinary)
                .exec_in()
                .input("Entity", Entity)
                .input("Sprite", Str)
                .exec_out(),
            NodeKind::GetEntityName => d("Get Entity Name", C::Entity, Pure, Ordinary)
                .input("Entity", Entity)
                .output("Name", Str),
            NodeKind::EntityExists => d("Entity Exists", C::Entity, Pure, Ordinary)
                .input("Entity", Entity)
                .output("Exists", Bool),

            // ---- UI ----
            NodeKind::PrintLog => d("Print Log", C::Ui, Effect, Ordinary)
                .exec_in()
                .input("Text", Str)
                .exec_out(),
            NodeKind::ShowMessage => d("Show Message", C::Ui, Effect, Ordinary)
                .exec_in()
                .input("Text", Str)
                .exec_out(),
            NodeKind::ShowChoice => d("Show Choice", C::Ui, Effect, Ordinary)
                .exec_in()
                .input("Options", Str)
                .exec_out()
                .output("Choice", Int),
            NodeKind::ClearLog => d("Clear Log", C::Ui, Effect, Ordinary).exec_in().exec_out(),
            NodeKind::SetStatusLine => d("Set Status Line", C::Ui, Effect, Ordinary)
                .exec_in()
                .input("Text", Str)
                .exec_out(),
            NodeKind::DrawText => d("Draw Text", C::Ui, Effect, Ordinary)
                .exec_in()
                .input("Map", Map)
                .input("Cell", Cell)
                .input("Text", Str)
                .exec_out(),

            // ---- Persistence ----
            NodeKind::SaveGame => d("Save Game", C::Persistence, Effect, Ordinary)
                .exec_in()
                .input_default("Slot", Str, "slot0")
                .exec_out(),
            NodeKind::LoadGame => d("Load Game", C::Persistence, Effect, Ordinary)
                .exec_in()
                .input_default("Slot", Str, "slot0")
                .exec_out(),
            NodeKind::StoreValue => d("Store Value", C::Persistence, Effect, Ordinary)
                .exec_in()
                .input("Key", Str)
                .input("Value", Str)
                .exec_out(),
            NodeKind::FetchValue => d("Fetch Value", C::Persistence, Pure, Ordinary)
                .input("Key", Str)
                .output("Value", Str)
                .output("Found", Bool),
            NodeKind::HasValue => d("Has Value", C::Persistence, Pure, Ordinary)
                .input("Key", Str)
                .output("Found", Bool),
            NodeKind::DeleteValue => d("Delete Value", C::Persistence, Effect, Ordinary)
                .exec_in()
                .input("Key", Str)
                .exec_out(),

            // ---- Dialogue ----
            NodeKind::StartDialogue => d("Start Dialogue", C::Dialogue, Effect, Ordinary)
                .exec_in()
                .input("Speaker", Str)
                .exec_out(),
            NodeKind::DialogueLine => d("Dialogue Line", C::Dialogue, Effect, Ordinary)
                .exec_in()
                .input("Text", Str)
                .exec_out(),
            NodeKind::DialogueChoice => d("Dialogue Choice", C::Dialogue, Effect, Ordinary)
                .exec_in()
                .input("Options", Str)
                .exec_out()
                .output("Choice", Int),
            NodeKind::AdvanceDialogue => d("Advance Dialogue", C::Dialogue, Effect, Ordinary)
                .exec_in()
                .exec_out()
                .output("Done", Bool),
            NodeKind::EndDialogue => d("End Dialogue", C::Dialogue, Effect, Ordinary)
                .exec_in()
                .exec_out(),
            NodeKind::IsDialogueActive => d("Is Dialogue Active", C::Dialogue, Pure, Ordinary)
                .output("Active", Bool)
                .output("Speaker", Str),

            // ---- Faction ----
            NodeKind::DefineFaction => d("Define Faction", C::Faction, Stateful, Ordinary)
                .exec_in()
                .input("Name", Str)
                .exec_out(),
            NodeKind::SetFactionRelation => d("Set Faction Relation", C::Faction, Stateful, Ordinary)
                .exec_in()
                .input("A", Str)
                .input("B", Str)
                .input_default("Relation", Int, "0")
                .exec_out(),
            NodeKind::GetFactionRelation => d("Get Faction Relation", C::Faction, Pure, Ordinary)
                .input("A", Str)
                .input("B", Str)
                .output("Relation", Int),
            NodeKind::AssignFaction => d("Assign Faction", C::Faction, Effect, Ordinary)
                .exec_in()
                .input("Entity", Entity)
                .input("Faction", Str)
                .exec_out(),
            NodeKind::GetEntityFaction => d("Get Entity Faction", C::Faction, Pure, Ordinary)
                .input("Entity", Entity)
                .output("Faction", Str),
            NodeKind::IsHostile => d("Is Hostile", C::Faction, Pure, Ordinary)
                .input("A", Entity)
                .input("B", Entity)
                .output("Hostile", Bool),

            // ---- Time ----
            NodeKind::GetTick => d("Get Tick", C::Time, Pure, Ordinary).output("Tick", Int),
            NodeKind::StartTimer => d("Start Timer", C::Time, Stateful, Ordinary)
                .exec_in()
                .input("Name", Str)
                .input_default("Ticks", Int, "10")
                .exec_out(),
            NodeKind::StopTimer => d("Stop Timer", C::Time, Stateful, Ordinary)
                .exec_in()
                .input("Name", Str)
                .exec_out(),
            NodeKind::GetTimeOfDay => d("Get Time Of Day", C::Time, Pure, Ordinary)
                .output("Hour", Int)
                .output("Minute", Int)
                .output("Label", Str),
            NodeKind::AdvanceTime => d("Advance Time", C::Time, Stateful, Ordinary)
                .exec_in()
                .input_default("Minutes", Int, "1")
                .exec_out(),

            // ---- Scene tree ----
            NodeKind::ChangeGraph => d("Change Graph", C::Scene, Effect, Ordinary)
                .exec_in()
                .input("Graph", Str)
                .exec_out(),
            NodeKind::GetSceneNode => d("Get Scene Node", C::Scene, Pure, Ordinary)
                .input("Path", Str)
                .output("Node", SceneNode)
                .output("Found", Bool),
            NodeKind::AddSceneNode => d("Add Scene Node", C::Scene, Effect, Ordinary)
                .exec_in()
                .input("Parent", SceneNode)
                .input("Name", Str)
                .exec_out()
                .output("Node", SceneNode),
            NodeKind::RemoveSceneNode => d("Remove Scene Node", C::Scene, Effect, Ordinary)
                .exec_in()
                .input("Node", SceneNode)
                .exec_out(),
            NodeKind::SetSceneNodeProperty => d("Set Scene Node Property", C::Scene, Effect, Ordinary)
                .exec_in()
                .input("Node", SceneNode)
                .input("Key", Str)
                .input("Value", Str)
                .exec_out(),
            NodeKind::GetSceneNodeProperty => d("Get Scene Node Property", C::Scene, Pure, Ordinary)
                .input("Node", SceneNode)
                .input("Key", Str)
                .output("Value", Str),

            // ---- Overworld ----
            NodeKind::CreateOverworld => d("Create Overworld", C::Overworld, Effect, Ordinary)
                .exec_in()
                .input("Name", Str)
                .exec_out()
                .output("Overworld", Overworld),
            NodeKind::EnterLocation => d("Enter Location", C::Overworld, Effect, Ordinary)
                .exec_in()
                .input("Name", Str)
                .exec_out()
                .output("Location", Location),
            NodeKind::LeaveLocation => d("Leave Location", C::Overworld, Effect, Ordinary)
                .exec_in()
                .exec_out(),
            NodeKind::CurrentLocation => d("Current Location", C::Overworld, Pure, Ordinary)
                .output("Location", Location)
                .output("Name", Str),

            // ---- Networking ----
            NodeKind::HostSession => d("Host Session", C::Network, Effect, Ordinary)
                .exec_in()
                .exec_out()
                .output("Session", Session)
                .output("Ok", Bool),
            NodeKind::JoinSession => d("Join Session", C::Network, Effect, Ordinary)
                .exec_in()
                .input("Address", Str)
                .exec_out()
                .output("Session", Session)
                .output("Ok", Bool),
            NodeKind::LeaveSession => d("Leave Session", C::Network, Effect, Ordinary)
                .exec_in()
                .exec_out(),
            NodeKind::SendMessage => d("Send Message", C::Network, Effect, Ordinary)
                .exec_in()
                .input("Peer", Str)
                .input("Type", Str)
                .input("Payload", Str)
                .exec_out()
                .output("Ok", Bool),
            NodeKind::BroadcastMessage => d("Broadcast Message", C::Network, Effect, Ordinary)
                .exec_in()
                .input("Type", Str)
                .input("Payload", Str)
                .exec_out()
                .output("Ok", Bool),
            NodeKind::IsHost => d("Is Host", C::Network, Pure, Ordinary).output("Host", Bool),
            NodeKind::PlayerCount => d("Player Count", C::Network, Pure, Ordinary).output("Count", Int),

            // ---- Battle ----
            NodeKind::StartBattle => d("Start Battle", C::Battle, Effect, Ordinary)
                .exec_in()
                .exec_out(),
            NodeKind::EndBattle => d("End Battle", C::Battle, Effect, Ordinary)
                .exec_in()
                .input("Winner", Entity)
                .exec_out(),
            NodeKind::RollDice => d("Roll Dice", C::Battle, Stateful, Ordinary)
                .input_default("Sides", Int, "6")
                .input_default("Count", Int, "1")
                .output("Total", Int),
            NodeKind::RollInitiative => d("Roll Initiative", C::Battle, Stateful, Ordinary)
                .exec_in()
                .exec_out()
                .output("First", Entity),
            NodeKind::DealDamage => d("Deal Damage", C::Battle, Effect, Ordinary)
                .exec_in()
                .input("Target", Entity)
                .input_default("Amount", Int, "1")
                .exec_out()
                .output("Killed", Bool),
            NodeKind::Heal => d("Heal", C::Battle, Effect, Ordinary)
                .exec_in()
                .input("Target", Entity)
                .input_default("Amount", Int, "1")
                .exec_out(),
            NodeKind::GetHealth => d("Get Health", C::Battle, Pure, Ordinary)
                .input("Entity", Entity)
                .output("Health", Int)
                .output("Max", Int),

            // ---- RPG ----
            NodeKind::AddItem => d("Add Item", C::Rpg, Effect, Ordinary)
                .exec_in()
                .input("Entity", Entity)
                .input("Item", Str)
                .input_default("Count", Int, "1")
                .exec_out(),
            NodeKind::RemoveItem => d("Remove Item", C::Rpg, Effect, Ordinary)
                .exec_in()
                .input("Entity", Entity)
                .input("Item", Str)
                .input_default("Count", Int, "1")
                .exec_out()
                .output("Removed", Bool),
            NodeKind::HasItem => d("Has Item", C::Rpg, Pure, Ordinary)
                .input("Entity", Entity)
                .input("Item", Str)
                .output("Has", Bool)
                .output("Count", Int),
            NodeKind::GetStat => d("Get Stat", C::Rpg, Pure, Ordinary)
                .input("Entity", Entity)
                .input("Stat", Str)
                .output("Value", Int),
            NodeKind::SetStat => d("Set Stat", C::Rpg, Effect, Ordinary)
                .exec_in()
                .input("Entity", Entity)
                .input("Stat", Str)
                .input_default("Value", Int, "0")
                .exec_out(),
        }
    }
}

fn binary_math(d: NodeDescriptor) -> NodeDescriptor {
    d.input_default("A", DataType::Int, "0")
        .input_default("B", DataType::Int, "0")
        .output("Result", DataType::Int)
}

fn binary_bool(d: NodeDescriptor) -> NodeDescriptor {
    d.input_default("A", DataType::Bool, "false")
        .input_default("B", DataType::Bool, "false")
        .output("Result", DataType::Bool)
}

fn binary_any(d: NodeDescriptor) -> NodeDescriptor {
    d.input("A", DataType::Any)
        .input("B", DataType::Any)
        .output("Result", DataType::Bool)
}

fn binary_cmp(d: NodeDescriptor) -> NodeDescriptor {
    d.input_default("A", DataType::Int, "0")
        .input_default("B", DataType::Int, "0")
        .output("Result", DataType::Bool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_is_closed_at_129_kinds() {
        assert_eq!(NodeKind::ALL.len(), 129);
        // No duplicates
        let mut seen = std::collections::HashSet::new();
        for kind in NodeKind::ALL {
            assert!(seen.insert(kind.tag()), "duplicate kind {kind:?}");
        }
    }

    #[test]
    fn descriptor_lookup_is_total() {
        for kind in NodeKind::ALL {
            let desc = kind.descriptor();
            assert_eq!(desc.kind, kind);
            assert!(!desc.name.is_empty());
        }
    }

    #[test]
    fn tags_round_trip() {
        for kind in NodeKind::ALL {
            assert_eq!(NodeKind::from_tag(&kind.tag()), Some(kind), "{kind:?}");
        }
        assert_eq!(NodeKind::from_tag("TotallyUnknown"), None);
    }

    #[test]
    fn exactly_two_entry_kinds() {
        let entries: Vec<_> = NodeKind::ALL
            .iter()
            .filter(|k| matches!(k.descriptor().role, Role::Entry))
            .collect();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn event_kinds_declare_no_inputs() {
        for kind in NodeKind::ALL {
            let desc = kind.descriptor();
            if let Role::Event(_) = desc.role {
                assert!(desc.inputs.is_empty(), "{kind:?} is an event source");
                assert_eq!(desc.outputs[0].data_type, DataType::Exec);
            }
        }
    }

    #[test]
    fn exec_never_appears_with_a_default() {
        for kind in NodeKind::ALL {
            let desc = kind.descriptor();
            for spec in desc.inputs.iter().chain(desc.outputs.iter()) {
                if spec.data_type == DataType::Exec {
                    assert!(spec.default.is_none(), "{kind:?}/{}", spec.name);
                }
            }
        }
    }
}
