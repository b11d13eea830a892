use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use serde_json::Value;

use crate::issue::{malformed, LoadIssue, LoadReport};
use crate::library::AnimationLibrary;
use crate::types::ClipId;

/// Upper bound on a transition weight. Keeps any group's weight sum finite.
const MAX_PROBABILITY: f64 = 1e12;

/// When a transition becomes eligible.
///
/// Condition names are validated when the graph is parsed; an unrecognized
/// name never reaches the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    /// The sprite's right edge touches or passes the screen's right edge.
    AtEndOfScreen,
    /// The sprite's left edge touches or passes the screen's left edge.
    AtStartOfScreen,
    /// A fixed time has passed since entering the state.
    SetInterval(Duration),
    /// A delay drawn uniformly from `[min, max)` once per state entry has passed.
    RandomInterval { min: Duration, max: Duration },
    /// The sprite was clicked since the previous tick.
    OnClick,
}

impl Condition {
    /// The descriptor spelling of this condition.
    pub fn name(&self) -> &'static str {
        match self {
            Condition::AtEndOfScreen => "atEndOfScreen",
            Condition::AtStartOfScreen => "atStartOfScreen",
            Condition::SetInterval(_) => "setInterval",
            Condition::RandomInterval { .. } => "randomInterval",
            Condition::OnClick => "onClick",
        }
    }

    /// Whether both conditions are the same kind, ignoring parameters.
    pub fn same_kind(&self, other: &Condition) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

/// Non-owning handle to a state in a [`BehaviorGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateId(pub(crate) usize);

/// A weighted, conditioned edge between two states.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// Resolved target, or `None` when the target state never loaded.
    pub target: Option<StateId>,
    /// Target name as written in the descriptor.
    pub target_name: String,
    pub condition: Condition,
    /// Relative selection weight; defaults to 1.0.
    pub weight: f64,
}

impl Transition {
    /// Whether this transition can ever be selected.
    pub fn is_live(&self) -> bool {
        self.target.is_some() && self.weight > 0.0
    }
}

/// Transitions of one state that share a condition kind, evaluated as one
/// unit.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionGroup {
    /// The first member's condition. Its parameters (interval bounds) are
    /// the ones evaluated for the whole group.
    pub condition: Condition,
    /// Indices into [`StateNode::transitions`], in declaration order.
    pub members: Vec<usize>,
}

/// A node of the behavior graph.
#[derive(Debug, Clone, PartialEq)]
pub struct StateNode {
    pub name: String,
    pub clip: ClipId,
    pub transitions: Vec<Transition>,
    /// Condition groups in order of first appearance.
    pub groups: Vec<ConditionGroup>,
}

/// The immutable state machine definition.
#[derive(Debug, Clone)]
pub struct BehaviorGraph {
    states: Vec<StateNode>,
    index: HashMap<String, StateId>,
}

#[derive(Debug, Deserialize)]
struct StateDescriptor {
    animation: String,
    #[serde(default)]
    transitions: Vec<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransitionDescriptor {
    to: String,
    condition: String,
    #[serde(default)]
    probability: Option<f64>,
    #[serde(default)]
    interval_min: Option<u64>,
    #[serde(default)]
    interval_max: Option<u64>,
    #[serde(default)]
    interval_set: Option<u64>,
}

/// A state that passed validation but whose transitions are not resolved yet.
struct PendingState {
    name: String,
    clip: ClipId,
    transitions: Vec<Value>,
}

impl BehaviorGraph {
    /// Load a behavior graph descriptor from disk.
    pub fn load(path: &Path, library: &AnimationLibrary) -> Result<(Self, LoadReport)> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read behavior graph {}", path.display()))?;
        Self::from_json_str(&raw, &path.display().to_string(), library)
    }

    /// Parse a behavior graph from JSON text.
    ///
    /// The first declared state becomes the initial state. States whose clip
    /// is not in `library` are dropped; transitions into dropped or unknown
    /// states are kept but never selected. Fails only when the document is
    /// not a JSON object or no state survives.
    pub fn from_json_str(
        json: &str,
        origin: &str,
        library: &AnimationLibrary,
    ) -> Result<(Self, LoadReport)> {
        let root: Value = serde_json::from_str(json)
            .with_context(|| format!("failed to parse behavior graph {origin}"))?;
        let Value::Object(entries) = root else {
            bail!("behavior graph {origin} must be a JSON object keyed by state name");
        };

        let mut report = LoadReport::default();
        let mut pending = Vec::with_capacity(entries.len());
        let first_declared = entries.keys().next().cloned();

        for (name, value) in entries {
            let location = format!("{origin} state \"{name}\"");
            let desc: StateDescriptor = match serde_json::from_value(value) {
                Ok(desc) => desc,
                Err(e) => {
                    report.record(malformed(location, e.to_string()));
                    continue;
                }
            };
            let Some(clip) = library.id_of(&desc.animation) else {
                report.record(LoadIssue::MissingClip {
                    state: name,
                    clip: desc.animation,
                });
                continue;
            };
            pending.push(PendingState {
                name,
                clip,
                transitions: desc.transitions,
            });
        }

        if pending.is_empty() {
            bail!("behavior graph {origin} has no usable states");
        }
        if first_declared.as_deref() != Some(pending[0].name.as_str()) {
            tracing::warn!(
                initial = %pending[0].name,
                "first declared state was skipped; starting in the next usable state"
            );
        }

        let index: HashMap<String, StateId> = pending
            .iter()
            .enumerate()
            .map(|(i, s)| (s.name.clone(), StateId(i)))
            .collect();

        let mut states = Vec::with_capacity(pending.len());
        for state in pending {
            let mut transitions = Vec::with_capacity(state.transitions.len());
            for (i, raw) in state.transitions.into_iter().enumerate() {
                let location = format!("{origin} state \"{}\" transition {i}", state.name);
                match parse_transition(raw, &state.name, &location, &index) {
                    Ok(transition) => {
                        if transition.target.is_none() {
                            report.record(LoadIssue::DanglingStateReference {
                                state: state.name.clone(),
                                to: transition.target_name.clone(),
                            });
                        }
                        transitions.push(transition);
                    }
                    Err(issue) => report.record(issue),
                }
            }

            report.loaded.push(state.name.clone());
            states.push(StateNode {
                groups: group_by_condition(&transitions),
                name: state.name,
                clip: state.clip,
                transitions,
            });
        }

        tracing::info!(
            origin,
            states = states.len(),
            skipped = report.issues.len(),
            "behavior graph loaded"
        );
        Ok((Self { states, index }, report))
    }

    /// The state the sprite starts in.
    pub fn initial(&self) -> StateId {
        StateId(0)
    }

    /// Resolve a handle issued by this graph.
    pub fn state(&self, id: StateId) -> &StateNode {
        &self.states[id.0]
    }

    pub fn id_of(&self, name: &str) -> Option<StateId> {
        self.index.get(name).copied()
    }

    /// State names in declaration order.
    pub fn names(&self) -> Vec<&str> {
        self.states.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

fn parse_transition(
    raw: Value,
    state: &str,
    location: &str,
    index: &HashMap<String, StateId>,
) -> Result<Transition, LoadIssue> {
    let desc: TransitionDescriptor =
        serde_json::from_value(raw).map_err(|e| malformed(location, e.to_string()))?;

    let condition = parse_condition(&desc, state, location)?;

    let weight = desc.probability.unwrap_or(1.0);
    if !weight.is_finite() || weight < 0.0 {
        return Err(malformed(
            location,
            format!("probability must be a finite non-negative number, got {weight}"),
        ));
    }
    if weight > MAX_PROBABILITY {
        return Err(malformed(
            location,
            format!("probability {weight} exceeds the maximum of {MAX_PROBABILITY}"),
        ));
    }

    Ok(Transition {
        target: index.get(&desc.to).copied(),
        target_name: desc.to,
        condition,
        weight,
    })
}

fn parse_condition(
    desc: &TransitionDescriptor,
    state: &str,
    location: &str,
) -> Result<Condition, LoadIssue> {
    match desc.condition.as_str() {
        "atEndOfScreen" => Ok(Condition::AtEndOfScreen),
        "atStartOfScreen" => Ok(Condition::AtStartOfScreen),
        "onClick" => Ok(Condition::OnClick),
        "setInterval" => {
            let ms = desc
                .interval_set
                .ok_or_else(|| malformed(location, "setInterval requires intervalSet"))?;
            Ok(Condition::SetInterval(Duration::from_millis(ms)))
        }
        "randomInterval" => {
            let (Some(min), Some(max)) = (desc.interval_min, desc.interval_max) else {
                return Err(malformed(
                    location,
                    "randomInterval requires intervalMin and intervalMax",
                ));
            };
            if min > max {
                return Err(malformed(
                    location,
                    format!("intervalMin ({min}) is greater than intervalMax ({max})"),
                ));
            }
            Ok(Condition::RandomInterval {
                min: Duration::from_millis(min),
                max: Duration::from_millis(max),
            })
        }
        other => Err(LoadIssue::UnknownCondition {
            state: state.to_string(),
            to: desc.to.clone(),
            condition: other.to_string(),
        }),
    }
}

fn group_by_condition(transitions: &[Transition]) -> Vec<ConditionGroup> {
    let mut groups: Vec<ConditionGroup> = Vec::new();
    for (i, t) in transitions.iter().enumerate() {
        match groups
            .iter_mut()
            .find(|g| g.condition.same_kind(&t.condition))
        {
            Some(group) => group.members.push(i),
            None => groups.push(ConditionGroup {
                condition: t.condition,
                members: vec![i],
            }),
        }
    }
    groups
}
