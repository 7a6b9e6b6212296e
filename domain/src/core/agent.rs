//! Agent identity and panel value objects

use crate::core::error::DomainError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Identity of an external agent (Value Object)
///
/// The name is opaque to the consortium: it is whatever the gateway uses to
/// route an invocation (a model id, a provider alias, a local command).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(String);

impl AgentId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AgentId {
    fn from(s: &str) -> Self {
        AgentId::new(s)
    }
}

impl From<String> for AgentId {
    fn from(s: String) -> Self {
        AgentId::new(s)
    }
}

impl Serialize for AgentId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for AgentId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(AgentId::new(s))
    }
}

/// One panel entry: an agent and how many independent instances to run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelEntry {
    pub agent: AgentId,
    pub instances: usize,
}

/// Ordered mapping of agent → instance count (Value Object)
///
/// Order matters: it is the submission order of every round, which keeps
/// downstream processing deterministic for a fixed input.
///
/// # Example
///
/// ```
/// use consortium_domain::AgentPanel;
///
/// let panel = AgentPanel::parse_specs(["gpt-4o:2", "claude"], 1);
/// assert_eq!(panel.total_instances(), 3);
/// assert_eq!(panel.instances_of(&"gpt-4o".into()), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentPanel {
    entries: Vec<PanelEntry>,
}

impl AgentPanel {
    /// Upper bound on instances of a single agent within one round
    pub const MAX_INSTANCES_PER_AGENT: usize = 100;

    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `name` / `name:count` specifiers.
    ///
    /// A missing or unparseable count uses `default_count`. A zero count is
    /// kept as-is. Repeating a name replaces the earlier count in place.
    pub fn parse_specs<I, S>(specs: I, default_count: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut panel = Self::new();
        for spec in specs {
            let spec = spec.as_ref().trim();
            if spec.is_empty() {
                continue;
            }
            let (name, count) = match spec.rsplit_once(':') {
                Some((name, count)) => (
                    name,
                    count.trim().parse::<usize>().unwrap_or(default_count),
                ),
                None => (spec, default_count),
            };
            panel.set(AgentId::new(name), count);
        }
        panel
    }

    /// Strict variant of [`parse_specs`](Self::parse_specs) used for
    /// user-facing input: empty names, unparseable counts and counts above
    /// [`MAX_INSTANCES_PER_AGENT`](Self::MAX_INSTANCES_PER_AGENT) are errors.
    pub fn try_parse_specs<I, S>(specs: I, default_count: usize) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut panel = Self::new();
        for spec in specs {
            let spec = spec.as_ref().trim();
            let (name, count) = match spec.rsplit_once(':') {
                Some((name, count)) => {
                    let count = count
                        .trim()
                        .parse::<usize>()
                        .map_err(|_| DomainError::InvalidAgentSpec(spec.to_string()))?;
                    (name, count)
                }
                None => (spec, default_count),
            };
            if name.trim().is_empty() || count > Self::MAX_INSTANCES_PER_AGENT {
                return Err(DomainError::InvalidAgentSpec(spec.to_string()));
            }
            panel.set(AgentId::new(name), count);
        }
        Ok(panel)
    }

    /// Insert or replace the instance count for an agent
    pub fn set(&mut self, agent: AgentId, instances: usize) {
        match self.entries.iter_mut().find(|e| e.agent == agent) {
            Some(entry) => entry.instances = instances,
            None => self.entries.push(PanelEntry { agent, instances }),
        }
    }

    pub fn with(mut self, agent: impl Into<AgentId>, instances: usize) -> Self {
        self.set(agent.into(), instances);
        self
    }

    pub fn entries(&self) -> &[PanelEntry] {
        &self.entries
    }

    /// Agents with at least one instance, in panel order
    pub fn agents(&self) -> impl Iterator<Item = &AgentId> {
        self.entries
            .iter()
            .filter(|e| e.instances > 0)
            .map(|e| &e.agent)
    }

    pub fn instances_of(&self, agent: &AgentId) -> usize {
        self.entries
            .iter()
            .find(|e| &e.agent == agent)
            .map(|e| e.instances)
            .unwrap_or(0)
    }

    /// Sum of all instance counts, saturating at `usize::MAX`
    pub fn total_instances(&self) -> usize {
        self.entries
            .iter()
            .try_fold(0usize, |total, e| total.checked_add(e.instances))
            .unwrap_or(usize::MAX)
    }

    /// Reject any agent whose count exceeds
    /// [`MAX_INSTANCES_PER_AGENT`](Self::MAX_INSTANCES_PER_AGENT)
    pub fn check_bounds(&self) -> Result<(), DomainError> {
        match self
            .entries
            .iter()
            .find(|e| e.instances > Self::MAX_INSTANCES_PER_AGENT)
        {
            Some(e) => Err(DomainError::InvalidAgentSpec(format!(
                "{}:{} (at most {} instances per agent)",
                e.agent,
                e.instances,
                Self::MAX_INSTANCES_PER_AGENT
            ))),
            None => Ok(()),
        }
    }

    /// True when no instance would run
    pub fn is_empty(&self) -> bool {
        self.total_instances() == 0
    }

    /// Restrict a selection to this panel.
    ///
    /// Agents not in `self` are dropped, counts are capped at the available
    /// count, and the result follows `self`'s order.
    pub fn restrict(&self, selection: &AgentPanel) -> AgentPanel {
        let entries = self
            .entries
            .iter()
            .filter_map(|available| {
                let wanted = selection.instances_of(&available.agent);
                let instances = wanted.min(available.instances);
                (instances > 0).then(|| PanelEntry {
                    agent: available.agent.clone(),
                    instances,
                })
            })
            .collect();
        AgentPanel { entries }
    }

    /// Expand into `(agent, instance index)` pairs in submission order
    pub fn slots(&self) -> Vec<(AgentId, usize)> {
        self.entries
            .iter()
            .flat_map(|e| (0..e.instances).map(move |i| (e.agent.clone(), i)))
            .collect()
    }

    /// Display names, one per agent with instances (`name` or `name:count`)
    pub fn labels(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.instances > 0)
            .map(|e| {
                if e.instances == 1 {
                    e.agent.to_string()
                } else {
                    format!("{}:{}", e.agent, e.instances)
                }
            })
            .collect()
    }
}

impl FromIterator<(AgentId, usize)> for AgentPanel {
    fn from_iter<T: IntoIterator<Item = (AgentId, usize)>>(iter: T) -> Self {
        let mut panel = AgentPanel::new();
        for (agent, instances) in iter {
            panel.set(agent, instances);
        }
        panel
    }
}
