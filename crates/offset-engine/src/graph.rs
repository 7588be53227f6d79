//! The event graph: name index, structural validation and ordering.
//!
//! Every event has at most one parent, so once validated the graph is a
//! forest. Each tree is a [`Component`]; walking a component front to back
//! visits parents strictly before their children.
//!
//! Validation runs in three passes over all nodes in insertion order
//! (events, then holidays) and returns the first problem found:
//!
//! 1. names: empty names, duplicates, event lengths below one day
//! 2. parents: every non-empty `parent_event` must name a known entry
//! 3. cycles: no entry may be its own ancestor

use std::collections::{HashMap, VecDeque};

use crate::error::{Result, ScheduleError};
use crate::event::Event;

pub type NodeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Event,
    Holiday,
}

#[derive(Debug, Clone)]
pub struct Node<'a> {
    pub event: &'a Event,
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    /// Children in insertion order.
    pub children: Vec<NodeId>,
}

impl Node<'_> {
    pub fn name(&self) -> &str {
        &self.event.name
    }

    pub fn is_holiday(&self) -> bool {
        self.kind == NodeKind::Holiday
    }
}

/// One tree of the forest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub root: NodeId,
    /// Breadth-first from `root`; parents always precede children.
    pub order: Vec<NodeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

#[derive(Debug)]
pub struct EventGraph<'a> {
    nodes: Vec<Node<'a>>,
    index: HashMap<&'a str, NodeId>,
}

impl<'a> EventGraph<'a> {
    /// Index and validate `events` and `holidays`.
    ///
    /// Holidays never have parents: their `parent_event` is ignored.
    ///
    /// # Errors
    ///
    /// [`ScheduleError::EmptyName`], [`ScheduleError::DuplicateName`],
    /// [`ScheduleError::InvalidLength`], [`ScheduleError::MissingParent`] or
    /// [`ScheduleError::CyclicDependency`].
    pub fn build(events: &'a [Event], holidays: &'a [Event]) -> Result<Self> {
        let mut nodes: Vec<Node<'a>> = events
            .iter()
            .map(|e| (e, NodeKind::Event))
            .chain(holidays.iter().map(|h| (h, NodeKind::Holiday)))
            .map(|(event, kind)| Node {
                event,
                kind,
                parent: None,
                children: Vec::new(),
            })
            .collect();

        let mut index = HashMap::with_capacity(nodes.len());
        for (id, node) in nodes.iter().enumerate() {
            let event: &'a Event = node.event;
            let name = event.name.as_str();
            if name.is_empty() {
                return Err(ScheduleError::EmptyName { index: id });
            }
            if index.insert(name, id).is_some() {
                return Err(ScheduleError::DuplicateName {
                    name: name.to_string(),
                });
            }
            if node.kind == NodeKind::Event && event.length < 1 {
                return Err(ScheduleError::InvalidLength {
                    event: name.to_string(),
                    length: event.length,
                });
            }
        }

        for id in 0..nodes.len() {
            let event = nodes[id].event;
            if nodes[id].kind == NodeKind::Holiday || !event.has_parent() {
                continue;
            }
            let parent = *index.get(event.parent_event.as_str()).ok_or_else(|| {
                ScheduleError::MissingParent {
                    event: event.name.clone(),
                    parent: event.parent_event.clone(),
                }
            })?;
            nodes[id].parent = Some(parent);
            nodes[parent].children.push(id);
        }

        let graph = Self { nodes, index };
        graph.check_cycles()?;
        Ok(graph)
    }

    fn check_cycles(&self) -> Result<()> {
        let mut marks = vec![Mark::Unvisited; self.nodes.len()];
        for start in 0..self.nodes.len() {
            let mut path: Vec<NodeId> = Vec::new();
            let mut current = start;
            loop {
                match marks[current] {
                    Mark::Done => break,
                    Mark::InProgress => {
                        let pos = path.iter().position(|&id| id == current).unwrap_or(0);
                        let cycle = path[pos..]
                            .iter()
                            .map(|&id| self.nodes[id].name().to_string())
                            .collect();
                        return Err(ScheduleError::CyclicDependency { cycle });
                    }
                    Mark::Unvisited => {
                        marks[current] = Mark::InProgress;
                        path.push(current);
                        match self.nodes[current].parent {
                            Some(parent) => current = parent,
                            None => break,
                        }
                    }
                }
            }
            for id in path {
                marks[id] = Mark::Done;
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<NodeId> {
        self.index.get(name).copied()
    }

    pub fn node(&self, id: NodeId) -> &Node<'a> {
        &self.nodes[id]
    }

    /// The parent chain of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = self.nodes[id].parent;
        while let Some(parent) = current {
            chain.push(parent);
            current = self.nodes[parent].parent;
        }
        chain
    }

    pub fn root_of(&self, id: NodeId) -> NodeId {
        self.ancestors(id).last().copied().unwrap_or(id)
    }

    /// The tree containing `id`.
    pub fn component_of(&self, id: NodeId) -> Component {
        self.component_from(self.root_of(id))
    }

    /// Every tree, ordered by the insertion position of its root.
    pub fn components(&self) -> Vec<Component> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.parent.is_none())
            .map(|(id, _)| self.component_from(id))
            .collect()
    }

    fn component_from(&self, root: NodeId) -> Component {
        let mut order = Vec::new();
        let mut queue = VecDeque::from([root]);
        while let Some(id) = queue.pop_front() {
            order.push(id);
            queue.extend(self.nodes[id].children.iter().copied());
        }
        Component { root, order }
    }
}
