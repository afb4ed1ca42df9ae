//! Connection graph queries.
//!
//! The graph is never stored: it is the flattening of every item's
//! outgoing connection list, so it can't drift from the items.

use crate::error::ConnectError;
use crate::id::{ConnectionId, ItemId};
use crate::model::{Connection, ConnectionType, Item};
use petgraph::graphmap::UnGraphMap;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, VecDeque};

/// Read-only view of the connections on a board.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionGraph<'a> {
    items: &'a [Item],
}

/// Aggregate connection statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionStats {
    pub total: usize,
    pub by_type: BTreeMap<ConnectionType, usize>,
    /// Degree (incoming + outgoing) of every item with a connection.
    pub by_item: BTreeMap<ItemId, usize>,
    /// Highest-degree items, in descending order.
    pub most_connected: Vec<(ItemId, usize)>,
    /// Mean degree over items with at least one connection.
    pub average_per_item: f64,
}

impl<'a> ConnectionGraph<'a> {
    pub fn new(items: &'a [Item]) -> Self {
        Self { items }
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Connection> + 'a {
        self.items.iter().flat_map(|item| item.connections.iter())
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    fn contains_item(&self, id: ItemId) -> bool {
        self.items.iter().any(|item| item.id == id)
    }

    /// Check that a connection `from → to` may be inserted.
    pub fn validate(&self, from: ItemId, to: ItemId) -> Result<(), ConnectError> {
        if from == to {
            return Err(ConnectError::SelfLoop(from));
        }
        for id in [from, to] {
            if !self.contains_item(id) {
                return Err(ConnectError::MissingEndpoint(id));
            }
        }
        Ok(())
    }

    pub fn by_id(&self, id: ConnectionId) -> Option<&'a Connection> {
        self.iter().find(|c| c.id == id)
    }

    /// Id of the item owning connection `id`.
    pub fn owner_of(&self, id: ConnectionId) -> Option<ItemId> {
        self.items
            .iter()
            .find(|item| item.connections.iter().any(|c| c.id == id))
            .map(|item| item.id)
    }

    /// Connections `from → to`, plus bidirectional ones stored `to → from`.
    pub fn between(&self, from: ItemId, to: ItemId) -> Vec<&'a Connection> {
        self.iter()
            .filter(|c| (c.from == from && c.to == to) || (c.bidirectional && c.from == to && c.to == from))
            .collect()
    }

    /// Any connection joining the two items, in either direction.
    pub fn linking(&self, a: ItemId, b: ItemId) -> Option<&'a Connection> {
        self.iter()
            .find(|c| (c.from == a && c.to == b) || (c.from == b && c.to == a))
    }

    /// Every connection with `id` as an endpoint.
    pub fn for_item(&self, id: ItemId) -> Vec<&'a Connection> {
        self.iter().filter(|c| c.touches(id)).collect()
    }

    pub fn count_for_item(&self, id: ItemId) -> usize {
        self.iter().filter(|c| c.touches(id)).count()
    }

    pub fn filter_by_types(&self, types: &[ConnectionType]) -> Vec<&'a Connection> {
        self.iter().filter(|c| types.contains(&c.kind)).collect()
    }

    /// Items at the other end of every connection touching `id`.
    pub fn neighbors(&self, id: ItemId) -> Vec<ItemId> {
        let mut out: Vec<ItemId> = Vec::new();
        for other in self.iter().filter_map(|c| c.other_end(id)) {
            if !out.contains(&other) {
                out.push(other);
            }
        }
        out
    }

    /// Undirected adjacency. Parallel connections collapse into one edge.
    pub fn adjacency(&self) -> UnGraphMap<ItemId, ConnectionId> {
        let mut graph = UnGraphMap::new();
        for c in self.iter() {
            graph.add_edge(c.from, c.to, c.id);
        }
        graph
    }

    /// Fewest-hop item sequence from `from` to `to`, both inclusive.
    ///
    /// Direction is ignored. Returns `[from]` when the ids are equal and an
    /// empty path when `to` is unreachable. Among equally short paths the
    /// one found first in connection order wins.
    pub fn shortest_path(&self, from: ItemId, to: ItemId) -> Vec<ItemId> {
        if from == to {
            return vec![from];
        }
        let graph = self.adjacency();
        if !graph.contains_node(from) || !graph.contains_node(to) {
            return Vec::new();
        }

        let mut parent: HashMap<ItemId, ItemId> = HashMap::new();
        let mut queue = VecDeque::from([from]);
        parent.insert(from, from);

        while let Some(node) = queue.pop_front() {
            if node == to {
                let mut path = vec![to];
                let mut cursor = to;
                while let Some(&prev) = parent.get(&cursor).filter(|_| cursor != from) {
                    path.push(prev);
                    cursor = prev;
                }
                path.reverse();
                return path;
            }
            for next in graph.neighbors(node) {
                if !parent.contains_key(&next) {
                    parent.insert(next, node);
                    queue.push_back(next);
                }
            }
        }
        Vec::new()
    }

    pub fn stats(&self, top_n: usize) -> ConnectionStats {
        let mut by_type = BTreeMap::new();
        let mut degrees: Vec<(ItemId, usize)> = Vec::new();
        let mut index: HashMap<ItemId, usize> = HashMap::new();
        let mut total = 0;

        for c in self.iter() {
            total += 1;
            *by_type.entry(c.kind).or_insert(0) += 1;
            for id in [c.from, c.to] {
                match index.get(&id) {
                    Some(&i) => degrees[i].1 += 1,
                    None => {
                        index.insert(id, degrees.len());
                        degrees.push((id, 1));
                    }
                }
            }
        }

        let average_per_item = if degrees.is_empty() {
            0.0
        } else {
            degrees.iter().map(|(_, d)| *d).sum::<usize>() as f64 / degrees.len() as f64
        };
        let by_item = degrees.iter().copied().collect();

        // Stable: ties keep first-seen order.
        let mut most_connected = degrees;
        most_connected.sort_by(|a, b| b.1.cmp(&a.1));
        most_connected.truncate(top_n);

        ConnectionStats {
            total,
            by_type,
            by_item,
            most_connected,
            average_per_item,
        }
    }
}
