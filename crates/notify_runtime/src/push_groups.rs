//! Broadcast group membership that waits for the push channel to become ready.

use std::collections::{BTreeSet, VecDeque};

#[derive(Debug, Clone, PartialEq, Eq)]
/// A group operation to run against the push channel.
pub enum GroupOp {
    /// Join a group.
    Join(String),
    /// Leave a group.
    Leave(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Tracks joined groups and buffers operations until the channel is ready.
pub struct GroupRegistry {
    ready: bool,
    joined: BTreeSet<String>,
    backlog: VecDeque<GroupOp>,
}

impl GroupRegistry {
    /// Creates a registry for a channel that is not ready yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests membership in `group`.
    ///
    /// Returns the operation to run now, or `None` when it was buffered or is redundant.
    pub fn join(&mut self, group: &str) -> Option<GroupOp> {
        let op = GroupOp::Join(group.to_string());
        if self.joined.contains(group) || self.backlog.contains(&op) {
            return None;
        }
        let leave = GroupOp::Leave(group.to_string());
        self.backlog.retain(|queued| queued != &leave);
        if !self.ready {
            self.backlog.push_back(op);
            return None;
        }
        self.joined.insert(group.to_string());
        Some(op)
    }

    /// Requests leaving `group`. A buffered join for the group is cancelled instead.
    pub fn leave(&mut self, group: &str) -> Option<GroupOp> {
        let join = GroupOp::Join(group.to_string());
        if let Some(index) = self.backlog.iter().position(|queued| queued == &join) {
            self.backlog.remove(index);
            return None;
        }
        if !self.joined.contains(group) {
            return None;
        }
        if !self.ready {
            let op = GroupOp::Leave(group.to_string());
            if !self.backlog.contains(&op) {
                self.backlog.push_back(op);
            }
            return None;
        }
        self.joined.remove(group);
        Some(GroupOp::Leave(group.to_string()))
    }

    /// Marks the channel ready and drains the backlog in request order.
    pub fn mark_ready(&mut self) -> Vec<GroupOp> {
        self.ready = true;
        let backlog: Vec<GroupOp> = self.backlog.drain(..).collect();
        for op in &backlog {
            match op {
                GroupOp::Join(group) => {
                    self.joined.insert(group.clone());
                }
                GroupOp::Leave(group) => {
                    self.joined.remove(group);
                }
            }
        }
        backlog
    }

    /// Forgets a membership after the channel rejected a join.
    pub fn forget(&mut self, group: &str) {
        self.joined.remove(group);
    }

    /// Returns whether the channel is ready.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Returns whether `group` is joined.
    pub fn is_joined(&self, group: &str) -> bool {
        self.joined.contains(group)
    }

    /// Returns the buffered operations.
    pub fn backlog(&self) -> Vec<GroupOp> {
        self.backlog.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn join(group: &str) -> GroupOp {
        GroupOp::Join(group.to_string())
    }

    #[test]
    fn operations_buffer_until_ready_and_drain_in_order() {
        let mut registry = GroupRegistry::new();
        assert_eq!(registry.join("alerts"), None);
        assert_eq!(registry.join("orders"), None);
        assert_eq!(registry.backlog(), vec![join("alerts"), join("orders")]);

        assert_eq!(registry.mark_ready(), vec![join("alerts"), join("orders")]);
        assert!(registry.is_joined("alerts"));
        assert!(registry.backlog().is_empty());
    }

    #[test]
    fn duplicate_joins_are_no_ops() {
        let mut registry = GroupRegistry::new();
        registry.join("alerts");
        registry.join("alerts");
        assert_eq!(registry.backlog().len(), 1);

        registry.mark_ready();
        assert_eq!(registry.join("alerts"), None);
    }

    #[test]
    fn leave_cancels_a_buffered_join() {
        let mut registry = GroupRegistry::new();
        registry.join("alerts");
        assert_eq!(registry.leave("alerts"), None);
        assert!(registry.mark_ready().is_empty());
        assert!(!registry.is_joined("alerts"));
    }

    #[test]
    fn ready_channels_run_operations_immediately() {
        let mut registry = GroupRegistry::new();
        registry.mark_ready();
        assert_eq!(registry.join("alerts"), Some(join("alerts")));
        assert_eq!(
            registry.leave("alerts"),
            Some(GroupOp::Leave("alerts".to_string()))
        );
        assert_eq!(registry.leave("alerts"), None);
    }
}
