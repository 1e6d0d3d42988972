//! Per-corner toast layout: promotion, overflow queueing, overwrite-old, and re-flow.
//!
//! The stack never touches the surface. Each operation returns [`ToastCommand`]s that the runtime
//! applies to the [`notify_host::ToastSurface`] and uses to arm timers.

use std::collections::{BTreeMap, VecDeque};

use notify_host::{ToastId, ToastPosition};
use serde::{Deserialize, Serialize};

use crate::config::ToastConfig;
use crate::model::EntryId;

/// Vertical distance a hidden toast slides off-screen.
pub const TOAST_HIDE_OFFSET: i32 = 100;
/// Time allowed for the fade-out transition before a toast is detached.
pub const TOAST_SETTLE_MS: u32 = 400;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Lifecycle of a visible slot.
pub enum ToastPhase {
    /// On screen.
    Visible,
    /// Fading out; still occupies its slot until the settle window ends.
    Dismissing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Layout bookkeeping for one promoted toast.
pub struct ToastSlot {
    /// Toast id.
    pub id: ToastId,
    /// Queue entry that produced the toast.
    pub owner: Option<EntryId>,
    /// Height measured once at mount time.
    pub height: i32,
    /// Unsigned distance from the anchoring edge.
    pub offset: i32,
    /// Current phase.
    pub phase: ToastPhase,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// A mounted toast waiting for room in its corner.
pub struct PendingToast {
    /// Toast id.
    pub id: ToastId,
    /// Queue entry that produced the toast.
    pub owner: Option<EntryId>,
    /// Measured height.
    pub height: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Visible and pending toasts of one corner.
pub struct ToastLane {
    /// Visible slots in presentation order.
    pub visible: Vec<ToastSlot>,
    /// FIFO of toasts waiting for promotion.
    pub pending: VecDeque<PendingToast>,
}

impl ToastLane {
    fn next_offset(&self, spacing: i32) -> i32 {
        self.visible.iter().map(|slot| slot.height + spacing).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Surface instructions produced by [`ToastStack`].
pub enum ToastCommand {
    /// Move a visible toast to signed translate `y`.
    Place {
        /// Toast to move.
        id: ToastId,
        /// Signed translate (negative grows upward from bottom corners).
        y: i32,
    },
    /// Start the fade-out transition towards translate `y`.
    FadeOut {
        /// Toast to fade.
        id: ToastId,
        /// Off-screen translate.
        y: i32,
    },
    /// Remove the element.
    Detach {
        /// Toast to remove.
        id: ToastId,
    },
    /// A toast became visible.
    Promoted {
        /// Promoted toast.
        id: ToastId,
        /// Queue entry that produced it.
        owner: Option<EntryId>,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Toast layout state for every corner.
pub struct ToastStack {
    lanes: BTreeMap<ToastPosition, ToastLane>,
}

impl ToastStack {
    /// Creates an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Shows a freshly mounted toast, or queues it when its corner is full.
    ///
    /// With overwrite-old enabled a full corner force-hides its oldest visible toast, unless a slot
    /// that is already fading out will make room. The new toast stays pending until that slot is
    /// released by [`ToastStack::finish_hide`].
    pub fn present(
        &mut self,
        id: ToastId,
        owner: Option<EntryId>,
        height: i32,
        position: ToastPosition,
        config: &ToastConfig,
    ) -> Vec<ToastCommand> {
        let mut commands = Vec::new();
        let lane = self.lanes.entry(position).or_default();
        if config.stack_limit.allows(lane.visible.len()) {
            promote(lane, position, id, owner, height, config.spacing, &mut commands);
            return commands;
        }

        lane.pending.push_back(PendingToast { id, owner, height });
        // Every pending toast already has a fading slot waiting for it.
        let dismissing = lane
            .visible
            .iter()
            .filter(|slot| slot.phase == ToastPhase::Dismissing)
            .count();
        if config.overwrite_old && dismissing < lane.pending.len() {
            let oldest = lane
                .visible
                .iter()
                .find(|slot| slot.phase == ToastPhase::Visible)
                .map(|slot| slot.id);
            if let Some(oldest) = oldest {
                commands.extend(self.begin_hide(oldest));
            }
        }
        commands
    }

    /// Starts hiding a toast.
    ///
    /// Visible toasts fade out and keep their slot. Pending toasts are detached at once with no
    /// re-flow. Unknown or already dismissing toasts produce no commands.
    pub fn begin_hide(&mut self, id: ToastId) -> Vec<ToastCommand> {
        for (position, lane) in &mut self.lanes {
            if let Some(slot) = lane.visible.iter_mut().find(|slot| slot.id == id) {
                if slot.phase == ToastPhase::Dismissing {
                    return Vec::new();
                }
                slot.phase = ToastPhase::Dismissing;
                return vec![ToastCommand::FadeOut {
                    id,
                    y: hide_translate(*position),
                }];
            }
            if let Some(index) = lane.pending.iter().position(|pending| pending.id == id) {
                lane.pending.remove(index);
                return vec![ToastCommand::Detach { id }];
            }
        }
        Vec::new()
    }

    /// Releases a toast's slot after its fade-out: later slots slide back by the released height
    /// plus spacing, then pending toasts are promoted while the corner has room.
    pub fn finish_hide(&mut self, id: ToastId, config: &ToastConfig) -> Vec<ToastCommand> {
        let mut commands = Vec::new();
        let Some((position, index)) = self.locate_visible(id) else {
            return commands;
        };
        let Some(lane) = self.lanes.get_mut(&position) else {
            return commands;
        };

        let released = lane.visible.remove(index);
        let shift = released.height + config.spacing;
        for slot in lane.visible.iter_mut().skip(index) {
            slot.offset -= shift;
            if slot.phase == ToastPhase::Visible {
                commands.push(ToastCommand::Place {
                    id: slot.id,
                    y: signed(position, slot.offset),
                });
            }
        }
        commands.push(ToastCommand::Detach { id });

        while config.stack_limit.allows(lane.visible.len()) {
            let Some(next) = lane.pending.pop_front() else {
                break;
            };
            promote(
                lane,
                position,
                next.id,
                next.owner,
                next.height,
                config.spacing,
                &mut commands,
            );
        }
        commands
    }

    /// Returns the visible slots of a corner in presentation order.
    pub fn visible(&self, position: ToastPosition) -> &[ToastSlot] {
        self.lanes
            .get(&position)
            .map(|lane| lane.visible.as_slice())
            .unwrap_or_default()
    }

    /// Returns the pending toasts of a corner in promotion order.
    pub fn pending(&self, position: ToastPosition) -> Vec<ToastId> {
        self.lanes
            .get(&position)
            .map(|lane| lane.pending.iter().map(|pending| pending.id).collect())
            .unwrap_or_default()
    }

    /// Returns the visible slot for `id`.
    pub fn slot(&self, id: ToastId) -> Option<&ToastSlot> {
        self.lanes
            .values()
            .flat_map(|lane| lane.visible.iter())
            .find(|slot| slot.id == id)
    }

    /// Returns whether `id` is visible or pending anywhere.
    pub fn contains(&self, id: ToastId) -> bool {
        self.lanes.values().any(|lane| {
            lane.visible.iter().any(|slot| slot.id == id)
                || lane.pending.iter().any(|pending| pending.id == id)
        })
    }

    /// Returns every visible or pending toast produced by `owner`.
    pub fn toasts_for(&self, owner: EntryId) -> Vec<ToastId> {
        let mut ids = Vec::new();
        for lane in self.lanes.values() {
            ids.extend(
                lane.visible
                    .iter()
                    .filter(|slot| slot.owner == Some(owner))
                    .map(|slot| slot.id),
            );
            ids.extend(
                lane.pending
                    .iter()
                    .filter(|pending| pending.owner == Some(owner))
                    .map(|pending| pending.id),
            );
        }
        ids
    }

    /// Returns every visible slot across corners.
    pub fn all_visible(&self) -> Vec<ToastSlot> {
        self.lanes
            .values()
            .flat_map(|lane| lane.visible.iter().cloned())
            .collect()
    }

    /// Returns every pending toast across corners.
    pub fn all_pending(&self) -> Vec<ToastId> {
        self.lanes
            .values()
            .flat_map(|lane| lane.pending.iter().map(|pending| pending.id))
            .collect()
    }

    fn locate_visible(&self, id: ToastId) -> Option<(ToastPosition, usize)> {
        self.lanes.iter().find_map(|(position, lane)| {
            lane.visible
                .iter()
                .position(|slot| slot.id == id)
                .map(|index| (*position, index))
        })
    }
}

fn promote(
    lane: &mut ToastLane,
    position: ToastPosition,
    id: ToastId,
    owner: Option<EntryId>,
    height: i32,
    spacing: i32,
    commands: &mut Vec<ToastCommand>,
) {
    let offset = lane.next_offset(spacing);
    lane.visible.push(ToastSlot {
        id,
        owner,
        height,
        offset,
        phase: ToastPhase::Visible,
    });
    commands.push(ToastCommand::Place {
        id,
        y: signed(position, offset),
    });
    commands.push(ToastCommand::Promoted { id, owner });
}

fn signed(position: ToastPosition, offset: i32) -> i32 {
    if position.is_bottom() {
        -offset.abs()
    } else {
        offset
    }
}

/// Off-screen translate used while a toast in `position` fades out.
pub fn hide_translate(position: ToastPosition) -> i32 {
    if position.is_bottom() {
        TOAST_HIDE_OFFSET
    } else {
        -TOAST_HIDE_OFFSET
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::config::StackLimit;

    fn config(limit: i32, overwrite: bool) -> ToastConfig {
        ToastConfig {
            stack_limit: StackLimit::from(limit),
            overwrite_old: overwrite,
            ..ToastConfig::default()
        }
    }

    fn offsets(stack: &ToastStack, position: ToastPosition) -> Vec<i32> {
        stack.visible(position).iter().map(|slot| slot.offset).collect()
    }

    #[test]
    fn offsets_accumulate_height_plus_spacing() {
        let cfg = config(0, false);
        let mut stack = ToastStack::new();
        for (n, height) in [40, 50, 60].into_iter().enumerate() {
            stack.present(ToastId(n as u64), None, height, ToastPosition::TopRight, &cfg);
        }
        assert_eq!(offsets(&stack, ToastPosition::TopRight), vec![0, 42, 94]);
    }

    #[test]
    fn dismissing_first_toast_shifts_the_rest_by_its_height_and_spacing() {
        let cfg = config(0, false);
        let mut stack = ToastStack::new();
        for (n, height) in [40, 50, 60].into_iter().enumerate() {
            stack.present(ToastId(n as u64), None, height, ToastPosition::TopRight, &cfg);
        }

        assert_eq!(
            stack.begin_hide(ToastId(0)),
            vec![ToastCommand::FadeOut {
                id: ToastId(0),
                y: -TOAST_HIDE_OFFSET
            }]
        );
        let commands = stack.finish_hide(ToastId(0), &cfg);

        assert_eq!(offsets(&stack, ToastPosition::TopRight), vec![0, 52]);
        assert_eq!(
            commands,
            vec![
                ToastCommand::Place { id: ToastId(1), y: 0 },
                ToastCommand::Place { id: ToastId(2), y: 52 },
                ToastCommand::Detach { id: ToastId(0) },
            ]
        );
    }

    #[test]
    fn bottom_corners_grow_upward() {
        let cfg = config(0, false);
        let mut stack = ToastStack::new();
        stack.present(ToastId(1), None, 40, ToastPosition::BottomLeft, &cfg);
        let commands = stack.present(ToastId(2), None, 40, ToastPosition::BottomLeft, &cfg);
        assert_eq!(commands[0], ToastCommand::Place { id: ToastId(2), y: -42 });
        assert_eq!(
            stack.begin_hide(ToastId(1)),
            vec![ToastCommand::FadeOut {
                id: ToastId(1),
                y: TOAST_HIDE_OFFSET
            }]
        );
    }

    #[test]
    fn overflow_queues_and_promotes_on_dismiss() {
        let cfg = config(2, false);
        let mut stack = ToastStack::new();
        for n in 0..3 {
            stack.present(ToastId(n), None, 40, ToastPosition::TopRight, &cfg);
        }
        assert_eq!(stack.visible(ToastPosition::TopRight).len(), 2);
        assert_eq!(stack.pending(ToastPosition::TopRight), vec![ToastId(2)]);

        stack.begin_hide(ToastId(0));
        let commands = stack.finish_hide(ToastId(0), &cfg);

        assert_eq!(stack.visible(ToastPosition::TopRight).len(), 2);
        assert!(stack.pending(ToastPosition::TopRight).is_empty());
        assert!(commands.contains(&ToastCommand::Promoted {
            id: ToastId(2),
            owner: None
        }));
        assert_eq!(offsets(&stack, ToastPosition::TopRight), vec![0, 42]);
    }

    #[test]
    fn overwrite_old_force_hides_the_oldest_before_promoting() {
        let cfg = config(1, true);
        let mut stack = ToastStack::new();
        stack.present(ToastId(1), None, 40, ToastPosition::TopRight, &cfg);
        let commands = stack.present(ToastId(2), None, 40, ToastPosition::TopRight, &cfg);

        assert_eq!(
            commands,
            vec![ToastCommand::FadeOut {
                id: ToastId(1),
                y: -TOAST_HIDE_OFFSET
            }]
        );
        assert_eq!(
            stack.slot(ToastId(1)).map(|slot| slot.phase),
            Some(ToastPhase::Dismissing)
        );
        assert_eq!(stack.pending(ToastPosition::TopRight), vec![ToastId(2)]);

        stack.finish_hide(ToastId(1), &cfg);
        assert_eq!(
            stack.slot(ToastId(2)).map(|slot| (slot.offset, slot.phase)),
            Some((0, ToastPhase::Visible))
        );
    }

    #[test]
    fn overwrite_old_skips_toasts_already_dismissing() {
        let cfg = config(1, true);
        let mut stack = ToastStack::new();
        stack.present(ToastId(1), None, 40, ToastPosition::TopRight, &cfg);
        stack.present(ToastId(2), None, 40, ToastPosition::TopRight, &cfg);
        let commands = stack.present(ToastId(3), None, 40, ToastPosition::TopRight, &cfg);
        assert!(commands.is_empty());
        assert_eq!(
            stack.pending(ToastPosition::TopRight),
            vec![ToastId(2), ToastId(3)]
        );
    }

    #[test]
    fn overwrite_old_reuses_a_slot_that_is_already_fading() {
        let cfg = config(3, true);
        let mut stack = ToastStack::new();
        for n in 1..=3 {
            stack.present(ToastId(n), None, 40, ToastPosition::TopRight, &cfg);
        }
        stack.begin_hide(ToastId(1));

        let commands = stack.present(ToastId(4), None, 40, ToastPosition::TopRight, &cfg);
        assert!(commands.is_empty());
        assert_eq!(
            stack.slot(ToastId(2)).map(|slot| slot.phase),
            Some(ToastPhase::Visible)
        );

        stack.finish_hide(ToastId(1), &cfg);
        let visible: Vec<ToastId> = stack
            .visible(ToastPosition::TopRight)
            .iter()
            .map(|slot| slot.id)
            .collect();
        assert_eq!(visible, vec![ToastId(2), ToastId(3), ToastId(4)]);
        assert_eq!(offsets(&stack, ToastPosition::TopRight), vec![0, 42, 84]);
    }

    #[test]
    fn hiding_a_pending_toast_detaches_it_without_reflow() {
        let cfg = config(1, false);
        let mut stack = ToastStack::new();
        stack.present(ToastId(1), None, 40, ToastPosition::TopRight, &cfg);
        stack.present(ToastId(2), None, 40, ToastPosition::TopRight, &cfg);

        assert_eq!(
            stack.begin_hide(ToastId(2)),
            vec![ToastCommand::Detach { id: ToastId(2) }]
        );
        assert!(stack.pending(ToastPosition::TopRight).is_empty());
        assert_eq!(offsets(&stack, ToastPosition::TopRight), vec![0]);
    }

    #[test]
    fn hiding_twice_is_a_no_op() {
        let cfg = config(3, false);
        let mut stack = ToastStack::new();
        stack.present(ToastId(1), None, 40, ToastPosition::TopRight, &cfg);
        assert_eq!(stack.begin_hide(ToastId(1)).len(), 1);
        assert!(stack.begin_hide(ToastId(1)).is_empty());
        assert!(stack.begin_hide(ToastId(99)).is_empty());
    }

    #[test]
    fn corners_stack_independently() {
        let cfg = config(1, false);
        let mut stack = ToastStack::new();
        stack.present(ToastId(1), None, 40, ToastPosition::TopRight, &cfg);
        stack.present(ToastId(2), None, 40, ToastPosition::BottomLeft, &cfg);
        assert_eq!(stack.visible(ToastPosition::TopRight).len(), 1);
        assert_eq!(stack.visible(ToastPosition::BottomLeft).len(), 1);
        assert!(stack.all_pending().is_empty());
    }

    #[test]
    fn toasts_for_finds_visible_and_pending_toasts_of_an_owner() {
        let cfg = config(1, false);
        let mut stack = ToastStack::new();
        let owner = EntryId(7);
        stack.present(ToastId(1), Some(owner), 40, ToastPosition::TopRight, &cfg);
        stack.present(ToastId(2), None, 40, ToastPosition::TopRight, &cfg);
        stack.present(ToastId(3), Some(owner), 40, ToastPosition::TopRight, &cfg);
        assert_eq!(stack.toasts_for(owner), vec![ToastId(1), ToastId(3)]);
    }
}
