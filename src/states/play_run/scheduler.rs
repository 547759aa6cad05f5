//! Delayed Actions
//!
//! Fire-once-after-delay timers for the encounter loop: grace periods, the
//! post-split lineage check, draft resume, recovery advance, staggered arrows
//! and staggered warning circles.
//!
//! Due actions are drained at the start of each tick and re-emitted as
//! `TimerFired` events, in the order they were scheduled when due times tie.
//! Each consumer filters for its own variants and re-validates its target, so
//! an action whose phase or entity is gone becomes a no-op.

use bevy::prelude::*;

/// Work to perform once a delay elapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayedAction {
    /// End the spawn grace period of `phase`.
    EnableEnemies { phase: u32 },
    /// Count live splitting-boss tiers and signal defeat when none remain.
    CheckBossLineage { phase: u32 },
    /// Resume play after a draft selection in `phase`.
    ResumeAfterDraft { phase: u32 },
    /// Leave the recovery phase `phase`.
    AdvancePhase { phase: u32 },
    /// Next arrow of a multi-arrow volley.
    FireArrow { shooter: Entity },
    /// Next circle of a fury volley.
    PlaceWarningCircle { owner: Entity },
}

impl DelayedAction {
    /// The entity whose removal cancels this action, if any.
    pub fn owner(&self) -> Option<Entity> {
        match *self {
            DelayedAction::FireArrow { shooter } => Some(shooter),
            DelayedAction::PlaceWarningCircle { owner } => Some(owner),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    due: f32,
    seq: u64,
    action: DelayedAction,
}

/// Pending delayed actions, keyed on run-clock time.
#[derive(Resource, Debug, Default)]
pub struct DelayedActions {
    pending: Vec<Pending>,
    next_seq: u64,
}

impl DelayedActions {
    /// Schedule `action` to fire `delay` seconds after `now`.
    pub fn schedule(&mut self, now: f32, delay: f32, action: DelayedAction) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Pending {
            due: now + delay.max(0.0),
            seq,
            action,
        });
    }

    /// Remove and return every action due at `now`, earliest first.
    pub fn drain_due(&mut self, now: f32) -> Vec<DelayedAction> {
        let mut due: Vec<Pending> = Vec::new();
        self.pending.retain(|p| {
            if p.due <= now {
                due.push(*p);
                false
            } else {
                true
            }
        });
        due.sort_by(|a, b| a.due.total_cmp(&b.due).then(a.seq.cmp(&b.seq)));
        due.into_iter().map(|p| p.action).collect()
    }

    /// Drop every pending action owned by `entity`. Returns how many were dropped.
    pub fn cancel_owned_by(&mut self, entity: Entity) -> usize {
        let before = self.pending.len();
        self.pending.retain(|p| p.action.owner() != Some(entity));
        before - self.pending.len()
    }

    /// Drop every pending action that refers to some entity.
    pub fn cancel_entity_actions(&mut self) {
        self.pending.retain(|p| p.action.owner().is_none());
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn contains(&self, action: &DelayedAction) -> bool {
        self.pending.iter().any(|p| &p.action == action)
    }
}

/// A delayed action whose time has come.
#[derive(Event, Debug, Clone, Copy)]
pub struct TimerFired(pub DelayedAction);

/// Drain due actions into `TimerFired` events. Runs first every tick.
pub fn dispatch_delayed_actions(
    time: Res<Time>,
    mut actions: ResMut<DelayedActions>,
    mut fired: EventWriter<TimerFired>,
) {
    let now = time.elapsed_secs();
    for action in actions.drain_due(now) {
        fired.send(TimerFired(action));
    }
}
