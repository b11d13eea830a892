use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::graph::{BehaviorGraph, Condition, StateId, Transition};
use crate::motion::Screen;
use crate::sprite::SpriteInstance;

/// Evaluates the current state's transitions once per tick.
///
/// Condition groups are checked in declaration order. The first group whose
/// condition holds and that has a selectable member picks one transition by
/// weight; later groups are not evaluated that tick.
#[derive(Debug, Clone)]
pub struct TransitionEngine {
    rng: StdRng,
}

impl TransitionEngine {
    /// Seeded engines are reproducible; `None` seeds from the OS.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { rng }
    }

    /// Run one transition step and return the state entered, if any.
    ///
    /// A pending click is taken at the start of the step and expires at the
    /// end of it whether or not an `onClick` group consumed it.
    pub fn step(
        &mut self,
        graph: &BehaviorGraph,
        sprite: &mut SpriteInstance,
        screen: Screen,
        now: Instant,
    ) -> Option<StateId> {
        let current = sprite.state?;
        let node = graph.state(current);
        let since_entry = sprite.since_entry(now);
        let mut clicked = sprite.clicks.take();

        for (group_idx, group) in node.groups.iter().enumerate() {
            let ctx = EvalContext {
                group: group_idx,
                screen,
                since_entry,
            };
            if !self.evaluate(group.condition, &ctx, sprite, &mut clicked) {
                continue;
            }
            let Some(picked) = select_weighted(&mut self.rng, &node.transitions, &group.members)
            else {
                continue;
            };

            let transition = &node.transitions[picked];
            let target = transition.target?;
            if target == current {
                return None;
            }
            tracing::debug!(
                from = %node.name,
                to = %transition.target_name,
                condition = transition.condition.name(),
                "transition fired"
            );
            sprite.enter(target, now);
            return Some(target);
        }

        None
    }

    fn evaluate(
        &mut self,
        condition: Condition,
        ctx: &EvalContext,
        sprite: &mut SpriteInstance,
        clicked: &mut bool,
    ) -> bool {
        match condition {
            Condition::AtEndOfScreen => {
                sprite.position.x.saturating_add(sprite.size.width) >= ctx.screen.width
            }
            Condition::AtStartOfScreen => sprite.position.x <= 0,
            Condition::SetInterval(interval) => ctx.since_entry >= interval,
            Condition::RandomInterval { min, max } => {
                let rng = &mut self.rng;
                let delay = *sprite
                    .random_delays
                    .entry(ctx.group)
                    .or_insert_with(|| sample_delay(rng, min, max));
                ctx.since_entry >= delay
            }
            Condition::OnClick => std::mem::take(clicked),
        }
    }
}

struct EvalContext {
    group: usize,
    screen: Screen,
    since_entry: Duration,
}

/// Uniform delay in `[min, max)` at millisecond resolution; `min` when the
/// range is empty.
fn sample_delay<R: Rng + ?Sized>(rng: &mut R, min: Duration, max: Duration) -> Duration {
    let lo = min.as_millis() as u64;
    let hi = max.as_millis() as u64;
    if hi <= lo {
        return min;
    }
    Duration::from_millis(rng.random_range(lo..hi))
}

/// Pick one of `members` with probability proportional to its weight.
///
/// Draws uniformly in `[0, total]` and walks members in declaration order,
/// returning the first whose cumulative weight reaches the draw. Inert and
/// zero-weight transitions are skipped entirely, so they are never picked.
/// Returns `None` when no member is selectable.
pub(crate) fn select_weighted<R: Rng + ?Sized>(
    rng: &mut R,
    transitions: &[Transition],
    members: &[usize],
) -> Option<usize> {
    let live = || {
        members
            .iter()
            .copied()
            .filter(|&i| transitions[i].is_live())
    };

    let total: f64 = live().map(|i| transitions[i].weight).sum();
    if !total.is_finite() || total <= 0.0 {
        return None;
    }

    let draw = rng.random_range(0.0..=total);
    let mut cumulative = 0.0;
    let mut last = None;
    for i in live() {
        cumulative += transitions[i].weight;
        last = Some(i);
        if cumulative >= draw {
            return Some(i);
        }
    }
    // Rounding left the draw just past the final boundary.
    last
}
