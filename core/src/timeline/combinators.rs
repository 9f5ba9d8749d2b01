use core::fmt;
use std::collections::VecDeque;

use super::*;

/// Runs its steps one after another.
///
/// Every advance goes to the front step only, so a frame's delta is never split
/// across two steps and any overshoot is absorbed. An empty sequence is done,
/// and steps pushed after completion start on the next advance, which makes a
/// sequence usable as an append-only animation queue.
pub struct Sequence<C: ?Sized> {
    steps: VecDeque<BoxedTimeline<C>>,
}

impl<C: ?Sized> Sequence<C> {
    pub fn new() -> Self {
        Self {
            steps: VecDeque::new(),
        }
    }

    pub fn then(mut self, step: impl Timeline<C> + 'static) -> Self {
        self.push(step);
        self
    }

    pub fn push(&mut self, step: impl Timeline<C> + 'static) {
        self.steps.push_back(Box::new(step));
    }

    /// Drops the running step and everything queued behind it.
    pub fn clear(&mut self) {
        self.steps.clear();
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl<C: ?Sized> Default for Sequence<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ?Sized> fmt::Debug for Sequence<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequence")
            .field("pending", &self.steps.len())
            .finish()
    }
}

impl<C: ?Sized> Timeline<C> for Sequence<C> {
    fn advance(&mut self, cx: &mut C, delta_ms: f64) -> Progress {
        let Some(step) = self.steps.front_mut() else {
            return Progress::Done;
        };

        if step.advance(cx, delta_ms).is_done() {
            self.steps.pop_front();
        }
        Progress::from_done(self.steps.is_empty())
    }
}

/// Advances every unfinished member with the same delta, in insertion order.
/// Done once all members are done.
pub struct Parallel<C: ?Sized> {
    members: Vec<BoxedTimeline<C>>,
}

impl<C: ?Sized> Parallel<C> {
    pub fn new() -> Self {
        Self {
            members: Vec::new(),
        }
    }

    pub fn with(mut self, member: impl Timeline<C> + 'static) -> Self {
        self.push(member);
        self
    }

    pub fn push(&mut self, member: impl Timeline<C> + 'static) {
        self.members.push(Box::new(member));
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl<C: ?Sized> Default for Parallel<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ?Sized> fmt::Debug for Parallel<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parallel")
            .field("running", &self.members.len())
            .finish()
    }
}

impl<C: ?Sized> Timeline<C> for Parallel<C> {
    fn advance(&mut self, cx: &mut C, delta_ms: f64) -> Progress {
        self.members
            .retain_mut(|member| !member.advance(cx, delta_ms).is_done());
        Progress::from_done(self.members.is_empty())
    }
}

/// Runs `step` once `delay_ms` has passed.
pub fn delay<C: ?Sized + 'static>(delay_ms: f64, step: impl Timeline<C> + 'static) -> Sequence<C> {
    Sequence::new().then(Wait::new(delay_ms)).then(step)
}
