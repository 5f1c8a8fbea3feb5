use std::fmt;

use crate::{animation::ease::Ease, foundation::error::FlexResult};

/// Duration used when a tween does not specify one, in milliseconds.
pub const DEFAULT_DURATION_MS: f64 = 200.0;

/// Callback invoked with each interpolated value. Receives the driver's context.
pub type TweenCallback<C> = Box<dyn FnMut(&mut C, f64) -> FlexResult<()>>;

/// How a style change should be animated.
#[derive(Clone, Copy, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AnimationOptions {
    /// Duration in milliseconds; `None` uses the stage default.
    pub duration: Option<f64>,
    /// Curve; `None` uses [`Ease::default`].
    pub easing: Option<Ease>,
}

impl AnimationOptions {
    /// Options with an explicit duration.
    pub fn with_duration(ms: f64) -> Self {
        Self {
            duration: Some(ms),
            easing: None,
        }
    }
}

/// Endpoints and timing of one tween.
#[derive(Clone, Copy, Debug)]
pub struct TweenSpec {
    /// Value at progress 0.
    pub from: f64,
    /// Value delivered on completion.
    pub to: f64,
    /// Duration in milliseconds; `None` means [`DEFAULT_DURATION_MS`].
    pub duration: Option<f64>,
    /// Curve; `None` means [`Ease::default`].
    pub easing: Option<Ease>,
}

impl TweenSpec {
    /// Tween from `from` to `to` with default timing.
    pub fn new(from: f64, to: f64) -> Self {
        Self {
            from,
            to,
            duration: None,
            easing: None,
        }
    }

    /// Override the duration.
    pub fn duration(mut self, ms: f64) -> Self {
        self.duration = Some(ms);
        self
    }

    /// Override the easing curve.
    pub fn easing(mut self, ease: Ease) -> Self {
        self.easing = Some(ease);
        self
    }
}

struct Tween<C> {
    from: f64,
    to: f64,
    elapsed: f64,
    duration: f64,
    easing: Ease,
    callback: TweenCallback<C>,
}

impl<C> Tween<C> {
    fn value(&self) -> f64 {
        if self.elapsed >= self.duration {
            return self.to;
        }
        let p = self.easing.apply(self.elapsed / self.duration);
        self.from + (self.to - self.from) * p
    }
}

struct Entry<O, C> {
    owner: O,
    key: String,
    tween: Tween<C>,
}

/// Registry of named in-flight interpolations, at most one per `(owner, key)`.
///
/// Driven by an external caller through [`TweenRegistry::tick`]. Single-threaded: callbacks run on
/// the ticking thread and must only restart their own key.
pub struct TweenRegistry<O, C> {
    entries: Vec<Entry<O, C>>,
}

impl<O, C> Default for TweenRegistry<O, C> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<O, C> fmt::Debug for TweenRegistry<O, C>
where
    O: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|e| (&e.owner, &e.key, e.tween.elapsed)))
            .finish()
    }
}

impl<O, C> TweenRegistry<O, C>
where
    O: Copy + PartialEq + fmt::Debug,
{
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a tween, synchronously cancelling any existing one under `(owner, key)`.
    pub fn start<F>(&mut self, owner: O, key: impl Into<String>, spec: TweenSpec, callback: F)
    where
        F: FnMut(&mut C, f64) -> FlexResult<()> + 'static,
    {
        let key = key.into();
        self.cancel(owner, &key);
        let duration = spec.duration.unwrap_or(DEFAULT_DURATION_MS).max(0.0);
        tracing::trace!(?owner, %key, from = spec.from, to = spec.to, duration, "tween start");
        self.entries.push(Entry {
            owner,
            key,
            tween: Tween {
                from: spec.from,
                to: spec.to,
                elapsed: 0.0,
                duration,
                easing: spec.easing.unwrap_or_default(),
                callback: Box::new(callback),
            },
        });
    }

    /// Cancel the tween under `(owner, key)`. Returns `true` if one was removed.
    pub fn cancel(&mut self, owner: O, key: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| !(e.owner == owner && e.key == key));
        before != self.entries.len()
    }

    /// Cancel every tween belonging to `owner`. Returns how many were removed.
    pub fn cancel_owner(&mut self, owner: O) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.owner != owner);
        before - self.entries.len()
    }

    /// Return `true` while a tween under `(owner, key)` is in flight.
    pub fn is_active(&self, owner: O, key: &str) -> bool {
        self.entries
            .iter()
            .any(|e| e.owner == owner && e.key == key)
    }

    /// Current interpolated value under `(owner, key)`.
    pub fn value(&self, owner: O, key: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.owner == owner && e.key == key)
            .map(|e| e.tween.value())
    }

    /// Number of in-flight tweens.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return `true` when nothing is in flight.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Advance every tween by `dt` milliseconds and invoke its callback.
    ///
    /// A tween whose elapsed time reaches its duration delivers exactly `to` once and is removed.
    /// A failing callback cancels its tween; the first such error is returned after all tweens ran.
    pub fn tick(&mut self, ctx: &mut C, dt: f64) -> FlexResult<()> {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let mut first_err = None;
        let mut i = 0;
        while i < self.entries.len() {
            let entry = &mut self.entries[i];
            entry.tween.elapsed += dt;
            let done = entry.tween.elapsed >= entry.tween.duration;
            let value = entry.tween.value();

            if let Err(err) = (entry.tween.callback)(ctx, value) {
                tracing::warn!(owner = ?entry.owner, key = %entry.key, %err, "tween callback failed");
                first_err.get_or_insert(err);
                self.entries.remove(i);
                continue;
            }

            if done {
                self.entries.remove(i);
            } else {
                i += 1;
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    /// Move every entry of `other` into `self`, replacing entries with the same `(owner, key)`.
    pub(crate) fn absorb(&mut self, other: Self) {
        for entry in other.entries {
            self.cancel(entry.owner, &entry.key);
            self.entries.push(entry);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/tween.rs"]
mod tests;
