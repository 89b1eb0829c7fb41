//! Trimmable компонент: трава, которая становится ниже при trim.
//!
//! # Lifecycle
//! - Spawn при загрузке уровня с `trim_level = max_level`
//! - Меняется ТОЛЬКО через `Trimmable::trim()` (+ transition, который он запускает)
//! - Никогда не "отрастает": trim_level монотонно не возрастает
//!
//! # Trim policies
//! - `Stepped`: каждый trim срезает фиксированный step (+ leaf particles)
//! - `OneShot`: один trim сразу до terminal height с перекраской

use bevy::prelude::*;

use crate::components::{Appearance, EffectHandle};
use crate::error::{GardenError, GardenResult};

/// Как trimmable вычисляет следующий уровень
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrimPolicy {
    /// `level - step` за вызов. `duration == 0` → мгновенно (non-blocking)
    Stepped { step: f32, duration: f32 },
    /// Один trim до `target_level`, tint плавно уходит в `trimmed_color`
    OneShot {
        target_level: f32,
        duration: f32,
        trimmed_color: Color,
    },
}

impl Default for TrimPolicy {
    fn default() -> Self {
        TrimPolicy::Stepped {
            step: 0.1,
            duration: 0.0,
        }
    }
}

impl TrimPolicy {
    fn duration(&self) -> f32 {
        match self {
            TrimPolicy::Stepped { duration, .. } | TrimPolicy::OneShot { duration, .. } => *duration,
        }
    }
}

/// Scoped visual transition, запущенный trim'ом (исполняет Transient Action Scheduler)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrimTransition {
    pub from_level: f32,
    pub to_level: f32,
    pub duration: f32,
    pub tint_to: Option<Color>,
}

/// Результат `trim()` - invalid-state случаи это НЕ ошибки
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrimOutcome {
    /// Уровень применён сразу
    Trimmed { from_level: f32, to_level: f32 },
    /// Запущен transition, trimmable busy до его завершения
    Started(TrimTransition),
    /// Transition уже идёт - вызов проигнорирован
    Busy,
    /// Уже подстрижено до минимума
    AlreadyTrimmed,
    /// Policy не срезает ничего (нулевой step) - уровень не тронут
    NoChange,
}

#[derive(Component, Debug, Clone)]
#[require(Transform, Appearance)]
pub struct Trimmable {
    trim_level: f32,
    min_level: f32,
    max_level: f32,
    busy: bool,
    pub policy: TrimPolicy,
    /// Leaf particles при stepped trim (None → эффект пропускается)
    pub leaf_particles: Option<EffectHandle>,
}

impl Default for Trimmable {
    fn default() -> Self {
        Self::stepped(1.0, 0.1, 0.1)
    }
}

impl Trimmable {
    pub fn try_new(min_level: f32, max_level: f32, policy: TrimPolicy) -> GardenResult<Self> {
        if !(min_level <= max_level) {
            return Err(GardenError::InvalidTrimRange {
                min: min_level,
                max: max_level,
            });
        }
        if let TrimPolicy::Stepped { step, .. } = policy {
            if !(step > 0.0) {
                return Err(GardenError::InvalidTrimStep(step));
            }
        }

        Ok(Self {
            trim_level: max_level,
            min_level,
            max_level,
            busy: false,
            policy,
            leaf_particles: None,
        })
    }

    /// Stepped trimmable (мгновенный step)
    pub fn stepped(max_level: f32, min_level: f32, step: f32) -> Self {
        Self {
            trim_level: max_level,
            min_level: min_level.min(max_level),
            max_level,
            busy: false,
            policy: TrimPolicy::Stepped { step, duration: 0.0 },
            leaf_particles: None,
        }
    }

    /// One-shot trimmable: terminal height = min_level
    pub fn one_shot(max_level: f32, target_level: f32, duration: f32, trimmed_color: Color) -> Self {
        let target_level = target_level.min(max_level);
        Self {
            trim_level: max_level,
            min_level: target_level,
            max_level,
            busy: false,
            policy: TrimPolicy::OneShot {
                target_level,
                duration,
                trimmed_color,
            },
            leaf_particles: None,
        }
    }

    pub fn with_leaf_particles(mut self, handle: impl Into<EffectHandle>) -> Self {
        self.leaf_particles = Some(handle.into());
        self
    }

    pub fn trim_level(&self) -> f32 {
        self.trim_level
    }

    pub fn min_level(&self) -> f32 {
        self.min_level
    }

    pub fn max_level(&self) -> f32 {
        self.max_level
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn is_fully_trimmed(&self) -> bool {
        self.trim_level <= self.min_level
    }

    /// Единственная мутирующая операция.
    ///
    /// # Flow
    /// 1. busy → no-op (`Busy`)
    /// 2. уже на минимуме → no-op (`AlreadyTrimmed`)
    /// 3. target из policy, clamp в [min_level, trim_level]; target не ниже
    ///    текущего → no-op (`NoChange`)
    /// 4. duration == 0 → применяем сразу, иначе busy + transition
    pub fn trim(&mut self) -> TrimOutcome {
        if self.busy {
            return TrimOutcome::Busy;
        }
        if self.is_fully_trimmed() {
            return TrimOutcome::AlreadyTrimmed;
        }

        let (target, tint_to) = match self.policy {
            TrimPolicy::Stepped { step, .. } => (self.trim_level - step.max(0.0), None),
            TrimPolicy::OneShot {
                target_level,
                trimmed_color,
                ..
            } => (target_level, Some(trimmed_color)),
        };
        let target = target.clamp(self.min_level, self.trim_level);
        if target >= self.trim_level {
            return TrimOutcome::NoChange;
        }
        let duration = self.policy.duration();

        if duration <= 0.0 {
            let from_level = self.trim_level;
            self.trim_level = target;
            return TrimOutcome::Trimmed {
                from_level,
                to_level: target,
            };
        }

        self.busy = true;
        TrimOutcome::Started(TrimTransition {
            from_level: self.trim_level,
            to_level: target,
            duration,
            tint_to,
        })
    }

    /// Промежуточный уровень от transition. Никогда не поднимает уровень.
    pub(crate) fn apply_transition_level(&mut self, level: f32) {
        self.trim_level = level.clamp(self.min_level, self.trim_level);
    }

    pub(crate) fn finish_transition(&mut self) {
        self.busy = false;
    }
}
