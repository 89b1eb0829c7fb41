//! Transient Action Scheduler
//!
//! Короткие frame-by-frame анимации, которые должны завершиться до того,
//! как dispatcher примет новое действие.
//!
//! # Flow
//! 1. Dispatcher / trim вставляет `TransientAction` на анимируемый entity
//! 2. `advance_transient_actions` каждый frame: `elapsed += dt`, `t = elapsed / duration`
//! 3. Curve применяется к `HeldTool.action_offset`, `Trimmable` level + tint
//!    или rotation лезвия (`ShearsBlade`)
//! 4. `t >= 1` → финальное значение, component удаляется,
//!    `TransientActionFinished` для актора (снимает busy lock)
//!
//! Ничего не блокирует: каждый tick возвращает управление frame loop'у.

use bevy::prelude::*;

use serde::{Deserialize, Serialize};

use crate::components::{Appearance, HeldTool, ShearsBlade, TrimTransition, Trimmable};
use crate::effects::ToolCue;
use crate::logger::log;
use crate::GardenSet;

/// Что интерполируется
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActionCurve {
    /// Swing: offset туда (первая половина) и обратно (вторая)
    OffsetAndBack { offset: Vec3 },
    /// Trim transition: level + tint к целевым значениям
    ShrinkTo {
        from_level: f32,
        to_level: f32,
        tint: Option<(Color, Color)>,
    },
    /// Щелчок лезвий: open → closed за `close`, пауза `pause`,
    /// closed → open за `recover`
    SnapShut {
        open_angle: f32,
        closed_angle: f32,
        close: f32,
        pause: f32,
    },
}

/// Поведение при повторном старте во время анимации
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterruptPolicy {
    /// Новый старт игнорируется до завершения
    RunToCompletion,
    /// Новый старт сбрасывает elapsed в 0
    Restart,
}

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct TransientAction {
    pub curve: ActionCurve,
    pub elapsed: f32,
    pub duration: f32,
    pub policy: InterruptPolicy,
    /// Актор, чей busy lock снимается по завершении
    pub notify: Option<Entity>,
    /// Cue в момент раскрытия лезвий (SnapShut)
    pub reopen_cue: Option<ToolCue>,
}

impl TransientAction {
    /// Swing инструмента (каждая половина длится `half_duration`)
    pub fn swing(offset: Vec3, half_duration: f32, actor: Entity) -> Self {
        Self {
            curve: ActionCurve::OffsetAndBack { offset },
            elapsed: 0.0,
            duration: half_duration.max(0.0) * 2.0,
            policy: InterruptPolicy::RunToCompletion,
            notify: Some(actor),
            reopen_cue: None,
        }
    }

    /// Trim transition (`from_tint` - текущий tint травы, если есть Appearance)
    pub fn shrink(transition: TrimTransition, from_tint: Option<Color>) -> Self {
        let tint = match (from_tint, transition.tint_to) {
            (Some(from), Some(to)) => Some((from, to)),
            _ => None,
        };

        Self {
            curve: ActionCurve::ShrinkTo {
                from_level: transition.from_level,
                to_level: transition.to_level,
                tint,
            },
            elapsed: 0.0,
            duration: transition.duration.max(0.0),
            policy: InterruptPolicy::RunToCompletion,
            notify: None,
            reopen_cue: None,
        }
    }

    /// Щелчок лезвий. `timing` = [close, pause, recover] в секундах.
    pub fn blade_snap(open_angle: f32, closed_angle: f32, timing: [f32; 3]) -> Self {
        let [close, pause, recover] = timing.map(|seconds| seconds.max(0.0));
        Self {
            curve: ActionCurve::SnapShut {
                open_angle,
                closed_angle,
                close,
                pause,
            },
            elapsed: 0.0,
            duration: close + pause + recover,
            policy: InterruptPolicy::RunToCompletion,
            notify: None,
            reopen_cue: None,
        }
    }

    pub fn with_reopen_cue(mut self, cue: ToolCue) -> Self {
        self.reopen_cue = Some(cue);
        self
    }

    pub fn with_policy(mut self, policy: InterruptPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// t ∈ [0, 1]
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    pub fn is_finished(&self) -> bool {
        self.progress() >= 1.0
    }

    /// Advance на delta. Возвращает true, когда action завершён.
    pub fn tick(&mut self, delta: f32) -> bool {
        self.elapsed += delta.max(0.0);
        self.is_finished()
    }

    /// Повторный старт во время анимации (per-action policy)
    pub fn try_restart(&mut self) -> bool {
        match self.policy {
            InterruptPolicy::Restart => {
                self.elapsed = 0.0;
                true
            }
            InterruptPolicy::RunToCompletion => false,
        }
    }

    /// Swing offset в текущий момент (ZERO для других curves и по завершении)
    pub fn offset(&self) -> Vec3 {
        let ActionCurve::OffsetAndBack { offset } = self.curve else {
            return Vec3::ZERO;
        };

        let t = self.progress();
        if t >= 1.0 {
            Vec3::ZERO
        } else if t < 0.5 {
            Vec3::ZERO.lerp(offset, t * 2.0)
        } else {
            offset.lerp(Vec3::ZERO, (t - 0.5) * 2.0)
        }
    }

    /// Trim level в текущий момент (None для swing)
    pub fn level(&self) -> Option<f32> {
        let ActionCurve::ShrinkTo {
            from_level, to_level, ..
        } = self.curve
        else {
            return None;
        };
        let t = self.progress();
        if t >= 1.0 {
            return Some(to_level);
        }
        Some(from_level + (to_level - from_level) * t)
    }

    /// Угол лезвия в текущий момент (None для других curves)
    pub fn blade_angle(&self) -> Option<f32> {
        let ActionCurve::SnapShut {
            open_angle,
            closed_angle,
            close,
            pause,
        } = self.curve
        else {
            return None;
        };

        if self.is_finished() {
            return Some(open_angle);
        }

        let reopen_at = close + pause;
        let elapsed = self.elapsed;
        let angle = if elapsed < close {
            open_angle + (closed_angle - open_angle) * (elapsed / close)
        } else if elapsed < reopen_at {
            closed_angle
        } else {
            let recover = self.duration - reopen_at;
            closed_angle + (open_angle - closed_angle) * ((elapsed - reopen_at) / recover)
        };
        Some(angle)
    }

    /// Лезвия начали раскрываться между `before` и текущим elapsed
    pub fn reopened_since(&self, before: f32) -> bool {
        let ActionCurve::SnapShut { close, pause, .. } = self.curve else {
            return false;
        };
        let reopen_at = close + pause;
        before < reopen_at && self.elapsed >= reopen_at
    }

    pub fn tint(&self) -> Option<Color> {
        let ActionCurve::ShrinkTo { tint: Some((from, to)), .. } = self.curve else {
            return None;
        };
        let t = self.progress();
        let from = from.to_linear();
        let to = to.to_linear();
        Some(Color::LinearRgba(LinearRgba::new(
            from.red + (to.red - from.red) * t,
            from.green + (to.green - from.green) * t,
            from.blue + (to.blue - from.blue) * t,
            from.alpha + (to.alpha - from.alpha) * t,
        )))
    }
}

/// Событие: transient action завершён (dispatcher снимает busy lock)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransientActionFinished {
    pub actor: Entity,
    pub target: Entity,
}

/// Вставить action с учётом policy уже идущего.
///
/// Возвращает true, если action (пере)запущен.
pub fn start_transient(
    commands: &mut Commands,
    target: Entity,
    running: Option<&mut TransientAction>,
    action: TransientAction,
) -> bool {
    match running {
        Some(running) if !running.is_finished() => running.try_restart(),
        _ => {
            commands.entity(target).insert(action);
            true
        }
    }
}

/// Система: advance всех transient actions (один tick за frame)
pub fn advance_transient_actions(
    mut commands: Commands,
    time: Res<Time>,
    mut actions: Query<(
        Entity,
        &mut TransientAction,
        Option<&mut HeldTool>,
        Option<&mut Trimmable>,
        Option<&mut Appearance>,
        Option<(&ShearsBlade, &mut Transform)>,
    )>,
    mut finished_events: EventWriter<TransientActionFinished>,
    mut cues: EventWriter<ToolCue>,
) {
    let delta = time.delta_secs();
    // Оба лезвия несут один и тот же cue: один звук на инструмент
    let mut reopened: Vec<ToolCue> = Vec::new();

    for (entity, mut action, held, trimmable, appearance, blade) in actions.iter_mut() {
        let before = action.elapsed;
        let finished = action.tick(delta);

        if let (Some((blade, mut transform)), Some(angle)) = (blade, action.blade_angle()) {
            transform.rotation = blade.rotation(angle);
        }

        if let Some(cue) = action.reopen_cue.filter(|_| action.reopened_since(before)) {
            if !reopened.contains(&cue) {
                reopened.push(cue);
                cues.write(cue);
            }
        }

        if let Some(mut held) = held {
            if matches!(action.curve, ActionCurve::OffsetAndBack { .. }) {
                held.action_offset = action.offset();
            }
        }

        if let (Some(mut trimmable), Some(level)) = (trimmable, action.level()) {
            trimmable.apply_transition_level(level);
            if finished {
                trimmable.finish_transition();
            }
        }

        if let (Some(mut appearance), Some(tint)) = (appearance, action.tint()) {
            appearance.tint = tint;
        }

        if !finished {
            continue;
        }

        commands.entity(entity).remove::<TransientAction>();
        if let Some(actor) = action.notify {
            finished_events.write(TransientActionFinished { actor, target: entity });
        }
        log(&format!("✅ Transient action finished (entity: {:?})", entity));
    }
}

pub struct TransientPlugin;

impl Plugin for TransientPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<TransientActionFinished>()
            .add_systems(Update, advance_transient_actions.in_set(GardenSet::Animate));
    }
}
