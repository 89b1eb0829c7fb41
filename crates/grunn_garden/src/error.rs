//! Configuration errors.
//!
//! Runtime invalid-state cases (trim на уже подстриженной траве, equip с занятыми
//! руками) ошибками НЕ являются - это silent no-op с outcome enum.
//! Здесь только то, что ломает конфигурацию сцены.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GardenError {
    #[error("layer '{0}' is not defined in the engine layer table")]
    LayerNotFound(String),

    #[error("layer '{name}' uses index {index}, engine supports 0..32")]
    LayerIndexOutOfRange { name: String, index: u8 },

    #[error("invalid trim range: min {min} must be <= max {max}")]
    InvalidTrimRange { min: f32, max: f32 },

    #[error("invalid trim step {0}: must be > 0")]
    InvalidTrimStep(f32),
}

pub type GardenResult<T> = Result<T, GardenError>;
