//! Layer filtering: семантические слои поверх engine layer indices.
//!
//! ## Архитектура:
//! - **NodeLayer** (component): engine layer index ноды (0-31), как в host engine
//! - **LayerMask**: битовая маска для raycast/overlap фильтрации
//! - **SemanticLayer**: typed категории (Tool, Trimmable, Ground, IgnoreRay)
//! - **LayerRegistry** (resource): SemanticLayer → index, резолвится один раз
//!
//! ## Использование:
//! ```ignore
//! let registry = LayerRegistry::resolve(&config.layers)?;
//! commands.spawn((tool, registry.node_layer(SemanticLayer::Tool)));
//! let mask = registry.mask(&[SemanticLayer::Tool]);
//! ```

use bevy::prelude::*;

use crate::config::LayerConfig;
use crate::error::{GardenError, GardenResult};
use crate::logger::log_error;

/// Engine layer index ноды (Spatial Node layer membership)
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
#[reflect(Component)]
pub struct NodeLayer(pub u8);

/// Битовая маска слоёв (bit N = engine layer N)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: LayerMask = LayerMask(0);
    pub const ALL: LayerMask = LayerMask(u32::MAX);

    pub fn contains(self, layer: NodeLayer) -> bool {
        layer.0 < 32 && (self.0 & (1 << layer.0)) != 0
    }

    pub fn with(self, layer: NodeLayer) -> Self {
        if layer.0 >= 32 {
            return self;
        }
        LayerMask(self.0 | (1 << layer.0))
    }

    /// Маска "всё кроме" (для aim ray: всё кроме IgnoreRay)
    pub fn without(self, layer: NodeLayer) -> Self {
        if layer.0 >= 32 {
            return self;
        }
        LayerMask(self.0 & !(1 << layer.0))
    }
}

/// Семантические категории слоёв
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum SemanticLayer {
    Default,
    /// Подбираемые инструменты (engine "Interactable")
    Tool,
    /// Трава / trimmable объекты
    Trimmable,
    Ground,
    /// Held tool - не должен перекрывать aim ray
    IgnoreRay,
}

impl SemanticLayer {
    pub const ALL: [SemanticLayer; 5] = [
        SemanticLayer::Default,
        SemanticLayer::Tool,
        SemanticLayer::Trimmable,
        SemanticLayer::Ground,
        SemanticLayer::IgnoreRay,
    ];

    fn slot(self) -> usize {
        match self {
            SemanticLayer::Default => 0,
            SemanticLayer::Tool => 1,
            SemanticLayer::Trimmable => 2,
            SemanticLayer::Ground => 3,
            SemanticLayer::IgnoreRay => 4,
        }
    }

    fn configured_name(self, config: &LayerConfig) -> &str {
        match self {
            SemanticLayer::Default => &config.default_layer,
            SemanticLayer::Tool => &config.tool_layer,
            SemanticLayer::Trimmable => &config.trimmable_layer,
            SemanticLayer::Ground => &config.ground_layer,
            SemanticLayer::IgnoreRay => &config.ignore_ray_layer,
        }
    }
}

/// Resolved layer table (resource)
///
/// Создаётся при build `GardenPlugin`. Если какой-то слой не найден -
/// resource НЕ вставляется, layer-зависимые операции логируют ошибку и abort.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct LayerRegistry {
    indices: [u8; 5],
}

impl LayerRegistry {
    /// Name → index lookup (единственное место, где слои ищутся по имени)
    pub fn resolve(config: &LayerConfig) -> GardenResult<Self> {
        let mut indices = [0u8; 5];

        for layer in SemanticLayer::ALL {
            let name = layer.configured_name(config);
            let Some(&index) = config.engine_layers.get(name) else {
                return Err(GardenError::LayerNotFound(name.to_string()));
            };
            if index >= 32 {
                return Err(GardenError::LayerIndexOutOfRange {
                    name: name.to_string(),
                    index,
                });
            }
            indices[layer.slot()] = index;
        }

        Ok(Self { indices })
    }

    pub fn node_layer(&self, layer: SemanticLayer) -> NodeLayer {
        NodeLayer(self.indices[layer.slot()])
    }

    pub fn mask(&self, layers: &[SemanticLayer]) -> LayerMask {
        layers
            .iter()
            .fold(LayerMask::NONE, |mask, layer| mask.with(self.node_layer(*layer)))
    }

    /// Aim mask: всё, кроме IgnoreRay (held tool не перекрывает луч)
    pub fn aim_mask(&self) -> LayerMask {
        LayerMask::ALL.without(self.node_layer(SemanticLayer::IgnoreRay))
    }

    pub fn semantic_of(&self, layer: NodeLayer) -> Option<SemanticLayer> {
        SemanticLayer::ALL
            .into_iter()
            .find(|semantic| self.node_layer(*semantic) == layer)
    }
}

/// Registry для layer-зависимой операции.
///
/// Нет registry (слои не резолвятся) → configuration error в лог, операция abort.
pub fn require_registry<'a>(
    registry: Option<&'a LayerRegistry>,
    config: &LayerConfig,
    operation: &str,
) -> Option<&'a LayerRegistry> {
    if registry.is_none() {
        let reason = match LayerRegistry::resolve(config) {
            Err(err) => err.to_string(),
            Ok(_) => "layer registry not initialized".to_string(),
        };
        log_error(&format!("❌ {} aborted: {}", operation, reason));
    }
    registry
}
