use core::sync::atomic::{AtomicI8, Ordering};

use super::GlobalConfig;

/// Checks on caller-supplied traversal sequences.
#[derive(Default, Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ValidationConfig {
    /// Warn when a tile offset does not move forward along the advance rank.
    ///
    /// Steady-state predicates only check the axis that is not advanced, which is only
    /// sound when tiles are visited in increasing order.
    #[serde(default)]
    pub strict_tile_order: bool,
}

static STRICT_TILE_ORDER: AtomicI8 = AtomicI8::new(-1);

impl ValidationConfig {
    /// Whether strict tile ordering is enabled, cached after the first read.
    pub fn strict_tile_order() -> bool {
        match STRICT_TILE_ORDER.load(Ordering::Relaxed) {
            0 => false,
            1 => true,
            _ => {
                let strict = GlobalConfig::get().validation.strict_tile_order;
                STRICT_TILE_ORDER.store(strict as i8, Ordering::Relaxed);
                strict
            }
        }
    }
}
