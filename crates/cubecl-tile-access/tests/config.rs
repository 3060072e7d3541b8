use std::sync::{Mutex, Once};

use cubecl_tile_access::{
    access::{Addressing, PredicatedTileAccessIterator, TileAccessConfig},
    config::{GlobalConfig, Logger, TileLogLevel, ValidationConfig},
    coords::{AdvanceRank, PitchLinearCoord, PitchLinearShape, TensorExtent},
    layout::PitchLinear,
    thread_map::PitchLinearStripminedThreadMap,
};
use serial_test::serial;

static INIT: Once = Once::new();

/// Collects warnings emitted through the `log` facade.
struct WarningCapture;

static WARNINGS: Mutex<Vec<String>> = Mutex::new(Vec::new());
static CAPTURE: WarningCapture = WarningCapture;

impl log::Log for WarningCapture {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::Level::Warn
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            WARNINGS.lock().unwrap().push(record.args().to_string());
        }
    }

    fn flush(&self) {}
}

fn take_warnings() -> Vec<String> {
    std::mem::take(&mut *WARNINGS.lock().unwrap())
}

fn init() {
    INIT.call_once(|| {
        log::set_logger(&CAPTURE).unwrap();
        log::set_max_level(log::LevelFilter::Warn);

        let mut config = GlobalConfig::default();
        config.logger.level = TileLogLevel::Full;
        config.validation.strict_tile_order = true;
        GlobalConfig::set(config);
    });
}

#[test]
#[serial]
fn global_config_drives_cached_switches() {
    init();

    assert_eq!(Logger::level(), TileLogLevel::Full);
    assert!(ValidationConfig::strict_tile_order());
}

#[test]
#[serial]
fn backward_tile_offset_is_flagged_but_still_applied() {
    init();

    let shape = PitchLinearShape::new(32, 8);
    let map = PitchLinearStripminedThreadMap::new(shape, 8, 4).unwrap();
    let config = TileAccessConfig::<f32, _>::new(shape, AdvanceRank::Strided, map, 4).unwrap();
    let params = PitchLinear::new(32).params(config.desc());

    let mut iter =
        PredicatedTileAccessIterator::at_origin(&config, params, 0, TensorExtent::new(32, 64), 0, Addressing::direct());
    take_warnings();

    iter.add_tile_offset(PitchLinearCoord::new(0, 3));
    iter.add_tile_offset(PitchLinearCoord::new(0, 1));
    assert_eq!(take_warnings(), Vec::<String>::new());
    assert_eq!(iter.coord(), PitchLinearCoord::new(0, 32));

    iter.add_tile_offset(PitchLinearCoord::new(0, -1));
    let warnings = take_warnings();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("does not move forward"), "{}", warnings[0]);

    assert_eq!(iter.coord(), PitchLinearCoord::new(0, 24));
    assert_eq!(iter.get(), Some(24 * 32 * 4));
}

#[test]
#[serial]
fn stationary_tile_offset_is_flagged() {
    init();

    let shape = PitchLinearShape::new(32, 8);
    let map = PitchLinearStripminedThreadMap::new(shape, 8, 4).unwrap();
    let config = TileAccessConfig::<f32, _>::new(shape, AdvanceRank::Strided, map, 4).unwrap();
    let params = PitchLinear::new(32).params(config.desc());

    let mut iter =
        PredicatedTileAccessIterator::at_origin(&config, params, 0, TensorExtent::new(32, 64), 0, Addressing::direct());
    iter.add_tile_offset(PitchLinearCoord::new(0, 1));
    take_warnings();

    // Moving along the other axis only leaves the advance rank where it was.
    iter.add_tile_offset(PitchLinearCoord::new(1, 0));
    assert_eq!(take_warnings().len(), 1);
}

#[test]
#[serial]
fn saved_config_parses_back() {
    init();

    let path = std::env::temp_dir().join("cubecl-tile-access-saved-config.toml");
    GlobalConfig::save_default(&path).unwrap();
    let content = std::fs::read_to_string(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    let parsed = GlobalConfig::from_toml_str(&content).unwrap();
    assert_eq!(parsed.logger.level, TileLogLevel::Full);
    assert!(parsed.validation.strict_tile_order);
}
