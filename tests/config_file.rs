//! Loading the shipped configuration file

use std::path::Path;

use arc_navigator::core::config::{MovementConfig, NavigatorConfig};
use arc_navigator::core::error::NavError;
use arc_navigator::core::types::Skill;

#[test]
fn test_shipped_config_loads() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/navigator.toml");
    let config = NavigatorConfig::load(&path).expect("Failed to load config/navigator.toml");

    // The shipped movement section mirrors the defaults
    assert_eq!(config.movement, MovementConfig::default());
    assert_eq!(config.agent.class, "paladin");
    assert!(!config.agent.interact_with_shrines);
    assert_eq!(config.agent.skills.teleport, Skill::Teleport);
    assert_eq!(config.agent.skills.assist[0].preferred, Skill::Vigor);
}

#[test]
fn test_missing_config_file_is_io_error() {
    let result = NavigatorConfig::load(Path::new("does/not/exist.toml"));
    assert!(matches!(result, Err(NavError::IoError(_))));
}

#[test]
fn test_malformed_config_is_toml_error() {
    let result = NavigatorConfig::from_toml_str("[movement\ndistance_to_finish = ");
    assert!(matches!(result, Err(NavError::TomlError(_))));
}
