use super::template::generate_settings;
use super::*;

#[test]
fn default_settings_have_expected_values() {
    let settings = Settings::default();

    assert_eq!(settings.cpu_threshold, 99);
    assert_eq!(settings.size, 120);
    assert_eq!(settings.sample_interval(), Duration::from_millis(2500));
    assert_eq!(settings.echo_delay(), Duration::from_millis(500));
    assert_eq!(settings.scan.min_cpu_time(), Duration::from_secs(3));
    assert_eq!(settings.scan.sample_spacing(), Duration::from_millis(1));
    assert!(settings.position.is_none());
}

#[test]
fn partial_file_keeps_other_defaults() {
    let settings: Settings = toml::from_str("cpu_threshold = 75\n[position]\nx = 10\ny = 20\n").unwrap();

    assert_eq!(settings.cpu_threshold, 75);
    assert_eq!(settings.position, Some(Position { x: 10, y: 20 }));
    assert_eq!(settings.size, 120);
    assert_eq!(settings.theme, ThemeConfig::default());
}

#[test]
fn validate_clamps_out_of_range_values() {
    let mut settings = Settings {
        cpu_threshold: 250,
        size: 5,
        sample_interval_ms: 10,
        echo_delay_ms: 9_000,
        scan: ScanConfig {
            min_cpu_time_secs: 3,
            sample_spacing_ms: 0,
        },
        ..Default::default()
    };

    settings.validate();

    assert_eq!(settings.cpu_threshold, 100);
    assert_eq!(settings.size, 48);
    assert_eq!(settings.sample_interval_ms, 250);
    assert_eq!(settings.echo_delay_ms, 250);
    assert_eq!(settings.scan.sample_spacing_ms, 1);
}

#[test]
fn zero_threshold_survives_validation() {
    let mut settings = Settings {
        cpu_threshold: 0,
        ..Default::default()
    };

    settings.validate();

    assert_eq!(settings.cpu_threshold, 0);
}

#[test]
fn save_then_load_keeps_position() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("settings.toml");
    let settings = Settings {
        position: Some(Position { x: -300, y: 42 }),
        cpu_threshold: 80,
        ..Default::default()
    };

    // Act
    save_to(&settings, &path).unwrap();
    let loaded = load_from(&path).unwrap();

    // Assert
    assert_eq!(loaded, settings);
}

#[test]
fn template_parses_as_valid_settings() {
    // Arrange
    let toml_str = generate_settings();

    // Act
    let result: Result<Settings, _> = toml::from_str(&toml_str);

    // Assert
    assert!(result.is_ok(), "settings template is not valid TOML: {result:?}");
}

#[test]
fn template_matches_default_values() {
    // Arrange
    let toml_str = generate_settings();

    // Act
    let mut settings: Settings = toml::from_str(&toml_str).unwrap();
    settings.validate();

    // Assert
    assert_eq!(settings, Settings::default());
}
