use std::path::PathBuf;

use headway::config::{
    ConfigFlags, PanelDimensions, load_config_flags, parse_flag_tokens, save_config_flags,
};

#[test]
fn test_config_file_parsing_ignores_comments_and_blank_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".headwayrc");
    let content = r"
# comment
--watch

--panel-width 60

--log-file=debug.log
";
    std::fs::write(&path, content).unwrap();

    let flags = load_config_flags(&path).unwrap();
    assert!(flags.watch);
    assert_eq!(flags.panel_width, Some(60));
    assert_eq!(flags.log_file, Some(PathBuf::from("debug.log")));
}

#[test]
fn test_cli_flags_override_file_flags() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".headwayrc");
    let content = "--watch\n--panel-width 40\n--panel-height 0.5\n";
    std::fs::write(&path, content).unwrap();

    let file_flags = load_config_flags(&path).unwrap();
    let cli_args = vec![
        "headway".to_string(),
        "--panel-width".to_string(),
        "70".to_string(),
        "--panel".to_string(),
    ];
    let cli_flags = parse_flag_tokens(&cli_args);
    let merged = file_flags.union(&cli_flags);

    assert!(merged.watch, "file flag survives");
    assert!(merged.panel, "cli flag applies");
    assert_eq!(merged.panel_width, Some(70), "cli value wins");
    assert_eq!(merged.panel_height, Some(0.5), "file value survives");
}

#[test]
fn test_missing_config_file_is_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("does-not-exist");
    let flags = load_config_flags(&path).unwrap();
    assert_eq!(flags, ConfigFlags::default());
}

#[test]
fn test_saved_flags_round_trip_into_panel_dimensions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config");
    let flags = ConfigFlags {
        panel_width: Some(999),
        panel_height: Some(0.75),
        ..ConfigFlags::default()
    };
    save_config_flags(&path, &flags).unwrap();

    let loaded = load_config_flags(&path).unwrap();
    let dims = PanelDimensions::from_settings(loaded.panel_width, loaded.panel_height);
    // Out-of-range width clamps; valid height passes through.
    assert_eq!(dims.width_cols, 120);
    assert_eq!(dims.max_height_fraction, 0.75);
}
