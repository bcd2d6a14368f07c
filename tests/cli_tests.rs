#[cfg(test)]
mod tests {
    use clap::Parser;
    use metrodeck::config::AppConfig;
    use metrodeck::*;
    use std::io::Write;

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["metrodeck"]);
        assert_eq!(args.bpm, None);
        assert_eq!(args.midi_output, None);
        assert!(!args.list_midi_outputs);
    }

    #[test]
    fn test_args_with_overrides() {
        let args = Args::parse_from([
            "metrodeck",
            "--bpm",
            "96",
            "--beats",
            "3",
            "--accent",
            "first",
            "--panel",
            "keypad",
            "--midi-output",
            "IAC Driver",
        ]);
        assert_eq!(args.bpm, Some(96));
        assert_eq!(args.beats, Some(3));
        assert_eq!(args.accent.as_deref(), Some("first"));
        assert_eq!(args.panel.as_deref(), Some("keypad"));
        assert_eq!(args.midi_output.as_deref(), Some("IAC Driver"));
    }

    #[test]
    fn test_config_from_command_line() {
        let args = Args::parse_from([
            "metrodeck",
            "--bpm",
            "300",
            "--accent",
            "odd",
            "--panel",
            "keypad",
            "--settings-file",
            "/tmp/metrodeck-test/settings.json",
        ]);
        let config = AppConfig::load(&args).unwrap();
        assert_eq!(config.bpm, 300);
        assert_eq!(config.accent, AccentPattern::Odd);
        assert_eq!(config.panel, ControllerKind::Keypad);
        assert_eq!(
            config.settings_path(),
            Some("/tmp/metrodeck-test/settings.json".into())
        );

        // Out of range values are clamped when they reach the tempo state.
        let state = config.initial_state();
        assert_eq!(state.bpm(), 280);
        assert_eq!(state.accent_pattern(), AccentPattern::Odd);
    }

    #[test]
    fn test_config_file_is_read() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "beats_per_measure = 7\naccent_note = 60\nlog_level = \"info\"").unwrap();

        let args = Args {
            config: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        let config = AppConfig::load(&args).unwrap();
        assert_eq!(config.beats_per_measure, 7);
        assert_eq!(config.click_notes().accent, 60);
        assert_eq!(config.click_notes().regular, 77);
        assert_eq!(config.log_level_filter().unwrap(), log::LevelFilter::Info);
    }

    #[test]
    fn test_bad_accent_is_rejected() {
        let args = Args::parse_from(["metrodeck", "--accent", "sometimes"]);
        assert!(AppConfig::load(&args).is_err());
    }

    #[test]
    fn test_bad_log_level_is_rejected() {
        let args = Args::parse_from(["metrodeck", "--log-level", "loud"]);
        assert!(AppConfig::load(&args).is_err());
    }
}
