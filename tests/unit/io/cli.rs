//! Tests for command-line parsing and end-to-end processing

#[cfg(test)]
mod tests {
    use clap::Parser;
    use std::path::PathBuf;
    use std::sync::atomic::Ordering;
    use wavetile::WfcError;
    use wavetile::algorithm::propagation::PropagationMode;
    use wavetile::io::cli::{Cli, SampleProcessor};
    use wavetile::io::configuration::{
        DEFAULT_MAX_ITERATIONS, DEFAULT_OUTPUT_SIZE, DEFAULT_PATTERN_SIZE, DEFAULT_SEED,
    };
    use wavetile::io::snapshot::load_state;

    // Only the sample path is required
    #[test]
    fn test_cli_parse_minimal_args() {
        let cli = Cli::parse_from(["program", "sample.json"]);

        assert_eq!(cli.target, PathBuf::from("sample.json"));
        assert_eq!(cli.seed, DEFAULT_SEED);
        assert_eq!(cli.iterations, DEFAULT_MAX_ITERATIONS);
        assert_eq!(cli.pattern_size, DEFAULT_PATTERN_SIZE);
        assert_eq!(cli.propagation, PropagationMode::FixedPoint);
        assert_eq!(cli.dimensions(), (DEFAULT_OUTPUT_SIZE, DEFAULT_OUTPUT_SIZE));
        assert!(cli.should_show_progress());
    }

    // Every option is parsed
    #[test]
    fn test_cli_parse_all_args() {
        let cli = Cli::parse_from([
            "program",
            "in.txt",
            "-W",
            "20",
            "-H",
            "10",
            "-n",
            "2",
            "--seed",
            "7",
            "--iterations",
            "300",
            "--propagation",
            "local",
            "--retries",
            "4",
            "--output",
            "out.png",
            "--state-out",
            "state.json",
            "--visualize",
            "run.gif",
            "--history-out",
            "history.json",
            "--log",
            "debug",
            "--quiet",
        ]);

        assert_eq!(cli.dimensions(), (20, 10));
        assert_eq!(cli.pattern_size, 2);
        assert_eq!(cli.seed, 7);
        assert_eq!(cli.iterations, 300);
        assert_eq!(cli.propagation, PropagationMode::Local);
        assert_eq!(cli.retries, 4);
        assert_eq!(cli.output_path(), PathBuf::from("out.png"));
        assert_eq!(cli.state_out, Some(PathBuf::from("state.json")));
        assert_eq!(cli.visualize, Some(PathBuf::from("run.gif")));
        assert_eq!(cli.history_out, Some(PathBuf::from("history.json")));
        assert_eq!(cli.log.as_deref(), Some("debug"));
        assert!(!cli.should_show_progress());
    }

    // A single dimension gives a square grid
    #[test]
    fn test_single_dimension_is_square() {
        assert_eq!(Cli::parse_from(["p", "s.json", "-W", "8"]).dimensions(), (8, 8));
        assert_eq!(Cli::parse_from(["p", "s.json", "-H", "5"]).dimensions(), (5, 5));
    }

    // Default output sits next to the sample with a suffix
    #[test]
    fn test_default_output_path() {
        let cli = Cli::parse_from(["program", "samples/ring.json"]);
        assert_eq!(cli.output_path(), PathBuf::from("samples/ring_result.png"));
    }

    // A full run writes the image, the state and the animation
    #[test]
    fn test_process_writes_outputs() {
        let dir = tempfile::tempdir().expect("temp dir");
        let sample = dir.path().join("checker.json");
        std::fs::write(&sample, "[[0,1,0],[1,0,1],[0,1,0]]").expect("write sample");
        let output = dir.path().join("out/checker.png");
        let state = dir.path().join("state.json");
        let gif = dir.path().join("run.gif");

        let cli = Cli::parse_from([
            "program".into(),
            sample.clone().into_os_string(),
            "-W".into(),
            "6".into(),
            "-n".into(),
            "2".into(),
            "-q".into(),
            "-o".into(),
            output.clone().into_os_string(),
            "--state-out".into(),
            state.clone().into_os_string(),
            "-v".into(),
            gif.clone().into_os_string(),
        ]);
        SampleProcessor::new(cli).process().expect("generation succeeds");

        assert!(output.exists());
        assert!(gif.exists());
        let saved = load_state(&state).expect("valid state");
        assert!(saved.is_complete());
        assert_eq!(saved.collapsed_count(), 36);
    }

    // History is recorded only for outputs that consume it
    #[test]
    fn test_history_needed_only_for_history_outputs() {
        assert!(!Cli::parse_from(["p", "s.json", "--state-out", "s.json"]).needs_history());
        assert!(Cli::parse_from(["p", "s.json", "-v", "run.gif"]).needs_history());
        assert!(Cli::parse_from(["p", "s.json", "--history-out", "h.json"]).needs_history());
    }

    // The history file holds one state per tick
    #[test]
    fn test_process_writes_history() {
        let dir = tempfile::tempdir().expect("temp dir");
        let sample = dir.path().join("checker.json");
        std::fs::write(&sample, "[[0,1,0],[1,0,1],[0,1,0]]").expect("write sample");
        let history = dir.path().join("history.json");

        let cli = Cli::parse_from([
            "program".into(),
            sample.into_os_string(),
            "-W".into(),
            "5".into(),
            "-n".into(),
            "2".into(),
            "-q".into(),
            "-o".into(),
            dir.path().join("out.png").into_os_string(),
            "--history-out".into(),
            history.clone().into_os_string(),
        ]);
        SampleProcessor::new(cli).process().expect("generation succeeds");

        let text = std::fs::read_to_string(&history).expect("read history");
        let value: serde_json::Value = serde_json::from_str(&text).expect("json");
        assert_eq!(value.as_array().map(Vec::len), Some(1));
    }

    // Resuming from a completed state keeps its result
    #[test]
    fn test_process_resume() {
        let dir = tempfile::tempdir().expect("temp dir");
        let sample = dir.path().join("checker.txt");
        std::fs::write(&sample, "0 1 0\n1 0 1\n0 1 0\n").expect("write sample");
        let state = dir.path().join("state.json");

        let first = Cli::parse_from([
            "program".into(),
            sample.clone().into_os_string(),
            "-W".into(),
            "4".into(),
            "-n".into(),
            "2".into(),
            "-q".into(),
            "--state-out".into(),
            state.clone().into_os_string(),
        ]);
        SampleProcessor::new(first).process().expect("first run");

        let output = dir.path().join("resumed.png");
        let resumed = Cli::parse_from([
            "program".into(),
            sample.into_os_string(),
            "-q".into(),
            "--resume".into(),
            state.into_os_string(),
            "-o".into(),
            output.clone().into_os_string(),
        ]);
        SampleProcessor::new(resumed).process().expect("resumed run");
        assert!(output.exists());
    }

    // A raised cancel flag stops the run before any tick
    #[test]
    fn test_process_cancelled() {
        let dir = tempfile::tempdir().expect("temp dir");
        let sample = dir.path().join("checker.json");
        std::fs::write(&sample, "[[0,1,0],[1,0,1],[0,1,0]]").expect("write sample");

        let cli = Cli::parse_from([
            "program".into(),
            sample.into_os_string(),
            "-n".into(),
            "2".into(),
            "-q".into(),
        ]);
        let processor = SampleProcessor::new(cli);
        processor.cancel_flag().store(true, Ordering::Relaxed);
        assert!(matches!(
            processor.process(),
            Err(WfcError::Cancelled { iteration: 0 })
        ));
    }

    // Unsupported extensions are rejected
    #[test]
    fn test_process_rejects_unknown_format() {
        let cli = Cli::parse_from(["program", "sample.bmp", "-q"]);
        assert!(matches!(
            SampleProcessor::new(cli).process(),
            Err(WfcError::InvalidParameter { .. })
        ));
    }
}
