//! Tests for GIF capture of run history

#[cfg(test)]
mod tests {
    use wavetile::WfcState;
    use wavetile::algorithm::runner::run;
    use wavetile::analysis::patterns::Sample;
    use wavetile::io::visualization::HistoryCapture;

    fn checker_history() -> Vec<WfcState> {
        let sample = Sample::from_rows(&[vec![0, 1, 0], vec![1, 0, 1], vec![0, 1, 0]])
            .expect("valid sample");
        let state = WfcState::init(&sample, 2, 4, 4).expect("init");
        let mut history = vec![state.clone()];
        history.extend(run(state, 20, 0).expect("completes").history);
        history
    }

    // The empty colour averages the palette
    #[test]
    fn test_empty_color_average() {
        let capture = HistoryCapture::new(vec![[0, 0, 0, 255], [200, 100, 50, 255]], 1);
        assert_eq!(capture.empty_color(), [100, 50, 25, 255]);
    }

    // Rendered frames are scaled per cell
    #[test]
    fn test_render_state_scaled() {
        let history = checker_history();
        let capture = HistoryCapture::new(vec![[0, 0, 0, 255], [255, 255, 255, 255]], 3);
        let img = capture.render_state(&history[0]).expect("render");
        assert_eq!(img.dimensions(), (12, 12));
        assert_eq!(img.get_pixel(0, 0).0, capture.empty_color());
    }

    // Fast delays skip frames but always keep the final one
    #[test]
    fn test_frame_skipping_keeps_last() {
        let mut history = checker_history();
        let last = history.last().cloned().expect("non-empty");
        while history.len() < 25 {
            history.push(last.clone());
        }
        let capture = HistoryCapture::new(vec![[0, 0, 0, 255], [255, 255, 255, 255]], 1);

        let skipped = capture.generate_frames(&history, 5).expect("frames");
        assert_eq!(skipped.len(), 4);
        let all = capture.generate_frames(&history, 100).expect("frames");
        assert_eq!(all.len(), 25);
    }

    // Empty history cannot be exported
    #[test]
    fn test_export_gif_empty_history() {
        let capture = HistoryCapture::new(vec![[0, 0, 0, 255]], 1);
        assert!(capture.export_gif(&[], "/dev/null/run.gif", 50).is_err());
        assert!(capture.generate_frames(&[], 50).expect("no frames").is_empty());
    }

    // A GIF file is written for a real run
    #[test]
    fn test_export_gif_writes_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("run.gif");
        let capture = HistoryCapture::new(vec![[0, 0, 0, 255], [255, 255, 255, 255]], 2);
        capture
            .export_gif(&checker_history(), &path, 50)
            .expect("export");
        assert!(path.exists());
    }
}
