//! Tests for the run loop state machine, cancellation and retries

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;
    use std::time::Instant;
    use wavetile::WfcError;
    use wavetile::algorithm::executor::WfcState;
    use wavetile::algorithm::runner::{
        FailureReason, RunLoop, RunStatus, run, run_with_retries,
    };
    use wavetile::algorithm::selection::RandomSelector;
    use wavetile::analysis::patterns::Sample;

    fn checkerboard_state(width: usize, height: usize) -> WfcState {
        let sample = Sample::from_rows(&[vec![0, 1, 0], vec![1, 0, 1], vec![0, 1, 0]])
            .expect("valid sample");
        WfcState::init(&sample, 2, width, height).expect("init")
    }

    fn dead_end_state() -> WfcState {
        let sample = Sample::from_rows(&[vec![0, 1, 2], vec![3, 4, 5]]).expect("valid sample");
        WfcState::init(&sample, 2, 3, 1).expect("init")
    }

    fn ring_state(width: usize, height: usize) -> WfcState {
        let sample = Sample::from_rows(&[vec![1, 1, 1], vec![1, 0, 1], vec![1, 1, 1]])
            .expect("valid sample");
        WfcState::init(&sample, 2, width, height).expect("init")
    }

    // A 1x1 grid finishes in exactly one tick
    #[test]
    fn test_single_cell_run() {
        let outcome = run(ring_state(1, 1), 10, 42).expect("completes");
        assert_eq!(outcome.iterations, 1);
        assert_eq!(outcome.history.len(), 1);
        assert!(outcome.final_state.is_complete());
        assert!(outcome.final_state.output().iter().all(Option::is_some));
    }

    // History holds one entry per tick, the completing tick included
    #[test]
    fn test_history_matches_iterations() {
        let outcome = run(ring_state(4, 4), 100, 8).expect("ring completes");
        assert_eq!(outcome.history.len(), outcome.iterations);
        assert_eq!(outcome.history.last(), Some(&outcome.final_state));
    }

    // Switching history off keeps only the live state
    #[test]
    fn test_history_recording_off() {
        let outcome = RunLoop::new(ring_state(4, 4), RandomSelector::new(8), 100)
            .with_history(false)
            .run_to_end()
            .expect("ring completes");
        assert!(outcome.history.is_empty());
        assert!(outcome.iterations > 0);
        assert!(outcome.final_state.is_complete());
    }

    // Successive history entries never lose collapsed cells
    #[test]
    fn test_history_is_monotonic() {
        let mut run_loop = RunLoop::new(ring_state(4, 4), RandomSelector::new(4), 100);
        while run_loop.step().expect("tick") == RunStatus::Running {}
        let counts: Vec<usize> = run_loop
            .history()
            .iter()
            .map(WfcState::collapsed_count)
            .collect();
        assert!(counts.windows(2).all(|w| w[0] < w[1]));
    }

    // Contradiction moves the loop to Failed and keeps the last good state
    #[test]
    fn test_contradiction_fails_run() {
        let initial = dead_end_state();
        let mut run_loop = RunLoop::new(initial.clone(), RandomSelector::new(0), 10);
        let status = run_loop.step().expect("step");
        assert!(matches!(
            status,
            RunStatus::Failed(FailureReason::Contradiction { y: 0, .. })
        ));
        assert_eq!(run_loop.state(), &initial);
        assert!(run_loop.history().is_empty());
        assert_eq!(run_loop.step().expect("terminal"), status);
    }

    // A zero budget fails before any tick
    #[test]
    fn test_iteration_budget() {
        let result = run(checkerboard_state(4, 4), 0, 1);
        assert!(matches!(
            result,
            Err(WfcError::MaxIterationsExceeded { limit: 0 })
        ));
    }

    // A raised flag stops the loop at the next tick boundary
    #[test]
    fn test_cancellation_flag() {
        let flag = Arc::new(AtomicBool::new(true));
        let mut run_loop = RunLoop::new(checkerboard_state(4, 4), RandomSelector::new(1), 10)
            .with_cancellation(flag);
        assert_eq!(
            run_loop.step().expect("step"),
            RunStatus::Failed(FailureReason::Cancelled)
        );
        assert_eq!(run_loop.iterations(), 0);
    }

    // A deadline in the past cancels immediately
    #[test]
    fn test_deadline_cancels() {
        let run_loop = RunLoop::new(checkerboard_state(4, 4), RandomSelector::new(1), 10)
            .with_deadline(Instant::now());
        assert!(matches!(
            run_loop.run_to_end(),
            Err(WfcError::Cancelled { iteration: 0 })
        ));
    }

    // The observer sees every successful tick
    #[test]
    fn test_observer_called_per_tick() {
        let mut seen = 0;
        let outcome = RunLoop::new(checkerboard_state(5, 5), RandomSelector::new(2), 50)
            .with_observer(|event| {
                seen += 1;
                assert_eq!(event.cell_count, 25);
            })
            .run_to_end()
            .expect("completes");
        assert_eq!(seen, outcome.iterations);
    }

    // A completed state starts the loop in Complete
    #[test]
    fn test_complete_state_starts_complete() {
        let outcome = run(checkerboard_state(3, 3), 10, 0).expect("completes");
        let run_loop = RunLoop::new(outcome.final_state, RandomSelector::new(0), 10);
        assert_eq!(run_loop.status(), RunStatus::Complete);
    }

    // Retries give up with the last contradiction when every seed fails
    #[test]
    fn test_retries_exhausted() {
        let result = run_with_retries(&dead_end_state(), 10, 0, 3);
        assert!(matches!(result, Err(WfcError::Contradiction { .. })));
    }

    // Budget failures are not retried
    #[test]
    fn test_retries_skip_budget_failures() {
        let result = run_with_retries(&checkerboard_state(4, 4), 0, 0, 5);
        assert!(matches!(
            result,
            Err(WfcError::MaxIterationsExceeded { .. })
        ));
    }

    // Same seed and input give the same result
    #[test]
    fn test_same_seed_same_output() {
        let a = run(ring_state(6, 6), 200, 17).map(|o| o.final_state.output());
        let b = run(ring_state(6, 6), 200, 17).map(|o| o.final_state.output());
        match (a, b) {
            (Ok(a), Ok(b)) => assert_eq!(a, b),
            (Err(a), Err(b)) => assert_eq!(a.to_string(), b.to_string()),
            _ => unreachable!("runs with the same seed diverged"),
        }
    }
}
