//! Property-based tests for the capture session state machine
//!
//! Random event sequences are replayed against a controller backed by
//! synthetic frames; after every step the session invariants must hold.
//!
//! Run with: cargo test --test session_props

use idcapture::camera::StillImageSource;
use idcapture::testing::{flat_frame, sharp_frame, StaticSubmitter};
use idcapture::{
    CameraConstraints, CaptureController, Event, QualityEvaluator, SessionState, SubmissionError,
    VisionEngine,
};
use proptest::prelude::*;
use std::sync::Arc;

fn event_strategy() -> impl Strategy<Value = Event> {
    prop::sample::select(Event::ALL.to_vec())
}

fn controller(
    sharp: &[bool],
    submitter: Arc<StaticSubmitter>,
) -> (
    CaptureController<StillImageSource, StaticSubmitter>,
    Arc<idcapture::camera::SourceStats>,
) {
    let frames = sharp
        .iter()
        .map(|&s| if s { sharp_frame() } else { flat_frame() })
        .collect::<Result<Vec<_>, _>>()
        .expect("synthetic frames encode");
    let camera = StillImageSource::from_frames(frames);
    let stats = camera.stats();
    let evaluator = QualityEvaluator::new(Arc::new(VisionEngine::preloaded()), &Default::default());
    let session = CaptureController::new(
        camera,
        Some(evaluator),
        submitter,
        CameraConstraints::default(),
    );
    (session, stats)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// INVARIANT: the device is open exactly while the session is capturing
    #[test]
    fn camera_held_only_while_capturing(
        sharp in prop::collection::vec(any::<bool>(), 1..4),
        events in prop::collection::vec(event_strategy(), 0..24),
    ) {
        let (mut session, stats) = controller(&sharp, Arc::new(StaticSubmitter::pass()));
        tokio_test::block_on(async {
            for event in events {
                let state = session.handle(event).await;
                prop_assert!(SessionState::ALL.contains(&state));
                prop_assert_eq!(stats.is_open(), state == SessionState::Capturing,
                    "after {:?} in {}", event, state);
            }
            Ok(())
        })?;
        session.shutdown();
        prop_assert!(!stats.is_open());
    }

    /// INVARIANT: exactly one request per confirm from a sharp preview,
    /// and no request from anywhere else
    #[test]
    fn submits_only_from_sharp_preview(
        sharp in prop::collection::vec(any::<bool>(), 1..4),
        events in prop::collection::vec(event_strategy(), 0..24),
        passing in any::<bool>(),
    ) {
        let submitter = Arc::new(if passing {
            StaticSubmitter::pass()
        } else {
            StaticSubmitter::failing(SubmissionError::Network("offline".to_string()))
        });
        let (mut session, _) = controller(&sharp, submitter.clone());

        tokio_test::block_on(async {
            let mut expected_calls = 0;
            for event in events {
                let before = session.state();
                let after = session.handle(event).await;

                if event == Event::ConfirmSubmit {
                    if before == SessionState::PreviewSharp {
                        expected_calls += 1;
                        let terminal = if passing { SessionState::Pass } else { SessionState::Fail };
                        prop_assert_eq!(after, terminal);
                    } else {
                        prop_assert_eq!(after, before);
                    }
                }
                prop_assert_eq!(submitter.calls(), expected_calls);
            }
            Ok(())
        })?;
    }

    /// INVARIANT: results only exist in terminal states and previews
    /// always carry a frame
    #[test]
    fn snapshot_matches_state(
        sharp in prop::collection::vec(any::<bool>(), 1..4),
        events in prop::collection::vec(event_strategy(), 0..24),
    ) {
        let (mut session, _) = controller(&sharp, Arc::new(StaticSubmitter::pass()));
        tokio_test::block_on(async {
            for event in events {
                session.handle(event).await;
                let snapshot = session.snapshot();
                match snapshot.state {
                    SessionState::PreviewBlurry | SessionState::PreviewSharp => {
                        prop_assert!(snapshot.frame.is_some());
                        prop_assert!(snapshot.result.is_none());
                    }
                    SessionState::Pass => prop_assert!(snapshot.result.is_some()),
                    SessionState::Idle | SessionState::Capturing => {
                        prop_assert!(snapshot.frame.is_none());
                        prop_assert!(snapshot.result.is_none());
                    }
                    _ => {}
                }
                if snapshot.state == SessionState::PreviewBlurry {
                    prop_assert!(snapshot.score.map(|s| s.is_blurry).unwrap_or(false));
                }
            }
            Ok(())
        })?;
    }
}
