//! Session driver tests: event loop, snapshots, and discarding results
//! that arrive after the session has gone away.

use idcapture::camera::StillImageSource;
use idcapture::testing::{flat_frame, sharp_frame, StaticSubmitter};
use idcapture::{
    CameraConstraints, CaptureController, Event, QualityEvaluator, SessionDriver, SessionState,
    SubmissionError, VisionEngine,
};
use std::sync::Arc;
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(5);

fn driver_for(
    camera: StillImageSource,
    submitter: Arc<StaticSubmitter>,
) -> SessionDriver {
    let engine = Arc::new(VisionEngine::preloaded());
    let evaluator = QualityEvaluator::new(engine, &Default::default());
    SessionDriver::spawn(CaptureController::new(
        camera,
        Some(evaluator),
        submitter,
        CameraConstraints::default(),
    ))
}

async fn wait_for(driver: &SessionDriver, state: SessionState) -> idcapture::Snapshot {
    tokio::time::timeout(WAIT, driver.wait_for_state(state))
        .await
        .expect("timed out waiting for state")
        .expect("driver stopped")
}

#[tokio::test]
async fn test_full_flow_through_driver() {
    let submitter = Arc::new(StaticSubmitter::pass());
    let driver = driver_for(
        StillImageSource::from_frames(vec![sharp_frame().unwrap()]),
        submitter.clone(),
    );
    assert_eq!(driver.snapshot().state, SessionState::Idle);

    driver.send(Event::Start).await.unwrap();
    wait_for(&driver, SessionState::Capturing).await;
    driver.send(Event::CaptureFrame).await.unwrap();
    wait_for(&driver, SessionState::PreviewSharp).await;
    driver.send(Event::ConfirmSubmit).await.unwrap();

    let snapshot = wait_for(&driver, SessionState::Pass).await;
    assert!(snapshot.result.is_some());
    assert_eq!(submitter.calls(), 1);

    driver.send(Event::StartOver).await.unwrap();
    let snapshot = wait_for(&driver, SessionState::Idle).await;
    assert!(snapshot.result.is_none());
    assert!(snapshot.frame.is_none());

    driver.unmount().await.unwrap();
}

#[tokio::test]
async fn test_events_ignored_while_submitting() {
    let (submitter, gate) = StaticSubmitter::pass().gated();
    let submitter = Arc::new(submitter);
    let driver = driver_for(
        StillImageSource::from_frames(vec![sharp_frame().unwrap()]),
        submitter.clone(),
    );

    driver.send(Event::Start).await.unwrap();
    driver.send(Event::CaptureFrame).await.unwrap();
    driver.send(Event::ConfirmSubmit).await.unwrap();
    wait_for(&driver, SessionState::Submitting).await;

    for event in [Event::ConfirmSubmit, Event::Retake, Event::StartOver, Event::Start] {
        driver.send(event).await.unwrap();
    }
    gate.notify_one();

    wait_for(&driver, SessionState::Pass).await;
    assert_eq!(submitter.calls(), 1);
    driver.unmount().await.unwrap();
}

#[tokio::test]
async fn test_result_after_unmount_is_discarded() {
    let (submitter, gate) =
        StaticSubmitter::failing(SubmissionError::Network("late reply".to_string())).gated();
    let submitter = Arc::new(submitter);
    let camera = StillImageSource::from_frames(vec![sharp_frame().unwrap()]);
    let stats = camera.stats();
    let driver = driver_for(camera, submitter.clone());

    driver.send(Event::Start).await.unwrap();
    driver.send(Event::CaptureFrame).await.unwrap();
    driver.send(Event::ConfirmSubmit).await.unwrap();
    wait_for(&driver, SessionState::Submitting).await;

    let last = driver.unmount().await.unwrap();
    gate.notify_one();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(last.state, SessionState::Submitting);
    assert!(last.error.is_none());
    assert!(!stats.is_open());
}

#[tokio::test]
async fn test_unmount_while_capturing_releases_camera() {
    let camera = StillImageSource::from_frames(vec![flat_frame().unwrap()]);
    let stats = camera.stats();
    let driver = driver_for(camera, Arc::new(StaticSubmitter::pass()));

    driver.send(Event::Start).await.unwrap();
    wait_for(&driver, SessionState::Capturing).await;
    assert!(stats.is_open());

    driver.unmount().await.unwrap();
    assert!(!stats.is_open());
    assert_eq!(stats.opens(), stats.closes());
}

#[tokio::test]
async fn test_subscribers_see_blurry_preview() {
    let driver = driver_for(
        StillImageSource::from_frames(vec![flat_frame().unwrap()]),
        Arc::new(StaticSubmitter::pass()),
    );
    let mut updates = driver.subscribe();

    driver.send(Event::Start).await.unwrap();
    driver.send(Event::CaptureFrame).await.unwrap();

    let snapshot = tokio::time::timeout(
        WAIT,
        updates.wait_for(|s| s.state == SessionState::PreviewBlurry),
    )
    .await
    .unwrap()
    .unwrap()
    .clone();
    assert!(snapshot.error.unwrap().contains("blurry"));

    driver.unmount().await.unwrap();
}
