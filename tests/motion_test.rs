mod common;

use clicktrack::tracker::MotionTrackerConfig;
use clicktrack::{
    Annotator, BoundingBox, Color, KeyCode, LoopExit, LoopSettings, MotionBlob, MotionLoop,
    MotionTracker,
};
use common::{ScriptedDetector, ScriptedSource, ScriptedWindow};

fn blob(x: i32, y: i32, w: i32, h: i32) -> MotionBlob {
    MotionBlob {
        bbox: BoundingBox::new(x, y, w, h),
        area: f64::from(w * h),
    }
}

fn motion_settings() -> LoopSettings {
    LoopSettings {
        poll_timeout_ms: 1,
        quit_key: KeyCode::from_char('q'),
        ..LoopSettings::default()
    }
}

#[test]
fn test_motion_loop_reports_last_position() {
    let detector = ScriptedDetector::new([
        vec![blob(10, 20, 100, 100), blob(300, 40, 120, 90)],
        vec![],
        vec![blob(5, 5, 10, 10)],
    ]);
    let mut lp = MotionLoop::new(
        ScriptedSource::frames(3),
        ScriptedWindow::default(),
        detector,
        MotionTracker::default(),
        Annotator::default(),
        motion_settings(),
    )
    .with_telemetry(Vec::new());

    assert_eq!(lp.run().unwrap(), LoopExit::EndOfStream);

    let last = BoundingBox::new(300, 40, 120, 90);
    assert_eq!(lp.tracker().last_location(), Some(last));

    let report = String::from_utf8(lp.telemetry().clone()).unwrap();
    let lines: Vec<&str> = report.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(
        lines
            .iter()
            .all(|l| *l == "Last Tracked Position: X=300, Y=40, Width=120, Height=90")
    );
}

#[test]
fn test_motion_annotations() {
    let detector = ScriptedDetector::new([vec![blob(10, 20, 100, 100), blob(0, 0, 20, 20)]]);
    let mut lp = MotionLoop::new(
        ScriptedSource::frames(1),
        ScriptedWindow::default(),
        detector,
        MotionTracker::default(),
        Annotator::default(),
        motion_settings(),
    )
    .with_telemetry(Vec::new());

    lp.run().unwrap();

    let shown = &lp.window().shown[0];
    let rects: Vec<_> = shown.rectangles().collect();
    let bbox = BoundingBox::new(10, 20, 100, 100);
    let (tl, br) = (bbox.top_left(), bbox.bottom_right());
    assert_eq!(rects, vec![(tl, br, Color::GREEN), (tl, br, Color::BLUE)]);
    assert_eq!(shown.texts().collect::<Vec<_>>(), vec!["Moving object"]);
}

#[test]
fn test_stale_only_highlight_and_quit() {
    let detector = ScriptedDetector::new([vec![blob(10, 20, 100, 100)], vec![]]);
    let tracker = MotionTracker::new(MotionTrackerConfig {
        highlight_stale_only: true,
        ..MotionTrackerConfig::default()
    });
    let window = ScriptedWindow::default().key_on(1, KeyCode::from_char('q'));
    let mut lp = MotionLoop::new(
        ScriptedSource::frames(5),
        window,
        detector,
        tracker,
        Annotator::default(),
        motion_settings(),
    )
    .with_telemetry(Vec::new());

    assert_eq!(lp.run().unwrap(), LoopExit::QuitKey);

    // Only the frame without detections highlights the remembered location.
    let report = String::from_utf8(lp.telemetry().clone()).unwrap();
    assert_eq!(
        report,
        "Last Tracked Position: X=10, Y=20, Width=100, Height=100\n"
    );
}
