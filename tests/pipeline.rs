use chromakey::background::BackgroundSource;
use chromakey::capture::{CaptureSource, ImageSequenceCapture};
use chromakey::config::KeyerSettings;
use chromakey::controller::input::parse_command;
use chromakey::controller::{Event, PipelineController, Slider};
use chromakey::keying::{KeyRange, StepPolicy};
use chromakey::output::ImageSequenceWriter;
use chromakey::Result;
use image::{Rgb, RgbImage};

const WIDTH: u32 = 16;
const HEIGHT: u32 = 12;
const BACKGROUND: [u8; 3] = [10, 20, 200];

/// In-memory frames played once
struct Clip {
    frames: Vec<RgbImage>,
}

impl CaptureSource for Clip {
    fn capture_frame(&mut self) -> Result<Option<RgbImage>> {
        if self.frames.is_empty() {
            Ok(None)
        } else {
            Ok(Some(self.frames.remove(0)))
        }
    }

    fn resolution(&self) -> (u32, u32) {
        (WIDTH, HEIGHT)
    }

    fn frame_rate(&self) -> f32 {
        25.0
    }
}

/// Green screen with a red square subject whose left edge moves per frame
fn green_screen(subject_x: u32) -> RgbImage {
    RgbImage::from_fn(WIDTH, HEIGHT, |x, y| {
        if (subject_x..subject_x + 4).contains(&x) && (4..8).contains(&y) {
            Rgb([220, 30, 30])
        } else {
            Rgb([0, 255, 0])
        }
    })
}

fn controller(frames: Vec<RgbImage>, settings: KeyerSettings) -> PipelineController {
    PipelineController::new(
        Box::new(Clip { frames }),
        &BackgroundSource::Solid(BACKGROUND),
        &settings,
    )
    .unwrap()
}

fn run_script(controller: &mut PipelineController, script: &str) {
    for line in script.lines() {
        controller.extend_events(parse_command(line).unwrap());
    }
}

#[test]
fn test_uniform_green_selection_shows_background() {
    let mut ctl = controller(
        vec![RgbImage::from_pixel(WIDTH, HEIGHT, Rgb([0, 255, 0]))],
        KeyerSettings::default(),
    );

    run_script(&mut ctl, "select 0 0 16 12");
    let tick = ctl.tick().unwrap();

    assert_eq!(
        *ctl.session().range(),
        KeyRange::new([60, 255, 255], [60, 255, 255])
    );
    assert!(
        tick.frame.pixels().all(|p| p.0 == BACKGROUND),
        "fully keyed frame should equal the background"
    );
}

#[test]
fn test_subject_survives_keying() {
    let mut ctl = controller(vec![green_screen(6)], KeyerSettings::default());

    run_script(&mut ctl, "soften 0\nselect 0 0 5 12");
    let tick = ctl.tick().unwrap();

    assert_eq!(tick.frame.get_pixel(0, 0).0, BACKGROUND);
    assert_eq!(tick.frame.get_pixel(15, 11).0, BACKGROUND);
    let subject = tick.frame.get_pixel(7, 5).0;
    assert!(
        subject[0] > 200 && subject[1] < 50,
        "subject should keep its colour, got {:?}",
        subject
    );
}

#[test]
fn test_soft_edges_blend() {
    let mut ctl = controller(vec![green_screen(6)], KeyerSettings::default());

    run_script(&mut ctl, "soften 2\nselect 0 0 5 12");
    let tick = ctl.tick().unwrap();

    // Next to the subject the mask is partially open
    let edge = tick.frame.get_pixel(5, 5).0;
    assert_ne!(edge, BACKGROUND);
    assert!(edge[2] > 30, "edge should pick up some background blue: {:?}", edge);
}

#[test]
fn test_reset_clears_key_until_next_selection() {
    let mut ctl = controller(vec![green_screen(6)], KeyerSettings::default());

    run_script(&mut ctl, "select 0 0 5 12\nreset\nmask on");
    let tick = ctl.tick().unwrap();

    assert!(ctl.session().range().is_empty());
    assert!(
        tick.frame.pixels().all(|p| p.0 == [0, 0, 0]),
        "mask must be all zero after reset"
    );

    run_script(&mut ctl, "select 0 0 5 12");
    let tick = ctl.tick().unwrap();
    assert!(tick.frame.pixels().any(|p| p.0 == [255, 255, 255]));
}

#[test]
fn test_reset_after_step_samples_the_new_frame() {
    let mut ctl = controller(
        vec![
            RgbImage::from_pixel(WIDTH, HEIGHT, Rgb([0, 255, 0])),
            RgbImage::from_pixel(WIDTH, HEIGHT, Rgb([0, 0, 255])),
        ],
        KeyerSettings::default(),
    );

    run_script(&mut ctl, "select 0 0 16 12");
    ctl.tick().unwrap();
    assert_eq!(
        *ctl.session().range(),
        KeyRange::new([60, 255, 255], [60, 255, 255])
    );

    run_script(&mut ctl, "step\nreset\nselect 0 0 16 12");
    let tick = ctl.tick().unwrap();

    assert_eq!(
        *ctl.session().range(),
        KeyRange::new([120, 255, 255], [120, 255, 255]),
        "range should come from the second frame only"
    );
    assert!(tick.frame.pixels().all(|p| p.0 == BACKGROUND));
}

#[test]
fn test_stepping_and_end_of_stream() {
    let mut ctl = controller(
        vec![green_screen(2), green_screen(8)],
        KeyerSettings::default(),
    );

    run_script(&mut ctl, "soften 0\nselect 0 0 1 12");
    let first = ctl.tick().unwrap().frame;
    assert_ne!(first.get_pixel(3, 5).0, BACKGROUND);

    ctl.push_event(Event::StepFrame);
    let second = ctl.tick().unwrap().frame;
    assert_eq!(second.get_pixel(3, 5).0, BACKGROUND, "subject moved away");
    assert_ne!(second.get_pixel(9, 5).0, BACKGROUND);
    assert!(!ctl.is_end_of_stream());

    ctl.push_event(Event::StepFrame);
    let third = ctl.tick().unwrap().frame;
    assert!(ctl.is_end_of_stream());
    assert_eq!(third, second, "last frame stays on screen");

    ctl.push_event(Event::StepFrame);
    assert!(ctl.tick().is_ok(), "stepping past the end is not an error");
}

#[test]
fn test_incremental_hue_slider_scenario() {
    let settings = KeyerSettings {
        step_policy: StepPolicy::Incremental,
        ..KeyerSettings::default()
    };
    let mut ctl = controller(vec![green_screen(6)], settings);

    run_script(&mut ctl, "select 0 0 5 12\nhue 1");
    ctl.tick().unwrap();
    let before = *ctl.session().range();

    ctl.push_event(Event::SliderChanged(Slider::Hue, 5));
    ctl.tick().unwrap();
    let after = *ctl.session().range();

    assert_eq!(after.low[0], before.low[0] - 4);
    assert_eq!(after.high[0], before.high[0] + 4);
}

#[test]
fn test_quit_stops_processing_queue() {
    let mut ctl = controller(vec![green_screen(6)], KeyerSettings::default());

    run_script(&mut ctl, "quit\nselect 0 0 5 12");
    let tick = ctl.tick().unwrap();

    assert!(tick.quit);
    assert!(ctl.session().range().is_empty());
}

#[test]
fn test_export_writes_whole_stream() {
    let dir = tempfile::tempdir().unwrap();
    let frames_dir = dir.path().join("frames");
    std::fs::create_dir(&frames_dir).unwrap();
    for (i, x) in [2, 5, 8].iter().enumerate() {
        green_screen(*x)
            .save(frames_dir.join(format!("f{:03}.png", i)))
            .unwrap();
    }

    let source = ImageSequenceCapture::open(&frames_dir, 24.0).unwrap();
    let mut ctl = PipelineController::new(
        Box::new(source),
        &BackgroundSource::Solid(BACKGROUND),
        &KeyerSettings::default(),
    )
    .unwrap();

    run_script(&mut ctl, "soften 0\nselect 0 0 1 12\nexport");
    let tick = ctl.tick().unwrap();
    assert!(tick.export_requested);

    let mut replay = ImageSequenceCapture::open(&frames_dir, 24.0).unwrap();
    let out_dir = dir.path().join("sample");
    let mut sink = ImageSequenceWriter::create(&out_dir, replay.stream_info()).unwrap();
    let written = ctl.export_sample(&mut replay, &mut sink).unwrap();

    assert_eq!(written, 3);
    let last = image::open(out_dir.join("frame_000002.png")).unwrap().into_rgb8();
    assert_eq!(last.get_pixel(0, 0).0, BACKGROUND);
    assert_ne!(last.get_pixel(9, 5).0, BACKGROUND);
}
