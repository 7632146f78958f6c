//! Session state and the per-tick keying loop.
//!
//! UI input arrives as [`Event`]s. The controller queues them and drains the
//! queue once per tick; each event is a state transition on the
//! [`KeyingSession`], which may ask the controller to step the source, export
//! or stop. After the queue is drained the current frame is keyed and
//! returned for presentation.

pub mod input;
mod overlay;

pub use overlay::{draw_selection, SELECTION_COLOR};

use crate::background::BackgroundSource;
use crate::capture::CaptureSource;
use crate::config::KeyerSettings;
use crate::error::{KeyerError, Result};
use crate::export;
use crate::keying::{
    estimate_range, key_frame, mask_to_rgb, to_hsv, Channel, Frame, HsvFrame, KeyParams,
    KeyRange, Point, RangeAdjuster, SelectionRegion, MAX_SOFTEN, MAX_SPILL,
};
use crate::output::OutputSink;
use std::collections::VecDeque;

/// The five sliders of the keyer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slider {
    Hue,
    Saturation,
    Value,
    Soften,
    Spill,
}

/// Input from the UI collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    SliderChanged(Slider, i32),
    PointerDown { x: i32, y: i32 },
    PointerMove { x: i32, y: i32 },
    PointerUp { x: i32, y: i32 },
    /// Show the softened mask instead of the composite
    ShowMask(bool),
    StepFrame,
    ResetRange,
    ExportSample,
    Quit,
}

/// What the controller has to do after a session transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    StepFrame,
    Export,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    Idle,
    /// Pointer held; `cursor` follows moves for the preview rectangle
    Selecting { anchor: Point, cursor: Point },
}

/// Mutable state carried across ticks
pub struct KeyingSession {
    frame: Frame,
    hsv: HsvFrame,
    spill_working: HsvFrame,
    background: Frame,
    range: KeyRange,
    adjuster: RangeAdjuster,
    soften: u32,
    spill: i32,
    selection: SelectionState,
    show_mask: bool,
}

impl KeyingSession {
    pub fn new(frame: Frame, background: Frame, settings: &KeyerSettings) -> Result<Self> {
        if background.dimensions() != frame.dimensions() {
            return Err(KeyerError::DimensionMismatch {
                what: "background",
                expected: background.dimensions(),
                actual: frame.dimensions(),
            });
        }

        let hsv = to_hsv(&frame);
        Ok(Self {
            spill_working: hsv.clone(),
            hsv,
            frame,
            background,
            range: KeyRange::empty(),
            adjuster: RangeAdjuster::new(settings.thresholds(), settings.step_policy),
            soften: settings.soften,
            spill: settings.spill,
            selection: SelectionState::Idle,
            show_mask: false,
        })
    }

    /// Apply one event
    pub fn handle(&mut self, event: Event) -> Action {
        let (width, height) = self.frame.dimensions();

        match event {
            Event::SliderChanged(slider, value) => {
                self.set_slider(slider, value);
                Action::None
            }
            Event::PointerDown { x, y } => {
                let anchor = Point::clamped(x, y, width, height);
                self.selection = SelectionState::Selecting {
                    anchor,
                    cursor: anchor,
                };
                Action::None
            }
            Event::PointerMove { x, y } => {
                if let SelectionState::Selecting { anchor, .. } = self.selection {
                    self.selection = SelectionState::Selecting {
                        anchor,
                        cursor: Point::clamped(x, y, width, height),
                    };
                }
                Action::None
            }
            Event::PointerUp { x, y } => {
                if let SelectionState::Selecting { anchor, .. } = self.selection {
                    let region = SelectionRegion::new(anchor, Point::clamped(x, y, width, height));
                    estimate_range(&self.hsv, &region, &mut self.range);
                    self.selection = SelectionState::Idle;
                }
                Action::None
            }
            Event::ShowMask(show) => {
                self.show_mask = show;
                Action::None
            }
            Event::ResetRange => {
                self.reset();
                Action::None
            }
            Event::StepFrame => Action::StepFrame,
            Event::ExportSample => Action::Export,
            Event::Quit => Action::Quit,
        }
    }

    fn set_slider(&mut self, slider: Slider, value: i32) {
        match slider {
            Slider::Hue => self.adjuster.set(Channel::Hue, value, &mut self.range),
            Slider::Saturation => self.adjuster.set(Channel::Saturation, value, &mut self.range),
            Slider::Value => self.adjuster.set(Channel::Value, value, &mut self.range),
            Slider::Soften => self.soften = value.clamp(0, MAX_SOFTEN as i32) as u32,
            Slider::Spill => self.spill = value.clamp(0, MAX_SPILL),
        }
    }

    /// Back to the degenerate range, with caches rebuilt from the current frame
    pub fn reset(&mut self) {
        tracing::info!("Resetting key range");
        self.range = KeyRange::empty();
        self.hsv = to_hsv(&self.frame);
        self.spill_working = self.hsv.clone();
    }

    /// Replace the current frame; the spill working copy starts over
    pub fn load_frame(&mut self, frame: Frame) -> Result<()> {
        if frame.dimensions() != self.background.dimensions() {
            return Err(KeyerError::DimensionMismatch {
                what: "background",
                expected: self.background.dimensions(),
                actual: frame.dimensions(),
            });
        }
        self.hsv = to_hsv(&frame);
        self.spill_working = self.hsv.clone();
        self.frame = frame;
        Ok(())
    }

    /// Key the current frame with the current parameters
    pub fn render(&mut self) -> Result<Frame> {
        let params = self.params();
        let keyed = key_frame(&self.hsv, &mut self.spill_working, &self.background, &params)?;

        let mut shown = if self.show_mask {
            mask_to_rgb(&keyed.mask)
        } else {
            keyed.composite
        };

        if let SelectionState::Selecting { anchor, cursor } = self.selection {
            draw_selection(&mut shown, anchor, cursor);
        }
        Ok(shown)
    }

    pub fn params(&self) -> KeyParams {
        KeyParams {
            range: self.range,
            soften: self.soften,
            spill: self.spill,
        }
    }

    pub fn range(&self) -> &KeyRange {
        &self.range
    }

    pub fn selection(&self) -> SelectionState {
        self.selection
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn background(&self) -> &Frame {
        &self.background
    }

    pub fn adjuster(&self) -> &RangeAdjuster {
        &self.adjuster
    }
}

/// Outcome of one tick
pub struct Tick {
    /// Frame to present
    pub frame: Frame,
    pub export_requested: bool,
    pub quit: bool,
}

/// Drives a [`KeyingSession`] from a capture source and an event queue
pub struct PipelineController {
    capture: Box<dyn CaptureSource>,
    session: KeyingSession,
    queue: VecDeque<Event>,
    end_of_stream: bool,
    frames_read: u64,
}

impl PipelineController {
    /// Read the first frame and build the session around it
    pub fn new(
        mut capture: Box<dyn CaptureSource>,
        background: &BackgroundSource,
        settings: &KeyerSettings,
    ) -> Result<Self> {
        let first = capture
            .capture_frame()?
            .ok_or_else(|| KeyerError::EmptySource("capture".into()))?;
        let (width, height) = first.dimensions();
        let background = background.render(width, height)?;
        let session = KeyingSession::new(first, background, settings)?;

        Ok(Self {
            capture,
            session,
            queue: VecDeque::new(),
            end_of_stream: false,
            frames_read: 1,
        })
    }

    pub fn push_event(&mut self, event: Event) {
        self.queue.push_back(event);
    }

    pub fn extend_events<I: IntoIterator<Item = Event>>(&mut self, events: I) {
        self.queue.extend(events);
    }

    /// Drain queued events, then key the current frame
    ///
    /// A live source is advanced after the events are handled, so a selection
    /// samples the frame that was on screen when it was made.
    pub fn tick(&mut self) -> Result<Tick> {
        let mut export_requested = false;
        let mut quit = false;

        while let Some(event) = self.queue.pop_front() {
            tracing::debug!("Event {:?}", event);
            match self.session.handle(event) {
                Action::None => {}
                Action::StepFrame => self.step_frame()?,
                Action::Export => export_requested = true,
                Action::Quit => {
                    quit = true;
                    self.queue.clear();
                }
            }
        }

        if self.capture.is_live() && !quit {
            self.step_frame()?;
        }

        let frame = self.session.render()?;
        Ok(Tick {
            frame,
            export_requested,
            quit,
        })
    }

    /// Advance to the next source frame; at end of stream keep the current one
    pub fn step_frame(&mut self) -> Result<()> {
        if self.end_of_stream {
            tracing::debug!("Already at end of stream");
            return Ok(());
        }

        match self.capture.capture_frame() {
            Ok(Some(frame)) => {
                self.session.load_frame(frame)?;
                self.frames_read += 1;
            }
            Ok(None) => {
                tracing::info!("End of stream after {} frames", self.frames_read);
                self.end_of_stream = true;
            }
            Err(e) => tracing::warn!("Failed to capture frame, keeping current: {}", e),
        }
        Ok(())
    }

    /// Key every frame of `source` with the current parameters into `sink`
    pub fn export_sample(
        &self,
        source: &mut dyn CaptureSource,
        sink: &mut dyn OutputSink,
    ) -> Result<u64> {
        export::export_sample(source, sink, self.session.background(), &self.session.params())
    }

    pub fn session(&self) -> &KeyingSession {
        &self.session
    }

    pub fn is_end_of_stream(&self) -> bool {
        self.end_of_stream
    }

    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }
}
