//! Line-oriented command input.
//!
//! Each line is one command, e.g. `hue 5`, `select 10 10 120 80`, `step`.
//! Slider values are clamped to the slider's range here, the same way a
//! trackbar would bound them.

use super::{Event, Slider};
use crate::error::{KeyerError, Result};
use crate::keying::{MAX_SOFTEN, MAX_SPILL, MAX_THRESHOLD};
use std::io::BufRead;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

/// Parse one command line into the events it stands for
///
/// Blank lines and `#` comments produce no events.
pub fn parse_command(line: &str) -> Result<Vec<Event>> {
    let line = line.split('#').next().unwrap_or("").trim();
    if line.is_empty() {
        return Ok(Vec::new());
    }

    let mut words = line.split_whitespace();
    let name = words.next().unwrap_or_default().to_lowercase();
    let args: Vec<&str> = words.collect();
    let invalid = |why: &str| KeyerError::InvalidCommand(line.to_string(), why.to_string());

    let ints = |count: usize| -> Result<Vec<i32>> {
        if args.len() != count {
            return Err(invalid(&format!("expected {} numbers", count)));
        }
        args.iter()
            .map(|a| a.parse::<i32>().map_err(|_| invalid(&format!("`{}` is not a number", a))))
            .collect()
    };

    let slider = |slider: Slider, max: i32| -> Result<Vec<Event>> {
        let value = ints(1)?[0].clamp(0, max);
        Ok(vec![Event::SliderChanged(slider, value)])
    };

    match name.as_str() {
        "hue" | "h" => slider(Slider::Hue, MAX_THRESHOLD),
        "sat" | "s" => slider(Slider::Saturation, MAX_THRESHOLD),
        "val" | "v" => slider(Slider::Value, MAX_THRESHOLD),
        "soften" => slider(Slider::Soften, MAX_SOFTEN as i32),
        "spill" => slider(Slider::Spill, MAX_SPILL),
        "down" => {
            let p = ints(2)?;
            Ok(vec![Event::PointerDown { x: p[0], y: p[1] }])
        }
        "move" => {
            let p = ints(2)?;
            Ok(vec![Event::PointerMove { x: p[0], y: p[1] }])
        }
        "up" => {
            let p = ints(2)?;
            Ok(vec![Event::PointerUp { x: p[0], y: p[1] }])
        }
        "select" => {
            let p = ints(4)?;
            Ok(vec![
                Event::PointerDown { x: p[0], y: p[1] },
                Event::PointerUp { x: p[2], y: p[3] },
            ])
        }
        "mask" => match args.as_slice() {
            ["on"] => Ok(vec![Event::ShowMask(true)]),
            ["off"] => Ok(vec![Event::ShowMask(false)]),
            _ => Err(invalid("expected `on` or `off`")),
        },
        "step" | ">" => Ok(vec![Event::StepFrame]),
        "reset" | "r" => Ok(vec![Event::ResetRange]),
        "export" | "o" => Ok(vec![Event::ExportSample]),
        "quit" | "q" | "esc" | "exit" => Ok(vec![Event::Quit]),
        _ => Err(invalid("unknown command")),
    }
}

/// Commands read from a reader on a helper thread
///
/// The frame loop polls without blocking. When the reader is exhausted a
/// final [`Event::Quit`] is delivered.
pub struct CommandInput {
    receiver: Receiver<Event>,
    closed: bool,
}

impl CommandInput {
    pub fn spawn<R: BufRead + Send + 'static>(reader: R) -> Self {
        let (sender, receiver) = mpsc::channel();

        thread::spawn(move || {
            for line in reader.lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        tracing::warn!("Command input failed: {}", e);
                        break;
                    }
                };

                match parse_command(&line) {
                    Ok(events) => {
                        for event in events {
                            if sender.send(event).is_err() {
                                return;
                            }
                        }
                    }
                    Err(e) => tracing::warn!("{}", e),
                }
            }
            let _ = sender.send(Event::Quit);
        });

        Self {
            receiver,
            closed: false,
        }
    }

    /// Everything that arrived since the last poll
    pub fn poll(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        while !self.closed {
            match self.receiver.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => self.closed = true,
            }
        }
        events
    }

    /// Block until at least one event arrives (or the input closes)
    pub fn wait(&mut self) -> Vec<Event> {
        if self.closed {
            return Vec::new();
        }
        match self.receiver.recv() {
            Ok(first) => {
                let mut events = vec![first];
                events.extend(self.poll());
                events
            }
            Err(_) => {
                self.closed = true;
                Vec::new()
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}
