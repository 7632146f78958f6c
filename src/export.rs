use crate::capture::CaptureSource;
use crate::error::Result;
use crate::keying::{key_frame, to_hsv, Frame, KeyParams};
use crate::output::OutputSink;
use std::time::Instant;

/// Key every remaining frame of `source` into `sink`
///
/// Each frame gets a fresh spill working copy, so nothing carries over between
/// frames. Returns the number of frames written.
pub fn export_sample(
    source: &mut dyn CaptureSource,
    sink: &mut dyn OutputSink,
    background: &Frame,
    params: &KeyParams,
) -> Result<u64> {
    let _span = tracing::info_span!("export").entered();
    let info = source.stream_info();
    tracing::info!(
        "Writing sample video ({}x{} @ {} fps)",
        info.width,
        info.height,
        info.frame_rate
    );

    let start = Instant::now();
    let mut written = 0u64;
    while let Some(frame) = source.capture_frame()? {
        let hsv = to_hsv(&frame);
        let mut working = hsv.clone();
        let keyed = key_frame(&hsv, &mut working, background, params)?;
        sink.write_frame(&keyed.composite)?;
        written += 1;
    }

    tracing::info!(
        "Done writing sample video: {} frames in {:.1}s",
        written,
        start.elapsed().as_secs_f64()
    );
    Ok(written)
}
