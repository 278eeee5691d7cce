//! Frame-by-frame video playback driver.
//!
//! An `ez-ffmpeg` pipeline decodes the file to rgb24 and a frame-filter tap
//! pushes every frame through a bounded queue. The send blocks (polling the
//! stop flag) instead of dropping, so a source with N decodable frames
//! yields exactly N frames, in stream order. The UI side consumes at most
//! one frame per rendered frame.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::{anyhow, Result};
use crossbeam_channel::{Receiver, SendTimeoutError, Sender, TryRecvError};
use ez_ffmpeg::core::context::null_output::create_null_output;
use ez_ffmpeg::filter::frame_filter::FrameFilter;
use ez_ffmpeg::filter::frame_filter_context::FrameFilterContext;
use ez_ffmpeg::filter::frame_pipeline_builder::FramePipelineBuilder;
use ez_ffmpeg::{AVMediaType, FfmpegContext, Frame, Input};
use image::RgbImage;

/// Extensions offered by the video file dialog.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi"];

/// How long the decode tap waits on a full queue before re-checking the
/// stop flag.
const SEND_POLL: Duration = Duration::from_millis(50);
const FRAME_QUEUE_DEPTH: usize = 2;

pub enum VideoPoll {
    Frame(RgbImage),
    /// Decoding is behind; try again next frame.
    Pending,
    /// End of stream (not an error).
    Finished,
}

/// A running playback session. Dropping it stops decoding and releases the
/// source.
pub struct VideoSession {
    rx: Receiver<RgbImage>,
    stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl VideoSession {
    /// Open `path` and start decoding. Fails without starting a session if
    /// the source cannot be opened; no frame is produced in that case.
    pub fn open(path: &str) -> Result<Self> {
        let (tx, rx) = crossbeam_channel::bounded(FRAME_QUEUE_DEPTH);
        let stop = Arc::new(AtomicBool::new(false));

        let tap = FrameTap {
            tx,
            stop: Arc::clone(&stop),
            frames: 0,
        };
        let pipeline: FramePipelineBuilder = AVMediaType::AVMEDIA_TYPE_VIDEO.into();
        let pipeline = pipeline.filter("frame-tap", Box::new(tap));
        let output = create_null_output().add_frame_pipeline(pipeline);

        let context = FfmpegContext::builder()
            .input(Input::new(path))
            .filter_descs(["format=rgb24"].into())
            .output(output)
            .build()
            .map_err(|e| anyhow!("unable to open video {:?}: {}", path, e))?;
        let scheduler = context
            .start()
            .map_err(|e| anyhow!("unable to open video {:?}: {}", path, e))?;

        let source = path.to_string();
        let worker = std::thread::spawn(move || {
            let _ = scheduler.wait();
            log::info!("video source released: {}", source);
        });

        Ok(Self {
            rx,
            stop,
            worker: Some(worker),
        })
    }

    /// Yield at most one frame per call. Disconnect after the queue drains
    /// marks the end of the stream.
    pub fn poll(&mut self) -> VideoPoll {
        match self.rx.try_recv() {
            Ok(frame) => VideoPoll::Frame(frame),
            Err(TryRecvError::Empty) => VideoPoll::Pending,
            Err(TryRecvError::Disconnected) => VideoPoll::Finished,
        }
    }

    /// Ask the decode pipeline to stop; the tap observes the flag at its
    /// next frame.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

impl Drop for VideoSession {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        // unblock a tap waiting on the full queue, then wait for the
        // pipeline to tear the source down
        while self.rx.try_recv().is_ok() {}
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

/// Decode tap: copies each rgb24 frame out of the pipeline into the queue.
struct FrameTap {
    tx: Sender<RgbImage>,
    stop: Arc<AtomicBool>,
    frames: u64,
}

impl FrameFilter for FrameTap {
    fn media_type(&self) -> AVMediaType {
        AVMediaType::AVMEDIA_TYPE_VIDEO
    }

    fn init(&mut self, _ctx: &FrameFilterContext) -> Result<(), String> {
        log::debug!("video decode started");
        Ok(())
    }

    fn filter_frame(
        &mut self,
        frame: Frame,
        _ctx: &FrameFilterContext,
    ) -> Result<Option<Frame>, String> {
        if self.stop.load(Ordering::Relaxed) {
            return Err("playback stopped".to_string());
        }

        let Some(rgb) = rgb24_frame(&frame) else {
            // empty or corrupt frame, skip it
            return Ok(None);
        };

        let mut pending = rgb;
        loop {
            if self.stop.load(Ordering::Relaxed) {
                return Err("playback stopped".to_string());
            }
            match self.tx.send_timeout(pending, SEND_POLL) {
                Ok(()) => break,
                Err(SendTimeoutError::Timeout(frame)) => pending = frame,
                Err(SendTimeoutError::Disconnected(_)) => {
                    return Err("playback stopped".to_string())
                }
            }
        }
        self.frames += 1;

        Ok(Some(frame))
    }

    fn uninit(&mut self, _ctx: &FrameFilterContext) {
        log::debug!("video decode finished after {} frames", self.frames);
    }
}

/// Copy a decoded rgb24 frame out of FFmpeg's (linesize-padded) buffer.
fn rgb24_frame(frame: &Frame) -> Option<RgbImage> {
    unsafe {
        if frame.as_ptr().is_null() || frame.is_empty() || frame.is_corrupt() {
            return None;
        }

        let raw = frame.as_ptr();
        let width = (*raw).width as u32;
        let height = (*raw).height as u32;
        if width == 0 || height == 0 {
            return None;
        }

        let data = (*raw).data[0];
        let stride = (*raw).linesize[0] as usize;
        let row_bytes = width as usize * 3;
        if data.is_null() || stride < row_bytes {
            return None;
        }

        let mut buf = Vec::with_capacity(row_bytes * height as usize);
        for row in 0..height as usize {
            let src = std::slice::from_raw_parts(data.add(row * stride), row_bytes);
            buf.extend_from_slice(src);
        }
        RgbImage::from_raw(width, height, buf)
    }
}
