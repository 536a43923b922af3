//! OpenCV implementations of the capture, display, tracking and motion traits.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use log::{debug, info, warn};
use ndarray::Array2;
use opencv::{
    core::{self, Mat, Point as CvPoint, Ptr, Rect, Scalar, Size, Vector},
    highgui, imgproc,
    prelude::*,
    tracking::{TrackerKCF, TrackerKCF_Params},
    video::{self, BackgroundSubtractorMOG2},
    videoio::{self, VideoCapture},
};
use thiserror::Error;

use super::capture::{FrameSource, KeyCode, Window};
use super::detector::MotionDetector;
use crate::config::{Input, MotionConfig, SourceConfig};
use crate::render::{Canvas, Color};
use crate::selection::PointerEvent;
use crate::tracker::{
    BoundingBox, GrayFrame, MotionBlob, ObjectTracker, Point, TemplateConfig, TemplateError,
    TemplateTracker,
};

fn cv_point(p: Point) -> CvPoint {
    CvPoint::new(p.x, p.y)
}

fn cv_rect(bbox: BoundingBox) -> Rect {
    Rect::new(bbox.x, bbox.y, bbox.width, bbox.height)
}

fn from_cv_rect(rect: Rect) -> BoundingBox {
    BoundingBox::new(rect.x, rect.y, rect.width, rect.height)
}

fn scalar(color: Color) -> Scalar {
    Scalar::new(f64::from(color.b), f64::from(color.g), f64::from(color.r), 0.0)
}

fn to_gray(frame: &Mat) -> opencv::Result<Mat> {
    if frame.channels() == 1 {
        return frame.try_clone();
    }
    let mut gray = Mat::default();
    imgproc::cvt_color_def(frame, &mut gray, imgproc::COLOR_BGR2GRAY)?;
    Ok(gray)
}

/// Camera or video file read through `VideoCapture`.
pub struct VideoSource {
    capture: VideoCapture,
    grayscale: bool,
}

impl VideoSource {
    pub fn open(config: &SourceConfig) -> opencv::Result<Self> {
        let input = config.input();
        let mut capture = match &input {
            Input::Camera(index) => VideoCapture::new(*index, videoio::CAP_ANY)?,
            Input::File(path) => VideoCapture::from_file(&path.to_string_lossy(), videoio::CAP_ANY)?,
        };
        if !capture.is_opened()? {
            return Err(opencv::Error::new(
                core::StsError,
                format!("failed to open {input:?}"),
            ));
        }

        if let Some(fps) = config.fps {
            if !capture.set(videoio::CAP_PROP_FPS, fps)? {
                warn!("capture rate {fps} not supported by {input:?}");
            }
        }
        if let Some([width, height]) = config.resolution {
            let width_ok = capture.set(videoio::CAP_PROP_FRAME_WIDTH, f64::from(width))?;
            let height_ok = capture.set(videoio::CAP_PROP_FRAME_HEIGHT, f64::from(height))?;
            if !(width_ok && height_ok) {
                warn!("resolution {width}x{height} not supported by {input:?}");
            }
        }

        info!(
            "opened {input:?}: {}x{} at {} fps",
            capture.get(videoio::CAP_PROP_FRAME_WIDTH)?,
            capture.get(videoio::CAP_PROP_FRAME_HEIGHT)?,
            capture.get(videoio::CAP_PROP_FPS)?
        );
        Ok(Self {
            capture,
            grayscale: config.grayscale,
        })
    }
}

impl FrameSource for VideoSource {
    type Frame = Mat;
    type Error = opencv::Error;

    fn read(&mut self) -> Result<Option<Mat>, Self::Error> {
        let mut frame = Mat::default();
        if !self.capture.read(&mut frame)? || frame.empty() {
            return Ok(None);
        }
        if !self.grayscale {
            return Ok(Some(frame));
        }

        // Back to three channels so colored annotations stay visible.
        let gray = to_gray(&frame)?;
        let mut bgr = Mat::default();
        imgproc::cvt_color_def(&gray, &mut bgr, imgproc::COLOR_GRAY2BGR)?;
        Ok(Some(bgr))
    }
}

impl Drop for VideoSource {
    fn drop(&mut self) {
        if let Err(e) = self.capture.release() {
            warn!("failed to release capture: {e}");
        }
    }
}

/// HighGUI window with a mouse callback feeding a pointer event queue.
pub struct HighGuiWindow {
    name: String,
    events: Arc<Mutex<VecDeque<PointerEvent>>>,
}

impl HighGuiWindow {
    /// Open `name`, resizable to `size` when given, otherwise autosized.
    pub fn open(name: &str, size: Option<[i32; 2]>) -> opencv::Result<Self> {
        let name = name.to_string();
        match size {
            Some([width, height]) => {
                highgui::named_window(&name, highgui::WINDOW_NORMAL)?;
                highgui::resize_window(&name, width, height)?;
            }
            None => highgui::named_window(&name, highgui::WINDOW_AUTOSIZE)?,
        }

        let events = Arc::new(Mutex::new(VecDeque::new()));
        let sink = Arc::clone(&events);
        highgui::set_mouse_callback(
            &name,
            Some(Box::new(move |event, x, y, _flags| {
                let p = Point::new(x, y);
                let event = match event {
                    highgui::EVENT_LBUTTONDOWN => PointerEvent::Down(p),
                    highgui::EVENT_MOUSEMOVE => PointerEvent::Move(p),
                    highgui::EVENT_LBUTTONUP => PointerEvent::Up(p),
                    _ => return,
                };
                if let Ok(mut queue) = sink.lock() {
                    queue.push_back(event);
                }
            })),
        )?;

        Ok(Self { name, events })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Window for HighGuiWindow {
    type Frame = Mat;
    type Error = opencv::Error;

    fn show(&mut self, frame: &Mat) -> Result<(), Self::Error> {
        highgui::imshow(&self.name, frame)
    }

    fn poll_key(&mut self, timeout_ms: i32) -> Result<Option<KeyCode>, Self::Error> {
        let key = highgui::wait_key(timeout_ms)?;
        Ok((key >= 0).then_some(KeyCode(key & 0xFF)))
    }

    fn take_pointer_events(&mut self) -> Vec<PointerEvent> {
        match self.events.lock() {
            Ok(mut queue) => queue.drain(..).collect(),
            Err(poisoned) => poisoned.into_inner().drain(..).collect(),
        }
    }
}

impl Drop for HighGuiWindow {
    fn drop(&mut self) {
        if let Err(e) = highgui::destroy_window(&self.name) {
            debug!("failed to close window {}: {e}", self.name);
        }
    }
}

/// Drawing failures only cost an annotation, so they are logged and dropped.
impl Canvas for Mat {
    fn size(&self) -> (i32, i32) {
        (self.cols(), self.rows())
    }

    fn line(&mut self, from: Point, to: Point, color: Color, thickness: i32) {
        let result = imgproc::line(
            self,
            cv_point(from),
            cv_point(to),
            scalar(color),
            thickness,
            imgproc::LINE_8,
            0,
        );
        if let Err(e) = result {
            debug!("line failed: {e}");
        }
    }

    fn rectangle(&mut self, top_left: Point, bottom_right: Point, color: Color, thickness: i32) {
        let result = imgproc::rectangle_points(
            self,
            cv_point(top_left),
            cv_point(bottom_right),
            scalar(color),
            thickness,
            imgproc::LINE_8,
            0,
        );
        if let Err(e) = result {
            debug!("rectangle failed: {e}");
        }
    }

    fn circle(&mut self, center: Point, radius: i32, color: Color, thickness: i32) {
        let result = imgproc::circle(
            self,
            cv_point(center),
            radius,
            scalar(color),
            thickness,
            imgproc::LINE_8,
            0,
        );
        if let Err(e) = result {
            debug!("circle failed: {e}");
        }
    }

    fn text(&mut self, text: &str, origin: Point, scale: f64, color: Color, thickness: i32) {
        let result = imgproc::put_text(
            self,
            text,
            cv_point(origin),
            imgproc::FONT_HERSHEY_SIMPLEX,
            scale,
            scalar(color),
            thickness,
            imgproc::LINE_8,
            false,
        );
        if let Err(e) = result {
            debug!("text failed: {e}");
        }
    }
}

/// OpenCV KCF correlation-filter tracker.
///
/// A new KCF instance is created on every `init`, so a re-selection never
/// inherits the previous target's model.
#[derive(Default)]
pub struct KcfTracker {
    inner: Option<Ptr<TrackerKCF>>,
}

impl KcfTracker {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ObjectTracker for KcfTracker {
    type Frame = Mat;
    type Error = opencv::Error;

    fn init(&mut self, frame: &Mat, bbox: BoundingBox) -> Result<(), Self::Error> {
        self.inner = None;
        let mut tracker = TrackerKCF::create(TrackerKCF_Params::default()?)?;
        tracker.init(frame, cv_rect(bbox))?;
        self.inner = Some(tracker);
        Ok(())
    }

    fn update(&mut self, frame: &Mat) -> Result<Option<BoundingBox>, Self::Error> {
        let Some(tracker) = self.inner.as_mut() else {
            return Err(opencv::Error::new(
                core::StsError,
                "KCF tracker used before init",
            ));
        };
        let mut rect = Rect::default();
        if tracker.update(frame, &mut rect)? {
            Ok(Some(from_cv_rect(rect)))
        } else {
            Ok(None)
        }
    }
}

#[derive(Debug, Error)]
pub enum TemplateMatError {
    #[error(transparent)]
    OpenCv(#[from] opencv::Error),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error("frame is not a contiguous 8-bit image")]
    Layout(#[from] ndarray::ShapeError),
}

/// [`TemplateTracker`] fed with `Mat` frames converted to grayscale arrays.
pub struct TemplateMatTracker {
    inner: TemplateTracker,
}

impl TemplateMatTracker {
    pub fn new(config: TemplateConfig) -> Self {
        Self {
            inner: TemplateTracker::new(config),
        }
    }

    fn gray_frame(frame: &Mat) -> Result<GrayFrame, TemplateMatError> {
        let gray = to_gray(frame)?;
        let (rows, cols) = (gray.rows() as usize, gray.cols() as usize);
        let data = gray.data_bytes()?.to_vec();
        Ok(Array2::from_shape_vec((rows, cols), data)?)
    }
}

impl ObjectTracker for TemplateMatTracker {
    type Frame = Mat;
    type Error = TemplateMatError;

    fn init(&mut self, frame: &Mat, bbox: BoundingBox) -> Result<(), Self::Error> {
        let gray = Self::gray_frame(frame)?;
        Ok(self.inner.init(&gray, bbox)?)
    }

    fn update(&mut self, frame: &Mat) -> Result<Option<BoundingBox>, Self::Error> {
        let gray = Self::gray_frame(frame)?;
        Ok(self.inner.update(&gray)?)
    }
}

/// MOG2 background subtraction followed by contour extraction.
pub struct Mog2Detector {
    subtractor: Ptr<BackgroundSubtractorMOG2>,
    grayscale_input: bool,
    blur_kernel: i32,
    threshold: f64,
    erode_iterations: i32,
    dilate_iterations: i32,
}

impl Mog2Detector {
    pub fn new(config: &MotionConfig) -> opencv::Result<Self> {
        let subtractor = video::create_background_subtractor_mog2(
            config.history,
            config.var_threshold,
            config.detect_shadows,
        )?;
        Ok(Self {
            subtractor,
            grayscale_input: config.grayscale_input,
            blur_kernel: config.blur_kernel,
            threshold: config.threshold,
            erode_iterations: config.erode_iterations,
            dilate_iterations: config.dilate_iterations,
        })
    }

    fn foreground_mask(&mut self, frame: &Mat) -> opencv::Result<Mat> {
        let mut mask = Mat::default();
        if self.grayscale_input {
            let gray = to_gray(frame)?;
            self.subtractor.apply(&gray, &mut mask, -1.0)?;
        } else {
            self.subtractor.apply(frame, &mut mask, -1.0)?;
        }

        if self.blur_kernel > 1 {
            let mut blurred = Mat::default();
            let ksize = Size::new(self.blur_kernel, self.blur_kernel);
            imgproc::gaussian_blur_def(&mask, &mut blurred, ksize, 0.0)?;
            mask = blurred;
        }

        let mut binary = Mat::default();
        imgproc::threshold(&mask, &mut binary, self.threshold, 255.0, imgproc::THRESH_BINARY)?;

        let kernel = Mat::default();
        if self.erode_iterations > 0 {
            let mut eroded = Mat::default();
            imgproc::erode(
                &binary,
                &mut eroded,
                &kernel,
                CvPoint::new(-1, -1),
                self.erode_iterations,
                core::BORDER_CONSTANT,
                Scalar::default(),
            )?;
            binary = eroded;
        }
        if self.dilate_iterations > 0 {
            let mut dilated = Mat::default();
            imgproc::dilate(
                &binary,
                &mut dilated,
                &kernel,
                CvPoint::new(-1, -1),
                self.dilate_iterations,
                core::BORDER_CONSTANT,
                Scalar::default(),
            )?;
            binary = dilated;
        }
        Ok(binary)
    }
}

impl MotionDetector for Mog2Detector {
    type Frame = Mat;
    type Error = opencv::Error;

    fn detect(&mut self, frame: &Mat) -> Result<Vec<MotionBlob>, Self::Error> {
        let mask = self.foreground_mask(frame)?;

        let mut contours = Vector::<Vector<CvPoint>>::new();
        imgproc::find_contours_def(
            &mask,
            &mut contours,
            imgproc::RETR_EXTERNAL,
            imgproc::CHAIN_APPROX_SIMPLE,
        )?;

        contours
            .iter()
            .map(|contour| {
                Ok(MotionBlob {
                    bbox: from_cv_rect(imgproc::bounding_rect(&contour)?),
                    area: imgproc::contour_area_def(&contour)?,
                })
            })
            .collect()
    }
}
