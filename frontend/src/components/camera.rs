//! Camera capture session.
//!
//! The session owns the media stream for one capture interaction. Every exit
//! path — successful capture, cancellation, camera switch, error — stops the
//! acquired tracks exactly once.

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    CanvasRenderingContext2d, ConstrainDoubleRange, HtmlCanvasElement, HtmlVideoElement,
    MediaStream, MediaStreamConstraints, MediaStreamTrack, MediaTrackConstraints, OrientationType,
};
use yew::NodeRef;

/// Which device camera to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacingMode {
    /// Back camera.
    Environment,
    /// Front camera.
    User,
}

impl FacingMode {
    pub fn toggled(self) -> Self {
        match self {
            FacingMode::Environment => FacingMode::User,
            FacingMode::User => FacingMode::Environment,
        }
    }

    pub fn as_constraint(self) -> &'static str {
        match self {
            FacingMode::Environment => "environment",
            FacingMode::User => "user",
        }
    }
}

/// Holder of exclusive device tracks that must be stopped when the session
/// lets go of them.
pub trait StreamHandle {
    fn stop(&self);
}

/// Live `MediaStream` wrapper; `stop` ends every track.
pub struct WebStream(MediaStream);

impl WebStream {
    pub fn new(stream: MediaStream) -> Self {
        Self(stream)
    }

    pub fn media(&self) -> &MediaStream {
        &self.0
    }
}

impl StreamHandle for WebStream {
    fn stop(&self) {
        for track in self.0.get_tracks().iter() {
            if let Ok(track) = track.dyn_into::<MediaStreamTrack>() {
                track.stop();
            }
        }
    }
}

/// One capture interaction's worth of camera state.
pub struct CameraSession<S: StreamHandle> {
    stream: Option<S>,
    facing: FacingMode,
}

impl<S: StreamHandle> CameraSession<S> {
    pub fn new() -> Self {
        Self {
            stream: None,
            facing: FacingMode::Environment,
        }
    }

    pub fn facing(&self) -> FacingMode {
        self.facing
    }

    pub fn stream(&self) -> Option<&S> {
        self.stream.as_ref()
    }

    /// Adopts a freshly opened stream, stopping any stream the session was
    /// already holding.
    pub fn attach(&mut self, stream: S) {
        self.release();
        self.stream = Some(stream);
    }

    /// Stops and drops the held stream. Later calls are no-ops.
    pub fn release(&mut self) {
        if let Some(stream) = self.stream.take() {
            stream.stop();
        }
    }

    /// Stops the current stream and flips between front and back camera.
    /// Returns the facing mode the next stream should be opened with.
    pub fn switch_facing(&mut self) -> FacingMode {
        self.release();
        self.facing = self.facing.toggled();
        self.facing
    }
}

impl<S: StreamHandle> Default for CameraSession<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: StreamHandle> Drop for CameraSession<S> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Opens a camera stream with the given facing mode at an ideal 1920x1080.
pub async fn open_stream(facing: FacingMode) -> Result<MediaStream, String> {
    let window = web_sys::window().ok_or("no window available")?;
    let devices = window
        .navigator()
        .media_devices()
        .map_err(|_| "Camera API is not supported in your browser".to_string())?;

    let video = MediaTrackConstraints::new();
    video.set_facing_mode(&JsValue::from_str(facing.as_constraint()));
    let ideal_width = ConstrainDoubleRange::new();
    ideal_width.set_ideal(1920.0);
    video.set_width(ideal_width.as_ref());
    let ideal_height = ConstrainDoubleRange::new();
    ideal_height.set_ideal(1080.0);
    video.set_height(ideal_height.as_ref());

    let constraints = MediaStreamConstraints::new();
    constraints.set_video(video.as_ref());

    let promise = devices
        .get_user_media_with_constraints(&constraints)
        .map_err(js_error)?;
    let stream = JsFuture::from(promise).await.map_err(js_error)?;
    stream
        .dyn_into::<MediaStream>()
        .map_err(|_| "getUserMedia returned no stream".to_string())
}

/// Points the preview element at the live stream and starts playback.
pub fn bind_preview(video_ref: &NodeRef, stream: &MediaStream) {
    if let Some(video) = video_ref.cast::<HtmlVideoElement>() {
        let already_bound = video.src_object().is_some_and(|s| s.id() == stream.id());
        if !already_bound {
            video.set_src_object(Some(stream));
            let _ = video.play();
        }
    }
}

/// Draws the current video frame onto a canvas and encodes it as JPEG.
pub async fn grab_frame(video: &HtmlVideoElement) -> Result<gloo_file::Blob, String> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or("no document available")?;
    let canvas: HtmlCanvasElement = document
        .create_element("canvas")
        .map_err(js_error)?
        .dyn_into()
        .map_err(|_| "failed to create canvas".to_string())?;

    let width = video.video_width();
    let height = video.video_height();
    if width == 0 || height == 0 {
        return Err("camera preview has no frames yet".into());
    }
    canvas.set_width(width);
    canvas.set_height(height);

    let context = canvas
        .get_context("2d")
        .map_err(js_error)?
        .ok_or("canvas 2d context unavailable")?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| "canvas 2d context unavailable".to_string())?;
    context
        .draw_image_with_html_video_element(video, 0.0, 0.0)
        .map_err(js_error)?;

    let blob = canvas_to_blob(&canvas, "image/jpeg").await?;
    Ok(gloo_file::Blob::from(blob))
}

async fn canvas_to_blob(canvas: &HtmlCanvasElement, mime: &str) -> Result<web_sys::Blob, String> {
    let promise = js_sys::Promise::new(&mut |resolve, reject| {
        let resolve_cb = resolve.clone();
        let reject_cb = reject.clone();
        let callback = Closure::once_into_js(move |blob: JsValue| {
            if blob.is_null() || blob.is_undefined() {
                let _ = reject_cb.call1(
                    &JsValue::NULL,
                    &JsValue::from_str("canvas produced no image data"),
                );
            } else {
                let _ = resolve_cb.call1(&JsValue::NULL, &blob);
            }
        });
        if let Err(e) = canvas.to_blob_with_type(callback.unchecked_ref(), mime) {
            let _ = reject.call1(&JsValue::NULL, &e);
        }
    });

    let blob = JsFuture::from(promise).await.map_err(js_error)?;
    blob.dyn_into::<web_sys::Blob>()
        .map_err(|_| "canvas produced no image data".to_string())
}

/// Rotation hint for the backend normalizer, mirroring the original
/// `window.orientation` convention: touchscreen devices in landscape report
/// ±90, everything else 0.
pub fn capture_rotation() -> i16 {
    let Some(window) = web_sys::window() else {
        return 0;
    };
    if window.navigator().max_touch_points() == 0 {
        return 0;
    }

    let orientation = window.screen().ok().map(|s| s.orientation());
    match orientation.and_then(|o| o.type_().ok()) {
        Some(OrientationType::LandscapePrimary) => 90,
        Some(OrientationType::LandscapeSecondary) => -90,
        _ => 0,
    }
}

fn js_error(value: JsValue) -> String {
    value
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .unwrap_or_else(|| format!("{:?}", value))
}
