mod api;
mod components;

use components::camera::{self, CameraSession, WebStream};
use components::{handlers, header, preview_area, results, upload_section, utils};
use gloo_file::{Blob as GlooBlob, File as GlooFile, ObjectUrl};
use shared::AnalyzeResponse;
use web_sys::{DragEvent, MediaStream};
use yew::prelude::*;

/// The image currently staged for analysis, plus its preview source.
pub enum PendingImage {
    /// Picked or dropped local file.
    File { file: GlooFile, preview: ObjectUrl },
    /// Camera capture with the rotation hint recorded at capture time.
    Capture {
        blob: GlooBlob,
        preview: ObjectUrl,
        rotation: i16,
    },
    /// Dropped URL; the backend fetches it, the preview uses the URL itself.
    Remote { url: String },
}

impl PendingImage {
    pub fn preview_src(&self) -> String {
        match self {
            PendingImage::File { preview, .. } | PendingImage::Capture { preview, .. } => {
                preview.to_string()
            }
            PendingImage::Remote { url } => url.clone(),
        }
    }
}

pub enum Msg {
    // Acquisition
    FileSelected(GlooFile),
    UrlDropped(String),
    HandleDrop(DragEvent),
    SetDragging(bool),

    // Camera session
    OpenCamera,
    CameraStarted(Result<MediaStream, String>),
    SwitchCamera,
    CapturePhoto,
    CaptureFinished(Result<(GlooBlob, i16), String>),
    CancelCamera,

    // Analysis
    Analyze,
    AnalyzeFinished(Result<AnalyzeResponse, String>),

    // UI state
    SetError(Option<String>),
    TryAgain,
}

pub struct App {
    pub image: Option<PendingImage>,
    pub result: Option<AnalyzeResponse>,
    pub loading: Option<String>,
    pub error: Option<String>,
    pub is_dragging: bool,
    pub camera: Option<CameraSession<WebStream>>,
    pub video_ref: NodeRef,
}

impl Component for App {
    type Message = Msg;
    type Properties = ();

    fn create(_ctx: &Context<Self>) -> Self {
        // Nudge the classifier out of cold start; failures are ignored.
        api::wake();

        Self {
            image: None,
            result: None,
            loading: None,
            error: None,
            is_dragging: false,
            camera: None,
            video_ref: NodeRef::default(),
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            // Acquisition
            Msg::FileSelected(file) => handlers::handle_file_selected(self, file),
            Msg::UrlDropped(url) => handlers::handle_url_dropped(self, url),
            Msg::HandleDrop(event) => handlers::handle_drop(self, ctx, event),
            Msg::SetDragging(is_dragging) => {
                self.is_dragging = is_dragging;
                true
            }

            // Camera session
            Msg::OpenCamera => handlers::handle_open_camera(self, ctx),
            Msg::CameraStarted(result) => handlers::handle_camera_started(self, result),
            Msg::SwitchCamera => handlers::handle_switch_camera(self, ctx),
            Msg::CapturePhoto => handlers::handle_capture_photo(self, ctx),
            Msg::CaptureFinished(result) => handlers::handle_capture_finished(self, result),
            Msg::CancelCamera => handlers::handle_cancel_camera(self),

            // Analysis
            Msg::Analyze => handlers::handle_analyze(self, ctx),
            Msg::AnalyzeFinished(result) => handlers::handle_analyze_finished(self, result),

            // UI state
            Msg::SetError(error) => {
                self.error = error;
                self.loading = None;
                true
            }
            Msg::TryAgain => handlers::handle_try_again(self),
        }
    }

    fn rendered(&mut self, _ctx: &Context<Self>, _first_render: bool) {
        // (Re)bind the live stream once the <video> element is in the DOM.
        if let Some(session) = &self.camera {
            if let Some(stream) = session.stream() {
                camera::bind_preview(&self.video_ref, stream.media());
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        html! {
            <div class="container">
                { header::render_header() }

                <main class="main-content">
                    { upload_section::render_upload_section(self, ctx) }
                    { preview_area::render_preview_area(self, ctx) }
                    { results::render_results(self, ctx) }
                    { utils::render_error_message(self) }
                    { utils::render_loading(self) }
                </main>

                <footer class="app-footer">
                    <p>{"Hotdog or Not | Fullstack Rust WASM"}</p>
                </footer>
            </div>
        }
    }
}

fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("App starting...");
    yew::Renderer::<App>::new().render();
}
