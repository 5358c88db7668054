use super::camera::{self, CameraSession, StreamHandle, WebStream};
use crate::api;
use crate::{App, Msg, PendingImage};
use gloo_file::ObjectUrl;
use wasm_bindgen_futures::spawn_local;
use web_sys::{DragEvent, FormData, MediaStream};
use yew::prelude::*;

pub fn handle_file_selected(app: &mut App, file: gloo_file::File) -> bool {
    let preview = ObjectUrl::from(file.clone());
    app.image = Some(PendingImage::File { file, preview });
    app.result = None;
    app.error = None;
    true
}

pub fn handle_url_dropped(app: &mut App, url: String) -> bool {
    app.image = Some(PendingImage::Remote { url });
    app.result = None;
    app.error = None;
    true
}

pub fn handle_drop(app: &mut App, ctx: &Context<App>, event: DragEvent) -> bool {
    event.prevent_default();
    app.is_dragging = false;

    let Some(data_transfer) = event.data_transfer() else {
        return true;
    };

    if let Some(file_list) = data_transfer.files() {
        if file_list.length() > 0 {
            match super::utils::first_image_file(&file_list) {
                Some(file) => ctx.link().send_message(Msg::FileSelected(file)),
                None => ctx.link().send_message(Msg::SetError(Some(
                    "Please drop an image file (JPEG, PNG, etc.)".into(),
                ))),
            }
            return true;
        }
    }

    // Images dragged from another tab arrive as a URL string.
    let mut url = data_transfer.get_data("text/uri-list").unwrap_or_default();
    if url.is_empty() {
        url = data_transfer.get_data("text/plain").unwrap_or_default();
    }
    let url = url.lines().next().unwrap_or("").trim().to_string();
    if url.starts_with("http") {
        ctx.link().send_message(Msg::UrlDropped(url));
    }
    true
}

pub fn handle_open_camera(app: &mut App, ctx: &Context<App>) -> bool {
    app.result = None;
    app.error = None;
    app.loading = Some("Starting camera...".into());

    let facing = app.camera.get_or_insert_with(CameraSession::new).facing();
    start_stream(ctx, facing);
    true
}

fn start_stream(ctx: &Context<App>, facing: camera::FacingMode) {
    let link = ctx.link().clone();
    spawn_local(async move {
        let result = camera::open_stream(facing)
            .await
            .map_err(|e| format!("Error accessing camera: {}", e));
        link.send_message(Msg::CameraStarted(result));
    });
}

pub fn handle_camera_started(app: &mut App, result: Result<MediaStream, String>) -> bool {
    match result {
        Ok(stream) => match app.camera.as_mut() {
            Some(session) => {
                session.attach(WebStream::new(stream));
                app.loading = None;
            }
            None => {
                // The user cancelled while the permission prompt was open.
                WebStream::new(stream).stop();
            }
        },
        Err(message) => {
            if let Some(mut session) = app.camera.take() {
                session.release();
            }
            app.loading = None;
            app.error = Some(message);
        }
    }
    true
}

pub fn handle_switch_camera(app: &mut App, ctx: &Context<App>) -> bool {
    let Some(session) = app.camera.as_mut() else {
        return false;
    };

    app.loading = Some("Switching camera...".into());
    let facing = session.switch_facing();
    start_stream(ctx, facing);
    true
}

pub fn handle_capture_photo(app: &mut App, ctx: &Context<App>) -> bool {
    let Some(video) = app.video_ref.cast::<web_sys::HtmlVideoElement>() else {
        app.error = Some("Camera is not ready yet.".into());
        return true;
    };
    app.loading = Some("Capturing...".into());

    let link = ctx.link().clone();
    spawn_local(async move {
        let rotation = camera::capture_rotation();
        let result = camera::grab_frame(&video)
            .await
            .map(|blob| (blob, rotation))
            .map_err(|e| format!("Error capturing photo: {}", e));
        link.send_message(Msg::CaptureFinished(result));
    });
    true
}

pub fn handle_capture_finished(
    app: &mut App,
    result: Result<(gloo_file::Blob, i16), String>,
) -> bool {
    if let Some(mut session) = app.camera.take() {
        session.release();
    }

    match result {
        Ok((blob, rotation)) => {
            let preview = ObjectUrl::from(blob.clone());
            app.image = Some(PendingImage::Capture {
                blob,
                preview,
                rotation,
            });
            app.loading = None;
            app.error = None;
        }
        Err(message) => {
            app.loading = None;
            app.error = Some(message);
        }
    }
    true
}

pub fn handle_cancel_camera(app: &mut App) -> bool {
    if let Some(mut session) = app.camera.take() {
        session.release();
    }
    app.loading = None;
    true
}

pub fn handle_analyze(app: &mut App, ctx: &Context<App>) -> bool {
    let Some(image) = &app.image else {
        app.error = Some("No image selected for analysis.".into());
        return true;
    };

    let form = match build_form(image) {
        Ok(form) => form,
        Err(()) => {
            app.error = Some("Failed to prepare the upload.".into());
            return true;
        }
    };

    app.loading = Some("Analyzing...".into());
    app.error = None;

    let link = ctx.link().clone();
    spawn_local(async move {
        link.send_message(Msg::AnalyzeFinished(api::analyze(form).await));
    });
    true
}

fn build_form(image: &PendingImage) -> Result<FormData, ()> {
    let form = FormData::new().map_err(|_| ())?;
    match image {
        PendingImage::File { file, .. } => {
            form.append_with_blob("image", file.as_ref()).map_err(|_| ())?;
        }
        PendingImage::Capture { blob, rotation, .. } => {
            form.append_with_blob_and_filename("image", blob.as_ref(), "camera-photo.jpg")
                .map_err(|_| ())?;
            form.append_with_str("rotation", &rotation.to_string())
                .map_err(|_| ())?;
        }
        PendingImage::Remote { url } => {
            form.append_with_str("image_url", url).map_err(|_| ())?;
        }
    }
    Ok(form)
}

pub fn handle_analyze_finished(
    app: &mut App,
    result: Result<shared::AnalyzeResponse, String>,
) -> bool {
    app.loading = None;
    match result {
        Ok(response) => {
            app.result = Some(response);
            app.error = None;
        }
        // Keep the preview so the user can retry from where they were.
        Err(message) => {
            app.error = Some(message);
        }
    }
    true
}

pub fn handle_try_again(app: &mut App) -> bool {
    if let Some(mut session) = app.camera.take() {
        session.release();
    }
    app.image = None;
    app.result = None;
    app.error = None;
    app.loading = None;
    true
}
