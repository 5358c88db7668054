use super::utils::{debounce, first_image_file};
use crate::{App, Msg};
use web_sys::{DragEvent, HtmlInputElement};
use wasm_bindgen::JsCast;
use yew::prelude::*;

pub fn render_upload_section(app: &App, ctx: &Context<App>) -> Html {
    if app.camera.is_some() {
        return render_camera_view(app, ctx);
    }
    if app.image.is_some() || app.result.is_some() {
        return html! {};
    }
    render_drop_zone(app, ctx)
}

fn render_drop_zone(app: &App, ctx: &Context<App>) -> Html {
    let link = ctx.link();

    let handle_change = link.callback(|e: Event| {
        let input: HtmlInputElement = e.target_unchecked_into();
        let file = input.files().and_then(|list| first_image_file(&list));
        input.set_value("");

        match file {
            Some(file) => Msg::FileSelected(file),
            None => Msg::SetError(Some("Please select an image file (JPEG, PNG, etc.)".into())),
        }
    });

    let handle_drag_over = link.callback(|e: DragEvent| {
        e.prevent_default();
        Msg::SetDragging(true)
    });

    let handle_drag_leave = link.callback(|e: DragEvent| {
        e.prevent_default();
        Msg::SetDragging(false)
    });

    let handle_drop = link.callback(Msg::HandleDrop);
    let trigger_file_input = Callback::from(|_| {
        if let Some(input) = web_sys::window()
            .unwrap()
            .document()
            .unwrap()
            .get_element_by_id("file-input")
        {
            if let Ok(html_input) = input.dyn_into::<web_sys::HtmlElement>() {
                html_input.click();
            }
        }
    });

    html! {
        <div class="upload-section">
            <input
                type="file"
                id="file-input"
                accept="image/*"
                style="display: none;"
                onchange={handle_change}
            />

            <div
                id="drop-zone"
                class={classes!("upload-area", app.is_dragging.then_some("drag-over"))}
                ondragover={handle_drag_over}
                ondragleave={handle_drag_leave}
                ondrop={handle_drop}
                onclick={debounce(300, {
                    let trigger_file_input = trigger_file_input.clone();
                    move || trigger_file_input.emit(())
                })}
            >
                <div class="upload-placeholder">
                    <i class="fa-solid fa-cloud-arrow-up"></i>
                    <p>{"Drag & drop an image or an image URL here, or click to browse"}</p>
                    <p class="file-types">{"Supported formats: JPG, PNG, WEBP, GIF"}</p>
                </div>
            </div>

            <button
                id="camera-button"
                class="analyze-btn"
                onclick={debounce(300, {
                    let link = link.clone();
                    move || link.callback(|_| Msg::OpenCamera).emit(())
                })}
            >
                <i class="fa-solid fa-camera"></i> {" Use Camera"}
            </button>
        </div>
    }
}

fn render_camera_view(app: &App, ctx: &Context<App>) -> Html {
    let link = ctx.link();

    html! {
        <div id="camera-container" class="camera-container">
            <video
                ref={app.video_ref.clone()}
                class="camera-preview"
                autoplay="autoplay"
                playsinline="playsinline"
            ></video>
            <div class="camera-controls">
                <button
                    id="capture-btn"
                    class="analyze-btn"
                    disabled={app.loading.is_some()}
                    onclick={link.callback(|_| Msg::CapturePhoto)}
                >
                    <i class="fa-solid fa-camera"></i>{" Capture"}
                </button>
                <button
                    id="switch-camera-btn"
                    class="analyze-btn"
                    onclick={link.callback(|_| Msg::SwitchCamera)}
                >
                    <i class="fa-solid fa-rotate"></i>{" Switch Camera"}
                </button>
                <button
                    id="cancel-camera-btn"
                    class="analyze-btn"
                    style="background-color: var(--danger-color);"
                    onclick={link.callback(|_| Msg::CancelCamera)}
                >
                    <i class="fa-solid fa-xmark"></i>{" Cancel"}
                </button>
            </div>
        </div>
    }
}
