use super::utils::debounce;
use crate::{App, Msg};
use yew::prelude::*;

pub fn render_preview_area(app: &App, ctx: &Context<App>) -> Html {
    if app.result.is_some() || app.camera.is_some() {
        return html! {};
    }
    let Some(image) = &app.image else {
        return html! {};
    };

    let link = ctx.link().clone();

    html! {
        <div id="preview-container" class="preview-container">
            <img
                id="image-preview"
                src={image.preview_src()}
                alt="Selected image preview"
                style="max-width: 100%; max-height: 400px; object-fit: contain;"
            />
            <div class="button-container">
                <button
                    class="analyze-btn"
                    style="background-color: var(--danger-color);"
                    onclick={debounce(300, {
                        let link = link.clone();
                        move || link.callback(|_| Msg::TryAgain).emit(())
                    })}
                >
                    <i class="fa-solid fa-trash"></i>{" Clear"}
                </button>
                <button
                    id="analyze-btn"
                    class="analyze-btn"
                    disabled={app.loading.is_some()}
                    onclick={debounce(300, {
                        let link = link.clone();
                        move || link.callback(|_| Msg::Analyze).emit(())
                    })}
                >
                    {
                        if app.loading.is_some() {
                            html! { <><i class="fa-solid fa-spinner fa-spin"></i>{" Analyzing..."}</> }
                        } else {
                            html! { <><i class="fa-solid fa-magnifying-glass"></i>{" Is it a hot dog?"}</> }
                        }
                    }
                </button>
            </div>
        </div>
    }
}
