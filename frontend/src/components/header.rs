use yew::prelude::*;

/// Renders the application header
pub fn render_header() -> Html {
    html! {
        <header class="app-header">
            <h1><i class="fa-solid fa-hotdog"></i> {" Hotdog or Not?"}</h1>
            <p class="subtitle">{"Drop an image, drop an image URL, or use your camera"}</p>
        </header>
    }
}
