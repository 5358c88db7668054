use crate::App;
use gloo_file::File as GlooFile;
use gloo_timers::callback::Timeout;
use std::cell::RefCell;
use std::rc::Rc;
use web_sys::FileList;
use yew::prelude::*;

// Debounce function to limit button events
pub fn debounce<F>(duration: i32, callback: F) -> Callback<MouseEvent>
where
    F: Fn() + Clone + 'static,
{
    let timeout = Rc::new(RefCell::new(None::<Timeout>));
    let timeout_clone = Rc::clone(&timeout);

    Callback::from(move |_| {
        let mut timeout_ref = timeout_clone.borrow_mut();

        if let Some(old_timeout) = timeout_ref.take() {
            old_timeout.cancel();
        }

        let inner_callback = callback.clone();
        let new_timeout = Timeout::new(duration as u32, move || {
            inner_callback();
        });

        *timeout_ref = Some(new_timeout);
    })
}

/// First dropped/picked file whose declared type is an image.
pub fn first_image_file(file_list: &FileList) -> Option<GlooFile> {
    (0..file_list.length())
        .filter_map(|i| file_list.item(i))
        .find(|file| file.type_().starts_with("image/"))
        .map(GlooFile::from)
}

pub fn render_error_message(app: &App) -> Html {
    if let Some(error_msg) = &app.error {
        html! {
            <div class="error-message">
                <i class="fa-solid fa-circle-exclamation"></i>
                <p>{ error_msg }</p>
            </div>
        }
    } else {
        html! {}
    }
}

pub fn render_loading(app: &App) -> Html {
    if let Some(text) = &app.loading {
        html! {
            <div id="loading" class="loading">
                <i class="fa-solid fa-spinner fa-spin"></i>
                <p id="loading-text">{ text }</p>
            </div>
        }
    } else {
        html! {}
    }
}
