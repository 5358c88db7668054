use super::utils::debounce;
use crate::{App, Msg};
use yew::prelude::*;

pub fn render_results(app: &App, ctx: &Context<App>) -> Html {
    let Some(result) = &app.result else {
        return html! {};
    };

    let link = ctx.link().clone();
    let confidence = (result.confidence * 100.0).round();

    html! {
        <div class={classes!("results-container", if result.is_hot_dog { "hotdog" } else { "not-hotdog" })}>
            <div class="result-header">
                {
                    if result.is_hot_dog {
                        html! {
                            <>
                                <h2>{"🌭 It's a Hotdog! 🌭"}</h2>
                                <p>{ format!("Confidence: {}%", confidence) }</p>
                            </>
                        }
                    } else {
                        html! {
                            <>
                                <h2>{"❌ Not a Hotdog ❌"}</h2>
                                <p>{"I'm pretty sure this is not a Hotdog."}</p>
                            </>
                        }
                    }
                }
            </div>
            <details class="debug-info">
                <summary>{"Debug Info"}</summary>
                <p>{"Top 3 predictions:"}</p>
                <ul>
                    { for result.debug.top3_predictions.iter().map(|p| html! { <li>{ p }</li> }) }
                </ul>
                <p>{ format!("Image size: {:.2} KB", result.debug.image_size as f64 / 1024.0) }</p>
            </details>
            <button
                id="try-again-btn"
                class="analyze-btn"
                onclick={debounce(300, {
                    let link = link.clone();
                    move || link.callback(|_| Msg::TryAgain).emit(())
                })}
            >
                <i class="fa-solid fa-arrow-rotate-left"></i>{" Try Again"}
            </button>
        </div>
    }
}
