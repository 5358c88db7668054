use gloo_net::http::Request;
use shared::{AnalyzeResponse, ErrorResponse};
use wasm_bindgen_futures::spawn_local;
use web_sys::FormData;

/// POSTs the staged image to the backend. Failures are mapped to the
/// user-facing message from the tagged error body, never guessed from text.
pub async fn analyze(form: FormData) -> Result<AnalyzeResponse, String> {
    let request = Request::post("/api/analyze")
        .body(form)
        .map_err(|e| format!("Failed to build request: {}", e))?;

    let response = request
        .send()
        .await
        .map_err(|e| format!("Network error: {}", e))?;

    if response.ok() {
        response
            .json::<AnalyzeResponse>()
            .await
            .map_err(|e| format!("Failed to parse response: {}", e))
    } else {
        let status = response.status();
        match response.json::<ErrorResponse>().await {
            Ok(error) => Err(format!("{}\n\nDetails: {}", error.error, error.details)),
            Err(_) => Err(format!("Server error: {}", status)),
        }
    }
}

/// Fire-and-forget warm-up ping. The remote classifier may cold-start;
/// nothing depends on this call succeeding.
pub fn wake() {
    spawn_local(async {
        match Request::post("/api/wake").send().await {
            Ok(response) if !response.ok() => {
                gloo_console::log!("API wake-up call failed, but continuing anyway");
            }
            Ok(response) => log::debug!("wake-up call returned {}", response.status()),
            Err(e) => {
                gloo_console::log!(format!(
                    "API wake-up call failed, but continuing anyway: {e}"
                ));
            }
        }
    });
}
