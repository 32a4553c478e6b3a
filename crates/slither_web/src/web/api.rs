use slither::catalog::GridSize;
use slither::error::SlitherError;
use slither::snapshot::Snapshot;
use slither::wire::{endpoint, SimulationRequest, SimulationResponse, PING_PATH, SIMULATE_PATH};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

/// POST `body` as JSON and return the response text. Non-2xx statuses are errors.
async fn post_json(url: &str, body: &str) -> Result<String, String> {
    let window = web_sys::window().ok_or("no window")?;

    let headers = web_sys::Headers::new().map_err(|_| "fetch: Headers::new threw".to_string())?;
    headers
        .set("Content-Type", "application/json")
        .map_err(|_| "fetch: failed to set content type".to_string())?;

    let init = web_sys::RequestInit::new();
    init.set_method("POST");
    init.set_headers(&headers);
    init.set_body(&JsValue::from_str(body));

    let request = web_sys::Request::new_with_str_and_init(url, &init)
        .map_err(|_| format!("fetch: invalid request for {url}"))?;

    let resp = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(|_| format!("fetch: {url} unreachable"))?;
    let resp: web_sys::Response = resp
        .dyn_into()
        .map_err(|_| "fetch: unexpected response type".to_string())?;
    if !resp.ok() {
        return Err(format!("fetch: {url} returned HTTP {}", resp.status()));
    }

    let text = resp
        .text()
        .map_err(|_| "fetch: text() threw".to_string())?;
    let text = JsFuture::from(text)
        .await
        .map_err(|_| "fetch: failed to read body".to_string())?;
    text.as_string()
        .ok_or_else(|| "fetch: body is not text".to_string())
}

/// Ask the backend for one full run.
pub(super) async fn simulate(
    base: &str,
    request: &SimulationRequest,
    grid: GridSize,
) -> Result<Vec<Snapshot>, SlitherError> {
    let body = serde_json::to_string(request)?;
    let text = post_json(&endpoint(base, SIMULATE_PATH), &body)
        .await
        .map_err(SlitherError::Transport)?;
    SimulationResponse::decode(&text, grid)
}

/// Wake the backend. Only success matters; the body is ignored.
pub(super) async fn ping(base: &str) -> Result<(), SlitherError> {
    post_json(&endpoint(base, PING_PATH), "{}")
        .await
        .map(|_| ())
        .map_err(SlitherError::Transport)
}
