use crate::utils::*;
use gloo::net::Error;
use gloo::net::http::Request;
use mirrorlit_core::{LocalSnapshot, Progress};
use mirrorlit_protocol::*;
use wasm_bindgen::JsCast;

impl StorageKey for LocalSnapshot {
    const KEY: &'static str = "mirrorlit:progress:v1";
}

/// Value of the CSRF cookie inside a `document.cookie` string.
pub(crate) fn csrf_from_cookies(cookies: &str) -> Option<&str> {
    cookies
        .split("; ")
        .find_map(|cookie| cookie.strip_prefix(CSRF_COOKIE)?.strip_prefix('='))
}

fn csrf_token() -> String {
    let cookies = gloo::utils::document()
        .dyn_into::<web_sys::HtmlDocument>()
        .ok()
        .and_then(|document| document.cookie().ok())
        .unwrap_or_default();
    csrf_from_cookies(&cookies).unwrap_or_default().to_owned()
}

pub(crate) fn load_local() -> Option<Progress> {
    Option::<LocalSnapshot>::local_or_default().map(|snapshot| snapshot.progress())
}

fn save_local(progress: Progress) {
    Some(LocalSnapshot::new(progress, js_now_millis())).local_save();
}

pub(crate) fn clear_local() {
    None::<LocalSnapshot>.local_save();
}

async fn load_remote() -> Result<Option<Progress>, Error> {
    let response: LoadProgressResponse = Request::get(LOAD_ENDPOINT).send().await?.json().await?;
    Ok(response
        .progress()
        .map(|(level, score)| Progress::new(level, score)))
}

/// Startup progress, never fails: a broken backend falls back to the local snapshot.
pub(crate) async fn load_progress() -> Progress {
    let remote = match load_remote().await {
        Ok(remote) => remote,
        Err(err) => {
            log::warn!("backend load failed, falling back to local storage: {}", err);
            None
        }
    };
    let progress = Progress::resolve(remote, load_local());
    log::info!("resuming at level {} with score {}", progress.level, progress.score);
    progress
}

/// Writes the local snapshot, then pushes `progress` to the backend.
pub(crate) async fn save_progress(progress: Progress) -> Result<(), Error> {
    save_local(progress);

    let body = SaveProgressRequest {
        level: progress.level,
        score: progress.score,
    };
    let response = Request::post(SAVE_ENDPOINT)
        .header(CSRF_HEADER, &csrf_token())
        .json(&body)?
        .send()
        .await?;
    if !response.ok() {
        log::warn!("backend save answered {}", response.status());
    }
    Ok(())
}

pub(crate) async fn fetch_leaderboard() -> Result<Option<LeaderboardResponse>, Error> {
    let response: LeaderboardResponse = Request::get(LEADERBOARD_ENDPOINT)
        .send()
        .await?
        .json()
        .await?;
    Ok(response.success.then_some(response))
}

/// Asks the backend to drop the player's progress, `Ok(false)` when it refused.
pub(crate) async fn reset_remote() -> Result<bool, Error> {
    let response: ResetResponse = Request::post(RESET_ENDPOINT)
        .header(CSRF_HEADER, &csrf_token())
        .header("Content-Type", "application/json")
        .send()
        .await?
        .json()
        .await?;
    Ok(response.success)
}
