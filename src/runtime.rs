//! Runtime - timers for the single-threaded event loop
//!
//! Natively this is tokio; in the browser a `setTimeout` promise.

use futures::{future::FutureExt, pin_mut, select};
use std::future::Future;
use std::time::Duration;

#[cfg(not(any(feature = "native", all(feature = "wasm", target_arch = "wasm32"))))]
compile_error!("enable the `native` feature, or build for wasm32 with the `wasm` feature");

/// The bounded wait ran out before the future resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Elapsed;

impl std::fmt::Display for Elapsed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("deadline elapsed")
    }
}

impl std::error::Error for Elapsed {}

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub async fn sleep(duration: Duration) {
    use wasm_bindgen::JsValue;

    let ms = duration.as_millis().min(i32::MAX as u128) as i32;
    let promise = js_sys::Promise::new(&mut |resolve, _reject| match web_sys::window() {
        Some(window) => {
            let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms);
        }
        None => {
            let _ = resolve.call0(&JsValue::NULL);
        }
    });
    let _ = wasm_bindgen_futures::JsFuture::from(promise).await;
}

#[cfg(all(feature = "native", not(all(feature = "wasm", target_arch = "wasm32"))))]
pub async fn sleep(duration: Duration) {
    tokio::time::sleep(duration).await;
}

/// Race `future` against a timer. On expiry the future is dropped, which
/// abandons it; nothing is cancelled on the remote side.
pub async fn with_timeout<F: Future>(duration: Duration, future: F) -> Result<F::Output, Elapsed> {
    let future = future.fuse();
    let timer = sleep(duration).fuse();
    pin_mut!(future, timer);
    select! {
        output = future => Ok(output),
        _ = timer => Err(Elapsed),
    }
}
