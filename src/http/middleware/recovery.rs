//! Panic recovery.
//!
//! A panic inside the wrapped stack is caught at this boundary, logged with
//! the backtrace taken at the panic site, and turned into a 500
//! `InternalFault` response. The connection and the process stay healthy.

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use futures_util::FutureExt;
use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

use crate::http::error::ApiError;
use crate::http::middleware::status::CapturedStatus;
use crate::http::request::request_id_of;
use crate::observability::metrics;

thread_local! {
    // The hook runs on the panicking thread, which is also the thread
    // polling the catch_unwind future below.
    static PANIC_TRACE: RefCell<Option<String>> = const { RefCell::new(None) };
}

static HOOK: Once = Once::new();

/// Chain a hook that stashes the panic-site backtrace for [`recover_panics`].
pub fn install_panic_hook() {
    HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let trace = Backtrace::force_capture().to_string();
            PANIC_TRACE.with(|slot| *slot.borrow_mut() = Some(trace));
            previous(info);
        }));
    });
}

fn take_trace() -> String {
    PANIC_TRACE
        .with(|slot| slot.borrow_mut().take())
        .unwrap_or_else(|| Backtrace::force_capture().to_string())
}

/// Best-effort text of a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

pub async fn recover_panics(request: Request, next: Next) -> Response {
    let captured = request.extensions().get::<CapturedStatus>().cloned();
    let request_id = request_id_of(&request);
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    match AssertUnwindSafe(next.run(request)).catch_unwind().await {
        Ok(response) => response,
        Err(payload) => {
            let trace = take_trace();
            tracing::error!(
                request_id = %request_id,
                method = %method,
                path = %path,
                error = %panic_message(payload.as_ref()),
                trace = %trace,
                "Handler panicked"
            );
            metrics::record_panic(&path);

            let response = ApiError::InternalFault.into_response();
            if let Some(captured) = captured {
                captured.record(response.status());
            }
            response
        }
    }
}
