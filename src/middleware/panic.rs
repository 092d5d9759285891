//! Panic payload and stack capture for the access log.
//!
//! `catch_unwind` only yields the panic payload. The stack has to be taken
//! while the panic is in flight, so a process-wide hook records it in a
//! thread-local slot that the middleware reads after the unwind, on the same
//! thread and within the same poll.

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::RefCell;
use std::panic;
use std::sync::Once;

thread_local! {
    static LAST_STACK: RefCell<Option<String>> = const { RefCell::new(None) };
}

static INSTALL_HOOK: Once = Once::new();

/// Installs the stack-capturing panic hook. Idempotent.
///
/// The previously installed hook still runs after the stack is recorded.
pub fn install_hook() {
    INSTALL_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let mut stack = match info.location() {
                Some(loc) => format!("panicked at {loc}\n"),
                None => String::new(),
            };
            stack.push_str(&Backtrace::force_capture().to_string());

            let _ = LAST_STACK.try_with(|slot| {
                if let Ok(mut slot) = slot.try_borrow_mut() {
                    *slot = Some(stack);
                }
            });

            previous(info);
        }));
    });
}

/// Takes the stack recorded by the most recent panic on this thread.
pub fn take_stack() -> Option<String> {
    LAST_STACK
        .try_with(|slot| slot.try_borrow_mut().ok().and_then(|mut s| s.take()))
        .ok()
        .flatten()
}

/// Renders a panic payload as text.
///
/// `panic!` payloads are `&'static str` or `String`; anything else is
/// reported by type only.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Box<dyn Any>".to_string()
    }
}
