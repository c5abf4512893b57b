//! Thread creation and joining for harness participants.

use std::any::Any;
use std::thread::{self, JoinHandle};

use latch_core::HarnessError;

/// Spawn a named participant thread.
pub(crate) fn spawn_named<F, T>(name: String, f: F) -> Result<JoinHandle<T>, HarnessError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    thread::Builder::new()
        .name(name)
        .spawn(f)
        .map_err(HarnessError::ThreadSpawn)
}

/// Join a participant, turning a panic into a reportable error.
pub(crate) fn join<T>(handle: JoinHandle<T>) -> Result<T, HarnessError> {
    handle
        .join()
        .map_err(|payload| HarnessError::ThreadPanicked(panic_message(payload)))
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_reports_panic_message() {
        let handle = spawn_named::<_, ()>("latch-test-panic".into(), || {
            panic!("probe went wrong");
        })
        .unwrap();

        match join(handle) {
            Err(HarnessError::ThreadPanicked(message)) => {
                assert_eq!(message, "probe went wrong")
            }
            other => panic!("expected ThreadPanicked, got {:?}", other),
        }
    }

    #[test]
    fn test_join_returns_value_and_keeps_name() {
        let handle = spawn_named("latch-test-name".into(), || {
            thread::current().name().map(str::to_string)
        })
        .unwrap();
        assert_eq!(join(handle).unwrap().as_deref(), Some("latch-test-name"));
    }

    #[test]
    fn test_panic_message_formatted_string() {
        let payload: Box<dyn Any + Send> = Box::new(format!("count was {}", 3));
        assert_eq!(panic_message(payload), "count was 3");
    }
}
