// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Process-wide access to the state container.
//!
//! Lifecycle: `main` calls [`mark_main_thread`] once at startup, then every
//! component obtains the container through [`app_state`]. The container
//! lives until process exit. [`reset_app_state`] exists for test harnesses
//! only.
//!
//! Storage is thread-local because the container is `!Send`; the registered
//! main thread guards against a worker accidentally creating its own copy.

use super::ApplicationState;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::OnceLock;
use std::thread::ThreadId;

static MAIN_THREAD: OnceLock<ThreadId> = OnceLock::new();

thread_local! {
    static INSTANCE: RefCell<Option<Rc<ApplicationState>>> = const { RefCell::new(None) };
}

/// Register the calling thread as the only thread allowed to use
/// [`app_state`]. Calling it again from the same thread is harmless.
pub fn mark_main_thread() {
    let current = std::thread::current().id();
    let registered = *MAIN_THREAD.get_or_init(|| current);
    assert_eq!(
        registered, current,
        "mark_main_thread called from a second thread"
    );
}

/// Whether `current` may access the singleton given the registered thread.
fn thread_allowed(registered: Option<&ThreadId>, current: ThreadId) -> bool {
    registered.map_or(true, |main| *main == current)
}

/// The process-wide state container, created on first use.
///
/// Panics when called off the registered main thread.
#[track_caller]
pub fn app_state() -> Rc<ApplicationState> {
    assert!(
        thread_allowed(MAIN_THREAD.get(), std::thread::current().id()),
        "app_state() called off the main thread"
    );
    INSTANCE.with(|slot| {
        slot.borrow_mut()
            .get_or_insert_with(|| Rc::new(ApplicationState::new()))
            .clone()
    })
}

/// Drop the singleton so the next [`app_state`] call starts fresh.
/// Handles obtained earlier keep the old container alive.
pub fn reset_app_state() {
    INSTANCE.with(|slot| slot.borrow_mut().take());
}
