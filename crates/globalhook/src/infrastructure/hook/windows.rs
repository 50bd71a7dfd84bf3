//! Windows low-level keyboard and mouse hook implementation.
//!
//! Each [`WindowsHook`] installs either `WH_KEYBOARD_LL` or `WH_MOUSE_LL` on
//! its own Win32 message-loop thread.  The hook procedure only translates the
//! OS struct into a [`RawEvent`] and pushes it onto a channel; a second
//! "dispatch" thread drains that channel and runs the tracker's sink, so slow
//! subscribers can never push the hook past the OS callback timeout.
//!
//! # Safety
//!
//! This module uses `unsafe` code exclusively for Windows API FFI calls.
//! All `unsafe` blocks are annotated with `// SAFETY:` comments.

#![cfg(target_os = "windows")]

use std::sync::mpsc::{self, Sender};
use std::sync::{Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use globalhook_core::{ButtonCode, KeyCode};
use tracing::{debug, warn};
use windows::Win32::Foundation::{LPARAM, LRESULT, WPARAM};
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, DispatchMessageW, GetMessageW, PostThreadMessageW, SetWindowsHookExW,
    UnhookWindowsHookEx, HC_ACTION, HHOOK, KBDLLHOOKSTRUCT, MSG, MSLLHOOKSTRUCT, WH_KEYBOARD_LL,
    WH_MOUSE_LL, WM_KEYDOWN, WM_KEYUP, WM_LBUTTONDOWN, WM_LBUTTONUP, WM_MBUTTONDOWN,
    WM_MBUTTONUP, WM_MOUSEMOVE, WM_MOUSEWHEEL, WM_QUIT, WM_RBUTTONDOWN, WM_RBUTTONUP,
    WM_SYSKEYDOWN, WM_SYSKEYUP, WM_XBUTTONDOWN, WM_XBUTTONUP, XBUTTON1,
};

use super::{HookAdapter, HookError, HookKind, RawEvent, RawEventSink};

/// Channel used by the keyboard hook procedure while a keyboard hook is installed.
static KEYBOARD_EVENTS: Mutex<Option<Sender<RawEvent>>> = Mutex::new(None);

/// Channel used by the mouse hook procedure while a mouse hook is installed.
static MOUSE_EVENTS: Mutex<Option<Sender<RawEvent>>> = Mutex::new(None);

/// Windows low-level hook for one device class.
///
/// Only one keyboard and one mouse hook may be installed per process, since
/// the hook procedures reach their channel through a process-wide slot.
pub struct WindowsHook {
    kind: HookKind,
    threads: Mutex<Option<HookThreads>>,
}

struct HookThreads {
    /// Win32 thread id of the message loop, target of `WM_QUIT`.
    loop_thread_id: u32,
    message_loop: JoinHandle<()>,
    dispatcher: JoinHandle<()>,
}

impl WindowsHook {
    /// Creates a new (uninstalled) hook for `kind`.
    pub fn new(kind: HookKind) -> Self {
        Self {
            kind,
            threads: Mutex::new(None),
        }
    }

    fn event_slot(&self) -> &'static Mutex<Option<Sender<RawEvent>>> {
        match self.kind {
            HookKind::Keyboard => &KEYBOARD_EVENTS,
            HookKind::Mouse => &MOUSE_EVENTS,
        }
    }

    fn install_failed(&self, reason: impl ToString) -> HookError {
        HookError::InstallFailed {
            kind: self.kind,
            reason: reason.to_string(),
        }
    }
}

impl HookAdapter for WindowsHook {
    fn install(&self, sink: RawEventSink) -> Result<(), HookError> {
        let mut threads = self.threads.lock().unwrap_or_else(PoisonError::into_inner);
        if threads.is_some() {
            return Err(HookError::AlreadyInstalled(self.kind));
        }

        let slot = self.event_slot();
        let (tx, rx) = mpsc::channel::<RawEvent>();
        *slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(tx);

        // The dispatcher runs until the sender in `slot` is dropped.
        let dispatcher = thread::Builder::new()
            .name(format!("{}-hook-dispatch", self.kind))
            .spawn(move || {
                for event in rx {
                    sink(event);
                }
            })
            .map_err(|e| {
                *slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
                self.install_failed(e)
            })?;

        let (ready_tx, ready_rx) = mpsc::channel::<Result<u32, String>>();
        let kind = self.kind;
        let spawned = thread::Builder::new()
            .name(format!("{}-hook-loop", self.kind))
            .spawn(move || run_hook_message_loop(kind, ready_tx));

        let outcome = match spawned {
            Ok(message_loop) => match ready_rx.recv() {
                Ok(Ok(loop_thread_id)) => Ok((loop_thread_id, message_loop)),
                Ok(Err(reason)) => {
                    let _ = message_loop.join();
                    Err(self.install_failed(reason))
                }
                Err(_) => {
                    let _ = message_loop.join();
                    Err(self.install_failed("hook thread exited during installation"))
                }
            },
            Err(e) => Err(self.install_failed(e)),
        };

        match outcome {
            Ok((loop_thread_id, message_loop)) => {
                debug!(kind = %self.kind, loop_thread_id, "low-level hook installed");
                *threads = Some(HookThreads {
                    loop_thread_id,
                    message_loop,
                    dispatcher,
                });
                Ok(())
            }
            Err(e) => {
                *slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
                let _ = dispatcher.join();
                Err(e)
            }
        }
    }

    fn uninstall(&self) {
        let Some(threads) = self
            .threads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        else {
            return;
        };

        // SAFETY: PostThreadMessageW only enqueues a message; the target thread
        // owns a message queue because it installed the hook before reporting
        // its id.
        let posted = unsafe {
            PostThreadMessageW(threads.loop_thread_id, WM_QUIT, WPARAM(0), LPARAM(0))
        };
        match posted {
            Ok(()) => {
                let _ = threads.message_loop.join();
            }
            Err(e) => warn!(kind = %self.kind, "failed to post WM_QUIT to hook thread: {e}"),
        }

        // Dropping the sender ends the dispatcher once queued events drain.
        *self.event_slot().lock().unwrap_or_else(PoisonError::into_inner) = None;
        if threads.dispatcher.thread().id() != thread::current().id() {
            let _ = threads.dispatcher.join();
        }
        debug!(kind = %self.kind, "low-level hook removed");
    }
}

impl Drop for WindowsHook {
    fn drop(&mut self) {
        self.uninstall();
    }
}

/// Entry point for the dedicated Win32 message loop thread.
///
/// Reports the thread id (or the installation error) through `ready` before
/// entering the loop.
fn run_hook_message_loop(kind: HookKind, ready: Sender<Result<u32, String>>) {
    // SAFETY: SetWindowsHookExW requires the calling thread to run a message
    // loop, which this thread does until WM_QUIT arrives.
    let installed = unsafe {
        match kind {
            HookKind::Keyboard => SetWindowsHookExW(WH_KEYBOARD_LL, Some(keyboard_hook_proc), None, 0),
            HookKind::Mouse => SetWindowsHookExW(WH_MOUSE_LL, Some(mouse_hook_proc), None, 0),
        }
    };
    let hook: HHOOK = match installed {
        Ok(hook) => hook,
        Err(e) => {
            let _ = ready.send(Err(e.to_string()));
            return;
        }
    };

    // SAFETY: GetCurrentThreadId has no preconditions.
    let thread_id = unsafe { GetCurrentThreadId() };
    let _ = ready.send(Ok(thread_id));

    // Win32 message loop – blocks until WM_QUIT is posted
    let mut msg = MSG::default();
    // SAFETY: Standard Win32 GetMessage/DispatchMessage loop pattern.
    unsafe {
        while GetMessageW(&mut msg, None, 0, 0).as_bool() {
            DispatchMessageW(&msg);
        }
        UnhookWindowsHookEx(hook).ok();
    }
}

/// Pushes `event` to the consumer behind `slot`, if one is installed.
fn forward(slot: &Mutex<Option<Sender<RawEvent>>>, event: RawEvent) {
    if let Some(sender) = slot.lock().unwrap_or_else(PoisonError::into_inner).as_ref() {
        // Ignore send errors (dispatcher gone during shutdown).
        let _ = sender.send(event);
    }
}

/// Low-level keyboard hook callback.
///
/// # Safety
///
/// This function is called by Windows from the hook message loop thread.
/// It must return quickly (< ~300ms) to avoid hook removal by the OS.
unsafe extern "system" fn keyboard_hook_proc(
    n_code: i32,
    w_param: WPARAM,
    l_param: LPARAM,
) -> LRESULT {
    if n_code == HC_ACTION as i32 {
        // SAFETY: l_param points to a KBDLLHOOKSTRUCT when n_code == HC_ACTION.
        let kbs = &*(l_param.0 as *const KBDLLHOOKSTRUCT);
        let code = KeyCode(kbs.vkCode);

        let event = match w_param.0 as u32 {
            WM_KEYDOWN | WM_SYSKEYDOWN => Some(RawEvent::KeyPressed { code }),
            WM_KEYUP | WM_SYSKEYUP => Some(RawEvent::KeyReleased { code }),
            _ => None,
        };
        if let Some(event) = event {
            forward(&KEYBOARD_EVENTS, event);
        }
    }

    // SAFETY: Forward the event to the next hook in the chain.
    CallNextHookEx(None, n_code, w_param, l_param)
}

/// Low-level mouse hook callback.
///
/// # Safety
///
/// Called by Windows from the hook message loop thread; must return quickly.
unsafe extern "system" fn mouse_hook_proc(
    n_code: i32,
    w_param: WPARAM,
    l_param: LPARAM,
) -> LRESULT {
    if n_code == HC_ACTION as i32 {
        // SAFETY: l_param points to a MSLLHOOKSTRUCT when n_code == HC_ACTION.
        let mhs = &*(l_param.0 as *const MSLLHOOKSTRUCT);
        let (x, y) = (mhs.pt.x, mhs.pt.y);
        let x_button = || {
            if (mhs.mouseData >> 16) as u16 == XBUTTON1 {
                ButtonCode::X1
            } else {
                ButtonCode::X2
            }
        };

        let event = match w_param.0 as u32 {
            WM_MOUSEMOVE => Some(RawEvent::MouseMoved { x, y }),
            WM_LBUTTONDOWN => Some(RawEvent::ButtonPressed { button: ButtonCode::LEFT, x, y }),
            WM_LBUTTONUP => Some(RawEvent::ButtonReleased { button: ButtonCode::LEFT, x, y }),
            WM_RBUTTONDOWN => Some(RawEvent::ButtonPressed { button: ButtonCode::RIGHT, x, y }),
            WM_RBUTTONUP => Some(RawEvent::ButtonReleased { button: ButtonCode::RIGHT, x, y }),
            WM_MBUTTONDOWN => Some(RawEvent::ButtonPressed { button: ButtonCode::MIDDLE, x, y }),
            WM_MBUTTONUP => Some(RawEvent::ButtonReleased { button: ButtonCode::MIDDLE, x, y }),
            WM_XBUTTONDOWN => Some(RawEvent::ButtonPressed { button: x_button(), x, y }),
            WM_XBUTTONUP => Some(RawEvent::ButtonReleased { button: x_button(), x, y }),
            WM_MOUSEWHEEL => {
                let delta = (mhs.mouseData >> 16) as i16 as i32;
                Some(RawEvent::MouseWheel { delta, x, y })
            }
            _ => None,
        };
        if let Some(event) = event {
            forward(&MOUSE_EVENTS, event);
        }
    }

    // SAFETY: Forward to the next hook in the chain.
    CallNextHookEx(None, n_code, w_param, l_param)
}
