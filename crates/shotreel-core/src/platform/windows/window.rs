//! Top-level window enumeration and manipulation via user32

use windows::Win32::Foundation::{BOOL, HWND, LPARAM, POINT, RECT, TRUE, WPARAM};
use windows::Win32::Graphics::Gdi::ClientToScreen;
use windows::Win32::UI::WindowsAndMessaging::{
    EnumWindows, GetClientRect, GetWindowTextW, GetWindowThreadProcessId, IsIconic, IsWindow,
    IsWindowVisible, PostMessageW, SetForegroundWindow, ShowWindow, SW_RESTORE, WM_CLOSE,
};

use crate::window::{Rect, WindowHandle};
use crate::{Error, Result};

pub fn hwnd(window: WindowHandle) -> HWND {
    HWND(window.id() as usize as *mut core::ffi::c_void)
}

pub fn handle(hwnd: HWND) -> WindowHandle {
    WindowHandle(hwnd.0 as usize as u64)
}

unsafe extern "system" fn collect_window(hwnd: HWND, lparam: LPARAM) -> BOOL {
    let windows = &mut *(lparam.0 as *mut Vec<HWND>);
    windows.push(hwnd);
    TRUE
}

/// Visible top-level windows in Z order, topmost first.
pub fn visible_windows() -> Vec<HWND> {
    let mut windows: Vec<HWND> = Vec::new();
    unsafe {
        let _ = EnumWindows(
            Some(collect_window),
            LPARAM(&mut windows as *mut Vec<HWND> as isize),
        );
    }
    windows
        .into_iter()
        .filter(|&w| unsafe { IsWindowVisible(w).as_bool() })
        .collect()
}

pub fn title(hwnd: HWND) -> Option<String> {
    let mut buffer = [0u16; 512];
    let len = unsafe { GetWindowTextW(hwnd, &mut buffer) };
    if len > 0 {
        Some(String::from_utf16_lossy(&buffer[..len as usize]))
    } else {
        None
    }
}

pub fn owner_pid(hwnd: HWND) -> Option<u32> {
    let mut pid: u32 = 0;
    unsafe {
        GetWindowThreadProcessId(hwnd, Some(&mut pid as *mut u32));
    }
    if pid > 0 {
        Some(pid)
    } else {
        None
    }
}

pub fn exists(hwnd: HWND) -> bool {
    unsafe { IsWindow(hwnd).as_bool() }
}

pub fn focus(hwnd: HWND) -> Result<()> {
    unsafe {
        if IsIconic(hwnd).as_bool() {
            let _ = ShowWindow(hwnd, SW_RESTORE);
        }
        if !SetForegroundWindow(hwnd).as_bool() {
            return Err(Error::action_failed(
                "focus",
                "SetForegroundWindow was refused",
            ));
        }
    }
    Ok(())
}

pub fn close(hwnd: HWND) -> Result<()> {
    unsafe {
        PostMessageW(hwnd, WM_CLOSE, WPARAM(0), LPARAM(0))
            .map_err(|e| Error::action_failed("close window", &format!("{:?}", e)))
    }
}

/// Client area translated to screen coordinates.
pub fn client_rect(hwnd: HWND) -> Result<Rect> {
    let mut rect = RECT::default();
    let mut origin = POINT { x: 0, y: 0 };
    unsafe {
        GetClientRect(hwnd, &mut rect)
            .map_err(|e| Error::action_failed("client rect", &format!("{:?}", e)))?;
        if !ClientToScreen(hwnd, &mut origin).as_bool() {
            return Err(Error::action_failed("client rect", "ClientToScreen failed"));
        }
    }
    let width = (rect.right - rect.left).max(0) as u32;
    let height = (rect.bottom - rect.top).max(0) as u32;
    if width == 0 || height == 0 {
        return Err(Error::action_failed(
            "client rect",
            "invalid client rectangle size",
        ));
    }
    Ok(Rect::new(origin.x, origin.y, width, height))
}
