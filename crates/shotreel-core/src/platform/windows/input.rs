//! Windows input injection
//!
//! Uses SendInput for mouse buttons and keys, SetCursorPos for the pointer.

use windows::Win32::Foundation::POINT;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    SendInput, VkKeyScanW, INPUT, INPUT_0, INPUT_KEYBOARD, INPUT_MOUSE, KEYBDINPUT,
    KEYBD_EVENT_FLAGS, KEYEVENTF_KEYUP, MOUSEEVENTF_LEFTDOWN, MOUSEEVENTF_LEFTUP,
    MOUSEEVENTF_RIGHTDOWN, MOUSEEVENTF_RIGHTUP, MOUSEINPUT, MOUSE_EVENT_FLAGS, VIRTUAL_KEY,
};
use windows::Win32::UI::WindowsAndMessaging::{GetCursorPos, SetCursorPos};

use crate::input::{ButtonAction, MouseButton};
use crate::window::Point;
use crate::{Error, Result};

pub fn move_mouse(to: Point) -> Result<()> {
    unsafe {
        SetCursorPos(to.x, to.y)
            .map_err(|e| Error::action_failed("move pointer", &format!("{:?}", e)))?;
    }
    Ok(())
}

pub fn cursor_position() -> Result<Point> {
    let mut point = POINT::default();
    unsafe {
        GetCursorPos(&mut point)
            .map_err(|e| Error::action_failed("read pointer", &format!("{:?}", e)))?;
    }
    Ok(Point::new(point.x, point.y))
}

pub fn button(button: MouseButton, action: ButtonAction) -> Result<()> {
    let flags = match (button, action) {
        (MouseButton::Left, ButtonAction::Press) => MOUSEEVENTF_LEFTDOWN,
        (MouseButton::Left, ButtonAction::Release) => MOUSEEVENTF_LEFTUP,
        (MouseButton::Right, ButtonAction::Press) => MOUSEEVENTF_RIGHTDOWN,
        (MouseButton::Right, ButtonAction::Release) => MOUSEEVENTF_RIGHTUP,
    };
    send_inputs(&[make_mouse_input(flags)])
}

/// Tap the key that produces `key` on the active layout.
pub fn tap_key(key: &str) -> Result<()> {
    let vk = virtual_key(key)
        .ok_or_else(|| Error::action_failed("send key", &format!("no virtual key for '{}'", key)))?;
    let inputs = [make_key_input(vk, false), make_key_input(vk, true)];
    send_inputs(&inputs)
}

fn virtual_key(key: &str) -> Option<u16> {
    let mut chars = key.chars();
    let c = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    let scan = unsafe { VkKeyScanW(c.to_ascii_lowercase() as u16) };
    if scan == -1 {
        return None;
    }
    Some((scan as u16) & 0xff)
}

// Helper functions

fn make_mouse_input(flags: MOUSE_EVENT_FLAGS) -> INPUT {
    INPUT {
        r#type: INPUT_MOUSE,
        Anonymous: INPUT_0 {
            mi: MOUSEINPUT {
                dx: 0,
                dy: 0,
                mouseData: 0,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    }
}

fn make_key_input(vk: u16, key_up: bool) -> INPUT {
    let flags = if key_up {
        KEYEVENTF_KEYUP
    } else {
        KEYBD_EVENT_FLAGS(0)
    };

    INPUT {
        r#type: INPUT_KEYBOARD,
        Anonymous: INPUT_0 {
            ki: KEYBDINPUT {
                wVk: VIRTUAL_KEY(vk),
                wScan: 0,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    }
}

fn send_inputs(inputs: &[INPUT]) -> Result<()> {
    let sent = unsafe { SendInput(inputs, std::mem::size_of::<INPUT>() as i32) };

    if sent as usize != inputs.len() {
        return Err(Error::action_failed(
            "SendInput",
            &format!("sent {} of {} inputs", sent, inputs.len()),
        ));
    }

    Ok(())
}
