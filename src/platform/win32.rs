use raw_window_handle::{HasWindowHandle, RawWindowHandle};
use windows::Win32::Foundation::{HWND, POINT};
use windows::Win32::Graphics::Dwm::{DwmSetWindowAttribute, DWMWINDOWATTRIBUTE};
use windows::Win32::UI::Input::KeyboardAndMouse::GetAsyncKeyState;
use windows::Win32::UI::WindowsAndMessaging::{
    GetCursorPos, GetWindowLongPtrW, SetWindowLongPtrW, SetWindowPos, GWL_EXSTYLE,
    SWP_FRAMECHANGED, SWP_NOACTIVATE, SWP_NOMOVE, SWP_NOSIZE, SWP_NOZORDER, WS_EX_NOACTIVATE,
    WS_EX_TOOLWINDOW,
};

/// Extract the Win32 HWND from a winit window.
pub fn get_hwnd(window: &winit::window::Window) -> Option<HWND> {
    let handle = window.window_handle().ok()?;
    match handle.as_raw() {
        RawWindowHandle::Win32(h) => Some(HWND(h.hwnd.get() as *mut core::ffi::c_void)),
        _ => None,
    }
}

unsafe fn set_dwm_u32(hwnd: HWND, attribute: i32, value: u32) {
    let _ = DwmSetWindowAttribute(
        hwnd,
        DWMWINDOWATTRIBUTE(attribute),
        &value as *const u32 as *const core::ffi::c_void,
        4,
    );
}

/// Apply overlay window styles: tool window, no-activate, no redirection bitmap.
pub unsafe fn make_overlay(hwnd: HWND) {
    let style = GetWindowLongPtrW(hwnd, GWL_EXSTYLE);
    log::debug!("Window ex-style before: 0x{:08X}", style);

    // No GDI redirection surface; the DirectComposition visual wgpu creates
    // via DxgiFromVisual is the only content.
    const WS_EX_LAYERED: isize = 0x00080000;
    const WS_EX_NOREDIRECTIONBITMAP: isize = 0x00200000;

    let new_style = (style & !WS_EX_LAYERED)
        | WS_EX_NOACTIVATE.0 as isize
        | WS_EX_TOOLWINDOW.0 as isize
        | WS_EX_NOREDIRECTIONBITMAP;
    SetWindowLongPtrW(hwnd, GWL_EXSTYLE, new_style);

    log::debug!("Window ex-style after:  0x{:08X}", new_style);

    // Force DWM to recalculate the frame with the new styles.
    let _ = SetWindowPos(
        hwnd,
        HWND::default(),
        0,
        0,
        0,
        0,
        SWP_FRAMECHANGED | SWP_NOMOVE | SWP_NOSIZE | SWP_NOZORDER | SWP_NOACTIVATE,
    );

    // DWMWA_NCRENDERING_POLICY = DWMNCRP_DISABLED
    set_dwm_u32(hwnd, 2, 2);
    // DWMWA_WINDOW_CORNER_PREFERENCE = DWMWCP_DONOTROUND
    set_dwm_u32(hwnd, 33, 1);
    // DWMWA_BORDER_COLOR = DWMWA_COLOR_NONE
    set_dwm_u32(hwnd, 34, 0xFFFFFFFE);
    // DWMWA_SYSTEMBACKDROP_TYPE = DWMSBT_NONE
    set_dwm_u32(hwnd, 38, 1);
}

/// Set up the window as a transparent, click-through, always-on-top overlay.
pub fn setup_overlay(window: &winit::window::Window) {
    if let Err(e) = window.set_cursor_hittest(false) {
        log::warn!("Could not make overlay click-through: {e}");
    }

    let Some(hwnd) = get_hwnd(window) else {
        log::warn!("No Win32 window handle; overlay styles not applied");
        return;
    };
    unsafe {
        make_overlay(hwnd);
    }

    log::info!("Win32 overlay setup complete (DirectComposition + click-through + toolwindow)");
}

/// Get the current global mouse cursor position in screen pixels.
pub fn get_mouse_pos() -> (f32, f32) {
    let mut point = POINT::default();
    unsafe {
        let _ = GetCursorPos(&mut point);
    }
    (point.x as f32, point.y as f32)
}

/// Check if the ESC key is currently pressed (works regardless of window focus).
pub fn is_escape_pressed() -> bool {
    // VK_ESCAPE = 0x1B. High bit set = key is currently down.
    unsafe { GetAsyncKeyState(0x1B) & (0x8000u16 as i16) != 0 }
}
