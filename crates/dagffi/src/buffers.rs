//! Per-thread string storage handed across the boundary.
//!
//! Pointers returned from these buffers stay valid until the next call on the
//! same thread overwrites the same buffer.

use std::cell::RefCell;
use std::ffi::{c_char, CString};

thread_local! {
    static LAST_ERROR: RefCell<CString> = RefCell::new(CString::default());
    static OUTPUT_STRING: RefCell<CString> = RefCell::new(CString::default());
    static TYPE_LIST: RefCell<CString> = RefCell::new(CString::default());
    static TYPE_SPEC: RefCell<CString> = RefCell::new(CString::default());
}

/// Interior NULs cannot cross as C strings; they are dropped
fn to_c_string(text: &str) -> CString {
    CString::new(text).unwrap_or_else(|e| {
        let mut bytes = e.into_vec();
        bytes.retain(|&b| b != 0);
        CString::new(bytes).unwrap_or_default()
    })
}

fn store(
    buffer: &'static std::thread::LocalKey<RefCell<CString>>,
    text: &str,
) -> *const c_char {
    buffer.with(|cell| {
        let mut slot = cell.borrow_mut();
        *slot = to_c_string(text);
        slot.as_ptr()
    })
}

pub(crate) fn set_last_error(message: impl AsRef<str>) {
    let message = message.as_ref();
    tracing::debug!("engine error: {}", message);
    store(&LAST_ERROR, message);
}

pub(crate) fn last_error() -> *const c_char {
    LAST_ERROR.with(|cell| cell.borrow().as_ptr())
}

pub(crate) fn output_string(text: &str) -> *const c_char {
    store(&OUTPUT_STRING, text)
}

pub(crate) fn type_list(json: &str) -> *const c_char {
    store(&TYPE_LIST, json)
}

pub(crate) fn type_spec(json: &str) -> *const c_char {
    store(&TYPE_SPEC, json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CStr;

    #[test]
    fn interior_nul_is_dropped() {
        assert_eq!(to_c_string("a\0b").as_bytes(), b"ab");
    }

    #[test]
    fn last_error_is_per_thread() {
        set_last_error("main thread");
        std::thread::spawn(|| {
            let text = unsafe { CStr::from_ptr(last_error()) };
            assert_eq!(text.to_bytes(), b"");
        })
        .join()
        .unwrap();
        let text = unsafe { CStr::from_ptr(last_error()) };
        assert_eq!(text.to_str().unwrap(), "main thread");
    }
}
