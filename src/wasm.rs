//! WASM bindings for in-browser conversion.
//!
//! Books never leave the page: JavaScript hands over the EPUB bytes and gets
//! the converted bytes back.

use wasm_bindgen::prelude::*;

/// Initialize panic hook for better error messages in the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Convert an EPUB with the default settings.
#[wasm_bindgen]
pub fn convert_epub(data: &[u8]) -> Result<Vec<u8>, JsValue> {
    crate::convert(data).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Suggested download name for the converted book.
#[wasm_bindgen]
pub fn output_file_name(name: &str) -> String {
    crate::output_file_name(name)
}
