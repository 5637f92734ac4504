use js_sys::{Function, Promise};
use wasm_bindgen_futures::JsFuture;
use web_sys::{File, FileReader};

use crate::error::PickerError;

/// Read `file` into a `data:` URL.
///
/// Both `onload` and `onerror` are wired, so a file the browser cannot read
/// resolves to [`PickerError::Read`] instead of never completing.
pub async fn read_as_data_url(file: &File) -> Result<String, PickerError> {
    let reader = FileReader::new()?;
    let promise = Promise::new(&mut |resolve: Function, reject: Function| {
        reader.set_onload(Some(&resolve));
        reader.set_onerror(Some(&reject));
    });
    reader.read_as_data_url(file)?;

    let outcome = JsFuture::from(promise).await;
    reader.set_onload(None);
    reader.set_onerror(None);
    if outcome.is_err() {
        let reason = reader
            .error()
            .map(|err| format!("{}: {}", err.name(), err.message()))
            .unwrap_or_else(|| "unknown error".to_string());
        return Err(read_error(file, reason));
    }

    reader
        .result()?
        .as_string()
        .ok_or_else(|| read_error(file, "result is not a data URL".to_string()))
}

fn read_error(file: &File, reason: String) -> PickerError {
    PickerError::Read {
        name: file.name(),
        reason,
    }
}
