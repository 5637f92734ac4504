//! Drag-and-drop image picker with preview for the product creation form.
//!
//! Two ways to use it from a page:
//!
//! * `attachImagePicker(configJson?)` binds to markup that already exists
//!   (`#drag-drop-area`, `#file`, `#image-container` by default).
//! * `mountImagePicker(hostId)` renders the [`ImagePicker`] yew component,
//!   which owns its own markup.

use std::rc::Rc;

use log::Level;
use wasm_bindgen::prelude::*;

pub mod components;
pub mod config;
pub mod dom;
pub mod drag_drop;
pub mod error;
pub mod picker;
pub mod reader;
pub mod state;

pub use components::{ImagePicker, ImagePickerProps};
pub use config::PickerConfig;
pub use dom::DomView;
pub use error::PickerError;
pub use picker::{Picker, PickerView};
pub use state::{Machine, PreviewState};

use crate::drag_drop::PickerBinding;

/// Handle returned to JavaScript. Listeners stay attached until it is detached or freed.
#[wasm_bindgen]
pub struct PickerHandle {
    binding: PickerBinding,
}

#[wasm_bindgen]
impl PickerHandle {
    pub fn reset(&self) -> Result<(), JsValue> {
        self.binding.reset()?;
        Ok(())
    }

    /// `"empty"`, `"loading"` or `"showing"`; `"busy"` while an event is being handled.
    pub fn state(&self) -> String {
        self.binding
            .state()
            .map_or("busy", |state| state.name())
            .to_string()
    }

    /// The configuration the picker was attached with, as camelCase JSON.
    pub fn config(&self) -> Result<String, JsValue> {
        Ok(self.binding.config().to_json()?)
    }

    pub fn detach(self) {
        log::info!("image picker detached");
    }
}

fn init_logging(level: Level) {
    if console_log::init_with_level(level).is_err() {
        log::set_max_level(level.to_level_filter());
    }
}

#[wasm_bindgen(js_name = attachImagePicker)]
pub fn attach_image_picker(config: Option<String>) -> Result<PickerHandle, JsValue> {
    let config = match config {
        Some(json) => PickerConfig::from_json(&json)?,
        None => PickerConfig::default(),
    };
    init_logging(config.level()?);

    let view = DomView::from_config(Rc::new(config))?;
    log::info!(
        "image picker attached to #{}",
        view.config().drop_zone_id
    );
    Ok(PickerHandle {
        binding: drag_drop::bind(view),
    })
}

#[wasm_bindgen(js_name = mountImagePicker)]
pub fn mount_image_picker(host_id: &str) -> Result<(), JsValue> {
    init_logging(Level::Info);
    let host = gloo::utils::document()
        .get_element_by_id(host_id)
        .ok_or_else(|| PickerError::MissingElement(host_id.to_string()))?;
    yew::Renderer::<ImagePicker>::with_root(host).render();
    log::info!("image picker mounted into #{host_id}");
    Ok(())
}
