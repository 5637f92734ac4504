//! [`PickerView`] over real page elements.

use std::rc::Rc;

use wasm_bindgen::JsCast;
use web_sys::{Element, EventTarget, FileList, HtmlElement, HtmlImageElement, HtmlInputElement};

use crate::config::PickerConfig;
use crate::error::PickerError;
use crate::picker::PickerView;

pub struct DomView {
    drop_zone: HtmlElement,
    input: HtmlInputElement,
    preview: HtmlElement,
    config: Rc<PickerConfig>,
}

impl DomView {
    pub fn new(
        drop_zone: HtmlElement,
        input: HtmlInputElement,
        preview: HtmlElement,
        config: Rc<PickerConfig>,
    ) -> Self {
        Self {
            drop_zone,
            input,
            preview,
            config,
        }
    }

    /// Look the three elements up by the ids in `config`.
    pub fn from_config(config: Rc<PickerConfig>) -> Result<Self, PickerError> {
        let drop_zone = element_by_id::<HtmlElement>(&config.drop_zone_id, "an HTML element")?;
        let input = element_by_id::<HtmlInputElement>(&config.input_id, "an <input>")?;
        let preview = element_by_id::<HtmlElement>(&config.preview_id, "an HTML element")?;
        Ok(Self::new(drop_zone, input, preview, config))
    }

    pub fn drop_zone(&self) -> &HtmlElement {
        &self.drop_zone
    }

    pub fn input(&self) -> &HtmlInputElement {
        &self.input
    }

    pub fn preview(&self) -> &HtmlElement {
        &self.preview
    }

    pub fn config(&self) -> &PickerConfig {
        &self.config
    }

    pub fn shared_config(&self) -> Rc<PickerConfig> {
        Rc::clone(&self.config)
    }

    fn create(&self, tag: &str, class: &str) -> Result<Element, PickerError> {
        let element = gloo::utils::document().create_element(tag)?;
        element.class_list().add_1(class)?;
        Ok(element)
    }
}

fn element_by_id<T: JsCast>(id: &str, expected: &'static str) -> Result<T, PickerError> {
    gloo::utils::document()
        .get_element_by_id(id)
        .ok_or_else(|| PickerError::MissingElement(id.to_string()))?
        .dyn_into::<T>()
        .map_err(|_| PickerError::WrongElement {
            id: id.to_string(),
            expected,
        })
}

/// Whether `target` is the dismiss control rendered next to the preview.
pub fn is_close_control(target: Option<EventTarget>, close_class: &str) -> bool {
    target
        .and_then(|target| target.dyn_into::<Element>().ok())
        .is_some_and(|element| element.class_list().contains(close_class))
}

impl PickerView for DomView {
    type Files = FileList;

    fn set_highlight(&self, on: bool) -> Result<(), PickerError> {
        self.drop_zone
            .class_list()
            .toggle_with_force(&self.config.highlight_class, on)?;
        Ok(())
    }

    fn set_drop_zone_visible(&self, visible: bool) -> Result<(), PickerError> {
        let display = if visible {
            self.config.drop_zone_display.as_str()
        } else {
            "none"
        };
        self.drop_zone.style().set_property("display", display)?;
        Ok(())
    }

    fn assign_input(&self, files: &FileList) -> Result<(), PickerError> {
        self.input.set_files(Some(files));
        Ok(())
    }

    fn input_files(&self) -> Option<FileList> {
        self.input.files()
    }

    fn clear_input(&self) -> Result<(), PickerError> {
        self.input.set_value("");
        Ok(())
    }

    fn open_chooser(&self) {
        self.input.click();
    }

    fn render_preview(&self, data_url: &str) -> Result<(), PickerError> {
        let image = HtmlImageElement::new()?;
        image.set_src(data_url);
        image.set_alt("Product image preview");
        image.class_list().add_1(&self.config.image_class)?;

        let close = self.create("span", &self.config.close_class)?;
        close.set_text_content(Some(self.config.close_glyph.as_str()));

        self.preview.set_inner_html("");
        self.preview.append_child(&image)?;
        self.preview.append_child(&close)?;
        Ok(())
    }

    fn restore_drop_zone(&self) -> Result<(), PickerError> {
        self.preview.set_inner_html("");
        self.preview.append_child(&self.drop_zone)?;
        self.set_drop_zone_visible(true)
    }

    fn show_error(&self, message: &str) -> Result<(), PickerError> {
        let error = self.create("p", &self.config.error_class)?;
        error.set_text_content(Some(message));
        self.preview.append_child(&error)?;
        Ok(())
    }
}
