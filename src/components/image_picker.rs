use std::cell::RefCell;
use std::rc::Rc;

use web_sys::{DragEvent, Event, File, FileList, HtmlInputElement};
use yew::prelude::*;

use crate::config::PickerConfig;
use crate::drag_drop::{SharedPicker, prevent_default, spawn_read, with_picker};
use crate::error::PickerError;
use crate::picker::{Picker, PickerView, ReadRequest};

#[derive(Properties, PartialEq)]
pub struct ImagePickerProps {
    /// Element ids, class names and the dismiss glyph.
    #[prop_or_default]
    pub config: Rc<PickerConfig>,
    /// Form field name of the file input.
    #[prop_or(AttrValue::Static("image"))]
    pub name: AttrValue,
    #[prop_or(AttrValue::Static("Drag & drop an image here or click to choose one"))]
    pub prompt: AttrValue,
    /// Called with the file whose preview is being loaded.
    #[prop_or_default]
    pub on_select: Option<Callback<File>>,
}

impl Default for ImagePickerProps {
    fn default() -> Self {
        yew::props!(ImagePickerProps {})
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewAction {
    Highlight(bool),
    DropZoneVisible(bool),
    ShowPreview(AttrValue),
    ShowError(AttrValue),
    Restore,
}

/// What the component renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewModel {
    highlighted: bool,
    drop_zone_visible: bool,
    preview: Option<AttrValue>,
    error: Option<AttrValue>,
}

impl Default for PreviewModel {
    fn default() -> Self {
        Self {
            highlighted: false,
            drop_zone_visible: true,
            preview: None,
            error: None,
        }
    }
}

impl Reducible for PreviewModel {
    type Action = PreviewAction;

    fn reduce(self: Rc<Self>, action: PreviewAction) -> Rc<Self> {
        let mut next = (*self).clone();
        match action {
            PreviewAction::Highlight(on) => next.highlighted = on,
            PreviewAction::DropZoneVisible(visible) => next.drop_zone_visible = visible,
            PreviewAction::ShowPreview(src) => {
                next.preview = Some(src);
                next.error = None;
            }
            PreviewAction::ShowError(message) => next.error = Some(message),
            PreviewAction::Restore => {
                next = PreviewModel {
                    highlighted: self.highlighted,
                    ..PreviewModel::default()
                }
            }
        }
        Rc::new(next)
    }
}

/// [`PickerView`] that renders through the component's reducer and reaches
/// the hidden input through a [`NodeRef`].
pub struct YewView {
    model: Callback<PreviewAction>,
    input_ref: NodeRef,
    input_id: String,
}

impl YewView {
    pub fn new(model: Callback<PreviewAction>, input_ref: NodeRef, input_id: &str) -> Self {
        Self {
            model,
            input_ref,
            input_id: input_id.to_string(),
        }
    }

    fn input(&self) -> Result<HtmlInputElement, PickerError> {
        self.input_ref
            .cast::<HtmlInputElement>()
            .ok_or_else(|| PickerError::MissingElement(self.input_id.clone()))
    }
}

impl PickerView for YewView {
    type Files = FileList;

    fn set_highlight(&self, on: bool) -> Result<(), PickerError> {
        self.model.emit(PreviewAction::Highlight(on));
        Ok(())
    }

    fn set_drop_zone_visible(&self, visible: bool) -> Result<(), PickerError> {
        self.model.emit(PreviewAction::DropZoneVisible(visible));
        Ok(())
    }

    fn assign_input(&self, files: &FileList) -> Result<(), PickerError> {
        self.input()?.set_files(Some(files));
        Ok(())
    }

    fn input_files(&self) -> Option<FileList> {
        self.input().ok()?.files()
    }

    fn clear_input(&self) -> Result<(), PickerError> {
        self.input()?.set_value("");
        Ok(())
    }

    fn open_chooser(&self) {
        match self.input() {
            Ok(input) => input.click(),
            Err(err) => log::warn!("cannot open file chooser: {err}"),
        }
    }

    fn render_preview(&self, data_url: &str) -> Result<(), PickerError> {
        self.model
            .emit(PreviewAction::ShowPreview(data_url.to_string().into()));
        Ok(())
    }

    fn restore_drop_zone(&self) -> Result<(), PickerError> {
        self.model.emit(PreviewAction::Restore);
        Ok(())
    }

    fn show_error(&self, message: &str) -> Result<(), PickerError> {
        self.model
            .emit(PreviewAction::ShowError(message.to_string().into()));
        Ok(())
    }
}

fn start_read(
    picker: &SharedPicker<YewView>,
    read: ReadRequest<File>,
    on_select: Option<&Callback<File>>,
) {
    if let Some(on_select) = on_select {
        on_select.emit(read.file.clone());
    }
    spawn_read(picker, read);
}

fn on_change(picker: &SharedPicker<YewView>, on_select: Option<Callback<File>>) -> Callback<Event> {
    let picker = picker.clone();
    Callback::from(move |_: Event| {
        if let Some(Some(read)) = with_picker(&picker, "change", |p| p.input_changed()) {
            start_read(&picker, read, on_select.as_ref());
        }
    })
}

fn on_drop(picker: &SharedPicker<YewView>, on_select: Option<Callback<File>>) -> Callback<DragEvent> {
    let picker = picker.clone();
    Callback::from(move |event: DragEvent| {
        prevent_default(&event);
        let files = event.data_transfer().and_then(|x| x.files());
        if let Some(Some(read)) = with_picker(&picker, "drop", |p| p.drop_files(files)) {
            start_read(&picker, read, on_select.as_ref());
        }
    })
}

fn on_drag(picker: &SharedPicker<YewView>, over: bool) -> Callback<DragEvent> {
    let picker = picker.clone();
    Callback::from(move |event: DragEvent| {
        prevent_default(&event);
        if over {
            with_picker(&picker, "dragover", |p| p.drag_over());
        } else {
            with_picker(&picker, "dragleave", |p| p.drag_leave());
        }
    })
}

fn on_click(picker: &SharedPicker<YewView>) -> Callback<MouseEvent> {
    let picker = picker.clone();
    Callback::from(move |_: MouseEvent| {
        with_picker(&picker, "click", |p| p.drop_zone_clicked());
    })
}

fn on_dismiss(picker: &SharedPicker<YewView>) -> Callback<MouseEvent> {
    let picker = picker.clone();
    Callback::from(move |_: MouseEvent| {
        with_picker(&picker, "dismiss", |p| p.reset());
    })
}

#[function_component(ImagePicker)]
pub fn image_picker(props: &ImagePickerProps) -> Html {
    let config = &props.config;
    let model = use_reducer(PreviewModel::default);
    let input_ref = use_node_ref();
    let picker: Rc<RefCell<Picker<YewView>>> = {
        let dispatcher = model.dispatcher();
        let view = YewView::new(
            Callback::from(move |action| dispatcher.dispatch(action)),
            input_ref.clone(),
            &config.input_id,
        );
        use_mut_ref(move || Picker::new(view))
    };

    html! {
        <div class="image-picker">
            <input
                ref={input_ref}
                type="file"
                id={config.input_id.clone()}
                name={props.name.clone()}
                accept="image/*"
                style="display: none"
                onchange={on_change(&picker, props.on_select.clone())}
            />
            <div id={config.preview_id.clone()}>
                if model.drop_zone_visible {
                    <div
                        id={config.drop_zone_id.clone()}
                        class={classes!(model.highlighted.then(|| config.highlight_class.clone()))}
                        style={format!("display: {}", config.drop_zone_display)}
                        onclick={on_click(&picker)}
                        ondragenter={on_drag(&picker, true)}
                        ondragover={on_drag(&picker, true)}
                        ondragleave={on_drag(&picker, false)}
                        ondrop={on_drop(&picker, props.on_select.clone())}
                    >
                        <div class="upload-icon">{"+"}</div>
                        <p>{&props.prompt}</p>
                    </div>
                }
                if let Some(src) = &model.preview {
                    <>
                        <img
                            class={config.image_class.clone()}
                            alt="Product image preview"
                            src={src.clone()}
                        />
                        <span class={config.close_class.clone()} onclick={on_dismiss(&picker)}>
                            {config.close_glyph.clone()}
                        </span>
                    </>
                }
                if let Some(error) = &model.error {
                    <p class={config.error_class.clone()}>{error}</p>
                }
            </div>
        </div>
    }
}
