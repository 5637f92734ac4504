use std::cell::RefCell;
use std::rc::Rc;

use gloo::events::{EventListener, EventListenerOptions};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{DragEvent, Event, EventTarget, File, FileList};

use crate::config::PickerConfig;
use crate::dom::{DomView, is_close_control};
use crate::error::PickerError;
use crate::picker::{Picker, PickerView, ReadRequest};
use crate::reader::read_as_data_url;
use crate::state::PreviewState;

pub(crate) type SharedPicker<V> = Rc<RefCell<Picker<V>>>;

pub fn prevent_default(event: &Event) {
    event.prevent_default();
    event.stop_propagation();
}

/// A picker bound to its page elements. Dropping it removes every listener.
pub struct PickerBinding {
    picker: SharedPicker<DomView>,
    config: Rc<PickerConfig>,
    _listeners: Vec<EventListener>,
}

impl PickerBinding {
    pub fn reset(&self) -> Result<(), PickerError> {
        self.picker
            .try_borrow_mut()
            .map_err(|_| PickerError::Busy)?
            .reset()
    }

    pub fn state(&self) -> Option<PreviewState> {
        self.picker.try_borrow().ok().map(|picker| picker.state())
    }

    pub fn config(&self) -> &PickerConfig {
        &self.config
    }
}

pub fn bind(view: DomView) -> PickerBinding {
    let drop_zone = view.drop_zone().clone();
    let input = view.input().clone();
    let preview = view.preview().clone();
    let config = view.shared_config();
    let close_class = config.close_class.clone();
    let picker: SharedPicker<DomView> = Rc::new(RefCell::new(Picker::new(view)));

    let mut listeners = Vec::new();

    for event_type in ["dragenter", "dragover"] {
        let picker = picker.clone();
        listeners.push(EventListener::new_with_options(
            &drop_zone,
            event_type,
            EventListenerOptions::enable_prevent_default(),
            move |e| {
                prevent_default(e);
                with_picker(&picker, "dragover", |p| p.drag_over());
            },
        ));
    }

    let p = picker.clone();
    listeners.push(EventListener::new_with_options(
        &drop_zone,
        "dragleave",
        EventListenerOptions::enable_prevent_default(),
        move |e| {
            prevent_default(e);
            with_picker(&p, "dragleave", |p| p.drag_leave());
        },
    ));

    let p = picker.clone();
    listeners.push(EventListener::new_with_options(
        &drop_zone,
        "drop",
        EventListenerOptions::enable_prevent_default(),
        move |e| {
            prevent_default(e);
            let files = e
                .dyn_ref::<DragEvent>()
                .and_then(|e| e.data_transfer())
                .and_then(|transfer| transfer.files());
            if let Some(Some(read)) = with_picker(&p, "drop", |p| p.drop_files(files)) {
                spawn_read(&p, read);
            }
        },
    ));

    let p = picker.clone();
    let forwarded: EventTarget = input.clone().into();
    listeners.push(EventListener::new(&drop_zone, "click", move |e| {
        // The forwarded click bubbles back up when the input sits inside the drop zone.
        if e.target().as_ref() == Some(&forwarded) {
            return;
        }
        with_picker(&p, "click", |p| p.drop_zone_clicked());
    }));

    let p = picker.clone();
    listeners.push(EventListener::new(&input, "change", move |_| {
        if let Some(Some(read)) = with_picker(&p, "change", |p| p.input_changed()) {
            spawn_read(&p, read);
        }
    }));

    let p = picker.clone();
    listeners.push(EventListener::new(&preview, "click", move |e| {
        if is_close_control(e.target(), &close_class) {
            with_picker(&p, "dismiss", |p| p.reset());
        }
    }));

    PickerBinding {
        picker,
        config,
        _listeners: listeners,
    }
}

/// Run `f` on the shared picker, logging instead of panicking when it is
/// already borrowed or the view update fails.
pub(crate) fn with_picker<V: PickerView, T>(
    picker: &SharedPicker<V>,
    what: &str,
    f: impl FnOnce(&mut Picker<V>) -> Result<T, PickerError>,
) -> Option<T> {
    let Ok(mut picker) = picker.try_borrow_mut() else {
        log::warn!("{what} ignored: picker busy");
        return None;
    };
    match f(&mut picker) {
        Ok(value) => Some(value),
        Err(err) => {
            log::error!("{what} failed: {err}");
            None
        }
    }
}

pub(crate) fn spawn_read<V>(picker: &SharedPicker<V>, read: ReadRequest<File>)
where
    V: PickerView<Files = FileList> + 'static,
{
    let picker = picker.clone();
    spawn_local(async move {
        let outcome = read_as_data_url(&read.file).await;
        with_picker(&picker, "read completion", |p| {
            p.read_finished(read.request, outcome)
        });
    });
}
