//! The picker controller.
//!
//! [`Picker`] owns the [`Machine`] and the current [`PendingSelection`] and
//! turns machine effects into calls on a [`PickerView`]. It never starts a
//! read itself: operations that accept a file hand back a [`ReadRequest`],
//! and whoever performs the read reports back through
//! [`Picker::read_finished`].

use crate::error::PickerError;
use crate::state::{Effect, Machine, PickerEvent, PreviewState, RequestId};

/// A list of files as delivered by a drop or by the file input.
pub trait FileBatch {
    type File: SelectedFile;

    fn count(&self) -> u32;
    fn first(&self) -> Option<Self::File>;
}

pub trait SelectedFile: Clone {
    fn file_name(&self) -> String;
}

impl FileBatch for web_sys::FileList {
    type File = web_sys::File;

    fn count(&self) -> u32 {
        self.length()
    }

    fn first(&self) -> Option<web_sys::File> {
        self.get(0)
    }
}

impl SelectedFile for web_sys::File {
    fn file_name(&self) -> String {
        self.name()
    }
}

/// The three elements the picker manipulates.
pub trait PickerView {
    type Files: FileBatch;

    fn set_highlight(&self, on: bool) -> Result<(), PickerError>;
    fn set_drop_zone_visible(&self, visible: bool) -> Result<(), PickerError>;
    fn assign_input(&self, files: &Self::Files) -> Result<(), PickerError>;
    fn input_files(&self) -> Option<Self::Files>;
    fn clear_input(&self) -> Result<(), PickerError>;
    fn open_chooser(&self);
    /// Replace the preview container content with the image and a dismiss control.
    fn render_preview(&self, data_url: &str) -> Result<(), PickerError>;
    /// Replace the preview container content with the drop zone and show it.
    fn restore_drop_zone(&self) -> Result<(), PickerError>;
    fn show_error(&self, message: &str) -> Result<(), PickerError>;
}

pub type FileOf<V> = <<V as PickerView>::Files as FileBatch>::File;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSelection<F> {
    pub request: RequestId,
    pub file: F,
    pub name: String,
    /// How many files were offered; all but the first are discarded.
    pub offered: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadRequest<F> {
    pub request: RequestId,
    pub file: F,
}

pub struct Picker<V: PickerView> {
    view: V,
    machine: Machine,
    pending: Option<PendingSelection<FileOf<V>>>,
}

impl<V: PickerView> Picker<V> {
    pub fn new(view: V) -> Self {
        Self {
            view,
            machine: Machine::new(),
            pending: None,
        }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn state(&self) -> PreviewState {
        self.machine.state()
    }

    pub fn is_highlighted(&self) -> bool {
        self.machine.is_highlighted()
    }

    pub fn pending(&self) -> Option<&PendingSelection<FileOf<V>>> {
        self.pending.as_ref()
    }

    pub fn drag_over(&mut self) -> Result<(), PickerError> {
        self.dispatch(PickerEvent::DragOver, None).map(drop)
    }

    pub fn drag_leave(&mut self) -> Result<(), PickerError> {
        self.dispatch(PickerEvent::DragLeave, None).map(drop)
    }

    /// Handle a drop. `files` is `None` when the drop carried no file list.
    pub fn drop_files(
        &mut self,
        files: Option<V::Files>,
    ) -> Result<Option<ReadRequest<FileOf<V>>>, PickerError> {
        let count = files.as_ref().map_or(0, FileBatch::count);
        self.dispatch(PickerEvent::Dropped { files: count }, files.as_ref())
    }

    pub fn input_changed(&mut self) -> Result<Option<ReadRequest<FileOf<V>>>, PickerError> {
        let files = self.view.input_files();
        let count = files.as_ref().map_or(0, FileBatch::count);
        self.dispatch(PickerEvent::InputChanged { files: count }, files.as_ref())
    }

    pub fn drop_zone_clicked(&mut self) -> Result<(), PickerError> {
        self.dispatch(PickerEvent::DropZoneClicked, None).map(drop)
    }

    pub fn read_finished(
        &mut self,
        request: RequestId,
        outcome: Result<String, PickerError>,
    ) -> Result<(), PickerError> {
        let event = match outcome {
            Ok(data_url) => PickerEvent::ReadCompleted { request, data_url },
            Err(err) => PickerEvent::ReadFailed {
                request,
                reason: err.to_string(),
            },
        };
        self.dispatch(event, None).map(drop)
    }

    /// Back to the empty state: drop zone visible, input cleared, nothing previewed.
    pub fn reset(&mut self) -> Result<(), PickerError> {
        self.dispatch(PickerEvent::Dismissed, None).map(drop)
    }

    fn dispatch(
        &mut self,
        event: PickerEvent,
        files: Option<&V::Files>,
    ) -> Result<Option<ReadRequest<FileOf<V>>>, PickerError> {
        let before = self.machine.state();
        let stale = match &event {
            PickerEvent::ReadCompleted { request, .. } | PickerEvent::ReadFailed { request, .. } => {
                (self.machine.expected_request() != Some(*request)).then_some(*request)
            }
            _ => None,
        };
        if let Some(request) = stale {
            log::debug!("ignoring stale read {request}");
        }

        let effects = self.machine.apply(event);
        let mut read = None;
        if let Err(err) = self.run_effects(effects, files, &mut read) {
            if self.machine.state() != PreviewState::Empty {
                self.recover(&err);
            }
            return Err(err);
        }

        let after = self.machine.state();
        if after != before {
            log::debug!("picker {} -> {}", before.name(), after.name());
        }
        Ok(read)
    }

    fn run_effects(
        &mut self,
        effects: Vec<Effect>,
        files: Option<&V::Files>,
        read: &mut Option<ReadRequest<FileOf<V>>>,
    ) -> Result<(), PickerError> {
        for effect in effects {
            match effect {
                Effect::SetHighlight(on) => self.view.set_highlight(on)?,
                Effect::AssignDroppedFiles => {
                    if let Some(files) = files {
                        self.view.assign_input(files)?;
                    }
                }
                Effect::HideDropZone => self.view.set_drop_zone_visible(false)?,
                Effect::StartRead(request) => {
                    let Some(batch) = files else { continue };
                    let Some(file) = batch.first() else { continue };
                    let name = file.file_name();
                    let offered = batch.count();
                    if offered > 1 {
                        log::debug!("previewing {name}, ignoring {} other file(s)", offered - 1);
                    }
                    self.pending = Some(PendingSelection {
                        request,
                        file: file.clone(),
                        name,
                        offered,
                    });
                    *read = Some(ReadRequest { request, file });
                }
                Effect::RenderPreview { data_url, .. } => self.view.render_preview(&data_url)?,
                Effect::RestoreDropZone => self.view.restore_drop_zone()?,
                Effect::ClearInput => {
                    self.pending = None;
                    self.view.clear_input()?;
                }
                Effect::OpenChooser => self.view.open_chooser(),
                Effect::ReportError(message) => {
                    log::warn!("image preview failed: {message}");
                    self.view.show_error(&message)?;
                }
            }
        }
        Ok(())
    }

    /// A view update failed half way through a transition. Drop back to the
    /// empty state so the page never shows a hidden drop zone with nothing
    /// in flight.
    fn recover(&mut self, err: &PickerError) {
        log::error!("view update failed, resetting picker: {err}");
        self.machine.apply(PickerEvent::Dismissed);
        self.pending = None;
        let steps = [
            self.view.restore_drop_zone(),
            self.view.clear_input(),
            self.view.show_error(&err.to_string()),
        ];
        for again in steps.into_iter().filter_map(Result::err) {
            log::error!("could not restore drop zone: {again}");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct MockFile {
        name: String,
        contents: String,
    }

    impl SelectedFile for MockFile {
        fn file_name(&self) -> String {
            self.name.clone()
        }
    }

    impl FileBatch for Vec<MockFile> {
        type File = MockFile;

        fn count(&self) -> u32 {
            self.len() as u32
        }

        fn first(&self) -> Option<MockFile> {
            self.as_slice().first().cloned()
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Node {
        DropZone,
        Image(String),
        Close,
        Error(String),
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct MockDom {
        drop_zone_visible: bool,
        highlighted: bool,
        container: Vec<Node>,
        input: Vec<MockFile>,
        chooser_opened: u32,
        /// View operation that reports a browser error instead of running.
        failing: Option<&'static str>,
    }

    impl Default for MockDom {
        fn default() -> Self {
            Self {
                drop_zone_visible: true,
                highlighted: false,
                container: vec![Node::DropZone],
                input: Vec::new(),
                chooser_opened: 0,
                failing: None,
            }
        }
    }

    impl MockDom {
        fn images(&self) -> Vec<&str> {
            self.container
                .iter()
                .filter_map(|node| match node {
                    Node::Image(src) => Some(src.as_str()),
                    _ => None,
                })
                .collect()
        }

        fn close_controls(&self) -> usize {
            self.container.iter().filter(|node| **node == Node::Close).count()
        }

        fn check(&self, operation: &'static str) -> Result<(), PickerError> {
            match self.failing {
                Some(failing) if failing == operation => Err(PickerError::Js(operation.to_string())),
                _ => Ok(()),
            }
        }
    }

    #[derive(Clone, Default)]
    struct MockView(Rc<RefCell<MockDom>>);

    impl PickerView for MockView {
        type Files = Vec<MockFile>;

        fn set_highlight(&self, on: bool) -> Result<(), PickerError> {
            self.0.borrow_mut().highlighted = on;
            Ok(())
        }

        fn set_drop_zone_visible(&self, visible: bool) -> Result<(), PickerError> {
            let mut dom = self.0.borrow_mut();
            dom.check(if visible { "show" } else { "hide" })?;
            dom.drop_zone_visible = visible;
            Ok(())
        }

        fn assign_input(&self, files: &Vec<MockFile>) -> Result<(), PickerError> {
            self.0.borrow_mut().input = files.clone();
            Ok(())
        }

        fn input_files(&self) -> Option<Vec<MockFile>> {
            Some(self.0.borrow().input.clone())
        }

        fn clear_input(&self) -> Result<(), PickerError> {
            self.0.borrow_mut().input.clear();
            Ok(())
        }

        fn open_chooser(&self) {
            self.0.borrow_mut().chooser_opened += 1;
        }

        fn render_preview(&self, data_url: &str) -> Result<(), PickerError> {
            let mut dom = self.0.borrow_mut();
            dom.check("render")?;
            dom.container = vec![Node::Image(data_url.to_string()), Node::Close];
            Ok(())
        }

        fn restore_drop_zone(&self) -> Result<(), PickerError> {
            let mut dom = self.0.borrow_mut();
            dom.container = vec![Node::DropZone];
            dom.drop_zone_visible = true;
            Ok(())
        }

        fn show_error(&self, message: &str) -> Result<(), PickerError> {
            self.0.borrow_mut().container.push(Node::Error(message.to_string()));
            Ok(())
        }
    }

    fn file(name: &str) -> MockFile {
        MockFile {
            name: name.to_string(),
            contents: format!("contents of {name}"),
        }
    }

    fn data_url(file: &MockFile) -> String {
        format!("data:text/plain,{}", file.contents)
    }

    fn picker() -> (Picker<MockView>, Rc<RefCell<MockDom>>) {
        let view = MockView::default();
        let dom = Rc::clone(&view.0);
        (Picker::new(view), dom)
    }

    /// Simulates the user picking `files` in the native chooser.
    fn choose(picker: &mut Picker<MockView>, files: Vec<MockFile>) -> Option<ReadRequest<MockFile>> {
        picker.view().0.borrow_mut().input = files;
        picker.input_changed().unwrap()
    }

    fn complete(picker: &mut Picker<MockView>, read: ReadRequest<MockFile>) {
        picker
            .read_finished(read.request, Ok(data_url(&read.file)))
            .unwrap();
    }

    #[test]
    fn chooser_selection_shows_single_preview() {
        let (mut picker, dom) = picker();
        let read = choose(&mut picker, vec![file("shoe.png")]).expect("read started");
        assert!(matches!(picker.state(), PreviewState::Loading(_)));
        assert!(!dom.borrow().drop_zone_visible);
        assert_eq!(picker.pending().unwrap().name, "shoe.png");

        complete(&mut picker, read);
        assert!(matches!(picker.state(), PreviewState::Showing(_)));
        let dom = dom.borrow();
        assert_eq!(dom.images(), vec!["data:text/plain,contents of shoe.png"]);
        assert_eq!(dom.close_controls(), 1);
        assert!(!dom.drop_zone_visible);
        assert!(!dom.container.contains(&Node::DropZone));
    }

    #[test]
    fn drop_assigns_all_files_but_previews_first() {
        let (mut picker, dom) = picker();
        picker.drag_over().unwrap();
        assert!(dom.borrow().highlighted);

        let files = vec![file("a.png"), file("b.png"), file("c.png")];
        let read = picker.drop_files(Some(files)).unwrap().expect("read started");
        assert_eq!(read.file.name, "a.png");
        assert!(!dom.borrow().highlighted);
        assert_eq!(dom.borrow().input.len(), 3);
        assert_eq!(picker.pending().unwrap().offered, 3);

        complete(&mut picker, read);
        assert_eq!(dom.borrow().images(), vec!["data:text/plain,contents of a.png"]);
    }

    #[test]
    fn empty_drop_changes_nothing() {
        let (mut picker, dom) = picker();
        picker.drag_over().unwrap();
        assert!(picker.drop_files(Some(Vec::new())).unwrap().is_none());
        assert!(picker.drop_files(None).unwrap().is_none());
        assert_eq!(picker.state(), PreviewState::Empty);
        assert_eq!(*dom.borrow(), MockDom::default());
    }

    #[test]
    fn change_with_cleared_input_changes_nothing() {
        let (mut picker, dom) = picker();
        assert!(choose(&mut picker, Vec::new()).is_none());
        assert_eq!(picker.state(), PreviewState::Empty);
        assert_eq!(*dom.borrow(), MockDom::default());
        assert!(picker.pending().is_none());
    }

    #[test]
    fn drag_leave_removes_highlight() {
        let (mut picker, dom) = picker();
        picker.drag_over().unwrap();
        picker.drag_leave().unwrap();
        assert!(!dom.borrow().highlighted);
        assert!(!picker.is_highlighted());
    }

    #[test]
    fn click_opens_chooser() {
        let (mut picker, dom) = picker();
        picker.drop_zone_clicked().unwrap();
        assert_eq!(dom.borrow().chooser_opened, 1);
        assert_eq!(picker.state(), PreviewState::Empty);
    }

    #[test]
    fn dismiss_restores_initial_state() {
        let (mut picker, dom) = picker();
        let read = choose(&mut picker, vec![file("shoe.png")]).unwrap();
        complete(&mut picker, read);

        picker.reset().unwrap();
        assert_eq!(picker.state(), PreviewState::Empty);
        assert!(picker.pending().is_none());
        assert_eq!(*dom.borrow(), MockDom::default());
    }

    #[test]
    fn select_dismiss_select_shows_latest_only() {
        let (mut picker, dom) = picker();
        let read = choose(&mut picker, vec![file("a.png")]).unwrap();
        complete(&mut picker, read);
        picker.reset().unwrap();

        let read = choose(&mut picker, vec![file("b.png")]).unwrap();
        complete(&mut picker, read);

        let dom = dom.borrow();
        assert_eq!(dom.images(), vec!["data:text/plain,contents of b.png"]);
        assert_eq!(dom.close_controls(), 1);
    }

    #[test]
    fn read_failure_restores_drop_zone_and_reports() {
        let (mut picker, dom) = picker();
        let read = choose(&mut picker, vec![file("broken.png")]).unwrap();
        picker
            .read_finished(
                read.request,
                Err(PickerError::Read {
                    name: "broken.png".into(),
                    reason: "NotReadableError".into(),
                }),
            )
            .unwrap();

        assert_eq!(picker.state(), PreviewState::Empty);
        assert!(picker.pending().is_none());
        let dom = dom.borrow();
        assert!(dom.drop_zone_visible);
        assert!(dom.input.is_empty());
        assert_eq!(
            dom.container,
            vec![
                Node::DropZone,
                Node::Error("failed to read broken.png: NotReadableError".into()),
            ]
        );
    }

    #[test]
    fn stale_completion_does_not_overwrite_newer_selection() {
        let (mut picker, dom) = picker();
        let first = choose(&mut picker, vec![file("old.png")]).unwrap();
        let second = choose(&mut picker, vec![file("new.png")]).unwrap();

        complete(&mut picker, second.clone());
        complete(&mut picker, first);

        assert_eq!(picker.state(), PreviewState::Showing(second.request));
        assert_eq!(picker.pending().unwrap().name, "new.png");
        let dom = dom.borrow();
        assert_eq!(dom.images(), vec!["data:text/plain,contents of new.png"]);
        assert_eq!(dom.close_controls(), 1);
    }

    #[test]
    fn completion_after_dismiss_while_loading_is_dropped() {
        let (mut picker, dom) = picker();
        let read = choose(&mut picker, vec![file("slow.png")]).unwrap();
        picker.reset().unwrap();
        complete(&mut picker, read);

        assert_eq!(picker.state(), PreviewState::Empty);
        assert_eq!(*dom.borrow(), MockDom::default());
    }

    #[test]
    fn failed_hide_returns_to_empty_instead_of_loading() {
        let (mut picker, dom) = picker();
        dom.borrow_mut().failing = Some("hide");

        let err = picker
            .drop_files(Some(vec![file("shoe.png")]))
            .unwrap_err();
        assert_eq!(err.to_string(), "browser API error: hide");
        assert_eq!(picker.state(), PreviewState::Empty);
        assert!(picker.pending().is_none());

        let dom = dom.borrow();
        assert!(dom.drop_zone_visible);
        assert!(dom.input.is_empty());
        assert_eq!(
            dom.container,
            vec![Node::DropZone, Node::Error("browser API error: hide".into())]
        );
    }

    #[test]
    fn failed_render_returns_to_empty_instead_of_showing() {
        let (mut picker, dom) = picker();
        let read = choose(&mut picker, vec![file("shoe.png")]).unwrap();
        dom.borrow_mut().failing = Some("render");

        let err = picker
            .read_finished(read.request, Ok(data_url(&read.file)))
            .unwrap_err();
        assert_eq!(err.to_string(), "browser API error: render");
        assert_eq!(picker.state(), PreviewState::Empty);

        let dom = dom.borrow();
        assert!(dom.drop_zone_visible);
        assert!(dom.images().is_empty());
        assert_eq!(dom.close_controls(), 0);
        assert!(dom.input.is_empty());
    }

    #[test]
    fn picker_recovers_after_failed_render() {
        let (mut picker, dom) = picker();
        let read = choose(&mut picker, vec![file("a.png")]).unwrap();
        dom.borrow_mut().failing = Some("render");
        assert!(picker.read_finished(read.request, Ok(data_url(&read.file))).is_err());
        dom.borrow_mut().failing = None;

        let read = choose(&mut picker, vec![file("b.png")]).unwrap();
        complete(&mut picker, read);
        assert!(matches!(picker.state(), PreviewState::Showing(_)));
        let dom = dom.borrow();
        assert_eq!(dom.images(), vec!["data:text/plain,contents of b.png"]);
        assert_eq!(dom.close_controls(), 1);
    }
}
