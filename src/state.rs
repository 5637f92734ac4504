//! Preview state machine.
//!
//! Everything here is pure: [`Machine::step`] takes the current machine and an
//! event and returns the next machine together with the side effects the
//! caller has to perform. The DOM binding and the yew component both drive
//! the same machine.

use std::fmt;

/// Generation number of a file read. Every accepted selection gets a fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl RequestId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreviewState {
    /// Drop zone visible, nothing previewed.
    #[default]
    Empty,
    /// Read in flight, drop zone hidden.
    Loading(RequestId),
    /// Image and dismiss control rendered, drop zone hidden.
    Showing(RequestId),
}

impl PreviewState {
    pub fn name(&self) -> &'static str {
        match self {
            PreviewState::Empty => "empty",
            PreviewState::Loading(_) => "loading",
            PreviewState::Showing(_) => "showing",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerEvent {
    DragOver,
    DragLeave,
    /// Files dropped on the drop zone. `files` is the length of the dropped list.
    Dropped { files: u32 },
    /// The file input reported a change. `files` is the length of its list.
    InputChanged { files: u32 },
    DropZoneClicked,
    ReadCompleted { request: RequestId, data_url: String },
    ReadFailed { request: RequestId, reason: String },
    /// Dismiss control activated, or `reset()` called.
    Dismissed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SetHighlight(bool),
    /// Copy the dropped file list onto the file input.
    AssignDroppedFiles,
    HideDropZone,
    /// Start reading the first file of the current selection.
    StartRead(RequestId),
    RenderPreview { request: RequestId, data_url: String },
    /// Empty the preview container, put the drop zone back and show it.
    RestoreDropZone,
    ClearInput,
    OpenChooser,
    ReportError(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Machine {
    state: PreviewState,
    generation: u64,
    highlighted: bool,
}

impl Machine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PreviewState {
        self.state
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    /// The request whose completion would currently be applied.
    pub fn expected_request(&self) -> Option<RequestId> {
        match self.state {
            PreviewState::Loading(request) => Some(request),
            _ => None,
        }
    }

    pub fn step(self, event: PickerEvent) -> (Machine, Vec<Effect>) {
        let mut next = self;
        let effects = match event {
            PickerEvent::DragOver => {
                next.highlighted = true;
                vec![Effect::SetHighlight(true)]
            }
            PickerEvent::DragLeave => {
                next.highlighted = false;
                vec![Effect::SetHighlight(false)]
            }
            PickerEvent::Dropped { files } => {
                next.highlighted = false;
                let mut effects = vec![Effect::SetHighlight(false), Effect::AssignDroppedFiles];
                effects.extend(next.select(files));
                effects
            }
            PickerEvent::InputChanged { files } => next.select(files),
            PickerEvent::DropZoneClicked => vec![Effect::OpenChooser],
            PickerEvent::ReadCompleted { request, data_url } => {
                if self.expected_request() == Some(request) {
                    next.state = PreviewState::Showing(request);
                    vec![Effect::RenderPreview { request, data_url }]
                } else {
                    Vec::new()
                }
            }
            PickerEvent::ReadFailed { request, reason } => {
                if self.expected_request() == Some(request) {
                    next.state = PreviewState::Empty;
                    vec![
                        Effect::RestoreDropZone,
                        Effect::ClearInput,
                        Effect::ReportError(reason),
                    ]
                } else {
                    Vec::new()
                }
            }
            PickerEvent::Dismissed => match self.state {
                PreviewState::Empty => Vec::new(),
                PreviewState::Loading(_) | PreviewState::Showing(_) => {
                    next.state = PreviewState::Empty;
                    vec![Effect::RestoreDropZone, Effect::ClearInput]
                }
            },
        };
        (next, effects)
    }

    /// In-place form of [`Machine::step`].
    pub fn apply(&mut self, event: PickerEvent) -> Vec<Effect> {
        let (next, effects) = self.step(event);
        *self = next;
        effects
    }

    fn select(&mut self, files: u32) -> Vec<Effect> {
        if files == 0 {
            return Vec::new();
        }
        self.generation += 1;
        let request = RequestId(self.generation);
        self.state = PreviewState::Loading(request);
        vec![Effect::HideDropZone, Effect::StartRead(request)]
    }
}
