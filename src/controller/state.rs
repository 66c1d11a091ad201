use serde::Serialize;

/// What the UI renders. Exactly one is active at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Capturing,
    PreviewBlurry,
    PreviewSharp,
    Submitting,
    Pass,
    Fail,
}

impl SessionState {
    pub const ALL: [SessionState; 7] = [
        SessionState::Idle,
        SessionState::Capturing,
        SessionState::PreviewBlurry,
        SessionState::PreviewSharp,
        SessionState::Submitting,
        SessionState::Pass,
        SessionState::Fail,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Capturing => "capturing",
            SessionState::PreviewBlurry => "preview_blurry",
            SessionState::PreviewSharp => "preview_sharp",
            SessionState::Submitting => "submitting",
            SessionState::Pass => "pass",
            SessionState::Fail => "fail",
        }
    }

    /// Whether the camera device is held in this state.
    pub fn holds_camera(self) -> bool {
        self == SessionState::Capturing
    }

    /// Whether `event` is meaningful here. Anything else is ignored.
    pub fn accepts(self, event: Event) -> bool {
        use Event::*;
        use SessionState::*;
        matches!(
            (self, event),
            (Idle, Start)
                | (Capturing, CaptureFrame)
                | (Capturing, ToggleFacingMode)
                | (PreviewBlurry, Retake)
                | (PreviewSharp, Retake)
                | (Fail, Retake)
                | (PreviewSharp, ConfirmSubmit)
                | (Pass, StartOver)
                | (Fail, StartOver)
        )
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// User-initiated events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Event {
    Start,
    CaptureFrame,
    Retake,
    ConfirmSubmit,
    StartOver,
    ToggleFacingMode,
}

impl Event {
    pub const ALL: [Event; 6] = [
        Event::Start,
        Event::CaptureFrame,
        Event::Retake,
        Event::ConfirmSubmit,
        Event::StartOver,
        Event::ToggleFacingMode,
    ];
}
