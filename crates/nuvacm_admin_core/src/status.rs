#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusKind {
    #[default]
    Info,
    Loading,
    Success,
    Error,
}

/// What the status line under a form currently says.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Status {
    pub kind: StatusKind,
    pub message: String,
}

impl Status {
    fn new(kind: StatusKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(StatusKind::Info, message)
    }

    pub fn loading(message: impl Into<String>) -> Self {
        Self::new(StatusKind::Loading, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(StatusKind::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(StatusKind::Error, message)
    }

    pub fn is_error(&self) -> bool {
        self.kind == StatusKind::Error
    }
}
