use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Navigate,
    /// Typing the content of a new todo
    TodoPrompt,
    /// Typing the path of the file to upload
    FilePath,
}

impl Mode {
    pub fn is_editing(self) -> bool {
        matches!(self, Mode::TodoPrompt | Mode::FilePath)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Navigate => write!(f, "NAVIGATE"),
            Mode::TodoPrompt => write!(f, "NEW TODO"),
            Mode::FilePath => write!(f, "FILE"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Todos,
    Upload,
}

impl Tab {
    pub const ALL: [Tab; 2] = [Tab::Todos, Tab::Upload];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Todos => "Todos",
            Tab::Upload => "Upload",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Tab::Todos => 0,
            Tab::Upload => 1,
        }
    }

    pub fn next(self) -> Self {
        match self {
            Tab::Todos => Tab::Upload,
            Tab::Upload => Tab::Todos,
        }
    }
}
