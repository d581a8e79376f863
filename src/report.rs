//! User-visible status messages.
//!
//! Every message is logged through `log` at the matching level and kept in
//! order so a caller can show or inspect what happened during a run.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Info,
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusMessage {
    pub level: Level,
    pub text: String,
}

#[derive(Default, Debug)]
pub struct Reporter {
    messages: Vec<StatusMessage>,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, text: impl Into<String>) {
        let text = text.into();
        log::info!("{}", text);
        self.push(Level::Info, text);
    }

    pub fn warning(&mut self, text: impl Into<String>) {
        let text = text.into();
        log::warn!("{}", text);
        self.push(Level::Warning, text);
    }

    pub fn error(&mut self, text: impl Into<String>) {
        let text = text.into();
        log::error!("{}", text);
        self.push(Level::Error, text);
    }

    fn push(&mut self, level: Level, text: String) {
        self.messages.push(StatusMessage { level, text });
    }

    pub fn messages(&self) -> &[StatusMessage] {
        &self.messages
    }

    pub fn count(&self, level: Level) -> usize {
        self.messages.iter().filter(|m| m.level == level).count()
    }
}
