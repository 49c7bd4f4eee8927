mod settings;

pub use settings::{Command, Config, ModeArg, OutboxSettings, ReportSettings, Settings};
