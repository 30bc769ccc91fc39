use brutus_types::StructureTemplate;
use clap::ValueEnum;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TemplateArg {
    Basic,
    Enterprise,
    Minimal,
}

impl From<TemplateArg> for StructureTemplate {
    fn from(arg: TemplateArg) -> Self {
        match arg {
            TemplateArg::Basic => StructureTemplate::Basic,
            TemplateArg::Enterprise => StructureTemplate::Enterprise,
            TemplateArg::Minimal => StructureTemplate::Minimal,
        }
    }
}
