use std::fmt;

#[derive(Debug)]
pub enum MarkError {
    /// None of the accepted aliases for a required column is in the header row.
    MissingColumn {
        field: &'static str,
        aliases: &'static [&'static str],
    },
    /// A query was attempted before the reference index was built.
    NotBuilt,
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad delimiter, negative threshold, etc.).
    ConfigValidation(String),
    /// Historical marks file is not the expected JSON shape.
    HistoryParse(String),
    /// IO error (file read, CSV transport, etc.).
    Io(String),
}

impl fmt::Display for MarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingColumn { field, aliases } => {
                write!(
                    f,
                    "unable to guess which column has the {field} of the CPU (tried {})",
                    aliases.join(", ")
                )
            }
            Self::NotBuilt => write!(f, "reference index must be built before use"),
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::HistoryParse(msg) => write!(f, "history parse error: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for MarkError {}
