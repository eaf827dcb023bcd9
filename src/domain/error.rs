//! Domain error types.

/// Ledger invariant violations.
///
/// These can only be produced by a logic bug in the caller (buying into an
/// open position, selling a flat one); the engine stops the run on the first
/// one rather than trying to recover.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LedgerError {
    #[error("position in {symbol} is already open")]
    PositionAlreadyOpen { symbol: String },

    #[error("no open position in {symbol}")]
    NoOpenPosition { symbol: String },

    #[error("invalid price {price} for {symbol}")]
    InvalidPrice { symbol: String, price: f64 },
}

/// Top-level error type for stratbench.
#[derive(Debug, thiserror::Error)]
pub enum StratbenchError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("unknown preset strategy: {name}")]
    UnknownPreset { name: String },

    #[error("price data error: {reason}")]
    Data { reason: String },

    #[error("no price data for {symbol}")]
    NoData { symbol: String },

    #[error("no instruments to simulate")]
    EmptyUniverse,

    #[error("empty price history for {symbol}")]
    EmptyHistory { symbol: String },

    #[error("duplicate instrument: {symbol}")]
    DuplicateSymbol { symbol: String },

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&StratbenchError> for std::process::ExitCode {
    fn from(err: &StratbenchError) -> Self {
        let code: u8 = match err {
            StratbenchError::Io(_) => 1,
            StratbenchError::ConfigParse { .. }
            | StratbenchError::ConfigMissing { .. }
            | StratbenchError::ConfigInvalid { .. }
            | StratbenchError::UnknownPreset { .. } => 2,
            StratbenchError::Data { .. }
            | StratbenchError::NoData { .. }
            | StratbenchError::EmptyUniverse
            | StratbenchError::EmptyHistory { .. }
            | StratbenchError::DuplicateSymbol { .. } => 5,
            StratbenchError::Ledger(_) => 6,
        };
        std::process::ExitCode::from(code)
    }
}
