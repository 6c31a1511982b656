use std::{error, fmt};

/// Row/column position of a token in the source text, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub row: u32,
    pub column: u32,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.row, self.column)
    }
}

/// Every failure surfaced by this crate, front-end and virtual machine alike.
#[derive(Debug, Clone)]
pub enum Error {
    /// Grammar or type-rule violation. Only the first error in a parse is
    /// ever reported (§7 propagation policy).
    ParseError { message: String, at: Position },
    /// Null/missing input at the API boundary.
    InvalidParameter(&'static str),
    /// Out-of-range slot passed to bind/set.
    InvalidIndex,
    /// A register operand named a register past `registerCount`.
    InvalidRegister,
    /// Decode hit an unknown opcode, or an inline constant read ran past
    /// the end of the instruction stream.
    InvalidBytecode,
    /// A kernel tried to read/write a register that was never bound.
    UnassignedRegisterPointer,
    /// Scratch memory could not fit even a single element's worth of
    /// temporaries plus the flag byte.
    InsufficientMemory,
    /// Host allocator refused a request.
    AllocationError,
    /// The batch size requested does not fit the execution model (e.g.
    /// zero-sized scratch with a non-zero element count).
    InvalidBatchSize,
    /// A sampler callback returned failure.
    SamplingFailed,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParseError { message, at } => write!(f, "parse error at {at}: {message}"),
            Self::InvalidParameter(what) => write!(f, "invalid parameter: {what}"),
            Self::InvalidIndex => f.write_str("invalid index"),
            Self::InvalidRegister => f.write_str("invalid register"),
            Self::InvalidBytecode => f.write_str("invalid bytecode"),
            Self::UnassignedRegisterPointer => f.write_str("unassigned register pointer"),
            Self::InsufficientMemory => f.write_str("insufficient scratch memory"),
            Self::AllocationError => f.write_str("allocation error"),
            Self::InvalidBatchSize => f.write_str("invalid batch size"),
            Self::SamplingFailed => f.write_str("sampling failed"),
        }
    }
}

impl error::Error for Error {}

impl Error {
    pub(crate) fn parse(message: impl Into<String>, at: Position) -> Self {
        Self::ParseError {
            message: message.into(),
            at,
        }
    }
}
