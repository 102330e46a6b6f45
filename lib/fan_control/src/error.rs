use std::fmt;

#[derive(Debug, PartialEq)]
pub enum Error {
    EmptyZoneTable,
    MissingCatchAll,
    CatchAllNotLast(usize),
    NanBound(usize),
    UnorderedBounds(f64, f64),
    UnsupportedSpeed(u8, Vec<u8>),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyZoneTable => write!(f, "zone table has no zones"),
            Self::MissingCatchAll => write!(f, "last zone must have no upper bound"),
            Self::CatchAllNotLast(index) => {
                write!(f, "zone {index} has no upper bound but is not the last one")
            }
            Self::NanBound(index) => write!(f, "zone {index} has a NaN upper bound"),
            Self::UnorderedBounds(prev, next) => {
                write!(f, "zone bounds must ascend, got {prev} before {next}")
            }
            Self::UnsupportedSpeed(speed, levels) => {
                write!(f, "unsupported fan speed {speed}%, expected one of {levels:?}")
            }
        }
    }
}

impl std::error::Error for Error {}
