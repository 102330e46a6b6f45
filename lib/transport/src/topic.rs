use std::fmt;
use std::str::FromStr;

use serde::de::{value, Error};

const SERVICE: &str = "presk";

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Topic {
    Temperature,
    Fan,
}

impl Topic {
    pub const fn all() -> [Topic; 2] {
        [Topic::Temperature, Topic::Fan]
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Topic::Temperature => write!(f, "{SERVICE}/temperature"),
            Topic::Fan => write!(f, "{SERVICE}/fan"),
        }
    }
}

impl FromStr for Topic {
    type Err = value::Error;

    fn from_str(s: &str) -> std::result::Result<Topic, Self::Err> {
        const ERROR_MSG: &str = "supported topics are presk/temperature and presk/fan";

        let (service, node) = s
            .split_once('/')
            .ok_or_else(|| value::Error::custom(ERROR_MSG))?;

        if service != SERVICE {
            return Err(value::Error::custom(format!(
                "expected service {SERVICE}, got {service}"
            )));
        }

        match node {
            "temperature" => Ok(Topic::Temperature),
            "fan" => Ok(Topic::Fan),
            _ => Err(value::Error::custom(ERROR_MSG)),
        }
    }
}
