use serde::{Deserialize, Serialize};
use strum::{EnumString, IntoStaticStr};

/// Hard fork the generated code targets. Decides which opcodes a dialect exposes.
#[derive(
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Default,
    Hash,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    EnumString,
    IntoStaticStr,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Fork {
    Paris = 0,
    Shanghai = 1,
    #[default]
    Cancun = 2,
    Prague = 3,
    Osaka = 4,
    Amsterdam = 5,
}

impl std::fmt::Display for Fork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name: &'static str = self.into();
        f.write_str(name)
    }
}
