use std::fmt;
use std::str::FromStr;

/// Logical time as carried by clocks and messages.
pub type Timestamp = u64;

/// Stable identifier of a simulated process.
///
/// Wraps the zero-based creation index. Displayed as `P<n>` with `n = index + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProcessId(pub u32);

impl ProcessId {
    pub fn from_index(index: usize) -> Option<Self> {
        u32::try_from(index).ok().map(Self)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", u64::from(self.0) + 1)
    }
}

impl serde::Serialize for ProcessId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseIdError {
    #[error("invalid process `{0}`: expected an index like `0` or a label like `P1`")]
    Process(String),
    #[error("invalid message id `{0}`")]
    Message(String),
}

/// Accepts either a zero-based index (`"2"`) or a label (`"P3"`).
impl FromStr for ProcessId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseIdError::Process(s.to_string());

        match s.strip_prefix(['P', 'p']) {
            Some(label) => {
                let ordinal = label.parse::<u32>().map_err(|_| err())?;
                ordinal.checked_sub(1).map(Self).ok_or_else(err)
            }
            None => s.parse::<u32>().map(Self).map_err(|_| err()),
        }
    }
}

/// Queue-assigned message identifier. Strictly increasing in send order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(transparent)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl FromStr for MessageId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix('#')
            .unwrap_or(s)
            .parse::<u64>()
            .map(Self)
            .map_err(|_| ParseIdError::Message(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_id_parses_index_and_label() {
        assert_eq!("0".parse::<ProcessId>(), Ok(ProcessId(0)));
        assert_eq!("P1".parse::<ProcessId>(), Ok(ProcessId(0)));
        assert_eq!("p3".parse::<ProcessId>(), Ok(ProcessId(2)));

        assert!("P0".parse::<ProcessId>().is_err());
        assert!("-1".parse::<ProcessId>().is_err());
        assert!("Q1".parse::<ProcessId>().is_err());
    }

    #[test]
    fn process_id_displays_as_label() {
        assert_eq!(ProcessId(0).to_string(), "P1");
        assert_eq!(ProcessId(u32::MAX).to_string(), "P4294967296");
    }

    #[test]
    fn message_id_accepts_optional_hash() {
        assert_eq!("#7".parse::<MessageId>(), Ok(MessageId(7)));
        assert_eq!("7".parse::<MessageId>(), Ok(MessageId(7)));
        assert!("#".parse::<MessageId>().is_err());
        assert_eq!(MessageId(7).to_string(), "#7");
    }
}
