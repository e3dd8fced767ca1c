use std::fmt;
use strum_macros::EnumIter;

/// Number of sensor channels per record
pub const CHANNELS: usize = 8;

/// Sensor channel, `s1` to `s8`
#[derive(EnumIter, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Channel {
    S1,
    S2,
    S3,
    S4,
    S5,
    S6,
    S7,
    S8,
}
impl Channel {
    /// Column index of the channel in a channel vector
    pub fn index(&self) -> usize {
        *self as usize
    }
    /// Column header of the channel
    pub fn header(&self) -> &'static str {
        use Channel::*;
        match self {
            S1 => "s1",
            S2 => "s2",
            S3 => "s3",
            S4 => "s4",
            S5 => "s5",
            S6 => "s6",
            S7 => "s7",
            S8 => "s8",
        }
    }
}
impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.header())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn channel_order() {
        let headers: Vec<_> = Channel::iter().map(|c| c.to_string()).collect();
        assert_eq!(headers, vec!["s1", "s2", "s3", "s4", "s5", "s6", "s7", "s8"]);
        assert!(Channel::iter().enumerate().all(|(k, c)| c.index() == k));
        assert_eq!(Channel::iter().count(), CHANNELS);
    }
}
