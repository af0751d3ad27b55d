/// Log tags identify the subsystem a message comes from.
///
/// The debug key of a tag is what `--debug <tag>` matches against.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogTag {
    Swap,
    Quote,
    Allowance,
    Pool,
    Chain,
    Wallet,
    Config,
    System,
}

impl LogTag {
    pub const ALL: [LogTag; 8] = [
        LogTag::Swap,
        LogTag::Quote,
        LogTag::Allowance,
        LogTag::Pool,
        LogTag::Chain,
        LogTag::Wallet,
        LogTag::Config,
        LogTag::System,
    ];

    /// Upper-case label used in console and plain output
    pub fn to_plain_string(&self) -> &'static str {
        match self {
            LogTag::Swap => "SWAP",
            LogTag::Quote => "QUOTE",
            LogTag::Allowance => "ALLOWANCE",
            LogTag::Pool => "POOL",
            LogTag::Chain => "CHAIN",
            LogTag::Wallet => "WALLET",
            LogTag::Config => "CONFIG",
            LogTag::System => "SYSTEM",
        }
    }

    /// Lower-case key matched by `--debug <key>`
    pub fn to_debug_key(&self) -> String {
        self.to_plain_string().to_lowercase()
    }

    pub fn from_debug_key(key: &str) -> Option<LogTag> {
        let key = key.trim().to_lowercase();
        LogTag::ALL.into_iter().find(|tag| tag.to_debug_key() == key)
    }
}

impl std::fmt::Display for LogTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_plain_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_keys_round_trip_for_every_tag() {
        for tag in LogTag::ALL {
            assert_eq!(LogTag::from_debug_key(&tag.to_debug_key()), Some(tag));
        }
        assert_eq!(LogTag::from_debug_key(" Allowance "), Some(LogTag::Allowance));
        assert_eq!(LogTag::from_debug_key("trader"), None);
    }
}
