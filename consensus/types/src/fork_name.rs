use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifies a hard fork of the consensus spec. Ordered so that `ForkName::Base < ForkName::Deneb`
/// compares the way chronological forks do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForkName {
    Base,
    Altair,
    Bellatrix,
    Capella,
    Deneb,
}

impl ForkName {
    pub fn list_all() -> Vec<ForkName> {
        vec![
            ForkName::Base,
            ForkName::Altair,
            ForkName::Bellatrix,
            ForkName::Capella,
            ForkName::Deneb,
        ]
    }

    /// True from Bellatrix onwards, i.e. once blocks carry an execution payload.
    pub fn execution_enabled(&self) -> bool {
        *self >= ForkName::Bellatrix
    }

    /// True from Capella onwards, i.e. once payloads carry withdrawals.
    pub fn withdrawals_enabled(&self) -> bool {
        *self >= ForkName::Capella
    }

    /// True from Deneb onwards, i.e. once blocks carry blob KZG commitments.
    pub fn blobs_enabled(&self) -> bool {
        *self >= ForkName::Deneb
    }
}

impl fmt::Display for ForkName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ForkName::Base => "phase0",
            ForkName::Altair => "altair",
            ForkName::Bellatrix => "bellatrix",
            ForkName::Capella => "capella",
            ForkName::Deneb => "deneb",
        };
        write!(f, "{s}")
    }
}

impl FromStr for ForkName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "phase0" | "base" => Ok(ForkName::Base),
            "altair" => Ok(ForkName::Altair),
            "bellatrix" | "merge" => Ok(ForkName::Bellatrix),
            "capella" => Ok(ForkName::Capella),
            "deneb" => Ok(ForkName::Deneb),
            other => Err(format!("unknown fork name: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_matches_chronology() {
        assert!(ForkName::Base < ForkName::Altair);
        assert!(ForkName::Bellatrix < ForkName::Capella);
        assert!(ForkName::Capella < ForkName::Deneb);
    }

    #[test]
    fn feature_gates() {
        assert!(!ForkName::Altair.execution_enabled());
        assert!(ForkName::Bellatrix.execution_enabled());
        assert!(!ForkName::Bellatrix.withdrawals_enabled());
        assert!(ForkName::Capella.withdrawals_enabled());
        assert!(ForkName::Deneb.blobs_enabled());
    }

    #[test]
    fn round_trips_through_display() {
        for fork in ForkName::list_all() {
            assert_eq!(ForkName::from_str(&fork.to_string()).unwrap(), fork);
        }
    }
}
