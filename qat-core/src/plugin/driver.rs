//! Supported kernel VF drivers and user-space target drivers.

use crate::error::QatError;
use std::fmt;
use std::str::FromStr;

/// Kernel drivers QAT virtual functions start out bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceDriver {
    /// DH895xCC
    Dh895xccvf,
    /// C62x
    C6xxvf,
    /// C3xxx
    C3xxxvf,
    /// D15xx
    D15xxvf,
}

impl SourceDriver {
    pub const ALL: [SourceDriver; 4] =
        [Self::Dh895xccvf, Self::C6xxvf, Self::C3xxxvf, Self::D15xxvf];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dh895xccvf => "dh895xccvf",
            Self::C6xxvf => "c6xxvf",
            Self::C3xxxvf => "c3xxxvf",
            Self::D15xxvf => "d15xxvf",
        }
    }
}

impl fmt::Display for SourceDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceDriver {
    type Err = QatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|driver| driver.as_str() == s)
            .ok_or_else(|| QatError::config(format!("Wrong kernel VF driver: {}", s)))
    }
}

/// User-space drivers the VFs are moved to.
///
/// Each variant has exactly one device node layout, see
/// [`NodeResolver`](super::NodeResolver).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetDriver {
    /// `igb_uio`: one `/dev/uioN` node plus the `/sys/class/uio/uioN/device` mount.
    IgbUio,
    /// `vfio-pci`: the IOMMU group node plus the VFIO container node.
    VfioPci,
}

impl TargetDriver {
    pub const ALL: [TargetDriver; 2] = [Self::IgbUio, Self::VfioPci];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IgbUio => "igb_uio",
            Self::VfioPci => "vfio-pci",
        }
    }
}

impl fmt::Display for TargetDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetDriver {
    type Err = QatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|driver| driver.as_str() == s)
            .ok_or_else(|| QatError::config(format!("Wrong DPDK device driver: {}", s)))
    }
}
