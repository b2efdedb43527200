//! Closed status enumerations.
//!
//! Both enums travel on the wire as bare integers. Any integer outside the
//! enumeration is rejected with [`InvalidStatus`]; values are never clamped.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Raised when an integer is not a member of a status enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Status {value} is wrong, possible values are [0 1 2 3]")]
pub struct InvalidStatus {
    pub value: i64,
}

/// Result of a single health check.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum HealthCheckStatus {
    #[default]
    Ok = 0,
    Warn = 1,
    Critical = 2,
    Unknown = 3,
}

impl HealthCheckStatus {
    pub const ALL: [HealthCheckStatus; 4] = [Self::Ok, Self::Warn, Self::Critical, Self::Unknown];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Warn => "WARN",
            Self::Critical => "CRITICAL",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Ranking used when folding a check tree into one status.
    /// An unknown result is treated as worse than OK but better than WARN.
    pub fn severity(self) -> u8 {
        match self {
            Self::Ok => 0,
            Self::Unknown => 1,
            Self::Warn => 2,
            Self::Critical => 3,
        }
    }
}

impl TryFrom<i64> for HealthCheckStatus {
    type Error = InvalidStatus;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Ok),
            1 => Ok(Self::Warn),
            2 => Ok(Self::Critical),
            3 => Ok(Self::Unknown),
            _ => Err(InvalidStatus { value }),
        }
    }
}

impl From<HealthCheckStatus> for i64 {
    fn from(status: HealthCheckStatus) -> Self {
        status as i64
    }
}

impl fmt::Display for HealthCheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate status of a service.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum ServiceStatus {
    #[default]
    Operational = 0,
    Degraded = 1,
    Down = 2,
    Unknown = 3,
}

impl ServiceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Operational => "OPERATIONAL",
            Self::Degraded => "DEGRADED",
            Self::Down => "DOWN",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl TryFrom<i64> for ServiceStatus {
    type Error = InvalidStatus;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Operational),
            1 => Ok(Self::Degraded),
            2 => Ok(Self::Down),
            3 => Ok(Self::Unknown),
            _ => Err(InvalidStatus { value }),
        }
    }
}

impl From<ServiceStatus> for i64 {
    fn from(status: ServiceStatus) -> Self {
        status as i64
    }
}

impl From<HealthCheckStatus> for ServiceStatus {
    fn from(status: HealthCheckStatus) -> Self {
        match status {
            HealthCheckStatus::Ok => Self::Operational,
            HealthCheckStatus::Warn => Self::Degraded,
            HealthCheckStatus::Critical => Self::Down,
            HealthCheckStatus::Unknown => Self::Unknown,
        }
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
