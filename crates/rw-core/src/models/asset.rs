//! Asset data model for ICS risk assessments.
//!
//! An asset is the subject of an assessment: a single piece of industrial
//! control infrastructure (HMI, PLC, SCADA server, etc.) whose exposure to
//! adversary techniques is being scored.

use serde::{Deserialize, Serialize};

/// The ICS asset under assessment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    /// Human-readable name for the asset (e.g. "Main Control HMI").
    pub name: String,
    /// Category of ICS equipment. Optional while the asset is being drafted;
    /// the wizard only requires a name to advance.
    pub asset_type: Option<AssetType>,
}

impl Asset {
    /// Creates a named asset of the given type.
    pub fn new(name: impl Into<String>, asset_type: Option<AssetType>) -> Self {
        Self {
            name: name.into(),
            asset_type,
        }
    }

    /// Whether the asset carries a usable (non-whitespace) name.
    pub fn is_named(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

impl Default for Asset {
    fn default() -> Self {
        Self {
            name: String::new(),
            asset_type: None,
        }
    }
}

/// Categories of industrial control system equipment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AssetType {
    /// Human Machine Interface.
    Hmi,
    /// Programmable Logic Controller.
    Plc,
    /// Engineering workstation used to program controllers.
    EngineeringWorkstation,
    /// Supervisory Control and Data Acquisition system.
    Scada,
    /// Data historian.
    Historian,
    /// Remote Terminal Unit.
    Rtu,
}

impl AssetType {
    /// Short machine-readable code, as used in data files and on the CLI.
    pub fn code(&self) -> &'static str {
        match self {
            AssetType::Hmi => "hmi",
            AssetType::Plc => "plc",
            AssetType::EngineeringWorkstation => "workstation",
            AssetType::Scada => "scada",
            AssetType::Historian => "historian",
            AssetType::Rtu => "rtu",
        }
    }

    /// All known asset types, in display order.
    pub fn all() -> &'static [AssetType] {
        &[
            AssetType::Hmi,
            AssetType::Plc,
            AssetType::EngineeringWorkstation,
            AssetType::Scada,
            AssetType::Historian,
            AssetType::Rtu,
        ]
    }
}

impl std::fmt::Display for AssetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetType::Hmi => write!(f, "Human Machine Interface (HMI)"),
            AssetType::Plc => write!(f, "Programmable Logic Controller (PLC)"),
            AssetType::EngineeringWorkstation => write!(f, "Engineering Workstation"),
            AssetType::Scada => write!(f, "SCADA System"),
            AssetType::Historian => write!(f, "Data Historian"),
            AssetType::Rtu => write!(f, "Remote Terminal Unit (RTU)"),
        }
    }
}

impl std::str::FromStr for AssetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hmi" => Ok(AssetType::Hmi),
            "plc" => Ok(AssetType::Plc),
            "workstation" => Ok(AssetType::EngineeringWorkstation),
            "scada" => Ok(AssetType::Scada),
            "historian" => Ok(AssetType::Historian),
            "rtu" => Ok(AssetType::Rtu),
            _ => Err(format!(
                "Unknown asset type: {} (expected one of: hmi, plc, workstation, scada, historian, rtu)",
                s
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_is_named() {
        assert!(!Asset::default().is_named());
        assert!(!Asset::new("   ", None).is_named());
        assert!(Asset::new("Production PLC-01", Some(AssetType::Plc)).is_named());
    }

    #[test]
    fn test_asset_type_code_round_trip() {
        for asset_type in AssetType::all() {
            let parsed: AssetType = asset_type.code().parse().unwrap();
            assert_eq!(parsed, *asset_type);
        }
    }

    #[test]
    fn test_asset_type_parse_rejects_unknown() {
        assert!("mainframe".parse::<AssetType>().is_err());
    }

    #[test]
    fn test_asset_serialization() {
        let asset = Asset::new("Main Control HMI", Some(AssetType::Hmi));
        let json = serde_json::to_string(&asset).unwrap();
        assert!(json.contains("\"hmi\""));
        let back: Asset = serde_json::from_str(&json).unwrap();
        assert_eq!(back, asset);
    }
}
