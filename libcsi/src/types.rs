//! CSI controller wire model.
//!
//! These are the protobuf messages exchanged with a controller plugin over
//! gRPC.  They derive [`prost::Message`] for the wire and [`Serialize`] so the
//! client can feed responses to its output templates unchanged.
//!
//! Optional sub-objects (metadata, node identifiers, capacity ranges) are
//! modelled as `Option` so that "not supplied" is distinguishable from
//! "supplied but empty" all the way to the wire.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::CsiError;

// ---------------------------------------------------------------------------
// Protocol version
// ---------------------------------------------------------------------------

/// CSI protocol version carried by every request.
#[derive(Clone, Copy, PartialEq, Eq, ::prost::Message, Serialize)]
pub struct Version {
    #[prost(uint32, tag = "1")]
    pub major: u32,
    #[prost(uint32, tag = "2")]
    pub minor: u32,
    #[prost(uint32, tag = "3")]
    pub patch: u32,
}

impl Version {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = CsiError;

    /// Parse a `MAJOR.MINOR.PATCH` string.  Pre-release and build suffixes
    /// are accepted and dropped since the wire format has no room for them.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = semver::Version::parse(s.trim())
            .map_err(|e| CsiError::InvalidArgument(format!("invalid version {s:?}: {e}")))?;
        let part = |n: u64| {
            u32::try_from(n).map_err(|_| {
                CsiError::InvalidArgument(format!("version component {n} exceeds 32 bits"))
            })
        };
        Ok(Self::new(
            part(parsed.major)?,
            part(parsed.minor)?,
            part(parsed.patch)?,
        ))
    }
}

// ---------------------------------------------------------------------------
// Identifiers & metadata
// ---------------------------------------------------------------------------

/// Key/value map uniquely naming a volume.
#[derive(Clone, PartialEq, ::prost::Message, Serialize)]
pub struct VolumeId {
    #[prost(map = "string, string", tag = "1")]
    pub values: HashMap<String, String>,
}

impl VolumeId {
    pub fn new(values: HashMap<String, String>) -> Self {
        Self { values }
    }
}

impl fmt::Display for VolumeId {
    /// Renders the pairs sorted by key so log lines are stable.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut pairs: Vec<_> = self.values.iter().collect();
        pairs.sort();
        for (i, (k, v)) in pairs.into_iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            if v.is_empty() {
                f.write_str(k)?;
            } else {
                write!(f, "{k}={v}")?;
            }
        }
        Ok(())
    }
}

/// Opaque metadata the plugin attached to a volume.
#[derive(Clone, PartialEq, ::prost::Message, Serialize)]
pub struct VolumeMetadata {
    #[prost(map = "string, string", tag = "1")]
    pub values: HashMap<String, String>,
}

/// Identifier of the node a volume is (un)published on.
#[derive(Clone, PartialEq, ::prost::Message, Serialize)]
pub struct NodeId {
    #[prost(map = "string, string", tag = "1")]
    pub values: HashMap<String, String>,
}

/// Information the plugin returns after a volume was published.
#[derive(Clone, PartialEq, ::prost::Message, Serialize)]
pub struct PublishVolumeInfo {
    #[prost(map = "string, string", tag = "1")]
    pub values: HashMap<String, String>,
}

// ---------------------------------------------------------------------------
// Volumes & capabilities
// ---------------------------------------------------------------------------

/// A provisioned volume as reported by the controller.
#[derive(Clone, PartialEq, ::prost::Message, Serialize)]
pub struct VolumeInfo {
    #[prost(uint64, tag = "1")]
    pub capacity_bytes: u64,
    #[prost(message, optional, tag = "2")]
    pub id: Option<VolumeId>,
    #[prost(message, optional, tag = "3")]
    pub metadata: Option<VolumeMetadata>,
}

/// Size bounds for a new volume.  Zero means "unspecified".
#[derive(Clone, Copy, PartialEq, Eq, ::prost::Message, Serialize)]
pub struct CapacityRange {
    #[prost(uint64, tag = "1")]
    pub required_bytes: u64,
    #[prost(uint64, tag = "2")]
    pub limit_bytes: u64,
}

/// One way a volume may be consumed.
#[derive(Clone, PartialEq, ::prost::Message, Serialize)]
pub struct VolumeCapability {
    #[prost(oneof = "volume_capability::AccessType", tags = "1, 2")]
    pub access_type: Option<volume_capability::AccessType>,
}

impl VolumeCapability {
    /// A mount capability with the given filesystem type and flags.
    pub fn mount(fs_type: impl Into<String>, mount_flags: Vec<String>) -> Self {
        Self {
            access_type: Some(volume_capability::AccessType::Mount(
                volume_capability::MountVolume {
                    fs_type: fs_type.into(),
                    mount_flags,
                },
            )),
        }
    }

    /// The mount sub-object, if this is a mount capability.
    pub fn as_mount(&self) -> Option<&volume_capability::MountVolume> {
        match &self.access_type {
            Some(volume_capability::AccessType::Mount(m)) => Some(m),
            _ => None,
        }
    }
}

pub mod volume_capability {
    use serde::Serialize;

    #[derive(Clone, Copy, PartialEq, Eq, ::prost::Message, Serialize)]
    pub struct BlockVolume {}

    #[derive(Clone, PartialEq, ::prost::Message, Serialize)]
    pub struct MountVolume {
        #[prost(string, tag = "1")]
        pub fs_type: String,
        #[prost(string, repeated, tag = "2")]
        pub mount_flags: Vec<String>,
    }

    #[derive(Clone, PartialEq, ::prost::Oneof, Serialize)]
    #[serde(rename_all = "snake_case")]
    pub enum AccessType {
        #[prost(message, tag = "1")]
        Block(BlockVolume),
        #[prost(message, tag = "2")]
        Mount(MountVolume),
    }
}

// ---------------------------------------------------------------------------
// CreateVolume / DeleteVolume
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, ::prost::Message, Serialize)]
pub struct CreateVolumeRequest {
    #[prost(message, optional, tag = "1")]
    pub version: Option<Version>,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(message, optional, tag = "3")]
    pub capacity_range: Option<CapacityRange>,
    #[prost(message, repeated, tag = "4")]
    pub volume_capabilities: Vec<VolumeCapability>,
    #[prost(map = "string, string", tag = "5")]
    pub parameters: HashMap<String, String>,
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize)]
pub struct CreateVolumeResponse {
    #[prost(message, optional, tag = "1")]
    pub volume_info: Option<VolumeInfo>,
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize)]
pub struct DeleteVolumeRequest {
    #[prost(message, optional, tag = "1")]
    pub version: Option<Version>,
    #[prost(message, optional, tag = "2")]
    pub volume_id: Option<VolumeId>,
    #[prost(message, optional, tag = "3")]
    pub volume_metadata: Option<VolumeMetadata>,
}

#[derive(Clone, Copy, PartialEq, Eq, ::prost::Message, Serialize)]
pub struct DeleteVolumeResponse {}

// ---------------------------------------------------------------------------
// ControllerPublishVolume / ControllerUnpublishVolume
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, ::prost::Message, Serialize)]
pub struct ControllerPublishVolumeRequest {
    #[prost(message, optional, tag = "1")]
    pub version: Option<Version>,
    #[prost(message, optional, tag = "2")]
    pub volume_id: Option<VolumeId>,
    #[prost(message, optional, tag = "3")]
    pub volume_metadata: Option<VolumeMetadata>,
    #[prost(message, optional, tag = "4")]
    pub node_id: Option<NodeId>,
    #[prost(bool, tag = "5")]
    pub readonly: bool,
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize)]
pub struct ControllerPublishVolumeResponse {
    #[prost(message, optional, tag = "1")]
    pub publish_volume_info: Option<PublishVolumeInfo>,
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize)]
pub struct ControllerUnpublishVolumeRequest {
    #[prost(message, optional, tag = "1")]
    pub version: Option<Version>,
    #[prost(message, optional, tag = "2")]
    pub volume_id: Option<VolumeId>,
    #[prost(message, optional, tag = "3")]
    pub volume_metadata: Option<VolumeMetadata>,
    #[prost(message, optional, tag = "4")]
    pub node_id: Option<NodeId>,
}

#[derive(Clone, Copy, PartialEq, Eq, ::prost::Message, Serialize)]
pub struct ControllerUnpublishVolumeResponse {}

// ---------------------------------------------------------------------------
// ValidateVolumeCapabilities
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, ::prost::Message, Serialize)]
pub struct ValidateVolumeCapabilitiesRequest {
    #[prost(message, optional, tag = "1")]
    pub version: Option<Version>,
    #[prost(message, optional, tag = "2")]
    pub volume_info: Option<VolumeInfo>,
    #[prost(message, repeated, tag = "3")]
    pub volume_capabilities: Vec<VolumeCapability>,
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize)]
pub struct ValidateVolumeCapabilitiesResponse {
    #[prost(bool, tag = "1")]
    pub supported: bool,
    #[prost(string, tag = "2")]
    pub message: String,
}

// ---------------------------------------------------------------------------
// ListVolumes
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, ::prost::Message, Serialize)]
pub struct ListVolumesRequest {
    #[prost(message, optional, tag = "1")]
    pub version: Option<Version>,
    /// Zero lets the plugin choose the page size.
    #[prost(uint32, tag = "2")]
    pub max_entries: u32,
    #[prost(string, tag = "3")]
    pub starting_token: String,
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize)]
pub struct ListVolumesResponse {
    #[prost(message, repeated, tag = "1")]
    pub entries: Vec<list_volumes_response::Entry>,
    /// Empty when there are no further pages.
    #[prost(string, tag = "2")]
    pub next_token: String,
}

pub mod list_volumes_response {
    use serde::Serialize;

    #[derive(Clone, PartialEq, ::prost::Message, Serialize)]
    pub struct Entry {
        #[prost(message, optional, tag = "1")]
        pub volume_info: Option<super::VolumeInfo>,
    }
}

// ---------------------------------------------------------------------------
// GetCapacity / ControllerGetCapabilities
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, PartialEq, Eq, ::prost::Message, Serialize)]
pub struct GetCapacityRequest {
    #[prost(message, optional, tag = "1")]
    pub version: Option<Version>,
}

#[derive(Clone, Copy, PartialEq, Eq, ::prost::Message, Serialize)]
pub struct GetCapacityResponse {
    #[prost(uint64, tag = "1")]
    pub total_capacity: u64,
}

#[derive(Clone, Copy, PartialEq, Eq, ::prost::Message, Serialize)]
pub struct ControllerGetCapabilitiesRequest {
    #[prost(message, optional, tag = "1")]
    pub version: Option<Version>,
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize)]
pub struct ControllerGetCapabilitiesResponse {
    #[prost(message, repeated, tag = "1")]
    pub capabilities: Vec<ControllerServiceCapability>,
}

/// A single capability advertised by the controller service.
#[derive(Clone, Copy, PartialEq, Eq, ::prost::Message, Serialize)]
pub struct ControllerServiceCapability {
    #[prost(oneof = "controller_service_capability::Type", tags = "1")]
    pub r#type: Option<controller_service_capability::Type>,
}

impl ControllerServiceCapability {
    pub fn rpc(kind: controller_service_capability::rpc::Type) -> Self {
        Self {
            r#type: Some(controller_service_capability::Type::Rpc(
                controller_service_capability::Rpc { r#type: kind as i32 },
            )),
        }
    }
}

pub mod controller_service_capability {
    use serde::{Serialize, Serializer};

    #[derive(Clone, Copy, PartialEq, Eq, ::prost::Message, Serialize)]
    pub struct Rpc {
        #[prost(enumeration = "rpc::Type", tag = "1")]
        #[serde(serialize_with = "serialize_rpc_type")]
        pub r#type: i32,
    }

    pub mod rpc {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
        #[repr(i32)]
        pub enum Type {
            Unknown = 0,
            CreateDeleteVolume = 1,
            PublishUnpublishVolume = 2,
            ListVolumes = 3,
            GetCapacity = 4,
        }

        impl Type {
            /// The name used for this value in the protobuf definition.
            pub fn as_str_name(&self) -> &'static str {
                match self {
                    Self::Unknown => "UNKNOWN",
                    Self::CreateDeleteVolume => "CREATE_DELETE_VOLUME",
                    Self::PublishUnpublishVolume => "PUBLISH_UNPUBLISH_VOLUME",
                    Self::ListVolumes => "LIST_VOLUMES",
                    Self::GetCapacity => "GET_CAPACITY",
                }
            }
        }
    }

    /// Renders known RPC types by name and falls back to the raw number.
    fn serialize_rpc_type<S: Serializer>(value: &i32, serializer: S) -> Result<S::Ok, S::Error> {
        match rpc::Type::try_from(*value) {
            Ok(kind) => serializer.serialize_str(kind.as_str_name()),
            Err(_) => serializer.serialize_i32(*value),
        }
    }

    #[derive(Clone, Copy, PartialEq, Eq, ::prost::Oneof, Serialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Type {
        #[prost(message, tag = "1")]
        Rpc(Rpc),
    }
}

#[cfg(test)]
mod tests {
    use prost::Message;

    use super::*;

    #[test]
    fn version_parse_and_display() {
        let v: Version = "0.1.0".parse().expect("parse");
        assert_eq!(v, Version::new(0, 1, 0));
        assert_eq!(v.to_string(), "0.1.0");
        assert!("one.two".parse::<Version>().is_err());
    }

    #[test]
    fn volume_id_display_is_sorted() {
        let id = VolumeId::new(HashMap::from([
            ("zone".to_owned(), "a".to_owned()),
            ("id".to_owned(), "vol-1".to_owned()),
            ("bare".to_owned(), String::new()),
        ]));
        assert_eq!(id.to_string(), "bare,id=vol-1,zone=a");
    }

    #[test]
    fn absent_metadata_is_not_encoded() {
        let req = DeleteVolumeRequest {
            version: Some(Version::new(0, 1, 0)),
            volume_id: Some(VolumeId::new(HashMap::from([(
                "id".to_owned(),
                "1".to_owned(),
            )]))),
            volume_metadata: None,
        };
        let decoded = DeleteVolumeRequest::decode(req.encode_to_vec().as_slice()).expect("decode");
        assert!(decoded.volume_metadata.is_none());
        assert_eq!(decoded, req);
    }

    #[test]
    fn capability_serializes_rpc_name() {
        use controller_service_capability::rpc;

        let cap = ControllerServiceCapability::rpc(rpc::Type::ListVolumes);
        let json = serde_json::to_value(cap).expect("serialize");
        assert_eq!(json["type"]["rpc"]["type"], "LIST_VOLUMES");
    }

    #[test]
    fn mount_capability_accessor() {
        let cap = VolumeCapability::mount("ext4", vec![]);
        let mount = cap.as_mount().expect("mount");
        assert_eq!(mount.fs_type, "ext4");
        assert!(mount.mount_flags.is_empty());
        assert!(VolumeCapability::default().as_mount().is_none());
    }
}
