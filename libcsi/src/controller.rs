//! CSI Controller service trait.
//!
//! The Controller service manages the centralized volume lifecycle: creation,
//! deletion, attachment to nodes, capability validation, listing, and
//! capacity queries.  The client only ever sees it through this trait, so an
//! in-memory implementation can stand in for a remote plugin.

use async_trait::async_trait;
use tonic::Status;

use crate::types::{
    ControllerGetCapabilitiesRequest, ControllerGetCapabilitiesResponse,
    ControllerPublishVolumeRequest, ControllerPublishVolumeResponse,
    ControllerUnpublishVolumeRequest, ControllerUnpublishVolumeResponse, CreateVolumeRequest,
    CreateVolumeResponse, DeleteVolumeRequest, DeleteVolumeResponse, GetCapacityRequest,
    GetCapacityResponse, ListVolumesRequest, ListVolumesResponse,
    ValidateVolumeCapabilitiesRequest, ValidateVolumeCapabilitiesResponse,
};

/// Controller service: one method per RPC.
///
/// Failures are returned exactly as the plugin reported them.  Implementations
/// must be safe to share between tasks; callers never issue two list calls on
/// the same handle concurrently but may render while a call is in flight.
#[async_trait]
pub trait CsiController: Send + Sync {
    /// Provision a new volume.
    async fn create_volume(
        &self,
        req: CreateVolumeRequest,
    ) -> Result<CreateVolumeResponse, Status>;

    /// Delete a previously provisioned volume.
    async fn delete_volume(
        &self,
        req: DeleteVolumeRequest,
    ) -> Result<DeleteVolumeResponse, Status>;

    /// Make a volume available on a node.
    async fn controller_publish_volume(
        &self,
        req: ControllerPublishVolumeRequest,
    ) -> Result<ControllerPublishVolumeResponse, Status>;

    /// Reverse of [`CsiController::controller_publish_volume`].
    async fn controller_unpublish_volume(
        &self,
        req: ControllerUnpublishVolumeRequest,
    ) -> Result<ControllerUnpublishVolumeResponse, Status>;

    /// Check whether the given capabilities are compatible with the volume.
    async fn validate_volume_capabilities(
        &self,
        req: ValidateVolumeCapabilitiesRequest,
    ) -> Result<ValidateVolumeCapabilitiesResponse, Status>;

    /// Fetch one page of volumes.
    async fn list_volumes(&self, req: ListVolumesRequest) -> Result<ListVolumesResponse, Status>;

    /// Return the total available capacity in bytes.
    async fn get_capacity(&self, req: GetCapacityRequest) -> Result<GetCapacityResponse, Status>;

    /// Advertise the RPCs this controller supports.
    async fn controller_get_capabilities(
        &self,
        req: ControllerGetCapabilitiesRequest,
    ) -> Result<ControllerGetCapabilitiesResponse, Status>;
}
