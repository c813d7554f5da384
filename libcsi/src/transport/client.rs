//! gRPC client used by `csc` to issue CSI controller requests.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use prost::Message;
use tonic::codec::ProstCodec;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::{Channel, ClientTlsConfig, Endpoint};
use tonic::{GrpcMethod, Request, Status};
use tracing::{debug, instrument};

use crate::controller::CsiController;
use crate::error::CsiError;
use crate::types::{
    ControllerGetCapabilitiesRequest, ControllerGetCapabilitiesResponse,
    ControllerPublishVolumeRequest, ControllerPublishVolumeResponse,
    ControllerUnpublishVolumeRequest, ControllerUnpublishVolumeResponse, CreateVolumeRequest,
    CreateVolumeResponse, DeleteVolumeRequest, DeleteVolumeResponse, GetCapacityRequest,
    GetCapacityResponse, ListVolumesRequest, ListVolumesResponse,
    ValidateVolumeCapabilitiesRequest, ValidateVolumeCapabilitiesResponse,
};

/// Fully-qualified gRPC service name of the controller.
pub const SERVICE: &str = "csi.Controller";

/// Where a controller plugin listens.
///
/// Accepted spellings: `unix:///path`, `unix:path`, `tcp://host:port`,
/// `http://host:port`, `https://host:port` and bare `host:port`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEndpoint {
    /// A unix domain socket.
    Unix(PathBuf),
    /// An HTTP/2 URI; `https` ones are dialed over TLS.
    Tcp(String),
}

impl FromStr for ControllerEndpoint {
    type Err = CsiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(CsiError::endpoint(s, "empty endpoint"));
        }

        if let Some(path) = s.strip_prefix("unix://").or_else(|| s.strip_prefix("unix:")) {
            if path.is_empty() {
                return Err(CsiError::endpoint(s, "missing socket path"));
            }
            return Ok(Self::Unix(PathBuf::from(path)));
        }
        if let Some(addr) = s.strip_prefix("tcp://") {
            return Ok(Self::Tcp(format!("http://{addr}")));
        }
        if s.starts_with("http://") || s.starts_with("https://") {
            return Ok(Self::Tcp(s.to_owned()));
        }
        if let Some((scheme, _)) = s.split_once("://") {
            return Err(CsiError::endpoint(
                s,
                format!("unsupported scheme {scheme:?}"),
            ));
        }
        Ok(Self::Tcp(format!("http://{s}")))
    }
}

impl fmt::Display for ControllerEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unix(path) => write!(f, "unix://{}", path.display()),
            Self::Tcp(uri) => f.write_str(uri),
        }
    }
}

/// Build a channel to `endpoint` without dialing it.
///
/// The connection is established on the first RPC, so argument errors can be
/// reported without a reachable controller.  `connect_timeout` bounds each
/// dial attempt.
pub fn connect(
    endpoint: &ControllerEndpoint,
    connect_timeout: Option<Duration>,
) -> Result<Channel, CsiError> {
    match endpoint {
        ControllerEndpoint::Tcp(uri) => {
            let mut builder = Endpoint::from_shared(uri.clone())
                .map_err(|e| CsiError::endpoint(uri, e.to_string()))?;
            if let Some(timeout) = connect_timeout {
                builder = builder.connect_timeout(timeout);
            }
            if uri.starts_with("https://") {
                builder = builder
                    .tls_config(ClientTlsConfig::new().with_enabled_roots())
                    .map_err(|e| CsiError::endpoint(uri, e.to_string()))?;
            }
            debug!(%endpoint, "CSI gRPC channel prepared");
            Ok(builder.connect_lazy())
        }
        #[cfg(unix)]
        ControllerEndpoint::Unix(path) => {
            use std::sync::Arc;

            use hyper_util::rt::TokioIo;
            use tokio::net::UnixStream;
            use tonic::transport::Uri;
            use tower::service_fn;

            // The authority is never dialed; the connector below ignores it.
            let mut builder = Endpoint::from_static("http://[::]:50051");
            if let Some(timeout) = connect_timeout {
                builder = builder.connect_timeout(timeout);
            }
            let path = Arc::new(path.clone());
            debug!(%endpoint, "CSI gRPC channel prepared");
            Ok(builder.connect_with_connector_lazy(service_fn(move |_: Uri| {
                let path = Arc::clone(&path);
                async move {
                    let stream = UnixStream::connect(path.as_path()).await?;
                    Ok::<_, std::io::Error>(TokioIo::new(stream))
                }
            })))
        }
        #[cfg(not(unix))]
        ControllerEndpoint::Unix(_) => Err(CsiError::endpoint(
            &endpoint.to_string(),
            "unix sockets are not supported on this platform",
        )),
    }
}

/// A [`CsiController`] that forwards every call over a gRPC [`Channel`].
///
/// Cloning is cheap; all clones share the underlying connection.
#[derive(Debug, Clone)]
pub struct GrpcController {
    inner: tonic::client::Grpc<Channel>,
}

impl GrpcController {
    pub fn new(channel: Channel) -> Self {
        Self {
            inner: tonic::client::Grpc::new(channel),
        }
    }

    /// Issue one unary call to `/csi.Controller/<method>`.
    #[instrument(level = "debug", skip(self, req))]
    async fn unary<Req, Resp>(&self, method: &'static str, req: Req) -> Result<Resp, Status>
    where
        Req: Message + Send + Sync + 'static,
        Resp: Message + Default + Send + Sync + 'static,
    {
        let mut grpc = self.inner.clone();
        grpc.ready()
            .await
            .map_err(|e| Status::unknown(format!("service was not ready: {e}")))?;

        let path = PathAndQuery::try_from(format!("/{SERVICE}/{method}"))
            .map_err(|e| Status::internal(format!("invalid method path: {e}")))?;
        let mut request = Request::new(req);
        request
            .extensions_mut()
            .insert(GrpcMethod::new(SERVICE, method));

        let response = grpc
            .unary(request, path, ProstCodec::<Req, Resp>::default())
            .await?;
        debug!("CSI response received");
        Ok(response.into_inner())
    }
}

#[async_trait]
impl CsiController for GrpcController {
    async fn create_volume(
        &self,
        req: CreateVolumeRequest,
    ) -> Result<CreateVolumeResponse, Status> {
        self.unary("CreateVolume", req).await
    }

    async fn delete_volume(
        &self,
        req: DeleteVolumeRequest,
    ) -> Result<DeleteVolumeResponse, Status> {
        self.unary("DeleteVolume", req).await
    }

    async fn controller_publish_volume(
        &self,
        req: ControllerPublishVolumeRequest,
    ) -> Result<ControllerPublishVolumeResponse, Status> {
        self.unary("ControllerPublishVolume", req).await
    }

    async fn controller_unpublish_volume(
        &self,
        req: ControllerUnpublishVolumeRequest,
    ) -> Result<ControllerUnpublishVolumeResponse, Status> {
        self.unary("ControllerUnpublishVolume", req).await
    }

    async fn validate_volume_capabilities(
        &self,
        req: ValidateVolumeCapabilitiesRequest,
    ) -> Result<ValidateVolumeCapabilitiesResponse, Status> {
        self.unary("ValidateVolumeCapabilities", req).await
    }

    async fn list_volumes(&self, req: ListVolumesRequest) -> Result<ListVolumesResponse, Status> {
        self.unary("ListVolumes", req).await
    }

    async fn get_capacity(&self, req: GetCapacityRequest) -> Result<GetCapacityResponse, Status> {
        self.unary("GetCapacity", req).await
    }

    async fn controller_get_capabilities(
        &self,
        req: ControllerGetCapabilitiesRequest,
    ) -> Result<ControllerGetCapabilitiesResponse, Status> {
        self.unary("ControllerGetCapabilities", req).await
    }
}
