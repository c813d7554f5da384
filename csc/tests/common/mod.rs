//! In-memory controller and capture sink for driving actions without a
//! plugin.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use csc::render::{CompileFn, Sink, compile_template};
use csc::{Cancellation, CscError, Invocation, REGISTRY};
use libcsi::{
    ControllerGetCapabilitiesRequest, ControllerGetCapabilitiesResponse,
    ControllerPublishVolumeRequest, ControllerPublishVolumeResponse,
    ControllerServiceCapability, ControllerUnpublishVolumeRequest,
    ControllerUnpublishVolumeResponse, CreateVolumeRequest, CreateVolumeResponse, CsiController,
    DeleteVolumeRequest, DeleteVolumeResponse, GetCapacityRequest, GetCapacityResponse,
    ListVolumesRequest, ListVolumesResponse, PublishVolumeInfo, Status,
    ValidateVolumeCapabilitiesRequest, ValidateVolumeCapabilitiesResponse, Version, VolumeId,
    VolumeInfo, list_volumes_response,
};

/// A request as the stub received it.
#[derive(Debug, Clone, PartialEq)]
pub enum Recorded {
    Create(CreateVolumeRequest),
    Delete(DeleteVolumeRequest),
    Publish(ControllerPublishVolumeRequest),
    Unpublish(ControllerUnpublishVolumeRequest),
    Validate(ValidateVolumeCapabilitiesRequest),
    List(ListVolumesRequest),
    Capacity(GetCapacityRequest),
    Capabilities(ControllerGetCapabilitiesRequest),
}

/// Answers every RPC from canned data and records what it was sent.
#[derive(Debug, Default)]
pub struct StubController {
    calls: AtomicUsize,
    requests: Mutex<Vec<Recorded>>,
    pages: Mutex<VecDeque<Result<ListVolumesResponse, Status>>>,
    total_capacity: u64,
    capabilities: Vec<ControllerServiceCapability>,
    publish_info: Option<PublishVolumeInfo>,
    omit_created_volume: bool,
}

impl StubController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue list responses, consumed one per `ListVolumes` call.
    pub fn with_pages(self, pages: Vec<Result<ListVolumesResponse, Status>>) -> Self {
        *self.pages.lock().unwrap() = pages.into();
        self
    }

    pub fn with_total_capacity(mut self, total_capacity: u64) -> Self {
        self.total_capacity = total_capacity;
        self
    }

    pub fn with_capabilities(mut self, capabilities: Vec<ControllerServiceCapability>) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_publish_info(mut self, info: PublishVolumeInfo) -> Self {
        self.publish_info = Some(info);
        self
    }

    /// Answer `CreateVolume` without a volume.
    pub fn omitting_created_volume(mut self) -> Self {
        self.omit_created_volume = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    /// Starting tokens of every `ListVolumes` call, in call order.
    pub fn list_tokens(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter_map(|r| match r {
                Recorded::List(req) => Some(req.starting_token),
                _ => None,
            })
            .collect()
    }

    fn record(&self, req: Recorded) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(req);
    }
}

#[async_trait]
impl CsiController for StubController {
    async fn create_volume(
        &self,
        req: CreateVolumeRequest,
    ) -> Result<CreateVolumeResponse, Status> {
        let name = req.name.clone();
        let capacity_bytes = req
            .capacity_range
            .as_ref()
            .map(|r| r.required_bytes)
            .unwrap_or_default();
        self.record(Recorded::Create(req));
        Ok(CreateVolumeResponse {
            volume_info: (!self.omit_created_volume).then(|| volume(&name, capacity_bytes)),
        })
    }

    async fn delete_volume(
        &self,
        req: DeleteVolumeRequest,
    ) -> Result<DeleteVolumeResponse, Status> {
        self.record(Recorded::Delete(req));
        Ok(DeleteVolumeResponse {})
    }

    async fn controller_publish_volume(
        &self,
        req: ControllerPublishVolumeRequest,
    ) -> Result<ControllerPublishVolumeResponse, Status> {
        self.record(Recorded::Publish(req));
        Ok(ControllerPublishVolumeResponse {
            publish_volume_info: self.publish_info.clone(),
        })
    }

    async fn controller_unpublish_volume(
        &self,
        req: ControllerUnpublishVolumeRequest,
    ) -> Result<ControllerUnpublishVolumeResponse, Status> {
        self.record(Recorded::Unpublish(req));
        Ok(ControllerUnpublishVolumeResponse {})
    }

    async fn validate_volume_capabilities(
        &self,
        req: ValidateVolumeCapabilitiesRequest,
    ) -> Result<ValidateVolumeCapabilitiesResponse, Status> {
        let supported = !req.volume_capabilities.is_empty();
        self.record(Recorded::Validate(req));
        Ok(ValidateVolumeCapabilitiesResponse {
            supported,
            message: String::new(),
        })
    }

    async fn list_volumes(&self, req: ListVolumesRequest) -> Result<ListVolumesResponse, Status> {
        self.record(Recorded::List(req));
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Status::out_of_range("no more pages")))
    }

    async fn get_capacity(&self, req: GetCapacityRequest) -> Result<GetCapacityResponse, Status> {
        self.record(Recorded::Capacity(req));
        Ok(GetCapacityResponse {
            total_capacity: self.total_capacity,
        })
    }

    async fn controller_get_capabilities(
        &self,
        req: ControllerGetCapabilitiesRequest,
    ) -> Result<ControllerGetCapabilitiesResponse, Status> {
        self.record(Recorded::Capabilities(req));
        Ok(ControllerGetCapabilitiesResponse {
            capabilities: self.capabilities.clone(),
        })
    }
}

/// A volume whose identifier is `name=<name>`.
pub fn volume(name: &str, capacity_bytes: u64) -> VolumeInfo {
    VolumeInfo {
        capacity_bytes,
        id: Some(VolumeId::new([("name".to_owned(), name.to_owned())].into())),
        metadata: None,
    }
}

/// One `ListVolumes` response.
pub fn page(names: &[&str], next_token: &str) -> Result<ListVolumesResponse, Status> {
    Ok(ListVolumesResponse {
        entries: names
            .iter()
            .map(|name| list_volumes_response::Entry {
                volume_info: Some(volume(name, 0)),
            })
            .collect(),
        next_token: next_token.to_owned(),
    })
}

/// Shared in-memory output.
#[derive(Debug, Clone, Default)]
pub struct Captured(Arc<Mutex<Vec<u8>>>);

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Captured {
    pub fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }

    pub fn lines(&self) -> Vec<String> {
        self.text().lines().map(str::to_owned).collect()
    }

    pub fn sink(&self) -> Sink {
        Arc::new(Mutex::new(self.clone()))
    }
}

/// An invocation against `stub` that renders with `format` into `out`.
pub fn invocation(stub: Arc<StubController>, format: &str, out: &Captured) -> Invocation {
    invocation_with(stub, format, compile_template, out)
}

pub fn invocation_with(
    stub: Arc<StubController>,
    format: &str,
    compile: CompileFn,
    out: &Captured,
) -> Invocation {
    Invocation {
        controller: stub,
        version: Version::new(0, 1, 0),
        format: format.to_owned(),
        compile,
        sink: out.sink(),
        cancel: Cancellation::new(),
    }
}

/// Flags whose values would otherwise come from the caller's `CSI_*`
/// environment.  They go first so that `argv` can still override them.
fn pinned_env_flags(command: &str) -> &'static [&'static str] {
    match command {
        "listvolumes" => &["--startingToken", "", "--maxEntries", "0"],
        _ => &[],
    }
}

/// Parse `argv` with the named command's flag set and run its action.
pub async fn run(inv: &Invocation, argv: &[&str]) -> Result<(), CscError> {
    let descriptor = REGISTRY.lookup(argv[0]).expect("known command");
    let mut full = vec![argv[0]];
    full.extend_from_slice(pinned_env_flags(descriptor.name));
    full.extend_from_slice(&argv[1..]);

    let matches = descriptor
        .command()
        .args_override_self(true)
        .try_get_matches_from(full)
        .expect("flags parse");
    (descriptor.action)(&matches, inv).await
}
