//! In-memory port fakes shared by the controller and runtime tests.

use std::future::Future;
use std::sync::{Arc, Mutex};

use tuyabridge_domain::capability::{CapabilityValue, HubCapability};
use tuyabridge_domain::error::BridgeError;
use tuyabridge_domain::id::DeviceId;
use tuyabridge_domain::tuya::CommandBatch;

use crate::ports::{HubPort, TuyaTransport};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum HubCall {
    Set(HubCapability, CapabilityValue),
    Add(HubCapability),
    Remove(HubCapability),
}

#[derive(Default)]
struct HubInner {
    calls: Vec<HubCall>,
    failing: Vec<HubCapability>,
}

/// Records every hub call; capabilities listed in `failing` are rejected.
#[derive(Clone, Default)]
pub(crate) struct FakeHub {
    inner: Arc<Mutex<HubInner>>,
}

impl FakeHub {
    pub(crate) fn fail_on(&self, capability: HubCapability) {
        self.inner.lock().unwrap().failing.push(capability);
    }

    pub(crate) fn calls(&self) -> Vec<HubCall> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub(crate) fn sets(&self) -> Vec<(HubCapability, CapabilityValue)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                HubCall::Set(capability, value) => Some((capability, value)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, capability: HubCapability, call: HubCall) -> Result<(), BridgeError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.failing.contains(&capability) {
            return Err(BridgeError::Hub(format!("{capability} rejected").into()));
        }
        inner.calls.push(call);
        Ok(())
    }
}

impl HubPort for FakeHub {
    fn set_capability_value(
        &self,
        _device: DeviceId,
        capability: HubCapability,
        value: CapabilityValue,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send {
        let result = self.record(capability, HubCall::Set(capability, value));
        async { result }
    }

    fn add_capability(
        &self,
        _device: DeviceId,
        capability: HubCapability,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send {
        let result = self.record(capability, HubCall::Add(capability));
        async { result }
    }

    fn remove_capability(
        &self,
        _device: DeviceId,
        capability: HubCapability,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send {
        let result = self.record(capability, HubCall::Remove(capability));
        async { result }
    }
}

#[derive(Default)]
struct TransportInner {
    sent: Vec<(String, CommandBatch)>,
    failing: bool,
}

/// Records every batch sent; fails everything once `fail` is called.
#[derive(Clone, Default)]
pub(crate) struct FakeTransport {
    inner: Arc<Mutex<TransportInner>>,
}

impl FakeTransport {
    pub(crate) fn fail(&self) {
        self.inner.lock().unwrap().failing = true;
    }

    pub(crate) fn batches(&self) -> Vec<CommandBatch> {
        self.inner
            .lock()
            .unwrap()
            .sent
            .iter()
            .map(|(_, batch)| batch.clone())
            .collect()
    }
}

impl TuyaTransport for FakeTransport {
    fn send_commands(
        &self,
        tuya_id: &str,
        batch: CommandBatch,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send {
        let mut inner = self.inner.lock().unwrap();
        let result = if inner.failing {
            Err(BridgeError::Transport("offline".into()))
        } else {
            inner.sent.push((tuya_id.to_string(), batch));
            Ok(())
        };
        async { result }
    }
}
