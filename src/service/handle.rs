//! Requests from the transport to the control thread.

use crate::error::{ProviderError, Result};
use crate::transport::CallContext;
use crate::types::{ClientId, Options, ProviderInfo, Status};
use crossbeam_channel::{bounded, Sender};

/// A bus method call or liveness notification, marshalled to the control
/// thread.
pub enum Request<C> {
    AddReference(CallContext),
    RemoveReference(CallContext),
    ClientVanished(ClientId),
    GetPosition(C),
    GetVelocity(C),
    GetStatus(Sender<Status>),
    GetProviderInfo(Sender<ProviderInfo>),
    SetOptions(Options),
    Shutdown,
}

/// Sending side of the request channel. Clone freely.
pub struct ServiceHandle<C> {
    sender: Sender<Request<C>>,
}

impl<C> Clone for ServiceHandle<C> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<C> ServiceHandle<C> {
    pub(crate) fn new(sender: Sender<Request<C>>) -> Self {
        Self { sender }
    }

    pub fn send(&self, request: Request<C>) -> Result<()> {
        self.sender
            .send(request)
            .map_err(|_| ProviderError::ServiceStopped)
    }

    pub fn add_reference(&self, context: CallContext) -> Result<()> {
        self.send(Request::AddReference(context))
    }

    pub fn remove_reference(&self, context: CallContext) -> Result<()> {
        self.send(Request::RemoveReference(context))
    }

    pub fn client_vanished(&self, client: ClientId) -> Result<()> {
        self.send(Request::ClientVanished(client))
    }

    /// Queue a `GetPosition` call. The reply goes out through the transport,
    /// possibly only after the next fix.
    pub fn get_position(&self, call: C) -> Result<()> {
        self.send(Request::GetPosition(call))
    }

    pub fn get_velocity(&self, call: C) -> Result<()> {
        self.send(Request::GetVelocity(call))
    }

    /// Blocks until the control thread answers.
    pub fn get_status(&self) -> Result<Status> {
        let (tx, rx) = bounded(1);
        self.send(Request::GetStatus(tx))?;
        rx.recv().map_err(|_| ProviderError::ServiceStopped)
    }

    /// Blocks until the control thread answers.
    pub fn get_provider_info(&self) -> Result<ProviderInfo> {
        let (tx, rx) = bounded(1);
        self.send(Request::GetProviderInfo(tx))?;
        rx.recv().map_err(|_| ProviderError::ServiceStopped)
    }

    pub fn set_options(&self, options: Options) -> Result<()> {
        self.send(Request::SetOptions(options))
    }

    pub fn shutdown(&self) -> Result<()> {
        self.send(Request::Shutdown)
    }
}
