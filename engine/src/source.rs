//! The remote side of the view.

use crate::StatusRequest;

/// Where status snapshots come from.
///
/// `fetch_status` is a dispatch: it must return at once and deliver the
/// answer later, by handing a [`StatusResponse`](crate::StatusResponse) for
/// `request.generation` to [`SyncEngine::on_status`](crate::SyncEngine::on_status).
/// A failed fetch should still be answered, with `statuses: None`.
pub trait RemoteStatusSource {
    fn fetch_status(&mut self, request: StatusRequest);
}

impl<S: RemoteStatusSource + ?Sized> RemoteStatusSource for Box<S> {
    fn fetch_status(&mut self, request: StatusRequest) {
        (**self).fetch_status(request)
    }
}

/// Queue of dispatched requests, for hosts that drive fetches themselves.
impl RemoteStatusSource for Vec<StatusRequest> {
    fn fetch_status(&mut self, request: StatusRequest) {
        self.push(request);
    }
}
