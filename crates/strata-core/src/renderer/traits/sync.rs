// Copyright 2026 strata contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Fence-like synchronization primitives provided by a graphics backend.
//!
//! The device consumes submitted geometry asynchronously; the only way to
//! learn that it has finished reading a buffer generation is through one of
//! these objects. A sync object is requested once per completed frame and
//! waited on before the corresponding frame buffer is reused.

use crate::renderer::error::ResourceError;
use std::fmt::Debug;

/// An opaque fence signalled by the graphics device.
///
/// Created via [`SyncObjectProvider::create_sync_object`] after submitting a
/// frame. Dropping a sync object without waiting on it is allowed; the fence
/// is simply abandoned.
pub trait SyncObject: Send + Debug {
    /// Blocks the calling thread until the device has signalled the fence.
    ///
    /// This is a true wait, not a poll loop, and it cannot be cancelled.
    /// Callers that need non-blocking behaviour must query fence status
    /// through backend-specific means before waiting.
    fn wait(&self);
}

/// The fence provider implemented by a concrete graphics backend.
pub trait SyncObjectProvider: Send + Sync + Debug + 'static {
    /// Requests a new fence that will be signalled once the device has
    /// processed all work submitted so far.
    /// ## Returns
    /// A `Result` containing the fence or an error if the backend could not
    /// create one.
    fn create_sync_object(&self) -> Result<Box<dyn SyncObject>, ResourceError>;
}
