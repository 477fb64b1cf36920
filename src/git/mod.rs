//! Git operations for release workflows.
//!
//! All git access goes through the system `git` executable via a
//! [`CommandRunner`](crate::exec::CommandRunner), so the pipeline can be
//! driven by a scripted runner in tests.

mod remote;
mod repository;

pub use remote::RemoteIdentity;
pub use repository::{GitRepository, push_invocations};
