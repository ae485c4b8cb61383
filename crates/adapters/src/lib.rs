// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Backend adapters (§4.A, §4.B, §4.F): the [`port::Backend`] trait every
//! remote integration implements, the [`transport::Transport`] shared REST
//! backends build requests through, and the concrete backend kinds
//! themselves under [`backends`].

pub mod backends;
pub mod port;
pub mod transport;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use port::{Backend, RemoteList, RemoteTask, TaskFields};
pub use transport::{RateLimitStats, Transport, TransportConfig};
