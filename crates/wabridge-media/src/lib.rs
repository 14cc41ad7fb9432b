// SPDX-FileCopyrightText: 2026 Wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Media relay for the bridge.
//!
//! Consumer-platform media ids are only resolvable with the consumer access
//! token, so attachments are re-hosted on an object store before they are
//! handed to the agent platform. The payload is streamed from the download
//! response into the multipart upload and never buffered whole.

pub mod extension;
pub mod relay;

pub use extension::extension_for;
pub use relay::HttpMediaRelay;
