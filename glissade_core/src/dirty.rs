// Copyright 2026 the Glissade Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! Layout-driven effects use [`understory_dirty`] to coalesce invalidation
//! between the event that causes it (scroll, resize, bind) and the frame
//! that recomputes it. Keys are raw slot indices of the owning effect store.
//!
//! # Consumption
//!
//! Each channel is drained once per flush, in deterministic key order, so a
//! burst of scroll events between two frames costs one layout read per
//! element. Channels are local-only: no dependency edges exist between
//! elements.

use understory_dirty::Channel;

/// A parallax element's offset must be recomputed from its bounding rect.
pub const PARALLAX: Channel = Channel::new(0);
