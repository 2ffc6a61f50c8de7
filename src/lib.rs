// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Docdesk-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Docdesk and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Docdesk: session-scoped document registry and generic operation dispatch.
//!
//! Documents live in identity-owned sessions ([`session::SessionManager`]). Every
//! operation is a named handler in a per-kind [`registry::HandlerRegistry`], driven by the
//! [`dispatch::Dispatcher`] with a loosely typed [`params::ParamBag`]. The [`mcp`] module
//! exposes all of it as MCP tools.

pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod mcp;
pub mod model;
pub mod ops;
pub mod params;
pub mod registry;
pub mod session;

#[cfg(test)]
mod test_utils;
