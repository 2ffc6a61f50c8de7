// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Docdesk-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Docdesk and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Model Context Protocol (MCP) server surface.
//!
//! Exposes the session manager and the dispatcher as tools: `session.*` manage resident
//! documents, `document.invoke` runs one operation.

mod server;
mod types;

pub use server::DocdeskMcp;
pub use types::*;
