// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Schema migration planner.
//!
//! `plan` diffs a project's desired schema documents against its live database
//! and records what was planned; `apply` executes exactly that recorded plan,
//! guarded by the plan token `plan` returned. When no live database is
//! reachable both operations fall back to comparing document text.

pub mod diff;
pub mod engine;
pub mod error;
pub mod hcl;
pub mod model;
pub mod planner;
pub mod state;
pub mod types;

pub use diff::{diff_realms, SchemaChange};
pub use engine::{Dialect, SchemaClient, SchemaEngine, SqliteEngine};
pub use error::{Result, SchemaError};
pub use model::{Column, Index, Realm, Table};
pub use planner::{DiffStrategy, PlannerOptions, SchemaPlanner};
pub use state::{MemoryPlannerStateStore, PlannedSchema, PlannerStateStore};
pub use types::{Migration, PlanResult, SchemaDocuments};
