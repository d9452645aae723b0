// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Planner state: the last planned documents per project and, for the
//! content-hash strategy, the last applied documents.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::error::Result;
use crate::types::SchemaDocuments;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedSchema {
	pub generation: u64,
	pub documents: SchemaDocuments,
	pub planned_at: DateTime<Utc>,
}

#[async_trait]
pub trait PlannerStateStore: Send + Sync {
	/// Replace the project's planned documents and return the new generation.
	///
	/// Generations are strictly increasing per project and are never reused,
	/// including after [`clear_plan`](Self::clear_plan).
	async fn save_plan(&self, project_id: &str, documents: &SchemaDocuments) -> Result<u64>;

	async fn get_plan(&self, project_id: &str) -> Result<Option<PlannedSchema>>;

	/// Clear the plan if it is still `generation`. Returns whether it was cleared.
	async fn clear_plan(&self, project_id: &str, generation: u64) -> Result<bool>;

	async fn get_state(&self, project_id: &str) -> Result<Option<SchemaDocuments>>;

	async fn save_state(&self, project_id: &str, documents: &SchemaDocuments) -> Result<()>;
}

#[derive(Debug, Default)]
struct ProjectState {
	generation: u64,
	planned: Option<PlannedSchema>,
	applied: Option<SchemaDocuments>,
}

#[derive(Debug, Default)]
pub struct MemoryPlannerStateStore {
	projects: Mutex<HashMap<String, ProjectState>>,
}

impl MemoryPlannerStateStore {
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait]
impl PlannerStateStore for MemoryPlannerStateStore {
	async fn save_plan(&self, project_id: &str, documents: &SchemaDocuments) -> Result<u64> {
		let mut projects = self.projects.lock().await;
		let state = projects.entry(project_id.to_string()).or_default();
		state.generation += 1;
		state.planned = Some(PlannedSchema {
			generation: state.generation,
			documents: documents.clone(),
			planned_at: Utc::now(),
		});
		Ok(state.generation)
	}

	async fn get_plan(&self, project_id: &str) -> Result<Option<PlannedSchema>> {
		let projects = self.projects.lock().await;
		Ok(projects.get(project_id).and_then(|s| s.planned.clone()))
	}

	async fn clear_plan(&self, project_id: &str, generation: u64) -> Result<bool> {
		let mut projects = self.projects.lock().await;
		let Some(state) = projects.get_mut(project_id) else {
			return Ok(false);
		};
		match &state.planned {
			Some(plan) if plan.generation == generation => {
				state.planned = None;
				Ok(true)
			}
			_ => Ok(false),
		}
	}

	async fn get_state(&self, project_id: &str) -> Result<Option<SchemaDocuments>> {
		let projects = self.projects.lock().await;
		Ok(projects.get(project_id).and_then(|s| s.applied.clone()))
	}

	async fn save_state(&self, project_id: &str, documents: &SchemaDocuments) -> Result<()> {
		let mut projects = self.projects.lock().await;
		projects
			.entry(project_id.to_string())
			.or_default()
			.applied = Some(documents.clone());
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn docs(text: &str) -> SchemaDocuments {
		SchemaDocuments::from([("main".to_string(), text.to_string())])
	}

	#[tokio::test]
	async fn generations_increase_across_clears() {
		let store = MemoryPlannerStateStore::new();
		let first = store.save_plan("p1", &docs("a")).await.unwrap();
		assert!(store.clear_plan("p1", first).await.unwrap());
		let second = store.save_plan("p1", &docs("b")).await.unwrap();
		assert!(second > first);
		assert_eq!(store.get_plan("p1").await.unwrap().unwrap().documents, docs("b"));
	}

	#[tokio::test]
	async fn clear_ignores_superseded_generation() {
		let store = MemoryPlannerStateStore::new();
		let first = store.save_plan("p1", &docs("a")).await.unwrap();
		let _second = store.save_plan("p1", &docs("b")).await.unwrap();
		assert!(!store.clear_plan("p1", first).await.unwrap());
		assert!(store.get_plan("p1").await.unwrap().is_some());
	}

	#[tokio::test]
	async fn state_is_per_project() {
		let store = MemoryPlannerStateStore::new();
		store.save_state("p1", &docs("a")).await.unwrap();
		assert_eq!(store.get_state("p1").await.unwrap(), Some(docs("a")));
		assert_eq!(store.get_state("p2").await.unwrap(), None);
	}
}
