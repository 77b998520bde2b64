//! The ancestor-walk search: climb the taxonomy from the target species, search
//! each level for homologs of the still-pending queries and keep the best hits.

pub mod checkpoint;
pub mod estimator;
pub mod gateway;
pub mod hit;
pub mod orchestrator;
pub mod selector;
pub mod state;
pub mod training;

pub use checkpoint::CheckpointManager;
pub use estimator::{RuntimeEstimator, RuntimePlan};
pub use gateway::{build_scope, diamond_database, AlignmentGateway, GatewayOutcome};
pub use hit::{AncestorContext, HitRecord, PriorityKey, QueryOutcome, RankedHitSet, MAX_RANKED_HITS};
pub use orchestrator::SearchOrchestrator;
pub use selector::HitSelector;
pub use state::{RunParameters, RunState, StepStatistics};
pub use training::{LogScanner, ModelFit, TimingSample};
