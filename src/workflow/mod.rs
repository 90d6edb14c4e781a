//! Business workflows of the call center
//!
//! Each workflow is a state machine driven by the [`Engine`]:
//!
//! - **Customer**: registration, queueing for a bot, support call, incident update
//! - **Support flow**: the triage sequence run while a bot is held
//! - **Maintenance**: background upkeep competing for database connections
//! - **Arrivals**: spawns customers at randomized intervals
//!
//! Sub-flows implement [`Flow`] and are driven by their parent process.

pub mod arrivals;
pub mod call_center;
pub mod customer;
pub mod database;
pub mod maintenance;

pub use arrivals::*;
pub use call_center::*;
pub use customer::*;
pub use database::*;
pub use maintenance::*;

use crate::simulation::{Engine, PoolId, ProcessContext, Step, Wake};
use crate::types::{CallCenterParams, Scenario};
use std::fmt;

/// A nested state machine producing a value
///
/// A flow is started by resuming it with [`Wake::Start`] and then receives
/// every wake-up of its parent until it returns [`Step::Ready`].
pub trait Flow: fmt::Debug {
    /// Value produced when the flow completes
    type Output;

    /// Advance the flow
    fn resume(&mut self, cx: &mut ProcessContext<'_>, wake: Wake) -> Step<Self::Output>;
}

/// Resource pools of the call center
#[derive(Debug, Clone, Copy)]
pub struct Facilities {
    /// Support bots
    pub bots: PoolId,
    /// Links to the remote legacy archives
    pub archive_links: PoolId,
    /// Incident update workers
    pub updaters: PoolId,
    /// Database connections
    pub db_connections: PoolId,
}

impl Facilities {
    /// Register the call center pools with `engine`
    pub fn register(engine: &mut Engine, params: &CallCenterParams) -> Self {
        Self {
            bots: engine.add_pool("bots", params.num_of_bots),
            archive_links: engine.add_pool(
                "remote_legacy_archives",
                params.num_of_remote_legacy_archives_connections,
            ),
            updaters: engine.add_pool("updaters", params.num_of_updaters),
            db_connections: engine.add_pool("db_connections", params.num_of_db_connections),
        }
    }
}

/// Read-only model shared by every process of a run
#[derive(Debug, Clone)]
pub struct CallCenterModel {
    /// Call center parameters
    pub params: CallCenterParams,
    /// Scenario being simulated
    pub scenario: Scenario,
    /// Pools registered with the engine
    pub facilities: Facilities,
    /// Database facade
    pub database: Database,
}

impl CallCenterModel {
    /// Register the pools for `params` with `engine` and build the model
    pub fn build(engine: &mut Engine, params: CallCenterParams, scenario: Scenario) -> Self {
        let facilities = Facilities::register(engine, &params);
        let database = Database::new(facilities.db_connections, &params);
        Self { params, scenario, facilities, database }
    }
}
