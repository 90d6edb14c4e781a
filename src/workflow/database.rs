//! Customer database facade
//!
//! The database is reached through a fixed pool of connections. Every
//! operation acquires one connection, holds it for a randomized latency and
//! releases it when the operation completes.

use super::Flow;
use crate::simulation::{Guard, PoolId, ProcessContext, Step, Wake};
use crate::types::CallCenterParams;
use tracing::info;

/// Latencies and outcome rates of the customer database
#[derive(Debug, Clone, Copy)]
pub struct Database {
    connections: PoolId,
    query_time: f64,
    insert_time: f64,
    failed_identification_rate: f64,
}

impl Database {
    /// Create the facade over the `connections` pool
    pub fn new(connections: PoolId, params: &CallCenterParams) -> Self {
        Self {
            connections,
            query_time: params.avg_db_query_time,
            insert_time: params.avg_db_insert_time,
            failed_identification_rate: params.failed_identification_rate,
        }
    }

    /// Connection pool backing the database
    pub fn connections(&self) -> PoolId {
        self.connections
    }

    /// Look up the calling customer; yields whether they are eligible
    pub fn identify(&self) -> DbOperation {
        DbOperation { db: *self, kind: DbRequest::Identify, state: DbState::Idle }
    }

    /// Insert the calling customer; always yields `true`
    pub fn register_to_service(&self) -> DbOperation {
        DbOperation { db: *self, kind: DbRequest::Insert, state: DbState::Idle }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DbRequest {
    Identify,
    Insert,
}

#[derive(Debug)]
enum DbState {
    Idle,
    Connecting,
    Working(Guard),
    Done,
}

/// One database operation, from connection request to release
#[derive(Debug)]
pub struct DbOperation {
    db: Database,
    kind: DbRequest,
    state: DbState,
}

impl Flow for DbOperation {
    type Output = bool;

    fn resume(&mut self, cx: &mut ProcessContext<'_>, wake: Wake) -> Step<bool> {
        match (std::mem::replace(&mut self.state, DbState::Done), wake) {
            (DbState::Idle, Wake::Start) => {
                self.state = DbState::Connecting;
                Step::acquire(self.db.connections)
            }
            (DbState::Connecting, Wake::Granted(guard)) => {
                let latency = match self.kind {
                    DbRequest::Identify => {
                        info!("identifying customer");
                        cx.sample(self.db.query_time)
                    }
                    DbRequest::Insert => cx.sample(self.db.insert_time),
                };
                self.state = DbState::Working(guard);
                Step::timeout(latency)
            }
            (DbState::Working(connection), Wake::Timer) => {
                let result = match self.kind {
                    DbRequest::Identify => {
                        let eligible = cx.draw() > self.db.failed_identification_rate;
                        if eligible {
                            info!("Customer eligible for service");
                        } else {
                            info!("Customer is not eligible for service");
                        }
                        eligible
                    }
                    DbRequest::Insert => {
                        info!("Customer registered to service");
                        true
                    }
                };
                drop(connection);
                Step::Ready(result)
            }
            (state, wake) => {
                panic!("database operation in state {:?} cannot handle {:?}", state, wake)
            }
        }
    }
}
