//! Fluent builder for constructing a [`FleetSim`].

use std::collections::BTreeMap;

use pf_agent::{NullService, ServiceCapability};
use pf_dispatch::scheduler::DispatchConfig;
use pf_dispatch::Scheduler;
use pf_junction::{JunctionArbiter, JunctionConfig};
use pf_traffic::TrafficControl;

use crate::sim::{FleetConfig, FleetSim};
use crate::SimResult;

/// Fluent builder for [`FleetSim<T>`].
///
/// # Required inputs
///
/// - `T: TrafficControl` — the motion simulator
/// - [`DispatchConfig`] — destination edges, berths per edge, seed
///
/// # Optional inputs (have defaults)
///
/// | Method                   | Default          |
/// |--------------------------|------------------|
/// | `.junction(cfg)`         | no arbitration   |
/// | `.arrival_threshold_m(m)`| 10.0             |
/// | `.dwell_ticks(n)`        | 10               |
/// | `.service(cap)`          | [`NullService`]  |
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = FleetSimBuilder::new(traffic, dispatch)
///     .junction(junction_config)
///     .dwell_ticks(20)
///     .build()?;
/// sim.spawn_agent(AgentId(0), AgentKind::Truck, entry_edge)?;
/// sim.macro_step(100, &mut NoopObserver)?;
/// ```
pub struct FleetSimBuilder<T: TrafficControl> {
    traffic: T,
    dispatch: DispatchConfig,
    junctions: Vec<JunctionConfig>,
    config: FleetConfig,
    service: Box<dyn ServiceCapability>,
}

impl<T: TrafficControl> FleetSimBuilder<T> {
    /// Create a builder with all required inputs.
    pub fn new(traffic: T, dispatch: DispatchConfig) -> Self {
        Self {
            traffic,
            dispatch,
            junctions: Vec::new(),
            config: FleetConfig::default(),
            service: Box::new(NullService),
        }
    }

    /// Add an arbitrated junction.  May be called once per junction.
    pub fn junction(mut self, config: JunctionConfig) -> Self {
        self.junctions.push(config);
        self
    }

    /// Arrival distance threshold in metres.
    pub fn arrival_threshold_m(mut self, metres: f32) -> Self {
        self.config.arrival_threshold_m = metres;
        self
    }

    /// Dwell duration in halted ticks.
    pub fn dwell_ticks(mut self, ticks: u64) -> Self {
        self.config.dwell_ticks = ticks;
        self
    }

    /// Attach kind-specific service behavior.
    pub fn service(mut self, capability: Box<dyn ServiceCapability>) -> Self {
        self.service = capability;
        self
    }

    /// Generate destinations, validate junction configs, and return a
    /// ready-to-run [`FleetSim`] with no agents.
    pub fn build(self) -> SimResult<FleetSim<T>> {
        let mut scheduler = Scheduler::new(self.dispatch.seed);
        scheduler.generate_destinations(&self.dispatch, &self.traffic)?;

        let arbiters = self
            .junctions
            .into_iter()
            .map(JunctionArbiter::new)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(FleetSim {
            traffic: self.traffic,
            scheduler,
            tasks: BTreeMap::new(),
            arbiters,
            service: self.service,
            config: self.config,
        })
    }
}
