//! Thermal network arena.
//!
//! The network owns the state vector (one temperature per node) and the
//! shared inputs. Units refer to each other by [`NodeId`]. Derivatives are
//! evaluated in two phases: every node first publishes a [`NodeProbe`]
//! computed from the state, then each node's rate is computed from the state
//! plus the probes of the nodes it references. A node therefore always sees
//! duct temperatures and wall heat flows that belong to the same state.

use hs_core::NodeId;
use nalgebra::DVector;

use crate::air::{AirGains, AirUnit};
use crate::error::{ThermalError, ThermalResult};
use crate::hvac::{HvacFlows, HvacUnit};
use crate::wall::WallUnit;

#[derive(Clone, Debug, PartialEq)]
pub enum ThermalUnit {
    Hvac(HvacUnit),
    Wall(WallUnit),
    Air(AirUnit),
}

impl ThermalUnit {
    pub fn kind_label(&self) -> &'static str {
        match self {
            ThermalUnit::Hvac(h) => h.kind.label(),
            ThermalUnit::Wall(_) => "wall",
            ThermalUnit::Air(_) => "air",
        }
    }
}

/// Boundary conditions shared by all nodes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThermalInputs {
    /// Outdoor dry-bulb temperature (°F).
    pub outside_f: f64,
    /// Solar irradiance on the windows (BTU/(hr·ft²)).
    pub solar: f64,
}

impl Default for ThermalInputs {
    fn default() -> Self {
        Self {
            outside_f: 100.0,
            solar: 0.0,
        }
    }
}

/// Quantities a node exposes to the rest of the network for one state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NodeProbe {
    /// Supply air temperature; equals the node temperature for non-HVAC nodes.
    pub duct_temp_f: f64,
    pub fan_flow_lbps: f64,
    /// Heat drawn from the room air into a wall (BTU/s).
    pub heat_from_air: f64,
    /// Electrical draw (W).
    pub power_w: f64,
}

#[derive(Clone, Debug)]
pub struct ThermalNetwork {
    names: Vec<String>,
    units: Vec<ThermalUnit>,
    x: DVector<f64>,
    inputs: ThermalInputs,
    probes: Vec<NodeProbe>,
}

impl ThermalNetwork {
    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(NodeId::from_index)
    }

    pub fn name(&self, id: NodeId) -> ThermalResult<&str> {
        let i = self.check(id)?;
        Ok(&self.names[i])
    }

    pub fn unit(&self, id: NodeId) -> ThermalResult<&ThermalUnit> {
        let i = self.check(id)?;
        Ok(&self.units[i])
    }

    pub fn hvac(&self, id: NodeId) -> ThermalResult<&HvacUnit> {
        let i = self.check(id)?;
        match &self.units[i] {
            ThermalUnit::Hvac(h) => Ok(h),
            _ => Err(self.wrong_kind(i, "HVAC")),
        }
    }

    pub fn hvac_mut(&mut self, id: NodeId) -> ThermalResult<&mut HvacUnit> {
        let i = self.check(id)?;
        match self.units.get_mut(i) {
            Some(ThermalUnit::Hvac(h)) => Ok(h),
            _ => Err(ThermalError::WrongKind {
                name: self.names[i].clone(),
                expected: "HVAC",
            }),
        }
    }

    pub fn state(&self) -> &DVector<f64> {
        &self.x
    }

    /// Replace the state vector and refresh the probes.
    pub fn set_state(&mut self, x: DVector<f64>) -> ThermalResult<()> {
        self.check_len(&x)?;
        for v in x.iter() {
            hs_core::ensure_finite(*v, "node temperature")?;
        }
        self.x = x;
        self.refresh();
        Ok(())
    }

    pub fn temperature(&self, id: NodeId) -> ThermalResult<f64> {
        let i = self.check(id)?;
        Ok(self.x[i])
    }

    pub fn inputs(&self) -> ThermalInputs {
        self.inputs
    }

    pub fn set_outside_temperature(&mut self, outside_f: f64) -> ThermalResult<()> {
        self.inputs.outside_f = hs_core::ensure_finite(outside_f, "outside temperature")?;
        Ok(())
    }

    pub fn set_solar_radiation(&mut self, solar: f64) -> ThermalResult<()> {
        self.inputs.solar = hs_core::ensure_finite(solar, "solar radiation")?;
        Ok(())
    }

    /// Probe of a node at the current state (as of the last refresh).
    pub fn probe(&self, id: NodeId) -> ThermalResult<&NodeProbe> {
        let i = self.check(id)?;
        Ok(&self.probes[i])
    }

    /// Sum of electrical draw of every node at the current state (W).
    pub fn total_power_w(&self) -> f64 {
        self.probes.iter().map(|p| p.power_w).sum()
    }

    /// Recompute the probes for the current state and inputs.
    pub fn refresh(&mut self) {
        self.probes = self.probe_all(&self.x);
    }

    /// First phase: publish every node's probe for state `x`.
    pub fn probe_all(&self, x: &DVector<f64>) -> Vec<NodeProbe> {
        self.first_phase(x).into_iter().map(|(p, _)| p).collect()
    }

    /// Probes plus the HVAC flows they were read from, one entry per node.
    fn first_phase(&self, x: &DVector<f64>) -> Vec<(NodeProbe, Option<HvacFlows>)> {
        let outside = self.inputs.outside_f;
        self.units
            .iter()
            .enumerate()
            .map(|(i, unit)| match unit {
                ThermalUnit::Hvac(h) => {
                    let f = h.flows(x[i], x[h.inlet.index()], outside);
                    let probe = NodeProbe {
                        duct_temp_f: f.duct_temp_f,
                        fan_flow_lbps: f.fan_flow_lbps,
                        heat_from_air: 0.0,
                        power_w: f.power_w,
                    };
                    (probe, Some(f))
                }
                ThermalUnit::Wall(w) => (
                    NodeProbe {
                        duct_temp_f: x[i],
                        heat_from_air: w.q_from_air(x[i], x[w.neighbor.index()]),
                        ..NodeProbe::default()
                    },
                    None,
                ),
                ThermalUnit::Air(_) => (
                    NodeProbe {
                        duct_temp_f: x[i],
                        ..NodeProbe::default()
                    },
                    None,
                ),
            })
            .collect()
    }

    /// Temperature rates (°F/s) for state `x` under the current inputs.
    pub fn derivatives(&self, x: &DVector<f64>) -> ThermalResult<DVector<f64>> {
        self.check_len(x)?;
        let (probes, flows): (Vec<NodeProbe>, Vec<Option<HvacFlows>>) =
            self.first_phase(x).into_iter().unzip();
        let outside = self.inputs.outside_f;

        let mut dx = DVector::zeros(x.len());
        for (i, unit) in self.units.iter().enumerate() {
            dx[i] = match unit {
                ThermalUnit::Hvac(h) => flows[i].map_or(0.0, |f| h.derivative(&f)),
                ThermalUnit::Wall(w) => w.derivative(x[i], x[w.neighbor.index()], outside),
                ThermalUnit::Air(a) => a.derivative(&self.gains(a, x[i], &probes)),
            };
        }
        Ok(dx)
    }

    /// Heat entering an air node at the current state, by source.
    pub fn air_gains(&self, id: NodeId) -> ThermalResult<AirGains> {
        let i = self.check(id)?;
        match &self.units[i] {
            ThermalUnit::Air(a) => Ok(self.gains(a, self.x[i], &self.probes)),
            _ => Err(self.wrong_kind(i, "air")),
        }
    }

    fn gains(&self, air: &AirUnit, air_f: f64, probes: &[NodeProbe]) -> AirGains {
        let mut gains = AirGains {
            infiltration: air.infiltration_gain(air_f, self.inputs.outside_f),
            solar_and_internal: air.solar_and_internal_gain(self.inputs.solar),
            ..AirGains::default()
        };
        for duct in &air.ducts {
            let p = &probes[duct.index()];
            gains.ducts += AirUnit::duct_gain(air_f, p.fan_flow_lbps, p.duct_temp_f);
        }
        for wall in &air.walls {
            gains.walls -= probes[wall.index()].heat_from_air;
        }
        gains
    }

    fn check(&self, id: NodeId) -> ThermalResult<usize> {
        let i = id.index();
        if i < self.units.len() {
            Ok(i)
        } else {
            Err(ThermalError::UnknownNode {
                index: i,
                len: self.units.len(),
            })
        }
    }

    fn check_len(&self, x: &DVector<f64>) -> ThermalResult<()> {
        if x.len() == self.units.len() {
            Ok(())
        } else {
            Err(ThermalError::StateLength {
                got: x.len(),
                expected: self.units.len(),
            })
        }
    }

    fn wrong_kind(&self, i: usize, expected: &'static str) -> ThermalError {
        ThermalError::WrongKind {
            name: self.names[i].clone(),
            expected,
        }
    }
}

/// Builds a [`ThermalNetwork`], allowing nodes to be referenced before they
/// are defined.
#[derive(Debug, Default)]
pub struct NetworkBuilder {
    slots: Vec<Slot>,
    inputs: ThermalInputs,
}

#[derive(Debug)]
struct Slot {
    name: String,
    def: Option<(f64, ThermalUnit)>,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_inputs(mut self, inputs: ThermalInputs) -> Self {
        self.inputs = inputs;
        self
    }

    /// Allocate the next state slot.
    pub fn reserve(&mut self, name: impl Into<String>) -> NodeId {
        self.slots.push(Slot {
            name: name.into(),
            def: None,
        });
        NodeId::from_index(self.slots.len() - 1)
    }

    pub fn define(&mut self, id: NodeId, initial_f: f64, unit: ThermalUnit) -> ThermalResult<()> {
        let len = self.slots.len();
        let slot = self
            .slots
            .get_mut(id.index())
            .ok_or(ThermalError::UnknownNode {
                index: id.index(),
                len,
            })?;
        slot.def = Some((initial_f, unit));
        Ok(())
    }

    pub fn add(
        &mut self,
        name: impl Into<String>,
        initial_f: f64,
        unit: ThermalUnit,
    ) -> ThermalResult<NodeId> {
        let id = self.reserve(name);
        self.define(id, initial_f, unit)?;
        Ok(id)
    }

    pub fn build(self) -> ThermalResult<ThermalNetwork> {
        let len = self.slots.len();
        if len == 0 {
            return Err(ThermalError::InvalidArg {
                what: "network needs at least one node",
            });
        }
        let mut names = Vec::with_capacity(len);
        let mut units = Vec::with_capacity(len);
        let mut x = DVector::zeros(len);
        for (i, slot) in self.slots.into_iter().enumerate() {
            if names.contains(&slot.name) {
                return Err(ThermalError::InvalidArg {
                    what: "duplicate node name",
                });
            }
            let Some((initial_f, unit)) = slot.def else {
                return Err(ThermalError::Undefined { name: slot.name });
            };
            x[i] = hs_core::ensure_finite(initial_f, "initial temperature")?;
            names.push(slot.name);
            units.push(unit);
        }

        let in_range = |id: &NodeId| {
            if id.index() < len {
                Ok(id.index())
            } else {
                Err(ThermalError::UnknownNode {
                    index: id.index(),
                    len,
                })
            }
        };
        for unit in &units {
            match unit {
                ThermalUnit::Hvac(h) => {
                    in_range(&h.inlet)?;
                }
                ThermalUnit::Wall(w) => {
                    in_range(&w.neighbor)?;
                }
                ThermalUnit::Air(a) => {
                    for d in &a.ducts {
                        let j = in_range(d)?;
                        if !matches!(units[j], ThermalUnit::Hvac(_)) {
                            return Err(ThermalError::WrongKind {
                                name: names[j].clone(),
                                expected: "HVAC",
                            });
                        }
                    }
                    for w in &a.walls {
                        let j = in_range(w)?;
                        if !matches!(units[j], ThermalUnit::Wall(_)) {
                            return Err(ThermalError::WrongKind {
                                name: names[j].clone(),
                                expected: "wall",
                            });
                        }
                    }
                }
            }
        }

        let mut net = ThermalNetwork {
            names,
            units,
            x,
            inputs: self.inputs,
            probes: Vec::new(),
        };
        net.refresh();
        Ok(net)
    }
}
