//! Simulation driver: builds the house from a project and steps it.

use chrono::NaiveDateTime;
use hs_controls::{
    BoxcarFilter, EquipmentSequencer, EquipmentState, Hysteresis, PIDController, PwmModulator,
    UnitKind,
};
use hs_core::units::{Energy, Power, Temperature, deg_f, watt_hours, watts};
use hs_core::{SECONDS_PER_HOUR, SimClock, SimTime};
use hs_project::{Project, RunDef, validate_project};
use hs_runtime::{RunStatus, Scheduler};
use hs_sim::{IntegratorStats, ThermalSimulator};
use hs_thermal::{ThermalInputs, build_house};
use serde::Serialize;
use tracing::info;

use crate::context::{ControlBus, DemandResponseEvent, House, SetpointBus, UtilityPort};
use crate::environment;
use crate::error::{HouseError, HouseResult};
use crate::tasks;

/// One row of the per-tick trace.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TickRecord {
    pub t_s: f64,
    pub calendar: NaiveDateTime,
    pub inside_f: f64,
    pub outside_f: f64,
    pub setpoint_f: f64,
    pub power_w: f64,
    pub heater_on: bool,
    pub cooler_on: bool,
}

impl TickRecord {
    pub fn inside_temperature(&self) -> Temperature {
        deg_f(self.inside_f)
    }

    pub fn power(&self) -> Power {
        watts(self.power_w)
    }

    /// Tab-delimited header matching [`TickRecord::to_tsv`].
    pub const TSV_HEADER: &'static str =
        "t_s\tcalendar\tinside_f\toutside_f\tsetpoint_f\tpower_w\theater_on\tcooler_on";

    pub fn to_tsv(&self) -> String {
        format!(
            "{:.3}\t{}\t{:.3}\t{:.3}\t{:.3}\t{:.1}\t{}\t{}",
            self.t_s,
            self.calendar.format("%Y-%m-%d %H:%M:%S"),
            self.inside_f,
            self.outside_f,
            self.setpoint_f,
            self.power_w,
            u8::from(self.heater_on),
            u8::from(self.cooler_on),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub ticks: u64,
    /// A task requested shutdown before `t_end`.
    pub stopped: bool,
    pub t_final_s: f64,
    pub energy_wh: f64,
    pub heater_starts: u32,
    pub cooler_starts: u32,
    /// Inside temperature extremes after the settling time.
    pub inside_range_f: Option<(f64, f64)>,
    pub integrator: IntegratorStats,
}

impl RunSummary {
    pub fn energy(&self) -> Energy {
        watt_hours(self.energy_wh)
    }
}

pub struct Simulation {
    scheduler: Scheduler<House, HouseError>,
    house: House,
    clock: SimClock,
    run: RunDef,
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("tasks", &self.scheduler.task_count())
            .field("t_s", &self.clock.elapsed_s())
            .field("run", &self.run)
            .finish()
    }
}

impl Simulation {
    /// Validate `project`, build the thermal model and register every task.
    pub fn new(project: &Project) -> HouseResult<Self> {
        validate_project(project)?;
        let clock = SimClock::new(project.start);
        let start = clock.now();

        let env = environment::from_def(&project.environment);
        let c = env.conditions(&start);
        let inputs = ThermalInputs {
            outside_f: c.outside_f,
            solar: c.solar,
        };
        let (network, layout) = build_house(&project.thermal, inputs)?;
        let sim = ThermalSimulator::new(network, project.solver.clone(), start.seconds)?;

        let t = &project.thermostat;
        let supervisor = SetpointBus::new(t.schedule.clone(), &start, t.hold);
        let control = ControlBus::new(t.mode, t.law, supervisor.setpoint_f());
        let mut utility = UtilityPort::default();
        for e in &project.demand_response {
            utility.announce(DemandResponseEvent {
                start_s: e.start_s,
                until_s: e.until_s,
                offset_f: e.offset_f,
                allow_override: e.allow_override,
            });
        }
        let house = House {
            sim,
            layout,
            units: Default::default(),
            control,
            supervisor,
            panel: Default::default(),
            utility,
        };

        let dt = t.control_dt_s;
        let eq_dt = project.equipment.period_s;
        let kinds = [UnitKind::Heater, UnitKind::Cooler];
        let mut scheduler = Scheduler::new();
        scheduler.add_task(tasks::environment_task(
            env,
            project.environment.period_s(),
        )?);
        scheduler.add_task(tasks::goal_seeker_task(dt)?);
        scheduler.add_task(tasks::supervisor_task(t.hold, dt)?);
        scheduler.add_task(tasks::coordinator_task(t.law, dt)?);
        scheduler.add_task(tasks::filter_task(
            BoxcarFilter::for_window(t.filter_window_s, dt)?,
            dt,
        )?);
        for kind in kinds {
            let law = Hysteresis::new(kind, t.hysteresis.band_f, t.hysteresis.anticipator_f)?;
            scheduler.add_task(tasks::hysteresis_task(law, dt)?);
        }
        for kind in kinds {
            let pid = PIDController::for_unit(kind, t.pid)?;
            scheduler.add_task(tasks::pid_task(kind, pid, dt)?);
        }
        for kind in kinds {
            let pwm = PwmModulator::new(kind, t.pwm_period_s)?;
            scheduler.add_task(tasks::pwm_task(pwm, kind, eq_dt)?);
        }
        for kind in kinds {
            let seq = EquipmentSequencer::new(kind, project.equipment.thresholds(kind))?;
            scheduler.add_task(tasks::equipment_task(kind, seq, eq_dt)?);
        }
        scheduler.add_task(tasks::thermal_task()?);

        Ok(Self {
            scheduler,
            house,
            clock,
            run: project.run,
        })
    }

    pub fn house(&self) -> &House {
        &self.house
    }

    /// Operator and utility inputs go through here between passes.
    pub fn house_mut(&mut self) -> &mut House {
        &mut self.house
    }

    pub fn scheduler(&self) -> &Scheduler<House, HouseError> {
        &self.scheduler
    }

    pub fn now(&self) -> SimTime {
        self.clock.now()
    }

    pub fn run_def(&self) -> &RunDef {
        &self.run
    }

    /// Run one scheduler pass at the current time and return its record.
    /// The clock is not moved.
    pub fn pass(&mut self) -> HouseResult<(RunStatus, TickRecord)> {
        let now = self.clock.now();
        let status = self.scheduler.advance(&mut self.house, &now)?;
        Ok((status, self.record(&now)?))
    }

    pub fn advance_clock(&mut self) -> HouseResult<SimTime> {
        Ok(self.clock.advance(self.run.dt_s)?)
    }

    fn record(&self, now: &SimTime) -> HouseResult<TickRecord> {
        let h = &self.house;
        Ok(TickRecord {
            t_s: now.seconds,
            calendar: now.calendar(),
            inside_f: h.inside_temperature()?,
            outside_f: h.outside_temperature(),
            setpoint_f: h.setpoint(),
            power_w: h.power_w(),
            heater_on: h.units.heater.is_on(),
            cooler_on: h.units.cooler.is_on(),
        })
    }

    /// Step until `t_end` or a stop request, handing every tick to
    /// `observer`.
    pub fn run<F>(&mut self, mut observer: F) -> HouseResult<RunSummary>
    where
        F: FnMut(&TickRecord),
    {
        let dt = self.run.dt_s;
        let t_end = self.run.t_end_s;
        info!(
            t_end_s = t_end,
            dt_s = dt,
            law = ?self.house.control.requested_law,
            mode = ?self.house.control.mode,
            "simulation started"
        );

        let mut summary = RunSummary {
            ticks: 0,
            stopped: false,
            t_final_s: self.clock.elapsed_s(),
            energy_wh: 0.0,
            heater_starts: 0,
            cooler_starts: 0,
            inside_range_f: None,
            integrator: IntegratorStats::default(),
        };
        let mut last_states = (EquipmentState::Off, EquipmentState::Off);

        while self.clock.elapsed_s() <= t_end + 1e-9 * dt {
            let (status, record) = self.pass()?;
            observer(&record);
            summary.ticks += 1;
            summary.t_final_s = record.t_s;

            let states = (
                self.house.units.heater.state(),
                self.house.units.cooler.state(),
            );
            if states.0 == EquipmentState::Pre && last_states.0 == EquipmentState::Off {
                summary.heater_starts += 1;
            }
            if states.1 == EquipmentState::Pre && last_states.1 == EquipmentState::Off {
                summary.cooler_starts += 1;
            }
            last_states = states;

            if record.t_s >= self.run.settle_s {
                let t = record.inside_f;
                summary.inside_range_f = Some(match summary.inside_range_f {
                    None => (t, t),
                    Some((lo, hi)) => (lo.min(t), hi.max(t)),
                });
            }

            if status == RunStatus::Stopped {
                summary.stopped = true;
                break;
            }
            summary.energy_wh += record.power_w * dt / SECONDS_PER_HOUR;
            self.advance_clock()?;
        }

        summary.integrator = self.house.sim.stats();
        info!(
            ticks = summary.ticks,
            energy_wh = summary.energy_wh,
            stopped = summary.stopped,
            "simulation finished"
        );
        Ok(summary)
    }
}
