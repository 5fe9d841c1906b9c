//! Gunnery module state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Point2;
use serde::Serialize;

// Internal
use super::{BallisticModel, GunneryError, Params};
use sim_if::cmd::{TurretCmd, TurretCmdKind};
use util::{
    archive::{Archived, Archiver},
    maths::{safe_normalise, wrap_to_pi},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Gunnery module state
#[derive(Default)]
pub struct FireControl {
    params: Params,

    model: BallisticModel,

    /// Current state of the firing progression
    fire_state: FireState,

    report: StatusReport,
    arch_report: Archiver,
}

/// Input data to Gunnery.
#[derive(Debug, Clone, Copy)]
pub struct InputData {
    /// Position of the agent on the ground plane, in meters.
    pub self_pos_m: Point2<f64>,

    /// Heading of the agent's hull in radians.
    pub self_heading_rad: f64,

    /// Current elevation of the barrel in radians.
    pub turret_elevation_rad: f64,

    /// Position of the target on the ground plane, in meters.
    pub target_pos_m: Point2<f64>,

    /// Range to the target in meters.
    pub range_m: f64,
}

/// The status report containing monitoring quantities for this cycle.
#[derive(Debug, Default, Copy, Clone, Serialize)]
pub struct StatusReport {
    /// The firing state at the end of the cycle
    pub fire_state: FireState,

    /// Bearing error from the turret to the target
    pub heading_error_rad: f64,

    /// True if the range was inside the effective band this cycle
    pub range_in_band: bool,

    /// The barrel elevation the ballistic model demanded, if it could be
    /// computed
    pub computed_elevation_rad: Option<f64>,

    /// Elevation error between the current barrel and the demand
    pub barrel_error_rad: Option<f64>,

    /// True if the ballistic inversion failed this cycle and elevation/fire
    /// were suppressed
    pub domain_error: bool,

    /// True if required inputs were degenerate and no command was emitted
    pub degraded: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The firing progression.
///
/// Bearing is acquired before elevation, and both must hold within tolerance
/// for a shot to be released.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum FireState {
    /// Rotating the turret ring onto the target azimuth.
    AcquiringBearing,

    /// Driving the barrel to the elevation the ballistic model demands.
    AcquiringElevation,

    /// Bearing and elevation both within tolerance, weapons free.
    ReadyToFire,
}

impl Default for FireState {
    fn default() -> Self {
        FireState::AcquiringBearing
    }
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for FireControl {
    type InitData = &'static str;
    type InitError = GunneryError;

    type InputData = InputData;
    type OutputData = TurretCmd;
    type StatusReport = StatusReport;
    type ProcError = GunneryError;

    /// Initialise the Gunnery module.
    ///
    /// Expected init data is the path to the parameter file.
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>
    {
        self.params = util::params::load(init_data)
            .map_err(GunneryError::ParamLoadError)?;

        self.params
            .validate()
            .map_err(GunneryError::NonFiniteParam)?;

        self.model = BallisticModel::new(self.params.ballistics.clone());

        let mut arch_path = session.arch_root.clone();
        arch_path.push("gunnery");
        std::fs::create_dir_all(arch_path)
            .map_err(|e| GunneryError::ArchInitError(e.to_string()))?;

        self.arch_report = Archiver::from_path(session, "gunnery/status_report.csv")
            .map_err(|e| GunneryError::ArchInitError(e.to_string()))?;

        Ok(())
    }

    /// Perform cyclic processing of Gunnery.
    ///
    /// Exactly one command is produced per cycle: rotate the turret, move
    /// the barrel, fire, or hold. Out-of-range targets and ballistic domain
    /// errors suppress elevation and fire for the cycle, they never
    /// propagate as errors.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        self.report = StatusReport::default();

        let cmd = self.step(input_data);

        self.report.fire_state = self.fire_state;

        Ok((cmd, self.report))
    }
}

impl FireControl {
    pub fn fire_state(&self) -> FireState {
        self.fire_state
    }

    /// Advance the firing progression one cycle and pick the output command.
    fn step(&mut self, input: &InputData) -> TurretCmd {
        // Bearing error to the target. A target on top of us has no defined
        // bearing, hold rather than divide by zero.
        let goal_vector = safe_normalise(&(input.target_pos_m - input.self_pos_m));
        if goal_vector == nalgebra::Vector2::zeros() {
            self.report.degraded = true;
            self.fire_state = FireState::AcquiringBearing;
            return TurretCmd::none();
        }

        let goal_heading_rad =
            goal_vector[1].atan2(goal_vector[0]) - std::f64::consts::FRAC_PI_2;
        let heading_error_rad = wrap_to_pi(goal_heading_rad - input.self_heading_rad);
        self.report.heading_error_rad = heading_error_rad;

        let bearing_held = heading_error_rad.abs() <= self.params.turret_tolerance_rad;
        let range_in_band = self.model.range_in_band(input.range_m);
        self.report.range_in_band = range_in_band;

        // Losing the bearing or the range band always restarts the
        // progression
        if !bearing_held {
            self.fire_state = FireState::AcquiringBearing;
            return self.rotate_turret(heading_error_rad);
        }

        if !range_in_band {
            // Bearing is held but the target cannot be reached: keep
            // tracking, do not elevate or fire
            self.fire_state = FireState::AcquiringBearing;
            return TurretCmd::none();
        }

        // Bearing held and range in band: lay the barrel
        let barrel_angle_rad = match self.model.barrel_angle_for_range(input.range_m) {
            Ok(a) => a,
            Err(_) => {
                // Ballistic domain error, suppress elevation and fire for
                // this cycle
                self.report.domain_error = true;
                self.fire_state = FireState::AcquiringElevation;
                return TurretCmd::none();
            }
        };
        self.report.computed_elevation_rad = Some(barrel_angle_rad);

        let barrel_error_rad = wrap_to_pi(input.turret_elevation_rad - barrel_angle_rad);
        self.report.barrel_error_rad = Some(barrel_error_rad);

        if barrel_error_rad.abs() <= self.params.barrel_tolerance_rad {
            self.fire_state = FireState::ReadyToFire;
            TurretCmd::fire()
        } else {
            self.fire_state = FireState::AcquiringElevation;
            self.rotate_barrel(barrel_error_rad)
        }
    }

    /// Rotate the turret ring to null the bearing error.
    fn rotate_turret(&self, heading_error_rad: f64) -> TurretCmd {
        let kind = if heading_error_rad > 0.0 {
            TurretCmdKind::RotateRight
        } else {
            TurretCmdKind::RotateLeft
        };

        TurretCmd {
            kind,
            weight: rotate_weight(heading_error_rad),
        }
    }

    /// Move the barrel to null the elevation error.
    ///
    /// A positive error means the barrel sits above the demanded elevation
    /// and must come down.
    fn rotate_barrel(&self, barrel_error_rad: f64) -> TurretCmd {
        let kind = if barrel_error_rad > 0.0 {
            TurretCmdKind::ElevateDown
        } else {
            TurretCmdKind::ElevateUp
        };

        TurretCmd {
            kind,
            weight: rotate_weight(barrel_error_rad),
        }
    }
}

impl Archived for FireControl {
    fn write(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.arch_report.serialise(self.report)
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// The actuation weight for a rotation command.
///
/// Scales with the error but is floored at 0.5 so corrections near the
/// tolerance edge are never vanishingly small.
fn rotate_weight(error_rad: f64) -> f64 {
    (error_rad.abs() / std::f64::consts::PI).clamp(0.5, 1.0)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::auto::gunnery::BallisticParams;

    fn fire_control() -> FireControl {
        let params = Params {
            turret_tolerance_rad: 0.0523,
            barrel_tolerance_rad: 0.0174,
            ballistics: BallisticParams {
                regression_coeffs: [0.373, 5.914, 41.24],
                effective_min_range_m: 21.002,
                effective_max_range_m: 115.8,
                barrel_bracket_min_deg: -5.0,
                barrel_bracket_max_deg: 10.0,
            },
        };

        let mut fc = FireControl::default();
        fc.model = BallisticModel::new(params.ballistics.clone());
        fc.params = params;
        fc
    }

    /// Target dead north of the agent at the given range.
    fn input(heading_rad: f64, range_m: f64, elevation_rad: f64) -> InputData {
        InputData {
            self_pos_m: Point2::new(0.0, 0.0),
            self_heading_rad: heading_rad,
            turret_elevation_rad: elevation_rad,
            target_pos_m: Point2::new(0.0, range_m),
            range_m,
        }
    }

    #[test]
    fn test_bearing_off_rotates_turret() {
        let mut fc = fire_control();

        // Hull facing +X while the target is north: positive error, rotate
        // right at full weight
        let (cmd, report) = fc
            .proc(&input(-std::f64::consts::FRAC_PI_2, 50.0, 0.0))
            .unwrap();

        assert_eq!(cmd.kind, TurretCmdKind::RotateRight);
        assert!(cmd.weight >= 0.5 && cmd.weight <= 1.0);
        assert_eq!(report.fire_state, FireState::AcquiringBearing);
    }

    #[test]
    fn test_rotation_weight_floored() {
        let mut fc = fire_control();

        // A bearing error barely past tolerance still gets half weight
        let (cmd, _) = fc.proc(&input(0.06, 50.0, 0.0)).unwrap();

        assert_eq!(cmd.kind, TurretCmdKind::RotateLeft);
        assert_eq!(cmd.weight, 0.5);
    }

    #[test]
    fn test_on_bearing_in_band_lays_barrel() {
        let mut fc = fire_control();

        // Bearing held, range 50 m in band, barrel at zero: the model wants
        // roughly 1.4 degrees, so the barrel must come up. Never a bearing
        // rotation in this configuration.
        let (cmd, report) = fc.proc(&input(0.0, 50.0, 0.0)).unwrap();

        assert_eq!(cmd.kind, TurretCmdKind::ElevateUp);
        assert_eq!(report.fire_state, FireState::AcquiringElevation);
        assert!(report.barrel_error_rad.unwrap() < 0.0);
    }

    #[test]
    fn test_barrel_within_tolerance_fires() {
        let mut fc = fire_control();

        // Set the barrel exactly at the demanded elevation
        let elevation_rad = fc.model.barrel_angle_for_range(50.0).unwrap();
        let (cmd, report) = fc.proc(&input(0.0, 50.0, elevation_rad)).unwrap();

        assert_eq!(cmd.kind, TurretCmdKind::Fire);
        assert_eq!(report.fire_state, FireState::ReadyToFire);
    }

    #[test]
    fn test_out_of_band_suppresses_elevation() {
        let mut fc = fire_control();

        // Bearing held but target beyond the effective band: hold, keep
        // tracking
        let (cmd, report) = fc.proc(&input(0.0, 200.0, 0.0)).unwrap();

        assert_eq!(cmd.kind, TurretCmdKind::None);
        assert!(!report.range_in_band);
        assert_eq!(report.fire_state, FireState::AcquiringBearing);
    }

    #[test]
    fn test_leaving_band_reverts_from_ready() {
        let mut fc = fire_control();

        let elevation_rad = fc.model.barrel_angle_for_range(50.0).unwrap();
        fc.proc(&input(0.0, 50.0, elevation_rad)).unwrap();
        assert_eq!(fc.fire_state(), FireState::ReadyToFire);

        // Target runs out of the band: straight back to acquiring bearing
        let (cmd, _) = fc.proc(&input(0.0, 300.0, elevation_rad)).unwrap();
        assert_eq!(fc.fire_state(), FireState::AcquiringBearing);
        assert_eq!(cmd.kind, TurretCmdKind::None);
    }

    #[test]
    fn test_bearing_drift_reverts_from_ready() {
        let mut fc = fire_control();

        let elevation_rad = fc.model.barrel_angle_for_range(50.0).unwrap();
        fc.proc(&input(0.0, 50.0, elevation_rad)).unwrap();
        assert_eq!(fc.fire_state(), FireState::ReadyToFire);

        // Hull slews away: bearing must be re-acquired before firing again
        let (cmd, _) = fc.proc(&input(1.0, 50.0, elevation_rad)).unwrap();
        assert_eq!(fc.fire_state(), FireState::AcquiringBearing);
        assert_eq!(cmd.kind, TurretCmdKind::RotateLeft);
    }

    #[test]
    fn test_target_on_top_degrades() {
        let mut fc = fire_control();

        let (cmd, report) = fc
            .proc(&InputData {
                self_pos_m: Point2::new(10.0, 10.0),
                self_heading_rad: 0.0,
                turret_elevation_rad: 0.0,
                target_pos_m: Point2::new(10.0, 10.0),
                range_m: 0.0,
            })
            .unwrap();

        assert_eq!(cmd.kind, TurretCmdKind::None);
        assert!(report.degraded);
    }
}
