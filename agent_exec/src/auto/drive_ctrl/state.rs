//! Drive control module state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Point2;
use serde::Serialize;

// Internal
use super::{DriveCtrlError, Params, PidController};
use crate::auto::{
    kin::{bearing_rad, KinematicState},
    nav::Route,
    steer::{self, SteerParams, TurnDirection},
};
use sim_if::cmd::{MoveCmd, MoveCmdKind};
use util::{
    archive::{Archived, Archiver},
    maths::wrap_to_pi,
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Drive control module state
#[derive(Default)]
pub struct DriveCtrl {
    params: Params,

    steer_params: SteerParams,

    /// Executing mode
    mode: DriveMode,

    /// Heading error controller
    head_ctrl: PidController,

    /// The route being followed, if any
    route: Option<Route>,

    /// Index of the current target waypoint within the route
    waypoint_index: usize,

    /// Goal used when steering directly without a route
    direct_goal_m: Option<Point2<f64>>,

    report: StatusReport,
    arch_report: Archiver,
}

/// Input data to Drive Control.
#[derive(Debug, Default, Clone, Copy)]
pub struct InputData {
    /// The current kinematic state of the hull, or `None` if no telemetry
    /// has been accepted yet.
    pub kin: Option<KinematicState>,

    /// The control clock used to feed the PID, in seconds.
    pub time_s: f64,
}

/// The status report containing monitoring quantities for this cycle.
#[derive(Debug, Default, Copy, Clone, Serialize)]
pub struct StatusReport {
    /// The mode the module finished the cycle in
    pub mode: DriveMode,

    /// Distance to the current target waypoint
    pub distance_to_waypoint_m: f64,

    /// The heading error to the current target waypoint
    pub heading_error_rad: f64,

    /// Output of the heading PID controller
    pub head_ctrl_output: f64,

    /// The normalised speed demand from the speed profile
    pub speed_demand: f64,

    /// Index of the current target waypoint
    pub waypoint_index: usize,

    /// Number of waypoints in the current route
    pub route_len: usize,

    /// True if the route was completed this cycle
    pub completed: bool,

    /// True if required inputs were missing and the module degraded to STOP
    pub degraded: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The possible modes of execution of DriveCtrl.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum DriveMode {
    /// No movement is being commanded.
    Off,

    /// Following a planned route waypoint by waypoint.
    FollowRoute,

    /// Steering directly at the goal, used when no route could be planned.
    DirectSteer,

    /// The route (or direct goal) has been reached, holding position until a
    /// new goal arrives.
    RouteComplete,
}

impl Default for DriveMode {
    fn default() -> Self {
        DriveMode::Off
    }
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for DriveCtrl {
    type InitData = (&'static str, &'static str);
    type InitError = DriveCtrlError;

    type InputData = InputData;
    type OutputData = MoveCmd;
    type StatusReport = StatusReport;
    type ProcError = DriveCtrlError;

    /// Initialise the DriveCtrl module.
    ///
    /// Expected init data is the paths to the drive control and steering
    /// parameter files.
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>
    {
        self.params = util::params::load(init_data.0)
            .map_err(DriveCtrlError::ParamLoadError)?;
        self.steer_params = util::params::load(init_data.1)
            .map_err(DriveCtrlError::ParamLoadError)?;

        // A malformed tunable poisons every cycle, so it aborts startup
        self.params
            .validate()
            .map_err(DriveCtrlError::NonFiniteParam)?;

        self.head_ctrl = PidController::new(
            self.params.head_k_p,
            self.params.head_k_i,
            self.params.head_k_d,
            self.params.head_integral_limit,
            (self.params.head_output_min, self.params.head_output_max),
        );

        // Create the arch folder for drive_ctrl
        let mut arch_path = session.arch_root.clone();
        arch_path.push("drive_ctrl");
        std::fs::create_dir_all(arch_path)
            .map_err(|e| DriveCtrlError::ArchInitError(e.to_string()))?;

        self.arch_report = Archiver::from_path(session, "drive_ctrl/status_report.csv")
            .map_err(|e| DriveCtrlError::ArchInitError(e.to_string()))?;

        Ok(())
    }

    /// Perform cyclic processing of Drive Control.
    ///
    /// Always produces a valid command: degenerate inputs degrade to STOP
    /// with the `degraded` flag raised in the status report, they never
    /// propagate an error to the caller.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        self.report = StatusReport::default();

        let cmd = match self.mode {
            DriveMode::Off => MoveCmd::stop(),
            DriveMode::RouteComplete => MoveCmd::stop(),
            DriveMode::FollowRoute => self.mode_follow_route(input_data),
            DriveMode::DirectSteer => self.mode_direct_steer(input_data),
        };

        self.report.mode = self.mode;

        Ok((cmd, self.report))
    }
}

impl DriveCtrl {
    /// Begin executing a route.
    ///
    /// Execution begins on the next call to `proc`. Loading a new route
    /// while one is executing is an error, abort the current route first.
    pub fn set_route(&mut self, route: Route) -> Result<(), DriveCtrlError> {
        if self.route.is_some() {
            return Err(DriveCtrlError::RouteAlreadyLoaded);
        }

        if route.is_empty() {
            return Err(DriveCtrlError::AttemptEmptyRouteLoad);
        }

        self.route = Some(route);
        self.waypoint_index = 0;
        self.direct_goal_m = None;
        self.head_ctrl.reset();
        self.mode = DriveMode::FollowRoute;

        Ok(())
    }

    /// Steer directly at a goal without a planned route.
    ///
    /// Used as the fallback when the path finder reports the goal
    /// unreachable through the grid.
    pub fn set_direct_goal(&mut self, goal_m: Point2<f64>) {
        self.route = None;
        self.direct_goal_m = Some(goal_m);
        self.head_ctrl.reset();
        self.mode = DriveMode::DirectSteer;
    }

    /// Abort the current route or direct goal, dropping back to Off.
    pub fn abort(&mut self) {
        self.route = None;
        self.direct_goal_m = None;
        self.waypoint_index = 0;
        self.mode = DriveMode::Off;
    }

    /// True if the current route or direct goal has been completed.
    pub fn is_complete(&self) -> bool {
        self.mode == DriveMode::RouteComplete
    }

    pub fn mode(&self) -> DriveMode {
        self.mode
    }

    /// Mode following a planned route.
    fn mode_follow_route(&mut self, input: &InputData) -> MoveCmd {
        let kin = match input.kin {
            Some(k) => k,
            None => return self.degrade(),
        };

        let route = match self.route {
            Some(ref r) => r.clone(),
            None => return self.degrade(),
        };

        // ---- WAYPOINT MANAGEMENT ----

        let mut index = self.waypoint_index;
        let mut waypoint_m = route.waypoints_m[index];
        let mut distance_m = (waypoint_m - kin.position_m).norm();

        // Advance past any waypoints already within tolerance, re-aiming at
        // the next one in the same cycle
        while distance_m < self.params.waypoint_tolerance_m {
            if index == route.len() - 1 {
                self.route = None;
                self.waypoint_index = 0;
                self.mode = DriveMode::RouteComplete;
                self.report.completed = true;
                return MoveCmd::stop();
            }

            index += 1;
            waypoint_m = route.waypoints_m[index];
            distance_m = (waypoint_m - kin.position_m).norm();
        }

        self.waypoint_index = index;
        self.report.waypoint_index = index;
        self.report.route_len = route.len();
        self.report.distance_to_waypoint_m = distance_m;

        // ---- COMMAND GENERATION ----

        let desired_heading_rad = bearing_rad(&kin.position_m, &waypoint_m);
        let heading_error_rad = wrap_to_pi(desired_heading_rad - kin.heading_rad);
        self.report.heading_error_rad = heading_error_rad;

        let head_output = self.head_ctrl.update(heading_error_rad, input.time_s);
        self.report.head_ctrl_output = head_output;

        let speed = self.speed_profile(distance_m);
        self.report.speed_demand = speed;

        if heading_error_rad.abs() > self.params.angle_threshold_rad {
            let kind = if heading_error_rad > 0.0 {
                MoveCmdKind::TurnRight
            } else {
                MoveCmdKind::TurnLeft
            };

            MoveCmd {
                kind,
                weight: head_output.abs().clamp(self.params.min_cmd_weight, 1.0),
            }
        } else {
            MoveCmd {
                kind: MoveCmdKind::Forward,
                weight: speed.clamp(self.params.min_cmd_weight, 1.0),
            }
        }
    }

    /// Mode steering directly at the goal.
    ///
    /// Uses the arrive behaviour to produce a steering demand, integrates it
    /// through the kinematic model to predict the velocity it would produce,
    /// and turns the predicted velocity into a discrete command via pursuit.
    fn mode_direct_steer(&mut self, input: &InputData) -> MoveCmd {
        let kin = match input.kin {
            Some(k) => k,
            None => return self.degrade(),
        };

        let goal_m = match self.direct_goal_m {
            Some(g) => g,
            None => return self.degrade(),
        };

        let distance_m = (goal_m - kin.position_m).norm();
        self.report.distance_to_waypoint_m = distance_m;

        let steering = match steer::arrive(&kin, &goal_m, &self.steer_params) {
            Some(s) => s,
            None => {
                // Inside the target radius, we have arrived
                self.direct_goal_m = None;
                self.mode = DriveMode::RouteComplete;
                self.report.completed = true;
                return MoveCmd::stop();
            }
        };

        let mut predicted = kin;
        predicted.integrate(
            Some(&steering),
            self.params.kin_max_speed_ms,
            self.params.kin_dt_s,
            &self.params.bounds,
        );

        let velocity = predicted.velocity_ms;
        let desired_heading_rad = if velocity.norm() > 0.0 {
            wrap_to_pi(velocity[1].atan2(velocity[0]) - std::f64::consts::FRAC_PI_2)
        } else {
            bearing_rad(&kin.position_m, &goal_m)
        };

        let heading_error_rad = wrap_to_pi(desired_heading_rad - kin.heading_rad);
        self.report.heading_error_rad = heading_error_rad;

        let speed = self.speed_profile(distance_m);
        self.report.speed_demand = speed;

        match steer::pursuit(kin.heading_rad, desired_heading_rad, &self.steer_params) {
            Some(demand) => {
                let kind = match demand.direction {
                    TurnDirection::Right => MoveCmdKind::TurnRight,
                    TurnDirection::Left => MoveCmdKind::TurnLeft,
                };

                MoveCmd {
                    kind,
                    weight: demand.weight.clamp(self.params.min_cmd_weight, 1.0),
                }
            }
            None => MoveCmd {
                kind: MoveCmdKind::Forward,
                weight: speed.clamp(self.params.min_cmd_weight, 1.0),
            },
        }
    }

    /// The distance-based speed profile.
    ///
    /// Full speed beyond half the slow radius, ramping linearly down inside
    /// it, clamped between the minimum and maximum demands.
    fn speed_profile(&self, distance_m: f64) -> f64 {
        let ramp_radius_m = self.params.slow_radius_m * 0.5;

        let speed = if distance_m > ramp_radius_m {
            self.params.max_speed
        } else {
            self.params.max_speed * distance_m / ramp_radius_m
        };

        speed.clamp(self.params.min_speed, self.params.max_speed)
    }

    /// Degrade to a stop, flagging the condition in the status report.
    fn degrade(&mut self) -> MoveCmd {
        self.report.degraded = true;
        MoveCmd::stop()
    }
}

impl Archived for DriveCtrl {
    fn write(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.arch_report.serialise(self.report)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
