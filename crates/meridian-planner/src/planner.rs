//! Multi-candidate trajectory planning.
//!
//! Pipeline: feasibility gate → baseline path per payload kind → K sampled
//! variants → stealth/cost scoring → selection → kinematic validation with
//! bounded smoothing. Candidate sampling uses a seeded RNG so the same
//! request against the same engine plans the same route.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;
use uuid::Uuid;

use meridian_core::constants::{CANDIDATE_COUNT, DEFAULT_DEVIATION_RADIUS_M, SMOOTHING_MAX_GROWTH};
use meridian_core::enums::PayloadKind;
use meridian_core::error::{GuidanceError, Result};
use meridian_core::limits::{limits_for, KindLimits};
use meridian_core::types::{EntityState, Trajectory, TrajectoryId, Vector3, Waypoint};
use meridian_stealth::evaluate::{evaluate_waypoints, ThreatPicture};
use meridian_terrain::TerrainGrid;

use crate::constraints::PlanConstraints;
use crate::lambert::solve_lambert;

/// Cruise speed margin below the kinematic ceiling, leaving headroom for
/// corrective maneuvers in flight.
const CRUISE_SPEED_FRACTION: f64 = 0.8;

/// Intermediate waypoints on an aerial baseline.
const AERIAL_INTERMEDIATES: usize = 8;

/// Intermediate waypoints on a surface baseline.
const SURFACE_INTERMEDIATES: usize = 4;

/// Margin pushed beyond an avoid-zone radius when rerouting.
const ZONE_MARGIN_FACTOR: f64 = 1.1;

/// Planner configuration.
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// RNG seed for candidate sampling. Same seed, same plan.
    pub seed: u64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self { seed: 42 }
    }
}

/// The trajectory planner. Owns the candidate-sampling RNG.
pub struct TrajectoryPlanner {
    rng: ChaCha8Rng,
}

struct ScoredCandidate {
    waypoints: Vec<Waypoint>,
    cost: f64,
    fuel_kg: f64,
    distance_m: f64,
    time_secs: f64,
    stealth: f64,
    exposure: f64,
    smoothing_inserts: usize,
}

impl TrajectoryPlanner {
    pub fn new(config: PlannerConfig) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
        }
    }

    /// Plan a trajectory from `start` to `target` for a payload kind.
    pub fn plan(
        &mut self,
        kind: PayloadKind,
        start: &EntityState,
        target: Vector3,
        constraints: &PlanConstraints,
        threats: &ThreatPicture,
        terrain: Option<&TerrainGrid>,
        now_secs: f64,
    ) -> Result<Trajectory> {
        let limits = limits_for(kind);
        self.feasibility_gate(kind, &limits, &start.position, &target)?;

        let baseline = self.baseline(kind, &limits, start, &target);
        self.refine(
            kind, &limits, start, target, baseline, constraints, threats, terrain, now_secs, None,
            CANDIDATE_COUNT,
        )
    }

    /// Partial replan against a trajectory in force. Returns `None` when
    /// the payload is still within the kind's cross-track threshold and
    /// the incumbent stands; otherwise replans from the current state to
    /// the incumbent's target over a shortened horizon.
    pub fn update_trajectory(
        &mut self,
        current: &EntityState,
        in_force: &Trajectory,
        constraints: &PlanConstraints,
        threats: &ThreatPicture,
        terrain: Option<&TerrainGrid>,
        now_secs: f64,
    ) -> Result<Option<Trajectory>> {
        let limits = limits_for(in_force.payload_kind);
        let cross_track = in_force.cross_track_error(&current.position);
        if cross_track < limits.cross_track_threshold_m {
            return Ok(None);
        }
        debug!(
            cross_track_m = cross_track,
            threshold_m = limits.cross_track_threshold_m,
            "cross-track exceeded, replanning"
        );

        let target = in_force
            .target()
            .ok_or(GuidanceError::NoFeasibleCandidate)?;
        let baseline = self.baseline(in_force.payload_kind, &limits, current, &target);
        let replanned = self.refine(
            in_force.payload_kind,
            &limits,
            current,
            target,
            baseline,
            constraints,
            threats,
            terrain,
            now_secs,
            Some(in_force.id.clone()),
            CANDIDATE_COUNT / 2,
        )?;
        Ok(Some(replanned))
    }

    /// Replan unconditionally (fresh threat picture), keeping the
    /// incumbent's target and recording the lineage.
    pub fn replan(
        &mut self,
        current: &EntityState,
        in_force: &Trajectory,
        constraints: &PlanConstraints,
        threats: &ThreatPicture,
        terrain: Option<&TerrainGrid>,
        now_secs: f64,
    ) -> Result<Trajectory> {
        let limits = limits_for(in_force.payload_kind);
        let target = in_force
            .target()
            .ok_or(GuidanceError::NoFeasibleCandidate)?;
        let baseline = self.baseline(in_force.payload_kind, &limits, current, &target);
        self.refine(
            in_force.payload_kind,
            &limits,
            current,
            target,
            baseline,
            constraints,
            threats,
            terrain,
            now_secs,
            Some(in_force.id.clone()),
            CANDIDATE_COUNT / 2,
        )
    }

    /// Stage 1: operating-envelope check for start and target.
    fn feasibility_gate(
        &self,
        kind: PayloadKind,
        limits: &KindLimits,
        start: &Vector3,
        target: &Vector3,
    ) -> Result<()> {
        // Surface endpoints below the floor are clamped by the backends;
        // the gate only rejects what the kind can never reach.
        let slack = 100.0;
        for (name, pos) in [("start", start), ("target", target)] {
            if pos.z > limits.altitude_ceiling_m + slack {
                return Err(GuidanceError::InfeasibleMission {
                    reason: format!(
                        "{name} altitude {:.0} m above {kind:?} ceiling {:.0} m",
                        pos.z, limits.altitude_ceiling_m
                    ),
                });
            }
            if pos.z < limits.altitude_floor_m - slack {
                return Err(GuidanceError::InfeasibleMission {
                    reason: format!(
                        "{name} altitude {:.0} m below {kind:?} floor {:.0} m",
                        pos.z, limits.altitude_floor_m
                    ),
                });
            }
        }
        Ok(())
    }

    /// Stage 2: direct baseline path for the kind.
    fn baseline(
        &mut self,
        kind: PayloadKind,
        limits: &KindLimits,
        start: &EntityState,
        target: &Vector3,
    ) -> Vec<Waypoint> {
        if kind.is_orbital() && start.position.norm() > 1_000_000.0 {
            if let Some(arc) = self.orbital_baseline(start, target) {
                return arc;
            }
        }

        let intermediates = if kind.is_surface() {
            SURFACE_INTERMEDIATES
        } else {
            AERIAL_INTERMEDIATES
        };

        let cruise_alt = if kind.is_surface() {
            f64::NAN // follow the endpoint altitudes
        } else {
            limits.cruise_altitude_m
        };

        let mut positions = Vec::with_capacity(intermediates + 2);
        positions.push(start.position);
        for i in 1..=intermediates {
            let t = i as f64 / (intermediates + 1) as f64;
            let x = start.position.x + (target.x - start.position.x) * t;
            let y = start.position.y + (target.y - start.position.y) * t;
            let z = if cruise_alt.is_nan() {
                start.position.z + (target.z - start.position.z) * t
            } else {
                // Trapezoid altitude profile: climb, cruise, descend.
                let climb = (t / 0.2).min(1.0);
                let descend = ((1.0 - t) / 0.2).min(1.0);
                let blend = climb.min(descend);
                let endpoint_alt = start.position.z + (target.z - start.position.z) * t;
                endpoint_alt + (cruise_alt - endpoint_alt) * blend
            };
            positions.push(Vector3::new(x, y, z));
        }
        positions.push(*target);

        self.timed_waypoints(&positions, limits)
    }

    /// Orbital baseline: a Lambert arc between body-centered endpoints,
    /// sampled along the conic.
    fn orbital_baseline(&mut self, start: &EntityState, target: &Vector3) -> Option<Vec<Waypoint>> {
        // Time of flight scaled to the chord at a representative transfer
        // speed; refined candidates vary around the baseline.
        let chord = start.position.distance_to(target);
        let tof = (chord / 3_000.0).max(600.0);
        let mu = meridian_core::constants::GM_EARTH;

        let sol = solve_lambert(&start.position, target, tof, mu, true).ok()?;

        // Sample the transfer by Keplerian propagation at coarse steps.
        let initial = EntityState::at(start.position, 0.0).with_velocity(sol.v_depart);
        let config = meridian_physics::propagator::PropagationConfig::orbital(
            meridian_physics::bodies::CentralBody::Earth,
        );
        let states = meridian_physics::propagator::propagate(&initial, tof, &config);

        let stride = (states.len() / 10).max(1);
        let mut waypoints: Vec<Waypoint> = states
            .iter()
            .step_by(stride)
            .map(|s| Waypoint::new(s.position, s.velocity, s.time_secs))
            .collect();
        // Pin the final waypoint to the requested target.
        if let Some(last) = waypoints.last_mut() {
            last.position = *target;
            last.velocity = sol.v_arrive;
            last.time_secs = tof;
        }
        Some(waypoints)
    }

    /// Assign times and velocities to a polyline at the kind's cruise
    /// speed. Times are strictly monotonic by construction.
    fn timed_waypoints(&self, positions: &[Vector3], limits: &KindLimits) -> Vec<Waypoint> {
        let cruise = limits.max_speed_mps * CRUISE_SPEED_FRACTION;
        let mut waypoints = Vec::with_capacity(positions.len());
        let mut t = 0.0;

        for (i, pos) in positions.iter().enumerate() {
            let dir = if i + 1 < positions.len() {
                positions[i + 1].sub(pos).normalized()
            } else {
                pos.sub(&positions[i - 1]).normalized()
            };
            waypoints.push(Waypoint::new(*pos, dir.scale(cruise), t));
            if i + 1 < positions.len() {
                let seg = positions[i + 1].distance_to(pos);
                t += (seg / cruise).max(1e-3);
            }
        }
        waypoints
    }

    /// Stages 3–6 over a prepared baseline.
    #[allow(clippy::too_many_arguments)]
    fn refine(
        &mut self,
        kind: PayloadKind,
        limits: &KindLimits,
        start: &EntityState,
        target: Vector3,
        baseline: Vec<Waypoint>,
        constraints: &PlanConstraints,
        threats: &ThreatPicture,
        terrain: Option<&TerrainGrid>,
        now_secs: f64,
        previous: Option<TrajectoryId>,
        candidate_count: usize,
    ) -> Result<Trajectory> {
        let weights = constraints.effective_weights();
        let direct_distance = start.position.distance_to(&target).max(1.0);
        let cruise = limits.max_speed_mps * CRUISE_SPEED_FRACTION;
        let direct_time = direct_distance / cruise;

        let deviation_radius = baseline
            .iter()
            .filter_map(|wp| wp.constraints.and_then(|c| c.deviation_radius_m))
            .fold(f64::NAN, f64::min);
        let deviation_radius = if deviation_radius.is_nan() {
            (direct_distance * 0.15).min(DEFAULT_DEVIATION_RADIUS_M * 4.0)
        } else {
            deviation_radius
        };

        let mut best: Option<ScoredCandidate> = None;
        let mut budget_blocked = false;

        for k in 0..candidate_count.max(1) {
            let mut candidate = if k == 0 {
                baseline.clone()
            } else {
                self.perturb(&baseline, limits, kind, deviation_radius, k)
            };

            // Terrain-hugging variant for low-altitude aerial kinds.
            if k == 1 && kind.is_aerial() {
                if let Some(grid) = terrain {
                    meridian_stealth::evaluate::optimize_terrain_masking(
                        &mut candidate,
                        grid,
                        limits.altitude_floor_m.max(50.0) + 50.0,
                    );
                }
            }

            self.route_around_zones(&mut candidate, constraints);

            // Hard rejection: still inside an avoid zone after rerouting.
            if candidate.iter().any(|wp| {
                constraints
                    .avoid_zones
                    .iter()
                    .any(|z| z.contains(&wp.position))
            }) {
                continue;
            }

            let Some((candidate, inserted)) = enforce_kinematics(candidate, limits) else {
                continue;
            };

            let report = evaluate_waypoints(
                &candidate,
                limits.rcs_scale,
                limits.thermal_engine_coeff,
                limits.max_speed_mps,
                threats,
                terrain,
            );

            if let Some(max_risk) = constraints.max_detection_risk {
                let worst = report
                    .per_waypoint
                    .iter()
                    .map(|s| s.radar_pd)
                    .fold(0.0_f64, f64::max);
                if worst > max_risk {
                    continue;
                }
            }

            let distance = Trajectory::path_length(&candidate);
            let time = candidate.last().map(|w| w.time_secs).unwrap_or(0.0);
            let fuel = estimate_fuel(&candidate, start, limits);

            if let Some(budget) = constraints.fuel_budget_kg {
                if fuel > budget {
                    budget_blocked = true;
                    continue;
                }
            }
            if let Some(max_time) = constraints.max_time_secs {
                if time > max_time {
                    budget_blocked = true;
                    continue;
                }
            }

            let fuel_norm = constraints
                .fuel_budget_kg
                .unwrap_or_else(|| estimate_fuel(&baseline, start, limits).max(1.0));
            let cost = weights.distance * (distance / direct_distance)
                + weights.time * (time / direct_time.max(1.0))
                + weights.fuel * (fuel / fuel_norm.max(1e-6))
                + weights.stealth * (1.0 - report.overall)
                + weights.threat * report.threat_exposure;

            let scored = ScoredCandidate {
                waypoints: candidate,
                cost,
                fuel_kg: fuel,
                distance_m: distance,
                time_secs: time,
                stealth: report.overall,
                exposure: report.threat_exposure,
                smoothing_inserts: inserted,
            };

            best = match best {
                None => Some(scored),
                Some(current) => {
                    // Lower cost wins; near-ties break toward lower fuel.
                    if scored.cost < current.cost - 1e-9
                        || ((scored.cost - current.cost).abs() <= 1e-9
                            && scored.fuel_kg < current.fuel_kg)
                    {
                        Some(scored)
                    } else {
                        Some(current)
                    }
                }
            };
        }

        let chosen = match best {
            Some(c) => c,
            None if budget_blocked => {
                return Err(GuidanceError::BudgetExceeded {
                    resource: "fuel/time",
                    required: f64::NAN,
                    available: constraints.fuel_budget_kg.unwrap_or(f64::NAN),
                })
            }
            None => return Err(GuidanceError::NoFeasibleCandidate),
        };

        let nonce = Uuid::new_v4().simple().to_string();
        let id = TrajectoryId::derive(&nonce[..8], &chosen.waypoints);
        // Exposure and heavy smoothing both erode confidence in the route.
        let confidence = (1.0 - 0.3 * chosen.exposure - 0.02 * chosen.smoothing_inserts as f64)
            .clamp(0.1, 1.0);

        debug!(
            trajectory = %id,
            distance_m = chosen.distance_m,
            stealth = chosen.stealth,
            cost = chosen.cost,
            "trajectory selected"
        );

        Ok(Trajectory {
            id,
            payload_kind: kind,
            waypoints: chosen.waypoints,
            total_distance_m: chosen.distance_m,
            estimated_time_secs: chosen.time_secs,
            required_fuel_kg: chosen.fuel_kg,
            threat_exposure: chosen.exposure,
            stealth_score: chosen.stealth,
            confidence,
            created_at_secs: now_secs,
            previous,
        })
    }

    /// Stage 3: sample a variant by lateral perturbation and cruise
    /// altitude variation. Endpoints are pinned.
    fn perturb(
        &mut self,
        baseline: &[Waypoint],
        limits: &KindLimits,
        kind: PayloadKind,
        deviation_radius: f64,
        _index: usize,
    ) -> Vec<Waypoint> {
        let n = baseline.len();
        if n < 3 {
            return baseline.to_vec();
        }

        // One lateral bow amplitude per candidate keeps the variant smooth
        // instead of jagged per-waypoint noise.
        let amplitude = self.rng.gen_range(-1.0..1.0) * deviation_radius;
        let altitude_scale = if kind.is_aerial() {
            self.rng.gen_range(0.6..1.4)
        } else {
            1.0
        };

        let first = baseline[0].position;
        let last = baseline[n - 1].position;
        let axis = last.sub(&first).normalized();
        // Horizontal perpendicular to the direct axis.
        let perp = Vector3::new(-axis.y, axis.x, 0.0).normalized();

        let positions: Vec<Vector3> = baseline
            .iter()
            .enumerate()
            .map(|(i, wp)| {
                if i == 0 || i == n - 1 {
                    return wp.position;
                }
                let t = i as f64 / (n - 1) as f64;
                let bow = (std::f64::consts::PI * t).sin();
                let mut p = wp.position.add(&perp.scale(amplitude * bow));
                if kind.is_aerial() {
                    let varied = wp.position.z * altitude_scale;
                    p.z = varied.clamp(limits.altitude_floor_m, limits.altitude_ceiling_m);
                }
                p
            })
            .collect();

        self.timed_waypoints(&positions, limits)
    }

    /// Push waypoints radially out of every avoid zone, with margin.
    fn route_around_zones(&mut self, waypoints: &mut Vec<Waypoint>, constraints: &PlanConstraints) {
        if constraints.avoid_zones.is_empty() {
            return;
        }
        let n = waypoints.len();
        let mut positions: Vec<Vector3> = waypoints.iter().map(|w| w.position).collect();
        for (i, p) in positions.iter_mut().enumerate() {
            if i == 0 || i == n - 1 {
                continue; // endpoints are fixed
            }
            for zone in &constraints.avoid_zones {
                let dist = zone.center.horizontal_distance_to(p);
                if dist < zone.radius_m {
                    let push = zone.radius_m * ZONE_MARGIN_FACTOR;
                    let dir = if dist > 1.0 {
                        Vector3::new(p.x - zone.center.x, p.y - zone.center.y, 0.0).normalized()
                    } else {
                        Vector3::new(0.0, 1.0, 0.0)
                    };
                    p.x = zone.center.x + dir.x * push;
                    p.y = zone.center.y + dir.y * push;
                }
            }
        }
        // Retime after displacement; kind limits live in the constraints of
        // the first waypoint's kind, but retiming only needs the old cruise
        // speed, recovered from the first segment.
        let cruise = waypoints
            .first()
            .map(|w| w.velocity.norm())
            .filter(|v| *v > 1e-6)
            .unwrap_or(1.0);
        let mut t = waypoints.first().map(|w| w.time_secs).unwrap_or(0.0);
        for i in 0..n {
            let dir = if i + 1 < n {
                positions[i + 1].sub(&positions[i]).normalized()
            } else {
                positions[i].sub(&positions[i - 1]).normalized()
            };
            waypoints[i].position = positions[i];
            waypoints[i].velocity = dir.scale(cruise);
            waypoints[i].time_secs = t;
            if i + 1 < n {
                t += (positions[i + 1].distance_to(&positions[i]) / cruise).max(1e-3);
            }
        }
    }
}

/// Stage 6: kinematic validation with bounded smoothing. Speed violations
/// are retimed; acceleration spikes get intermediate waypoints up to 4×
/// the original count. Returns None when the route cannot be brought
/// within limits.
pub fn enforce_kinematics(
    mut waypoints: Vec<Waypoint>,
    limits: &KindLimits,
) -> Option<(Vec<Waypoint>, usize)> {
    let original = waypoints.len().max(2);
    let cap = original * SMOOTHING_MAX_GROWTH;
    let mut inserted = 0;

    for _pass in 0..cap {
        match first_violation(&waypoints, limits) {
            None => return Some((waypoints, inserted)),
            Some(Violation::Speed { index, needed_dt }) => {
                // Stretch this segment; shift all later timestamps.
                let current_dt = waypoints[index + 1].time_secs - waypoints[index].time_secs;
                let shift = needed_dt - current_dt;
                for wp in waypoints.iter_mut().skip(index + 1) {
                    wp.time_secs += shift;
                }
            }
            Some(Violation::Acceleration { index }) => {
                if waypoints.len() >= cap {
                    return None;
                }
                // Blend the turn with a midpoint carrying the averaged
                // heading, and stretch the local timing.
                let a = waypoints[index];
                let b = waypoints[index + 1];
                let mid_pos = a.position.add(&b.position).scale(0.5);
                let speed = (a.velocity.norm() + b.velocity.norm()) / 2.0;
                let mid_vel = a.velocity.add(&b.velocity).scale(0.5).normalized().scale(speed);
                let dt = b.time_secs - a.time_secs;
                let stretch = dt * 0.5;
                let mid = Waypoint::new(mid_pos, mid_vel, a.time_secs + dt * 0.5 + stretch * 0.5);
                for wp in waypoints.iter_mut().skip(index + 1) {
                    wp.time_secs += stretch;
                }
                waypoints.insert(index + 1, mid);
                inserted += 1;
            }
        }
    }

    // Out of smoothing budget.
    first_violation(&waypoints, limits).is_none().then_some((waypoints, inserted))
}

enum Violation {
    Speed { index: usize, needed_dt: f64 },
    Acceleration { index: usize },
}

/// First kinematic violation along the route, if any.
fn first_violation(waypoints: &[Waypoint], limits: &KindLimits) -> Option<Violation> {
    for (i, pair) in waypoints.windows(2).enumerate() {
        let dt = pair[1].time_secs - pair[0].time_secs;
        if dt <= 0.0 {
            return Some(Violation::Speed {
                index: i,
                needed_dt: pair[0].position.distance_to(&pair[1].position)
                    / (limits.max_speed_mps * CRUISE_SPEED_FRACTION),
            });
        }
        let seg = pair[0].position.distance_to(&pair[1].position);
        if seg / dt > limits.max_speed_mps {
            return Some(Violation::Speed {
                index: i,
                needed_dt: seg / (limits.max_speed_mps * CRUISE_SPEED_FRACTION),
            });
        }
        let dv = pair[1].velocity.sub(&pair[0].velocity).norm();
        if dv / dt > limits.max_accel_mps2 {
            return Some(Violation::Acceleration { index: i });
        }
    }
    None
}

/// Fuel estimate: impulse cost of the velocity profile at the kind's
/// consumption factor, plus the initial impulse from the current state.
pub fn estimate_fuel(waypoints: &[Waypoint], start: &EntityState, limits: &KindLimits) -> f64 {
    let mut delta_v = waypoints
        .first()
        .map(|w| w.velocity.sub(&start.velocity).norm())
        .unwrap_or(0.0);
    for pair in waypoints.windows(2) {
        delta_v += pair[1].velocity.sub(&pair[0].velocity).norm();
    }
    delta_v * limits.fuel_per_delta_v
}
