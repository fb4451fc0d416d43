#![cfg_attr(not(feature = "std"), no_std)]

use core::fmt;

/// A 2D vector used for position and velocity
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector2D {
    pub x: f32,
    pub y: f32,
}

impl Vector2D {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    pub fn magnitude(&self) -> f32 {
        #[cfg(feature = "std")]
        {
            (self.x * self.x + self.y * self.y).sqrt()
        }
        #[cfg(not(feature = "std"))]
        {
            libm::sqrtf(self.x * self.x + self.y * self.y)
        }
    }

    /// Orientation of the vector in radians, `atan2(y, x)`.
    pub fn heading(&self) -> f32 {
        #[cfg(feature = "std")]
        {
            self.y.atan2(self.x)
        }
        #[cfg(not(feature = "std"))]
        {
            libm::atan2f(self.y, self.x)
        }
    }

    /// Unit vector in the same direction, or zero for a zero-length vector.
    pub fn normalize(&self) -> Self {
        let mag = self.magnitude();
        if mag > 0.0 {
            Self {
                x: self.x / mag,
                y: self.y / mag,
            }
        } else {
            Self::zero()
        }
    }

    /// Rescales the vector to exactly `max` when it is longer, keeping direction.
    pub fn limit(&self, max: f32) -> Self {
        if self.magnitude() > max {
            self.normalize() * max
        } else {
            *self
        }
    }

    pub fn distance(&self, other: &Vector2D) -> f32 {
        (*self - *other).magnitude()
    }
}

impl core::ops::Add for Vector2D {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl core::ops::Sub for Vector2D {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl core::ops::Mul<f32> for Vector2D {
    type Output = Self;

    fn mul(self, scalar: f32) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }
}

impl core::ops::Div<f32> for Vector2D {
    type Output = Self;

    fn div(self, scalar: f32) -> Self {
        Self {
            x: self.x / scalar,
            y: self.y / scalar,
        }
    }
}

impl core::ops::AddAssign for Vector2D {
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
    }
}

impl core::ops::SubAssign for Vector2D {
    fn sub_assign(&mut self, other: Self) {
        self.x -= other.x;
        self.y -= other.y;
    }
}

/// RGBA colour with channels in `[0, 1]`. Presentation only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// A single flocking agent.
///
/// `heading` and `speed` are derived from `velocity` and are recomputed every
/// time the velocity changes, so they can only be read, never set.
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    position: Vector2D,
    velocity: Vector2D,
    heading: f32,
    speed: f32,
    color: Color,
}

impl Agent {
    pub fn new(position: Vector2D, velocity: Vector2D, color: Color) -> Self {
        Self {
            position,
            velocity,
            heading: velocity.heading(),
            speed: velocity.magnitude(),
            color,
        }
    }

    pub fn position(&self) -> Vector2D {
        self.position
    }

    pub fn velocity(&self) -> Vector2D {
        self.velocity
    }

    pub fn heading(&self) -> f32 {
        self.heading
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// Commits the velocity for this tick, moves by it and re-derives
    /// heading and speed.
    fn advance(&mut self, velocity: Vector2D) {
        self.velocity = velocity;
        self.position += velocity;
        self.heading = velocity.heading();
        self.speed = velocity.magnitude();
    }
}

/// The world rectangle `[0, width] x [0, height]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Vector2D {
        Vector2D::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Constants of the flocking rules
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleConfig {
    /// Fraction of the way to the neighbour centroid steered per tick.
    pub cohesion_step: f32,
    /// Neighbours strictly closer than this push the agent away.
    pub separation_radius: f32,
    /// Distance substituted for coincident agents.
    pub zero_distance: f32,
    /// The attractor pull is `cohesion_step / center_pull_divisor`.
    pub center_pull_divisor: f32,
    /// Factor applied to a velocity component about to leave the world.
    pub bounds_damping: f32,
    pub speed_limit: f32,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            cohesion_step: 0.01,
            separation_radius: 10.0,
            zero_distance: 0.01,
            center_pull_divisor: 50.0,
            bounds_damping: 0.5,
            speed_limit: 5.0,
        }
    }
}

/// Smallest population a tick is defined for.
pub const MIN_POPULATION: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepError {
    /// Cohesion averages over the other agents, so a tick needs at least two.
    PopulationTooSmall { len: usize },
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepError::PopulationTooSmall { len } => write!(
                f,
                "cannot step a population of {} agent(s), at least {} are required",
                len, MIN_POPULATION
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for StepError {}

/// The flocking rules.
///
/// Each steering rule takes the agent's position and the velocity accumulated
/// so far this tick, and returns the new accumulated velocity.
pub mod behavior {
    use super::*;

    /// Steers `cohesion_step` of the way towards the centroid of `others`.
    pub fn cohesion<'a, I>(
        position: Vector2D,
        velocity: Vector2D,
        others: I,
        config: &RuleConfig,
    ) -> Vector2D
    where
        I: Iterator<Item = &'a Agent>,
    {
        let mut sum = Vector2D::zero();
        let mut count = 0;

        for other in others {
            sum += other.position;
            count += 1;
        }

        if count == 0 {
            return velocity;
        }

        let centroid = sum / count as f32;
        velocity + (centroid - position) * config.cohesion_step
    }

    /// Pushes away from every neighbour inside `separation_radius` by the unit
    /// vector from that neighbour toward the agent.
    pub fn separation<'a, I>(
        position: Vector2D,
        velocity: Vector2D,
        others: I,
        config: &RuleConfig,
    ) -> Vector2D
    where
        I: Iterator<Item = &'a Agent>,
    {
        let mut velocity = velocity;

        for other in others {
            let offset = other.position - position;
            let mut distance = offset.magnitude();
            if distance < config.separation_radius {
                if distance == 0.0 {
                    distance = config.zero_distance;
                }
                velocity -= offset / distance;
            }
        }

        velocity
    }

    /// Average velocity of `others`, or zero when there are none.
    ///
    /// The tick never feeds this back into an agent's velocity: alignment is
    /// inert in this flock.
    pub fn alignment<'a, I>(others: I) -> Vector2D
    where
        I: Iterator<Item = &'a Agent>,
    {
        let mut sum = Vector2D::zero();
        let mut count = 0;

        for other in others {
            sum += other.velocity;
            count += 1;
        }

        if count > 0 {
            sum / count as f32
        } else {
            Vector2D::zero()
        }
    }

    /// Weak constant pull towards the attractor.
    pub fn center_pull(
        position: Vector2D,
        velocity: Vector2D,
        attractor: Vector2D,
        config: &RuleConfig,
    ) -> Vector2D {
        velocity + (attractor - position) * config.cohesion_step / config.center_pull_divisor
    }

    /// Damps each velocity component whose next move would leave the world.
    ///
    /// Looks one tick ahead (`position + velocity`) and checks the low edge
    /// before the high edge, each against the component as damped so far.
    pub fn damp_bounds(
        position: Vector2D,
        velocity: Vector2D,
        bounds: Bounds,
        config: &RuleConfig,
    ) -> Vector2D {
        let mut velocity = velocity;

        if position.x + velocity.x < 0.0 {
            velocity.x *= config.bounds_damping;
        }
        if position.x + velocity.x > bounds.width {
            velocity.x *= config.bounds_damping;
        }
        if position.y + velocity.y < 0.0 {
            velocity.y *= config.bounds_damping;
        }
        if position.y + velocity.y > bounds.height {
            velocity.y *= config.bounds_damping;
        }

        velocity
    }

    pub fn limit_speed(velocity: Vector2D, config: &RuleConfig) -> Vector2D {
        velocity.limit(config.speed_limit)
    }
}

/// Velocity of `agents[index]` for this tick, reading every other agent as it
/// currently stands in the slice.
fn next_velocity(
    agents: &[Agent],
    index: usize,
    attractor: Vector2D,
    bounds: Bounds,
    config: &RuleConfig,
) -> Vector2D {
    let agent = &agents[index];
    let others = || agents[..index].iter().chain(agents[index + 1..].iter());
    let position = agent.position;

    let mut velocity = agent.velocity;
    velocity = behavior::cohesion(position, velocity, others(), config);
    velocity = behavior::separation(position, velocity, others(), config);
    // Alignment is inert: the neighbour velocity average never reaches the velocity.
    velocity = behavior::center_pull(position, velocity, attractor, config);
    // Damping must come before the speed limit.
    velocity = behavior::damp_bounds(position, velocity, bounds, config);
    behavior::limit_speed(velocity, config)
}

/// Advances every agent by one tick, in place and in slice order.
///
/// Agents earlier in the slice have already moved when later ones are
/// evaluated; nothing is snapshotted between agents.
pub fn step_agents(
    agents: &mut [Agent],
    attractor: Vector2D,
    bounds: Bounds,
    config: &RuleConfig,
) -> Result<(), StepError> {
    if agents.len() < MIN_POPULATION {
        return Err(StepError::PopulationTooSmall { len: agents.len() });
    }

    for index in 0..agents.len() {
        let velocity = next_velocity(agents, index, attractor, bounds, config);
        agents[index].advance(velocity);
    }

    Ok(())
}

/// A fixed-capacity flock for embedded (no_std) environments
pub struct Flock<const N: usize> {
    agents: heapless::Vec<Agent, N>,
    bounds: Bounds,
    attractor: Vector2D,
    config: RuleConfig,
    tick_count: u64,
}

impl<const N: usize> Flock<N> {
    pub fn new(bounds: Bounds, config: RuleConfig) -> Self {
        Self {
            agents: heapless::Vec::new(),
            bounds,
            attractor: bounds.center(),
            config,
            tick_count: 0,
        }
    }

    pub fn with_attractor(mut self, attractor: Vector2D) -> Self {
        self.attractor = attractor;
        self
    }

    /// Hands the agent back when the flock is full.
    pub fn add_agent(&mut self, agent: Agent) -> Result<(), Agent> {
        self.agents.push(agent)
    }

    pub fn step(&mut self) -> Result<(), StepError> {
        step_agents(&mut self.agents, self.attractor, self.bounds, &self.config)?;
        self.tick_count += 1;
        Ok(())
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}

/// The flock for std environments.
///
/// Owns the population exclusively. Read agent state between calls to
/// [`FlockSimulation::step`], never during one.
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct FlockSimulation {
    agents: Vec<Agent>,
    bounds: Bounds,
    attractor: Vector2D,
    config: RuleConfig,
    tick_count: u64,
}

#[cfg(feature = "std")]
impl FlockSimulation {
    /// Creates a simulation attracted to the center of `bounds`.
    pub fn new(bounds: Bounds, agents: Vec<Agent>) -> Self {
        Self {
            agents,
            bounds,
            attractor: bounds.center(),
            config: RuleConfig::default(),
            tick_count: 0,
        }
    }

    /// Creates a simulation of `count` agents seeded from `rng`.
    pub fn seeded<R: rand::Rng + ?Sized>(bounds: Bounds, count: usize, rng: &mut R) -> Self {
        Self::new(bounds, seed::random_population(rng, bounds, count))
    }

    pub fn with_attractor(mut self, attractor: Vector2D) -> Self {
        self.attractor = attractor;
        self
    }

    pub fn with_config(mut self, config: RuleConfig) -> Self {
        self.config = config;
        self
    }

    /// Advances the flock by one tick.
    ///
    /// Fails without touching any state when fewer than [`MIN_POPULATION`]
    /// agents are present.
    pub fn step(&mut self) -> Result<(), StepError> {
        step_agents(&mut self.agents, self.attractor, self.bounds, &self.config)?;
        self.tick_count += 1;
        Ok(())
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn attractor(&self) -> Vector2D {
        self.attractor
    }

    pub fn config(&self) -> &RuleConfig {
        &self.config
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

/// Random initial populations.
#[cfg(feature = "std")]
pub mod seed {
    use super::*;
    use rand::Rng;

    /// An agent placed in the `bounds / 8` box whose top-left corner is the
    /// world center, with velocity components in `[-5, 5)` and a light,
    /// opaque colour.
    pub fn random_agent<R: Rng + ?Sized>(rng: &mut R, bounds: Bounds) -> Agent {
        let position = Vector2D::new(
            bounds.width * rng.gen::<f32>() / 8.0 + bounds.width / 2.0,
            bounds.height * rng.gen::<f32>() / 8.0 + bounds.height / 2.0,
        );
        let velocity = Vector2D::new(
            rng.gen::<f32>() * 10.0 - 5.0,
            rng.gen::<f32>() * 10.0 - 5.0,
        );
        let color = Color::new(
            rng.gen::<f32>() / 2.0 + 0.5,
            rng.gen::<f32>() / 2.0 + 0.5,
            rng.gen::<f32>() / 2.0 + 0.5,
            1.0,
        );

        Agent::new(position, velocity, color)
    }

    pub fn random_population<R: Rng + ?Sized>(
        rng: &mut R,
        bounds: Bounds,
        count: usize,
    ) -> Vec<Agent> {
        (0..count).map(|_| random_agent(rng, bounds)).collect()
    }
}
