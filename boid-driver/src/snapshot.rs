use boid_core::{Agent, FlockSimulation};
use boid_shared::{AgentState, FlockSnapshot, Position, Rgba};

pub fn agent_state(agent: &Agent) -> AgentState {
    let position = agent.position();
    let color = agent.color();

    AgentState {
        position: Position::new(position.x, position.y),
        heading: agent.heading(),
        speed: agent.speed(),
        color: Rgba {
            r: color.r,
            g: color.g,
            b: color.b,
            a: color.a,
        },
    }
}

/// Captures the flock between ticks.
pub fn snapshot(simulation: &FlockSimulation) -> FlockSnapshot {
    FlockSnapshot {
        tick: simulation.tick_count(),
        agents: simulation.agents().iter().map(agent_state).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boid_core::{Bounds, Color, Vector2D};

    #[test]
    fn test_agent_state_copies_presentation_fields() {
        let agent = Agent::new(
            Vector2D::new(1.0, 2.0),
            Vector2D::new(0.0, 3.0),
            Color::new(0.5, 0.6, 0.7, 1.0),
        );

        let state = agent_state(&agent);
        assert_eq!(state.position, Position::new(1.0, 2.0));
        assert_eq!(state.heading, agent.heading());
        assert_eq!(state.speed, 3.0);
        assert_eq!(state.color.g, 0.6);
    }

    #[test]
    fn test_snapshot_tracks_tick() {
        let agents = vec![
            Agent::new(Vector2D::new(10.0, 10.0), Vector2D::zero(), Color::WHITE),
            Agent::new(Vector2D::new(50.0, 10.0), Vector2D::zero(), Color::WHITE),
        ];
        let mut flock = FlockSimulation::new(Bounds::new(100.0, 100.0), agents);
        flock.step().unwrap();

        let snap = snapshot(&flock);
        assert_eq!(snap.tick, 1);
        assert_eq!(snap.agents.len(), 2);
    }
}
