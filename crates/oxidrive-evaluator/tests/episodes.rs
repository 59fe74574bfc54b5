use std::sync::Arc;

use oxidrive_engine::{
    Action, AgentConfig, Environment, OvalTrack, SensorConfig, SensorReadings, SimulationConfig,
    Vec2,
};
use oxidrive_evaluator::{
    episode::{Episode, EpisodeEnd, EpisodeLimits, NoopObserver},
    policy::{
        ConstantPolicy, FnPolicy, Policy, PolicyError, PolicyOutput, RandomPolicy,
        WallFollowerPolicy,
    },
    report::{EpisodeReport, Generation},
};

/// 40×12 corridor between a double wall on the left and a wall at column 30.
const CORRIDOR: [&str; 12] = [
    "########################################",
    "##                            #        #",
    "##                            #        #",
    "##                            #        #",
    "##                            #        #",
    "##                            #        #",
    "##                            #        #",
    "##                            #        #",
    "##                            #        #",
    "##                            #        #",
    "##                            #        #",
    "########################################",
];

/// A 4×4 vehicle crawling one unit per tick.
fn small_config() -> SimulationConfig {
    SimulationConfig {
        agent: AgentConfig {
            width: 4.0,
            height: 4.0,
            start_position: Vec2::new(3.0, 4.0),
            start_angle: 0.0,
            initial_speed: 1.0,
            min_speed: 1.0,
            speed_step: 1.0,
            turn_step: 90.0,
            margin_min: 1.0,
            margin_max: 5.0,
        },
        sensor: SensorConfig {
            max_range: 30,
            reading_scale: 3,
            ..SensorConfig::default()
        },
    }
}

fn corridor() -> Arc<Environment> {
    Arc::new(Environment::from_rows(CORRIDOR).unwrap())
}

#[test]
fn corridor_agent_crawls_into_the_wall() {
    // SlowDown at the speed floor is a no-op, so the agent keeps crawling east
    let mut episode: Episode<_, f64> = Episode::with_population(
        corridor(),
        small_config(),
        [ConstantPolicy(Action::SlowDown)],
    );
    let outcome = episode.run(&mut NoopObserver);

    // the front corners sit at trunc(center.x + 1.73); center.x = 5 + tick
    assert_eq!(outcome.end, EpisodeEnd::AllCrashed);
    assert_eq!(outcome.ticks, 24);
    let agent = &episode.agents()[0];
    assert_eq!(agent.ticks_survived(), 24);
    // heading 0 leaves sin(2pi) drift on y, so y truncates to 3 and center.y is 5
    assert_eq!(agent.position().x, 27.0);
    let y = agent.position().y;
    assert!(y < 4.0 && (y - 4.0).abs() < 1e-9, "{y}");
    assert_eq!(agent.center(), Vec2::new(29.0, 5.0));
    // rewards tick / 2 for ticks 1..=23
    assert_eq!(episode.fitness(), [138.0]);
}

#[test]
fn policies_see_the_previous_tick_readings() {
    let mut seen = vec![];
    let policy = FnPolicy(|r: &SensorReadings| -> Result<PolicyOutput, PolicyError> {
        seen.push(*r);
        Ok(Action::SlowDown.into())
    });
    let mut episode: Episode<_, f64> =
        Episode::with_population(corridor(), small_config(), [policy]);
    let outcome = episode.run(&mut NoopObserver);
    drop(episode);

    assert_eq!(seen.len(), 24);
    assert_eq!(seen[0], SensorReadings::default());
    // forward wall distance shrinks by one every tick
    assert_eq!(seen[1][2], 8);
    assert!(seen[1..].windows(2).all(|w| w[1][2] <= w[0][2]));
    assert_eq!(seen.last().unwrap()[2], 0);
    assert_eq!(outcome.ticks, 24);
}

#[test]
fn turning_agent_crashes_into_the_far_wall() {
    // turn_step is 90 degrees: two left turns reverse the heading
    let turner = FnPolicy({
        let mut tick = 0;
        move |_: &SensorReadings| -> Result<PolicyOutput, PolicyError> {
            tick += 1;
            let action = if tick == 10 || tick == 11 {
                Action::TurnLeft
            } else {
                Action::SlowDown
            };
            Ok(action.into())
        }
    });
    let policies: Vec<Box<dyn Policy>> = vec![
        Box::new(ConstantPolicy(Action::SlowDown)),
        Box::new(turner),
    ];
    let mut episode: Episode<_, f64> =
        Episode::with_population(corridor(), small_config(), policies).with_limits(
            EpisodeLimits {
                max_ticks: Some(200),
            },
        );
    let outcome = episode.run(&mut NoopObserver);

    assert_eq!(outcome.end, EpisodeEnd::AllCrashed);
    assert_eq!(outcome.ticks, 24);
    let [straight, turner] = episode.agents() else {
        panic!("two agents expected");
    };
    assert!(!straight.is_alive());
    assert!(!turner.is_alive());
    assert_eq!(turner.angle(), 180.0);
    // heads back west from x = 12 and touches the double wall on tick 21
    assert_eq!(turner.ticks_survived(), 21);
    assert_eq!(turner.position().x, 1.0);
}

#[test]
fn oval_track_episodes_are_reproducible() {
    fn run_once() -> EpisodeReport {
        let environment = Arc::new(OvalTrack::default().to_environment().unwrap());
        let mut policies: Vec<Box<dyn Policy>> = vec![Box::new(WallFollowerPolicy::default())];
        policies.extend((0..5).map(|seed| Box::new(RandomPolicy::new(seed)) as Box<dyn Policy>));
        let mut episode: Episode<_, f64> =
            Episode::with_population(environment, SimulationConfig::default(), policies)
                .with_limits(EpisodeLimits {
                    max_ticks: Some(2000),
                });
        let outcome = episode.run(&mut NoopObserver);
        EpisodeReport::from_episode(Generation(0), &outcome, &episode)
    }

    let first = run_once();
    assert!(first.ticks <= 2000);
    assert_eq!(first.fitness.len(), 6);
    assert!(first.fitness.iter().all(|f| f.is_finite() && *f >= 0.0));
    assert_eq!(first.policy_failures, 0);
    if first.end == EpisodeEnd::AllCrashed {
        assert!(first.agents.iter().all(|a| !a.alive));
    }

    let second = run_once();
    assert_eq!(first, second);
}
