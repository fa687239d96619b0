//! Relief Bot entry point
//!
//! Reads one JSON world snapshot per stdin line and answers one control line per
//! snapshot. `--demo [seed]` instead drives both teams through a seeded synthetic
//! match so the decision loop can be watched in the log.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::f32::consts::PI;
    use std::io::{self, BufRead, Write};
    use std::path::PathBuf;

    use anyhow::{Context, Result};
    use clap::Parser;
    use glam::Vec3;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use relief_bot::consts::*;
    use relief_bot::sim::{BallInput, CarInput, Rotator, Team, WorldSnapshot};
    use relief_bot::{AgentRegistry, ControlOutput, Settings};

    const DEFAULT_SEED: u64 = 42;
    const DEMO_TICKS: u32 = 600;

    #[derive(Parser, Debug)]
    #[command(name = "relief-bot")]
    #[command(about = "Answer car-soccer world snapshots with control outputs", long_about = None)]
    pub struct Args {
        /// Settings JSON file (defaults are used when missing or invalid)
        #[arg(long)]
        pub settings: Option<PathBuf>,

        /// Team the stdin snapshots are answered for
        #[arg(long, default_value = "blue")]
        pub team: String,

        /// Print the host's integer vector instead of JSON
        #[arg(long)]
        pub vector: bool,

        /// Play a synthetic match instead of reading stdin, with an optional seed
        #[arg(long, num_args = 0..=1, value_name = "SEED")]
        pub demo: Option<Option<u64>>,
    }

    impl Args {
        /// Seed of the demo match, if one was asked for
        pub fn demo_seed(&self) -> Option<u64> {
            self.demo.map(|seed| seed.unwrap_or(DEFAULT_SEED))
        }
    }

    fn print_output(out: &mut impl Write, output: &ControlOutput, vector: bool) -> io::Result<()> {
        if vector {
            let values: Vec<String> = output.to_array().iter().map(i32::to_string).collect();
            writeln!(out, "{}", values.join(" "))
        } else {
            match serde_json::to_string(output) {
                Ok(json) => writeln!(out, "{json}"),
                Err(e) => {
                    log::warn!("Could not encode output: {e}");
                    writeln!(out, "{{}}")
                }
            }
        }
    }

    /// Answer every snapshot line on stdin
    fn run_stdin(registry: &AgentRegistry, args: &Args) -> io::Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout().lock();
        for line in stdin.lock().lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let output = registry.output_for(&line, &args.team);
            print_output(&mut stdout, &output, args.vector)?;
            stdout.flush()?;
        }
        Ok(())
    }

    /// Kickoff-like positions with a little noise so every seed plays differently
    fn demo_snapshot(rng: &mut Pcg32, time: f32) -> WorldSnapshot {
        let ball = BallInput {
            position: Vec3::new(
                rng.random_range(-SIDE_WALL * 0.5..SIDE_WALL * 0.5),
                rng.random_range(-BACK_WALL * 0.5..BACK_WALL * 0.5),
                rng.random_range(BALL_RADIUS..CEILING * 0.5),
            ),
            velocity: Vec3::new(
                rng.random_range(-20.0..20.0),
                rng.random_range(-30.0..30.0),
                rng.random_range(-5.0..15.0),
            ),
        };
        let car = |team: Team, rng: &mut Pcg32| {
            let sign = team.own_goal_sign();
            CarInput {
                team,
                position: Vec3::new(rng.random_range(-20.0..20.0), sign * 60.0, BASE_CAR_Z),
                velocity: Vec3::ZERO,
                rotation: Rotator {
                    pitch: 0.0,
                    yaw: -sign * PI / 2.0,
                    roll: 0.0,
                },
                boost: rng.random_range(0.0..100.0),
                has_wheel_contact: true,
            }
        };
        WorldSnapshot {
            time,
            ball,
            cars: vec![car(Team::Blue, rng), car(Team::Orange, rng)],
            player_index: 0,
        }
    }

    /// Feed both bots a fresh synthetic scenario every second of game time
    fn run_demo(registry: &AgentRegistry, seed: u64, vector: bool) -> io::Result<()> {
        log::info!("Demo with seed {seed}");
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut stdout = io::stdout().lock();
        let mut snapshot = demo_snapshot(&mut rng, 0.0);

        for tick in 0..DEMO_TICKS {
            let time = tick as f32 * SIM_DT;
            if tick % 60 == 0 {
                snapshot = demo_snapshot(&mut rng, time);
            }
            snapshot.time = time;

            for (index, team) in [Team::Blue, Team::Orange].into_iter().enumerate() {
                snapshot.player_index = index;
                match registry.output_for_snapshot(&snapshot, team) {
                    Ok(output) => print_output(&mut stdout, &output, vector)?,
                    Err(e) => log::warn!("[{}] Demo tick {tick} rejected: {e}", team.as_str()),
                }
            }
        }
        Ok(())
    }

    pub fn run() -> Result<()> {
        let args = Args::parse();
        let settings = match &args.settings {
            Some(path) => Settings::load(path),
            None => Settings::default(),
        };
        log::info!(
            "Relief Bot starting ({} prediction, {:.1}s horizon)",
            settings.quality.as_str(),
            settings.horizon
        );

        let registry = AgentRegistry::new(settings);
        match args.demo_seed() {
            Some(seed) => run_demo(&registry, seed, args.vector).context("demo output failed"),
            None => run_stdin(&registry, &args).context("snapshot stream failed"),
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn parse(args: &[&str]) -> Result<Args, clap::Error> {
            Args::try_parse_from(std::iter::once("relief-bot").chain(args.iter().copied()))
        }

        #[test]
        fn test_parse_defaults() {
            let args = parse(&[]).unwrap();
            assert_eq!(args.team, "blue");
            assert!(args.demo_seed().is_none());
            assert!(args.settings.is_none());
            assert!(!args.vector);
        }

        #[test]
        fn test_parse_demo_seed_is_optional() {
            assert_eq!(parse(&["--demo", "7"]).unwrap().demo_seed(), Some(7));
            let args = parse(&["--demo", "--vector", "--team", "orange"]).unwrap();
            assert_eq!(args.demo_seed(), Some(DEFAULT_SEED));
            assert!(args.vector);
            assert_eq!(args.team, "orange");
        }

        #[test]
        fn test_parse_rejects_unknown() {
            assert!(parse(&["--fast"]).is_err());
            assert!(parse(&["--settings"]).is_err());
            assert!(parse(&["--demo", "soon"]).is_err());
        }

        #[test]
        fn test_demo_snapshots_are_seeded() {
            let a = demo_snapshot(&mut Pcg32::seed_from_u64(3), 0.0);
            let b = demo_snapshot(&mut Pcg32::seed_from_u64(3), 0.0);
            assert_eq!(a.ball, b.ball);
            assert!(a.validate().is_ok());
            assert_eq!(a.cars[1].team, Team::Orange);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();

    if let Err(e) = native::run() {
        log::error!("{e:#}");
        eprintln!("relief-bot: {e:#}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is the wasm surface; there is nothing to run
}
