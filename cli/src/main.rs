use clap::{Parser, Subcommand, ValueEnum};
use engine::api::{simulate_fight, FightConfig, Policy};
use engine::{matchup, AdMode, Dice, Stance, MAX_SIDES};
use tracing_subscriber::EnvFilter;

const MAX_ROLL_COUNT: i64 = 1000;

#[derive(Copy, Clone, ValueEnum)]
enum Adv {
    Normal,
    Advantage,
    Disadvantage,
}

#[derive(Copy, Clone, ValueEnum)]
enum StanceArg {
    Blade,
    Ranged,
    Guard,
}

#[derive(Copy, Clone, ValueEnum)]
enum PolicyArg {
    Blade,
    Ranged,
    Guard,
    Mixed,
    Finisher,
}

#[derive(Subcommand)]
enum Cmd {
    /// Roll NdS and print each face and the total
    Roll {
        /// RNG seed; OS entropy when omitted
        #[arg(long)]
        seed: Option<u64>,
        /// Number of dice
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=MAX_ROLL_COUNT))]
        count: u32,
        /// Sides per die
        #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_SIDES)))]
        sides: u32,
    },
    /// Roll contested d20s with optional advantage/disadvantage
    Contest {
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, value_enum, default_value_t = Adv::Normal)]
        adv: Adv,
        /// Number of rolls
        #[arg(long, default_value_t = 5)]
        rolls: u32,
    },
    /// Show the matchup between an attacking and a defending stance
    Matchup {
        #[arg(value_enum)]
        attacker: StanceArg,
        #[arg(value_enum)]
        defender: StanceArg,
    },
    /// Auto-play one encounter and print the narrative log
    Fight {
        /// Built-in opponent id
        #[arg(long, default_value = "void_drone")]
        opponent: String,
        /// Opponent JSON file (overrides --opponent)
        #[arg(long)]
        opponent_file: Option<String>,
        /// Built-in player id
        #[arg(long, default_value = "scavenger")]
        player: String,
        /// Player JSON file (overrides --player)
        #[arg(long)]
        player_file: Option<String>,
        /// Rules YAML/JSON file
        #[arg(long)]
        rules: Option<String>,
        #[arg(long, value_enum, default_value_t = PolicyArg::Mixed)]
        policy: PolicyArg,
        /// Submit blade/ranged/guard on the hold-to-commit path
        #[arg(long, default_value_t = false)]
        commit: bool,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, default_value_t = 200)]
        max_turns: u32,
        /// Print the result as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[derive(Parser)]
#[command(name = "dungeon-cli")]
#[command(about = "Dungeon combat engine harness")]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

fn to_mode(a: Adv) -> AdMode {
    match a {
        Adv::Normal => AdMode::Normal,
        Adv::Advantage => AdMode::Advantage,
        Adv::Disadvantage => AdMode::Disadvantage,
    }
}

fn to_stance(s: StanceArg) -> Stance {
    match s {
        StanceArg::Blade => Stance::Blade,
        StanceArg::Ranged => Stance::Ranged,
        StanceArg::Guard => Stance::Guard,
    }
}

fn to_policy(p: PolicyArg) -> Policy {
    match p {
        PolicyArg::Blade => Policy::Blade,
        PolicyArg::Ranged => Policy::Ranged,
        PolicyArg::Guard => Policy::Guard,
        PolicyArg::Mixed => Policy::Mixed,
        PolicyArg::Finisher => Policy::Finisher,
    }
}

fn dice_for(seed: Option<u64>) -> Dice {
    match seed {
        Some(seed) => Dice::from_seed(seed),
        None => Dice::entropy(),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Roll { seed, count, sides } => {
            let mut dice = dice_for(seed);
            let roll = dice.roll_dice(count, sides);
            let faces = roll.rolls.iter().map(|r| r.to_string()).collect::<Vec<_>>().join(" ");
            println!("{}d{}: [{}] total={}", count, sides, faces, roll.total);
        }
        Cmd::Contest { seed, adv, rolls } => {
            let mode = to_mode(adv);
            let mut dice = dice_for(seed);
            for _ in 0..rolls {
                let r = dice.d20(mode);
                println!(
                    "{}{}",
                    engine::log::format_d20_sequence(&r.raw, r.kept),
                    if r.crit { " CRIT" } else { "" }
                );
            }
        }
        Cmd::Matchup { attacker, defender } => {
            let (a, d) = (to_stance(attacker), to_stance(defender));
            println!(
                "{} vs {} => {}",
                a.label(),
                d.label(),
                engine::matchup::mode_label(matchup(a, d))
            );
        }
        Cmd::Fight {
            opponent,
            opponent_file,
            player,
            player_file,
            rules,
            policy,
            commit,
            seed,
            max_turns,
            json,
        } => {
            let res = simulate_fight(FightConfig {
                opponent_id: Some(opponent),
                opponent_path: opponent_file,
                player_id: Some(player),
                player_path: player_file,
                rules_path: rules,
                policy: to_policy(policy),
                commit,
                seed,
                max_turns: Some(max_turns),
            })?;
            if json {
                println!("{}", serde_json::to_string_pretty(&res)?);
            } else {
                for line in &res.log {
                    println!("{}", line);
                }
            }
        }
    }
    Ok(())
}
