use clap::Parser;
use engine::api::{simulate_fight_many, FightConfig, Policy};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "simulate")]
#[command(about = "Monte Carlo sim: many encounters vs one opponent")]
struct Args {
    /// Built-in opponent id
    #[arg(long, default_value = "void_drone")]
    opponent: String,

    /// Opponent JSON file (overrides --opponent)
    #[arg(long)]
    opponent_file: Option<String>,

    /// Player JSON file (defaults to the built-in scavenger)
    #[arg(long)]
    player_file: Option<String>,

    /// Rules YAML/JSON file
    #[arg(long)]
    rules: Option<String>,

    /// Number of trials
    #[arg(long, default_value_t = 1000)]
    trials: u32,

    /// Policy: blade | ranged | guard | mixed | finisher
    #[arg(long, default_value = "mixed")]
    policy: String,

    /// Use the hold-to-commit path
    #[arg(long, default_value_t = false)]
    commit: bool,

    /// RNG base seed (trial i uses seed+i)
    #[arg(long, default_value_t = 12345)]
    seed: u64,

    /// Safety cap on player turns per trial
    #[arg(long, default_value_t = 200)]
    max_turns: u32,

    /// Print JSON instead of a summary line
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    opponent: &'a str,
    policy: &'a str,
    commit: bool,
    trials: u32,
    player_win_rate: f64,
    opponent_win_rate: f64,
    draw_rate: f64,
    avg_turns: f64,
}

fn to_policy(s: &str) -> anyhow::Result<Policy> {
    Ok(match s.to_lowercase().as_str() {
        "blade" => Policy::Blade,
        "ranged" => Policy::Ranged,
        "guard" => Policy::Guard,
        "mixed" => Policy::Mixed,
        "finisher" => Policy::Finisher,
        other => anyhow::bail!("unknown policy '{}'", other),
    })
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let policy = to_policy(&args.policy)?;
    let stats = simulate_fight_many(
        FightConfig {
            opponent_id: Some(args.opponent.clone()),
            opponent_path: args.opponent_file.clone(),
            player_path: args.player_file.clone(),
            rules_path: args.rules.clone(),
            policy,
            commit: args.commit,
            seed: Some(args.seed),
            max_turns: Some(args.max_turns),
            ..Default::default()
        },
        args.trials,
    )?;

    let rate = |n: u32| if stats.samples == 0 { 0.0 } else { f64::from(n) / f64::from(stats.samples) };
    let report = Report {
        opponent: args.opponent_file.as_deref().unwrap_or(&args.opponent),
        policy: &args.policy,
        commit: args.commit,
        trials: stats.samples,
        player_win_rate: rate(stats.player_wins),
        opponent_win_rate: rate(stats.opponent_wins),
        draw_rate: rate(stats.draws),
        avg_turns: stats.avg_turns,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "player vs {} ({}{}): win {:.1}% / loss {:.1}% / draw {:.1}% over {} trials, avg {:.1} turns",
            report.opponent,
            report.policy,
            if report.commit { ", committed" } else { "" },
            report.player_win_rate * 100.0,
            report.opponent_win_rate * 100.0,
            report.draw_rate * 100.0,
            report.trials,
            report.avg_turns
        );
    }
    Ok(())
}
