use anyhow::Context;
use equigen::config::{derive_run_shape, ConfigManager, SolverConfig};
use equigen::engines::evaluation::{Equation, MevalEvaluator};
use equigen::engines::generation::{ConsoleProgress, SolverEngine};
use std::io::{self, BufRead};
use std::str::FromStr;
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut defaults = SolverConfig::default();
    if let Some(path) = config_path_from_args()? {
        let manager = ConfigManager::new();
        manager
            .load_from_file(&path)
            .with_context(|| format!("loading config from {}", path))?;
        defaults = manager.get().solver;
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    let equation = prompt_equation(&mut lines)?;

    let advanced = prompt(&mut lines, "Use advanced settings? [y/N]")?
        .trim()
        .eq_ignore_ascii_case("y");

    let (population_size, generations, mutation_rate, crossover_rate) = if advanced {
        let budget: usize = prompt_parse(
            &mut lines,
            "Enter a total candidate budget (0 to set size and generations directly):",
            0,
        )?;
        let (population_size, generations) = if budget > 0 {
            let shape = derive_run_shape(budget);
            println!(
                "Derived population size {} over {} generations.",
                shape.0, shape.1
            );
            shape
        } else {
            prompt_run_shape(&mut lines, &defaults)?
        };
        let mutation_rate = prompt_rate(
            &mut lines,
            "Enter the mutation rate (0.0 - 1.0):",
            defaults.mutation_rate,
        )?;
        let crossover_rate = prompt_rate(
            &mut lines,
            "Enter the crossover rate (0.0 - 1.0):",
            defaults.crossover_rate,
        )?;
        (population_size, generations, mutation_rate, crossover_rate)
    } else {
        let (population_size, generations) = prompt_run_shape(&mut lines, &defaults)?;
        (
            population_size,
            generations,
            defaults.mutation_rate,
            defaults.crossover_rate,
        )
    };

    let mut params = defaults.to_run_parameters();
    params.population_size = population_size;
    params.generations = generations;
    params.mutation_rate = mutation_rate;
    params.crossover_rate = crossover_rate;

    let engine = SolverEngine::new(params, Arc::new(MevalEvaluator))?;
    let progress = ConsoleProgress::new(generations);
    let report = engine.run(&equation, &progress)?;

    println!();
    println!("{}", report);

    Ok(())
}

fn config_path_from_args() -> anyhow::Result<Option<String>> {
    let mut args = std::env::args().skip(1);
    match args.next() {
        None => Ok(None),
        Some(flag) if flag == "--config" => match args.next() {
            Some(path) => Ok(Some(path)),
            None => anyhow::bail!("--config requires a path"),
        },
        Some(other) => anyhow::bail!("unrecognized argument: {}", other),
    }
}

type InputLines<'a> = io::Lines<io::StdinLock<'a>>;

fn read_line(lines: &mut InputLines) -> anyhow::Result<String> {
    match lines.next() {
        Some(line) => Ok(line?),
        None => anyhow::bail!("input closed before the run was configured"),
    }
}

fn prompt(lines: &mut InputLines, message: &str) -> anyhow::Result<String> {
    println!("{}", message);
    read_line(lines)
}

/// Re-prompts until the equation parses; invalid input never aborts.
fn prompt_equation(lines: &mut InputLines) -> anyhow::Result<Equation> {
    loop {
        let raw = prompt(
            lines,
            "Enter the algebraic equation to be solved (e.g., 50 * ((3 * [x]) - 2) + [x] / 3 = 200):",
        )?;
        match Equation::parse(&raw) {
            Ok(equation) => return Ok(equation),
            Err(err) => println!("{}", err),
        }
    }
}

/// Re-prompts until the input parses; an empty line takes the default.
fn prompt_parse<T: FromStr + std::fmt::Display>(
    lines: &mut InputLines,
    message: &str,
    default: T,
) -> anyhow::Result<T> {
    loop {
        let raw = prompt(lines, &format!("{} [{}]", message, default))?;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(default);
        }
        match trimmed.parse::<T>() {
            Ok(value) => return Ok(value),
            Err(_) => println!("Invalid value, try again."),
        }
    }
}

fn prompt_rate(lines: &mut InputLines, message: &str, default: f64) -> anyhow::Result<f64> {
    loop {
        let rate = prompt_parse(lines, message, default)?;
        if (0.0..=1.0).contains(&rate) {
            return Ok(rate);
        }
        println!("Rates must be between 0.0 and 1.0.");
    }
}

fn prompt_run_shape(
    lines: &mut InputLines,
    defaults: &SolverConfig,
) -> anyhow::Result<(usize, usize)> {
    let population_size = prompt_parse(
        lines,
        "Enter the desired population size per generation:",
        defaults.population_size,
    )?;
    let generations = prompt_parse(
        lines,
        "Enter the desired number of generations:",
        defaults.num_generations,
    )?;
    Ok((population_size, generations))
}
