use std::io::{self, BufRead};
use std::process;

use clap::Parser;
use vmregex::ast::parser::{Parser as PatternParser, DEFAULT_NEST_LIMIT};
use vmregex::executor::DEFAULT_THREAD_LIMIT;
use vmregex::{Regex, RegexBuilder};

/// Finds the leftmost match of a regular expression in each input.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Pattern to compile.
    pattern: String,

    /// Strings to search. Lines from stdin are used when none are given.
    inputs: Vec<String>,

    /// Print the syntax tree of the pattern.
    #[arg(long)]
    ast: bool,

    /// Print the compiled program.
    #[arg(long)]
    dump: bool,

    /// Skip the bytecode optimizer.
    #[arg(long)]
    no_optimize: bool,

    /// Maximum nesting of groups and repetitions.
    #[arg(long, default_value_t = DEFAULT_NEST_LIMIT)]
    nest_limit: u32,

    /// Maximum number of pending VM threads per match attempt.
    #[arg(long, default_value_t = DEFAULT_THREAD_LIMIT)]
    thread_limit: usize,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let regex = RegexBuilder::new(&args.pattern)
        .nest_limit(args.nest_limit)
        .thread_limit(args.thread_limit)
        .optimize(!args.no_optimize)
        .build()?;

    if args.ast {
        let ast = PatternParser::with_nest_limit(args.pattern.clone(), args.nest_limit).parse()?;
        println!("{}", ast);
    }
    if args.dump {
        print!("{}", regex.program());
    }

    let mut matched = false;
    if args.inputs.is_empty() {
        for line in io::stdin().lock().lines() {
            matched |= report(&regex, &line?);
        }
    } else {
        for input in &args.inputs {
            matched |= report(&regex, input);
        }
    }

    if !matched {
        process::exit(1);
    }
    Ok(())
}

fn report(regex: &Regex, input: &str) -> bool {
    match regex.find(input) {
        Ok(Some(m)) => {
            println!("{} => match [{}..{}] {:?}", input, m.start(), m.end(), m.as_str());
            true
        }
        Ok(None) => {
            println!("{} => no match", input);
            false
        }
        Err(err) => {
            eprintln!("{} => error: {}", input, err);
            false
        }
    }
}
