/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use clap::{Parser, ValueEnum};
use federator::operators::Operator;
use federator::optimizer::{OptimizerConfig, OptimizerFactory, QueryModel, Strategy};
use federator::source_selection::{SourceStatistics, VoidStatistics};
use federator::{FederationError, FederationResult};
use serde::Deserialize;
use shared::parser::{parse_query_line, parse_triple_pattern, QueryLine};
use shared::{FilterExpression, Source, Term, TriplePattern};
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "federator-cli",
    version = "0.1.0",
    author = "Volodymyr Kadzhaia <vkadzhaia@gmail.com>",
    author = "Pieter Bonte <pieter.bonte@kuleuven.be>",
    about = "Plans the join order of a query federated over several sources",
    long_about = "Federator CLI - selects the sources able to answer each triple pattern of a query and orders the joins by estimated cost. Source statistics come from a JSON federation description or are gathered from triple files."
)]
struct Args {
    #[arg(short, long, help = "Triple patterns and FILTER lines, one per line", value_name = "FILE")]
    query: String,

    #[arg(short, long, help = "JSON federation description", value_name = "FILE")]
    federation: Option<String>,

    #[arg(short, long, help = "Gather statistics for a source from a triple file", value_name = "NAME=FILE")]
    data: Vec<String>,

    #[arg(short, long, help = "Override the configured strategy", value_enum)]
    strategy: Option<StrategyArg>,
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    Greedy,
    DynamicProgramming,
    Auto,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Greedy => Strategy::Greedy,
            StrategyArg::DynamicProgramming => Strategy::DynamicProgramming,
            StrategyArg::Auto => Strategy::Auto,
        }
    }
}

/// Sources with their statistics plus optimizer settings
#[derive(Deserialize, Default)]
#[serde(default)]
struct FederationDescription {
    sources: VoidStatistics,
    optimizer: OptimizerConfig,
}

fn load_federation(path: Option<&str>) -> FederationResult<FederationDescription> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)?;
            let description: FederationDescription = serde_json::from_str(&json)?;
            description.optimizer.validate()?;
            Ok(description)
        }
        None => Ok(FederationDescription::default()),
    }
}

/// Reads `NAME=FILE` and summarizes the triples of FILE
fn gather_source(entry: &str) -> FederationResult<(Source, SourceStatistics)> {
    let (name, path) = entry
        .split_once('=')
        .ok_or_else(|| FederationError::Config(format!("expected NAME=FILE, got {}", entry)))?;
    let content = std::fs::read_to_string(path)?;

    let mut triples: Vec<(String, String, String)> = Vec::new();
    for line in content.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (_, (s, p, o)) = parse_triple_pattern(line)
            .map_err(|e| FederationError::Parse(format!("{}: {}", line, e)))?;
        match (s, p, o) {
            (Term::Constant(s), Term::Constant(p), Term::Constant(o)) => triples.push((s, p, o)),
            _ => {
                return Err(FederationError::Parse(format!(
                    "data triples cannot hold variables: {}",
                    line
                )))
            }
        }
    }

    println!("Gathered {} triple(s) for source {}", triples.len(), name);
    Ok((Source::new(name), SourceStatistics::gather(&triples)))
}

fn load_query(path: &str) -> FederationResult<(Vec<TriplePattern>, Vec<FilterExpression>)> {
    let content = std::fs::read_to_string(path)?;
    let mut patterns = Vec::new();
    let mut filters = Vec::new();
    for line in content.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match parse_query_line(line).map_err(FederationError::Parse)? {
            QueryLine::Pattern(pattern) => patterns.push(pattern),
            QueryLine::Filter(filter) => filters.push(filter),
        }
    }
    if patterns.is_empty() {
        return Err(FederationError::EmptyQuery);
    }
    Ok((patterns, filters))
}

fn print_plan(operator: &Operator<TriplePattern, FilterExpression>, depth: usize) {
    let indent = "  ".repeat(depth);
    match operator {
        Operator::AccessPlan(plan) => {
            let sources: Vec<&str> = plan.sources.iter().map(Source::name).collect();
            println!(
                "{}{} {} {} @ [{}]",
                indent,
                plan.pattern.0,
                plan.pattern.1,
                plan.pattern.2,
                sources.join(", ")
            );
        }
        Operator::Join(join) => {
            println!("{}{:?} {:?} join", indent, join.execution, join.algorithm);
            print_plan(&join.left, depth + 1);
            print_plan(&join.right, depth + 1);
        }
    }
    for filter in operator.filters() {
        println!("{}  FILTER({})", indent, filter);
    }
}

fn run(args: Args) -> FederationResult<()> {
    let mut description = load_federation(args.federation.as_deref())?;
    for entry in &args.data {
        let (source, statistics) = gather_source(entry)?;
        description.sources.insert(source, statistics);
    }
    if let Some(strategy) = args.strategy {
        description.optimizer.strategy = strategy.into();
    }

    let (patterns, filters) = load_query(&args.query)?;
    let factory = OptimizerFactory::new(description.optimizer, Arc::new(description.sources));

    let groups = factory.source_selector().select(&patterns)?;
    for (sources, group) in &groups {
        let names: Vec<&str> = sources.iter().map(Source::name).collect();
        println!("[{}]: {} pattern(s)", names.join(", "), group.len());
    }

    let mut model = factory.query_model(&groups, &filters)?;
    let optimizer = factory.create(model.base_relation_count())?;
    optimizer.optimize(&mut model)?;

    let root = model
        .root()
        .ok_or(FederationError::PlanIncomplete {
            remaining: model.base_relation_count(),
        })?;
    let cost = factory.cost_calculator()?.cost(root)?;

    println!("Plan ({}):", optimizer.name());
    print_plan(root, 1);
    println!("Estimated cost: {:.2}", cost);
    Ok(())
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
