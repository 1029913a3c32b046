//! demo_indicator_summary - Count indicator items by category and condition.
//!
//! This demo validates an IOC document against a schema and prints how many
//! indicator items it has for each category (the Context `document`
//! attribute), broken down by condition.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example demo_indicator_summary <schema.xsd> <document.ioc>
//! ```

use std::collections::BTreeMap;
use std::env;
use std::process;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <schema.xsd> <document.ioc>", args[0]);
        process::exit(1);
    }

    let parsed = match openioc_rs::parse(&args[1], &args[2]) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let meta = parsed.metadata();
    println!("IOC:         {}", meta.ioc_id);
    println!("Description: {}", meta.short_description.trim());
    if let Some(modified) = meta.last_modified_time() {
        println!("Modified:    {}", modified.format("%Y-%m-%d %H:%M:%S"));
    }
    println!();

    let mut counts: BTreeMap<&str, BTreeMap<&str, usize>> = BTreeMap::new();
    for item in &parsed {
        *counts
            .entry(item.category.as_str())
            .or_default()
            .entry(item.condition.as_str())
            .or_default() += 1;
    }

    println!("{:<20} {:<14} {:>6}", "Category", "Condition", "Count");
    for (category, conditions) in &counts {
        for (condition, count) in conditions {
            println!("{:<20} {:<14} {:>6}", category, condition, count);
        }
    }
    println!("{:<20} {:<14} {:>6}", "", "total", parsed.len());
}
