//! Interactive selection-list demo
//!
//! Feeds stdin lines to a filter engine over a small account list and
//! prints the committed result after each one. Plain text substring-matches;
//! `/f`-prefixed lines use the expression language (`/fbalance > 500`,
//! `/fsites.name : harbor`). An empty line shows everything; Ctrl-D exits.
//!
//! ```bash
//! cargo run --example selection_demo
//! ```

use serde_json::{Value, json};
use siftr::{EngineConfig, FilterEngine};
use std::io::{self, BufRead, Write};
use std::time::Duration;

fn records() -> Vec<Value> {
    vec![
        json!({
            "id": "A1", "name": "Arendal Fisk", "notes": "north region",
            "balance": 2500.0, "opened": "2023-05-12",
            "sites": [{"name": "North Harbor"}, {"name": "Cold Store"}]
        }),
        json!({
            "id": "B2", "name": "Bergen Verft", "notes": "south region",
            "balance": 800.0, "opened": "2024-01-03",
            "sites": [{"name": "South Quay"}]
        }),
        json!({
            "id": "C3", "name": "Drammen Industri", "notes": "pending review",
            "balance": 120.5, "opened": "2024-11-20",
            "sites": []
        }),
        json!({
            "id": "D4", "name": "Norheim Bygg", "notes": "closed last year",
            "balance": 0.0, "opened": "2022-08-30",
            "sites": [{"name": "Depot West"}]
        }),
    ]
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = EngineConfig {
        debounce_ms: 50,
        ..EngineConfig::default()
    };
    let debounce = config.debounce();
    let engine = FilterEngine::with_config(records(), config)?;

    println!("Query (plain substring, or /f<expression>); Ctrl-D to exit.");
    print!("> ");
    io::stdout().flush()?;

    for line in io::stdin().lock().lines() {
        let line = line?;
        engine.set_query(&line);

        // Wait out the debounce window, then the dispatch
        std::thread::sleep(debounce + Duration::from_millis(50));
        while engine.is_busy() {
            std::thread::sleep(Duration::from_millis(5));
        }

        let result = engine.current_result();
        println!("{} match(es)", engine.match_count());
        for record in result.iter() {
            let id = record.get("id").and_then(Value::as_str).unwrap_or("?");
            let name = record.get("name").and_then(Value::as_str).unwrap_or("?");
            let notes = record.get("notes").and_then(Value::as_str).unwrap_or("");
            println!("  {id}  {name}  ({notes})");
        }
        print!("> ");
        io::stdout().flush()?;
    }

    Ok(())
}
