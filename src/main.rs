use anyhow::{bail, Context, Result};
use std::env;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use equipment_registry::{
    get_all_equipment, insert_equipment_type, load_candidates, load_equipment_types,
    open_database, verify_count, EquipmentService, RegistryConfig,
};

const USAGE: &str = "usage: equipment-registry <init | types <csv> | import <csv> | list | show <id> | delete <id>>";

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "equipment_registry=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = RegistryConfig::from_env()?;
    tracing::info!(
        database = %config.database_path.display(),
        mask_policy = config.mask_policy.as_str(),
        "Loaded configuration"
    );

    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(String::as_str);
    let argument = args.get(2).map(String::as_str);

    match (command, argument) {
        (Some("init"), _) => run_init(&config),
        (Some("types"), Some(path)) => run_types(&config, Path::new(path)),
        (Some("import"), Some(path)) => run_import(&config, Path::new(path)),
        (Some("list"), _) => run_list(&config),
        (Some("show"), Some(id)) => run_show(&config, parse_id(id)?),
        (Some("delete"), Some(id)) => run_delete(&config, parse_id(id)?),
        _ => bail!(USAGE),
    }
}

fn parse_id(raw: &str) -> Result<i64> {
    raw.parse()
        .with_context(|| format!("Invalid record id: {}", raw))
}

fn run_init(config: &RegistryConfig) -> Result<()> {
    let conn = open_database(&config.database_path)?;
    let count = verify_count(&conn)?;
    println!("✓ Database ready ({} equipment records)", count);
    Ok(())
}

fn run_types(config: &RegistryConfig, csv_path: &Path) -> Result<()> {
    let rows = load_equipment_types(csv_path)?;
    let mut conn = open_database(&config.database_path)?;

    let tx = conn.transaction()?;
    for row in &rows {
        let equipment_type = insert_equipment_type(&tx, &row.name, &row.mask)?;
        println!("✓ Type {}: {} ({})", equipment_type.id, equipment_type.name, equipment_type.mask);
    }
    tx.commit()?;

    Ok(())
}

fn run_import(config: &RegistryConfig, csv_path: &Path) -> Result<()> {
    let candidates = load_candidates(csv_path)?;
    tracing::info!(count = candidates.len(), "Loaded candidates");

    let mut conn = open_database(&config.database_path)?;
    let service = EquipmentService::new(config.mask_policy);

    let result = service
        .create_many(&mut conn, &candidates)
        .context("Batch could not be committed")?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    eprintln!("{}", result.summary());

    if !result.committed {
        std::process::exit(2);
    }
    Ok(())
}

fn run_list(config: &RegistryConfig) -> Result<()> {
    let conn = open_database(&config.database_path)?;

    let records = get_all_equipment(&conn)?;
    for record in &records {
        println!(
            "{:>6}  type {:<4}  {:<20}  {}",
            record.id, record.equipment_type_id, record.serial_number, record.description
        );
    }
    println!("✓ {} equipment records", records.len());
    Ok(())
}

fn run_show(config: &RegistryConfig, id: i64) -> Result<()> {
    let conn = open_database(&config.database_path)?;
    let service = EquipmentService::new(config.mask_policy);

    let record = service.show(&conn, id)?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

fn run_delete(config: &RegistryConfig, id: i64) -> Result<()> {
    let conn = open_database(&config.database_path)?;
    let service = EquipmentService::new(config.mask_policy);

    service.delete(&conn, id)?;
    println!("✓ Equipment {} deleted", id);
    Ok(())
}
