pub mod commands;
pub mod config;
pub mod entities;
pub mod inventory;
pub mod persistence;
pub mod telemetry;
pub mod world;

use crate::inventory::templates::{CachingResolver, TemplateCatalog};
use std::io::{BufRead, BufReader, Write};
use std::sync::Arc;

pub use entities::character::{CharacterId, CharacterKey, TenantId};
pub use entities::inventory::Category;
pub use entities::item::{ItemId, Slot, TemplateId};
pub use inventory::error::{InventoryError, InventoryResult};
pub use inventory::service::{CharacterSnapshot, InventoryService, ServiceParts};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScriptSummary {
    pub executed: usize,
    pub failed: usize,
}

pub fn run(args: &[String]) -> Result<(), String> {
    let config = config::AppConfig::from_args(args)?;
    telemetry::logging::init(&config.settings.log_filter)?;
    tracing::info!(
        config = %config.config_path.display(),
        tenant = %config.settings.tenant,
        filter = telemetry::logging::active_filter().unwrap_or_default(),
        "inventory service starting"
    );
    let service = build_service(&config.settings)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let summary = match &config.script_path {
        Some(path) => {
            let file = std::fs::File::open(path)
                .map_err(|err| format!("open script {} failed: {}", path.display(), err))?;
            run_script(&service, BufReader::new(file), &mut out)?
        }
        None => run_script(&service, std::io::stdin().lock(), &mut out)?,
    };
    tracing::info!(
        executed = summary.executed,
        failed = summary.failed,
        "command script finished"
    );
    Ok(())
}

pub fn build_service(settings: &config::Settings) -> Result<InventoryService, String> {
    let catalog = TemplateCatalog::new(settings.stack_max, &settings.templates)?;
    let resolver = CachingResolver::new(catalog, settings.template_cache_size);
    let portals = world::portal::PortalCatalog::new(&settings.portals)?;
    tracing::debug!(
        templates = settings.templates.len(),
        portals = portals.len(),
        "catalogs loaded"
    );
    Ok(InventoryService::new(ServiceParts {
        tenant: TenantId(settings.tenant.clone()),
        store: Arc::new(persistence::store::MemoryStore::new()),
        resolver: Arc::new(resolver),
        portals: Arc::new(portals),
        emitter: Arc::new(inventory::events::LogEmitter),
        capacities: settings.capacities,
    }))
}

/// Executes every line of `script`, writing one result line per command.
/// Command failures are reported inline and do not stop the script.
pub fn run_script(
    service: &InventoryService,
    script: impl BufRead,
    out: &mut impl Write,
) -> Result<ScriptSummary, String> {
    let mut summary = ScriptSummary::default();
    for (index, line) in script.lines().enumerate() {
        let line = line.map_err(|err| format!("read script failed: {}", err))?;
        let number = index + 1;
        let result = match commands::parse_command(&line) {
            Ok(None) => continue,
            Ok(Some(command)) => {
                commands::execute(service, &command).map_err(|err| err.to_string())
            }
            Err(err) => Err(err),
        };
        summary.executed += 1;
        let rendered = match result {
            Ok(rendered) => rendered,
            Err(err) => {
                summary.failed += 1;
                tracing::warn!(line = number, error = %err, "command failed");
                format!("error line {}: {}", number, err)
            }
        };
        writeln!(out, "{}", rendered).map_err(|err| format!("write result failed: {}", err))?;
    }
    Ok(summary)
}
