use crate::entities::inventory::Category;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_STACK_MAX: u32 = 200;

#[derive(Debug)]
pub struct AppConfig {
    pub config_path: PathBuf,
    pub script_path: Option<PathBuf>,
    pub settings: Settings,
}

impl AppConfig {
    pub fn from_args(args: &[String]) -> Result<Self, String> {
        if args.len() < 2 {
            return Err("usage: inventory <config.yaml> [command-script]".to_string());
        }

        let config_path = Path::new(&args[1]).to_path_buf();
        let script_path = if args.len() > 2 {
            Some(Path::new(&args[2]).to_path_buf())
        } else {
            None
        };
        let mut settings = Settings::load(&config_path)?;
        if let Some(tenant) = env_override("INVENTORY_TENANT") {
            settings.tenant = tenant;
        }
        if let Some(filter) = env_override("INVENTORY_LOG") {
            settings.log_filter = filter;
        }
        Ok(Self {
            config_path,
            script_path,
            settings,
        })
    }
}

fn env_override(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub tenant: String,
    pub log_filter: String,
    pub stack_max: u32,
    pub capacities: Capacities,
    pub template_cache_size: usize,
    pub templates: Vec<TemplateOverride>,
    pub portals: Vec<PortalEntry>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tenant: "default".to_string(),
            log_filter: "info".to_string(),
            stack_max: DEFAULT_STACK_MAX,
            capacities: Capacities::default(),
            template_cache_size: 1024,
            templates: Vec::new(),
            portals: Vec::new(),
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, String> {
        let data = std::fs::read_to_string(path)
            .map_err(|err| format!("config read failed for {}: {}", path.display(), err))?;
        Self::parse(&data)
            .map_err(|err| format!("config parse failed for {}: {}", path.display(), err))
    }

    pub fn parse(data: &str) -> Result<Self, String> {
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings: Settings = serde_yaml::from_str(data).map_err(|err| err.to_string())?;
        if settings.stack_max == 0 {
            return Err("stack_max must be at least 1".to_string());
        }
        Ok(settings)
    }
}

/// Default container capacities, used when the store has no override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Capacities {
    pub equip: u32,
    #[serde(rename = "use")]
    pub consume: u32,
    pub setup: u32,
    pub etc: u32,
    pub cash: u32,
}

impl Default for Capacities {
    fn default() -> Self {
        Self {
            equip: 24,
            consume: 24,
            setup: 24,
            etc: 24,
            cash: 96,
        }
    }
}

impl Capacities {
    pub fn get(&self, category: Category) -> u32 {
        match category {
            Category::Equip => self.equip,
            Category::Use => self.consume,
            Category::Setup => self.setup,
            Category::Etc => self.etc,
            Category::Cash => self.cash,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TemplateOverride {
    pub id: u32,
    #[serde(default)]
    pub slot_max: Option<u32>,
    #[serde(default)]
    pub cash: bool,
    /// Position names, e.g. `["Ring1", "Ring2"]`. Empty keeps the bucket rule.
    #[serde(default)]
    pub positions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PortalEntry {
    pub map: u32,
    pub portal: u32,
    pub x: i16,
    pub y: i16,
}
