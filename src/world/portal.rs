use crate::config::PortalEntry;
use std::collections::HashMap;

pub trait PortalService: Send + Sync {
    /// Spawn point of `portal` on `map`, if both exist.
    fn resolve(&self, map: u32, portal: u32) -> Option<(i16, i16)>;
}

#[derive(Debug, Clone, Default)]
pub struct PortalCatalog {
    portals: HashMap<(u32, u32), (i16, i16)>,
}

impl PortalCatalog {
    pub fn new(entries: &[PortalEntry]) -> Result<Self, String> {
        let mut portals = HashMap::new();
        for entry in entries {
            if portals
                .insert((entry.map, entry.portal), (entry.x, entry.y))
                .is_some()
            {
                return Err(format!(
                    "portal {} on map {} listed twice",
                    entry.portal, entry.map
                ));
            }
        }
        Ok(Self { portals })
    }

    pub fn len(&self) -> usize {
        self.portals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.portals.is_empty()
    }
}

impl PortalService for PortalCatalog {
    fn resolve(&self, map: u32, portal: u32) -> Option<(i16, i16)> {
        self.portals.get(&(map, portal)).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_portals_only() {
        let catalog = PortalCatalog::new(&[PortalEntry {
            map: 100_000_000,
            portal: 1,
            x: 250,
            y: -60,
        }])
        .expect("catalog");
        assert_eq!(catalog.resolve(100_000_000, 1), Some((250, -60)));
        assert_eq!(catalog.resolve(100_000_000, 2), None);
    }

    #[test]
    fn duplicate_portal_is_rejected() {
        let entry = PortalEntry {
            map: 1,
            portal: 1,
            x: 0,
            y: 0,
        };
        assert!(PortalCatalog::new(&[entry, entry]).is_err());
    }
}
