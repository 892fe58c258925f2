use crate::world::position::TemporalPosition;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Normal,
    Jump,
    Teleport,
    StartFallDown,
    /// Any element type the folder does not interpret.
    Other(u8),
}

impl ElementKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "normal" => Some(ElementKind::Normal),
            "jump" => Some(ElementKind::Jump),
            "teleport" => Some(ElementKind::Teleport),
            "fall" | "startfalldown" => Some(ElementKind::StartFallDown),
            other => other.parse::<u8>().ok().map(ElementKind::Other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathElement {
    pub kind: ElementKind,
    pub x: i16,
    pub y: i16,
    pub stance: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Movement {
    pub start_x: i16,
    pub start_y: i16,
    pub elements: Vec<PathElement>,
}

impl Movement {
    /// Summary of the path, seeded with the start point and the stance last
    /// seen for the character.
    pub fn summarize(&self, last_stance: u8) -> TemporalPosition {
        let seed = TemporalPosition::new(self.start_x, self.start_y, last_stance);
        fold(seed, &self.elements)
    }
}

pub fn fold(seed: TemporalPosition, elements: &[PathElement]) -> TemporalPosition {
    elements.iter().fold(seed, |summary, element| match element.kind {
        ElementKind::Normal => TemporalPosition::new(element.x, element.y, element.stance),
        ElementKind::Jump | ElementKind::Teleport | ElementKind::StartFallDown => {
            summary.with_stance(element.stance)
        }
        ElementKind::Other(_) => summary,
    })
}
