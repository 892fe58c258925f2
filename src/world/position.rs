/// Last known on-map placement of a character.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TemporalPosition {
    pub x: i16,
    pub y: i16,
    pub stance: u8,
}

impl TemporalPosition {
    pub fn new(x: i16, y: i16, stance: u8) -> Self {
        Self { x, y, stance }
    }

    pub fn with_point(self, x: i16, y: i16) -> Self {
        Self { x, y, ..self }
    }

    pub fn with_stance(self, stance: u8) -> Self {
        Self { stance, ..self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_origin_standing() {
        assert_eq!(TemporalPosition::default(), TemporalPosition::new(0, 0, 0));
    }

    #[test]
    fn builders_change_only_their_fields() {
        let origin = TemporalPosition::new(10, -20, 4);
        assert_eq!(origin.with_point(1, 2), TemporalPosition::new(1, 2, 4));
        assert_eq!(origin.with_stance(7), TemporalPosition::new(10, -20, 7));
    }
}
